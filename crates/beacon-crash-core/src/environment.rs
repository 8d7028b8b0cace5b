// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Environment facts captured alongside a fault.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment facts at capture time.
///
/// Read fresh for every report; never cached beyond a single report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
	/// Package or namespace identifier of the host application.
	pub package: String,
	/// Host application version.
	pub app_version: String,
	/// "linux", "macos", "windows"
	pub os_name: String,
	/// OS version string, `major.minor[.build]` where available.
	pub os_version: String,
	/// Version of the runtime the host was built with.
	pub runtime_version: String,
	/// Installed UI language, BCP 47 (e.g. "en-US").
	pub language: String,
	pub bitness: Bitness,
	/// Capture timestamp, UTC.
	pub captured_at: DateTime<Utc>,
}

/// Pointer width of the operating system process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bitness {
	Bits32,
	Bits64,
}

impl Bitness {
	/// The bitness this SDK was compiled for.
	pub const fn native() -> Self {
		if cfg!(target_pointer_width = "64") {
			Self::Bits64
		} else {
			Self::Bits32
		}
	}
}

impl fmt::Display for Bitness {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bits32 => write!(f, "32-Bit"),
			Self::Bits64 => write!(f, "64-Bit"),
		}
	}
}
