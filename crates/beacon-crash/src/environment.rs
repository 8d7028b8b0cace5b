// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Environment-fact gathering behind a probe seam.
//!
//! The pipeline only depends on [`EnvironmentProbe`]; hosts with better
//! knowledge of their platform (installer-recorded OS build, embedded
//! runtime) supply their own implementation or override individual facts.

use std::sync::OnceLock;

use chrono::Utc;

use beacon_common_version::BuildInfo;
use beacon_crash_core::{Bitness, EnvironmentSnapshot};

static DETECTED_LANGUAGE: OnceLock<String> = OnceLock::new();

/// Read-only source of the environment facts stamped into report headers.
pub trait EnvironmentProbe: Send + Sync {
	/// Takes a fresh snapshot. Called once per captured report.
	fn snapshot(&self) -> EnvironmentSnapshot;
}

/// Best-effort probe backed by the host process environment.
pub struct HostEnvironment {
	package: String,
	app_version: String,
	os_version: Option<String>,
}

impl HostEnvironment {
	/// `package` is the host's namespace identifier, `app_version` the
	/// host application version (not the SDK version).
	pub fn new(package: impl Into<String>, app_version: impl Into<String>) -> Self {
		Self {
			package: package.into(),
			app_version: app_version.into(),
			os_version: None,
		}
	}

	/// Overrides the detected OS version with a host-supplied fact.
	pub fn os_version(mut self, version: impl Into<String>) -> Self {
		self.os_version = Some(version.into());
		self
	}
}

impl EnvironmentProbe for HostEnvironment {
	fn snapshot(&self) -> EnvironmentSnapshot {
		EnvironmentSnapshot {
			package: self.package.clone(),
			app_version: self.app_version.clone(),
			os_name: std::env::consts::OS.to_string(),
			os_version: self
				.os_version
				.clone()
				.unwrap_or_else(detect_os_version),
			runtime_version: BuildInfo::current().rust_version.to_string(),
			language: detected_language().to_string(),
			bitness: Bitness::native(),
			captured_at: Utc::now(),
		}
	}
}

/// The installed UI language, detected once per process.
/// Falls back to "en-US" if detection fails.
fn detected_language() -> &'static str {
	DETECTED_LANGUAGE
		.get_or_init(|| sys_locale::get_locale().unwrap_or_else(|| "en-US".to_string()))
}

#[cfg(target_os = "linux")]
fn detect_os_version() -> String {
	std::fs::read_to_string("/proc/sys/kernel/osrelease")
		.map(|s| s.trim().to_string())
		.unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(not(target_os = "linux"))]
fn detect_os_version() -> String {
	"unknown".to_string()
}
