// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared build and version information for Beacon.
//!
//! Single source of truth for the package version, the rustc toolchain the
//! SDK was built with, and the platform string used in crash-report headers
//! and the HTTP User-Agent.

shadow_rs::shadow!(build);

/// Platform string in `{os}-{arch}` format, e.g. "linux-x86_64".
///
/// Derived at compile time from target configuration.
pub const PLATFORM: &str = env!("BEACON_PLATFORM");

/// Core build information used across the crash pipeline.
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
	pub version: &'static str,
	/// Full rustc version line, e.g. "rustc 1.82.0 (f6e511eec 2024-10-15)".
	pub rust_version: &'static str,
	pub platform: &'static str,
}

impl BuildInfo {
	/// Get the current build information (compile-time constants).
	pub const fn current() -> Self {
		Self {
			version: build::PKG_VERSION,
			rust_version: build::RUST_VERSION,
			platform: PLATFORM,
		}
	}
}
