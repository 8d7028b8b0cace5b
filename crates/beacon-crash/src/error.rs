// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the crash SDK.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors from the crash-log store.
///
/// Inside capture paths and pending-report sweeps these are absorbed and
/// logged rather than propagated; a crash reporter must never crash the
/// host a second time.
#[derive(Debug, Error)]
pub enum StoreError {
	/// The referenced crash log no longer exists (e.g. concurrently deleted).
	#[error("crash log not found: {0}")]
	NotFound(String),

	/// Disk-level read/write failure.
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

/// Errors that can occur in the crash pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
	/// The pipeline was configured a second time. This is a usage error,
	/// not a runtime condition; the first configuration stays in effect.
	#[error("crash pipeline is already configured")]
	AlreadyConfigured,

	/// A crash-log store is required.
	#[error("crash log store is required")]
	MissingStore,

	/// An uploader is required.
	#[error("report uploader is required")]
	MissingUploader,

	/// A consent provider is required.
	#[error("consent provider is required")]
	MissingConsentProvider,

	/// An environment probe is required.
	#[error("environment probe is required")]
	MissingEnvironmentProbe,

	/// Failed to construct the HTTP transport.
	#[error("failed to build HTTP transport: {0}")]
	Transport(#[from] reqwest::Error),

	/// Store failure surfaced outside a swallowing boundary.
	#[error(transparent)]
	Store(#[from] StoreError),
}
