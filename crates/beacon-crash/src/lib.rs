// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Crash-telemetry SDK for desktop applications.
//!
//! Beacon intercepts unhandled faults, durably records them as plain-text
//! crash logs, and uploads pending logs to a collection endpoint on a later
//! run, deleting only what was delivered or is permanently undeliverable.
//!
//! # Overview
//!
//! - Capture: the host registers Beacon's handler on its fault sources;
//!   each fault is formatted and persisted locally, never sent inline.
//! - Persist: one `crash-*.log` file per report, written atomically;
//!   the store is the only state that outlives a run.
//! - Upload: on startup the host calls
//!   [`CrashPipeline::handle_pending`] (auto-send or consent-gated)
//!   and each report is uploaded independently. Transient transport
//!   failures keep the report for the next run; everything else removes it.
//!
//! # Example
//!
//! ```ignore
//! use beacon_crash::{CrashLogStore, CrashPipeline, PipelineConfig, UploadClient};
//!
//! let pipeline = CrashPipeline::builder()
//!     .store(CrashLogStore::from_xdg("abc123")?)
//!     .uploader(UploadClient::new("https://collector.example.com", "abc123")?)
//!     .consent(MyConsentDialog)
//!     .environment(HostEnvironment::new("com.example.app", "2.3.1"))
//!     .build()?;
//!
//! pipeline.configure(
//!     PipelineConfig::builder("abc123", "Example App", "Example Corp")
//!         .tag_default_boundary(true)
//!         .build(),
//!     &ui_source,
//!     &boundary_source,
//! )?;
//!
//! // Later, on startup:
//! pipeline.handle_pending(false).await;
//! ```

pub mod capture;
pub mod consent;
pub mod environment;
pub mod error;
pub mod pipeline;
pub mod store;
pub mod uploader;

pub use capture::{
	CaptureOutcome, DefaultBoundaryFaultSource, FaultCapture, FaultHandler, FaultOrigin,
	NullFaultSource, UiThreadFaultSource, DEFAULT_BOUNDARY_ANNOTATION,
};
pub use consent::{ConsentDecision, ConsentPrompt, ConsentProvider};
pub use environment::{EnvironmentProbe, HostEnvironment};
pub use error::{PipelineError, Result, StoreError};
pub use pipeline::{
	CrashPipeline, CrashPipelineBuilder, PipelineConfig, PipelineConfigBuilder,
	ReportDisposition, SweepDispatch, SweepOutcome,
};
pub use store::{CrashLogStore, PendingReport};
pub use uploader::{ReportUploader, UploadClient, UploadOutcome};

pub use beacon_crash_core::{
	format_report, Bitness, EnvironmentSnapshot, FaultRecord, FormatOptions, ReportId,
	ReporterIdentity,
};
