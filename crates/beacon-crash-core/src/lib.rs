// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Beacon crash-telemetry pipeline.
//!
//! This crate provides the shared data model for crash capture: the
//! immutable fault facts, the environment snapshot taken at capture time,
//! report identifiers, and the canonical plain-text report formatter. It is
//! pure: no I/O, no clocks beyond the timestamp the caller captured.

pub mod environment;
pub mod fault;
pub mod format;
pub mod report;

pub use environment::{Bitness, EnvironmentSnapshot};
pub use fault::FaultRecord;
pub use format::{format_report, FormatOptions};
pub use report::{ReportId, ReporterIdentity};
