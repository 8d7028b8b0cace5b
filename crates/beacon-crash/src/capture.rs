// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Converting host fault notifications into persisted crash reports.
//!
//! Hosts surface unhandled faults through two independent sources: the
//! UI-thread message loop and the process default boundary (any thread the
//! UI loop does not own). Both are modelled as capability traits the host
//! registers against; the pipeline never depends on a concrete toolkit.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{error, info};

use crate::environment::EnvironmentProbe;
use crate::store::CrashLogStore;
use beacon_crash_core::{format_report, FaultRecord, FormatOptions, ReportId};

/// Header line tagging reports recovered at the default boundary.
pub const DEFAULT_BOUNDARY_ANNOTATION: &str = "Origin: default-fault-boundary";

/// Callback a fault source invokes with each escaped fault.
///
/// Runs synchronously on whichever thread raised the fault; it must finish
/// quickly and never touch the network.
pub type FaultHandler = Arc<dyn Fn(FaultRecord) + Send + Sync>;

/// Faults escaping the UI-thread message loop.
pub trait UiThreadFaultSource {
	fn register(&self, handler: FaultHandler);
}

/// Faults escaping into the process default boundary, i.e. any thread not
/// owned by the UI loop.
pub trait DefaultBoundaryFaultSource {
	fn register(&self, handler: FaultHandler);
}

/// Fault source that never fires. For hosts that only surface one of the
/// two notification sources.
pub struct NullFaultSource;

impl UiThreadFaultSource for NullFaultSource {
	fn register(&self, _handler: FaultHandler) {}
}

impl DefaultBoundaryFaultSource for NullFaultSource {
	fn register(&self, _handler: FaultHandler) {}
}

/// Which notification source surfaced a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultOrigin {
	UiThread,
	DefaultBoundary,
}

/// What became of one capture attempt.
///
/// Capture never raises; failures collapse into [`CaptureOutcome::Dropped`]
/// after being logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
	/// The report is on stable storage under the returned id.
	Persisted(ReportId),
	/// Persistence failed; the fault is lost but the host stays alive.
	Dropped,
}

/// Default fault handling: snapshot the environment, format, persist.
pub struct FaultCapture {
	store: Arc<CrashLogStore>,
	environment: Arc<dyn EnvironmentProbe>,
	package: Option<String>,
	tag_default_boundary: bool,
}

impl FaultCapture {
	pub fn new(
		store: Arc<CrashLogStore>,
		environment: Arc<dyn EnvironmentProbe>,
		package: Option<String>,
		tag_default_boundary: bool,
	) -> Self {
		Self {
			store,
			environment,
			package,
			tag_default_boundary,
		}
	}

	/// Handles a fault surfaced by one of the notification sources.
	pub fn handle_fault(&self, fault: &FaultRecord, origin: FaultOrigin) -> CaptureOutcome {
		let annotation = match origin {
			FaultOrigin::DefaultBoundary if self.tag_default_boundary => {
				Some(DEFAULT_BOUNDARY_ANNOTATION.to_string())
			}
			_ => None,
		};
		self.capture(fault, annotation)
	}

	/// Persists a fault the host handled itself, with optional extra
	/// context rendered as a header line after the date.
	pub fn log_fault(&self, fault: &FaultRecord, custom_info: Option<&str>) -> CaptureOutcome {
		self.capture(fault, custom_info.map(str::to_string))
	}

	fn capture(&self, fault: &FaultRecord, annotation: Option<String>) -> CaptureOutcome {
		// This runs inside the host's failure path; nothing may escape it,
		// including a panic from a host-supplied probe.
		match catch_unwind(AssertUnwindSafe(|| self.persist(fault, annotation))) {
			Ok(outcome) => outcome,
			Err(_) => {
				error!(fault_type = %fault.type_name, "crash capture panicked; fault dropped");
				CaptureOutcome::Dropped
			}
		}
	}

	fn persist(&self, fault: &FaultRecord, annotation: Option<String>) -> CaptureOutcome {
		let env = self.environment.snapshot();
		let opts = FormatOptions {
			package: self.package.clone(),
			annotation,
		};
		let text = format_report(fault, &env, &opts);

		match self.store.save(&text) {
			Ok(id) => {
				info!(
					report_id = %id,
					fault_type = %fault.type_name,
					os = %env.os_name,
					"persisted crash report"
				);
				CaptureOutcome::Persisted(id)
			}
			Err(e) => {
				error!(
					error = %e,
					fault_type = %fault.type_name,
					"failed to persist crash report; fault dropped"
				);
				CaptureOutcome::Dropped
			}
		}
	}
}
