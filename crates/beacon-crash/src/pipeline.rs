// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Process-wide coordination: one-time configuration and the
//! pending-report sweep.
//!
//! The pipeline is an explicitly constructed instance owned by the host's
//! startup routine; there is no global singleton. It is configured exactly
//! once, then `handle_pending` is invoked on startup (and on demand) to
//! drain the store.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::capture::{
	CaptureOutcome, DefaultBoundaryFaultSource, FaultCapture, FaultHandler, FaultOrigin,
	UiThreadFaultSource,
};
use crate::consent::{ConsentDecision, ConsentPrompt, ConsentProvider};
use crate::environment::EnvironmentProbe;
use crate::error::{PipelineError, Result};
use crate::store::{CrashLogStore, PendingReport};
use crate::uploader::{ReportUploader, UploadOutcome};
use beacon_crash_core::{FaultRecord, ReporterIdentity};

/// Upper bound on concurrently in-flight uploads per sweep.
const DEFAULT_MAX_CONCURRENT_UPLOADS: usize = 4;

/// One-time configuration for a [`CrashPipeline`] instance.
pub struct PipelineConfig {
	/// Application identifier the collection endpoint routes on.
	pub app_id: String,
	/// Display name shown in the consent prompt.
	pub app_name: String,
	/// Developer or company name shown in the consent prompt.
	pub developer_name: String,
	/// Package identifier override for report headers.
	pub package: Option<String>,
	/// Tag reports recovered at the default boundary so the remote side
	/// can tell them apart from UI-thread recoveries.
	pub tag_default_boundary: bool,
	pub(crate) ui_handler: Option<FaultHandler>,
	pub(crate) boundary_handler: Option<FaultHandler>,
}

impl PipelineConfig {
	pub fn builder(
		app_id: impl Into<String>,
		app_name: impl Into<String>,
		developer_name: impl Into<String>,
	) -> PipelineConfigBuilder {
		PipelineConfigBuilder {
			app_id: app_id.into(),
			app_name: app_name.into(),
			developer_name: developer_name.into(),
			package: None,
			tag_default_boundary: false,
			ui_handler: None,
			boundary_handler: None,
		}
	}
}

/// Builder for [`PipelineConfig`].
pub struct PipelineConfigBuilder {
	app_id: String,
	app_name: String,
	developer_name: String,
	package: Option<String>,
	tag_default_boundary: bool,
	ui_handler: Option<FaultHandler>,
	boundary_handler: Option<FaultHandler>,
}

impl PipelineConfigBuilder {
	/// Overrides the package identifier stamped into report headers.
	pub fn package(mut self, package: impl Into<String>) -> Self {
		self.package = Some(package.into());
		self
	}

	/// Enables the origin tag on default-boundary reports.
	pub fn tag_default_boundary(mut self, tag: bool) -> Self {
		self.tag_default_boundary = tag;
		self
	}

	/// Replaces default handling for UI-thread faults entirely; no
	/// automatic persistence happens for that source.
	pub fn ui_thread_handler(mut self, handler: FaultHandler) -> Self {
		self.ui_handler = Some(handler);
		self
	}

	/// Replaces default handling for default-boundary faults entirely.
	pub fn default_boundary_handler(mut self, handler: FaultHandler) -> Self {
		self.boundary_handler = Some(handler);
		self
	}

	pub fn build(self) -> PipelineConfig {
		PipelineConfig {
			app_id: self.app_id,
			app_name: self.app_name,
			developer_name: self.developer_name,
			package: self.package,
			tag_default_boundary: self.tag_default_boundary,
			ui_handler: self.ui_handler,
			boundary_handler: self.boundary_handler,
		}
	}
}

/// How a `handle_pending` sweep ended.
///
/// The sweep never propagates an error into the host's startup path;
/// internal failures collapse into [`SweepOutcome::Aborted`] after being
/// logged.
#[derive(Debug)]
pub enum SweepOutcome {
	/// `configure` has not been called on this instance.
	NotConfigured,
	/// Nothing pending.
	Idle,
	/// Consent was declined; the whole pending batch was deleted without
	/// any network traffic.
	Discarded { deleted: usize },
	/// Upload tasks were dispatched; delivery continues in the background.
	Dispatched(SweepDispatch),
	/// An internal failure was absorbed; pending reports are untouched.
	Aborted,
}

/// The upload tasks one sweep spawned.
///
/// Returned once dispatch completes, not once delivery completes. Hosts
/// may drop it (fire-and-forget) or [`settle`](Self::settle) it to observe
/// per-report dispositions.
#[derive(Debug)]
pub struct SweepDispatch {
	tasks: Vec<JoinHandle<ReportDisposition>>,
}

impl SweepDispatch {
	/// Number of dispatched uploads.
	pub fn len(&self) -> usize {
		self.tasks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tasks.is_empty()
	}

	/// Awaits every dispatched upload and returns its disposition.
	pub async fn settle(self) -> Vec<ReportDisposition> {
		let mut dispositions = Vec::with_capacity(self.tasks.len());
		for task in self.tasks {
			match task.await {
				Ok(disposition) => dispositions.push(disposition),
				Err(e) => error!(error = %e, "upload task failed"),
			}
		}
		dispositions
	}
}

/// What became of one pending report during a sweep.
#[derive(Debug, Clone)]
pub struct ReportDisposition {
	pub report: PendingReport,
	pub outcome: UploadOutcome,
	/// Whether the report was removed from the store.
	pub removed: bool,
}

struct Configured {
	config: PipelineConfig,
	capture: Arc<FaultCapture>,
}

/// The crash pipeline: capture wiring, pending-report sweep, cleanup.
pub struct CrashPipeline {
	store: Arc<CrashLogStore>,
	uploader: Arc<dyn ReportUploader>,
	consent: Arc<dyn ConsentProvider>,
	environment: Arc<dyn EnvironmentProbe>,
	upload_permits: Arc<Semaphore>,
	state: OnceLock<Configured>,
}

impl CrashPipeline {
	pub fn builder() -> CrashPipelineBuilder {
		CrashPipelineBuilder::new()
	}

	/// Applies the one-time configuration and registers fault handlers on
	/// both notification sources.
	///
	/// Exactly one caller wins under a concurrent first-configuration
	/// race; every later call fails with
	/// [`PipelineError::AlreadyConfigured`] and the first configuration
	/// stays in effect.
	pub fn configure(
		&self,
		config: PipelineConfig,
		ui_source: &dyn UiThreadFaultSource,
		boundary_source: &dyn DefaultBoundaryFaultSource,
	) -> Result<()> {
		let mut won = false;
		let state = self.state.get_or_init(|| {
			won = true;
			let capture = Arc::new(FaultCapture::new(
				Arc::clone(&self.store),
				Arc::clone(&self.environment),
				config.package.clone(),
				config.tag_default_boundary,
			));
			Configured { config, capture }
		});
		if !won {
			return Err(PipelineError::AlreadyConfigured);
		}

		let ui_handler = state.config.ui_handler.clone().unwrap_or_else(|| {
			let capture = Arc::clone(&state.capture);
			Arc::new(move |fault| {
				capture.handle_fault(&fault, FaultOrigin::UiThread);
			})
		});
		ui_source.register(ui_handler);

		let boundary_handler = state.config.boundary_handler.clone().unwrap_or_else(|| {
			let capture = Arc::clone(&state.capture);
			Arc::new(move |fault| {
				capture.handle_fault(&fault, FaultOrigin::DefaultBoundary);
			})
		});
		boundary_source.register(boundary_handler);

		info!(app_id = %state.config.app_id, "crash pipeline configured");

		Ok(())
	}

	/// The active configuration, if `configure` has been called.
	pub fn config(&self) -> Option<&PipelineConfig> {
		self.state.get().map(|state| &state.config)
	}

	/// Persists a fault the host caught itself, with optional extra
	/// context. Returns `None` before configuration.
	pub fn log_fault(
		&self,
		fault: &FaultRecord,
		custom_info: Option<&str>,
	) -> Option<CaptureOutcome> {
		let state = self.state.get()?;
		Some(state.capture.log_fault(fault, custom_info))
	}

	/// Handles the pending reports left over from earlier runs.
	///
	/// With `auto_send`, every pending report is uploaded without asking.
	/// Otherwise the consent provider reviews the most recent report; on
	/// decline the whole batch is discarded, on accept the supplied
	/// identity is attached to every upload. Either way, reports are
	/// deleted on `Delivered`/`PermanentFailure` and kept on
	/// `TransientFailure` for the next run.
	///
	/// Returns once dispatch completes, not once delivery completes, and
	/// never propagates a failure.
	pub async fn handle_pending(&self, auto_send: bool) -> SweepOutcome {
		let Some(state) = self.state.get() else {
			warn!("handle_pending called before configure; ignoring");
			return SweepOutcome::NotConfigured;
		};

		match self.sweep(state, auto_send).await {
			Ok(outcome) => outcome,
			Err(e) => {
				error!(error = %e, "pending-report sweep aborted");
				SweepOutcome::Aborted
			}
		}
	}

	async fn sweep(&self, state: &Configured, auto_send: bool) -> Result<SweepOutcome> {
		let pending = self.store.list()?;
		if pending.is_empty() {
			debug!("no pending crash reports");
			return Ok(SweepOutcome::Idle);
		}

		info!(
			count = pending.len(),
			app_id = %state.config.app_id,
			auto_send,
			"handling pending crash reports"
		);

		let identity = if auto_send {
			None
		} else {
			// The most recent report stands in for the whole batch.
			let Some(newest) = pending.last() else {
				return Ok(SweepOutcome::Idle);
			};
			let report_text = self.store.read(newest)?;
			// The provider is host code; a panic in it must not escape the
			// sweep.
			let decision = match catch_unwind(AssertUnwindSafe(|| {
				self.consent.review(ConsentPrompt {
					report_text: &report_text,
					app_name: &state.config.app_name,
					developer_name: &state.config.developer_name,
				})
			})) {
				Ok(decision) => decision,
				Err(_) => {
					error!("consent provider panicked; pending reports left untouched");
					return Ok(SweepOutcome::Aborted);
				}
			};
			match decision {
				ConsentDecision::Declined => {
					let deleted = self.discard_all(&pending);
					info!(deleted, "consent declined; pending batch discarded");
					return Ok(SweepOutcome::Discarded { deleted });
				}
				ConsentDecision::Accepted(identity) => Some(identity),
			}
		};

		let mut tasks = Vec::with_capacity(pending.len());
		for report in pending {
			let store = Arc::clone(&self.store);
			let uploader = Arc::clone(&self.uploader);
			let permits = Arc::clone(&self.upload_permits);
			let identity = identity.clone();
			tasks.push(tokio::spawn(async move {
				// The semaphore is never closed; acquisition only bounds
				// concurrency.
				let _permit = permits.acquire_owned().await.ok();
				deliver_one(store, uploader, report, identity).await
			}));
		}

		Ok(SweepOutcome::Dispatched(SweepDispatch { tasks }))
	}

	fn discard_all(&self, pending: &[PendingReport]) -> usize {
		let mut deleted = 0;
		for report in pending {
			match self.store.delete(report) {
				Ok(()) => deleted += 1,
				Err(e) => {
					error!(report = %report.filename, error = %e, "failed to discard crash report");
				}
			}
		}
		deleted
	}
}

async fn deliver_one(
	store: Arc<CrashLogStore>,
	uploader: Arc<dyn ReportUploader>,
	report: PendingReport,
	identity: Option<ReporterIdentity>,
) -> ReportDisposition {
	let text = match store.read(&report) {
		Ok(text) => text,
		Err(e) => {
			// Unreadable locally: retrying cannot help, treat as permanent.
			warn!(report = %report.filename, error = %e, "pending crash report unreadable; discarding");
			let removed = store.delete(&report).is_ok();
			return ReportDisposition {
				report,
				outcome: UploadOutcome::PermanentFailure,
				removed,
			};
		}
	};

	let outcome = uploader.upload(&text, identity.as_ref()).await;
	let removed = match outcome {
		UploadOutcome::TransientFailure => {
			debug!(report = %report.filename, "keeping crash report for a later run");
			false
		}
		UploadOutcome::Delivered | UploadOutcome::PermanentFailure => {
			match store.delete(&report) {
				Ok(()) => true,
				Err(e) => {
					error!(report = %report.filename, error = %e, "failed to delete handled crash report");
					false
				}
			}
		}
	};

	ReportDisposition {
		report,
		outcome,
		removed,
	}
}

/// Builder for constructing a [`CrashPipeline`].
pub struct CrashPipelineBuilder {
	store: Option<Arc<CrashLogStore>>,
	uploader: Option<Arc<dyn ReportUploader>>,
	consent: Option<Arc<dyn ConsentProvider>>,
	environment: Option<Arc<dyn EnvironmentProbe>>,
	max_concurrent_uploads: usize,
}

impl CrashPipelineBuilder {
	pub fn new() -> Self {
		Self {
			store: None,
			uploader: None,
			consent: None,
			environment: None,
			max_concurrent_uploads: DEFAULT_MAX_CONCURRENT_UPLOADS,
		}
	}

	pub fn store(mut self, store: CrashLogStore) -> Self {
		self.store = Some(Arc::new(store));
		self
	}

	pub fn uploader(mut self, uploader: impl ReportUploader + 'static) -> Self {
		self.uploader = Some(Arc::new(uploader));
		self
	}

	pub fn consent(mut self, consent: impl ConsentProvider + 'static) -> Self {
		self.consent = Some(Arc::new(consent));
		self
	}

	pub fn environment(mut self, environment: impl EnvironmentProbe + 'static) -> Self {
		self.environment = Some(Arc::new(environment));
		self
	}

	/// Bounds concurrently in-flight uploads per sweep.
	pub fn max_concurrent_uploads(mut self, max: usize) -> Self {
		self.max_concurrent_uploads = max.max(1);
		self
	}

	pub fn build(self) -> Result<CrashPipeline> {
		let store = self.store.ok_or(PipelineError::MissingStore)?;
		let uploader = self.uploader.ok_or(PipelineError::MissingUploader)?;
		let consent = self.consent.ok_or(PipelineError::MissingConsentProvider)?;
		let environment = self
			.environment
			.ok_or(PipelineError::MissingEnvironmentProbe)?;

		Ok(CrashPipeline {
			store,
			uploader,
			consent,
			environment,
			upload_permits: Arc::new(Semaphore::new(self.max_concurrent_uploads)),
			state: OnceLock::new(),
		})
	}
}

impl Default for CrashPipelineBuilder {
	fn default() -> Self {
		Self::new()
	}
}
