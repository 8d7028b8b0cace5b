// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! End-to-end pipeline flows: capture wiring, auto-send sweeps, the
//! consent path, and the keep/delete policy per upload outcome.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;

use beacon_crash::{
	Bitness, ConsentDecision, ConsentPrompt, ConsentProvider, CrashLogStore, CrashPipeline,
	DefaultBoundaryFaultSource, EnvironmentProbe, EnvironmentSnapshot, FaultHandler, FaultRecord,
	PipelineConfig, ReportUploader, ReporterIdentity, SweepOutcome, UiThreadFaultSource,
	UploadOutcome,
};

struct StaticProbe;

impl EnvironmentProbe for StaticProbe {
	fn snapshot(&self) -> EnvironmentSnapshot {
		EnvironmentSnapshot {
			package: "com.example.app".to_string(),
			app_version: "1.0.0".to_string(),
			os_name: "linux".to_string(),
			os_version: "6.1.0".to_string(),
			runtime_version: "rustc 1.82.0".to_string(),
			language: "en-US".to_string(),
			bitness: Bitness::Bits64,
			captured_at: Utc::now(),
		}
	}
}

/// Uploader scripted per report: the outcome of the first marker contained
/// in the report text wins, otherwise the default applies.
struct ScriptedUploader {
	outcomes: HashMap<&'static str, UploadOutcome>,
	default: UploadOutcome,
	calls: Arc<AtomicUsize>,
	identities: Arc<Mutex<Vec<Option<ReporterIdentity>>>>,
}

impl ScriptedUploader {
	fn all(default: UploadOutcome) -> (Self, Arc<AtomicUsize>) {
		let calls = Arc::new(AtomicUsize::new(0));
		(
			Self {
				outcomes: HashMap::new(),
				default,
				calls: Arc::clone(&calls),
				identities: Arc::new(Mutex::new(Vec::new())),
			},
			calls,
		)
	}

	fn scripted(outcomes: HashMap<&'static str, UploadOutcome>) -> Self {
		Self {
			outcomes,
			default: UploadOutcome::Delivered,
			calls: Arc::new(AtomicUsize::new(0)),
			identities: Arc::new(Mutex::new(Vec::new())),
		}
	}

	fn identities(&self) -> Arc<Mutex<Vec<Option<ReporterIdentity>>>> {
		Arc::clone(&self.identities)
	}
}

#[async_trait]
impl ReportUploader for ScriptedUploader {
	async fn upload(
		&self,
		report_text: &str,
		identity: Option<&ReporterIdentity>,
	) -> UploadOutcome {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.identities.lock().unwrap().push(identity.cloned());
		self.outcomes
			.iter()
			.find(|(marker, _)| report_text.contains(*marker))
			.map(|(_, outcome)| *outcome)
			.unwrap_or(self.default)
	}
}

struct ScriptedConsent {
	decision: ConsentDecision,
	prompts: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl ScriptedConsent {
	fn new(decision: ConsentDecision) -> Self {
		Self {
			decision,
			prompts: Arc::new(Mutex::new(Vec::new())),
		}
	}

	fn prompts(&self) -> Arc<Mutex<Vec<(String, String, String)>>> {
		Arc::clone(&self.prompts)
	}
}

impl ConsentProvider for ScriptedConsent {
	fn review(&self, prompt: ConsentPrompt<'_>) -> ConsentDecision {
		self.prompts.lock().unwrap().push((
			prompt.report_text.to_string(),
			prompt.app_name.to_string(),
			prompt.developer_name.to_string(),
		));
		self.decision.clone()
	}
}

#[derive(Default)]
struct RecordingSource {
	handler: Mutex<Option<FaultHandler>>,
}

impl RecordingSource {
	fn fire(&self, fault: FaultRecord) {
		let handler = self.handler.lock().unwrap();
		let handler = handler.as_ref().expect("no handler registered");
		handler(fault);
	}
}

impl UiThreadFaultSource for RecordingSource {
	fn register(&self, handler: FaultHandler) {
		*self.handler.lock().unwrap() = Some(handler);
	}
}

impl DefaultBoundaryFaultSource for RecordingSource {
	fn register(&self, handler: FaultHandler) {
		*self.handler.lock().unwrap() = Some(handler);
	}
}

fn test_config() -> PipelineConfig {
	PipelineConfig::builder("abc123", "Example App", "Example Corp")
		.tag_default_boundary(true)
		.build()
}

fn pipeline_with(
	dir: &TempDir,
	uploader: ScriptedUploader,
	consent: ScriptedConsent,
) -> CrashPipeline {
	CrashPipeline::builder()
		.store(CrashLogStore::new(dir.path()))
		.uploader(uploader)
		.consent(consent)
		.environment(StaticProbe)
		.build()
		.unwrap()
}

fn inspector(dir: &TempDir) -> CrashLogStore {
	CrashLogStore::new(dir.path())
}

async fn settle(outcome: SweepOutcome) -> Vec<beacon_crash::ReportDisposition> {
	match outcome {
		SweepOutcome::Dispatched(dispatch) => dispatch.settle().await,
		other => panic!("expected dispatch, got {other:?}"),
	}
}

#[tokio::test]
async fn auto_send_removes_all_delivered() {
	let tmp = TempDir::new().unwrap();
	let (uploader, calls) = ScriptedUploader::all(UploadOutcome::Delivered);
	let pipeline = pipeline_with(&tmp, uploader, ScriptedConsent::new(ConsentDecision::Declined));
	pipeline
		.configure(test_config(), &RecordingSource::default(), &RecordingSource::default())
		.unwrap();

	let store = inspector(&tmp);
	for i in 0..3 {
		store.save(&format!("report {i}")).unwrap();
	}

	let dispositions = settle(pipeline.handle_pending(true).await).await;

	assert_eq!(dispositions.len(), 3);
	assert!(dispositions.iter().all(|d| d.removed));
	assert_eq!(calls.load(Ordering::SeqCst), 3);
	assert!(store.list().unwrap().is_empty());
}

#[tokio::test]
async fn auto_send_keeps_all_transient() {
	let tmp = TempDir::new().unwrap();
	let (uploader, calls) = ScriptedUploader::all(UploadOutcome::TransientFailure);
	let pipeline = pipeline_with(&tmp, uploader, ScriptedConsent::new(ConsentDecision::Declined));
	pipeline
		.configure(test_config(), &RecordingSource::default(), &RecordingSource::default())
		.unwrap();

	let store = inspector(&tmp);
	for i in 0..3 {
		store.save(&format!("report {i}")).unwrap();
	}

	let dispositions = settle(pipeline.handle_pending(true).await).await;

	assert!(dispositions.iter().all(|d| !d.removed));
	assert_eq!(calls.load(Ordering::SeqCst), 3);
	assert_eq!(store.list().unwrap().len(), 3);
}

#[tokio::test]
async fn mixed_outcomes_remove_exact_subset() {
	let tmp = TempDir::new().unwrap();
	let uploader = ScriptedUploader::scripted(HashMap::from([
		("report alpha", UploadOutcome::Delivered),
		("report beta", UploadOutcome::TransientFailure),
		("report gamma", UploadOutcome::PermanentFailure),
	]));
	let pipeline = pipeline_with(&tmp, uploader, ScriptedConsent::new(ConsentDecision::Declined));
	pipeline
		.configure(test_config(), &RecordingSource::default(), &RecordingSource::default())
		.unwrap();

	let store = inspector(&tmp);
	store.save("report alpha").unwrap();
	store.save("report beta").unwrap();
	store.save("report gamma").unwrap();

	settle(pipeline.handle_pending(true).await).await;

	let remaining = store.list().unwrap();
	assert_eq!(remaining.len(), 1);
	assert_eq!(store.read(&remaining[0]).unwrap(), "report beta");
}

#[tokio::test]
async fn delivered_then_transient_leaves_second_listed() {
	let tmp = TempDir::new().unwrap();
	let uploader = ScriptedUploader::scripted(HashMap::from([
		("report alpha", UploadOutcome::Delivered),
		("report beta", UploadOutcome::TransientFailure),
	]));
	let pipeline = pipeline_with(&tmp, uploader, ScriptedConsent::new(ConsentDecision::Declined));
	pipeline
		.configure(test_config(), &RecordingSource::default(), &RecordingSource::default())
		.unwrap();

	let store = inspector(&tmp);
	let a = store.save("report alpha").unwrap();
	let b = store.save("report beta").unwrap();
	let listed: Vec<_> = store.list().unwrap().iter().map(|p| p.id).collect();
	assert_eq!(listed, [a, b]);

	settle(pipeline.handle_pending(true).await).await;

	let remaining = store.list().unwrap();
	assert_eq!(remaining.len(), 1);
	assert_eq!(remaining[0].id, b);
}

#[tokio::test]
async fn consent_decline_discards_batch_without_upload() {
	let tmp = TempDir::new().unwrap();
	let (uploader, calls) = ScriptedUploader::all(UploadOutcome::Delivered);
	let pipeline = pipeline_with(&tmp, uploader, ScriptedConsent::new(ConsentDecision::Declined));
	pipeline
		.configure(test_config(), &RecordingSource::default(), &RecordingSource::default())
		.unwrap();

	let store = inspector(&tmp);
	store.save("report alpha").unwrap();
	store.save("report beta").unwrap();

	let outcome = pipeline.handle_pending(false).await;

	assert!(matches!(outcome, SweepOutcome::Discarded { deleted: 2 }));
	assert_eq!(calls.load(Ordering::SeqCst), 0);
	assert!(store.list().unwrap().is_empty());
}

#[tokio::test]
async fn consent_prompt_shows_most_recent_report() {
	let tmp = TempDir::new().unwrap();
	let (uploader, _calls) = ScriptedUploader::all(UploadOutcome::Delivered);
	let consent = ScriptedConsent::new(ConsentDecision::Declined);
	let prompts = consent.prompts();
	let pipeline = pipeline_with(&tmp, uploader, consent);
	pipeline
		.configure(test_config(), &RecordingSource::default(), &RecordingSource::default())
		.unwrap();

	let store = inspector(&tmp);
	store.save("report alpha").unwrap();
	store.save("report beta").unwrap();

	pipeline.handle_pending(false).await;

	let prompts = prompts.lock().unwrap();
	assert_eq!(prompts.len(), 1);
	let (text, app_name, developer_name) = &prompts[0];
	assert_eq!(text, "report beta");
	assert_eq!(app_name, "Example App");
	assert_eq!(developer_name, "Example Corp");
}

#[tokio::test]
async fn consent_accept_attaches_identity_to_every_upload() {
	let tmp = TempDir::new().unwrap();
	let identity = ReporterIdentity {
		name: Some("ada".to_string()),
		contact: Some("ada@example.com".to_string()),
		comments: Some("crashed while saving".to_string()),
	};
	let (uploader, calls) = ScriptedUploader::all(UploadOutcome::Delivered);
	let identities = uploader.identities();
	let pipeline = pipeline_with(
		&tmp,
		uploader,
		ScriptedConsent::new(ConsentDecision::Accepted(identity.clone())),
	);
	pipeline
		.configure(test_config(), &RecordingSource::default(), &RecordingSource::default())
		.unwrap();

	let store = inspector(&tmp);
	store.save("report alpha").unwrap();
	store.save("report beta").unwrap();

	settle(pipeline.handle_pending(false).await).await;

	assert_eq!(calls.load(Ordering::SeqCst), 2);
	let seen = identities.lock().unwrap();
	assert_eq!(seen.len(), 2);
	assert!(seen.iter().all(|i| i.as_ref() == Some(&identity)));
	assert!(store.list().unwrap().is_empty());
}

#[tokio::test]
async fn panicking_consent_provider_aborts_sweep_without_loss() {
	struct PanickingConsent;

	impl ConsentProvider for PanickingConsent {
		fn review(&self, _prompt: ConsentPrompt<'_>) -> ConsentDecision {
			panic!("dialog exploded");
		}
	}

	let tmp = TempDir::new().unwrap();
	let (uploader, calls) = ScriptedUploader::all(UploadOutcome::Delivered);
	let pipeline = CrashPipeline::builder()
		.store(CrashLogStore::new(tmp.path()))
		.uploader(uploader)
		.consent(PanickingConsent)
		.environment(StaticProbe)
		.build()
		.unwrap();
	pipeline
		.configure(test_config(), &RecordingSource::default(), &RecordingSource::default())
		.unwrap();

	let store = inspector(&tmp);
	store.save("report alpha").unwrap();

	let outcome = pipeline.handle_pending(false).await;

	assert!(matches!(outcome, SweepOutcome::Aborted));
	assert_eq!(calls.load(Ordering::SeqCst), 0);
	assert_eq!(store.list().unwrap().len(), 1);
}

#[tokio::test]
async fn registered_handler_persists_fault() {
	let tmp = TempDir::new().unwrap();
	let (uploader, _calls) = ScriptedUploader::all(UploadOutcome::Delivered);
	let pipeline = pipeline_with(&tmp, uploader, ScriptedConsent::new(ConsentDecision::Declined));
	let ui_source = RecordingSource::default();
	let boundary_source = RecordingSource::default();
	pipeline
		.configure(test_config(), &ui_source, &boundary_source)
		.unwrap();

	boundary_source.fire(FaultRecord::new("app::Panic", "boom", "  at app::main"));

	let store = inspector(&tmp);
	let pending = store.list().unwrap();
	assert_eq!(pending.len(), 1);
	let text = store.read(&pending[0]).unwrap();
	assert!(text.contains("app::Panic: boom"));
	assert!(text.contains("Origin: default-fault-boundary"));
}

#[tokio::test]
async fn custom_handler_replaces_default_persistence() {
	let tmp = TempDir::new().unwrap();
	let (uploader, _calls) = ScriptedUploader::all(UploadOutcome::Delivered);
	let pipeline = pipeline_with(&tmp, uploader, ScriptedConsent::new(ConsentDecision::Declined));
	let ui_source = RecordingSource::default();
	let boundary_source = RecordingSource::default();

	let seen: Arc<Mutex<Vec<FaultRecord>>> = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&seen);
	let config = PipelineConfig::builder("abc123", "Example App", "Example Corp")
		.ui_thread_handler(Arc::new(move |fault| {
			sink.lock().unwrap().push(fault);
		}))
		.build();
	pipeline.configure(config, &ui_source, &boundary_source).unwrap();

	ui_source.fire(FaultRecord::new("app::Panic", "boom", ""));

	assert_eq!(seen.lock().unwrap().len(), 1);
	assert!(inspector(&tmp).list().unwrap().is_empty());
}
