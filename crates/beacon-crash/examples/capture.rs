// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: wire the Beacon crash pipeline into a host application.
//!
//! Run with:
//!   cargo run --example capture -p beacon-crash

use std::sync::{Arc, Mutex};

use beacon_crash::{
	ConsentDecision, ConsentPrompt, ConsentProvider, CrashLogStore, CrashPipeline,
	DefaultBoundaryFaultSource, FaultHandler, FaultRecord, HostEnvironment, PipelineConfig,
	ReporterIdentity, SweepOutcome, UiThreadFaultSource, UploadClient,
};

/// Stand-in for a host event loop that lets us trip a fault by hand.
#[derive(Default)]
struct ManualFaultSource {
	handler: Mutex<Option<FaultHandler>>,
}

impl ManualFaultSource {
	fn fire(&self, fault: FaultRecord) {
		if let Some(handler) = &*self.handler.lock().unwrap() {
			handler(fault);
		}
	}
}

impl UiThreadFaultSource for ManualFaultSource {
	fn register(&self, handler: FaultHandler) {
		*self.handler.lock().unwrap() = Some(handler);
	}
}

impl DefaultBoundaryFaultSource for ManualFaultSource {
	fn register(&self, handler: FaultHandler) {
		*self.handler.lock().unwrap() = Some(handler);
	}
}

/// Consent provider that always accepts and fills in contact details.
struct AlwaysAccept;

impl ConsentProvider for AlwaysAccept {
	fn review(&self, prompt: ConsentPrompt<'_>) -> ConsentDecision {
		println!(
			"{} by {} wants to send a crash report:\n---\n{}\n---",
			prompt.app_name, prompt.developer_name, prompt.report_text
		);
		ConsentDecision::Accepted(ReporterIdentity {
			name: Some("example-user".to_string()),
			contact: Some("user@example.com".to_string()),
			comments: Some("sent from the capture example".to_string()),
		})
	}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "beacon_crash=debug".into()),
		)
		.init();

	let app_id = std::env::var("BEACON_APP_ID").unwrap_or_else(|_| "abc123".to_string());
	let base_url = std::env::var("BEACON_BASE_URL")
		.unwrap_or_else(|_| "https://collector.example.com".to_string());

	println!("Initializing crash pipeline...");
	println!("  Base URL: {}", base_url);
	println!("  App ID: {}", app_id);

	let pipeline = Arc::new(
		CrashPipeline::builder()
			.store(CrashLogStore::from_xdg(&app_id)?)
			.uploader(UploadClient::new(&base_url, &app_id)?)
			.consent(AlwaysAccept)
			.environment(HostEnvironment::new("com.example.demo", "0.1.0"))
			.build()?,
	);

	let ui_source = ManualFaultSource::default();
	let boundary_source = ManualFaultSource::default();

	pipeline.configure(
		PipelineConfig::builder(&app_id, "Beacon Demo", "Example Corp")
			.tag_default_boundary(true)
			.build(),
		&ui_source,
		&boundary_source,
	)?;

	// Trip a fault the way a host's worker thread would.
	println!("\nTripping a demo fault...");
	boundary_source.fire(
		FaultRecord::new(
			"demo::WorkerError",
			"connection pool exhausted",
			"  at demo::pool::acquire\n  at demo::worker::run",
		)
		.with_inner_trace("  at demo::pool::grow"),
	);

	// What a host does on its next startup: sweep the pending reports.
	println!("Sweeping pending reports...");
	match pipeline.handle_pending(false).await {
		SweepOutcome::Dispatched(dispatch) => {
			for disposition in dispatch.settle().await {
				println!(
					"  {} -> {:?} (removed: {})",
					disposition.report.filename, disposition.outcome, disposition.removed
				);
			}
		}
		other => println!("  sweep ended: {other:?}"),
	}

	Ok(())
}
