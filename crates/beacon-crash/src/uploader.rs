// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Transmitting one pending report to the collection endpoint.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};
use beacon_crash_core::ReporterIdentity;

/// SDK name for identification.
const SDK_NAME: &str = "beacon-crash-rust";
/// SDK version for identification.
const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default transport timeout; expiry classifies as a transient failure.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How one upload attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
	/// The endpoint acknowledged the report; it can be deleted.
	Delivered,
	/// Transport-level failure (connect, send/receive, timeout). The
	/// report is kept and resubmitted on a later pipeline run; there is no
	/// in-process retry loop.
	TransientFailure,
	/// The endpoint answered with a non-success status. Retrying will not
	/// help; the report is discarded.
	PermanentFailure,
}

/// Sends one report and classifies the outcome.
///
/// Reports are independent; implementations are called concurrently, one
/// call per pending report.
#[async_trait]
pub trait ReportUploader: Send + Sync {
	async fn upload(&self, report_text: &str, identity: Option<&ReporterIdentity>)
		-> UploadOutcome;
}

/// HTTP uploader posting form-encoded reports to the collection endpoint.
pub struct UploadClient {
	http: reqwest::Client,
	endpoint: String,
}

impl UploadClient {
	/// `base_url` is the collection host, `app_id` the application
	/// identifier it routes on.
	pub fn new(base_url: &str, app_id: &str) -> Result<Self> {
		Self::with_timeout(base_url, app_id, DEFAULT_TIMEOUT)
	}

	pub fn with_timeout(base_url: &str, app_id: &str, timeout: Duration) -> Result<Self> {
		let base_url = base_url.trim_end_matches('/');
		let http = beacon_common_http::builder()
			.timeout(timeout)
			.build()
			.map_err(PipelineError::Transport)?;

		Ok(Self {
			http,
			endpoint: format!("{base_url}/api/2/apps/{app_id}/crashes"),
		})
	}

	/// The resolved endpoint URL.
	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	fn form_fields<'a>(
		report_text: &'a str,
		identity: Option<&'a ReporterIdentity>,
	) -> Vec<(&'static str, &'a str)> {
		let mut fields = vec![
			("raw", report_text),
			("sdk", SDK_NAME),
			("sdk_version", SDK_VERSION),
		];

		if let Some(identity) = identity {
			if let Some(name) = non_empty(identity.name.as_deref()) {
				fields.push(("userID", name));
			}
			if let Some(contact) = non_empty(identity.contact.as_deref()) {
				fields.push(("contact", contact));
			}
			if let Some(comments) = non_empty(identity.comments.as_deref()) {
				fields.push(("description", comments));
			}
		}

		fields
	}
}

fn non_empty(value: Option<&str>) -> Option<&str> {
	value.filter(|v| !v.is_empty())
}

#[async_trait]
impl ReportUploader for UploadClient {
	async fn upload(
		&self,
		report_text: &str,
		identity: Option<&ReporterIdentity>,
	) -> UploadOutcome {
		let fields = Self::form_fields(report_text, identity);

		match self.http.post(&self.endpoint).form(&fields).send().await {
			Ok(response) if response.status().is_success() => {
				debug!(status = %response.status(), "crash report delivered");
				UploadOutcome::Delivered
			}
			Ok(response) => {
				warn!(
					status = %response.status(),
					"collection endpoint rejected crash report; discarding"
				);
				UploadOutcome::PermanentFailure
			}
			Err(e) => {
				warn!(
					error = %e,
					"transport failure while uploading crash report; keeping for retry"
				);
				UploadOutcome::TransientFailure
			}
		}
	}
}
