// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The consent seam: the pipeline asks, the host decides.

use beacon_crash_core::ReporterIdentity;

/// What the host shows the user when asking whether to send a report.
///
/// `report_text` is the raw stored report, presented as-is.
#[derive(Debug, Clone, Copy)]
pub struct ConsentPrompt<'a> {
	pub report_text: &'a str,
	pub app_name: &'a str,
	pub developer_name: &'a str,
}

/// The human decision on a pending report batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentDecision {
	/// Do not send; the pending batch is discarded.
	Declined,
	/// Send, optionally with contact details to attach to every upload.
	Accepted(ReporterIdentity),
}

/// External collaborator that obtains the user's decision.
///
/// Synchronous from the pipeline's point of view; a UI host typically
/// blocks on a modal dialog here.
pub trait ConsentProvider: Send + Sync {
	fn review(&self, prompt: ConsentPrompt<'_>) -> ConsentDecision;
}
