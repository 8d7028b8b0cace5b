// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Canonical plain-text rendering of a crash report.
//!
//! The collection endpoint parses these reports line by line, so the header
//! key order and the body markers are fixed wire format, not presentation.

use chrono::SecondsFormat;

use crate::environment::EnvironmentSnapshot;
use crate::fault::FaultRecord;

/// Substituted for an empty fault message.
const NO_REASON: &str = "No reason";
/// Substituted for an empty stack trace.
const UNKNOWN_LOCATION: &str = "  at unknown location";
/// Marker line introducing the causing fault's trace.
const INNER_MARKER: &str = "Inner Exception";

/// Optional knobs for [`format_report`].
#[derive(Debug, Clone, Default)]
pub struct FormatOptions {
	/// Overrides the snapshot's package identifier in the `Package` header.
	pub package: Option<String>,
	/// Extra header line appended after `Date`, e.g. a capture-origin
	/// marker or caller-supplied context.
	pub annotation: Option<String>,
}

/// Renders a fault and its environment snapshot as a crash report.
///
/// Pure function of its inputs: one `Key: Value` header block, one blank
/// line, one body block, trailing whitespace trimmed. Identical inputs give
/// identical output.
pub fn format_report(
	fault: &FaultRecord,
	env: &EnvironmentSnapshot,
	opts: &FormatOptions,
) -> String {
	let mut report = String::new();

	let package = opts.package.as_deref().unwrap_or(&env.package);
	report.push_str(&format!("Package: {package}\n"));
	report.push_str(&format!("Version: {}\n", env.app_version));
	report.push_str(&format!("OS: {}\n", env.os_version));
	report.push_str(&format!("Runtime Version: {}\n", env.runtime_version));
	report.push_str(&format!("OS Language: {}\n", env.language));
	report.push_str(&format!("OS Bitness: {}\n", env.bitness));
	report.push_str(&format!(
		"Date: {}\n",
		env.captured_at.to_rfc3339_opts(SecondsFormat::Micros, true)
	));
	if let Some(annotation) = opts.annotation.as_deref() {
		report.push_str(annotation);
		report.push('\n');
	}

	report.push('\n');

	let message = if fault.message.is_empty() {
		NO_REASON
	} else {
		&fault.message
	};
	report.push_str(&format!("{}: {message}\n", fault.type_name));
	if fault.trace.is_empty() {
		report.push_str(UNKNOWN_LOCATION);
	} else {
		report.push_str(&fault.trace);
	}

	if let Some(inner) = fault.inner_trace.as_deref() {
		if !inner.is_empty() {
			report.push_str("\n\n");
			report.push_str(INNER_MARKER);
			report.push('\n');
			report.push_str(inner);
		}
	}

	report.trim_end().to_string()
}
