// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Report identifiers and user-supplied reporter details.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, OnceLock};
use uuid::{ContextV7, Timestamp, Uuid};

static REPORT_ID_CONTEXT: OnceLock<Mutex<ContextV7>> = OnceLock::new();

/// Unique identifier of a persisted crash report.
///
/// UUID v7: time-ordered, so lexicographic order of ids (and of the
/// filenames derived from them) is creation order. The shared context keeps
/// ids monotonic even when several are allocated within one millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReportId(pub Uuid);

impl ReportId {
	pub fn new() -> Self {
		let context = REPORT_ID_CONTEXT.get_or_init(|| Mutex::new(ContextV7::new()));
		Self(Uuid::new_v7(Timestamp::now(context)))
	}
}

impl Default for ReportId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for ReportId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for ReportId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

/// Contact details a user may attach to a consented crash report.
///
/// Attached after persistence, never written to disk with the report; empty
/// fields are omitted from the outbound payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporterIdentity {
	pub name: Option<String>,
	pub contact: Option<String>,
	pub comments: Option<String>,
}
