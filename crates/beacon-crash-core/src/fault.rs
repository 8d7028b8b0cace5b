// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The immutable facts of an unhandled fault.

use serde::{Deserialize, Serialize};

/// A fault that escaped every handler in the host application.
///
/// Captured once, never mutated; consumed only by the report formatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultRecord {
	/// Concrete fault type, e.g. "std::io::Error" or an exception class name.
	pub type_name: String,
	/// Human-readable description; may be empty.
	pub message: String,
	/// Rendered stack trace; may be empty when unwind info is unavailable.
	pub trace: String,
	/// Rendered trace of the causing fault, when one exists.
	pub inner_trace: Option<String>,
}

impl FaultRecord {
	pub fn new(
		type_name: impl Into<String>,
		message: impl Into<String>,
		trace: impl Into<String>,
	) -> Self {
		Self {
			type_name: type_name.into(),
			message: message.into(),
			trace: trace.into(),
			inner_trace: None,
		}
	}

	/// Attaches the rendered trace of the causing fault.
	pub fn with_inner_trace(mut self, trace: impl Into<String>) -> Self {
		self.inner_trace = Some(trace.into());
		self
	}

	/// Builds a record from a host error value.
	///
	/// Rust errors carry no rendered stack trace, so `trace` is left empty
	/// and the formatter substitutes its unknown-location marker. The
	/// error's source, when present, becomes the inner-fault section.
	pub fn from_error<E>(error: &E) -> Self
	where
		E: std::error::Error + ?Sized,
	{
		Self {
			type_name: std::any::type_name_of_val(error).to_string(),
			message: error.to_string(),
			trace: String::new(),
			inner_trace: error.source().map(|source| source.to_string()),
		}
	}
}
