// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Durable, directory-backed persistence for pending crash reports.
//!
//! One file per report, `crash-<uuid>.log`. Writes land in a `.tmp` sibling
//! first and are renamed into place, so a reader never observes a truncated
//! report. Ids are time-ordered, which makes lexicographic filename order
//! creation order.
//!
//! All operations are synchronous `std::fs`: `save` runs on whichever
//! thread raised the fault and must not depend on a runtime being alive.
//! Operations are scoped per-filename, so a capture may interleave freely
//! with a delete of a different report.

use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::error::StoreError;
use beacon_crash_core::ReportId;

const FILE_PREFIX: &str = "crash-";
const FILE_SUFFIX: &str = ".log";

/// Handle to a persisted, not-yet-delivered crash report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReport {
	pub id: ReportId,
	pub filename: String,
}

/// Directory-backed store of pending crash reports.
pub struct CrashLogStore {
	dir: PathBuf,
}

impl CrashLogStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	/// Store rooted in the XDG data directory, scoped per application.
	pub fn from_xdg(app_id: &str) -> Result<Self, StoreError> {
		let data_dir = dirs::data_dir().ok_or_else(|| {
			StoreError::Io(std::io::Error::new(
				ErrorKind::NotFound,
				"could not determine XDG data directory",
			))
		})?;

		let dir = data_dir.join("beacon").join("crashes").join(app_id);
		std::fs::create_dir_all(&dir)?;

		info!(dir = %dir.display(), "initialized crash log store");

		Ok(Self::new(dir))
	}

	/// Persists a report as one unit and returns its fresh id.
	///
	/// The directory is created on demand. In the capture path callers
	/// absorb a failure here: the report is lost, the host stays alive.
	pub fn save(&self, text: &str) -> Result<ReportId, StoreError> {
		std::fs::create_dir_all(&self.dir)?;

		let id = ReportId::new();
		let filename = format!("{FILE_PREFIX}{id}{FILE_SUFFIX}");
		let path = self.dir.join(&filename);
		let tmp_path = self.dir.join(format!("{filename}.tmp"));

		std::fs::write(&tmp_path, text)?;
		std::fs::rename(&tmp_path, &path)?;

		debug!(report_id = %id, path = %path.display(), "saved crash report");

		Ok(id)
	}

	/// Pending reports, oldest first. Empty means nothing is pending.
	pub fn list(&self) -> Result<Vec<PendingReport>, StoreError> {
		if !self.dir.exists() {
			return Ok(Vec::new());
		}

		let mut pending = Vec::new();
		for entry in std::fs::read_dir(&self.dir)? {
			let entry = entry?;
			let filename = entry.file_name();
			let Some(filename) = filename.to_str() else {
				continue;
			};
			let Some(stem) = filename
				.strip_prefix(FILE_PREFIX)
				.and_then(|rest| rest.strip_suffix(FILE_SUFFIX))
			else {
				continue;
			};
			match stem.parse::<ReportId>() {
				Ok(id) => pending.push(PendingReport {
					id,
					filename: filename.to_string(),
				}),
				Err(e) => {
					warn!(filename, error = %e, "skipping malformed crash log filename");
				}
			}
		}

		pending.sort_by(|a, b| a.id.cmp(&b.id));

		debug!(count = pending.len(), "listed pending crash reports");

		Ok(pending)
	}

	/// Reads a pending report back as text.
	pub fn read(&self, report: &PendingReport) -> Result<String, StoreError> {
		std::fs::read_to_string(self.dir.join(&report.filename)).map_err(|e| {
			if e.kind() == ErrorKind::NotFound {
				StoreError::NotFound(report.filename.clone())
			} else {
				StoreError::Io(e)
			}
		})
	}

	/// Deletes a pending report. Idempotent: deleting an already-deleted
	/// report succeeds.
	pub fn delete(&self, report: &PendingReport) -> Result<(), StoreError> {
		match std::fs::remove_file(self.dir.join(&report.filename)) {
			Ok(()) => {
				debug!(report_id = %report.id, "deleted crash report");
				Ok(())
			}
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StoreError::Io(e)),
		}
	}
}
