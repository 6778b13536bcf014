//! Patch report rendering.
//!
//! The text format is the compatibility contract between implementations:
//!
//! ```text
//! # Results for 2024-01-31 18:02:11
//! # Reconciled 'dir_a' 'dir_b'
//! dir_a
//! + new.txt (2024-01-30 09:00:00 | 12 bytes)
//! ! shared.txt (2024-01-29 10:11:12 | 40 bytes)
//!
//! dir_b
//! ! shared.txt (2024-01-31 08:00:00 | 44 bytes)
//!
//! ```
//!
//! Within a section the entries of all categories are merged and sorted by
//! relative path.

use std::io::Write;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local, Utc};
use itertools::Itertools;
use serde::Serialize;
use strum::{Display, EnumString};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use dirpatch_core::{FileRecord, FingerprintKind};

use crate::error::PatchError;
use crate::reconcile::{Change, PatchSet, Reconciliation};

/// Default report file name, relative to the working directory.
pub const DEFAULT_PATCH_FILE: &str = "reference.patch";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Time zone used to render timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TimestampZone {
    /// The machine's local time zone.
    #[default]
    Local,
    /// UTC, for output that does not depend on the machine.
    Utc,
}

impl TimestampZone {
    /// Render a timestamp as `YYYY-MM-DD HH:MM:SS`.
    pub fn format(self, time: SystemTime) -> String {
        match self {
            Self::Local => DateTime::<Local>::from(time)
                .format(TIMESTAMP_FORMAT)
                .to_string(),
            Self::Utc => DateTime::<Utc>::from(time).format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Output format of the persisted report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PatchFormat {
    /// Canonical line-oriented report.
    #[default]
    Text,
    /// Machine-readable JSON with the same content and ordering.
    Json,
}

/// One rendered entry of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchLine<'a> {
    pub change: Change,
    pub record: &'a FileRecord,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    fingerprint: FingerprintKind,
    directory_a: &'a str,
    directory_b: &'a str,
    sections: [JsonSection<'a>; 2],
}

#[derive(Serialize)]
struct JsonSection<'a> {
    directory: &'a str,
    entries: Vec<JsonEntry<'a>>,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    change: Change,
    path: &'a str,
    fingerprint: &'a str,
    size_bytes: u64,
    modified_at: String,
    modified_secs: f64,
}

/// Renders a [`Reconciliation`] into a patch report.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchWriter {
    ignore_unchanged: bool,
    zone: TimestampZone,
    format: PatchFormat,
}

impl PatchWriter {
    /// Create a writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave `=` entries out of the report.
    pub fn with_ignore_unchanged(mut self, ignore: bool) -> Self {
        self.ignore_unchanged = ignore;
        self
    }

    /// Time zone for all rendered timestamps.
    pub fn with_zone(mut self, zone: TimestampZone) -> Self {
        self.zone = zone;
        self
    }

    /// Output format.
    pub fn with_format(mut self, format: PatchFormat) -> Self {
        self.format = format;
        self
    }

    /// Entries of one side to report, sorted by relative path.
    pub fn lines<'a>(&self, set: &PatchSet<'a>) -> Vec<PatchLine<'a>> {
        set.entries()
            .filter(|(change, _)| !(self.ignore_unchanged && *change == Change::Unchanged))
            .map(|(change, record)| PatchLine { change, record })
            .sorted_by(|x, y| x.record.relative_path.cmp(&y.record.relative_path))
            .collect()
    }

    /// `<path> (<modified> | <size> bytes)`
    pub fn render_record(&self, record: &FileRecord) -> String {
        format!(
            "{} ({} | {} bytes)",
            record.relative_path,
            self.zone.format(record.modified_at),
            record.size_bytes
        )
    }

    /// `<symbol> <record>`
    pub fn render_line(&self, line: &PatchLine<'_>) -> String {
        format!("{} {}", line.change.symbol(), self.render_record(line.record))
    }

    /// Header line, one line per entry, then a blank line.
    pub fn render_section(&self, directory: &str, set: &PatchSet<'_>) -> String {
        let mut out = String::new();
        out.push_str(directory);
        out.push('\n');
        for line in self.lines(set) {
            out.push_str(&self.render_line(&line));
            out.push('\n');
        }
        out.push('\n');
        out
    }

    /// Render the full report in the configured format.
    pub fn render(
        &self,
        dir_a: &str,
        dir_b: &str,
        outcome: &Reconciliation<'_>,
        generated_at: SystemTime,
    ) -> Result<String, PatchError> {
        match self.format {
            PatchFormat::Text => Ok(self.render_text(dir_a, dir_b, outcome, generated_at)),
            PatchFormat::Json => self.render_json(dir_a, dir_b, outcome, generated_at),
        }
    }

    fn render_text(
        &self,
        dir_a: &str,
        dir_b: &str,
        outcome: &Reconciliation<'_>,
        generated_at: SystemTime,
    ) -> String {
        let mut out = format!(
            "# Results for {}\n# Reconciled '{dir_a}' '{dir_b}'\n",
            self.zone.format(generated_at)
        );
        out.push_str(&self.render_section(dir_a, &outcome.a));
        out.push_str(&self.render_section(dir_b, &outcome.b));
        out
    }

    fn render_json(
        &self,
        dir_a: &str,
        dir_b: &str,
        outcome: &Reconciliation<'_>,
        generated_at: SystemTime,
    ) -> Result<String, PatchError> {
        let report = JsonReport {
            generated_at: self.zone.format(generated_at),
            fingerprint: outcome.fingerprint,
            directory_a: dir_a,
            directory_b: dir_b,
            sections: [
                self.json_section(dir_a, &outcome.a),
                self.json_section(dir_b, &outcome.b),
            ],
        };

        let mut json = serde_json::to_string_pretty(&report)?;
        json.push('\n');
        Ok(json)
    }

    fn json_section<'a>(&self, directory: &'a str, set: &PatchSet<'a>) -> JsonSection<'a> {
        JsonSection {
            directory,
            entries: self
                .lines(set)
                .into_iter()
                .map(|line| JsonEntry {
                    change: line.change,
                    path: line.record.relative_path.as_str(),
                    fingerprint: &line.record.fingerprint,
                    size_bytes: line.record.size_bytes,
                    modified_at: self.zone.format(line.record.modified_at),
                    modified_secs: line.record.modified_secs(),
                })
                .collect(),
        }
    }

    /// Render and persist the report.
    ///
    /// The report is written to a temporary file next to `destination` and
    /// renamed into place, so a failure never leaves a partial report.
    pub fn write(
        &self,
        destination: &Path,
        dir_a: &str,
        dir_b: &str,
        outcome: &Reconciliation<'_>,
        generated_at: SystemTime,
    ) -> Result<(), PatchError> {
        let body = self.render(dir_a, dir_b, outcome, generated_at)?;

        let parent = destination
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        let mut staged = NamedTempFile::new_in(parent).map_err(|e| PatchError::io(parent, e))?;
        debug!(staged = %staged.path().display(), "Staging patch report");

        staged
            .write_all(body.as_bytes())
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|e| PatchError::io(staged.path(), e))?;

        staged
            .persist(destination)
            .map_err(|e| PatchError::io(destination, e.error))?;

        info!(
            path = %destination.display(),
            bytes = body.len(),
            format = %self.format,
            "Wrote patch report"
        );
        Ok(())
    }
}
