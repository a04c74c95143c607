//! Output formatting for coverage records.

use std::fmt::Write;

use crate::error::{ApexcovError, Result};
use crate::model::CoverageRecord;

/// Column names of the CSV output, in order.
pub const CSV_HEADER: [&str; 6] = [
    "classid",
    "classname",
    "nblinescovered",
    "nblinesuncovered",
    "coverage",
    "progress",
];

/// How a finished report is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// The records as a JSON array.
    Structured,
    /// Comma-delimited text.
    Csv,
}

impl OutputMode {
    /// `"csv"` selects CSV; any other value falls back to structured output.
    pub fn from_flag(flag: &str) -> Self {
        if flag == "csv" {
            OutputMode::Csv
        } else {
            OutputMode::Structured
        }
    }

    pub fn formatter(&self) -> &'static dyn ReportFormatter {
        match self {
            OutputMode::Structured => &JsonFormatter,
            OutputMode::Csv => &CsvFormatter,
        }
    }
}

/// Trait for formatting a set of coverage records.
pub trait ReportFormatter {
    fn format(&self, records: &[CoverageRecord]) -> Result<String>;
}

/// Comma-delimited text. Values are written as-is with no quoting.
pub struct CsvFormatter;

impl ReportFormatter for CsvFormatter {
    fn format(&self, records: &[CoverageRecord]) -> Result<String> {
        if records.is_empty() {
            return Err(ApexcovError::EmptyReport);
        }

        let mut out = String::new();
        writeln!(out, "{}", CSV_HEADER.join(",")).unwrap();
        for r in records {
            writeln!(
                out,
                "{},{},{},{},{}%,{}",
                r.class_id,
                r.class_name,
                r.lines_covered,
                r.lines_uncovered,
                r.coverage_percent,
                r.progress_bar
            )
            .unwrap();
        }
        Ok(out)
    }
}

/// Pretty-printed JSON array of records.
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, records: &[CoverageRecord]) -> Result<String> {
        let mut out = serde_json::to_string_pretty(records)?;
        out.push('\n');
        Ok(out)
    }
}

/// Render records in the given mode.
pub fn render(records: &[CoverageRecord], mode: OutputMode) -> Result<String> {
    mode.formatter().format(records)
}

/// Render records as CSV. Fails with `EmptyReport` when there is nothing to render.
pub fn to_csv(records: &[CoverageRecord]) -> Result<String> {
    CsvFormatter.format(records)
}

/// Render records as a JSON array.
pub fn to_json(records: &[CoverageRecord]) -> Result<String> {
    JsonFormatter.format(records)
}
