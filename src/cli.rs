//! Command handler functions for the apexcov CLI.
//!
//! Handlers return their output as a `String`; `main` decides where it goes.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::join;
use crate::model::ReportSummary;
use crate::report::{self, OutputMode};
use crate::salesforce::{Org, OrgConfig};
use crate::snapshot::Snapshot;
use crate::source::{ClassSource, CoverageSource};

/// Build the coverage report from the given sources and render it.
pub fn cmd_report(
    classes: &dyn ClassSource,
    coverage: &dyn CoverageSource,
    mode: OutputMode,
) -> Result<String> {
    let records = join::generate(classes, coverage).context("Failed to list classes")?;

    let summary = ReportSummary::from_records(&records);
    info!(
        classes = summary.classes,
        covered = summary.covered_lines,
        uncovered = summary.uncovered_lines,
        percent = summary.percent(),
        no_data = summary.no_data,
        lookup_errors = summary.lookup_errors,
        "coverage report built"
    );

    let out = report::render(&records, mode)?;
    Ok(out)
}

/// Report from a snapshot file.
pub fn cmd_report_snapshot(path: &Path, mode: OutputMode) -> Result<String> {
    let snapshot = Snapshot::load(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    cmd_report(&snapshot, &snapshot, mode)
}

/// Report from a live org.
pub fn cmd_report_org(config: OrgConfig, mode: OutputMode) -> Result<String> {
    let org = Org::connect(config).context("Failed to configure org connection")?;
    cmd_report(&org, &org, mode)
}
