//! Uniform in-memory representation of per-class coverage, independent of
//! where the data came from. Sources produce `ClassDescriptor`s and
//! `CoverageCounts`; the joiner turns them into `CoverageRecord`s.

use serde::{Deserialize, Serialize};

use crate::error::{ApexcovError, Result};

/// Number of cells in a rendered progress bar (brackets excluded).
pub const PROGRESS_CELLS: usize = 10;

/// Compute a whole-number coverage percentage, rounding half up.
/// Returns 0 when there are no lines at all.
#[must_use]
pub fn coverage_percent(covered: u64, uncovered: u64) -> u8 {
    let covered = u128::from(covered);
    let total = covered + u128::from(uncovered);
    if total == 0 {
        return 0;
    }
    // floor((100c / t) + 1/2) without going through floating point
    let pct = (200 * covered + total) / (2 * total);
    pct.min(100) as u8
}

/// Number of `#` cells for a percentage, rounding half up.
#[must_use]
pub fn filled_cells(percent: u8) -> usize {
    (usize::from(percent.min(100)) * PROGRESS_CELLS + 50) / 100
}

/// Render a fixed-width bar such as `[########  ]`.
#[must_use]
pub fn progress_bar(percent: u8) -> String {
    let filled = filled_cells(percent);
    format!(
        "[{}{}]",
        "#".repeat(filled),
        " ".repeat(PROGRESS_CELLS - filled)
    )
}

/// A class as reported by the metadata listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    pub id: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
}

impl ClassDescriptor {
    pub fn new(id: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
        }
    }
}

/// Raw line counts for one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoverageCounts {
    #[serde(rename = "NumLinesCovered")]
    pub covered: u64,
    #[serde(rename = "NumLinesUncovered")]
    pub uncovered: u64,
}

impl CoverageCounts {
    pub fn new(covered: u64, uncovered: u64) -> Self {
        Self { covered, uncovered }
    }

    /// Build counts from signed values as they arrive off the wire,
    /// rejecting anything negative.
    pub fn try_new(covered: i64, uncovered: i64) -> Result<Self> {
        match (u64::try_from(covered), u64::try_from(uncovered)) {
            (Ok(c), Ok(u)) => Ok(Self::new(c, u)),
            _ => Err(ApexcovError::NegativeLineCount { covered, uncovered }),
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.covered.saturating_add(self.uncovered)
    }
}

/// Percentage and bar derived from a set of counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coverage {
    pub percent: u8,
    pub progress: String,
}

impl Coverage {
    #[must_use]
    pub fn compute(counts: CoverageCounts) -> Self {
        let percent = coverage_percent(counts.covered, counts.uncovered);
        Self {
            percent,
            progress: progress_bar(percent),
        }
    }

    /// The value used when no counts could be obtained.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            percent: 0,
            progress: progress_bar(0),
        }
    }
}

/// Where a record's numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CoverageStatus {
    /// Counts were returned by the coverage source.
    Ok,
    /// The source had no coverage record for the class.
    NoData,
    /// The lookup itself failed.
    LookupError,
}

impl CoverageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageStatus::Ok => "ok",
            CoverageStatus::NoData => "noData",
            CoverageStatus::LookupError => "lookupError",
        }
    }
}

impl std::fmt::Display for CoverageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the coverage report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageRecord {
    #[serde(rename = "classid")]
    pub class_id: String,
    #[serde(rename = "classname")]
    pub class_name: String,
    #[serde(rename = "nblinescovered")]
    pub lines_covered: u64,
    #[serde(rename = "nblinesuncovered")]
    pub lines_uncovered: u64,
    #[serde(rename = "coverage")]
    pub coverage_percent: u8,
    #[serde(rename = "progress")]
    pub progress_bar: String,
    pub status: CoverageStatus,
}

impl CoverageRecord {
    /// Build a record for a class whose counts were found.
    pub fn from_counts(class: &ClassDescriptor, counts: CoverageCounts) -> Self {
        let coverage = Coverage::compute(counts);
        Self {
            class_id: class.id.clone(),
            class_name: class.full_name.clone(),
            lines_covered: counts.covered,
            lines_uncovered: counts.uncovered,
            coverage_percent: coverage.percent,
            progress_bar: coverage.progress,
            status: CoverageStatus::Ok,
        }
    }

    /// Build a zeroed record for a class without usable counts.
    pub fn missing(class: &ClassDescriptor, status: CoverageStatus) -> Self {
        let coverage = Coverage::empty();
        Self {
            class_id: class.id.clone(),
            class_name: class.full_name.clone(),
            lines_covered: 0,
            lines_uncovered: 0,
            coverage_percent: coverage.percent,
            progress_bar: coverage.progress,
            status,
        }
    }
}

/// Totals across a whole report.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub classes: usize,
    pub covered_lines: u64,
    pub uncovered_lines: u64,
    pub no_data: usize,
    pub lookup_errors: usize,
}

impl ReportSummary {
    pub fn from_records(records: &[CoverageRecord]) -> Self {
        let mut summary = Self {
            classes: records.len(),
            ..Default::default()
        };
        for r in records {
            summary.covered_lines = summary.covered_lines.saturating_add(r.lines_covered);
            summary.uncovered_lines = summary.uncovered_lines.saturating_add(r.lines_uncovered);
            match r.status {
                CoverageStatus::Ok => {}
                CoverageStatus::NoData => summary.no_data += 1,
                CoverageStatus::LookupError => summary.lookup_errors += 1,
            }
        }
        summary
    }

    #[must_use]
    pub fn percent(&self) -> u8 {
        coverage_percent(self.covered_lines, self.uncovered_lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_percent_no_lines() {
        assert_eq!(coverage_percent(0, 0), 0);
        assert_eq!(progress_bar(0), "[          ]");
    }

    #[test]
    fn test_coverage_percent_rounds_half_up() {
        assert_eq!(coverage_percent(80, 20), 80);
        assert_eq!(coverage_percent(1, 7), 13); // 12.5
        assert_eq!(coverage_percent(1, 2), 33);
        assert_eq!(coverage_percent(2, 1), 67);
        assert_eq!(coverage_percent(1, 199), 1); // 0.5
        assert_eq!(coverage_percent(1, 200), 0); // 0.4975
    }

    #[test]
    fn test_coverage_percent_bounds() {
        assert_eq!(coverage_percent(0, 42), 0);
        assert_eq!(coverage_percent(42, 0), 100);
        assert_eq!(coverage_percent(u64::MAX, u64::MAX), 50);
        assert_eq!(coverage_percent(u64::MAX, 0), 100);
    }

    #[test]
    fn test_coverage_percent_matches_float_rounding() {
        for c in 0..60u64 {
            for u in 0..60u64 {
                if c + u == 0 {
                    continue;
                }
                let expected = (100.0 * c as f64 / (c + u) as f64 + 0.5).floor() as u8;
                assert_eq!(coverage_percent(c, u), expected, "c={c} u={u}");
            }
        }
    }

    #[test]
    fn test_progress_bar_shape() {
        for pct in 0..=100u8 {
            let bar = progress_bar(pct);
            assert_eq!(bar.len(), 12);
            assert!(bar.starts_with('[') && bar.ends_with(']'));
            let hashes = bar.chars().filter(|&c| c == '#').count();
            assert_eq!(hashes, filled_cells(pct));
        }
    }

    #[test]
    fn test_filled_cells_rounds_half_up() {
        assert_eq!(filled_cells(0), 0);
        assert_eq!(filled_cells(4), 0);
        assert_eq!(filled_cells(5), 1);
        assert_eq!(filled_cells(80), 8);
        assert_eq!(filled_cells(85), 9);
        assert_eq!(filled_cells(100), 10);
    }

    #[test]
    fn test_coverage_compute_example() {
        let c = Coverage::compute(CoverageCounts::new(80, 20));
        assert_eq!(c.percent, 80);
        assert_eq!(c.progress, "[########  ]");
    }

    #[test]
    fn test_counts_try_new_rejects_negative() {
        assert_eq!(
            CoverageCounts::try_new(3, 4).unwrap(),
            CoverageCounts::new(3, 4)
        );
        assert!(matches!(
            CoverageCounts::try_new(-1, 4),
            Err(ApexcovError::NegativeLineCount { covered: -1, uncovered: 4 })
        ));
        assert!(CoverageCounts::try_new(1, -4).is_err());
    }

    #[test]
    fn test_missing_record_is_zeroed() {
        let class = ClassDescriptor::new("01p3", "InvoiceHelper");
        let r = CoverageRecord::missing(&class, CoverageStatus::NoData);
        assert_eq!(r.lines_covered, 0);
        assert_eq!(r.lines_uncovered, 0);
        assert_eq!(r.coverage_percent, 0);
        assert_eq!(r.progress_bar, "[          ]");
        assert_eq!(r.status, CoverageStatus::NoData);
    }

    #[test]
    fn test_record_serializes_with_report_field_names() {
        let class = ClassDescriptor::new("01p1", "AccountService");
        let r = CoverageRecord::from_counts(&class, CoverageCounts::new(80, 20));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["classid"], "01p1");
        assert_eq!(json["classname"], "AccountService");
        assert_eq!(json["nblinescovered"], 80);
        assert_eq!(json["nblinesuncovered"], 20);
        assert_eq!(json["coverage"], 80);
        assert_eq!(json["progress"], "[########  ]");
        assert_eq!(json["status"], "ok");
    }

    #[test]
    fn test_summary_totals() {
        let a = ClassDescriptor::new("1", "A");
        let b = ClassDescriptor::new("2", "B");
        let c = ClassDescriptor::new("3", "C");
        let records = vec![
            CoverageRecord::from_counts(&a, CoverageCounts::new(30, 10)),
            CoverageRecord::missing(&b, CoverageStatus::NoData),
            CoverageRecord::missing(&c, CoverageStatus::LookupError),
        ];
        let s = ReportSummary::from_records(&records);
        assert_eq!(s.classes, 3);
        assert_eq!(s.covered_lines, 30);
        assert_eq!(s.uncovered_lines, 10);
        assert_eq!(s.no_data, 1);
        assert_eq!(s.lookup_errors, 1);
        assert_eq!(s.percent(), 75);
    }
}
