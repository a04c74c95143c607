//! Joining the reportable classes to their coverage counts.

use tracing::{debug, warn};

use crate::error::Result;
use crate::filter;
use crate::model::{ClassDescriptor, CoverageRecord, CoverageStatus};
use crate::source::{ClassSource, CoverageSource};

/// Build one record per class, in class order.
///
/// Lookups run one at a time. A failed lookup is logged and produces a
/// zeroed record marked `LookupError`; it never aborts the report.
pub fn build_records(
    classes: &[ClassDescriptor],
    source: &dyn CoverageSource,
) -> Vec<CoverageRecord> {
    let mut records = Vec::with_capacity(classes.len());

    for class in classes {
        let record = match source.lookup(&class.id) {
            Ok(Some(counts)) => {
                debug!(
                    class = %class.full_name,
                    covered = counts.covered,
                    uncovered = counts.uncovered,
                    "coverage found"
                );
                CoverageRecord::from_counts(class, counts)
            }
            Ok(None) => {
                debug!(class = %class.full_name, "no coverage record");
                CoverageRecord::missing(class, CoverageStatus::NoData)
            }
            Err(e) => {
                warn!(class = %class.full_name, id = %class.id, error = %e, "coverage lookup failed");
                CoverageRecord::missing(class, CoverageStatus::LookupError)
            }
        };
        records.push(record);
    }

    records
}

/// List classes, drop test classes, and join the rest to their coverage.
/// Only a failure to list classes is returned as an error.
pub fn generate(
    classes: &dyn ClassSource,
    coverage: &dyn CoverageSource,
) -> Result<Vec<CoverageRecord>> {
    let listing = classes.list_classes()?;
    let total = listing.len();
    let reportable = filter::reportable_classes(listing);
    debug!(
        listed = total,
        reportable = reportable.len(),
        "filtered class listing"
    );
    Ok(build_records(&reportable, coverage))
}
