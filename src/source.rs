//! The two data sources a report is built from. The org client and the
//! snapshot file both implement these.

use crate::error::Result;
use crate::model::{ClassDescriptor, CoverageCounts};

/// Supplies the universe of classes, in listing order.
pub trait ClassSource {
    fn list_classes(&self) -> Result<Vec<ClassDescriptor>>;
}

/// Looks up line counts for a single class.
pub trait CoverageSource {
    /// `Ok(None)` means the source has no coverage record for the class.
    /// When several records exist, the first one wins.
    fn lookup(&self, class_id: &str) -> Result<Option<CoverageCounts>>;
}
