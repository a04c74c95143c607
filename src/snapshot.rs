//! Offline data source: a JSON file holding a class listing and the
//! coverage counts for each class.
//!
//! ```json
//! {
//!   "classes": [{"id": "01p1", "fullName": "AccountService"}],
//!   "coverage": {"01p1": {"NumLinesCovered": 80, "NumLinesUncovered": 20}}
//! }
//! ```
//!
//! A class absent from `coverage` has no record. A class mapped to `null`
//! stands for a lookup that failed when the snapshot was taken.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ApexcovError, Result};
use crate::model::{ClassDescriptor, CoverageCounts};
use crate::source::{ClassSource, CoverageSource};

#[derive(Debug, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub classes: Vec<ClassDescriptor>,
    #[serde(default)]
    pub coverage: HashMap<String, Option<CoverageCounts>>,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read(path)?;
        Self::from_slice(&content)
    }

    pub fn from_slice(input: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(input)?)
    }
}

impl ClassSource for Snapshot {
    fn list_classes(&self) -> Result<Vec<ClassDescriptor>> {
        Ok(self.classes.clone())
    }
}

impl CoverageSource for Snapshot {
    fn lookup(&self, class_id: &str) -> Result<Option<CoverageCounts>> {
        match self.coverage.get(class_id) {
            Some(Some(counts)) => Ok(Some(*counts)),
            Some(None) => Err(ApexcovError::LookupFailed(class_id.to_string())),
            None => Ok(None),
        }
    }
}
