//! JSON results report, mirroring the original harness's
//! `saveResultsToJson` side output.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::status::{RunSummary, TestStatus};

/// Serializable view of one run.
#[derive(Debug, Serialize)]
pub struct ResultsReport<'a> {
    pub suite: &'a str,
    /// Test name to `pass|fail|skip`, sorted for stable diffs.
    pub results: BTreeMap<&'a str, TestStatus>,
}

impl<'a> ResultsReport<'a> {
    pub fn new(suite: &'a str, summary: &'a RunSummary) -> Self {
        let results = summary
            .outcomes()
            .iter()
            .map(|o| (o.name.as_str(), o.status))
            .collect();
        Self { suite, results }
    }

    /// Write the report as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        info!(path = %path.display(), "wrote results report");
        Ok(())
    }
}
