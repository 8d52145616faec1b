//! Error types for the portable-IR driver.

use std::path::PathBuf;

use thiserror::Error;

/// Failures in the driver and its services.
///
/// Command-line and setup errors abort the run; per-kernel failures are
/// counted by the runner and reported in the summary instead.
#[derive(Debug, Error)]
pub enum SpirError {
    /// The command line did not match the documented grammar.
    #[error("command line error: {0}")]
    CmdLine(String),

    /// The requested sub-suite name is not in the suite table.
    #[error("unknown sub-suite {0:?}")]
    UnknownSuite(String),

    /// A bundle file (kernel source, IR binary, or side table) is missing
    /// or unreadable.
    #[error("cannot load {path}: {source}")]
    Bundle {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A side-table row does not have the expected column count.
    #[error("malformed row {line} in {path}: expected at least {expected} columns")]
    Csv { path: PathBuf, line: usize, expected: usize },

    /// A program build/compile/link step failed; carries the vendor log.
    #[error("{stage} failed with status {code}:\n{log}")]
    Build { stage: &'static str, code: i32, log: String },

    /// A native API call returned a non-success status code.
    #[error("{call} returned non-success status {code}")]
    Api { call: &'static str, code: i32 },

    #[error(transparent)]
    DataGen(#[from] clcts_datagen::DataGenError),

    #[error(transparent)]
    Harness(#[from] clcts_harness::HarnessError),
}

pub type Result<T> = std::result::Result<T, SpirError>;

impl SpirError {
    pub fn api(call: &'static str, code: i32) -> Self {
        Self::Api { call, code }
    }
}
