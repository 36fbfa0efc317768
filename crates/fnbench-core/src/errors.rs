use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::providers::AdapterError;

/// Everything that can abort a run. Configuration problems (unknown category,
/// missing or malformed data files) surface before any adapter call is made;
/// case and batch failures carry enough context (case id, category, attempt
/// count) to diagnose and resume.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("unknown test category `{0}` (neither a leaf category nor an alias)")]
    UnknownCategory(String),

    #[error("missing data file for category `{category}` at {path}")]
    MissingDataFile {
        category: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid test case at {path}:{line}")]
    DataParse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("corrupt result log at {path}:{line}")]
    CorruptLog {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage failure at {path}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("case {case_id} ({category}) failed on attempt {attempts}")]
    CaseFailed {
        case_id: String,
        category: String,
        attempts: u32,
        #[source]
        source: AdapterError,
    },

    #[error("case {case_id} ({category}) still failing after {attempts} attempts")]
    RetriesExhausted {
        case_id: String,
        category: String,
        attempts: u32,
        #[source]
        source: AdapterError,
    },

    #[error("batch inference failed for model `{model}`")]
    BatchFailed {
        model: String,
        #[source]
        source: AdapterError,
    },

    #[error("batch adapter returned {got} output(s) for {expected} pending case(s)")]
    BatchShapeMismatch { expected: usize, got: usize },
}

impl RunError {
    /// Configuration errors mean the run never started; callers map these to
    /// a distinct exit code.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            RunError::UnknownCategory(_)
                | RunError::MissingDataFile { .. }
                | RunError::DataParse { .. }
        )
    }
}
