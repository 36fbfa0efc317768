//! Append-only result logs, one per (model, category) pair. The line count of
//! a log is the sole resumption signal: records always form a prefix of the
//! category's case order, so "how many are done" is "how many lines exist".

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::catalog;
use crate::errors::RunError;
use crate::model::ResultRecord;

/// Filesystem-backed checkpoint store rooted at one result directory
/// (typically `result/<language>`). Assumes a single writer per
/// (model, category) at a time.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    root: PathBuf,
}

impl CheckpointStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Log file path for a (model, category) pair. Hub-style model names use
    /// `_` in place of `/` on disk.
    pub fn log_path(&self, model: &str, category: &str) -> PathBuf {
        self.root
            .join(model.replace('/', "_"))
            .join(catalog::result_file(category))
    }

    /// Number of records already completed for (model, category); 0 if the
    /// log does not exist. Only records whose id prefix matches the category
    /// are counted, so a misconfigured mixed log cannot inflate the skip
    /// count. An unparseable line is an error, not a zero.
    pub fn count_completed(&self, model: &str, category: &str) -> Result<usize, RunError> {
        let path = self.log_path(model, category);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(RunError::Storage { path, source: e }),
        };

        let mut count = 0;
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| RunError::Storage {
                path: path.clone(),
                source: e,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let record: ResultRecord =
                serde_json::from_str(&line).map_err(|e| RunError::CorruptLog {
                    path: path.clone(),
                    line: idx + 1,
                    source: e,
                })?;
            if record.category() == category {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Durably append one record. The parent directory is created on first
    /// use and the write is synced before returning, so a record is either
    /// fully on disk or was never acknowledged.
    pub fn append(
        &self,
        model: &str,
        category: &str,
        record: &ResultRecord,
    ) -> Result<(), RunError> {
        let path = self.log_path(model, category);
        let storage_err = |e: std::io::Error| RunError::Storage {
            path: path.clone(),
            source: e,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(storage_err)?;
        }

        let mut line = serde_json::to_vec(record).map_err(|e| RunError::Storage {
            path: path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(storage_err)?;
        file.write_all(&line).map_err(storage_err)?;
        file.sync_data().map_err(storage_err)?;
        Ok(())
    }
}
