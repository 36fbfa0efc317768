//! Resolves requested category tokens into the ordered list of test cases
//! still pending for a model, trusting the checkpoint store's prefix
//! invariant: the first `count_completed` cases of a category are done, the
//! rest are not.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::catalog;
use crate::errors::RunError;
use crate::model::TestCase;
use crate::storage::CheckpointStore;

/// A test case still awaiting a result, tagged with the leaf category it was
/// loaded from.
#[derive(Debug, Clone)]
pub struct PendingCase {
    pub category: String,
    pub case: TestCase,
}

/// Expand `tokens`, load each leaf category's data file from `data_root`
/// (already language-qualified), and return the cases past the completed
/// prefix for `model`. Order within a category matches the source file.
pub fn pending_cases(
    data_root: &Path,
    store: &CheckpointStore,
    model: &str,
    tokens: &[String],
) -> Result<Vec<PendingCase>, RunError> {
    let leaves = catalog::expand(tokens)?;

    let mut pending = Vec::new();
    for leaf in &leaves {
        let path = data_root.join(catalog::data_file(leaf));
        let cases = load_cases(&path, leaf)?;
        let completed = store.count_completed(model, leaf)?;
        if completed > 0 {
            tracing::debug!(
                category = %leaf,
                completed,
                total = cases.len(),
                "resuming past completed prefix"
            );
        }
        pending.extend(cases.into_iter().skip(completed).map(|case| PendingCase {
            category: leaf.clone(),
            case,
        }));
    }
    Ok(pending)
}

fn load_cases(path: &Path, category: &str) -> Result<Vec<TestCase>, RunError> {
    let file = File::open(path).map_err(|e| RunError::MissingDataFile {
        category: category.to_string(),
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut cases = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| RunError::Storage {
            path: path.to_path_buf(),
            source: e,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let case: TestCase = serde_json::from_str(&line).map_err(|e| RunError::DataParse {
            path: path.to_path_buf(),
            line: idx + 1,
            source: e,
        })?;
        cases.push(case);
    }
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResultRecord;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_data_file(dir: &Path, category: &str, count: usize) {
        let path = dir.join(catalog::data_file(category));
        let mut f = File::create(path).unwrap();
        for i in 0..count {
            let case = json!({
                "id": format!("{category}_{i}"),
                "question": format!("question {i}"),
                "function": {"name": format!("fn_{i}")},
            });
            writeln!(f, "{case}").unwrap();
        }
    }

    #[test]
    fn selector_skips_exactly_the_completed_prefix() {
        let data = TempDir::new().unwrap();
        let results = TempDir::new().unwrap();
        write_data_file(data.path(), "simple", 3);

        let store = CheckpointStore::new(results.path());
        store
            .append(
                "m",
                "simple",
                &ResultRecord {
                    id: "simple_0".into(),
                    result: json!("done"),
                    input_token_count: 0,
                    output_token_count: 0,
                    latency: 0.0,
                },
            )
            .unwrap();

        let pending =
            pending_cases(data.path(), &store, "m", &["simple".to_string()]).unwrap();
        let ids: Vec<_> = pending.iter().map(|p| p.case.id.as_str()).collect();
        assert_eq!(ids, vec!["simple_1", "simple_2"]);
        assert!(pending.iter().all(|p| p.category == "simple"));
    }

    #[test]
    fn fully_completed_category_yields_nothing() {
        let data = TempDir::new().unwrap();
        let results = TempDir::new().unwrap();
        write_data_file(data.path(), "simple", 2);

        let store = CheckpointStore::new(results.path());
        for i in 0..2 {
            store
                .append(
                    "m",
                    "simple",
                    &ResultRecord {
                        id: format!("simple_{i}"),
                        result: json!("done"),
                        input_token_count: 0,
                        output_token_count: 0,
                        latency: 0.0,
                    },
                )
                .unwrap();
        }

        let pending =
            pending_cases(data.path(), &store, "m", &["simple".to_string()]).unwrap();
        assert!(pending.is_empty());
    }

    #[test]
    fn unknown_token_fails_before_any_file_io() {
        let data = TempDir::new().unwrap();
        let store = CheckpointStore::new(data.path());
        let err = pending_cases(data.path(), &store, "m", &["bogus".to_string()]).unwrap_err();
        assert!(matches!(err, RunError::UnknownCategory(t) if t == "bogus"));
    }

    #[test]
    fn missing_data_file_is_a_config_error() {
        let data = TempDir::new().unwrap();
        let store = CheckpointStore::new(data.path());
        let err = pending_cases(data.path(), &store, "m", &["simple".to_string()]).unwrap_err();
        assert!(err.is_config_error());
        assert!(matches!(err, RunError::MissingDataFile { category, .. } if category == "simple"));
    }

    #[test]
    fn alias_expansion_loads_each_leaf_once() {
        let data = TempDir::new().unwrap();
        let results = TempDir::new().unwrap();
        for leaf in ["simple", "relevance", "multiple_function", "parallel_function",
            "parallel_multiple_function"]
        {
            write_data_file(data.path(), leaf, 1);
        }

        let store = CheckpointStore::new(results.path());
        // `ast` covers `simple`; requesting both must not double-load it.
        let pending = pending_cases(
            data.path(),
            &store,
            "m",
            &["ast".to_string(), "simple".to_string()],
        )
        .unwrap();
        assert_eq!(pending.len(), 5);
        assert_eq!(
            pending.iter().filter(|p| p.category == "simple").count(),
            1
        );
    }
}
