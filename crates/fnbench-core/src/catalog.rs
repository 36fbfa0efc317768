//! Static category tables: the leaf categories that have a backing data file,
//! and the aliases that expand to sets of leaves at invocation time.

use std::collections::BTreeSet;

use crate::errors::RunError;

/// Leaf categories, each backed by one newline-delimited JSON data file.
pub const LEAF_CATEGORIES: &[&str] = &[
    "simple",
    "relevance",
    "multiple_function",
    "parallel_function",
    "parallel_multiple_function",
    "rest",
    "executable_simple",
    "executable_multiple_function",
    "executable_parallel_function",
    "executable_parallel_multiple_function",
];

const AST_CATEGORIES: &[&str] = &[
    "simple",
    "relevance",
    "multiple_function",
    "parallel_function",
    "parallel_multiple_function",
];

const EXECUTABLE_CATEGORIES: &[&str] = &[
    "executable_simple",
    "executable_multiple_function",
    "executable_parallel_function",
    "executable_parallel_multiple_function",
    "rest",
];

// Everything evaluated against Python function signatures: the AST leaves
// plus the executable leaves, minus `rest` (REST calls are language-neutral).
const PYTHON_CATEGORIES: &[&str] = &[
    "simple",
    "relevance",
    "multiple_function",
    "parallel_function",
    "parallel_multiple_function",
    "executable_simple",
    "executable_multiple_function",
    "executable_parallel_function",
    "executable_parallel_multiple_function",
];

/// Alias name -> leaf set. Aliases may overlap; expansion is a set union.
pub const ALIASES: &[(&str, &[&str])] = &[
    ("all", LEAF_CATEGORIES),
    ("ast", AST_CATEGORIES),
    ("executable", EXECUTABLE_CATEGORIES),
    ("python", PYTHON_CATEGORIES),
];

pub fn is_leaf(name: &str) -> bool {
    LEAF_CATEGORIES.contains(&name)
}

pub fn alias_expansion(name: &str) -> Option<&'static [&'static str]> {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, leaves)| *leaves)
}

/// Expand requested category tokens into the deduplicated set of leaf
/// categories. Unknown tokens fail fast rather than being silently skipped.
/// The returned order is deterministic (sorted) but carries no meaning;
/// within a category, case order always follows the source file.
pub fn expand(tokens: &[String]) -> Result<Vec<String>, RunError> {
    let mut leaves = BTreeSet::new();
    for token in tokens {
        if let Some(expansion) = alias_expansion(token) {
            leaves.extend(expansion.iter().copied());
        } else if is_leaf(token) {
            leaves.insert(token.as_str());
        } else {
            return Err(RunError::UnknownCategory(token.clone()));
        }
    }
    Ok(leaves.into_iter().map(str::to_string).collect())
}

/// Data file name for a leaf category, following the upstream benchmark's
/// naming convention.
pub fn data_file(leaf: &str) -> String {
    format!("gorilla_openfunctions_v1_test_{leaf}.json")
}

/// Result log name for a leaf category.
pub fn result_file(leaf: &str) -> String {
    format!("gorilla_openfunctions_v1_test_{leaf}_result.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_alias_expands_to_known_leaves() {
        for (alias, leaves) in ALIASES {
            for leaf in *leaves {
                assert!(is_leaf(leaf), "alias `{alias}` references unknown leaf `{leaf}`");
            }
        }
    }

    #[test]
    fn expand_unions_overlapping_aliases_without_duplicates() {
        let leaves = expand(&["ast".to_string(), "all".to_string()]).unwrap();
        assert_eq!(leaves.len(), LEAF_CATEGORIES.len());
        let mut sorted: Vec<_> = LEAF_CATEGORIES.iter().map(|s| s.to_string()).collect();
        sorted.sort();
        assert_eq!(leaves, sorted);
    }

    #[test]
    fn expand_accepts_leaf_tokens_directly() {
        let leaves = expand(&["simple".to_string(), "rest".to_string()]).unwrap();
        assert_eq!(leaves, vec!["rest".to_string(), "simple".to_string()]);
    }

    #[test]
    fn expand_deduplicates_leaf_covered_by_alias() {
        let leaves = expand(&["executable".to_string(), "rest".to_string()]).unwrap();
        assert_eq!(leaves.len(), EXECUTABLE_CATEGORIES.len());
    }

    #[test]
    fn python_alias_covers_every_leaf_except_rest() {
        let leaves = expand(&["python".to_string()]).unwrap();
        assert_eq!(leaves.len(), LEAF_CATEGORIES.len() - 1);
        assert!(!leaves.iter().any(|l| l == "rest"));
    }

    #[test]
    fn expand_rejects_unknown_tokens() {
        let err = expand(&["simpel".to_string()]).unwrap_err();
        assert!(matches!(err, RunError::UnknownCategory(t) if t == "simpel"));
    }

    #[test]
    fn file_names_follow_upstream_convention() {
        assert_eq!(data_file("simple"), "gorilla_openfunctions_v1_test_simple.json");
        assert_eq!(
            result_file("executable_simple"),
            "gorilla_openfunctions_v1_test_executable_simple_result.json"
        );
    }
}
