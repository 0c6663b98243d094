//! Format-aware resolution for the known module-metadata conflict.
//!
//! Glossary and tests branches both touch small JSON metadata files inside
//! the book folder, each adding its own fields. Those conflicts are resolved
//! by taking the union of both objects; every other conflict is unknown and
//! aborts the merge.

use serde_json::{Map, Value};
use thiserror::Error;

/// Classification of a conflicted path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// JSON file inside the module's book folder.
    JsonMetadata,
    /// Anything else.
    Unknown,
}

/// Errors raised while merging the two sides of a metadata file.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConflictResolutionError {
    /// One side is not valid JSON.
    #[error("{side} side is not valid JSON: {reason}")]
    InvalidJson {
        /// `ours` or `theirs`.
        side: &'static str,
        /// Parser message.
        reason: String,
    },

    /// One side is valid JSON but not an object.
    #[error("{side} side is not a JSON object")]
    NotAnObject {
        /// `ours` or `theirs`.
        side: &'static str,
    },

    /// The merged document could not be serialised.
    #[error("failed to serialise merged document: {0}")]
    Serialise(String),
}

/// Classifies a conflicted path against the module's book folder.
///
/// # Examples
///
///     use branchwarden::vcs::services::{ConflictKind, classify_conflict};
///
///     assert_eq!(
///         classify_conflict("book2_economics/module_3.json", "book2_economics"),
///         ConflictKind::JsonMetadata
///     );
///     assert_eq!(classify_conflict("index.html", "book2_economics"), ConflictKind::Unknown);
#[must_use]
pub fn classify_conflict(path: &str, book_folder: &str) -> ConflictKind {
    let folder = book_folder.trim_matches('/');
    let in_folder = !folder.is_empty()
        && path
            .strip_prefix(folder)
            .is_some_and(|rest| rest.starts_with('/'));

    if in_folder && path.to_ascii_lowercase().ends_with(".json") {
        ConflictKind::JsonMetadata
    } else {
        ConflictKind::Unknown
    }
}

/// Merges two JSON objects, keeping the fields of both sides.
///
/// Nested objects are merged recursively. When both sides set the same
/// non-object field, the incoming (`theirs`) value wins. The result is
/// pretty-printed with a trailing newline.
///
/// # Errors
///
/// Returns [`ConflictResolutionError`] when either side is not a JSON object.
pub fn merge_json_objects(ours: &str, theirs: &str) -> Result<String, ConflictResolutionError> {
    let ours_object = parse_object(ours, "ours")?;
    let theirs_object = parse_object(theirs, "theirs")?;

    let merged = union(ours_object, theirs_object);
    let mut rendered = serde_json::to_string_pretty(&Value::Object(merged))
        .map_err(|err| ConflictResolutionError::Serialise(err.to_string()))?;
    rendered.push('\n');
    Ok(rendered)
}

fn parse_object(
    raw: &str,
    side: &'static str,
) -> Result<Map<String, Value>, ConflictResolutionError> {
    let value: Value = serde_json::from_str(raw).map_err(|err| ConflictResolutionError::InvalidJson {
        side,
        reason: err.to_string(),
    })?;
    match value {
        Value::Object(object) => Ok(object),
        _ => Err(ConflictResolutionError::NotAnObject { side }),
    }
}

fn union(mut base: Map<String, Value>, incoming: Map<String, Value>) -> Map<String, Value> {
    for (key, incoming_value) in incoming {
        let merged_value = match (base.remove(&key), incoming_value) {
            (Some(Value::Object(existing)), Value::Object(nested)) => {
                Value::Object(union(existing, nested))
            }
            (_, value) => value,
        };
        base.insert(key, merged_value);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("book1_quants/module_4.json", ConflictKind::JsonMetadata)]
    #[case("book1_quants/nested/meta.JSON", ConflictKind::JsonMetadata)]
    #[case("book1_quants_extra/module_4.json", ConflictKind::Unknown)]
    #[case("book1_quants/module_4.md", ConflictKind::Unknown)]
    #[case("package.json", ConflictKind::Unknown)]
    fn classifies_paths_against_book_folder(#[case] path: &str, #[case] expected: ConflictKind) {
        assert_eq!(classify_conflict(path, "book1_quants"), expected);
    }

    #[test]
    fn empty_folder_never_matches() {
        assert_eq!(classify_conflict("/meta.json", ""), ConflictKind::Unknown);
    }

    #[test]
    fn merges_disjoint_fields_from_both_sides() {
        let merged = merge_json_objects(r#"{"glossary": 42}"#, r#"{"tests": 120}"#)
            .expect("objects merge");
        let value: Value = serde_json::from_str(&merged).expect("merged output is JSON");
        assert_eq!(value, serde_json::json!({"glossary": 42, "tests": 120}));
        assert!(merged.ends_with('\n'));
    }

    #[test]
    fn merges_nested_objects_and_prefers_incoming_scalars() {
        let ours = r#"{"module": {"title": "Rates", "glossary": true}, "version": 1}"#;
        let theirs = r#"{"module": {"tests": true}, "version": 2}"#;
        let merged = merge_json_objects(ours, theirs).expect("objects merge");
        let value: Value = serde_json::from_str(&merged).expect("merged output is JSON");
        assert_eq!(
            value,
            serde_json::json!({
                "module": {"title": "Rates", "glossary": true, "tests": true},
                "version": 2
            })
        );
    }

    #[test]
    fn rejects_non_object_side() {
        let result = merge_json_objects("[1, 2]", "{}");
        assert_eq!(result, Err(ConflictResolutionError::NotAnObject { side: "ours" }));
    }

    #[test]
    fn rejects_conflict_markers() {
        let result = merge_json_objects("{}", "<<<<<<< HEAD\n{}");
        assert!(matches!(
            result,
            Err(ConflictResolutionError::InvalidJson { side: "theirs", .. })
        ));
    }
}
