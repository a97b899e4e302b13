//! Include resolution module
//!
//! Responsible for:
//! - Expanding the suite's ordered include entries into a flat test list
//! - Recursing into directories, in directory-listing order
//! - Honoring override-list files (`includes.json`), which replace the
//!   default listing of their directory with an explicit ordered set
//! - Tolerating files whose JSON is the wrong top-level type (empty result)
//!   while treating malformed JSON as fatal

use crate::constants::INCLUDES_FILENAME;
use crate::models::{RunnerError, TestDefinition};
use log::{debug, warn};
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

/// Expand an ordered list of include entries, relative to `base_dir`, into
/// the flat ordered test list of the main phase.
///
/// Each entry is a directory (recursed), an override-list file (its paths
/// replace the entry) or a test-definition file (object or array of
/// objects). A missing path or malformed JSON aborts the whole resolution.
pub fn resolve(base_dir: &Path, entries: &[String]) -> Result<Vec<TestDefinition>, RunnerError> {
    let mut tests = Vec::new();
    for entry in entries {
        let path = base_dir.join(entry);
        let metadata = fs::metadata(&path).map_err(|source| RunnerError::Io {
            path: path.clone(),
            source,
        })?;
        let new_tests = if metadata.is_dir() {
            resolve_dir(&path)?
        } else if path.file_name() == Some(OsStr::new(INCLUDES_FILENAME)) {
            let nested = read_includes_file(&path)?;
            let parent = path.parent().unwrap_or(base_dir);
            resolve(parent, &nested)?
        } else {
            read_tests_file(&path)?
        };
        tests.extend(new_tests);
    }
    Ok(tests)
}

/// Expand a directory. An override-list file inside it takes precedence over
/// listing the directory; this is the only way the default "every entry"
/// behavior is skipped.
fn resolve_dir(dir: &Path) -> Result<Vec<TestDefinition>, RunnerError> {
    let override_list = dir.join(INCLUDES_FILENAME);
    let entries = if override_list.is_file() {
        debug!("using override list {}", override_list.display());
        read_includes_file(&override_list)?
    } else {
        let mut names = Vec::new();
        let read = fs::read_dir(dir).map_err(|source| RunnerError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        for dir_entry in read {
            let dir_entry = dir_entry.map_err(|source| RunnerError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            names.push(dir_entry.file_name().to_string_lossy().into_owned());
        }
        names
    };
    resolve(dir, &entries)
}

/// Read an override-list file: a JSON array of paths relative to the file's
/// own directory. Wrong top-level type yields an empty list.
fn read_includes_file(path: &Path) -> Result<Vec<String>, RunnerError> {
    let value = read_json(path)?;
    match serde_json::from_value::<Vec<String>>(value) {
        Ok(entries) => Ok(entries),
        Err(_) => {
            warn!("{}: not an array of paths, skipping", path.display());
            Ok(Vec::new())
        }
    }
}

/// Read a test-definition file: a single test object or an array of test
/// objects, kept in file order. Any other shape yields an empty list.
fn read_tests_file(path: &Path) -> Result<Vec<TestDefinition>, RunnerError> {
    let value = read_json(path)?;
    let tests = if value.is_array() {
        serde_json::from_value::<Vec<TestDefinition>>(value).unwrap_or_default()
    } else if value.is_object() {
        serde_json::from_value::<TestDefinition>(value)
            .map(|test| vec![test])
            .unwrap_or_default()
    } else {
        Vec::new()
    };
    if tests.is_empty() {
        warn!("{}: no test definitions", path.display());
    }
    Ok(tests)
}

/// Read and parse a file as JSON; IO and syntax errors are fatal with the
/// offending path attached.
fn read_json(path: &Path) -> Result<serde_json::Value, RunnerError> {
    let text = fs::read_to_string(path).map_err(|source| RunnerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| RunnerError::Config {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn resolves_files_in_entry_order() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "b.json", r#"[{"label": "b"}]"#);
        write(temp.path(), "a.json", r#"[{"label": "a1"}, {"label": "a2"}]"#);

        let tests = resolve(
            temp.path(),
            &["b.json".to_string(), "a.json".to_string()],
        )
        .unwrap();
        let labels: Vec<_> = tests.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "a1", "a2"]);
    }

    #[test]
    fn override_list_replaces_directory_listing() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("cases");
        fs::create_dir(&dir).unwrap();
        write(&dir, "ignored.json", r#"[{"label": "ignored"}]"#);
        write(&dir, "one.json", r#"[{"label": "one"}]"#);
        write(&dir, "two.json", r#"[{"label": "two"}]"#);
        write(&dir, INCLUDES_FILENAME, r#"["two.json", "one.json"]"#);

        let tests = resolve(temp.path(), &["cases".to_string()]).unwrap();
        let labels: Vec<_> = tests.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["two", "one"]);
    }

    #[test]
    fn directory_without_override_list_includes_every_file() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("cases");
        fs::create_dir(&dir).unwrap();
        write(&dir, "one.json", r#"[{"label": "one"}]"#);
        write(&dir, "two.json", r#"[{"label": "two"}]"#);

        let tests = resolve(temp.path(), &["cases".to_string()]).unwrap();
        let mut labels: Vec<_> = tests.iter().map(|t| t.label.as_str()).collect();
        labels.sort_unstable();
        assert_eq!(labels, vec!["one", "two"]);
    }

    #[test]
    fn include_entry_naming_override_list_rebases_to_its_directory() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("nested");
        fs::create_dir(&dir).unwrap();
        write(&dir, "case.json", r#"{"label": "nested-case"}"#);
        write(&dir, INCLUDES_FILENAME, r#"["case.json"]"#);

        let entry = format!("nested/{INCLUDES_FILENAME}");
        let tests = resolve(temp.path(), &[entry]).unwrap();
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].label, "nested-case");
    }

    #[test]
    fn single_object_test_file_is_accepted() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "one.json", r#"{"label": "solo"}"#);

        let tests = resolve(temp.path(), &["one.json".to_string()]).unwrap();
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].label, "solo");
    }

    #[test]
    fn wrong_top_level_type_yields_empty_result() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "odd.json", r#""just a string""#);

        let tests = resolve(temp.path(), &["odd.json".to_string()]).unwrap();
        assert!(tests.is_empty());
    }

    #[test]
    fn malformed_json_is_fatal_and_names_the_file() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "bad.json", "{ nope");

        let err = resolve(temp.path(), &["bad.json".to_string()]).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn missing_path_is_fatal() {
        let temp = tempfile::tempdir().unwrap();
        let err = resolve(temp.path(), &["absent.json".to_string()]).unwrap_err();
        assert!(matches!(err, RunnerError::Io { .. }));
    }
}
