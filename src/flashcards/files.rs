//! Applying a saved edit result to rows kept in JSON files

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use super::applier::{apply_updates, ApplyReport, UpdateScope};
use super::models::{AssistantResult, EditRequest, FlashcardRow};

#[derive(Error, Debug)]
pub enum RowFilesError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, RowFilesError>;

/// What `apply_result_files` did
#[derive(Debug)]
pub struct AppliedFiles {
    pub report: ApplyReport,
    /// Where the merged rows were written
    pub output: PathBuf,
}

/// Merge the updates in `result_path` onto the rows in `rows_path`.
///
/// With `request_path`, updates are limited to that request's selected
/// cards (any card when the selection is empty). Rows are written to
/// `output_path`, or back over `rows_path` when it is absent.
pub fn apply_result_files(
    rows_path: &Path,
    result_path: &Path,
    request_path: Option<&Path>,
    output_path: Option<&Path>,
) -> Result<AppliedFiles> {
    let mut rows: Vec<FlashcardRow> = read_json(rows_path)?;
    let result: AssistantResult = read_json(result_path)?;

    let scope = match request_path {
        Some(path) => {
            let request: EditRequest = read_json(path)?;
            UpdateScope::from_selection(&request.context.selected_cards)
        }
        None => UpdateScope::AnyCard,
    };

    let report = apply_updates(&mut rows, &result.updates, &scope);

    let output = output_path.unwrap_or(rows_path);
    let content = serde_json::to_string_pretty(&rows).map_err(|source| RowFilesError::Json {
        path: output.to_path_buf(),
        source,
    })?;
    fs::write(output, content).map_err(|source| RowFilesError::Io {
        path: output.to_path_buf(),
        source,
    })?;

    log::debug!("Wrote {} row(s) to {:?}", rows.len(), output);

    Ok(AppliedFiles {
        report,
        output: output.to_path_buf(),
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|source| RowFilesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| RowFilesError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn rows_json() -> Value {
        json!([
            {
                "setId": "set-a",
                "flashcardId": "c1",
                "front": "Q1",
                "back": "A1",
                "difficulty": 3,
                "tags": ["bio"],
                "created_at": "2024-01-01T00:00:00Z",
                "position": 0
            },
            {
                "setId": "set-a",
                "flashcardId": "c2",
                "front": "Q2",
                "back": "A2",
                "difficulty": null,
                "tags": null,
                "created_at": null,
                "position": 1
            }
        ])
    }

    fn result_json() -> Value {
        json!({
            "message": "Tidied both cards",
            "updates": [
                { "flashcardId": "c1", "changes": { "difficulty": 1 } },
                { "flashcardId": "c2", "changes": { "back": "A2!" } }
            ]
        })
    }

    fn write(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, value.to_string()).unwrap();
        path
    }

    fn read(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_writes_merged_rows_to_output() {
        let temp_dir = TempDir::new().unwrap();
        let rows = write(&temp_dir, "rows.json", &rows_json());
        let result = write(&temp_dir, "result.json", &result_json());
        let output = temp_dir.path().join("merged.json");

        let applied = apply_result_files(&rows, &result, None, Some(&output)).unwrap();

        assert_eq!(applied.output, output);
        assert_eq!(applied.report.applied, vec!["c1".to_string(), "c2".to_string()]);

        let merged = read(&output);
        assert_eq!(merged[0]["difficulty"], 1);
        assert_eq!(merged[0]["front"], "Q1");
        assert_eq!(merged[0]["tags"], json!(["bio"]));
        assert_eq!(merged[0]["created_at"], "2024-01-01T00:00:00Z");
        assert_eq!(merged[1]["back"], "A2!");
        assert_eq!(merged[1]["position"], 1);

        // input rows untouched when an output path is given
        assert_eq!(read(&rows), rows_json());
    }

    #[test]
    fn test_output_defaults_to_rows_file() {
        let temp_dir = TempDir::new().unwrap();
        let rows = write(&temp_dir, "rows.json", &rows_json());
        let result = write(&temp_dir, "result.json", &result_json());

        let applied = apply_result_files(&rows, &result, None, None).unwrap();

        assert_eq!(applied.output, rows);
        let merged = read(&rows);
        assert_eq!(merged[0]["difficulty"], 1);
        assert_eq!(merged[1]["back"], "A2!");
    }

    #[test]
    fn test_request_selection_limits_scope() {
        let temp_dir = TempDir::new().unwrap();
        let rows = write(&temp_dir, "rows.json", &rows_json());
        let result = write(&temp_dir, "result.json", &result_json());
        let request = write(
            &temp_dir,
            "request.json",
            &json!({
                "prompt": "make card 1 easier",
                "model_id": "m",
                "context": {
                    "selectedCards": [rows_json()[0].clone()],
                    "setTitle": "Set A",
                    "totalCards": 2
                }
            }),
        );

        let applied = apply_result_files(&rows, &result, Some(&request), None).unwrap();

        assert_eq!(applied.report.applied, vec!["c1".to_string()]);
        assert_eq!(applied.report.out_of_scope, vec!["c2".to_string()]);
        let merged = read(&rows);
        assert_eq!(merged[0]["difficulty"], 1);
        assert_eq!(merged[1]["back"], "A2");
    }

    #[test]
    fn test_request_without_selection_allows_any_card() {
        let temp_dir = TempDir::new().unwrap();
        let rows = write(&temp_dir, "rows.json", &rows_json());
        let result = write(&temp_dir, "result.json", &result_json());
        let request = write(
            &temp_dir,
            "request.json",
            &json!({ "prompt": "tidy", "model_id": "m", "context": { "selectedCards": [] } }),
        );

        let applied = apply_result_files(&rows, &result, Some(&request), None).unwrap();

        assert_eq!(applied.report.applied.len(), 2);
        assert!(!applied.report.has_rejections());
    }

    #[test]
    fn test_unreadable_result_leaves_rows_alone() {
        let temp_dir = TempDir::new().unwrap();
        let rows = write(&temp_dir, "rows.json", &rows_json());
        let result = temp_dir.path().join("result.json");
        fs::write(&result, "{ not json").unwrap();

        let err = apply_result_files(&rows, &result, None, None).unwrap_err();

        assert!(matches!(err, RowFilesError::Json { ref path, .. } if *path == result));
        assert_eq!(read(&rows), rows_json());
    }

    #[test]
    fn test_missing_rows_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = write(&temp_dir, "result.json", &result_json());

        let err =
            apply_result_files(&temp_dir.path().join("nope.json"), &result, None, None).unwrap_err();

        assert!(matches!(err, RowFilesError::Io { .. }));
    }
}
