//! Bulk import: turn an upload into candidate rows, classify each row and
//! insert the valid ones in one transaction.

use std::collections::HashSet;

use anyhow::Result;
use serde_json::Value;
use uuid::Uuid;

use hooklab_types::{
    BulkImportRequest, BulkImportResult, ContentItem, ContentType, ImportRowError,
    ImportRowStatus, MAX_TEXT_LENGTH,
};

use crate::db::repositories::ContentRepository;

/// Column names recognised as "the text column", compared trimmed and lowercased
pub const HEADER_TOKENS: [&str; 4] = ["text", "hook", "hook_text", "hooks"];

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("could not parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("nothing to import: send rows, csv or records")]
    MissingData,
}

/// One classified input row
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRow {
    /// 1-based position within the submitted data
    pub row: usize,
    pub text: String,
    pub status: ImportRowStatus,
    pub reason: Option<String>,
}

fn is_header_token(cell: &str) -> bool {
    let cell = cell.trim().to_lowercase();
    HEADER_TOKENS.contains(&cell.as_str())
}

/// Key used for duplicate comparison
pub fn normalize_key(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Check a single trimmed text, returning the rejection reason if any
pub fn validate_text(text: &str) -> Result<(), &'static str> {
    if text.is_empty() {
        return Err("Empty text");
    }
    if text.chars().count() > MAX_TEXT_LENGTH {
        return Err("Text too long (max 1000 chars)");
    }
    Ok(())
}

/// Pick the text column from tabular rows.
///
/// A header row is recognised by any cell matching a header token; it is
/// dropped and its matching column used. Otherwise column 0 is used.
fn pick_column(mut table: Vec<Vec<String>>) -> Vec<String> {
    let mut column = 0;
    if let Some(header_idx) = table
        .first()
        .and_then(|first| first.iter().position(|cell| is_header_token(cell)))
    {
        column = header_idx;
        table.remove(0);
    }

    table
        .into_iter()
        .map(|row| row.get(column).cloned().unwrap_or_default())
        .collect()
}

/// Rows of a CSV document. Blank lines are skipped before numbering.
pub fn rows_from_csv(data: &str) -> Result<Vec<String>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data.as_bytes());

    let mut table = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        table.push(record.iter().map(str::to_string).collect());
    }

    Ok(pick_column(table))
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Rows of parsed JSON records.
///
/// The first record decides the shape. Arrays go through header detection
/// like CSV; objects use the first key matching a header token, else their
/// first key. Records that do not share the first record's shape yield an
/// empty row.
pub fn rows_from_records(records: &[Value]) -> Vec<String> {
    match records.first() {
        None => Vec::new(),
        Some(Value::Array(_)) => {
            let table = records
                .iter()
                .map(|record| match record {
                    Value::Array(cells) => cells.iter().map(scalar_text).collect(),
                    _ => Vec::new(),
                })
                .collect();
            pick_column(table)
        }
        Some(Value::Object(first)) => {
            let key = first
                .keys()
                .find(|k| is_header_token(k))
                .or_else(|| first.keys().next())
                .cloned();

            records
                .iter()
                .map(|record| match (record, &key) {
                    (Value::Object(map), Some(key)) => {
                        map.get(key).map(scalar_text).unwrap_or_default()
                    }
                    _ => String::new(),
                })
                .collect()
        }
        Some(_) => records
            .iter()
            .map(|record| match record {
                Value::Array(_) | Value::Object(_) => String::new(),
                scalar => scalar_text(scalar),
            })
            .collect(),
    }
}

/// Extract the candidate rows of an import request.
///
/// `rows` wins over `csv`, which wins over `records`.
pub fn extract_rows(request: &BulkImportRequest) -> Result<Vec<String>, ImportError> {
    if let Some(rows) = &request.rows {
        return Ok(rows.clone());
    }
    if let Some(csv) = &request.csv {
        return rows_from_csv(csv);
    }
    if let Some(records) = &request.records {
        return Ok(rows_from_records(records));
    }
    Err(ImportError::MissingData)
}

/// Classify rows in order against the texts already stored for the type.
///
/// Invalid rows never enter the seen set, so a later good copy of an empty
/// or oversized row cannot be reported as a duplicate of it.
pub fn classify_rows<I, S>(rows: &[String], existing: I) -> Vec<ClassifiedRow>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = existing
        .into_iter()
        .map(|text| normalize_key(text.as_ref()))
        .collect();

    rows.iter()
        .enumerate()
        .map(|(idx, raw)| {
            let text = raw.trim().to_string();
            let row = idx + 1;

            if let Err(reason) = validate_text(&text) {
                return ClassifiedRow {
                    row,
                    text,
                    status: ImportRowStatus::Invalid,
                    reason: Some(reason.to_string()),
                };
            }

            if !seen.insert(normalize_key(&text)) {
                return ClassifiedRow {
                    row,
                    text,
                    status: ImportRowStatus::Duplicate,
                    reason: Some("Duplicate".to_string()),
                };
            }

            ClassifiedRow {
                row,
                text,
                status: ImportRowStatus::Valid,
                reason: None,
            }
        })
        .collect()
}

/// Split classified rows into the texts to insert and the result report.
///
/// `created` counts the valid rows; callers that insert overwrite it with
/// the number actually written.
pub fn summarize(classified: Vec<ClassifiedRow>) -> (Vec<String>, BulkImportResult) {
    let mut valid = Vec::new();
    let mut result = BulkImportResult {
        success: true,
        created: 0,
        skipped: 0,
        errors: Vec::new(),
    };

    for row in classified {
        match row.status {
            ImportRowStatus::Valid => valid.push(row.text),
            ImportRowStatus::Duplicate => result.skipped += 1,
            ImportRowStatus::Invalid => result.errors.push(ImportRowError {
                row: row.row,
                text: row.text,
                reason: row.reason.unwrap_or_default(),
            }),
        }
    }

    result.created = valid.len();
    (valid, result)
}

/// Classify and insert a batch of rows for one content type
pub fn run_import(
    repo: &ContentRepository,
    content_type: ContentType,
    rows: &[String],
    created_by: Option<Uuid>,
) -> Result<BulkImportResult> {
    let existing = repo.texts_for_type(content_type)?;
    let (valid, mut result) = summarize(classify_rows(rows, &existing));

    let items: Vec<ContentItem> = valid
        .iter()
        .map(|text| ContentRepository::new_item(text, content_type, created_by))
        .collect();

    result.created = if items.is_empty() {
        0
    } else {
        repo.create_batch(&items)?
    };

    tracing::info!(
        "Imported {} {} (skipped {}, invalid {})",
        result.created,
        content_type.label(),
        result.skipped,
        result.errors.len()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use serde_json::json;

    fn setup() -> ContentRepository {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize database");
        ContentRepository::new(db.pool)
    }

    #[test]
    fn test_mixed_batch() {
        let repo = setup();
        let rows = vec![
            "".to_string(),
            "ok text".to_string(),
            "ok text".to_string(),
            "x".repeat(1001),
        ];

        let result = run_import(&repo, ContentType::Hook, &rows, None).unwrap();

        assert!(result.success);
        assert_eq!(result.created, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].row, 1);
        assert_eq!(result.errors[0].reason, "Empty text");
        assert_eq!(result.errors[1].row, 4);
        assert_eq!(result.errors[1].reason, "Text too long (max 1000 chars)");

        assert_eq!(repo.list(Some(ContentType::Hook)).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicates_against_existing_are_per_type() {
        let repo = setup();
        repo.create(&ContentRepository::new_item("Same words", ContentType::Hook, None))
            .unwrap();

        let rows = vec!["  same WORDS ".to_string()];
        let as_hook = run_import(&repo, ContentType::Hook, &rows, None).unwrap();
        assert_eq!(as_hook.created, 0);
        assert_eq!(as_hook.skipped, 1);

        let as_bridge = run_import(&repo, ContentType::Bridge, &rows, None).unwrap();
        assert_eq!(as_bridge.created, 1);
        let bridges = repo.list(Some(ContentType::Bridge)).unwrap();
        assert_eq!(bridges[0].text, "same WORDS");
    }

    #[test]
    fn test_exactly_max_length_is_valid() {
        let rows = vec!["y".repeat(MAX_TEXT_LENGTH)];
        let classified = classify_rows(&rows, Vec::<String>::new());
        assert_eq!(classified[0].status, ImportRowStatus::Valid);
    }

    #[test]
    fn test_csv_header_column_is_used() {
        let data = "id,Hook_Text\n1,First line\n\n2,Second line\n";
        let rows = rows_from_csv(data).unwrap();
        assert_eq!(rows, vec!["First line", "Second line"]);
    }

    #[test]
    fn test_csv_without_header_uses_first_column() {
        let data = "Only hooks here,extra\nAnother one\n";
        let rows = rows_from_csv(data).unwrap();
        assert_eq!(rows, vec!["Only hooks here", "Another one"]);
    }

    #[test]
    fn test_records_objects_pick_text_key() {
        let records = vec![
            json!({"id": 1, "text": "From object"}),
            json!({"id": 2, "text": "Second"}),
            json!(["wrong shape"]),
        ];
        let rows = rows_from_records(&records);
        assert_eq!(rows, vec!["From object", "Second", ""]);
    }

    #[test]
    fn test_records_objects_fall_back_to_first_key() {
        let records = vec![json!({"body": "First key wins", "other": "no"})];
        assert_eq!(rows_from_records(&records), vec!["First key wins"]);
    }

    #[test]
    fn test_records_arrays_with_header() {
        let records = vec![json!(["n", "hooks"]), json!([1, "Array row"])];
        assert_eq!(rows_from_records(&records), vec!["Array row"]);
    }

    #[test]
    fn test_extract_rows_requires_data() {
        let request = BulkImportRequest::default();
        assert!(matches!(
            extract_rows(&request),
            Err(ImportError::MissingData)
        ));
    }
}
