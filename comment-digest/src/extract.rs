//! Comment extraction from a tabular upload.
//!
//! Downstream stages, and every oracle reply, address comments by their
//! post-filter [`CommentIndex`]: empty cells are dropped and the survivors are
//! renumbered contiguously from 0. The raw [`RowIndex`] is kept on each
//! [`Comment`] so callers can map results back to the original sheet.

use serde_json::{Map, Value};

use crate::errors::SchemaError;
use crate::model::{Comment, CommentIndex, RowIndex};

/// Name of the required column. Matching is case-sensitive.
pub const COMMENT_COLUMN: &str = "comment";

/// Named columns plus rows of optional cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl CommentTable {
    /// Builds a table from explicit columns and rows.
    ///
    /// Rows shorter than `columns` are padded with missing cells.
    ///
    /// # Errors
    /// [`SchemaError::RaggedRow`] if a row has more cells than there are columns.
    pub fn new(
        columns: Vec<String>,
        mut rows: Vec<Vec<Option<String>>>,
    ) -> Result<Self, SchemaError> {
        for (i, row) in rows.iter_mut().enumerate() {
            if row.len() > columns.len() {
                return Err(SchemaError::RaggedRow {
                    row: i,
                    cells: row.len(),
                    columns: columns.len(),
                });
            }
            row.resize(columns.len(), None);
        }
        Ok(Self { columns, rows })
    }

    /// Builds a table from JSON records (`[{"comment": "...", ...}, ...]`).
    ///
    /// Columns are the union of record keys in first-seen order. Strings are
    /// kept as-is, numbers and booleans are rendered as text, `null` and absent
    /// keys become missing cells.
    ///
    /// # Errors
    /// [`SchemaError::NestedCell`] for array or object values.
    pub fn from_records(records: &[Map<String, Value>]) -> Result<Self, SchemaError> {
        let mut columns: Vec<String> = Vec::new();
        for rec in records {
            for key in rec.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut rows = Vec::with_capacity(records.len());
        for (i, rec) in records.iter().enumerate() {
            let mut row = Vec::with_capacity(columns.len());
            for col in &columns {
                let cell = match rec.get(col) {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(Value::Bool(b)) => Some(b.to_string()),
                    Some(Value::Number(n)) => Some(n.to_string()),
                    Some(Value::Array(_) | Value::Object(_)) => {
                        return Err(SchemaError::NestedCell {
                            row: i,
                            column: col.clone(),
                        });
                    }
                };
                row.push(cell);
            }
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Extracts the ordered, non-empty comments from `table`.
///
/// Missing, empty and whitespace-only cells are dropped. Text is kept
/// verbatim otherwise. Pure and idempotent.
///
/// # Errors
/// [`SchemaError::MissingColumn`] if [`COMMENT_COLUMN`] is absent.
pub fn extract_comments(table: &CommentTable) -> Result<Vec<Comment>, SchemaError> {
    let col = table
        .column_position(COMMENT_COLUMN)
        .ok_or_else(|| SchemaError::MissingColumn {
            column: COMMENT_COLUMN.to_string(),
        })?;

    let comments = table
        .rows
        .iter()
        .enumerate()
        .filter_map(|(row, cells)| {
            cells
                .get(col)
                .and_then(Option::as_deref)
                .filter(|text| !text.trim().is_empty())
                .map(|text| (RowIndex(row), text))
        })
        .enumerate()
        .map(|(i, (row, text))| Comment {
            index: CommentIndex(i),
            row,
            text: text.to_string(),
        })
        .collect();

    Ok(comments)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn records(v: Value) -> Vec<Map<String, Value>> {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn drops_empty_and_renumbers() {
        let table = CommentTable::from_records(&records(json!([
            {"comment": "とても分かりやすかった"},
            {"comment": ""},
            {"comment": "資料が分かりにくい"}
        ])))
        .unwrap();

        let comments = extract_comments(&table).unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].index, CommentIndex(0));
        assert_eq!(comments[0].row, RowIndex(0));
        assert_eq!(comments[0].text, "とても分かりやすかった");
        assert_eq!(comments[1].index, CommentIndex(1));
        assert_eq!(comments[1].row, RowIndex(2));
        assert_eq!(comments[1].text, "資料が分かりにくい");
    }

    #[test]
    fn whitespace_null_and_absent_cells_are_dropped() {
        let table = CommentTable::from_records(&records(json!([
            {"comment": "   \n"},
            {"comment": null, "score": 3},
            {"score": 4},
            {"comment": 42}
        ])))
        .unwrap();

        let comments = extract_comments(&table).unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text, "42");
        assert_eq!(comments[0].row, RowIndex(3));
    }

    #[test]
    fn column_match_is_case_sensitive() {
        let table = CommentTable::from_records(&records(json!([{"Comment": "x"}]))).unwrap();
        assert_eq!(
            extract_comments(&table),
            Err(SchemaError::MissingColumn {
                column: "comment".into()
            })
        );
    }

    #[test]
    fn empty_record_list_has_no_comment_column() {
        let table = CommentTable::from_records(&[]).unwrap();
        assert!(matches!(
            extract_comments(&table),
            Err(SchemaError::MissingColumn { .. })
        ));
    }

    #[test]
    fn nested_values_are_rejected() {
        let err = CommentTable::from_records(&records(json!([{"comment": ["a"]}]))).unwrap_err();
        assert_eq!(
            err,
            SchemaError::NestedCell {
                row: 0,
                column: "comment".into()
            }
        );
    }

    #[test]
    fn ragged_rows_are_rejected_and_short_rows_padded() {
        let err = CommentTable::new(
            vec!["id".into(), "comment".into()],
            vec![vec![Some("1".into()), Some("a".into()), Some("extra".into())]],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::RaggedRow { row: 0, cells: 3, columns: 2 }));

        let table = CommentTable::new(
            vec!["comment".into(), "id".into()],
            vec![vec![Some("only comment".into())]],
        )
        .unwrap();
        assert_eq!(extract_comments(&table).unwrap()[0].text, "only comment");
    }

    #[test]
    fn extraction_is_idempotent() {
        let table = CommentTable::new(
            vec!["comment".into()],
            vec![
                vec![Some("a".into())],
                vec![None],
                vec![Some("b".into())],
                vec![Some(" ".into())],
                vec![Some("c".into())],
            ],
        )
        .unwrap();
        let first = extract_comments(&table).unwrap();
        let second = extract_comments(&table).unwrap();
        assert_eq!(first, second);
        let idx: Vec<usize> = first.iter().map(|c| c.index.get()).collect();
        assert_eq!(idx, vec![0, 1, 2]);
    }
}
