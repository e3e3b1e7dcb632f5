//! Important/dangerous selection: raw oracle indices to validated sets.

use std::collections::BTreeSet;

use tracing::warn;

use crate::model::{CommentIndex, Stage, Warning};

pub type IndexSet = BTreeSet<CommentIndex>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub important: IndexSet,
    pub dangerous: IndexSet,
    pub warnings: Vec<Warning>,
}

/// Validates both index lists against `comment_count`.
///
/// Out-of-range entries are dropped with a warning; duplicates collapse.
pub fn select(important: &[i64], dangerous: &[i64], comment_count: usize) -> Selection {
    let mut warnings = Vec::new();
    let important = validate("important_comments", important, comment_count, &mut warnings);
    let dangerous = validate("dangerous_comments", dangerous, comment_count, &mut warnings);
    Selection {
        important,
        dangerous,
        warnings,
    }
}

fn validate(
    field: &str,
    raw: &[i64],
    comment_count: usize,
    warnings: &mut Vec<Warning>,
) -> IndexSet {
    let mut out = IndexSet::new();
    for &i in raw {
        match CommentIndex::checked(i, comment_count) {
            Some(idx) => {
                out.insert(idx);
            }
            None => {
                warn!(field, index = i, comment_count, "select: dropping out-of-range index");
                warnings.push(Warning::IndexOutOfRange {
                    stage: Stage::Selecting,
                    field: field.to_string(),
                    index: i,
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_is_dropped_with_warning() {
        let s = select(&[1, 99], &[], 2);
        assert_eq!(s.important, IndexSet::from([CommentIndex(1)]));
        assert!(s.dangerous.is_empty());
        assert_eq!(
            s.warnings,
            vec![Warning::IndexOutOfRange {
                stage: Stage::Selecting,
                field: "important_comments".into(),
                index: 99
            }]
        );
    }

    #[test]
    fn duplicates_collapse_and_sets_may_overlap() {
        let s = select(&[2, 0, 2], &[0, -3], 3);
        assert_eq!(
            s.important.iter().map(|i| i.get()).collect::<Vec<_>>(),
            vec![0, 2]
        );
        assert_eq!(s.dangerous, IndexSet::from([CommentIndex(0)]));
        assert_eq!(s.warnings.len(), 1);
    }
}
