use std::collections::HashSet;

use serde::Serialize;

use crate::services::dictionary::normalize::normalize;
use crate::services::dictionary::store::DictionaryTable;

#[derive(Debug, Serialize)]
pub struct QaIssue {
    pub table: String,
    pub row: usize,
    pub code: String,
    pub message: String,
}

/// Read-only hygiene pass over a loaded table. Flags rows a maintainer
/// probably wants to clean up in the sheet; never mutates anything.
pub fn run(table: &DictionaryTable) -> Vec<QaIssue> {
    let mut issues: Vec<QaIssue> = Vec::new();

    // Folded (from, to) pairs already seen, for duplicate detection.
    let mut seen: HashSet<(String, String)> = HashSet::new();

    for (row, pair) in table.pairs().iter().enumerate() {
        let from_norm = normalize(&pair.from_text);
        let to_norm = normalize(&pair.to_text);

        if from_norm == to_norm {
            issues.push(QaIssue {
                table: table.name().to_string(),
                row,
                code: "SAME_AS_SOURCE".to_string(),
                message: format!("translation repeats the headword `{}`", pair.from_text),
            });
        }

        if !seen.insert((from_norm, to_norm)) {
            issues.push(QaIssue {
                table: table.name().to_string(),
                row,
                code: "DUPLICATE_PAIR".to_string(),
                message: format!(
                    "`{}` → `{}` already appears earlier in the table",
                    pair.from_text, pair.to_text
                ),
            });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::pair::WordPair;

    fn table(rows: &[(&str, &str)]) -> DictionaryTable {
        let mut t = DictionaryTable::new("en-ml");
        for (from, to) in rows {
            t.push(WordPair {
                from_text: from.to_string(),
                to_text: to.to_string(),
            });
        }
        t
    }

    #[test]
    fn clean_table_has_no_issues() {
        let t = table(&[("hello", "ഹലോ"), ("help", "സഹായം")]);
        assert!(run(&t).is_empty());
    }

    #[test]
    fn flags_duplicate_pairs_case_insensitively() {
        let t = table(&[("hello", "ഹലോ"), ("Hello", "ഹലോ")]);
        let issues = run(&t);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, "DUPLICATE_PAIR");
        assert_eq!(issues[0].row, 1);
    }

    #[test]
    fn flags_translation_identical_to_headword() {
        let t = table(&[("veedu", "Veedu")]);
        let issues = run(&t);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, "SAME_AS_SOURCE");
    }

    #[test]
    fn same_headword_different_translations_is_fine() {
        let t = table(&[("hello", "ഹലോ"), ("hello", "നമസ്കാരം")]);
        assert!(run(&t).is_empty());
    }
}
