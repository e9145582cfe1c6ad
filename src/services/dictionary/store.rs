use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::model::pair::WordPair;

pub const FROM_COLUMN: &str = "from_content";
pub const TO_COLUMN: &str = "to_content";

/// Ordered sequence of pairs for one language-pair family. Row ids are
/// positions, handed to the prefix indexes and never reused (no deletion).
#[derive(Debug)]
pub struct DictionaryTable {
    name: String,
    pairs: Vec<WordPair>,
}

impl DictionaryTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pairs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pairs(&self) -> &[WordPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Appends a pair and returns its row id. The caller owns persistence
    /// and index updates.
    pub fn push(&mut self, pair: WordPair) -> u32 {
        self.pairs.push(pair);
        (self.pairs.len() - 1) as u32
    }
}

/// Parses decoded CSV text into a table. The header must carry both
/// required columns; rows where either cell is missing or trims to empty
/// are dropped, and kept values are trimmed on both sides.
pub fn parse_table(name: &str, text: &str) -> Result<DictionaryTable, CoreError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = match rdr.headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            return Err(CoreError::DataFormat {
                table: name.to_string(),
                detail: format!("unreadable header row: {e}"),
            })
        }
    };

    let from_col = headers.iter().position(|h| h.trim() == FROM_COLUMN);
    let to_col = headers.iter().position(|h| h.trim() == TO_COLUMN);

    let (from_col, to_col) = match (from_col, to_col) {
        (Some(f), Some(t)) => (f, t),
        _ => {
            return Err(CoreError::DataFormat {
                table: name.to_string(),
                detail: format!("missing required columns `{FROM_COLUMN}` and `{TO_COLUMN}`"),
            })
        }
    };

    let mut table = DictionaryTable::new(name);

    for record in rdr.records() {
        // Unparseable rows count as rows with missing values.
        let record = match record {
            Ok(r) => r,
            Err(_) => continue,
        };

        let from = record.get(from_col).unwrap_or("").trim();
        let to = record.get(to_col).unwrap_or("").trim();

        if from.is_empty() || to.is_empty() {
            continue;
        }

        table.pairs.push(WordPair {
            from_text: from.to_string(),
            to_text: to.to_string(),
        });
    }

    Ok(table)
}

/// Whole-table overwrite: header plus one row per pair, replaced atomically.
pub fn save(table: &DictionaryTable, path: &Path) -> Result<(), CoreError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    wtr.write_record([FROM_COLUMN, TO_COLUMN])
        .map_err(|e| CoreError::Persistence(e.to_string()))?;

    for p in &table.pairs {
        wtr.write_record([p.from_text.as_str(), p.to_text.as_str()])
            .map_err(|e| CoreError::Persistence(e.to_string()))?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| CoreError::Persistence(e.to_string()))?;

    write_atomic(path, &bytes).map_err(CoreError::Persistence)
}

/// Trims both fields; rejects the submission if either side is left empty.
pub fn validate_pair(from: &str, to: &str) -> Result<WordPair, CoreError> {
    let from = from.trim();
    let to = to.trim();

    if from.is_empty() || to.is_empty() {
        return Err(CoreError::Validation(
            "both fields are required".to_string(),
        ));
    }

    Ok(WordPair {
        from_text: from.to_string(),
        to_text: to.to_string(),
    })
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), String> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }

    fs::write(&tmp, bytes).map_err(|e| e.to_string())?;

    if path.exists() {
        fs::remove_file(path).map_err(|e| e.to_string())?;
    }

    fs::rename(&tmp, path).map_err(|e| e.to_string())?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "table".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn parses_trimmed_pairs() {
        let table = parse_table(
            "en-ml",
            "from_content,to_content\n hello ,ഹലോ\nhelp, സഹായം \n",
        )
        .unwrap();

        assert_eq!(
            table.pairs(),
            &[
                WordPair {
                    from_text: "hello".into(),
                    to_text: "ഹലോ".into()
                },
                WordPair {
                    from_text: "help".into(),
                    to_text: "സഹായം".into()
                },
            ]
        );
    }

    #[test]
    fn missing_column_is_a_data_format_error() {
        let err = parse_table("en-ml", "word,meaning\nhello,ഹലോ\n").unwrap_err();
        assert!(matches!(err, CoreError::DataFormat { .. }));
    }

    #[test]
    fn drops_rows_with_missing_values() {
        let table = parse_table(
            "en-ml",
            "from_content,to_content\nhello,ഹലോ\n,orphan\nghost,\n  ,  \nhelp,സഹായം\n",
        )
        .unwrap();

        assert_eq!(table.len(), 2);
    }

    #[test]
    fn extra_columns_are_ignored() {
        let table = parse_table(
            "en-ml",
            "id,from_content,notes,to_content\n1,hello,x,ഹലോ\n",
        )
        .unwrap();

        assert_eq!(table.pairs()[0].from_text, "hello");
        assert_eq!(table.pairs()[0].to_text, "ഹലോ");
    }

    #[test]
    fn save_then_parse_round_trips_the_pair_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("en_ml.csv");

        let mut table = DictionaryTable::new("en-ml");
        table.push(WordPair {
            from_text: "hello".into(),
            to_text: "ഹലോ".into(),
        });
        table.push(WordPair {
            from_text: "comma, word".into(),
            to_text: "\"quoted\"".into(),
        });

        save(&table, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let reloaded = parse_table("en-ml", &text).unwrap();

        let before: HashSet<_> = table.pairs().iter().cloned().collect();
        let after: HashSet<_> = reloaded.pairs().iter().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn save_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("en_ml.csv");
        std::fs::write(&path, "stale").unwrap();

        let mut table = DictionaryTable::new("en-ml");
        table.push(WordPair {
            from_text: "hello".into(),
            to_text: "ഹലോ".into(),
        });

        save(&table, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("from_content,to_content"));
        assert!(text.contains("hello"));
    }

    #[test]
    fn validate_pair_trims_and_rejects_empty_sides() {
        let pair = validate_pair(" hello ", " ഹലോ ").unwrap();
        assert_eq!(pair.from_text, "hello");
        assert_eq!(pair.to_text, "ഹലോ");

        assert!(matches!(
            validate_pair("  ", "ഹലോ"),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            validate_pair("hello", ""),
            Err(CoreError::Validation(_))
        ));
    }
}
