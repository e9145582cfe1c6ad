use std::collections::HashMap;

use super::normalize::normalize;

/// Maps every case-folded prefix of a key to the table rows whose key starts
/// with it, in first-seen order. One index exists per searchable side: the
/// EN-ML table carries two (from_content and to_content), the ML-ML table
/// one.
///
/// Rows are inserted in table order, so each candidate list preserves the
/// table's first-seen order without any sorting. Appends go through
/// `insert` in the same operation that pushes the pair, so the index never
/// lags the table.
#[derive(Debug, Default)]
pub struct PrefixIndex {
    map: HashMap<String, Vec<u32>>,
}

impl PrefixIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `row` under every char-boundary prefix of the folded key.
    /// Malayalam keys slice on char boundaries, never bytes.
    pub fn insert(&mut self, key: &str, row: u32) {
        let folded = normalize(key);

        let mut end = 0;
        for ch in folded.chars() {
            end += ch.len_utf8();
            self.map
                .entry(folded[..end].to_string())
                .or_default()
                .push(row);
        }
    }

    /// Candidate rows for an already-normalized prefix. The empty prefix has
    /// no entry: an empty query never yields the whole dictionary.
    pub fn rows(&self, prefix: &str) -> &[u32] {
        self.map.get(prefix).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}
