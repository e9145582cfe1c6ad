use serde::{Deserialize, Serialize};

/// One dictionary row. Original casing is preserved for display; lookups
/// case-fold the key side. Both sides are trimmed and non-empty once a pair
/// exists.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct WordPair {
    pub from_text: String,
    pub to_text: String,
}

/// Which table and which side of a pair is the search key.
///
/// The EN-ML table serves both `en-ml` and `ml-en`: the latter reads the
/// `to_content` column as the key and answers with `from_content`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    EnMl,
    MlEn,
    MlMl,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Direction> {
        match s {
            "en-ml" => Some(Direction::EnMl),
            "ml-en" => Some(Direction::MlEn),
            "ml-ml" => Some(Direction::MlMl),
            _ => None,
        }
    }

    /// True when the query key lives in the `to_content` column.
    pub fn swapped(self) -> bool {
        matches!(self, Direction::MlEn)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::EnMl => "en-ml",
            Direction::MlEn => "ml-en",
            Direction::MlMl => "ml-ml",
        }
    }
}
