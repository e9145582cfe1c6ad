use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::services::source::{self, TableSource};

// The original deployment's published sheets; overridable per install.
fn default_enml_sheet() -> String {
    "1vujnZVEBTGzsRctZ5rhevnsqdEPMlfdS".to_string()
}

fn default_mlml_sheet() -> String {
    "1UW8H2Kma8TNoREZ5ohnC1lV87laotTGW".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Sheet id (or pasted sheet URL) for the English-Malayalam table.
    #[serde(default = "default_enml_sheet")]
    pub enml_sheet: String,

    /// Sheet id (or pasted sheet URL) for the Malayalam-Malayalam table.
    #[serde(default = "default_mlml_sheet")]
    pub mlml_sheet: String,

    /// Local CSV override; when set, the sheet is never contacted.
    #[serde(default)]
    pub enml_file: String,

    #[serde(default)]
    pub mlml_file: String,

    #[serde(default)]
    pub cache_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            enml_sheet: default_enml_sheet(),
            mlml_sheet: default_mlml_sheet(),
            enml_file: String::new(),
            mlml_file: String::new(),
            cache_dir: String::new(),
        }
    }
}

impl AppConfig {
    pub fn cache_dir(&self) -> PathBuf {
        if !self.cache_dir.trim().is_empty() {
            return PathBuf::from(self.cache_dir.trim());
        }
        base_dir().join(".cache_data")
    }

    pub fn enml_source(&self) -> TableSource {
        table_source(&self.enml_file, &self.enml_sheet)
    }

    pub fn mlml_source(&self) -> TableSource {
        table_source(&self.mlml_file, &self.mlml_sheet)
    }
}

fn table_source(file: &str, sheet: &str) -> TableSource {
    if !file.trim().is_empty() {
        return TableSource::File(PathBuf::from(file.trim()));
    }

    // A pasted URL is accepted anywhere an id is; invalid input is kept
    // as-is so the load error names what the user actually configured.
    match source::extract_sheet_id(sheet) {
        Some(id) => TableSource::Sheet(id),
        None => TableSource::Sheet(sheet.trim().to_string()),
    }
}

fn base_dir() -> PathBuf {
    if let Ok(home) = std::env::var("NIGHANTU_HOME") {
        if !home.trim().is_empty() {
            return PathBuf::from(home);
        }
    }
    if let Ok(local) = std::env::var("LOCALAPPDATA") {
        return PathBuf::from(local).join("Nighantu");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".nighantu")
}

/// config.json in the base dir, every field optional, then environment
/// overrides. A missing or broken file falls back to defaults with a
/// warning rather than refusing to start.
pub fn load() -> AppConfig {
    let path = base_dir().join("config.json");

    let mut cfg = if path.exists() {
        match fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str::<AppConfig>(&data) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("[config] invalid {}: {e}", path.display());
                    AppConfig::default()
                }
            },
            Err(e) => {
                eprintln!("[config] failed to read {}: {e}", path.display());
                AppConfig::default()
            }
        }
    } else {
        AppConfig::default()
    };

    for (var, field) in [
        ("NIGHANTU_ENML_SHEET", &mut cfg.enml_sheet as &mut String),
        ("NIGHANTU_MLML_SHEET", &mut cfg.mlml_sheet),
        ("NIGHANTU_ENML_FILE", &mut cfg.enml_file),
        ("NIGHANTU_MLML_FILE", &mut cfg.mlml_file),
        ("NIGHANTU_CACHE_DIR", &mut cfg.cache_dir),
    ] {
        if let Ok(value) = std::env::var(var) {
            if !value.trim().is_empty() {
                *field = value;
            }
        }
    }

    cfg
}
