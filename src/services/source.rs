use std::fs;
use std::path::{Path, PathBuf};
use std::{thread, time::Duration};

use rand::{thread_rng, Rng};
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use sha2::{Digest, Sha256};

use crate::error::CoreError;
use crate::services::dictionary::store::{self, DictionaryTable};
use crate::services::encoding;

const MAX_RETRIES: usize = 3;
const BASE_DELAY_MS: u64 = 800;
const TIMEOUT_SECS: u64 = 30;

/// Where a table's bytes come from: a locally maintained CSV, or a Google
/// Sheet fetched once by id and cached on disk.
#[derive(Debug, Clone)]
pub enum TableSource {
    File(PathBuf),
    Sheet(String),
}

impl TableSource {
    pub fn describe(&self) -> String {
        match self {
            TableSource::File(p) => p.display().to_string(),
            TableSource::Sheet(id) => format!("sheet {id}"),
        }
    }
}

fn backoff(attempt: usize) -> Duration {
    let jitter: u64 = thread_rng().gen_range(0..200);
    let ms = BASE_DELAY_MS * (2_u64.pow(attempt as u32)) + jitter;
    Duration::from_millis(ms)
}

fn export_url(sheet_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{sheet_id}/export?format=csv")
}

fn unavailable(source: &TableSource, reason: impl Into<String>) -> CoreError {
    CoreError::SourceUnavailable {
        source_name: source.describe(),
        reason: reason.into(),
    }
}

/// Accepts either a bare sheet id or a pasted sheet URL and returns the id.
pub fn extract_sheet_id(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Pasted URL: the id is the /d/<id> path segment.
    let url_re = Regex::new(r"/d/([A-Za-z0-9_-]+)").unwrap();
    if let Some(caps) = url_re.captures(trimmed) {
        return Some(caps[1].to_string());
    }

    if trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Some(trimmed.to_string());
    }

    None
}

/// Cache file for a sheet, keyed by a digest of its id so a config change
/// never reads another sheet's stale cache.
pub fn cache_path(cache_dir: &Path, sheet_id: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(sheet_id.as_bytes());
    let digest = hex::encode(hasher.finalize());
    cache_dir.join(format!("sheet-{}.csv", &digest[..16]))
}

fn should_retry_http(status: StatusCode) -> bool {
    // 408/429/5xx are typically temporary
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

fn fetch_sheet(source: &TableSource, sheet_id: &str) -> Result<Vec<u8>, CoreError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(TIMEOUT_SECS))
        .build()
        .map_err(|e| unavailable(source, e.to_string()))?;

    let url = export_url(sheet_id);
    let mut last_err = String::from("no attempt made");

    for attempt in 0..MAX_RETRIES {
        match client.get(&url).send() {
            Ok(resp) => {
                let status = resp.status();

                if !status.is_success() {
                    last_err = format!("HTTP {}", status.as_u16());
                    if should_retry_http(status) && attempt + 1 < MAX_RETRIES {
                        thread::sleep(backoff(attempt));
                        continue;
                    }
                    break;
                }

                match resp.bytes() {
                    Ok(bytes) => return Ok(bytes.to_vec()),
                    Err(e) => {
                        last_err = e.to_string();
                        if attempt + 1 < MAX_RETRIES {
                            thread::sleep(backoff(attempt));
                        }
                    }
                }
            }
            Err(e) => {
                last_err = e.to_string();
                if attempt + 1 < MAX_RETRIES {
                    thread::sleep(backoff(attempt));
                }
            }
        }
    }

    Err(unavailable(source, last_err))
}

/// Returns the local path holding the sheet's rows, fetching and caching on
/// first use. An existing cache is trusted and never refetched; deleting
/// the file forces a fresh download.
pub fn ensure_cached(cache_dir: &Path, source: &TableSource, sheet_id: &str) -> Result<PathBuf, CoreError> {
    let path = cache_path(cache_dir, sheet_id);
    if path.exists() {
        return Ok(path);
    }

    let bytes = fetch_sheet(source, sheet_id)?;

    store::write_atomic(&path, &bytes)
        .map_err(|e| unavailable(source, format!("cache write failed: {e}")))?;

    eprintln!("[source] cached sheet {sheet_id} -> {}", path.display());

    Ok(path)
}

/// Resolves a source to bytes, decodes, and parses the table.
pub fn load_table(
    name: &str,
    source: &TableSource,
    cache_dir: &Path,
) -> Result<DictionaryTable, CoreError> {
    let path = match source {
        TableSource::File(p) => p.clone(),
        TableSource::Sheet(id) => ensure_cached(cache_dir, source, id)?,
    };

    let bytes = fs::read(&path).map_err(|e| unavailable(source, e.to_string()))?;

    let decoded = encoding::decode_source(&bytes);
    if decoded.lossy {
        eprintln!(
            "[source] {name}: lossy decode from {}, some characters were replaced",
            decoded.encoding
        );
    }

    store::parse_table(name, &decoded.text)
}

/// Where appends write the table back: the local file when one is
/// configured, otherwise the sheet's cache file.
pub fn persist_path(source: &TableSource, cache_dir: &Path) -> PathBuf {
    match source {
        TableSource::File(p) => p.clone(),
        TableSource::Sheet(id) => cache_path(cache_dir, id),
    }
}
