use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Required columns missing from a source table. Fatal at startup.
    #[error("{table}: {detail}")]
    DataFormat { table: String, detail: String },

    /// Source fetch/read failed before any row was parsed. Fatal at startup.
    #[error("source {source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// Bad add-word submission. Reported to the caller, no state change.
    #[error("{0}")]
    Validation(String),

    /// Write-back failed after an in-memory append. Callers downgrade this
    /// to a warning and keep the in-memory state.
    #[error("persist failed: {0}")]
    Persistence(String),
}
