use thiserror::Error;

/// Failures that stop a session from being built or configured.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("no drawable surface ({cols}x{rows} cells)")]
    NoSurface { cols: u16, rows: u16 },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of the key-value persistence backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
