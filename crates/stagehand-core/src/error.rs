use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("unknown stage \"{0}\" (expected bare, base, or install)")]
    UnknownStage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid machine record {path}: {reason}")]
    InvalidRecord { path: String, reason: String },

    #[error("directory error: {0}")]
    Directory(String),
}
