#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Git command failed: {0}")]
    GitCommandError(String),

    #[error("{stream} maxBuffer length exceeded ({limit} bytes)")]
    MaxBufferExceeded { stream: &'static str, limit: usize },

    #[error("{0}")]
    GitStderr(String),

    #[error("Input required and not supplied: {0}")]
    MissingInput(&'static str),

    #[error("Invalid input {name}: {reason}")]
    InvalidInput { name: &'static str, reason: String },

    #[error("Failed to write file: {0}")]
    FileWrite(#[from] fs_extra::error::Error),

    #[error("Failed to serialize diff: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to set output {name}: {reason}")]
    OutputError { name: String, reason: String },
}

impl Error {
    /// Message reported to the pipeline when the step is marked failed.
    #[must_use]
    pub fn failure_message(&self) -> String {
        match self {
            Self::GitStderr(stderr) => format!("git diff error: {stderr}"),
            other => format!("error getting git diff: {other}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
