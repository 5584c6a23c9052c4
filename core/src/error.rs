use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration: {field} {reason}")]
    Configuration { field: &'static str, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SimError {
    pub fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Configuration { field, reason: reason.into() }
    }
}

pub type SimResult<T> = Result<T, SimError>;
