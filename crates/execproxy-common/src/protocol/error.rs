use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("client not started")]
    NotStarted,

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("request too large: {size} bytes (max {limit} bytes)")]
    RequestTooLarge { size: usize, limit: usize },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("executor error: {0}")]
    Executor(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] postcard::Error),

    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProxyError>;
