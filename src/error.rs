// src/error.rs
use thiserror::Error;
use warp::http::StatusCode;
use warp::reject::Reject;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("object {bucket}/{key} not found")]
    NotFound { bucket: String, key: String },

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("status bad request.")]
    Auth,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to read position list: {0}")]
    Storage(StorageError),

    #[error("failed to write snapshot: {0}")]
    StorageWrite(StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("mail error: {0}")]
    Mail(String),
}

impl AppError {
    pub fn config(message: impl Into<String>) -> Self {
        AppError::Config(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Auth => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Reject for AppError {}
