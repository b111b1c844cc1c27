//! 启动期错误
//!
//! Runtime paths use their module errors (`AllocError`, `ReconcileError`,
//! `RepoError`); `AppError` only covers bootstrap: config, database, io.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        AppError::Database(msg.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
