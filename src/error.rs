use thiserror::Error;

use crate::config::LoadError;
use crate::infra::error::InfraError;

/// Top-level error of the objcache binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("invalid replay document: {0}")]
    Replay(String),
}

impl AppError {
    pub fn replay(message: impl Into<String>) -> Self {
        Self::Replay(message.into())
    }
}
