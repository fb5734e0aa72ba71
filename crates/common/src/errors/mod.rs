//! Error types for the TutorForge pipeline
//!
//! Provides:
//! - Distinct error types for the different failure modes
//! - A shared Result alias
//! - A clear split between fatal errors and recoverable degradations

use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Document processing errors
    #[error("Document format error: {message}")]
    DocumentFormat { message: String },

    #[error("Document produced no chunks")]
    EmptyCorpus,

    #[error("No document loaded")]
    NoDocument,

    // Validation errors
    #[error("Question is empty")]
    EmptyQuestion,

    // Index construction errors
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    // External service errors
    #[error("Embedding service error: {message}")]
    Embedding { message: String },

    #[error("Completion service error: {message}")]
    Completion { message: String },

    #[error("Completion service rate limited")]
    RateLimited,

    // Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Whether the error is recovered inside the answer pipeline and turned
    /// into an advisory instead of being surfaced to the caller.
    pub fn is_degradation(&self) -> bool {
        matches!(self, AppError::RateLimited | AppError::Completion { .. })
    }

    /// Whether the error is caller-facing input validation rather than a
    /// pipeline or service failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::EmptyCorpus | AppError::EmptyQuestion | AppError::NoDocument
        )
    }
}
