//! Ingestion error types

use thiserror::Error;
use tutorforge_common::errors::AppError;

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("PDF parse error: {message}")]
    PdfParse { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IngestionError> for AppError {
    fn from(e: IngestionError) -> Self {
        match e {
            IngestionError::PdfParse { message } => AppError::DocumentFormat { message },
            IngestionError::Io(e) => AppError::Io(e),
        }
    }
}
