//! TutorForge QA Library
//!
//! The retrieval-and-answer side of the pipeline:
//! - [`corpus`] pairs a document's chunks with the index built over them
//! - [`prompt`] assembles the grounded tutor prompt
//! - [`pipeline`] runs embed -> retrieve -> prompt -> complete
//! - [`session`] owns the current document and the question throttle

pub mod corpus;
pub mod pipeline;
pub mod prompt;
pub mod session;

pub use corpus::{content_hash, DocumentCorpus};
pub use pipeline::{Answer, QaOptions, QaPipeline};
pub use session::{AskOutcome, DocumentSummary, TutorSession};
