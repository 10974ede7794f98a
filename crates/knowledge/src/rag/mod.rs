//! Retrieval-augmented complaint answering.
//!
//! Classifies complaints, retrieves supporting chunks and generates replies
//! via the text-generation port.

pub mod classify;
pub mod context;
pub mod recommendations;
pub mod respond;

pub use classify::{classify_category, Classifier, LlmClassifier};
pub use context::{compose_context, RetrievedContext};
pub use respond::ComplaintResponder;
