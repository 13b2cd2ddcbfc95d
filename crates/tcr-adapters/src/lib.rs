//! TCR Adapters
//!
//! Service contracts and their HTTP implementation.
//!
//! - [`ExtractionService`]: evidence → partial record + questions, and
//!   answer-scoped clarification
//! - [`DiagramService`] / [`SketchService`]: the two synthesis calls issued
//!   after extraction
//! - [`GeminiClient`]: all of the above over the generative-model API
//!
//! Prompts and parsing live in [`prompt`] and [`response`] so fakes and the
//! HTTP client agree on the wire contract.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod gemini;
mod grouping;
pub mod prompt;
pub mod response;
mod service;

pub use error::{AdapterError, ConfigError};
pub use gemini::{
    GeminiClient, GeminiConfig, DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL,
};
pub use grouping::{EvidenceGroup, EvidenceGroups};
pub use service::{
    ClarificationRequest, DiagramService, ExtractionRequest, ExtractionResponse,
    ExtractionService, SketchService, SynthesisRequest,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
