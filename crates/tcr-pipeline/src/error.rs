//! Error types for the pipeline
//!
//! Guard failures are [`ValidationError`]s and leave the session untouched.
//! Everything else is wrapped in [`PipelineError`].

use crate::state::Step;
use tcr_adapters::AdapterError;
use tcr_model::ModelError;
use tcr_package::PackageError;

/// Transition guard failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("at least one evidence file is required")]
    NoEvidence,

    #[error("at least one driver must sign the report")]
    MissingSignature,

    #[error("both drivers must give consent")]
    MissingConsent,

    #[error("there are no open questions to answer")]
    NoOpenQuestions,

    #[error("the answer is empty")]
    EmptyAnswer,
}

/// Main pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A guard rejected the operation
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A service call failed or timed out
    #[error("adapter failed: {0}")]
    Adapter(#[from] AdapterError),

    /// The step table forbids this move
    #[error("illegal transition: {from} -> {to}")]
    IllegalTransition { from: Step, to: Step },

    /// The operation is not available at the current step
    #[error("{operation} is not available at step {step}")]
    WrongStep { operation: &'static str, step: Step },

    /// The same kind of call is already in flight
    #[error("{0} already in progress")]
    Busy(&'static str),

    /// The session moved on while the call was in flight
    #[error("response discarded: session moved on")]
    Stale,

    /// The packaging collaborator failed
    #[error("packaging failed: {0}")]
    Package(#[from] PackageError),

    /// A model invariant was violated
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Guard failure that left the session unchanged
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Late response that was dropped
    #[inline]
    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }
}
