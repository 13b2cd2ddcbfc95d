//! Error types for the report model
//!
//! Covers:
//! - Unknown configuration codes
//! - Structural invariant violations (slot labels, violation catalog)
//! - Evidence intake and reclassification failures

use crate::config::Locale;
use crate::evidence::EvidenceId;
use crate::report::VehicleLabel;

/// Report model errors
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Jurisdiction code not recognised
    #[error("unknown locale: {0}")]
    UnknownLocale(String),

    /// Language code not recognised
    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    /// Vehicle label not `A` or `B`
    #[error("unknown vehicle label: {0}")]
    UnknownVehicleLabel(String),

    /// Violation id outside the jurisdiction catalog
    #[error("violation '{id}' is not in the {locale} catalog")]
    UnknownViolation { locale: Locale, id: String },

    /// Slot holds an entry for the wrong vehicle
    #[error("{section}[{index}] must belong to vehicle {expected}, found {found}")]
    SlotMismatch {
        section: &'static str,
        index: usize,
        expected: VehicleLabel,
        found: VehicleLabel,
    },

    /// Witness index out of range
    #[error("witness index {index} out of range (len {len})")]
    WitnessOutOfRange { index: usize, len: usize },

    /// Evidence id not in the working set
    #[error("evidence not found: {0}")]
    EvidenceNotFound(EvidenceId),

    /// File type not accepted at intake
    #[error("unsupported evidence '{file_name}' ({mime_type})")]
    UnsupportedEvidence { file_name: String, mime_type: String },

    /// Zero-length file
    #[error("evidence '{0}' is empty")]
    EmptyEvidence(String),
}
