//! TCR Model
//!
//! Typed data model for a two-party traffic collision report.
//!
//! # Core Concepts
//!
//! - [`ReportRecord`]: canonical, fully-keyed record (one per session)
//! - [`PartialReport`]: sparse output of an extraction/clarification/synthesis pass
//! - [`Question`]: open question tied to a field (`document_quality` is reserved)
//! - [`EvidenceSet`]: uploaded files with kind/owner classification
//! - [`catalog`]: per-jurisdiction alleged-violation catalogs
//!
//! # Example
//!
//! ```rust,ignore
//! use tcr_model::{Language, Locale, ReportRecord, SessionConfig, VehicleLabel};
//!
//! let mut record = ReportRecord::new(SessionConfig::new(Locale::Uk, Language::En));
//! record.toggle_violation(VehicleLabel::A, "uk_1")?;
//! record.validate()?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod catalog;
mod config;
mod edit;
mod error;
mod evidence;
mod partial;
mod question;
mod report;

pub use catalog::Violation;
pub use config::{Geolocation, Language, Locale, SessionConfig};
pub use edit::{
    AccidentField, DriverField, InsuranceField, ReportEdit, VehicleField, WitnessField,
};
pub use error::ModelError;
pub use evidence::{
    is_supported, EvidenceId, EvidenceKind, EvidenceSet, PreviewHandle, PreviewRegistry,
    UploadedEvidence,
};
pub use partial::{
    PartialAccident, PartialConsent, PartialDiagram, PartialDriver, PartialGeo,
    PartialInsurance, PartialReport, PartialSignatures, PartialVehicle,
};
pub use question::{split_document_quality, Question, DOCUMENT_QUALITY_FIELD};
pub use report::{
    Accident, AccidentGeo, Diagram, Driver, Insurance, PerDriver, ReportRecord, Vehicle,
    VehicleLabel, Witness, PLACEHOLDER_SVG,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
