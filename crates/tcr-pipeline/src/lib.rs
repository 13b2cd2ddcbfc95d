//! TCR Pipeline
//!
//! Orchestrates one collision-report session from evidence intake to a
//! packaged report.
//!
//! # Architecture
//!
//! - [`Step`]: explicit step table; every move goes through
//!   [`validate_transition`]
//! - [`ReportPipeline`]: owns the session state and drives the service
//!   adapters under per-call timeouts
//! - Late results are discarded by epoch, never applied
//!
//! # Example
//!
//! ```rust,ignore
//! use tcr_pipeline::{PipelineConfig, ReportPipeline, Services};
//!
//! let pipeline = ReportPipeline::new(Services::shared(client), PipelineConfig::new());
//! pipeline.start()?;
//! pipeline.select_config(config)?;
//! pipeline.add_evidence("scene.jpg", "image/jpeg", bytes)?;
//! let outcome = pipeline.submit().await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod error;
mod messages;
mod pipeline;
mod session;
mod state;

pub use config::PipelineConfig;
pub use error::{PipelineError, ValidationError};
pub use messages::Notice;
pub use pipeline::{
    ClarificationOutcome, ProcessingOutcome, ReportPipeline, Services, SynthesisOutcome,
    SYNTHESIS_NOTES,
};
pub use session::SessionSnapshot;
pub use state::{allowed_transitions, validate_transition, Step};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
