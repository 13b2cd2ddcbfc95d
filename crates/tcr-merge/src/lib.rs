//! TCR Merge
//!
//! Folds sparse [`PartialReport`](tcr_model::PartialReport)s into the
//! canonical [`ReportRecord`](tcr_model::ReportRecord).
//!
//! # Rules
//!
//! - Absent leaves leave the canonical value untouched
//! - Party entries are matched by label, never by array position
//! - Signatures and consent are never overwritten by a merge
//! - A user-edited diagram is never overwritten by a merge
//!
//! # Example
//!
//! ```rust,ignore
//! use tcr_merge::{merge_partial, FieldOwnership};
//!
//! let next = merge_partial(&record, &partial, &FieldOwnership::new());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod engine;
mod ownership;

pub use engine::{merge_partial, MergeEngine, MergeOutcome, MergeStats};
pub use ownership::{reapply_local_ownership, FieldOwnership, LocalSnapshot};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
