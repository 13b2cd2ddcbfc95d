//! Field ownership
//!
//! Signatures and consent are always user-owned; the vector diagram becomes
//! user-owned once the user edits it. Ownership is enforced by one pure
//! restoration step applied after every merge walk, not by checks inside
//! the walk.

use serde::{Deserialize, Serialize};
use tcr_model::{PerDriver, ReportRecord};

/// Which optional fields the user currently owns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOwnership {
    /// `diagram.svg` was edited by the user
    pub diagram_svg: bool,
}

impl FieldOwnership {
    /// Nothing beyond signatures/consent is owned
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ownership with a user-edited diagram
    #[inline]
    #[must_use]
    pub fn with_edited_svg() -> Self {
        Self { diagram_svg: true }
    }

    /// Record a user edit of the diagram
    #[inline]
    pub fn mark_svg_edited(&mut self) {
        self.diagram_svg = true;
    }
}

/// Pre-merge copy of every locally-owned field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSnapshot {
    signatures: PerDriver<Option<String>>,
    consent: PerDriver<bool>,
    diagram_svg: Option<String>,
}

impl LocalSnapshot {
    /// Capture the owned fields of `record`
    #[must_use]
    pub fn capture(record: &ReportRecord, ownership: &FieldOwnership) -> Self {
        Self {
            signatures: record.signatures.clone(),
            consent: record.consent,
            diagram_svg: ownership.diagram_svg.then(|| record.diagram.svg.clone()),
        }
    }

    /// Whether the diagram markup is part of the snapshot
    #[inline]
    #[must_use]
    pub fn owns_svg(&self) -> bool {
        self.diagram_svg.is_some()
    }
}

/// Write the snapshot back over a merged record
#[must_use]
pub fn reapply_local_ownership(snapshot: &LocalSnapshot, mut merged: ReportRecord) -> ReportRecord {
    merged.signatures = snapshot.signatures.clone();
    merged.consent = snapshot.consent;
    if let Some(svg) = &snapshot.diagram_svg {
        merged.diagram.svg = svg.clone();
    }
    merged
}
