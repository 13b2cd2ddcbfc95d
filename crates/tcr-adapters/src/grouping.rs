//! Evidence grouping
//!
//! Documents and audio are partitioned by owner, scene evidence forms one
//! unlabeled group. Group order is fixed so prompts are stable.

use serde::Serialize;
use std::fmt;
use tcr_model::{EvidenceKind, UploadedEvidence, VehicleLabel};

/// One evidence group sent to the extraction service
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceGroup {
    #[serde(rename = "document_A")]
    DocumentA,
    #[serde(rename = "document_B")]
    DocumentB,
    Scene,
    #[serde(rename = "audio_A")]
    AudioA,
    #[serde(rename = "audio_B")]
    AudioB,
}

impl EvidenceGroup {
    /// Prompt order
    pub const ALL: [EvidenceGroup; 5] = [
        EvidenceGroup::DocumentA,
        EvidenceGroup::DocumentB,
        EvidenceGroup::Scene,
        EvidenceGroup::AudioA,
        EvidenceGroup::AudioB,
    ];

    /// Group an evidence item falls into
    #[must_use]
    pub fn of(evidence: &UploadedEvidence) -> Self {
        let owner = evidence.owner.unwrap_or(VehicleLabel::A);
        match (evidence.kind, owner) {
            (EvidenceKind::Scene, _) => EvidenceGroup::Scene,
            (EvidenceKind::Document, VehicleLabel::A) => EvidenceGroup::DocumentA,
            (EvidenceKind::Document, VehicleLabel::B) => EvidenceGroup::DocumentB,
            (EvidenceKind::Audio, VehicleLabel::A) => EvidenceGroup::AudioA,
            (EvidenceKind::Audio, VehicleLabel::B) => EvidenceGroup::AudioB,
        }
    }

    /// Wire key
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            EvidenceGroup::DocumentA => "document_A",
            EvidenceGroup::DocumentB => "document_B",
            EvidenceGroup::Scene => "scene",
            EvidenceGroup::AudioA => "audio_A",
            EvidenceGroup::AudioB => "audio_B",
        }
    }

    /// What the service should take from this group
    #[must_use]
    pub fn instruction(self) -> &'static str {
        match self {
            EvidenceGroup::DocumentA => {
                "Driver A Documents (Extract details for Vehicle A/Driver A from these)"
            }
            EvidenceGroup::DocumentB => {
                "Driver B Documents (Extract details for Vehicle B/Driver B from these)"
            }
            EvidenceGroup::Scene => {
                "Accident Scene Photos/Videos (Use for impact points, location, weather, light conditions)"
            }
            EvidenceGroup::AudioA => {
                "Driver A Audio Statement (Transcribe and use for statement and manoeuvre)"
            }
            EvidenceGroup::AudioB => {
                "Driver B Audio Statement (Transcribe and use for statement and manoeuvre)"
            }
        }
    }
}

impl fmt::Display for EvidenceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Evidence partitioned into groups, intake order kept within a group
#[derive(Debug, Clone, Default)]
pub struct EvidenceGroups {
    groups: [Vec<UploadedEvidence>; 5],
}

impl EvidenceGroups {
    /// Partition `evidence`
    #[must_use]
    pub fn partition(evidence: &[UploadedEvidence]) -> Self {
        let mut groups = Self::default();
        for item in evidence {
            groups.groups[Self::slot(EvidenceGroup::of(item))].push(item.clone());
        }
        groups
    }

    /// Items of one group
    #[must_use]
    pub fn get(&self, group: EvidenceGroup) -> &[UploadedEvidence] {
        &self.groups[Self::slot(group)]
    }

    /// Non-empty groups in prompt order
    pub fn non_empty(&self) -> impl Iterator<Item = (EvidenceGroup, &[UploadedEvidence])> {
        EvidenceGroup::ALL
            .into_iter()
            .map(|group| (group, self.get(group)))
            .filter(|(_, items)| !items.is_empty())
    }

    /// Every item, group by group
    pub fn iter(&self) -> impl Iterator<Item = &UploadedEvidence> {
        self.groups.iter().flatten()
    }

    /// Still images from the scene group
    #[must_use]
    pub fn scene_photos(&self) -> Vec<UploadedEvidence> {
        self.get(EvidenceGroup::Scene)
            .iter()
            .filter(|item| item.is_image())
            .cloned()
            .collect()
    }

    /// Total item count
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Whether no evidence is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(group: EvidenceGroup) -> usize {
        match group {
            EvidenceGroup::DocumentA => 0,
            EvidenceGroup::DocumentB => 1,
            EvidenceGroup::Scene => 2,
            EvidenceGroup::AudioA => 3,
            EvidenceGroup::AudioB => 4,
        }
    }
}
