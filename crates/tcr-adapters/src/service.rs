//! Service contracts
//!
//! The pipeline only sees these traits. [`GeminiClient`](crate::GeminiClient)
//! implements all of them over HTTP; tests plug in fakes or mocks.

use crate::error::AdapterError;
use crate::grouping::EvidenceGroups;
use async_trait::async_trait;
use tcr_model::{
    Geolocation, Language, Locale, PartialReport, PartialVehicle, Question, ReportRecord,
    SessionConfig, UploadedEvidence, VehicleLabel,
};

/// Structured-extraction request
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Evidence partitioned by kind and owner
    pub evidence_groups: EvidenceGroups,
    /// Jurisdiction
    pub locale: Locale,
    /// Response language
    pub language: Language,
    /// Device location at submission, if shared
    pub geolocation: Option<Geolocation>,
}

impl ExtractionRequest {
    /// Build a request from the working set
    #[must_use]
    pub fn new(
        evidence: &[UploadedEvidence],
        config: SessionConfig,
        geolocation: Option<Geolocation>,
    ) -> Self {
        Self {
            evidence_groups: EvidenceGroups::partition(evidence),
            locale: config.locale,
            language: config.language,
            geolocation,
        }
    }
}

/// Partial record plus the questions of one extraction pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionResponse {
    pub partial: PartialReport,
    pub questions: Vec<Question>,
}

/// Input shared by diagram and sketch synthesis
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub maneuver_a: String,
    pub maneuver_b: String,
    pub impact_a: String,
    pub impact_b: String,
    /// Still images from the scene group
    pub scene_photos: Vec<UploadedEvidence>,
}

impl SynthesisRequest {
    /// Derive the request from an extraction result
    ///
    /// Missing manoeuvres read as "Not specified"; missing impacts stay blank.
    #[must_use]
    pub fn from_extraction(partial: &PartialReport, groups: &EvidenceGroups) -> Self {
        let a = vehicle_entry(partial, VehicleLabel::A);
        let b = vehicle_entry(partial, VehicleLabel::B);
        let manoeuvre = |v: Option<&PartialVehicle>| {
            v.and_then(|v| v.manoeuvre.clone())
                .unwrap_or_else(|| "Not specified".to_string())
        };
        let impact = |v: Option<&PartialVehicle>| {
            v.and_then(|v| v.first_impact.clone()).unwrap_or_default()
        };

        Self {
            maneuver_a: manoeuvre(a),
            maneuver_b: manoeuvre(b),
            impact_a: impact(a),
            impact_b: impact(b),
            scene_photos: groups.scene_photos(),
        }
    }
}

fn vehicle_entry(partial: &PartialReport, label: VehicleLabel) -> Option<&PartialVehicle> {
    partial.vehicles.iter().find(|v| {
        v.label
            .as_deref()
            .and_then(|raw| raw.parse::<VehicleLabel>().ok())
            == Some(label)
    })
}

/// Scoped re-extraction driven by one user answer
#[derive(Debug, Clone)]
pub struct ClarificationRequest {
    /// Current canonical record
    pub record: ReportRecord,
    /// Outstanding questions
    pub questions: Vec<Question>,
    /// Free-text answer
    pub answer: String,
}

/// Structured extraction and clarification
#[async_trait]
pub trait ExtractionService: Send + Sync {
    /// Extract a partial record and open questions from evidence
    async fn extract(&self, request: ExtractionRequest)
        -> Result<ExtractionResponse, AdapterError>;

    /// Fill only what the answer addresses
    async fn clarify(&self, request: ClarificationRequest) -> Result<PartialReport, AdapterError>;
}

/// Vector diagram synthesis
#[async_trait]
pub trait DiagramService: Send + Sync {
    /// Markup with `vehicle-A` / `vehicle-B` groups
    async fn generate_diagram(&self, request: SynthesisRequest) -> Result<String, AdapterError>;
}

/// Raster sketch synthesis
#[async_trait]
pub trait SketchService: Send + Sync {
    /// Base64 PNG
    async fn generate_sketch(&self, request: SynthesisRequest) -> Result<String, AdapterError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcr_model::EvidenceSet;

    #[test]
    fn synthesis_request_uses_labels_not_positions() {
        let partial = PartialReport {
            vehicles: vec![
                PartialVehicle {
                    manoeuvre: Some("Reversing".into()),
                    first_impact: Some("Rear".into()),
                    ..PartialVehicle::labeled("B")
                },
                PartialVehicle::labeled("A"),
            ],
            ..PartialReport::default()
        };
        let mut set = EvidenceSet::new();
        set.ingest("scene.png", "image/png", vec![9u8]).unwrap();
        set.ingest("scene.mov", "video/quicktime", vec![9u8]).unwrap();

        let request =
            SynthesisRequest::from_extraction(&partial, &EvidenceGroups::partition(set.items()));

        assert_eq!(request.maneuver_a, "Not specified");
        assert_eq!(request.maneuver_b, "Reversing");
        assert_eq!(request.impact_a, "");
        assert_eq!(request.impact_b, "Rear");
        assert_eq!(request.scene_photos.len(), 1);
    }
}
