//! Step table properties and request wiring checked with a mock service

use async_trait::async_trait;
use mockall::mock;
use proptest::prelude::*;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tcr_adapters::{
    AdapterError, ClarificationRequest, ExtractionRequest, ExtractionResponse, ExtractionService,
};
use tcr_model::{Geolocation, Language, Locale, PartialReport, SessionConfig};
use tcr_pipeline::{
    allowed_transitions, validate_transition, PipelineConfig, PipelineError, ReportPipeline,
    Services, Step,
};
use tcr_test_utils::ScriptedSynthesis;

const STEPS: [Step; 8] = [
    Step::LandingPage,
    Step::SelectCountry,
    Step::UploadMedia,
    Step::Processing,
    Step::BlurryDocumentPause,
    Step::Verification,
    Step::ClarifyingPause,
    Step::ReportGenerated,
];

mock! {
    pub Extraction {}

    #[async_trait]
    impl ExtractionService for Extraction {
        async fn extract(&self, request: ExtractionRequest)
            -> Result<ExtractionResponse, AdapterError>;
        async fn clarify(&self, request: ClarificationRequest)
            -> Result<PartialReport, AdapterError>;
    }
}

fn step() -> impl Strategy<Value = Step> {
    prop::sample::select(STEPS.to_vec())
}

proptest! {
    #[test]
    fn prop_validate_agrees_with_table(from in step(), to in step()) {
        let allowed = allowed_transitions(from).contains(&to);
        prop_assert_eq!(validate_transition(from, to).is_ok(), allowed);
    }

    #[test]
    fn prop_only_verification_reaches_report_generated(from in step()) {
        let reaches = allowed_transitions(from).contains(&Step::ReportGenerated);
        prop_assert_eq!(reaches, from == Step::Verification);
    }

    #[test]
    fn prop_pause_steps_only_exit_backwards_or_to_verification(from in step()) {
        if matches!(from, Step::BlurryDocumentPause | Step::ClarifyingPause) {
            for to in allowed_transitions(from) {
                prop_assert!(matches!(to, Step::Verification | Step::UploadMedia));
            }
        }
    }
}

#[test]
fn test_every_step_is_reachable_from_landing_page() {
    let mut seen = HashSet::from([Step::LandingPage]);
    let mut queue = VecDeque::from([Step::LandingPage]);
    while let Some(step) = queue.pop_front() {
        for next in allowed_transitions(step) {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    assert_eq!(seen.len(), STEPS.len());
    assert!(STEPS.iter().all(|s| s.is_terminal() == (*s == Step::ReportGenerated)));
}

#[test]
fn test_out_of_order_operations_are_rejected() {
    let synthesis = Arc::new(ScriptedSynthesis::new());
    let pipeline = ReportPipeline::new(
        Services::new(
            Arc::new(MockExtraction::new()),
            synthesis.clone(),
            synthesis,
        ),
        PipelineConfig::new(),
    );

    assert!(matches!(
        pipeline.select_config(SessionConfig::new(Locale::Uk, Language::En)),
        Err(PipelineError::WrongStep { .. })
    ));
    assert!(pipeline.continue_anyway().is_err());
    assert!(pipeline.abandon_processing().is_err());
    pipeline.start().unwrap();
    assert!(pipeline.start().is_err());
    assert_eq!(pipeline.step(), Step::SelectCountry);
}

#[tokio::test]
async fn test_submission_carries_session_config_and_location() {
    let mut mock = MockExtraction::new();
    mock.expect_extract()
        .times(1)
        .withf(|request| {
            request.locale == Locale::Tr
                && request.language == Language::Tr
                && request.geolocation == Some(Geolocation::new(41.0082, 28.9784))
                && request.evidence_groups.len() == 1
        })
        .returning(|_| Ok(ExtractionResponse::default()));
    mock.expect_clarify().never();

    let synthesis = Arc::new(ScriptedSynthesis::new());
    let pipeline = ReportPipeline::new(
        Services::new(Arc::new(mock), synthesis.clone(), synthesis),
        PipelineConfig::new(),
    );
    pipeline.start().unwrap();
    pipeline
        .select_config(SessionConfig::new(Locale::Tr, Language::Tr))
        .unwrap();
    pipeline.set_geolocation(Some(Geolocation::new(41.0082, 28.9784)));
    pipeline
        .add_evidence("kaza.jpg", "image/jpeg", vec![0xFF, 0xD8])
        .unwrap();

    let outcome = pipeline.submit().await.unwrap();

    assert_eq!(outcome.step, Step::Verification);
    let record = pipeline.record().unwrap();
    assert_eq!(record.locale, Locale::Tr);
    assert_eq!(record.language, Language::Tr);
}
