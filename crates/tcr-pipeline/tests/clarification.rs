//! Clarification loop: guards, merge scope, failure and in-flight behaviour

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tcr_adapters::AdapterError;
use tcr_model::VehicleLabel;
use tcr_package::DirectoryPackager;
use tcr_pipeline::{
    Notice, PipelineConfig, PipelineError, ReportPipeline, Services, Step, ValidationError,
    SYNTHESIS_NOTES,
};
use tcr_test_utils::{
    extraction, partial, uk_config, ScriptedExtraction, ScriptedSynthesis, SIGNATURE_IMAGE,
    SKETCH_PNG_BASE64, VALID_SVG,
};

const WITH_QUESTIONS: &str = r#"{
    "vehicles":[{"label":"A","plate":"AB12CDE"}],
    "questions":[
        {"field":"vehicles.B.plate","question":"What is vehicle B's plate?"},
        {"field":"accident.weather","question":"What was the weather?"}
    ]
}"#;

async fn verified(
    extraction_service: &Arc<ScriptedExtraction>,
    config: PipelineConfig,
) -> Arc<ReportPipeline> {
    let synthesis = Arc::new(ScriptedSynthesis::new());
    let pipeline = ReportPipeline::new(
        Services::new(extraction_service.clone(), synthesis.clone(), synthesis),
        config,
    );
    pipeline.start().unwrap();
    pipeline.select_config(uk_config()).unwrap();
    pipeline
        .add_evidence("scene.jpg", "image/jpeg", vec![0xFF, 0xD8])
        .unwrap();
    pipeline.submit().await.unwrap();
    assert_eq!(pipeline.step(), Step::Verification);
    Arc::new(pipeline)
}

async fn wait_for(pipeline: &ReportPipeline, step: Step) {
    while pipeline.step() != step {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_clarification_requires_questions_and_answer() {
    let extraction_service = Arc::new(ScriptedExtraction::new(extraction(
        r#"{"vehicles":[{"label":"A","plate":"AB12CDE"}]}"#,
    )));
    let pipeline = verified(&extraction_service, PipelineConfig::new()).await;

    assert!(matches!(
        pipeline.clarify("it was raining").await,
        Err(PipelineError::Validation(ValidationError::NoOpenQuestions))
    ));
    assert!(extraction_service.clarifications().is_empty());
}

#[tokio::test]
async fn test_blank_answer_is_rejected() {
    let extraction_service = Arc::new(ScriptedExtraction::new(extraction(WITH_QUESTIONS)));
    let pipeline = verified(&extraction_service, PipelineConfig::new()).await;

    assert!(matches!(
        pipeline.clarify("   ").await,
        Err(PipelineError::Validation(ValidationError::EmptyAnswer))
    ));
    assert_eq!(pipeline.step(), Step::Verification);
    assert_eq!(pipeline.questions().len(), 2);
}

#[tokio::test]
async fn test_answer_fills_only_what_it_addresses() {
    let extraction_service = Arc::new(ScriptedExtraction::new(extraction(WITH_QUESTIONS)));
    let pipeline = verified(&extraction_service, PipelineConfig::new()).await;
    pipeline
        .set_signature(VehicleLabel::A, Some(SIGNATURE_IMAGE.into()))
        .unwrap();
    extraction_service.clarify.push(Ok(partial(
        r#"{"vehicles":[{"label":"B","plate":"CD34EFG"}],"signatures":{"A":null,"B":"forged"}}"#,
    )));
    let before = pipeline.record().unwrap();

    let outcome = pipeline.clarify("B's plate is CD34EFG").await.unwrap();

    assert_eq!(outcome.cleared, 2);
    assert_eq!(pipeline.step(), Step::Verification);
    assert!(pipeline.questions().is_empty());

    let record = pipeline.record().unwrap();
    assert_eq!(record.vehicle(VehicleLabel::B).plate, "CD34EFG");
    assert_eq!(record.vehicle(VehicleLabel::A), before.vehicle(VehicleLabel::A));
    assert_eq!(record.accident, before.accident);
    assert_eq!(record.signatures, before.signatures);

    let requests = extraction_service.clarifications();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].answer, "B's plate is CD34EFG");
    assert_eq!(requests[0].questions.len(), 2);
}

#[tokio::test]
async fn test_answer_cannot_replace_synthesized_diagram() {
    let extraction_service = Arc::new(ScriptedExtraction::new(extraction(WITH_QUESTIONS)));
    let pipeline = verified(&extraction_service, PipelineConfig::new()).await;
    extraction_service.clarify.push(Ok(partial(
        r#"{"accident":{"weather":"Sunny"},
            "diagram":{"svg":"<svg width=\"400\"></svg>","sketch_base64":null,"notes":"edited by model"}}"#,
    )));

    pipeline.clarify("it was sunny").await.unwrap();

    let record = pipeline.record().unwrap();
    assert_eq!(record.accident.weather, "Sunny");
    assert_eq!(record.diagram.svg, VALID_SVG);
    assert_eq!(record.diagram.notes, SYNTHESIS_NOTES);
    assert_eq!(record.diagram.sketch_base64.as_deref(), Some(SKETCH_PNG_BASE64));
}

#[tokio::test]
async fn test_failed_clarification_keeps_questions() {
    let extraction_service = Arc::new(ScriptedExtraction::new(extraction(WITH_QUESTIONS)));
    let pipeline = verified(&extraction_service, PipelineConfig::new()).await;
    extraction_service
        .clarify
        .push(Err(AdapterError::Network("connection reset".into())));
    let before = pipeline.record();

    let result = pipeline.clarify("sunny").await;

    assert!(matches!(result, Err(PipelineError::Adapter(_))));
    assert_eq!(pipeline.step(), Step::Verification);
    assert_eq!(pipeline.questions().len(), 2);
    assert_eq!(pipeline.record(), before);
    assert_eq!(pipeline.notice(), Some(Notice::ClarificationFailed));
}

#[tokio::test]
async fn test_in_flight_clarification_blocks_second_answer_and_confirm() {
    let extraction_service = Arc::new(ScriptedExtraction::new(extraction(WITH_QUESTIONS)));
    let pipeline = verified(&extraction_service, PipelineConfig::new()).await;
    let gate = extraction_service.clarify.push_gated(Ok(partial(
        r#"{"accident":{"weather":"Sunny"}}"#,
    )));

    let task = tokio::spawn({
        let pipeline = Arc::clone(&pipeline);
        async move { pipeline.clarify("sunny").await }
    });
    wait_for(&pipeline, Step::ClarifyingPause).await;

    let snapshot = pipeline.snapshot();
    assert!(snapshot.is_clarifying());
    assert_eq!(snapshot.visible_step(), Step::Verification);
    assert!(matches!(
        pipeline.clarify("again").await,
        Err(PipelineError::Busy("clarification"))
    ));
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        pipeline.confirm(&DirectoryPackager::new(dir.path())).await,
        Err(PipelineError::Busy("clarification"))
    ));
    // edits stay available while the answer is processed
    pipeline.set_consent(VehicleLabel::A, true).unwrap();

    gate.open();
    task.await.unwrap().unwrap();

    let record = pipeline.record().unwrap();
    assert_eq!(record.accident.weather, "Sunny");
    assert!(*record.consent.get(VehicleLabel::A));
    assert_eq!(pipeline.step(), Step::Verification);
}

#[tokio::test]
async fn test_clarification_is_discarded_after_leaving_verification() {
    let extraction_service = Arc::new(ScriptedExtraction::new(extraction(WITH_QUESTIONS)));
    let pipeline = verified(&extraction_service, PipelineConfig::new()).await;
    let gate = extraction_service.clarify.push_gated(Ok(partial(
        r#"{"vehicles":[{"label":"B","plate":"LATE"}]}"#,
    )));
    let before = pipeline.record();

    let task = tokio::spawn({
        let pipeline = Arc::clone(&pipeline);
        async move { pipeline.clarify("late answer").await }
    });
    wait_for(&pipeline, Step::ClarifyingPause).await;
    pipeline.go_back_to_upload().unwrap();
    gate.open();

    assert!(matches!(task.await.unwrap(), Err(PipelineError::Stale)));
    assert_eq!(pipeline.step(), Step::UploadMedia);
    assert_eq!(pipeline.record(), before);
    assert_eq!(pipeline.questions().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_clarification_timeout_is_an_adapter_failure() {
    let extraction_service = Arc::new(ScriptedExtraction::new(extraction(WITH_QUESTIONS)));
    let config = PipelineConfig::new().with_clarification_timeout(3);
    let pipeline = verified(&extraction_service, config).await;
    extraction_service.clarify.push_hang();

    let started = tokio::time::Instant::now();
    let result = pipeline.clarify("sunny").await;

    assert!(matches!(
        result,
        Err(PipelineError::Adapter(AdapterError::Timeout {
            operation: "clarification",
            secs: 3
        }))
    ));
    assert!(started.elapsed() >= Duration::from_secs(3));
    assert_eq!(pipeline.step(), Step::Verification);
    assert_eq!(pipeline.questions().len(), 2);
}
