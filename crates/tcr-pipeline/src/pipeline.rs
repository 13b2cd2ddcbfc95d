//! Report assembly pipeline
//!
//! Drives one session through its steps:
//! - Evidence intake and submission guard
//! - Extraction, then diagram and sketch synthesis fanned out together
//! - Merge into the canonical record and the document-quality branch
//! - Verification edits, the clarification loop and confirmation
//!
//! Each service call runs under a timeout and against an epoch captured at
//! its start. A result whose epoch is no longer current is discarded.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, ValidationError};
use crate::messages::Notice;
use crate::session::{SessionSnapshot, SessionState};
use crate::state::Step;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tcr_adapters::{
    AdapterError, ClarificationRequest, DiagramService, ExtractionRequest, ExtractionService,
    SketchService, SynthesisRequest,
};
use tcr_merge::{MergeEngine, MergeStats};
use tcr_model::{
    split_document_quality, EvidenceId, EvidenceKind, Geolocation, PartialDiagram, PartialReport,
    PreviewRegistry, Question, ReportEdit, ReportRecord, SessionConfig, UploadedEvidence,
    VehicleLabel, Witness, PLACEHOLDER_SVG,
};
use tcr_package::{PackageReceipt, ReportPackager};

/// Notes stamped on a synthesised diagram
pub const SYNTHESIS_NOTES: &str = "AI generated";

/// The external services a pipeline talks to
#[derive(Clone)]
pub struct Services {
    pub extraction: Arc<dyn ExtractionService>,
    pub diagram: Arc<dyn DiagramService>,
    pub sketch: Arc<dyn SketchService>,
}

impl Services {
    /// Separate implementations per contract
    #[must_use]
    pub fn new(
        extraction: Arc<dyn ExtractionService>,
        diagram: Arc<dyn DiagramService>,
        sketch: Arc<dyn SketchService>,
    ) -> Self {
        Self {
            extraction,
            diagram,
            sketch,
        }
    }

    /// One client serving every contract
    #[must_use]
    pub fn shared<T>(client: Arc<T>) -> Self
    where
        T: ExtractionService + DiagramService + SketchService + 'static,
    {
        Self {
            extraction: client.clone(),
            diagram: client.clone(),
            sketch: client,
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

/// Which synthesis halves fell back to a degraded value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynthesisOutcome {
    /// Placeholder diagram used
    pub diagram_degraded: bool,
    /// No sketch
    pub sketch_degraded: bool,
}

/// Result of a committed processing pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingOutcome {
    /// `Verification` or `BlurryDocumentPause`
    pub step: Step,
    /// Ordinary questions attached for display
    pub questions: Vec<Question>,
    /// Document-quality question, if any
    pub quality_warning: Option<Question>,
    pub synthesis: SynthesisOutcome,
    /// Statistics of the extraction merge
    pub merge: MergeStats,
}

/// Result of a committed clarification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClarificationOutcome {
    /// Questions cleared by this answer
    pub cleared: usize,
    pub merge: MergeStats,
}

struct ProcessingTicket {
    epoch: u64,
    request: ExtractionRequest,
    base: ReportRecord,
    engine: MergeEngine,
}

struct ProcessingPass {
    record: ReportRecord,
    questions: Vec<Question>,
    synthesis: SynthesisOutcome,
    merge: MergeStats,
}

/// One report session
///
/// All operations take `&self`; share the pipeline through an `Arc` to
/// drive it from several tasks.
#[derive(Debug)]
pub struct ReportPipeline {
    services: Services,
    config: PipelineConfig,
    state: Mutex<SessionState>,
}

impl ReportPipeline {
    /// Create a session at the landing page
    #[must_use]
    pub fn new(services: Services, config: PipelineConfig) -> Self {
        Self {
            services,
            config,
            state: Mutex::new(SessionState::new()),
        }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Session start
    // ------------------------------------------------------------------

    /// Leave the landing page
    ///
    /// # Errors
    /// `PipelineError::IllegalTransition` outside the landing page
    pub fn start(&self) -> Result<(), PipelineError> {
        self.state.lock().transition(Step::SelectCountry)
    }

    /// Fix jurisdiction and language for the rest of the session
    ///
    /// # Errors
    /// `PipelineError::WrongStep` once a configuration has been selected
    pub fn select_config(&self, config: SessionConfig) -> Result<(), PipelineError> {
        let mut state = self.state.lock();
        state.require("select_config", &[Step::SelectCountry])?;
        state.transition(Step::UploadMedia)?;
        state.config = Some(config);
        tracing::info!(
            "session configured for {} / {}",
            config.locale,
            config.language
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Evidence intake
    // ------------------------------------------------------------------

    /// Ingest one evidence file
    ///
    /// # Errors
    /// - `PipelineError::WrongStep` outside `UploadMedia`
    /// - `PipelineError::Model` for unsupported or empty files
    pub fn add_evidence(
        &self,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<EvidenceId, PipelineError> {
        let mut state = self.state.lock();
        state.require("add_evidence", &[Step::UploadMedia])?;
        Ok(state.evidence.ingest(file_name, mime_type, bytes)?)
    }

    /// Remove one evidence file, releasing its preview
    ///
    /// # Errors
    /// - `PipelineError::WrongStep` outside `UploadMedia`
    /// - `PipelineError::Model` if `id` is unknown
    pub fn remove_evidence(&self, id: EvidenceId) -> Result<UploadedEvidence, PipelineError> {
        let mut state = self.state.lock();
        state.require("remove_evidence", &[Step::UploadMedia])?;
        Ok(state.evidence.remove(id)?)
    }

    /// Change kind and owner of one evidence file before submission
    ///
    /// # Errors
    /// - `PipelineError::WrongStep` outside `UploadMedia`
    /// - `PipelineError::Model` if `id` is unknown
    pub fn reclassify_evidence(
        &self,
        id: EvidenceId,
        kind: EvidenceKind,
        owner: Option<VehicleLabel>,
    ) -> Result<(), PipelineError> {
        let mut state = self.state.lock();
        state.require("reclassify_evidence", &[Step::UploadMedia])?;
        Ok(state.evidence.reclassify(id, kind, owner)?)
    }

    /// Record (or forget) the device location sent with the next submission
    pub fn set_geolocation(&self, geolocation: Option<Geolocation>) {
        self.state.lock().geolocation = geolocation;
    }

    // ------------------------------------------------------------------
    // Processing
    // ------------------------------------------------------------------

    /// Submit the evidence set for extraction and synthesis
    ///
    /// # Errors
    /// - `PipelineError::Validation` with no evidence (state unchanged)
    /// - `PipelineError::Busy` while a submission is in flight
    /// - `PipelineError::Adapter` if extraction fails or times out; the
    ///   session returns to `UploadMedia` and keeps its previous record
    /// - `PipelineError::Stale` if the session moved on meanwhile
    pub async fn submit(&self) -> Result<ProcessingOutcome, PipelineError> {
        let ticket = self.begin_processing()?;
        let epoch = ticket.epoch;
        tracing::info!(
            "submission accepted: {} evidence items (epoch {})",
            ticket.request.evidence_groups.len(),
            epoch
        );

        match self.process(ticket).await {
            Ok(pass) => self.commit_processing(epoch, pass),
            Err(err) => Err(self.fail_processing(epoch, err)),
        }
    }

    fn begin_processing(&self) -> Result<ProcessingTicket, PipelineError> {
        let mut state = self.state.lock();
        if state.step == Step::Processing {
            return Err(PipelineError::Busy("submission"));
        }
        state.require("submit", &[Step::UploadMedia])?;
        let Some(config) = state.config else {
            return Err(PipelineError::WrongStep {
                operation: "submit",
                step: state.step,
            });
        };
        if state.evidence.is_empty() {
            tracing::warn!("submission rejected: no evidence");
            state.notice = Some(Notice::NoEvidence);
            return Err(ValidationError::NoEvidence.into());
        }

        state.transition(Step::Processing)?;
        state.bump_epoch();
        state.notice = None;
        state.quality_warning = None;

        Ok(ProcessingTicket {
            epoch: state.epoch,
            request: ExtractionRequest::new(state.evidence.items(), config, state.geolocation),
            base: state
                .record
                .clone()
                .unwrap_or_else(|| ReportRecord::new(config)),
            engine: MergeEngine::new(state.ownership),
        })
    }

    async fn process(&self, ticket: ProcessingTicket) -> Result<ProcessingPass, PipelineError> {
        let groups = ticket.request.evidence_groups.clone();
        let extraction = with_timeout(
            "extraction",
            self.config.extraction_timeout(),
            self.services.extraction.extract(ticket.request),
        )
        .await?;
        tracing::info!(
            "extraction returned {} questions",
            extraction.questions.len()
        );

        if self.epoch() != ticket.epoch {
            return Err(PipelineError::Stale);
        }

        let request = SynthesisRequest::from_extraction(&extraction.partial, &groups);
        let limit = self.config.synthesis_timeout();
        let (diagram, sketch) = futures::future::join(
            with_timeout(
                "diagram synthesis",
                limit,
                self.services.diagram.generate_diagram(request.clone()),
            ),
            with_timeout(
                "sketch synthesis",
                limit,
                self.services.sketch.generate_sketch(request),
            ),
        )
        .await;
        let (visuals, synthesis) = degrade(diagram, sketch);

        let seeded = ticket.engine.merge(&ticket.base, &extraction.partial);
        let record = ticket.engine.merge(&seeded.record, &visuals).record;

        Ok(ProcessingPass {
            record,
            questions: extraction.questions,
            synthesis,
            merge: seeded.stats,
        })
    }

    fn commit_processing(
        &self,
        epoch: u64,
        pass: ProcessingPass,
    ) -> Result<ProcessingOutcome, PipelineError> {
        let mut state = self.state.lock();
        if state.epoch != epoch || state.step != Step::Processing {
            tracing::info!(
                "discarding stale processing result (epoch {}, current {})",
                epoch,
                state.epoch
            );
            return Err(PipelineError::Stale);
        }

        let (quality_warning, questions) = split_document_quality(pass.questions);
        let next = if quality_warning.is_some() {
            Step::BlurryDocumentPause
        } else {
            Step::Verification
        };
        state.transition(next)?;
        state.record = Some(pass.record);
        state.questions.clone_from(&questions);
        state.quality_warning.clone_from(&quality_warning);

        Ok(ProcessingOutcome {
            step: next,
            questions,
            quality_warning,
            synthesis: pass.synthesis,
            merge: pass.merge,
        })
    }

    fn fail_processing(&self, epoch: u64, err: PipelineError) -> PipelineError {
        let mut state = self.state.lock();
        if err.is_stale() || state.epoch != epoch || state.step != Step::Processing {
            tracing::info!("discarding stale processing failure (epoch {})", epoch);
            return PipelineError::Stale;
        }

        tracing::error!("processing failed: {}", err);
        let notice = match &err {
            PipelineError::Adapter(adapter) => Notice::for_processing(adapter),
            _ => Notice::ProcessingFailed,
        };
        if let Err(transition) = state.transition(Step::UploadMedia) {
            return transition;
        }
        state.notice = Some(notice);
        err
    }

    /// Navigate back to intake while processing; the in-flight result is dropped
    ///
    /// # Errors
    /// `PipelineError::IllegalTransition` outside `Processing`
    pub fn abandon_processing(&self) -> Result<(), PipelineError> {
        let mut state = self.state.lock();
        state.transition_from(Step::Processing, Step::UploadMedia)?;
        state.bump_epoch();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Document-quality pause
    // ------------------------------------------------------------------

    /// Dismiss the quality warning and review the record as is
    ///
    /// # Errors
    /// `PipelineError::IllegalTransition` outside `BlurryDocumentPause`
    pub fn continue_anyway(&self) -> Result<(), PipelineError> {
        let mut state = self.state.lock();
        state.transition_from(Step::BlurryDocumentPause, Step::Verification)?;
        state.quality_warning = None;
        Ok(())
    }

    /// Dismiss the quality warning and return to intake
    ///
    /// # Errors
    /// `PipelineError::IllegalTransition` outside `BlurryDocumentPause`
    pub fn reupload(&self) -> Result<(), PipelineError> {
        let mut state = self.state.lock();
        state.transition_from(Step::BlurryDocumentPause, Step::UploadMedia)?;
        state.quality_warning = None;
        state.bump_epoch();
        Ok(())
    }

    /// Return to intake from verification, keeping the record
    ///
    /// An in-flight clarification is discarded when it resolves.
    ///
    /// # Errors
    /// - `PipelineError::Busy` while packaging
    /// - `PipelineError::WrongStep` outside verification
    pub fn go_back_to_upload(&self) -> Result<(), PipelineError> {
        let mut state = self.state.lock();
        if state.packaging {
            return Err(PipelineError::Busy("packaging"));
        }
        state.require(
            "go_back_to_upload",
            &[Step::Verification, Step::ClarifyingPause],
        )?;
        state.transition(Step::UploadMedia)?;
        state.bump_epoch();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Verification edits
    // ------------------------------------------------------------------

    /// Apply one typed field edit
    ///
    /// # Errors
    /// - `PipelineError::WrongStep` outside verification
    /// - `PipelineError::Model` for a witness index past the end
    pub fn edit(&self, edit: ReportEdit) -> Result<(), PipelineError> {
        let mut state = self.state.lock();
        Ok(state.editable_record("edit")?.apply_edit(edit)?)
    }

    /// Append an empty witness, returning its index
    ///
    /// # Errors
    /// `PipelineError::WrongStep` outside verification
    pub fn add_witness(&self) -> Result<usize, PipelineError> {
        let mut state = self.state.lock();
        Ok(state.editable_record("add_witness")?.add_witness())
    }

    /// Remove a witness
    ///
    /// # Errors
    /// - `PipelineError::WrongStep` outside verification
    /// - `PipelineError::Model` for an index past the end
    pub fn remove_witness(&self, index: usize) -> Result<Witness, PipelineError> {
        let mut state = self.state.lock();
        Ok(state.editable_record("remove_witness")?.remove_witness(index)?)
    }

    /// Add or remove an alleged violation; returns whether it is now set
    ///
    /// # Errors
    /// - `PipelineError::WrongStep` outside verification
    /// - `PipelineError::Model` for ids outside the session's catalog
    pub fn toggle_violation(&self, label: VehicleLabel, id: &str) -> Result<bool, PipelineError> {
        let mut state = self.state.lock();
        Ok(state
            .editable_record("toggle_violation")?
            .toggle_violation(label, id)?)
    }

    /// Store markup from the diagram editor; the diagram becomes user-owned
    ///
    /// # Errors
    /// `PipelineError::WrongStep` outside verification
    pub fn set_diagram_svg(&self, markup: impl Into<String>) -> Result<(), PipelineError> {
        let mut state = self.state.lock();
        state.editable_record("set_diagram_svg")?.set_diagram_svg(markup);
        state.ownership.mark_svg_edited();
        Ok(())
    }

    /// Store or clear a driver's signature image
    ///
    /// # Errors
    /// `PipelineError::WrongStep` outside verification
    pub fn set_signature(
        &self,
        label: VehicleLabel,
        image: Option<String>,
    ) -> Result<(), PipelineError> {
        let mut state = self.state.lock();
        state
            .editable_record("set_signature")?
            .set_signature(label, image);
        Ok(())
    }

    /// Set a driver's consent flag
    ///
    /// # Errors
    /// `PipelineError::WrongStep` outside verification
    pub fn set_consent(&self, label: VehicleLabel, value: bool) -> Result<(), PipelineError> {
        let mut state = self.state.lock();
        state
            .editable_record("set_consent")?
            .set_consent(label, value);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Clarification
    // ------------------------------------------------------------------

    /// Answer the open questions in free text
    ///
    /// On success every open question is cleared, whether or not the answer
    /// addressed it.
    ///
    /// # Errors
    /// - `PipelineError::Busy` while a clarification or packaging is in flight
    /// - `PipelineError::Validation` with no open questions or a blank answer
    /// - `PipelineError::Adapter` if the call fails; questions are kept
    /// - `PipelineError::Stale` if the user left verification meanwhile
    pub async fn clarify(&self, answer: &str) -> Result<ClarificationOutcome, PipelineError> {
        let (epoch, request) = self.begin_clarification(answer)?;
        tracing::info!(
            "clarification started for {} questions (epoch {})",
            request.questions.len(),
            epoch
        );

        let result = with_timeout(
            "clarification",
            self.config.clarification_timeout(),
            self.services.extraction.clarify(request),
        )
        .await;

        let mut state = self.state.lock();
        if state.epoch != epoch || state.step != Step::ClarifyingPause {
            tracing::info!("discarding stale clarification (epoch {})", epoch);
            return Err(PipelineError::Stale);
        }
        state.transition(Step::Verification)?;

        let mut partial = match result {
            Ok(partial) => partial,
            Err(err) => {
                tracing::error!("clarification failed: {}", err);
                state.notice = Some(Notice::ClarificationFailed);
                return Err(err.into());
            }
        };

        // answers never reach the diagram or signatures
        partial.diagram = None;
        partial.signatures = None;

        let engine = MergeEngine::new(state.ownership);
        let Some(current) = state.record.as_ref() else {
            return Err(PipelineError::WrongStep {
                operation: "clarify",
                step: state.step,
            });
        };
        let outcome = engine.merge(current, &partial);
        state.record = Some(outcome.record);
        let cleared = std::mem::take(&mut state.questions).len();

        Ok(ClarificationOutcome {
            cleared,
            merge: outcome.stats,
        })
    }

    fn begin_clarification(
        &self,
        answer: &str,
    ) -> Result<(u64, ClarificationRequest), PipelineError> {
        let mut state = self.state.lock();
        if state.step == Step::ClarifyingPause {
            return Err(PipelineError::Busy("clarification"));
        }
        if state.packaging {
            return Err(PipelineError::Busy("packaging"));
        }
        state.require("clarify", &[Step::Verification])?;
        if state.questions.is_empty() {
            return Err(ValidationError::NoOpenQuestions.into());
        }
        if answer.trim().is_empty() {
            return Err(ValidationError::EmptyAnswer.into());
        }
        let Some(record) = state.record.clone() else {
            return Err(PipelineError::WrongStep {
                operation: "clarify",
                step: state.step,
            });
        };

        state.transition(Step::ClarifyingPause)?;
        state.notice = None;
        Ok((
            state.epoch,
            ClarificationRequest {
                record,
                questions: state.questions.clone(),
                answer: answer.to_string(),
            },
        ))
    }

    // ------------------------------------------------------------------
    // Confirmation
    // ------------------------------------------------------------------

    /// Confirm the report and hand it to `packager`
    ///
    /// # Errors
    /// - `PipelineError::Validation` without a signature or full consent
    /// - `PipelineError::Busy` while a clarification or packaging is in flight
    /// - `PipelineError::Package` if packaging fails; the session stays in
    ///   verification
    pub async fn confirm(
        &self,
        packager: &dyn ReportPackager,
    ) -> Result<PackageReceipt, PipelineError> {
        let (record, evidence) = self.begin_confirmation()?;

        let result = packager.package(&record, &evidence).await;

        let mut state = self.state.lock();
        state.packaging = false;
        match result {
            Ok(receipt) => {
                state.transition(Step::ReportGenerated)?;
                state.receipt = Some(receipt.clone());
                tracing::info!("report generated: {}", receipt.location.display());
                Ok(receipt)
            }
            Err(err) => {
                tracing::error!("packaging failed: {}", err);
                state.notice = Some(Notice::PackagingFailed);
                Err(err.into())
            }
        }
    }

    fn begin_confirmation(&self) -> Result<(ReportRecord, Vec<UploadedEvidence>), PipelineError> {
        let mut state = self.state.lock();
        if state.packaging {
            return Err(PipelineError::Busy("packaging"));
        }
        if state.step == Step::ClarifyingPause {
            return Err(PipelineError::Busy("clarification"));
        }
        state.require("confirm", &[Step::Verification])?;
        let Some(record) = state.record.clone() else {
            return Err(PipelineError::WrongStep {
                operation: "confirm",
                step: state.step,
            });
        };

        let guard = if !record.has_any_signature() {
            Some((ValidationError::MissingSignature, Notice::MissingSignature))
        } else if !record.has_full_consent() {
            Some((ValidationError::MissingConsent, Notice::MissingConsent))
        } else {
            None
        };
        if let Some((error, notice)) = guard {
            tracing::warn!("confirmation rejected: {}", error);
            state.notice = Some(notice);
            return Err(error.into());
        }

        state.packaging = true;
        state.notice = None;
        Ok((record, state.evidence.snapshot()))
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Clear the session message
    pub fn dismiss_notice(&self) {
        self.state.lock().notice = None;
    }

    /// Current step
    #[must_use]
    pub fn step(&self) -> Step {
        self.state.lock().step
    }

    /// Current epoch
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.state.lock().epoch
    }

    /// Copy of the canonical record
    #[must_use]
    pub fn record(&self) -> Option<ReportRecord> {
        self.state.lock().record.clone()
    }

    /// Open questions
    #[must_use]
    pub fn questions(&self) -> Vec<Question> {
        self.state.lock().questions.clone()
    }

    /// Pending session message
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        self.state.lock().notice
    }

    /// Receipt of the generated package
    #[must_use]
    pub fn receipt(&self) -> Option<PackageReceipt> {
        self.state.lock().receipt.clone()
    }

    /// Preview handles of the evidence set
    #[must_use]
    pub fn previews(&self) -> Arc<PreviewRegistry> {
        Arc::clone(self.state.lock().evidence.previews())
    }

    /// Point-in-time view of the whole session
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().snapshot()
    }

    /// End the session, releasing every preview handle
    pub fn end(self) -> usize {
        let state = self.state.into_inner();
        let released = state.evidence.previews().release_all();
        tracing::debug!("session ended, released {} previews", released);
        released
    }
}

/// Run one adapter call under `limit`; expiry is an adapter failure
async fn with_timeout<T, F>(
    operation: &'static str,
    limit: Duration,
    call: F,
) -> Result<T, AdapterError>
where
    F: Future<Output = Result<T, AdapterError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("{} timed out after {:?}", operation, limit);
            Err(AdapterError::Timeout {
                operation,
                secs: limit.as_secs(),
            })
        }
    }
}

/// Turn the two synthesis results into a diagram update
fn degrade(
    diagram: Result<String, AdapterError>,
    sketch: Result<String, AdapterError>,
) -> (PartialReport, SynthesisOutcome) {
    let mut outcome = SynthesisOutcome::default();

    let svg = diagram.unwrap_or_else(|err| {
        tracing::warn!("diagram synthesis failed, using placeholder: {}", err);
        outcome.diagram_degraded = true;
        PLACEHOLDER_SVG.to_string()
    });
    let sketch = match sketch {
        Ok(encoded) => Some(encoded),
        Err(err) => {
            tracing::warn!("sketch synthesis failed, leaving sketch empty: {}", err);
            outcome.sketch_degraded = true;
            None
        }
    };

    let partial = PartialReport {
        diagram: Some(PartialDiagram {
            svg: Some(svg),
            sketch_base64: Some(sketch),
            notes: Some(SYNTHESIS_NOTES.to_string()),
        }),
        ..PartialReport::default()
    };
    (partial, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrade_isolates_each_half() {
        let (partial, outcome) = degrade(
            Err(AdapterError::Malformed("no svg".into())),
            Ok("iVBORw0KGgo=".into()),
        );
        let diagram = partial.diagram.unwrap();
        assert_eq!(diagram.svg.as_deref(), Some(PLACEHOLDER_SVG));
        assert_eq!(diagram.sketch_base64, Some(Some("iVBORw0KGgo=".to_string())));
        assert_eq!(
            outcome,
            SynthesisOutcome {
                diagram_degraded: true,
                sketch_degraded: false
            }
        );

        let (partial, outcome) = degrade(
            Ok("<svg/>".into()),
            Err(AdapterError::Network("reset".into())),
        );
        assert_eq!(partial.diagram.unwrap().sketch_base64, Some(None));
        assert!(outcome.sketch_degraded && !outcome.diagram_degraded);
    }

    #[tokio::test(start_paused = true)]
    async fn with_timeout_maps_expiry_to_adapter_error() {
        let result: Result<(), _> = with_timeout(
            "extraction",
            Duration::from_secs(5),
            std::future::pending::<Result<(), AdapterError>>(),
        )
        .await;
        assert_eq!(
            result,
            Err(AdapterError::Timeout {
                operation: "extraction",
                secs: 5
            })
        );
    }
}
