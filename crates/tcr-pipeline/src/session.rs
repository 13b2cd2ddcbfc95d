//! Session state
//!
//! Everything one report session owns. The pipeline keeps it behind a
//! short-lived lock that is never held across a service call.

use crate::error::PipelineError;
use crate::messages::Notice;
use crate::state::{validate_transition, Step};
use serde::Serialize;
use tcr_merge::FieldOwnership;
use tcr_model::{
    EvidenceSet, Geolocation, Language, Question, ReportRecord, SessionConfig, UploadedEvidence,
};
use tcr_package::PackageReceipt;

#[derive(Debug)]
pub(crate) struct SessionState {
    pub(crate) step: Step,
    pub(crate) config: Option<SessionConfig>,
    pub(crate) evidence: EvidenceSet,
    pub(crate) geolocation: Option<Geolocation>,
    pub(crate) record: Option<ReportRecord>,
    pub(crate) ownership: FieldOwnership,
    pub(crate) questions: Vec<Question>,
    pub(crate) quality_warning: Option<Question>,
    pub(crate) notice: Option<Notice>,
    /// Bumped whenever in-flight results must no longer apply
    pub(crate) epoch: u64,
    pub(crate) packaging: bool,
    pub(crate) receipt: Option<PackageReceipt>,
}

impl SessionState {
    pub(crate) fn new() -> Self {
        Self {
            step: Step::LandingPage,
            config: None,
            evidence: EvidenceSet::new(),
            geolocation: None,
            record: None,
            ownership: FieldOwnership::new(),
            questions: Vec::new(),
            quality_warning: None,
            notice: None,
            epoch: 0,
            packaging: false,
            receipt: None,
        }
    }

    pub(crate) fn transition(&mut self, to: Step) -> Result<(), PipelineError> {
        validate_transition(self.step, to)?;
        if self.step != to {
            tracing::info!("step {} -> {}", self.step, to);
        }
        self.step = to;
        Ok(())
    }

    /// Move to `to` only when currently at `from`
    pub(crate) fn transition_from(&mut self, from: Step, to: Step) -> Result<(), PipelineError> {
        if self.step != from {
            return Err(PipelineError::IllegalTransition {
                from: self.step,
                to,
            });
        }
        self.transition(to)
    }

    pub(crate) fn require(
        &self,
        operation: &'static str,
        steps: &[Step],
    ) -> Result<(), PipelineError> {
        if steps.contains(&self.step) {
            Ok(())
        } else {
            Err(PipelineError::WrongStep {
                operation,
                step: self.step,
            })
        }
    }

    /// Invalidate every in-flight call
    pub(crate) fn bump_epoch(&mut self) {
        self.epoch += 1;
    }

    pub(crate) fn language(&self) -> Language {
        self.config.map_or(Language::En, |c| c.language)
    }

    pub(crate) fn editable_record(
        &mut self,
        operation: &'static str,
    ) -> Result<&mut ReportRecord, PipelineError> {
        let step = self.step;
        match self.record.as_mut() {
            Some(record) if step.is_editable() => Ok(record),
            _ => Err(PipelineError::WrongStep { operation, step }),
        }
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            step: self.step,
            config: self.config,
            record: self.record.clone(),
            questions: self.questions.clone(),
            quality_warning: self.quality_warning.clone(),
            notice: self.notice,
            message: self.notice.map(|n| n.text(self.language())),
            evidence: self.evidence.snapshot(),
            diagram_edited: self.ownership.diagram_svg,
            epoch: self.epoch,
        }
    }
}

/// Point-in-time view of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub step: Step,
    pub config: Option<SessionConfig>,
    pub record: Option<ReportRecord>,
    pub questions: Vec<Question>,
    pub quality_warning: Option<Question>,
    pub notice: Option<Notice>,
    /// Notice text in the session language
    pub message: Option<&'static str>,
    #[serde(skip)]
    pub evidence: Vec<UploadedEvidence>,
    pub diagram_edited: bool,
    pub epoch: u64,
}

impl SessionSnapshot {
    /// Step the user sees
    #[must_use]
    pub fn visible_step(&self) -> Step {
        self.step.visible()
    }

    /// A clarification call is in flight
    #[must_use]
    pub fn is_clarifying(&self) -> bool {
        self.step == Step::ClarifyingPause
    }
}
