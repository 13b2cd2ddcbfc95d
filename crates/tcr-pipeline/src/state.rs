//! Step state machine
//!
//! Linear flow with two bounded excursions (document-quality pause,
//! back-to-upload). There is no error state: every failure edge leads back
//! to a step the user has already seen.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Session step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Step {
    LandingPage,
    SelectCountry,
    UploadMedia,
    Processing,
    /// Blocking warning about unreadable documents
    BlurryDocumentPause,
    Verification,
    /// Clarification in flight; shown as `Verification`
    ClarifyingPause,
    ReportGenerated,
}

impl Step {
    /// Step the user sees
    #[must_use]
    pub fn visible(self) -> Step {
        match self {
            Step::ClarifyingPause => Step::Verification,
            other => other,
        }
    }

    /// Whether the record accepts user edits
    #[must_use]
    pub fn is_editable(self) -> bool {
        matches!(self, Step::Verification | Step::ClarifyingPause)
    }

    /// Whether the session is finished
    #[must_use]
    pub fn is_terminal(self) -> bool {
        allowed_transitions(self).is_empty()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Steps reachable from `from`
#[must_use]
pub fn allowed_transitions(from: Step) -> Vec<Step> {
    use Step::*;
    match from {
        LandingPage => vec![SelectCountry],
        SelectCountry => vec![UploadMedia],
        UploadMedia => vec![Processing],
        Processing => vec![BlurryDocumentPause, Verification, UploadMedia],
        BlurryDocumentPause => vec![Verification, UploadMedia],
        Verification => vec![Verification, ClarifyingPause, UploadMedia, ReportGenerated],
        ClarifyingPause => vec![Verification, UploadMedia],
        ReportGenerated => vec![],
    }
}

/// Check one transition against the table
///
/// # Errors
/// `PipelineError::IllegalTransition` if `to` is not reachable from `from`
pub fn validate_transition(from: Step, to: Step) -> Result<(), PipelineError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(PipelineError::IllegalTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_is_allowed() {
        let path = [
            Step::LandingPage,
            Step::SelectCountry,
            Step::UploadMedia,
            Step::Processing,
            Step::Verification,
            Step::ClarifyingPause,
            Step::Verification,
            Step::ReportGenerated,
        ];
        for pair in path.windows(2) {
            assert!(validate_transition(pair[0], pair[1]).is_ok(), "{pair:?}");
        }
    }

    #[test]
    fn pauses_are_only_reachable_from_their_sources() {
        assert!(validate_transition(Step::UploadMedia, Step::BlurryDocumentPause).is_err());
        assert!(validate_transition(Step::UploadMedia, Step::ClarifyingPause).is_err());
        assert!(validate_transition(Step::BlurryDocumentPause, Step::ReportGenerated).is_err());
        assert!(validate_transition(Step::ClarifyingPause, Step::ReportGenerated).is_err());
    }

    #[test]
    fn report_generated_is_terminal() {
        assert!(Step::ReportGenerated.is_terminal());
        assert!(matches!(
            validate_transition(Step::ReportGenerated, Step::UploadMedia),
            Err(PipelineError::IllegalTransition {
                from: Step::ReportGenerated,
                to: Step::UploadMedia
            })
        ));
    }

    #[test]
    fn clarifying_pause_is_shown_as_verification() {
        assert_eq!(Step::ClarifyingPause.visible(), Step::Verification);
        assert_eq!(Step::Processing.visible(), Step::Processing);
    }
}
