//! Open questions raised by extraction passes

use serde::{Deserialize, Serialize};

/// Reserved field id for unreadable document evidence
pub const DOCUMENT_QUALITY_FIELD: &str = "document_quality";

/// Prompt for missing, conflicting or unreadable information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Question {
    /// Field the question relates to
    pub field: String,
    /// Question text for the user
    pub question: String,
}

impl Question {
    /// Create new question
    #[inline]
    #[must_use]
    pub fn new(field: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            question: question.into(),
        }
    }

    /// Whether this is the reserved document-quality question
    #[inline]
    #[must_use]
    pub fn is_document_quality(&self) -> bool {
        self.field == DOCUMENT_QUALITY_FIELD
    }
}

/// Pull document-quality entries out of a question list
///
/// Returns the first quality question (surfaced as a blocking warning) and
/// the remaining ordinary questions in their original order. Every quality
/// entry is removed from the ordinary list.
#[must_use]
pub fn split_document_quality(questions: Vec<Question>) -> (Option<Question>, Vec<Question>) {
    let (quality, ordinary): (Vec<_>, Vec<_>) = questions
        .into_iter()
        .partition(Question::is_document_quality);
    (quality.into_iter().next(), ordinary)
}
