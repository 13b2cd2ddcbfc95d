//! Pipeline configuration

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Per-call limits for service adapters
///
/// Expiry is reported as an ordinary adapter failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Extraction call limit in seconds
    pub extraction_timeout_secs: u64,
    /// Diagram and sketch call limit in seconds (each)
    pub synthesis_timeout_secs: u64,
    /// Clarification call limit in seconds
    pub clarification_timeout_secs: u64,
}

impl PipelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With extraction timeout
    #[inline]
    #[must_use]
    pub fn with_extraction_timeout(mut self, secs: u64) -> Self {
        self.extraction_timeout_secs = secs;
        self
    }

    /// With synthesis timeout
    #[inline]
    #[must_use]
    pub fn with_synthesis_timeout(mut self, secs: u64) -> Self {
        self.synthesis_timeout_secs = secs;
        self
    }

    /// With clarification timeout
    #[inline]
    #[must_use]
    pub fn with_clarification_timeout(mut self, secs: u64) -> Self {
        self.clarification_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    #[must_use]
    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }

    #[must_use]
    pub fn clarification_timeout(&self) -> Duration {
        Duration::from_secs(self.clarification_timeout_secs)
    }

    /// Parse from TOML; missing keys keep their defaults
    ///
    /// # Errors
    /// `PipelineError::Config` on invalid TOML or zero timeouts
    pub fn from_toml_str(text: &str) -> Result<Self, PipelineError> {
        let config: Self =
            toml::from_str(text).map_err(|e| PipelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// `PipelineError::Config` if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), PipelineError> {
        let limits = [
            ("extraction_timeout_secs", self.extraction_timeout_secs),
            ("synthesis_timeout_secs", self.synthesis_timeout_secs),
            ("clarification_timeout_secs", self.clarification_timeout_secs),
        ];
        match limits.iter().find(|(_, secs)| *secs == 0) {
            Some((name, _)) => Err(PipelineError::Config(format!("{name} must be positive"))),
            None => Ok(()),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extraction_timeout_secs: 120,
            synthesis_timeout_secs: 90,
            clarification_timeout_secs: 60,
        }
    }
}
