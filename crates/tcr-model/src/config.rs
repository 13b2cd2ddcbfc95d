//! Session configuration
//!
//! Jurisdiction and response language are chosen once at session start and
//! threaded through every request afterwards.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Jurisdiction selecting the violation catalog and report framing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    /// United Kingdom
    #[serde(rename = "UK")]
    Uk,
    /// California
    #[serde(rename = "CA")]
    Ca,
    /// New York
    #[serde(rename = "NY")]
    Ny,
    /// Turkey
    #[serde(rename = "TR")]
    Tr,
}

impl Locale {
    /// All supported jurisdictions
    pub const ALL: [Locale; 4] = [Locale::Uk, Locale::Ca, Locale::Ny, Locale::Tr];

    /// Upper-case wire code
    #[inline]
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Locale::Uk => "UK",
            Locale::Ca => "CA",
            Locale::Ny => "NY",
            Locale::Tr => "TR",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UK" => Ok(Locale::Uk),
            "CA" => Ok(Locale::Ca),
            "NY" => Ok(Locale::Ny),
            "TR" => Ok(Locale::Tr),
            _ => Err(ModelError::UnknownLocale(s.to_string())),
        }
    }
}

/// Response and report language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// English
    #[serde(rename = "EN")]
    En,
    /// Turkish
    #[serde(rename = "TR")]
    Tr,
}

impl Language {
    /// Upper-case wire code
    #[inline]
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "EN",
            Language::Tr => "TR",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EN" => Ok(Language::En),
            "TR" => Ok(Language::Tr),
            _ => Err(ModelError::UnknownLanguage(s.to_string())),
        }
    }
}

/// Jurisdiction + language, immutable once selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Jurisdiction
    pub locale: Locale,
    /// Response language
    pub language: Language,
}

impl SessionConfig {
    /// Create new session configuration
    #[inline]
    #[must_use]
    pub fn new(locale: Locale, language: Language) -> Self {
        Self { locale, language }
    }
}

/// Device position supplied by the intake collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geolocation {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

impl Geolocation {
    /// Create new geolocation
    #[inline]
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_parse_is_case_insensitive() {
        assert_eq!("uk".parse::<Locale>().unwrap(), Locale::Uk);
        assert_eq!(" NY ".parse::<Locale>().unwrap(), Locale::Ny);
        assert!(matches!(
            "DE".parse::<Locale>(),
            Err(ModelError::UnknownLocale(_))
        ));
    }

    #[test]
    fn config_serializes_as_codes() {
        let config = SessionConfig::new(Locale::Tr, Language::En);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"locale":"TR","language":"EN"}"#);
    }
}
