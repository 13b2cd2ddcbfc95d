//! User-visible session messages (EN/TR)

use serde::{Deserialize, Serialize};
use tcr_adapters::AdapterError;
use tcr_model::Language;

/// Dismissible message shown at session level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    NoEvidence,
    ProcessingFailed,
    AuthenticationFailed,
    ClarificationFailed,
    MissingSignature,
    MissingConsent,
    PackagingFailed,
}

impl Notice {
    /// Notice for a failed extraction pass
    #[must_use]
    pub fn for_processing(err: &AdapterError) -> Self {
        if err.is_authentication() {
            Notice::AuthenticationFailed
        } else {
            Notice::ProcessingFailed
        }
    }

    /// Text in `language`
    #[must_use]
    pub fn text(self, language: Language) -> &'static str {
        match (self, language) {
            (Notice::NoEvidence, Language::En) => {
                "Please upload at least one file before proceeding."
            }
            (Notice::NoEvidence, Language::Tr) => {
                "Devam etmeden önce lütfen en az bir dosya yükleyin."
            }
            (Notice::ProcessingFailed, Language::En) => {
                "Could not connect to the AI server or process the response."
            }
            (Notice::ProcessingFailed, Language::Tr) => {
                "Yapay zeka sunucusuna bağlanılamadı veya yanıt işlenemedi."
            }
            (Notice::AuthenticationFailed, Language::En) => {
                "Invalid API Key. Please check your settings."
            }
            (Notice::AuthenticationFailed, Language::Tr) => {
                "Geçersiz API anahtarı. Lütfen ayarlarınızı kontrol edin."
            }
            (Notice::ClarificationFailed, Language::En) => {
                "An error occurred while processing your answer with the AI."
            }
            (Notice::ClarificationFailed, Language::Tr) => {
                "Yanıtınız yapay zeka ile işlenirken bir hata oluştu."
            }
            (Notice::MissingSignature, Language::En) => {
                "At least one driver must sign the report."
            }
            (Notice::MissingSignature, Language::Tr) => {
                "Tutanağı en az bir sürücünün imzalaması gerekir."
            }
            (Notice::MissingConsent, Language::En) => {
                "Both drivers must confirm their consent."
            }
            (Notice::MissingConsent, Language::Tr) => {
                "Her iki sürücünün de onay vermesi gerekir."
            }
            (Notice::PackagingFailed, Language::En) => {
                "An error occurred while creating the report package."
            }
            (Notice::PackagingFailed, Language::Tr) => {
                "Rapor paketi oluşturulurken bir hata oluştu."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_failures_get_their_own_message() {
        let auth = AdapterError::Authentication("401".into());
        let net = AdapterError::Network("reset".into());
        assert_eq!(Notice::for_processing(&auth), Notice::AuthenticationFailed);
        assert_eq!(Notice::for_processing(&net), Notice::ProcessingFailed);
    }

    #[test]
    fn every_notice_has_both_languages() {
        let all = [
            Notice::NoEvidence,
            Notice::ProcessingFailed,
            Notice::AuthenticationFailed,
            Notice::ClarificationFailed,
            Notice::MissingSignature,
            Notice::MissingConsent,
            Notice::PackagingFailed,
        ];
        for notice in all {
            assert_ne!(notice.text(Language::En), notice.text(Language::Tr));
        }
    }
}
