//! Testing utilities for the TCR workspace
//!
//! Shared fixtures plus scripted fakes for the service contracts. A fake
//! replies from a queue; each reply can be immediate, held behind a
//! [`Gate`], or never resolve.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tcr_adapters::{
    response, AdapterError, ClarificationRequest, DiagramService, ExtractionRequest,
    ExtractionResponse, ExtractionService, SketchService, SynthesisRequest,
};
use tcr_model::{Language, Locale, PartialReport, ReportRecord, SessionConfig, VehicleLabel};
use tokio::sync::oneshot;

pub const VALID_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="300"><g id="vehicle-A"><rect x="40" y="120" width="60" height="30"/></g><g id="vehicle-B"><rect x="260" y="120" width="60" height="30"/></g></svg>"#;

/// PNG signature, base64
pub const SKETCH_PNG_BASE64: &str = "iVBORw0KGgo=";

pub const SIGNATURE_IMAGE: &str = "data:image/png;base64,iVBORw0KGgo=";

pub fn uk_config() -> SessionConfig {
    SessionConfig::new(Locale::Uk, Language::En)
}

pub fn tr_config() -> SessionConfig {
    SessionConfig::new(Locale::Tr, Language::Tr)
}

/// Parse an extraction reply the way the HTTP client does
pub fn extraction(json: &str) -> ExtractionResponse {
    response::parse_extraction(json).unwrap()
}

pub fn partial(json: &str) -> PartialReport {
    serde_json::from_str(json).unwrap()
}

/// Record that passes the confirmation guards
pub fn signed_record(config: SessionConfig) -> ReportRecord {
    let mut record = ReportRecord::with_timestamp(config, "2026-10-18T09:30");
    record.set_signature(VehicleLabel::A, Some(SIGNATURE_IMAGE.to_string()));
    record.set_consent(VehicleLabel::A, true);
    record.set_consent(VehicleLabel::B, true);
    record
}

/// Releases a gated reply
#[derive(Debug)]
pub struct Gate(oneshot::Sender<()>);

impl Gate {
    pub fn open(self) {
        let _ = self.0.send(());
    }
}

enum Reply<T> {
    Ready(Result<T, AdapterError>),
    Gated(oneshot::Receiver<()>, Result<T, AdapterError>),
    Hang,
}

/// Queue of replies with a fallback once it runs dry
pub struct Script<T> {
    queue: Mutex<VecDeque<Reply<T>>>,
    fallback: Result<T, AdapterError>,
}

impl<T: Clone + Send> Script<T> {
    pub fn new(fallback: Result<T, AdapterError>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback,
        }
    }

    pub fn push(&self, reply: Result<T, AdapterError>) {
        self.queue.lock().push_back(Reply::Ready(reply));
    }

    /// Queue a reply that resolves only after the gate opens
    pub fn push_gated(&self, reply: Result<T, AdapterError>) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.queue.lock().push_back(Reply::Gated(rx, reply));
        Gate(tx)
    }

    /// Queue a reply that never resolves
    pub fn push_hang(&self) {
        self.queue.lock().push_back(Reply::Hang);
    }

    pub async fn next(&self) -> Result<T, AdapterError> {
        let reply = self.queue.lock().pop_front();
        match reply {
            None => self.fallback.clone(),
            Some(Reply::Ready(result)) => result,
            Some(Reply::Gated(rx, result)) => {
                let _ = rx.await;
                result
            }
            Some(Reply::Hang) => std::future::pending().await,
        }
    }
}

/// Scripted extraction and clarification
pub struct ScriptedExtraction {
    pub extract: Script<ExtractionResponse>,
    pub clarify: Script<PartialReport>,
    requests: Mutex<Vec<ExtractionRequest>>,
    clarifications: Mutex<Vec<ClarificationRequest>>,
}

impl ScriptedExtraction {
    /// Every call answers with `response` unless scripted otherwise
    pub fn new(response: ExtractionResponse) -> Self {
        Self {
            extract: Script::new(Ok(response)),
            clarify: Script::new(Ok(PartialReport::default())),
            requests: Mutex::new(Vec::new()),
            clarifications: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: AdapterError) -> Self {
        Self {
            extract: Script::new(Err(error.clone())),
            clarify: Script::new(Err(error)),
            requests: Mutex::new(Vec::new()),
            clarifications: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ExtractionRequest> {
        self.requests.lock().clone()
    }

    pub fn clarifications(&self) -> Vec<ClarificationRequest> {
        self.clarifications.lock().clone()
    }
}

#[async_trait]
impl ExtractionService for ScriptedExtraction {
    async fn extract(
        &self,
        request: ExtractionRequest,
    ) -> Result<ExtractionResponse, AdapterError> {
        self.requests.lock().push(request);
        self.extract.next().await
    }

    async fn clarify(&self, request: ClarificationRequest) -> Result<PartialReport, AdapterError> {
        self.clarifications.lock().push(request);
        self.clarify.next().await
    }
}

/// Scripted diagram and sketch synthesis
pub struct ScriptedSynthesis {
    pub diagram: Script<String>,
    pub sketch: Script<String>,
    requests: Mutex<Vec<SynthesisRequest>>,
}

impl ScriptedSynthesis {
    /// Valid diagram and sketch on every call
    pub fn new() -> Self {
        Self {
            diagram: Script::new(Ok(VALID_SVG.to_string())),
            sketch: Script::new(Ok(SKETCH_PNG_BASE64.to_string())),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Both calls fail with `error`
    pub fn failing(error: AdapterError) -> Self {
        Self {
            diagram: Script::new(Err(error.clone())),
            sketch: Script::new(Err(error)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests.lock().clone()
    }
}

impl Default for ScriptedSynthesis {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DiagramService for ScriptedSynthesis {
    async fn generate_diagram(&self, request: SynthesisRequest) -> Result<String, AdapterError> {
        self.requests.lock().push(request);
        self.diagram.next().await
    }
}

#[async_trait]
impl SketchService for ScriptedSynthesis {
    async fn generate_sketch(&self, _request: SynthesisRequest) -> Result<String, AdapterError> {
        self.sketch.next().await
    }
}
