//! Uploaded evidence
//!
//! Provides:
//! - Coarse kind classification from the MIME type
//! - The per-session working set with reclassification
//! - Preview handle bookkeeping (released on removal and at session end)

use crate::error::ModelError;
use crate::report::VehicleLabel;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use ulid::Ulid;

/// Unique evidence identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EvidenceId(pub Ulid);

impl EvidenceId {
    /// Generate new evidence ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for EvidenceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EvidenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse evidence kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    /// Licence, registration, policy scans
    Document,
    /// Scene photos and video
    Scene,
    /// Spoken statements
    Audio,
}

impl EvidenceKind {
    /// Initial classification from the MIME type
    #[must_use]
    pub fn classify(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") || mime_type.starts_with("video/") {
            EvidenceKind::Scene
        } else if mime_type.starts_with("audio/") {
            EvidenceKind::Audio
        } else {
            EvidenceKind::Document
        }
    }

    /// Scene evidence has no owner
    #[inline]
    #[must_use]
    pub fn is_owned(self) -> bool {
        !matches!(self, EvidenceKind::Scene)
    }
}

const DOCUMENT_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

const DOCUMENT_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx"];

/// Whether the intake accepts this file
#[must_use]
pub fn is_supported(file_name: &str, mime_type: &str) -> bool {
    if ["image/", "video/", "audio/"]
        .iter()
        .any(|prefix| mime_type.starts_with(prefix))
    {
        return true;
    }
    if DOCUMENT_MIME_TYPES.contains(&mime_type) {
        return true;
    }
    let lower = file_name.to_ascii_lowercase();
    DOCUMENT_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Opaque handle to a client-side preview of one evidence file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreviewHandle(pub Ulid);

impl fmt::Display for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "preview:{}", self.0)
    }
}

/// Live preview handles for one session
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: DashMap<PreviewHandle, String>,
}

impl PreviewRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a handle for `file_name`
    pub fn acquire(&self, file_name: &str) -> PreviewHandle {
        let handle = PreviewHandle(Ulid::new());
        self.live.insert(handle, file_name.to_string());
        handle
    }

    /// Release a handle; returns false if it was not live
    pub fn release(&self, handle: PreviewHandle) -> bool {
        let released = self.live.remove(&handle).is_some();
        if released {
            tracing::trace!("released {}", handle);
        }
        released
    }

    /// Release every live handle
    pub fn release_all(&self) -> usize {
        let count = self.live.len();
        self.live.clear();
        count
    }

    /// Number of live handles
    #[inline]
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Whether `handle` is live
    #[inline]
    #[must_use]
    pub fn is_live(&self, handle: PreviewHandle) -> bool {
        self.live.contains_key(&handle)
    }
}

/// One ingested file
///
/// Bytes are shared, so clones handed to service requests are cheap.
#[derive(Clone)]
pub struct UploadedEvidence {
    /// Identifier
    pub id: EvidenceId,
    /// Original file name
    pub file_name: String,
    /// MIME type reported at intake
    pub mime_type: String,
    /// Raw content
    pub bytes: Arc<[u8]>,
    /// Coarse kind
    pub kind: EvidenceKind,
    /// Owning party, `None` for scene evidence
    pub owner: Option<VehicleLabel>,
    /// Preview handle
    pub preview: PreviewHandle,
}

impl UploadedEvidence {
    /// Size in bytes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the file is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Still image (usable as a scene photo for synthesis)
    #[inline]
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

impl fmt::Debug for UploadedEvidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedEvidence")
            .field("id", &self.id)
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .field("kind", &self.kind)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

/// The session's working set of evidence
#[derive(Debug)]
pub struct EvidenceSet {
    items: Vec<UploadedEvidence>,
    previews: Arc<PreviewRegistry>,
}

impl EvidenceSet {
    /// Create empty set with its own preview registry
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(Arc::new(PreviewRegistry::new()))
    }

    /// Create empty set sharing `previews`
    #[must_use]
    pub fn with_registry(previews: Arc<PreviewRegistry>) -> Self {
        Self {
            items: Vec::new(),
            previews,
        }
    }

    /// Ingest one file, classifying it and assigning a default owner
    ///
    /// # Errors
    /// - `ModelError::UnsupportedEvidence` for file types the intake rejects
    /// - `ModelError::EmptyEvidence` for zero-length files
    pub fn ingest(
        &mut self,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<EvidenceId, ModelError> {
        let file_name = file_name.into();
        let mime_type = mime_type.into();
        let bytes = bytes.into();

        if !is_supported(&file_name, &mime_type) {
            return Err(ModelError::UnsupportedEvidence {
                file_name,
                mime_type,
            });
        }
        if bytes.is_empty() {
            return Err(ModelError::EmptyEvidence(file_name));
        }

        let kind = EvidenceKind::classify(&mime_type);
        let owner = kind.is_owned().then_some(VehicleLabel::A);
        let evidence = UploadedEvidence {
            id: EvidenceId::new(),
            preview: self.previews.acquire(&file_name),
            file_name,
            mime_type,
            bytes,
            kind,
            owner,
        };
        let id = evidence.id;

        tracing::debug!(
            "ingested {} as {:?} (owner {:?})",
            evidence.file_name,
            kind,
            owner
        );
        self.items.push(evidence);
        Ok(id)
    }

    /// Remove one item and release its preview
    ///
    /// # Errors
    /// `ModelError::EvidenceNotFound` if `id` is not in the set
    pub fn remove(&mut self, id: EvidenceId) -> Result<UploadedEvidence, ModelError> {
        let index = self
            .position(id)
            .ok_or(ModelError::EvidenceNotFound(id))?;
        let evidence = self.items.remove(index);
        self.previews.release(evidence.preview);
        Ok(evidence)
    }

    /// Change kind and owner
    ///
    /// Switching to scene clears the owner; a non-scene kind without an
    /// owner falls back to `A`.
    ///
    /// # Errors
    /// `ModelError::EvidenceNotFound` if `id` is not in the set
    pub fn reclassify(
        &mut self,
        id: EvidenceId,
        kind: EvidenceKind,
        owner: Option<VehicleLabel>,
    ) -> Result<(), ModelError> {
        let index = self
            .position(id)
            .ok_or(ModelError::EvidenceNotFound(id))?;
        let evidence = &mut self.items[index];

        evidence.kind = kind;
        evidence.owner = if kind.is_owned() {
            Some(owner.or(evidence.owner).unwrap_or(VehicleLabel::A))
        } else {
            None
        };
        Ok(())
    }

    /// Lookup by id
    #[must_use]
    pub fn get(&self, id: EvidenceId) -> Option<&UploadedEvidence> {
        self.items.iter().find(|e| e.id == id)
    }

    /// All items in intake order
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[UploadedEvidence] {
        &self.items
    }

    /// Cheap copy of the items for a service request
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Vec<UploadedEvidence> {
        self.items.clone()
    }

    /// Number of items
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Preview registry shared with this set
    #[inline]
    #[must_use]
    pub fn previews(&self) -> &Arc<PreviewRegistry> {
        &self.previews
    }

    fn position(&self, id: EvidenceId) -> Option<usize> {
        self.items.iter().position(|e| e.id == id)
    }
}

impl Default for EvidenceSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EvidenceSet {
    fn drop(&mut self) {
        for evidence in &self.items {
            self.previews.release(evidence.preview);
        }
    }
}
