//! Bundle assembly
//!
//! Produces the in-memory file list of an evidence package:
//! - `Accident_Report.html` and `Accident_Report.json`
//! - `manifest.json` with a SHA-256 digest per evidence file
//! - `media/Accident_Sketch.png` when a sketch exists
//! - `media/<file name>` per evidence item, duplicates disambiguated

use crate::error::PackageError;
use crate::render::render_html;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tcr_model::{EvidenceKind, ReportRecord, UploadedEvidence, VehicleLabel};

pub const REPORT_HTML: &str = "Accident_Report.html";
pub const REPORT_JSON: &str = "Accident_Report.json";
pub const MANIFEST_JSON: &str = "manifest.json";
pub const MEDIA_DIR: &str = "media";
pub const SKETCH_FILE: &str = "Accident_Sketch.png";

/// `Accident_Evidence_Package_<YYYY-MM-DD>`
#[must_use]
pub fn bundle_name(date: NaiveDate) -> String {
    format!("Accident_Evidence_Package_{}", date.format("%Y-%m-%d"))
}

/// One evidence file as listed in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path inside the bundle
    pub path: String,
    /// Name at intake
    pub original_name: String,
    pub mime_type: String,
    pub kind: EvidenceKind,
    pub owner: Option<VehicleLabel>,
    pub size: usize,
    /// Hex SHA-256 of the content
    pub sha256: String,
}

/// Bundle manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub bundle: String,
    pub evidence: Vec<ManifestEntry>,
}

/// One file of the bundle
#[derive(Clone)]
pub struct BundleFile {
    /// Path relative to the bundle root, `/`-separated
    pub path: String,
    pub contents: Arc<[u8]>,
}

impl std::fmt::Debug for BundleFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleFile")
            .field("path", &self.path)
            .field("len", &self.contents.len())
            .finish()
    }
}

/// Assembled package, ready for a sink
#[derive(Debug, Clone)]
pub struct Bundle {
    pub name: String,
    pub files: Vec<BundleFile>,
    pub manifest: Manifest,
}

impl Bundle {
    /// Assemble the package for a confirmed record
    ///
    /// # Errors
    /// - `PackageError::InvalidRecord` if the record fails validation
    /// - `PackageError::SketchEncoding` if the stored sketch does not decode
    /// - `PackageError::Serialization` if the record cannot be serialized
    pub fn assemble(
        record: &ReportRecord,
        evidence: &[UploadedEvidence],
        date: NaiveDate,
    ) -> Result<Self, PackageError> {
        record.validate()?;
        let name = bundle_name(date);

        let mut files = vec![
            text_file(REPORT_HTML, render_html(record)),
            text_file(REPORT_JSON, serde_json::to_string_pretty(record)?),
        ];

        let mut used = HashSet::new();
        used.insert(SKETCH_FILE.to_string());
        if let Some(sketch) = &record.diagram.sketch_base64 {
            let png = STANDARD
                .decode(sketch.trim())
                .map_err(|e| PackageError::SketchEncoding(e.to_string()))?;
            files.push(BundleFile {
                path: format!("{MEDIA_DIR}/{SKETCH_FILE}"),
                contents: png.into(),
            });
        }

        let mut entries = Vec::with_capacity(evidence.len());
        for item in evidence {
            let file_name = unique_name(&sanitize(&item.file_name), &mut used);
            let path = format!("{MEDIA_DIR}/{file_name}");
            entries.push(ManifestEntry {
                path: path.clone(),
                original_name: item.file_name.clone(),
                mime_type: item.mime_type.clone(),
                kind: item.kind,
                owner: item.owner,
                size: item.len(),
                sha256: hex::encode(Sha256::digest(&item.bytes)),
            });
            files.push(BundleFile {
                path,
                contents: Arc::clone(&item.bytes),
            });
        }

        let manifest = Manifest {
            bundle: name.clone(),
            evidence: entries,
        };
        files.push(text_file(
            MANIFEST_JSON,
            serde_json::to_string_pretty(&manifest)?,
        ));

        tracing::debug!("assembled {} with {} files", name, files.len());
        Ok(Self {
            name,
            files,
            manifest,
        })
    }

    /// Lookup a file by bundle path
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&BundleFile> {
        self.files.iter().find(|f| f.path == path)
    }
}

fn text_file(path: &str, text: String) -> BundleFile {
    BundleFile {
        path: path.to_string(),
        contents: text.into_bytes().into(),
    }
}

/// Last path component, never empty or a parent reference
fn sanitize(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    match base {
        "" | "." | ".." => "evidence".to_string(),
        other => other.to_string(),
    }
}

/// `name`, or `stem_2.ext`, `stem_3.ext`, ... if already taken
fn unique_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    let ext = path.extension().and_then(|e| e.to_str());

    let mut n = 2;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{stem}_{n}.{ext}"),
            None => format!("{stem}_{n}"),
        };
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tcr_model::{EvidenceSet, Language, Locale, SessionConfig};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn bundle_name_uses_iso_date() {
        assert_eq!(bundle_name(date()), "Accident_Evidence_Package_2026-10-18");
    }

    #[test]
    fn duplicate_and_hostile_names_are_disambiguated() {
        let mut used = HashSet::new();
        used.insert(SKETCH_FILE.to_string());
        assert_eq!(unique_name("photo.jpg", &mut used), "photo.jpg");
        assert_eq!(unique_name("photo.jpg", &mut used), "photo_2.jpg");
        assert_eq!(unique_name("photo.jpg", &mut used), "photo_3.jpg");
        assert_eq!(unique_name("Accident_Sketch.png", &mut used), "Accident_Sketch_2.png");
        assert_eq!(sanitize("../../etc/passwd"), "passwd");
        assert_eq!(sanitize("C:\\Users\\me\\scan.pdf"), "scan.pdf");
        assert_eq!(sanitize(".."), "evidence");
    }

    #[test]
    fn assemble_lists_every_file_with_digest() {
        let mut record = ReportRecord::with_timestamp(
            SessionConfig::new(Locale::Uk, Language::En),
            "2026-10-18T10:15",
        );
        record.diagram.sketch_base64 = Some("iVBORw0KGgo=".into());
        let mut set = EvidenceSet::new();
        set.ingest("scene.jpg", "image/jpeg", b"abc".to_vec()).unwrap();
        set.ingest("scene.jpg", "image/jpeg", b"def".to_vec()).unwrap();

        let bundle = Bundle::assemble(&record, set.items(), date()).unwrap();

        let paths: Vec<_> = bundle.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "Accident_Report.html",
                "Accident_Report.json",
                "media/Accident_Sketch.png",
                "media/scene.jpg",
                "media/scene_2.jpg",
                "manifest.json",
            ]
        );
        assert_eq!(
            bundle.manifest.evidence[0].sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(bundle.manifest.evidence[1].original_name, "scene.jpg");
        assert_eq!(&*bundle.file("media/Accident_Sketch.png").unwrap().contents, &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn invalid_sketch_fails_assembly() {
        let mut record =
            ReportRecord::with_timestamp(SessionConfig::new(Locale::Uk, Language::En), "t");
        record.diagram.sketch_base64 = Some("***".into());
        assert!(matches!(
            Bundle::assemble(&record, &[], date()),
            Err(PackageError::SketchEncoding(_))
        ));
    }
}
