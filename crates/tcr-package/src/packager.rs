//! Packaging sinks

use crate::bundle::{Bundle, BundleFile, Manifest};
use crate::error::PackageError;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tcr_model::{ReportRecord, UploadedEvidence};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// What a packager produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReceipt {
    /// `Accident_Evidence_Package_<date>`
    pub bundle_name: String,
    /// Where the bundle landed
    pub location: PathBuf,
    /// Bundle-relative paths written
    pub files: Vec<String>,
    pub manifest: Manifest,
}

/// Turns a confirmed record plus its evidence into one downloadable bundle
#[async_trait]
pub trait ReportPackager: Send + Sync {
    /// Package `record` with `evidence`
    async fn package(
        &self,
        record: &ReportRecord,
        evidence: &[UploadedEvidence],
    ) -> Result<PackageReceipt, PackageError>;
}

/// Writes each bundle as a directory under a root
#[derive(Debug, Clone)]
pub struct DirectoryPackager {
    root: PathBuf,
    date: Option<NaiveDate>,
}

impl DirectoryPackager {
    /// Create packager writing under `root`
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            date: None,
        }
    }

    /// Pin the bundle date instead of using today's UTC date
    #[inline]
    #[must_use]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Output root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn write_bundle(&self, bundle: &Bundle) -> Result<PathBuf, PackageError> {
        let location = self.root.join(&bundle.name);
        for file in &bundle.files {
            let path = file
                .path
                .split('/')
                .fold(location.clone(), |acc, part| acc.join(part));
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| PackageError::io_error(parent, e))?;
            }
            tokio::fs::write(&path, &file.contents)
                .await
                .map_err(|e| PackageError::io_error(&path, e))?;
        }
        Ok(location)
    }
}

#[async_trait]
impl ReportPackager for DirectoryPackager {
    async fn package(
        &self,
        record: &ReportRecord,
        evidence: &[UploadedEvidence],
    ) -> Result<PackageReceipt, PackageError> {
        let bundle = Bundle::assemble(record, evidence, bundle_date(self.date))?;
        let location = self.write_bundle(&bundle).await?;

        tracing::info!(
            "wrote evidence package {} ({} files)",
            location.display(),
            bundle.files.len()
        );
        Ok(receipt(bundle, location))
    }
}

/// Writes each bundle as a single `<bundle name>.zip` under a root
#[derive(Debug, Clone)]
pub struct ZipPackager {
    root: PathBuf,
    date: Option<NaiveDate>,
}

impl ZipPackager {
    /// Create packager writing archives under `root`
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            date: None,
        }
    }

    /// Pin the bundle date instead of using today's UTC date
    #[inline]
    #[must_use]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Output root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ReportPackager for ZipPackager {
    async fn package(
        &self,
        record: &ReportRecord,
        evidence: &[UploadedEvidence],
    ) -> Result<PackageReceipt, PackageError> {
        let bundle = Bundle::assemble(record, evidence, bundle_date(self.date))?;

        let files = bundle.files.clone();
        let archive = tokio::task::spawn_blocking(move || encode_zip(&files))
            .await
            .map_err(|e| PackageError::Archive(e.to_string()))??;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| PackageError::io_error(&self.root, e))?;
        let location = self.root.join(format!("{}.zip", bundle.name));
        tokio::fs::write(&location, &archive)
            .await
            .map_err(|e| PackageError::io_error(&location, e))?;

        tracing::info!(
            "wrote evidence archive {} ({} files, {} bytes)",
            location.display(),
            bundle.files.len(),
            archive.len()
        );
        Ok(receipt(bundle, location))
    }
}

/// Deflate every bundle file into an in-memory archive
fn encode_zip(files: &[BundleFile]) -> Result<Vec<u8>, PackageError> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for file in files {
        writer
            .start_file(file.path.as_str(), options)
            .map_err(|e| PackageError::Archive(e.to_string()))?;
        writer
            .write_all(&file.contents)
            .map_err(|e| PackageError::Archive(e.to_string()))?;
    }
    let cursor = writer
        .finish()
        .map_err(|e| PackageError::Archive(e.to_string()))?;
    Ok(cursor.into_inner())
}

fn bundle_date(pinned: Option<NaiveDate>) -> NaiveDate {
    pinned.unwrap_or_else(|| chrono::Utc::now().date_naive())
}

fn receipt(bundle: Bundle, location: PathBuf) -> PackageReceipt {
    PackageReceipt {
        bundle_name: bundle.name,
        location,
        files: bundle.files.into_iter().map(|f| f.path).collect(),
        manifest: bundle.manifest,
    }
}
