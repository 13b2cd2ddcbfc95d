//! TCR Package
//!
//! Packaging collaborator for confirmed reports: renders the record,
//! copies every evidence file and writes a manifest of digests. The
//! bundle lands as one zip archive (`ZipPackager`) or as a plain
//! directory tree (`DirectoryPackager`).
//!
//! # Example
//!
//! ```rust,ignore
//! use tcr_package::{ReportPackager, ZipPackager};
//!
//! let receipt = ZipPackager::new("out").package(&record, &evidence).await?;
//! println!("{}", receipt.location.display());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod bundle;
mod error;
mod packager;
pub mod render;

pub use bundle::{
    bundle_name, Bundle, BundleFile, Manifest, ManifestEntry, MANIFEST_JSON, MEDIA_DIR,
    REPORT_HTML, REPORT_JSON, SKETCH_FILE,
};
pub use error::PackageError;
pub use packager::{DirectoryPackager, PackageReceipt, ReportPackager, ZipPackager};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
