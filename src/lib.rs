#![deny(missing_docs)]
#![deny(missing_copy_implementations)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unused_import_braces)]
#![deny(unused_qualifications)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

//! This crate implements the client side of a print-host console: it keeps
//! the catalog of printable files and the operator's selection, uploads
//! files, starts prints, and follows printer status and job progress,
//! projecting all of it onto a single [View].

mod address;
pub mod config;
mod controller;
mod error;
mod job;
mod presenter;
#[cfg(feature = "printhost")]
pub mod printhost;
mod status;
#[cfg(test)]
mod testing;
mod traits;
mod view;

pub use address::AddressField;
pub use config::Config;
pub use controller::Controller;
pub use error::{Error, Result};
pub use job::JobState;
pub use presenter::{Indicator, JobId, Presenter, ProgressChannel, UploadId};
pub use status::{StatusPoller, StatusPollerHandle, STATUS_FAILURE_MESSAGE};
pub use traits::{AddressStore, Backend, DeviceStatusSource, FileCatalog, PrintControl, ProgressSink};
pub use view::{Badge, CatalogRow, StatusReadout, View, CATALOG_FAILURE_MESSAGE};

use std::path::Path;

use bytes::Bytes;

/// Snapshot of the printer's state. Each poll replaces the previous
/// snapshot wholesale.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceStatus {
    /// Free-form status text.
    pub status: String,

    /// Progress of the running job, in `[0, 100]`.
    pub progress: f64,

    /// Is the printer reachable?
    pub online: bool,

    /// Layer being printed, when a job is running.
    pub current_layer: Option<u64>,

    /// Layers in the running job, when a job is running.
    pub total_layers: Option<u64>,
}

/// A printable file known to the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogEntry {
    /// File name, unique within one catalog snapshot.
    pub name: String,

    /// Size in megabytes.
    pub size_mb: f64,
}

/// A file to be uploaded into the catalog.
#[derive(Clone, Debug)]
pub struct UploadFile {
    /// Name the file will be stored under.
    pub name: String,

    /// Contents of the file.
    pub contents: Bytes,
}

impl UploadFile {
    /// Read a file from disk, named after the last component of `path`.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::InvalidFile(path.display().to_string()))?
            .to_owned();
        let contents = tokio::fs::read(path).await?;
        Ok(Self {
            name,
            contents: Bytes::from(contents),
        })
    }
}
