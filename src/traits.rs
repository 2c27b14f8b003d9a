//! The seams between the console and whatever backend it talks to. Each
//! trait covers one group of endpoints; [Backend] is everything at once.

use std::future::Future;

use tokio::sync::mpsc::UnboundedSender;

use crate::{CatalogEntry, DeviceStatus, Result, UploadFile};

/// Receives upload progress as a percentage in `[0, 100]`.
pub type ProgressSink = UnboundedSender<f64>;

/// Persists and retrieves the printer's network address.
pub trait AddressStore {
    /// Current printer address.
    fn address(&self) -> impl Future<Output = Result<String>> + Send;

    /// Store a new printer address, returning the backend's
    /// acknowledgement.
    fn set_address(&self, address: &str) -> impl Future<Output = Result<String>> + Send;
}

/// One-shot operations against the catalog of printable files. None of
/// these retry.
pub trait FileCatalog {
    /// Every file in the catalog, in the order the backend returns them.
    fn list(&self) -> impl Future<Output = Result<Vec<CatalogEntry>>> + Send;

    /// Upload `file`, reporting byte-level progress on `progress` while the
    /// body is sent.
    fn upload(&self, file: UploadFile, progress: ProgressSink) -> impl Future<Output = Result<()>> + Send;

    /// Delete `name`, returning the backend's acknowledgement.
    fn delete(&self, name: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Starting a print, and following it.
pub trait PrintControl {
    /// Trigger printing of `name`, returning the backend's acknowledgement.
    /// The job runs on after this returns.
    fn print(&self, name: &str) -> impl Future<Output = Result<String>> + Send;

    /// Completion percentage of the job printing `name`.
    fn job_progress(&self, name: &str) -> impl Future<Output = Result<f64>> + Send;
}

/// Source of [DeviceStatus] snapshots.
pub trait DeviceStatusSource {
    /// Fetch the current device status.
    fn device_status(&self) -> impl Future<Output = Result<DeviceStatus>> + Send;
}

/// Everything the console needs from a backend.
pub trait Backend: AddressStore + FileCatalog + PrintControl + DeviceStatusSource + Send + Sync + 'static {}

impl<T> Backend for T where T: AddressStore + FileCatalog + PrintControl + DeviceStatusSource + Send + Sync + 'static {}
