//! The print-job controller: mediates between what the operator asks for
//! (select, upload, print, delete, change the printer address) and the
//! backend, and decides what the shared indicator shows while those
//! operations are in flight.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tokio::sync::{mpsc, Mutex};

use crate::{
    address::{self, AddressField},
    job::{self, JobSession, JobState},
    Backend, CatalogEntry, CatalogRow, Config, Error, JobId, Presenter, ProgressChannel, Result, UploadFile, UploadId, View,
    CATALOG_FAILURE_MESSAGE,
};

/// Percentage shown once the backend has accepted a print request.
const TRIGGER_MIDPOINT: f64 = 50.0;

const UPLOAD_COMPLETE: &str = "Upload complete!";
const UPLOAD_FAILED: &str = "An error occurred during the upload.";
const ADDRESS_UPDATED: &str = "Printer IP updated!";

#[derive(Default)]
struct Catalog {
    entries: Vec<CatalogEntry>,
    selection: Option<String>,
}

struct Inner<B> {
    backend: Arc<B>,
    view: Arc<dyn View>,
    config: Config,
    presenter: Arc<Mutex<Presenter>>,
    catalog: Mutex<Catalog>,
    address: Mutex<AddressField>,
    job: Mutex<Option<JobSession>>,
    next_job: AtomicU64,
    next_upload: AtomicU64,
}

/// Controller for one console. Cloning is cheap; every clone drives the
/// same state.
pub struct Controller<B> {
    inner: Arc<Inner<B>>,
}

impl<B> Clone for Controller<B> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<B> Controller<B>
where
    B: Backend,
{
    /// Create a new Controller rendering onto `view`.
    pub fn new(backend: Arc<B>, view: Arc<dyn View>, config: &Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                presenter: Arc::new(Mutex::new(Presenter::new(view.clone()))),
                view,
                config: config.clone(),
                catalog: Mutex::new(Catalog::default()),
                address: Mutex::new(AddressField::default()),
                job: Mutex::new(None),
                next_job: AtomicU64::new(1),
                next_upload: AtomicU64::new(1),
            }),
        }
    }

    /// Currently selected file name, if any.
    pub async fn selection(&self) -> Option<String> {
        self.inner.catalog.lock().await.selection.clone()
    }

    /// The last catalog fetched.
    pub async fn catalog(&self) -> Vec<CatalogEntry> {
        self.inner.catalog.lock().await.entries.clone()
    }

    /// The printer address field as shown.
    pub async fn address(&self) -> AddressField {
        self.inner.address.lock().await.clone()
    }

    /// Select `name`. The name is not checked against the catalog; this
    /// only changes which row is highlighted and what print/delete act on.
    pub async fn select_file(&self, name: &str) {
        let mut catalog = self.inner.catalog.lock().await;
        catalog.selection = Some(name.to_owned());
        self.inner
            .view
            .catalog(&CatalogRow::project(&catalog.entries, catalog.selection.as_deref()));
    }

    /// Fetch the catalog, replacing the previous one, and render it.
    pub async fn refresh_catalog(&self) -> Result<()> {
        let entries = match self.inner.backend.list().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = format!("{:?}", e), "failed to fetch the catalog");
                self.inner.view.catalog_failed(CATALOG_FAILURE_MESSAGE);
                return Err(e);
            }
        };

        let mut catalog = self.inner.catalog.lock().await;
        catalog.entries = entries;
        if self.inner.config.catalog.clear_stale_selection {
            if let Some(selection) = catalog.selection.clone() {
                if !catalog.entries.iter().any(|entry| entry.name == selection) {
                    tracing::info!(selection = selection, "selected file left the catalog, clearing selection");
                    catalog.selection = None;
                }
            }
        }
        self.inner
            .view
            .catalog(&CatalogRow::project(&catalog.entries, catalog.selection.as_deref()));
        Ok(())
    }

    /// Upload `file`, showing its progress on the indicator. The upload's
    /// own channel is released once the backend has answered, whatever the
    /// answer; on success the catalog is refreshed. Uploads may overlap each
    /// other and a running print job.
    pub async fn upload(&self, file: UploadFile) -> Result<()> {
        let id = UploadId(self.inner.next_upload.fetch_add(1, Ordering::Relaxed));
        let channel = ProgressChannel::Upload(id);
        let name = file.name.clone();
        tracing::info!(upload = %id, file_name = name, bytes = file.contents.len(), "uploading");
        self.inner.presenter.lock().await.claim(channel, "Uploading...");

        let (progress, mut reported) = mpsc::unbounded_channel();
        let upload = self.inner.backend.upload(file, progress);
        tokio::pin!(upload);

        let result = loop {
            tokio::select! {
                biased;
                Some(percent) = reported.recv() => {
                    self.inner.presenter.lock().await.set_percent(channel, percent);
                }
                result = &mut upload => break result,
            }
        };
        {
            let mut presenter = self.inner.presenter.lock().await;
            while let Ok(percent) = reported.try_recv() {
                presenter.set_percent(channel, percent);
            }
            if result.is_ok() {
                presenter.set_percent(channel, 100.0);
            }
            presenter.release(channel);
        }

        match result {
            Ok(()) => {
                tracing::info!(file_name = name, "upload complete");
                self.inner.view.notify(UPLOAD_COMPLETE);
                // A failed refresh has already been reported on the file list.
                let _ = self.refresh_catalog().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(file_name = name, error = format!("{:?}", e), "upload failed");
                self.inner.view.notify(UPLOAD_FAILED);
                Err(e)
            }
        }
    }

    /// Print the selected file; does nothing without a selection.
    ///
    /// A new job session is started: any previous job-progress loop is
    /// cancelled, the indicator is claimed for the new session, its loop is
    /// spawned, and the print request is sent. Returns once the backend has
    /// answered the request; the loop runs on until the job completes, see
    /// [Controller::wait_for_job].
    pub async fn print_selected(&self) -> Result<()> {
        let Some(filename) = self.selection().await else {
            return Ok(());
        };

        let id = JobId(self.inner.next_job.fetch_add(1, Ordering::Relaxed));
        let channel = ProgressChannel::Print(id);
        {
            let mut job = self.inner.job.lock().await;
            if let Some(previous) = job.take() {
                if !previous.is_finished() {
                    tracing::info!(previous = %previous.id, next = %id, "superseding running job");
                }
                previous.cancel();
            }
            self.inner.presenter.lock().await.claim(channel, "Preparing print...");
            *job = Some(JobSession::spawn(
                id,
                &filename,
                self.inner.backend.clone(),
                self.inner.presenter.clone(),
                self.inner.config.job.poll_interval(),
                self.inner.config.job.linger(),
            ));
        }

        tracing::info!(job = %id, filename = filename, "requesting print");
        match self.inner.backend.print(&filename).await {
            Ok(message) => {
                {
                    let mut presenter = self.inner.presenter.lock().await;
                    presenter.show(channel, &message);
                    presenter.raise_percent(channel, TRIGGER_MIDPOINT);
                }
                self.inner.view.notify(&message);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(job = %id, error = format!("{:?}", e), "print request failed");
                self.cancel_job(id).await;
                let message = format!("Print failed: {}", e);
                self.inner.presenter.lock().await.fail(channel, &message);
                self.inner.view.notify(&message);

                let presenter = self.inner.presenter.clone();
                let linger = self.inner.config.job.linger();
                tokio::spawn(async move {
                    tokio::time::sleep(linger).await;
                    presenter.lock().await.release(channel);
                });
                Err(e)
            }
        }
    }

    /// Wait for the current job-progress loop to end, returning how it
    /// ended. Returns [JobState::Idle] if no print has been started.
    pub async fn wait_for_job(&self) -> JobState {
        let state = self.inner.job.lock().await.as_ref().map(JobSession::state);
        match state {
            Some(state) => job::finished(state).await,
            None => JobState::Idle,
        }
    }

    async fn cancel_job(&self, id: JobId) {
        let mut job = self.inner.job.lock().await;
        if job.as_ref().map(|session| session.id) == Some(id) {
            if let Some(session) = job.take() {
                session.cancel();
            }
        }
    }

    /// Delete the selected file; does nothing without a selection. The
    /// selection is left as it was.
    pub async fn delete_selected(&self) -> Result<()> {
        let Some(filename) = self.selection().await else {
            return Ok(());
        };

        tracing::info!(filename = filename, "deleting");
        match self.inner.backend.delete(&filename).await {
            Ok(message) => {
                self.inner.view.notify(&message);
                // A failed refresh has already been reported on the file list.
                let _ = self.refresh_catalog().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(filename = filename, error = format!("{:?}", e), "delete failed");
                self.inner.view.notify(&e.to_string());
                Err(e)
            }
        }
    }

    /// Fetch the printer address into the address field.
    pub async fn load_address(&self) -> Result<()> {
        let value = self.inner.backend.address().await.map_err(|e| {
            tracing::warn!(error = format!("{:?}", e), "failed to load printer address");
            e
        })?;
        let mut field = self.inner.address.lock().await;
        if field.load(&value) {
            self.inner.view.address(&field);
        }
        Ok(())
    }

    /// Unlock the address field for editing.
    pub async fn edit_address(&self) {
        let mut field = self.inner.address.lock().await;
        field.edit();
        self.inner.view.address(&field);
    }

    /// Store `value` as the printer address. On success the field shows the
    /// new address and is locked again; on failure it stays editable.
    pub async fn save_address(&self, value: &str) -> Result<()> {
        let value = address::normalize(value).ok_or_else(|| Error::InvalidAddress(value.to_owned()))?;
        match self.inner.backend.set_address(value).await {
            Ok(message) => {
                tracing::info!(address = value, message = message, "printer address updated");
                let mut field = self.inner.address.lock().await;
                field.commit(value);
                self.inner.view.address(&field);
                self.inner.view.notify(ADDRESS_UPDATED);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(address = value, error = format!("{:?}", e), "failed to save printer address");
                Err(e)
            }
        }
    }
}
