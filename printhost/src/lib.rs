#![deny(missing_docs)]
#![deny(missing_copy_implementations)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unused_import_braces)]
#![deny(unused_qualifications)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

//! This crate implements a client for the print-host HTTP api, which fronts a
//! network resin printer: it stores the printer's address, keeps a catalog of
//! printable files, and starts and reports on print jobs.

mod address;
mod error;
mod files;
mod print;
mod reply;
mod status;

pub use error::{Error, Result};
pub use files::{FileInfo, UploadProgress};
pub use status::PrintStatus;

use reqwest::Url;

/// Default size of each chunk streamed to the print host during an upload.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Client is a handle to a print-host instance.
#[derive(Clone, Debug)]
pub struct Client {
    pub(crate) url_base: Url,
    pub(crate) client: reqwest::Client,
    pub(crate) chunk_size: usize,
}

impl Client {
    /// Create a new Client talking to the print host at `url_base`, for
    /// instance `http://192.168.1.20:5001`.
    pub fn new(url_base: &str) -> Result<Self> {
        let url_base = Url::parse(url_base).map_err(|e| Error::InvalidUrl(format!("{}: {}", url_base, e)))?;
        if url_base.cannot_be_a_base() {
            return Err(Error::InvalidUrl(url_base.to_string()));
        }

        Ok(Self {
            url_base,
            client: reqwest::Client::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        })
    }

    /// Set the number of bytes handed to the connection at a time when
    /// uploading. Upload progress is reported once per chunk.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Build the url for an endpoint below the base url. Each segment is
    /// percent-encoded, so file names may be passed through as-is.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.url_base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(self.url_base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
