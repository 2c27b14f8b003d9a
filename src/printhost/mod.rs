//! This module connects the console to a print host over HTTP.

mod control;

use ::printhost::Client as PrinthostClient;

use crate::{
    config::{BackendConfig, UploadConfig},
    Result,
};

/// Client is a connection to a print-host instance.
#[derive(Clone, Debug)]
pub struct Client {
    client: PrinthostClient,
}

impl Client {
    /// Create a new print-host backend from its configuration.
    pub fn new(backend: &BackendConfig, upload: &UploadConfig) -> Result<Self> {
        Ok(Self {
            client: PrinthostClient::new(&backend.url)?.with_chunk_size(upload.chunk_size),
        })
    }
}
