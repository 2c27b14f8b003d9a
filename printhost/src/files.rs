use bytes::Bytes;
use futures::StreamExt;
use reqwest::{multipart, Body, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use super::Client;
use crate::{
    reply::{FilenameRequest, MessageReply, Reply},
    Error, Result,
};

/// File stored by the print host, ready to be printed.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct FileInfo {
    /// Name of the file, unique within one listing.
    pub name: String,

    /// Size of the file in megabytes, rounded to two decimals by the host.
    pub size: f64,
}

/// Byte-level progress of an upload, reported each time a chunk is handed
/// to the connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadProgress {
    /// Bytes handed to the connection so far.
    pub bytes_sent: u64,

    /// Size of the whole file.
    pub total_bytes: u64,
}

impl UploadProgress {
    /// Progress as a percentage in `[0, 100]`. An empty file is complete as
    /// soon as it starts.
    pub fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 100.0;
        }
        (self.bytes_sent.min(self.total_bytes) as f64 / self.total_bytes as f64) * 100.0
    }
}

impl Client {
    /// List the files known to the print host, in the order the host
    /// returns them.
    pub async fn files(&self) -> Result<Vec<FileInfo>> {
        Ok(self
            .client
            .get(self.endpoint(&["files"])?)
            .send()
            .await?
            .json()
            .await?)
    }

    /// Upload `contents` to the print host as `file_name`.
    ///
    /// Progress is sent on `progress` as the body is streamed: once with
    /// zero bytes before the request starts, and once per chunk after that.
    /// A dropped receiver is not an error. Anything but `200 OK` from the
    /// host is reported as [Error::UploadRejected].
    pub async fn upload(&self, file_name: &str, contents: Bytes, progress: UnboundedSender<UploadProgress>) -> Result<()> {
        let total_bytes = contents.len() as u64;
        let chunk_size = self.chunk_size;
        let chunks: Vec<Bytes> = (0..contents.len())
            .step_by(chunk_size)
            .map(|start| contents.slice(start..(start + chunk_size).min(contents.len())))
            .collect();

        let _ = progress.send(UploadProgress {
            bytes_sent: 0,
            total_bytes,
        });

        let mut bytes_sent = 0u64;
        let body = futures::stream::iter(chunks).map(move |chunk| {
            bytes_sent += chunk.len() as u64;
            let _ = progress.send(UploadProgress {
                bytes_sent,
                total_bytes,
            });
            Ok::<Bytes, std::io::Error>(chunk)
        });

        let part = multipart::Part::stream_with_length(Body::wrap_stream(body), total_bytes)
            .file_name(file_name.to_owned());

        tracing::debug!(file_name = file_name, total_bytes = total_bytes, "uploading file");
        let resp = self
            .client
            .post(self.endpoint(&["upload"])?)
            .multipart(multipart::Form::new().part("file", part))
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK => Ok(()),
            status => Err(Error::UploadRejected(status)),
        }
    }

    /// Delete a stored file, returning the host's acknowledgement.
    pub async fn delete(&self, file_name: &str) -> Result<String> {
        let resp: Reply<MessageReply> = self
            .client
            .post(self.endpoint(&["delete-file"])?)
            .json(&FilenameRequest { filename: file_name })
            .send()
            .await?
            .json()
            .await?;
        Ok(resp.into_result()?.message)
    }
}
