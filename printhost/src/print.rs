use serde::{Deserialize, Serialize};

use super::Client;
use crate::{
    reply::{FilenameRequest, MessageReply, Reply},
    Result,
};

#[derive(Clone, Debug, Deserialize, Serialize)]
struct ProgressReply {
    progress: f64,
}

impl Client {
    /// Ask the print host to send a stored file to the printer and start
    /// printing it. The returned message is the host's acknowledgement; the
    /// job itself continues in the background.
    pub async fn print_file(&self, file_name: &str) -> Result<String> {
        let resp: Reply<MessageReply> = self
            .client
            .post(self.endpoint(&["print-file"])?)
            .json(&FilenameRequest { filename: file_name })
            .send()
            .await?
            .json()
            .await?;
        Ok(resp.into_result()?.message)
    }

    /// Completion percentage of the job printing `file_name`, in `[0, 100]`.
    /// A file with no job reports `0`.
    pub async fn progress(&self, file_name: &str) -> Result<f64> {
        let resp: Reply<ProgressReply> = self
            .client
            .get(self.endpoint(&["progress", file_name])?)
            .send()
            .await?
            .json()
            .await?;
        Ok(resp.into_result()?.progress.clamp(0.0, 100.0))
    }
}
