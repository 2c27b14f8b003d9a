use serde::{Deserialize, Serialize};

use super::Client;
use crate::{
    reply::{MessageReply, Reply},
    Result,
};

#[derive(Clone, Debug, Deserialize, Serialize)]
struct IpReply {
    ip: String,
}

#[derive(Clone, Copy, Debug, Serialize)]
struct IpRequest<'a> {
    ip: &'a str,
}

impl Client {
    /// Fetch the network address the print host uses to reach the printer.
    pub async fn printer_ip(&self) -> Result<String> {
        let resp: Reply<IpReply> = self
            .client
            .get(self.endpoint(&["get-printer-ip"])?)
            .send()
            .await?
            .json()
            .await?;
        Ok(resp.into_result()?.ip)
    }

    /// Store a new printer address on the print host, returning the host's
    /// acknowledgement.
    pub async fn set_printer_ip(&self, ip: &str) -> Result<String> {
        tracing::debug!(ip = ip, "storing printer address");
        let resp: Reply<MessageReply> = self
            .client
            .post(self.endpoint(&["set-printer-ip"])?)
            .json(&IpRequest { ip })
            .send()
            .await?
            .json()
            .await?;
        Ok(resp.into_result()?.message)
    }
}
