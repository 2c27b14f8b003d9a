use serde::{Deserialize, Deserializer, Serialize};

use super::Client;
use crate::{reply::Reply, Result};

/// Status of the printer, as reported by the print host.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PrintStatus {
    /// Free-form status text from the printer.
    pub status: String,

    /// Progress of the current job, in `[0, 100]`.
    pub progress: f64,

    /// Is the printer reachable from the print host?
    pub is_online: bool,

    /// Layer currently being printed, if known.
    #[serde(default, deserialize_with = "layer_count")]
    pub current_layer: Option<u64>,

    /// Number of layers in the current job, if known.
    #[serde(default, deserialize_with = "layer_count")]
    pub total_layers: Option<u64>,
}

/// Layer counts arrive as numbers, numeric strings, or `"N/A"` when no job
/// is running.
fn layer_count<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Count(u64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Count(count)) => Some(count),
        Some(Raw::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}

impl Client {
    /// Fetch the printer's current status.
    pub async fn print_status(&self) -> Result<PrintStatus> {
        tracing::debug!(base = self.url_base.as_str(), "requesting status");
        let resp: Reply<PrintStatus> = self
            .client
            .get(self.endpoint(&["print-status"])?)
            .send()
            .await?
            .json()
            .await?;
        resp.into_result()
    }
}
