//! Everything the operator can see, as a sink the console writes into.

use parse_display::Display;

use crate::{AddressField, CatalogEntry, DeviceStatus, Indicator};

/// Shown in place of the file list when the catalog can not be fetched.
pub const CATALOG_FAILURE_MESSAGE: &str = "Failed to load files.";

/// Online/offline badge. Exactly one of the two states is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum Badge {
    /// The printer answered the last successful status poll as online.
    #[display("ONLINE")]
    Online,

    /// The printer answered the last successful status poll as offline.
    #[display("OFFLINE")]
    Offline,
}

impl From<bool> for Badge {
    fn from(online: bool) -> Self {
        if online {
            Badge::Online
        } else {
            Badge::Offline
        }
    }
}

/// One row of the file list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogRow {
    /// File name, exactly as the backend listed it.
    pub name: String,

    /// Human readable size.
    pub size: String,

    /// Is this the selected file?
    pub selected: bool,
}

impl CatalogRow {
    /// Project a catalog snapshot and the current selection onto rows, one
    /// per entry, in catalog order.
    pub fn project(entries: &[CatalogEntry], selection: Option<&str>) -> Vec<CatalogRow> {
        entries
            .iter()
            .map(|entry| CatalogRow {
                name: entry.name.clone(),
                size: format!("{:.2} MB", entry.size_mb),
                selected: selection == Some(entry.name.as_str()),
            })
            .collect()
    }
}

/// The textual part of the status region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusReadout {
    /// Status text from the printer.
    pub text: String,

    /// Job progress, with two decimals.
    pub progress: String,

    /// `current/total` layers, when a job is running.
    pub layers: Option<String>,
}

impl From<&DeviceStatus> for StatusReadout {
    fn from(status: &DeviceStatus) -> Self {
        StatusReadout {
            text: status.status.clone(),
            progress: format!("{:.2}%", status.progress),
            layers: match (status.current_layer, status.total_layers) {
                (Some(current), Some(total)) => Some(format!("{}/{}", current, total)),
                _ => None,
            },
        }
    }
}

/// The operator-facing surface. Implementations only render what they are
/// handed; every call replaces what was previously shown in that region.
pub trait View: Send + Sync + 'static {
    /// Render the progress indicator. A hidden indicator removes the
    /// overlay.
    fn indicator(&self, indicator: &Indicator);

    /// Render the file list.
    fn catalog(&self, rows: &[CatalogRow]);

    /// Replace the file list with a failure message.
    fn catalog_failed(&self, message: &str);

    /// Render the status readout.
    fn status(&self, readout: &StatusReadout);

    /// Replace the status readout with a failure message. The badge is
    /// left alone.
    fn status_failed(&self, message: &str);

    /// Render the online/offline badge.
    fn badge(&self, badge: Badge);

    /// Render the printer address field.
    fn address(&self, field: &AddressField);

    /// Acknowledge something to the operator.
    fn notify(&self, message: &str);
}
