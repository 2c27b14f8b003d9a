//! The device status poll: runs for as long as the console does, whatever
//! any print job is doing.

use std::sync::Arc;

use tokio::{sync::RwLock, task::JoinHandle};

use crate::{config::StatusConfig, Badge, DeviceStatus, DeviceStatusSource, Result, StatusReadout, View};

/// Written into the status readout when a poll fails.
pub const STATUS_FAILURE_MESSAGE: &str = "Failed to load printer status.";

/// Polls a [DeviceStatusSource] and renders every answer.
pub struct StatusPoller<S> {
    source: Arc<S>,
    view: Arc<dyn View>,
    config: StatusConfig,
    latest: Arc<RwLock<Option<DeviceStatus>>>,
}

impl<S> StatusPoller<S>
where
    S: DeviceStatusSource + Send + Sync + 'static,
{
    /// Create a new poller; nothing is fetched until [StatusPoller::tick]
    /// or [StatusPoller::spawn].
    pub fn new(source: Arc<S>, view: Arc<dyn View>, config: StatusConfig) -> Self {
        Self {
            source,
            view,
            config,
            latest: Arc::new(RwLock::new(None)),
        }
    }

    /// The last snapshot fetched successfully.
    pub async fn latest(&self) -> Option<DeviceStatus> {
        self.latest.read().await.clone()
    }

    /// Poll once. On success the snapshot is replaced and both the readout
    /// and the badge are rendered; on failure the readout shows
    /// [STATUS_FAILURE_MESSAGE] and the badge keeps its previous state.
    pub async fn tick(&self) -> Result<()> {
        match self.source.device_status().await {
            Ok(status) => {
                self.view.status(&StatusReadout::from(&status));
                self.view.badge(Badge::from(status.online));
                *self.latest.write().await = Some(status);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = format!("{:?}", e), "failed to fetch printer status");
                self.view.status_failed(STATUS_FAILURE_MESSAGE);
                Err(e)
            }
        }
    }

    /// Poll immediately, then keep polling in the background. The delay
    /// after a failed poll follows [StatusConfig::delay]; a failed poll
    /// never stops the loop.
    pub fn spawn(self) -> StatusPollerHandle {
        let latest = self.latest.clone();
        let handle = tokio::spawn(async move {
            let mut consecutive_failures = 0u32;
            loop {
                match self.tick().await {
                    Ok(()) => consecutive_failures = 0,
                    Err(_) => consecutive_failures = consecutive_failures.saturating_add(1),
                }
                tokio::time::sleep(self.config.delay(consecutive_failures)).await;
            }
        });
        StatusPollerHandle { handle, latest }
    }
}

/// Handle on a spawned [StatusPoller]. Dropping the handle stops the poll.
pub struct StatusPollerHandle {
    handle: JoinHandle<()>,
    latest: Arc<RwLock<Option<DeviceStatus>>>,
}

impl StatusPollerHandle {
    /// The last snapshot fetched successfully.
    pub async fn latest(&self) -> Option<DeviceStatus> {
        self.latest.read().await.clone()
    }

    /// Stop polling.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for StatusPollerHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::{device_status, fail, ok, Event, MockBackend, RecordingView};
    use pretty_assertions::assert_eq;

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_badge_and_recovers() {
        let backend = Arc::new(
            MockBackend::default()
                .on_status(ok(0, device_status("Printing", 40.0, true)))
                .on_status(fail(0, "timed out"))
                .on_status(ok(0, device_status("Idle", 0.0, false))),
        );
        let view = Arc::new(RecordingView::default());
        let poller = StatusPoller::new(backend, view.clone(), StatusConfig::default());

        poller.tick().await.unwrap();
        assert!(poller.tick().await.is_err());
        assert_eq!(
            view.events(),
            vec![
                Event::Status(StatusReadout {
                    text: "Printing".to_owned(),
                    progress: "40.00%".to_owned(),
                    layers: None,
                }),
                Event::Badge(Badge::Online),
                Event::StatusFailed(STATUS_FAILURE_MESSAGE.to_owned()),
            ]
        );
        assert_eq!(poller.latest().await.map(|s| s.status), Some("Printing".to_owned()));

        view.clear();
        poller.tick().await.unwrap();
        assert_eq!(
            view.events(),
            vec![
                Event::Status(StatusReadout {
                    text: "Idle".to_owned(),
                    progress: "0.00%".to_owned(),
                    layers: None,
                }),
                Event::Badge(Badge::Offline),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_poll_keeps_cadence_through_failures() {
        let backend = Arc::new(
            MockBackend::default()
                .on_status(fail(0, "refused"))
                .on_status(fail(0, "refused"))
                .on_status(ok(0, device_status("Idle", 0.0, true))),
        );
        let view = Arc::new(RecordingView::default());
        let handle = StatusPoller::new(backend.clone(), view.clone(), StatusConfig::default()).spawn();

        tokio::time::sleep(Duration::from_millis(10_100)).await;
        assert_eq!(backend.count_calls("status"), 3);
        assert_eq!(handle.latest().await.map(|s| s.online), Some(true));

        let ticks: Vec<_> = view
            .timed()
            .into_iter()
            .filter(|(_, event)| matches!(event, Event::StatusFailed(_) | Event::Status(_)))
            .map(|(at, _)| at)
            .collect();
        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks[1] - ticks[0], Duration::from_secs(5));
        assert_eq!(ticks[2] - ticks[1], Duration::from_secs(5));

        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_poll_backs_off() {
        let backend = Arc::new(
            MockBackend::default()
                .on_status(fail(0, "refused"))
                .on_status(fail(0, "refused"))
                .on_status(ok(0, device_status("Idle", 0.0, true))),
        );
        let view = Arc::new(RecordingView::default());
        let config = StatusConfig {
            interval_ms: 1000,
            backoff_factor: 2.0,
            max_interval_ms: 10_000,
        };
        let _handle = StatusPoller::new(backend.clone(), view.clone(), config).spawn();

        // Polls at 0s, 2s (after one failure), and 6s (after two).
        tokio::time::sleep(Duration::from_millis(5_900)).await;
        assert_eq!(backend.count_calls("status"), 2);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(backend.count_calls("status"), 3);
    }
}
