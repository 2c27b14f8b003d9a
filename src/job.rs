//! The job-progress loop: follows one print job from the moment it is
//! triggered until the backend reports it complete.
//!
//! Each loop belongs to a single [JobId] and writes to the indicator only
//! through that session's channel. Starting another print cancels the loop
//! through its token; the token is checked at every suspension point.

use std::{sync::Arc, time::Duration};

use parse_display::Display;
use tokio::sync::{watch, Mutex};

use crate::{JobId, PrintControl, Presenter, ProgressChannel};

/// Where a job-progress loop is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum JobState {
    /// No loop has been started.
    Idle,
    /// Requests are being issued.
    Polling,
    /// The backend reported the job complete.
    Done,
    /// A progress request failed; the failure was shown and the loop
    /// stopped.
    Failed,
    /// A newer print superseded this one.
    Cancelled,
}

/// Handle on a running loop, held by the controller.
pub(crate) struct JobSession {
    pub(crate) id: JobId,
    pub(crate) filename: String,
    cancel: watch::Sender<bool>,
    state: watch::Receiver<JobState>,
}

impl JobSession {
    /// Spawn the loop for `filename`.
    pub(crate) fn spawn<P>(
        id: JobId,
        filename: &str,
        backend: Arc<P>,
        presenter: Arc<Mutex<Presenter>>,
        poll_interval: Duration,
        linger: Duration,
    ) -> Self
    where
        P: PrintControl + Send + Sync + 'static,
    {
        let (cancel, cancelled) = watch::channel(false);
        let (report, state) = watch::channel(JobState::Polling);
        let job = JobLoop {
            id,
            filename: filename.to_owned(),
            backend,
            presenter,
            poll_interval,
            linger,
            cancelled,
        };
        tokio::spawn(async move {
            let _ = report.send(job.run().await);
        });
        Self {
            id,
            filename: filename.to_owned(),
            cancel,
            state,
        }
    }

    /// Stop the loop from scheduling anything further.
    pub(crate) fn cancel(&self) {
        tracing::info!(job = %self.id, filename = self.filename, "cancelling job-progress loop");
        let _ = self.cancel.send(true);
    }

    pub(crate) fn is_finished(&self) -> bool {
        *self.state.borrow() != JobState::Polling
    }

    /// Receiver for the loop's state, which moves out of
    /// [JobState::Polling] exactly once.
    pub(crate) fn state(&self) -> watch::Receiver<JobState> {
        self.state.clone()
    }
}

/// Wait for a loop to end, returning how it ended.
pub(crate) async fn finished(mut state: watch::Receiver<JobState>) -> JobState {
    loop {
        let current = *state.borrow_and_update();
        if current != JobState::Polling {
            return current;
        }
        if state.changed().await.is_err() {
            // The loop's task went away without reporting.
            return JobState::Cancelled;
        }
    }
}

struct JobLoop<P> {
    id: JobId,
    filename: String,
    backend: Arc<P>,
    presenter: Arc<Mutex<Presenter>>,
    poll_interval: Duration,
    linger: Duration,
    cancelled: watch::Receiver<bool>,
}

impl<P> JobLoop<P>
where
    P: PrintControl + Send + Sync + 'static,
{
    fn channel(&self) -> ProgressChannel {
        ProgressChannel::Print(self.id)
    }

    async fn run(mut self) -> JobState {
        tracing::info!(job = %self.id, filename = self.filename, state = %JobState::Polling, "following print job");
        let state = self.poll().await;
        tracing::info!(job = %self.id, filename = self.filename, state = %state, "job-progress loop ended");
        state
    }

    async fn poll(&mut self) -> JobState {
        let channel = self.channel();
        loop {
            let progress = tokio::select! {
                biased;
                _ = cancelled(&mut self.cancelled) => return JobState::Cancelled,
                progress = self.backend.job_progress(&self.filename) => progress,
            };

            let percent = match progress {
                Ok(percent) => percent,
                Err(e) => {
                    tracing::warn!(
                        job = %self.id,
                        error = format!("{:?}", e),
                        "failed to fetch job progress"
                    );
                    self.presenter
                        .lock()
                        .await
                        .fail(channel, &format!("Print progress unavailable: {}", e));
                    if !self.pause(self.linger).await {
                        return JobState::Cancelled;
                    }
                    self.presenter.lock().await.release(channel);
                    return JobState::Failed;
                }
            };

            {
                let mut presenter = self.presenter.lock().await;
                presenter.show(channel, &format!("Printing... ({}%)", percent));
                presenter.set_percent(channel, percent);
            }

            if percent >= 100.0 {
                if !self.pause(self.linger).await {
                    return JobState::Cancelled;
                }
                self.presenter.lock().await.release(channel);
                return JobState::Done;
            }

            if !self.pause(self.poll_interval).await {
                return JobState::Cancelled;
            }
        }
    }

    /// Sleep for `delay`, returning false if the loop was cancelled in the
    /// meantime.
    async fn pause(&mut self, delay: Duration) -> bool {
        tokio::select! {
            biased;
            _ = cancelled(&mut self.cancelled) => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }
}

/// Resolves once the session is cancelled, or its controller has gone away.
async fn cancelled(token: &mut watch::Receiver<bool>) {
    loop {
        if *token.borrow_and_update() {
            return;
        }
        if token.changed().await.is_err() {
            return;
        }
    }
}
