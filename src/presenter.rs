//! The progress indicator, and the arbitration deciding which operation
//! owns it.
//!
//! Uploads and print jobs report progress independently. Each one writes
//! through its own [ProgressChannel]. The [Presenter] keeps the state of
//! every live channel but shows only the one that claimed most recently;
//! when that channel is released, the indicator goes back to the newest
//! channel still live. At most one print channel is live at a time, so a
//! stale job can never overwrite a newer one.

use std::sync::Arc;

use parse_display::Display;

use crate::View;

/// Identity of one print job session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("{0}")]
pub struct JobId(pub u64);

/// Identity of one upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("{0}")]
pub struct UploadId(pub u64);

/// A source of progress writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum ProgressChannel {
    /// The upload with the given id.
    #[display("upload {0}")]
    Upload(UploadId),

    /// The print job session with the given id.
    #[display("print job {0}")]
    Print(JobId),
}

/// State of the single progress indicator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Indicator {
    /// Is the indicator shown at all?
    pub visible: bool,

    /// Text shown above the percentage.
    pub message: String,

    /// Percentage shown, in `[0, 100]`.
    pub percent: f64,

    /// The operation ended in failure; the indicator stays up briefly to
    /// say so before it is hidden.
    pub failed: bool,
}

impl Indicator {
    /// Render the indicator as a single line, or nothing when it is hidden.
    pub fn render(&self) -> Option<String> {
        self.visible.then(|| format!("{} {:.2}%", self.message, self.percent))
    }
}

/// Owner of the [Indicator]. Every change to what is shown is pushed to the
/// [View].
pub struct Presenter {
    view: Arc<dyn View>,
    shown: Indicator,
    /// Live channels in claim order; the last one is shown.
    live: Vec<(ProgressChannel, Indicator)>,
}

impl Presenter {
    /// Create a presenter with the indicator hidden.
    pub fn new(view: Arc<dyn View>) -> Self {
        Self {
            view,
            shown: Indicator::default(),
            live: Vec::new(),
        }
    }

    /// The indicator as currently shown.
    pub fn indicator(&self) -> &Indicator {
        &self.shown
    }

    /// Channel currently shown, if any.
    pub fn owner(&self) -> Option<ProgressChannel> {
        self.live.last().map(|(channel, _)| *channel)
    }

    /// Hand the indicator to `channel` and show `message`. A channel that
    /// was not live starts over at zero. Claiming a print channel drops any
    /// other print channel for good; other live channels only lose the
    /// indicator until `channel` is released.
    pub fn claim(&mut self, channel: ProgressChannel, message: &str) {
        if let ProgressChannel::Print(_) = channel {
            self.live.retain(|(live, _)| {
                let superseded = *live != channel && matches!(live, ProgressChannel::Print(_));
                if superseded {
                    tracing::debug!(previous = %live, next = %channel, "print channel superseded");
                }
                !superseded
            });
        }

        let mut state = match self.position(channel) {
            Some(index) => self.live.remove(index).1,
            None => {
                if let Some(previous) = self.owner() {
                    tracing::debug!(previous = %previous, next = %channel, "indicator changing hands");
                }
                Indicator::default()
            }
        };
        state.visible = true;
        state.message = message.to_owned();
        self.live.push((channel, state));
        self.publish();
    }

    /// Update the message shown for `channel`.
    pub fn show(&mut self, channel: ProgressChannel, message: &str) -> bool {
        self.update(channel, |state| state.message = message.to_owned())
    }

    /// Update the percentage shown for `channel`.
    pub fn set_percent(&mut self, channel: ProgressChannel, percent: f64) -> bool {
        self.update(channel, |state| state.percent = percent.clamp(0.0, 100.0))
    }

    /// Raise the percentage shown for `channel` to `floor`, leaving any
    /// higher value alone.
    pub fn raise_percent(&mut self, channel: ProgressChannel, floor: f64) -> bool {
        self.update(channel, |state| {
            if state.percent < floor {
                state.percent = floor.clamp(0.0, 100.0);
            }
        })
    }

    /// Mark the operation on `channel` as failed, keeping the indicator up
    /// with `message`.
    pub fn fail(&mut self, channel: ProgressChannel, message: &str) -> bool {
        self.update(channel, |state| {
            state.message = message.to_owned();
            state.failed = true;
        })
    }

    /// End `channel`. If it was shown, the newest channel still live takes
    /// the indicator back; with none left the indicator is hidden.
    pub fn release(&mut self, channel: ProgressChannel) -> bool {
        let Some(index) = self.position(channel) else {
            tracing::debug!(channel = %channel, "ignoring release from a channel that is not live");
            return false;
        };
        self.live.remove(index);
        if let Some(next) = self.owner() {
            tracing::debug!(released = %channel, next = %next, "indicator handed back");
        }
        self.publish();
        true
    }

    fn position(&self, channel: ProgressChannel) -> Option<usize> {
        self.live.iter().position(|(live, _)| *live == channel)
    }

    /// Apply `change` to the state of `channel`, showing it if `channel`
    /// owns the indicator. Writes from a channel that is not live are
    /// dropped.
    fn update(&mut self, channel: ProgressChannel, change: impl FnOnce(&mut Indicator)) -> bool {
        let Some(index) = self.position(channel) else {
            tracing::debug!(channel = %channel, "dropping indicator write from a channel that is not live");
            return false;
        };
        change(&mut self.live[index].1);
        self.publish();
        true
    }

    fn publish(&mut self) {
        let next = self.live.last().map(|(_, state)| state.clone()).unwrap_or_default();
        if next == self.shown {
            return;
        }
        self.shown = next;
        self.view.indicator(&self.shown);
    }
}
