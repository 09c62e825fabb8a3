//! Per-layer progress tracking for pull and push.
//!
//! The tracker follows one state variable, the digest of the layer being
//! transferred. A new digest opens a new indicator, a repeated digest moves
//! the open indicator, and an event without a digest ends the transfer phase
//! and prints its status as a plain line.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::api::TransferProgress;
use crate::progress::digest::DigestLabel;

/// Output surface driven by [`TransferTracker`].
pub trait TransferDisplay {
    /// Open an indicator for a layer of `total` bytes, starting at `position`
    fn open(&mut self, label: &str, total: u64, position: u64);

    /// Move the open indicator to an absolute position
    fn set_position(&mut self, position: u64);

    /// Close the open indicator
    fn finish(&mut self);

    /// Print a plain status line
    fn status(&mut self, line: &str);
}

/// What the tracker decided for one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Opened { digest: String, replaced: bool },
    Advanced { completed: u64 },
    Status,
}

/// State machine for one pull or push operation
#[derive(Debug)]
pub struct TransferTracker<D: TransferDisplay> {
    current_digest: String,
    labels: DigestLabel,
    display: D,
    open: bool,
}

impl<D: TransferDisplay> TransferTracker<D> {
    pub fn new(display: D, labels: DigestLabel) -> Self {
        Self {
            current_digest: String::new(),
            labels,
            display,
            open: false,
        }
    }

    /// Digest of the layer in flight, empty when idle
    pub fn current_digest(&self) -> &str {
        &self.current_digest
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    fn close(&mut self) {
        if self.open {
            self.display.finish();
            self.open = false;
        }
    }

    pub fn handle(&mut self, event: &TransferProgress) -> Transition {
        if event.digest.is_empty() {
            self.close();
            self.current_digest.clear();
            self.display.status(&event.status);
            return Transition::Status;
        }

        if event.digest == self.current_digest {
            self.display.set_position(event.completed);
            return Transition::Advanced {
                completed: event.completed,
            };
        }

        let replaced = self.open;
        self.close();

        let label = self.labels.label(&event.digest);
        self.display.open(&label, event.total, event.completed);
        self.open = true;
        self.current_digest = event.digest.clone();

        log::debug!("Tracking layer {} ({} bytes)", event.digest, event.total);

        Transition::Opened {
            digest: event.digest.clone(),
            replaced,
        }
    }

    /// Close whatever is still open and hand the display back
    pub fn finish(mut self) -> D {
        self.close();
        self.display
    }
}

/// Terminal display using one `indicatif` bar per layer
pub struct BarDisplay {
    verb: String,
    target: fn() -> ProgressDrawTarget,
    bar: Option<ProgressBar>,
}

const BAR_TEMPLATE: &str = "{msg} {percent:>3}% |{wide_bar}| {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

impl BarDisplay {
    /// `verb` prefixes each bar label, e.g. "pulling"
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            target: ProgressDrawTarget::stderr,
            bar: None,
        }
    }

    /// Display that draws nothing
    pub fn hidden(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            target: ProgressDrawTarget::hidden,
            bar: None,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template(BAR_TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_bar())
    }
}

impl TransferDisplay for BarDisplay {
    fn open(&mut self, label: &str, total: u64, position: u64) {
        let bar = ProgressBar::with_draw_target(Some(total), (self.target)());
        bar.set_style(Self::style());
        bar.set_message(format!("{} {}", self.verb, label));
        bar.set_position(position);
        self.bar = Some(bar);
    }

    fn set_position(&mut self, position: u64) {
        if let Some(bar) = &self.bar {
            bar.set_position(position);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }

    fn status(&mut self, line: &str) {
        println!("{}", line);
    }
}
