//! Waiting spinner shown until the first generated token arrives.
//!
//! The spinner is animated by its own task on a fixed interval and shares no
//! data with the decode loop; it only watches a cancellation token.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Animation interval
pub const TICK_INTERVAL: Duration = Duration::from_millis(60);

pub struct Spinner {
    bar: ProgressBar,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Start a spinner drawing to stderr
    pub fn start() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    pub fn with_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(None, target);
        bar.set_style(ProgressStyle::default_spinner());
        let token = CancellationToken::new();

        let task = {
            let bar = bar.clone();
            let token = token.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(TICK_INTERVAL);
                loop {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = ticker.tick() => bar.tick(),
                    }
                }
                bar.finish_and_clear();
            })
        };

        Self {
            bar,
            token,
            task: Some(task),
        }
    }

    /// Signal the animation task to stop and clear the spinner. Safe to call
    /// more than once.
    pub fn stop(&self) {
        if !self.is_finished() {
            self.token.cancel();
            self.bar.finish_and_clear();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stop and wait for the animation task to exit
    pub async fn join(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::warn!("Spinner task failed: {}", e);
            }
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spinner_stops() {
        let spinner = Spinner::with_target(ProgressDrawTarget::hidden());
        assert!(!spinner.is_finished());

        spinner.stop();
        assert!(spinner.is_finished());

        // Second stop is a no-op
        spinner.stop();
        spinner.join().await;
    }

    #[tokio::test]
    async fn test_spinner_task_exits_on_join() {
        let spinner = Spinner::with_target(ProgressDrawTarget::hidden());
        tokio::time::sleep(TICK_INTERVAL * 2).await;

        let token = spinner.token.clone();
        tokio::time::timeout(Duration::from_secs(5), spinner.join())
            .await
            .expect("spinner task should exit promptly");
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_spinner_drop_cancels() {
        let spinner = Spinner::with_target(ProgressDrawTarget::hidden());
        let token = spinner.token.clone();
        drop(spinner);
        assert!(token.is_cancelled());
    }
}
