//! Debounced background rendering
//!
//! Configs submitted in quick succession collapse into a single render of the
//! most recent one. Every submission gets a generation number; an outcome
//! reports the generation it rendered, so skipped generations were superseded.

use crate::error::{Error, Result};
use crate::render::{self, RenderAssets, RenderedImage};
use crate::style::RenderConfig;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Default quiet period before a render starts.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

const CHANNEL_CAPACITY: usize = 32;

/// Result of one debounced render.
#[derive(Debug)]
pub struct RenderOutcome {
    /// Generation of the config that was rendered
    pub generation: u64,
    /// The image, `None` for empty content, or the render error
    pub result: Result<Option<RenderedImage>>,
}

/// Handle to the background render task.
pub struct RenderScheduler {
    requests: mpsc::Sender<RenderConfig>,
    task: JoinHandle<()>,
}

impl RenderScheduler {
    /// Start the render task; outcomes arrive on the returned receiver.
    pub fn spawn(debounce: Duration) -> (Self, mpsc::Receiver<RenderOutcome>) {
        let (requests, request_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (outcome_tx, outcomes) = mpsc::channel(CHANNEL_CAPACITY);
        let task = tokio::spawn(run(request_rx, outcome_tx, debounce));
        (Self { requests, task }, outcomes)
    }

    /// Queue a config, restarting the debounce timer.
    pub async fn submit(&self, config: RenderConfig) -> Result<()> {
        self.requests
            .send(config)
            .await
            .map_err(|_| Error::Other("render scheduler has stopped".to_string()))
    }

    /// Stop accepting configs, render anything still pending, and wait for the task.
    pub async fn shutdown(self) {
        drop(self.requests);
        if let Err(err) = self.task.await {
            tracing::warn!("Render task ended abnormally: {err}");
        }
    }
}

async fn run(
    mut requests: mpsc::Receiver<RenderConfig>,
    outcomes: mpsc::Sender<RenderOutcome>,
    debounce: Duration,
) {
    let mut generation = 0u64;
    let mut pending: Option<(u64, RenderConfig)> = None;

    loop {
        let Some((current, config)) = pending.take() else {
            match requests.recv().await {
                Some(config) => {
                    generation += 1;
                    pending = Some((generation, config));
                    continue;
                }
                None => break,
            }
        };

        tokio::select! {
            next = requests.recv() => match next {
                Some(newer) => {
                    generation += 1;
                    tracing::trace!(superseded = current, generation, "Render request superseded");
                    pending = Some((generation, newer));
                }
                None => {
                    let _ = outcomes.send(render_once(current, config).await).await;
                    break;
                }
            },
            _ = tokio::time::sleep(debounce) => {
                if outcomes.send(render_once(current, config).await).await.is_err() {
                    tracing::debug!("Outcome receiver dropped, stopping render task");
                    break;
                }
            }
        }
    }
}

async fn render_once(generation: u64, config: RenderConfig) -> RenderOutcome {
    let assets = RenderAssets::load(&config).await;
    let result = match tokio::task::spawn_blocking(move || render::render(&config, &assets)).await
    {
        Ok(result) => result,
        Err(err) => Err(Error::Render(format!("render task failed: {err}"))),
    };

    if let Err(err) = &result {
        tracing::warn!(generation, "Render failed: {err}");
    }
    RenderOutcome { generation, result }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn rapid_submissions_render_only_the_latest() {
        let (scheduler, mut outcomes) = RenderScheduler::spawn(DEFAULT_DEBOUNCE);
        for text in ["a", "ab", "abc"] {
            scheduler.submit(RenderConfig::with_content(text)).await.unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let outcome = outcomes.recv().await.unwrap();
        assert_eq!(outcome.generation, 3);
        assert!(outcome.result.unwrap().is_some());

        scheduler.shutdown().await;
        assert!(outcomes.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_content_yields_no_image() {
        let (scheduler, mut outcomes) = RenderScheduler::spawn(Duration::from_millis(10));
        scheduler.submit(RenderConfig::default()).await.unwrap();
        let outcome = outcomes.recv().await.unwrap();
        assert_eq!(outcome.generation, 1);
        assert!(outcome.result.unwrap().is_none());
        scheduler.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn render_errors_are_reported_not_fatal() {
        let (scheduler, mut outcomes) = RenderScheduler::spawn(Duration::from_millis(10));
        let tiny = RenderConfig {
            size: 5,
            ..RenderConfig::with_content("too small")
        };
        scheduler.submit(tiny).await.unwrap();
        assert!(outcomes.recv().await.unwrap().result.is_err());

        scheduler
            .submit(RenderConfig::with_content("fine"))
            .await
            .unwrap();
        let outcome = outcomes.recv().await.unwrap();
        assert_eq!(outcome.generation, 2);
        assert!(outcome.result.unwrap().is_some());
        scheduler.shutdown().await;
    }
}
