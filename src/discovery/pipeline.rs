//! The resumable catalog walk.

use super::checkpoint::{Checkpoint, CheckpointError, CheckpointStore, TakedownRecord};
use crate::base::neterror::NetError;
use crate::catalog::{CatalogClient, CatalogItem, CatalogPage};
use crate::itch::ItchClient;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Where catalog pages come from.
pub trait CatalogSource: Send + Sync {
    fn fetch_page(&self, page: u64) -> BoxFuture<'_, Result<CatalogPage, NetError>>;
}

/// Identifier resolution and takedown status of single games.
pub trait TakedownCheck: Send + Sync {
    fn game_id<'a>(&'a self, game_url: &'a str) -> BoxFuture<'a, Result<Option<u64>, NetError>>;
    fn is_taken_down(&self, game_id: u64) -> BoxFuture<'_, Result<bool, NetError>>;
}

impl CatalogSource for CatalogClient {
    fn fetch_page(&self, page: u64) -> BoxFuture<'_, Result<CatalogPage, NetError>> {
        Box::pin(CatalogClient::fetch_page(self, page))
    }
}

impl TakedownCheck for ItchClient {
    fn game_id<'a>(&'a self, game_url: &'a str) -> BoxFuture<'a, Result<Option<u64>, NetError>> {
        Box::pin(ItchClient::game_id(self, game_url))
    }

    fn is_taken_down(&self, game_id: u64) -> BoxFuture<'_, Result<bool, NetError>> {
        Box::pin(ItchClient::is_taken_down(self, game_id))
    }
}

/// Cooperative stop signal, checked before each page and each item.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What to do when probing one item fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemFailurePolicy {
    /// Save and stop; the page is retried on the next run.
    #[default]
    Halt,
    /// Log and move on to the next item.
    Skip,
}

#[derive(Debug, Clone, Error)]
pub enum DiscoveryError {
    #[error("failed to fetch catalog page {page}: {source}")]
    PageFetch {
        page: u64,
        #[source]
        source: NetError,
    },
    #[error("failed to probe {url}: {source}")]
    Probe {
        url: String,
        #[source]
        source: NetError,
    },
}

#[derive(Debug, Clone)]
pub enum RunStatus {
    /// Every page up to the terminal one was processed.
    Completed,
    /// Stopped by the cancel flag.
    Interrupted,
    Halted { page: u64, error: DiscoveryError },
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub status: RunStatus,
    /// State as last saved.
    pub checkpoint: Checkpoint,
    pub pages_processed: u64,
    pub newly_flagged: usize,
}

enum PageOutcome {
    Done,
    Cancelled,
    Failed(DiscoveryError),
}

pub struct DiscoveryPipeline<C, P> {
    catalog: C,
    probe: P,
    policy: ItemFailurePolicy,
    cancel: CancelFlag,
}

impl<C: CatalogSource, P: TakedownCheck> DiscoveryPipeline<C, P> {
    pub fn new(catalog: C, probe: P) -> Self {
        Self {
            catalog,
            probe,
            policy: ItemFailurePolicy::default(),
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_policy(mut self, policy: ItemFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Walk the catalog from the stored checkpoint, saving after every page.
    ///
    /// Network failures end the run with a [`RunStatus::Halted`] report;
    /// only a checkpoint that cannot be read or written is an `Err`.
    pub async fn run(&self, store: &CheckpointStore) -> Result<RunReport, CheckpointError> {
        let mut checkpoint = store.load()?;
        let flagged_at_start = checkpoint.taken_down.len();
        let mut terminal: Option<u64> = None;
        let mut first_fetch = true;
        let mut pages_processed = 0;

        tracing::info!(
            page = checkpoint.page,
            flagged = flagged_at_start,
            "starting discovery"
        );

        let status = loop {
            if let Some(last) = terminal {
                if checkpoint.page > last {
                    break RunStatus::Completed;
                }
            }
            if self.cancel.is_cancelled() {
                break RunStatus::Interrupted;
            }

            let page_no = checkpoint.page;
            let page = match self.catalog.fetch_page(page_no).await {
                Ok(page) => page,
                Err(source) => {
                    break RunStatus::Halted {
                        page: page_no,
                        error: DiscoveryError::PageFetch {
                            page: page_no,
                            source,
                        },
                    }
                }
            };

            if first_fetch {
                first_fetch = false;
                terminal = page.terminal_page();
                if let Some(last) = terminal {
                    tracing::info!(total = ?page.total_games, last_page = last, "catalog size");
                    if page_no > last {
                        break RunStatus::Completed;
                    }
                }
            }

            if terminal.is_none() && page.games.is_empty() {
                tracing::info!(page = page_no, "empty page, catalog exhausted");
                break RunStatus::Completed;
            }

            tracing::info!(page = page_no, items = page.games.len(), "processing page");

            match self.process_page(page.games, &mut checkpoint).await {
                PageOutcome::Done => {}
                PageOutcome::Cancelled => break RunStatus::Interrupted,
                PageOutcome::Failed(error) => {
                    break RunStatus::Halted {
                        page: page_no,
                        error,
                    }
                }
            }

            checkpoint.advance();
            pages_processed += 1;
            store.save(&checkpoint)?;
        };

        store.save(&checkpoint)?;

        match &status {
            RunStatus::Completed => tracing::info!(
                flagged = checkpoint.taken_down.len(),
                "discovery complete"
            ),
            RunStatus::Interrupted => {
                tracing::warn!(page = checkpoint.page, "discovery interrupted, progress saved")
            }
            RunStatus::Halted { page, error } => {
                tracing::error!(page, error = %error, "discovery halted, progress saved")
            }
        }

        let newly_flagged = checkpoint.taken_down.len() - flagged_at_start;
        Ok(RunReport {
            status,
            checkpoint,
            pages_processed,
            newly_flagged,
        })
    }

    async fn process_page(
        &self,
        items: Vec<CatalogItem>,
        checkpoint: &mut Checkpoint,
    ) -> PageOutcome {
        for item in items {
            if self.cancel.is_cancelled() {
                return PageOutcome::Cancelled;
            }

            let Some(url) = item.itch_url().map(str::to_owned) else {
                tracing::warn!(
                    title = item.title().unwrap_or_default(),
                    "item has no itch_url, skipping"
                );
                continue;
            };

            match self.probe_item(&url).await {
                Ok(Some((game_id, true))) => {
                    if checkpoint.record(TakedownRecord::new(game_id, item)) {
                        tracing::info!(game_id, url = %url, "taken down");
                    } else {
                        tracing::debug!(game_id, "already flagged");
                    }
                }
                Ok(Some((game_id, false))) => {
                    tracing::info!(game_id, url = %url, "still available");
                }
                Ok(None) => {
                    tracing::warn!(url = %url, "no game id on page, skipping");
                }
                Err(source) => {
                    let error = DiscoveryError::Probe { url, source };
                    match self.policy {
                        ItemFailurePolicy::Halt => return PageOutcome::Failed(error),
                        ItemFailurePolicy::Skip => {
                            tracing::warn!(error = %error, "probe failed, skipping item")
                        }
                    }
                }
            }
        }
        PageOutcome::Done
    }

    async fn probe_item(&self, url: &str) -> Result<Option<(u64, bool)>, NetError> {
        let Some(game_id) = self.probe.game_id(url).await? else {
            return Ok(None);
        };
        let taken_down = self.probe.is_taken_down(game_id).await?;
        Ok(Some((game_id, taken_down)))
    }
}
