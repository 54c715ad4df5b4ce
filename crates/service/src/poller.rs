//! Repeating feed refresh.
//!
//! The browser original re-fetched the dropdown on a bare 30-second timer
//! with no teardown. Here the loop is a spawned task owned by a handle that
//! aborts it on `stop()` or drop, so a dismounted feed cannot leak a fetch
//! loop. Everything else keeps the original shape: fixed interval, no
//! backoff, no cancellation of an in-flight fetch, and on failure the last
//! rendered view stays visible.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::feed::{self, FeedView};

/// Where the poller gets a fresh feed view from. Abstracted so the loop can
/// be exercised without a database.
#[async_trait]
pub trait FeedSource: Send + Sync + 'static {
    async fn fetch(&self) -> Result<FeedView, ServiceError>;
}

/// Production source: the client's notification rows.
pub struct DbFeedSource {
    pub db: DatabaseConnection,
    pub client_id: Uuid,
}

#[async_trait]
impl FeedSource for DbFeedSource {
    async fn fetch(&self) -> Result<FeedView, ServiceError> {
        feed::load_feed(&self.db, self.client_id, feed::now_fixed()).await
    }
}

/// Session lifecycle of the feed widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedPhase {
    Idle,
    Loading,
    Rendered,
    Error,
}

/// Snapshot of the poller's view of the world. The view survives an Error
/// phase: stale-but-present beats blanking the widget.
#[derive(Debug, Clone, Serialize)]
pub struct FeedState {
    pub phase: FeedPhase,
    pub view: Option<FeedView>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self { phase: FeedPhase::Idle, view: None }
    }
}

/// Cancellable repeating feed refresh task.
pub struct FeedPoller {
    state: Arc<RwLock<FeedState>>,
    handle: JoinHandle<()>,
}

impl FeedPoller {
    /// Start polling. The first fetch fires immediately, then once per
    /// `every`. The shared state is wholesale-replaced on each completion,
    /// so when a slow fetch races its successor the last one to finish wins.
    pub fn spawn(source: Arc<dyn FeedSource>, every: Duration) -> Self {
        let state = Arc::new(RwLock::new(FeedState::default()));
        let loop_state = Arc::clone(&state);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                loop_state.write().await.phase = FeedPhase::Loading;
                match source.fetch().await {
                    Ok(view) => {
                        let mut s = loop_state.write().await;
                        s.phase = FeedPhase::Rendered;
                        s.view = Some(view);
                        debug!("feed refreshed");
                    }
                    Err(e) => {
                        warn!(error = %e, "feed refresh failed; keeping last rendered view");
                        loop_state.write().await.phase = FeedPhase::Error;
                    }
                }
            }
        });
        Self { state, handle }
    }

    pub async fn state(&self) -> FeedState {
        self.state.read().await.clone()
    }

    /// Stop the refresh loop. Also happens on drop.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for FeedPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
