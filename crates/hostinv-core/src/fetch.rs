//! Debounced list fetching.
//!
//! # Design
//! - Every filter change is handed to the worker together with a monotonic
//!   revision. The worker waits for the debounce window to pass without a newer
//!   change, then dispatches the latest state only.
//! - Requests are never cancelled. A settled response is applied only when its
//!   revision is still the most recently dispatched one, so a slow, superseded
//!   response cannot overwrite a newer result.
//! - The filter state travels with the trigger; nothing is captured when the
//!   worker is created.
//! - Every applied page is recorded in the [`GroupDirectory`].

use std::sync::Arc;
use std::time::Duration;

use hostinv_api_models::GroupListResponse;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::api::GroupsApi;
use crate::directory::GroupDirectory;
use crate::error::InventoryError;
use crate::filters::FilterState;

/// Status of the most recent list request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchState {
    /// No request has been dispatched yet.
    #[default]
    Uninitialized,
    /// A request is in flight.
    Loading,
    /// The latest request succeeded.
    Fulfilled(GroupListResponse),
    /// The latest request failed.
    Rejected(InventoryError),
}

impl FetchState {
    /// True while no result is available yet.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Uninitialized | Self::Loading)
    }

    /// True once the latest request has succeeded or failed.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Fulfilled(_) | Self::Rejected(_))
    }

    /// True when the latest request failed.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Fetched page, when fulfilled.
    #[must_use]
    pub const fn data(&self) -> Option<&GroupListResponse> {
        match self {
            Self::Fulfilled(data) => Some(data),
            _ => None,
        }
    }

    /// Failure of the latest request, when rejected.
    #[must_use]
    pub const fn error(&self) -> Option<&InventoryError> {
        match self {
            Self::Rejected(err) => Some(err),
            _ => None,
        }
    }

    /// Total matches reported by the last fulfilled request.
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        self.data().map(|data| data.total)
    }
}

/// Fetch state tagged with the revision of the filters that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchSnapshot {
    /// Revision of the filter change this state belongs to (0 before any).
    pub revision: u64,
    /// Request status.
    pub state: FetchState,
}

#[derive(Debug, Clone)]
struct Scheduled {
    revision: u64,
    filters: FilterState,
}

/// Debounces filter changes into list requests and tracks their results.
pub struct FetchController {
    trigger: watch::Sender<Option<Scheduled>>,
    snapshot: watch::Receiver<FetchSnapshot>,
    revision: u64,
    directory: GroupDirectory,
    worker: JoinHandle<()>,
}

impl FetchController {
    /// Start the debounce worker on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    #[must_use]
    pub fn spawn(api: Arc<dyn GroupsApi>, debounce: Duration) -> Self {
        let (trigger, trigger_rx) = watch::channel(None);
        let (state_tx, snapshot) = watch::channel(FetchSnapshot::default());
        let directory = GroupDirectory::default();
        let worker = tokio::spawn(debounce_loop(
            api,
            trigger_rx,
            Arc::new(state_tx),
            directory.clone(),
            debounce,
        ));
        Self {
            trigger,
            snapshot,
            revision: 0,
            directory,
            worker,
        }
    }

    /// Groups recorded from every applied page.
    #[must_use]
    pub const fn directory(&self) -> &GroupDirectory {
        &self.directory
    }

    /// Schedule a fetch for `filters`. Returns the revision assigned to the change.
    pub fn on_filter_change(&mut self, filters: &FilterState) -> u64 {
        self.revision += 1;
        debug!(
            revision = self.revision,
            page = filters.page,
            per_page = filters.per_page,
            "filter change scheduled"
        );
        self.trigger.send_replace(Some(Scheduled {
            revision: self.revision,
            filters: filters.clone(),
        }));
        self.revision
    }

    /// Revision of the most recent scheduled change.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Current fetch snapshot.
    #[must_use]
    pub fn snapshot(&self) -> FetchSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Current fetch state.
    #[must_use]
    pub fn state(&self) -> FetchState {
        self.snapshot.borrow().state.clone()
    }

    /// Subscribe to snapshot updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FetchSnapshot> {
        self.snapshot.clone()
    }

    /// Wait until the most recently scheduled change has settled.
    ///
    /// Returns immediately when nothing was ever scheduled.
    pub async fn wait_settled(&self) -> FetchSnapshot {
        let target = self.revision;
        if target == 0 {
            return self.snapshot();
        }
        let mut receiver = self.snapshot.clone();
        let settled = receiver
            .wait_for(|snap| snap.revision >= target && snap.state.is_settled())
            .await
            .map(|snap| (*snap).clone());
        settled.unwrap_or_else(|_| self.snapshot())
    }
}

impl Drop for FetchController {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn debounce_loop(
    api: Arc<dyn GroupsApi>,
    mut trigger: watch::Receiver<Option<Scheduled>>,
    state: Arc<watch::Sender<FetchSnapshot>>,
    directory: GroupDirectory,
    window: Duration,
) {
    while trigger.changed().await.is_ok() {
        loop {
            tokio::select! {
                () = sleep(window) => break,
                changed = trigger.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }
        let scheduled = trigger.borrow_and_update().clone();
        if let Some(scheduled) = scheduled {
            dispatch(&api, &state, &directory, scheduled);
        }
    }
}

fn dispatch(
    api: &Arc<dyn GroupsApi>,
    state: &Arc<watch::Sender<FetchSnapshot>>,
    directory: &GroupDirectory,
    scheduled: Scheduled,
) {
    let Scheduled { revision, filters } = scheduled;
    let params = filters.list_params();
    debug!(
        revision,
        page = params.page,
        per_page = params.per_page,
        "dispatching group list request"
    );
    state.send_replace(FetchSnapshot {
        revision,
        state: FetchState::Loading,
    });

    let api = Arc::clone(api);
    let state = Arc::clone(state);
    let directory = directory.clone();
    tokio::spawn(async move {
        let outcome = api.list_groups(&params).await;
        let next = match outcome {
            Ok(page) => FetchState::Fulfilled(page),
            Err(err) => {
                warn!(revision, error = %err, "group list request rejected");
                FetchState::Rejected(err)
            }
        };
        state.send_if_modified(|current| {
            if current.revision != revision {
                debug!(
                    revision,
                    latest = current.revision,
                    "discarding superseded group list response"
                );
                return false;
            }
            if let FetchState::Fulfilled(page) = &next {
                directory.record(&page.results);
            }
            current.state = next;
            true
        });
    });
}
