//! # Deferred Loader
//!
//! Fetches view modules on demand with a pending/ready/failed lifecycle and
//! single-flight memoization per view.
//!
//! ## Slot Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Unresolved ──load()──► Pending ──fetch ok──► Ready (memoized forever) │
//! │                            ▲   │                                        │
//! │                            │   └──fetch err / timeout / panic──► Failed │
//! │                            │                                      │     │
//! │                            └──────────────load() (retry)──────────┘     │
//! │                                                                         │
//! │   load() while Pending  → Pending, no second fetch                      │
//! │   load() while Ready    → Ready(same handle), no fetch                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each view has its own slot, so independently deferred regions resolve
//! without waiting for one another. Completion is published on a
//! `tokio::sync::watch` channel per slot.
//!
//! ## Runtime
//! `load` spawns the fetch with `tokio::spawn`, so it must be called from
//! within a tokio runtime.

use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::FutureExt;
use serde::Serialize;
use storefront_core::ViewId;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::LoadFailure;
use crate::registry::ViewReference;
use crate::view::ViewHandle;

// =============================================================================
// Results & Placeholders
// =============================================================================

/// What a caller observes when asking for a view.
#[derive(Clone)]
pub enum LoadResult {
    /// A fetch is in flight; render the region's placeholder.
    Pending,
    /// The module is loaded.
    Ready(ViewHandle),
    /// The last fetch failed; a later `load` retries.
    Failed(LoadFailure),
}

impl LoadResult {
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadResult::Pending)
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadResult::Ready(_))
    }
}

impl fmt::Debug for LoadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadResult::Pending => write!(f, "Pending"),
            LoadResult::Ready(_) => write!(f, "Ready(..)"),
            LoadResult::Failed(failure) => f.debug_tuple("Failed").field(failure).finish(),
        }
    }
}

/// Placeholder shown while a region is pending.
///
/// Scoped per region: top-level navigation shows a whole-page placeholder,
/// independently deferred sections show smaller ones. There is no global
/// spinner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placeholder {
    Page,
    Section,
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::Page => write!(f, "loading page…"),
            Placeholder::Section => write!(f, "loading section…"),
        }
    }
}

// =============================================================================
// Slots
// =============================================================================

#[derive(Clone)]
enum SlotState {
    Unresolved,
    Pending,
    Ready(ViewHandle),
    Failed(LoadFailure),
}

impl SlotState {
    fn settled(&self) -> bool {
        matches!(self, SlotState::Ready(_) | SlotState::Failed(_))
    }

    fn observe(&self) -> Option<LoadResult> {
        match self {
            SlotState::Unresolved => None,
            SlotState::Pending => Some(LoadResult::Pending),
            SlotState::Ready(handle) => Some(LoadResult::Ready(handle.clone())),
            SlotState::Failed(failure) => Some(LoadResult::Failed(failure.clone())),
        }
    }
}

struct Slot {
    state: Arc<watch::Sender<SlotState>>,
    fetches: usize,
}

impl Slot {
    fn new() -> Self {
        let (state, _) = watch::channel(SlotState::Unresolved);
        Slot {
            state: Arc::new(state),
            fetches: 0,
        }
    }
}

/// Waits for one view's in-flight fetch to settle.
pub struct LoadWatch {
    view: ViewId,
    rx: watch::Receiver<SlotState>,
}

impl LoadWatch {
    /// Resolves once the slot is Ready or Failed.
    pub async fn settled(mut self) -> LoadResult {
        let view = self.view;
        match self.rx.wait_for(SlotState::settled).await {
            Ok(state) => state.observe().unwrap_or(LoadResult::Pending),
            Err(_) => LoadResult::Failed(LoadFailure::Aborted {
                view: view.to_string(),
            }),
        }
    }
}

// =============================================================================
// Deferred Loader
// =============================================================================

/// On-demand view loader. Cheap to clone; clones share slots.
#[derive(Clone)]
pub struct DeferredLoader {
    slots: Arc<Mutex<HashMap<ViewId, Slot>>>,
    timeout: Duration,
}

impl DeferredLoader {
    /// Creates a loader whose fetches fail after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        DeferredLoader {
            slots: Arc::new(Mutex::new(HashMap::new())),
            timeout,
        }
    }

    // Slots hold plain data, so a poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<ViewId, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Asks for a view, starting a fetch if none is in flight or cached.
    ///
    /// Never blocks: returns `Pending` while the fetch runs, then `Ready`
    /// forever after. A `Failed` slot is retried, so this never returns
    /// `Failed` itself; use [`status`](Self::status) or
    /// [`LoadWatch::settled`] to observe failures.
    pub fn load(&self, view: &ViewReference) -> LoadResult {
        let mut slots = self.lock();
        let slot = slots.entry(view.id().clone()).or_insert_with(Slot::new);

        let current = slot.state.borrow().clone();
        match current {
            SlotState::Ready(handle) => return LoadResult::Ready(handle),
            SlotState::Pending => return LoadResult::Pending,
            SlotState::Failed(ref failure) => {
                info!(view = %view.id(), %failure, "Retrying failed view load");
            }
            SlotState::Unresolved => {}
        }

        slot.fetches += 1;
        slot.state.send_replace(SlotState::Pending);
        debug!(view = %view.id(), attempt = slot.fetches, "Fetching view module");

        let state = Arc::clone(&slot.state);
        let reference = view.clone();
        let id = view.id().clone();
        let timeout = self.timeout;

        // The loader itself runs inside the task so a panic while building
        // the fetch future lands in the slot instead of in the caller.
        tokio::spawn(async move {
            let outcome = AssertUnwindSafe(async move {
                tokio::time::timeout(timeout, reference.fetch()).await
            })
            .catch_unwind()
            .await;

            let next = match outcome {
                Ok(Ok(Ok(handle))) => {
                    debug!(view = %id, "View module ready");
                    SlotState::Ready(handle)
                }
                Ok(Ok(Err(failure))) => {
                    warn!(view = %id, %failure, "View module failed to load");
                    SlotState::Failed(failure)
                }
                Ok(Err(_elapsed)) => {
                    let timeout_ms = timeout.as_millis() as u64;
                    warn!(view = %id, timeout_ms, "View module load timed out");
                    SlotState::Failed(LoadFailure::TimedOut {
                        view: id.to_string(),
                        timeout_ms,
                    })
                }
                Err(_panic) => {
                    warn!(view = %id, "View loader panicked");
                    SlotState::Failed(LoadFailure::Aborted {
                        view: id.to_string(),
                    })
                }
            };

            state.send_replace(next);
        });

        LoadResult::Pending
    }

    /// Asks for a view and waits until it settles.
    pub async fn resolve(&self, view: &ViewReference) -> LoadResult {
        match self.load(view) {
            LoadResult::Pending => match self.watch(view.id()) {
                Some(watch) => watch.settled().await,
                None => LoadResult::Pending,
            },
            settled => settled,
        }
    }

    /// Peeks at a view without starting a fetch. `None` if never requested.
    pub fn status(&self, id: &ViewId) -> Option<LoadResult> {
        self.lock()
            .get(id)
            .and_then(|slot| slot.state.borrow().observe())
    }

    /// Subscribes to a view's slot. `None` if never requested.
    pub fn watch(&self, id: &ViewId) -> Option<LoadWatch> {
        self.lock().get(id).map(|slot| LoadWatch {
            view: id.clone(),
            rx: slot.state.subscribe(),
        })
    }

    /// Number of fetches started for `id`.
    pub fn fetch_count(&self, id: &ViewId) -> usize {
        self.lock().get(id).map_or(0, |slot| slot.fetches)
    }
}
