use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::RwLock;
use tokio::task::{AbortHandle, JoinHandle};

use crate::api::types::ResultPage;
use crate::api::WorkflowSource;
use crate::error::{AppError, Result};

use super::state::{ListState, PageState, ResponseOrdering};
use super::view::ListProps;

/// Callback the list view invokes when the user picks a new page or filters.
pub type ChangeHandler = Arc<dyn Fn(PageState) + Send + Sync>;

struct Inner {
    source: Arc<dyn WorkflowSource>,
    ordering: ResponseOrdering,
    state: RwLock<ListState>,
    next_seq: AtomicU64,
    tasks: Mutex<Vec<AbortHandle>>,
    disposed: AtomicBool,
}

/// Owns the listing state and keeps it in sync with the workflow source.
pub struct ListContainer {
    inner: Arc<Inner>,
    on_change: ChangeHandler,
}

impl ListContainer {
    pub fn new(source: Arc<dyn WorkflowSource>, ordering: ResponseOrdering) -> Self {
        let inner = Arc::new(Inner {
            source,
            ordering,
            state: RwLock::new(ListState::default()),
            next_seq: AtomicU64::new(0),
            tasks: Mutex::new(Vec::new()),
            disposed: AtomicBool::new(false),
        });

        let weak = Arc::downgrade(&inner);
        let on_change: ChangeHandler = Arc::new(move |state| {
            if let Some(inner) = weak.upgrade() {
                let _ = inner.spawn_load(state);
            }
        });

        Self { inner, on_change }
    }

    /// Issue the initial load for the current state.
    pub async fn mount(&self) -> Option<JoinHandle<()>> {
        let state = self.inner.state.read().await.page_state.clone();
        tracing::debug!(page = state.page(), "Mounting workflow list");
        self.inner.spawn_load(state)
    }

    /// Start loading `state` in the background without waiting for it.
    ///
    /// Returns `None` once the container has been disposed.
    pub fn on_change(&self, state: PageState) -> Option<JoinHandle<()>> {
        self.inner.spawn_load(state)
    }

    /// Fetch `state` and apply the response to the displayed state.
    pub async fn load(&self, state: PageState) -> Result<ResultPage> {
        if self.inner.disposed.load(Ordering::SeqCst) {
            return Err(AppError::InvalidState("List container is disposed".to_string()));
        }
        let seq = self.inner.issue_seq();
        self.inner.load(seq, state).await
    }

    pub fn handler(&self) -> ChangeHandler {
        Arc::clone(&self.on_change)
    }

    pub async fn render(&self) -> ListProps {
        let state = self.inner.state.read().await;
        ListProps {
            page: state.page_state.page(),
            query: state.page_state.query().clone(),
            workflows: state.data.as_ref().map(|d| d.results.clone()),
            total_count: state.total_count(),
            error: state.error.clone(),
            on_change: self.handler(),
        }
    }

    /// Abort in-flight loads and ignore further change events.
    pub fn dispose(&self) {
        // Flipped under the task lock so no load can register after the drain
        let tasks: Vec<AbortHandle> = {
            let mut tasks = self.inner.tasks.lock().unwrap_or_else(|e| e.into_inner());
            if self.inner.disposed.swap(true, Ordering::SeqCst) {
                return;
            }
            tasks.drain(..).collect()
        };

        let aborted = tasks.iter().filter(|t| !t.is_finished()).count();
        for task in tasks {
            task.abort();
        }

        tracing::debug!(aborted = aborted, "Disposed workflow list");
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }
}

impl Drop for ListContainer {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Inner {
    fn issue_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn spawn_load(self: &Arc<Self>, state: PageState) -> Option<JoinHandle<()>> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::warn!(page = state.page(), error = %e, "Ignoring change outside a Tokio runtime");
                return None;
            }
        };

        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        if self.disposed.load(Ordering::SeqCst) {
            tracing::warn!(page = state.page(), "Ignoring change on disposed workflow list");
            return None;
        }

        // Sequence numbers follow the order changes are issued in, not the
        // order spawned tasks get scheduled.
        let seq = self.issue_seq();
        let inner = Arc::clone(self);
        let handle = runtime.spawn(async move {
            // Failures are logged and recorded in the state by `load`
            let _ = inner.load(seq, state).await;
        });

        tasks.retain(|t| !t.is_finished());
        tasks.push(handle.abort_handle());

        Some(handle)
    }

    async fn load(&self, seq: u64, state: PageState) -> Result<ResultPage> {
        tracing::info!(
            seq = seq,
            page = state.page(),
            filters = state.query().len(),
            "Loading workflows"
        );

        match self.source.list_workflows(&state).await {
            Ok(page) => {
                self.apply_page(seq, state, page.clone()).await;
                Ok(page)
            }
            Err(e) => {
                tracing::error!(seq = seq, page = state.page(), error = %e, "Failed to load workflows");
                self.apply_error(seq, e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn apply_page(&self, seq: u64, page_state: PageState, page: ResultPage) {
        let mut current = self.state.write().await;
        if self.is_stale(seq, &current) {
            tracing::debug!(seq = seq, applied = current.applied_seq, "Discarding stale workflow page");
            return;
        }

        current.page_state = page_state;
        current.data = Some(page);
        current.error = None;
        current.applied_seq = seq;
    }

    async fn apply_error(&self, seq: u64, error: String) {
        let mut current = self.state.write().await;
        if self.is_stale(seq, &current) {
            return;
        }

        current.error = Some(error);
        current.applied_seq = seq;
    }

    fn is_stale(&self, seq: u64, current: &ListState) -> bool {
        self.ordering == ResponseOrdering::LatestIssued && seq < current.applied_seq
    }
}
