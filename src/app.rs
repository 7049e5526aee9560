use crate::config::Config;
use crate::feed::{FeedController, FeedItem, FeedSource, FetchCompletion, FetchPlan};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// How close to the bottom of the list the selection may get before the
/// next page is requested. Mirrors the 1.5-screens scroll threshold of a
/// touch feed.
pub const LOAD_MORE_THRESHOLD: usize = 3;

/// Events from background fetch tasks.
///
/// The event loop is the only consumer; everything that mutates feed state
/// funnels through here so mutation stays on one thread.
pub enum AppEvent {
    /// A page fetch finished (successfully or not).
    FeedLoaded(FetchCompletion),
}

/// Central application state.
///
/// Owns the feed controller and the injected feed source. Per-screen
/// construction: nothing here is process-global.
pub struct App {
    pub controller: FeedController,
    pub source: Arc<dyn FeedSource>,

    /// Tab titles, left to right (from config).
    pub tabs: Vec<String>,

    // UI state
    pub selected: usize,
    pub search_mode: bool,
    /// Live contents of the search input (pre-debounce).
    pub search_input: String,

    /// Status message with expiry — Cow avoids allocation for static hints.
    pub status_message: Option<(Cow<'static, str>, Instant)>,

    /// Dirty flag to skip unnecessary frame renders.
    pub needs_redraw: bool,

    /// Handle to the most recent fetch task.
    ///
    /// A superseding trigger does NOT abort it — the stale result is
    /// discarded by generation tag instead — but dropping the App does, so
    /// no pending result can land after the screen is dismantled.
    pub fetch_handle: Option<tokio::task::JoinHandle<()>>,
}

impl App {
    pub fn new(source: Arc<dyn FeedSource>, config: &Config) -> Self {
        Self {
            controller: FeedController::new(
                config.page_size,
                Duration::from_millis(config.search_debounce_ms),
            ),
            source,
            tabs: config.tabs.clone(),
            selected: 0,
            search_mode: false,
            search_input: String::new(),
            status_message: None,
            needs_redraw: true,
            fetch_handle: None,
        }
    }

    /// Execute a fetch plan on a background task.
    ///
    /// The result comes back through the event channel as
    /// [`AppEvent::FeedLoaded`] and is applied on the loop thread.
    pub fn issue_fetch(&mut self, plan: FetchPlan, event_tx: &mpsc::Sender<AppEvent>) {
        tracing::debug!(
            page = plan.query.page,
            tab = plan.query.tab_index,
            search = %plan.query.search_text,
            generation = plan.generation,
            mode = ?plan.mode,
            "Issuing fetch"
        );

        let tx = event_tx.clone();
        let future = self.source.fetch(plan.query.clone());
        self.fetch_handle = Some(tokio::spawn(async move {
            let result = future.await;
            let completion = FetchCompletion {
                generation: plan.generation,
                mode: plan.mode,
                result,
            };
            if let Err(e) = tx.send(AppEvent::FeedLoaded(completion)).await {
                tracing::warn!(error = %e, "Failed to send fetch result (receiver dropped)");
            }
        }));
    }

    /// Currently selected item (bounds-checked).
    pub fn selected_item(&self) -> Option<&FeedItem> {
        self.controller.state().items.get(self.selected)
    }

    /// Move the selection up one row.
    pub fn nav_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Move the selection down one row. Returns true when the selection is
    /// now close enough to the bottom that the next page should load.
    pub fn nav_down(&mut self) -> bool {
        let len = self.controller.state().items.len();
        if len == 0 {
            return false;
        }
        self.selected = self.selected.saturating_add(1).min(len - 1);
        self.near_bottom()
    }

    /// Whether the selection sits within the load-more threshold of the end.
    pub fn near_bottom(&self) -> bool {
        let len = self.controller.state().items.len();
        len > 0 && self.selected + LOAD_MORE_THRESHOLD >= len
    }

    /// Clamp the selection after the item list changed.
    ///
    /// A replace can shrink the list (tab switch, narrower search), leaving
    /// the selection pointing past the end.
    pub fn clamp_selection(&mut self) {
        let len = self.controller.state().items.len();
        self.selected = if len == 0 {
            0
        } else {
            self.selected.min(len - 1)
        };
    }

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired (older than 3 seconds).
    /// Returns true if a message was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

/// Abort the in-flight fetch when the screen goes away, so no completion
/// callback can land on a dismantled consumer.
impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.fetch_handle.take() {
            handle.abort();
            tracing::debug!("Aborted fetch task on App drop");
        }
    }
}
