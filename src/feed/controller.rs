//! Feed trigger/fetch state machine.
//!
//! The controller is a plain reducer: trigger methods return a [`FetchPlan`]
//! when a fetch should be issued, and [`FeedController::apply`] folds the
//! completed fetch back into [`FeedState`]. No I/O happens here — the UI
//! event loop executes plans against a [`FeedSource`](super::FeedSource) and
//! routes completions back, so all state mutation stays on one thread.
//!
//! Every fetch is tagged with a generation counter. Reset triggers (search,
//! tab switch, refresh) bump the generation, so a result from a superseded
//! fetch arrives with a stale tag and is discarded instead of overwriting
//! newer state.

use super::source::FetchError;
use super::{FeedItem, FeedQuery, FeedState};
use std::time::Duration;
use tokio::time::Instant;

/// How a completed fetch is folded into the item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Result of a reset trigger: the item list is replaced.
    Replace,
    /// Result of load-more: the item list is extended.
    Append,
}

/// A fetch the controller wants issued.
///
/// Returned by the trigger methods; the caller runs the query against the
/// feed source and reports back with a [`FetchCompletion`] carrying the same
/// generation and mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    pub query: FeedQuery,
    pub generation: u64,
    pub mode: FetchMode,
}

/// A finished fetch, ready to be applied.
#[derive(Debug)]
pub struct FetchCompletion {
    pub generation: u64,
    pub mode: FetchMode,
    pub result: Result<Vec<FeedItem>, FetchError>,
}

impl FetchCompletion {
    /// Pair a plan with its outcome.
    pub fn of(plan: &FetchPlan, result: Result<Vec<FeedItem>, FetchError>) -> Self {
        Self {
            generation: plan.generation,
            mode: plan.mode,
            result,
        }
    }
}

/// Outcome of applying a completion.
#[derive(Debug)]
pub enum Applied {
    /// State was updated from a successful fetch.
    Updated,
    /// The fetch failed; `is_loading` was cleared and the error is returned
    /// for the caller to surface. Already-applied side effects stand.
    Failed(FetchError),
    /// The completion belonged to a superseded fetch and was discarded.
    Stale,
}

/// Coordinates search, tab, refresh, and load-more triggers into at most one
/// live fetch, and owns the resulting [`FeedState`].
pub struct FeedController {
    state: FeedState,
    /// Currently selected tab.
    tab_index: usize,
    /// Last accepted search text (post-debounce).
    search_text: String,
    page_size: usize,
    debounce: Duration,
    /// Search text waiting out the debounce window.
    pending_search: Option<String>,
    /// When the pending search may be accepted.
    search_deadline: Option<Instant>,
    /// Tag of the most recently issued fetch; completions with any other
    /// tag are stale.
    generation: u64,
}

impl FeedController {
    pub fn new(page_size: usize, debounce: Duration) -> Self {
        Self {
            state: FeedState::default(),
            tab_index: 0,
            search_text: String::new(),
            page_size,
            debounce,
            pending_search: None,
            search_deadline: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn tab_index(&self) -> usize {
        self.tab_index
    }

    /// The search text of the last accepted (fetched) search.
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// True while a pending search is waiting out the debounce window.
    pub fn search_pending(&self) -> bool {
        self.pending_search.is_some()
    }

    /// Record a search keystroke.
    ///
    /// Nothing is fetched yet: the value sits in the debounce window, and
    /// each further keystroke pushes the deadline out again. The event loop
    /// tick calls [`poll_search`](Self::poll_search) to accept it.
    pub fn search(&mut self, text: impl Into<String>) {
        self.pending_search = Some(text.into());
        self.search_deadline = Some(Instant::now() + self.debounce);
    }

    /// Accept a debounced search once its window has elapsed.
    ///
    /// Returns a reset fetch for the new text, or `None` while the window is
    /// still open or when the text matches the last accepted value.
    pub fn poll_search(&mut self) -> Option<FetchPlan> {
        let deadline = self.search_deadline?;
        if Instant::now() < deadline {
            return None;
        }
        self.search_deadline = None;
        let text = self.pending_search.take()?;
        if text == self.search_text {
            tracing::debug!(text = %text, "Search unchanged, suppressed");
            return None;
        }
        self.search_text = text;
        Some(self.reset_plan())
    }

    /// Switch tabs. Suppressed when the tab is already selected.
    pub fn select_tab(&mut self, index: usize) -> Option<FetchPlan> {
        if index == self.tab_index {
            return None;
        }
        self.tab_index = index;
        Some(self.reset_plan())
    }

    /// Manual pull-to-refresh. Ignored while a fetch is live; tab and search
    /// changes supersede instead.
    pub fn refresh(&mut self) -> Option<FetchPlan> {
        if self.state.is_loading {
            tracing::debug!("Refresh ignored, fetch already in flight");
            return None;
        }
        Some(self.reset_plan())
    }

    /// Request the next page. Accepted only when idle and more data is
    /// expected.
    pub fn load_more(&mut self) -> Option<FetchPlan> {
        if self.state.is_loading || !self.state.has_more_data {
            return None;
        }
        self.state.current_page += 1;
        self.state.is_loading = true;
        self.generation = self.generation.wrapping_add(1);
        Some(FetchPlan {
            query: FeedQuery::new(
                self.state.current_page,
                self.tab_index,
                self.search_text.clone(),
            ),
            generation: self.generation,
            mode: FetchMode::Append,
        })
    }

    /// Reset to page 1 and issue a replacing fetch for the current query.
    ///
    /// The page/has-more reset happens before the fetch is issued, and
    /// stands even if the fetch later fails.
    fn reset_plan(&mut self) -> FetchPlan {
        self.state.current_page = 1;
        self.state.has_more_data = true;
        self.state.is_loading = true;
        self.generation = self.generation.wrapping_add(1);
        FetchPlan {
            query: FeedQuery::new(1, self.tab_index, self.search_text.clone()),
            generation: self.generation,
            mode: FetchMode::Replace,
        }
    }

    /// Fold a completed fetch into the state.
    ///
    /// Completions tagged with a superseded generation are discarded whole:
    /// a newer fetch owns `is_loading`, so not even the loading flag is
    /// touched for them.
    pub fn apply(&mut self, completion: FetchCompletion) -> Applied {
        if completion.generation != self.generation {
            tracing::debug!(
                got = completion.generation,
                current = self.generation,
                "Discarding stale fetch result"
            );
            return Applied::Stale;
        }

        self.state.is_loading = false;

        let items = match completion.result {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, mode = ?completion.mode, "Fetch failed");
                return Applied::Failed(e);
            }
        };

        match completion.mode {
            FetchMode::Replace => {
                self.state.has_more_data = items.len() >= self.page_size;
                self.state.items = items;
            }
            FetchMode::Append => {
                if items.is_empty() {
                    self.state.has_more_data = false;
                } else {
                    self.state.items.extend(items);
                }
            }
        }
        Applied::Updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedKind;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use tokio::time::{self, Duration};

    const PAGE_SIZE: usize = 8;
    const DEBOUNCE: Duration = Duration::from_millis(300);

    fn controller() -> FeedController {
        FeedController::new(PAGE_SIZE, DEBOUNCE)
    }

    fn items(n: usize) -> Vec<FeedItem> {
        (0..n)
            .map(|i| FeedItem {
                kind: FeedKind::NewsArticle,
                title: format!("Item {}", i),
                source: "Test Wire".into(),
                time_ago: "1h ago".into(),
                image_url: None,
            })
            .collect()
    }

    fn fetch_error() -> FetchError {
        FetchError::HttpStatus(500)
    }

    #[test]
    fn test_refresh_resets_page_and_has_more_before_fetch() {
        let mut c = controller();
        // Dirty the state first via a completed load-more cycle.
        let plan = c.refresh().unwrap();
        c.apply(FetchCompletion::of(&plan, Ok(items(PAGE_SIZE))));
        let plan = c.load_more().unwrap();
        c.apply(FetchCompletion::of(&plan, Ok(items(3))));
        assert_eq!(c.state().current_page, 2);

        let plan = c.refresh().unwrap();
        assert_eq!(plan.query.page, 1);
        assert_eq!(plan.mode, FetchMode::Replace);
        assert_eq!(c.state().current_page, 1);
        assert!(c.state().has_more_data);
        assert!(c.state().is_loading);
    }

    #[test]
    fn test_select_tab_resets_and_carries_new_tab() {
        let mut c = controller();
        let plan = c.select_tab(3).unwrap();
        assert_eq!(plan.query.tab_index, 3);
        assert_eq!(plan.query.page, 1);
        assert_eq!(c.tab_index(), 3);
    }

    #[test]
    fn test_select_same_tab_suppressed() {
        let mut c = controller();
        assert!(c.select_tab(0).is_none());
        c.select_tab(2).unwrap();
        assert!(c.select_tab(2).is_none());
    }

    #[test]
    fn test_refresh_ignored_while_loading() {
        let mut c = controller();
        let _plan = c.refresh().unwrap();
        assert!(c.state().is_loading);
        assert!(c.refresh().is_none());
    }

    #[test]
    fn test_replace_success_sets_has_more_by_page_size() {
        let mut c = controller();
        let plan = c.refresh().unwrap();
        assert!(matches!(
            c.apply(FetchCompletion::of(&plan, Ok(items(PAGE_SIZE)))),
            Applied::Updated
        ));
        assert_eq!(c.state().items.len(), PAGE_SIZE);
        assert!(c.state().has_more_data);
        assert!(!c.state().is_loading);

        // A short page means the tab is exhausted.
        let plan = c.refresh().unwrap();
        c.apply(FetchCompletion::of(&plan, Ok(items(PAGE_SIZE - 1))));
        assert!(!c.state().has_more_data);
    }

    #[test]
    fn test_load_more_appends_in_order() {
        let mut c = controller();
        let plan = c.refresh().unwrap();
        c.apply(FetchCompletion::of(&plan, Ok(items(PAGE_SIZE))));

        let plan = c.load_more().unwrap();
        assert_eq!(plan.query.page, 2);
        assert_eq!(plan.mode, FetchMode::Append);

        let mut page2 = items(3);
        page2[0].title = "Page two lead".into();
        c.apply(FetchCompletion::of(&plan, Ok(page2)));

        assert_eq!(c.state().items.len(), PAGE_SIZE + 3);
        // Existing items first, new page after.
        assert_eq!(c.state().items[0].title, "Item 0");
        assert_eq!(c.state().items[PAGE_SIZE].title, "Page two lead");
    }

    #[test]
    fn test_load_more_empty_result_exhausts_without_change() {
        let mut c = controller();
        let plan = c.refresh().unwrap();
        c.apply(FetchCompletion::of(&plan, Ok(items(PAGE_SIZE))));

        let plan = c.load_more().unwrap();
        c.apply(FetchCompletion::of(&plan, Ok(Vec::new())));

        assert!(!c.state().has_more_data);
        assert_eq!(c.state().items.len(), PAGE_SIZE);

        // Exhausted feed accepts no further load-more.
        assert!(c.load_more().is_none());
    }

    #[test]
    fn test_load_more_ignored_while_loading() {
        let mut c = controller();
        let plan = c.refresh().unwrap();
        c.apply(FetchCompletion::of(&plan, Ok(items(PAGE_SIZE))));

        let _first = c.load_more().unwrap();
        let before = c.state().clone();
        assert!(c.load_more().is_none());
        assert_eq!(*c.state(), before);
    }

    #[test]
    fn test_reset_failure_clears_loading_keeps_reset_flags() {
        let mut c = controller();
        let plan = c.refresh().unwrap();
        match c.apply(FetchCompletion::of(&plan, Err(fetch_error()))) {
            Applied::Failed(_) => {}
            other => panic!("Expected Failed, got {:?}", other),
        }
        assert!(!c.state().is_loading);
        // The reset applied before the fetch stands.
        assert_eq!(c.state().current_page, 1);
        assert!(c.state().has_more_data);
        assert!(c.state().items.is_empty());
    }

    #[test]
    fn test_load_more_failure_leaves_page_incremented() {
        let mut c = controller();
        let plan = c.refresh().unwrap();
        c.apply(FetchCompletion::of(&plan, Ok(items(PAGE_SIZE))));

        let plan = c.load_more().unwrap();
        c.apply(FetchCompletion::of(&plan, Err(fetch_error())));

        assert!(!c.state().is_loading);
        assert_eq!(c.state().current_page, 2);
        assert_eq!(c.state().items.len(), PAGE_SIZE);
    }

    #[test]
    fn test_stale_result_discarded_after_supersede() {
        let mut c = controller();
        let refresh_plan = c.refresh().unwrap();
        // Tab switch supersedes the in-flight refresh.
        let tab_plan = c.select_tab(1).unwrap();
        assert!(c.state().is_loading);

        // The refresh result straggles in afterwards: dropped whole, and
        // is_loading stays owned by the tab fetch.
        assert!(matches!(
            c.apply(FetchCompletion::of(&refresh_plan, Ok(items(5)))),
            Applied::Stale
        ));
        assert!(c.state().is_loading);
        assert!(c.state().items.is_empty());

        c.apply(FetchCompletion::of(&tab_plan, Ok(items(2))));
        assert!(!c.state().is_loading);
        assert_eq!(c.state().items.len(), 2);
    }

    #[test]
    fn test_stale_failure_does_not_clear_loading() {
        let mut c = controller();
        let old = c.refresh().unwrap();
        let _new = c.select_tab(1).unwrap();
        assert!(matches!(
            c.apply(FetchCompletion::of(&old, Err(fetch_error()))),
            Applied::Stale
        ));
        assert!(c.state().is_loading);
    }

    #[test]
    fn test_spec_scenario_eight_then_empty() {
        let mut c = controller();
        let plan = c.refresh().unwrap();
        assert_eq!(plan.query, FeedQuery::new(1, 0, ""));
        c.apply(FetchCompletion::of(&plan, Ok(items(8))));
        assert!(c.state().has_more_data);

        let plan = c.load_more().unwrap();
        c.apply(FetchCompletion::of(&plan, Ok(Vec::new())));
        assert!(!c.state().has_more_data);
        assert_eq!(c.state().items.len(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_debounce_coalesces_rapid_typing() {
        let mut c = controller();
        c.search("a");
        time::advance(Duration::from_millis(100)).await;
        assert!(c.poll_search().is_none()); // Window still open

        c.search("ai");
        time::advance(Duration::from_millis(299)).await;
        assert!(c.poll_search().is_none()); // Second keystroke pushed the deadline

        time::advance(Duration::from_millis(1)).await;
        let plan = c.poll_search().unwrap();
        assert_eq!(plan.query.search_text, "ai"); // Only the final value fetches
        assert_eq!(plan.query.page, 1);
        assert_eq!(c.search_text(), "ai");

        // Nothing left pending.
        time::advance(DEBOUNCE).await;
        assert!(c.poll_search().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_unchanged_value_suppressed() {
        let mut c = controller();
        c.search("rust");
        time::advance(DEBOUNCE).await;
        let plan = c.poll_search().unwrap();
        c.apply(FetchCompletion::of(&plan, Ok(items(2))));

        // Typing the same accepted value again fetches nothing.
        c.search("rust");
        time::advance(DEBOUNCE).await;
        assert!(c.poll_search().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_supersedes_in_flight_fetch() {
        let mut c = controller();
        let refresh_plan = c.refresh().unwrap();

        c.search("news");
        time::advance(DEBOUNCE).await;
        let search_plan = c.poll_search().unwrap();
        assert_eq!(search_plan.query.search_text, "news");

        assert!(matches!(
            c.apply(FetchCompletion::of(&refresh_plan, Ok(items(4)))),
            Applied::Stale
        ));
        assert!(matches!(
            c.apply(FetchCompletion::of(&search_plan, Ok(items(1)))),
            Applied::Updated
        ));
        assert_eq!(c.state().items.len(), 1);
    }

    // Property: under arbitrary trigger/completion interleavings, reset
    // triggers always restart from page 1 with has_more_data set, and
    // load-more never fires while a fetch is live.
    #[derive(Debug, Clone)]
    enum Op {
        SelectTab(usize),
        Refresh,
        LoadMore,
        CompleteOk(usize),
        CompleteErr,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..4).prop_map(Op::SelectTab),
            Just(Op::Refresh),
            Just(Op::LoadMore),
            (0usize..=PAGE_SIZE).prop_map(Op::CompleteOk),
            Just(Op::CompleteErr),
        ]
    }

    proptest! {
        #[test]
        fn prop_trigger_sequences_hold_invariants(ops in proptest::collection::vec(op_strategy(), 1..40)) {
            let mut c = controller();
            let mut live: Option<FetchPlan> = None;

            for op in ops {
                let plan = match op {
                    Op::SelectTab(i) => c.select_tab(i),
                    Op::Refresh => c.refresh(),
                    Op::LoadMore => {
                        let was_loading = c.state().is_loading;
                        let plan = c.load_more();
                        if was_loading {
                            prop_assert!(plan.is_none());
                        }
                        plan
                    }
                    Op::CompleteOk(n) => {
                        if let Some(p) = live.take() {
                            c.apply(FetchCompletion::of(&p, Ok(items(n))));
                        }
                        None
                    }
                    Op::CompleteErr => {
                        if let Some(p) = live.take() {
                            c.apply(FetchCompletion::of(&p, Err(fetch_error())));
                        }
                        None
                    }
                };

                if let Some(p) = plan {
                    if p.mode == FetchMode::Replace {
                        prop_assert_eq!(p.query.page, 1);
                        prop_assert_eq!(c.state().current_page, 1);
                        prop_assert!(c.state().has_more_data);
                    }
                    prop_assert!(c.state().is_loading);
                    live = Some(p);
                }
            }

            // Every live fetch resolved with the current generation leaves
            // the controller unstuck.
            if let Some(p) = live.take() {
                c.apply(FetchCompletion::of(&p, Ok(Vec::new())));
            }
            prop_assert!(!c.state().is_loading);
        }
    }
}
