//! Feed data model and coordination.
//!
//! This module owns everything between the UI and the network:
//!
//! - `FeedItem` / `FeedQuery` / `FeedState` value types
//! - [`source`] - the async fetch boundary (HTTP or sample data)
//! - [`controller`] - the trigger/fetch state machine

pub mod controller;
pub mod source;

pub use controller::{Applied, FeedController, FetchCompletion, FetchMode, FetchPlan};
pub use source::{FeedSource, FetchError, HttpFeedSource, SampleFeedSource};

use serde::{Deserialize, Serialize};

/// What kind of entry a feed row represents.
///
/// Drives the badge shown in front of the title in the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    NewsArticle,
    Video,
    JobPosting,
}

impl FeedKind {
    /// Short badge label for list rendering.
    pub fn badge(&self) -> &'static str {
        match self {
            FeedKind::NewsArticle => "NEWS",
            FeedKind::Video => "VIDEO",
            FeedKind::JobPosting => "JOB",
        }
    }
}

/// One immutable entry in the feed list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub kind: FeedKind,
    pub title: String,
    /// Publisher or channel name shown under the title.
    pub source: String,
    /// Pre-formatted relative timestamp ("3h ago") — display-only.
    pub time_ago: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// The parameters of one page fetch: which page, which tab, which search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedQuery {
    /// 1-based page number.
    pub page: u32,
    pub tab_index: usize,
    pub search_text: String,
}

impl FeedQuery {
    pub fn new(page: u32, tab_index: usize, search_text: impl Into<String>) -> Self {
        debug_assert!(page >= 1, "page numbers are 1-based");
        Self {
            page,
            tab_index,
            search_text: search_text.into(),
        }
    }
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self::new(1, 0, "")
    }
}

/// The single source of truth for feed contents.
///
/// Mutated only by [`FeedController`] in response to completed fetches.
/// `is_loading` stays true for the whole span between trigger-accept and
/// result-apply; at most one fetch is live at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedState {
    pub items: Vec<FeedItem>,
    pub is_loading: bool,
    pub current_page: u32,
    pub has_more_data: bool,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: false,
            current_page: 1,
            has_more_data: true,
        }
    }
}
