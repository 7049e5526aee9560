//! newsdeck — a terminal news feed browser.
//!
//! The interesting part is [`feed::FeedController`]: a small state machine
//! that merges debounced search, tab switches, manual refresh, and
//! infinite-scroll load-more into at most one live page fetch against an
//! injected [`feed::FeedSource`]. The TUI in [`ui`] is a thin consumer.

pub mod app;
pub mod config;
pub mod feed;
pub mod ui;
