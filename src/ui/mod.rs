//! Terminal User Interface module.
//!
//! This module provides the TUI for the feed browser, including:
//! - Main event loop (`run`)
//! - Input handling for browse and search modes
//! - Rendering for the tab bar, item list, and status line
//! - Background fetch event processing
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background fetch event processing
//! - `render` - Layout and render dispatch
//! - `feedlist` - Feed item list widget
//! - `tabs` - Tab bar widget
//! - `status` - Status bar widget

mod events;
mod feedlist;
mod input;
mod loop_runner;
mod render;
mod status;
mod tabs;

// Re-export the public API
pub use loop_runner::{run, Action};
