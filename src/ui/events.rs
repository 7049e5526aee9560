//! Background fetch event handling.
//!
//! Completed fetches arrive here from the `AppEvent` channel and are folded
//! into the controller on the loop thread. Errors surface on the status
//! line; stale results are dropped silently.

use crate::app::{App, AppEvent};
use crate::feed::controller::Applied;

/// Handle application events from background fetch tasks.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::FeedLoaded(completion) => match app.controller.apply(completion) {
            Applied::Updated => {
                // A replace can shrink the list under the cursor
                app.clamp_selection();
                if !app.controller.state().has_more_data
                    && !app.controller.state().items.is_empty()
                {
                    app.set_status("End of feed");
                }
            }
            Applied::Failed(e) => {
                app.set_status(format!("Fetch failed: {}", e));
            }
            Applied::Stale => {
                tracing::debug!("Dropped stale fetch result in event handler");
            }
        },
    }
}
