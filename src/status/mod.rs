// Status presenter boundary: the persistent "games running" notification.
// The webview renders it from `overlay-status` events and exposes the
// Stop All action, which dispatches `stop_window` with no id.

use serde::Serialize;
use tauri::Emitter;

/// What the persistent status shows at any moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub title: String,
    pub body: String,
    pub count: usize,
    /// Whether the Stop All action is offered.
    pub stop_all_available: bool,
}

pub trait StatusPresenter {
    /// Refresh the persistent status after a registry mutation.
    fn refresh(&self, summary: &StatusSummary);
    /// Release the status once no window is live.
    fn clear(&self);
}

pub struct EventStatusPresenter {
    app: tauri::AppHandle,
}

impl EventStatusPresenter {
    pub fn new(app: tauri::AppHandle) -> Self {
        Self { app }
    }
}

impl StatusPresenter for EventStatusPresenter {
    fn refresh(&self, summary: &StatusSummary) {
        if let Err(e) = self.app.emit("overlay-status", summary.clone()) {
            println!("[OVERLAY] Failed to emit overlay-status: {}", e);
        }
    }

    fn clear(&self) {
        if let Err(e) = self.app.emit("overlay-status-cleared", ()) {
            println!("[OVERLAY] Failed to emit overlay-status-cleared: {}", e);
        }
    }
}
