// Overlay module: per-window state machines, frame chrome, and the
// process-wide manager that dispatches lifecycle intents

pub mod error;
pub mod frame;
pub mod manager;
pub mod window;

pub use error::OverlayError;
pub use manager::{OverlayManager, OverlayNote, OverlaySink, PointerFollowUp, StartOutcome};
pub use window::{OverlayWindow, WindowMode, WindowSummary};
