// Gesture engine for bubble drag/dismiss handling
// Pure state machine over pointer samples, no UI framework types involved

pub mod types;
pub mod bubble_drag;

pub use bubble_drag::BubbleDragController;
pub use types::*;
