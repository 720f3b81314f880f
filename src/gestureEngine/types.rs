// Core data structures for the bubble gesture engine

use serde::{Deserialize, Serialize};

/// Phase of a single pointer sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

impl PointerPhase {
    /// Parse from the string form the frontend sends.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "down" => Some(PointerPhase::Down),
            "move" => Some(PointerPhase::Move),
            "up" => Some(PointerPhase::Up),
            "cancel" => Some(PointerPhase::Cancel),
            _ => None,
        }
    }
}

/// One pointer sample in screen coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointerSample {
    pub raw_x: f32,
    pub raw_y: f32,
    pub time_ms: u64,
    pub phase: PointerPhase,
}

/// Tuning parameters for one bubble's gesture controller. All values are in
/// screen pixels except the scale factors.
#[derive(Debug, Clone, Copy)]
pub struct GestureConfig {
    pub bubble_size: u32,
    pub screen_width: u32,
    pub screen_height: u32,
    /// Releasing below this absolute Y dismisses the bubble.
    pub dismiss_threshold_y: f32,
    /// Minimum Manhattan distance from the anchor before a press becomes a drag.
    pub drag_activation_px: f32,
    pub scale_on_drag_start: f32,
    pub scale_min: f32,
    pub scale_distance_divisor: f32,
}

impl GestureConfig {
    /// Defaults for a given screen, dismiss threshold at 70% of its height.
    pub fn for_screen(bubble_size: u32, screen_width: u32, screen_height: u32) -> Self {
        Self {
            bubble_size,
            screen_width,
            screen_height,
            dismiss_threshold_y: screen_height as f32 * 0.7,
            drag_activation_px: 10.0,
            scale_on_drag_start: 1.15,
            scale_min: 0.98,
            scale_distance_divisor: 600.0,
        }
    }
}

/// Events emitted by the controller, strictly in sample order. `Tap`,
/// `Dismiss` and `Release` are terminal for the gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    /// Finger went down; cancels any idle-fade timer on the renderer.
    TouchDown,
    /// Renderer should scale the bubble around its center.
    ScaleTo(f32),
    /// New clamped top-left position for the bubble surface.
    MoveTo { x: i32, y: i32 },
    /// Finger is (or is no longer) over the dismiss zone while dragging.
    DismissHint { active: bool, progress: f32 },
    /// Finger went up; starts the idle-fade timer on the renderer.
    TouchUp,
    /// Press released without a drag.
    Tap,
    /// Drag released inside the dismiss zone.
    Dismiss,
    /// Drag released elsewhere; final geometry and release velocity in px/s.
    Release {
        x: i32,
        y: i32,
        velocity_x: f32,
        velocity_y: f32,
    },
}
