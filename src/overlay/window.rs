// Per-session window state: presentation mode, geometry for both the frame
// and the bubble, the saved parent of the borrowed guest view, and the live
// gesture controller while minimized.

use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::bubble::{BubbleRenderer, BUBBLE_SIZE};
use crate::gesture_engine::BubbleDragController;
use crate::overlay::frame::FloatingFrame;
use crate::session::HostSlot;
use crate::surface::{Geometry, SurfaceKind};

/// Presentation mode of one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WindowMode {
    Created,
    Floating,
    Maximized,
    Bubble,
    Destroyed,
}

/// One managed overlay window. The session it presents outlives it.
pub struct OverlayWindow {
    pub window_id: String,
    pub app_name: String,
    pub app_path: String,
    /// Registry key of the session whose guest view this window borrowed.
    /// Usually equal to `window_id`; differs only after a fallback lookup.
    pub session_key: String,
    pub mode: WindowMode,
    pub frame_geom: Geometry,
    /// Top-left of the bubble surface; persists across restore cycles.
    pub bubble_pos: (i32, i32),
    pub saved_parent: Option<HostSlot>,
    pub frame: FloatingFrame,
    pub bubble: Option<BubbleRenderer>,
    pub gesture: Option<BubbleDragController>,
    /// Which surface is currently attached, if any. Never both.
    pub attached: Option<SurfaceKind>,
    /// Badge assigned at minimization; 0 before the first minimize.
    pub ordinal: u32,
}

/// Externally visible snapshot of one window.
#[derive(Debug, Clone, Serialize)]
pub struct WindowSummary {
    pub window_id: String,
    pub app_name: String,
    pub mode: WindowMode,
    pub frame_geom: Geometry,
    pub bubble_x: i32,
    pub bubble_y: i32,
    pub ordinal: u32,
}

fn id_hash(window_id: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    window_id.hash(&mut hasher);
    hasher.finish()
}

/// Initial frame placement, staggered per window id so stacked windows do
/// not fully cover each other.
pub fn default_frame_geom(window_id: &str, screen: (u32, u32)) -> Geometry {
    let (width, height) = screen;
    let offset = (id_hash(window_id) % 200) as i32;
    Geometry::new(
        100 + offset,
        100 + offset,
        (width as f32 * 0.8) as u32,
        (height as f32 * 0.7) as u32,
    )
}

/// Initial bubble placement on the left edge.
pub fn default_bubble_pos(window_id: &str) -> (i32, i32) {
    (0, 200 + (id_hash(window_id) % 300) as i32)
}

/// Near-fullscreen frame placement, centered.
pub fn maximized_frame_geom(screen: (u32, u32)) -> Geometry {
    let (width, height) = screen;
    let w = (width as f32 * 0.95) as u32;
    let h = (height as f32 * 0.9) as u32;
    Geometry::new(
        ((width - w) / 2) as i32,
        ((height - h) / 2) as i32,
        w,
        h,
    )
}

impl OverlayWindow {
    pub fn new(
        window_id: String,
        app_name: String,
        app_path: String,
        session_key: String,
        screen: (u32, u32),
    ) -> Self {
        let frame_geom = default_frame_geom(&window_id, screen);
        let bubble_pos = default_bubble_pos(&window_id);
        Self {
            frame: FloatingFrame::new(app_name.clone()),
            window_id,
            app_name,
            app_path,
            session_key,
            mode: WindowMode::Created,
            frame_geom,
            bubble_pos,
            saved_parent: None,
            bubble: None,
            gesture: None,
            attached: None,
            ordinal: 0,
        }
    }

    pub fn bubble_geometry(&self) -> Geometry {
        Geometry::new(self.bubble_pos.0, self.bubble_pos.1, BUBBLE_SIZE, BUBBLE_SIZE)
    }

    pub fn summary(&self) -> WindowSummary {
        WindowSummary {
            window_id: self.window_id.clone(),
            app_name: self.app_name.clone(),
            mode: self.mode,
            frame_geom: self.frame_geom,
            bubble_x: self.bubble_pos.0,
            bubble_y: self.bubble_pos.1,
            ordinal: self.ordinal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_frame_geom_is_staggered_and_sized() {
        let screen = (1080, 2000);
        let geom = default_frame_geom("w1", screen);
        assert!(geom.x >= 100 && geom.x < 300);
        assert_eq!(geom.x, geom.y);
        assert_eq!(geom.width, 864); // 0.8 * 1080
        assert_eq!(geom.height, 1400); // 0.7 * 2000

        // Stable per id
        assert_eq!(default_frame_geom("w1", screen), geom);
    }

    #[test]
    fn test_default_bubble_pos_hugs_left_edge() {
        let (x, y) = default_bubble_pos("w1");
        assert_eq!(x, 0);
        assert!((200..500).contains(&y));
    }

    #[test]
    fn test_maximized_geom_is_centered() {
        let geom = maximized_frame_geom((1000, 2000));
        assert_eq!(geom.width, 950);
        assert_eq!(geom.height, 1800);
        assert_eq!(geom.x, 25);
        assert_eq!(geom.y, 100);
    }
}
