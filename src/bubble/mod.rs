// Bubble presentation state. Owns everything the compositor needs to draw a
// minimized window: fill color, alpha, scale, icon or glyph, badge ordinal.
// Redraws are lazy: setters only mark the view dirty when a value changes.

use serde::Serialize;

/// Side of the square bubble surface, in pixels.
pub const BUBBLE_SIZE: u32 = 180;

/// Idle fade delay after the finger lifts.
pub const IDLE_FADE_MS: u64 = 1500;

/// Alpha the bubble settles to when idle.
pub const IDLE_ALPHA_FADED: f32 = 0.7;

const FILL_NORMAL: &str = "#6200EE";
const FILL_DISMISS: &str = "#FF0000";

/// What goes in the middle of the circle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum BubbleContent {
    Glyph { text: String, font_size: f32 },
    Icon { path: String, side: f32 },
}

/// Badge disk in the top-right corner carrying the bubble ordinal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeVisual {
    pub number: u32,
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
    pub font_size: f32,
    pub alpha: u8,
}

/// Complete display list for one bubble, ready to hand to the compositor.
/// Geometry transforms compose around the bubble center so `scale` zooms
/// in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubbleVisual {
    pub size: u32,
    pub radius: f32,
    pub fill_color: String,
    pub alpha: u8,
    pub scale: f32,
    pub content: BubbleContent,
    pub badge: Option<BadgeVisual>,
}

/// A single one-shot idle-fade timer request. The generation makes stale
/// callbacks harmless: any touch bumps the generation before the old timer
/// fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeRequest {
    pub generation: u32,
    pub delay_ms: u64,
}

pub struct BubbleRenderer {
    size: u32,
    dismissing: bool,
    base_alpha: f32,
    idle_alpha: f32,
    scale: f32,
    icon_path: Option<String>,
    badge: u32,
    fade_generation: u32,
    dirty: bool,
}

impl BubbleRenderer {
    pub fn new() -> Self {
        Self {
            size: BUBBLE_SIZE,
            dismissing: false,
            base_alpha: 1.0,
            idle_alpha: 1.0,
            scale: 1.0,
            icon_path: None,
            badge: 0,
            fade_generation: 0,
            dirty: true,
        }
    }

    pub fn set_icon(&mut self, path: Option<String>) {
        if self.icon_path != path {
            self.icon_path = path;
            self.dirty = true;
        }
    }

    pub fn set_badge(&mut self, number: u32) {
        if self.badge != number {
            self.badge = number;
            self.dirty = true;
        }
    }

    pub fn set_scale(&mut self, scale: f32) {
        if self.scale != scale {
            self.scale = scale;
            self.dirty = true;
        }
    }

    pub fn set_dismissing(&mut self, dismissing: bool, alpha: f32) {
        if self.dismissing != dismissing || self.base_alpha != alpha {
            self.dismissing = dismissing;
            self.base_alpha = alpha;
            self.dirty = true;
        }
    }

    /// Cancel any pending fade and snap back to full alpha. Called on
    /// finger down and whenever the bubble surface is re-attached.
    pub fn cancel_idle_fade(&mut self) {
        self.fade_generation = self.fade_generation.wrapping_add(1);
        if self.idle_alpha != 1.0 {
            self.idle_alpha = 1.0;
            self.dirty = true;
        }
    }

    pub fn on_touch_down(&mut self) {
        self.cancel_idle_fade();
    }

    /// Finger up: full alpha now, fade to 0.7 after the returned delay
    /// unless another touch supersedes the request.
    pub fn on_touch_up(&mut self) -> FadeRequest {
        self.fade_generation = self.fade_generation.wrapping_add(1);
        if self.idle_alpha != 1.0 {
            self.idle_alpha = 1.0;
            self.dirty = true;
        }
        FadeRequest {
            generation: self.fade_generation,
            delay_ms: IDLE_FADE_MS,
        }
    }

    /// Called when a fade timer fires. Stale generations are dropped.
    /// Returns whether the fade was applied.
    pub fn idle_fade_elapsed(&mut self, generation: u32) -> bool {
        if generation != self.fade_generation {
            return false;
        }
        if self.idle_alpha != IDLE_ALPHA_FADED {
            self.idle_alpha = IDLE_ALPHA_FADED;
            self.dirty = true;
        }
        true
    }

    pub fn idle_alpha(&self) -> f32 {
        self.idle_alpha
    }

    /// Consume the dirty flag; true means the compositor needs a redraw.
    pub fn take_dirty(&mut self) -> bool {
        let was = self.dirty;
        self.dirty = false;
        was
    }

    pub fn visual(&self) -> BubbleVisual {
        let radius = self.size as f32 / 2.0 - 10.0;
        let effective_alpha = (255.0 * self.base_alpha * self.idle_alpha).round() as u8;

        let content = if self.dismissing {
            BubbleContent::Glyph {
                text: "✕".to_string(),
                font_size: radius * 0.6,
            }
        } else if let Some(path) = &self.icon_path {
            BubbleContent::Icon {
                path: path.clone(),
                side: radius * 1.4,
            }
        } else {
            BubbleContent::Glyph {
                text: "▶".to_string(),
                font_size: radius * 0.6,
            }
        };

        let badge = if self.badge > 0 {
            Some(BadgeVisual {
                number: self.badge,
                center_x: self.size as f32 - radius * 0.7,
                center_y: radius * 0.7,
                radius: radius * 0.3,
                font_size: radius * 0.4,
                alpha: effective_alpha,
            })
        } else {
            None
        };

        BubbleVisual {
            size: self.size,
            radius,
            fill_color: if self.dismissing {
                FILL_DISMISS.to_string()
            } else {
                FILL_NORMAL.to_string()
            },
            alpha: effective_alpha,
            scale: self.scale,
            content,
            badge,
        }
    }
}
