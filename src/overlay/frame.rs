// Floating frame chrome: title header with drag handling, plus the content
// container the guest view is re-parented into. The close/minimize/maximize
// buttons live in the webview and dispatch the matching commands directly.

use crate::gesture_engine::PointerPhase;
use crate::overlay::error::OverlayError;
use crate::session::{GuestParent, GuestView, HostSlot};
use crate::surface::Geometry;

/// Layout class the guest view gets inside the frame content container.
const FRAME_FILL_CLASS: &str = "frame-fill";

struct HeaderDrag {
    initial_x: i32,
    initial_y: i32,
    touch_x: f32,
    touch_y: f32,
}

pub struct FloatingFrame {
    title: String,
    drag: Option<HeaderDrag>,
}

impl FloatingFrame {
    pub fn new(title: String) -> Self {
        Self { title, drag: None }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// DOM id of the content container the guest view is moved into.
    pub fn content_container_id(window_id: &str) -> String {
        format!("frame-content-{}", window_id)
    }

    /// Borrow the guest view into this frame's content container. Returns
    /// the slot it came from so the caller can restore it later.
    pub fn attach_guest(
        &mut self,
        window_id: &str,
        guest: &mut GuestView,
    ) -> Result<HostSlot, OverlayError> {
        match &guest.parent {
            GuestParent::Host(slot) => {
                let saved = slot.clone();
                guest.parent = GuestParent::Frame {
                    window_id: window_id.to_string(),
                };
                Ok(saved)
            }
            GuestParent::Frame { window_id: holder } => Err(OverlayError::Reparent {
                element_id: guest.element_id.clone(),
                detail: format!("already held by frame '{}'", holder),
            }),
        }
    }

    /// Give the guest view back to the slot it was borrowed from.
    pub fn detach_guest(
        &mut self,
        window_id: &str,
        guest: &mut GuestView,
        saved: &HostSlot,
    ) -> Result<(), OverlayError> {
        match &guest.parent {
            GuestParent::Frame { window_id: holder } if holder == window_id => {
                guest.parent = GuestParent::Host(saved.clone());
                Ok(())
            }
            other => Err(OverlayError::Reparent {
                element_id: guest.element_id.clone(),
                detail: format!("expected frame '{}', found {:?}", window_id, other),
            }),
        }
    }

    pub fn fill_layout_class() -> &'static str {
        FRAME_FILL_CLASS
    }

    /// Header drag: Down anchors the frame position, Move returns the frame
    /// geometry to apply, Up/Cancel ends the drag.
    pub fn header_pointer(
        &mut self,
        phase: PointerPhase,
        raw_x: f32,
        raw_y: f32,
        current: Geometry,
    ) -> Option<Geometry> {
        match phase {
            PointerPhase::Down => {
                self.drag = Some(HeaderDrag {
                    initial_x: current.x,
                    initial_y: current.y,
                    touch_x: raw_x,
                    touch_y: raw_y,
                });
                None
            }
            PointerPhase::Move => self.drag.as_ref().map(|drag| Geometry {
                x: drag.initial_x + (raw_x - drag.touch_x) as i32,
                y: drag.initial_y + (raw_y - drag.touch_y) as i32,
                width: current.width,
                height: current.height,
            }),
            PointerPhase::Up | PointerPhase::Cancel => {
                self.drag = None;
                None
            }
        }
    }
}
