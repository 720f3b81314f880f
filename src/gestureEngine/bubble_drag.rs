// Drag/dismiss state machine for one bubble. Mirrors the feel of messenger
// style chat heads: scale up on drag start, shrink slightly with distance,
// red dismiss hint over the bottom zone, clamped to the screen with half a
// bubble of horizontal overhang.

use super::types::{GestureConfig, GestureEvent, PointerPhase, PointerSample};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragPhase {
    Idle,
    Pressed,
    Dragging,
}

/// Transforms a pointer-sample stream into renderer and geometry updates plus
/// one terminal decision per gesture. One controller instance per bubble;
/// discarded when the bubble goes away.
pub struct BubbleDragController {
    config: GestureConfig,
    phase: DragPhase,
    anchor_x: f32,
    anchor_y: f32,
    last_x: f32,
    last_y: f32,
    last_time_ms: u64,
    velocity_x: f32,
    velocity_y: f32,
    last_scale: f32,
    position: (i32, i32),
}

impl BubbleDragController {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            phase: DragPhase::Idle,
            anchor_x: 0.0,
            anchor_y: 0.0,
            last_x: 0.0,
            last_y: 0.0,
            last_time_ms: 0,
            velocity_x: 0.0,
            velocity_y: 0.0,
            last_scale: 1.0,
            position: (0, 0),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == DragPhase::Dragging
    }

    /// Feed one sample, get the events it produced in order.
    pub fn handle(&mut self, sample: PointerSample) -> Vec<GestureEvent> {
        match sample.phase {
            PointerPhase::Down => self.on_down(sample),
            PointerPhase::Move => self.on_move(sample),
            PointerPhase::Up | PointerPhase::Cancel => self.on_up(sample),
        }
    }

    fn on_down(&mut self, sample: PointerSample) -> Vec<GestureEvent> {
        self.phase = DragPhase::Pressed;
        self.anchor_x = sample.raw_x;
        self.anchor_y = sample.raw_y;
        self.last_x = sample.raw_x;
        self.last_y = sample.raw_y;
        self.last_time_ms = sample.time_ms;
        self.velocity_x = 0.0;
        self.velocity_y = 0.0;
        self.last_scale = 1.0;
        vec![GestureEvent::TouchDown]
    }

    fn on_move(&mut self, sample: PointerSample) -> Vec<GestureEvent> {
        if self.phase == DragPhase::Idle {
            return Vec::new();
        }

        self.track_velocity(&sample);

        let delta_x = sample.raw_x - self.anchor_x;
        let delta_y = sample.raw_y - self.anchor_y;
        let manhattan = delta_x.abs() + delta_y.abs();

        if self.phase != DragPhase::Dragging && manhattan < self.config.drag_activation_px {
            return Vec::new();
        }

        let mut events = Vec::new();
        if self.phase != DragPhase::Dragging {
            self.phase = DragPhase::Dragging;
            self.last_scale = self.config.scale_on_drag_start;
            events.push(GestureEvent::ScaleTo(self.config.scale_on_drag_start));
        }

        // Bubble center follows the finger.
        let (x, y) = self.clamp_top_left(sample.raw_x, sample.raw_y);
        self.position = (x, y);
        events.push(GestureEvent::MoveTo { x, y });

        let distance = (delta_x * delta_x + delta_y * delta_y).sqrt();
        let scale = (self.config.scale_on_drag_start - distance / self.config.scale_distance_divisor)
            .max(self.config.scale_min);
        if scale != self.last_scale {
            self.last_scale = scale;
            events.push(GestureEvent::ScaleTo(scale));
        }

        events.push(self.dismiss_hint(sample.raw_y));
        events
    }

    fn on_up(&mut self, sample: PointerSample) -> Vec<GestureEvent> {
        if self.phase == DragPhase::Idle {
            return Vec::new();
        }

        let was_dragging = self.phase == DragPhase::Dragging;
        self.phase = DragPhase::Idle;

        let mut events = vec![GestureEvent::TouchUp];
        if was_dragging {
            if sample.raw_y > self.config.dismiss_threshold_y {
                events.push(GestureEvent::Dismiss);
            } else {
                // Release stops right where it is; no edge snap.
                if self.last_scale != 1.0 {
                    self.last_scale = 1.0;
                    events.push(GestureEvent::ScaleTo(1.0));
                }
                events.push(GestureEvent::Release {
                    x: self.position.0,
                    y: self.position.1,
                    velocity_x: self.velocity_x,
                    velocity_y: self.velocity_y,
                });
            }
        } else {
            events.push(GestureEvent::Tap);
        }
        events
    }

    fn track_velocity(&mut self, sample: &PointerSample) {
        let delta_time = sample.time_ms.saturating_sub(self.last_time_ms);
        if delta_time > 0 {
            let dx = sample.raw_x - self.last_x;
            let dy = sample.raw_y - self.last_y;
            // pixels per second
            self.velocity_x = dx / delta_time as f32 * 1000.0;
            self.velocity_y = dy / delta_time as f32 * 1000.0;
        }
        self.last_x = sample.raw_x;
        self.last_y = sample.raw_y;
        self.last_time_ms = sample.time_ms;
    }

    fn clamp_top_left(&self, center_x: f32, center_y: f32) -> (i32, i32) {
        let size = self.config.bubble_size as f32;
        let half = size / 2.0;
        let x = (center_x - half)
            .max(-half)
            .min(self.config.screen_width as f32 - half);
        let y = (center_y - half)
            .max(0.0)
            .min(self.config.screen_height as f32 - size);
        (x as i32, y as i32)
    }

    fn dismiss_hint(&self, raw_y: f32) -> GestureEvent {
        let threshold = self.config.dismiss_threshold_y;
        if raw_y > threshold {
            let progress =
                ((raw_y - threshold) / (self.config.screen_height as f32 - threshold)).min(1.0);
            GestureEvent::DismissHint {
                active: true,
                progress,
            }
        } else {
            GestureEvent::DismissHint {
                active: false,
                progress: 0.0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GestureConfig {
        // 1080x2000 screen, dismiss threshold at 1400
        GestureConfig::for_screen(180, 1080, 2000)
    }

    fn sample(phase: PointerPhase, x: f32, y: f32, t: u64) -> PointerSample {
        PointerSample {
            raw_x: x,
            raw_y: y,
            time_ms: t,
            phase,
        }
    }

    fn moves_of(events: &[GestureEvent]) -> Vec<(i32, i32)> {
        events
            .iter()
            .filter_map(|e| match e {
                GestureEvent::MoveTo { x, y } => Some((*x, *y)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_tap_without_drag() {
        let mut ctl = BubbleDragController::new(config());

        let down = ctl.handle(sample(PointerPhase::Down, 100.0, 500.0, 0));
        assert_eq!(down, vec![GestureEvent::TouchDown]);

        // Below the activation distance: no geometry at all
        let wiggle = ctl.handle(sample(PointerPhase::Move, 104.0, 503.0, 16));
        assert!(wiggle.is_empty());

        let up = ctl.handle(sample(PointerPhase::Up, 101.0, 500.0, 32));
        assert_eq!(up, vec![GestureEvent::TouchUp, GestureEvent::Tap]);
    }

    #[test]
    fn test_drag_and_dismiss() {
        let mut ctl = BubbleDragController::new(config());
        ctl.handle(sample(PointerPhase::Down, 100.0, 500.0, 0));
        ctl.handle(sample(PointerPhase::Move, 100.0, 700.0, 16));

        let deep = ctl.handle(sample(PointerPhase::Move, 100.0, 1980.0, 32));
        assert!(deep.contains(&GestureEvent::DismissHint {
            active: true,
            progress: ((1980.0 - 1400.0) / 600.0f32).min(1.0),
        }));

        let up = ctl.handle(sample(PointerPhase::Up, 100.0, 1980.0, 48));
        assert_eq!(up, vec![GestureEvent::TouchUp, GestureEvent::Dismiss]);
    }

    #[test]
    fn test_release_above_threshold_never_dismisses() {
        let mut ctl = BubbleDragController::new(config());
        ctl.handle(sample(PointerPhase::Down, 100.0, 500.0, 0));
        ctl.handle(sample(PointerPhase::Move, 100.0, 1399.0, 16));

        let up = ctl.handle(sample(PointerPhase::Up, 100.0, 1399.0, 32));
        assert!(!up.contains(&GestureEvent::Dismiss));
        assert!(matches!(up.last(), Some(GestureEvent::Release { .. })));
    }

    #[test]
    fn test_drag_and_release_geometry() {
        let mut ctl = BubbleDragController::new(config());
        ctl.handle(sample(PointerPhase::Down, 100.0, 500.0, 0));

        let drag = ctl.handle(sample(PointerPhase::Move, 400.0, 500.0, 100));
        // First drag sample scales up before any geometry
        assert_eq!(drag[0], GestureEvent::ScaleTo(1.15));
        // Center follows the finger: top-left = 400 - 90, 500 - 90
        assert_eq!(moves_of(&drag), vec![(310, 410)]);

        let up = ctl.handle(sample(PointerPhase::Up, 400.0, 500.0, 116));
        assert_eq!(up[0], GestureEvent::TouchUp);
        assert!(up.contains(&GestureEvent::ScaleTo(1.0)));
        match up.last().unwrap() {
            GestureEvent::Release { x, y, .. } => {
                assert_eq!((*x, *y), (310, 410));
            }
            other => panic!("Expected Release, got {:?}", other),
        }
    }

    #[test]
    fn test_clamping_allows_half_bubble_overhang() {
        let mut ctl = BubbleDragController::new(config());
        ctl.handle(sample(PointerPhase::Down, 200.0, 500.0, 0));

        // Far off the left edge: x pins at -size/2
        let left = ctl.handle(sample(PointerPhase::Move, 0.0, 500.0, 16));
        assert_eq!(moves_of(&left), vec![(-90, 410)]);

        // Above the top edge: y pins at 0
        let top = ctl.handle(sample(PointerPhase::Move, 400.0, 5.0, 32));
        assert_eq!(moves_of(&top), vec![(310, 0)]);

        // Bottom-right corner
        let corner = ctl.handle(sample(PointerPhase::Move, 2000.0, 3000.0, 48));
        assert_eq!(moves_of(&corner), vec![(1080 - 90, 2000 - 180)]);
    }

    #[test]
    fn test_scale_decays_with_distance() {
        let mut ctl = BubbleDragController::new(config());
        ctl.handle(sample(PointerPhase::Down, 100.0, 500.0, 0));

        let near = ctl.handle(sample(PointerPhase::Move, 130.0, 500.0, 16));
        let scale = near
            .iter()
            .filter_map(|e| match e {
                GestureEvent::ScaleTo(s) => Some(*s),
                _ => None,
            })
            .last()
            .unwrap();
        assert!((scale - (1.15 - 30.0 / 600.0)).abs() < 1e-4);

        // Far enough that the floor kicks in
        let far = ctl.handle(sample(PointerPhase::Move, 900.0, 500.0, 32));
        let scale = far
            .iter()
            .filter_map(|e| match e {
                GestureEvent::ScaleTo(s) => Some(*s),
                _ => None,
            })
            .last()
            .unwrap();
        assert!((scale - 0.98).abs() < 1e-4);

        // Same distance again: scale unchanged, so no ScaleTo re-emitted
        let again = ctl.handle(sample(PointerPhase::Move, 900.0, 501.0, 48));
        assert!(!again
            .iter()
            .any(|e| matches!(e, GestureEvent::ScaleTo(s) if (*s - 0.98).abs() < 1e-4)));
    }

    #[test]
    fn test_release_velocity() {
        let mut ctl = BubbleDragController::new(config());
        ctl.handle(sample(PointerPhase::Down, 0.0, 500.0, 0));
        ctl.handle(sample(PointerPhase::Move, 100.0, 500.0, 100));

        let up = ctl.handle(sample(PointerPhase::Up, 100.0, 500.0, 100));
        match up.last().unwrap() {
            GestureEvent::Release {
                velocity_x,
                velocity_y,
                ..
            } => {
                assert!((velocity_x - 1000.0).abs() < 1.0);
                assert!(velocity_y.abs() < 1.0);
            }
            other => panic!("Expected Release, got {:?}", other),
        }
    }

    #[test]
    fn test_cancel_acts_like_up() {
        let mut ctl = BubbleDragController::new(config());
        ctl.handle(sample(PointerPhase::Down, 100.0, 500.0, 0));
        ctl.handle(sample(PointerPhase::Move, 300.0, 500.0, 16));

        let cancel = ctl.handle(sample(PointerPhase::Cancel, 300.0, 500.0, 32));
        assert_eq!(cancel[0], GestureEvent::TouchUp);
        assert!(matches!(cancel.last(), Some(GestureEvent::Release { .. })));
        assert!(!ctl.is_dragging());
    }

    #[test]
    fn test_stray_samples_while_idle_are_ignored() {
        let mut ctl = BubbleDragController::new(config());
        assert!(ctl
            .handle(sample(PointerPhase::Move, 100.0, 100.0, 0))
            .is_empty());
        assert!(ctl
            .handle(sample(PointerPhase::Up, 100.0, 100.0, 16))
            .is_empty());
    }

    #[test]
    fn test_dismiss_hint_deactivates_when_leaving_zone() {
        let mut ctl = BubbleDragController::new(config());
        ctl.handle(sample(PointerPhase::Down, 100.0, 500.0, 0));
        ctl.handle(sample(PointerPhase::Move, 100.0, 1700.0, 16));

        let back = ctl.handle(sample(PointerPhase::Move, 100.0, 600.0, 32));
        assert!(back.contains(&GestureEvent::DismissHint {
            active: false,
            progress: 0.0,
        }));
    }
}
