// Process-wide overlay manager. Owns every live window, dispatches the
// lifecycle intents, assigns bubble ordinals, routes pointer samples into
// the per-bubble gesture controllers, and keeps the persistent status
// current. Everything runs behind one mutex, so there is a single writer.

use std::collections::HashMap;

use crate::bubble::{BubbleRenderer, BubbleVisual, BUBBLE_SIZE};
use crate::gesture_engine::{
    BubbleDragController, GestureConfig, GestureEvent, PointerPhase, PointerSample,
};
use crate::icon_loader::IconProvider;
use crate::overlay::error::OverlayError;
use crate::overlay::frame::FloatingFrame;
use crate::overlay::window::{maximized_frame_geom, OverlayWindow, WindowMode, WindowSummary};
use crate::session::{GuestParent, HostSlot, SessionRegistry};
use crate::status::{StatusPresenter, StatusSummary};
use crate::surface::{SurfaceAnomaly, SurfaceHost, SurfaceId, SurfaceKind};

/// Everything the manager tells the webview beyond surface lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayNote {
    BubbleRedraw {
        window_id: String,
        visual: BubbleVisual,
    },
    GuestReparented {
        element_id: String,
        container_id: String,
        layout_class: String,
    },
    GuestMovedToBack {
        window_id: String,
    },
    WindowModeChanged {
        window_id: String,
        mode: WindowMode,
    },
    /// Last window gone; the overlay service winds down.
    ServiceStopped,
}

pub trait OverlaySink {
    fn notify(&self, note: OverlayNote);
}

/// What `start_floating` decided on the first attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// Window was already live; it was ensured Floating.
    EnsuredFloating,
    /// No session registered yet; the caller schedules the single retry.
    SessionMissing,
}

/// Deferred work a pointer sample produced; the command layer schedules it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerFollowUp {
    ScheduleIdleFade { generation: u32, delay_ms: u64 },
}

enum TerminalAction {
    Restore,
    Dismiss,
}

fn warn_anomaly(op: &str, anomaly: SurfaceAnomaly) {
    println!("[OVERLAY] {} skipped: {}", op, anomaly);
}

pub struct OverlayManager {
    windows: HashMap<String, OverlayWindow>,
    sessions: SessionRegistry,
    host: Box<dyn SurfaceHost + Send>,
    status: Box<dyn StatusPresenter + Send>,
    icons: Box<dyn IconProvider + Send>,
    sink: Box<dyn OverlaySink + Send>,
}

impl OverlayManager {
    pub fn new(
        host: Box<dyn SurfaceHost + Send>,
        status: Box<dyn StatusPresenter + Send>,
        icons: Box<dyn IconProvider + Send>,
        sink: Box<dyn OverlaySink + Send>,
    ) -> Self {
        Self {
            windows: HashMap::new(),
            sessions: SessionRegistry::new(),
            host,
            status,
            icons,
            sink,
        }
    }

    // ===== Session registry =====

    pub fn register_session(
        &mut self,
        window_id: String,
        app_path: String,
        guest_element_id: String,
        host_slot: HostSlot,
    ) {
        println!("[OVERLAY] Session registered for window '{}'", window_id);
        self.sessions
            .register(window_id, app_path, guest_element_id, host_slot);
    }

    pub fn unregister_session(&mut self, window_id: &str) {
        self.sessions.unregister(window_id);
    }

    // ===== Lifecycle intents =====

    /// START, first attempt. A missing session is not an error yet; the
    /// command layer re-dispatches once after 500 ms.
    pub fn start_floating(
        &mut self,
        window_id: &str,
        app_name: &str,
    ) -> Result<StartOutcome, OverlayError> {
        if window_id.is_empty() {
            return Err(OverlayError::MissingWindowId);
        }

        if self.windows.contains_key(window_id) {
            self.ensure_floating(window_id);
            return Ok(StartOutcome::EnsuredFloating);
        }

        if self.sessions.contains(window_id) {
            self.start_with_session(window_id, app_name, window_id)?;
            return Ok(StartOutcome::Started);
        }

        println!(
            "[OVERLAY] No session yet for window '{}', waiting for retry",
            window_id
        );
        Ok(StartOutcome::SessionMissing)
    }

    /// START, second and last attempt. Falls back to the most recently
    /// registered session before giving up.
    pub fn retry_start(&mut self, window_id: &str, app_name: &str) -> Result<(), OverlayError> {
        if self.windows.contains_key(window_id) {
            return Ok(());
        }
        if self.sessions.contains(window_id) {
            return self.start_with_session(window_id, app_name, window_id);
        }
        if let Some(fallback) = self.sessions.fallback_key() {
            println!(
                "[OVERLAY] Session for '{}' still missing, borrowing most recent session '{}'",
                window_id, fallback
            );
            return self.start_with_session(window_id, app_name, &fallback);
        }
        Err(OverlayError::SessionUnavailable {
            window_id: window_id.to_string(),
        })
    }

    fn start_with_session(
        &mut self,
        window_id: &str,
        app_name: &str,
        session_key: &str,
    ) -> Result<(), OverlayError> {
        let screen = self.host.screen();
        let session = self
            .sessions
            .get_mut(session_key)
            .ok_or_else(|| OverlayError::SessionUnavailable {
                window_id: window_id.to_string(),
            })?;

        let mut window = OverlayWindow::new(
            window_id.to_string(),
            app_name.to_string(),
            session.app_path.clone(),
            session_key.to_string(),
            screen,
        );

        // Borrow the guest view; nothing to roll back if this fails.
        let saved = window.frame.attach_guest(window_id, &mut session.guest)?;
        let element_id = session.guest.element_id.clone();
        window.saved_parent = Some(saved);

        if let Err(a) = self.host.attach(&SurfaceId::frame(window_id), window.frame_geom) {
            warn_anomaly("frame attach", a);
        }
        window.attached = Some(SurfaceKind::Frame);
        window.mode = WindowMode::Floating;

        self.sink.notify(OverlayNote::GuestReparented {
            element_id,
            container_id: FloatingFrame::content_container_id(window_id),
            layout_class: FloatingFrame::fill_layout_class().to_string(),
        });
        self.sink.notify(OverlayNote::GuestMovedToBack {
            window_id: window_id.to_string(),
        });
        self.sink.notify(OverlayNote::WindowModeChanged {
            window_id: window_id.to_string(),
            mode: WindowMode::Floating,
        });

        self.windows.insert(window_id.to_string(), window);
        self.refresh_status();
        Ok(())
    }

    /// Re-issued START for a live window id.
    fn ensure_floating(&mut self, window_id: &str) {
        let mode = match self.windows.get(window_id) {
            Some(window) => window.mode,
            None => return,
        };
        match mode {
            WindowMode::Bubble => self.restore(window_id),
            WindowMode::Maximized => {
                // Relabel only; the frame keeps its current geometry.
                if let Some(window) = self.windows.get_mut(window_id) {
                    window.mode = WindowMode::Floating;
                }
                self.sink.notify(OverlayNote::WindowModeChanged {
                    window_id: window_id.to_string(),
                    mode: WindowMode::Floating,
                });
                self.refresh_status();
            }
            _ => {}
        }
    }

    /// MINIMIZE: swap the frame surface for a bubble, assign the ordinal,
    /// resolve the icon.
    pub fn minimize(&mut self, window_id: &str) {
        let bubbles_before = self
            .windows
            .values()
            .filter(|w| w.mode == WindowMode::Bubble)
            .count();
        let screen = self.host.screen();

        let Some(window) = self.windows.get_mut(window_id) else {
            return;
        };
        match window.mode {
            WindowMode::Floating | WindowMode::Maximized => {}
            // Already a bubble (or not presentable): nothing to do
            _ => return,
        }

        if let Err(a) = self.host.detach(&SurfaceId::frame(window_id)) {
            warn_anomaly("frame detach", a);
        }
        window.attached = None;

        window.ordinal = (bubbles_before + 1) as u32;
        let icon = self.icons.load_icon(&window.app_path);
        let renderer = window.bubble.get_or_insert_with(BubbleRenderer::new);
        renderer.set_badge(window.ordinal);
        renderer.set_icon(icon);
        renderer.set_scale(1.0);
        renderer.set_dismissing(false, 1.0);
        renderer.cancel_idle_fade();

        if let Err(a) = self
            .host
            .attach(&SurfaceId::bubble(window_id), window.bubble_geometry())
        {
            warn_anomaly("bubble attach", a);
        }
        window.attached = Some(SurfaceKind::Bubble);
        window.mode = WindowMode::Bubble;

        let (screen_width, screen_height) = screen;
        window.gesture = Some(BubbleDragController::new(GestureConfig::for_screen(
            BUBBLE_SIZE,
            screen_width,
            screen_height,
        )));

        if let Some(renderer) = window.bubble.as_mut() {
            if renderer.take_dirty() {
                let visual = renderer.visual();
                self.sink.notify(OverlayNote::BubbleRedraw {
                    window_id: window_id.to_string(),
                    visual,
                });
            }
        }
        self.sink.notify(OverlayNote::WindowModeChanged {
            window_id: window_id.to_string(),
            mode: WindowMode::Bubble,
        });
        self.refresh_status();
    }

    /// RESTORE: bubble back to a floating frame at its last geometry.
    pub fn restore(&mut self, window_id: &str) {
        let Some(window) = self.windows.get_mut(window_id) else {
            return;
        };

        if window.mode != WindowMode::Bubble {
            // Not minimized: just make sure the frame is up
            if window.attached.is_none() {
                if let Err(a) = self.host.attach(&SurfaceId::frame(window_id), window.frame_geom) {
                    warn_anomaly("frame attach", a);
                }
                window.attached = Some(SurfaceKind::Frame);
            }
            return;
        }

        if let Err(a) = self.host.detach(&SurfaceId::bubble(window_id)) {
            warn_anomaly("bubble detach", a);
        }
        // Any in-flight gesture is discarded with its controller
        window.gesture = None;
        window.attached = None;

        if let Err(a) = self.host.attach(&SurfaceId::frame(window_id), window.frame_geom) {
            warn_anomaly("frame attach", a);
        }
        window.attached = Some(SurfaceKind::Frame);
        window.mode = WindowMode::Floating;

        self.sink.notify(OverlayNote::WindowModeChanged {
            window_id: window_id.to_string(),
            mode: WindowMode::Floating,
        });
        self.refresh_status();
    }

    /// MAXIMIZE_WINDOW: near-fullscreen frame, centered. No-op when already
    /// maximized.
    pub fn maximize_window(&mut self, window_id: &str) {
        if self
            .windows
            .get(window_id)
            .map(|w| w.mode == WindowMode::Bubble)
            .unwrap_or(false)
        {
            self.restore(window_id);
        }

        let screen = self.host.screen();
        let Some(window) = self.windows.get_mut(window_id) else {
            return;
        };
        if window.mode != WindowMode::Floating {
            return;
        }

        window.frame_geom = maximized_frame_geom(screen);
        if let Err(a) = self
            .host
            .update_geometry(&SurfaceId::frame(window_id), window.frame_geom)
        {
            warn_anomaly("frame resize", a);
        }
        window.mode = WindowMode::Maximized;

        self.sink.notify(OverlayNote::WindowModeChanged {
            window_id: window_id.to_string(),
            mode: WindowMode::Maximized,
        });
        self.refresh_status();
    }

    /// STOP: detach whatever is attached, give the guest view back to its
    /// saved parent, drop the window. The session itself keeps running.
    pub fn stop(&mut self, window_id: &str) {
        let Some(mut window) = self.windows.remove(window_id) else {
            return;
        };

        match window.attached.take() {
            Some(SurfaceKind::Frame) => {
                if let Err(a) = self.host.detach(&SurfaceId::frame(window_id)) {
                    warn_anomaly("frame detach", a);
                }
            }
            Some(SurfaceKind::Bubble) => {
                if let Err(a) = self.host.detach(&SurfaceId::bubble(window_id)) {
                    warn_anomaly("bubble detach", a);
                }
            }
            None => {}
        }
        window.gesture = None;

        if let Some(saved) = window.saved_parent.take() {
            if let Some(session) = self.sessions.get_mut(&window.session_key) {
                let restored = window
                    .frame
                    .detach_guest(&window.window_id, &mut session.guest, &saved);
                match restored {
                    Ok(()) => self.sink.notify(OverlayNote::GuestReparented {
                        element_id: session.guest.element_id.clone(),
                        container_id: saved.container_id.clone(),
                        layout_class: saved.layout_class.clone(),
                    }),
                    Err(e) => {
                        println!("[OVERLAY] {}; forcing guest view back", e);
                        session.guest.parent = GuestParent::Host(saved.clone());
                        self.sink.notify(OverlayNote::GuestReparented {
                            element_id: session.guest.element_id.clone(),
                            container_id: saved.container_id.clone(),
                            layout_class: saved.layout_class.clone(),
                        });
                    }
                }
            }
        }

        window.mode = WindowMode::Destroyed;
        self.sessions.unregister(&window.session_key);

        self.sink.notify(OverlayNote::WindowModeChanged {
            window_id: window_id.to_string(),
            mode: WindowMode::Destroyed,
        });

        if self.windows.is_empty() {
            self.status.clear();
            self.sink.notify(OverlayNote::ServiceStopped);
        } else {
            self.refresh_status();
        }
    }

    /// STOP with no window id.
    pub fn stop_all(&mut self) {
        let ids: Vec<String> = self.windows.keys().cloned().collect();
        for id in ids {
            self.stop(&id);
        }
    }

    // ===== Pointer routing =====

    /// Feed one bubble pointer sample. Returns deferred work (idle-fade
    /// scheduling) for the command layer.
    pub fn bubble_pointer(
        &mut self,
        window_id: &str,
        sample: PointerSample,
    ) -> Vec<PointerFollowUp> {
        let Some(window) = self.windows.get_mut(window_id) else {
            return Vec::new();
        };
        if window.mode != WindowMode::Bubble {
            return Vec::new();
        }
        let Some(gesture) = window.gesture.as_mut() else {
            return Vec::new();
        };

        let events = gesture.handle(sample);
        let mut follow_ups = Vec::new();
        let mut terminal = None;

        for event in events {
            match event {
                GestureEvent::TouchDown => {
                    if let Some(renderer) = window.bubble.as_mut() {
                        renderer.on_touch_down();
                    }
                }
                GestureEvent::ScaleTo(scale) => {
                    if let Some(renderer) = window.bubble.as_mut() {
                        renderer.set_scale(scale);
                    }
                }
                GestureEvent::MoveTo { x, y } => {
                    window.bubble_pos = (x, y);
                    if let Err(a) = self
                        .host
                        .update_geometry(&SurfaceId::bubble(window_id), window.bubble_geometry())
                    {
                        warn_anomaly("bubble move", a);
                    }
                }
                GestureEvent::DismissHint { active, progress } => {
                    if let Some(renderer) = window.bubble.as_mut() {
                        renderer.set_dismissing(active, 1.0 - progress * 0.5);
                    }
                }
                GestureEvent::TouchUp => {
                    if let Some(renderer) = window.bubble.as_mut() {
                        let request = renderer.on_touch_up();
                        follow_ups.push(PointerFollowUp::ScheduleIdleFade {
                            generation: request.generation,
                            delay_ms: request.delay_ms,
                        });
                    }
                }
                GestureEvent::Tap => terminal = Some(TerminalAction::Restore),
                GestureEvent::Dismiss => terminal = Some(TerminalAction::Dismiss),
                GestureEvent::Release { x, y, .. } => {
                    window.bubble_pos = (x, y);
                }
            }
        }

        if let Some(renderer) = window.bubble.as_mut() {
            if renderer.take_dirty() {
                let visual = renderer.visual();
                self.sink.notify(OverlayNote::BubbleRedraw {
                    window_id: window_id.to_string(),
                    visual,
                });
            }
        }

        match terminal {
            Some(TerminalAction::Restore) => self.restore(window_id),
            Some(TerminalAction::Dismiss) => self.stop(window_id),
            None => {}
        }
        follow_ups
    }

    /// An idle-fade timer fired. Stale generations fizzle inside the
    /// renderer; vanished windows fizzle here.
    pub fn idle_fade_elapsed(&mut self, window_id: &str, generation: u32) {
        let Some(window) = self.windows.get_mut(window_id) else {
            return;
        };
        if window.mode != WindowMode::Bubble {
            return;
        }
        if let Some(renderer) = window.bubble.as_mut() {
            if renderer.idle_fade_elapsed(generation) && renderer.take_dirty() {
                let visual = renderer.visual();
                self.sink.notify(OverlayNote::BubbleRedraw {
                    window_id: window_id.to_string(),
                    visual,
                });
            }
        }
    }

    /// Frame header drag.
    pub fn frame_header_pointer(
        &mut self,
        window_id: &str,
        phase: PointerPhase,
        raw_x: f32,
        raw_y: f32,
    ) {
        let Some(window) = self.windows.get_mut(window_id) else {
            return;
        };
        match window.mode {
            WindowMode::Floating | WindowMode::Maximized => {}
            _ => return,
        }
        let current = window.frame_geom;
        if let Some(new_geom) = window.frame.header_pointer(phase, raw_x, raw_y, current) {
            window.frame_geom = new_geom;
            if let Err(a) = self
                .host
                .update_geometry(&SurfaceId::frame(window_id), new_geom)
            {
                warn_anomaly("frame move", a);
            }
        }
    }

    // ===== Queries =====

    pub fn window_mode(&self, window_id: &str) -> Option<WindowMode> {
        self.windows.get(window_id).map(|w| w.mode)
    }

    pub fn summaries(&self) -> Vec<WindowSummary> {
        let mut list: Vec<WindowSummary> = self.windows.values().map(|w| w.summary()).collect();
        list.sort_by(|a, b| a.window_id.cmp(&b.window_id));
        list
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    fn refresh_status(&self) {
        let count = self.windows.len();
        if count == 0 {
            self.status.clear();
            return;
        }
        let title = if count == 1 {
            self.windows
                .values()
                .next()
                .map(|w| w.app_name.clone())
                .unwrap_or_default()
        } else {
            format!("{} games running", count)
        };
        self.status.refresh(&StatusSummary {
            title,
            body: format!("{} game(s) running in background", count),
            count,
            stop_all_available: true,
        });
    }
}
