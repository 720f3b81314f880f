// Surface host boundary: the webview compositor renders whatever surfaces
// it is told about, the Rust side stays the single owner of geometry state.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Mutex;
use tauri::Emitter;

/// Position and size of a surface, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Which of the two presentations of a window a surface belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceKind {
    Frame,
    Bubble,
}

/// Identifies one attachable surface. Each window owns at most one surface
/// per kind, and never has both kinds attached at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId {
    pub window_id: String,
    pub kind: SurfaceKind,
}

impl SurfaceId {
    pub fn frame(window_id: &str) -> Self {
        Self {
            window_id: window_id.to_string(),
            kind: SurfaceKind::Frame,
        }
    }

    pub fn bubble(window_id: &str) -> Self {
        Self {
            window_id: window_id.to_string(),
            kind: SurfaceKind::Bubble,
        }
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SurfaceKind::Frame => write!(f, "frame:{}", self.window_id),
            SurfaceKind::Bubble => write!(f, "bubble:{}", self.window_id),
        }
    }
}

/// Attach/detach mismatches. The manager downgrades these to warnings and
/// still advances the logical mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceAnomaly {
    AlreadyAttached(SurfaceId),
    NotAttached(SurfaceId),
}

impl fmt::Display for SurfaceAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceAnomaly::AlreadyAttached(id) => write!(f, "surface {} already attached", id),
            SurfaceAnomaly::NotAttached(id) => write!(f, "surface {} not attached", id),
        }
    }
}

/// Minimal capability interface the overlay manager needs from the host
/// compositor.
pub trait SurfaceHost {
    fn attach(&self, surface: &SurfaceId, geometry: Geometry) -> Result<(), SurfaceAnomaly>;
    fn detach(&self, surface: &SurfaceId) -> Result<(), SurfaceAnomaly>;
    /// Only valid while the surface is attached.
    fn update_geometry(&self, surface: &SurfaceId, geometry: Geometry)
        -> Result<(), SurfaceAnomaly>;
    /// (width, height) of the host screen in pixels.
    fn screen(&self) -> (u32, u32);
}

#[derive(Clone, Serialize)]
struct SurfacePayload {
    window_id: String,
    kind: SurfaceKind,
    geometry: Option<Geometry>,
}

/// SurfaceHost backed by Tauri events. The frontend compositor listens for
/// `surface-attached` / `surface-geometry-changed` / `surface-detached` and
/// mirrors the described surfaces into the DOM.
pub struct EventSurfaceHost {
    app: tauri::AppHandle,
    screen: (u32, u32),
    attached: Mutex<HashSet<SurfaceId>>,
}

impl EventSurfaceHost {
    pub fn new(app: tauri::AppHandle, screen: (u32, u32)) -> Self {
        Self {
            app,
            screen,
            attached: Mutex::new(HashSet::new()),
        }
    }

    fn attached(&self) -> std::sync::MutexGuard<'_, HashSet<SurfaceId>> {
        // A poisoned lock still holds a usable set
        self.attached.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: &str, surface: &SurfaceId, geometry: Option<Geometry>) {
        let payload = SurfacePayload {
            window_id: surface.window_id.clone(),
            kind: surface.kind,
            geometry,
        };
        if let Err(e) = self.app.emit(event, payload) {
            println!("[SURFACE] Failed to emit {}: {}", event, e);
        }
    }
}

impl SurfaceHost for EventSurfaceHost {
    fn attach(&self, surface: &SurfaceId, geometry: Geometry) -> Result<(), SurfaceAnomaly> {
        let mut attached = self.attached();
        if !attached.insert(surface.clone()) {
            return Err(SurfaceAnomaly::AlreadyAttached(surface.clone()));
        }
        drop(attached);
        self.emit("surface-attached", surface, Some(geometry));
        Ok(())
    }

    fn detach(&self, surface: &SurfaceId) -> Result<(), SurfaceAnomaly> {
        let mut attached = self.attached();
        if !attached.remove(surface) {
            return Err(SurfaceAnomaly::NotAttached(surface.clone()));
        }
        drop(attached);
        self.emit("surface-detached", surface, None);
        Ok(())
    }

    fn update_geometry(
        &self,
        surface: &SurfaceId,
        geometry: Geometry,
    ) -> Result<(), SurfaceAnomaly> {
        let attached = self.attached();
        if !attached.contains(surface) {
            return Err(SurfaceAnomaly::NotAttached(surface.clone()));
        }
        drop(attached);
        self.emit("surface-geometry-changed", surface, Some(geometry));
        Ok(())
    }

    fn screen(&self) -> (u32, u32) {
        self.screen
    }
}
