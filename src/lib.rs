// Bubble overlay module for minimized-game presentation and drag gestures
#[path = "gestureEngine/mod.rs"]
mod gesture_engine;

// Icon loader module for resolving midlet icons
#[path = "iconLoader/mod.rs"]
mod icon_loader;

// Bubble rendering state
mod bubble;

// Overlay window lifecycle
mod overlay;

// Guest session registry
mod session;

// Persistent status notification
mod status;

// Surface host boundary
mod surface;

use gesture_engine::{PointerPhase, PointerSample};
use icon_loader::FsIconProvider;
use overlay::manager::{OverlayNote, OverlaySink, PointerFollowUp, StartOutcome};
use overlay::{OverlayManager, WindowSummary};
use serde::Serialize;
use session::HostSlot;
use status::EventStatusPresenter;
use std::sync::Mutex;
use std::time::Duration;
use surface::EventSurfaceHost;
use tauri::{AppHandle, Emitter, Manager, State};
use tauri_plugin_global_shortcut::{Code, GlobalShortcutExt, Modifiers, Shortcut, ShortcutState};

/// Delay before the single START retry when the session has not registered
/// yet.
const SESSION_RETRY_MS: u64 = 500;

/// Screen size assumed when no monitor can be queried.
const FALLBACK_SCREEN: (u32, u32) = (1920, 1080);

// Event payload types for frontend communication
#[derive(Clone, Serialize)]
struct BubbleRedrawPayload {
    window_id: String,
    visual: bubble::BubbleVisual,
}

#[derive(Clone, Serialize)]
struct GuestReparentedPayload {
    element_id: String,
    container_id: String,
    layout_class: String,
}

#[derive(Clone, Serialize)]
struct GuestMovedToBackPayload {
    window_id: String,
}

#[derive(Clone, Serialize)]
struct WindowModeChangedPayload {
    window_id: String,
    mode: overlay::WindowMode,
}

/// OverlaySink backed by Tauri events; the webview compositor listens and
/// mirrors the notes into the DOM.
struct TauriOverlaySink {
    app: AppHandle,
}

impl OverlaySink for TauriOverlaySink {
    fn notify(&self, note: OverlayNote) {
        let result = match note {
            OverlayNote::BubbleRedraw { window_id, visual } => self
                .app
                .emit("bubble-redraw", BubbleRedrawPayload { window_id, visual }),
            OverlayNote::GuestReparented {
                element_id,
                container_id,
                layout_class,
            } => self.app.emit(
                "guest-reparented",
                GuestReparentedPayload {
                    element_id,
                    container_id,
                    layout_class,
                },
            ),
            OverlayNote::GuestMovedToBack { window_id } => self
                .app
                .emit("guest-moved-to-back", GuestMovedToBackPayload { window_id }),
            OverlayNote::WindowModeChanged { window_id, mode } => self.app.emit(
                "window-mode-changed",
                WindowModeChangedPayload { window_id, mode },
            ),
            OverlayNote::ServiceStopped => self.app.emit("overlay-service-stopped", ()),
        };
        if let Err(e) = result {
            println!("[OVERLAY] Failed to emit overlay note: {}", e);
        }
    }
}

/// Fire idle_fade_elapsed after the requested delay. Stale generations
/// fizzle inside the manager.
fn schedule_idle_fade(app: AppHandle, window_id: String, generation: u32, delay_ms: u64) {
    tauri::async_runtime::spawn(async move {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        let state = app.state::<Mutex<OverlayManager>>();
        match state.lock() {
            Ok(mut manager) => manager.idle_fade_elapsed(&window_id, generation),
            Err(e) => eprintln!("Failed to lock overlay manager: {}", e),
        };
    });
}

/// Second and last START attempt, 500 ms after the first found no session.
fn schedule_start_retry(app: AppHandle, window_id: String, app_name: String) {
    tauri::async_runtime::spawn(async move {
        tokio::time::sleep(Duration::from_millis(SESSION_RETRY_MS)).await;
        let state = app.state::<Mutex<OverlayManager>>();
        let result = match state.lock() {
            Ok(mut manager) => manager.retry_start(&window_id, &app_name),
            Err(e) => {
                eprintln!("Failed to lock overlay manager: {}", e);
                return;
            }
        };
        if let Err(e) = result {
            println!("[OVERLAY] Start failed for window '{}': {}", window_id, e);
        }
    });
}

// ===== Session Registry Commands =====

/// Register a running guest session so a window can present it
#[tauri::command]
fn register_session(
    window_id: String,
    app_path: String,
    guest_element_id: String,
    container_id: String,
    layout_class: String,
    state: State<Mutex<OverlayManager>>,
) -> Result<(), String> {
    println!(
        "[TAURI CMD] register_session called for window: {}",
        window_id
    );
    let mut manager = state.lock().map_err(|e| e.to_string())?;
    manager.register_session(
        window_id,
        app_path,
        guest_element_id,
        HostSlot {
            container_id,
            layout_class,
        },
    );
    Ok(())
}

/// Unregister a guest session that shut down on its own
#[tauri::command]
fn unregister_session(
    window_id: String,
    state: State<Mutex<OverlayManager>>,
) -> Result<(), String> {
    let mut manager = state.lock().map_err(|e| e.to_string())?;
    manager.unregister_session(&window_id);
    Ok(())
}

// ===== Window Lifecycle Commands =====

/// START intent: present the session in a floating frame
#[tauri::command]
fn start_floating(
    window_id: String,
    app_name: String,
    app: AppHandle,
    state: State<Mutex<OverlayManager>>,
) -> Result<(), String> {
    println!(
        "[TAURI CMD] start_floating called for window: {}",
        window_id
    );
    let outcome = {
        let mut manager = state.lock().map_err(|e| e.to_string())?;
        manager
            .start_floating(&window_id, &app_name)
            .map_err(|e| e.to_string())?
    };

    if outcome == StartOutcome::SessionMissing {
        schedule_start_retry(app, window_id, app_name);
    }
    Ok(())
}

/// MINIMIZE intent: collapse the frame into a draggable bubble
#[tauri::command]
fn minimize_window(window_id: String, state: State<Mutex<OverlayManager>>) -> Result<(), String> {
    println!(
        "[TAURI CMD] minimize_window called for window: {}",
        window_id
    );
    let mut manager = state.lock().map_err(|e| e.to_string())?;
    manager.minimize(&window_id);
    Ok(())
}

/// RESTORE intent: expand a bubble back into its floating frame
#[tauri::command]
fn restore_window(window_id: String, state: State<Mutex<OverlayManager>>) -> Result<(), String> {
    println!(
        "[TAURI CMD] restore_window called for window: {}",
        window_id
    );
    let mut manager = state.lock().map_err(|e| e.to_string())?;
    manager.restore(&window_id);
    Ok(())
}

/// MAXIMIZE intent: grow the frame to near-fullscreen
#[tauri::command]
fn maximize_window(window_id: String, state: State<Mutex<OverlayManager>>) -> Result<(), String> {
    let mut manager = state.lock().map_err(|e| e.to_string())?;
    manager.maximize_window(&window_id);
    Ok(())
}

/// STOP intent. With no window id this stops every window.
#[tauri::command]
fn stop_window(
    window_id: Option<String>,
    state: State<Mutex<OverlayManager>>,
) -> Result<(), String> {
    let mut manager = state.lock().map_err(|e| e.to_string())?;
    match window_id {
        Some(id) => {
            println!("[TAURI CMD] stop_window called for window: {}", id);
            manager.stop(&id);
        }
        None => {
            println!("[TAURI CMD] stop_window called for all windows");
            manager.stop_all();
        }
    }
    Ok(())
}

// ===== Pointer Commands =====

/// Feed one pointer sample from the bubble surface
#[tauri::command]
fn bubble_pointer(
    window_id: String,
    phase: String,
    raw_x: f32,
    raw_y: f32,
    time_ms: u64,
    app: AppHandle,
    state: State<Mutex<OverlayManager>>,
) -> Result<(), String> {
    let phase =
        PointerPhase::from_str(&phase).ok_or_else(|| format!("Invalid pointer phase: {}", phase))?;
    let sample = PointerSample {
        raw_x,
        raw_y,
        time_ms,
        phase,
    };

    let follow_ups = {
        let mut manager = state.lock().map_err(|e| e.to_string())?;
        manager.bubble_pointer(&window_id, sample)
    };

    for PointerFollowUp::ScheduleIdleFade {
        generation,
        delay_ms,
    } in follow_ups
    {
        schedule_idle_fade(app.clone(), window_id.clone(), generation, delay_ms);
    }
    Ok(())
}

/// Feed one pointer sample from a frame header drag
#[tauri::command]
fn frame_header_pointer(
    window_id: String,
    phase: String,
    raw_x: f32,
    raw_y: f32,
    state: State<Mutex<OverlayManager>>,
) -> Result<(), String> {
    let phase =
        PointerPhase::from_str(&phase).ok_or_else(|| format!("Invalid pointer phase: {}", phase))?;
    let mut manager = state.lock().map_err(|e| e.to_string())?;
    manager.frame_header_pointer(&window_id, phase, raw_x, raw_y);
    Ok(())
}

// ===== Query Commands =====

/// Snapshot of every live overlay window
#[tauri::command]
fn get_overlay_windows(state: State<Mutex<OverlayManager>>) -> Result<Vec<WindowSummary>, String> {
    let manager = state.lock().map_err(|e| e.to_string())?;
    Ok(manager.summaries())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Stop-all shortcut, mirrored by the Stop All action on the status
    let stop_all_shortcut = Shortcut::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::KeyQ);
    let shortcut_for_handler = stop_all_shortcut.clone();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(move |app, shortcut, event| {
                    // Only process on key press, not release
                    if event.state != ShortcutState::Pressed {
                        return;
                    }
                    if shortcut == &shortcut_for_handler {
                        match app.state::<Mutex<OverlayManager>>().lock() {
                            Ok(mut manager) => manager.stop_all(),
                            Err(e) => eprintln!("Failed to lock overlay manager: {}", e),
                        }
                    }
                })
                .build(),
        )
        .setup(move |app| {
            let screen = app
                .primary_monitor()
                .ok()
                .flatten()
                .map(|monitor| {
                    let size = monitor.size();
                    (size.width, size.height)
                })
                .unwrap_or(FALLBACK_SCREEN);

            let handle = app.handle().clone();
            let manager = OverlayManager::new(
                Box::new(EventSurfaceHost::new(handle.clone(), screen)),
                Box::new(EventStatusPresenter::new(handle.clone())),
                Box::new(FsIconProvider),
                Box::new(TauriOverlaySink { app: handle }),
            );
            app.manage(Mutex::new(manager));

            if let Err(e) = app.global_shortcut().register(stop_all_shortcut.clone()) {
                eprintln!("Failed to register stop-all shortcut: {}", e);
            }

            println!(
                "[OVERLAY] Overlay backend initialized ({}x{} screen)",
                screen.0, screen.1
            );
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Session registry commands
            register_session,
            unregister_session,
            // Window lifecycle commands
            start_floating,
            minimize_window,
            restore_window,
            maximize_window,
            stop_window,
            // Pointer commands
            bubble_pointer,
            frame_header_pointer,
            // Query commands
            get_overlay_windows,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
