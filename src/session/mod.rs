// Process-wide session registry. Guest activities register their session
// here when they boot; the overlay manager looks up handles by window id.
// Accessed only from behind the manager mutex, so there is a single writer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Where the guest view lived before a frame borrowed it: the host-side
/// container element plus the layout class the view carried there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSlot {
    pub container_id: String,
    pub layout_class: String,
}

/// Current parent of the guest view subtree. Exactly one parent at any
/// instant; every transition that moves the view goes through this enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuestParent {
    Host(HostSlot),
    Frame { window_id: String },
}

/// Handle to the view hierarchy rendered by a guest session. The session
/// owns it; a window only holds it on loan between attach and detach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestView {
    pub element_id: String,
    pub parent: GuestParent,
}

/// Handle to one running guest session. Destroying a window never destroys
/// the session; only the registry entry goes away.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionHandle {
    pub session_id: String,
    pub app_path: String,
    pub guest: GuestView,
}

/// Registry of live sessions keyed by window id. Insertion order is kept so
/// the most recent registration can serve as a fallback lookup.
pub struct SessionRegistry {
    sessions: HashMap<String, SessionHandle>,
    order: Vec<String>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a session for a window id. Re-registration replaces the old
    /// handle and refreshes its position in the fallback order.
    pub fn register(
        &mut self,
        window_id: String,
        app_path: String,
        guest_element_id: String,
        host_slot: HostSlot,
    ) -> SessionHandle {
        let handle = SessionHandle {
            session_id: Uuid::new_v4().to_string(),
            app_path,
            guest: GuestView {
                element_id: guest_element_id,
                parent: GuestParent::Host(host_slot),
            },
        };
        self.order.retain(|id| id != &window_id);
        self.order.push(window_id.clone());
        self.sessions.insert(window_id, handle.clone());
        handle
    }

    pub fn unregister(&mut self, window_id: &str) -> Option<SessionHandle> {
        self.order.retain(|id| id != window_id);
        self.sessions.remove(window_id)
    }

    pub fn get(&self, window_id: &str) -> Option<&SessionHandle> {
        self.sessions.get(window_id)
    }

    pub fn get_mut(&mut self, window_id: &str) -> Option<&mut SessionHandle> {
        self.sessions.get_mut(window_id)
    }

    /// Window id of the most recently registered session, used as a last
    /// resort when the expected id never shows up.
    pub fn fallback_key(&self) -> Option<String> {
        self.order.last().cloned()
    }

    pub fn contains(&self, window_id: &str) -> bool {
        self.sessions.contains_key(window_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}
