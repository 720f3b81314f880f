use std::fmt;

/// Overlay failure taxonomy. Only `SessionUnavailable` aborts an operation;
/// surface and reparent anomalies are downgraded to warnings by the manager
/// and the state machine keeps going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayError {
    /// START was requested for a window id with no registered session, even
    /// after the retry and the fallback lookup.
    SessionUnavailable { window_id: String },
    /// A required window id was empty.
    MissingWindowId,
    /// The guest view could not be moved between parents.
    Reparent {
        element_id: String,
        detail: String,
    },
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayError::SessionUnavailable { window_id } => {
                write!(f, "No session registered for window '{}'", window_id)
            }
            OverlayError::MissingWindowId => write!(f, "Window id is required"),
            OverlayError::Reparent { element_id, detail } => {
                write!(f, "Failed to re-parent guest view '{}': {}", element_id, detail)
            }
        }
    }
}
