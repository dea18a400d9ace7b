use serde::{Deserialize, Serialize};
use std::fmt;

/// Filter applied to located elements before a wait counts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementState {
    /// Present in the DOM and visually rendered.
    Displayed,
    /// Present in the DOM, visible or not.
    ExistsInAnyState,
}

impl fmt::Display for ElementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementState::Displayed => write!(f, "displayed"),
            ElementState::ExistsInAnyState => write!(f, "exists in any state"),
        }
    }
}
