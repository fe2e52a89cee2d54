//! Forecast refresh status machine.
//!
//! `Status` is the closed tag the presentation layer renders. The machine has
//! no terminal state: every state can re-enter `Loading` on the next refresh.

use serde::{Deserialize, Serialize};

/// UI-visible status of the forecast pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Ready,
    PermissionDenied,
    NetworkError,
    ProviderError,
}

impl Status {
    /// True for the three failure states.
    pub fn is_error(self) -> bool {
        matches!(
            self,
            Status::PermissionDenied | Status::NetworkError | Status::ProviderError
        )
    }

    /// True while a refresh is in flight.
    pub fn is_busy(self) -> bool {
        matches!(self, Status::Loading)
    }

    /// Whether `self -> next` is an edge of the transition table.
    ///
    /// Any state may move to `Loading` (a refresh was invoked). Only `Loading`
    /// may settle into `Ready` or one of the error states.
    pub fn can_transition_to(self, next: Status) -> bool {
        match next {
            Status::Loading => true,
            Status::Idle => false,
            Status::Ready
            | Status::PermissionDenied
            | Status::NetworkError
            | Status::ProviderError => self == Status::Loading,
        }
    }

    /// Short lowercase label, used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Loading => "loading",
            Status::Ready => "ready",
            Status::PermissionDenied => "permission_denied",
            Status::NetworkError => "network_error",
            Status::ProviderError => "provider_error",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
