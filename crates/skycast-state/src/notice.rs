//! Transient error notifications.
//!
//! A notice is raised once per error onset. Repeating the same failure
//! (same status and message) while it is still the active error raises
//! nothing; a successful refresh ends the active error.

use skycast_core::Status;

/// A one-off message for a toast/snackbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ErrorOnset {
    active: Option<(Status, String)>,
    next_id: u64,
}

impl ErrorOnset {
    /// Records a failure; returns a notice only when it differs from the
    /// currently active error.
    pub(crate) fn on_failure(&mut self, status: Status, message: &str) -> Option<Notice> {
        if let Some((active_status, active_message)) = &self.active {
            if *active_status == status && active_message == message {
                return None;
            }
        }

        self.active = Some((status, message.to_string()));
        self.next_id += 1;
        Some(Notice {
            id: self.next_id,
            message: message.to_string(),
        })
    }

    pub(crate) fn on_success(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_failure_raises_notice() {
        let mut onset = ErrorOnset::default();
        let notice = onset.on_failure(Status::NetworkError, "Connection error.");
        assert_eq!(notice.map(|n| n.message), Some("Connection error.".to_string()));
    }

    #[test]
    fn repeated_failure_is_silent() {
        let mut onset = ErrorOnset::default();
        assert!(onset.on_failure(Status::NetworkError, "Connection error.").is_some());
        assert!(onset.on_failure(Status::NetworkError, "Connection error.").is_none());
        assert!(onset.on_failure(Status::NetworkError, "Connection error.").is_none());
    }

    #[test]
    fn different_failure_raises_new_notice() {
        let mut onset = ErrorOnset::default();
        let first = onset.on_failure(Status::NetworkError, "Connection error.").unwrap();
        let second = onset
            .on_failure(Status::ProviderError, "No matching location found.")
            .unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn success_rearms_onset() {
        let mut onset = ErrorOnset::default();
        assert!(onset.on_failure(Status::ProviderError, "An error occurred.").is_some());
        onset.on_success();
        assert!(onset.on_failure(Status::ProviderError, "An error occurred.").is_some());
    }
}
