//! Observable application state.
//!
//! [`AppState`] is a plain value; [`StateStore`] wraps it in a
//! `tokio::sync::watch` channel so every change wakes subscribers. Fields the
//! resolver owns are only mutated through crate-private methods.

use std::sync::Arc;

use skycast_core::{AppError, Status};
use skycast_weather::ForecastSnapshot;
use tokio::sync::watch;

use crate::notice::{ErrorOnset, Notice};

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    /// Last-known-good forecast; retained across failed refreshes.
    pub snapshot: Option<Arc<ForecastSnapshot>>,
    pub status: Status,
    pub has_location_permission: bool,
    pub is_online: bool,
    pub search_mode_active: bool,
    pub pending_query: String,
    pub last_error_message: Option<String>,
    pub is_first_load: bool,
    /// Pending toast, raised once per error onset.
    pub notice: Option<Notice>,
    onset: ErrorOnset,
}

/// Full-screen fallback shown when there is nothing to display yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    pub status: Status,
    pub message: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            snapshot: None,
            status: Status::Idle,
            has_location_permission: false,
            is_online: true,
            search_mode_active: false,
            pending_query: String::new(),
            last_error_message: None,
            is_first_load: true,
            notice: None,
            onset: ErrorOnset::default(),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location_permission(mut self, granted: bool) -> Self {
        self.has_location_permission = granted;
        self
    }

    /// Fallback screen contents when no snapshot exists and the last refresh failed.
    pub fn fallback(&self) -> Option<Fallback> {
        if self.snapshot.is_some() || !self.status.is_error() {
            return None;
        }
        Some(Fallback {
            status: self.status,
            message: self.last_error_message.clone().unwrap_or_default(),
        })
    }

    /// A retained snapshot is on screen while the latest refresh failed.
    pub fn is_stale(&self) -> bool {
        self.snapshot.is_some() && self.status.is_error()
    }

    pub(crate) fn begin_attempt(&mut self) {
        self.status = Status::Loading;
    }

    pub(crate) fn commit_success(&mut self, snapshot: ForecastSnapshot) {
        self.snapshot = Some(Arc::new(snapshot));
        self.status = Status::Ready;
        self.is_first_load = false;
        self.last_error_message = None;
        self.notice = None;
        self.onset.on_success();
    }

    pub(crate) fn commit_failure(&mut self, error: &AppError) {
        let status = error.status();
        let message = error.user_message();

        self.status = status;
        self.last_error_message = Some(message.to_string());
        if let Some(notice) = self.onset.on_failure(status, message) {
            self.notice = Some(notice);
        }
    }
}

/// Single source of truth the presentation layer observes.
#[derive(Debug)]
pub struct StateStore {
    tx: watch::Sender<AppState>,
}

impl StateStore {
    pub fn new(initial: AppState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Clone of the current state.
    pub fn current(&self) -> AppState {
        self.tx.borrow().clone()
    }

    /// Read a value without cloning the whole state.
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.tx.subscribe()
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut AppState)) {
        self.tx.send_modify(f);
    }

    /// Applies `f` under the write lock; subscribers are only woken when it returns true.
    pub(crate) fn update_if(&self, f: impl FnOnce(&mut AppState) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}
