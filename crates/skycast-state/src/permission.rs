//! One-shot location permission signal.
//!
//! The gate can be armed once per resolver. Arming hands out the receiving
//! half of a oneshot channel; a later grant fires it. Once armed, the gate
//! never re-arms, so a grant can trigger at most one follow-up refresh.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::oneshot;

#[derive(Debug, Default)]
pub struct PermissionGate {
    armed: AtomicBool,
    waiter: Mutex<Option<oneshot::Sender<()>>>,
}

impl PermissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the receiver on the first call only.
    pub fn arm(&self) -> Option<oneshot::Receiver<()>> {
        if self.armed.swap(true, Ordering::SeqCst) {
            return None;
        }
        let (tx, rx) = oneshot::channel();
        *self.waiter.lock() = Some(tx);
        Some(rx)
    }

    /// Fires the armed waiter. Returns true if someone was waiting.
    pub fn grant(&self) -> bool {
        match self.waiter.lock().take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arms_only_once() {
        let gate = PermissionGate::new();
        assert!(gate.arm().is_some());
        assert!(gate.arm().is_none());
        assert!(gate.is_armed());
    }

    #[test]
    fn grant_without_waiter_is_noop() {
        let gate = PermissionGate::new();
        assert!(!gate.grant());
    }

    #[tokio::test]
    async fn grant_wakes_waiter_once() {
        let gate = PermissionGate::new();
        let rx = gate.arm().unwrap();

        assert!(gate.grant());
        assert!(rx.await.is_ok());
        assert!(!gate.grant());
    }

    #[tokio::test]
    async fn dropped_receiver_reports_no_waiter() {
        let gate = PermissionGate::new();
        drop(gate.arm());
        assert!(!gate.grant());
    }
}
