use std::fmt;

use tokio::sync::watch;

/// Why the server is stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Interrupt,
    Terminate,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Interrupt => write!(f, "SIGINT"),
            StopReason::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Sets the stop reason. Only the first trigger wins.
pub struct ShutdownTx(watch::Sender<Option<StopReason>>);

#[derive(Clone)]
pub struct ShutdownRx(watch::Receiver<Option<StopReason>>);

pub fn shutdown_channel() -> (ShutdownTx, ShutdownRx) {
    let (tx, rx) = watch::channel(None);
    (ShutdownTx(tx), ShutdownRx(rx))
}

impl ShutdownTx {
    /// Returns false if a stop was already requested.
    pub fn trigger(&self, reason: StopReason) -> bool {
        self.0.send_if_modified(|current| match current {
            Some(_) => false,
            None => {
                *current = Some(reason);
                true
            }
        })
    }

    pub fn reason(&self) -> Option<StopReason> {
        *self.0.borrow()
    }
}

impl ShutdownRx {
    /// Resolve with the stop reason, or `None` if every sender is gone
    /// without one.
    pub async fn wait(&mut self) -> Option<StopReason> {
        match self.0.wait_for(Option::is_some).await {
            Ok(reason) => *reason,
            Err(_) => None,
        }
    }

    /// Non-blocking check for the tick thread.
    pub fn reason(&self) -> Option<StopReason> {
        *self.0.borrow()
    }

    pub fn is_shutdown(&self) -> bool {
        self.reason().is_some()
    }
}

/// Wait for SIGINT or SIGTERM.
#[cfg(unix)]
pub async fn wait_for_signal() -> StopReason {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to register SIGINT");
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to register SIGTERM");
    tokio::select! {
        _ = sigint.recv() => StopReason::Interrupt,
        _ = sigterm.recv() => StopReason::Terminate,
    }
}

/// Wait for Ctrl+C.
#[cfg(not(unix))]
pub async fn wait_for_signal() -> StopReason {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl-c");
    StopReason::Interrupt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running() {
        let (tx, rx) = shutdown_channel();
        assert!(!rx.is_shutdown());
        assert_eq!(tx.reason(), None);
    }

    #[test]
    fn first_reason_sticks() {
        let (tx, rx) = shutdown_channel();
        let tick_side = rx.clone();

        assert!(tx.trigger(StopReason::Terminate));
        assert!(!tx.trigger(StopReason::Interrupt));

        assert_eq!(tx.reason(), Some(StopReason::Terminate));
        assert_eq!(rx.reason(), Some(StopReason::Terminate));
        assert_eq!(tick_side.reason(), Some(StopReason::Terminate));
    }

    #[tokio::test]
    async fn wait_yields_reason() {
        let (tx, mut rx) = shutdown_channel();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            tx.trigger(StopReason::Interrupt);
        });
        assert_eq!(rx.wait().await, Some(StopReason::Interrupt));
    }

    #[tokio::test]
    async fn wait_sees_earlier_trigger() {
        let (tx, mut rx) = shutdown_channel();
        tx.trigger(StopReason::Terminate);
        assert_eq!(rx.wait().await, Some(StopReason::Terminate));
    }

    #[tokio::test]
    async fn wait_returns_none_when_sender_dropped() {
        let (tx, mut rx) = shutdown_channel();
        drop(tx);
        assert_eq!(rx.wait().await, None);
    }

    #[test]
    fn reasons_display_for_logs() {
        assert_eq!(StopReason::Interrupt.to_string(), "SIGINT");
        assert_eq!(StopReason::Terminate.to_string(), "SIGTERM");
    }
}
