use tokio::sync::watch;

use crate::BackendError;

/// How a caller wants readiness handled: suspend until the backend comes up,
/// or fail immediately with [`BackendError::NotReady`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitPolicy {
    #[default]
    Wait,
    FailFast,
}

/// One-shot readiness gate for the analysis backend.
///
/// Starts pending; [`ReadinessGate::mark_ready`] transitions to ready at most
/// once and releases every waiter, past and future. There is no way back to
/// pending; a restarted backend gets a fresh gate.
#[derive(Debug)]
pub struct ReadinessGate {
    state: watch::Sender<bool>,
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessGate {
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self { state }
    }

    /// Flip the gate to ready. Returns `true` on the first call, `false` on
    /// every later one.
    pub fn mark_ready(&self) -> bool {
        let transitioned = self.state.send_if_modified(|ready| {
            if *ready {
                false
            } else {
                *ready = true;
                true
            }
        });
        if transitioned {
            tracing::debug!(target: "arbor.backend", "analysis backend ready");
        }
        transitioned
    }

    pub fn is_ready(&self) -> bool {
        *self.state.borrow()
    }

    /// Fail-fast readiness check.
    pub fn try_ready(&self) -> Result<(), BackendError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(BackendError::NotReady)
        }
    }

    /// Suspend until the gate is ready; returns immediately if it already is.
    pub async fn wait(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `&self`, so this cannot fail.
        let _ = rx.wait_for(|ready| *ready).await;
    }

    /// Apply a wait policy: either [`Self::wait`] or [`Self::try_ready`].
    pub async fn ready(&self, policy: WaitPolicy) -> Result<(), BackendError> {
        match policy {
            WaitPolicy::Wait => {
                self.wait().await;
                Ok(())
            }
            WaitPolicy::FailFast => self.try_ready(),
        }
    }
}
