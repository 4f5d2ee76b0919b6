//! Platform permission state machine.
//!
//! Wraps the platform permission request behind an async gate. Callers
//! must await resolution before enabling anything that depends on the
//! notification capability; on rejection they log and leave the gated
//! feature disabled.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::PermissionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Unrequested,
    Pending,
    Granted,
    Denied,
}

/// Raw platform response. `Default` is the ambiguous "prompt dismissed
/// without answering" outcome; it is treated exactly like `Denied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionResponse {
    Granted,
    Denied,
    Default,
}

/// Platform permission prompt. May block while the user answers; the gate
/// calls it off the async executor.
pub trait PermissionPort: Send + Sync {
    fn request(&self) -> PermissionResponse;
}

/// Async state machine over the platform request. Transitions only move
/// forward: Unrequested -> Pending -> Granted | Denied, with no path back.
/// The platform is asked at most once; later calls return the memoized
/// outcome without re-prompting.
pub struct PermissionGate {
    platform: Arc<dyn PermissionPort>,
    state: Mutex<PermissionState>,
}

impl PermissionGate {
    pub fn new(platform: Arc<dyn PermissionPort>) -> Self {
        Self {
            platform,
            state: Mutex::new(PermissionState::Unrequested),
        }
    }

    pub fn state(&self) -> PermissionState {
        *self.state.lock().unwrap()
    }

    pub async fn request(&self) -> Result<(), PermissionError> {
        match self.state() {
            PermissionState::Granted => return Ok(()),
            PermissionState::Denied => return Err(PermissionError::Denied),
            PermissionState::Unrequested | PermissionState::Pending => {}
        }

        self.set(PermissionState::Pending);
        let platform = Arc::clone(&self.platform);
        // A crashed prompt reads as the ambiguous response.
        let response = tokio::task::spawn_blocking(move || platform.request())
            .await
            .unwrap_or(PermissionResponse::Default);

        match response {
            PermissionResponse::Granted => {
                self.set(PermissionState::Granted);
                Ok(())
            }
            PermissionResponse::Denied | PermissionResponse::Default => {
                self.set(PermissionState::Denied);
                Err(PermissionError::Denied)
            }
        }
    }

    fn set(&self, state: PermissionState) {
        *self.state.lock().unwrap() = state;
    }
}
