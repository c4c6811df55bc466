//! # Failure Containment
//!
//! The outermost scope. Any fault raised while producing output (a returned
//! [`RenderFault`] or a panic) is caught here and replaced by a recovery
//! screen offering a full reload.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  FailureBoundary::supervise(region, render)                            │
//! │                                                                         │
//! │     Ok(output)          ──► output                                      │
//! │     Err(RenderFault)    ──► RecoveryView ("Reload Page")                │
//! │     panic!              ──► RecoveryView ("Reload Page")                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the render path is supervised. Background fetch failures are
//! `LoadFailure`s and stay regional.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::error;

use crate::error::RenderFault;

pub const RECOVERY_HEADING: &str = "Oops! Something went wrong";

/// The one recovery action the shell offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    /// Discard all in-memory state and start over.
    Reload,
}

impl RecoveryAction {
    pub fn label(&self) -> &'static str {
        match self {
            RecoveryAction::Reload => "Reload Page",
        }
    }
}

/// Replacement screen after a contained fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecoveryView {
    pub heading: &'static str,
    pub message: String,
    pub action: RecoveryAction,
    /// Location that was being rendered; reload returns there.
    pub path: String,
}

impl RecoveryView {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        RecoveryView {
            heading: RECOVERY_HEADING,
            message: message.into(),
            action: RecoveryAction::Reload,
            path: path.into(),
        }
    }
}

/// Catches render faults for one screen.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailureBoundary;

impl FailureBoundary {
    /// Runs `render`, converting a fault or panic into a [`RecoveryView`].
    pub fn supervise<T, F>(&self, path: &str, region: &str, render: F) -> Result<T, RecoveryView>
    where
        F: FnOnce() -> Result<T, RenderFault>,
    {
        match panic::catch_unwind(AssertUnwindSafe(render)) {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(fault)) => {
                error!(path, region, fault = %fault, "Render fault contained");
                Err(RecoveryView::new(path, fault.message))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(path, region, panic = %message, "Render panic contained");
                Err(RecoveryView::new(path, message))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected fault".to_string()
    }
}
