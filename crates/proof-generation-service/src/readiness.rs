//! One-shot readiness gate between startup and request handling.

use std::sync::{Arc, OnceLock};

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessState {
    NotReady,
    Ready,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Service is not ready")]
pub struct NotReadyError;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Service is already initialized")]
pub struct AlreadyReady;

/// Holds the startup product once it exists.
///
/// The only transition is `NotReady -> Ready`; a second `mark_ready` is
/// refused and the first value stays in place.
pub struct ReadinessGate<T> {
    value: OnceLock<Arc<T>>,
}

impl<T> ReadinessGate<T> {
    pub fn new() -> Self {
        Self {
            value: OnceLock::new(),
        }
    }

    pub fn state(&self) -> ReadinessState {
        if self.is_ready() {
            ReadinessState::Ready
        } else {
            ReadinessState::NotReady
        }
    }

    pub fn is_ready(&self) -> bool {
        self.value.get().is_some()
    }

    pub fn mark_ready(&self, value: Arc<T>) -> Result<(), AlreadyReady> {
        self.value.set(value).map_err(|_| AlreadyReady)
    }

    pub fn get(&self) -> Result<Arc<T>, NotReadyError> {
        self.value.get().cloned().ok_or(NotReadyError)
    }
}

impl<T> Default for ReadinessGate<T> {
    fn default() -> Self {
        Self::new()
    }
}
