// src/check/runner.rs
use super::error::CheckError;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pending,
    Succeeded,
    Failed,
}

/// Outcome of a single check. The value and the error only exist in their
/// own terminal state.
#[derive(Debug, Clone)]
pub enum CheckState<T> {
    Pending,
    Succeeded(T),
    Failed(Arc<CheckError>),
}

impl<T> CheckState<T> {
    pub fn status(&self) -> CheckStatus {
        match self {
            CheckState::Pending => CheckStatus::Pending,
            CheckState::Succeeded(_) => CheckStatus::Succeeded,
            CheckState::Failed(_) => CheckStatus::Failed,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            CheckState::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Arc<CheckError>> {
        match self {
            CheckState::Failed(error) => Some(error),
            _ => None,
        }
    }
}

/// Runs one probe once and keeps its outcome for the renderer.
pub struct Check<T> {
    name: &'static str,
    started: AtomicBool,
    state: RwLock<CheckState<T>>,
}

impl<T> Check<T>
where
    T: Send + Sync,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            started: AtomicBool::new(false),
            state: RwLock::new(CheckState::Pending),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Invoke `probe` and settle the check with its result.
    ///
    /// Only the first activation runs the probe; later calls return
    /// immediately and leave the state alone.
    pub async fn run<F, Fut, E>(&self, probe: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Arc<CheckError>>,
    {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Check {} already activated, ignoring", self.name);
            return;
        }

        debug!("Running check {}", self.name);

        let outcome = match probe().await {
            Ok(value) => {
                info!("Check {} succeeded", self.name);
                CheckState::Succeeded(value)
            }
            Err(error) => {
                let error = error.into();
                warn!("Check {} failed: {}", self.name, error);
                CheckState::Failed(error)
            }
        };

        *self.state.write().await = outcome;
    }

    pub async fn status(&self) -> CheckStatus {
        self.state.read().await.status()
    }

    pub async fn snapshot(&self) -> CheckState<T>
    where
        T: Clone,
    {
        self.state.read().await.clone()
    }
}
