use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::services::MatchingEngine;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MatchingEngine>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(engine: MatchingEngine, request_timeout: Duration) -> Self {
        Self {
            engine: Arc::new(engine),
            request_timeout,
        }
    }

    /// Runs an engine operation on its own task, bounded by the request timeout
    ///
    /// On timeout the caller gets `AppError::Timeout` while the task keeps
    /// running to completion, including any writes it still makes.
    pub async fn run<T, F, Fut>(&self, op: F) -> AppResult<T>
    where
        F: FnOnce(Arc<MatchingEngine>) -> Fut,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let task = tokio::spawn(op(self.engine.clone()));

        match tokio::time::timeout(self.request_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(AppError::Internal(format!("Partner task failed: {}", e))),
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.request_timeout.as_millis() as u64,
                    "Partner operation timed out"
                );
                Err(AppError::Timeout)
            }
        }
    }
}
