//! Deadline and cancellation wrapper for remote calls.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use rulehook_client::ClientError;

use crate::error::{EngineError, Result};

/// Applies the per-call deadline and races every call against the run's
/// cancellation token.
#[derive(Debug, Clone)]
pub struct CallGuard {
    timeout: Duration,
    cancel: CancellationToken,
}

impl CallGuard {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fail fast if the run has been cancelled.
    pub fn check(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub async fn call<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, ClientError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(EngineError::Cancelled),
            result = tokio::time::timeout(self.timeout, call) => match result {
                Ok(inner) => inner.map_err(EngineError::from),
                Err(_) => Err(EngineError::Timeout(self.timeout)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_result() {
        let guard = CallGuard::new(Duration::from_secs(1));
        let value = guard.call(async { Ok::<_, ClientError>(7) }).await.unwrap();
        assert_eq!(value, 7);

        let err = guard
            .call(async { Err::<(), _>(ClientError::Graphql("boom".to_string())) })
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Client(ClientError::Graphql(_))));
    }

    #[tokio::test]
    async fn slow_call_times_out() {
        let guard = CallGuard::new(Duration::from_millis(10));
        let err = guard
            .call(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, ClientError>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Timeout(d) if d == Duration::from_millis(10)));
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let token = CancellationToken::new();
        let guard = CallGuard::new(Duration::from_secs(1)).with_cancellation(token.clone());
        assert!(guard.check().is_ok());

        token.cancel();
        assert!(matches!(guard.check(), Err(EngineError::Cancelled)));
        let err = guard.call(async { Ok::<_, ClientError>(()) }).await.unwrap_err();
        assert!(matches!(err, EngineError::Cancelled));
    }
}
