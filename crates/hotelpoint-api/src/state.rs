//! Shared handler state

use hotelpoint_core::{AppError, AppResult};
use hotelpoint_services::{BookingEngine, IdentityService};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Services shared by every worker
#[derive(Clone)]
pub struct ApiState {
    pub engine: BookingEngine,
    pub identity: IdentityService,
    timeout: Duration,
}

impl ApiState {
    pub fn new(engine: BookingEngine, identity: IdentityService, timeout: Duration) -> Self {
        Self {
            engine,
            identity,
            timeout,
        }
    }

    /// Run a service call under the request timeout
    ///
    /// An elapsed call is dropped; writes it already committed stay.
    pub async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!("{} timed out after {:?}", operation, self.timeout);
                Err(AppError::Timeout(format!(
                    "{} did not finish within {}s",
                    operation,
                    self.timeout.as_secs()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotelpoint_auth::JwtService;
    use hotelpoint_db::MemoryStore;
    use hotelpoint_services::BookingPolicy;
    use std::sync::Arc;

    fn state(timeout: Duration) -> ApiState {
        let (store, stores) = MemoryStore::new().into_stores();
        let jwt = Arc::new(JwtService::new("state-test-secret", 60));
        ApiState::new(
            BookingEngine::new(&stores, BookingPolicy::default()),
            IdentityService::new(store, jwt, 24),
            timeout,
        )
    }

    #[tokio::test]
    async fn test_bounded_passes_result_through() {
        let state = state(Duration::from_secs(1));
        let value = state.bounded("noop", async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let state = state(Duration::from_millis(10));
        let err = state
            .bounded("sleep", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Timeout(_)));
        assert_eq!(err.error_code(), "timeout");
    }
}
