//! Gateway wrapper with exponential backoff retry.
//!
//! Only transport failures are retried. A `{success: false}` envelope is an
//! answer, not a failure, and passes straight through.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde_json::Value;

use crate::error::ClientError;
use crate::transport::{ApiRequest, GatewayPort};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 = single attempt)
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay_ms: u64,
    /// Upper bound for the exponential growth
    pub max_delay_ms: u64,
    /// ±fraction of the delay randomized per attempt (0.0-1.0)
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 250,
            max_delay_ms: 5000,
            jitter_factor: 0.2,
        }
    }
}

pub struct RetryingGateway {
    inner: Arc<dyn GatewayPort>,
    config: RetryConfig,
}

impl RetryingGateway {
    pub fn new(inner: Arc<dyn GatewayPort>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// Delay before retry `attempt` (1-based): `base * 2^(attempt-1)`, capped, jittered.
    fn calculate_delay(&self, attempt: u32) -> u64 {
        let base = self.config.base_delay_ms;
        let exponential = base.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let capped = exponential.min(self.config.max_delay_ms);

        let jitter_range = (capped as f64 * self.config.jitter_factor) as i64;
        if jitter_range > 0 {
            let jitter = rand::thread_rng().gen_range(-jitter_range..=jitter_range);
            (capped as i64 + jitter).max(0) as u64
        } else {
            capped
        }
    }
}

#[async_trait]
impl GatewayPort for RetryingGateway {
    async fn execute(&self, request: &ApiRequest) -> Result<Value, ClientError> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.inner.execute(request).await {
                Ok(envelope) => {
                    if attempt > 0 {
                        tracing::info!(
                            attempt = attempt + 1,
                            path = %request.path,
                            correlation_id = %request.correlation_id,
                            "Request succeeded after retry"
                        );
                    }
                    return Ok(envelope);
                }
                Err(e) => {
                    if !e.is_retryable() {
                        tracing::debug!(
                            error = %e,
                            path = %request.path,
                            correlation_id = %request.correlation_id,
                            "Request failed with non-retryable error"
                        );
                        return Err(e);
                    }

                    if attempt < self.config.max_retries {
                        let delay = self.calculate_delay(attempt + 1);
                        tracing::warn!(
                            attempt = attempt + 1,
                            max_retries = self.config.max_retries,
                            delay_ms = delay,
                            error = %e,
                            path = %request.path,
                            correlation_id = %request.correlation_id,
                            "Request failed, retrying"
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                    }

                    last_error = Some(e);
                }
            }
        }

        let error =
            last_error.unwrap_or_else(|| ClientError::Transport("no attempt made".to_string()));
        tracing::error!(
            attempts = self.config.max_retries + 1,
            error = %error,
            path = %request.path,
            correlation_id = %request.correlation_id,
            "Request failed after all retry attempts"
        );
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockGatewayPort;
    use mockall::Sequence;
    use serde_json::json;

    fn fast(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            base_delay_ms: 1,
            max_delay_ms: 5,
            jitter_factor: 0.0,
        }
    }

    #[tokio::test]
    async fn transport_failure_then_success() {
        let mut mock = MockGatewayPort::new();
        let mut seq = Sequence::new();
        mock.expect_execute()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Err(ClientError::Transport("connection reset".into())));
        mock.expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(json!({"success": true, "data": {}})));

        let gateway = RetryingGateway::new(Arc::new(mock), fast(3));
        let result = gateway.execute(&ApiRequest::get("/api/health")).await;

        assert_eq!(result.unwrap()["success"], json!(true));
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let mut mock = MockGatewayPort::new();
        mock.expect_execute()
            .times(3)
            .returning(|_| Err(ClientError::Http { status: 503, body: "busy".into() }));

        let gateway = RetryingGateway::new(Arc::new(mock), fast(2));
        let result = gateway.execute(&ApiRequest::get("/api/health")).await;

        assert!(matches!(result, Err(ClientError::Http { status: 503, .. })));
    }

    #[tokio::test]
    async fn domain_failure_envelope_is_not_retried() {
        let mut mock = MockGatewayPort::new();
        mock.expect_execute().times(1).returning(|_| {
            Ok(json!({"success": false, "error": "Not enough meat", "error_kind": "precondition_failed"}))
        });

        let gateway = RetryingGateway::new(Arc::new(mock), fast(3));
        let envelope = gateway
            .execute(&ApiRequest::post("/api/fighters/x/status", json!({"action": "feed"})))
            .await
            .unwrap();

        assert_eq!(envelope["success"], json!(false));
    }

    #[tokio::test]
    async fn client_error_status_is_not_retried() {
        let mut mock = MockGatewayPort::new();
        mock.expect_execute()
            .times(1)
            .returning(|_| Err(ClientError::Http { status: 401, body: "Missing x-user-id".into() }));

        let gateway = RetryingGateway::new(Arc::new(mock), fast(3));
        let result = gateway.execute(&ApiRequest::get("/api/health")).await;

        assert!(matches!(result, Err(ClientError::Http { status: 401, .. })));
    }

    #[tokio::test]
    async fn retries_reuse_the_correlation_id() {
        let request = ApiRequest::get("/api/health");
        let expected = request.correlation_id;
        let mut mock = MockGatewayPort::new();
        let mut seq = Sequence::new();
        mock.expect_execute()
            .withf(move |r| r.correlation_id == expected)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ClientError::Transport("timeout".into())));
        mock.expect_execute()
            .withf(move |r| r.correlation_id == expected)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(json!({"success": true, "data": null})));

        let gateway = RetryingGateway::new(Arc::new(mock), fast(1));
        assert!(gateway.execute(&request).await.is_ok());
    }

    #[test]
    fn exponential_backoff_is_capped() {
        let gateway = RetryingGateway::new(
            Arc::new(MockGatewayPort::new()),
            RetryConfig {
                max_retries: 5,
                base_delay_ms: 250,
                max_delay_ms: 5000,
                jitter_factor: 0.0,
            },
        );

        assert_eq!(gateway.calculate_delay(1), 250);
        assert_eq!(gateway.calculate_delay(2), 500);
        assert_eq!(gateway.calculate_delay(3), 1000);
        assert_eq!(gateway.calculate_delay(5), 4000);
        assert_eq!(gateway.calculate_delay(6), 5000);
    }

    #[test]
    fn jitter_stays_in_range() {
        let gateway = RetryingGateway::new(
            Arc::new(MockGatewayPort::new()),
            RetryConfig {
                max_retries: 1,
                base_delay_ms: 1000,
                max_delay_ms: 1000,
                jitter_factor: 0.2,
            },
        );
        for _ in 0..50 {
            let delay = gateway.calculate_delay(1);
            assert!((800..=1200).contains(&delay));
        }
    }
}
