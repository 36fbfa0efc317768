//! Bounded-retry wrapper around a single interactive adapter call.
//!
//! Provider rate limits reset on a coarse window (tens of seconds), so a
//! fixed delay calibrated slightly above that window is used instead of
//! adaptive backoff; the benchmark is not latency-sensitive and colliding
//! with the same window repeatedly would be worse.

use std::time::Duration;

use serde_json::Value;

use crate::errors::RunError;
use crate::model::Inference;
use crate::providers::{AdapterError, InferenceAdapter};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first (default 3).
    pub max_attempts: u32,
    /// Fixed sleep between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(65),
        }
    }
}

/// One attempt's outcome, classified by the adapter that produced the error.
enum AttemptOutcome {
    Success(Inference),
    Transient(AdapterError),
    Fatal(AdapterError),
}

pub struct RetryController {
    policy: RetryPolicy,
}

impl RetryController {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Drive one case to success or a terminal failure. Transient failures
    /// sleep and retry up to the attempt limit; fatal failures and exhausted
    /// retries propagate immediately with the case context attached.
    pub async fn execute(
        &self,
        adapter: &dyn InferenceAdapter,
        case_id: &str,
        category: &str,
        question: &Value,
        functions: &[Value],
    ) -> Result<Inference, RunError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match Self::attempt(adapter, question, functions, category).await {
                AttemptOutcome::Success(inference) => return Ok(inference),
                AttemptOutcome::Fatal(err) => {
                    return Err(RunError::CaseFailed {
                        case_id: case_id.to_string(),
                        category: category.to_string(),
                        attempts: attempt,
                        source: err,
                    });
                }
                AttemptOutcome::Transient(err) => {
                    if attempt >= max_attempts {
                        return Err(RunError::RetriesExhausted {
                            case_id: case_id.to_string(),
                            category: category.to_string(),
                            attempts: attempt,
                            source: err,
                        });
                    }
                    tracing::warn!(
                        case = case_id,
                        attempt,
                        max_attempts,
                        delay_secs = self.policy.delay.as_secs(),
                        error = %err,
                        "transient provider failure; backing off"
                    );
                    tokio::time::sleep(self.policy.delay).await;
                }
            }
        }
    }

    async fn attempt(
        adapter: &dyn InferenceAdapter,
        question: &Value,
        functions: &[Value],
        category: &str,
    ) -> AttemptOutcome {
        match adapter.infer(question, functions, category).await {
            Ok(inference) => AttemptOutcome::Success(inference),
            Err(err) if err.is_transient() => AttemptOutcome::Transient(err),
            Err(err) => AttemptOutcome::Fatal(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::fake::FakeAdapter;
    use serde_json::json;

    fn transient() -> AdapterError {
        AdapterError::rate_limited("fake", Some(429), "rate limit reached")
    }

    #[tokio::test(start_paused = true)]
    async fn two_transient_failures_then_success_within_limit() {
        let adapter = FakeAdapter::with_script([
            Err(transient()),
            Err(transient()),
            Ok(json!(["third_time"])),
        ]);
        let controller = RetryController::new(RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_secs(65),
        });

        let started = tokio::time::Instant::now();
        let inference = controller
            .execute(&adapter, "simple_0", "simple", &json!("q"), &[])
            .await
            .unwrap();

        assert_eq!(inference.result, json!(["third_time"]));
        assert_eq!(adapter.calls(), 3);
        // Two backoff intervals, nothing more.
        assert_eq!(started.elapsed(), Duration::from_secs(130));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_exhausted_is_reported_with_attempt_count() {
        let adapter =
            FakeAdapter::with_script([Err(transient()), Err(transient()), Err(transient())]);
        let controller = RetryController::new(RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_secs(65),
        });

        let err = controller
            .execute(&adapter, "simple_0", "simple", &json!("q"), &[])
            .await
            .unwrap_err();

        assert_eq!(adapter.calls(), 3);
        match err {
            RunError::RetriesExhausted {
                case_id,
                category,
                attempts,
                ..
            } => {
                assert_eq!(case_id, "simple_0");
                assert_eq!(category, "simple");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_failure_propagates_without_retry() {
        let adapter = FakeAdapter::with_script([Err(AdapterError::auth(
            "fake",
            Some(401),
            "invalid api key",
        ))]);
        let controller = RetryController::new(RetryPolicy::default());

        let started = tokio::time::Instant::now();
        let err = controller
            .execute(&adapter, "simple_1", "simple", &json!("q"), &[])
            .await
            .unwrap_err();

        assert_eq!(adapter.calls(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(matches!(
            err,
            RunError::CaseFailed {
                attempts: 1,
                ref case_id,
                ..
            } if case_id == "simple_1"
        ));
    }
}
