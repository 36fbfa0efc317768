//! Deterministic in-process adapters for tests and offline runs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{AdapterError, BatchInferenceAdapter, InferenceAdapter};
use crate::model::{Inference, ResourceConfig, TestCase, Usage};

/// Scripted interactive adapter. With no script it echoes a canned call;
/// with a script it plays the queued outcomes in order, which is how the
/// retry tests stage "fail twice, then succeed" sequences.
pub struct FakeAdapter {
    script: Mutex<VecDeque<Result<Value, AdapterError>>>,
    calls: AtomicUsize,
    seen_function_counts: Mutex<Vec<usize>>,
}

impl FakeAdapter {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            seen_function_counts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_script(
        outcomes: impl IntoIterator<Item = Result<Value, AdapterError>>,
    ) -> Self {
        let adapter = Self::new();
        adapter
            .script
            .lock()
            .expect("script lock")
            .extend(outcomes);
        adapter
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Function-list lengths observed per call, for normalization tests.
    pub fn seen_function_counts(&self) -> Vec<usize> {
        self.seen_function_counts.lock().expect("counts lock").clone()
    }
}

impl Default for FakeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceAdapter for FakeAdapter {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn infer(
        &self,
        _question: &Value,
        functions: &[Value],
        _category: &str,
    ) -> Result<Inference, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_function_counts
            .lock()
            .expect("counts lock")
            .push(functions.len());

        let scripted = self.script.lock().expect("script lock").pop_front();
        let result = match scripted {
            Some(Ok(value)) => value,
            Some(Err(err)) => return Err(err),
            None => json!(["fake_call(arg=1)"]),
        };

        Ok(Inference {
            result,
            usage: Usage {
                input_tokens: 1,
                output_tokens: 1,
                latency_seconds: 0.0,
            },
        })
    }
}

/// Batch-native counterpart: answers every case in one call by echoing its
/// id. A scripted failure makes the whole batch fail, mirroring real
/// batch-native backends where there is no per-case retry hook.
pub struct FakeBatchAdapter {
    failure: Mutex<Option<AdapterError>>,
}

impl FakeBatchAdapter {
    pub fn new() -> Self {
        Self {
            failure: Mutex::new(None),
        }
    }

    pub fn failing_with(err: AdapterError) -> Self {
        Self {
            failure: Mutex::new(Some(err)),
        }
    }
}

impl Default for FakeBatchAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BatchInferenceAdapter for FakeBatchAdapter {
    fn name(&self) -> &'static str {
        "fake-batch"
    }

    async fn infer_batch(
        &self,
        cases: &[TestCase],
        _resources: &ResourceConfig,
    ) -> Result<Vec<Value>, AdapterError> {
        if let Some(err) = self.failure.lock().expect("failure lock").take() {
            return Err(err);
        }
        Ok(cases
            .iter()
            .map(|case| json!([format!("batch_answer_for_{}", case.id)]))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_outcomes_play_in_order() {
        let adapter = FakeAdapter::with_script([
            Err(AdapterError::rate_limited("fake", Some(429), "busy")),
            Ok(json!(["ok"])),
        ]);

        let q = json!("q");
        let err = adapter.infer(&q, &[], "simple").await.unwrap_err();
        assert!(err.is_transient());

        let inference = adapter.infer(&q, &[], "simple").await.unwrap();
        assert_eq!(inference.result, json!(["ok"]));
        assert_eq!(adapter.calls(), 2);
    }

    #[tokio::test]
    async fn batch_adapter_returns_parallel_outputs() {
        let adapter = FakeBatchAdapter::new();
        let cases = vec![
            TestCase {
                id: "simple_0".into(),
                question: json!("a"),
                function: Value::Null,
            },
            TestCase {
                id: "simple_1".into(),
                question: json!("b"),
                function: Value::Null,
            },
        ];
        let out = adapter
            .infer_batch(&cases, &ResourceConfig::default())
            .await
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1], json!(["batch_answer_for_simple_1"]));
    }
}
