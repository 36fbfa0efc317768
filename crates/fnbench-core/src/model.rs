use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One benchmark case as loaded from a category data file. Immutable once
/// loaded; the category is everything in `id` before the final `_<index>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub question: Value,
    #[serde(default)]
    pub function: Value,
}

impl TestCase {
    pub fn category(&self) -> &str {
        split_category(&self.id)
    }

    /// Normalize the `function` field so adapters always receive a sequence:
    /// a single object or raw string becomes a one-element list, an existing
    /// list is passed through unchanged.
    pub fn functions(&self) -> Vec<Value> {
        match &self.function {
            Value::Array(items) => items.clone(),
            Value::Null => Vec::new(),
            single => vec![single.clone()],
        }
    }
}

pub fn split_category(id: &str) -> &str {
    id.rsplit_once('_').map(|(prefix, _)| prefix).unwrap_or(id)
}

/// Usage metadata reported by an adapter for a single inference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub latency_seconds: f64,
}

/// The outcome of one successful adapter call. Produced once per case.
#[derive(Debug, Clone)]
pub struct Inference {
    pub result: Value,
    pub usage: Usage,
}

/// Durable record appended to the checkpoint log. For a given
/// (model, category) pair the records on disk are always a prefix of the
/// category's case order; the line count alone is the resumption signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: String,
    pub result: Value,
    #[serde(default)]
    pub input_token_count: u64,
    #[serde(default)]
    pub output_token_count: u64,
    #[serde(default)]
    pub latency: f64,
}

impl ResultRecord {
    pub fn from_inference(id: &str, inference: &Inference) -> Self {
        Self {
            id: id.to_string(),
            result: inference.result.clone(),
            input_token_count: inference.usage.input_tokens,
            output_token_count: inference.usage.output_tokens,
            latency: inference.usage.latency_seconds,
        }
    }

    pub fn category(&self) -> &str {
        split_category(&self.id)
    }
}

/// Per-run generation parameters, fixed for the lifetime of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub language: String,
    pub timeout_seconds: u64,
    pub retry_limit: u32,
    pub retry_delay_seconds: u64,
}

impl RunConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Model names may contain `/` (hub-style identifiers); directory names
    /// on disk use `_` instead.
    pub fn sanitized_model(&self) -> String {
        self.model.replace('/', "_")
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            temperature: 0.7,
            top_p: 1.0,
            max_tokens: 1200,
            language: "en".to_string(),
            timeout_seconds: 60,
            retry_limit: 3,
            retry_delay_seconds: 65,
        }
    }
}

/// Resource parameters forwarded opaquely to batch-native adapters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub num_gpus: u32,
    pub gpu_memory_utilization: f32,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            num_gpus: 1,
            gpu_memory_utilization: 0.9,
        }
    }
}
