//! OpenAI-compatible chat-completions adapter with function calling via the
//! `tools` field. Error classification happens here, at the provider
//! boundary: the rest of the engine only ever sees [`AdapterErrorKind`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{AdapterError, AdapterErrorKind, InferenceAdapter};
use crate::model::{Inference, RunConfig, Usage};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiAdapter {
    model: String,
    api_key: String,
    base_url: String,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenAiAdapter {
    pub fn new(cfg: &RunConfig, api_key: String) -> Result<Self, AdapterError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .build()
            .map_err(|e| AdapterError::other("openai", format!("client build failed: {e}")))?;
        Ok(Self {
            model: cfg.model.clone(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: cfg.temperature,
            top_p: cfg.top_p,
            max_tokens: cfg.max_tokens,
            client,
        })
    }

    /// Point the adapter at an OpenAI-compatible endpoint other than the
    /// hosted API (proxies, local servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn messages_for(question: &Value) -> Vec<Value> {
        match question {
            // Structured prompts are already chat messages.
            Value::Array(msgs) => msgs.clone(),
            Value::String(text) => vec![json!({"role": "user", "content": text})],
            other => vec![json!({"role": "user", "content": other.to_string()})],
        }
    }

    fn classify_status(status: u16, body: String) -> AdapterError {
        match status {
            429 => AdapterError::rate_limited("openai", Some(status), body),
            500 | 502 | 503 | 504 => AdapterError::overloaded("openai", Some(status), body),
            401 | 403 => AdapterError::auth("openai", Some(status), body),
            400 | 404 | 422 => AdapterError::invalid_request("openai", Some(status), body),
            _ => AdapterError::new(AdapterErrorKind::Other, "openai", Some(status), body),
        }
    }

    fn classify_transport(err: reqwest::Error) -> AdapterError {
        AdapterError::network("openai", err.to_string())
    }
}

#[async_trait]
impl InferenceAdapter for OpenAiAdapter {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn infer(
        &self,
        question: &Value,
        functions: &[Value],
        _category: &str,
    ) -> Result<Inference, AdapterError> {
        let url = format!("{}/chat/completions", self.base_url);
        let tools: Vec<Value> = functions
            .iter()
            .map(|f| json!({"type": "function", "function": f}))
            .collect();

        let mut body = json!({
            "model": self.model,
            "messages": Self::messages_for(question),
            "temperature": self.temperature,
            "top_p": self.top_p,
            "max_tokens": self.max_tokens,
        });
        if !tools.is_empty() {
            body["tools"] = Value::Array(tools);
        }

        let started = Instant::now();
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(Self::classify_transport)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Self::classify_status(status.as_u16(), text));
        }

        let payload: Value = resp.json().await.map_err(Self::classify_transport)?;
        let latency_seconds = started.elapsed().as_secs_f64();

        let message = payload
            .pointer("/choices/0/message")
            .ok_or_else(|| AdapterError::other("openai", "response missing choices[0].message"))?;

        // The model's function-call decision, kept opaque: tool calls when it
        // made any, plain content otherwise.
        let result = match message.get("tool_calls") {
            Some(calls) if !calls.is_null() => calls.clone(),
            _ => message.get("content").cloned().unwrap_or(Value::Null),
        };

        let usage = Usage {
            input_tokens: payload
                .pointer("/usage/prompt_tokens")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            output_tokens: payload
                .pointer("/usage/completion_tokens")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            latency_seconds,
        };

        Ok(Inference { result, usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification_matches_provider_semantics() {
        assert_eq!(
            OpenAiAdapter::classify_status(429, "rate limit reached".into()).kind,
            AdapterErrorKind::RateLimited
        );
        for status in [500, 502, 503, 504] {
            assert!(OpenAiAdapter::classify_status(status, String::new()).is_transient());
        }
        assert!(!OpenAiAdapter::classify_status(401, String::new()).is_transient());
        assert!(!OpenAiAdapter::classify_status(400, String::new()).is_transient());
        assert!(!OpenAiAdapter::classify_status(418, String::new()).is_transient());
    }

    #[test]
    fn string_question_becomes_single_user_message() {
        let msgs = OpenAiAdapter::messages_for(&serde_json::json!("What is 2+2?"));
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0]["role"], "user");
    }

    #[test]
    fn structured_question_is_passed_as_messages() {
        let question = serde_json::json!([
            {"role": "system", "content": "You call functions."},
            {"role": "user", "content": "Add 2 and 2."}
        ]);
        let msgs = OpenAiAdapter::messages_for(&question);
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0]["role"], "system");
    }
}
