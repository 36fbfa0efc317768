//! Inference adapters. Each model family implements one of two narrow
//! contracts: interactive adapters answer one case at a time, batch-native
//! adapters take the whole pending list in a single call. The variant in use
//! is a configuration choice carried by [`ModelBackend`], never a runtime
//! type check.

pub mod fake;
pub mod openai;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::model::{Inference, ResourceConfig, TestCase};

/// Failure classification, chosen by the adapter that produced the error.
/// The retry controller consults only [`AdapterErrorKind::is_transient`];
/// provider-specific status codes never leak past the adapter boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterErrorKind {
    /// Explicit rate-limit signal; expected to clear after a wait.
    RateLimited,
    /// Server overload, unavailable, or internal error.
    Overloaded,
    /// Authentication or authorization rejection.
    Auth,
    /// The request itself was malformed; retrying cannot help.
    InvalidRequest,
    /// Connection-level failure (DNS, reset, timeout).
    Network,
    Other,
}

impl AdapterErrorKind {
    pub fn is_transient(self) -> bool {
        matches!(self, AdapterErrorKind::RateLimited | AdapterErrorKind::Overloaded)
    }
}

#[derive(Debug, Error)]
#[error("{provider}: {message}")]
pub struct AdapterError {
    pub kind: AdapterErrorKind,
    pub provider: &'static str,
    pub status: Option<u16>,
    pub message: String,
}

impl AdapterError {
    pub fn new(
        kind: AdapterErrorKind,
        provider: &'static str,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            provider,
            status,
            message: message.into(),
        }
    }

    pub fn rate_limited(
        provider: &'static str,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(AdapterErrorKind::RateLimited, provider, status, message)
    }

    pub fn overloaded(
        provider: &'static str,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(AdapterErrorKind::Overloaded, provider, status, message)
    }

    pub fn auth(provider: &'static str, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::Auth, provider, status, message)
    }

    pub fn invalid_request(
        provider: &'static str,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(AdapterErrorKind::InvalidRequest, provider, status, message)
    }

    pub fn network(provider: &'static str, message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::Network, provider, None, message)
    }

    pub fn other(provider: &'static str, message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::Other, provider, None, message)
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

/// Interactive adapter: one case in, one structured result plus usage out.
#[async_trait]
pub trait InferenceAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn infer(
        &self,
        question: &Value,
        functions: &[Value],
        category: &str,
    ) -> Result<Inference, AdapterError>;
}

/// Batch-native adapter: processes the entire pending list in one call and
/// returns a positionally parallel output list. No per-case retry hook.
#[async_trait]
pub trait BatchInferenceAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn infer_batch(
        &self,
        cases: &[TestCase],
        resources: &ResourceConfig,
    ) -> Result<Vec<Value>, AdapterError>;
}

/// Backend variant for a model, fixed by configuration when the run is built.
#[derive(Clone)]
pub enum ModelBackend {
    Interactive(Arc<dyn InferenceAdapter>),
    BatchNative(Arc<dyn BatchInferenceAdapter>),
}

impl fmt::Debug for ModelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelBackend::Interactive(adapter) => {
                f.debug_tuple("Interactive").field(&adapter.name()).finish()
            }
            ModelBackend::BatchNative(adapter) => {
                f.debug_tuple("BatchNative").field(&adapter.name()).finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rate_limit_and_overload_are_transient() {
        assert!(AdapterError::rate_limited("p", Some(429), "slow down").is_transient());
        assert!(AdapterError::overloaded("p", Some(503), "unavailable").is_transient());
        assert!(!AdapterError::auth("p", Some(401), "bad key").is_transient());
        assert!(!AdapterError::invalid_request("p", Some(400), "bad body").is_transient());
        assert!(!AdapterError::network("p", "connection reset").is_transient());
        assert!(!AdapterError::other("p", "???").is_transient());
    }

    #[test]
    fn backend_debug_names_the_variant_and_adapter() {
        let interactive = ModelBackend::Interactive(Arc::new(fake::FakeAdapter::new()));
        assert_eq!(format!("{interactive:?}"), r#"Interactive("fake")"#);

        let batch = ModelBackend::BatchNative(Arc::new(fake::FakeBatchAdapter::new()));
        assert_eq!(format!("{batch:?}"), r#"BatchNative("fake-batch")"#);
    }
}
