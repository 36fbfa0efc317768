//! Maps a model name to its backend, the interactive/batch-native choice
//! included. This is the registry: adding a model family means adding an arm
//! here, nothing in the engine changes.

use std::sync::Arc;

use anyhow::Context;
use fnbench_core::model::RunConfig;
use fnbench_core::providers::fake::{FakeAdapter, FakeBatchAdapter};
use fnbench_core::providers::openai::OpenAiAdapter;
use fnbench_core::providers::ModelBackend;

pub fn build(config: &RunConfig, api_key: Option<String>) -> anyhow::Result<ModelBackend> {
    match config.model.as_str() {
        "fake" => Ok(ModelBackend::Interactive(Arc::new(FakeAdapter::new()))),
        "fake-batch" => Ok(ModelBackend::BatchNative(Arc::new(FakeBatchAdapter::new()))),
        m if m.starts_with("gpt-") || m.starts_with("openai/") => {
            let key = api_key
                .context("model requires an API key (--api-key or OPENAI_API_KEY)")?;
            let adapter = OpenAiAdapter::new(config, key)
                .map_err(|e| anyhow::anyhow!("failed to build openai adapter: {e}"))?;
            Ok(ModelBackend::Interactive(Arc::new(adapter)))
        }
        other => anyhow::bail!("no adapter registered for model `{other}`"),
    }
}
