//! The orchestration loop. One case in flight at a time: each successful
//! inference is durably recorded before the next case starts, so the records
//! for a (model, category) pair always form a contiguous leading run of that
//! category's case order. Any failure aborts the run; skipping a case would
//! punch a hole in that prefix and break resumption-by-count.

use crate::errors::RunError;
use crate::model::{ResourceConfig, ResultRecord, RunConfig, TestCase};
use crate::providers::{BatchInferenceAdapter, InferenceAdapter, ModelBackend};
use crate::selector::PendingCase;
use crate::storage::CheckpointStore;

use super::retry::RetryController;

#[derive(Debug, Default)]
pub struct RunSummary {
    pub completed: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

pub struct Runner {
    pub store: CheckpointStore,
    pub backend: ModelBackend,
    pub retry: RetryController,
    pub config: RunConfig,
    pub resources: ResourceConfig,
}

impl Runner {
    pub async fn run(&self, pending: &[PendingCase]) -> Result<RunSummary, RunError> {
        match &self.backend {
            ModelBackend::Interactive(adapter) => {
                self.run_interactive(adapter.as_ref(), pending).await
            }
            ModelBackend::BatchNative(adapter) => self.run_batch(adapter.as_ref(), pending).await,
        }
    }

    async fn run_interactive(
        &self,
        adapter: &dyn InferenceAdapter,
        pending: &[PendingCase],
    ) -> Result<RunSummary, RunError> {
        let model = self.config.sanitized_model();
        let total = pending.len();
        let mut summary = RunSummary::default();

        for item in pending {
            let functions = item.case.functions();
            let inference = self
                .retry
                .execute(
                    adapter,
                    &item.case.id,
                    &item.category,
                    &item.case.question,
                    &functions,
                )
                .await?;

            let record = ResultRecord::from_inference(&item.case.id, &inference);
            // Record before advancing; a kill between cases leaves a clean prefix.
            self.store.append(&model, &item.category, &record)?;

            summary.completed += 1;
            summary.input_tokens += inference.usage.input_tokens;
            summary.output_tokens += inference.usage.output_tokens;
            tracing::info!(
                case = %item.case.id,
                done = summary.completed,
                total,
                latency_secs = inference.usage.latency_seconds,
                "case recorded"
            );
        }

        Ok(summary)
    }

    async fn run_batch(
        &self,
        adapter: &dyn BatchInferenceAdapter,
        pending: &[PendingCase],
    ) -> Result<RunSummary, RunError> {
        let model = self.config.sanitized_model();
        let cases: Vec<TestCase> = pending.iter().map(|p| p.case.clone()).collect();

        let outputs = adapter
            .infer_batch(&cases, &self.resources)
            .await
            .map_err(|source| RunError::BatchFailed {
                model: self.config.model.clone(),
                source,
            })?;

        // Validate the shape before writing anything; a partial zip would
        // record results against the wrong ids.
        if outputs.len() != pending.len() {
            return Err(RunError::BatchShapeMismatch {
                expected: pending.len(),
                got: outputs.len(),
            });
        }

        let mut summary = RunSummary::default();
        for (item, result) in pending.iter().zip(outputs) {
            let record = ResultRecord {
                id: item.case.id.clone(),
                result,
                input_token_count: 0,
                output_token_count: 0,
                latency: 0.0,
            };
            self.store.append(&model, &item.category, &record)?;
            summary.completed += 1;
        }
        tracing::info!(completed = summary.completed, "batch run recorded");
        Ok(summary)
    }
}
