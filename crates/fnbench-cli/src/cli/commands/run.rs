use fnbench_core::catalog;
use fnbench_core::engine::{RetryController, RetryPolicy, Runner};
use fnbench_core::model::{ResourceConfig, RunConfig};
use fnbench_core::selector;
use fnbench_core::storage::CheckpointStore;

use std::time::Duration;

use crate::backend;
use crate::cli::args::RunArgs;
use crate::exit_codes::{RUN_FAILED, SUCCESS};

pub async fn run(args: RunArgs) -> anyhow::Result<i32> {
    // Fail fast on bad tokens before any model work starts.
    let leaves = catalog::expand(&args.test_categories)?;
    tracing::info!(models = ?args.models, categories = ?leaves, "starting generation");

    let data_root = args.data_dir.join(&args.language);
    let store = CheckpointStore::new(args.result_dir.join(&args.language));

    let mut code = SUCCESS;
    for model in &args.models {
        let config = RunConfig {
            model: model.clone(),
            temperature: args.temperature,
            top_p: args.top_p,
            max_tokens: args.max_tokens,
            language: args.language.clone(),
            timeout_seconds: args.timeout,
            retry_limit: args.retry_limit,
            retry_delay_seconds: args.retry_delay,
        };

        let pending =
            match selector::pending_cases(&data_root, &store, model, &args.test_categories) {
                Ok(pending) => pending,
                // Bad invocation (unknown category, missing or unparseable
                // data file): stop and report as a usage error.
                Err(e) if e.is_config_error() => return Err(e.into()),
                // Result-store trouble is a per-model run failure; other
                // models may still make progress.
                Err(e) => {
                    eprintln!("{model}: run aborted: {e}");
                    code = RUN_FAILED;
                    continue;
                }
            };
        if pending.is_empty() {
            println!("{model}: all selected test cases already generated, nothing to do");
            continue;
        }
        println!("{model}: {} pending case(s)", pending.len());

        let backend = backend::build(&config, args.api_key.clone())?;
        let runner = Runner {
            store: store.clone(),
            backend,
            retry: RetryController::new(RetryPolicy {
                max_attempts: args.retry_limit,
                delay: Duration::from_secs(args.retry_delay),
            }),
            config,
            resources: ResourceConfig {
                num_gpus: args.num_gpus,
                gpu_memory_utilization: args.gpu_memory_utilization,
            },
        };

        match runner.run(&pending).await {
            Ok(summary) => {
                println!(
                    "{model}: recorded {} case(s) ({} input / {} output tokens)",
                    summary.completed, summary.input_tokens, summary.output_tokens
                );
            }
            Err(e) => {
                // The failing case was not recorded; a rerun resumes from it.
                eprintln!("{model}: run aborted: {e}");
                let mut source = std::error::Error::source(&e);
                while let Some(cause) = source {
                    eprintln!("  caused by: {cause}");
                    source = cause.source();
                }
                code = RUN_FAILED;
            }
        }
    }

    Ok(code)
}
