use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "fnbench",
    version,
    about = "Resumable function-calling benchmark runner"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate results for one or more models over the selected categories
    Run(RunArgs),
    /// List leaf categories and aliases
    Categories,
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    /// Models to evaluate (repeatable or comma-separated)
    #[arg(long = "model", required = true, num_args = 1.., value_delimiter = ',')]
    pub models: Vec<String>,

    /// Test categories: leaf names or aliases (repeatable or comma-separated)
    #[arg(long = "test-category", default_value = "all", num_args = 1.., value_delimiter = ',')]
    pub test_categories: Vec<String>,

    /// Language variant of the benchmark data
    #[arg(long, default_value = "en")]
    pub language: String,

    /// Directory holding the per-category data files
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory receiving the per-(model, category) result logs
    #[arg(long, default_value = "result")]
    pub result_dir: PathBuf,

    #[arg(long, default_value_t = 0.7)]
    pub temperature: f32,

    #[arg(long, default_value_t = 1.0)]
    pub top_p: f32,

    #[arg(long, default_value_t = 1200)]
    pub max_tokens: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,

    /// Total attempts per case, including the first
    #[arg(long, default_value_t = 3)]
    pub retry_limit: u32,

    /// Fixed backoff between attempts, in seconds. Provider rate-limit
    /// windows are typically a minute; 65 avoids colliding with the same one.
    #[arg(long, default_value_t = 65)]
    pub retry_delay: u64,

    /// GPUs handed to batch-native backends
    #[arg(long, default_value_t = 1)]
    pub num_gpus: u32,

    #[arg(long, default_value_t = 0.9)]
    pub gpu_memory_utilization: f32,

    /// API key for hosted providers; falls back to the environment
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}
