pub mod retry;
pub mod runner;

pub use retry::{RetryController, RetryPolicy};
pub use runner::{RunSummary, Runner};
