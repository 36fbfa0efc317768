//! Exit codes are part of the public contract: orchestration scripts rerun
//! models based on them.

pub const SUCCESS: i32 = 0;
/// At least one model's run aborted (adapter or storage failure); the run is
/// resumable.
pub const RUN_FAILED: i32 = 1;
/// Bad invocation or configuration; nothing was started.
pub const CONFIG_ERROR: i32 = 2;
