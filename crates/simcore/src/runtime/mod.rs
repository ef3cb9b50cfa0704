mod loop_runner;
mod metrics;

pub use loop_runner::{
    run_headless, run_headless_with_metrics, LoopConfig, Pacing, RunSummary, StopReason,
    TickDriver,
};
pub use metrics::{MetricsHandle, TickMetricsSnapshot};
