mod clock;
mod loop_runner;
mod metrics;
mod stage;

pub use clock::GameTime;
pub use loop_runner::{run_headless, LoopConfig, LoopSummary, FRAME_LIMIT_ENV_VAR};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use stage::Stage;
