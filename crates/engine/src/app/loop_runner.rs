use std::env;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::graphics::RenderTarget;

use super::metrics::{MetricsAccumulator, MetricsHandle};
use super::stage::Stage;

pub const FRAME_LIMIT_ENV_VAR: &str = "STAGE_FRAME_LIMIT";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    /// Wall time each headless frame pretends to take.
    pub frame_delta: Duration,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub frame_limit: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            frame_delta: Duration::from_secs_f64(1.0 / 60.0),
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            frame_limit: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopSummary {
    pub frames: u32,
    pub ticks: u64,
    pub simulated: Duration,
    pub dropped_backlog: Duration,
}

/// Drives `stage` without a window: each frame adds `frame_delta` to a
/// fixed-timestep accumulator, runs the planned ticks, then draws once.
pub fn run_headless(
    stage: &mut Stage,
    config: &LoopConfig,
    target: &mut dyn RenderTarget,
    metrics_handle: &MetricsHandle,
) -> LoopSummary {
    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let frame_delta = clamp_frame_delta(config.frame_delta, max_frame_delta);
    let frame_limit = resolve_frame_limit(config.frame_limit);

    info!(
        target_tps,
        frame_delta_ms = frame_delta.as_secs_f32() * 1000.0,
        max_ticks_per_frame,
        frame_limit,
        actor_count = stage.actors.len(),
        "loop_config"
    );

    let mut summary = LoopSummary::default();
    let mut accumulator = Duration::ZERO;
    let mut metrics = MetricsAccumulator::new(metrics_log_interval, Instant::now());

    for _ in 0..frame_limit {
        let frame_start = Instant::now();
        accumulator = accumulator.saturating_add(frame_delta);

        let plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
        for _ in 0..plan.ticks_to_run {
            stage.tick(fixed_dt);
        }
        accumulator = plan.remaining_accumulator;
        summary.ticks = summary.ticks.saturating_add(u64::from(plan.ticks_to_run));
        summary.simulated = summary
            .simulated
            .saturating_add(fixed_dt.saturating_mul(plan.ticks_to_run));
        metrics.record_ticks(plan.ticks_to_run);

        if plan.dropped_backlog > Duration::ZERO {
            summary.dropped_backlog = summary.dropped_backlog.saturating_add(plan.dropped_backlog);
            metrics.record_dropped(dropped_ticks(plan.dropped_backlog, fixed_dt));
            warn!(
                dropped_backlog_ms = plan.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame, "sim_clamp_triggered"
            );
        }

        stage.draw(target);
        summary.frames += 1;

        let now = Instant::now();
        metrics.record_frame(now.saturating_duration_since(frame_start));
        if let Some(snapshot) = metrics.maybe_snapshot(now, stage.actors.len()) {
            metrics_handle.publish(snapshot);
            info!(
                fps = snapshot.fps,
                tps = snapshot.tps,
                frame_time_ms = snapshot.frame_time_ms,
                actor_count = snapshot.actor_count,
                "loop_metrics"
            );
        }
    }

    info!(
        frames = summary.frames,
        ticks = summary.ticks,
        simulated_ms = summary.simulated.as_millis() as u64,
        actor_count = stage.actors.len(),
        "headless_run_finished"
    );
    summary
}

#[derive(Debug, PartialEq, Eq)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;
    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    // Whatever is still a full step behind after the cap is dropped.
    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn dropped_ticks(backlog: Duration, fixed_dt: Duration) -> u32 {
    let ticks = backlog.as_nanos() / fixed_dt.as_nanos().max(1);
    u32::try_from(ticks).unwrap_or(u32::MAX)
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn resolve_frame_limit(config_frame_limit: u32) -> u32 {
    match env::var(FRAME_LIMIT_ENV_VAR) {
        Ok(value) => parse_frame_limit(&value).unwrap_or_else(|| {
            warn!(
                env_var = FRAME_LIMIT_ENV_VAR,
                value = value.as_str(),
                "invalid frame limit env var value; falling back to config"
            );
            config_frame_limit
        }),
        Err(env::VarError::NotPresent) => config_frame_limit,
        Err(err) => {
            warn!(
                env_var = FRAME_LIMIT_ENV_VAR,
                error = %err,
                "unable to read frame limit env var; falling back to config"
            );
            config_frame_limit
        }
    }
}

fn parse_frame_limit(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}
