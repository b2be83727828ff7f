use std::process::ExitCode;

use stage_engine::{run_headless, DrawList, MetricsHandle};
use tracing::info;

use super::actors::Player;
use super::bootstrap::AppWiring;

pub(crate) fn run(mut app: AppWiring) -> ExitCode {
    let metrics = MetricsHandle::default();
    let mut target = DrawList::new();
    let summary = run_headless(&mut app.stage, &app.config, &mut target, &metrics);

    let score = app
        .stage
        .actors
        .get_actor_by_type::<Player>()
        .map_or(0, |player| player.score);
    info!(
        frames = summary.frames,
        ticks = summary.ticks,
        score,
        actor_count = app.stage.actors.len(),
        last_frame_draw_calls = target.len(),
        "shutdown"
    );
    ExitCode::SUCCESS
}
