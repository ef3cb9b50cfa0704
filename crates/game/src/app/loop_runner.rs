use std::process::ExitCode;

use simcore::{run_headless_with_metrics, MetricsHandle};
use tracing::info;

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring { config, mut demo } = app;
    let metrics = MetricsHandle::default();

    let summary = run_headless_with_metrics(&config, &mut demo, &metrics);

    let last = metrics.snapshot();
    info!(
        ticks = summary.ticks,
        world_tick = demo.world().tick(),
        stop_reason = ?summary.stop_reason,
        dropped_backlog_ms = summary.dropped_backlog.as_millis() as u64,
        reached_exit = demo.player_reached_exit(),
        player_dead = demo.player_dead(),
        hurt_events = demo.hurt_events(),
        last_tps = last.tps,
        "demo_finished"
    );

    ExitCode::SUCCESS
}
