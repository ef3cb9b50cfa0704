use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::world::TickReport;

use super::metrics::MetricsAccumulator;
use super::MetricsHandle;

/// Something that advances the simulation by one fixed tick.
pub trait TickDriver {
    fn tick(&mut self) -> TickReport;

    fn is_finished(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Pacing {
    /// Ticks follow wall-clock time through a fixed-step accumulator.
    #[default]
    RealTime,
    /// Ticks run back to back.
    Unthrottled,
}

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    /// Without a limit the loop only stops once the driver is finished.
    pub max_ticks: Option<u64>,
    pub pacing: Pacing,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            max_ticks: None,
            pacing: Pacing::RealTime,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Finished,
    TickLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub stop_reason: StopReason,
    pub dropped_backlog: Duration,
}

pub fn run_headless(config: &LoopConfig, driver: &mut dyn TickDriver) -> RunSummary {
    run_headless_with_metrics(config, driver, &MetricsHandle::default())
}

pub fn run_headless_with_metrics(
    config: &LoopConfig,
    driver: &mut dyn TickDriver,
    metrics_handle: &MetricsHandle,
) -> RunSummary {
    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        max_ticks = ?config.max_ticks,
        pacing = ?config.pacing,
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval, last_frame_instant);
    let mut ticks = 0u64;
    let mut dropped_total = Duration::ZERO;

    let stop_reason = loop {
        if let Some(reason) = check_stop(driver, ticks, config.max_ticks) {
            break reason;
        }

        let ticks_to_run = match config.pacing {
            Pacing::Unthrottled => 1,
            Pacing::RealTime => {
                let now = Instant::now();
                let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                last_frame_instant = now;

                let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                accumulator = accumulator.saturating_add(clamped_frame_dt);

                let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                accumulator = step_plan.remaining_accumulator;
                if step_plan.dropped_backlog > Duration::ZERO {
                    dropped_total = dropped_total.saturating_add(step_plan.dropped_backlog);
                    warn!(
                        dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                        max_ticks_per_frame, "sim_clamp_triggered"
                    );
                }
                if step_plan.ticks_to_run == 0 {
                    thread::sleep(fixed_dt.saturating_sub(accumulator));
                    continue;
                }
                step_plan.ticks_to_run
            }
        };

        for _ in 0..ticks_to_run {
            if check_stop(driver, ticks, config.max_ticks).is_some() {
                break;
            }
            let report = driver.tick();
            ticks = ticks.saturating_add(1);
            metrics_accumulator.record_tick(report.stats);
        }

        if let Some(snapshot) = metrics_accumulator.maybe_snapshot(Instant::now()) {
            metrics_handle.publish(snapshot);
            info!(
                tps = snapshot.tps,
                collision_checks = snapshot.collision_checks,
                blocked_moves = snapshot.blocked_moves,
                ticks,
                "loop_metrics"
            );
        }
    };

    info!(ticks, stop_reason = ?stop_reason, "loop_stopped");
    RunSummary {
        ticks,
        stop_reason,
        dropped_backlog: dropped_total,
    }
}

fn check_stop(driver: &dyn TickDriver, ticks: u64, max_ticks: Option<u64>) -> Option<StopReason> {
    if driver.is_finished() {
        return Some(StopReason::Finished);
    }
    if max_ticks.is_some_and(|limit| ticks >= limit) {
        return Some(StopReason::TickLimit);
    }
    None
}

#[derive(Debug, Clone, Copy)]
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

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::ContactStats;

    #[derive(Debug, Default)]
    struct CountingDriver {
        ticks: u64,
        finish_at: Option<u64>,
    }

    impl TickDriver for CountingDriver {
        fn tick(&mut self) -> TickReport {
            self.ticks += 1;
            TickReport {
                tick: self.ticks,
                stats: ContactStats {
                    pair_checks: 3,
                    ..ContactStats::default()
                },
                ..TickReport::default()
            }
        }

        fn is_finished(&self) -> bool {
            self.finish_at.is_some_and(|limit| self.ticks >= limit)
        }
    }

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        let raw_frame_dt = Duration::from_millis(600);

        assert_eq!(
            clamp_frame_delta(raw_frame_dt, max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(48), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn zero_durations_fall_back() {
        let fallback = Duration::from_secs(1);
        assert_eq!(normalize_non_zero_duration(Duration::ZERO, fallback), fallback);
        assert_eq!(
            normalize_non_zero_duration(Duration::from_millis(5), fallback),
            Duration::from_millis(5)
        );
    }

    #[test]
    fn unthrottled_run_stops_at_tick_limit() {
        let config = LoopConfig {
            max_ticks: Some(25),
            pacing: Pacing::Unthrottled,
            ..LoopConfig::default()
        };
        let mut driver = CountingDriver::default();

        let summary = run_headless(&config, &mut driver);

        assert_eq!(summary.ticks, 25);
        assert_eq!(summary.stop_reason, StopReason::TickLimit);
        assert_eq!(driver.ticks, 25);
    }

    #[test]
    fn finished_driver_stops_before_limit() {
        let config = LoopConfig {
            max_ticks: Some(100),
            pacing: Pacing::Unthrottled,
            ..LoopConfig::default()
        };
        let mut driver = CountingDriver {
            ticks: 0,
            finish_at: Some(7),
        };

        let summary = run_headless(&config, &mut driver);

        assert_eq!(summary.ticks, 7);
        assert_eq!(summary.stop_reason, StopReason::Finished);
    }

    #[test]
    fn real_time_run_honors_tick_limit() {
        let config = LoopConfig {
            target_tps: 1000,
            max_ticks: Some(5),
            ..LoopConfig::default()
        };
        let mut driver = CountingDriver::default();

        let summary = run_headless(&config, &mut driver);

        assert_eq!(summary.ticks, 5);
        assert_eq!(summary.stop_reason, StopReason::TickLimit);
    }
}
