use std::env::{self, VarError};

use simcore::{load_config_from_env, LoopConfig, Pacing, SimError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::demo::DemoDriver;
use super::scenario::{AppBuildError, Scenario};

const PACING_ENV_VAR: &str = "SIMCORE_PACING";
const DEMO_SCENARIO: &str = include_str!("../../assets/demo_scenario.json");

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) demo: DemoDriver,
}

pub(crate) fn build_app() -> Result<AppWiring, AppBuildError> {
    init_tracing();
    info!("=== simcore demo startup ===");

    let sim_config = load_config_from_env().map_err(SimError::from)?;
    let scenario = Scenario::from_json_str(DEMO_SCENARIO)?;
    info!(
        seed = scenario.seed,
        max_ticks = scenario.max_ticks,
        enemy_count = scenario.enemies.len(),
        "scenario_loaded"
    );

    let config = LoopConfig {
        max_ticks: Some(scenario.max_ticks),
        pacing: resolve_pacing(),
        ..LoopConfig::default()
    };
    let demo = DemoDriver::new(sim_config, scenario)?;

    Ok(AppWiring { config, demo })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn resolve_pacing() -> Pacing {
    match env::var(PACING_ENV_VAR) {
        Ok(raw) => parse_pacing(&raw).unwrap_or_else(|| {
            warn!(var = PACING_ENV_VAR, value = %raw, "invalid_pacing_using_unthrottled");
            Pacing::Unthrottled
        }),
        Err(VarError::NotPresent) => Pacing::Unthrottled,
        Err(VarError::NotUnicode(_)) => {
            warn!(var = PACING_ENV_VAR, "invalid_pacing_using_unthrottled");
            Pacing::Unthrottled
        }
    }
}

fn parse_pacing(raw: &str) -> Option<Pacing> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "realtime" | "real_time" => Some(Pacing::RealTime),
        "unthrottled" | "fast" => Some(Pacing::Unthrottled),
        _ => None,
    }
}
