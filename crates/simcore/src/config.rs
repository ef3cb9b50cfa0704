use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Optional path to a JSON file overriding the built-in tunables.
pub const CONFIG_ENV_VAR: &str = "SIMCORE_CONFIG";

/// Physics and behavior tunables. Speeds are subunits per tick, gravity is
/// subunits per tick squared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub top_down: TopDownConfig,
    pub platform: PlatformConfig,
    pub dash: DashConfig,
    pub actor: ActorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TopDownConfig {
    pub friction: i32,
}

impl Default for TopDownConfig {
    fn default() -> Self {
        Self { friction: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlatformConfig {
    pub gravity_up: i32,
    pub gravity_down: i32,
    pub max_fall_speed: i32,
    pub jump_force: i32,
    /// Multiplier applied to upward velocity when jump is released early.
    pub jump_cut: f32,
    pub coyote_time_frames: u32,
    pub jump_buffer_frames: u32,
    /// Zero means horizontal velocity is assigned directly from intent.
    pub horizontal_inertia: f32,
    pub air_control: f32,
    pub air_friction: f32,
    pub ground_friction: i32,
    pub ground_stick_velocity: i32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            gravity_up: 6,
            gravity_down: 10,
            max_fall_speed: 96,
            jump_force: 80,
            jump_cut: 0.5,
            coyote_time_frames: 6,
            jump_buffer_frames: 8,
            horizontal_inertia: 0.0,
            air_control: 0.6,
            air_friction: 0.5,
            ground_friction: 4,
            ground_stick_velocity: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashConfig {
    pub speed: i32,
    pub duration_ticks: u32,
    pub cooldown_ticks: u32,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            speed: 64,
            duration_ticks: 10,
            cooldown_ticks: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActorConfig {
    pub hurt_recovery_ticks: u32,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            hurt_recovery_ticks: 30,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config json at {path}: {message}")]
    Parse { path: String, message: String },
    #[error("invalid config value {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl SimConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let config: SimConfig = serde_path_to_error::deserialize(&mut deserializer).map_err(
            |error| {
                let path = error.path().to_string();
                let message = error.into_inner().to_string();
                ConfigError::Parse { path, message }
            },
        )?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let platform = &self.platform;
        non_negative("top_down.friction", self.top_down.friction)?;
        non_negative("platform.gravity_up", platform.gravity_up)?;
        non_negative("platform.gravity_down", platform.gravity_down)?;
        non_negative("platform.jump_force", platform.jump_force)?;
        non_negative("platform.ground_friction", platform.ground_friction)?;
        non_negative(
            "platform.ground_stick_velocity",
            platform.ground_stick_velocity,
        )?;
        if platform.max_fall_speed <= 0 {
            return Err(invalid("platform.max_fall_speed", "must be positive"));
        }
        unit_interval("platform.jump_cut", platform.jump_cut)?;
        unit_interval("platform.air_control", platform.air_control)?;
        unit_interval("platform.air_friction", platform.air_friction)?;
        if !platform.horizontal_inertia.is_finite() || platform.horizontal_inertia < 0.0 {
            return Err(invalid(
                "platform.horizontal_inertia",
                "must be a finite value >= 0",
            ));
        }
        non_negative("dash.speed", self.dash.speed)?;
        if self.dash.duration_ticks == 0 {
            return Err(invalid("dash.duration_ticks", "must be at least 1"));
        }
        if self.actor.hurt_recovery_ticks == 0 {
            return Err(invalid("actor.hurt_recovery_ticks", "must be at least 1"));
        }
        Ok(())
    }
}

/// Loads the file named by [`CONFIG_ENV_VAR`], or the defaults when unset.
pub fn load_config_from_env() -> Result<SimConfig, ConfigError> {
    match env::var(CONFIG_ENV_VAR) {
        Ok(path) => {
            let config = SimConfig::from_path(Path::new(&path))?;
            info!(path = path.as_str(), "config_loaded");
            Ok(config)
        }
        Err(env::VarError::NotPresent) => {
            info!("config_defaults");
            Ok(SimConfig::default())
        }
        Err(source) => Err(ConfigError::EnvVar {
            var: CONFIG_ENV_VAR,
            source,
        }),
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn non_negative(field: &'static str, value: i32) -> Result<(), ConfigError> {
    if value < 0 {
        return Err(invalid(field, format!("expected >= 0, got {value}")));
    }
    Ok(())
}

fn unit_interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(field, format!("expected 0.0..=1.0, got {value}")));
    }
    Ok(())
}
