use std::fmt;

use thiserror::Error;

pub mod actor;
pub mod config;
pub mod geometry;
pub mod input;
pub mod level;
pub mod movement;
pub mod physics;
pub mod runtime;
pub mod world;

pub use actor::{
    Actor, ActorState, ActorStateMachine, Direction, IntentKind, IntentMachine, MovementIntent,
    PatrolConfig, PatrolError, PatrolPhase, PatrolRoute,
};
pub use config::{
    load_config_from_env, ActorConfig, ConfigError, DashConfig, PlatformConfig, SimConfig,
    TopDownConfig, CONFIG_ENV_VAR,
};
pub use geometry::{LevelBounds, PixelRect, Rect, Shape, ShapeError, UNIT};
pub use input::{InputAction, InputCollector, InputSnapshot, InputSource};
pub use level::{
    install_level, ExitSignal, InstalledLevel, LevelError, LevelLayout, ObstacleDef, RectDef,
    EXIT_BODY_ID,
};
pub use movement::{
    DashSkill, MotionSignals, MovementKind, MovementModel, PlatformMovement, Skill, SkillKind,
    SkillState, TickContext, TopDownMovement,
};
pub use physics::{
    Body, BodyId, CollisionEvent, CollisionSpace, Contact, ContactKind, ContactStats, Facing,
    MoveOutcome, TouchHandler,
};
pub use runtime::{
    run_headless, run_headless_with_metrics, LoopConfig, MetricsHandle, Pacing, RunSummary,
    StopReason, TickDriver, TickMetricsSnapshot,
};
pub use world::{TickReport, World};

/// Factory families that resolve a variant from its configured name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantFamily {
    MovementModel,
    ActorState,
    MovementIntent,
    Skill,
}

impl fmt::Display for VariantFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VariantFamily::MovementModel => "movement model",
            VariantFamily::ActorState => "actor state",
            VariantFamily::MovementIntent => "movement intent",
            VariantFamily::Skill => "skill",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariantError {
    #[error("unknown {family} variant '{name}'")]
    UnknownVariant { family: VariantFamily, name: String },
}

impl VariantError {
    pub(crate) fn unknown(family: VariantFamily, name: &str) -> Self {
        tracing::warn!(family = %family, name, "unknown_variant");
        VariantError::UnknownVariant {
            family,
            name: name.to_string(),
        }
    }
}

/// Resolves a variant by name, trimming surrounding whitespace and ignoring
/// ASCII case.
pub(crate) fn parse_variant<T: Copy>(
    family: VariantFamily,
    name: &str,
    table: &[(&str, T)],
) -> Result<T, VariantError> {
    let trimmed = name.trim();
    table
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(trimmed))
        .map(|(_, value)| *value)
        .ok_or_else(|| VariantError::unknown(family, trimmed))
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Variant(#[from] VariantError),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Patrol(#[from] PatrolError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error("no actor is bound to body '{0}'")]
    UnknownActor(BodyId),
}
