use serde::Deserialize;
use simcore::{
    Body, IntentKind, IntentMachine, LevelLayout, MovementKind, MovementModel, PatrolConfig,
    PlatformMovement, Rect, SimConfig, SimError, SkillKind,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum ScenarioError {
    #[error("parse scenario json at {path}: {message}")]
    Parse { path: String, message: String },
    #[error("actor '{actor}' uses skills but its movement model is not platform")]
    SkillsNeedPlatform { actor: String },
}

/// Everything the demo needs to set up a run.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    pub(crate) seed: u64,
    pub(crate) max_ticks: u64,
    pub(crate) level: LevelLayout,
    pub(crate) player: ActorDef,
    #[serde(default)]
    pub(crate) enemies: Vec<ActorDef>,
    #[serde(default)]
    pub(crate) script: ScriptDef,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ActorDef {
    pub(crate) id: String,
    pub(crate) x: i32,
    pub(crate) y: i32,
    #[serde(default = "default_actor_size")]
    pub(crate) w: i32,
    #[serde(default = "default_actor_size")]
    pub(crate) h: i32,
    pub(crate) movement: String,
    pub(crate) intent: String,
    #[serde(default)]
    pub(crate) target: Option<String>,
    #[serde(default)]
    pub(crate) patrol: Option<PatrolConfig>,
    pub(crate) speed: i32,
    pub(crate) max_speed: i32,
    #[serde(default = "default_health")]
    pub(crate) health: i32,
    #[serde(default)]
    pub(crate) contact_damage: i32,
    #[serde(default)]
    pub(crate) skills: Vec<String>,
}

/// Scripted player input, keyed by tick number.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScriptDef {
    #[serde(default)]
    pub(crate) hold_right: bool,
    #[serde(default)]
    pub(crate) hold_left: bool,
    #[serde(default)]
    pub(crate) jump_every: Option<u64>,
    #[serde(default)]
    pub(crate) jump_hold_ticks: u64,
    #[serde(default)]
    pub(crate) dash_ticks: Vec<u64>,
}

fn default_actor_size() -> i32 {
    16
}

fn default_health() -> i32 {
    1
}

impl Scenario {
    pub(crate) fn from_json_str(raw: &str) -> Result<Self, ScenarioError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let path = error.path().to_string();
            let message = error.into_inner().to_string();
            ScenarioError::Parse { path, message }
        })
    }
}

/// Pieces needed to spawn one actor into a world.
pub(crate) struct ActorParts {
    pub(crate) body: Body,
    pub(crate) movement: Box<dyn MovementModel>,
    pub(crate) intent: IntentMachine,
}

impl ActorDef {
    pub(crate) fn build(&self, config: &SimConfig) -> Result<ActorParts, AppBuildError> {
        let shape = Rect::from_pixels(self.x, self.y, self.w, self.h).map_err(SimError::from)?;
        let body = Body::new(self.id.as_str(), shape)
            .with_speed(self.speed, self.max_speed)
            .with_health(self.health)
            .with_contact_damage(self.contact_damage);

        let kind: MovementKind = self.movement.parse().map_err(SimError::from)?;
        let movement = if self.skills.is_empty() {
            kind.build(config)
        } else {
            if kind != MovementKind::Platform {
                return Err(ScenarioError::SkillsNeedPlatform {
                    actor: self.id.clone(),
                }
                .into());
            }
            let mut platform = PlatformMovement::new(&config.platform);
            for name in &self.skills {
                let skill: SkillKind = name.parse().map_err(SimError::from)?;
                platform.add_skill(skill.build(config));
            }
            Box::new(platform)
        };

        let intent_kind: IntentKind = self.intent.parse().map_err(SimError::from)?;
        let intent = intent_kind
            .build(self.patrol.as_ref())
            .map_err(SimError::from)?;
        let mut intent = IntentMachine::new(intent);
        if let Some(target) = &self.target {
            intent = intent.with_target(target.as_str());
        }

        Ok(ActorParts {
            body,
            movement,
            intent,
        })
    }
}

#[derive(Debug, Error)]
pub(crate) enum AppBuildError {
    #[error(transparent)]
    Sim(#[from] SimError),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}
