use std::fmt;
use std::str::FromStr;

use crate::config::SimConfig;
use crate::geometry::LevelBounds;
use crate::input::InputSource;
use crate::physics::{Body, CollisionSpace};
use crate::{parse_variant, VariantError, VariantFamily};

mod platform;
mod skill;
mod top_down;

pub use platform::PlatformMovement;
pub use skill::{DashSkill, Skill, SkillKind, SkillState};
pub use top_down::TopDownMovement;

#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    pub input: &'a dyn InputSource,
    pub bounds: LevelBounds,
}

impl fmt::Debug for TickContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickContext")
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionSignals {
    pub airborne: bool,
    pub moving: bool,
}

pub trait MovementModel: fmt::Debug {
    fn kind(&self) -> MovementKind;

    /// `body` must not be registered in `space` while this runs.
    fn update(&mut self, body: &mut Body, space: &mut CollisionSpace, ctx: &TickContext<'_>);

    fn on_ground(&self) -> bool;

    fn try_jump(&mut self, body: &mut Body, force: i32) -> bool;

    fn signals(&self, body: &Body) -> MotionSignals;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementKind {
    TopDown,
    Platform,
}

impl MovementKind {
    pub fn build(self, config: &SimConfig) -> Box<dyn MovementModel> {
        match self {
            MovementKind::TopDown => Box::new(TopDownMovement::new(&config.top_down)),
            MovementKind::Platform => Box::new(PlatformMovement::new(&config.platform)),
        }
    }
}

impl FromStr for MovementKind {
    type Err = VariantError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        parse_variant(
            VariantFamily::MovementModel,
            name,
            &[
                ("top_down", MovementKind::TopDown),
                ("topdown", MovementKind::TopDown),
                ("platform", MovementKind::Platform),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_builds_requested_model() {
        let config = SimConfig::default();
        for (name, kind) in [
            ("top_down", MovementKind::TopDown),
            ("Platform", MovementKind::Platform),
        ] {
            let model = name.parse::<MovementKind>().expect("known kind").build(&config);
            assert_eq!(model.kind(), kind);
            assert!(!model.on_ground());
        }
    }

    #[test]
    fn factory_rejects_unknown_names() {
        assert!(matches!(
            "hover".parse::<MovementKind>(),
            Err(VariantError::UnknownVariant {
                family: VariantFamily::MovementModel,
                ..
            })
        ));
    }
}
