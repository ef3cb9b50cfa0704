use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::config::{DashConfig, SimConfig};
use crate::input::InputAction;
use crate::physics::Body;
use crate::{parse_variant, VariantError, VariantFamily};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillState {
    Ready,
    Active { remaining: u32 },
    Cooldown { remaining: u32 },
}

pub trait Skill: fmt::Debug {
    fn kind(&self) -> SkillKind;

    fn state(&self) -> SkillState;

    fn activation(&self) -> Option<InputAction>;

    fn activate(&mut self, body: &Body) -> bool;

    /// Returns true while the skill owns horizontal motion.
    fn update(&mut self, body: &mut Body) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkillKind {
    Dash,
}

impl SkillKind {
    pub fn build(self, config: &SimConfig) -> Box<dyn Skill> {
        match self {
            SkillKind::Dash => Box::new(DashSkill::new(&config.dash)),
        }
    }
}

impl FromStr for SkillKind {
    type Err = VariantError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        parse_variant(VariantFamily::Skill, name, &[("dash", SkillKind::Dash)])
    }
}

#[derive(Debug, Clone)]
pub struct DashSkill {
    speed: i32,
    duration_ticks: u32,
    cooldown_ticks: u32,
    state: SkillState,
}

impl DashSkill {
    pub fn new(config: &DashConfig) -> Self {
        Self {
            speed: config.speed,
            duration_ticks: config.duration_ticks.max(1),
            cooldown_ticks: config.cooldown_ticks,
            state: SkillState::Ready,
        }
    }

    fn finish_active(&mut self) {
        self.state = if self.cooldown_ticks == 0 {
            SkillState::Ready
        } else {
            SkillState::Cooldown {
                remaining: self.cooldown_ticks,
            }
        };
    }
}

impl Skill for DashSkill {
    fn kind(&self) -> SkillKind {
        SkillKind::Dash
    }

    fn state(&self) -> SkillState {
        self.state
    }

    fn activation(&self) -> Option<InputAction> {
        Some(InputAction::Dash)
    }

    fn activate(&mut self, body: &Body) -> bool {
        if self.state != SkillState::Ready || body.immobile {
            return false;
        }
        self.state = SkillState::Active {
            remaining: self.duration_ticks,
        };
        debug!(body = %body.id(), facing = ?body.facing, "dash_started");
        true
    }

    fn update(&mut self, body: &mut Body) -> bool {
        match self.state {
            SkillState::Ready => false,
            SkillState::Active { .. } if body.immobile => {
                body.vx = 0;
                self.finish_active();
                debug!(body = %body.id(), "dash_interrupted");
                false
            }
            SkillState::Active { remaining } => {
                body.vx = body.facing.horizontal_sign() * self.speed;
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.finish_active();
                } else {
                    self.state = SkillState::Active { remaining };
                }
                true
            }
            SkillState::Cooldown { remaining } => {
                let remaining = remaining.saturating_sub(1);
                self.state = if remaining == 0 {
                    SkillState::Ready
                } else {
                    SkillState::Cooldown { remaining }
                };
                false
            }
        }
    }
}
