use std::str::FromStr;

use tracing::{debug, info, trace};

use crate::config::ActorConfig;
use crate::movement::MotionSignals;
use crate::physics::Body;
use crate::{parse_variant, VariantError, VariantFamily};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ActorState {
    #[default]
    Idle,
    Walking,
    Falling,
    Hurt,
}

impl FromStr for ActorState {
    type Err = VariantError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        parse_variant(
            VariantFamily::ActorState,
            name,
            &[
                ("idle", ActorState::Idle),
                ("walking", ActorState::Walking),
                ("falling", ActorState::Falling),
                ("hurt", ActorState::Hurt),
            ],
        )
    }
}

/// Visual and physical state of one actor.
#[derive(Debug, Clone)]
pub struct ActorStateMachine {
    state: ActorState,
    hurt_remaining: u32,
    recovery_ticks: u32,
}

impl ActorStateMachine {
    pub fn new(config: &ActorConfig) -> Self {
        Self {
            state: ActorState::Idle,
            hurt_remaining: 0,
            recovery_ticks: config.hurt_recovery_ticks.max(1),
        }
    }

    pub fn state(&self) -> ActorState {
        self.state
    }

    pub fn hurt_remaining(&self) -> u32 {
        self.hurt_remaining
    }

    /// Re-evaluates the state once per tick. Hurt only ends when its
    /// recovery timer runs out, which also lifts immobility and
    /// invulnerability.
    pub fn update(&mut self, body: &mut Body, signals: MotionSignals) -> ActorState {
        let next = if self.state == ActorState::Hurt {
            self.hurt_remaining = self.hurt_remaining.saturating_sub(1);
            if self.hurt_remaining > 0 {
                return self.state;
            }
            body.immobile = false;
            body.invulnerable = false;
            info!(body = %body.id(), health = body.health(), "actor_recovered");
            ActorState::Idle
        } else if signals.airborne {
            ActorState::Falling
        } else if signals.moving {
            ActorState::Walking
        } else {
            ActorState::Idle
        };

        if next != self.state {
            debug!(body = %body.id(), from = ?self.state, to = ?next, "actor_state_changed");
            self.state = next;
        }
        self.state
    }

    /// Applies damage and enters Hurt. Ignored while invulnerable.
    pub fn hurt(&mut self, body: &mut Body, damage: i32) -> bool {
        if body.invulnerable {
            trace!(body = %body.id(), damage, "hurt_ignored");
            return false;
        }
        let health = body.apply_damage(damage);
        body.immobile = true;
        body.invulnerable = true;
        self.state = ActorState::Hurt;
        self.hurt_remaining = self.recovery_ticks;
        info!(body = %body.id(), damage, health, "actor_hurt");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn actor_body() -> Body {
        Body::new("hero", Rect::from_pixels(0, 0, 16, 16).expect("rect")).with_health(5)
    }

    fn machine(recovery: u32) -> ActorStateMachine {
        ActorStateMachine::new(&ActorConfig {
            hurt_recovery_ticks: recovery,
        })
    }

    #[test]
    fn airborne_beats_moving_beats_idle() {
        let mut body = actor_body();
        let mut states = machine(30);

        let falling = states.update(
            &mut body,
            MotionSignals {
                airborne: true,
                moving: true,
            },
        );
        assert_eq!(falling, ActorState::Falling);

        let walking = states.update(
            &mut body,
            MotionSignals {
                airborne: false,
                moving: true,
            },
        );
        assert_eq!(walking, ActorState::Walking);

        assert_eq!(
            states.update(&mut body, MotionSignals::default()),
            ActorState::Idle
        );
    }

    #[test]
    fn hurt_then_invulnerable_then_recovered() {
        let mut body = actor_body();
        let mut states = machine(30);

        assert!(states.hurt(&mut body, 2));
        assert_eq!(body.health(), 3);
        assert_eq!(states.state(), ActorState::Hurt);
        assert!(body.invulnerable);
        assert!(body.immobile);

        assert!(!states.hurt(&mut body, 2));
        assert_eq!(body.health(), 3);

        for _ in 0..29 {
            let moving = MotionSignals {
                airborne: false,
                moving: true,
            };
            assert_eq!(states.update(&mut body, moving), ActorState::Hurt);
        }
        assert_eq!(
            states.update(&mut body, MotionSignals::default()),
            ActorState::Idle
        );
        assert!(!body.invulnerable);
        assert!(!body.immobile);

        assert!(states.hurt(&mut body, 2));
        assert_eq!(body.health(), 1);
    }

    #[test]
    fn lethal_damage_clamps_to_zero() {
        let mut body = actor_body();
        let mut states = machine(1);

        states.hurt(&mut body, 9);

        assert_eq!(body.health(), 0);
        assert!(body.is_dead());
    }

    #[test]
    fn state_names_resolve() {
        assert_eq!("falling".parse::<ActorState>(), Ok(ActorState::Falling));
        assert!("sleeping".parse::<ActorState>().is_err());
    }
}
