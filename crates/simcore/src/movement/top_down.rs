use crate::config::TopDownConfig;
use crate::geometry::{approach_zero, clamp_magnitude, normalize_diagonal};
use crate::physics::{Body, CollisionSpace, Facing};

use super::{MotionSignals, MovementKind, MovementModel, TickContext};

#[derive(Debug, Clone)]
pub struct TopDownMovement {
    friction: i32,
}

impl TopDownMovement {
    pub fn new(config: &TopDownConfig) -> Self {
        Self {
            friction: config.friction,
        }
    }
}

impl MovementModel for TopDownMovement {
    fn kind(&self) -> MovementKind {
        MovementKind::TopDown
    }

    fn update(&mut self, body: &mut Body, space: &mut CollisionSpace, ctx: &TickContext<'_>) {
        if body.immobile {
            body.vx = 0;
            body.vy = 0;
            body.clamp_to(ctx.bounds);
            return;
        }
        let (ax, ay) = (body.ax, body.ay);

        let (nax, nay) = normalize_diagonal(ax, ay);
        let (vx, vy) = clamp_magnitude(
            body.vx.saturating_add(nax),
            body.vy.saturating_add(nay),
            body.max_speed,
        );
        body.vx = vx;
        body.vy = vy;
        if let Some(facing) = facing_for(ax, ay) {
            body.facing = facing;
        }

        let outcome = body.move_by(space, body.vx, body.vy);
        if outcome.blocked_x {
            body.vx = 0;
        }
        if outcome.blocked_y {
            body.vy = 0;
        }
        body.clamp_to(ctx.bounds);

        if ax == 0 && ay == 0 {
            body.vx = approach_zero(body.vx, self.friction);
            body.vy = approach_zero(body.vy, self.friction);
        }
    }

    fn on_ground(&self) -> bool {
        false
    }

    fn try_jump(&mut self, _body: &mut Body, _force: i32) -> bool {
        false
    }

    fn signals(&self, body: &Body) -> MotionSignals {
        MotionSignals {
            airborne: false,
            moving: body.vx != 0 || body.vy != 0,
        }
    }
}

fn facing_for(ax: i32, ay: i32) -> Option<Facing> {
    match (ax.signum(), ay.signum()) {
        (-1, _) => Some(Facing::Left),
        (1, _) => Some(Facing::Right),
        (_, -1) => Some(Facing::Up),
        (_, 1) => Some(Facing::Down),
        _ => None,
    }
}
