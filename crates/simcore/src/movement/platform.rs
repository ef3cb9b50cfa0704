use tracing::{debug, trace};

use crate::config::PlatformConfig;
use crate::geometry::{approach_zero, Axis};
use crate::input::{InputAction, InputSource};
use crate::physics::{Body, CollisionSpace, Facing};

use super::{MotionSignals, MovementKind, MovementModel, Skill, TickContext};

#[derive(Debug, Clone, Copy)]
struct BufferedJump {
    ticks_left: u32,
    force: i32,
}

#[derive(Debug)]
pub struct PlatformMovement {
    params: PlatformConfig,
    on_ground: bool,
    coyote_counter: u32,
    buffered_jump: Option<BufferedJump>,
    jump_was_held: bool,
    skills: Vec<Box<dyn Skill>>,
}

impl PlatformMovement {
    pub fn new(config: &PlatformConfig) -> Self {
        Self {
            params: config.clone(),
            on_ground: false,
            coyote_counter: 0,
            buffered_jump: None,
            jump_was_held: false,
            skills: Vec::new(),
        }
    }

    pub fn with_skill(mut self, skill: Box<dyn Skill>) -> Self {
        self.skills.push(skill);
        self
    }

    pub fn add_skill(&mut self, skill: Box<dyn Skill>) {
        self.skills.push(skill);
    }

    pub fn skills(&self) -> &[Box<dyn Skill>] {
        &self.skills
    }

    pub fn coyote_counter(&self) -> u32 {
        self.coyote_counter
    }

    pub fn jump_buffer_counter(&self) -> u32 {
        self.buffered_jump.map_or(0, |jump| jump.ticks_left)
    }

    // A landing up to `jump_buffer_frames` ticks after the request still fires.
    fn age_buffered_jump(&mut self) {
        self.buffered_jump = self.buffered_jump.and_then(|jump| {
            jump.ticks_left
                .checked_sub(1)
                .map(|ticks_left| BufferedJump { ticks_left, ..jump })
        });
    }

    fn run_skills(&mut self, body: &mut Body, input: &dyn InputSource) -> bool {
        let mut overrides_horizontal = false;
        for skill in &mut self.skills {
            if let Some(action) = skill.activation() {
                if input.just_pressed(action) {
                    skill.activate(body);
                }
            }
            overrides_horizontal |= skill.update(body);
        }
        overrides_horizontal
    }

    fn integrate_horizontal(&self, body: &mut Body) {
        if body.immobile {
            body.vx = 0;
            return;
        }
        let ax = body.ax;
        match ax.signum() {
            -1 => body.facing = Facing::Left,
            1 => body.facing = Facing::Right,
            _ => {}
        }

        let inertia = self.params.horizontal_inertia;
        if inertia <= 0.0 {
            body.vx = ax;
            return;
        }

        if ax != 0 {
            let control = if self.on_ground {
                1.0
            } else {
                self.params.air_control
            };
            let step = (ax as f32 * control / (1.0 + inertia)) as i32;
            let limit = if body.max_speed > 0 {
                body.max_speed
            } else {
                ax.abs()
            };
            body.vx = body.vx.saturating_add(step).clamp(-limit, limit);
        } else {
            let friction = if self.on_ground {
                self.params.ground_friction
            } else {
                (self.params.ground_friction as f32 * self.params.air_friction).round() as i32
            };
            body.vx = approach_zero(body.vx, friction);
        }
    }

    fn launch(&mut self, body: &mut Body, force: i32) {
        body.vy = -force;
        self.on_ground = false;
        self.coyote_counter = 0;
        self.buffered_jump = None;
    }

    fn apply_gravity(&self, body: &mut Body) {
        let gravity = if body.vy < 0 {
            self.params.gravity_up
        } else {
            self.params.gravity_down
        };
        body.vy = body
            .vy
            .saturating_add(gravity)
            .min(self.params.max_fall_speed);
    }

    fn move_vertical(&mut self, body: &mut Body, space: &mut CollisionSpace) {
        let dy = body.vy;
        let was_airborne = !self.on_ground;
        let contact = body.move_axis(space, Axis::Y, dy);

        if contact.blocking && dy > 0 {
            // Creep down until flush with the surface.
            for _ in 1..dy {
                body.translate(0, 1);
                if space.is_obstructed(body) {
                    body.translate(0, -1);
                    break;
                }
            }
            self.on_ground = true;
            body.vy = self.params.ground_stick_velocity;

            if was_airborne {
                trace!(body = %body.id(), "landed");
                if let Some(BufferedJump { force, .. }) = self.buffered_jump {
                    self.launch(body, force);
                    debug!(body = %body.id(), force, "buffered_jump");
                }
            }
        } else if contact.blocking {
            body.vy = 0;
        } else if dy != 0 {
            self.on_ground = false;
        }
    }
}

impl MovementModel for PlatformMovement {
    fn kind(&self) -> MovementKind {
        MovementKind::Platform
    }

    fn update(&mut self, body: &mut Body, space: &mut CollisionSpace, ctx: &TickContext<'_>) {
        let input = ctx.input;

        if self.on_ground {
            self.coyote_counter = self.params.coyote_time_frames;
        } else {
            self.coyote_counter = self.coyote_counter.saturating_sub(1);
            self.age_buffered_jump();
        }

        if !self.run_skills(body, input) {
            self.integrate_horizontal(body);
        }

        if input.just_pressed(InputAction::Jump) {
            let force = self.params.jump_force;
            self.try_jump(body, force);
        }

        let jump_held = input.is_held(InputAction::Jump);
        if self.jump_was_held && !jump_held && body.vy < 0 {
            body.vy = (body.vy as f32 * self.params.jump_cut) as i32;
        }
        self.jump_was_held = jump_held;

        self.apply_gravity(body);

        if body.move_axis(space, Axis::X, body.vx).blocking {
            body.vx = 0;
        }
        self.move_vertical(body, space);
        body.clamp_to(ctx.bounds);
    }

    fn on_ground(&self) -> bool {
        self.on_ground
    }

    fn try_jump(&mut self, body: &mut Body, force: i32) -> bool {
        if body.immobile {
            return false;
        }
        if self.on_ground || self.coyote_counter > 0 {
            self.launch(body, force);
            trace!(body = %body.id(), force, "jumped");
            return true;
        }
        let ticks_left = self.params.jump_buffer_frames;
        self.buffered_jump = (ticks_left > 0).then_some(BufferedJump { ticks_left, force });
        false
    }

    fn signals(&self, body: &Body) -> MotionSignals {
        MotionSignals {
            airborne: !self.on_ground,
            moving: body.vx != 0,
        }
    }
}
