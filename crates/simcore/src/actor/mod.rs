mod intent;
mod state;

pub use intent::{
    Direction, IntentKind, IntentMachine, MovementIntent, PatrolConfig, PatrolError, PatrolPhase,
    PatrolRoute,
};
pub use state::{ActorState, ActorStateMachine};

use rand::RngCore;

use crate::config::SimConfig;
use crate::input::InputSource;
use crate::movement::{MovementModel, TickContext};
use crate::physics::{Body, BodyId, CollisionSpace};

/// A body ID composed with its movement model and both state machines.
#[derive(Debug)]
pub struct Actor {
    body_id: BodyId,
    movement: Box<dyn MovementModel>,
    state: ActorStateMachine,
    intent: IntentMachine,
}

impl Actor {
    pub fn new(
        body_id: impl Into<BodyId>,
        movement: Box<dyn MovementModel>,
        intent: IntentMachine,
        config: &SimConfig,
    ) -> Self {
        Self {
            body_id: body_id.into(),
            movement,
            state: ActorStateMachine::new(&config.actor),
            intent,
        }
    }

    pub fn body_id(&self) -> &BodyId {
        &self.body_id
    }

    pub fn movement(&self) -> &dyn MovementModel {
        self.movement.as_ref()
    }

    pub fn state(&self) -> ActorState {
        self.state.state()
    }

    pub fn intent(&self) -> &IntentMachine {
        &self.intent
    }

    pub fn reads_input(&self) -> bool {
        self.intent.reads_input()
    }

    /// Intent first, then integration. `body` must be detached from `space`.
    pub fn tick(
        &mut self,
        body: &mut Body,
        space: &mut CollisionSpace,
        ctx: &TickContext<'_>,
        rng: &mut dyn RngCore,
    ) {
        self.intent.apply_move(body, space, ctx.input, rng);
        self.movement.update(body, space, ctx);
    }

    pub fn settle_state(&mut self, body: &mut Body) -> ActorState {
        let signals = self.movement.signals(body);
        self.state.update(body, signals)
    }

    pub fn hurt(&mut self, body: &mut Body, damage: i32) -> bool {
        self.state.hurt(body, damage)
    }

    pub fn try_jump(&mut self, body: &mut Body, force: i32) -> bool {
        self.movement.try_jump(body, force)
    }

    pub fn set_movement_state(&mut self, intent: MovementIntent, target: Option<BodyId>) {
        self.intent.set_movement_state(intent, target);
    }

    pub fn switch_movement_state(&mut self, intent: MovementIntent) {
        self.intent.switch_movement_state(intent);
    }

    pub(crate) fn input_for<'a>(
        &self,
        shared: &'a dyn InputSource,
        idle: &'a dyn InputSource,
    ) -> &'a dyn InputSource {
        if self.reads_input() {
            shared
        } else {
            idle
        }
    }
}
