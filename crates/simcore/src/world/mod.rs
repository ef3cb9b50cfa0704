use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use crate::actor::{Actor, ActorState, IntentMachine, MovementIntent};
use crate::config::SimConfig;
use crate::geometry::LevelBounds;
use crate::input::{InputSnapshot, InputSource};
use crate::level::{check_bounds, install_level, ExitSignal, LevelLayout};
use crate::movement::{MovementModel, TickContext};
use crate::physics::{Body, BodyId, CollisionSpace, ContactKind, ContactStats};
use crate::SimError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub hurt: Vec<BodyId>,
    pub contacts: usize,
    pub stats: ContactStats,
    pub exit_reached: bool,
}

#[derive(Debug)]
pub struct World {
    config: SimConfig,
    space: CollisionSpace,
    actors: Vec<Actor>,
    bounds: LevelBounds,
    exit: Option<ExitSignal>,
    rng: ChaCha8Rng,
    tick: u64,
}

impl World {
    pub fn new(config: SimConfig, bounds: LevelBounds, seed: u64) -> Result<Self, SimError> {
        config.validate()?;
        check_bounds(bounds)?;
        Ok(Self {
            config,
            space: CollisionSpace::default(),
            actors: Vec::new(),
            bounds,
            exit: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick: 0,
        })
    }

    pub fn with_level(config: SimConfig, layout: &LevelLayout, seed: u64) -> Result<Self, SimError> {
        let mut world = Self::new(config, layout.bounds(), seed)?;
        let level = install_level(&mut world.space, layout)?;
        world.bounds = level.bounds;
        world.exit = Some(level.exit);
        Ok(world)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn space(&self) -> &CollisionSpace {
        &self.space
    }

    pub fn space_mut(&mut self) -> &mut CollisionSpace {
        &mut self.space
    }

    pub fn bounds(&self) -> LevelBounds {
        self.bounds
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn actor(&self, id: &str) -> Option<&Actor> {
        self.actors.iter().find(|actor| actor.body_id().as_str() == id)
    }

    pub fn body(&self, id: &str) -> Option<&Body> {
        self.space.body(id)
    }

    pub fn actor_state(&self, id: &str) -> Option<ActorState> {
        self.actor(id).map(Actor::state)
    }

    /// Registers `body` and binds an actor to it. Re-using an ID replaces
    /// the previous actor and body.
    pub fn spawn_actor(
        &mut self,
        body: Body,
        movement: Box<dyn MovementModel>,
        intent: IntentMachine,
    ) -> BodyId {
        let id = body.id().clone();
        self.actors.retain(|actor| actor.body_id() != &id);
        info!(
            body = %id,
            movement = ?movement.kind(),
            intent = ?intent.intent().kind(),
            "actor_spawned"
        );
        self.actors
            .push(Actor::new(id.clone(), movement, intent, &self.config));
        self.space.add_body(body);
        id
    }

    pub fn despawn_actor(&mut self, id: &str) -> Option<Body> {
        self.actors.retain(|actor| actor.body_id().as_str() != id);
        let body = self.space.remove_body(id);
        if body.is_some() {
            info!(body = id, "actor_despawned");
        }
        body
    }

    pub fn hurt(&mut self, id: &str, damage: i32) -> Result<bool, SimError> {
        let (actor, body) = self.actor_and_body(id)?;
        Ok(actor.hurt(body, damage))
    }

    pub fn try_jump(&mut self, id: &str, force: i32) -> Result<bool, SimError> {
        let (actor, body) = self.actor_and_body(id)?;
        Ok(actor.try_jump(body, force))
    }

    pub fn set_movement_state(
        &mut self,
        id: &str,
        intent: MovementIntent,
        target: Option<BodyId>,
    ) -> Result<(), SimError> {
        let index = self.actor_index(id)?;
        self.actors[index].set_movement_state(intent, target);
        Ok(())
    }

    pub fn switch_movement_state(
        &mut self,
        id: &str,
        intent: MovementIntent,
    ) -> Result<(), SimError> {
        let index = self.actor_index(id)?;
        self.actors[index].switch_movement_state(intent);
        Ok(())
    }

    pub fn exit_reached_by(&self, id: &str) -> bool {
        self.exit
            .as_ref()
            .is_some_and(|exit| exit.reached_by(id))
    }

    pub fn exit(&self) -> Option<&ExitSignal> {
        self.exit.as_ref()
    }

    /// Runs one tick: intent and integration per actor in spawn order, then
    /// contact damage, then state machines.
    pub fn step(&mut self, input: &dyn InputSource) -> TickReport {
        let idle = InputSnapshot::empty();
        for actor in &mut self.actors {
            let Some(mut body) = self.space.detach(actor.body_id().as_str()) else {
                continue;
            };
            let ctx = TickContext {
                input: actor.input_for(input, &idle),
                bounds: self.bounds,
            };
            actor.tick(&mut body, &mut self.space, &ctx, &mut self.rng);
            self.space.attach(body);
        }

        let events = self.space.drain_events();
        let contacts = events.len();
        let mut pending = Vec::new();
        for event in events.iter().filter(|event| event.kind == ContactKind::Touch) {
            for (victim, source) in [(&event.subject, &event.other), (&event.other, &event.subject)] {
                if let Some(damage) = self.contact_damage(victim, source) {
                    pending.push((victim.clone(), damage));
                }
            }
        }

        let mut hurt = Vec::new();
        for (victim, damage) in pending {
            if let Ok((actor, body)) = self.actor_and_body(victim.as_str()) {
                if actor.hurt(body, damage) {
                    debug!(body = %victim, damage, "contact_damage");
                    hurt.push(victim);
                }
            }
        }

        for actor in &mut self.actors {
            if let Some(body) = self.space.body_mut(actor.body_id().as_str()) {
                actor.settle_state(body);
            }
        }

        self.tick = self.tick.saturating_add(1);
        let stats = self.space.take_stats();
        let exit_reached = self.exit.as_ref().is_some_and(ExitSignal::is_reached);
        trace!(
            tick = self.tick,
            contacts,
            pair_checks = stats.pair_checks,
            blocks = stats.blocks,
            "world_tick"
        );
        TickReport {
            tick: self.tick,
            hurt,
            contacts,
            stats,
            exit_reached,
        }
    }

    /// Damage `source` deals to `victim`, if the victim is a harmless actor
    /// and the source is harmful.
    fn contact_damage(&self, victim: &BodyId, source: &BodyId) -> Option<i32> {
        self.actor(victim.as_str())?;
        let victim_body = self.space.body(victim.as_str())?;
        let source_body = self.space.body(source.as_str())?;
        let damage = source_body.contact_damage();
        (damage > 0 && victim_body.contact_damage() == 0).then_some(damage)
    }

    fn actor_index(&self, id: &str) -> Result<usize, SimError> {
        self.actors
            .iter()
            .position(|actor| actor.body_id().as_str() == id)
            .ok_or_else(|| SimError::UnknownActor(BodyId::new(id)))
    }

    fn actor_and_body(&mut self, id: &str) -> Result<(&mut Actor, &mut Body), SimError> {
        let index = self.actor_index(id)?;
        let body = self
            .space
            .body_mut(id)
            .ok_or_else(|| SimError::UnknownActor(BodyId::new(id)))?;
        Ok((&mut self.actors[index], body))
    }
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
