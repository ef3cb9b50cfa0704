use simcore::{
    ActorState, BodyId, InputAction, InputCollector, SimConfig, TickDriver, TickReport, World,
};
use tracing::{debug, info};

use super::scenario::{AppBuildError, Scenario, ScriptDef};

/// Drives a world with a scripted player until the player reaches the exit
/// or dies.
pub(crate) struct DemoDriver {
    world: World,
    input: InputCollector,
    script: ScriptDef,
    player: BodyId,
    hurt_events: u32,
}

impl DemoDriver {
    pub(crate) fn new(config: SimConfig, scenario: Scenario) -> Result<Self, AppBuildError> {
        let mut world = World::with_level(config, &scenario.level, scenario.seed)?;

        let player = scenario.player.build(world.config())?;
        let player_id = world.spawn_actor(player.body, player.movement, player.intent);
        for enemy in &scenario.enemies {
            let parts = enemy.build(world.config())?;
            world.spawn_actor(parts.body, parts.movement, parts.intent);
        }

        Ok(Self {
            world,
            input: InputCollector::default(),
            script: scenario.script,
            player: player_id,
            hurt_events: 0,
        })
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn hurt_events(&self) -> u32 {
        self.hurt_events
    }

    pub(crate) fn player_reached_exit(&self) -> bool {
        self.world.exit_reached_by(self.player.as_str())
    }

    pub(crate) fn player_dead(&self) -> bool {
        self.world
            .body(self.player.as_str())
            .map_or(true, |body| body.is_dead())
    }

    fn apply_script(&mut self, tick: u64) {
        let script = &self.script;
        self.input.set(InputAction::MoveRight, script.hold_right);
        self.input.set(InputAction::MoveLeft, script.hold_left);

        let jump_down = script.jump_every.is_some_and(|every| {
            let every = every.max(1);
            tick % every <= script.jump_hold_ticks
        });
        self.input.set(InputAction::Jump, jump_down);
        self.input
            .set(InputAction::Dash, script.dash_ticks.contains(&tick));
    }
}

impl TickDriver for DemoDriver {
    fn tick(&mut self) -> TickReport {
        let tick = self.world.tick();
        self.apply_script(tick);
        let snapshot = self.input.snapshot_for_tick();
        let report = self.world.step(&snapshot);

        for victim in &report.hurt {
            self.hurt_events = self.hurt_events.saturating_add(1);
            let health = self.world.body(victim.as_str()).map(|body| body.health());
            info!(body = %victim, health = ?health, tick = report.tick, "demo_actor_hurt");
        }
        if let Some(state) = self.world.actor_state(self.player.as_str()) {
            if state != ActorState::Idle {
                debug!(tick = report.tick, state = ?state, "player_state");
            }
        }
        report
    }

    fn is_finished(&self) -> bool {
        self.player_reached_exit() || self.player_dead()
    }
}
