use std::str::FromStr;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::geometry::Rect;
use crate::input::{InputAction, InputSource};
use crate::physics::{Body, BodyId, CollisionSpace};
use crate::{parse_variant, VariantError, VariantFamily};

/// Four independent direction flags. Opposite flags cancel out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Direction {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl Direction {
    pub const LEFT: Direction = Direction {
        left: true,
        right: false,
        up: false,
        down: false,
    };
    pub const RIGHT: Direction = Direction {
        left: false,
        right: true,
        up: false,
        down: false,
    };
    pub const UP: Direction = Direction {
        left: false,
        right: false,
        up: true,
        down: false,
    };
    pub const DOWN: Direction = Direction {
        left: false,
        right: false,
        up: false,
        down: true,
    };

    /// Compares bounds per axis; overlapping ranges give no movement on
    /// that axis.
    pub fn toward(own: Rect, target: Rect) -> Self {
        Self {
            left: own.x() > target.right(),
            right: own.right() < target.x(),
            up: own.y() > target.bottom(),
            down: own.bottom() < target.y(),
        }
    }

    pub fn from_input(input: &dyn InputSource) -> Self {
        Self {
            left: input.is_held(InputAction::MoveLeft),
            right: input.is_held(InputAction::MoveRight),
            up: input.is_held(InputAction::MoveUp),
            down: input.is_held(InputAction::MoveDown),
        }
    }

    pub fn inverted(self) -> Self {
        Self {
            left: !self.left,
            right: !self.right,
            up: !self.up,
            down: !self.down,
        }
    }

    pub fn horizontal_sign(self) -> i32 {
        i32::from(self.right) - i32::from(self.left)
    }

    pub fn vertical_sign(self) -> i32 {
        i32::from(self.down) - i32::from(self.up)
    }

    pub fn is_none(self) -> bool {
        !(self.left || self.right || self.up || self.down)
    }

    fn apply(self, body: &mut Body) {
        body.ax = self.horizontal_sign() * body.speed;
        body.ay = self.vertical_sign() * body.speed;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    Input,
    Random,
    DumbChase,
    Chase,
    Avoid,
    Patrol,
}

impl IntentKind {
    /// Patrol is the only kind that needs a route.
    pub fn build(self, patrol: Option<&PatrolConfig>) -> Result<MovementIntent, PatrolError> {
        Ok(match self {
            IntentKind::Input => MovementIntent::Input,
            IntentKind::Random => MovementIntent::Random,
            IntentKind::DumbChase => MovementIntent::DumbChase,
            IntentKind::Chase => MovementIntent::Chase,
            IntentKind::Avoid => MovementIntent::Avoid,
            IntentKind::Patrol => {
                let config = patrol.ok_or(PatrolError::NoWaypoints)?;
                MovementIntent::patrol(config.clone())?
            }
        })
    }
}

impl FromStr for IntentKind {
    type Err = VariantError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        parse_variant(
            VariantFamily::MovementIntent,
            name,
            &[
                ("input", IntentKind::Input),
                ("random", IntentKind::Random),
                ("dumb_chase", IntentKind::DumbChase),
                ("chase", IntentKind::Chase),
                ("avoid", IntentKind::Avoid),
                ("patrol", IntentKind::Patrol),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatrolError {
    #[error("patrol route needs at least one waypoint")]
    NoWaypoints,
}

/// Waypoints are pixel coordinates visited in order, wrapping around.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolConfig {
    pub waypoints: Vec<(i32, i32)>,
    pub idle_ticks: u32,
}

impl PatrolConfig {
    pub fn validate(&self) -> Result<(), PatrolError> {
        if self.waypoints.is_empty() {
            return Err(PatrolError::NoWaypoints);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatrolPhase {
    Moving,
    Idle { remaining: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatrolRoute {
    waypoints: Vec<(i32, i32)>,
    idle_ticks: u32,
    index: usize,
    phase: PatrolPhase,
}

impl PatrolRoute {
    pub fn new(config: PatrolConfig) -> Result<Self, PatrolError> {
        config.validate()?;
        Ok(Self {
            waypoints: config.waypoints,
            idle_ticks: config.idle_ticks,
            index: 0,
            phase: PatrolPhase::Moving,
        })
    }

    pub fn current_waypoint(&self) -> (i32, i32) {
        self.waypoints[self.index]
    }

    pub fn phase(&self) -> PatrolPhase {
        self.phase
    }

    fn advance(&mut self) {
        self.index = (self.index + 1) % self.waypoints.len();
        self.phase = PatrolPhase::Moving;
    }

    fn step(&mut self, body: &mut Body) {
        match self.phase {
            PatrolPhase::Moving => {
                let (x, y) = self.current_waypoint();
                let direction = Direction::toward(body.shape(), Rect::unit_at(x, y));
                if !direction.is_none() {
                    direction.apply(body);
                    return;
                }
                Direction::default().apply(body);
                debug!(body = %body.id(), waypoint = self.index, "patrol_arrived");
                if self.idle_ticks == 0 {
                    self.advance();
                } else {
                    self.phase = PatrolPhase::Idle {
                        remaining: self.idle_ticks,
                    };
                }
            }
            PatrolPhase::Idle { remaining } => {
                Direction::default().apply(body);
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.advance();
                } else {
                    self.phase = PatrolPhase::Idle { remaining };
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovementIntent {
    Input,
    Random,
    DumbChase,
    /// Reserved; never touches the body.
    Chase,
    Avoid,
    Patrol(PatrolRoute),
}

impl MovementIntent {
    pub fn patrol(config: PatrolConfig) -> Result<Self, PatrolError> {
        Ok(MovementIntent::Patrol(PatrolRoute::new(config)?))
    }

    pub fn kind(&self) -> IntentKind {
        match self {
            MovementIntent::Input => IntentKind::Input,
            MovementIntent::Random => IntentKind::Random,
            MovementIntent::DumbChase => IntentKind::DumbChase,
            MovementIntent::Chase => IntentKind::Chase,
            MovementIntent::Avoid => IntentKind::Avoid,
            MovementIntent::Patrol(_) => IntentKind::Patrol,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntentMachine {
    intent: MovementIntent,
    target: Option<BodyId>,
}

impl IntentMachine {
    pub fn new(intent: MovementIntent) -> Self {
        Self {
            intent,
            target: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<BodyId>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn intent(&self) -> &MovementIntent {
        &self.intent
    }

    pub fn target(&self) -> Option<&BodyId> {
        self.target.as_ref()
    }

    pub fn reads_input(&self) -> bool {
        matches!(self.intent, MovementIntent::Input)
    }

    pub fn set_movement_state(&mut self, intent: MovementIntent, target: Option<BodyId>) {
        debug!(intent = ?intent.kind(), target = ?target, "movement_state_set");
        self.intent = intent;
        self.target = target;
    }

    pub fn switch_movement_state(&mut self, intent: MovementIntent) {
        debug!(intent = ?intent.kind(), target = ?self.target, "movement_state_switched");
        self.intent = intent;
    }

    pub fn apply_move(
        &mut self,
        body: &mut Body,
        space: &CollisionSpace,
        input: &dyn InputSource,
        rng: &mut dyn RngCore,
    ) {
        match &mut self.intent {
            MovementIntent::Input => Direction::from_input(input).apply(body),
            MovementIntent::Random => {
                let direction = match rng.gen_range(0..4u8) {
                    0 => Direction::LEFT,
                    1 => Direction::RIGHT,
                    2 => Direction::UP,
                    _ => Direction::DOWN,
                };
                direction.apply(body);
            }
            MovementIntent::DumbChase => {
                target_direction(self.target.as_ref(), body, space).apply(body);
            }
            MovementIntent::Avoid => {
                let direction = match target_shape(self.target.as_ref(), space) {
                    Some(target) => Direction::toward(body.shape(), target).inverted(),
                    None => Direction::default(),
                };
                direction.apply(body);
            }
            MovementIntent::Chase => {
                trace!(body = %body.id(), "chase_intent_noop");
            }
            MovementIntent::Patrol(route) => route.step(body),
        }
    }
}

fn target_shape(target: Option<&BodyId>, space: &CollisionSpace) -> Option<Rect> {
    target
        .and_then(|id| space.body(id.as_str()))
        .map(Body::shape)
}

fn target_direction(target: Option<&BodyId>, body: &Body, space: &CollisionSpace) -> Direction {
    target_shape(target, space)
        .map(|target| Direction::toward(body.shape(), target))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::input::InputSnapshot;

    fn rect_px(x: i32, y: i32, w: i32, h: i32) -> Rect {
        Rect::from_pixels(x, y, w, h).expect("rect")
    }

    fn mover(x: i32, y: i32) -> Body {
        Body::new("mover", rect_px(x, y, 16, 16)).with_speed(8, 32)
    }

    fn apply(machine: &mut IntentMachine, body: &mut Body, space: &CollisionSpace) {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        machine.apply_move(body, space, &InputSnapshot::empty(), &mut rng);
    }

    #[test]
    fn direction_compares_edges_per_axis() {
        let own = rect_px(0, 0, 16, 16);

        let right_below = Direction::toward(own, rect_px(40, 40, 8, 8));
        assert_eq!((right_below.horizontal_sign(), right_below.vertical_sign()), (1, 1));

        let overlapping_x = Direction::toward(own, rect_px(8, -40, 16, 8));
        assert_eq!(
            (overlapping_x.horizontal_sign(), overlapping_x.vertical_sign()),
            (0, -1)
        );

        let same = Direction::toward(own, own);
        assert!(same.is_none());
    }

    #[test]
    fn dumb_chase_accelerates_toward_target() {
        let mut space = CollisionSpace::default();
        space.add_body(Body::new("prey", rect_px(100, 0, 16, 16)));
        let mut machine = IntentMachine::new(MovementIntent::DumbChase).with_target("prey");
        let mut body = mover(0, 0);

        apply(&mut machine, &mut body, &space);

        assert_eq!((body.ax, body.ay), (8, 0));
    }

    #[test]
    fn avoid_inverts_all_flags() {
        let mut space = CollisionSpace::default();
        space.add_body(Body::new("threat", rect_px(100, 0, 16, 16)));
        let mut machine = IntentMachine::new(MovementIntent::Avoid).with_target("threat");
        let mut body = mover(0, 0);

        apply(&mut machine, &mut body, &space);

        // Left is set and right cleared; up and down both set and cancel.
        assert_eq!((body.ax, body.ay), (-8, 0));
    }

    #[test]
    fn missing_target_stops_movement() {
        let space = CollisionSpace::default();
        let mut machine = IntentMachine::new(MovementIntent::DumbChase).with_target("gone");
        let mut body = mover(0, 0);
        body.ax = 8;
        body.ay = -8;

        apply(&mut machine, &mut body, &space);

        assert_eq!((body.ax, body.ay), (0, 0));
    }

    #[test]
    fn chase_leaves_acceleration_untouched() {
        let mut space = CollisionSpace::default();
        space.add_body(Body::new("prey", rect_px(100, 0, 16, 16)));
        let mut machine = IntentMachine::new(MovementIntent::Chase).with_target("prey");
        let mut body = mover(0, 0);
        body.ax = -3;

        apply(&mut machine, &mut body, &space);

        assert_eq!((body.ax, body.ay), (-3, 0));
    }

    #[test]
    fn input_intent_reads_held_directions() {
        let space = CollisionSpace::default();
        let mut machine = IntentMachine::new(MovementIntent::Input);
        let mut body = mover(0, 0);
        let input = InputSnapshot::empty()
            .with_action_held(InputAction::MoveLeft, true)
            .with_action_held(InputAction::MoveDown, true);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        machine.apply_move(&mut body, &space, &input, &mut rng);

        assert_eq!((body.ax, body.ay), (-8, 8));
        assert!(machine.reads_input());
    }

    #[test]
    fn random_intent_picks_one_cardinal_direction() {
        let space = CollisionSpace::default();
        let mut machine = IntentMachine::new(MovementIntent::Random);
        let mut body = mover(0, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut seen = [false; 4];

        for _ in 0..64 {
            machine.apply_move(&mut body, &space, &InputSnapshot::empty(), &mut rng);
            let slot = match (body.ax, body.ay) {
                (-8, 0) => 0,
                (8, 0) => 1,
                (0, -8) => 2,
                (0, 8) => 3,
                other => panic!("unexpected acceleration {other:?}"),
            };
            seen[slot] = true;
        }

        assert_eq!(seen, [true; 4]);
    }

    #[test]
    fn switch_keeps_target_and_set_replaces_it() {
        let mut machine = IntentMachine::new(MovementIntent::DumbChase).with_target("prey");

        machine.switch_movement_state(MovementIntent::Avoid);
        assert_eq!(machine.target().map(BodyId::as_str), Some("prey"));
        assert_eq!(machine.intent().kind(), IntentKind::Avoid);

        machine.set_movement_state(MovementIntent::Random, None);
        assert!(machine.target().is_none());
    }

    #[test]
    fn patrol_requires_waypoints() {
        assert_eq!(
            MovementIntent::patrol(PatrolConfig::default()),
            Err(PatrolError::NoWaypoints)
        );
        assert_eq!(
            IntentKind::Patrol.build(None),
            Err(PatrolError::NoWaypoints)
        );
    }

    #[test]
    fn patrol_walks_idles_then_advances() {
        let space = CollisionSpace::default();
        let intent = MovementIntent::patrol(PatrolConfig {
            waypoints: vec![(40, 0), (0, 0)],
            idle_ticks: 2,
        })
        .expect("patrol");
        let mut machine = IntentMachine::new(intent);
        let mut body = mover(0, 0);

        apply(&mut machine, &mut body, &space);
        assert_eq!((body.ax, body.ay), (8, 0));

        body.set_position(30 * crate::geometry::UNIT, 0);
        apply(&mut machine, &mut body, &space);
        assert_eq!((body.ax, body.ay), (0, 0));
        let MovementIntent::Patrol(route) = machine.intent() else {
            panic!("expected patrol");
        };
        assert_eq!(route.phase(), PatrolPhase::Idle { remaining: 2 });

        apply(&mut machine, &mut body, &space);
        apply(&mut machine, &mut body, &space);
        let MovementIntent::Patrol(route) = machine.intent() else {
            panic!("expected patrol");
        };
        assert_eq!(route.phase(), PatrolPhase::Moving);
        assert_eq!(route.current_waypoint(), (0, 0));

        apply(&mut machine, &mut body, &space);
        assert_eq!((body.ax, body.ay), (-8, 0));
    }
}
