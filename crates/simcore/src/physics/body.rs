use std::borrow::Borrow;
use std::fmt;

use crate::geometry::{Axis, LevelBounds, PixelRect, Rect, Shape};

use super::space::{CollisionSpace, Contact};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(String);

impl BodyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for BodyId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BodyId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BodyId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    Left,
    #[default]
    Right,
    Up,
    Down,
}

impl Facing {
    pub fn horizontal_sign(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right | Facing::Up | Facing::Down => 1,
        }
    }
}

pub trait TouchHandler: fmt::Debug {
    fn on_touch(&mut self, body: &mut Body, other: &Body);
    fn on_block(&mut self, body: &mut Body, other: &Body);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    pub touching: bool,
    pub blocked_x: bool,
    pub blocked_y: bool,
}

#[derive(Debug)]
pub struct Body {
    id: BodyId,
    shape: Rect,
    areas: Vec<Box<dyn Shape>>,
    pub vx: i32,
    pub vy: i32,
    pub ax: i32,
    pub ay: i32,
    pub speed: i32,
    pub max_speed: i32,
    pub immobile: bool,
    pub facing: Facing,
    health: i32,
    max_health: i32,
    pub invulnerable: bool,
    obstructive: bool,
    contact_damage: i32,
    touch: Option<Box<dyn TouchHandler>>,
}

impl Body {
    pub fn new(id: impl Into<BodyId>, shape: Rect) -> Self {
        Self {
            id: id.into(),
            shape,
            areas: Vec::new(),
            vx: 0,
            vy: 0,
            ax: 0,
            ay: 0,
            speed: 0,
            max_speed: 0,
            immobile: false,
            facing: Facing::default(),
            health: 1,
            max_health: 1,
            invulnerable: false,
            obstructive: false,
            contact_damage: 0,
            touch: None,
        }
    }

    pub fn with_speed(mut self, speed: i32, max_speed: i32) -> Self {
        self.speed = speed;
        self.max_speed = max_speed;
        self
    }

    pub fn with_health(mut self, max_health: i32) -> Self {
        self.max_health = max_health.max(0);
        self.health = self.max_health;
        self
    }

    pub fn with_obstructive(mut self, obstructive: bool) -> Self {
        self.obstructive = obstructive;
        self
    }

    pub fn with_contact_damage(mut self, contact_damage: i32) -> Self {
        self.contact_damage = contact_damage.max(0);
        self
    }

    /// Once any area is attached, overlap tests ignore the primary shape.
    pub fn with_collision_area(mut self, area: Box<dyn Shape>) -> Self {
        self.areas.push(area);
        self
    }

    pub fn with_touch_handler(mut self, handler: Box<dyn TouchHandler>) -> Self {
        self.touch = Some(handler);
        self
    }

    pub fn id(&self) -> &BodyId {
        &self.id
    }

    pub fn shape(&self) -> Rect {
        self.shape
    }

    pub fn position(&self) -> PixelRect {
        self.shape.to_pixels()
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        let dx = x - self.shape.x();
        let dy = y - self.shape.y();
        self.translate(dx, dy);
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        if dx == 0 && dy == 0 {
            return;
        }
        self.shape.translate(dx, dy);
        for area in &mut self.areas {
            area.translate(dx, dy);
        }
    }

    pub fn is_obstructive(&self) -> bool {
        self.obstructive
    }

    pub fn contact_damage(&self) -> i32 {
        self.contact_damage
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    pub fn apply_damage(&mut self, damage: i32) -> i32 {
        self.health = self.health.saturating_sub(damage).clamp(0, self.max_health);
        self.health
    }

    pub fn area_bounds(&self) -> impl Iterator<Item = Rect> + '_ {
        let primary = self.areas.is_empty().then_some(self.shape);
        primary
            .into_iter()
            .chain(self.areas.iter().map(|area| area.bounds()))
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        self.area_bounds()
            .any(|own| other.area_bounds().any(|theirs| own.intersects(&theirs)))
    }

    pub(crate) fn notify_touch(&mut self, other: &Body) {
        if let Some(mut handler) = self.touch.take() {
            handler.on_touch(self, other);
            if self.touch.is_none() {
                self.touch = Some(handler);
            }
        }
    }

    pub(crate) fn notify_block(&mut self, other: &Body) {
        if let Some(mut handler) = self.touch.take() {
            handler.on_block(self, other);
            if self.touch.is_none() {
                self.touch = Some(handler);
            }
        }
    }

    /// Rolls the delta back when an obstructive body was hit.
    pub fn move_axis(&mut self, space: &mut CollisionSpace, axis: Axis, delta: i32) -> Contact {
        if delta == 0 {
            return Contact::default();
        }
        let (dx, dy) = axis.split(delta);
        self.translate(dx, dy);
        let contact = space.resolve_collisions(self);
        if contact.blocking {
            self.translate(-dx, -dy);
        }
        contact
    }

    pub fn move_by(&mut self, space: &mut CollisionSpace, dx: i32, dy: i32) -> MoveOutcome {
        let x = self.move_axis(space, Axis::X, dx);
        let y = self.move_axis(space, Axis::Y, dy);
        MoveOutcome {
            touching: x.touching || y.touching,
            blocked_x: x.blocking,
            blocked_y: y.blocking,
        }
    }

    pub fn clamp_to(&mut self, bounds: LevelBounds) -> bool {
        let max_x = (bounds.width() - self.shape.w()).max(0);
        let max_y = (bounds.height() - self.shape.h()).max(0);
        let x = self.shape.x().clamp(0, max_x);
        let y = self.shape.y().clamp(0, max_y);
        let clamped_x = x != self.shape.x();
        let clamped_y = y != self.shape.y();
        if clamped_x {
            self.vx = 0;
        }
        if clamped_y {
            self.vy = 0;
        }
        self.set_position(x, y);
        clamped_x || clamped_y
    }
}
