use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::geometry::{LevelBounds, Rect, ShapeError};
use crate::physics::{Body, BodyId, CollisionSpace, TouchHandler};

pub const EXIT_BODY_ID: &str = "level_exit";

/// Output of the tilemap collaborator: map size, static obstacles and the
/// end-of-level sensor. All values are pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelLayout {
    pub width_px: i32,
    pub height_px: i32,
    #[serde(default)]
    pub obstacles: Vec<ObstacleDef>,
    pub exit: RectDef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RectDef {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl RectDef {
    fn to_rect(self) -> Result<Rect, ShapeError> {
        Rect::from_pixels(self.x, self.y, self.w, self.h)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObstacleDef {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    #[serde(default = "default_obstructive")]
    pub obstructive: bool,
    #[serde(default)]
    pub contact_damage: i32,
}

impl ObstacleDef {
    fn to_rect(self) -> Result<Rect, ShapeError> {
        Rect::from_pixels(self.x, self.y, self.w, self.h)
    }
}

fn default_obstructive() -> bool {
    true
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("parse level json at {path}: {message}")]
    Parse { path: String, message: String },
    #[error("invalid level shape: {0}")]
    InvalidShape(#[from] ShapeError),
    #[error("level bounds must be positive and representable, got {width_px}x{height_px}")]
    InvalidBounds { width_px: i32, height_px: i32 },
}

impl LevelLayout {
    pub fn from_json_str(raw: &str) -> Result<Self, LevelError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let path = error.path().to_string();
            let message = error.into_inner().to_string();
            LevelError::Parse { path, message }
        })
    }

    pub fn bounds(&self) -> LevelBounds {
        LevelBounds {
            width_px: self.width_px,
            height_px: self.height_px,
        }
    }
}

/// Shared record of every body that touched the exit sensor, in first
/// touch order.
#[derive(Debug, Clone, Default)]
pub struct ExitSignal(Rc<RefCell<Vec<BodyId>>>);

impl ExitSignal {
    pub fn is_reached(&self) -> bool {
        !self.0.borrow().is_empty()
    }

    pub fn reached_by(&self, id: &str) -> bool {
        self.0.borrow().iter().any(|visitor| visitor.as_str() == id)
    }

    pub fn visitors(&self) -> Vec<BodyId> {
        self.0.borrow().clone()
    }

    pub fn reset(&self) {
        self.0.borrow_mut().clear();
    }

    fn mark(&self, id: &BodyId) {
        let mut visitors = self.0.borrow_mut();
        if !visitors.contains(id) {
            info!(body = %id, "level_exit_reached");
            visitors.push(id.clone());
        }
    }
}

#[derive(Debug)]
struct ExitSensor {
    signal: ExitSignal,
}

impl TouchHandler for ExitSensor {
    fn on_touch(&mut self, _body: &mut Body, other: &Body) {
        self.signal.mark(other.id());
    }

    fn on_block(&mut self, _body: &mut Body, _other: &Body) {}
}

#[derive(Debug, Clone)]
pub struct InstalledLevel {
    pub bounds: LevelBounds,
    pub exit_id: BodyId,
    pub exit: ExitSignal,
    pub obstacle_ids: Vec<BodyId>,
}

pub(crate) fn check_bounds(bounds: LevelBounds) -> Result<(), LevelError> {
    if bounds.is_valid() {
        return Ok(());
    }
    Err(LevelError::InvalidBounds {
        width_px: bounds.width_px,
        height_px: bounds.height_px,
    })
}

/// Registers obstacles as `obstacle:{index}` and the exit sensor as
/// [`EXIT_BODY_ID`].
pub fn install_level(
    space: &mut CollisionSpace,
    layout: &LevelLayout,
) -> Result<InstalledLevel, LevelError> {
    check_bounds(layout.bounds())?;

    let mut bodies = Vec::with_capacity(layout.obstacles.len());
    for (index, obstacle) in layout.obstacles.iter().enumerate() {
        let body = Body::new(format!("obstacle:{index}"), obstacle.to_rect()?)
            .with_obstructive(obstacle.obstructive)
            .with_contact_damage(obstacle.contact_damage);
        bodies.push(body);
    }
    let exit = ExitSignal::default();
    let exit_body = Body::new(EXIT_BODY_ID, layout.exit.to_rect()?).with_touch_handler(Box::new(
        ExitSensor {
            signal: exit.clone(),
        },
    ));

    let obstacle_ids = bodies.iter().map(|body| body.id().clone()).collect();
    for body in bodies {
        space.add_body(body);
    }
    space.add_body(exit_body);

    info!(
        width_px = layout.width_px,
        height_px = layout.height_px,
        obstacle_count = layout.obstacles.len(),
        "level_installed"
    );

    Ok(InstalledLevel {
        bounds: layout.bounds(),
        exit_id: BodyId::new(EXIT_BODY_ID),
        exit,
        obstacle_ids,
    })
}
