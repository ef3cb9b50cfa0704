mod body;
mod space;

pub use body::{Body, BodyId, Facing, MoveOutcome, TouchHandler};
pub use space::{CollisionEvent, CollisionSpace, Contact, ContactKind, ContactStats};
