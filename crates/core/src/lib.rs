//! `kitchenplan-core` — shared building blocks for the planning engines.
//!
//! This crate contains **pure domain** primitives (no IO, no storage).

pub mod clock;
pub mod entity;
pub mod error;
pub mod id;

pub use clock::{Clock, FixedClock, SystemClock};
pub use entity::{Entity, index_by_id};
pub use error::{PlanningError, PlanningResult};
pub use id::{IngredientId, LocationId, RecipeId};
