//! Recipe and ingredient master data.
//!
//! Read-only inputs owned by the persistence layer; the planning engines only
//! look things up here.

pub mod catalog;
pub mod ingredient;
pub mod recipe;

pub use catalog::Catalog;
pub use ingredient::IngredientDefinition;
pub use kitchenplan_units::ConversionOverride;
pub use recipe::{RecipeDefinition, RecipeIngredientLine};
