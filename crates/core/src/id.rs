//! Strongly-typed identifiers used across the planning crates.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PlanningError;

/// Identifier of a restaurant location.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(Uuid);

/// Identifier of a recipe (menu item).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(Uuid);

/// Identifier of an ingredient in the master data.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientId(Uuid);

macro_rules! impl_uuid_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Fresh time-ordered (v7) identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = PlanningError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| PlanningError::validation(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

impl_uuid_newtype!(LocationId, "LocationId");
impl_uuid_newtype!(RecipeId, "RecipeId");
impl_uuid_newtype!(IngredientId, "IngredientId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_malformed_uuid() {
        let err = "not-a-uuid".parse::<RecipeId>().unwrap_err();
        match err {
            PlanningError::Validation(msg) if msg.starts_with("RecipeId") => {}
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn display_round_trips_through_from_str() {
        let id = IngredientId::new();
        let parsed: IngredientId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
