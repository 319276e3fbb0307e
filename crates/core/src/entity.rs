//! Master-data records addressed by a typed identifier.

use std::collections::HashMap;

/// A record with a stable identity (recipe, ingredient, ...).
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}

/// Index records by identifier. Later duplicates replace earlier ones.
pub fn index_by_id<E: Entity>(items: impl IntoIterator<Item = E>) -> HashMap<E::Id, E> {
    items.into_iter().map(|item| (*item.id(), item)).collect()
}
