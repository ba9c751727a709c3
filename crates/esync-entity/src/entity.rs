//! Entity identity and the capability trait the index consumes.

use std::fmt;
use std::sync::Arc;

use crate::Vec3;

/// Raw entity id. Ids may be reused across entity types.
pub type EntityId = u64;

/// Entity type tag. Distinguishes reused ids.
pub type EntityType = u64;

/// The unique identity of a tracked entity.
///
/// Uniqueness is the `(id, type_tag)` pair, not `id` alone: the surrounding
/// engine hands out ids per entity type, so a player and a marker may share
/// an id while being distinct entities.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityKey {
    /// Id within the entity's type namespace.
    pub id: EntityId,
    /// Type tag qualifying the id.
    pub type_tag: EntityType,
}

impl EntityKey {
    /// Create a new key.
    #[must_use]
    pub const fn new(id: EntityId, type_tag: EntityType) -> Self {
        Self { id, type_tag }
    }
}

impl fmt::Debug for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityKey({}t{})", self.id, self.type_tag)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}t{}", self.id, self.type_tag)
    }
}

/// Capability contract a trackable entity must satisfy.
///
/// All methods are side-effect-free reads. The index calls them at mutation
/// and query time rather than caching field values, so an implementation is
/// expected to return the entity's current state.
pub trait SyncEntity: Send + Sync {
    /// Id within the entity's type namespace.
    fn id(&self) -> EntityId;

    /// Type tag qualifying the id.
    fn type_tag(&self) -> EntityType;

    /// Current world position.
    fn position(&self) -> Vec3;

    /// Interest radius. Non-negative; an entity with range 0 has no
    /// interest footprint and is never indexed.
    fn range(&self) -> f32;

    /// The entity's unique identity pair.
    fn key(&self) -> EntityKey {
        EntityKey::new(self.id(), self.type_tag())
    }
}

/// Shared handle to a tracked entity.
///
/// The index stores these per cell; the surrounding system keeps the entity
/// alive for the duration of any index call made with it.
pub type EntityHandle = Arc<dyn SyncEntity>;
