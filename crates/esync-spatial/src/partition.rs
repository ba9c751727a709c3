//! The partition seam between the sync engine and a spatial index.

use esync_entity::{EntityHandle, SyncEntity, Vec3};

use crate::SpatialResult;

/// A spatial partition tracking entities for interest queries.
///
/// The sync engine holds its partition behind this trait so the indexing
/// strategy can vary without touching the tick loop. All operations are
/// synchronous and bounded; see [`crate::SpatialGrid`] for the uniform-grid
/// implementation.
pub trait SpatialPartition: Send + Sync {
    /// Start tracking an entity at its current position.
    fn add(&self, entity: EntityHandle);

    /// Stop tracking an entity, evaluated against its current position.
    fn remove(&self, entity: &dyn SyncEntity);

    /// Move a tracked entity from its current position to `new_position`.
    fn reposition(&self, entity: EntityHandle, new_position: Vec3);

    /// Change a tracked entity's interest range in place.
    ///
    /// Partitions may refuse this with [`crate::SpatialError::Unsupported`];
    /// callers then remove and re-add the entity with the new range.
    fn update_range(&self, entity: &dyn SyncEntity, new_range: f32) -> SpatialResult<()>;

    /// Entities whose interest range reaches `point`.
    fn query(&self, point: Vec3) -> Box<dyn Iterator<Item = EntityHandle> + '_>;
}
