//! Uniform grid over a bounded 2-D plane.

use std::sync::Arc;

use esync_entity::{EntityHandle, EntityKey, SyncEntity, Vec3};
use parking_lot::{RwLock, RwLockReadGuard};
use smallvec::SmallVec;
use tracing::trace;

use crate::error::{SpatialError, SpatialResult};
use crate::partition::SpatialPartition;

/// Per-cell member list. Most cells hold a handful of entities, so keep
/// them inline until they grow past that.
type CellMembers = SmallVec<[EntityHandle; 4]>;

/// Grid configuration, immutable after construction.
///
/// World coordinates may be negative; the offsets translate them into the
/// non-negative addressable range `[0, world_max]` before bucketing.
#[derive(Clone, Copy, Debug)]
pub struct GridConfig {
    /// Upper bound of the indexable plane on the x axis, after translation.
    pub world_max_x: f32,
    /// Upper bound of the indexable plane on the y axis, after translation.
    pub world_max_y: f32,
    /// Side length of a square cell.
    pub cell_size: f32,
    /// Added to world x before bucketing.
    pub x_offset: f32,
    /// Added to world y before bucketing.
    pub y_offset: f32,
}

/// Inclusive rectangle of cell indices covered by an entity's bounding
/// square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CellRect {
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
}

/// A uniform grid spatial partition.
///
/// Entities are registered into every cell overlapped by the square
/// `[pos - range, pos + range]`; a query scans the single cell containing
/// the query point and filters by exact 3-D distance. The cell table is
/// guarded by one coarse lock: mutations hold it for writing, a [`Query`]
/// holds it for reading until exhausted or dropped.
pub struct SpatialGrid {
    config: GridConfig,
    cell_count_x: usize,
    cell_count_y: usize,
    /// Flat row-major cell table: `(x, y)` lives at `y * cell_count_x + x`.
    cells: RwLock<Vec<CellMembers>>,
}

impl std::fmt::Debug for SpatialGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialGrid")
            .field("config", &self.config)
            .field("cell_count_x", &self.cell_count_x)
            .field("cell_count_y", &self.cell_count_y)
            .finish_non_exhaustive()
    }
}

impl SpatialGrid {
    /// Create a new grid.
    ///
    /// # Errors
    ///
    /// Fails fast on a non-positive or non-finite `cell_size` or world
    /// bound; a malformed grid cannot be used safely at all.
    pub fn new(config: GridConfig) -> SpatialResult<Self> {
        if config.cell_size <= 0.0 || !config.cell_size.is_finite() {
            return Err(SpatialError::InvalidCellSize(config.cell_size));
        }
        if config.world_max_x <= 0.0
            || config.world_max_y <= 0.0
            || !config.world_max_x.is_finite()
            || !config.world_max_y.is_finite()
        {
            return Err(SpatialError::InvalidWorldBounds(
                config.world_max_x,
                config.world_max_y,
            ));
        }

        let cell_count_x = (config.world_max_x / config.cell_size).ceil() as usize + 1;
        let cell_count_y = (config.world_max_y / config.cell_size).ceil() as usize + 1;
        let cells = vec![CellMembers::new(); cell_count_x * cell_count_y];

        tracing::debug!(
            "spatial grid: {}x{} cells of size {}",
            cell_count_x,
            cell_count_y,
            config.cell_size
        );

        Ok(Self {
            config,
            cell_count_x,
            cell_count_y,
            cells: RwLock::new(cells),
        })
    }

    /// The configuration this grid was built with.
    #[must_use]
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Number of cells along the x axis.
    #[must_use]
    pub const fn cell_count_x(&self) -> usize {
        self.cell_count_x
    }

    /// Number of cells along the y axis.
    #[must_use]
    pub const fn cell_count_y(&self) -> usize {
        self.cell_count_y
    }

    /// Total cell membership count, counting an entity once per cell it
    /// occupies.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.cells.read().iter().map(|members| members.len()).sum()
    }

    /// Translate a world position by the configured offsets.
    fn translate(&self, position: Vec3) -> (f32, f32) {
        (
            position.x + self.config.x_offset,
            position.y + self.config.y_offset,
        )
    }

    /// Whether a translated coordinate pair is on the indexable plane.
    fn in_bounds(&self, tx: f32, ty: f32) -> bool {
        tx >= 0.0 && ty >= 0.0 && tx <= self.config.world_max_x && ty <= self.config.world_max_y
    }

    fn cell_index(&self, x: usize, y: usize) -> usize {
        y * self.cell_count_x + x
    }

    fn clamp_axis(index: f32, count: usize) -> usize {
        (index as i64).clamp(0, count as i64 - 1) as usize
    }

    /// Cells covered by the bounding square of `range` around a translated
    /// position, clamped into the table.
    fn cell_rect(&self, tx: f32, ty: f32, range: f32) -> CellRect {
        let size = self.config.cell_size;
        CellRect {
            min_x: Self::clamp_axis(((tx - range) / size).floor(), self.cell_count_x),
            max_x: Self::clamp_axis(((tx + range) / size).ceil(), self.cell_count_x),
            min_y: Self::clamp_axis(((ty - range) / size).floor(), self.cell_count_y),
            max_y: Self::clamp_axis(((ty + range) / size).ceil(), self.cell_count_y),
        }
    }

    /// Append `entity` to every cell of `rect` that does not already hold
    /// its key. No cell ever holds two members with the same key.
    fn insert_rect(&self, cells: &mut [CellMembers], rect: CellRect, entity: &EntityHandle) {
        let key = entity.key();
        for y in rect.min_y..=rect.max_y {
            for x in rect.min_x..=rect.max_x {
                let members = &mut cells[self.cell_index(x, y)];
                if members.iter().any(|member| member.key() == key) {
                    continue;
                }
                members.push(Arc::clone(entity));
            }
        }
    }

    /// Delete `key` from every cell of `rect` where present, preserving
    /// the order of the remaining members. Absence in a cell is not an
    /// error.
    fn remove_rect(&self, cells: &mut [CellMembers], rect: CellRect, key: EntityKey) {
        for y in rect.min_y..=rect.max_y {
            for x in rect.min_x..=rect.max_x {
                let members = &mut cells[self.cell_index(x, y)];
                if let Some(found) = members.iter().position(|member| member.key() == key) {
                    members.remove(found);
                }
            }
        }
    }

    /// Start tracking an entity.
    ///
    /// A zero-range entity has no interest footprint and an entity whose
    /// translated position is out of bounds is transiently outside the
    /// indexable world; both are skipped silently rather than treated as
    /// errors.
    pub fn add(&self, entity: EntityHandle) {
        let (tx, ty) = self.translate(entity.position());
        let range = entity.range();
        if range <= 0.0 || !self.in_bounds(tx, ty) {
            trace!("add skipped for {}: zero range or out of bounds", entity.key());
            return;
        }

        let rect = self.cell_rect(tx, ty, range);
        let mut cells = self.cells.write();
        self.insert_rect(&mut cells, rect, &entity);
    }

    /// Stop tracking an entity, evaluated against its current position.
    ///
    /// Computes the same cell rectangle `add` would for the entity's
    /// current state; cells where the entity is absent are left untouched.
    pub fn remove(&self, entity: &dyn SyncEntity) {
        let (tx, ty) = self.translate(entity.position());
        let range = entity.range();
        if range <= 0.0 || !self.in_bounds(tx, ty) {
            trace!(
                "remove skipped for {}: zero range or out of bounds",
                entity.key()
            );
            return;
        }

        let rect = self.cell_rect(tx, ty, range);
        let mut cells = self.cells.write();
        self.remove_rect(&mut cells, rect, entity.key());
    }

    /// Move a tracked entity to `new_position`.
    ///
    /// The old cell rectangle comes from the entity's current position, the
    /// new one from `new_position`; the entity ends up a member of exactly
    /// the new rectangle's cells. The caller updates the entity's own
    /// position after this returns. No-op if either position is out of
    /// bounds or the range is zero.
    pub fn reposition(&self, entity: EntityHandle, new_position: Vec3) {
        let (old_tx, old_ty) = self.translate(entity.position());
        let (new_tx, new_ty) = self.translate(new_position);
        let range = entity.range();
        if range <= 0.0 || !self.in_bounds(old_tx, old_ty) || !self.in_bounds(new_tx, new_ty) {
            trace!(
                "reposition skipped for {}: zero range or out of bounds",
                entity.key()
            );
            return;
        }

        let old_rect = self.cell_rect(old_tx, old_ty, range);
        let new_rect = self.cell_rect(new_tx, new_ty, range);

        // One lock acquisition for both halves so no reader observes the
        // entity evicted from the old cells but not yet in the new ones.
        let mut cells = self.cells.write();
        self.remove_rect(&mut cells, old_rect, entity.key());
        self.insert_rect(&mut cells, new_rect, &entity);
    }

    /// Change a tracked entity's interest range in place.
    ///
    /// # Errors
    ///
    /// Always fails with [`SpatialError::Unsupported`]: the old range is
    /// baked into the entity's cell memberships, so callers must `remove`
    /// with the old range and `add` with the new one.
    pub fn update_range(&self, _entity: &dyn SyncEntity, _new_range: f32) -> SpatialResult<()> {
        Err(SpatialError::Unsupported("update_range"))
    }

    /// Entities whose interest range reaches `point`.
    ///
    /// Scans the single cell containing the translated point. Any entity
    /// whose circular footprint reaches that cell was also registered into
    /// it by `add`/`reposition` (the bounding square is a superset of every
    /// cell the circle touches), so no candidate is missed; the exact 3-D
    /// distance test discards the square's false positives.
    ///
    /// The iterator is lazy and holds the table read lock until exhausted
    /// or dropped; membership may change the instant after it is released.
    #[must_use]
    pub fn query(&self, point: Vec3) -> Query<'_> {
        let (tx, ty) = self.translate(point);
        if !self.in_bounds(tx, ty) {
            return Query {
                guard: None,
                cell: 0,
                cursor: 0,
                point,
            };
        }

        let x = (tx / self.config.cell_size).floor() as usize;
        let y = (ty / self.config.cell_size).floor() as usize;
        Query {
            guard: Some(self.cells.read()),
            cell: self.cell_index(x, y),
            cursor: 0,
            point,
        }
    }
}

impl SpatialPartition for SpatialGrid {
    fn add(&self, entity: EntityHandle) {
        Self::add(self, entity);
    }

    fn remove(&self, entity: &dyn SyncEntity) {
        Self::remove(self, entity);
    }

    fn reposition(&self, entity: EntityHandle, new_position: Vec3) {
        Self::reposition(self, entity, new_position);
    }

    fn update_range(&self, entity: &dyn SyncEntity, new_range: f32) -> SpatialResult<()> {
        Self::update_range(self, entity, new_range)
    }

    fn query(&self, point: Vec3) -> Box<dyn Iterator<Item = EntityHandle> + '_> {
        Box::new(Self::query(self, point))
    }
}

/// Lazy result sequence of a point query.
///
/// Yields matching entities one at a time; dropping it early stops the scan
/// and releases the table for writers. Exhausted once, it stays empty.
pub struct Query<'grid> {
    /// Read guard over the cell table; `None` once exhausted or when the
    /// query point was out of bounds.
    guard: Option<RwLockReadGuard<'grid, Vec<CellMembers>>>,
    cell: usize,
    cursor: usize,
    point: Vec3,
}

impl Iterator for Query<'_> {
    type Item = EntityHandle;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(guard) = self.guard.as_ref() {
            let candidate = guard[self.cell].get(self.cursor).map(Arc::clone);
            let Some(entity) = candidate else {
                // Exhausted: release the read lock and stay empty.
                self.guard = None;
                break;
            };
            self.cursor += 1;
            if entity.position().distance(self.point) <= entity.range() {
                return Some(entity);
            }
        }
        None
    }
}
