//! Uniform-grid spatial partitioning for entity synchronization.
//!
//! Tracks moving, range-bounded entities in a bounded 2-D world and answers
//! "which entities are within interest-range of this point" once per
//! observer per tick.
//!
//! # Square-for-circle approximation
//!
//! An entity's interest footprint is a circle of radius `range`, but the
//! grid registers it into every cell overlapped by the enclosing square
//! `[pos - range, pos + range]`. That admits false positives at the square's
//! corners in exchange for O(1) per-cell membership tests and no
//! circle-vs-cell intersection math on the mutation path. Queries filter
//! the false positives with an exact 3-D distance test, so results are
//! exact.

pub mod error;
pub mod grid;
pub mod partition;

pub use error::{SpatialError, SpatialResult};
pub use grid::{GridConfig, Query, SpatialGrid};
pub use partition::SpatialPartition;
