//! Entity capability contract for entity synchronization.
//!
//! The spatial index never owns entity state. It consumes entities through
//! the [`SyncEntity`] trait, which exposes exactly the four fields the index
//! needs: identity (id + type tag), position, and interest range.

pub mod entity;
pub mod vec3;

pub use entity::{EntityHandle, EntityId, EntityKey, EntityType, SyncEntity};
pub use vec3::Vec3;
