//! World-query helpers for voxel-game scripting.
//!
//! The host world sits behind [`WorldAccessor`] and [`StructureHost`];
//! [`LevelQuery`] runs entity and block searches, random position sampling and
//! block pattern checks against it. [`MemoryWorld`] is a self-contained world for
//! tests and script sessions, and [`scripting`] exposes everything to Lua and JS.

pub mod block_position;
pub mod block_state;
pub mod bounding_box;
pub mod config;
pub mod entity;
pub mod error;
pub mod memory_world;
pub mod query;
pub mod resource_location;
pub mod scripting;
pub mod world;

pub use block_position::BlockPosition;
pub use block_state::{BlockState, MatchMode};
pub use bounding_box::{Aabb, BoundingBox};
pub use config::QueryConfig;
pub use entity::{Entity, EntityHandle};
pub use error::QueryError;
pub use memory_world::{MemoryWorld, StructureTemplate};
pub use query::{LevelQuery, PositionSample};
pub use resource_location::ResourceLocation;
pub use world::{RandomSource, StructureHost, WorldAccessor};
