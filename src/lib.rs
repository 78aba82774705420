//! tilebonk: per-frame collision core for tile-based 2D platformers
//! (pairwise overlap, tile-map sampling, swept resolution, dispatch)

pub mod types;
pub mod api;
pub mod error;
pub mod narrowphase;
pub mod tilemap;
pub mod map;
pub mod sweep;
pub mod world;

pub use crate::types::*;
pub use crate::api::*;
pub use crate::error::{ConfigError, TileMapError};
pub use crate::map::collides_with_map;
pub use crate::sweep::resolve_swept_motion;
pub use crate::tilemap::{TILE_SIZE, TileGrid};
pub use crate::world::{CollisionWorld, Scene};
