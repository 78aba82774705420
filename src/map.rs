//! Body vs. tile-map test by sampling the box outline.

use crate::api::TileQuery;
use crate::types::{Body, CollisionConfig};

/// True iff any sampled point on the outline of `body` is solid.
///
/// The four corners (inset by `cfg.edge_inset`) are tested first. Then each
/// edge is walked at `cfg.sample_spacing` from its leading corner, so a body
/// exactly one tile wide only samples its corners while wider bodies also
/// hit every cell their edges pass over.
pub fn collides_with_map<M: TileQuery + ?Sized>(map: &M, body: &Body, cfg: &CollisionConfig) -> bool {
    let inset = cfg.edge_inset;
    let spacing = sample_spacing(map, cfg);
    let left = body.pos.x + inset;
    let top = body.pos.y + inset;
    let right = body.pos.x + body.size.x - inset;
    let bottom = body.pos.y + body.size.y - inset;

    if map.is_solid(left, top)
        || map.is_solid(right, top)
        || map.is_solid(left, bottom)
        || map.is_solid(right, bottom)
    {
        return true;
    }

    let across = (body.size.x / spacing) as i32;
    let down = (body.size.y / spacing) as i32;

    for i in 1..across {
        if map.is_solid(body.pos.x + i as f32 * spacing, top) {
            return true;
        }
    }
    for i in 1..across {
        if map.is_solid(body.pos.x + i as f32 * spacing, bottom) {
            return true;
        }
    }
    for i in 1..down {
        if map.is_solid(left, body.pos.y + i as f32 * spacing) {
            return true;
        }
    }
    for i in 1..down {
        if map.is_solid(right, body.pos.y + i as f32 * spacing) {
            return true;
        }
    }

    false
}

/// Configured sample spacing, narrowed to the map's cell size when known.
pub(crate) fn sample_spacing<M: TileQuery + ?Sized>(map: &M, cfg: &CollisionConfig) -> f32 {
    match map.tile_size() {
        Some(tile) if tile > 0.0 => cfg.sample_spacing.min(tile),
        _ => cfg.sample_spacing,
    }
}
