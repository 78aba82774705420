use glam::Vec2;

use crate::types::*;
use crate::world::Scene;

/// Static solidity oracle over the level's tile grid, queried by pixel.
///
/// The grid must not change while a collision pass is running.
pub trait TileQuery {
    fn is_solid(&self, x: f32, y: f32) -> bool;

    /// Cell edge length in pixels, when the oracle is a regular grid.
    /// Outline samples and coarse skips are never spaced wider than this.
    fn tile_size(&self) -> Option<f32> {
        None
    }
}

impl<T: TileQuery + ?Sized> TileQuery for &T {
    fn is_solid(&self, x: f32, y: f32) -> bool {
        (**self).is_solid(x, y)
    }

    fn tile_size(&self) -> Option<f32> {
        (**self).tile_size()
    }
}

/// Reaction capability implemented by every entity taking part in dispatch.
pub trait Collidable {
    /// Current bounding box.
    fn body(&self) -> Body;

    fn liveness(&self) -> Liveness {
        Liveness::Alive
    }

    /// Called once per detected hit. Returning `Remove` tombstones the entity
    /// for the rest of the pass.
    fn on_collision(&mut self, event: CollisionEvent) -> HitResponse;
}

/// The player additionally exposes last frame's box for the squish test.
pub trait PlayerCollidable: Collidable {
    fn previous_body(&self) -> Body;
}

/// Public API contract for the per-frame collision core.
pub trait CollisionWorldApi {
    /// Construct a new world with the given configuration.
    fn new(cfg: CollisionConfig) -> Self
    where
        Self: Sized;

    // --- Pairwise checks ---------------------------------------------------

    /// Rectangle overlap with the configured inward tolerance.
    fn overlaps(&self, a: &Body, b: &Body) -> bool;

    /// As `overlaps`, with `offset` added to `b`'s effective position.
    fn overlaps_offset(&self, a: &Body, b: &Body, offset: Vec2) -> bool;

    // --- Map ---------------------------------------------------------------

    /// True iff any sampled point on the body's edges is solid.
    fn collides_with_map<M: TileQuery + ?Sized>(&self, map: &M, body: &Body) -> bool;

    /// Walk from `old` toward `current`, stop at the first solid tile and
    /// back off. Both bodies end at the resolved placement.
    fn resolve_swept_motion<M: TileQuery + ?Sized>(
        &self,
        map: &M,
        old: &mut Body,
        current: &mut Body,
    ) -> SweepResult;

    // --- Frame dispatch ----------------------------------------------------

    /// Run every pairwise pass over the scene and apply deferred removals.
    fn run_collision_pass<P, H, K, U>(&mut self, scene: Scene<'_, P, H, K, U>) -> DispatchReport
    where
        P: Collidable,
        H: Collidable,
        K: Collidable,
        U: PlayerCollidable;
}

/// Pairwise rectangle primitives.
pub trait NarrowphaseApi {
    /// Closed-interval test requiring `tolerance` of penetration on both axes.
    fn overlap_within(a: &Body, b: &Body, offset: Vec2, tolerance: f32) -> bool;

    fn overlaps(a: &Body, b: &Body) -> bool;

    fn overlaps_offset(a: &Body, b: &Body, off_x: f32, off_y: f32) -> bool;
}
