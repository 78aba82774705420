//! Swept body vs. tile-map resolution.
//!
//! The body is walked from its last safe position toward the proposed one.
//! Probes advance one pixel per iteration plus a coarse skip of one tile
//! while whole tiles of path remain, so the walk costs roughly
//! `path / tile` map tests. A solid feature thinner than the skip can be
//! stepped over by a fast body.

use glam::Vec2;
use tracing::{debug, warn};

use crate::api::TileQuery;
use crate::map::{collides_with_map, sample_spacing};
use crate::types::*;

/// Parametric path from `start` to `target` along the dominant axis.
#[derive(Copy, Clone, Debug)]
struct Path {
    start: Vec2,
    target: Vec2,
    /// Step per unit of `t`; each component in [-1, 1].
    dir: Vec2,
    /// Length along the dominant axis.
    len: f32,
    kind: MotionKind,
}

impl Path {
    fn new(start: Vec2, target: Vec2) -> Self {
        let delta = target - start;
        if delta.x == 0.0 && delta.y == 0.0 {
            return Self { start, target, dir: Vec2::ZERO, len: 0.0, kind: MotionKind::Stationary };
        }
        if delta.x == 0.0 {
            return Self {
                start,
                target,
                dir: Vec2::new(0.0, delta.y.signum()),
                len: delta.y.abs(),
                kind: MotionKind::Vertical,
            };
        }
        if delta.y == 0.0 {
            return Self {
                start,
                target,
                dir: Vec2::new(delta.x.signum(), 0.0),
                len: delta.x.abs(),
                kind: MotionKind::Horizontal,
            };
        }
        let len = delta.x.abs().max(delta.y.abs());
        Self { start, target, dir: delta / len, len, kind: MotionKind::Diagonal }
    }

    /// Position at distance `t`; exact at both ends.
    fn at(&self, t: f32) -> Vec2 {
        if t <= 0.0 {
            self.start
        } else if t >= self.len {
            self.target
        } else {
            self.start + self.dir * t
        }
    }

    /// Distance reached after `step` steps: one pixel per step plus `skip`
    /// for each of the first `coarse` steps, clamped to `len`.
    /// Derived from the step count so long paths never stall on rounding.
    fn step_distance(&self, step: u64, coarse: u64, skip: f32) -> f32 {
        let d = step as f64 + step.min(coarse) as f64 * skip as f64;
        d.min(self.len as f64) as f32
    }
}

/// Borrowed map + config for one resolution.
pub struct SweptResolver<'a, M: TileQuery + ?Sized> {
    map: &'a M,
    cfg: &'a CollisionConfig,
}

impl<'a, M: TileQuery + ?Sized> SweptResolver<'a, M> {
    pub fn new(map: &'a M, cfg: &'a CollisionConfig) -> Self {
        Self { map, cfg }
    }

    fn blocked(&self, shape: &Body, pos: Vec2) -> bool {
        collides_with_map(self.map, &shape.at(pos), self.cfg)
    }

    /// Resolve `old -> current`. On return both hold the resolved placement.
    pub fn resolve(&self, old: &mut Body, current: &mut Body) -> SweepResult {
        let path = Path::new(old.pos, current.pos);
        if path.kind == MotionKind::Stationary {
            return SweepResult::clear(MotionKind::Stationary);
        }
        if !path.len.is_finite() {
            warn!(?old, ?current, "non-finite motion, skipping swept resolution");
            *old = *current;
            return SweepResult { kind: path.kind, outcome: SweepOutcome::Unresolved, hit: TileHit::default() };
        }

        let shape = *current;
        let result = match self.first_hit(&shape, &path) {
            None => SweepResult::clear(path.kind),
            Some(t) => {
                let (pos, result) = match path.kind {
                    MotionKind::Vertical => self.back_off_axis(&shape, &path, t, TileHit::along_y(path.dir.y)),
                    MotionKind::Horizontal => self.back_off_axis(&shape, &path, t, TileHit::along_x(path.dir.x)),
                    _ => self.back_off_diagonal(&shape, &path, t),
                };
                current.pos = pos;
                debug!(kind = ?result.kind, outcome = ?result.outcome, x = pos.x, y = pos.y, "swept motion blocked");
                result
            }
        };
        *old = *current;
        result
    }

    /// Distance of the first probe that lands in solid geometry.
    fn first_hit(&self, shape: &Body, path: &Path) -> Option<f32> {
        let skip = sample_spacing(self.map, self.cfg);
        let coarse = (path.len / skip) as u64;
        for step in 1..=path.len.ceil() as u64 {
            let t = path.step_distance(step, coarse, skip);
            if self.blocked(shape, path.at(t)) {
                return Some(t);
            }
            if t >= path.len {
                break;
            }
        }
        None
    }

    /// Walk `shape` straight from `from` to `to`; true if no step lands in solid tiles.
    fn slides_clear(&self, shape: &Body, from: Vec2, to: Vec2) -> bool {
        self.first_hit(shape, &Path::new(from, to)).is_none()
    }

    /// Retreat from just before `hit_t` toward the start until clear.
    /// Returns the distance reached and whether it is clear.
    fn retreat(&self, shape: &Body, path: &Path, hit_t: f32) -> (f32, bool) {
        let mut t = hit_t - 1.0;
        for _ in 0..self.cfg.max_backoff_steps {
            let b = t.max(0.0);
            if !self.blocked(shape, path.at(b)) {
                return (b, true);
            }
            if b <= 0.0 {
                return (0.0, false);
            }
            t -= 1.0;
        }
        (0.0, false)
    }

    fn back_off_axis(&self, shape: &Body, path: &Path, hit_t: f32, hit: TileHit) -> (Vec2, SweepResult) {
        let (t, clear) = self.retreat(shape, path, hit_t);
        if !clear {
            warn!(kind = ?path.kind, "back-off found no clear position, keeping start");
        }
        let outcome = if clear { SweepOutcome::Blocked } else { SweepOutcome::Unresolved };
        (path.at(t), SweepResult { kind: path.kind, outcome, hit })
    }

    /// Back off both axes, then try keeping the full X motion, then the full
    /// Y motion; each is taken only if the straight slide to it is clear.
    /// Failing both, slide Y forward from the backed-off point until it
    /// meets the obstacle.
    fn back_off_diagonal(&self, shape: &Body, path: &Path, hit_t: f32) -> (Vec2, SweepResult) {
        let kind = path.kind;
        let (t, clear) = self.retreat(shape, path, hit_t);
        let joint = path.at(t);
        if !clear {
            warn!(?kind, "back-off found no clear position, keeping start");
            let result = SweepResult { kind, outcome: SweepOutcome::Unresolved, hit: TileHit::default() };
            return (joint, result);
        }

        let keep_x = Vec2::new(path.target.x, joint.y);
        if self.slides_clear(shape, joint, keep_x) {
            let result = SweepResult { kind, outcome: SweepOutcome::Blocked, hit: TileHit::along_y(path.dir.y) };
            return (keep_x, result);
        }

        let keep_y = Vec2::new(joint.x, path.target.y);
        if self.slides_clear(shape, joint, keep_y) {
            let result = SweepResult { kind, outcome: SweepOutcome::Blocked, hit: TileHit::along_x(path.dir.x) };
            return (keep_y, result);
        }

        let hit = merge(TileHit::along_x(path.dir.x), TileHit::along_y(path.dir.y));
        let mut y = joint.y;
        for _ in 0..self.cfg.max_fallback_steps {
            let next = y + path.dir.y;
            if self.blocked(shape, Vec2::new(joint.x, next)) {
                let result = SweepResult { kind, outcome: SweepOutcome::Blocked, hit };
                return (Vec2::new(joint.x, y), result);
            }
            y = next;
        }
        warn!(
            steps = self.cfg.max_fallback_steps,
            x = joint.x,
            y = joint.y,
            "diagonal fallback exceeded its bound, leaving body at back-off point"
        );
        (joint, SweepResult { kind, outcome: SweepOutcome::Unresolved, hit })
    }
}

fn merge(a: TileHit, b: TileHit) -> TileHit {
    TileHit {
        top: a.top || b.top,
        bottom: a.bottom || b.bottom,
        left: a.left || b.left,
        right: a.right || b.right,
    }
}

/// Resolve a body's motion from `old` to `current` against `map`.
pub fn resolve_swept_motion<M: TileQuery + ?Sized>(
    map: &M,
    old: &mut Body,
    current: &mut Body,
    cfg: &CollisionConfig,
) -> SweepResult {
    SweptResolver::new(map, cfg).resolve(old, current)
}
