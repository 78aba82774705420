use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Axis-aligned box in pixel space (top-left origin, +Y down).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Body {
    /// Top-left corner.
    pub pos: Vec2,
    /// Width and height (must be positive).
    pub size: Vec2,
}

impl Body {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Same extent, moved to `pos`.
    pub fn at(self, pos: Vec2) -> Self {
        Self { pos, size: self.size }
    }

    pub fn translated(self, delta: Vec2) -> Self {
        self.at(self.pos + delta)
    }
}

/// Which pairwise checks and reactions apply to an entity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CollisionGroup {
    Projectile,
    Hostile,
    Player,
    Pickup,
}

/// Entities that are not `Alive` take no part in collision checks.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Liveness {
    #[default]
    Alive,
    Dying,
    Dead,
}

impl Liveness {
    #[inline]
    pub fn is_alive(self) -> bool {
        matches!(self, Liveness::Alive)
    }
}

/// Extra qualifier attached to a reaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CollisionHint {
    /// The player landed on top of a hostile.
    Squish,
}

/// Snapshot of the other party in a collision, taken when the hit is detected.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Contact {
    pub group: CollisionGroup,
    /// Index into the group's collection (always 0 for the player).
    pub index: usize,
    pub body: Body,
}

/// Delivered to `Collidable::on_collision`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollisionEvent {
    /// Group of the other party.
    pub group: CollisionGroup,
    pub other: Option<Contact>,
    pub hint: Option<CollisionHint>,
}

impl CollisionEvent {
    pub fn with(other: Contact) -> Self {
        Self {
            group: other.group,
            other: Some(other),
            hint: None,
        }
    }

    pub fn hinted(other: Contact, hint: CollisionHint) -> Self {
        Self {
            hint: Some(hint),
            ..Self::with(other)
        }
    }
}

/// What a reaction asks the dispatcher to do with the receiving entity.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum HitResponse {
    #[default]
    Continue,
    /// Tombstone the entity; it is skipped for the rest of the pass and
    /// dropped from its collection once the pass completes.
    Remove,
}

/// Motion classification chosen by the swept resolver.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MotionKind {
    Stationary,
    Vertical,
    Horizontal,
    Diagonal,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SweepOutcome {
    /// Nothing solid along the path; the proposed position was kept.
    Clear,
    /// A tile stopped the body and a clean placement was found.
    Blocked,
    /// A step bound ran out, or no clear position was found behind the hit.
    /// The body is left at the last clear position reached on the path.
    Unresolved,
}

/// Sides of the body that were stopped by solid tiles.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileHit {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl TileHit {
    pub(crate) fn along_x(dir: f32) -> Self {
        Self {
            left: dir < 0.0,
            right: dir > 0.0,
            ..Self::default()
        }
    }

    pub(crate) fn along_y(dir: f32) -> Self {
        Self {
            top: dir < 0.0,
            bottom: dir > 0.0,
            ..Self::default()
        }
    }

    pub fn any(&self) -> bool {
        self.top || self.bottom || self.left || self.right
    }
}

/// Result of a swept motion resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SweepResult {
    pub kind: MotionKind,
    pub outcome: SweepOutcome,
    pub hit: TileHit,
}

impl SweepResult {
    pub(crate) fn clear(kind: MotionKind) -> Self {
        Self {
            kind,
            outcome: SweepOutcome::Clear,
            hit: TileHit::default(),
        }
    }
}

/// Configuration shared by the map sampler, the resolver and the dispatcher.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CollisionConfig {
    /// Distance between edge samples, and the coarse skip used by the resolver.
    /// Must not exceed the map's tile size or cells along an edge can be
    /// skipped; maps that report a `TileQuery::tile_size` clamp it to that.
    pub sample_spacing: f32,
    /// Inset applied to corner samples so touching a tile is not a hit.
    pub edge_inset: f32,
    /// Minimum penetration on both axes for two bodies to overlap.
    pub overlap_tolerance: f32,
    /// Bound on single-step back-off iterations.
    pub max_backoff_steps: u32,
    /// Bound on the diagonal fallback walk.
    pub max_fallback_steps: u32,
    /// Maximum number of dispatch records kept per pass; extra are dropped.
    pub max_events: usize,
    /// Keep an ordered log of reactions in the `DispatchReport`.
    pub record_events: bool,
    /// Enable per-pass timing (adds small overhead when true).
    pub enable_timing: bool,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            sample_spacing: 16.0,
            edge_inset: 1.0,
            overlap_tolerance: 1.0,
            max_backoff_steps: 4096,
            max_fallback_steps: 4096,
            max_events: 1024,
            record_events: true,
            enable_timing: false,
        }
    }
}

impl CollisionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_spacing > 0.0) {
            return Err(ConfigError::SampleSpacing(self.sample_spacing));
        }
        if !(self.edge_inset >= 0.0) {
            return Err(ConfigError::EdgeInset(self.edge_inset));
        }
        if !(self.overlap_tolerance >= 0.0) {
            return Err(ConfigError::OverlapTolerance(self.overlap_tolerance));
        }
        if self.max_backoff_steps == 0 {
            return Err(ConfigError::ZeroStepBound("max_backoff_steps"));
        }
        if self.max_fallback_steps == 0 {
            return Err(ConfigError::ZeroStepBound("max_fallback_steps"));
        }
        Ok(())
    }
}

/// Dispatch pass a record was produced in, in execution order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DispatchPass {
    ProjectileHostile,
    HostileHostile,
    HostilePlayer,
    PickupPlayer,
}

/// One reaction fired by the dispatcher.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DispatchRecord {
    pub pass: DispatchPass,
    pub receiver: CollisionGroup,
    pub receiver_index: usize,
    pub event: CollisionEvent,
    pub response: HitResponse,
}

/// Timing breakdown for the last collision pass.
#[derive(Copy, Clone, Debug, Default)]
pub struct DispatchTiming {
    pub total_ms: f64,
    pub projectile_hostile_ms: f64,
    pub hostile_hostile_ms: f64,
    pub hostile_player_ms: f64,
    pub pickup_player_ms: f64,
    pub removal_ms: f64,
}

/// Summary of one `run_collision_pass`.
#[derive(Clone, Debug, Default)]
pub struct DispatchReport {
    pub records: Vec<DispatchRecord>,
    /// Pairwise overlap tests performed.
    pub pairs_tested: usize,
    /// Reactions fired (counted even when `records` is capped or disabled).
    pub reactions: usize,
    pub projectiles_removed: usize,
    pub hostiles_removed: usize,
    pub pickups_removed: usize,
    /// The player asked to be removed; the player itself is never dropped.
    pub player_remove_requested: bool,
    /// True when the player was not alive and the player passes were skipped.
    pub player_passes_skipped: bool,
    pub timing: Option<DispatchTiming>,
}
