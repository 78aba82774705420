use fixedbitset::FixedBitSet;
use glam::Vec2;
use tracing::{debug, trace};

use std::time::Instant;

use crate::api::{Collidable, CollisionWorldApi, NarrowphaseApi, PlayerCollidable, TileQuery};
use crate::error::ConfigError;
use crate::narrowphase::Narrowphase;
use crate::types::*;

/// Per-frame view of the live entities, one collection per group.
pub struct Scene<'a, P, H, K, U> {
    pub projectiles: &'a mut Vec<P>,
    pub hostiles: &'a mut Vec<H>,
    pub pickups: &'a mut Vec<K>,
    pub player: &'a mut U,
}

impl<'a, P, H, K, U> Scene<'a, P, H, K, U> {
    pub fn new(
        projectiles: &'a mut Vec<P>,
        hostiles: &'a mut Vec<H>,
        pickups: &'a mut Vec<K>,
        player: &'a mut U,
    ) -> Self {
        Self { projectiles, hostiles, pickups, player }
    }
}

/// Collision core: map queries, swept resolution and the frame dispatch loop.
pub struct CollisionWorld {
    pub cfg: CollisionConfig,
    pub frame_counter: u32,

    // Tombstones for the pass in progress, indexed like the scene collections.
    removed_projectiles: FixedBitSet,
    removed_hostiles: FixedBitSet,
    removed_pickups: FixedBitSet,

    last_timing: Option<DispatchTiming>,
}

impl CollisionWorldApi for CollisionWorld {
    fn new(cfg: CollisionConfig) -> Self {
        Self {
            cfg,
            frame_counter: 0,
            removed_projectiles: FixedBitSet::new(),
            removed_hostiles: FixedBitSet::new(),
            removed_pickups: FixedBitSet::new(),
            last_timing: None,
        }
    }

    fn overlaps(&self, a: &Body, b: &Body) -> bool {
        Narrowphase::overlap_within(a, b, Vec2::ZERO, self.cfg.overlap_tolerance)
    }

    fn overlaps_offset(&self, a: &Body, b: &Body, offset: Vec2) -> bool {
        Narrowphase::overlap_within(a, b, offset, self.cfg.overlap_tolerance)
    }

    fn collides_with_map<M: TileQuery + ?Sized>(&self, map: &M, body: &Body) -> bool {
        crate::map::collides_with_map(map, body, &self.cfg)
    }

    fn resolve_swept_motion<M: TileQuery + ?Sized>(
        &self,
        map: &M,
        old: &mut Body,
        current: &mut Body,
    ) -> SweepResult {
        crate::sweep::resolve_swept_motion(map, old, current, &self.cfg)
    }

    fn run_collision_pass<P, H, K, U>(&mut self, scene: Scene<'_, P, H, K, U>) -> DispatchReport
    where
        P: Collidable,
        H: Collidable,
        K: Collidable,
        U: PlayerCollidable,
    {
        let Scene { projectiles, hostiles, pickups, player } = scene;
        let timing = self.cfg.enable_timing;
        let t_all = if timing { Some(Instant::now()) } else { None };
        let mut report = DispatchReport::default();
        let mut times = DispatchTiming::default();

        self.frame_counter = self.frame_counter.wrapping_add(1);
        reset(&mut self.removed_projectiles, projectiles.len());
        reset(&mut self.removed_hostiles, hostiles.len());
        reset(&mut self.removed_pickups, pickups.len());

        let t0 = if timing { Some(Instant::now()) } else { None };
        self.projectiles_vs_hostiles(projectiles, hostiles, &mut report);
        times.projectile_hostile_ms = elapsed_ms(t0);

        let t1 = if timing { Some(Instant::now()) } else { None };
        self.hostiles_vs_hostiles(hostiles, &mut report);
        times.hostile_hostile_ms = elapsed_ms(t1);

        if player.liveness().is_alive() {
            let t2 = if timing { Some(Instant::now()) } else { None };
            self.hostiles_vs_player(hostiles, player, &mut report);
            times.hostile_player_ms = elapsed_ms(t2);

            let t3 = if timing { Some(Instant::now()) } else { None };
            self.pickups_vs_player(pickups, player, &mut report);
            times.pickup_player_ms = elapsed_ms(t3);
        } else {
            report.player_passes_skipped = true;
        }

        let t4 = if timing { Some(Instant::now()) } else { None };
        report.projectiles_removed = drain_marked(projectiles, &self.removed_projectiles);
        report.hostiles_removed = drain_marked(hostiles, &self.removed_hostiles);
        report.pickups_removed = drain_marked(pickups, &self.removed_pickups);
        times.removal_ms = elapsed_ms(t4);

        if t_all.is_some() {
            times.total_ms = elapsed_ms(t_all);
            report.timing = Some(times);
        }
        self.last_timing = report.timing;

        debug!(
            frame = self.frame_counter,
            pairs = report.pairs_tested,
            reactions = report.reactions,
            projectiles_removed = report.projectiles_removed,
            hostiles_removed = report.hostiles_removed,
            pickups_removed = report.pickups_removed,
            player_skipped = report.player_passes_skipped,
            "collision pass done"
        );
        report
    }
}

impl CollisionWorld {
    /// As `new`, rejecting invalid configurations.
    pub fn try_new(cfg: CollisionConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(<Self as CollisionWorldApi>::new(cfg))
    }

    /// Return timing breakdown for the last `run_collision_pass`.
    pub fn timing(&self) -> Option<DispatchTiming> {
        self.last_timing
    }

    fn live<T: Collidable>(item: &T, removed: &FixedBitSet, idx: usize) -> bool {
        !removed.contains(idx) && item.liveness().is_alive()
    }

    fn record(
        &self,
        report: &mut DispatchReport,
        pass: DispatchPass,
        receiver: CollisionGroup,
        receiver_index: usize,
        event: CollisionEvent,
        response: HitResponse,
    ) {
        report.reactions += 1;
        trace!(?pass, ?receiver, receiver_index, other = ?event.group, hint = ?event.hint, ?response, "collision");
        if self.cfg.record_events && report.records.len() < self.cfg.max_events {
            report.records.push(DispatchRecord { pass, receiver, receiver_index, event, response });
        }
    }

    /// Each projectile hits at most one hostile per pass. The hostile reacts
    /// first, then the projectile, which is spent for the rest of the pass.
    fn projectiles_vs_hostiles<P: Collidable, H: Collidable>(
        &mut self,
        projectiles: &mut [P],
        hostiles: &mut [H],
        report: &mut DispatchReport,
    ) {
        let pass = DispatchPass::ProjectileHostile;
        for i in 0..projectiles.len() {
            if !Self::live(&projectiles[i], &self.removed_projectiles, i) {
                continue;
            }
            let pb = projectiles[i].body();
            for j in 0..hostiles.len() {
                if !Self::live(&hostiles[j], &self.removed_hostiles, j) {
                    continue;
                }
                let hb = hostiles[j].body();
                report.pairs_tested += 1;
                if !self.overlaps(&pb, &hb) {
                    continue;
                }

                let from = Contact { group: CollisionGroup::Projectile, index: i, body: pb };
                let ev = CollisionEvent::with(from);
                let resp = hostiles[j].on_collision(ev);
                self.record(report, pass, CollisionGroup::Hostile, j, ev, resp);
                if resp == HitResponse::Remove {
                    self.removed_hostiles.insert(j);
                }

                let target = Contact { group: CollisionGroup::Hostile, index: j, body: hb };
                let ev = CollisionEvent::with(target);
                let resp = projectiles[i].on_collision(ev);
                self.record(report, pass, CollisionGroup::Projectile, i, ev, resp);
                if resp == HitResponse::Remove {
                    self.removed_projectiles.insert(i);
                }
                break;
            }
        }
    }

    /// Unordered hostile pairs; both sides react, the later one first.
    fn hostiles_vs_hostiles<H: Collidable>(&mut self, hostiles: &mut [H], report: &mut DispatchReport) {
        let pass = DispatchPass::HostileHostile;
        for i in 0..hostiles.len() {
            for j in (i + 1)..hostiles.len() {
                // A reaction may have killed `i` mid-scan.
                if !Self::live(&hostiles[i], &self.removed_hostiles, i) {
                    break;
                }
                if !Self::live(&hostiles[j], &self.removed_hostiles, j) {
                    continue;
                }
                let a = Contact { group: CollisionGroup::Hostile, index: i, body: hostiles[i].body() };
                let b = Contact { group: CollisionGroup::Hostile, index: j, body: hostiles[j].body() };
                report.pairs_tested += 1;
                if !self.overlaps(&a.body, &b.body) {
                    continue;
                }

                let ev = CollisionEvent::with(a);
                let resp = hostiles[j].on_collision(ev);
                self.record(report, pass, CollisionGroup::Hostile, j, ev, resp);
                if resp == HitResponse::Remove {
                    self.removed_hostiles.insert(j);
                }

                let ev = CollisionEvent::with(b);
                let resp = hostiles[i].on_collision(ev);
                self.record(report, pass, CollisionGroup::Hostile, i, ev, resp);
                if resp == HitResponse::Remove {
                    self.removed_hostiles.insert(i);
                }
            }
        }
    }

    /// A player that was above the hostile's midline last frame and is moving
    /// down squishes it; any other contact hurts the player.
    fn hostiles_vs_player<H: Collidable, U: PlayerCollidable>(
        &mut self,
        hostiles: &mut [H],
        player: &mut U,
        report: &mut DispatchReport,
    ) {
        let pass = DispatchPass::HostilePlayer;
        for i in 0..hostiles.len() {
            if !player.liveness().is_alive() {
                break;
            }
            if !Self::live(&hostiles[i], &self.removed_hostiles, i) {
                continue;
            }
            let hb = hostiles[i].body();
            let pb = player.body();
            report.pairs_tested += 1;
            if !self.overlaps_offset(&hb, &pb, Vec2::ZERO) {
                continue;
            }

            let prev = player.previous_body();
            let descending = prev.y() < pb.y();
            let above_midline = prev.bottom() < hb.y() + hb.height() / 2.0;
            if descending && above_midline {
                let ev = CollisionEvent::hinted(
                    Contact { group: CollisionGroup::Player, index: 0, body: pb },
                    CollisionHint::Squish,
                );
                let resp = hostiles[i].on_collision(ev);
                self.record(report, pass, CollisionGroup::Hostile, i, ev, resp);
                if resp == HitResponse::Remove {
                    self.removed_hostiles.insert(i);
                }
            } else {
                let ev = CollisionEvent::with(Contact { group: CollisionGroup::Hostile, index: i, body: hb });
                let resp = player.on_collision(ev);
                self.record(report, pass, CollisionGroup::Player, 0, ev, resp);
                if resp == HitResponse::Remove {
                    report.player_remove_requested = true;
                }
            }
        }
    }

    fn pickups_vs_player<K: Collidable, U: PlayerCollidable>(
        &mut self,
        pickups: &mut [K],
        player: &mut U,
        report: &mut DispatchReport,
    ) {
        let pass = DispatchPass::PickupPlayer;
        for i in 0..pickups.len() {
            if !player.liveness().is_alive() {
                break;
            }
            if !Self::live(&pickups[i], &self.removed_pickups, i) {
                continue;
            }
            let pb = player.body();
            report.pairs_tested += 1;
            if !self.overlaps(&pickups[i].body(), &pb) {
                continue;
            }
            let ev = CollisionEvent::with(Contact { group: CollisionGroup::Player, index: 0, body: pb });
            let resp = pickups[i].on_collision(ev);
            self.record(report, pass, CollisionGroup::Pickup, i, ev, resp);
            if resp == HitResponse::Remove {
                self.removed_pickups.insert(i);
            }
        }
    }
}

fn reset(set: &mut FixedBitSet, len: usize) {
    set.clear();
    set.grow(len);
}

fn elapsed_ms(t: Option<Instant>) -> f64 {
    t.map(|t| t.elapsed().as_secs_f64() * 1000.0).unwrap_or(0.0)
}

/// Drop tombstoned items, preserving the order of the rest.
fn drain_marked<T>(items: &mut Vec<T>, marked: &FixedBitSet) -> usize {
    let before = items.len();
    let mut idx = 0;
    items.retain(|_| {
        let keep = !marked.contains(idx);
        idx += 1;
        keep
    });
    before - items.len()
}
