use glam::Vec2;
use tilebonk::*;

struct Actor {
    name: &'static str,
    body: Body,
    previous: Body,
    liveness: Liveness,
}

impl Actor {
    fn new(name: &'static str, x: f32, y: f32, w: f32, h: f32) -> Self {
        let body = Body::new(x, y, w, h);
        Self { name, body, previous: body, liveness: Liveness::Alive }
    }
}

impl Collidable for Actor {
    fn body(&self) -> Body {
        self.body
    }

    fn liveness(&self) -> Liveness {
        self.liveness
    }

    fn on_collision(&mut self, event: CollisionEvent) -> HitResponse {
        println!("{} <- {:?} (hint {:?})", self.name, event.group, event.hint);
        match (event.group, event.hint) {
            (CollisionGroup::Player, Some(CollisionHint::Squish)) => {
                self.liveness = Liveness::Dying;
                HitResponse::Continue
            }
            (CollisionGroup::Hostile, _) if self.name == "bullet" => HitResponse::Remove,
            (CollisionGroup::Player, None) if self.name == "coin" => HitResponse::Remove,
            _ => HitResponse::Continue,
        }
    }
}

impl PlayerCollidable for Actor {
    fn previous_body(&self) -> Body {
        self.previous
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let map = TileGrid::from_ascii(
        &[
            "................",
            "................",
            "................",
            "..........#.....",
            "..........#.....",
            "################",
        ],
        TILE_SIZE,
    )?;
    let mut world = CollisionWorld::try_new(CollisionConfig { enable_timing: true, ..Default::default() })?;

    // A fast fall is caught by the floor instead of tunnelling through it.
    let mut old = Body::new(32.0, 0.0, 16.0, 32.0);
    let mut current = old.translated(Vec2::new(0.0, 120.0));
    let r = world.resolve_swept_motion(&map, &mut old, &mut current);
    println!("fall: {:?} -> y={} hit={:?}", r.outcome, old.pos.y, r.hit);

    // Running diagonally into the pillar keeps the vertical part of the motion.
    let mut old = Body::new(120.0, 20.0, 16.0, 16.0);
    let mut current = old.translated(Vec2::new(60.0, 30.0));
    let r = world.resolve_swept_motion(&map, &mut old, &mut current);
    println!("dash: {:?} {:?} -> ({}, {}) hit={:?}", r.kind, r.outcome, old.pos.x, old.pos.y, r.hit);

    let mut projectiles = vec![Actor::new("bullet", 200.0, 60.0, 8.0, 8.0)];
    let mut hostiles = vec![
        Actor::new("walker", 196.0, 56.0, 16.0, 16.0),
        Actor::new("hopper", 64.0, 48.0, 32.0, 32.0),
    ];
    let mut pickups = vec![Actor::new("coin", 40.0, 20.0, 8.0, 8.0)];
    let mut player = Actor::new("player", 64.0, 20.0, 16.0, 32.0);
    player.previous = Body::new(64.0, 10.0, 16.0, 32.0);

    let report = world.run_collision_pass(Scene::new(&mut projectiles, &mut hostiles, &mut pickups, &mut player));
    println!(
        "pass: pairs={} reactions={} removed p/h/k={}/{}/{}",
        report.pairs_tested,
        report.reactions,
        report.projectiles_removed,
        report.hostiles_removed,
        report.pickups_removed
    );
    if let Some(t) = world.timing() {
        println!("timing: total={:.3}ms", t.total_ms);
    }
    Ok(())
}
