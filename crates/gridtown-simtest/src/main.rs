//! Gridtown Headless Simulation Harness
//!
//! Validates the map, routing, and engine behavior without rendering or
//! transport. Runs entirely in-process — no window, no sockets.
//!
//! Usage:
//!   cargo run -p gridtown-simtest
//!   cargo run -p gridtown-simtest -- --verbose
//!   cargo run -p gridtown-simtest -- --config sim.json

use gridtown_core::config::SimConfig;
use gridtown_core::engine::SimulationEngine;
use gridtown_core::events::SimEvent;
use gridtown_core::generation::{generate_city, walkable_connected};
use gridtown_core::snapshot::WorldSnapshot;
use gridtown_logic::tile::Exits;
use gridtown_logic::{
    Coordinates, Direction, Geography, Pathfinder, Position, Tile, TileKind, Trajectory,
};

use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: String) -> Self {
        Self {
            name: name.to_string(),
            passed,
            detail,
        }
    }
}

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let config = load_config(&args);
    log::info!("harness running with seed {}", config.seed);

    println!("=== Gridtown Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Map generation invariants
    results.extend(validate_geography(&config, verbose));

    // 2. Routing across the generated city
    results.extend(validate_routing(&config, verbose));

    // 3. Trajectory laws on a hand-built strip
    results.extend(validate_trajectories(verbose));

    // 4. Full engine run
    results.extend(validate_engine(&config, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

/// Reads `--config <path>` (JSON-encoded [`SimConfig`]) or falls back to the
/// defaults.
fn load_config(args: &[String]) -> SimConfig {
    let Some(index) = args.iter().position(|a| a == "--config") else {
        return SimConfig::default();
    };
    let Some(path) = args.get(index + 1) else {
        eprintln!("--config requires a path");
        std::process::exit(2);
    };
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("cannot read {}: {}", path, e);
            std::process::exit(2);
        }
    };
    match serde_json::from_str(&text) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("cannot parse {}: {}", path, e);
            std::process::exit(2);
        }
    }
}

// ── 1. Map generation ───────────────────────────────────────────────────

fn validate_geography(config: &SimConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Map Generation ---");
    let mut results = Vec::new();

    let mut rng = StdRng::seed_from_u64(config.seed);
    let map = generate_city(config, &mut rng);

    results.push(TestResult::new(
        "map_dimensions",
        map.width() == config.width && map.height() == config.height,
        format!("{}x{} tiles", map.width(), map.height()),
    ));

    results.push(TestResult::new(
        "walkable_seed",
        map.walkable_seed().is_walkable(),
        format!("seed tile at {:?}", map.walkable_seed().coords),
    ));

    let connected = walkable_connected(&map);
    let walkable = map.tiles().filter(|t| t.is_walkable()).count();
    results.push(TestResult::new(
        "walkable_graph_connected",
        connected,
        format!("{} walkable tiles", walkable),
    ));

    let mut bad_exits = 0;
    for tile in map.tiles() {
        for dir in Direction::ALL {
            let neighbor_walkable = map
                .get(tile.coords.step(dir))
                .map_or(false, |t| t.is_walkable());
            if tile.allows_exit(dir) != (tile.is_walkable() && neighbor_walkable) {
                bad_exits += 1;
            }
        }
    }
    results.push(TestResult::new(
        "exits_match_walkability",
        bad_exits == 0,
        format!("{} inconsistent exit flags", bad_exits),
    ));

    let buildings_on_roads = map
        .tiles()
        .filter(|t| matches!(t.kind, TileKind::House | TileKind::Bank))
        .filter(|t| t.coords.col % config.block_size == 0 || t.coords.row % config.block_size == 0)
        .count();
    results.push(TestResult::new(
        "buildings_off_roads",
        buildings_on_roads == 0,
        format!("{} building tiles on road lines", buildings_on_roads),
    ));

    if verbose {
        let banks = map.tiles().filter(|t| t.kind == TileKind::Bank).count();
        let houses = map.tiles().filter(|t| t.kind == TileKind::House).count();
        println!("  {} bank tiles, {} house tiles", banks, houses);
    }

    results
}

// ── 2. Routing ──────────────────────────────────────────────────────────

fn validate_routing(config: &SimConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Routing ---");
    let mut results = Vec::new();

    let mut rng = StdRng::seed_from_u64(config.seed);
    let map = generate_city(config, &mut rng);
    let mut pathfinder = Pathfinder::new();

    let block = config.block_size;
    let far_col = ((config.width - 1) / block) * block;
    let far_row = ((config.height - 1) / block) * block;
    let pairs = [
        (Coordinates::new(0, 0), Coordinates::new(far_col, far_row)),
        (Coordinates::new(far_col, 0), Coordinates::new(0, far_row)),
        (Coordinates::new(0, 0), Coordinates::new(block, 0)),
    ];

    let mut invalid = 0;
    let mut asymmetric = 0;
    for (start, target) in pairs {
        let forward = pathfinder.route(&map, start, target);
        if !route_is_valid(&map, &forward, start, target) {
            invalid += 1;
        }
        let manhattan = (target.col - start.col).abs() + (target.row - start.row).abs();
        if (forward.len() as i32) < manhattan + 1 {
            invalid += 1;
        }
        // Streets are two-way, so the return trip has the same length.
        let back = pathfinder.route(&map, target, start);
        if back.len() != forward.len() {
            asymmetric += 1;
        }
        if verbose {
            println!(
                "  {:?} -> {:?}: {} tiles",
                start,
                target,
                forward.len(),
            );
        }
    }

    results.push(TestResult::new(
        "routes_are_valid",
        invalid == 0,
        format!("{} invalid routes across {} pairs", invalid, pairs.len()),
    ));
    results.push(TestResult::new(
        "round_trips_symmetric",
        asymmetric == 0,
        format!("{} asymmetric round trips", asymmetric),
    ));

    results
}

fn route_is_valid(
    map: &Geography,
    route: &[Coordinates],
    start: Coordinates,
    target: Coordinates,
) -> bool {
    if route.first() != Some(&start) || route.last() != Some(&target) {
        return false;
    }
    route.windows(2).all(|pair| {
        Direction::ALL
            .into_iter()
            .find(|&d| pair[0].step(d) == pair[1])
            .map_or(false, |d| map.tile(pair[0]).allows_exit(d))
    })
}

// ── 3. Trajectories ─────────────────────────────────────────────────────

fn validate_trajectories(verbose: bool) -> Vec<TestResult> {
    println!("--- Trajectories ---");
    let mut results = Vec::new();

    // Three walkable tiles in a row.
    let tiles = (0..3)
        .map(|col| {
            Tile::new(Coordinates::new(col, 0), TileKind::RoadH)
                .with_speed(1.0)
                .with_exits(Exits {
                    north: false,
                    south: false,
                    east: col < 2,
                    west: col > 0,
                })
        })
        .collect();
    let map = Geography::new(3, 1, tiles, Coordinates::new(0, 0));
    let mut pathfinder = Pathfinder::new();

    let mut trajectory = Trajectory::plan(
        Position::new(0.5, 0.5),
        Position::new(2.5, 0.5),
        &map,
        &mut pathfinder,
    );
    let mut ticks = 0;
    while !trajectory.has_arrived() && ticks < 100 {
        trajectory.update(0.1, 1.0, &map);
        ticks += 1;
    }
    let position = trajectory.position();
    let on_target = position.distance(&Position::new(2.5, 0.5)) < 0.1;
    results.push(TestResult::new(
        "strip_walk_arrives",
        trajectory.has_arrived() && on_target && ticks <= 21,
        format!("arrived at ({:.2}, {:.2}) after {} ticks", position.x, position.y, ticks),
    ));

    // Half-step snap boundary.
    let mut snap = Trajectory::from_waypoints([
        Position::new(1.75, 0.5),
        Position::new(2.5, 0.5),
    ]);
    snap.update(0.5, 1.0, &map);
    results.push(TestResult::new(
        "half_step_snap",
        snap.has_arrived(),
        format!("arrived={}", snap.has_arrived()),
    ));

    // Arrival idempotence.
    let before = snap.position();
    snap.update(1.0, 5.0, &map);
    results.push(TestResult::new(
        "arrival_idempotent",
        snap.position() == before,
        format!("position stable at ({:.2}, {:.2})", before.x, before.y),
    ));

    if verbose {
        println!("  strip walk took {} ticks", ticks);
    }

    results
}

// ── 4. Engine run ───────────────────────────────────────────────────────

fn validate_engine(config: &SimConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Engine ---");
    let mut results = Vec::new();

    let run_config = SimConfig {
        npc_count: config.npc_count.min(100),
        ..config.clone()
    };
    let npc_count = run_config.npc_count;
    let mut engine = SimulationEngine::new(run_config);
    engine.populate();
    let spawned = engine.drain_events().len();
    results.push(TestResult::new(
        "population_spawned",
        spawned == npc_count,
        format!("{} NPCs spawned", spawned),
    ));

    let mut arrivals = 0;
    let mut notices = 0;
    for _ in 0..600 {
        engine.update(0.25);
        for event in engine.drain_events() {
            if matches!(event, SimEvent::NpcArrived { .. }) {
                arrivals += 1;
            }
            // Arrivals are what clients get told about.
            if event.arrival_notice().is_some() {
                notices += 1;
            }
        }
    }
    results.push(TestResult::new(
        "arrivals_observed",
        arrivals > 0,
        format!("{} arrivals in {:.0} simulated seconds", arrivals, engine.sim_time()),
    ));
    results.push(TestResult::new(
        "arrival_notices_match",
        notices == arrivals,
        format!("{} notices for {} arrivals", notices, arrivals),
    ));

    let occupants: usize = engine.geography.tiles().map(|t| t.npcs.len()).sum();
    results.push(TestResult::new(
        "occupancy_consistent",
        occupants == engine.npc_count(),
        format!("{} occupants for {} NPCs", occupants, engine.npc_count()),
    ));

    let snapshot = engine.snapshot();
    let in_bounds = snapshot.npcs.iter().all(|npc| {
        engine.geography.in_bounds(npc.position.tile_coords())
            && engine.geography.tile(npc.position.tile_coords()).is_walkable()
    });
    results.push(TestResult::new(
        "agents_on_walkable_tiles",
        in_bounds,
        format!("{} NPC states checked", snapshot.npcs.len()),
    ));

    let round_trip = snapshot
        .encode()
        .ok()
        .and_then(|bytes| WorldSnapshot::decode(&bytes).ok())
        .map_or(false, |decoded| decoded == snapshot);
    results.push(TestResult::new(
        "snapshot_round_trip",
        round_trip,
        format!("{} bytes", snapshot.encode().map(|b| b.len()).unwrap_or(0)),
    ));

    if verbose {
        let explored = snapshot.explored.iter().filter(|&&e| e).count();
        println!(
            "  tick {}, {} tiles explored, {} moving",
            engine.tick(),
            explored,
            engine.moving_count(),
        );
    }

    results
}
