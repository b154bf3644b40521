use doomcaster::{
    config::MAX_HEALTH,
    entity::{Entity, EntityKind, MEDKIT_HEAL, ROCKET_DAMAGE, ROCKET_SPEED},
    player::MoveIntent,
    raycast::{cast_columns, Camera, DepthBuffer},
    score::MemoryScoreStore,
    simulation::{FrameInput, GamePhase, Simulation},
    world::WorldGrid,
};
use macroquad::math::Vec2;

fn open_room(size: usize) -> WorldGrid {
    let mut grid = WorldGrid::filled(size, 1);
    for y in 1..size - 1 {
        for x in 1..size - 1 {
            grid.set(x, y, 0);
        }
    }
    grid
}

fn sim_with(store: MemoryScoreStore, grid: WorldGrid, spawn: Vec2, entities: Vec<Entity>) -> Simulation {
    Simulation::from_seed(42, 3, Box::new(store)).with_level(grid, spawn, entities)
}

fn idle() -> FrameInput {
    FrameInput::default()
}

fn rockets(sim: &Simulation) -> Vec<&Entity> {
    sim.entities()
        .iter()
        .filter(|e| matches!(e.kind, EntityKind::Rocket(_)))
        .collect()
}

fn rocket_distance(sim: &Simulation) -> Option<f32> {
    rockets(sim)
        .first()
        .map(|rocket| rocket.position.distance(sim.player().position))
}

#[test]
fn center_column_reports_distance_to_single_wall() {
    let mut grid = WorldGrid::open(16);
    grid.set(5, 3, 1);
    let camera = Camera::new(Vec2::new(1.5, 3.5), 0.0, 66.0);
    let mut depth = DepthBuffer::new(0);
    let columns = cast_columns(&grid, &camera, 100, 1, &mut depth);
    let center = columns.iter().find(|c| c.x == 50).unwrap();
    assert!((center.hit.distance - 3.5).abs() < 1e-4, "got {}", center.hit.distance);
    assert_eq!(depth.get(50), Some(center.hit.distance));

    // the same wall is off to the side when the player stands two rows up
    let camera = Camera::new(Vec2::new(1.5, 1.5), 0.0, 66.0);
    let columns = cast_columns(&grid, &camera, 100, 1, &mut depth);
    let center = columns.iter().find(|c| c.x == 50).unwrap();
    assert_eq!(center.hit.distance, doomcaster::raycast::SENTINEL_DISTANCE);
}

#[test]
fn enemy_with_clear_sight_fires_exactly_one_rocket_at_player() {
    let player = Vec2::new(2.5, 5.5);
    let mut sim = sim_with(
        MemoryScoreStore::default(),
        open_room(16),
        player,
        vec![Entity::enemy(Vec2::new(7.5, 5.5))],
    );
    sim.tick(&idle());

    let fired = rockets(&sim);
    assert_eq!(fired.len(), 1);
    let rocket = fired[0];
    let EntityKind::Rocket(ref flight) = rocket.kind else {
        unreachable!()
    };
    let aim = (player - rocket.position).normalize();
    assert!((flight.velocity.normalize() - aim).length() < 1e-4);
    assert!((flight.velocity.length() - ROCKET_SPEED).abs() < 1e-5);

    // cooldown holds the next shot back
    sim.tick(&idle());
    assert_eq!(rockets(&sim).len(), 1);
}

#[test]
fn rocket_closes_distance_every_tick_until_impact() {
    let player = Vec2::new(5.5, 10.5);
    let mut sim = sim_with(
        MemoryScoreStore::default(),
        open_room(16),
        player,
        vec![Entity::rocket(Vec2::new(5.5, 2.5), player)],
    );

    let mut last = f32::INFINITY;
    let mut ticks = 0;
    while let Some(distance) = rocket_distance(&sim) {
        assert!(distance < last, "rocket moved away at tick {ticks}");
        last = distance;
        sim.tick(&idle());
        ticks += 1;
        assert!(ticks < 500, "rocket never arrived");
    }
    assert_eq!(sim.player().health(), MAX_HEALTH - ROCKET_DAMAGE);
}

#[test]
fn lethal_damage_defeats_once_and_keeps_higher_best() {
    let store = MemoryScoreStore::with_best(100);
    let mut sim = sim_with(store.clone(), open_room(8), Vec2::new(1.5, 1.5), Vec::new());
    sim.add_score(40);
    sim.damage_player(MAX_HEALTH - 10);
    assert_eq!(sim.player().health(), 10);
    assert_eq!(sim.phase(), GamePhase::Playing);

    sim.damage_player(50);
    assert_eq!(sim.player().health(), 0);
    assert_eq!(sim.phase(), GamePhase::Defeated);
    assert_eq!(sim.best_score(), 100);
    assert_eq!(store.saves(), 0);
}

#[test]
fn lethal_damage_records_new_best_exactly_once() {
    let store = MemoryScoreStore::with_best(10);
    let mut sim = sim_with(store.clone(), open_room(8), Vec2::new(1.5, 1.5), Vec::new());
    assert_eq!(sim.best_score(), 10);
    sim.add_score(40);
    sim.damage_player(MAX_HEALTH - 10);
    sim.damage_player(50);
    sim.damage_player(50);
    assert_eq!(sim.phase(), GamePhase::Defeated);
    assert_eq!(sim.best_score(), 40);
    assert_eq!(store.best(), 40);
    assert_eq!(store.saves(), 1);

    // ticks are frozen once defeated
    let ticks = sim.ticks();
    sim.tick(&idle());
    assert_eq!(sim.ticks(), ticks);
}

#[test]
fn medkit_heals_up_to_the_cap_and_is_consumed() {
    let spawn = Vec2::new(2.5, 2.5);
    let mut sim = sim_with(
        MemoryScoreStore::default(),
        open_room(8),
        spawn,
        vec![Entity::medkit(Vec2::new(2.8, 2.5))],
    );
    sim.damage_player(40);
    sim.tick(&idle());
    assert_eq!(sim.player().health(), MAX_HEALTH - 40 + MEDKIT_HEAL);
    assert!(sim.entities().is_empty());

    let mut sim = sim_with(
        MemoryScoreStore::default(),
        open_room(8),
        spawn,
        vec![Entity::medkit(Vec2::new(2.8, 2.5))],
    );
    sim.damage_player(10);
    sim.tick(&idle());
    assert_eq!(sim.player().health(), MAX_HEALTH);
    for _ in 0..5 {
        sim.tick(&idle());
    }
    assert_eq!(sim.player().health(), MAX_HEALTH);
}

#[test]
fn portal_regenerates_level_without_carrying_itself_over() {
    let mut sim = sim_with(
        MemoryScoreStore::default(),
        open_room(16),
        Vec2::new(3.5, 3.5),
        vec![Entity::portal(Vec2::new(4.0, 3.5))],
    );
    let old_portal = sim.entities()[0].id;
    sim.tick(&idle());

    assert_eq!(sim.level().number, 2);
    assert_eq!(sim.score(), 100);
    assert_eq!(sim.grid().size(), 64);
    assert!(sim.entities().iter().all(|e| e.id != old_portal));
    let portals: Vec<_> = sim.entities().iter().filter(|e| e.kind == EntityKind::Portal).collect();
    assert_eq!(portals.len(), 1);
    assert_eq!(sim.player().position, Vec2::new(1.5, 1.5));
    assert!(portals[0].distance_to_player >= 1.0);
}

#[test]
fn walking_into_a_wall_does_not_move_the_player() {
    let mut sim = sim_with(MemoryScoreStore::default(), open_room(8), Vec2::new(6.45, 3.5), Vec::new());
    let forward = FrameInput {
        movement: MoveIntent::new(0.0, 1.0),
        ..FrameInput::default()
    };
    for _ in 0..20 {
        sim.tick(&forward);
    }
    let position = sim.player().position;
    assert!(position.x > 6.9 && position.x < 7.0, "stopped at {}", position.x);
    assert!((position.y - 3.5).abs() < 1e-4);
}

#[test]
fn start_game_resets_run_state() {
    let mut sim = sim_with(MemoryScoreStore::default(), open_room(8), Vec2::new(2.5, 2.5), Vec::new());
    sim.add_score(70);
    sim.damage_player(MAX_HEALTH);
    assert_eq!(sim.phase(), GamePhase::Defeated);
    sim.start_game();
    assert_eq!(sim.phase(), GamePhase::Playing);
    assert_eq!(sim.score(), 0);
    assert_eq!(sim.player().health(), MAX_HEALTH);
    assert_eq!(sim.level().number, 1);
    assert_eq!(sim.best_score(), 70);
}
