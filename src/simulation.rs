use macroquad::math::Vec2;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    config::{
        PHYSICS_FRAME_TIME, SCORE_ENEMY_HIT, SCORE_ENEMY_KILL, SCORE_PORTAL, WEAPON_COOLDOWN_TICKS,
        WEAPON_DAMAGE, WEAPON_HIT_RADIUS, WEAPON_RANGE, WEAPON_STEP, WORLD_SIZE,
    },
    entity::{Effect, Entity, EntityId, UpdateContext},
    player::{MoveIntent, Player},
    render::Hud,
    score::BestScoreStore,
    world::{cell_center, generate_level, WorldGrid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    Playing,
    Paused,
    Defeated,
}

/// Everything the host feeds the simulation for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub movement: MoveIntent,
    /// Radians added to the facing angle.
    pub look_delta: f32,
    pub shoot: bool,
    pub toggle_pause: bool,
}

/// One generated level: created at level start, dropped whole on regeneration.
#[derive(Clone, Debug)]
pub struct Level {
    pub number: u32,
    pub grid: WorldGrid,
    pub spawn: Vec2,
    entities: Vec<Entity>,
}

impl Level {
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }
}

#[derive(Debug, Default)]
struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    fn assign(&mut self, mut entity: Entity) -> Entity {
        self.next += 1;
        entity.id = EntityId(self.next);
        entity
    }
}

/// The single owner of grid, player and entities.
pub struct Simulation<R: Rng = StdRng> {
    rng: R,
    store: Box<dyn BestScoreStore>,
    wall_textures: u8,
    world_size: usize,
    ids: IdAllocator,
    player: Player,
    level: Level,
    score: u32,
    best_score: u32,
    phase: GamePhase,
    flash_timer: u32,
    elapsed: f32,
    ticks: u64,
}

impl Simulation<StdRng> {
    pub fn from_seed(seed: u64, wall_textures: u8, store: Box<dyn BestScoreStore>) -> Self {
        Self::new(StdRng::seed_from_u64(seed), wall_textures, store)
    }
}

impl<R: Rng> Simulation<R> {
    pub fn new(rng: R, wall_textures: u8, store: Box<dyn BestScoreStore>) -> Self {
        Self::with_world_size(rng, wall_textures, store, WORLD_SIZE)
    }

    pub fn with_world_size(mut rng: R, wall_textures: u8, store: Box<dyn BestScoreStore>, world_size: usize) -> Self {
        let best_score = store.load().unwrap_or_else(|err| {
            tracing::warn!(%err, "could not load best score, starting from 0");
            0
        });
        let mut ids = IdAllocator::default();
        let level = Self::build_level(&mut rng, &mut ids, world_size, wall_textures, 1);
        let player = Player::spawn(level.spawn);
        Self {
            rng,
            store,
            wall_textures,
            world_size,
            ids,
            player,
            level,
            score: 0,
            best_score,
            phase: GamePhase::Playing,
            flash_timer: 0,
            elapsed: 0.0,
            ticks: 0,
        }
    }

    /// Replaces the level with a hand-built one. Entities get fresh ids.
    pub fn with_level(mut self, grid: WorldGrid, spawn: Vec2, entities: Vec<Entity>) -> Self {
        let mut level = Level {
            number: self.level.number,
            grid,
            spawn,
            entities: Vec::with_capacity(entities.len()),
        };
        for entity in entities {
            let mut entity = self.ids.assign(entity);
            entity.refresh_distance(spawn);
            level.entities.push(entity);
        }
        self.level = level;
        self.player.reset(spawn);
        self
    }

    fn build_level(rng: &mut R, ids: &mut IdAllocator, size: usize, wall_textures: u8, number: u32) -> Level {
        let layout = generate_level(size, wall_textures, rng);
        let mut entities = Vec::with_capacity(layout.enemies.len() + layout.medkits.len() + 1);
        for &(x, y) in &layout.enemies {
            entities.push(ids.assign(Entity::enemy(cell_center(x, y))));
        }
        for &(x, y) in &layout.medkits {
            entities.push(ids.assign(Entity::medkit(cell_center(x, y))));
        }
        entities.push(ids.assign(Entity::portal(cell_center(layout.portal.0, layout.portal.1))));
        for entity in &mut entities {
            entity.refresh_distance(layout.spawn);
        }
        tracing::info!(
            level = number,
            enemies = layout.enemies.len(),
            medkits = layout.medkits.len(),
            portal = ?layout.portal,
            "level generated"
        );
        Level {
            number,
            grid: layout.grid,
            spawn: layout.spawn,
            entities,
        }
    }

    fn regenerate(&mut self, number: u32) {
        self.level = Self::build_level(&mut self.rng, &mut self.ids, self.world_size, self.wall_textures, number);
        self.player.reset(self.level.spawn);
    }

    /// Fresh run: level 1, score 0, full health.
    pub fn start_game(&mut self) {
        self.score = 0;
        self.flash_timer = 0;
        self.player.restore_health();
        self.regenerate(1);
        self.phase = GamePhase::Playing;
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn grid(&self) -> &WorldGrid {
        &self.level.grid
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn entities(&self) -> &[Entity] {
        &self.level.entities
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Remaining muzzle flash in `[0, 1]`.
    pub fn flash_ratio(&self) -> f32 {
        self.flash_timer as f32 / WEAPON_COOLDOWN_TICKS as f32
    }

    pub fn hud(&self) -> Hud {
        Hud {
            health: self.player.health(),
            score: self.score,
            best_score: self.best_score,
            level: self.level.number,
        }
    }

    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            GamePhase::Playing => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Playing,
            GamePhase::Defeated => GamePhase::Defeated,
        };
    }

    /// One fixed step: input, movement, entity update, then the commit of effects.
    pub fn tick(&mut self, input: &FrameInput) {
        if input.toggle_pause {
            self.toggle_pause();
        }
        if self.phase != GamePhase::Playing {
            return;
        }

        self.flash_timer = self.flash_timer.saturating_sub(1);
        if input.shoot {
            self.shoot();
        }

        let player_position = self.player.position;
        for entity in &mut self.level.entities {
            entity.refresh_distance(player_position);
        }

        self.player.turn(input.look_delta);
        self.player.try_move(input.movement, &self.level.grid);

        let effects = self.update_entities();
        self.commit(effects);

        self.elapsed += PHYSICS_FRAME_TIME;
        self.ticks += 1;
    }

    fn update_entities(&mut self) -> Vec<Effect> {
        let ctx = UpdateContext {
            grid: &self.level.grid,
            player_position: self.player.position,
            now: self.elapsed,
        };
        let mut effects = Vec::new();
        for entity in &mut self.level.entities {
            entity.update(&ctx, &mut effects);
        }
        effects
    }

    fn commit(&mut self, effects: Vec<Effect>) {
        let mut portal_reached = false;
        let mut spawned = Vec::new();
        for effect in effects {
            match effect {
                Effect::Spawn(entity) => {
                    let mut entity = self.ids.assign(entity);
                    entity.refresh_distance(self.player.position);
                    spawned.push(entity);
                }
                Effect::DamagePlayer(amount) => self.damage_player(amount),
                Effect::HealPlayer(amount) => self.heal_player(amount),
                Effect::PortalReached => portal_reached = true,
            }
        }

        self.level.entities.retain(|e| e.alive);
        self.level.entities.extend(spawned);

        if portal_reached && self.phase == GamePhase::Playing {
            self.score += SCORE_PORTAL;
            let next = self.level.number + 1;
            tracing::info!(level = next, score = self.score, "portal reached");
            self.regenerate(next);
        }
    }

    /// Hitscan along the facing direction; only fires once the flash has died down.
    pub fn shoot(&mut self) -> bool {
        if self.phase != GamePhase::Playing || self.flash_timer > 0 {
            return false;
        }
        self.flash_timer = WEAPON_COOLDOWN_TICKS;

        let origin = self.player.position;
        let dir = self.player.facing();
        let mut travelled = 0.0;
        while travelled < WEAPON_RANGE {
            let sample = origin + dir * travelled;
            if !self.level.grid.is_open_at(sample) {
                break;
            }
            let target = self
                .level
                .entities
                .iter_mut()
                .find(|e| e.alive && e.is_enemy() && e.position.distance(sample) < WEAPON_HIT_RADIUS);
            if let Some(enemy) = target {
                let killed = enemy.take_damage(WEAPON_DAMAGE);
                self.score += SCORE_ENEMY_HIT;
                if killed {
                    self.score += SCORE_ENEMY_KILL;
                    tracing::debug!(id = ?enemy.id, "enemy killed");
                }
                break;
            }
            travelled += WEAPON_STEP;
        }
        true
    }

    /// Applies damage and handles the one-way switch to `Defeated`.
    /// A defeated player takes no further damage.
    pub fn damage_player(&mut self, amount: i32) {
        if self.phase == GamePhase::Defeated || !self.player.take_damage(amount) {
            return;
        }
        self.phase = GamePhase::Defeated;
        tracing::info!(score = self.score, level = self.level.number, "player defeated");
        if self.score > self.best_score {
            self.best_score = self.score;
            if let Err(err) = self.store.save(self.best_score) {
                tracing::warn!(%err, "could not save best score");
            } else {
                tracing::info!(best = self.best_score, "new best score");
            }
        }
    }

    /// No effect once defeated.
    pub fn heal_player(&mut self, amount: i32) {
        if self.phase == GamePhase::Defeated {
            return;
        }
        self.player.heal(amount);
    }

    pub fn add_score(&mut self, points: u32) {
        self.score += points;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::MAX_HEALTH, entity::EntityKind, score::MemoryScoreStore};

    fn sim() -> Simulation {
        Simulation::from_seed(7, 3, Box::new(MemoryScoreStore::default()))
    }

    fn open_room(size: usize) -> WorldGrid {
        let mut grid = WorldGrid::filled(size, 1);
        for y in 1..size - 1 {
            for x in 1..size - 1 {
                grid.set(x, y, 0);
            }
        }
        grid
    }

    #[test]
    fn new_game_has_exactly_one_portal_and_full_health() {
        let sim = sim();
        let portals = sim.entities().iter().filter(|e| e.kind == EntityKind::Portal).count();
        assert_eq!(portals, 1);
        assert_eq!(sim.player().health(), MAX_HEALTH);
        assert_eq!(sim.level().number, 1);
        assert_eq!(sim.player().position, Vec2::new(1.5, 1.5));
    }

    #[test]
    fn spawned_rocket_joins_live_set_after_commit() {
        let mut sim = sim().with_level(open_room(16), Vec2::new(2.5, 2.5), vec![Entity::enemy(Vec2::new(6.5, 2.5))]);
        sim.tick(&FrameInput::default());
        let rockets = sim
            .entities()
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Rocket(_)))
            .count();
        assert_eq!(rockets, 1);
        assert_eq!(sim.entities().len(), 2);
    }

    #[test]
    fn shooting_damages_first_enemy_in_line() {
        let mut sim = sim().with_level(
            open_room(16),
            Vec2::new(2.5, 2.5),
            vec![Entity::enemy(Vec2::new(12.5, 2.5)), Entity::enemy(Vec2::new(8.5, 2.5))],
        );
        assert!(sim.shoot());
        assert_eq!(sim.score(), SCORE_ENEMY_HIT);
        let near = sim.entities().iter().find(|e| e.position.x == 8.5).unwrap();
        assert_eq!(near.kind, EntityKind::Enemy(crate::entity::Enemy { health: 50, last_shot_at: None }));
        // still cooling down
        assert!(!sim.shoot());
        assert!((sim.flash_ratio() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn killing_an_enemy_awards_kill_bonus() {
        let mut sim = sim().with_level(open_room(16), Vec2::new(2.5, 2.5), vec![Entity::enemy(Vec2::new(5.5, 2.5))]);
        sim.player_mut().turn(std::f32::consts::PI / 2.0);
        sim.shoot();
        assert_eq!(sim.score(), 0, "shot facing away should miss");
        sim.player_mut().turn(-std::f32::consts::PI / 2.0);
        for _ in 0..WEAPON_COOLDOWN_TICKS {
            sim.tick(&FrameInput::default());
        }
        sim.shoot();
        for _ in 0..WEAPON_COOLDOWN_TICKS {
            sim.tick(&FrameInput::default());
        }
        sim.shoot();
        assert_eq!(sim.score(), 2 * SCORE_ENEMY_HIT + SCORE_ENEMY_KILL);
        sim.tick(&FrameInput::default());
        assert!(sim.entities().iter().all(|e| !e.is_enemy()));
    }

    #[test]
    fn pause_freezes_ticks() {
        let mut sim = sim();
        sim.tick(&FrameInput {
            toggle_pause: true,
            ..FrameInput::default()
        });
        assert_eq!(sim.phase(), GamePhase::Paused);
        let ticks = sim.ticks();
        sim.tick(&FrameInput::default());
        assert_eq!(sim.ticks(), ticks);
        sim.toggle_pause();
        sim.tick(&FrameInput::default());
        assert_eq!(sim.ticks(), ticks + 1);
    }

    #[test]
    fn heal_in_the_same_tick_as_a_fatal_hit_is_ignored() {
        let player = Vec2::new(2.5, 2.5);
        let mut sim = sim().with_level(
            open_room(8),
            player,
            vec![Entity::rocket(Vec2::new(2.9, 2.5), player), Entity::medkit(Vec2::new(2.7, 2.5))],
        );
        sim.damage_player(MAX_HEALTH - 10);
        sim.tick(&FrameInput::default());
        assert_eq!(sim.phase(), GamePhase::Defeated);
        assert_eq!(sim.player().health(), 0);

        sim.heal_player(50);
        sim.damage_player(5);
        assert_eq!(sim.player().health(), 0);
        assert_eq!(sim.hud().health, 0);
    }
}
