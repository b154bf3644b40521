use macroquad::math::Vec2;

use crate::{
    config::MAX_HEALTH,
    raycast::has_line_of_sight,
    render::{ScreenRect, SpriteBrush},
    texture::Rgb,
    world::{cell_of, WorldGrid},
};

pub const ENEMY_HEALTH: i32 = 100;
pub const ENEMY_SHOT_COOLDOWN: f32 = 2.0;
pub const ENEMY_SIGHT_RANGE: f32 = 10.0;
pub const ENEMY_SIGHT_STEP: f32 = 0.2;
const ENEMY_MUZZLE_OFFSET: f32 = 0.5;

pub const ROCKET_SPEED: f32 = 0.08;
pub const ROCKET_SCALE: f32 = 0.3;
pub const ROCKET_HIT_RADIUS: f32 = 0.5;
pub const ROCKET_DAMAGE: i32 = 10;

pub const PORTAL_RADIUS: f32 = 0.8;

pub const MEDKIT_RADIUS: f32 = 0.6;
pub const MEDKIT_HEAL: i32 = 25;
pub const MEDKIT_SCALE: f32 = 0.4;

const ENEMY_COLOR: Rgb = Rgb::new(200, 0, 0);
const HEALTH_BAR_COLOR: Rgb = Rgb::new(0, 255, 0);
const ROCKET_COLOR: Rgb = Rgb::new(255, 255, 0);
const MEDKIT_COLOR: Rgb = Rgb::new(0, 150, 0);
const MEDKIT_CROSS_COLOR: Rgb = Rgb::new(255, 255, 255);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub health: i32,
    /// Simulation time of the last rocket; `None` means ready to fire.
    pub last_shot_at: Option<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rocket {
    pub velocity: Vec2,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EntityKind {
    Enemy(Enemy),
    Rocket(Rocket),
    Portal,
    Medkit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub position: Vec2,
    pub distance_to_player: f32,
    pub alive: bool,
    pub scale: f32,
    pub kind: EntityKind,
}

/// Side effects produced while updating; applied by the simulation after the pass.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Spawn(Entity),
    DamagePlayer(i32),
    HealPlayer(i32),
    PortalReached,
}

/// Read-only view of the world an entity may consult during its update.
#[derive(Clone, Copy)]
pub struct UpdateContext<'a> {
    pub grid: &'a WorldGrid,
    pub player_position: Vec2,
    pub now: f32,
}

impl Entity {
    fn new(position: Vec2, scale: f32, kind: EntityKind) -> Self {
        Self {
            id: EntityId::default(),
            position,
            distance_to_player: 0.0,
            alive: true,
            scale,
            kind,
        }
    }

    pub fn enemy(position: Vec2) -> Self {
        Self::new(
            position,
            1.0,
            EntityKind::Enemy(Enemy {
                health: ENEMY_HEALTH,
                last_shot_at: None,
            }),
        )
    }

    /// Flies in a straight line towards where `target` is now; it does not home.
    pub fn rocket(start: Vec2, target: Vec2) -> Self {
        let angle = (target.y - start.y).atan2(target.x - start.x);
        let velocity = Vec2::new(angle.cos(), angle.sin()) * ROCKET_SPEED;
        Self::new(start, ROCKET_SCALE, EntityKind::Rocket(Rocket { velocity }))
    }

    pub fn portal(position: Vec2) -> Self {
        Self::new(position, 1.0, EntityKind::Portal)
    }

    pub fn medkit(position: Vec2) -> Self {
        Self::new(position, MEDKIT_SCALE, EntityKind::Medkit)
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self.kind, EntityKind::Enemy(_))
    }

    pub fn refresh_distance(&mut self, player_position: Vec2) {
        self.distance_to_player = self.position.distance(player_position);
    }

    /// Applies damage to an enemy. Returns true when this call killed it.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        let EntityKind::Enemy(enemy) = &mut self.kind else {
            return false;
        };
        if !self.alive {
            return false;
        }
        enemy.health -= amount;
        if enemy.health <= 0 {
            self.alive = false;
            return true;
        }
        false
    }

    pub fn update(&mut self, ctx: &UpdateContext<'_>, effects: &mut Vec<Effect>) {
        if !self.alive {
            return;
        }
        let position = self.position;
        let distance = self.distance_to_player;
        match &mut self.kind {
            EntityKind::Enemy(enemy) => {
                let ready = enemy
                    .last_shot_at
                    .map_or(true, |at| ctx.now - at > ENEMY_SHOT_COOLDOWN);
                if distance < ENEMY_SIGHT_RANGE
                    && ready
                    && has_line_of_sight(ctx.grid, position, ctx.player_position, ENEMY_SIGHT_STEP)
                {
                    enemy.last_shot_at = Some(ctx.now);
                    let aim = (ctx.player_position - position).normalize_or_zero();
                    let start = position + aim * ENEMY_MUZZLE_OFFSET;
                    tracing::debug!(?position, target = ?ctx.player_position, "enemy fired rocket");
                    effects.push(Effect::Spawn(Entity::rocket(start, ctx.player_position)));
                }
            }
            EntityKind::Rocket(rocket) => {
                self.position += rocket.velocity;
                if self.position.distance(ctx.player_position) < ROCKET_HIT_RADIUS {
                    self.alive = false;
                    effects.push(Effect::DamagePlayer(ROCKET_DAMAGE));
                    return;
                }
                let (x, y) = cell_of(self.position);
                if !ctx.grid.is_open(x, y) {
                    self.alive = false;
                }
            }
            EntityKind::Portal => {
                if distance < PORTAL_RADIUS {
                    effects.push(Effect::PortalReached);
                }
            }
            EntityKind::Medkit => {
                if distance < MEDKIT_RADIUS {
                    self.alive = false;
                    effects.push(Effect::HealPlayer(MEDKIT_HEAL));
                }
            }
        }
    }

    /// Per-variant fill pattern inside the projected sprite square.
    pub fn draw(&self, brush: &mut SpriteBrush<'_>, rect: ScreenRect, now: f32) {
        match &self.kind {
            EntityKind::Enemy(enemy) => {
                brush.band(rect, ENEMY_COLOR);
                let ratio = enemy.health.clamp(0, MAX_HEALTH) as f32 / MAX_HEALTH as f32;
                let bar = ScreenRect {
                    left: rect.left,
                    right: rect.left + rect.width() * ratio,
                    top: rect.top - 20.0,
                    bottom: rect.top - 10.0,
                };
                brush.band(bar, HEALTH_BAR_COLOR);
            }
            EntityKind::Rocket(_) => brush.band(rect, ROCKET_COLOR),
            EntityKind::Portal => {
                let c = ((now * 5.0).sin() * 127.0 + 128.0).clamp(0.0, 255.0) as u8;
                brush.band(rect, Rgb::new(c, 0, c));
            }
            EntityKind::Medkit => {
                brush.band(rect, MEDKIT_COLOR);
                let thickness = (rect.width() / 4.0).max(2.0);
                let (cx, cy) = (rect.center_x(), rect.center_y());
                let horizontal = ScreenRect {
                    top: cy - thickness / 2.0,
                    bottom: cy + thickness / 2.0,
                    ..rect
                };
                let vertical = ScreenRect {
                    left: cx - thickness / 2.0,
                    right: cx + thickness / 2.0,
                    ..rect
                };
                brush.band(horizontal, MEDKIT_CROSS_COLOR);
                brush.band(vertical, MEDKIT_CROSS_COLOR);
            }
        }
    }
}
