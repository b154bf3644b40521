use std::f32::consts::FRAC_PI_2;

use macroquad::math::Vec2;

use crate::{
    config::{MAX_HEALTH, MOVE_DEAD_ZONE, MOVE_SPEED},
    world::WorldGrid,
};

/// Movement request in the player's local frame, each axis in `[-1, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveIntent {
    pub strafe: f32,
    pub forward: f32,
}

impl MoveIntent {
    pub fn new(strafe: f32, forward: f32) -> Self {
        Self { strafe, forward }
    }

    /// Clamped to unit length; `None` inside the dead zone.
    pub fn normalized(self) -> Option<Vec2> {
        let v = Vec2::new(self.strafe, self.forward);
        let len = v.length();
        if !len.is_finite() || len <= MOVE_DEAD_ZONE {
            return None;
        }
        Some(if len > 1.0 { v / len } else { v })
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub position: Vec2,
    pub angle: f32,
    health: i32,
}

impl Player {
    pub fn spawn(position: Vec2) -> Self {
        Self {
            position,
            angle: 0.0,
            health: MAX_HEALTH,
        }
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    pub fn facing(&self) -> Vec2 {
        Vec2::new(self.angle.cos(), self.angle.sin())
    }

    pub fn turn(&mut self, delta: f32) {
        self.angle += delta;
    }

    /// World-space displacement for one tick of `intent`.
    pub fn displacement(&self, intent: MoveIntent) -> Vec2 {
        let Some(local) = intent.normalized() else {
            return Vec2::ZERO;
        };
        let forward = self.facing() * local.y;
        let strafe = Vec2::new((self.angle + FRAC_PI_2).cos(), (self.angle + FRAC_PI_2).sin()) * local.x;
        (forward + strafe) * MOVE_SPEED
    }

    /// Moves only if the whole step lands on open floor; no sliding along walls.
    pub fn try_move(&mut self, intent: MoveIntent, grid: &WorldGrid) -> bool {
        let step = self.displacement(intent);
        if step == Vec2::ZERO {
            return false;
        }
        let candidate = self.position + step;
        if grid.is_open_at(candidate) {
            self.position = candidate;
            true
        } else {
            false
        }
    }

    /// Returns true when this hit is the one that brought health to zero.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.health == 0 {
            return false;
        }
        self.health = (self.health - amount.max(0)).clamp(0, MAX_HEALTH);
        self.health == 0
    }

    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount.max(0)).clamp(0, MAX_HEALTH);
    }

    pub fn reset(&mut self, position: Vec2) {
        self.position = position;
        self.angle = 0.0;
    }

    pub fn restore_health(&mut self) {
        self.health = MAX_HEALTH;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> WorldGrid {
        let mut grid = WorldGrid::filled(8, 1);
        for x in 1..7 {
            grid.set(x, 1, 0);
        }
        grid
    }

    #[test]
    fn dead_zone_and_unit_clamp() {
        assert_eq!(MoveIntent::new(0.005, 0.0).normalized(), None);
        let v = MoveIntent::new(1.0, 1.0).normalized().unwrap();
        assert!((v.length() - 1.0).abs() < 1e-5);
        let v = MoveIntent::new(0.0, 0.5).normalized().unwrap();
        assert_eq!(v, Vec2::new(0.0, 0.5));
    }

    #[test]
    fn forward_moves_along_facing() {
        let grid = corridor();
        let mut player = Player::spawn(Vec2::new(1.5, 1.5));
        assert!(player.try_move(MoveIntent::new(0.0, 1.0), &grid));
        assert!((player.position.x - (1.5 + MOVE_SPEED)).abs() < 1e-5);
        assert!((player.position.y - 1.5).abs() < 1e-5);
    }

    #[test]
    fn blocked_step_is_rejected_whole() {
        let grid = corridor();
        let mut player = Player::spawn(Vec2::new(1.5, 1.99));
        // diagonal step whose y component crosses into the wall row
        let before = player.position;
        assert!(!player.try_move(MoveIntent::new(1.0, 1.0), &grid));
        assert_eq!(player.position, before);
    }

    #[test]
    fn strafe_is_perpendicular_to_facing() {
        let player = Player::spawn(Vec2::new(1.5, 1.5));
        let d = player.displacement(MoveIntent::new(1.0, 0.0));
        assert!(d.x.abs() < 1e-6);
        assert!((d.y - MOVE_SPEED).abs() < 1e-6);
    }

    #[test]
    fn health_is_clamped_both_ways() {
        let mut player = Player::spawn(Vec2::ZERO);
        player.heal(40);
        assert_eq!(player.health(), MAX_HEALTH);
        player.take_damage(90);
        assert_eq!(player.health(), 10);
        assert!(player.take_damage(50));
        assert_eq!(player.health(), 0);
        assert!(!player.take_damage(50));
        assert_eq!(player.health(), 0);
    }
}
