use macroquad::math::Vec2;
use rand::Rng;

use crate::config::{ENEMY_SPAWN_CHANCE, MEDKIT_SPAWN_CHANCE, PLAYER_SPAWN_CELL};

pub const OPEN: u8 = 0;
const PORTAL_PLACEMENT_ATTEMPTS: usize = 10_000;

/// Square grid of cell codes: 0 is floor, anything else a wall carrying its texture id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldGrid {
    size: usize,
    cells: Vec<u8>,
}

impl WorldGrid {
    pub fn filled(size: usize, value: u8) -> Self {
        Self {
            size,
            cells: vec![value; size * size],
        }
    }

    pub fn open(size: usize) -> Self {
        Self::filled(size, OPEN)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.size && (y as usize) < self.size
    }

    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        if self.in_bounds(x, y) {
            Some(self.cells[y as usize * self.size + x as usize])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        if x < self.size && y < self.size {
            self.cells[y * self.size + x] = value;
        }
    }

    /// Out-of-bounds cells count as solid.
    pub fn is_open(&self, x: i32, y: i32) -> bool {
        self.get(x, y) == Some(OPEN)
    }

    pub fn is_open_at(&self, pos: Vec2) -> bool {
        let (x, y) = cell_of(pos);
        self.is_open(x, y)
    }

    pub fn open_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == OPEN)
            .map(move |(idx, _)| (idx % self.size, idx / self.size))
    }

    /// Fully walled grid with a randomized depth-first spanning tree carved on odd coordinates.
    pub fn carve_maze<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        let mut grid = Self::filled(size, 1);
        if size < 3 {
            return grid;
        }
        let mut visited = vec![false; size * size];
        let (sx, sy) = PLAYER_SPAWN_CELL;
        visited[sy * size + sx] = true;
        grid.set(sx, sy, OPEN);

        let mut stack = vec![(sx, sy)];
        let mut neighbors = Vec::with_capacity(4);
        while let Some((cx, cy)) = stack.pop() {
            neighbors.clear();
            if cx >= 3 && !visited[cy * size + cx - 2] {
                neighbors.push((cx - 2, cy));
            }
            if cx + 2 <= size - 2 && !visited[cy * size + cx + 2] {
                neighbors.push((cx + 2, cy));
            }
            if cy >= 3 && !visited[(cy - 2) * size + cx] {
                neighbors.push((cx, cy - 2));
            }
            if cy + 2 <= size - 2 && !visited[(cy + 2) * size + cx] {
                neighbors.push((cx, cy + 2));
            }

            if !neighbors.is_empty() {
                stack.push((cx, cy));
                let (nx, ny) = neighbors[rng.gen_range(0..neighbors.len())];
                grid.set((nx + cx) / 2, (ny + cy) / 2, OPEN);
                grid.set(nx, ny, OPEN);
                visited[ny * size + nx] = true;
                stack.push((nx, ny));
            }
        }
        grid
    }
}

pub fn cell_of(pos: Vec2) -> (i32, i32) {
    (pos.x.floor() as i32, pos.y.floor() as i32)
}

pub fn cell_center(x: usize, y: usize) -> Vec2 {
    Vec2::new(x as f32 + 0.5, y as f32 + 0.5)
}

/// Everything level start needs: the carved grid plus where things go.
#[derive(Clone, Debug)]
pub struct LevelLayout {
    pub grid: WorldGrid,
    pub spawn: Vec2,
    pub portal: (usize, usize),
    pub enemies: Vec<(usize, usize)>,
    pub medkits: Vec<(usize, usize)>,
}

pub fn generate_level<R: Rng + ?Sized>(size: usize, wall_textures: u8, rng: &mut R) -> LevelLayout {
    let mut grid = WorldGrid::carve_maze(size, rng);
    let wall_textures = wall_textures.max(1);
    for y in 0..size {
        for x in 0..size {
            if grid.get(x as i32, y as i32) != Some(OPEN) {
                grid.set(x, y, rng.gen_range(1..=wall_textures));
            }
        }
    }

    let spawn = cell_center(PLAYER_SPAWN_CELL.0, PLAYER_SPAWN_CELL.1);
    let portal = place_portal(&grid, spawn, rng);

    let mut enemies = Vec::new();
    let mut medkits = Vec::new();
    for y in 1..size.saturating_sub(1) {
        for x in 1..size.saturating_sub(1) {
            if !grid.is_open(x as i32, y as i32) || (x, y) == PLAYER_SPAWN_CELL || (x, y) == portal {
                continue;
            }
            if rng.gen_bool(ENEMY_SPAWN_CHANCE) {
                enemies.push((x, y));
            } else if rng.gen_bool(MEDKIT_SPAWN_CHANCE) {
                medkits.push((x, y));
            }
        }
    }

    LevelLayout {
        grid,
        spawn,
        portal,
        enemies,
        medkits,
    }
}

fn portal_distance(cell: (usize, usize), spawn: Vec2) -> f32 {
    (cell.0 as f32 - spawn.x).abs() + (cell.1 as f32 - spawn.y).abs()
}

/// Rejection-samples an open cell at least half the grid away (Manhattan) from spawn.
fn place_portal<R: Rng + ?Sized>(grid: &WorldGrid, spawn: Vec2, rng: &mut R) -> (usize, usize) {
    let size = grid.size();
    let min_distance = size as f32 / 2.0;
    if size > 2 {
        for _ in 0..PORTAL_PLACEMENT_ATTEMPTS {
            let cell = (rng.gen_range(1..size - 1), rng.gen_range(1..size - 1));
            if grid.is_open(cell.0 as i32, cell.1 as i32) && portal_distance(cell, spawn) >= min_distance {
                return cell;
            }
        }
    }

    let fallback = grid
        .open_cells()
        .max_by(|a, b| portal_distance(*a, spawn).total_cmp(&portal_distance(*b, spawn)))
        .unwrap_or(PLAYER_SPAWN_CELL);
    tracing::warn!(?fallback, "no far open cell sampled, using farthest open cell for portal");
    fallback
}
