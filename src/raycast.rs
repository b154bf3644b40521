use macroquad::math::Vec2;

use crate::{
    texture::PLACEHOLDER_TEXTURE,
    world::{cell_of, WorldGrid},
};

/// Distance reported when a ray leaves the grid without hitting anything.
pub const SENTINEL_DISTANCE: f32 = 1000.0;
/// Floor for perpendicular distances so projected heights stay finite.
pub const MIN_WALL_DISTANCE: f32 = 0.01;
const UNREACHABLE_DELTA: f32 = 1e30;

/// Which family of grid lines the ray crossed last.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Stepped along x, hit a wall face parallel to the y axis.
    X,
    /// Stepped along y; these faces are drawn darker.
    Y,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnHit {
    pub distance: f32,
    pub side: Side,
    pub texture_id: u8,
    /// Horizontal position on the wall face, in `[0, 1)`.
    pub wall_x: f32,
}

/// Camera basis derived from the player's position, facing angle and field of view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec2,
    pub direction: Vec2,
    pub plane: Vec2,
}

impl Camera {
    pub fn new(position: Vec2, angle: f32, fov_degrees: f32) -> Self {
        let direction = Vec2::new(angle.cos(), angle.sin());
        let half_fov = (fov_degrees / 2.0).to_radians().tan();
        let plane = Vec2::new(-direction.y, direction.x) * half_fov;
        Self {
            position,
            direction,
            plane,
        }
    }

    /// `camera_x` runs from -1 at the left screen edge to 1 at the right.
    pub fn ray_direction(&self, camera_x: f32) -> Vec2 {
        self.direction + self.plane * camera_x
    }

    /// Maps a world point into camera space: `x` across the screen, `y` depth.
    pub fn to_camera_space(&self, world: Vec2) -> Vec2 {
        let offset = world - self.position;
        let (dir, plane) = (self.direction, self.plane);
        let inv_det = 1.0 / (plane.x * dir.y - dir.x * plane.y);
        Vec2::new(
            inv_det * (dir.y * offset.x - dir.x * offset.y),
            inv_det * (-plane.y * offset.x + plane.x * offset.y),
        )
    }
}

/// Grid ray march (DDA) from `origin` along `dir` until a wall or the grid edge.
pub fn cast_ray(grid: &WorldGrid, origin: Vec2, dir: Vec2) -> ColumnHit {
    let (mut map_x, mut map_y) = cell_of(origin);

    let delta_x = if dir.x == 0.0 { UNREACHABLE_DELTA } else { (1.0 / dir.x).abs() };
    let delta_y = if dir.y == 0.0 { UNREACHABLE_DELTA } else { (1.0 / dir.y).abs() };

    let (step_x, mut side_dist_x) = if dir.x < 0.0 {
        (-1, (origin.x - map_x as f32) * delta_x)
    } else {
        (1, (map_x as f32 + 1.0 - origin.x) * delta_x)
    };
    let (step_y, mut side_dist_y) = if dir.y < 0.0 {
        (-1, (origin.y - map_y as f32) * delta_y)
    } else {
        (1, (map_y as f32 + 1.0 - origin.y) * delta_y)
    };

    loop {
        let side = if side_dist_x < side_dist_y {
            side_dist_x += delta_x;
            map_x += step_x;
            Side::X
        } else {
            side_dist_y += delta_y;
            map_y += step_y;
            Side::Y
        };

        let Some(cell) = grid.get(map_x, map_y) else {
            return ColumnHit {
                distance: SENTINEL_DISTANCE,
                side,
                texture_id: PLACEHOLDER_TEXTURE,
                wall_x: 0.0,
            };
        };
        if cell == 0 {
            continue;
        }

        let distance = match side {
            Side::X => side_dist_x - delta_x,
            Side::Y => side_dist_y - delta_y,
        }
        .max(MIN_WALL_DISTANCE);
        let wall_x = match side {
            Side::X => origin.y + distance * dir.y,
            Side::Y => origin.x + distance * dir.x,
        };
        return ColumnHit {
            distance,
            side,
            texture_id: cell,
            wall_x: wall_x - wall_x.floor(),
        };
    }
}

/// One ray-cast column covering `width` screen columns starting at `x`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CastColumn {
    pub x: usize,
    pub width: usize,
    pub hit: ColumnHit,
}

/// Nearest wall distance per screen column, rebuilt every frame.
#[derive(Clone, Debug, Default)]
pub struct DepthBuffer {
    depths: Vec<f32>,
}

impl DepthBuffer {
    pub fn new(width: usize) -> Self {
        Self {
            depths: vec![SENTINEL_DISTANCE; width],
        }
    }

    pub fn resize(&mut self, width: usize) {
        self.depths.resize(width, SENTINEL_DISTANCE);
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    pub fn get(&self, column: i32) -> Option<f32> {
        if column < 0 {
            return None;
        }
        self.depths.get(column as usize).copied()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.depths
    }

    fn fill(&mut self, x: usize, width: usize, distance: f32) {
        let end = (x + width).min(self.depths.len());
        for depth in &mut self.depths[x..end] {
            *depth = distance;
        }
    }
}

impl From<Vec<f32>> for DepthBuffer {
    fn from(depths: Vec<f32>) -> Self {
        Self { depths }
    }
}

/// Casts every `stride`-th column; skipped columns reuse the anchor's distance.
pub fn cast_columns(
    grid: &WorldGrid,
    camera: &Camera,
    screen_width: usize,
    stride: usize,
    depth: &mut DepthBuffer,
) -> Vec<CastColumn> {
    let stride = stride.max(1);
    depth.resize(screen_width);
    let mut columns = Vec::with_capacity(screen_width / stride + 1);
    for x in (0..screen_width).step_by(stride) {
        let camera_x = 2.0 * x as f32 / screen_width as f32 - 1.0;
        let hit = cast_ray(grid, camera.position, camera.ray_direction(camera_x));
        let width = stride.min(screen_width - x);
        depth.fill(x, width, hit.distance);
        columns.push(CastColumn { x, width, hit });
    }
    columns
}

/// Walks from `from` towards `to` in fixed steps; false on the first wall or grid exit.
pub fn has_line_of_sight(grid: &WorldGrid, from: Vec2, to: Vec2, step: f32) -> bool {
    let offset = to - from;
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return grid.is_open_at(from);
    }
    let dir = offset / distance;
    let mut travelled = 0.0;
    while travelled < distance {
        if !grid.is_open_at(from + dir * travelled) {
            return false;
        }
        travelled += step;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_wall(x: usize, y: usize) -> WorldGrid {
        let mut grid = WorldGrid::open(16);
        grid.set(x, y, 2);
        grid
    }

    #[test]
    fn straight_ray_hits_wall_at_expected_distance() {
        let grid = grid_with_wall(5, 1);
        let hit = cast_ray(&grid, Vec2::new(1.5, 1.5), Vec2::new(1.0, 0.0));
        assert!((hit.distance - 3.5).abs() < 1e-4, "got {}", hit.distance);
        assert_eq!(hit.side, Side::X);
        assert_eq!(hit.texture_id, 2);
        assert!((hit.wall_x - 0.5).abs() < 1e-4);
    }

    #[test]
    fn ray_along_y_reports_y_side() {
        let grid = grid_with_wall(3, 7);
        let hit = cast_ray(&grid, Vec2::new(3.25, 2.5), Vec2::new(0.0, 1.0));
        assert!((hit.distance - 4.5).abs() < 1e-4);
        assert_eq!(hit.side, Side::Y);
        assert!((hit.wall_x - 0.25).abs() < 1e-4);
    }

    #[test]
    fn leaving_the_grid_yields_sentinel() {
        let grid = WorldGrid::open(8);
        let hit = cast_ray(&grid, Vec2::new(4.5, 4.5), Vec2::new(-1.0, 0.0));
        assert_eq!(hit.distance, SENTINEL_DISTANCE);
        assert_eq!(hit.texture_id, PLACEHOLDER_TEXTURE);
    }

    #[test]
    fn distance_is_clamped_to_epsilon() {
        let grid = grid_with_wall(5, 1);
        let hit = cast_ray(&grid, Vec2::new(4.999, 1.5), Vec2::new(1.0, 0.0));
        assert_eq!(hit.distance, MIN_WALL_DISTANCE);
    }

    #[test]
    fn strided_columns_share_anchor_depth() {
        let mut grid = WorldGrid::filled(16, 1);
        for y in 1..15 {
            for x in 1..15 {
                grid.set(x, y, 0);
            }
        }
        let camera = Camera::new(Vec2::new(3.3, 7.7), 0.4, 66.0);
        for stride in [2usize, 4] {
            let mut depth = DepthBuffer::new(0);
            let columns = cast_columns(&grid, &camera, 101, stride, &mut depth);
            assert_eq!(depth.len(), 101);
            for column in &columns {
                for x in column.x..column.x + column.width {
                    assert_eq!(depth.as_slice()[x], column.hit.distance);
                }
            }
            assert_eq!(columns.last().map(|c| c.x + c.width), Some(101));
        }
    }

    #[test]
    fn camera_space_depth_matches_forward_distance() {
        let camera = Camera::new(Vec2::new(2.0, 2.0), 0.0, 66.0);
        let ahead = camera.to_camera_space(Vec2::new(5.0, 2.0));
        assert!(ahead.x.abs() < 1e-5);
        assert!((ahead.y - 3.0).abs() < 1e-5);
        let behind = camera.to_camera_space(Vec2::new(0.0, 2.0));
        assert!(behind.y < 0.0);
        // +y is to the right when facing +x
        assert!(camera.to_camera_space(Vec2::new(5.0, 3.0)).x > 0.0);
    }

    #[test]
    fn line_of_sight_is_blocked_by_walls() {
        let grid = grid_with_wall(5, 1);
        assert!(!has_line_of_sight(&grid, Vec2::new(1.5, 1.5), Vec2::new(8.5, 1.5), 0.2));
        assert!(has_line_of_sight(&grid, Vec2::new(1.5, 3.5), Vec2::new(8.5, 3.5), 0.2));
    }
}
