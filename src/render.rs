use macroquad::{color::Color, math::Vec2};

use crate::{
    config::{Quality, Settings, MAX_HEALTH},
    entity::Entity,
    raycast::{cast_columns, Camera, CastColumn, DepthBuffer, Side},
    simulation::Simulation,
    surface::{Surface, TextAlign},
    texture::{Rgb, Texture, TextureBank},
    world::WorldGrid,
};

/// Beyond this distance walls shade to black.
pub const MAX_VISIBLE_DISTANCE: f32 = 20.0;
/// Muzzle flash no longer lights walls past this distance.
pub const FLASH_RANGE: f32 = 8.0;
const Y_SIDE_DARKEN: f32 = 0.7;
/// Sprites at or closer than this camera-space depth are not drawn.
pub const SPRITE_NEAR_PLANE: f32 = 0.1;

const CEILING_COLOR: Rgb = Rgb::grey(40);
const FLOOR_COLOR: Rgb = Rgb::grey(80);

/// Wall colour after muzzle flash, distance fog and side darkening.
pub fn shade(base: Rgb, distance: f32, side: Side, flash: f32) -> Rgb {
    let flash = flash.clamp(0.0, 1.0);
    let intensity = if flash > 0.0 {
        (1.0 - distance / FLASH_RANGE).max(0.0) * flash
    } else {
        0.0
    };
    let lit = [
        (base.r as f32 + 255.0 * intensity).min(255.0),
        (base.g as f32 + 200.0 * intensity).min(255.0),
        (base.b as f32 + 150.0 * intensity).min(255.0),
    ];

    let mut factor = (1.0 - distance / MAX_VISIBLE_DISTANCE).max(0.0);
    if side == Side::Y {
        factor *= Y_SIDE_DARKEN;
    }
    let channel = |v: f32| (v * factor).clamp(0.0, 255.0) as u8;
    Rgb::new(channel(lit[0]), channel(lit[1]), channel(lit[2]))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenRect {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl ScreenRect {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center_x(&self) -> f32 {
        (self.left + self.right) / 2.0
    }

    pub fn center_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }
}

pub fn column_visible(depth: &DepthBuffer, column: i32, sprite_depth: f32) -> bool {
    matches!(depth.get(column), Some(wall) if wall > sprite_depth)
}

/// Fills sprite bands column by column, skipping columns where a wall is nearer.
pub struct SpriteBrush<'a> {
    surface: &'a mut dyn Surface,
    depth: &'a DepthBuffer,
    sprite_depth: f32,
}

impl<'a> SpriteBrush<'a> {
    pub fn new(surface: &'a mut dyn Surface, depth: &'a DepthBuffer, sprite_depth: f32) -> Self {
        Self {
            surface,
            depth,
            sprite_depth,
        }
    }

    pub fn band(&mut self, rect: ScreenRect, color: Rgb) {
        let color = color.to_color();
        let (left, right) = (rect.left as i32, rect.right as i32);
        let mut run_start: Option<i32> = None;
        // adjacent visible columns are merged into one fill
        for col in left..=right {
            let visible = col < right && column_visible(self.depth, col, self.sprite_depth);
            match (visible, run_start) {
                (true, None) => run_start = Some(col),
                (false, Some(start)) => {
                    self.surface
                        .fill_rect(start as f32, rect.top, (col - start) as f32, rect.height(), color);
                    run_start = None;
                }
                _ => {}
            }
        }
    }
}

/// Projects a billboard; `None` when it sits behind or at the camera.
pub fn project_sprite(
    camera: &Camera,
    position: Vec2,
    scale: f32,
    screen_width: f32,
    screen_height: f32,
) -> Option<(ScreenRect, f32)> {
    let transformed = camera.to_camera_space(position);
    if transformed.y <= SPRITE_NEAR_PLANE {
        return None;
    }
    let center_x = (screen_width / 2.0 * (1.0 + transformed.x / transformed.y)) as i32 as f32;
    let size = ((screen_height / transformed.y) * scale).abs() as i32 as f32;
    let left = center_x - size / 2.0;
    let top = -size / 2.0 + screen_height / 2.0;
    Some((
        ScreenRect {
            left,
            right: left + size,
            top,
            bottom: top + size,
        },
        transformed.y,
    ))
}

/// Vertical extent of a wall column: `(line_height, draw_start, draw_end)`.
pub fn wall_span(screen_height: i32, distance: f32) -> (i32, i32, i32) {
    let line_height = (screen_height as f32 / distance) as i32;
    let start = (-line_height / 2 + screen_height / 2).max(0);
    let end = (line_height / 2 + screen_height / 2).min(screen_height - 1);
    (line_height, start, end)
}

struct ColumnFill<'a> {
    column: &'a CastColumn,
    texture: &'a Texture,
    screen_height: i32,
    line_height: i32,
    start: i32,
    end: i32,
    flash: f32,
}

impl ColumnFill<'_> {
    fn shaded(&self, base: Rgb) -> Color {
        shade(base, self.column.hit.distance, self.column.hit.side, self.flash).to_color()
    }

    fn tex_x(&self) -> i32 {
        ((self.column.hit.wall_x * self.texture.width() as f32) as i32).clamp(0, self.texture.width() as i32 - 1)
    }

    fn flat(&self, surface: &mut dyn Surface, color: Color) {
        surface.fill_rect(
            self.column.x as f32,
            self.start as f32,
            self.column.width as f32,
            (self.end - self.start) as f32,
            color,
        );
    }

    fn textured(&self, surface: &mut dyn Surface) {
        let tex_x = self.tex_x();
        let tex_h = self.texture.height() as i64;
        let line_height = self.line_height.max(1) as i64;
        for y in self.start..self.end {
            let d = y as i64 * 256 - self.screen_height as i64 * 128 + line_height * 128;
            let tex_y = (((d * tex_h) / line_height) / 256).clamp(0, tex_h - 1) as i32;
            let color = self.shaded(self.texture.pixel(tex_x, tex_y));
            surface.fill_rect(self.column.x as f32, y as f32, self.column.width as f32, 1.0, color);
        }
    }

    fn draw(&self, quality: Quality, surface: &mut dyn Surface) {
        match quality {
            Quality::High => self.textured(surface),
            Quality::Medium => {
                let mid = self.texture.pixel(self.tex_x(), self.texture.height() as i32 / 2);
                self.flat(surface, self.shaded(mid));
            }
            Quality::Low => self.flat(surface, self.shaded(self.texture.fallback())),
        }
    }
}

/// Values shown on the heads-up display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hud {
    pub health: i32,
    pub score: u32,
    pub best_score: u32,
    pub level: u32,
}

#[derive(Debug, Default)]
pub struct Renderer {
    depth: DepthBuffer,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> &DepthBuffer {
        &self.depth
    }

    pub fn render_frame(
        &mut self,
        surface: &mut dyn Surface,
        sim: &Simulation,
        settings: &Settings,
        textures: &TextureBank,
    ) {
        let camera = Camera::new(sim.player().position, sim.player().angle, settings.fov_degrees);
        self.draw_background(surface);
        self.draw_walls(surface, sim.grid(), &camera, settings.quality, textures, sim.flash_ratio());
        self.draw_sprites(surface, &camera, sim.entities(), sim.elapsed());
        draw_hud(surface, &sim.hud());
    }

    pub fn draw_background(&self, surface: &mut dyn Surface) {
        let (w, h) = (surface.width(), surface.height());
        surface.fill_rect(0.0, 0.0, w, h / 2.0, CEILING_COLOR.to_color());
        surface.fill_rect(0.0, h / 2.0, w, h / 2.0, FLOOR_COLOR.to_color());
    }

    /// Casts the columns for this frame, fills the depth buffer and draws the walls.
    pub fn draw_walls(
        &mut self,
        surface: &mut dyn Surface,
        grid: &WorldGrid,
        camera: &Camera,
        quality: Quality,
        textures: &TextureBank,
        flash: f32,
    ) {
        let screen_width = surface.width().max(0.0) as usize;
        let screen_height = surface.height() as i32;
        let columns = cast_columns(grid, camera, screen_width, quality.ray_stride(), &mut self.depth);
        for column in &columns {
            let (line_height, start, end) = wall_span(screen_height, column.hit.distance);
            ColumnFill {
                column,
                texture: textures.get(column.hit.texture_id),
                screen_height,
                line_height,
                start,
                end,
                flash,
            }
            .draw(quality, surface);
        }
    }

    /// Back-to-front billboards, occluded per column by the current depth buffer.
    pub fn draw_sprites(&self, surface: &mut dyn Surface, camera: &Camera, entities: &[Entity], now: f32) {
        let mut order: Vec<&Entity> = entities.iter().filter(|e| e.alive).collect();
        order.sort_by(|a, b| b.distance_to_player.total_cmp(&a.distance_to_player));

        let (w, h) = (surface.width(), surface.height());
        for entity in order {
            let Some((rect, depth)) = project_sprite(camera, entity.position, entity.scale, w, h) else {
                continue;
            };
            let mut brush = SpriteBrush::new(surface, &self.depth, depth);
            entity.draw(&mut brush, rect, now);
        }
    }
}

pub fn draw_hud(surface: &mut dyn Surface, hud: &Hud) {
    let white = Rgb::grey(255).to_color();
    surface.fill_rect(20.0, 20.0, 200.0, 40.0, Rgb::new(80, 0, 0).to_color());
    let health = hud.health.clamp(0, MAX_HEALTH) as f32;
    surface.fill_rect(20.0, 20.0, health * 2.0, 40.0, Rgb::new(255, 0, 0).to_color());
    surface.draw_text(&hud.health.to_string(), 25.0, 52.0, 35.0, TextAlign::Left, white);

    surface.draw_text(&format!("Score: {}", hud.score), 20.0, 120.0, 50.0, TextAlign::Left, white);
    surface.draw_text(&format!("Best: {}", hud.best_score), 20.0, 180.0, 50.0, TextAlign::Left, white);
    surface.draw_text(&format!("Lvl: {}", hud.level), 20.0, 240.0, 50.0, TextAlign::Left, white);

    let (w, h) = (surface.width(), surface.height());
    let (gun_w, gun_h) = (w / 4.0, h / 3.0);
    surface.fill_rect(w / 2.0 - gun_w / 4.0, h - gun_h, gun_w / 2.0, gun_h, Rgb::grey(68).to_color());
}
