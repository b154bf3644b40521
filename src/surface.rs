use macroquad::{
    color::Color,
    shapes::draw_rectangle,
    text::{draw_text, measure_text},
    window::{screen_height, screen_width},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// The only drawing operations the engine needs from its host.
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);
    /// `y` is the text baseline.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, align: TextAlign, color: Color);
}

/// Draws straight to the macroquad window.
#[derive(Clone, Copy, Debug, Default)]
pub struct MacroquadSurface;

impl Surface for MacroquadSurface {
    fn width(&self) -> f32 {
        screen_width()
    }

    fn height(&self) -> f32 {
        screen_height()
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        draw_rectangle(x, y, w, h, color);
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, align: TextAlign, color: Color) {
        let x = match align {
            TextAlign::Left => x,
            TextAlign::Center => x - measure_text(text, None, size as u16, 1.0).width / 2.0,
        };
        draw_text(text, x, y, size, color);
    }
}
