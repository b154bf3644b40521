use macroquad::color::Color;
use once_cell::sync::Lazy;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::{EngineError, Result};

pub const TEXTURE_SIZE: usize = 64;
/// Texture id reserved for "missing"; never assigned to a wall.
pub const PLACEHOLDER_TEXTURE: u8 = 0;
const PLACEHOLDER_COLOR: Rgb = Rgb::new(255, 0, 255);
const TEXTURE_SEED: u64 = 0x00d0_0dca;

/// Bank shared by the host and any renderer that does not bring its own.
pub static DEFAULT_TEXTURES: Lazy<TextureBank> = Lazy::new(|| {
    let mut rng = StdRng::seed_from_u64(TEXTURE_SEED);
    TextureBank::procedural(&mut rng).unwrap_or_else(|err| {
        tracing::warn!(%err, "procedural textures failed, using flat colours");
        TextureBank::flat()
    })
});

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn grey(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    pub fn to_color(self) -> Color {
        Color::from_rgba(self.r, self.g, self.b, 255)
    }
}

/// Square-ish texel buffer with power-of-two sides so lookups wrap with a mask.
#[derive(Clone, Debug)]
pub struct Texture {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
    fallback: Rgb,
}

impl Texture {
    pub fn new(width: usize, height: usize, fallback: Rgb) -> Result<Self> {
        if !width.is_power_of_two() || !height.is_power_of_two() {
            return Err(EngineError::TextureSize { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels: vec![fallback; width * height],
            fallback,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// One-texel texture carrying only its fallback colour.
    pub fn solid(color: Rgb) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![color],
            fallback: color,
        }
    }

    /// Flat colour used when the texture is not sampled at all.
    pub fn fallback(&self) -> Rgb {
        self.fallback
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgb) {
        let idx = (y & (self.height - 1)) * self.width + (x & (self.width - 1));
        self.pixels[idx] = color;
    }

    /// Wrap-around lookup; negative coordinates wrap as well.
    pub fn pixel(&self, x: i32, y: i32) -> Rgb {
        let tx = (x & (self.width as i32 - 1)) as usize;
        let ty = (y & (self.height as i32 - 1)) as usize;
        self.pixels[ty * self.width + tx]
    }
}

#[derive(Clone, Debug)]
pub struct TextureBank {
    textures: Vec<Texture>,
}

impl TextureBank {
    /// An empty list still yields a bank holding the placeholder.
    pub fn new(mut textures: Vec<Texture>) -> Self {
        if textures.is_empty() {
            textures.push(Texture::solid(PLACEHOLDER_COLOR));
        }
        Self { textures }
    }

    /// Placeholder, bricks, stone and wood.
    pub fn procedural<R: Rng + ?Sized>(rng: &mut R) -> Result<Self> {
        let placeholder = Texture::new(TEXTURE_SIZE, TEXTURE_SIZE, PLACEHOLDER_COLOR)?;

        let brick = Rgb::new(150, 100, 100);
        let mortar = Rgb::grey(80);
        let mut bricks = Texture::new(TEXTURE_SIZE, TEXTURE_SIZE, brick)?;
        for x in 0..TEXTURE_SIZE {
            for y in 0..TEXTURE_SIZE {
                let c = if x % 32 < 2 || y % 32 < 2 { mortar } else { brick };
                if (y / 32) % 2 == 0 {
                    bricks.set_pixel(x, y, c);
                } else {
                    bricks.set_pixel((x + 16) % TEXTURE_SIZE, y, c);
                }
            }
        }

        let mut stone = Texture::new(TEXTURE_SIZE, TEXTURE_SIZE, Rgb::grey(128))?;
        for x in 0..TEXTURE_SIZE {
            for y in 0..TEXTURE_SIZE {
                stone.set_pixel(x, y, Rgb::grey(rng.gen_range(100..130)));
            }
        }

        let mut wood = Texture::new(TEXTURE_SIZE, TEXTURE_SIZE, Rgb::new(120, 60, 30))?;
        for x in 0..TEXTURE_SIZE {
            for y in 0..TEXTURE_SIZE {
                let mut c: u8 = 100 + (y % 8) as u8 * 5 + rng.gen_range(0..10);
                if x % 32 < 2 {
                    c = 80;
                }
                wood.set_pixel(x, y, Rgb::new(c, c / 2, c / 3));
            }
        }

        Ok(Self::new(vec![placeholder, bricks, stone, wood]))
    }

    /// One-texel textures carrying only fallback colours.
    pub fn flat() -> Self {
        Self::new(vec![
            Texture::solid(PLACEHOLDER_COLOR),
            Texture::solid(Rgb::new(150, 100, 100)),
            Texture::solid(Rgb::grey(128)),
            Texture::solid(Rgb::new(120, 60, 30)),
        ])
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Number of ids a wall may carry (everything but the placeholder).
    pub fn wall_texture_count(&self) -> u8 {
        self.textures.len().saturating_sub(1).min(u8::MAX as usize) as u8
    }

    /// Out-of-range ids resolve to the placeholder texture.
    pub fn get(&self, id: u8) -> &Texture {
        let idx = id as usize;
        if idx < self.textures.len() {
            &self.textures[idx]
        } else {
            &self.textures[PLACEHOLDER_TEXTURE as usize]
        }
    }
}
