/// Image textures sampled by UV coordinate
use std::path::Path;

use log::info;

use crate::canvas::Color;
use crate::error::TextureError;

#[derive(Debug, Clone)]
pub struct Texture {
    width: usize,
    height: usize,
    texels: Vec<Color>,
}

impl Texture {
    pub fn new(width: usize, height: usize, texels: Vec<Color>) -> Result<Self, TextureError> {
        if width == 0 || height == 0 || texels.len() != width * height {
            return Err(TextureError::Empty);
        }
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// Decode a PNG or JPEG file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path)?.to_rgb8();
        let (width, height) = img.dimensions();
        let texels = img
            .pixels()
            .map(|p| Color::from_rgb8(p[0], p[1], p[2]))
            .collect();
        info!("loaded texture {} ({}x{})", path.display(), width, height);
        Self::new(width as usize, height as usize, texels)
    }

    /// Alternating `a`/`b` squares of `cell` texels
    pub fn checkerboard(size: usize, cell: usize, a: Color, b: Color) -> Self {
        let cell = cell.max(1);
        let size = size.max(1);
        let texels = (0..size * size)
            .map(|i| {
                let (x, y) = (i % size, i / size);
                if (x / cell + y / cell) % 2 == 0 {
                    a
                } else {
                    b
                }
            })
            .collect();
        Self {
            width: size,
            height: size,
            texels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn texel(&self, x: usize, y: usize) -> Color {
        self.texels[y * self.width + x]
    }

    /// Nearest-texel lookup. UVs wrap; v = 0 is the bottom row of the image.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        let u = u.rem_euclid(1.0);
        let v = 1.0 - v.rem_euclid(1.0);
        let x = ((u * self.width as f32) as usize).min(self.width - 1);
        let y = ((v * self.height as f32) as usize).min(self.height - 1);
        self.texel(x, y)
    }

    /// Bilinear lookup with wrapping, same orientation as `sample`
    pub fn sample_bilinear(&self, u: f32, v: f32) -> Color {
        let fx = u.rem_euclid(1.0) * self.width as f32 - 0.5;
        let fy = (1.0 - v.rem_euclid(1.0)) * self.height as f32 - 0.5;
        let (x0, y0) = (fx.floor(), fy.floor());
        let (tx, ty) = (fx - x0, fy - y0);
        let wrap = |c: f32, n: usize| (c as i64).rem_euclid(n as i64) as usize;
        let (xa, xb) = (wrap(x0, self.width), wrap(x0 + 1.0, self.width));
        let (ya, yb) = (wrap(y0, self.height), wrap(y0 + 1.0, self.height));
        let top = self.texel(xa, ya).lerp(self.texel(xb, ya), tx);
        let bottom = self.texel(xa, yb).lerp(self.texel(xb, yb), tx);
        top.lerp(bottom, ty)
    }
}
