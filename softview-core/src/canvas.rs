/// Colors, the 2D drawing surface the renderer targets, and an in-memory
/// implementation of it

/// Linear RGB color with channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const LIGHT_GRAY: Color = Color::new(0.827, 0.827, 0.827);
    pub const CORNFLOWER_BLUE: Color = Color::new(0.392, 0.584, 0.929);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn from_array(c: [f32; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let c = self.clamped();
        [
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8,
        ]
    }

    pub fn clamped(self) -> Self {
        Self::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
        )
    }

    /// Channel-wise product
    pub fn modulate(self, other: Color) -> Self {
        Self::new(self.r * other.r, self.g * other.g, self.b * other.b)
    }

    pub fn scale(self, k: f32) -> Self {
        Self::new(self.r * k, self.g * k, self.b * k)
    }

    pub fn add(self, other: Color) -> Self {
        Self::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }

    pub fn lerp(self, other: Color, t: f32) -> Self {
        self.add(other.add(self.scale(-1.0)).scale(t))
    }
}

/// A 2D drawing surface.
///
/// Coordinates are pixels with the origin at the top-left; a pixel `(x, y)` is
/// centered on the integer point. Implementors only need `put_pixel`, which
/// must silently ignore coordinates outside the surface.
pub trait Canvas {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    fn put_pixel(&mut self, x: i32, y: i32, color: Color);

    fn clear_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        self.fill_rect(x, y, w, h, color);
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width() as i32);
        let y1 = (y + h).min(self.height() as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.put_pixel(px, py, color);
            }
        }
    }

    /// Even-odd fill of a closed outline
    fn fill_polygon(&mut self, points: &[(f32, f32)], color: Color) {
        if points.len() < 3 {
            return;
        }
        let min_y = points.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);
        let y0 = (min_y.ceil() as i32).max(0);
        let y1 = (max_y.floor() as i32).min(self.height() as i32 - 1);

        let mut crossings = Vec::new();
        for y in y0..=y1 {
            let fy = y as f32;
            crossings.clear();
            for i in 0..points.len() {
                let (ax, ay) = points[i];
                let (bx, by) = points[(i + 1) % points.len()];
                if (ay <= fy && fy < by) || (by <= fy && fy < ay) {
                    crossings.push(ax + (fy - ay) / (by - ay) * (bx - ax));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for span in crossings.chunks_exact(2) {
                let xa = (span[0].ceil() as i32).max(0);
                let xb = (span[1].floor() as i32).min(self.width() as i32 - 1);
                for x in xa..=xb {
                    self.put_pixel(x, y, color);
                }
            }
        }
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, width: f32) {
        let half = ((width - 1.0) / 2.0).round().max(0.0) as i32;
        let (x0, y0) = (from.0.round() as i32, from.1.round() as i32);
        let (x1, y1) = (to.0.round() as i32, to.1.round() as i32);
        for (x, y, _) in LineSteps::new(x0, y0, x1, y1) {
            if half == 0 {
                self.put_pixel(x, y, color);
            } else {
                self.fill_rect(x - half, y - half, 2 * half + 1, 2 * half + 1, color);
            }
        }
    }

    /// Fill the ellipse inscribed in the rectangle `(x, y, w, h)`
    fn fill_oval(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let (rx, ry) = (w / 2.0, h / 2.0);
        let (cx, cy) = (x + rx, y + ry);
        let x0 = (x.floor() as i32).max(0);
        let y0 = (y.floor() as i32).max(0);
        let x1 = ((x + w).ceil() as i32).min(self.width() as i32 - 1);
        let y1 = ((y + h).ceil() as i32).min(self.height() as i32 - 1);
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = (px as f32 - cx) / rx;
                let dy = (py as f32 - cy) / ry;
                if dx * dx + dy * dy <= 1.0 {
                    self.put_pixel(px, py, color);
                }
            }
        }
    }
}

/// Bresenham walk from `(x0, y0)` to `(x1, y1)` inclusive, yielding each
/// pixel with its parameter `t` in `[0, 1]` along the line
pub struct LineSteps {
    x: i32,
    y: i32,
    x1: i32,
    y1: i32,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
    step: u32,
    total: f32,
    done: bool,
}

impl LineSteps {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        Self {
            x: x0,
            y: y0,
            x1,
            y1,
            dx,
            dy,
            sx: if x0 < x1 { 1 } else { -1 },
            sy: if y0 < y1 { 1 } else { -1 },
            err: dx + dy,
            step: 0,
            total: dx.max(-dy).max(1) as f32,
            done: false,
        }
    }
}

impl Iterator for LineSteps {
    type Item = (i32, i32, f32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = (self.x, self.y, (self.step as f32 / self.total).min(1.0));
        if self.x == self.x1 && self.y == self.y1 {
            self.done = true;
            return Some(item);
        }
        let e2 = 2 * self.err;
        if e2 >= self.dy {
            self.err += self.dy;
            self.x += self.sx;
        }
        if e2 <= self.dx {
            self.err += self.dx;
            self.y += self.sy;
        }
        self.step += 1;
        Some(item)
    }
}

/// In-memory RGB canvas
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK; width * height],
        }
    }

    /// Resize, discarding the contents
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, Color::BLACK);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Number of pixels whose color differs from `background`
    pub fn count_not(&self, background: Color) -> usize {
        self.pixels.iter().filter(|&&c| c != background).count()
    }

    /// Inclusive `(min_x, min_y, max_x, max_y)` of the pixels that differ from
    /// `background`
    pub fn covered_bounds(&self, background: Color) -> Option<(usize, usize, usize, usize)> {
        let mut bounds: Option<(usize, usize, usize, usize)> = None;
        for (i, &c) in self.pixels.iter().enumerate() {
            if c == background {
                continue;
            }
            let (x, y) = (i % self.width, i / self.width);
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
        bounds
    }
}

impl Canvas for PixelBuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        self.pixels[y as usize * self.width + x as usize] = color;
    }
}
