/// Triangle and line rasterization against a canvas and depth buffer
use crate::canvas::{Canvas, Color, LineSteps};
use crate::lighting::Lighting;
use crate::math::{Vec2, Vec3};
use crate::texture::Texture;
use crate::zbuffer::ZBuffer;

/// A vertex after projection, carrying what the fill needs to interpolate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub x: f32,
    pub y: f32,
    /// NDC depth, smaller is nearer
    pub z: f32,
    /// `1 / w` from clip space, for perspective-correct interpolation
    pub inv_w: f32,
    pub uv: Option<Vec2>,
    /// World-space unit normal
    pub normal: Option<Vec3>,
    pub world_position: Option<Vec3>,
    /// Lambert term computed ahead of time, overrides per-pixel lighting
    pub lighting_intensity: Option<f32>,
}

impl ScreenVertex {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            inv_w: 1.0,
            uv: None,
            normal: None,
            world_position: None,
            lighting_intensity: None,
        }
    }
}

/// Per-triangle inputs of the shaded fill path
#[derive(Debug, Clone, Copy)]
pub struct Shading<'a> {
    pub texture: Option<&'a Texture>,
    pub lighting: Option<&'a Lighting>,
    pub base_color: Color,
    /// Light position for the per-pixel Lambert term
    pub camera_position: Vec3,
}

/// Fill a triangle with a single color. Returns the number of pixels written.
pub fn fill_triangle<C: Canvas + ?Sized>(
    canvas: &mut C,
    zbuffer: &mut ZBuffer,
    v: [&ScreenVertex; 3],
    color: Color,
) -> usize {
    scan_triangle(canvas, zbuffer, v, |_| color)
}

/// Fill a triangle with texture and/or lighting. Returns the number of pixels
/// written.
pub fn fill_triangle_shaded<C: Canvas + ?Sized>(
    canvas: &mut C,
    zbuffer: &mut ZBuffer,
    v: [&ScreenVertex; 3],
    shading: &Shading,
) -> usize {
    let uvs = all_three(v, |s| s.uv);
    let normals = all_three(v, |s| s.normal);
    let positions = all_three(v, |s| s.world_position);
    let intensities = all_three(v, |s| s.lighting_intensity);
    let inv_w = [v[0].inv_w, v[1].inv_w, v[2].inv_w];

    scan_triangle(canvas, zbuffer, v, |bary| {
        let weights = perspective_weights(bary, inv_w);

        let mut color = shading.base_color;
        if let (Some(texture), Some(uv)) = (shading.texture, uvs) {
            let uv = interpolate(weights, uv);
            color = texture.sample(uv.x, uv.y).modulate(shading.base_color);
        }

        if let Some(lighting) = shading.lighting {
            let intensity = match (intensities, normals, positions) {
                (Some(i), _, _) => weights[0] * i[0] + weights[1] * i[1] + weights[2] * i[2],
                (None, Some(n), Some(p)) => lighting.intensity(
                    &interpolate(weights, n),
                    &interpolate(weights, p),
                    &shading.camera_position,
                ),
                // Without normals the surface renders fully lit
                _ => 1.0,
            };
            color = lighting.shade(color, intensity);
        }
        color
    })
}

/// Draw a depth-tested line between two projected vertices.
///
/// Depth is interpolated linearly and multiplied by `depth_bias_scale` before
/// the z-buffer comparison. Returns the number of pixels written.
pub fn draw_line<C: Canvas + ?Sized>(
    canvas: &mut C,
    zbuffer: &mut ZBuffer,
    a: &ScreenVertex,
    b: &ScreenVertex,
    color: Color,
    depth_bias_scale: f32,
) -> usize {
    let bounds = (
        -1.0,
        -1.0,
        canvas.width() as f32,
        canvas.height() as f32,
    );
    let Some(((x0, y0, z0), (x1, y1, z1))) =
        clip_segment((a.x, a.y, a.z), (b.x, b.y, b.z), bounds)
    else {
        return 0;
    };

    let mut written = 0;
    for (x, y, t) in LineSteps::new(x0.round() as i32, y0.round() as i32, x1.round() as i32, y1.round() as i32) {
        let depth = z0 + t * (z1 - z0);
        if zbuffer.test_and_set(x, y, depth * depth_bias_scale) {
            canvas.put_pixel(x, y, color);
            written += 1;
        }
    }
    written
}

fn scan_triangle<C, F>(canvas: &mut C, zbuffer: &mut ZBuffer, v: [&ScreenVertex; 3], mut shade: F) -> usize
where
    C: Canvas + ?Sized,
    F: FnMut([f32; 3]) -> Color,
{
    let (v0, v1, v2) = (v[0], v[1], v[2]);

    // Bounding box
    let min_x = v0.x.min(v1.x).min(v2.x).floor();
    let max_x = v0.x.max(v1.x).max(v2.x).ceil();
    let min_y = v0.y.min(v1.y).min(v2.y).floor();
    let max_y = v0.y.max(v1.y).max(v2.y).ceil();
    if !(min_x.is_finite() && max_x.is_finite() && min_y.is_finite() && max_y.is_finite()) {
        return 0;
    }

    // Clip to screen bounds
    let min_x = (min_x as i32).max(0);
    let max_x = (max_x as i32).min(canvas.width() as i32 - 1);
    let min_y = (min_y as i32).max(0);
    let max_y = (max_y as i32).min(canvas.height() as i32 - 1);

    let mut written = 0;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = (x as f32, y as f32);

            // Barycentric coordinates
            let Some((w0, w1, w2)) = barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), p) else {
                return written;
            };
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            // Interpolate depth
            let depth = w0 * v0.z + w1 * v1.z + w2 * v2.z;
            if !zbuffer.test_and_set(x, y, depth) {
                continue;
            }
            canvas.put_pixel(x, y, shade([w0, w1, w2]));
            written += 1;
        }
    }
    written
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(v0: (f32, f32), v1: (f32, f32), v2: (f32, f32), p: (f32, f32)) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

/// Screen-space barycentrics reweighted by `1 / w` and renormalized
fn perspective_weights(bary: [f32; 3], inv_w: [f32; 3]) -> [f32; 3] {
    let w = [bary[0] * inv_w[0], bary[1] * inv_w[1], bary[2] * inv_w[2]];
    let sum = w[0] + w[1] + w[2];
    if sum.abs() < 1e-12 {
        return bary;
    }
    [w[0] / sum, w[1] / sum, w[2] / sum]
}

fn interpolate<T>(weights: [f32; 3], values: [T; 3]) -> T
where
    T: std::ops::Mul<f32, Output = T> + std::ops::Add<Output = T> + Copy,
{
    values[0] * weights[0] + values[1] * weights[1] + values[2] * weights[2]
}

fn all_three<T>(v: [&ScreenVertex; 3], get: impl Fn(&ScreenVertex) -> Option<T>) -> Option<[T; 3]> {
    Some([get(v[0])?, get(v[1])?, get(v[2])?])
}

type Point = (f32, f32, f32);

/// Liang-Barsky clip of a segment to `(min_x, min_y, max_x, max_y)`, keeping
/// depth in step with the clipped endpoints
fn clip_segment(a: Point, b: Point, bounds: (f32, f32, f32, f32)) -> Option<(Point, Point)> {
    // Far off-screen endpoints lose all precision in f32
    let (ax, ay, az) = (a.0 as f64, a.1 as f64, a.2 as f64);
    let (min_x, min_y, max_x, max_y) = (
        bounds.0 as f64,
        bounds.1 as f64,
        bounds.2 as f64,
        bounds.3 as f64,
    );
    let (dx, dy, dz) = (b.0 as f64 - ax, b.1 as f64 - ay, b.2 as f64 - az);
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    for (p, q) in [
        (-dx, ax - min_x),
        (dx, max_x - ax),
        (-dy, ay - min_y),
        (dy, max_y - ay),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    if !(t0.is_finite() && t1.is_finite()) {
        return None;
    }
    let at = |t: f64| ((ax + t * dx) as f32, (ay + t * dy) as f32, (az + t * dz) as f32);
    Some((at(t0), at(t1)))
}
