/// Per-frame pipeline: transform, cull, project and rasterize a mesh
use log::debug;

use crate::canvas::{Canvas, Color};
use crate::geometry::{Mesh, Polygon};
use crate::lighting::{Lighting, RenderingModes};
use crate::math::{transform_affine, transform_direction, Mat4, Vec3, VectorExt, EPSILON};
use crate::projection::Camera;
use crate::raster::{self, ScreenVertex, Shading};
use crate::texture::Texture;
use crate::zbuffer::ZBuffer;

/// Diameter of a helper-camera marker in pixels
pub const MARKER_SIZE: f32 = 8.0;

/// Largest fraction of the depth pulled towards the viewer for wireframe
/// lines, reached at grazing angles close up
const WIRE_DEPTH_BIAS: f32 = 2e-4;

/// Inputs of a frame that do not depend on the canvas size
#[derive(Debug, Clone, Copy)]
pub struct RenderParams<'a> {
    pub modes: RenderingModes,
    pub base_color: Color,
    pub wire_color: Color,
    pub background: Color,
    pub texture: Option<&'a Texture>,
    pub lighting: Option<&'a Lighting>,
    /// Cameras drawn as markers
    pub helper_cameras: &'a [Camera],
}

impl Default for RenderParams<'_> {
    fn default() -> Self {
        Self {
            modes: RenderingModes::default(),
            base_color: Color::LIGHT_GRAY,
            wire_color: Color::BLACK,
            background: Color::BLACK,
            texture: None,
            lighting: None,
            helper_cameras: &[],
        }
    }
}

/// What a frame did, per face and per pixel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub faces_drawn: usize,
    pub faces_culled: usize,
    /// Degenerate or out-of-range faces
    pub faces_skipped: usize,
    pub triangles_filled: usize,
    pub pixels_filled: usize,
    pub wire_pixels: usize,
    pub markers_drawn: usize,
}

/// Software renderer. Holds the depth buffer between frames so it is only
/// reallocated when the canvas size changes.
#[derive(Debug, Clone)]
pub struct RenderEngine {
    zbuffer: ZBuffer,
}

impl Default for RenderEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderEngine {
    pub fn new() -> Self {
        Self {
            zbuffer: ZBuffer::new(0, 0),
        }
    }

    /// Depth buffer of the last frame
    pub fn zbuffer(&self) -> &ZBuffer {
        &self.zbuffer
    }

    /// Map NDC x/y to pixel coordinates; `y` grows downwards
    pub fn ndc_to_screen(ndc_x: f32, ndc_y: f32, width: usize, height: usize) -> (f32, f32) {
        let half_w = (width as f32 - 1.0) / 2.0;
        let x = half_w * ndc_x + half_w;
        let y = (1.0 - height as f32) / 2.0 * ndc_y + (height as f32 - 1.0) / 2.0;
        (x, y)
    }

    /// Project a point through `matrix` to screen x/y plus NDC depth.
    ///
    /// Returns `None` when clip w is too close to zero to divide by.
    pub fn project_to_screen(point: &Vec3, matrix: &Mat4, width: usize, height: usize) -> Option<Vec3> {
        let clip = matrix * point.push(1.0);
        let ndc = clip.xyz().checked_div(clip.w).ok()?;
        let (x, y) = Self::ndc_to_screen(ndc.x, ndc.y, width, height);
        Some(Vec3::new(x, y, ndc.z))
    }

    /// Render one frame of `mesh` seen from `camera` into `canvas`
    pub fn render<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        camera: &Camera,
        mesh: &Mesh,
        params: &RenderParams,
    ) -> RenderStats {
        let (width, height) = (canvas.width(), canvas.height());
        let mut stats = RenderStats::default();

        canvas.clear_rect(0, 0, width as i32, height as i32, params.background);
        if self.zbuffer.width() != width || self.zbuffer.height() != height {
            self.zbuffer.resize(width, height);
        } else {
            self.zbuffer.clear();
        }

        let model = mesh.model_matrix();
        let view = camera.view_matrix();
        let projection = camera.projection_matrix();
        let model_view = view * model;
        let mvp = projection * model_view;
        let normal_matrix = mesh.transform().normal_matrix();

        let frame = Frame {
            mesh,
            model,
            model_view: &model_view,
            mvp: &mvp,
            normal_matrix: &normal_matrix,
            width,
            height,
        };

        let shading = Shading {
            texture: if params.modes.texture { params.texture } else { None },
            lighting: if params.modes.lighting { params.lighting } else { None },
            base_color: params.base_color,
            camera_position: camera.position(),
        };

        let mut screen = Vec::new();
        for polygon in &mesh.polygons {
            let Some(face) = frame.face(polygon) else {
                stats.faces_skipped += 1;
                continue;
            };
            if !face.front_facing {
                stats.faces_culled += 1;
                continue;
            }

            screen.clear();
            if !frame.project_polygon(polygon, &mut screen) {
                stats.faces_skipped += 1;
                continue;
            }

            for [a, b, c] in polygon.fan() {
                let triangle = [&screen[a], &screen[b], &screen[c]];
                stats.pixels_filled += if params.modes.shaded_fill() {
                    raster::fill_triangle_shaded(canvas, &mut self.zbuffer, triangle, &shading)
                } else {
                    raster::fill_triangle(canvas, &mut self.zbuffer, triangle, params.base_color)
                };
                stats.triangles_filled += 1;
            }

            if params.modes.wireframe {
                let bias = face.wire_depth_bias_scale();
                for i in 0..screen.len() {
                    let next = (i + 1) % screen.len();
                    stats.wire_pixels += raster::draw_line(
                        canvas,
                        &mut self.zbuffer,
                        &screen[i],
                        &screen[next],
                        params.wire_color,
                        bias,
                    );
                }
            }
            stats.faces_drawn += 1;
        }

        stats.markers_drawn = draw_markers(canvas, camera, params.helper_cameras, &(projection * view));

        debug!(
            "frame {}x{}: {} drawn, {} culled, {} skipped, {} px filled, {} wire px",
            width,
            height,
            stats.faces_drawn,
            stats.faces_culled,
            stats.faces_skipped,
            stats.pixels_filled,
            stats.wire_pixels
        );
        stats
    }
}

/// Matrices and target size shared by every face of a frame
struct Frame<'a> {
    mesh: &'a Mesh,
    model: &'a Mat4,
    model_view: &'a Mat4,
    mvp: &'a Mat4,
    normal_matrix: &'a Mat4,
    width: usize,
    height: usize,
}

/// View-space facts about a face, from its first three corners
struct Face {
    front_facing: bool,
    normal: Vec3,
    to_camera: Vec3,
}

impl Face {
    /// Multiplier for wireframe depth: grows towards the viewer at grazing
    /// angles and fades with distance.
    ///
    /// The angle and distance terms scale a small offset subtracted from one,
    /// not the depth itself; the result stays below one so a line is never
    /// pushed behind the face it outlines.
    fn wire_depth_bias_scale(&self) -> f32 {
        let distance = self.to_camera.norm();
        let cos_theta = match (self.normal.checked_normalize(), self.to_camera.checked_normalize()) {
            (Ok(n), Ok(c)) => n.dot(&c).abs(),
            _ => 1.0,
        };
        let angle_scale = 1.0 + 8.0 * (1.0 - cos_theta).powi(5);
        let distance_factor = 1.0 / (1.0 + 0.15 * distance);
        1.0 - WIRE_DEPTH_BIAS * angle_scale * distance_factor
    }
}

impl Frame<'_> {
    /// Cull test in view space. `None` for faces that cannot be drawn at all.
    fn face(&self, polygon: &Polygon) -> Option<Face> {
        let idx = polygon.vertex_indices();
        if idx.len() < 3 || idx.iter().any(|&i| i >= self.mesh.vertices.len()) {
            return None;
        }
        let v0 = transform_affine(self.model_view, &self.mesh.vertices[idx[0]]);
        let v1 = transform_affine(self.model_view, &self.mesh.vertices[idx[1]]);
        let v2 = transform_affine(self.model_view, &self.mesh.vertices[idx[2]]);

        let normal = (v1 - v0).cross(&(v2 - v0));
        if normal.norm() < EPSILON {
            return None;
        }
        // Camera sits at the view-space origin
        let to_camera = -v0;
        Some(Face {
            front_facing: normal.dot(&to_camera) > 0.0,
            normal,
            to_camera,
        })
    }

    /// Project every corner of `polygon` into `out`. Returns false if a corner
    /// could not be placed on screen.
    fn project_polygon(&self, polygon: &Polygon, out: &mut Vec<ScreenVertex>) -> bool {
        let mesh = self.mesh;
        for (corner, &index) in polygon.vertex_indices().iter().enumerate() {
            let vertex = mesh.vertices[index];
            let clip = self.mvp * vertex.push(1.0);
            let inv_w = if clip.w.abs() > EPSILON { 1.0 / clip.w } else { 1.0 };
            let ndc = clip.xyz() * inv_w;
            if !(ndc.x.is_finite() && ndc.y.is_finite() && ndc.z.is_finite()) {
                return false;
            }
            let (x, y) = RenderEngine::ndc_to_screen(ndc.x, ndc.y, self.width, self.height);

            let uv = polygon
                .texture_indices()
                .get(corner)
                .and_then(|&t| mesh.texture_coords.get(t))
                .copied();
            let normal = polygon
                .normal_indices()
                .get(corner)
                .and_then(|&n| mesh.normals.get(n))
                .and_then(|n| transform_direction(self.normal_matrix, n).checked_normalize().ok());

            out.push(ScreenVertex {
                x,
                y,
                z: ndc.z,
                inv_w,
                uv,
                normal,
                world_position: Some(transform_affine(self.model, &vertex)),
                lighting_intensity: None,
            });
        }
        true
    }
}

fn draw_markers<C: Canvas + ?Sized>(canvas: &mut C, active: &Camera, helpers: &[Camera], view_projection: &Mat4) -> usize {
    let (width, height) = (canvas.width(), canvas.height());
    let mut drawn = 0;
    for helper in helpers.iter().filter(|h| *h != active) {
        let Some(p) = RenderEngine::project_to_screen(&helper.position(), view_projection, width, height) else {
            continue;
        };
        if !(-1.0..=1.0).contains(&p.z) {
            continue;
        }
        let r = MARKER_SIZE / 2.0;
        canvas.fill_oval(p.x - r, p.y - r, MARKER_SIZE, MARKER_SIZE, Color::CORNFLOWER_BLUE);
        drawn += 1;
    }
    drawn
}
