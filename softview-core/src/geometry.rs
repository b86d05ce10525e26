/// Mesh and polygon types
use log::debug;

use crate::error::{Attribute, GeometryError};
use crate::math::{Mat4, Vec2, Vec3, VectorExt};
use crate::transform::TransformState;

/// A face as 0-based indices into the owning mesh's attribute arrays.
///
/// Texture and normal index lists are either empty or exactly as long as the
/// vertex index list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Polygon {
    vertex_indices: Vec<usize>,
    texture_indices: Vec<usize>,
    normal_indices: Vec<usize>,
}

impl Polygon {
    pub fn new(vertex_indices: Vec<usize>) -> Self {
        Self {
            vertex_indices,
            texture_indices: Vec::new(),
            normal_indices: Vec::new(),
        }
    }

    pub fn with_texture_indices(mut self, indices: Vec<usize>) -> Result<Self, GeometryError> {
        check_parallel(Attribute::TextureCoord, self.vertex_indices.len(), &indices)?;
        self.texture_indices = indices;
        Ok(self)
    }

    pub fn with_normal_indices(mut self, indices: Vec<usize>) -> Result<Self, GeometryError> {
        check_parallel(Attribute::Normal, self.vertex_indices.len(), &indices)?;
        self.normal_indices = indices;
        Ok(self)
    }

    pub fn vertex_indices(&self) -> &[usize] {
        &self.vertex_indices
    }

    pub fn texture_indices(&self) -> &[usize] {
        &self.texture_indices
    }

    pub fn normal_indices(&self) -> &[usize] {
        &self.normal_indices
    }

    pub fn len(&self) -> usize {
        self.vertex_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_indices.is_empty()
    }

    pub fn has_texture_indices(&self) -> bool {
        !self.texture_indices.is_empty()
    }

    pub fn has_normal_indices(&self) -> bool {
        !self.normal_indices.is_empty()
    }

    /// Fan triangles `(0, i, i + 1)` as corner positions within this polygon
    pub fn fan(&self) -> impl Iterator<Item = [usize; 3]> {
        (1..self.len().saturating_sub(1)).map(|i| [0, i, i + 1])
    }

    /// Keep only the corners for which `keep` returns true, preserving the
    /// parallel lists
    fn retain_corners(&mut self, keep: impl Fn(usize) -> bool) {
        let corners: Vec<usize> = (0..self.len())
            .filter(|&c| keep(self.vertex_indices[c]))
            .collect();
        let pick = |list: &[usize]| -> Vec<usize> {
            if list.is_empty() {
                Vec::new()
            } else {
                corners.iter().map(|&c| list[c]).collect()
            }
        };
        self.texture_indices = pick(&self.texture_indices);
        self.normal_indices = pick(&self.normal_indices);
        self.vertex_indices = pick(&self.vertex_indices);
    }
}

fn check_parallel(attribute: Attribute, expected: usize, indices: &[usize]) -> Result<(), GeometryError> {
    if !indices.is_empty() && indices.len() != expected {
        return Err(GeometryError::IndexCountMismatch {
            attribute,
            expected,
            found: indices.len(),
        });
    }
    Ok(())
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// An indexed polygon mesh with its own transform
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vec3>,
    pub texture_coords: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub polygons: Vec<Polygon>,
    transform: TransformState,
    original_vertices: Vec<Vec3>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_vertex(&mut self, vertex: Vec3) {
        self.vertices.push(vertex);
    }

    pub fn add_texture_coord(&mut self, uv: Vec2) {
        self.texture_coords.push(uv);
    }

    pub fn add_normal(&mut self, normal: Vec3) {
        self.normals.push(normal);
    }

    pub fn add_polygon(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    /// Like `add_polygon`, but rejects indices past the current attribute arrays
    pub fn add_checked_polygon(&mut self, polygon: Polygon) -> Result<(), GeometryError> {
        let checks = [
            (Attribute::Position, polygon.vertex_indices(), self.vertices.len()),
            (Attribute::TextureCoord, polygon.texture_indices(), self.texture_coords.len()),
            (Attribute::Normal, polygon.normal_indices(), self.normals.len()),
        ];
        for (attribute, indices, len) in checks {
            if let Some(&index) = indices.iter().find(|&&i| i >= len) {
                return Err(GeometryError::IndexOutOfRange { attribute, index, len });
            }
        }
        self.polygons.push(polygon);
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut TransformState {
        &mut self.transform
    }

    pub fn model_matrix(&self) -> &Mat4 {
        self.transform.model_matrix()
    }

    /// Snapshot the current vertex positions for `reset_to_original`
    pub fn set_original_vertices(&mut self) {
        self.original_vertices = self.vertices.clone();
    }

    pub fn has_original_vertices(&self) -> bool {
        !self.original_vertices.is_empty()
    }

    /// Restore the last snapshot; no-op without one
    pub fn reset_to_original(&mut self) {
        if !self.original_vertices.is_empty() {
            self.vertices = self.original_vertices.clone();
        }
    }

    pub fn reset_transformations(&mut self) {
        self.transform.reset();
    }

    /// Delete vertex `index`, shifting every higher index down by one.
    ///
    /// Corners referencing the deleted vertex are dropped from their polygons;
    /// polygons left with fewer than 3 corners are removed. Out-of-range
    /// indices are ignored.
    pub fn remove_vertex(&mut self, index: usize) {
        if index >= self.vertices.len() {
            return;
        }
        self.vertices.remove(index);
        if index < self.original_vertices.len() {
            self.original_vertices.remove(index);
        }

        let before = self.polygons.len();
        for polygon in &mut self.polygons {
            polygon.retain_corners(|v| v != index);
            for v in &mut polygon.vertex_indices {
                if *v > index {
                    *v -= 1;
                }
            }
        }
        self.polygons.retain(|p| p.len() >= 3);
        debug!(
            "removed vertex {} from '{}', dropped {} polygons",
            index,
            self.name,
            before - self.polygons.len()
        );
    }

    /// Delete polygon `index`; out-of-range indices are ignored
    pub fn remove_polygon(&mut self, index: usize) {
        if index < self.polygons.len() {
            self.polygons.remove(index);
        }
    }

    /// Split every polygon with more than 3 corners into a triangle fan
    pub fn triangulate(&mut self) {
        let mut triangulated = Vec::with_capacity(self.polygons.len());
        for polygon in self.polygons.drain(..) {
            if polygon.len() <= 3 {
                triangulated.push(polygon);
                continue;
            }
            for [a, b, c] in polygon.fan() {
                let pick = |list: &[usize]| -> Vec<usize> {
                    if list.is_empty() {
                        Vec::new()
                    } else {
                        vec![list[a], list[b], list[c]]
                    }
                };
                triangulated.push(Polygon {
                    vertex_indices: pick(&polygon.vertex_indices),
                    texture_indices: pick(&polygon.texture_indices),
                    normal_indices: pick(&polygon.normal_indices),
                });
            }
        }
        self.polygons = triangulated;
    }

    /// Replace the normals with one smoothed normal per vertex.
    ///
    /// Each vertex gets the normalized sum of the unit face normals around it;
    /// vertices with no usable face get `(0, 0, 1)`. Every polygon's normal
    /// indices are rewritten to match its vertex indices.
    pub fn recalculate_normals(&mut self) {
        let vertex_count = self.vertices.len();
        if vertex_count == 0 || self.polygons.is_empty() {
            self.normals.clear();
            return;
        }

        let mut sums = vec![Vec3::zeros(); vertex_count];
        for polygon in &self.polygons {
            let idx = polygon.vertex_indices();
            if idx.len() < 3 || idx[..3].iter().any(|&i| i >= vertex_count) {
                continue;
            }
            let (p0, p1, p2) = (self.vertices[idx[0]], self.vertices[idx[1]], self.vertices[idx[2]]);
            let Ok(face_normal) = (p1 - p0).cross(&(p2 - p0)).checked_normalize() else {
                continue;
            };
            for &i in &idx[..3] {
                sums[i] += face_normal;
            }
        }

        self.normals = sums
            .into_iter()
            .map(|sum| sum.checked_normalize().unwrap_or_else(|_| Vec3::z()))
            .collect();

        for polygon in &mut self.polygons {
            if polygon.vertex_indices.iter().all(|&i| i < vertex_count) {
                polygon.normal_indices = polygon.vertex_indices.clone();
            } else {
                polygon.normal_indices.clear();
            }
        }
    }

    /// Triangulate and recompute normals, the shape the renderer expects
    pub fn preprocess(&mut self) {
        self.triangulate();
        self.recalculate_normals();
    }

    /// Bounding box of the untransformed vertices, `None` for an empty mesh
    pub fn bounds(&self) -> Option<Bounds> {
        let first = *self.vertices.first()?;
        let bounds = self.vertices.iter().fold(
            Bounds {
                min: first,
                max: first,
            },
            |b, v| Bounds {
                min: b.min.inf(v),
                max: b.max.sup(v),
            },
        );
        Some(bounds)
    }

    /// Axis-aligned cube centered on the origin: 8 vertices, 6 quads wound
    /// counter-clockwise when seen from outside
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::named("cube");

        for &(x, y, z) in &[
            (-half, -half, -half),
            (half, -half, -half),
            (half, half, -half),
            (-half, half, -half),
            (-half, -half, half),
            (half, -half, half),
            (half, half, half),
            (-half, half, half),
        ] {
            mesh.add_vertex(Vec3::new(x, y, z));
        }

        for quad in [
            [4, 5, 6, 7], // front (+z)
            [1, 0, 3, 2], // back (-z)
            [3, 7, 6, 2], // top (+y)
            [0, 1, 5, 4], // bottom (-y)
            [5, 1, 2, 6], // right (+x)
            [0, 4, 7, 3], // left (-x)
        ] {
            mesh.add_polygon(Polygon::new(quad.to_vec()));
        }

        mesh
    }
}
