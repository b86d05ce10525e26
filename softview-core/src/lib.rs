/// Softview Core Library - Software rendering pipeline for polygon meshes
///
/// This library provides the windowing-free core of the viewer: OBJ loading,
/// transformation matrices, the orbit camera, and a z-buffered rasterizer that
/// draws into any `Canvas`.

pub mod canvas;
pub mod config;
pub mod error;
pub mod geometry;
pub mod lighting;
pub mod math;
pub mod obj;
pub mod projection;
pub mod raster;
pub mod render;
pub mod scene;
pub mod texture;
pub mod transform;
pub mod zbuffer;

// Re-export commonly used types
pub use canvas::{Canvas, Color, PixelBuffer};
pub use config::ViewerConfig;
pub use error::{ConfigError, GeometryError, MathError, ObjError, TextureError};
pub use geometry::{Bounds, Mesh, Polygon};
pub use lighting::{Lighting, RenderingModes};
pub use math::{Mat3, Mat4, Vec2, Vec3, Vec4, VectorExt};
pub use projection::Camera;
pub use render::{RenderEngine, RenderParams, RenderStats};
pub use scene::Scene;
pub use texture::Texture;
pub use transform::{Transform, TransformState};
pub use zbuffer::ZBuffer;
