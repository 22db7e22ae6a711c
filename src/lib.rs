//! # Shade
//!
//! **A procedurally tessellated torus, tumbling under a per-frame MVP shader.**
//!
//! The torus is built once on the CPU ([`TorusMesh`]), uploaded to the GPU
//! ([`Mesh::torus`]) and then, every frame, [`ShadedTorus::update`] computes
//! the model-view-projection, model-view and view matrices plus the light
//! position, and rotates the object a little further about its own axes.
//!
//! ## Quick Start
//!
//! ```no_run
//! use shade::*;
//!
//! fn main() -> Result<()> {
//!     run(AppConfig::new().title("Torus").size(1280, 720))
//! }
//! ```
//!
//! ## Without a window
//!
//! All of the geometry and per-frame math is plain data and can be driven by
//! any render loop:
//!
//! ```
//! use shade::*;
//!
//! let mut torus = ShadedTorus::new(TorusMesh::default(), Light::default());
//! let camera = Camera::new().at([0.0, 1.0, 4.0]).looking_at(Vec3::ZERO);
//!
//! for _ in 0..60 {
//!     let params = torus.update(Some(&camera.matrices(16.0 / 9.0)), 1.0 / 60.0);
//!     assert!(params.is_some());
//! }
//! ```

mod app;
mod camera;
mod error;
mod gpu;
mod mesh;
mod shade;
mod shade_pass;
mod torus;

pub use app::{AppConfig, run};
pub use camera::{Camera, CameraMatrices};
pub use error::{Error, Result};
pub use gpu::GpuContext;
pub use mesh::{Mesh, Transform, Vertex3d};
pub use shade::{Light, ShadedTorus, ShaderParam, ShaderParams, Spin};
pub use shade_pass::ShadePass;
pub use torus::{TorusMesh, TorusParams};

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
