//! Rendering support: camera, materials, lighting, GPU constant layouts,
//! frame resources, and the per-frame constant updater
//!
//! Draw submission itself lives with the embedding backend; this module
//! prepares everything that submission consumes: filled upload buffers, a
//! rotated ring slot, and per-item draw ranges.

pub mod camera;
pub mod constants;
pub mod frame;
pub mod lighting;
pub mod material;
pub mod mesh;
pub mod updater;

pub use camera::Camera;
pub use constants::{MaterialConstants, ObjectConstants, PassConstants, MAX_LIGHTS};
pub use frame::{FrameResourceRing, FrameResources, GpuFence, UploadBuffer, FRAME_RING_DEPTH};
pub use lighting::{Light, LightingEnvironment};
pub use material::{Material, MaterialArena, MaterialHandle};
pub use mesh::{GeometryArena, GeometryHandle, MeshData, MeshGeometry, Submesh, Vertex};
pub use updater::{ConstantBufferUpdater, FrameTiming};

use thiserror::Error;

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// The GPU stopped making progress while a fence wait was outstanding.
    /// Fatal: the session must terminate, not retry.
    #[error("Device lost while waiting for fence value {0}")]
    DeviceLost(u64),

    /// Frame ring construction rejected its parameters
    #[error("Invalid frame ring: {0}")]
    InvalidRing(String),
}
