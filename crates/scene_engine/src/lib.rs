//! # Scene Engine
//!
//! Core library for an interactive maze-and-water scene: a finite-difference
//! water simulation, a triple-buffered frame-resource ring with fence-based
//! reclamation, dirty-tracked constant-buffer updates, and mouse-ray picking
//! over a catalog of render items.
//!
//! The GPU itself stays behind a narrow seam: the library prepares per-frame
//! constant data in CPU-visible staging buffers and coordinates reuse through
//! the [`render::frame::GpuFence`] trait. Device, swapchain, and pipeline
//! bootstrap belong to the embedding application.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! # struct NullFence;
//! # impl GpuFence for NullFence {
//! #     fn completed_value(&self) -> u64 { u64::MAX }
//! #     fn wait_for(&self, _: u64) -> Result<(), RenderError> { Ok(()) }
//! # }
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SceneConfig::default();
//!     let mut scene = Scene::build(&config)?;
//!     let fence = NullFence;
//!
//!     // Per frame: simulate, fill the current ring slot, then draw and
//!     // record the submission's fence value.
//!     let slot = scene.update_frame(1.0 / 60.0, &fence)?;
//!     scene.record_submission(1);
//!     # let _ = slot;
//!     Ok(())
//! }
//! ```

pub mod foundation;
pub mod config;
pub mod sim;
pub mod render;
pub mod scene;
pub mod input;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        config::SceneConfig,
        foundation::{
            math::{Mat4, Mat4Ext, Vec2, Vec3, Vec4},
            time::Timer,
        },
        input::picking::{PickResult, Picker},
        render::{
            camera::Camera,
            frame::{FrameResourceRing, GpuFence},
            lighting::{Light, LightingEnvironment},
            material::{Material, MaterialArena},
            RenderError,
        },
        scene::{item::RenderItemCatalog, Scene, SceneError},
        sim::waves::WaveField,
    };
}
