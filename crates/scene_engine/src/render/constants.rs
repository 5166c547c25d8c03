//! GPU constant-buffer layouts
//!
//! `#[repr(C)]` mirror structs for the shader-side constant buffers. All
//! matrices are written transposed because the shader does row-vector math;
//! the updater owns that conversion, these structs just fix the byte layout.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::Mat4;

/// Number of packed light slots in the pass constants
pub const MAX_LIGHTS: usize = 16;

/// Identity matrix in the flattened layout the constant structs use
pub fn identity4x4() -> [[f32; 4]; 4] {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Transpose a matrix into the flattened constant layout
pub fn transposed(m: &Mat4) -> [[f32; 4]; 4] {
    m.transpose().into()
}

/// Per-render-item constants
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectConstants {
    /// World transform, transposed
    pub world: [[f32; 4]; 4],
    /// Texture-coordinate transform, transposed
    pub tex_transform: [[f32; 4]; 4],
}

impl Default for ObjectConstants {
    fn default() -> Self {
        Self {
            world: identity4x4(),
            tex_transform: identity4x4(),
        }
    }
}

/// Per-material constants
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialConstants {
    /// Diffuse albedo RGBA
    pub diffuse_albedo: [f32; 4],
    /// Fresnel reflectance at normal incidence
    pub fresnel_r0: [f32; 3],
    /// Surface roughness in [0, 1]
    pub roughness: f32,
    /// UV transform, transposed
    pub mat_transform: [[f32; 4]; 4],
}

impl Default for MaterialConstants {
    fn default() -> Self {
        Self {
            diffuse_albedo: [1.0, 1.0, 1.0, 1.0],
            fresnel_r0: [0.01, 0.01, 0.01],
            roughness: 0.25,
            mat_transform: identity4x4(),
        }
    }
}

/// One packed light slot.
///
/// The field interleaving keeps each vec3 paired with a scalar so the layout
/// has no implicit padding and matches the shader's 16-byte register packing.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct LightConstants {
    /// Light color/intensity
    pub strength: [f32; 3],
    /// Distance where point/spot falloff begins
    pub falloff_start: f32,
    /// Direction for directional/spot lights
    pub direction: [f32; 3],
    /// Distance where point/spot falloff reaches zero
    pub falloff_end: f32,
    /// Position for point/spot lights
    pub position: [f32; 3],
    /// Spot cone exponent
    pub spot_power: f32,
}

/// Per-pass constants: camera, viewport, timing, ambient and the light list
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PassConstants {
    /// View matrix, transposed
    pub view: [[f32; 4]; 4],
    /// Inverse view matrix, transposed
    pub inv_view: [[f32; 4]; 4],
    /// Projection matrix, transposed
    pub proj: [[f32; 4]; 4],
    /// Inverse projection matrix, transposed
    pub inv_proj: [[f32; 4]; 4],
    /// View * projection, transposed
    pub view_proj: [[f32; 4]; 4],
    /// Inverse of view * projection, transposed
    pub inv_view_proj: [[f32; 4]; 4],
    /// World-space eye position
    pub eye_pos: [f32; 3],
    /// Pad to the next 16-byte register
    pub pad0: f32,
    /// Render target size in pixels
    pub render_target_size: [f32; 2],
    /// Reciprocal render target size
    pub inv_render_target_size: [f32; 2],
    /// Near clip plane
    pub near_z: f32,
    /// Far clip plane
    pub far_z: f32,
    /// Seconds since scene start
    pub total_time: f32,
    /// Seconds since last frame
    pub delta_time: f32,
    /// Ambient light RGBA
    pub ambient_light: [f32; 4],
    /// Packed light list; see [`crate::render::lighting`] for the ordering
    pub lights: [LightConstants; MAX_LIGHTS],
}

impl Default for PassConstants {
    fn default() -> Self {
        Self {
            view: identity4x4(),
            inv_view: identity4x4(),
            proj: identity4x4(),
            inv_proj: identity4x4(),
            view_proj: identity4x4(),
            inv_view_proj: identity4x4(),
            eye_pos: [0.0; 3],
            pad0: 0.0,
            render_target_size: [0.0; 2],
            inv_render_target_size: [0.0; 2],
            near_z: 0.0,
            far_z: 0.0,
            total_time: 0.0,
            delta_time: 0.0,
            ambient_light: [0.0; 4],
            lights: [LightConstants::default(); MAX_LIGHTS],
        }
    }
}
