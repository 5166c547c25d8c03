//! Material records and the material arena
//!
//! A material owns the scalar shading terms plus a UV transform used for
//! scroll animation. Like render items, materials carry a dirty counter equal
//! to the number of ring slots that still need to observe their last change.

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::frame::FRAME_RING_DEPTH;

/// Material properties for rendering
#[derive(Debug, Clone)]
pub struct Material {
    /// Debug name
    pub name: String,
    /// Index into each ring slot's material constant array
    pub cb_index: usize,
    /// Texture slot in the descriptor heap, consumed by the draw collaborator
    pub diffuse_srv_index: u32,
    /// Diffuse albedo RGBA
    pub diffuse_albedo: Vec4,
    /// Fresnel reflectance at normal incidence
    pub fresnel_r0: Vec3,
    /// Surface roughness in [0, 1]
    pub roughness: f32,
    /// UV transform; translation components animate scrolling
    pub transform: Mat4,
    /// Ring slots that still need this material's latest state
    pub dirty_frames: u32,
}

impl Material {
    /// Create a material with neutral defaults; chain `with_*` to configure.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cb_index: 0,
            diffuse_srv_index: 0,
            diffuse_albedo: Vec4::new(1.0, 1.0, 1.0, 1.0),
            fresnel_r0: Vec3::new(0.01, 0.01, 0.01),
            roughness: 0.25,
            transform: Mat4::identity(),
            dirty_frames: FRAME_RING_DEPTH as u32,
        }
    }

    /// Set the diffuse albedo
    pub fn with_diffuse(mut self, r: f32, g: f32, b: f32, a: f32) -> Self {
        self.diffuse_albedo = Vec4::new(r, g, b, a);
        self
    }

    /// Set the Fresnel reflectance
    pub fn with_fresnel(mut self, r0: f32) -> Self {
        self.fresnel_r0 = Vec3::new(r0, r0, r0);
        self
    }

    /// Set the roughness factor
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    /// Set the descriptor-heap texture slot
    pub fn with_texture(mut self, srv_index: u32) -> Self {
        self.diffuse_srv_index = srv_index;
        self
    }
}

/// Handle into the material arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub(crate) usize);

/// Arena owning every material; the arena index doubles as the constant
/// buffer slot, assigned once at scene-build time.
#[derive(Debug, Default)]
pub struct MaterialArena {
    materials: Vec<Material>,
}

impl MaterialArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a material; its constant-buffer index is its arena position.
    pub fn add(&mut self, mut material: Material) -> MaterialHandle {
        material.cb_index = self.materials.len();
        self.materials.push(material);
        MaterialHandle(self.materials.len() - 1)
    }

    /// Resolve a handle
    pub fn get(&self, handle: MaterialHandle) -> &Material {
        &self.materials[handle.0]
    }

    /// Resolve a handle mutably
    pub fn get_mut(&mut self, handle: MaterialHandle) -> &mut Material {
        &mut self.materials[handle.0]
    }

    /// Iterate all materials mutably (the updater's dirty sweep)
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Material> {
        self.materials.iter_mut()
    }

    /// Number of materials
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_assigns_cb_indices() {
        let mut arena = MaterialArena::new();
        let a = arena.add(Material::new("grass"));
        let b = arena.add(Material::new("water").with_roughness(0.0));

        assert_eq!(arena.get(a).cb_index, 0);
        assert_eq!(arena.get(b).cb_index, 1);
        assert_eq!(arena.get(b).roughness, 0.0);
    }

    #[test]
    fn test_new_material_is_dirty_for_full_ring() {
        let material = Material::new("bricks");
        assert_eq!(material.dirty_frames, FRAME_RING_DEPTH as u32);
    }

    #[test]
    fn test_roughness_is_clamped() {
        let material = Material::new("m").with_roughness(3.0);
        assert_eq!(material.roughness, 1.0);
    }
}
