//! Dirty-tracked constant-buffer updates
//!
//! Copies CPU-authoritative state into the active ring slot: object and
//! material constants only while their dirty counters are live, pass
//! constants exactly once per frame, and the simulated wave vertices every
//! frame. Decrementing a dirty counter once per pass is what makes a change
//! reach each of the ring's slots exactly once as the ring rotates.

use crate::foundation::math::{Mat4, Vec3};
use crate::render::camera::Camera;
use crate::render::constants::{
    transposed, MaterialConstants, ObjectConstants, PassConstants,
};
use crate::render::frame::FrameResources;
use crate::render::lighting::LightingEnvironment;
use crate::render::material::{MaterialArena, MaterialHandle};
use crate::render::mesh::Vertex;
use crate::scene::item::RenderItemCatalog;
use crate::sim::waves::WaveField;

/// Frame timing snapshot consumed by the pass constants
#[derive(Debug, Clone, Copy)]
pub struct FrameTiming {
    /// Seconds since scene start
    pub total_time: f32,
    /// Seconds since last frame
    pub delta_time: f32,
}

/// Pushes dirty CPU state into the current frame's buffers
pub struct ConstantBufferUpdater {
    ring_depth: u32,
    /// Water UV scroll rate in texture units per second
    scroll_rate: (f32, f32),
}

impl ConstantBufferUpdater {
    /// Create an updater for a ring of the given depth
    pub fn new(ring_depth: usize) -> Self {
        Self {
            ring_depth: ring_depth as u32,
            scroll_rate: (0.1, 0.02),
        }
    }

    /// Advance time-varying material state before the dirty sweep.
    ///
    /// Scrolls the water material's UV offset, wrapping at 1.0, and re-marks
    /// it dirty for the full ring depth so the motion reaches every slot.
    pub fn animate_materials(
        &self,
        materials: &mut MaterialArena,
        water: MaterialHandle,
        dt: f32,
    ) {
        let material = materials.get_mut(water);

        let mut u = material.transform[(0, 3)] + self.scroll_rate.0 * dt;
        let mut v = material.transform[(1, 3)] + self.scroll_rate.1 * dt;
        if u >= 1.0 {
            u -= 1.0;
        }
        if v >= 1.0 {
            v -= 1.0;
        }
        material.transform[(0, 3)] = u;
        material.transform[(1, 3)] = v;
        material.dirty_frames = self.ring_depth;
    }

    /// Write every dirty item's transforms into the slot's object constants
    pub fn update_object_constants(
        &self,
        slot: &mut FrameResources,
        catalog: &mut RenderItemCatalog,
    ) {
        for item in catalog.iter_mut() {
            if item.dirty_frames == 0 {
                continue;
            }
            let constants = ObjectConstants {
                world: transposed(&item.world),
                tex_transform: transposed(&item.tex_transform),
            };
            slot.object_cb.copy_data(item.obj_cb_index, &constants);
            item.dirty_frames -= 1;
        }
    }

    /// Write every dirty material into the slot's material constants
    pub fn update_material_constants(
        &self,
        slot: &mut FrameResources,
        materials: &mut MaterialArena,
    ) {
        for material in materials.iter_mut() {
            if material.dirty_frames == 0 {
                continue;
            }
            let constants = MaterialConstants {
                diffuse_albedo: material.diffuse_albedo.into(),
                fresnel_r0: material.fresnel_r0.into(),
                roughness: material.roughness,
                mat_transform: transposed(&material.transform),
            };
            slot.material_cb.copy_data(material.cb_index, &constants);
            material.dirty_frames -= 1;
        }
    }

    /// Rebuild and write the pass constants; unconditionally, once per frame.
    pub fn update_pass_constants(
        &self,
        slot: &mut FrameResources,
        camera: &Camera,
        lighting: &LightingEnvironment,
        viewport: (u32, u32),
        timing: FrameTiming,
    ) {
        let view = camera.view();
        let proj = camera.proj();
        let view_proj = proj * view;
        let inv_view = camera.inv_view();
        let inv_proj = proj.try_inverse().unwrap_or_else(Mat4::identity);
        let inv_view_proj = view_proj.try_inverse().unwrap_or_else(Mat4::identity);

        let (width, height) = viewport;
        let constants = PassConstants {
            view: transposed(&view),
            inv_view: transposed(&inv_view),
            proj: transposed(&proj),
            inv_proj: transposed(&inv_proj),
            view_proj: transposed(&view_proj),
            inv_view_proj: transposed(&inv_view_proj),
            eye_pos: camera.position().into(),
            pad0: 0.0,
            render_target_size: [width as f32, height as f32],
            inv_render_target_size: [1.0 / width as f32, 1.0 / height as f32],
            near_z: camera.near_z(),
            far_z: camera.far_z(),
            total_time: timing.total_time,
            delta_time: timing.delta_time,
            ambient_light: lighting.ambient.into(),
            lights: lighting.packed_lights(),
        };
        slot.pass_cb.copy_data(0, &constants);
    }

    /// Stream the simulated wave surface into the slot's dynamic vertex
    /// buffer. Texture coordinates map the grid extent onto [0, 1].
    pub fn upload_wave_vertices(&self, slot: &mut FrameResources, waves: &WaveField) {
        let width = waves.width();
        let depth = waves.depth();
        for i in 0..waves.vertex_count() {
            let position: Vec3 = waves.position(i);
            let vertex = Vertex {
                position: position.into(),
                normal: waves.normal(i).into(),
                tex_coord: [0.5 + position.x / width, 0.5 - position.z / depth],
            };
            slot.waves_vb.copy_data(i, &vertex);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat4;
    use crate::render::frame::FrameResourceRing;
    use crate::render::material::Material;
    use crate::render::mesh::{GeometryHandle, Submesh};
    use crate::scene::bounds::Aabb;
    use crate::scene::item::{RenderItem, RenderLayer};

    fn test_catalog() -> (RenderItemCatalog, crate::scene::item::ItemHandle) {
        let mut catalog = RenderItemCatalog::new();
        let submesh = Submesh {
            index_count: 36,
            start_index: 0,
            base_vertex: 0,
            bounds: Aabb::new(Vec3::new(-0.5, -0.5, -0.5), Vec3::new(0.5, 0.5, 0.5)),
        };
        let handle = catalog.add(
            RenderItem::new(
                GeometryHandle(0),
                submesh,
                MaterialHandle(0),
                Mat4::identity(),
                3,
            ),
            RenderLayer::Opaque,
        );
        (catalog, handle)
    }

    #[test]
    fn test_dirty_propagation_reaches_every_slot_once() {
        let (mut catalog, handle) = test_catalog();
        let mut ring = FrameResourceRing::new(3, 4, 2, 4).unwrap();
        let updater = ConstantBufferUpdater::new(3);

        // Drain the initial dirty frames.
        for _ in 0..3 {
            updater.update_object_constants(ring.current_mut(), &mut catalog);
            ring_advance_unchecked(&mut ring);
        }
        assert_eq!(catalog.item(handle).dirty_frames, 0);

        // One mutation, then one pass per slot.
        let world = Mat4::new_translation(&Vec3::new(7.0, 0.0, 0.0));
        catalog.set_world(handle, world, 3);
        let expected = transposed(&world);

        for pass in 0..3 {
            updater.update_object_constants(ring.current_mut(), &mut catalog);
            assert_eq!(
                ring.current().object_cb.element(0).world,
                expected,
                "slot not updated on pass {pass}"
            );
            ring_advance_unchecked(&mut ring);
        }
        assert_eq!(catalog.item(handle).dirty_frames, 0);

        // A fourth pass writes nothing: overwrite detection via a sentinel.
        let slot = ring.current_mut();
        slot.object_cb.copy_data(0, &ObjectConstants::default());
        updater.update_object_constants(slot, &mut catalog);
        assert_eq!(
            ring.current().object_cb.element(0).world,
            ObjectConstants::default().world
        );
    }

    fn ring_advance_unchecked(ring: &mut FrameResourceRing) {
        struct DoneFence;
        impl crate::render::frame::GpuFence for DoneFence {
            fn completed_value(&self) -> u64 {
                u64::MAX
            }
            fn wait_for(&self, _: u64) -> Result<(), crate::render::RenderError> {
                Ok(())
            }
        }
        ring.advance(&DoneFence).unwrap();
    }

    #[test]
    fn test_material_animation_wraps_and_marks_dirty() {
        let mut materials = MaterialArena::new();
        let water = materials.add(Material::new("water"));
        materials.get_mut(water).transform[(0, 3)] = 0.95;
        materials.get_mut(water).dirty_frames = 0;

        let updater = ConstantBufferUpdater::new(3);
        updater.animate_materials(&mut materials, water, 1.0);

        let material = materials.get(water);
        // 0.95 + 0.1 wraps past 1.0
        assert!((material.transform[(0, 3)] - 0.05).abs() < 1e-5);
        assert!((material.transform[(1, 3)] - 0.02).abs() < 1e-6);
        assert_eq!(material.dirty_frames, 3);
    }

    #[test]
    fn test_pass_constants_capture_camera_and_time() {
        let mut ring = FrameResourceRing::new(3, 4, 2, 4).unwrap();
        let updater = ConstantBufferUpdater::new(3);
        let mut camera = Camera::new(0.25 * std::f32::consts::PI, 4.0 / 3.0, 1.0, 1000.0);
        camera.look_at(
            Vec3::new(0.0, 2.0, -15.0),
            Vec3::zeros(),
            Vec3::new(0.0, 1.0, 0.0),
        );
        camera.update_view_matrix();
        let lighting = LightingEnvironment::new();

        updater.update_pass_constants(
            ring.current_mut(),
            &camera,
            &lighting,
            (800, 600),
            FrameTiming {
                total_time: 12.5,
                delta_time: 0.016,
            },
        );

        let pass = ring.current().pass_cb.element(0);
        assert_eq!(pass.eye_pos, [0.0, 2.0, -15.0]);
        assert_eq!(pass.render_target_size, [800.0, 600.0]);
        assert_eq!(pass.total_time, 12.5);
        assert!((pass.inv_render_target_size[0] - 1.0 / 800.0).abs() < 1e-9);
        assert_eq!(pass.near_z, 1.0);
        assert_eq!(pass.far_z, 1000.0);
    }

    #[test]
    fn test_wave_upload_maps_texcoords() {
        let mut ring = FrameResourceRing::new(3, 4, 2, 16).unwrap();
        let updater = ConstantBufferUpdater::new(3);
        let waves = WaveField::new(4, 4, 2.0, 0.03, 4.0, 0.2).unwrap();

        updater.upload_wave_vertices(ring.current_mut(), &waves);

        // First vertex sits at (-width/2, 0, depth/2) => uv (0, 0).
        let first = ring.current().waves_vb.element(0);
        assert_eq!(first.position, [-3.0, 0.0, 3.0]);
        assert!((first.tex_coord[0] - 0.0).abs() < 1e-6);
        assert!((first.tex_coord[1] - 0.0).abs() < 1e-6);

        // Last vertex maps to uv (1, 1).
        let last = ring.current().waves_vb.element(15);
        assert!((last.tex_coord[0] - 1.0).abs() < 1e-6);
        assert!((last.tex_coord[1] - 1.0).abs() < 1e-6);
    }
}
