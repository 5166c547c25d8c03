//! Scene assembly and the per-frame update loop
//!
//! Builds the maze-and-water demo scene (walls, corner towers, hilly
//! terrain, the simulated water surface, billboard trees) and owns the
//! per-frame pipeline: picking, wave simulation, ring rotation, and
//! constant-buffer updates. Draw submission consumes the result through
//! [`Scene::layer_draws`] and the current slot's buffers.

pub mod bounds;
pub mod geometry;
pub mod item;

use thiserror::Error;

use crate::config::SceneConfig;
use crate::foundation::math::{constants::DEG_TO_RAD, Mat4, Vec3, Vec4};
use crate::input::picking::{PickResult, Picker};
use crate::render::camera::Camera;
use crate::render::frame::{FrameResourceRing, GpuFence, UploadBuffer, FRAME_RING_DEPTH};
use crate::render::lighting::{Light, LightingEnvironment};
use crate::render::material::{Material, MaterialArena, MaterialHandle};
use crate::render::mesh::{GeometryArena, GeometryHandle, MeshGeometry, Vertex};
use crate::render::updater::{ConstantBufferUpdater, FrameTiming};
use crate::render::RenderError;
use crate::scene::item::{ItemHandle, RenderItem, RenderItemCatalog, RenderLayer, Topology};
use crate::sim::disturbance::RippleScheduler;
use crate::sim::waves::WaveField;
use crate::sim::SimError;

/// Scene-level errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// Scene construction failed; nothing was initialized
    #[error("Scene construction failed: {0}")]
    Construction(String),

    /// Rendering subsystem failure (device loss is fatal)
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Simulation subsystem failure
    #[error(transparent)]
    Sim(#[from] SimError),
}

/// Resolved draw parameters for one render item in the current ring slot
#[derive(Debug, Clone, Copy)]
pub struct DrawRecord {
    /// The item being drawn
    pub item: ItemHandle,
    /// Geometry record holding the item's buffers
    pub geometry: GeometryHandle,
    /// Primitive topology
    pub topology: Topology,
    /// Number of indices to draw
    pub index_count: u32,
    /// First index in the geometry's index buffer
    pub start_index: u32,
    /// Added to each index before vertex lookup
    pub base_vertex: i32,
    /// Byte offset of the item's constants in the slot's object buffer
    pub object_cb_offset: usize,
    /// Byte offset of the material's constants in the slot's material buffer
    pub material_cb_offset: usize,
    /// Descriptor-heap slot of the material's diffuse texture
    pub texture_srv: u32,
}

/// The demo scene: catalogs, simulation, frame ring, and camera
pub struct Scene {
    /// First-person camera; move it, then let `update_frame` rebuild views
    pub camera: Camera,

    geometries: GeometryArena,
    materials: MaterialArena,
    catalog: RenderItemCatalog,
    lighting: LightingEnvironment,

    waves: WaveField,
    ripples: RippleScheduler,

    ring: FrameResourceRing,
    updater: ConstantBufferUpdater,
    picker: Picker,

    waves_item: ItemHandle,
    highlight_item: ItemHandle,
    water_material: MaterialHandle,

    viewport: (u32, u32),
    movement_blocked: bool,
    total_time: f32,
}

impl Scene {
    /// Build the complete scene from config.
    ///
    /// Allocation failures and bad parameters surface here; a returned scene
    /// is fully initialized.
    pub fn build(config: &SceneConfig) -> Result<Self, SceneError> {
        log::info!("building scene...");

        let waves = WaveField::new(
            config.waves.rows,
            config.waves.cols,
            config.waves.spatial_step,
            config.waves.time_step,
            config.waves.speed,
            config.waves.damping,
        )?;
        let ripples = RippleScheduler::new(&config.ripples);

        let mut geometries = GeometryArena::new();
        let mut materials = MaterialArena::new();
        let mut catalog = RenderItemCatalog::new();

        let material_set = build_materials(&mut materials);
        let water_material = material_set.water;
        let (waves_item, highlight_item) =
            build_render_items(&mut geometries, &mut catalog, &material_set, &waves);
        let lighting = build_lighting();

        let ring = FrameResourceRing::new(
            FRAME_RING_DEPTH,
            catalog.len(),
            materials.len(),
            waves.vertex_count(),
        )?;

        let mut camera = Camera::new(
            config.camera.fov_y_degrees * DEG_TO_RAD,
            config.window.width as f32 / config.window.height as f32,
            config.camera.near_z,
            config.camera.far_z,
        );
        camera.look_at(
            Vec3::new(0.0, 2.0, -15.0),
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        camera.update_view_matrix();

        log::info!(
            "scene ready: {} items, {} materials, {} wave vertices",
            catalog.len(),
            materials.len(),
            waves.vertex_count()
        );

        Ok(Self {
            camera,
            geometries,
            materials,
            catalog,
            lighting,
            waves,
            ripples,
            ring,
            updater: ConstantBufferUpdater::new(FRAME_RING_DEPTH),
            picker: Picker::new(config.picking.block_distance, FRAME_RING_DEPTH),
            waves_item,
            highlight_item,
            water_material,
            viewport: (config.window.width, config.window.height),
            movement_blocked: false,
            total_time: 0.0,
        })
    }

    /// Run one frame of CPU-side work.
    ///
    /// Order matters: simulation advances first, then the ring rotates
    /// (blocking until the GPU retires the slot being reused), then all
    /// dirty state is copied into that slot. Returns the slot index for the
    /// submission collaborator.
    pub fn update_frame(&mut self, dt: f32, fence: &impl GpuFence) -> Result<usize, SceneError> {
        self.total_time += dt;

        self.ripples.tick(dt, &mut self.waves);
        self.waves.update(dt);

        self.ring.advance(fence)?;

        self.camera.update_view_matrix();
        self.updater
            .animate_materials(&mut self.materials, self.water_material, dt);

        let slot = self.ring.current_mut();
        self.updater.update_object_constants(slot, &mut self.catalog);
        self.updater
            .update_material_constants(slot, &mut self.materials);
        self.updater.update_pass_constants(
            slot,
            &self.camera,
            &self.lighting,
            self.viewport,
            FrameTiming {
                total_time: self.total_time,
                delta_time: dt,
            },
        );
        self.updater.upload_wave_vertices(slot, &self.waves);

        Ok(self.ring.current_index())
    }

    /// Record the fence value signaled for the frame just submitted
    pub fn record_submission(&mut self, fence_value: u64) {
        self.ring.record_fence(fence_value);
    }

    /// Pick at a screen coordinate, updating the highlight item and the
    /// movement-block flag from the nearest hit.
    pub fn pick(&mut self, sx: f32, sy: f32) -> PickResult {
        self.camera.update_view_matrix();
        let result = self.picker.pick(
            sx,
            sy,
            self.viewport,
            &self.camera,
            &mut self.catalog,
            &self.geometries,
            self.highlight_item,
        );
        self.movement_blocked = result.movement_blocked;
        result
    }

    /// Whether the last pick found an obstacle within blocking range
    pub fn movement_blocked(&self) -> bool {
        self.movement_blocked
    }

    /// Walk the camera forward/backward; forward motion is suppressed while
    /// movement is blocked.
    pub fn walk_camera(&mut self, distance: f32) {
        if distance > 0.0 && self.movement_blocked {
            return;
        }
        self.camera.walk(distance);
    }

    /// Strafe the camera sideways
    pub fn strafe_camera(&mut self, distance: f32) {
        self.camera.strafe(distance);
    }

    /// Resolved draw parameters for every item in a layer, in draw order,
    /// against the current ring slot's buffers.
    pub fn layer_draws(&self, layer: RenderLayer) -> impl Iterator<Item = DrawRecord> + '_ {
        let object_stride = self.ring.current().object_cb.element_stride();
        let material_stride = self.ring.current().material_cb.element_stride();
        self.catalog.layer(layer).filter_map(move |handle| {
            let item = self.catalog.item(handle);
            if !item.visible {
                return None;
            }
            let material = self.materials.get(item.material);
            Some(DrawRecord {
                item: handle,
                geometry: item.geometry,
                topology: item.topology,
                index_count: item.index_count,
                start_index: item.start_index,
                base_vertex: item.base_vertex,
                object_cb_offset: item.obj_cb_index * object_stride,
                material_cb_offset: material.cb_index * material_stride,
                texture_srv: material.diffuse_srv_index,
            })
        })
    }

    /// The current slot's dynamic wave vertex buffer, reflecting the latest
    /// simulated heights
    pub fn wave_vertex_buffer(&self) -> &UploadBuffer<Vertex> {
        &self.ring.current().waves_vb
    }

    /// Geometry arena, for binding vertex/index buffers at draw time
    pub fn geometries(&self) -> &GeometryArena {
        &self.geometries
    }

    /// Render-item catalog (read-only)
    pub fn catalog(&self) -> &RenderItemCatalog {
        &self.catalog
    }

    /// The item drawing the simulated water surface
    pub fn waves_item(&self) -> ItemHandle {
        self.waves_item
    }

    /// Frame ring depth
    pub fn ring_depth(&self) -> usize {
        self.ring.depth()
    }

    /// Index of the ring slot currently being filled
    pub fn current_slot(&self) -> usize {
        self.ring.current_index()
    }
}

/// Handles to the materials the item builder wires up
struct MaterialSet {
    bricks: MaterialHandle,
    stone: MaterialHandle,
    grass: MaterialHandle,
    water: MaterialHandle,
    tree_sprites: MaterialHandle,
    highlight: MaterialHandle,
}

fn build_materials(materials: &mut MaterialArena) -> MaterialSet {
    let bricks = materials.add(
        Material::new("bricks")
            .with_texture(0)
            .with_diffuse(1.0, 1.0, 1.0, 1.0)
            .with_fresnel(0.02)
            .with_roughness(0.1),
    );
    let stone = materials.add(
        Material::new("stone")
            .with_texture(1)
            .with_fresnel(0.05)
            .with_roughness(0.3),
    );
    let grass = materials.add(
        Material::new("grass")
            .with_texture(2)
            .with_diffuse(1.0, 1.0, 1.0, 1.0)
            .with_fresnel(0.01)
            .with_roughness(0.125),
    );
    let water = materials.add(
        Material::new("water")
            .with_texture(3)
            .with_diffuse(1.0, 1.0, 1.0, 0.5)
            .with_fresnel(0.1)
            .with_roughness(0.0),
    );
    let tree_sprites = materials.add(
        Material::new("tree_sprites")
            .with_texture(4)
            .with_fresnel(0.01)
            .with_roughness(0.125),
    );
    let highlight = materials.add(
        Material::new("highlight")
            .with_texture(0)
            .with_diffuse(1.0, 1.0, 0.0, 0.6)
            .with_fresnel(0.06)
            .with_roughness(0.0),
    );

    MaterialSet {
        bricks,
        stone,
        grass,
        water,
        tree_sprites,
        highlight,
    }
}

/// Handle pair returned by item construction: (waves item, highlight item)
fn build_render_items(
    geometries: &mut GeometryArena,
    catalog: &mut RenderItemCatalog,
    materials: &MaterialSet,
    waves: &WaveField,
) -> (ItemHandle, ItemHandle) {
    // Static shapes share one geometry record; the water grid gets its own
    // because its vertex buffer is dynamic.
    let mut shapes = MeshGeometry::new("shapes");
    let wall = shapes.push_mesh("wall", &geometry::box_mesh(1.0, 1.0, 1.0));
    let tower = shapes.push_mesh("tower", &geometry::cylinder(1.0, 1.0, 1.0, 20, 4));
    let land = {
        let mut terrain = geometry::grid(160.0, 160.0, 50, 50);
        geometry::apply_hills(&mut terrain);
        shapes.push_mesh("land", &terrain)
    };
    let trees = shapes.push_mesh("trees", &geometry::tree_points(16, 60.0, 8.0));
    let shapes_geo = geometries.add(shapes);

    let mut water_geo = MeshGeometry::new("water");
    let water_sub = water_geo.push_mesh(
        "grid",
        &geometry::grid(
            waves.width(),
            waves.depth(),
            waves.row_count(),
            waves.column_count(),
        ),
    );
    let water_geo = geometries.add(water_geo);

    // Maze walls: outer ring plus a few interior runs. Walls are unit boxes
    // scaled into slabs.
    let wall_world = |sx: f32, sy: f32, sz: f32, tx: f32, ty: f32, tz: f32| {
        Mat4::new_translation(&Vec3::new(tx, ty, tz))
            * Mat4::new_nonuniform_scaling(&Vec3::new(sx, sy, sz))
    };
    let wall_transforms = [
        // Outer ring
        wall_world(40.0, 4.0, 1.0, 0.0, 2.0, 20.0),
        wall_world(40.0, 4.0, 1.0, 0.0, 2.0, -20.0),
        wall_world(1.0, 4.0, 40.0, 20.0, 2.0, 0.0),
        wall_world(1.0, 4.0, 40.0, -20.0, 2.0, 0.0),
        // Interior runs
        wall_world(20.0, 4.0, 1.0, -9.0, 2.0, 5.0),
        wall_world(1.0, 4.0, 20.0, 5.0, 2.0, -5.0),
        wall_world(10.0, 4.0, 1.0, 12.0, 2.0, 10.0),
    ];
    for world in wall_transforms {
        catalog.add(
            RenderItem::new(shapes_geo, wall, materials.bricks, world, FRAME_RING_DEPTH),
            RenderLayer::Opaque,
        );
    }

    // Corner towers
    for (x, z) in [(20.0, 20.0), (20.0, -20.0), (-20.0, 20.0), (-20.0, -20.0)] {
        let world = wall_world(4.0, 8.0, 4.0, x, 4.0, z);
        catalog.add(
            RenderItem::new(shapes_geo, tower, materials.stone, world, FRAME_RING_DEPTH),
            RenderLayer::Opaque,
        );
    }

    // Terrain
    catalog.add(
        RenderItem::new(
            shapes_geo,
            land,
            materials.grass,
            Mat4::identity(),
            FRAME_RING_DEPTH,
        )
        .with_tex_transform(Mat4::new_nonuniform_scaling(&Vec3::new(5.0, 5.0, 1.0))),
        RenderLayer::Opaque,
    );

    // Water surface; its vertex stream comes from the ring slot, the
    // geometry record only contributes indices and the rest-state shadow.
    let waves_item = catalog.add(
        RenderItem::new(
            water_geo,
            water_sub,
            materials.water,
            Mat4::new_translation(&Vec3::new(0.0, -1.5, 0.0)),
            FRAME_RING_DEPTH,
        )
        .with_tex_transform(Mat4::new_nonuniform_scaling(&Vec3::new(5.0, 5.0, 1.0))),
        RenderLayer::Transparent,
    );

    // Billboard trees
    catalog.add(
        RenderItem::new(
            shapes_geo,
            trees,
            materials.tree_sprites,
            Mat4::identity(),
            FRAME_RING_DEPTH,
        )
        .with_topology(Topology::PointList),
        RenderLayer::Sprite,
    );

    // Highlight: invisible until a pick lands; draw range is rewritten to
    // the picked triangle.
    let mut highlight = RenderItem::new(
        shapes_geo,
        wall,
        materials.highlight,
        Mat4::identity(),
        FRAME_RING_DEPTH,
    )
    .with_visible(false);
    highlight.index_count = 0;
    highlight.start_index = 0;
    highlight.base_vertex = 0;
    let highlight_item = catalog.add(highlight, RenderLayer::Highlight);

    (waves_item, highlight_item)
}

fn build_lighting() -> LightingEnvironment {
    let mut env = LightingEnvironment::new().with_ambient(Vec4::new(0.25, 0.25, 0.35, 1.0));

    // Three key directionals
    env = env
        .add_light(Light::Directional {
            direction: Vec3::new(0.577_35, -0.577_35, 0.577_35),
            strength: Vec3::new(0.6, 0.6, 0.6),
        })
        .add_light(Light::Directional {
            direction: Vec3::new(-0.577_35, -0.577_35, 0.577_35),
            strength: Vec3::new(0.3, 0.3, 0.3),
        })
        .add_light(Light::Directional {
            direction: Vec3::new(0.0, -0.707, -0.707),
            strength: Vec3::new(0.15, 0.15, 0.15),
        });

    // A warm point light over the water
    env = env.add_light(Light::Point {
        position: Vec3::new(-10.0, 3.0, 4.0),
        strength: Vec3::new(2.0, 2.0, 0.0),
        falloff_start: 1.0,
        falloff_end: 30.0,
    });

    // Spots washing the maze corridors
    let corridor_spots = [
        (Vec3::new(0.0, 8.0, 3.0), Vec3::new(0.0, -1.0, 0.0), 18.0),
        (Vec3::new(0.0, 4.0, -11.0), Vec3::new(0.0, 0.0, 1.0), 18.0),
        (Vec3::new(-18.0, 3.0, 2.0), Vec3::new(1.0, 0.0, 0.0), 6.0),
        (Vec3::new(-18.0, 3.0, 10.0), Vec3::new(1.0, 0.0, 0.0), 6.0),
        (Vec3::new(18.0, 3.0, 2.0), Vec3::new(-1.0, 0.0, 0.0), 6.0),
        (Vec3::new(18.0, 3.0, 10.0), Vec3::new(-1.0, 0.0, 0.0), 6.0),
    ];
    for (position, direction, spot_power) in corridor_spots {
        env = env.add_light(Light::Spot {
            position,
            direction,
            strength: Vec3::new(1.0, 1.0, 1.0),
            falloff_start: 1.0,
            falloff_end: 25.0,
            spot_power,
        });
    }

    env
}
