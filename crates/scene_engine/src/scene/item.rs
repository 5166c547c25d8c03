//! Render items and the catalog
//!
//! A render item is one drawable instance: transforms, geometry and material
//! handles, a draw range, a local bounding box, and the dirty counter that
//! guarantees every frame-resource slot observes a state change exactly once.
//! The catalog owns all items in a flat arena; draw-order layers hold indices
//! into it, never pointers.

use crate::foundation::math::Mat4;
use crate::render::material::MaterialHandle;
use crate::render::mesh::{GeometryHandle, Submesh};
use crate::scene::bounds::Aabb;

/// Primitive topology of an item's geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Indexed triangle list
    TriangleList,
    /// Point list, expanded to billboards by the sprite pipeline
    PointList,
}

/// Draw-order grouping; one pipeline state per layer on the GPU side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderLayer {
    /// Fully opaque geometry, the picking candidate set
    Opaque,
    /// Blended geometry (water)
    Transparent,
    /// Cutout geometry
    AlphaTested,
    /// Billboard sprites
    Sprite,
    /// The picked-triangle highlight
    Highlight,
}

const LAYER_COUNT: usize = 5;

impl RenderLayer {
    fn index(self) -> usize {
        match self {
            RenderLayer::Opaque => 0,
            RenderLayer::Transparent => 1,
            RenderLayer::AlphaTested => 2,
            RenderLayer::Sprite => 3,
            RenderLayer::Highlight => 4,
        }
    }
}

/// Handle into the render-item catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemHandle(pub(crate) usize);

/// One drawable instance
#[derive(Debug, Clone)]
pub struct RenderItem {
    /// Local-to-world transform
    pub world: Mat4,
    /// Texture-coordinate transform
    pub tex_transform: Mat4,
    /// Index into each ring slot's object constant array
    pub obj_cb_index: usize,
    /// Geometry record holding this item's buffers
    pub geometry: GeometryHandle,
    /// Material record
    pub material: MaterialHandle,
    /// Primitive topology
    pub topology: Topology,
    /// Number of indices to draw
    pub index_count: u32,
    /// First index within the geometry's index buffer
    pub start_index: u32,
    /// Added to each index before vertex lookup
    pub base_vertex: i32,
    /// Local-space bounding box
    pub bounds: Aabb,
    /// Ring slots that still need this item's latest state
    pub dirty_frames: u32,
    /// Invisible items are neither drawn nor pickable
    pub visible: bool,
}

impl RenderItem {
    /// Create an item drawing `submesh` from `geometry` with `material`.
    ///
    /// Starts dirty for `ring_depth` frames so every slot receives the
    /// initial transforms.
    pub fn new(
        geometry: GeometryHandle,
        submesh: Submesh,
        material: MaterialHandle,
        world: Mat4,
        ring_depth: usize,
    ) -> Self {
        Self {
            world,
            tex_transform: Mat4::identity(),
            obj_cb_index: 0,
            geometry,
            material,
            topology: Topology::TriangleList,
            index_count: submesh.index_count,
            start_index: submesh.start_index,
            base_vertex: submesh.base_vertex,
            bounds: submesh.bounds,
            dirty_frames: ring_depth as u32,
            visible: true,
        }
    }

    /// Set the texture transform
    pub fn with_tex_transform(mut self, tex_transform: Mat4) -> Self {
        self.tex_transform = tex_transform;
        self
    }

    /// Set the topology
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Set the visibility flag
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

/// Flat arena owning all render items plus per-layer index lists
#[derive(Debug, Default)]
pub struct RenderItemCatalog {
    items: Vec<RenderItem>,
    layers: [Vec<usize>; LAYER_COUNT],
}

impl RenderItemCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item to a layer; its object constant index is its arena slot.
    pub fn add(&mut self, mut item: RenderItem, layer: RenderLayer) -> ItemHandle {
        let index = self.items.len();
        item.obj_cb_index = index;
        self.items.push(item);
        self.layers[layer.index()].push(index);
        ItemHandle(index)
    }

    /// Resolve a handle
    pub fn item(&self, handle: ItemHandle) -> &RenderItem {
        &self.items[handle.0]
    }

    /// Resolve a handle mutably
    pub fn item_mut(&mut self, handle: ItemHandle) -> &mut RenderItem {
        &mut self.items[handle.0]
    }

    /// Item handles in a draw layer, in insertion order
    pub fn layer(&self, layer: RenderLayer) -> impl Iterator<Item = ItemHandle> + '_ {
        self.layers[layer.index()].iter().map(|&i| ItemHandle(i))
    }

    /// Iterate all items mutably (the updater's dirty sweep)
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RenderItem> {
        self.items.iter_mut()
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace an item's world transform and mark it dirty for every ring
    /// slot, the only sanctioned way to move an item after scene build.
    pub fn set_world(&mut self, handle: ItemHandle, world: Mat4, ring_depth: usize) {
        let item = &mut self.items[handle.0];
        item.world = world;
        item.dirty_frames = ring_depth as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;

    fn test_submesh() -> Submesh {
        Submesh {
            index_count: 36,
            start_index: 0,
            base_vertex: 0,
            bounds: Aabb::new(Vec3::new(-0.5, -0.5, -0.5), Vec3::new(0.5, 0.5, 0.5)),
        }
    }

    fn test_item(ring_depth: usize) -> RenderItem {
        RenderItem::new(
            GeometryHandle(0),
            test_submesh(),
            MaterialHandle(0),
            Mat4::identity(),
            ring_depth,
        )
    }

    #[test]
    fn test_add_assigns_cb_index_and_layer() {
        let mut catalog = RenderItemCatalog::new();
        let a = catalog.add(test_item(3), RenderLayer::Opaque);
        let b = catalog.add(test_item(3), RenderLayer::Highlight);

        assert_eq!(catalog.item(a).obj_cb_index, 0);
        assert_eq!(catalog.item(b).obj_cb_index, 1);

        let opaque: Vec<_> = catalog.layer(RenderLayer::Opaque).collect();
        assert_eq!(opaque, vec![a]);
        assert_eq!(catalog.layer(RenderLayer::Highlight).count(), 1);
        assert_eq!(catalog.layer(RenderLayer::Sprite).count(), 0);
    }

    #[test]
    fn test_set_world_marks_dirty() {
        let mut catalog = RenderItemCatalog::new();
        let handle = catalog.add(test_item(3), RenderLayer::Opaque);
        catalog.item_mut(handle).dirty_frames = 0;

        catalog.set_world(handle, Mat4::new_translation(&Vec3::new(1.0, 0.0, 0.0)), 3);
        assert_eq!(catalog.item(handle).dirty_frames, 3);
        assert_eq!(catalog.item(handle).world[(0, 3)], 1.0);
    }
}
