//! Mouse-ray picking
//!
//! Converts a screen coordinate into a view-space ray, carries the ray into
//! each candidate item's local space, and finds the nearest intersected
//! triangle. The winning triangle drives the highlight item, and the nearest
//! hit distance drives a movement-block flag used for simple collision
//! avoidance when walking forward.
//!
//! Triangle data comes from the CPU shadow copies every mesh keeps; the
//! GPU-resident buffers are never read back.

use crate::foundation::math::{Point3, Vec3};
use crate::render::camera::Camera;
use crate::render::mesh::GeometryArena;
use crate::scene::item::{ItemHandle, RenderItemCatalog, RenderLayer};

/// A ray with origin and unit direction
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point
    pub origin: Vec3,
    /// Direction (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing the direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }
}

/// Möller–Trumbore ray/triangle intersection.
///
/// Returns the hit parameter along the ray, or `None` for a miss. Hits
/// behind the origin are misses.
pub fn intersect_triangle(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-6;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction.cross(&edge2);
    let det = edge1.dot(&h);

    // Ray parallel to the triangle plane
    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - v0;
    let u = inv_det * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = inv_det * ray.direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv_det * edge2.dot(&q);
    (t >= 0.0).then_some(t)
}

/// The nearest intersected triangle of one pick invocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// The intersected render item
    pub item: ItemHandle,
    /// Triangle ordinal within the item's index range
    pub triangle: u32,
    /// Ray parameter of the hit in the item's local space
    pub distance: f32,
}

/// Outcome of one pick invocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickResult {
    /// Nearest hit, if any triangle was intersected
    pub hit: Option<PickHit>,
    /// Whether the nearest hit is close enough to block forward movement
    pub movement_blocked: bool,
}

impl PickResult {
    /// A miss: nothing selected, movement clear
    pub fn miss() -> Self {
        Self {
            hit: None,
            movement_blocked: false,
        }
    }
}

/// Screen-coordinate picking over the opaque render layer
pub struct Picker {
    block_distance: f32,
    ring_depth: usize,
}

impl Picker {
    /// Create a picker. Hits at or below `block_distance` set the
    /// movement-blocked flag.
    pub fn new(block_distance: f32, ring_depth: usize) -> Self {
        Self {
            block_distance,
            ring_depth,
        }
    }

    /// Resolve a click at `(sx, sy)` against every visible opaque item and
    /// update the highlight item from the nearest hit.
    ///
    /// On a hit the highlight becomes visible, its draw range is narrowed to
    /// the winning triangle's three indices, and its world transform copies
    /// the hit item's so the highlight renders coplanar with the surface. On
    /// a miss the highlight is hidden and its ranges are left untouched.
    ///
    /// The movement-block flag follows the globally nearest hit distance,
    /// consistent with the highlight selection.
    pub fn pick(
        &self,
        sx: f32,
        sy: f32,
        viewport: (u32, u32),
        camera: &Camera,
        catalog: &mut RenderItemCatalog,
        geometries: &GeometryArena,
        highlight: ItemHandle,
    ) -> PickResult {
        let (width, height) = viewport;
        let proj = camera.proj();

        // Undo the projection for a point on the near plane: the ray leaves
        // the eye through (vx, vy, 1) in view space.
        let vx = (2.0 * sx / width as f32 - 1.0) / proj[(0, 0)];
        let vy = (-2.0 * sy / height as f32 + 1.0) / proj[(1, 1)];
        let inv_view = camera.inv_view();

        let mut nearest: Option<PickHit> = None;

        let candidates: Vec<ItemHandle> = catalog.layer(RenderLayer::Opaque).collect();
        for handle in candidates {
            let item = catalog.item(handle);
            if !item.visible {
                continue;
            }

            let Some(inv_world) = item.world.try_inverse() else {
                log::warn!("skipping pick candidate with singular world matrix");
                continue;
            };

            // View space -> world space -> this item's local space. The ray
            // is rebuilt from the view-space parameters for every item.
            let to_local = inv_world * inv_view;
            let origin = to_local.transform_point(&Point3::new(0.0, 0.0, 0.0));
            let direction = to_local.transform_vector(&Vec3::new(vx, vy, 1.0));
            // The composite transform need not preserve distances.
            let ray = Ray::new(origin.coords, direction);

            // Cheap rejection before the per-triangle scan
            if item.bounds.intersect_ray(ray.origin, ray.direction).is_none() {
                continue;
            }

            let geometry = geometries.get(item.geometry);
            let start = item.start_index as usize;
            let end = start + item.index_count as usize;
            let indices = &geometry.indices[start..end];

            for (triangle, tri_indices) in indices.chunks_exact(3).enumerate() {
                let fetch = |idx: u32| {
                    let vertex = (idx as i64 + i64::from(item.base_vertex)) as usize;
                    Vec3::from(geometry.vertices[vertex].position)
                };
                let v0 = fetch(tri_indices[0]);
                let v1 = fetch(tri_indices[1]);
                let v2 = fetch(tri_indices[2]);

                if let Some(t) = intersect_triangle(&ray, v0, v1, v2) {
                    // Strict < keeps the first triangle on exact ties
                    if nearest.map_or(true, |best| t < best.distance) {
                        nearest = Some(PickHit {
                            item: handle,
                            triangle: triangle as u32,
                            distance: t,
                        });
                    }
                }
            }
        }

        match nearest {
            Some(hit) => {
                let (world, geometry, start_index, base_vertex) = {
                    let item = catalog.item(hit.item);
                    (
                        item.world,
                        item.geometry,
                        item.start_index,
                        item.base_vertex,
                    )
                };

                let highlight_item = catalog.item_mut(highlight);
                highlight_item.visible = true;
                highlight_item.geometry = geometry;
                highlight_item.index_count = 3;
                highlight_item.start_index = start_index + 3 * hit.triangle;
                highlight_item.base_vertex = base_vertex;
                highlight_item.world = world;
                highlight_item.dirty_frames = self.ring_depth as u32;

                log::debug!(
                    "picked triangle {} of item {:?} at distance {:.3}",
                    hit.triangle,
                    hit.item,
                    hit.distance
                );
                PickResult {
                    hit: Some(hit),
                    movement_blocked: hit.distance <= self.block_distance,
                }
            }
            None => {
                catalog.item_mut(highlight).visible = false;
                PickResult::miss()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat4;
    use crate::render::material::MaterialHandle;
    use crate::render::mesh::MeshGeometry;
    use crate::scene::geometry::box_mesh;
    use crate::scene::item::RenderItem;
    use approx::assert_relative_eq;

    const RING_DEPTH: usize = 3;

    struct PickFixture {
        camera: Camera,
        catalog: RenderItemCatalog,
        geometries: GeometryArena,
        highlight: ItemHandle,
    }

    /// Camera at (0,0,-5) looking toward +z, plus unit cubes at the given
    /// world offsets and an invisible highlight item.
    fn fixture(cube_positions: &[Vec3]) -> PickFixture {
        let mut geometries = GeometryArena::new();
        let mut geo = MeshGeometry::new("shapes");
        let cube = geo.push_mesh("cube", &box_mesh(1.0, 1.0, 1.0));
        let geo_handle = geometries.add(geo);

        let mut catalog = RenderItemCatalog::new();
        for position in cube_positions {
            catalog.add(
                RenderItem::new(
                    geo_handle,
                    cube,
                    MaterialHandle(0),
                    Mat4::new_translation(position),
                    RING_DEPTH,
                ),
                RenderLayer::Opaque,
            );
        }
        let highlight = catalog.add(
            RenderItem::new(
                geo_handle,
                cube,
                MaterialHandle(0),
                Mat4::identity(),
                RING_DEPTH,
            )
            .with_visible(false),
            RenderLayer::Highlight,
        );

        let mut camera = Camera::new(0.25 * std::f32::consts::PI, 800.0 / 600.0, 1.0, 1000.0);
        camera.look_at(
            Vec3::new(0.0, 0.0, -5.0),
            Vec3::zeros(),
            Vec3::new(0.0, 1.0, 0.0),
        );
        camera.update_view_matrix();

        PickFixture {
            camera,
            catalog,
            geometries,
            highlight,
        }
    }

    fn pick_center(fixture: &mut PickFixture, picker: &Picker) -> PickResult {
        picker.pick(
            400.0,
            300.0,
            (800, 600),
            &fixture.camera,
            &mut fixture.catalog,
            &fixture.geometries,
            fixture.highlight,
        )
    }

    #[test]
    fn test_center_pick_hits_cube_front_face() {
        let mut fx = fixture(&[Vec3::zeros()]);
        let picker = Picker::new(2.0, RING_DEPTH);
        let result = pick_center(&mut fx, &picker);

        let hit = result.hit.expect("center ray must hit the cube");
        assert_relative_eq!(hit.distance, 4.5, epsilon = 1e-4);
        assert!(!result.movement_blocked);

        // Highlight now draws exactly one triangle of the cube, coplanar
        // with it.
        let highlight = fx.catalog.item(fx.highlight);
        assert!(highlight.visible);
        assert_eq!(highlight.index_count, 3);
        assert_eq!(highlight.start_index, 3 * hit.triangle);
        assert_eq!(highlight.world, fx.catalog.item(hit.item).world);
        assert_eq!(highlight.dirty_frames, RING_DEPTH as u32);
    }

    #[test]
    fn test_pick_is_deterministic() {
        let mut fx = fixture(&[Vec3::zeros()]);
        let picker = Picker::new(2.0, RING_DEPTH);

        let first = pick_center(&mut fx, &picker);
        let second = pick_center(&mut fx, &picker);
        assert_eq!(first.hit, second.hit);
    }

    #[test]
    fn test_miss_hides_highlight_without_touching_ranges() {
        let mut fx = fixture(&[Vec3::new(50.0, 0.0, 0.0)]);
        // Prime the highlight as if something had been picked before.
        {
            let item = fx.catalog.item_mut(fx.highlight);
            item.visible = true;
            item.index_count = 3;
            item.start_index = 12;
        }

        let picker = Picker::new(2.0, RING_DEPTH);
        let result = pick_center(&mut fx, &picker);

        assert!(result.hit.is_none());
        assert!(!result.movement_blocked);
        let highlight = fx.catalog.item(fx.highlight);
        assert!(!highlight.visible);
        // Ranges stay as they were
        assert_eq!(highlight.start_index, 12);
    }

    #[test]
    fn test_nearest_of_two_cubes_wins() {
        // Both cubes on the ray; the nearer one must win regardless of
        // iteration order.
        let mut fx = fixture(&[Vec3::new(0.0, 0.0, 3.0), Vec3::zeros()]);
        let picker = Picker::new(2.0, RING_DEPTH);
        let result = pick_center(&mut fx, &picker);

        let hit = result.hit.unwrap();
        assert_relative_eq!(hit.distance, 4.5, epsilon = 1e-4);
        let second = fx.catalog.layer(RenderLayer::Opaque).nth(1).unwrap();
        assert_eq!(hit.item, second);
    }

    #[test]
    fn test_invisible_items_are_skipped() {
        let mut fx = fixture(&[Vec3::zeros()]);
        let only = fx.catalog.layer(RenderLayer::Opaque).next().unwrap();
        fx.catalog.item_mut(only).visible = false;

        let picker = Picker::new(2.0, RING_DEPTH);
        let result = pick_center(&mut fx, &picker);
        assert!(result.hit.is_none());
    }

    #[test]
    fn test_movement_block_threshold() {
        // Wall face at z = -2 from a camera at z = -5: hit distance 3.0.
        let mut fx = fixture(&[Vec3::new(0.0, 0.0, -1.5)]);
        let picker = Picker::new(2.0, RING_DEPTH);
        let result = pick_center(&mut fx, &picker);
        assert_relative_eq!(result.hit.unwrap().distance, 3.0, epsilon = 1e-4);
        assert!(!result.movement_blocked);

        // Wall face at distance 1.5: blocked.
        let mut fx = fixture(&[Vec3::new(0.0, 0.0, -3.0)]);
        let result = pick_center(&mut fx, &picker);
        assert_relative_eq!(result.hit.unwrap().distance, 1.5, epsilon = 1e-4);
        assert!(result.movement_blocked);
    }

    #[test]
    fn test_block_follows_global_nearest_not_last_iterated() {
        // Near cube first in the layer, far cube second. If the flag read
        // the last-iterated item it would stay clear; the nearest hit is at
        // 1.5 and must block.
        let mut fx = fixture(&[Vec3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, 4.0)]);
        let picker = Picker::new(2.0, RING_DEPTH);
        let result = pick_center(&mut fx, &picker);

        assert_relative_eq!(result.hit.unwrap().distance, 1.5, epsilon = 1e-4);
        assert!(result.movement_blocked);
    }

    #[test]
    fn test_scaled_item_reports_world_distance() {
        // A cube scaled 2x about the origin: front face at z=-1, so the hit
        // parameter along the renormalized local ray is 4.0 world units.
        let mut geometries = GeometryArena::new();
        let mut geo = MeshGeometry::new("shapes");
        let cube = geo.push_mesh("cube", &box_mesh(1.0, 1.0, 1.0));
        let geo_handle = geometries.add(geo);

        let mut catalog = RenderItemCatalog::new();
        catalog.add(
            RenderItem::new(
                geo_handle,
                cube,
                MaterialHandle(0),
                Mat4::new_scaling(2.0),
                RING_DEPTH,
            ),
            RenderLayer::Opaque,
        );
        let highlight = catalog.add(
            RenderItem::new(geo_handle, cube, MaterialHandle(0), Mat4::identity(), RING_DEPTH)
                .with_visible(false),
            RenderLayer::Highlight,
        );

        let mut camera = Camera::new(0.25 * std::f32::consts::PI, 1.0, 1.0, 1000.0);
        camera.look_at(
            Vec3::new(0.0, 0.0, -5.0),
            Vec3::zeros(),
            Vec3::new(0.0, 1.0, 0.0),
        );
        camera.update_view_matrix();

        let picker = Picker::new(2.0, RING_DEPTH);
        let result = picker.pick(
            400.0,
            300.0,
            (800, 600),
            &camera,
            &mut catalog,
            &geometries,
            highlight,
        );

        // Local-space parameter: the ray origin maps to (0,0,-2.5) in cube
        // space and the face sits at -0.5, so t_local = 2.0.
        assert_relative_eq!(result.hit.unwrap().distance, 2.0, epsilon = 1e-4);
    }
}
