//! Procedural mesh generators
//!
//! Grids, boxes, and cylinders for the maze scene, plus the hills
//! displacement applied to the terrain grid. Generators emit CPU-side
//! [`MeshData`]; uploading to GPU buffers is the backend's concern.

use crate::foundation::math::Vec3;
use crate::render::mesh::{MeshData, Vertex};

/// Flat grid of `m` rows by `n` columns of vertices in the xz-plane,
/// centered at the origin, spanning `width` by `depth`.
pub fn grid(width: f32, depth: f32, m: usize, n: usize) -> MeshData {
    assert!(m >= 2 && n >= 2, "grid needs at least 2x2 vertices, got {m}x{n}");

    let half_width = 0.5 * width;
    let half_depth = 0.5 * depth;
    let dx = width / (n - 1) as f32;
    let dz = depth / (m - 1) as f32;
    let du = 1.0 / (n - 1) as f32;
    let dv = 1.0 / (m - 1) as f32;

    let mut vertices = Vec::with_capacity(m * n);
    for i in 0..m {
        let z = half_depth - i as f32 * dz;
        for j in 0..n {
            let x = -half_width + j as f32 * dx;
            vertices.push(Vertex::new(
                [x, 0.0, z],
                [0.0, 1.0, 0.0],
                [j as f32 * du, i as f32 * dv],
            ));
        }
    }

    // Two triangles per quad
    let mut indices = Vec::with_capacity((m - 1) * (n - 1) * 6);
    for i in 0..m - 1 {
        for j in 0..n - 1 {
            let row = (i * n + j) as u32;
            let next_row = ((i + 1) * n + j) as u32;
            indices.extend_from_slice(&[
                row,
                row + 1,
                next_row,
                next_row,
                row + 1,
                next_row + 1,
            ]);
        }
    }

    MeshData { vertices, indices }
}

/// Axis-aligned box centered at the origin, 24 vertices with face normals.
pub fn box_mesh(width: f32, height: f32, depth: f32) -> MeshData {
    let w = 0.5 * width;
    let h = 0.5 * height;
    let d = 0.5 * depth;

    // Each face: lower-left, upper-left, upper-right, lower-right
    let faces: [([Vec3; 4], [f32; 3]); 6] = [
        // Front (-z)
        (
            [
                Vec3::new(-w, -h, -d),
                Vec3::new(-w, h, -d),
                Vec3::new(w, h, -d),
                Vec3::new(w, -h, -d),
            ],
            [0.0, 0.0, -1.0],
        ),
        // Back (+z)
        (
            [
                Vec3::new(w, -h, d),
                Vec3::new(w, h, d),
                Vec3::new(-w, h, d),
                Vec3::new(-w, -h, d),
            ],
            [0.0, 0.0, 1.0],
        ),
        // Top (+y)
        (
            [
                Vec3::new(-w, h, -d),
                Vec3::new(-w, h, d),
                Vec3::new(w, h, d),
                Vec3::new(w, h, -d),
            ],
            [0.0, 1.0, 0.0],
        ),
        // Bottom (-y)
        (
            [
                Vec3::new(-w, -h, d),
                Vec3::new(-w, -h, -d),
                Vec3::new(w, -h, -d),
                Vec3::new(w, -h, d),
            ],
            [0.0, -1.0, 0.0],
        ),
        // Left (-x)
        (
            [
                Vec3::new(-w, -h, d),
                Vec3::new(-w, h, d),
                Vec3::new(-w, h, -d),
                Vec3::new(-w, -h, -d),
            ],
            [-1.0, 0.0, 0.0],
        ),
        // Right (+x)
        (
            [
                Vec3::new(w, -h, -d),
                Vec3::new(w, h, -d),
                Vec3::new(w, h, d),
                Vec3::new(w, -h, d),
            ],
            [1.0, 0.0, 0.0],
        ),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (face, (corners, normal)) in faces.iter().enumerate() {
        let base = (face * 4) as u32;
        let uvs = [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];
        for (corner, uv) in corners.iter().zip(uvs) {
            vertices.push(Vertex::new((*corner).into(), *normal, uv));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData { vertices, indices }
}

/// Cylinder along the y-axis with end caps.
pub fn cylinder(
    bottom_radius: f32,
    top_radius: f32,
    height: f32,
    slices: usize,
    stacks: usize,
) -> MeshData {
    assert!(slices >= 3, "cylinder needs at least 3 slices, got {slices}");
    assert!(stacks >= 1, "cylinder needs at least 1 stack, got {stacks}");

    let mut vertices = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    let stack_height = height / stacks as f32;
    let radius_step = (top_radius - bottom_radius) / stacks as f32;
    let theta_step = 2.0 * std::f32::consts::PI / slices as f32;

    // Side rings, duplicated seam vertex for clean uvs
    for stack in 0..=stacks {
        let y = -0.5 * height + stack as f32 * stack_height;
        let r = bottom_radius + stack as f32 * radius_step;
        for slice in 0..=slices {
            let theta = slice as f32 * theta_step;
            let (sin, cos) = theta.sin_cos();

            // Slope the normal by the radius change per unit height
            let dr = bottom_radius - top_radius;
            let normal = Vec3::new(cos * height, dr, sin * height).normalize();

            vertices.push(Vertex::new(
                [r * cos, y, r * sin],
                normal.into(),
                [
                    slice as f32 / slices as f32,
                    1.0 - stack as f32 / stacks as f32,
                ],
            ));
        }
    }

    let ring_stride = (slices + 1) as u32;
    for stack in 0..stacks as u32 {
        for slice in 0..slices as u32 {
            let a = stack * ring_stride + slice;
            let b = (stack + 1) * ring_stride + slice;
            indices.extend_from_slice(&[a, b, b + 1, a, b + 1, a + 1]);
        }
    }

    build_cylinder_cap(&mut vertices, &mut indices, top_radius, 0.5 * height, slices, true);
    build_cylinder_cap(
        &mut vertices,
        &mut indices,
        bottom_radius,
        -0.5 * height,
        slices,
        false,
    );

    MeshData { vertices, indices }
}

fn build_cylinder_cap(
    vertices: &mut Vec<Vertex>,
    indices: &mut Vec<u32>,
    radius: f32,
    y: f32,
    slices: usize,
    top: bool,
) {
    let base = vertices.len() as u32;
    let normal = [0.0, if top { 1.0 } else { -1.0 }, 0.0];
    let theta_step = 2.0 * std::f32::consts::PI / slices as f32;

    for slice in 0..=slices {
        let theta = slice as f32 * theta_step;
        let (sin, cos) = theta.sin_cos();
        let x = radius * cos;
        let z = radius * sin;
        vertices.push(Vertex::new(
            [x, y, z],
            normal,
            [0.5 + 0.5 * cos, 0.5 - 0.5 * sin],
        ));
    }
    let center = vertices.len() as u32;
    vertices.push(Vertex::new([0.0, y, 0.0], normal, [0.5, 0.5]));

    for slice in 0..slices as u32 {
        if top {
            indices.extend_from_slice(&[center, base + slice + 1, base + slice]);
        } else {
            indices.extend_from_slice(&[center, base + slice, base + slice + 1]);
        }
    }
}

/// Rolling-hills height used to displace the terrain grid
pub fn hills_height(x: f32, z: f32) -> f32 {
    0.1 * (z * (0.1 * x).sin() + x * (0.1 * z).cos())
}

/// Analytic normal of the hills surface
pub fn hills_normal(x: f32, z: f32) -> Vec3 {
    // n = (-df/dx, 1, -df/dz)
    Vec3::new(
        -0.03 * z * (0.1 * x).cos() - 0.3 * (0.1 * z).cos(),
        1.0,
        -0.3 * (0.1 * x).sin() + 0.03 * x * (0.1 * z).sin(),
    )
    .normalize()
}

/// Displace a flat grid into terrain, with analytic normals
pub fn apply_hills(mesh: &mut MeshData) {
    for vertex in &mut mesh.vertices {
        let [x, _, z] = vertex.position;
        vertex.position[1] = hills_height(x, z);
        vertex.normal = hills_normal(x, z).into();
    }
}

/// Point-topology sprite seeds for billboard trees, scattered on a circle of
/// `radius` around the origin. Sprite extents ride in the texcoord channel.
pub fn tree_points(count: usize, radius: f32, size: f32) -> MeshData {
    let mut vertices = Vec::with_capacity(count);
    let step = 2.0 * std::f32::consts::PI / count.max(1) as f32;
    for k in 0..count {
        let theta = k as f32 * step;
        let x = radius * theta.cos();
        let z = radius * theta.sin();
        let y = hills_height(x, z) + 0.5 * size;
        vertices.push(Vertex::new([x, y, z], [0.0, 1.0, 0.0], [size, size]));
    }
    let indices = (0..count as u32).collect();
    MeshData { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_grid_counts() {
        let mesh = grid(10.0, 10.0, 4, 5);
        assert_eq!(mesh.vertices.len(), 20);
        assert_eq!(mesh.indices.len(), 3 * 4 * 6);

        let bounds = mesh.bounds();
        assert_relative_eq!(bounds.min.x, -5.0, epsilon = 1e-6);
        assert_relative_eq!(bounds.max.z, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_box_counts_and_bounds() {
        let mesh = box_mesh(2.0, 4.0, 6.0);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);

        let bounds = mesh.bounds();
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_box_indices_in_range() {
        let mesh = box_mesh(1.0, 1.0, 1.0);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_cylinder_counts() {
        let slices = 8;
        let stacks = 2;
        let mesh = cylinder(1.0, 1.0, 3.0, slices, stacks);

        let side = (stacks + 1) * (slices + 1);
        let caps = 2 * (slices + 2);
        assert_eq!(mesh.vertices.len(), side + caps);
        let side_tris = slices * stacks * 2;
        let cap_tris = 2 * slices;
        assert_eq!(mesh.indices.len(), (side_tris + cap_tris) * 3);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_hills_height_matches_formula() {
        assert_relative_eq!(hills_height(0.0, 0.0), 0.0, epsilon = 1e-6);
        let x: f32 = 10.0;
        let z: f32 = -20.0;
        let expected = 0.1 * (z * (0.1 * x).sin() + x * (0.1 * z).cos());
        assert_relative_eq!(hills_height(x, z), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_hills_normal_is_unit() {
        let n = hills_normal(13.0, -7.0);
        assert_relative_eq!(n.magnitude(), 1.0, epsilon = 1e-5);
        assert!(n.y > 0.0);
    }

    #[test]
    fn test_tree_points_topology() {
        let mesh = tree_points(16, 35.0, 3.0);
        assert_eq!(mesh.vertices.len(), 16);
        assert_eq!(mesh.indices.len(), 16);
        // Sprite size rides in the texcoord channel
        assert_eq!(mesh.vertices[0].tex_coord, [3.0, 3.0]);
    }
}
