//! Mesh geometry and the geometry arena
//!
//! Every mesh keeps a CPU-readable shadow copy of its vertex and index data.
//! The GPU-resident buffers used for drawing belong to the backend; the
//! shadow copies exist so ray picking can walk triangles without a readback.
//! Render items reference geometry through arena handles resolved once at
//! scene-build time.

use bytemuck::{Pod, Zeroable};

use crate::scene::bounds::Aabb;

/// Vertex layout shared by static meshes and the dynamic wave buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    /// Position in local space
    pub position: [f32; 3],
    /// Normal vector
    pub normal: [f32; 3],
    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }
}

/// Raw mesh data produced by the procedural generators
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    /// Vertex list
    pub vertices: Vec<Vertex>,
    /// Triangle-list indices
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Local-space bounds of the vertex positions
    pub fn bounds(&self) -> Aabb {
        let points: Vec<_> = self
            .vertices
            .iter()
            .map(|v| crate::foundation::math::Vec3::from(v.position))
            .collect();
        Aabb::from_points(points.iter())
    }
}

/// Draw range of one mesh packed into a shared geometry buffer
#[derive(Debug, Clone, Copy)]
pub struct Submesh {
    /// Number of indices to draw
    pub index_count: u32,
    /// First index within the shared index buffer
    pub start_index: u32,
    /// Value added to each index before vertex lookup
    pub base_vertex: i32,
    /// Local-space bounds of this range
    pub bounds: Aabb,
}

/// A geometry record: shared vertex/index shadow buffers plus named draw
/// ranges. Several meshes are typically concatenated into one record so they
/// share GPU buffers at draw time.
#[derive(Debug, Clone)]
pub struct MeshGeometry {
    /// Debug name
    pub name: String,
    /// CPU shadow copy of the vertex buffer
    pub vertices: Vec<Vertex>,
    /// CPU shadow copy of the index buffer
    pub indices: Vec<u32>,
    submeshes: Vec<(String, Submesh)>,
}

impl MeshGeometry {
    /// Create an empty geometry record
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            indices: Vec::new(),
            submeshes: Vec::new(),
        }
    }

    /// Append a mesh, recording its draw range under `name`.
    pub fn push_mesh(&mut self, name: impl Into<String>, mesh: &MeshData) -> Submesh {
        let submesh = Submesh {
            index_count: mesh.indices.len() as u32,
            start_index: self.indices.len() as u32,
            base_vertex: self.vertices.len() as i32,
            bounds: mesh.bounds(),
        };
        self.vertices.extend_from_slice(&mesh.vertices);
        self.indices.extend_from_slice(&mesh.indices);
        self.submeshes.push((name.into(), submesh));
        submesh
    }

    /// Look up a draw range by name (build-time only; items store the result)
    pub fn submesh(&self, name: &str) -> Option<Submesh> {
        self.submeshes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| *s)
    }
}

/// Handle into the geometry arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle(pub(crate) usize);

/// Arena owning every geometry record in the scene
#[derive(Debug, Default)]
pub struct GeometryArena {
    records: Vec<MeshGeometry>,
}

impl GeometryArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, returning its handle
    pub fn add(&mut self, geometry: MeshGeometry) -> GeometryHandle {
        self.records.push(geometry);
        GeometryHandle(self.records.len() - 1)
    }

    /// Resolve a handle
    pub fn get(&self, handle: GeometryHandle) -> &MeshGeometry {
        &self.records[handle.0]
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
