//! Static mesh generation for the three renderable primitives

use glam::Vec3;
use wgpu::util::DeviceExt;

use super::vertex::MeshVertex;
use crate::sim::MeshId;

/// Obstacle cube half extent
const CUBE_HALF: f32 = 1.0;

/// Push one triangle with a normal computed from its winding.
fn tri(out: &mut Vec<MeshVertex>, a: Vec3, b: Vec3, c: Vec3) {
    let normal = (b - a).cross(c - a).normalize().to_array();
    out.push(MeshVertex::new(a.to_array(), normal));
    out.push(MeshVertex::new(b.to_array(), normal));
    out.push(MeshVertex::new(c.to_array(), normal));
}

/// Push one quad (two CCW triangles).
fn quad(out: &mut Vec<MeshVertex>, a: Vec3, b: Vec3, c: Vec3, d: Vec3) {
    tri(out, a, b, c);
    tri(out, a, c, d);
}

/// Axis-aligned cube, 36 vertices, outward face normals
pub fn cube() -> Vec<MeshVertex> {
    let h = CUBE_HALF;
    let p = |x: f32, y: f32, z: f32| Vec3::new(x * h, y * h, z * h);
    let mut v = Vec::with_capacity(36);

    // +z front
    quad(
        &mut v,
        p(-1.0, -1.0, 1.0),
        p(1.0, -1.0, 1.0),
        p(1.0, 1.0, 1.0),
        p(-1.0, 1.0, 1.0),
    );
    // -z back
    quad(
        &mut v,
        p(1.0, -1.0, -1.0),
        p(-1.0, -1.0, -1.0),
        p(-1.0, 1.0, -1.0),
        p(1.0, 1.0, -1.0),
    );
    // +x right
    quad(
        &mut v,
        p(1.0, -1.0, 1.0),
        p(1.0, -1.0, -1.0),
        p(1.0, 1.0, -1.0),
        p(1.0, 1.0, 1.0),
    );
    // -x left
    quad(
        &mut v,
        p(-1.0, -1.0, -1.0),
        p(-1.0, -1.0, 1.0),
        p(-1.0, 1.0, 1.0),
        p(-1.0, 1.0, -1.0),
    );
    // +y top
    quad(
        &mut v,
        p(-1.0, 1.0, 1.0),
        p(1.0, 1.0, 1.0),
        p(1.0, 1.0, -1.0),
        p(-1.0, 1.0, -1.0),
    );
    // -y bottom
    quad(
        &mut v,
        p(-1.0, -1.0, -1.0),
        p(1.0, -1.0, -1.0),
        p(1.0, -1.0, 1.0),
        p(-1.0, -1.0, 1.0),
    );
    v
}

/// The 12 cube edges as a line list, 24 vertices
pub fn cube_outline() -> Vec<MeshVertex> {
    let h = CUBE_HALF;
    let corner = |i: usize| {
        Vec3::new(
            if i & 1 == 0 { -h } else { h },
            if i & 2 == 0 { -h } else { h },
            if i & 4 == 0 { -h } else { h },
        )
    };
    // Pairs of corner indices differing in exactly one bit
    const EDGES: [(usize, usize); 12] = [
        (0, 1),
        (2, 3),
        (4, 5),
        (6, 7),
        (0, 2),
        (1, 3),
        (4, 6),
        (5, 7),
        (0, 4),
        (1, 5),
        (2, 6),
        (3, 7),
    ];

    let mut v = Vec::with_capacity(24);
    for (a, b) in EDGES {
        let pa = corner(a);
        let pb = corner(b);
        v.push(MeshVertex::new(pa.to_array(), [0.0, 0.0, 1.0]));
        v.push(MeshVertex::new(pb.to_array(), [0.0, 0.0, 1.0]));
    }
    v
}

/// Ship hull: a flat pyramid with the apex pointing down the track (-z)
pub fn ship_hull() -> Vec<MeshVertex> {
    let apex = Vec3::new(0.0, 0.0, -2.0);
    let base = [
        Vec3::new(-1.0, -0.5, 1.0),
        Vec3::new(1.0, -0.5, 1.0),
        Vec3::new(1.0, 0.5, 1.0),
        Vec3::new(-1.0, 0.5, 1.0),
    ];

    let mut v = Vec::with_capacity(18);
    for i in 0..4 {
        let a = base[i];
        let b = base[(i + 1) % 4];
        tri(&mut v, a, b, apex);
    }
    // Rear base cap, facing +z
    quad(&mut v, base[3], base[2], base[1], base[0]);
    v
}

/// One uploaded mesh
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, label: &str, vertices: &[MeshVertex]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            vertex_buffer,
            vertex_count: vertices.len() as u32,
        }
    }
}

/// The full static mesh set, uploaded once at startup
pub struct MeshSet {
    pub cube: GpuMesh,
    pub cube_outline: GpuMesh,
    pub ship_hull: GpuMesh,
}

impl MeshSet {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            cube: GpuMesh::upload(device, "cube_mesh", &cube()),
            cube_outline: GpuMesh::upload(device, "cube_outline_mesh", &cube_outline()),
            ship_hull: GpuMesh::upload(device, "ship_hull_mesh", &ship_hull()),
        }
    }

    pub fn get(&self, mesh: MeshId) -> &GpuMesh {
        match mesh {
            MeshId::Cube => &self.cube,
            MeshId::CubeOutline => &self.cube_outline,
            MeshId::ShipHull => &self.ship_hull,
        }
    }
}
