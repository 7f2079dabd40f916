//! GPU vertex and per-instance layouts

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::sim::Fracture;

/// Mesh vertex with position and face normal
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    pub const fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Per-instance data: model matrix columns, material color and fracture
/// parameters (origin xyz + age; age below zero means intact)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct RawInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub fracture: [f32; 4],
}

impl RawInstance {
    pub fn new(model: Mat4, color: [f32; 4], fracture: Fracture) -> Self {
        let fracture = match fracture {
            Some((origin, age)) => [origin.x, origin.y, origin.z, age],
            None => [0.0, 0.0, 0.0, -1.0],
        };
        Self {
            model: model.to_cols_array_2d(),
            color,
            fracture,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const VEC4: wgpu::BufferAddress = std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress;
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<RawInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // Model matrix, one column per slot
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: VEC4,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 2 * VEC4,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 3 * VEC4,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 4 * VEC4,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 5 * VEC4,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Frame-global uniforms shared by every pipeline
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GlobalUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub light_pos: [f32; 4],
    pub camera_pos: [f32; 4],
    /// x = shadow texel size, y = pcf enabled, z = depth bias
    pub shadow_params: [f32; 4],
}

impl GlobalUniforms {
    pub fn new(
        view_proj: Mat4,
        light_view_proj: Mat4,
        light_pos: Vec3,
        camera_pos: Vec3,
        shadow_texel: f32,
        pcf_enabled: bool,
        bias: f32,
    ) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            light_view_proj: light_view_proj.to_cols_array_2d(),
            light_pos: [light_pos.x, light_pos.y, light_pos.z, 1.0],
            camera_pos: [camera_pos.x, camera_pos.y, camera_pos.z, 1.0],
            shadow_params: [shadow_texel, if pcf_enabled { 1.0 } else { 0.0 }, bias, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intact_instances_encode_negative_age() {
        let instance = RawInstance::new(Mat4::IDENTITY, [1.0; 4], None);
        assert_eq!(instance.fracture[3], -1.0);
    }

    #[test]
    fn fractured_instances_carry_origin_and_age() {
        let instance = RawInstance::new(
            Mat4::IDENTITY,
            [1.0; 4],
            Some((Vec3::new(1.0, 2.0, 3.0), 0.5)),
        );
        assert_eq!(instance.fracture, [1.0, 2.0, 3.0, 0.5]);
    }

    #[test]
    fn instance_stride_matches_attribute_layout() {
        // 4 matrix columns + color + fracture = 6 vec4s
        assert_eq!(std::mem::size_of::<RawInstance>(), 6 * 16);
    }
}
