//! Light-space depth target for the shadow pass

use glam::{Mat4, Vec3};

use crate::consts::LIGHT_FOV;

pub const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const LIGHT_NEAR: f32 = 1.0;
const LIGHT_FAR: f32 = 400.0;

/// View-projection from the light's point of view: perspective frustum
/// looking straight down the track with a square aspect.
pub fn light_view_projection(light_pos: Vec3) -> Mat4 {
    let view = Mat4::look_at_rh(light_pos, light_pos - Vec3::Z, Vec3::Y);
    let proj = Mat4::perspective_rh(LIGHT_FOV, 1.0, LIGHT_NEAR, LIGHT_FAR);
    proj * view
}

/// Depth texture, comparison sampler and the bind group the shaded pass
/// samples shadows through. Allocated once, on the first frame that has
/// shadow-casting geometry, and reused for every frame after.
pub struct ShadowResources {
    pub size: u32,
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
}

impl ShadowResources {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, size: u32) -> Self {
        log::info!("allocating {size}x{size} shadow map");

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow_map"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            size,
            view,
            bind_group,
        }
    }

    /// Texel size in shadow-map UV units, for the PCF kernel offsets
    pub fn texel_size(&self) -> f32 {
        1.0 / self.size as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn light_looks_down_the_track() {
        let light = Vec3::new(0.0, 3.0, 0.0);
        let vp = light_view_projection(light);

        // A point straight ahead of the light projects to the frustum center
        let ahead = vp * Vec4::new(0.0, 3.0, -50.0, 1.0);
        let ndc = ahead / ahead.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn points_behind_the_light_fall_outside_the_frustum() {
        let vp = light_view_projection(Vec3::new(0.0, 3.0, 0.0));
        let behind = vp * Vec4::new(0.0, 3.0, 20.0, 1.0);
        // Positive w only in front of the light
        assert!(behind.w < 0.0);
    }

    #[test]
    fn frustum_tracks_the_light_position() {
        let a = light_view_projection(Vec3::new(-5.0, 3.0, 0.0));
        let b = light_view_projection(Vec3::new(5.0, 3.0, 0.0));
        let p = Vec4::new(0.0, 3.0, -50.0, 1.0);
        let pa = a * p;
        let pb = b * p;
        // The same world point lands on opposite sides of the two frusta
        assert!((pa.x / pa.w) > 0.0);
        assert!((pb.x / pb.w) < 0.0);
    }
}
