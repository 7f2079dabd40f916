//! Two-pass shadow-mapped WebGPU renderer
//!
//! Pass 1 renders shadow casters into a light-space depth map, pass 2 draws
//! the lit scene sampling that map. Both passes replay the same immutable
//! `SceneSnapshot`, so they always agree on geometry.

pub mod mesh;
pub mod pipeline;
pub mod shadow;
pub mod vertex;

use std::sync::Arc;

use anyhow::{Context, bail};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::consts::{CAMERA_FOV, CAMERA_POS};
use crate::settings::Settings;
use crate::sim::{DrawMode, DrawSink, Fracture, MeshId, PassKind, SceneSnapshot};
use mesh::MeshSet;
use pipeline::{DEPTH_FORMAT, Pipelines};
use shadow::ShadowResources;
use vertex::{GlobalUniforms, RawInstance};

const CAMERA_NEAR: f32 = 0.1;
const CAMERA_FAR: f32 = 400.0;
const SHADOW_BIAS: f32 = 0.002;
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.01,
    g: 0.01,
    b: 0.03,
    a: 1.0,
};

/// Per-frame instance lists, one per primitive. Replaying a snapshot into
/// this sink preserves submission order within each mesh kind.
#[derive(Default)]
struct InstanceBatches {
    cubes: Vec<RawInstance>,
    outlines: Vec<RawInstance>,
    ships: Vec<RawInstance>,
}

impl DrawSink for InstanceBatches {
    fn submit_mesh(&mut self, mesh: MeshId, transform: Mat4, fracture: Fracture, mode: DrawMode) {
        let color = match mode {
            DrawMode::Depth => [0.0; 4],
            DrawMode::Shaded { color } => color,
        };
        let instance = RawInstance::new(transform, color, fracture);
        match mesh {
            MeshId::Cube => self.cubes.push(instance),
            MeshId::CubeOutline => self.outlines.push(instance),
            MeshId::ShipHull => self.ships.push(instance),
        }
    }
}

/// Owns the GPU surface and everything needed to draw a frame
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipelines: Pipelines,
    meshes: MeshSet,
    depth_view: wgpu::TextureView,
    /// Lazily allocated on the first frame with shadow casters
    shadow: Option<ShadowResources>,
    shadow_size: u32,
    pcf_enabled: bool,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, settings: &Settings) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window)
            .context("create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter")?;

        // Shadow sampling is mandatory, there is no unshadowed fallback path
        let downlevel = adapter.get_downlevel_capabilities();
        if !downlevel
            .flags
            .contains(wgpu::DownlevelFlags::COMPARISON_SAMPLERS)
        {
            log::error!("adapter lacks comparison samplers, cannot render shadows");
            bail!("required GPU capability missing: comparison samplers");
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("voidlane-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .context("create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let pipelines = Pipelines::new(&device, config.format);
        let meshes = MeshSet::new(&device);
        let depth_view = create_depth_view(&device, &config);

        log::info!(
            "renderer ready: {}x{}, {:?}, shadow map {}",
            config.width,
            config.height,
            config.format,
            settings.shadow_map_size()
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipelines,
            meshes,
            depth_view,
            shadow: None,
            shadow_size: settings.shadow_map_size(),
            pcf_enabled: settings.pcf_enabled(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, &self.config);
        }
    }

    /// Apply a new quality preset. The shadow map is dropped and
    /// reallocated at the new size on the next frame that needs it.
    pub fn apply_settings(&mut self, settings: &Settings) {
        let size = settings.shadow_map_size();
        if size != self.shadow_size {
            self.shadow_size = size;
            self.shadow = None;
        }
        self.pcf_enabled = settings.pcf_enabled();
    }

    fn camera_view_proj(&self) -> Mat4 {
        let eye = Vec3::from_array(CAMERA_POS);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let aspect = self.config.width as f32 / self.config.height as f32;
        Mat4::perspective_rh(CAMERA_FOV, aspect, CAMERA_NEAR, CAMERA_FAR) * view
    }

    /// Draw one frame from the snapshot: depth pass, then shaded pass.
    pub fn render(&mut self, snapshot: &SceneSnapshot) -> Result<(), wgpu::SurfaceError> {
        let mut depth_batches = InstanceBatches::default();
        let mut shaded_batches = InstanceBatches::default();
        snapshot.encode(&mut depth_batches, PassKind::Depth);
        snapshot.encode(&mut shaded_batches, PassKind::Shaded);

        let casts_shadows =
            !depth_batches.cubes.is_empty() || !depth_batches.ships.is_empty();
        if casts_shadows && self.shadow.is_none() {
            self.shadow = Some(ShadowResources::new(
                &self.device,
                &self.pipelines.shadow_layout,
                self.shadow_size,
            ));
        }

        let texel = self.shadow.as_ref().map_or(0.0, ShadowResources::texel_size);
        let globals = GlobalUniforms::new(
            self.camera_view_proj(),
            shadow::light_view_projection(snapshot.light_pos),
            snapshot.light_pos,
            Vec3::from_array(CAMERA_POS),
            texel,
            self.pcf_enabled,
            SHADOW_BIAS,
        );
        self.pipelines.write_globals(&self.queue, &globals);

        let upload = |label: &str, instances: &[RawInstance]| -> Option<wgpu::Buffer> {
            if instances.is_empty() {
                return None;
            }
            Some(
                self.device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(label),
                        contents: bytemuck::cast_slice(instances),
                        usage: wgpu::BufferUsages::VERTEX,
                    }),
            )
        };
        let depth_cubes = upload("depth_cube_instances", &depth_batches.cubes);
        let depth_ships = upload("depth_ship_instances", &depth_batches.ships);
        let cubes = upload("cube_instances", &shaded_batches.cubes);
        let ships = upload("ship_instances", &shaded_batches.ships);
        let outlines = upload("outline_instances", &shaded_batches.outlines);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        if let Some(shadow) = &self.shadow {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow_pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &shadow.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(&self.pipelines.depth);
            pass.set_bind_group(0, &self.pipelines.globals_bind_group, &[]);
            draw_batch(
                &mut pass,
                self.meshes.get(MeshId::Cube),
                depth_cubes.as_ref(),
                depth_batches.cubes.len(),
            );
            draw_batch(
                &mut pass,
                self.meshes.get(MeshId::ShipHull),
                depth_ships.as_ref(),
                depth_batches.ships.len(),
            );
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shaded_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(shadow) = &self.shadow {
                pass.set_pipeline(&self.pipelines.shaded);
                pass.set_bind_group(0, &self.pipelines.globals_bind_group, &[]);
                pass.set_bind_group(1, &shadow.bind_group, &[]);
                draw_batch(
                    &mut pass,
                    self.meshes.get(MeshId::Cube),
                    cubes.as_ref(),
                    shaded_batches.cubes.len(),
                );
                draw_batch(
                    &mut pass,
                    self.meshes.get(MeshId::ShipHull),
                    ships.as_ref(),
                    shaded_batches.ships.len(),
                );

                pass.set_pipeline(&self.pipelines.line);
                pass.set_bind_group(0, &self.pipelines.globals_bind_group, &[]);
                draw_batch(
                    &mut pass,
                    self.meshes.get(MeshId::CubeOutline),
                    outlines.as_ref(),
                    shaded_batches.outlines.len(),
                );
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn draw_batch(
    pass: &mut wgpu::RenderPass<'_>,
    mesh: &mesh::GpuMesh,
    instances: Option<&wgpu::Buffer>,
    count: usize,
) {
    let Some(buffer) = instances else { return };
    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
    pass.set_vertex_buffer(1, buffer.slice(..));
    pass.draw(0..mesh.vertex_count, 0..count as u32);
}

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("camera_depth"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::snapshot::colors;
    use crate::sim::tick::{TickInput, tick};
    use crate::sim::{GameState, SceneSnapshot};

    fn batches(snapshot: &SceneSnapshot, pass: PassKind) -> InstanceBatches {
        let mut b = InstanceBatches::default();
        snapshot.encode(&mut b, pass);
        b
    }

    fn running_snapshot() -> SceneSnapshot {
        let mut state = GameState::new(7);
        state.start_run();
        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        SceneSnapshot::capture(&state)
    }

    #[test]
    fn outlines_never_reach_the_depth_pass() {
        let snapshot = running_snapshot();
        let depth = batches(&snapshot, PassKind::Depth);
        assert!(depth.outlines.is_empty());
        assert!(!depth.cubes.is_empty());
        assert_eq!(depth.ships.len(), 1);
    }

    #[test]
    fn depth_and_shaded_batches_share_transforms() {
        let snapshot = running_snapshot();
        let depth = batches(&snapshot, PassKind::Depth);
        let shaded = batches(&snapshot, PassKind::Shaded);

        assert_eq!(depth.cubes.len(), shaded.cubes.len());
        for (d, s) in depth.cubes.iter().zip(&shaded.cubes) {
            assert_eq!(d.model, s.model);
            assert_eq!(d.fracture, s.fracture);
        }
    }

    #[test]
    fn shaded_batches_carry_material_colors() {
        let snapshot = running_snapshot();
        let shaded = batches(&snapshot, PassKind::Shaded);
        assert!(shaded.cubes.iter().all(|i| i.color == colors::CUBE));
        assert!(
            shaded
                .outlines
                .iter()
                .all(|i| i.color == colors::CUBE_OUTLINE)
        );
        assert_eq!(shaded.ships[0].color, colors::SHIP);
    }

    #[test]
    fn idle_scene_produces_no_batches() {
        let state = GameState::new(7);
        let snapshot = SceneSnapshot::capture(&state);
        let shaded = batches(&snapshot, PassKind::Shaded);
        assert!(shaded.cubes.is_empty());
        assert!(shaded.outlines.is_empty());
        assert!(shaded.ships.is_empty());
    }
}
