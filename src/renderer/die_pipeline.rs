//! SDF-based WebGPU render pipeline for the die
//!
//! The composer's draw calls are packed into two uniform buffers (globals and
//! pips) and the fragment shader raymarches the whole scene.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::scene::{Camera, FrameContext, Geometry, Material, Stage};
use crate::settings::Settings;

/// Maximum number of pips the shader can hold
pub const MAX_PIPS: usize = 24;

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Globals {
    pub resolution: [f32; 2],    // offset 0
    pub time: f32,               // offset 8
    pub pip_count: u32,          // offset 12
    pub camera: [f32; 4],        // offset 16 - xyz position, w tan(fov/2)
    pub background: [f32; 4],    // offset 32 - rgb, w max steps
    pub body_inv: [[f32; 4]; 4], // offset 48 - world -> body-local (column-major)
    pub body: [f32; 4],          // offset 112 - half extent, corner radius, scale, clearcoat
    pub body_center: [f32; 4],   // offset 128 - xyz center, w bounding radius
    pub glass_color: [f32; 4],   // offset 144 - rgb tint, w transmission
    pub glass: [f32; 4],         // offset 160 - ior, aberration, thickness, roughness
    pub attenuation: [f32; 4],   // offset 176 - rgb, w distance
    pub shadow: [f32; 4],        // offset 192 - plane y, opacity, blur, far
    pub lights: [[f32; 4]; 3],   // offset 208 - xyz position, w intensity
    pub pip_glow: [f32; 4],      // offset 256 - rgb radiance
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct PipsUniform {
    pub centers: [[f32; 4]; MAX_PIPS], // xyz world center, w radius
}

/// sRGB component to linear
#[inline]
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
fn linear_rgb(c: [f32; 3]) -> [f32; 3] {
    c.map(srgb_to_linear)
}

/// Pack one frame of draw calls into shader uniforms
///
/// Expects at most one transmissive (body) draw; pips beyond `MAX_PIPS` are dropped.
pub fn pack_frame(
    frame: &FrameContext,
    camera: &Camera,
    stage: &Stage,
    settings: &Settings,
    resolution: (u32, u32),
) -> (Globals, PipsUniform) {
    let mut globals = Globals::zeroed();
    let mut pips = PipsUniform::zeroed();

    globals.resolution = [resolution.0 as f32, resolution.1 as f32];
    globals.time = frame.time;

    let tan_half = (camera.fov_y.to_radians() / 2.0).tan();
    globals.camera = camera.position.extend(tan_half).to_array();

    let [r, g, b] = linear_rgb(stage.background);
    globals.background = [r, g, b, settings.quality.raymarch_steps() as f32];

    if let Some(body) = frame.transmissive().next() {
        let (scale, _, center) = body.world.to_scale_rotation_translation();
        globals.body_inv = body.world.inverse().to_cols_array_2d();

        if let Geometry::RoundedBox { size, radius, .. } = body.geometry {
            globals.body = [size.x * 0.5, radius, scale.x, 0.0];
        }
        globals.body_center = center
            .extend(body.geometry.bounding_radius() * scale.x)
            .to_array();

        if let Material::Transmission(glass) = body.material {
            let [r, g, b] = linear_rgb(glass.color);
            globals.body[3] = glass.clearcoat;
            globals.glass_color = [r, g, b, glass.transmission];
            let aberration = if settings.quality.chromatic_aberration() {
                glass.chromatic_aberration
            } else {
                0.0
            };
            globals.glass = [glass.ior, aberration, glass.thickness, glass.roughness];
            let [r, g, b] = linear_rgb(glass.attenuation_color);
            globals.attenuation = [r, g, b, glass.attenuation_distance];
        }
    } else {
        log::warn!("Frame has no body draw call");
    }

    let mut count = 0;
    for pip in frame.emissive() {
        if count == MAX_PIPS {
            log::warn!("Dropping pips beyond {MAX_PIPS}");
            break;
        }
        let radius = match pip.geometry {
            Geometry::Sphere { radius, .. } => radius,
            other => other.bounding_radius(),
        };
        let (scale, _, center) = pip.world.to_scale_rotation_translation();
        pips.centers[count] = center.extend(radius * scale.x).to_array();

        if let Material::Emissive(material) = pip.material {
            let [r, g, b] = material.radiance();
            globals.pip_glow = [r, g, b, 1.0];
        }
        count += 1;
    }
    globals.pip_count = count as u32;

    let shadow = stage.shadow;
    globals.shadow = [shadow.y, shadow.opacity, shadow.blur, shadow.far];
    for (slot, (position, light)) in globals.lights.iter_mut().zip(stage.light_positions()) {
        *slot = position.extend(light.intensity).to_array();
    }

    (globals, pips)
}

// ============================================================================
// DIE RENDER STATE
// ============================================================================

pub struct DieRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    pips_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    pub size: (u32, u32),
    pub camera: Camera,
    pub stage: Stage,
}

impl DieRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self, wgpu::RequestDeviceError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("die-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("die_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("die_shader.wgsl").into()),
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let pips_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pips"),
            contents: bytemuck::bytes_of(&PipsUniform::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("die_bind_group_layout"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("die_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: pips_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("die_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("die_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::info!("Die pipeline ready ({}x{})", width, height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            pips_buffer,
            bind_group,
            size: (width, height),
            camera: Camera::default(),
            stage: Stage::default(),
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Upload the frame's draw calls and render
    pub fn render(
        &mut self,
        frame: &FrameContext,
        settings: &Settings,
    ) -> Result<(), wgpu::SurfaceError> {
        let (globals, pips) = pack_frame(frame, &self.camera, &self.stage, settings, self.size);
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
        self.queue
            .write_buffer(&self.pips_buffer, 0, bytemuck::bytes_of(&pips));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("die_encoder"),
            });

        {
            let [r, g, b, _] = globals.background;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("die_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
