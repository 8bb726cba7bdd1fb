use relief_core::config::WaterConfig;
use relief_core::error::ReliefError;
use relief_core::math::{hex_to_rgb, srgb_to_linear};
use relief_core::texture::TextureImage;
use wgpu::util::DeviceExt;

use crate::shaders::{create_module, WATER_WGSL};
use crate::texture::{create_repeat_sampler, GpuTexture, DEPTH_FORMAT};

/// GPU-uploadable water uniforms (48 bytes). Must match WaterUniforms in water.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct WaterUniforms {
    pub water_color: [f32; 4],
    pub sun_color: [f32; 4],
    pub sky_color: [f32; 4],
}

/// Hex colors are authored in sRGB; shaders work in linear light.
fn linear_rgb(hex: u32) -> [f32; 3] {
    hex_to_rgb(hex).map(srgb_to_linear)
}

impl WaterUniforms {
    pub fn from_config(water: &WaterConfig, sky_color: [f32; 3]) -> Self {
        let [wr, wg, wb] = linear_rgb(water.water_color);
        let [sr, sg, sb] = linear_rgb(water.sun_color);
        Self {
            water_color: [wr, wg, wb, water.distortion_scale],
            sun_color: [sr, sg, sb, water.size * 0.5],
            sky_color: [sky_color[0], sky_color[1], sky_color[2], 1.0],
        }
    }
}

/// Flat animated water plane at y = 0.
pub struct WaterPass {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    _normals: GpuTexture,
}

impl WaterPass {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame_bgl: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        uniforms: &WaterUniforms,
        normals: &TextureImage,
    ) -> Result<Self, ReliefError> {
        let module = create_module(device, "water-shader", WATER_WGSL)?;

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("water-uniforms"),
            contents: bytemuck::bytes_of(uniforms),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let normals = GpuTexture::upload(device, queue, normals, "water-normals");
        let sampler = create_repeat_sampler(device, "water-sampler", 1);

        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("water-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("water-bg"),
            layout: &bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&normals.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("water-pipeline-layout"),
            bind_group_layouts: &[frame_bgl, &bgl],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("water-pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            pipeline,
            bind_group,
            _normals: normals,
        })
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.draw(0..6, 0..1);
    }
}
