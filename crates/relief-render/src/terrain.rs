use glam::Mat4;
use relief_core::assets::SceneAssets;
use relief_core::config::TerrainConfig;
use relief_core::error::ReliefError;
use relief_core::mesh::{terrain_transform, PlaneMesh, TerrainVertex};
use wgpu::util::DeviceExt;

use crate::shaders::{create_module, TERRAIN_WGSL};
use crate::texture::{create_repeat_sampler, GpuTexture, DEPTH_FORMAT};

/// GPU-uploadable terrain uniforms (80 bytes). Must match TerrainUniforms in terrain.wgsl.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainUniforms {
    pub model: [[f32; 4]; 4],
    pub bump_scale: f32,
    pub _padding: [f32; 3],
}

impl TerrainUniforms {
    pub fn new(model: Mat4, bump_scale: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            bump_scale,
            _padding: [0.0; 3],
        }
    }
}

/// Displaced heightmap plane: grid buffers, both textures and the pipeline.
pub struct TerrainPass {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    // Kept alive for the bind group
    _heightmap: GpuTexture,
    _color: GpuTexture,
}

impl TerrainPass {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame_bgl: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        config: &TerrainConfig,
        assets: &SceneAssets,
    ) -> Result<Self, ReliefError> {
        let module = create_module(device, "terrain-shader", TERRAIN_WGSL)?;

        let mesh = PlaneMesh::new(
            config.plane_width,
            config.plane_height,
            config.segments_x,
            config.segments_y,
        );
        log::info!(
            "Terrain grid: {}x{} segments, {} vertices, {} indices",
            mesh.segments_x,
            mesh.segments_y,
            mesh.vertex_count(),
            mesh.index_count()
        );

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain-vertices"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain-indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let uniforms = TerrainUniforms::new(terrain_transform(config), config.bump_scale);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain-uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let heightmap = GpuTexture::upload(device, queue, &assets.heightmap, "terrain-heightmap");
        let color = GpuTexture::upload(device, queue, &assets.color, "terrain-color");
        let sampler = create_repeat_sampler(device, "terrain-sampler", config.anisotropy);

        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("terrain-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Heightmap is only read by the vertex stage
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
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
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("terrain-bg"),
            layout: &bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&heightmap.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&color.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("terrain-pipeline-layout"),
            bind_group_layouts: &[frame_bgl, &bgl],
            push_constant_ranges: &[],
        });

        let cull_mode = if config.double_sided {
            None
        } else {
            Some(wgpu::Face::Back)
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("terrain-pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<TerrainVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x3,
                            offset: 0,
                            shader_location: 0,
                        },
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x2,
                            offset: 12,
                            shader_location: 1,
                        },
                    ],
                }],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode,
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
            uniform_buffer,
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
            _heightmap: heightmap,
            _color: color,
        })
    }

    /// Change the displacement multiplier without rebuilding the pass.
    pub fn set_bump_scale(&self, queue: &wgpu::Queue, config: &TerrainConfig, bump_scale: f32) {
        let uniforms = TerrainUniforms::new(terrain_transform(config), bump_scale);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_uniforms_size() {
        assert_eq!(std::mem::size_of::<TerrainUniforms>(), 80);
    }

    #[test]
    fn test_uniforms_carry_bump_scale() {
        let u = TerrainUniforms::new(Mat4::IDENTITY, 50.0);
        assert_eq!(u.bump_scale, 50.0);
        assert_eq!(u.model, Mat4::IDENTITY.to_cols_array_2d());
    }
}
