//! Procedural gradient sky.
//! Drawn first as a full-screen triangle at the far plane, so anything else
//! in the frame covers it. The gradient uses a squared falloff:
//! t = (ray_dir.y * 0.5 + 0.5)^2 between horizon and zenith.

use relief_core::config::SkyConfig;
use relief_core::constants::{SKY_MIE_COEFFICIENT, SKY_RAYLEIGH};
use relief_core::error::ReliefError;
use wgpu::util::DeviceExt;

use crate::shaders::{create_module, SKY_WGSL};
use crate::texture::DEPTH_FORMAT;

/// Default sky zenith color (deep blue, looking straight up).
pub const DEFAULT_SKY_ZENITH: [f32; 3] = [0.1, 0.15, 0.4];

/// Default sky horizon color (warm haze at the horizon).
pub const DEFAULT_SKY_HORIZON: [f32; 3] = [0.5, 0.45, 0.35];

/// Horizon color of a fully hazy sky.
const HAZE_HORIZON: [f32; 3] = [0.85, 0.8, 0.72];

/// Apparent angular radius of the sun in radians.
const SUN_ANGULAR_RADIUS: f32 = 0.00465;

const SUN_COLOR: [f32; 3] = [1.0, 0.92, 0.75];

/// GPU-uploadable sky uniforms (64 bytes). Must match SkyUniforms in sky.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkyUniforms {
    pub zenith_color: [f32; 4],
    pub horizon_color: [f32; 4],
    pub sun_color: [f32; 4],
    pub glow: [f32; 4],
}

impl SkyUniforms {
    /// Map the scattering parameters onto the gradient palette.
    ///
    /// Turbidity (1..20) pushes the horizon toward haze, rayleigh scales the
    /// zenith blue, mie g shrinks the sun disc and tightens its glow, and the
    /// mie coefficient sets the glow strength.
    pub fn from_config(sky: &SkyConfig) -> Self {
        let haze = ((sky.turbidity - 1.0) / 19.0).clamp(0.0, 1.0);
        let rayleigh = (sky.rayleigh / SKY_RAYLEIGH).clamp(0.25, 2.0);
        let g = sky.mie_directional_g.clamp(0.0, 0.999);

        let mut zenith = [0.0; 4];
        let mut horizon = [0.0; 4];
        for i in 0..3 {
            zenith[i] = (DEFAULT_SKY_ZENITH[i] * rayleigh).min(1.0);
            horizon[i] = DEFAULT_SKY_HORIZON[i] + (HAZE_HORIZON[i] - DEFAULT_SKY_HORIZON[i]) * haze;
        }
        zenith[3] = 1.0;
        horizon[3] = 1.0;

        let disc_radius = SUN_ANGULAR_RADIUS * (1.0 + 10.0 * (1.0 - g));
        let glow_strength = (sky.mie_coefficient / SKY_MIE_COEFFICIENT * 0.5).min(4.0);

        Self {
            zenith_color: zenith,
            horizon_color: horizon,
            sun_color: [SUN_COLOR[0], SUN_COLOR[1], SUN_COLOR[2], disc_radius.cos()],
            glow: [8.0 + 56.0 * g, glow_strength, 0.0, 0.0],
        }
    }

    pub fn horizon_rgb(&self) -> [f32; 3] {
        [
            self.horizon_color[0],
            self.horizon_color[1],
            self.horizon_color[2],
        ]
    }
}

pub struct SkyPass {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
}

impl SkyPass {
    pub fn new(
        device: &wgpu::Device,
        frame_bgl: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        uniforms: &SkyUniforms,
    ) -> Result<Self, ReliefError> {
        let module = create_module(device, "sky-shader", SKY_WGSL)?;

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sky-uniforms"),
            contents: bytemuck::bytes_of(uniforms),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sky-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sky-bg"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sky-pipeline-layout"),
            bind_group_layouts: &[frame_bgl, &bgl],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sky-pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            // Background: never tested against or written to depth
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
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
        })
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sky_colors_valid() {
        for c in DEFAULT_SKY_ZENITH {
            assert!((0.0..=1.0).contains(&c));
        }
        for c in DEFAULT_SKY_HORIZON {
            assert!((0.0..=1.0).contains(&c));
        }
    }

    #[test]
    fn test_sky_uniforms_size() {
        assert_eq!(std::mem::size_of::<SkyUniforms>(), 64);
    }

    #[test]
    fn test_palette_in_range_for_default_sky() {
        let u = SkyUniforms::from_config(&SkyConfig::default());
        for c in u.zenith_color.iter().chain(&u.horizon_color) {
            assert!((0.0..=1.0).contains(c));
        }
        assert!(u.sun_color[3] > 0.99 && u.sun_color[3] < 1.0);
    }

    #[test]
    fn test_turbidity_hazes_horizon() {
        let clear = SkyUniforms::from_config(&SkyConfig {
            turbidity: 1.0,
            ..SkyConfig::default()
        });
        let hazy = SkyUniforms::from_config(&SkyConfig {
            turbidity: 20.0,
            ..SkyConfig::default()
        });
        assert_eq!(clear.horizon_rgb(), DEFAULT_SKY_HORIZON);
        assert!(hazy.horizon_color[0] > clear.horizon_color[0]);
    }

    #[test]
    fn test_higher_mie_g_shrinks_sun_disc() {
        let wide = SkyUniforms::from_config(&SkyConfig {
            mie_directional_g: 0.2,
            ..SkyConfig::default()
        });
        let tight = SkyUniforms::from_config(&SkyConfig {
            mie_directional_g: 0.95,
            ..SkyConfig::default()
        });
        // larger cosine threshold = smaller disc
        assert!(tight.sun_color[3] > wide.sun_color[3]);
        assert!(tight.glow[0] > wide.glow[0]);
    }
}
