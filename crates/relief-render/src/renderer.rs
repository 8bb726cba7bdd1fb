use glam::{Mat4, Vec3};
use relief_core::assets::SceneAssets;
use relief_core::camera::OrbitCamera;
use relief_core::config::SceneConfig;
use relief_core::error::ReliefError;
use relief_core::math::sun_direction;

use crate::sky::{SkyPass, SkyUniforms};
use crate::terrain::TerrainPass;
use crate::texture::create_depth_texture;
use crate::water::{WaterPass, WaterUniforms};

/// Clear color used when no sky is attached.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// GPU-uploadable per-frame uniforms (160 bytes). Must match FrameUniforms in types.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// xyz = sun direction, w = elapsed seconds.
    pub sun_direction: [f32; 4],
}

impl FrameUniforms {
    pub fn new(view_proj: Mat4, eye: Vec3, sun: Vec3, elapsed_secs: f32) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            camera_position: eye.extend(1.0).to_array(),
            sun_direction: sun.extend(elapsed_secs).to_array(),
        }
    }
}

/// Object drawn after the sky, in ascending render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawItem {
    Terrain,
    Water,
}

/// Draw sequence for the scene: sky first, then terrain and water by render order.
/// Ties keep terrain before water.
pub fn draw_order(config: &SceneConfig) -> Vec<DrawItem> {
    let mut items = vec![(config.terrain.render_order, DrawItem::Terrain)];
    if config.water.attached {
        items.push((config.water.render_order, DrawItem::Water));
    }
    items.sort_by_key(|(order, _)| *order);
    items.into_iter().map(|(_, item)| item).collect()
}

/// Owns every GPU resource for the scene. All resources are created at init;
/// per frame only the frame uniforms are written.
pub struct Renderer {
    frame_uniform_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    #[allow(dead_code)] // Kept alive alongside its view
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    sky: Option<SkyPass>,
    terrain: TerrainPass,
    water: Option<WaterPass>,
    order: Vec<DrawItem>,
    sun: Vec3,
    width: u32,
    height: u32,
}

impl Renderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        config: &SceneConfig,
        assets: &SceneAssets,
    ) -> Result<Self, ReliefError> {
        let frame_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame-uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame-bg"),
            layout: &frame_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_uniform_buffer.as_entire_binding(),
            }],
        });

        let (depth_texture, depth_view) = create_depth_texture(device, width, height);

        let sky_uniforms = SkyUniforms::from_config(&config.sky);
        let sky = if config.sky.attached {
            Some(SkyPass::new(device, &frame_bgl, color_format, &sky_uniforms)?)
        } else {
            None
        };

        let terrain = TerrainPass::new(
            device,
            queue,
            &frame_bgl,
            color_format,
            &config.terrain,
            assets,
        )?;

        let water = if config.water.attached {
            let uniforms = WaterUniforms::from_config(&config.water, sky_uniforms.horizon_rgb());
            Some(WaterPass::new(
                device,
                queue,
                &frame_bgl,
                color_format,
                &uniforms,
                &assets.water_normals,
            )?)
        } else {
            None
        };

        let order = draw_order(config);
        log::info!(
            "Renderer ready: {}x{}, sky {}, draw order {:?}",
            width,
            height,
            if sky.is_some() { "on" } else { "off" },
            order
        );

        Ok(Self {
            frame_uniform_buffer,
            frame_bind_group,
            depth_texture,
            depth_view,
            sky,
            terrain,
            water,
            order,
            sun: sun_direction(config.sky.elevation_deg, config.sky.azimuth_deg),
            width,
            height,
        })
    }

    /// Recreate the depth buffer for a new target size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let (texture, view) = create_depth_texture(device, width, height);
        self.depth_texture = texture;
        self.depth_view = view;
        self.width = width;
        self.height = height;
    }

    pub fn terrain(&self) -> &TerrainPass {
        &self.terrain
    }

    /// Frame uniforms for the camera at the current target size.
    pub fn frame_uniforms(&self, camera: &OrbitCamera, elapsed_secs: f32) -> FrameUniforms {
        let view_proj = camera.view_proj(self.width as f32, self.height as f32);
        FrameUniforms::new(view_proj, camera.eye_position(), self.sun, elapsed_secs)
    }

    /// Upload the frame uniforms. Called once per frame before `render`.
    pub fn update_frame(&self, queue: &wgpu::Queue, camera: &OrbitCamera, elapsed_secs: f32) {
        let uniforms = self.frame_uniforms(camera, elapsed_secs);
        queue.write_buffer(
            &self.frame_uniform_buffer,
            0,
            bytemuck::bytes_of(&uniforms),
        );
    }

    /// Encode the scene into `target`: sky, then terrain and water in render order.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
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
        });
        pass.set_bind_group(0, &self.frame_bind_group, &[]);

        if let Some(sky) = &self.sky {
            sky.draw(&mut pass);
        }
        for item in &self.order {
            match item {
                DrawItem::Terrain => self.terrain.draw(&mut pass),
                DrawItem::Water => {
                    if let Some(water) = &self.water {
                        water.draw(&mut pass);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_uniforms_size() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 160);
    }

    #[test]
    fn test_frame_uniforms_pack_sun_and_time() {
        let u = FrameUniforms::new(Mat4::IDENTITY, Vec3::new(1.0, 2.0, 3.0), Vec3::Y, 4.5);
        assert_eq!(u.camera_position, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(u.sun_direction, [0.0, 1.0, 0.0, 4.5]);
        assert_eq!(u.inv_view_proj, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn test_draw_order_without_water() {
        let config = SceneConfig::harbour();
        assert_eq!(draw_order(&config), vec![DrawItem::Terrain]);
    }

    #[test]
    fn test_draw_order_follows_render_order() {
        let config = SceneConfig::builder().with_water(true).build().unwrap();
        assert_eq!(draw_order(&config), vec![DrawItem::Terrain, DrawItem::Water]);

        let config = SceneConfig::builder()
            .with_water(true)
            .render_order(3, 2)
            .build()
            .unwrap();
        assert!(config.water_draws_first());
        assert_eq!(draw_order(&config), vec![DrawItem::Water, DrawItem::Terrain]);
    }
}
