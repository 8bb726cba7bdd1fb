use relief_core::error::ReliefError;
use relief_core::texture::{TextureEncoding, TextureImage};

use crate::renderer::Renderer;

/// Color format of capture targets.
pub const CAPTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Row pitch for a texture-to-buffer copy of `width` RGBA8 texels.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
}

/// Offscreen render target plus a staging buffer for CPU readback.
pub struct FrameCapture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    staging_buffer: wgpu::Buffer,
    width: u32,
    height: u32,
}

impl FrameCapture {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("capture-target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CAPTURE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("capture-staging"),
            size: padded_bytes_per_row(width) as u64 * height as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            texture,
            view,
            staging_buffer,
            width,
            height,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Render one frame into the target and wait for the GPU to finish.
    pub fn render(&self, device: &wgpu::Device, queue: &wgpu::Queue, renderer: &Renderer) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("capture-encoder"),
        });
        renderer.render(&mut encoder, &self.view);
        queue.submit(std::iter::once(encoder.finish()));
        device.poll(wgpu::Maintain::Wait);
    }

    /// Render one frame and read it back as an sRGB image (top row first).
    pub fn capture(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        renderer: &Renderer,
    ) -> Result<TextureImage, ReliefError> {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("capture-encoder"),
        });
        renderer.render(&mut encoder, &self.view);

        let padded = padded_bytes_per_row(self.width);
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.staging_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(std::iter::once(encoder.finish()));

        let slice = self.staging_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device.poll(wgpu::Maintain::Wait);

        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(ReliefError::CaptureFailed(format!("map failed: {e}"))),
            Err(e) => return Err(ReliefError::CaptureFailed(format!("map callback dropped: {e}"))),
        }

        let pixels = {
            let data = slice.get_mapped_range();
            unpad_rows(&data, self.width, self.height, padded)
        };
        self.staging_buffer.unmap();

        TextureImage::from_rgba8(self.width, self.height, pixels, TextureEncoding::Srgb)
    }
}

/// Strip the row padding of a readback buffer.
fn unpad_rows(data: &[u8], width: u32, height: u32, padded: u32) -> Vec<[u8; 4]> {
    let row_bytes = (width * 4) as usize;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for row in data.chunks(padded as usize).take(height as usize) {
        pixels.extend(
            row[..row_bytes]
                .chunks_exact(4)
                .map(|p| [p[0], p[1], p[2], p[3]]),
        );
    }
    pixels
}


#[cfg(all(test, feature = "gpu_tests"))]
mod gpu_tests {
    use relief_core::assets::SceneAssets;
    use relief_core::camera::OrbitCamera;
    use relief_core::config::SceneConfig;
    use relief_core::texture::TextureImage;

    use super::*;
    use crate::headless::HeadlessGpu;

    const SIZE: u32 = 64;

    /// Unlit terrain seen from straight above, well over the highest peak
    /// and filling the whole view. No sky or water.
    fn top_down_scene(bump_scale: f32) -> SceneConfig {
        SceneConfig::builder()
            .plane(512.0, 512.0, 64, 64)
            .bump_scale(bump_scale)
            .with_sky(false)
            .with_water(false)
            .orbit_controls(false)
            .camera_position([0.0, 150.0, 0.0])
            .camera_rotation([-std::f32::consts::FRAC_PI_2, 0.0, 0.0])
            .build()
            .unwrap()
    }

    fn render(gpu: &HeadlessGpu, config: &SceneConfig, assets: &SceneAssets) -> TextureImage {
        let renderer = Renderer::new(
            &gpu.device,
            &gpu.queue,
            CAPTURE_FORMAT,
            SIZE,
            SIZE,
            config,
            assets,
        )
        .unwrap();
        let camera = OrbitCamera::from_config(config);
        renderer.update_frame(&gpu.queue, &camera, 0.0);
        let capture = FrameCapture::new(&gpu.device, SIZE, SIZE);
        capture.capture(&gpu.device, &gpu.queue, &renderer).unwrap()
    }

    #[test]
    fn test_solid_red_color_renders_red() {
        let gpu = HeadlessGpu::new().unwrap();
        let config = top_down_scene(50.0);
        let red = TextureImage::solid([255, 0, 0, 255], TextureEncoding::Srgb);

        let mut hilly = SceneAssets::synthetic(32);
        hilly.color = red.clone();
        let mut flat = hilly.clone();
        flat.heightmap = TextureImage::solid([0, 0, 0, 255], TextureEncoding::Linear);

        for assets in [&flat, &hilly] {
            let image = render(&gpu, &config, assets);
            assert!(
                image.pixels().iter().all(|&p| p == [255, 0, 0, 255]),
                "every pixel should be terrain red"
            );
        }
    }

    #[test]
    fn test_identical_frames_are_pixel_identical() {
        let gpu = HeadlessGpu::new().unwrap();
        let config = SceneConfig::miniature();
        let assets = SceneAssets::synthetic(64);
        let a = render(&gpu, &config, &assets);
        let b = render(&gpu, &config, &assets);
        assert_eq!(a, b);
    }

    #[test]
    fn test_displacement_moves_terrain_toward_camera() {
        let gpu = HeadlessGpu::new().unwrap();
        let assets = SceneAssets::synthetic(32);
        // The hill rises toward the camera, so its checker cells grow on screen
        let flat = render(&gpu, &top_down_scene(0.0), &assets);
        let raised = render(&gpu, &top_down_scene(30.0), &assets);
        assert_ne!(flat, raised);
    }

    #[test]
    fn test_bump_scale_update_flattens_terrain() {
        let gpu = HeadlessGpu::new().unwrap();
        let assets = SceneAssets::synthetic(32);
        let flat_config = top_down_scene(0.0);
        let flat = render(&gpu, &flat_config, &assets);

        let config = top_down_scene(30.0);
        let renderer = Renderer::new(
            &gpu.device,
            &gpu.queue,
            CAPTURE_FORMAT,
            SIZE,
            SIZE,
            &config,
            &assets,
        )
        .unwrap();
        renderer
            .terrain()
            .set_bump_scale(&gpu.queue, &config.terrain, 0.0);
        let camera = OrbitCamera::from_config(&config);
        renderer.update_frame(&gpu.queue, &camera, 0.0);
        let capture = FrameCapture::new(&gpu.device, SIZE, SIZE);
        let image = capture.capture(&gpu.device, &gpu.queue, &renderer).unwrap();
        assert_eq!(image, flat);
    }
}
