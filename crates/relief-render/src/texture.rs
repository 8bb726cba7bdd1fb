use std::borrow::Cow;

use relief_core::texture::{TextureEncoding, TextureImage};

/// Depth buffer format shared by every pipeline.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// GPU copy of a [`TextureImage`].
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

/// Texture format for an encoding: sRGB images decode to linear on fetch.
pub fn format_for(encoding: TextureEncoding) -> wgpu::TextureFormat {
    match encoding {
        TextureEncoding::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        TextureEncoding::Linear => wgpu::TextureFormat::Rgba8Unorm,
    }
}

/// The image itself when it fits in `max_side`, otherwise a downsampled copy.
pub fn fit_to_limit<'a>(image: &'a TextureImage, max_side: u32, label: &str) -> Cow<'a, TextureImage> {
    if image.width() <= max_side && image.height() <= max_side {
        return Cow::Borrowed(image);
    }
    log::warn!(
        "Texture '{}' is {}x{}, over the device limit of {}; downsampling",
        label,
        image.width(),
        image.height(),
        max_side
    );
    Cow::Owned(image.clone().fit_within(max_side))
}

impl GpuTexture {
    /// Upload a decoded image (single mip level). Images larger than the
    /// device's 2D texture limit are downsampled first.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &TextureImage,
        label: &str,
    ) -> Self {
        let image = fit_to_limit(image, device.limits().max_texture_dimension_2d, label);
        let size = wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: format_for(image.encoding()),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width()),
                rows_per_image: Some(image.height()),
            },
            size,
        );
        log::debug!(
            "Uploaded '{}' ({}x{}, {:?})",
            label,
            image.width(),
            image.height(),
            image.encoding()
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Repeat-addressed linear sampler with the given anisotropy clamp.
pub fn create_repeat_sampler(device: &wgpu::Device, label: &str, anisotropy: u16) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        anisotropy_clamp: anisotropy.clamp(1, 16),
        ..Default::default()
    })
}

/// Depth attachment sized to the render target.
pub fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth-texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_follows_encoding() {
        assert_eq!(
            format_for(TextureEncoding::Srgb),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        assert_eq!(
            format_for(TextureEncoding::Linear),
            wgpu::TextureFormat::Rgba8Unorm
        );
    }

    #[test]
    fn test_oversized_image_fits_device_limit() {
        let wide = TextureImage::from_fn(9000, 4, TextureEncoding::Srgb, |_, _| [10, 20, 30, 255]);
        let fitted = fit_to_limit(&wide, 8192, "terrain-color");
        assert!(matches!(fitted, Cow::Owned(_)));
        assert!(fitted.width() <= 8192 && fitted.height() <= 8192);
        assert_eq!(fitted.encoding(), TextureEncoding::Srgb);
        assert_eq!(fitted.texel(0, 0), [10, 20, 30, 255]);
    }

    #[test]
    fn test_image_within_limit_is_borrowed() {
        let image = TextureImage::solid([0, 0, 0, 255], TextureEncoding::Linear);
        assert!(matches!(fit_to_limit(&image, 8192, "terrain-heightmap"), Cow::Borrowed(_)));
    }
}
