//! CPU-side texture images and the sampling rules shared with the WGSL shaders.
//!
//! Texture coordinates have their origin at the bottom-left of the image (the
//! first stored row is the top), so both the CPU reference and the shaders
//! flip `v` before addressing texels. Addressing always wraps (repeat).

use std::path::Path;

use glam::{UVec2, Vec2, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::ReliefError;
use crate::math::srgb_to_linear;

/// How the 8-bit color channels of a texture are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextureEncoding {
    /// Perceptual (gamma) encoding. RGB is decoded to linear on fetch; alpha is linear.
    #[default]
    Srgb,
    /// Channels are already linear.
    Linear,
}

/// Texel filtering used when sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
}

/// Immutable RGBA8 image used as a heightmap, base color, or normal map.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
    encoding: TextureEncoding,
}

impl TextureImage {
    /// Wrap raw RGBA8 pixels (row-major, top row first).
    pub fn from_rgba8(
        width: u32,
        height: u32,
        pixels: Vec<[u8; 4]>,
        encoding: TextureEncoding,
    ) -> Result<Self, ReliefError> {
        if width == 0 || height == 0 {
            return Err(ReliefError::InvalidTexture(format!(
                "zero-sized image ({width}x{height})"
            )));
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(ReliefError::InvalidTexture(format!(
                "expected {expected} pixels for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
            encoding,
        })
    }

    /// 1x1 image holding a single texel.
    pub fn solid(texel: [u8; 4], encoding: TextureEncoding) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![texel],
            encoding,
        }
    }

    /// Build an image by evaluating `f(x, y)` for every texel (y = 0 is the top row).
    pub fn from_fn(
        width: u32,
        height: u32,
        encoding: TextureEncoding,
        mut f: impl FnMut(u32, u32) -> [u8; 4],
    ) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
            encoding,
        }
    }

    /// Decode a PNG or JPEG file into RGBA8.
    pub fn load(path: &Path, encoding: TextureEncoding) -> Result<Self, ReliefError> {
        let decoded = image::open(path).map_err(|e| ReliefError::TextureLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = rgba.pixels().map(|p| p.0).collect();
        log::info!(
            "Loaded texture {} ({}x{}, {:?})",
            path.display(),
            width,
            height,
            encoding
        );
        Self::from_rgba8(width, height, pixels, encoding)
    }

    /// Load a texture, substituting a 1x1 fallback texel when loading fails.
    pub fn load_or_fallback(path: &Path, encoding: TextureEncoding, fallback: [u8; 4]) -> Self {
        match Self::load(path, encoding) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("{e}; using fallback texel {fallback:?}");
                Self::solid(fallback, encoding)
            }
        }
    }

    /// Box-downsample so neither side exceeds `max_side`. Averages raw channel
    /// values, so it suits linear data such as normal maps.
    pub fn fit_within(self, max_side: u32) -> Self {
        let max_side = max_side.max(1);
        let longest = self.width.max(self.height);
        if longest <= max_side {
            return self;
        }
        let factor = longest.div_ceil(max_side);
        let width = self.width.div_ceil(factor);
        let height = self.height.div_ceil(factor);
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for by in 0..height {
            for bx in 0..width {
                let mut sum = [0u32; 4];
                let mut count = 0u32;
                for y in (by * factor)..((by + 1) * factor).min(self.height) {
                    for x in (bx * factor)..((bx + 1) * factor).min(self.width) {
                        let t = self.pixels[(y * self.width + x) as usize];
                        for (s, c) in sum.iter_mut().zip(t) {
                            *s += c as u32;
                        }
                        count += 1;
                    }
                }
                pixels.push(sum.map(|s| ((s + count / 2) / count) as u8));
            }
        }
        log::debug!(
            "Downsampled texture {}x{} -> {}x{}",
            self.width,
            self.height,
            width,
            height
        );
        Self {
            width,
            height,
            pixels,
            encoding: self.encoding,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn encoding(&self) -> TextureEncoding {
        self.encoding
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    /// Raw bytes for GPU upload (4 bytes per texel, tightly packed rows).
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Raw texel at integer coordinates (y = 0 is the top row). Coordinates wrap.
    pub fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let x = x % self.width;
        let y = y % self.height;
        self.pixels[(y * self.width + x) as usize]
    }

    /// Texel decoded to linear floats according to the image encoding.
    pub fn decoded_texel(&self, x: u32, y: u32) -> Vec4 {
        let [r, g, b, a] = self.texel(x, y);
        let unorm = |c: u8| c as f32 / 255.0;
        match self.encoding {
            TextureEncoding::Linear => Vec4::new(unorm(r), unorm(g), unorm(b), unorm(a)),
            TextureEncoding::Srgb => Vec4::new(
                srgb_to_linear(unorm(r)),
                srgb_to_linear(unorm(g)),
                srgb_to_linear(unorm(b)),
                unorm(a),
            ),
        }
    }

    /// Integer texel addressed by `uv` after wrapping, as nearest filtering resolves it.
    pub fn texel_coord(&self, uv: Vec2) -> UVec2 {
        let iuv = image_uv(uv);
        let x = (wrap_repeat(iuv.x) * self.width as f32) as u32;
        let y = (wrap_repeat(iuv.y) * self.height as f32) as u32;
        UVec2::new(x.min(self.width - 1), y.min(self.height - 1))
    }

    /// Sample with repeat addressing. Linear filtering matches a GPU bilinear
    /// fetch at mip level 0: texel centers sit at half-integer coordinates.
    pub fn sample(&self, uv: Vec2, filter: Filter) -> Vec4 {
        match filter {
            Filter::Nearest => {
                let t = self.texel_coord(uv);
                self.decoded_texel(t.x, t.y)
            }
            Filter::Linear => {
                let iuv = image_uv(uv);
                let x = iuv.x * self.width as f32 - 0.5;
                let y = iuv.y * self.height as f32 - 0.5;
                let x0 = x.floor();
                let y0 = y.floor();
                let fx = x - x0;
                let fy = y - y0;

                let xi = x0 as i64;
                let yi = y0 as i64;
                let fetch = |dx: i64, dy: i64| {
                    self.decoded_texel(
                        wrap_index(xi + dx, self.width),
                        wrap_index(yi + dy, self.height),
                    )
                };

                let top = fetch(0, 0).lerp(fetch(1, 0), fx);
                let bottom = fetch(0, 1).lerp(fetch(1, 1), fx);
                top.lerp(bottom, fy)
            }
        }
    }
}

/// Flip `v` so texture coordinates address image rows from the bottom.
pub fn image_uv(uv: Vec2) -> Vec2 {
    Vec2::new(uv.x, 1.0 - uv.y)
}

/// Repeat wrap of a normalized coordinate into [0, 1).
pub fn wrap_repeat(c: f32) -> f32 {
    let w = c.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs
    if w >= 1.0 {
        0.0
    } else {
        w
    }
}

fn wrap_index(i: i64, n: u32) -> u32 {
    i.rem_euclid(n as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> TextureImage {
        TextureImage::from_fn(width, height, TextureEncoding::Linear, |x, y| {
            [(x * 255 / (width - 1)) as u8, (y * 255 / (height - 1)) as u8, 0, 255]
        })
    }

    #[test]
    fn test_from_rgba8_rejects_wrong_length() {
        let result = TextureImage::from_rgba8(2, 2, vec![[0; 4]; 3], TextureEncoding::Linear);
        assert!(matches!(result, Err(ReliefError::InvalidTexture(_))));
    }

    #[test]
    fn test_from_rgba8_rejects_zero_size() {
        let result = TextureImage::from_rgba8(0, 4, vec![], TextureEncoding::Linear);
        assert!(result.is_err());
    }

    #[test]
    fn test_wrap_repeat_tiles() {
        assert_eq!(wrap_repeat(0.0), 0.0);
        assert_eq!(wrap_repeat(1.0), 0.0);
        assert!((wrap_repeat(1.25) - 0.25).abs() < 1e-6);
        assert!((wrap_repeat(-0.25) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_uv_origin_is_bottom_left() {
        let img = gradient(4, 4);
        // v near 1.0 addresses the top row (y = 0)
        assert_eq!(img.texel_coord(Vec2::new(0.1, 0.95)), UVec2::new(0, 0));
        // v near 0.0 addresses the bottom row
        assert_eq!(img.texel_coord(Vec2::new(0.1, 0.05)), UVec2::new(0, 3));
    }

    #[test]
    fn test_edges_sample_as_tiled() {
        let img = gradient(8, 8);
        for v in [0.1f32, 0.3, 0.6, 0.9] {
            assert_eq!(
                img.texel_coord(Vec2::new(0.0, v)),
                img.texel_coord(Vec2::new(1.0, v))
            );
            assert_eq!(
                img.sample(Vec2::new(0.0, v), Filter::Linear),
                img.sample(Vec2::new(1.0, v), Filter::Linear)
            );
        }
    }

    #[test]
    fn test_linear_at_texel_center_is_exact() {
        let img = gradient(5, 5);
        // center of texel (2, 2) in image space is (2.5 / 5, 2.5 / 5); v is flipped
        let uv = Vec2::new(0.5, 0.5);
        let s = img.sample(uv, Filter::Linear);
        assert_eq!(s, img.decoded_texel(2, 2));
    }

    #[test]
    fn test_linear_between_texels_blends() {
        let img = TextureImage::from_rgba8(
            2,
            1,
            vec![[0, 0, 0, 255], [255, 0, 0, 255]],
            TextureEncoding::Linear,
        )
        .unwrap();
        // halfway between the two texel centers
        let s = img.sample(Vec2::new(0.5, 0.5), Filter::Linear);
        assert!((s.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_srgb_decode_applies_to_rgb_only() {
        let img = TextureImage::solid([128, 128, 128, 128], TextureEncoding::Srgb);
        let t = img.decoded_texel(0, 0);
        assert!(t.x < 0.25);
        assert!((t.w - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let img = TextureImage::load_or_fallback(
            Path::new("does/not/exist.png"),
            TextureEncoding::Srgb,
            [255, 0, 255, 255],
        );
        assert_eq!(img.width(), 1);
        assert_eq!(img.texel(0, 0), [255, 0, 255, 255]);
    }

    #[test]
    fn test_as_bytes_layout() {
        let img = TextureImage::from_rgba8(
            2,
            1,
            vec![[1, 2, 3, 4], [5, 6, 7, 8]],
            TextureEncoding::Linear,
        )
        .unwrap();
        assert_eq!(img.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_fit_within_downsamples_by_box() {
        let img = TextureImage::from_fn(4, 2, TextureEncoding::Linear, |x, _| {
            if x % 2 == 0 {
                [0, 0, 0, 255]
            } else {
                [200, 0, 0, 255]
            }
        });
        let small = img.fit_within(2);
        assert_eq!((small.width(), small.height()), (2, 1));
        assert_eq!(small.texel(0, 0), [100, 0, 0, 255]);
    }

    #[test]
    fn test_fit_within_keeps_small_images() {
        let img = gradient(4, 4);
        assert_eq!(img.clone().fit_within(512), img);
    }
}
