use crate::config::SceneConfig;
use crate::constants::{FALLBACK_COLOR_TEXEL, FALLBACK_HEIGHT_TEXEL, FALLBACK_NORMAL_TEXEL};
use crate::texture::{TextureEncoding, TextureImage};

/// Decoded images a scene needs, read once at startup.
#[derive(Debug, Clone)]
pub struct SceneAssets {
    pub heightmap: TextureImage,
    pub color: TextureImage,
    pub water_normals: TextureImage,
}

impl SceneAssets {
    /// Load every texture named by the scene. Missing or undecodable files are
    /// replaced by fallback texels and reported as warnings.
    pub fn load(config: &SceneConfig) -> Self {
        let t = &config.terrain;
        let heightmap = TextureImage::load_or_fallback(
            &t.heightmap_path,
            t.heightmap_encoding,
            FALLBACK_HEIGHT_TEXEL,
        );
        let color =
            TextureImage::load_or_fallback(&t.color_path, t.color_encoding, FALLBACK_COLOR_TEXEL);

        let water_normals = if config.water.attached {
            TextureImage::load_or_fallback(
                &config.water.normals_path,
                TextureEncoding::Linear,
                FALLBACK_NORMAL_TEXEL,
            )
            .fit_within(config.water.texture_size)
        } else {
            TextureImage::solid(FALLBACK_NORMAL_TEXEL, TextureEncoding::Linear)
        };

        Self {
            heightmap,
            color,
            water_normals,
        }
    }

    /// Procedural stand-in: a smooth radial hill over a checker base color.
    /// Used by the headless bench and tests so they need no files on disk.
    pub fn synthetic(size: u32) -> Self {
        let size = size.max(2);
        let half = (size - 1) as f32 / 2.0;
        let heightmap = TextureImage::from_fn(size, size, TextureEncoding::Linear, |x, y| {
            let dx = (x as f32 - half) / half;
            let dy = (y as f32 - half) / half;
            let h = (1.0 - (dx * dx + dy * dy)).clamp(0.0, 1.0);
            let v = (h * h * 255.0).round() as u8;
            [v, v, v, 255]
        });
        let cell = (size / 8).max(1);
        let color = TextureImage::from_fn(size, size, TextureEncoding::Srgb, |x, y| {
            if ((x / cell) + (y / cell)) % 2 == 0 {
                [96, 140, 80, 255]
            } else {
                [170, 150, 110, 255]
            }
        });
        Self {
            heightmap,
            color,
            water_normals: TextureImage::solid(FALLBACK_NORMAL_TEXEL, TextureEncoding::Linear),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_fall_back() {
        let config = SceneConfig::builder()
            .textures("missing/height.png", "missing/color.jpg")
            .with_water(true)
            .build()
            .unwrap();
        let assets = SceneAssets::load(&config);
        assert_eq!(assets.heightmap.texel(0, 0), FALLBACK_HEIGHT_TEXEL);
        assert_eq!(assets.color.texel(0, 0), FALLBACK_COLOR_TEXEL);
        assert_eq!(assets.water_normals.texel(0, 0), FALLBACK_NORMAL_TEXEL);
    }

    #[test]
    fn test_synthetic_hill_peaks_in_center() {
        let assets = SceneAssets::synthetic(33);
        assert_eq!(assets.heightmap.texel(16, 16)[0], 255);
        assert_eq!(assets.heightmap.texel(0, 0)[0], 0);
    }
}
