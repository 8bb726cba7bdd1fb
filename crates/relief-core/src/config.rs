//! Scene configuration: one record replaces per-variant setup scripts.
//!
//! Scenes are described in RON. Every field has a default, so a document only
//! needs to name what differs from the `harbour` preset.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::texture::TextureEncoding;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read scene file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse scene RON: {0}")]
    Parse(String),
    #[error("Invalid scene: {0}")]
    Invalid(String),
    #[error("Unknown scene preset '{0}' (expected one of: harbour, miniature)")]
    UnknownPreset(String),
}

/// Terrain mesh, textures and material flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub heightmap_path: PathBuf,
    pub color_path: PathBuf,
    pub heightmap_encoding: TextureEncoding,
    pub color_encoding: TextureEncoding,
    pub anisotropy: u16,
    pub plane_width: f32,
    pub plane_height: f32,
    pub segments_x: u32,
    pub segments_y: u32,
    pub bump_scale: f32,
    /// Uniform scale applied to the whole terrain mesh.
    pub mesh_scale: f32,
    /// Shade back faces too, so the terrain is visible from below.
    pub double_sided: bool,
    /// Draw order relative to the water; lower draws first.
    pub render_order: i32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            heightmap_path: PathBuf::from("static/textures/auckland-harbour-cropped.png"),
            color_path: PathBuf::from("static/textures/auckland-texture-cropped.jpg"),
            heightmap_encoding: TextureEncoding::Srgb,
            color_encoding: TextureEncoding::Srgb,
            anisotropy: DEFAULT_ANISOTROPY,
            plane_width: PLANE_SIZE,
            plane_height: PLANE_SIZE,
            segments_x: PLANE_SEGMENTS,
            segments_y: PLANE_SEGMENTS,
            bump_scale: DEFAULT_BUMP_SCALE,
            mesh_scale: 1.0,
            double_sided: true,
            render_order: 1,
        }
    }
}

/// Initial camera pose and projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    /// XYZ Euler angles in radians. Only used when orbit controls are off,
    /// since orbiting always faces the target.
    pub rotation: [f32; 3],
    pub target: [f32; 3],
    pub orbit_controls: bool,
    pub damping: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: CAMERA_FOV_DEG,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            position: [361.0, 148.0, 289.0],
            rotation: [-0.474768, 0.838193, 0.3649899606],
            target: [0.0, 0.0, 0.0],
            orbit_controls: true,
            damping: CAMERA_DAMPING,
        }
    }
}

/// Procedural sky parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyConfig {
    pub attached: bool,
    pub scale: f32,
    pub turbidity: f32,
    pub rayleigh: f32,
    pub mie_coefficient: f32,
    pub mie_directional_g: f32,
    pub elevation_deg: f32,
    pub azimuth_deg: f32,
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            attached: true,
            scale: SKY_SCALE,
            turbidity: SKY_TURBIDITY,
            rayleigh: SKY_RAYLEIGH,
            mie_coefficient: SKY_MIE_COEFFICIENT,
            mie_directional_g: SKY_MIE_DIRECTIONAL_G,
            elevation_deg: SUN_ELEVATION_DEG,
            azimuth_deg: SUN_AZIMUTH_DEG,
        }
    }
}

/// Animated water plane parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    pub attached: bool,
    pub size: f32,
    pub texture_size: u32,
    pub normals_path: PathBuf,
    pub sun_color: u32,
    pub water_color: u32,
    pub distortion_scale: f32,
    pub render_order: i32,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            attached: false,
            size: WATER_SIZE,
            texture_size: WATER_TEXTURE_SIZE,
            normals_path: PathBuf::from("static/textures/waternormals.jpg"),
            sun_color: SUN_COLOR,
            water_color: WATER_COLOR,
            distortion_scale: WATER_DISTORTION_SCALE,
            render_order: 2,
        }
    }
}

/// Complete description of one scene variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub name: String,
    pub terrain: TerrainConfig,
    pub camera: CameraConfig,
    pub sky: SkyConfig,
    pub water: WaterConfig,
    pub max_pixel_ratio: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::harbour()
    }
}

impl SceneConfig {
    /// Full-size harbour terrain under the sky. The water is configured but not attached.
    pub fn harbour() -> Self {
        Self {
            name: "harbour".into(),
            terrain: TerrainConfig::default(),
            camera: CameraConfig::default(),
            sky: SkyConfig::default(),
            water: WaterConfig::default(),
            max_pixel_ratio: MAX_PIXEL_RATIO,
        }
    }

    /// Terrain shrunk to 1/8 with water and sky attached and a closer camera.
    pub fn miniature() -> Self {
        let mut config = Self::builder()
            .mesh_scale(1.0 / 8.0)
            .camera_position([45.0, 18.5, 36.0])
            .with_water(true)
            .with_sky(true)
            .into_config();
        config.name = "miniature".into();
        config
    }

    /// Look up a built-in preset by name.
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "harbour" => Ok(Self::harbour()),
            "miniature" => Ok(Self::miniature()),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }

    pub fn builder() -> SceneBuilder {
        SceneBuilder {
            config: Self::harbour(),
        }
    }

    /// Parse and validate a RON scene document.
    pub fn from_ron_str(ron_str: &str) -> Result<Self, ConfigError> {
        let options = ron::Options::default();
        let config: Self = options
            .from_str(ron_str)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a RON scene file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&contents)?;
        log::info!("Loaded scene '{}' from {}", config.name, path.display());
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.terrain;
        positive("terrain.plane_width", t.plane_width)?;
        positive("terrain.plane_height", t.plane_height)?;
        positive("terrain.mesh_scale", t.mesh_scale)?;
        finite("terrain.bump_scale", t.bump_scale)?;
        if t.segments_x == 0 || t.segments_y == 0 {
            return Err(ConfigError::Invalid(
                "terrain segment counts must be at least 1".into(),
            ));
        }
        if t.anisotropy == 0 {
            return Err(ConfigError::Invalid("terrain.anisotropy must be at least 1".into()));
        }

        let c = &self.camera;
        positive("camera.near", c.near)?;
        positive("camera.far", c.far)?;
        if c.near >= c.far {
            return Err(ConfigError::Invalid(format!(
                "camera.near ({}) must be less than camera.far ({})",
                c.near, c.far
            )));
        }
        if !(c.fov_y_deg > 0.0 && c.fov_y_deg < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.fov_y_deg must be in (0, 180), got {}",
                c.fov_y_deg
            )));
        }
        if !(0.0..=1.0).contains(&c.damping) {
            return Err(ConfigError::Invalid(format!(
                "camera.damping must be in [0, 1], got {}",
                c.damping
            )));
        }
        for (name, v) in [("camera.position", c.position), ("camera.target", c.target)] {
            if v.iter().any(|x| !x.is_finite()) {
                return Err(ConfigError::Invalid(format!("{name} must be finite")));
            }
        }
        // Orbiting needs a direction from target to eye.
        let offset: f32 = c
            .position
            .iter()
            .zip(c.target)
            .map(|(p, t)| (p - t) * (p - t))
            .sum();
        if c.orbit_controls && offset.sqrt() <= MIN_ORBIT_DISTANCE {
            return Err(ConfigError::Invalid(
                "camera.position must differ from camera.target when orbit controls are on".into(),
            ));
        }

        positive("sky.scale", self.sky.scale)?;
        positive("water.size", self.water.size)?;
        positive("max_pixel_ratio", self.max_pixel_ratio)?;
        Ok(())
    }

    /// Far plane covering the configured far distance and any attached backdrop geometry.
    pub fn view_distance(&self) -> f32 {
        let mut far = self.camera.far;
        if self.water.attached {
            far = far.max(self.water.size * std::f32::consts::FRAC_1_SQRT_2);
        }
        far
    }

    /// Draw the water before the terrain when its render order is lower.
    pub fn water_draws_first(&self) -> bool {
        self.water.render_order < self.terrain.render_order
    }
}

/// Builder over the `harbour` preset.
pub struct SceneBuilder {
    config: SceneConfig,
}

impl SceneBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn mesh_scale(mut self, scale: f32) -> Self {
        self.config.terrain.mesh_scale = scale;
        self
    }

    pub fn bump_scale(mut self, bump_scale: f32) -> Self {
        self.config.terrain.bump_scale = bump_scale;
        self
    }

    pub fn plane(mut self, width: f32, height: f32, segments_x: u32, segments_y: u32) -> Self {
        let t = &mut self.config.terrain;
        t.plane_width = width;
        t.plane_height = height;
        t.segments_x = segments_x;
        t.segments_y = segments_y;
        self
    }

    pub fn textures(mut self, heightmap: impl Into<PathBuf>, color: impl Into<PathBuf>) -> Self {
        self.config.terrain.heightmap_path = heightmap.into();
        self.config.terrain.color_path = color.into();
        self
    }

    pub fn double_sided(mut self, double_sided: bool) -> Self {
        self.config.terrain.double_sided = double_sided;
        self
    }

    pub fn camera_position(mut self, position: [f32; 3]) -> Self {
        self.config.camera.position = position;
        self
    }

    pub fn camera_rotation(mut self, rotation: [f32; 3]) -> Self {
        self.config.camera.rotation = rotation;
        self
    }

    pub fn camera_target(mut self, target: [f32; 3]) -> Self {
        self.config.camera.target = target;
        self
    }

    pub fn orbit_controls(mut self, enabled: bool) -> Self {
        self.config.camera.orbit_controls = enabled;
        self
    }

    pub fn with_water(mut self, attached: bool) -> Self {
        self.config.water.attached = attached;
        self
    }

    pub fn with_sky(mut self, attached: bool) -> Self {
        self.config.sky.attached = attached;
        self
    }

    pub fn render_order(mut self, terrain: i32, water: i32) -> Self {
        self.config.terrain.render_order = terrain;
        self.config.water.render_order = water;
        self
    }

    pub fn sun(mut self, elevation_deg: f32, azimuth_deg: f32) -> Self {
        self.config.sky.elevation_deg = elevation_deg;
        self.config.sky.azimuth_deg = azimuth_deg;
        self
    }

    /// Validate and return the finished configuration.
    pub fn build(self) -> Result<SceneConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }

    fn into_config(self) -> SceneConfig {
        self.config
    }
}

fn finite(name: &str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be finite, got {v}")))
    }
}

fn positive(name: &str, v: f32) -> Result<(), ConfigError> {
    finite(name, v)?;
    if v > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be positive, got {v}")))
    }
}
