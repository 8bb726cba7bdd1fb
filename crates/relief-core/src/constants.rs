//! Single source of truth for shared constants.
//! Values that WGSL needs are injected into shader preambles by the renderer,
//! see `relief_render::shader_preamble`.

/// Default side length of the terrain plane in world units.
pub const PLANE_SIZE: f32 = 1024.0;

/// Default number of segments along each side of the terrain plane.
pub const PLANE_SEGMENTS: u32 = 256;

/// Default heightmap displacement multiplier (world units at texel value 1.0).
pub const DEFAULT_BUMP_SCALE: f32 = 50.0;

/// Default anisotropic filtering clamp for terrain textures.
pub const DEFAULT_ANISOTROPY: u16 = 16;

/// Upper bound on the device pixel ratio used to size the surface.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Side length of the water plane in world units.
pub const WATER_SIZE: f32 = 10_000.0;

/// Resolution of the water reflection target in the reference scene.
pub const WATER_TEXTURE_SIZE: u32 = 512;

/// Water body color (0x001e0f).
pub const WATER_COLOR: u32 = 0x001e0f;

/// Sun color used for water highlights (0xffffff).
pub const SUN_COLOR: u32 = 0xffffff;

/// Normal map distortion strength on the water surface.
pub const WATER_DISTORTION_SCALE: f32 = 3.7;

/// World units covered by one repeat of the water normal texture.
pub const WATER_NORMAL_TILE: f32 = 64.0;

/// Scroll speed of the water normal texture in uv units per second.
pub const WATER_SCROLL_SPEED: f32 = 0.02;

/// Sky dome scale in world units.
pub const SKY_SCALE: f32 = 10_000.0;

/// Default sky turbidity.
pub const SKY_TURBIDITY: f32 = 10.0;

/// Default Rayleigh scattering coefficient.
pub const SKY_RAYLEIGH: f32 = 2.0;

/// Default Mie scattering coefficient.
pub const SKY_MIE_COEFFICIENT: f32 = 0.005;

/// Default Mie directional anisotropy.
pub const SKY_MIE_DIRECTIONAL_G: f32 = 0.8;

/// Default sun elevation above the horizon in degrees.
pub const SUN_ELEVATION_DEG: f32 = 2.0;

/// Default sun azimuth in degrees.
pub const SUN_AZIMUTH_DEG: f32 = 180.0;

/// Default vertical field of view in degrees.
pub const CAMERA_FOV_DEG: f32 = 75.0;

/// Default near clip distance.
pub const CAMERA_NEAR: f32 = 0.001;

/// Default far clip distance before extension for sky and water.
pub const CAMERA_FAR: f32 = 1000.0;

/// Default orbit damping factor (fraction of the remaining delta applied per frame).
pub const CAMERA_DAMPING: f32 = 0.05;

/// Closest an orbiting camera may start to its target.
pub const MIN_ORBIT_DISTANCE: f32 = 1e-3;

/// Fallback texel bound when the heightmap fails to load (flat terrain).
pub const FALLBACK_HEIGHT_TEXEL: [u8; 4] = [0, 0, 0, 255];

/// Fallback texel bound when the base color fails to load (opaque magenta).
pub const FALLBACK_COLOR_TEXEL: [u8; 4] = [255, 0, 255, 255];

/// Fallback texel bound when the water normal map fails to load (straight up).
pub const FALLBACK_NORMAL_TEXEL: [u8; 4] = [128, 128, 255, 255];
