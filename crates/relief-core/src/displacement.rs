//! CPU reference of the terrain shader pair in `shaders/render/terrain.wgsl`.
//!
//! Vertex stage: `P' = P + N * (sample(heightmap, uv).r * bump_scale)`.
//! Fragment stage: `color = sample(color_texture, uv)`, unlit.
//! Both stages are pure functions of their inputs.

use glam::{Vec2, Vec3, Vec4};

use crate::mesh::{PlaneMesh, PLANE_NORMAL};
use crate::texture::{Filter, TextureImage};

/// Height in [0, 1] read from the red channel, filtered like the GPU vertex fetch.
pub fn sample_height(heightmap: &TextureImage, uv: Vec2) -> f32 {
    heightmap.sample(uv, Filter::Linear).x
}

/// Offset applied to a vertex at `uv`.
pub fn displacement_offset(heightmap: &TextureImage, uv: Vec2, bump_scale: f32) -> Vec3 {
    PLANE_NORMAL * (sample_height(heightmap, uv) * bump_scale)
}

/// Output of the vertex stage, before the model-view-projection transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexOutput {
    pub local_position: Vec3,
    pub uv: Vec2,
}

/// Bound inputs of one terrain draw.
#[derive(Debug, Clone, Copy)]
pub struct TerrainShader<'a> {
    pub heightmap: &'a TextureImage,
    pub color: &'a TextureImage,
    pub bump_scale: f32,
}

impl<'a> TerrainShader<'a> {
    pub fn new(heightmap: &'a TextureImage, color: &'a TextureImage, bump_scale: f32) -> Self {
        Self {
            heightmap,
            color,
            bump_scale,
        }
    }

    /// Vertex stage: displace along the plane normal and pass `uv` through.
    pub fn vertex(&self, position: Vec3, uv: Vec2) -> VertexOutput {
        VertexOutput {
            local_position: position + displacement_offset(self.heightmap, uv, self.bump_scale),
            uv,
        }
    }

    /// Fragment stage: base color at `uv`, no lighting.
    pub fn fragment(&self, uv: Vec2) -> Vec4 {
        self.color.sample(uv, Filter::Linear)
    }

    /// Run the vertex stage over every vertex of `mesh`.
    pub fn displace_mesh(&self, mesh: &PlaneMesh) -> Vec<Vec3> {
        mesh.vertices
            .iter()
            .map(|v| {
                self.vertex(Vec3::from(v.position), Vec2::from(v.uv))
                    .local_position
            })
            .collect()
    }
}

/// Axis-aligned bounds of a displaced terrain in plane-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl TerrainBounds {
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        Some(Self { min, max })
    }

    /// Peak displacement above the flat plane.
    pub fn relief(&self) -> f32 {
        self.max.z - self.min.z
    }
}
