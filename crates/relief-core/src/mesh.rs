use glam::{Mat4, Quat, Vec2, Vec3};

use crate::config::TerrainConfig;

/// GPU vertex for the terrain plane (20 bytes, matches VertexInput in terrain.wgsl).
/// The normal is not stored: the undisplaced plane is flat, see [`PLANE_NORMAL`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Plane-local normal of the undisplaced terrain grid.
pub const PLANE_NORMAL: Vec3 = Vec3::Z;

/// Flat subdivided plane in the local XY plane, centered on the origin.
///
/// Vertices are laid out row-major starting at the top edge (+Y), left to
/// right. `u` grows with x and `v` grows with y, so neighbouring vertices
/// address neighbouring texels.
#[derive(Debug, Clone)]
pub struct PlaneMesh {
    pub width: f32,
    pub height: f32,
    pub segments_x: u32,
    pub segments_y: u32,
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
}

impl PlaneMesh {
    /// Build the grid. Segment counts of zero are raised to one.
    pub fn new(width: f32, height: f32, segments_x: u32, segments_y: u32) -> Self {
        let gx = segments_x.max(1);
        let gy = segments_y.max(1);
        let gx1 = gx + 1;
        let gy1 = gy + 1;
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        let seg_w = width / gx as f32;
        let seg_h = height / gy as f32;

        let mut vertices = Vec::with_capacity((gx1 * gy1) as usize);
        for iy in 0..gy1 {
            let y = iy as f32 * seg_h - half_h;
            for ix in 0..gx1 {
                let x = ix as f32 * seg_w - half_w;
                vertices.push(TerrainVertex {
                    position: [x, -y, 0.0],
                    uv: [ix as f32 / gx as f32, 1.0 - iy as f32 / gy as f32],
                });
            }
        }

        let mut indices = Vec::with_capacity((gx * gy * 6) as usize);
        for iy in 0..gy {
            for ix in 0..gx {
                let a = ix + gx1 * iy;
                let b = ix + gx1 * (iy + 1);
                let c = (ix + 1) + gx1 * (iy + 1);
                let d = (ix + 1) + gx1 * iy;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self {
            width,
            height,
            segments_x: gx,
            segments_y: gy,
            vertices,
            indices,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Index of the vertex at grid column `ix`, row `iy` (row 0 is the top edge).
    pub fn vertex_index(&self, ix: u32, iy: u32) -> usize {
        (iy * (self.segments_x + 1) + ix) as usize
    }

    /// Vertex whose uv lies closest to `uv`.
    pub fn nearest_vertex(&self, uv: Vec2) -> usize {
        let ix = (uv.x.clamp(0.0, 1.0) * self.segments_x as f32).round() as u32;
        let iy = ((1.0 - uv.y.clamp(0.0, 1.0)) * self.segments_y as f32).round() as u32;
        self.vertex_index(ix, iy)
    }
}

/// Plane-local to world transform: rotate local +Z onto world +Y, then scale.
pub fn terrain_transform(config: &TerrainConfig) -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::splat(config.mesh_scale),
        Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
        Vec3::ZERO,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_vertex_size() {
        assert_eq!(std::mem::size_of::<TerrainVertex>(), 20);
    }

    #[test]
    fn test_counts_for_default_plane() {
        let mesh = PlaneMesh::new(1024.0, 1024.0, 256, 256);
        assert_eq!(mesh.vertex_count(), 257 * 257);
        assert_eq!(mesh.index_count(), 256 * 256 * 6);
        assert!(mesh.indices.iter().all(|&i| i < mesh.vertex_count()));
    }

    #[test]
    fn test_corners_and_uvs() {
        let mesh = PlaneMesh::new(10.0, 20.0, 2, 4);
        let top_left = mesh.vertices[mesh.vertex_index(0, 0)];
        assert_eq!(top_left.position, [-5.0, 10.0, 0.0]);
        assert_eq!(top_left.uv, [0.0, 1.0]);

        let bottom_right = mesh.vertices[mesh.vertex_index(2, 4)];
        assert_eq!(bottom_right.position, [5.0, -10.0, 0.0]);
        assert_eq!(bottom_right.uv, [1.0, 0.0]);
    }

    #[test]
    fn test_uvs_monotonic_across_grid() {
        let mesh = PlaneMesh::new(8.0, 8.0, 8, 8);
        for iy in 0..=8 {
            for ix in 0..8 {
                let a = mesh.vertices[mesh.vertex_index(ix, iy)].uv;
                let b = mesh.vertices[mesh.vertex_index(ix + 1, iy)].uv;
                assert!(b[0] > a[0]);
                assert_eq!(a[1], b[1]);
            }
        }
        for iy in 0..8 {
            let a = mesh.vertices[mesh.vertex_index(0, iy)].uv;
            let b = mesh.vertices[mesh.vertex_index(0, iy + 1)].uv;
            assert!(b[1] < a[1]);
        }
    }

    #[test]
    fn test_triangles_face_plane_normal() {
        let mesh = PlaneMesh::new(4.0, 4.0, 2, 2);
        for tri in mesh.indices.chunks(3) {
            let p = |i: u32| Vec3::from(mesh.vertices[i as usize].position);
            let n = (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]));
            assert!(n.normalize().dot(PLANE_NORMAL) > 0.99);
        }
    }

    #[test]
    fn test_zero_segments_clamped() {
        let mesh = PlaneMesh::new(1.0, 1.0, 0, 0);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.index_count(), 6);
    }

    #[test]
    fn test_transform_maps_normal_to_world_up() {
        let config = TerrainConfig::default();
        let m = terrain_transform(&config);
        let up = m.transform_vector3(PLANE_NORMAL);
        assert!((up - Vec3::Y).length() < 1e-6);
        // top edge of the grid (+Y local) faces world -Z
        let north = m.transform_point3(Vec3::new(0.0, 512.0, 0.0));
        assert!((north - Vec3::new(0.0, 0.0, -512.0)).length() < 1e-3);
    }

    #[test]
    fn test_transform_applies_mesh_scale() {
        let config = TerrainConfig {
            mesh_scale: 0.125,
            ..TerrainConfig::default()
        };
        let m = terrain_transform(&config);
        let p = m.transform_point3(Vec3::new(512.0, 0.0, 50.0));
        assert!((p - Vec3::new(64.0, 6.25, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_nearest_vertex_center() {
        let mesh = PlaneMesh::new(1024.0, 1024.0, 256, 256);
        let idx = mesh.nearest_vertex(Vec2::new(0.5, 0.5));
        assert_eq!(mesh.vertices[idx].uv, [0.5, 0.5]);
        assert_eq!(mesh.vertices[idx].position, [0.0, 0.0, 0.0]);
    }
}
