use std::time::Instant;

use glam::Vec3;
use relief_core::camera::OrbitCamera;
use relief_core::displacement::{TerrainBounds, TerrainShader};
use relief_core::error::ReliefError;
use relief_core::mesh::PlaneMesh;
use relief_core::texture::TextureImage;
use relief_render::capture::CAPTURE_FORMAT;
use relief_render::{FrameCapture, HeadlessGpu, Renderer};

use crate::scenes::BenchScene;

/// Orbit applied per frame so every frame sees a different view.
const ORBIT_STEP_PX: f32 = 2.0;

/// Timing data for a single benchmark run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TimingSeries {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

/// Result of a single scene benchmark.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkResult {
    pub scene_name: String,
    pub vertex_count: u32,
    pub triangle_count: u32,
    /// Height of the displaced terrain in world units.
    pub terrain_relief: f32,
    pub frame_count: u32,
    pub timings: TimingSeries,
}

/// Runs benchmarks on a headless native device.
pub struct BenchmarkRunner {
    gpu: HeadlessGpu,
    frame_count: u32,
    width: u32,
    height: u32,
}

impl BenchmarkRunner {
    pub fn new(frame_count: u32, width: u32, height: u32) -> Result<Self, ReliefError> {
        Ok(Self {
            gpu: HeadlessGpu::new()?,
            frame_count,
            width,
            height,
        })
    }

    pub fn adapter_name(&self) -> &str {
        &self.gpu.adapter_name
    }

    /// Render the scene `frame_count` times and time each frame. With
    /// `capture` set, the last frame is read back and returned.
    pub fn run_scene(
        &self,
        scene: &BenchScene,
        capture: bool,
    ) -> Result<(BenchmarkResult, Option<TextureImage>), ReliefError> {
        log::info!("Running scene '{}'...", scene.name);

        let assets = scene.assets();
        let renderer = Renderer::new(
            &self.gpu.device,
            &self.gpu.queue,
            CAPTURE_FORMAT,
            self.width,
            self.height,
            &scene.config,
            &assets,
        )?;
        let target = FrameCapture::new(&self.gpu.device, self.width, self.height);
        let mut camera = OrbitCamera::from_config(&scene.config);

        let mut frame_times = Vec::with_capacity(self.frame_count as usize);
        let clock = Instant::now();
        for _ in 0..self.frame_count {
            camera.orbit(ORBIT_STEP_PX, 0.0);
            camera.update();

            let frame_start = Instant::now();
            renderer.update_frame(&self.gpu.queue, &camera, clock.elapsed().as_secs_f32());
            target.render(&self.gpu.device, &self.gpu.queue, &renderer);
            frame_times.push(frame_start.elapsed().as_secs_f64() * 1000.0);
        }

        let image = if capture {
            Some(target.capture(&self.gpu.device, &self.gpu.queue, &renderer)?)
        } else {
            None
        };

        let timings = compute_timings(&frame_times);
        log::info!(
            "  Done: mean={:.2}ms, p95={:.2}ms, p99={:.2}ms",
            timings.mean_ms,
            timings.p95_ms,
            timings.p99_ms
        );

        let t = &scene.config.terrain;
        let mesh = PlaneMesh::new(t.plane_width, t.plane_height, t.segments_x, t.segments_y);
        let terrain_relief = terrain_relief(scene, &mesh);

        let result = BenchmarkResult {
            scene_name: scene.name.clone(),
            vertex_count: mesh.vertex_count(),
            triangle_count: mesh.index_count() / 3,
            terrain_relief,
            frame_count: self.frame_count,
            timings,
        };
        Ok((result, image))
    }
}

/// World-space height of the displaced terrain, from the CPU reference.
fn terrain_relief(scene: &BenchScene, mesh: &PlaneMesh) -> f32 {
    let assets = scene.assets();
    let t = &scene.config.terrain;
    let shader = TerrainShader::new(&assets.heightmap, &assets.color, t.bump_scale);
    let points: Vec<Vec3> = shader.displace_mesh(mesh);
    TerrainBounds::from_points(&points)
        .map(|b| b.relief() * t.mesh_scale)
        .unwrap_or(0.0)
}

/// Compute timing statistics from a list of frame times in milliseconds.
pub fn compute_timings(times: &[f64]) -> TimingSeries {
    if times.is_empty() {
        return TimingSeries {
            mean_ms: 0.0,
            median_ms: 0.0,
            p95_ms: 0.0,
            p99_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
        };
    }

    let mut sorted = times.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let p95_idx = ((n as f64) * 0.95).ceil() as usize;
    let p99_idx = ((n as f64) * 0.99).ceil() as usize;

    TimingSeries {
        mean_ms: mean,
        median_ms: median,
        p95_ms: sorted[p95_idx.min(n - 1)],
        p99_ms: sorted[p99_idx.min(n - 1)],
        min_ms: sorted[0],
        max_ms: sorted[n - 1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::standard_scenes;

    #[test]
    fn test_compute_timings_empty() {
        let t = compute_timings(&[]);
        assert_eq!(t.mean_ms, 0.0);
        assert_eq!(t.max_ms, 0.0);
    }

    #[test]
    fn test_compute_timings_stats() {
        let times: Vec<f64> = (1..=100).map(f64::from).collect();
        let t = compute_timings(&times);
        assert!((t.mean_ms - 50.5).abs() < 1e-9);
        assert!((t.median_ms - 50.5).abs() < 1e-9);
        assert_eq!(t.min_ms, 1.0);
        assert_eq!(t.max_ms, 100.0);
        assert_eq!(t.p95_ms, 96.0);
        assert_eq!(t.p99_ms, 100.0);
    }

    #[test]
    fn test_relief_scales_with_mesh_scale() {
        let scenes = standard_scenes();
        let harbour = scenes.iter().find(|s| s.name == "harbour").unwrap();
        let miniature = scenes.iter().find(|s| s.name == "miniature").unwrap();
        let t = &harbour.config.terrain;
        let mesh = PlaneMesh::new(t.plane_width, t.plane_height, 64, 64);

        let full = terrain_relief(harbour, &mesh);
        let small = terrain_relief(miniature, &mesh);
        assert!(full > 0.0 && full <= t.bump_scale + 1e-3);
        assert!((small - full / 8.0).abs() < 1e-3);
    }
}
