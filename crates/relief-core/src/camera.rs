use glam::{Mat4, Quat, Vec3};

use crate::config::SceneConfig;
use crate::math::{euler_xyz, orbit_from_eye};

/// Radians of orbit per pixel of mouse drag.
const ROTATE_SPEED: f32 = 0.005;

/// Pan distance per pixel, as a fraction of the orbit distance.
const PAN_SPEED: f32 = 0.002;

/// Pitch limit keeping the camera off the poles.
const MAX_PITCH: f32 = 1.5;

/// Orbit camera around a target point, with optional damping.
///
/// Input accumulates velocities; `update` applies `damping` of the remaining
/// velocity each frame and decays the rest, so motion eases out after the
/// input stops. With damping 0 input applies immediately.
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_y_rad: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    damping: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
    pan_velocity: Vec3,
    /// Fixed pose used when orbit controls are disabled.
    fixed: Option<(Vec3, Quat)>,
}

impl OrbitCamera {
    /// Camera at the configured position, looking at the configured target.
    pub fn from_config(config: &SceneConfig) -> Self {
        let c = &config.camera;
        let eye = Vec3::from(c.position);
        let target = Vec3::from(c.target);
        let (yaw, pitch, distance) = orbit_from_eye(eye, target);
        let far = config.view_distance();

        let fixed = if c.orbit_controls {
            None
        } else {
            Some((eye, euler_xyz(c.rotation)))
        };

        Self {
            target,
            distance,
            yaw,
            pitch: pitch.clamp(-MAX_PITCH, MAX_PITCH),
            fov_y_rad: c.fov_y_deg.to_radians(),
            near: c.near,
            far,
            min_distance: c.near.max(1.0).min(distance),
            max_distance: far.max(distance),
            damping: c.damping,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            pan_velocity: Vec3::ZERO,
            fixed,
        }
    }

    pub fn orbit_enabled(&self) -> bool {
        self.fixed.is_none()
    }

    pub fn eye_position(&self) -> Vec3 {
        if let Some((eye, _)) = self.fixed {
            return eye;
        }
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Queue an orbit by a mouse drag of (dx, dy) pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw_velocity -= dx * ROTATE_SPEED;
        self.pitch_velocity += dy * ROTATE_SPEED;
    }

    /// Queue a pan of the target in the view plane by (dx, dy) pixels.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let eye = self.eye_position();
        let forward = (self.target - eye).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();

        let speed = self.distance * PAN_SPEED;
        self.pan_velocity += right * (-dx * speed) + up * (dy * speed);
    }

    /// Zoom toward the target. Positive delta moves closer. Applied immediately.
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta * self.distance * 0.1)
            .clamp(self.min_distance, self.max_distance);
    }

    /// Advance one frame. Returns true while the camera is still moving.
    pub fn update(&mut self) -> bool {
        if self.fixed.is_some() {
            return false;
        }
        let step = if self.damping > 0.0 { self.damping } else { 1.0 };

        self.yaw += self.yaw_velocity * step;
        self.pitch = (self.pitch + self.pitch_velocity * step).clamp(-MAX_PITCH, MAX_PITCH);
        self.target += self.pan_velocity * step;

        let decay = 1.0 - step;
        self.yaw_velocity *= decay;
        self.pitch_velocity *= decay;
        self.pan_velocity *= decay;

        const REST: f32 = 1e-6;
        let moving = self.yaw_velocity.abs() > REST
            || self.pitch_velocity.abs() > REST
            || self.pan_velocity.length_squared() > REST * REST;
        if !moving {
            self.yaw_velocity = 0.0;
            self.pitch_velocity = 0.0;
            self.pan_velocity = Vec3::ZERO;
        }
        moving
    }

    pub fn view(&self) -> Mat4 {
        match self.fixed {
            Some((eye, rotation)) => Mat4::from_rotation_translation(rotation, eye).inverse(),
            None => Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y),
        }
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_rad, aspect.max(1e-4), self.near, self.far)
    }

    pub fn view_proj(&self, width: f32, height: f32) -> Mat4 {
        self.projection(width / height.max(1.0)) * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_configured_position() {
        let config = SceneConfig::harbour();
        let cam = OrbitCamera::from_config(&config);
        let eye = cam.eye_position();
        assert!((eye - Vec3::new(361.0, 148.0, 289.0)).length() < 1e-2, "eye {eye}");
        assert!(cam.orbit_enabled());
    }

    #[test]
    fn test_damped_orbit_converges_to_undamped_total() {
        let mut config = SceneConfig::harbour();
        config.camera.damping = 0.0;
        let mut immediate = OrbitCamera::from_config(&config);
        immediate.orbit(40.0, 10.0);
        immediate.update();

        config.camera.damping = 0.05;
        let mut damped = OrbitCamera::from_config(&config);
        damped.orbit(40.0, 10.0);
        damped.update();
        assert!(damped.yaw != immediate.yaw, "damped camera should lag");
        for _ in 0..2000 {
            if !damped.update() {
                break;
            }
        }
        assert!((damped.yaw - immediate.yaw).abs() < 1e-3);
        assert!((damped.pitch - immediate.pitch).abs() < 1e-3);
    }

    #[test]
    fn test_pitch_clamped() {
        let mut config = SceneConfig::harbour();
        config.camera.damping = 0.0;
        let mut cam = OrbitCamera::from_config(&config);
        cam.orbit(0.0, 100_000.0);
        cam.update();
        assert!(cam.pitch <= MAX_PITCH);
    }

    #[test]
    fn test_zoom_clamped() {
        let config = SceneConfig::harbour();
        let mut cam = OrbitCamera::from_config(&config);
        for _ in 0..500 {
            cam.zoom(5.0);
        }
        assert!(cam.distance >= cam.min_distance);
        for _ in 0..500 {
            cam.zoom(-5.0);
        }
        assert!(cam.distance <= cam.max_distance);
    }

    #[test]
    fn test_pan_moves_target_not_distance() {
        let mut config = SceneConfig::harbour();
        config.camera.damping = 0.0;
        let mut cam = OrbitCamera::from_config(&config);
        let d = cam.distance;
        cam.pan(100.0, 0.0);
        cam.update();
        assert!(cam.target.length() > 0.0);
        assert!((cam.distance - d).abs() < 1e-4);
    }

    #[test]
    fn test_fixed_rotation_when_controls_disabled() {
        let config = SceneConfig::builder()
            .orbit_controls(false)
            .camera_position([0.0, 10.0, 0.0])
            .camera_rotation([-std::f32::consts::FRAC_PI_2, 0.0, 0.0])
            .build()
            .unwrap();
        let mut cam = OrbitCamera::from_config(&config);
        cam.orbit(100.0, 100.0);
        assert!(!cam.update());
        // looking straight down: a point below the camera lands at the view center
        let p = cam.view().transform_point3(Vec3::new(0.0, 0.0, 0.0));
        assert!(p.x.abs() < 1e-4 && p.y.abs() < 1e-4);
        assert!((p.z + 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let config = SceneConfig::harbour();
        let cam = OrbitCamera::from_config(&config);
        let clip = cam.view_proj(1280.0, 720.0) * cam.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
