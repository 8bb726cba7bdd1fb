use glam::{EulerRot, Quat, Vec3};

/// Decode one sRGB-encoded channel in [0, 1] to linear light.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Split a 0xRRGGBB color into [r, g, b] in [0, 1]. No transfer function is applied.
pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// Unit sun direction from elevation above the horizon and azimuth, both in degrees.
///
/// Uses the y-up spherical convention: the polar angle is measured from +Y
/// and azimuth 0 points along +Z.
pub fn sun_direction(elevation_deg: f32, azimuth_deg: f32) -> Vec3 {
    let phi = (90.0 - elevation_deg).to_radians();
    let theta = azimuth_deg.to_radians();
    Vec3::new(
        phi.sin() * theta.sin(),
        phi.cos(),
        phi.sin() * theta.cos(),
    )
}

/// Orientation from XYZ-ordered Euler angles in radians.
pub fn euler_xyz(rotation: [f32; 3]) -> Quat {
    Quat::from_euler(EulerRot::XYZ, rotation[0], rotation[1], rotation[2])
}

/// Yaw (about +Y, 0 looking from +Z) and pitch of `eye` around `target`, plus the distance.
/// Inverse of the orbit parameterization used by the viewer camera.
pub fn orbit_from_eye(eye: Vec3, target: Vec3) -> (f32, f32, f32) {
    let offset = eye - target;
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return (0.0, 0.0, 0.0);
    }
    let yaw = offset.x.atan2(offset.z);
    let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
    (yaw, pitch, distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb_endpoints_preserved() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_srgb_midpoint_darker() {
        let mid = srgb_to_linear(0.5);
        assert!((mid - 0.214).abs() < 1e-3, "got {mid}");
    }

    #[test]
    fn test_hex_to_rgb_water_color() {
        let [r, g, b] = hex_to_rgb(0x001e0f);
        assert_eq!(r, 0.0);
        assert!((g - 30.0 / 255.0).abs() < 1e-6);
        assert!((b - 15.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_sun_at_zenith() {
        let d = sun_direction(90.0, 0.0);
        assert!((d - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_sun_low_in_south() {
        // elevation 2, azimuth 180: just above the horizon, toward -Z
        let d = sun_direction(2.0, 180.0);
        assert!((d.length() - 1.0).abs() < 1e-5);
        assert!(d.y > 0.0 && d.y < 0.05);
        assert!(d.z < -0.99);
        assert!(d.x.abs() < 1e-4);
    }

    #[test]
    fn test_orbit_from_eye_inverts_spherical() {
        let target = Vec3::new(1.0, 2.0, 3.0);
        let (yaw, pitch, distance) = (0.7f32, -0.3f32, 12.0f32);
        let eye = target
            + Vec3::new(
                distance * pitch.cos() * yaw.sin(),
                distance * pitch.sin(),
                distance * pitch.cos() * yaw.cos(),
            );
        let (y, p, d) = orbit_from_eye(eye, target);
        assert!((y - yaw).abs() < 1e-4);
        assert!((p - pitch).abs() < 1e-4);
        assert!((d - distance).abs() < 1e-3);
    }

    #[test]
    fn test_euler_identity() {
        let q = euler_xyz([0.0, 0.0, 0.0]);
        assert!(q.abs_diff_eq(Quat::IDENTITY, 1e-6));
    }
}
