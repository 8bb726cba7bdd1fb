use relief_core::constants::{WATER_NORMAL_TILE, WATER_SCROLL_SPEED};
use relief_core::error::ReliefError;
use relief_core::mesh::PLANE_NORMAL;

const TYPES_WGSL: &str = include_str!("../../../shaders/common/types.wgsl");
const SAMPLING_WGSL: &str = include_str!("../../../shaders/common/sampling.wgsl");

pub const TERRAIN_WGSL: &str = include_str!("../../../shaders/render/terrain.wgsl");
pub const SKY_WGSL: &str = include_str!("../../../shaders/render/sky.wgsl");
pub const WATER_WGSL: &str = include_str!("../../../shaders/render/water.wgsl");
pub const BLIT_WGSL: &str = include_str!("../../../shaders/render/blit.wgsl");

/// WGSL constants generated from the Rust side so both agree on shared values.
pub fn shader_preamble() -> String {
    format!(
        "const PLANE_NORMAL: vec3<f32> = vec3<f32>({:.6}, {:.6}, {:.6});\n\
         const WATER_NORMAL_TILE: f32 = {:.6};\n\
         const WATER_SCROLL_SPEED: f32 = {:.6};\n",
        PLANE_NORMAL.x, PLANE_NORMAL.y, PLANE_NORMAL.z, WATER_NORMAL_TILE, WATER_SCROLL_SPEED,
    )
}

/// Full shader source for a pass: constants + shared types + sampling helpers + pass.
pub fn compose(pass_source: &str) -> String {
    format!(
        "{}\n{TYPES_WGSL}\n{SAMPLING_WGSL}\n{pass_source}",
        shader_preamble()
    )
}

/// Compile a composed pass shader, turning validation errors into a `ReliefError`.
pub fn create_module(
    device: &wgpu::Device,
    label: &str,
    pass_source: &str,
) -> Result<wgpu::ShaderModule, ReliefError> {
    let source = compose(pass_source);
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        log::error!("Shader '{label}' failed to compile");
        return Err(ReliefError::ShaderCompilationFailed(format!("{label}: {err}")));
    }
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preamble_declares_plane_normal() {
        let preamble = shader_preamble();
        assert!(preamble.contains("const PLANE_NORMAL: vec3<f32> = vec3<f32>(0.000000, 0.000000, 1.000000);"));
        assert!(preamble.contains("WATER_NORMAL_TILE"));
    }

    #[test]
    fn test_composed_sources_include_shared_code() {
        for pass in [TERRAIN_WGSL, SKY_WGSL, WATER_WGSL] {
            let source = compose(pass);
            assert!(source.contains("struct FrameUniforms"));
            assert!(source.contains("fn image_uv"));
            assert!(source.contains("fn vs_main"));
            assert!(source.contains("fn fs_main"));
        }
    }

    #[test]
    fn test_both_terrain_stages_use_image_uv() {
        let vs = TERRAIN_WGSL.find("fn vs_main").unwrap();
        let fs = TERRAIN_WGSL.find("fn fs_main").unwrap();
        assert!(TERRAIN_WGSL[vs..fs].contains("image_uv(in.uv)"));
        assert!(TERRAIN_WGSL[fs..].contains("image_uv(in.uv)"));
    }
}
