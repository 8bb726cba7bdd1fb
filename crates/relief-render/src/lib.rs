pub mod blit;
pub mod capture;
pub mod headless;
pub mod renderer;
pub mod shaders;
pub mod sky;
pub mod terrain;
pub mod texture;
pub mod water;

pub use blit::ScaledTarget;
pub use capture::FrameCapture;
pub use headless::HeadlessGpu;
pub use renderer::{FrameUniforms, Renderer};
pub use shaders::shader_preamble;
