pub mod assets;
pub mod camera;
pub mod config;
pub mod constants;
pub mod displacement;
pub mod error;
pub mod math;
pub mod mesh;
pub mod texture;

pub use assets::SceneAssets;
pub use camera::OrbitCamera;
pub use config::{ConfigError, SceneConfig};
pub use displacement::{TerrainBounds, TerrainShader};
pub use error::ReliefError;
pub use mesh::{PlaneMesh, TerrainVertex};
pub use texture::{TextureEncoding, TextureImage};
