use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during Relief initialization and runtime.
#[derive(Debug, Error)]
pub enum ReliefError {
    #[error("GPU adapter not found: {0}")]
    AdapterNotFound(String),

    #[error("Failed to request GPU device: {0}")]
    DeviceRequestFailed(String),

    #[error("Surface configuration failed: {0}")]
    SurfaceConfigFailed(String),

    #[error("Surface texture error: {0}")]
    SurfaceTextureError(String),

    #[error("Shader compilation failed: {0}")]
    ShaderCompilationFailed(String),

    #[error("Failed to load texture {path}: {reason}")]
    TextureLoad { path: PathBuf, reason: String },

    #[error("Invalid texture data: {0}")]
    InvalidTexture(String),

    #[error("Window creation failed: {0}")]
    WindowFailed(String),

    #[error("Frame capture failed: {0}")]
    CaptureFailed(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
