use std::sync::Arc;

use relief_core::error::ReliefError;
use wgpu::{
    Adapter, Device, DeviceDescriptor, Instance, InstanceDescriptor, InstanceFlags,
    PowerPreference, Queue, RequestAdapterOptions, Surface, SurfaceConfiguration, TextureFormat,
    TextureUsages,
};
use winit::window::Window;

/// Holds all GPU resources initialized at startup.
pub struct GpuContext {
    #[allow(dead_code)] // Kept alive with the surface it was selected for
    pub adapter: Adapter,
    pub device: Device,
    pub queue: Queue,
    pub surface: Surface<'static>,
    pub surface_config: SurfaceConfiguration,
    pub surface_format: TextureFormat,
}

/// Initialize wgpu for a window. Blocks on the async adapter and device requests.
///
/// Prefers an sRGB surface format so shader output in linear light is encoded
/// on write.
pub fn init_gpu(window: Arc<Window>, width: u32, height: u32) -> Result<GpuContext, ReliefError> {
    let instance = Instance::new(&InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        flags: InstanceFlags::default(),
        ..Default::default()
    });

    let surface: Surface<'static> = instance
        .create_surface(window)
        .map_err(|e| ReliefError::SurfaceConfigFailed(format!("{e}")))?;

    let adapter = pollster::block_on(instance.request_adapter(&RequestAdapterOptions {
        power_preference: PowerPreference::HighPerformance,
        compatible_surface: Some(&surface),
        force_fallback_adapter: false,
    }))
    .ok_or_else(|| ReliefError::AdapterNotFound("no adapter compatible with the window".into()))?;

    let adapter_info = adapter.get_info();
    log::info!("Adapter: {} ({:?})", adapter_info.name, adapter_info.backend);

    let (device, queue) = pollster::block_on(adapter.request_device(
        &DeviceDescriptor {
            label: Some("relief-device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            ..Default::default()
        },
        None,
    ))
    .map_err(|e| ReliefError::DeviceRequestFailed(format!("{e}")))?;

    // Select sRGB surface format with fallback
    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .copied()
        .or_else(|| surface_caps.formats.first().copied())
        .ok_or_else(|| ReliefError::SurfaceConfigFailed("surface reports no formats".into()))?;
    let alpha_mode = surface_caps
        .alpha_modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);

    let surface_config = SurfaceConfiguration {
        usage: TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: width.max(1),
        height: height.max(1),
        present_mode: wgpu::PresentMode::AutoVsync,
        desired_maximum_frame_latency: 2,
        alpha_mode,
        view_formats: vec![],
    };
    surface.configure(&device, &surface_config);

    log::info!(
        "Surface format: {:?}, size: {}x{}",
        surface_format,
        surface_config.width,
        surface_config.height
    );

    Ok(GpuContext {
        adapter,
        device,
        queue,
        surface,
        surface_config,
        surface_format,
    })
}

impl GpuContext {
    /// Reconfigure the surface for a new window size. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.surface_config);
    }
}
