use relief_core::error::ReliefError;

/// Device and queue without a window, for benchmarks, captures and GPU tests.
pub struct HeadlessGpu {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_name: String,
}

impl HeadlessGpu {
    /// Initialize wgpu natively. Blocks on the async adapter and device requests.
    pub fn new() -> Result<Self, ReliefError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| ReliefError::AdapterNotFound("no suitable GPU adapter found".into()))?;

        let adapter_name = adapter.get_info().name;
        log::info!("Headless adapter: {}", adapter_name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("relief-headless-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
            },
            None,
        ))
        .map_err(|e| ReliefError::DeviceRequestFailed(format!("{e}")))?;

        Ok(Self {
            device,
            queue,
            adapter_name,
        })
    }
}
