use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use relief_core::assets::SceneAssets;
use relief_core::camera::OrbitCamera;
use relief_core::config::SceneConfig;
use relief_core::error::ReliefError;
use relief_render::{Renderer, ScaledTarget};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::gpu::{init_gpu, GpuContext};
use crate::input::InputState;

/// Scene render size for a window: the pixel ratio is clamped to `max_ratio`,
/// so high-density displays render fewer pixels and the result is upscaled.
pub fn scene_size(window: PhysicalSize<u32>, scale_factor: f64, max_ratio: f32) -> (u32, u32) {
    let scale = scale_factor.max(f64::EPSILON);
    let ratio = scale.min(max_ratio as f64) / scale;
    let w = (window.width as f64 * ratio).round() as u32;
    let h = (window.height as f64 * ratio).round() as u32;
    (w.max(1), h.max(1))
}

/// Shared stop flag for the frame loop. Checked once per loop turn, so the
/// loop exits at the next frame boundary after `request_stop`.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Everything that exists once the window is up.
struct ViewerState {
    window: Arc<Window>,
    gpu: GpuContext,
    target: ScaledTarget,
    renderer: Renderer,
    camera: OrbitCamera,
    input: InputState,
    clock: Instant,
    frames: u64,
}

/// Application context: owns the scene and drives the frame loop.
pub struct Viewer {
    config: SceneConfig,
    assets: SceneAssets,
    window_size: (u32, u32),
    frame_limit: Option<u64>,
    state: Option<ViewerState>,
    stop: StopHandle,
    error: Option<ReliefError>,
}

impl Viewer {
    pub fn new(
        config: SceneConfig,
        assets: SceneAssets,
        window_size: (u32, u32),
        frame_limit: Option<u64>,
    ) -> Self {
        Self {
            config,
            assets,
            window_size,
            frame_limit,
            state: None,
            stop: StopHandle::default(),
            error: None,
        }
    }

    /// Handle that ends the frame loop from outside the event handlers.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Fatal error raised inside the event loop, if any.
    pub fn into_result(self) -> Result<(), ReliefError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn fail(&mut self, error: ReliefError) {
        self.error = Some(error);
        self.stop.request_stop();
    }

    fn init(&self, event_loop: &ActiveEventLoop) -> Result<ViewerState, ReliefError> {
        let (w, h) = self.window_size;
        let window = Arc::new(
            event_loop
                .create_window(
                    Window::default_attributes()
                        .with_title(format!("Relief: {}", self.config.name))
                        .with_inner_size(LogicalSize::new(w, h)),
                )
                .map_err(|e| ReliefError::WindowFailed(format!("{e}")))?,
        );

        let physical = window.inner_size();
        let gpu = init_gpu(window.clone(), physical.width, physical.height)?;

        let (sw, sh) = scene_size(physical, window.scale_factor(), self.config.max_pixel_ratio);
        log::info!(
            "Window {}x{} (scale {:.2}), scene {}x{}",
            physical.width,
            physical.height,
            window.scale_factor(),
            sw,
            sh
        );

        let target = ScaledTarget::new(&gpu.device, gpu.surface_format, sw, sh)?;
        let renderer = Renderer::new(
            &gpu.device,
            &gpu.queue,
            gpu.surface_format,
            sw,
            sh,
            &self.config,
            &self.assets,
        )?;

        let camera = OrbitCamera::from_config(&self.config);
        log::info!(
            "Orbit controls {}",
            if camera.orbit_enabled() { "enabled" } else { "disabled" }
        );

        Ok(ViewerState {
            window,
            gpu,
            target,
            renderer,
            camera,
            input: InputState::new(),
            clock: Instant::now(),
            frames: 0,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let max_ratio = self.config.max_pixel_ratio;
        let Some(state) = &mut self.state else { return };
        if size.width == 0 || size.height == 0 {
            return;
        }
        state.gpu.resize(size.width, size.height);
        let (sw, sh) = scene_size(size, state.window.scale_factor(), max_ratio);
        state.target.resize(&state.gpu.device, sw, sh);
        state.renderer.resize(&state.gpu.device, sw, sh);
        log::debug!("Resized to {}x{}, scene {}x{}", size.width, size.height, sw, sh);
    }

    fn render_frame(&mut self) {
        let Some(state) = &mut self.state else { return };
        let ViewerState {
            gpu,
            target,
            renderer,
            camera,
            input,
            clock,
            frames,
            ..
        } = state;

        if input.orbiting() {
            camera.orbit(input.mouse_dx, input.mouse_dy);
        } else if input.panning() {
            camera.pan(input.mouse_dx, input.mouse_dy);
        }
        if input.scroll_delta != 0.0 {
            camera.zoom(input.scroll_delta);
        }
        input.clear_deltas();
        camera.update();

        let eye = camera.eye_position();
        log::debug!(
            "Camera eye ({:.2}, {:.2}, {:.2}) target ({:.2}, {:.2}, {:.2}) yaw {:.3} pitch {:.3}",
            eye.x,
            eye.y,
            eye.z,
            camera.target.x,
            camera.target.y,
            camera.target.z,
            camera.yaw,
            camera.pitch
        );

        let elapsed = clock.elapsed().as_secs_f32();
        renderer.update_frame(&gpu.queue, camera, elapsed);

        // Get surface texture, handle Lost/Outdated by reconfiguring
        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                gpu.reconfigure();
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
                return;
            }
            Err(e) => {
                let error = ReliefError::SurfaceTextureError(format!("{e:?}"));
                self.fail(error);
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });
        renderer.render(&mut encoder, target.view());
        target.blit(&mut encoder, &view);
        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        *frames += 1;
        if let Some(limit) = self.frame_limit {
            if *frames >= limit {
                log::info!("Rendered {} frames, exiting", frames);
                self.stop.request_stop();
            }
        }
    }
}

impl ApplicationHandler for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                self.fail(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Shutting down");
                self.stop.request_stop();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                self.stop.request_stop();
            }
            WindowEvent::Resized(size) => self.resize(size),
            WindowEvent::RedrawRequested => self.render_frame(),
            other => {
                let Some(state) = &mut self.state else { return };
                match other {
                    WindowEvent::MouseInput { state: s, button, .. } => {
                        state.input.on_button(button, s);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        state.input.on_cursor_moved(position.x, position.y);
                    }
                    WindowEvent::CursorLeft { .. } => state.input.on_cursor_left(),
                    WindowEvent::MouseWheel { delta, .. } => state.input.on_wheel(delta),
                    _ => {}
                }
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.stop.is_stopped() {
            event_loop.exit();
            return;
        }
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_size_unclamped_at_low_density() {
        let size = PhysicalSize::new(1280, 720);
        assert_eq!(scene_size(size, 1.0, 2.0), (1280, 720));
        assert_eq!(scene_size(PhysicalSize::new(2560, 1440), 2.0, 2.0), (2560, 1440));
    }

    #[test]
    fn test_scene_size_clamps_pixel_ratio() {
        // 1280x720 logical at 3x density renders as if at 2x
        let size = PhysicalSize::new(3840, 2160);
        assert_eq!(scene_size(size, 3.0, 2.0), (2560, 1440));
    }

    #[test]
    fn test_stop_handle_shared_between_clones() {
        let viewer = Viewer::new(
            SceneConfig::harbour(),
            SceneAssets::synthetic(4),
            (640, 480),
            None,
        );
        let handle = viewer.stop_handle();
        assert!(!viewer.stop.is_stopped());
        handle.request_stop();
        assert!(viewer.stop.is_stopped());
    }

    #[test]
    fn test_fail_stops_loop_and_keeps_error() {
        let mut viewer = Viewer::new(
            SceneConfig::harbour(),
            SceneAssets::synthetic(4),
            (640, 480),
            Some(1),
        );
        viewer.fail(ReliefError::WindowFailed("gone".into()));
        assert!(viewer.stop_handle().is_stopped());
        assert!(viewer.into_result().is_err());
    }

    #[test]
    fn test_scene_size_never_zero() {
        assert_eq!(scene_size(PhysicalSize::new(0, 0), 1.0, 2.0), (1, 1));
    }
}
