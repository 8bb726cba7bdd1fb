use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Pixels per scroll line when the platform reports line deltas.
const LINE_DELTA: f32 = 20.0;

/// Accumulated input state read each frame by the application.
#[derive(Debug, Default)]
pub struct InputState {
    pub mouse_dx: f32,
    pub mouse_dy: f32,
    pub scroll_delta: f32,
    pub left_button_down: bool,
    pub middle_button_down: bool,
    pub right_button_down: bool,
    last_cursor: Option<(f64, f64)>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        let down = state == ElementState::Pressed;
        match button {
            MouseButton::Left => self.left_button_down = down,
            MouseButton::Middle => self.middle_button_down = down,
            MouseButton::Right => self.right_button_down = down,
            _ => {}
        }
    }

    /// Track the cursor; deltas accumulate until `clear_deltas`.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        if let Some((lx, ly)) = self.last_cursor {
            self.mouse_dx += (x - lx) as f32;
            self.mouse_dy += (y - ly) as f32;
        }
        self.last_cursor = Some((x, y));
    }

    pub fn on_cursor_left(&mut self) {
        self.last_cursor = None;
    }

    /// Positive values scroll away from the user (zoom in).
    pub fn on_wheel(&mut self, delta: MouseScrollDelta) {
        self.scroll_delta += match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(p) => p.y as f32 / LINE_DELTA,
        };
    }

    /// Whether a drag should orbit (left) or pan (right or middle).
    pub fn orbiting(&self) -> bool {
        self.left_button_down
    }

    pub fn panning(&self) -> bool {
        !self.left_button_down && (self.right_button_down || self.middle_button_down)
    }

    /// Clear per-frame deltas (called after camera update consumes them).
    pub fn clear_deltas(&mut self) {
        self.mouse_dx = 0.0;
        self.mouse_dy = 0.0;
        self.scroll_delta = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_deltas_accumulate() {
        let mut input = InputState::new();
        input.on_cursor_moved(10.0, 10.0);
        assert_eq!(input.mouse_dx, 0.0);
        input.on_cursor_moved(15.0, 8.0);
        input.on_cursor_moved(20.0, 8.0);
        assert_eq!(input.mouse_dx, 10.0);
        assert_eq!(input.mouse_dy, -2.0);
        input.clear_deltas();
        assert_eq!(input.mouse_dx, 0.0);
    }

    #[test]
    fn test_cursor_reentry_does_not_jump() {
        let mut input = InputState::new();
        input.on_cursor_moved(0.0, 0.0);
        input.on_cursor_left();
        input.on_cursor_moved(500.0, 500.0);
        assert_eq!(input.mouse_dx, 0.0);
    }

    #[test]
    fn test_buttons_select_drag_mode() {
        let mut input = InputState::new();
        input.on_button(MouseButton::Right, ElementState::Pressed);
        assert!(input.panning());
        input.on_button(MouseButton::Left, ElementState::Pressed);
        assert!(input.orbiting());
        assert!(!input.panning());
        input.on_button(MouseButton::Left, ElementState::Released);
        input.on_button(MouseButton::Right, ElementState::Released);
        assert!(!input.orbiting() && !input.panning());
    }

    #[test]
    fn test_wheel_lines() {
        let mut input = InputState::new();
        input.on_wheel(MouseScrollDelta::LineDelta(0.0, 2.0));
        assert_eq!(input.scroll_delta, 2.0);
    }
}
