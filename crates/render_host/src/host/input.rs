//! The host's event sink
//!
//! Two independent channels drive the host. Discrete key presses flip
//! settings here, exactly once per press. Held-key movement is polled by the
//! host each frame and never passes through this sink.

use super::navigation::NavigationState;
use super::settings::RuntimeSettings;
use super::touch::{FingerTrackState, TouchGesture};
use crate::events::{EventSink, MultiTouchGesture, TouchPhase};
use crate::input::{Key, KeyAction, Modifiers};

/// How pointer and touch motion maps onto the camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookControls {
    /// Degrees per pixel
    pub sensitivity: f32,
    /// World units per pixel of pinch spread
    pub pinch_scale: f32,
    /// Negate horizontal look
    pub invert_x: bool,
    /// Negate vertical look
    pub invert_y: bool,
}

impl Default for LookControls {
    fn default() -> Self {
        Self {
            sensitivity: 0.3,
            pinch_scale: 0.05,
            invert_x: false,
            invert_y: false,
        }
    }
}

/// Host state mutated by input events
#[derive(Debug, Clone)]
pub struct HostInput {
    /// Camera pose
    pub nav: NavigationState,
    /// Runtime settings
    pub settings: RuntimeSettings,
    /// Pointer mapping
    pub controls: LookControls,
    fingers: FingerTrackState,
    running: bool,
    cursor_inside: bool,
    window_size: (u32, u32),
    pending_resize: Option<(u32, u32)>,
}

impl HostInput {
    /// Input state starting from the given camera and settings
    pub fn new(nav: NavigationState, settings: RuntimeSettings, controls: LookControls) -> Self {
        Self {
            nav,
            settings,
            controls,
            fingers: FingerTrackState::new(),
            running: false,
            cursor_inside: false,
            window_size: (0, 0),
            pending_resize: None,
        }
    }

    /// Whether the render loop should continue
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start or stop the render loop
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Whether the cursor is over the window
    pub fn cursor_inside(&self) -> bool {
        self.cursor_inside
    }

    /// Last window size reported by the backend
    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    /// Take the resize reported since the last call, if any
    pub fn take_resize(&mut self) -> Option<(u32, u32)> {
        self.pending_resize.take()
    }

    /// Reset per-window state for a freshly created window of `size`
    pub fn attach_window(&mut self, size: (u32, u32)) {
        self.fingers.clear();
        self.cursor_inside = false;
        self.window_size = size;
        self.pending_resize = None;
    }

    fn look(&mut self, dx: f32, dy: f32) {
        let LookControls {
            sensitivity,
            invert_x,
            invert_y,
            ..
        } = self.controls;
        let dx = if invert_x { -dx } else { dx };
        let dy = if invert_y { -dy } else { dy };
        self.nav.look(dx * sensitivity, dy * sensitivity);
    }

    fn handle_action_key(&mut self, key: Key) {
        let settings = &mut self.settings;
        match key {
            Key::Escape => self.running = false,
            Key::Space => settings.cycle_freeze_mode(),
            Key::F1 => settings.toggle_help(),
            Key::F2 => settings.cycle_stat_mode(),
            Key::F3 => settings.cycle_pipeline(),
            Key::F4 => settings.set_debug_view(!settings.debug_view()),
            Key::F5 => settings.set_wireframe(!settings.wireframe()),
            Key::F6 => settings.step_sample_count(),
            Key::F11 => settings.toggle_fullscreen(),
            _ => return,
        }
        log::debug!("{key:?} pressed");
    }
}

impl EventSink for HostInput {
    fn on_key(&mut self, key: Key, action: KeyAction, _mods: Modifiers) {
        if action != KeyAction::Press {
            return;
        }
        if self.settings.benchmark() && key != Key::Escape {
            return;
        }
        self.handle_action_key(key);
    }

    fn on_mouse_move(&mut self, x: f32, y: f32, prev_x: f32, prev_y: f32) {
        if self.settings.camera_locked() {
            return;
        }
        self.look(x - prev_x, prev_y - y);
    }

    fn on_mouse_enter(&mut self, entered: bool) {
        self.cursor_inside = entered;
    }

    fn on_touch(&mut self, phase: TouchPhase, finger: u64, x: f32, y: f32) {
        let gesture = self.fingers.handle(phase, finger, x, y);
        if self.settings.camera_locked() {
            return;
        }
        match gesture {
            TouchGesture::None => {}
            TouchGesture::Look { dx, dy } => self.look(dx, dy),
            TouchGesture::Pinch { delta } => self.nav.translate_forward(delta * self.controls.pinch_scale),
        }
    }

    fn on_multi_touch(&mut self, gesture: MultiTouchGesture) {
        if self.settings.camera_locked() || gesture.fingers < 2 {
            return;
        }
        // Platform pinch is a relative spread change; express it in pixels
        let extent = self.window_size.0.min(self.window_size.1) as f32;
        self.nav.translate_forward(gesture.pinch * extent * self.controls.pinch_scale);
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.window_size = (width, height);
        self.pending_resize = Some((width, height));
    }

    fn on_quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::view_direction;
    use crate::host::settings::PipelineKind;
    use approx::assert_relative_eq;

    fn running_input() -> HostInput {
        let mut input = HostInput::new(
            NavigationState::default(),
            RuntimeSettings::default(),
            LookControls::default(),
        );
        input.set_running(true);
        input
    }

    fn press(input: &mut HostInput, key: Key) {
        input.on_key(key, KeyAction::Press, Modifiers::empty());
        input.on_key(key, KeyAction::Repeat, Modifiers::empty());
        input.on_key(key, KeyAction::Release, Modifiers::empty());
    }

    #[test]
    fn test_actions_fire_once_per_press() {
        let mut input = running_input();
        press(&mut input, Key::F1);
        assert!(input.settings.show_help());
        press(&mut input, Key::F3);
        assert_eq!(input.settings.pipeline(), PipelineKind::Deferred);
        assert!(input.settings.is_dirty());
    }

    #[test]
    fn test_escape_and_close_stop_the_loop() {
        let mut input = running_input();
        press(&mut input, Key::Escape);
        assert!(!input.is_running());

        let mut input = running_input();
        input.on_quit();
        assert!(!input.is_running());
    }

    #[test]
    fn test_benchmark_only_honours_escape() {
        let mut input = HostInput::new(
            NavigationState::default(),
            RuntimeSettings::default().with_benchmark(10),
            LookControls::default(),
        );
        input.set_running(true);
        press(&mut input, Key::F3);
        press(&mut input, Key::F11);
        assert!(!input.settings.is_dirty());
        press(&mut input, Key::Escape);
        assert!(!input.is_running());
    }

    #[test]
    fn test_mouse_look_respects_freeze_and_invert() {
        let mut input = running_input();
        let start = input.nav;
        input.on_mouse_move(110.0, 100.0, 100.0, 100.0);
        assert!((input.nav.yaw - (start.yaw - 3.0)).abs() < 1e-5);

        input.controls.invert_y = true;
        input.on_mouse_move(110.0, 90.0, 110.0, 100.0);
        assert!((input.nav.pitch - (start.pitch - 3.0)).abs() < 1e-5);

        press(&mut input, Key::Space);
        press(&mut input, Key::Space);
        let frozen = input.nav;
        input.on_mouse_move(500.0, 500.0, 0.0, 0.0);
        assert_eq!(input.nav, frozen);
    }

    #[test]
    fn test_pinch_moves_camera() {
        let mut input = running_input();
        let start = input.nav.position;
        input.on_touch(TouchPhase::Down, 1, 0.0, 0.0);
        input.on_touch(TouchPhase::Down, 2, 100.0, 0.0);
        input.on_touch(TouchPhase::Moved, 2, 200.0, 0.0);
        assert!((input.nav.position - start).norm() > 1.0);
        assert_eq!(input.nav.yaw, NavigationState::default().yaw);
    }

    #[test]
    fn test_resize_is_recorded_once() {
        let mut input = running_input();
        input.on_resize(800, 600);
        input.on_resize(0, 600);
        assert_eq!(input.window_size(), (800, 600));
        assert_eq!(input.take_resize(), Some((800, 600)));
        assert_eq!(input.take_resize(), None);
    }

    fn pinch(pinch: f32, fingers: u8) -> MultiTouchGesture {
        MultiTouchGesture {
            pinch,
            rotation: 0.0,
            fingers,
        }
    }

    #[test]
    fn test_native_pinch_scales_by_short_window_side() {
        let mut input = running_input();
        input.attach_window((800, 600));
        let start = input.nav;

        input.on_multi_touch(pinch(0.1, 2));
        // 0.1 of the 600 pixel side at 0.05 units per pixel
        let expected = start.position + view_direction(start.pitch, start.yaw) * 3.0;
        assert_relative_eq!(input.nav.position, expected, epsilon = 1e-4);
        assert_eq!(input.nav.yaw, start.yaw);

        input.on_multi_touch(pinch(-0.1, 3));
        assert_relative_eq!(input.nav.position, start.position, epsilon = 1e-4);
    }

    #[test]
    fn test_native_pinch_needs_two_fingers() {
        let mut input = running_input();
        input.attach_window((800, 600));
        let start = input.nav;
        input.on_multi_touch(pinch(0.5, 1));
        input.on_multi_touch(pinch(0.5, 0));
        assert_eq!(input.nav, start);
    }

    #[test]
    fn test_native_pinch_ignored_while_camera_locked() {
        let mut input = running_input();
        input.attach_window((800, 600));
        press(&mut input, Key::Space);
        press(&mut input, Key::Space);
        let frozen = input.nav;
        input.on_multi_touch(pinch(0.5, 2));
        assert_eq!(input.nav, frozen);

        let mut input = HostInput::new(
            NavigationState::default(),
            RuntimeSettings::default().with_benchmark(10),
            LookControls::default(),
        );
        input.attach_window((800, 600));
        input.on_multi_touch(pinch(0.5, 2));
        assert_eq!(input.nav, NavigationState::default());
    }

    #[test]
    fn test_cursor_enter_and_leave() {
        let mut input = running_input();
        input.on_mouse_enter(true);
        assert!(input.cursor_inside());
        input.on_mouse_enter(false);
        assert!(!input.cursor_inside());

        input.on_mouse_enter(true);
        input.attach_window((640, 480));
        assert!(!input.cursor_inside());
    }
}
