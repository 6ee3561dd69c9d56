//! Normalized event model
//!
//! Backends translate native window-system events into [`InputEvent`]s in the
//! canonical code space, then hand the batch collected during one pump to an
//! [`EventDispatcher`], which delivers them to the host's [`EventSink`].
//!
//! Delivery rules for one pump:
//! - events arrive in native queue order, at most one sink call each;
//! - cursor motion is coalesced: only the last position of the batch is
//!   delivered, at the place of that last motion event, together with the
//!   previously delivered position so the sink can compute a delta.

use crate::input::{Key, KeyAction, Modifiers, MouseButton};
use serde::{Deserialize, Serialize};

/// Phase of a single-finger touch event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TouchPhase {
    /// Finger went down
    Down,
    /// Finger moved
    Moved,
    /// Finger lifted
    Up,
    /// Touch cancelled by the system; treated like `Up`
    Cancelled,
}

/// Gesture recognised natively by the platform from several fingers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiTouchGesture {
    /// Relative change in finger spread; positive when fingers move apart
    pub pinch: f32,
    /// Rotation in degrees since the previous gesture event
    pub rotation: f32,
    /// Number of fingers participating
    pub fingers: u8,
}

/// One normalized input or window event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Key state change
    Key {
        /// Canonical key
        key: Key,
        /// Press, release or repeat
        action: KeyAction,
        /// Modifiers held at the time
        mods: Modifiers,
    },
    /// Cursor moved to a window-relative position
    CursorMoved {
        /// X in window pixels
        x: f32,
        /// Y in window pixels
        y: f32,
    },
    /// Mouse button state change
    MouseButton {
        /// Canonical button
        button: MouseButton,
        /// Press or release
        action: KeyAction,
        /// Click count reported by the platform (1 when unknown)
        clicks: u8,
    },
    /// Scroll wheel movement
    MouseWheel {
        /// Horizontal scroll
        dx: f32,
        /// Vertical scroll
        dy: f32,
    },
    /// Cursor entered (`true`) or left (`false`) the window
    CursorEnter(bool),
    /// Single-finger touch
    Touch {
        /// Touch phase
        phase: TouchPhase,
        /// Platform finger identifier, stable while the finger is down
        finger: u64,
        /// X in window pixels
        x: f32,
        /// Y in window pixels
        y: f32,
    },
    /// Native multi-finger gesture
    MultiTouch(MultiTouchGesture),
    /// Window was resized by the user or the window manager
    Resized {
        /// New width in pixels
        width: u32,
        /// New height in pixels
        height: u32,
    },
    /// User asked the application to close
    QuitRequested,
}

/// Callback slots a host implements to receive normalized input
///
/// Every slot has an empty default: backends without touch support simply
/// never call the touch slots, and sinks only override what they use.
pub trait EventSink {
    /// Key pressed, released or repeated
    fn on_key(&mut self, _key: Key, _action: KeyAction, _mods: Modifiers) {}

    /// Cursor moved from `(prev_x, prev_y)` to `(x, y)`
    fn on_mouse_move(&mut self, _x: f32, _y: f32, _prev_x: f32, _prev_y: f32) {}

    /// Mouse button pressed or released
    fn on_mouse_button(&mut self, _button: MouseButton, _action: KeyAction, _clicks: u8) {}

    /// Scroll wheel moved
    fn on_mouse_wheel(&mut self, _dx: f32, _dy: f32) {}

    /// Cursor entered or left the window
    fn on_mouse_enter(&mut self, _entered: bool) {}

    /// Single-finger touch event
    fn on_touch(&mut self, _phase: TouchPhase, _finger: u64, _x: f32, _y: f32) {}

    /// Native multi-finger gesture
    fn on_multi_touch(&mut self, _gesture: MultiTouchGesture) {}

    /// Window resized to `width` x `height`
    fn on_resize(&mut self, _width: u32, _height: u32) {}

    /// Close requested
    fn on_quit(&mut self) {}
}

/// Delivers a pump's worth of events to a sink, coalescing cursor motion
#[derive(Debug, Default, Clone)]
pub struct EventDispatcher {
    last_cursor: Option<(f32, f32)>,
}

impl EventDispatcher {
    /// Create a dispatcher with no cursor history
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous cursor position (new window)
    pub fn reset(&mut self) {
        self.last_cursor = None;
    }

    /// Deliver `events` to `sink`, returning the number of sink calls made
    pub fn dispatch(&mut self, events: &[InputEvent], sink: &mut dyn EventSink) -> usize {
        let last_motion = events
            .iter()
            .rposition(|event| matches!(event, InputEvent::CursorMoved { .. }));

        let mut delivered = 0;
        for (index, event) in events.iter().enumerate() {
            match *event {
                InputEvent::CursorMoved { x, y } => {
                    if Some(index) != last_motion {
                        continue;
                    }
                    let (prev_x, prev_y) = self.last_cursor.unwrap_or((x, y));
                    self.last_cursor = Some((x, y));
                    sink.on_mouse_move(x, y, prev_x, prev_y);
                }
                InputEvent::Key { key, action, mods } => sink.on_key(key, action, mods),
                InputEvent::MouseButton { button, action, clicks } => {
                    sink.on_mouse_button(button, action, clicks);
                }
                InputEvent::MouseWheel { dx, dy } => sink.on_mouse_wheel(dx, dy),
                InputEvent::CursorEnter(entered) => sink.on_mouse_enter(entered),
                InputEvent::Touch { phase, finger, x, y } => sink.on_touch(phase, finger, x, y),
                InputEvent::MultiTouch(gesture) => sink.on_multi_touch(gesture),
                InputEvent::Resized { width, height } => sink.on_resize(width, height),
                InputEvent::QuitRequested => sink.on_quit(),
            }
            delivered += 1;
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl EventSink for Recorder {
        fn on_key(&mut self, key: Key, action: KeyAction, _mods: Modifiers) {
            self.calls.push(format!("key {key:?} {action:?}"));
        }

        fn on_mouse_move(&mut self, x: f32, y: f32, prev_x: f32, prev_y: f32) {
            self.calls.push(format!("move {x} {y} from {prev_x} {prev_y}"));
        }

        fn on_resize(&mut self, width: u32, height: u32) {
            self.calls.push(format!("resize {width}x{height}"));
        }

        fn on_quit(&mut self) {
            self.calls.push("quit".to_string());
        }
    }

    fn key(key: Key, action: KeyAction) -> InputEvent {
        InputEvent::Key { key, action, mods: Modifiers::empty() }
    }

    #[test]
    fn test_preserves_queue_order() {
        let mut dispatcher = EventDispatcher::new();
        let mut sink = Recorder::default();
        let events = [
            key(Key::F1, KeyAction::Press),
            InputEvent::Resized { width: 800, height: 600 },
            key(Key::F1, KeyAction::Release),
            InputEvent::QuitRequested,
        ];

        assert_eq!(dispatcher.dispatch(&events, &mut sink), 4);
        assert_eq!(sink.calls, vec!["key F1 Press", "resize 800x600", "key F1 Release", "quit"]);
    }

    #[test]
    fn test_cursor_motion_is_coalesced_at_last_position() {
        let mut dispatcher = EventDispatcher::new();
        let mut sink = Recorder::default();
        let events = [
            InputEvent::CursorMoved { x: 1.0, y: 1.0 },
            key(Key::A, KeyAction::Press),
            InputEvent::CursorMoved { x: 5.0, y: 2.0 },
            InputEvent::CursorMoved { x: 9.0, y: 4.0 },
            key(Key::A, KeyAction::Release),
        ];

        assert_eq!(dispatcher.dispatch(&events, &mut sink), 3);
        assert_eq!(sink.calls, vec!["key A Press", "move 9 4 from 9 4", "key A Release"]);

        dispatcher.dispatch(&[InputEvent::CursorMoved { x: 10.0, y: 6.0 }], &mut sink);
        assert_eq!(sink.calls.last().map(String::as_str), Some("move 10 6 from 9 4"));
    }

    #[test]
    fn test_unused_slots_are_noops() {
        let mut dispatcher = EventDispatcher::new();
        let mut sink = Recorder::default();
        let events = [
            InputEvent::Touch { phase: TouchPhase::Down, finger: 3, x: 0.0, y: 0.0 },
            InputEvent::MultiTouch(MultiTouchGesture { pinch: 0.1, rotation: 0.0, fingers: 2 }),
            InputEvent::CursorEnter(true),
        ];

        assert_eq!(dispatcher.dispatch(&events, &mut sink), 3);
        assert!(sink.calls.is_empty());
    }

    #[test]
    fn test_reset_forgets_cursor() {
        let mut dispatcher = EventDispatcher::new();
        let mut sink = Recorder::default();
        dispatcher.dispatch(&[InputEvent::CursorMoved { x: 3.0, y: 3.0 }], &mut sink);
        dispatcher.reset();
        dispatcher.dispatch(&[InputEvent::CursorMoved { x: 7.0, y: 8.0 }], &mut sink);
        assert_eq!(sink.calls.last().map(String::as_str), Some("move 7 8 from 7 8"));
    }

    #[test]
    fn test_script_round_trips_through_ron() {
        let script = vec![
            key(Key::W, KeyAction::Press),
            InputEvent::Touch { phase: TouchPhase::Moved, finger: 1, x: 4.5, y: 2.0 },
        ];
        let text = ron::to_string(&script).expect("serialize");
        let back: Vec<InputEvent> = ron::from_str(&text).expect("deserialize");
        assert_eq!(back, script);
    }
}
