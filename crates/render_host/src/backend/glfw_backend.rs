//! GLFW backend
//!
//! Lightweight desktop windowing. One `Glfw` instance lives from the first
//! `init` to `release`; every window gets its own event receiver, drained
//! per window on each pump.

use super::{
    log_rejected_profile, Backend, BackendCapabilities, BackendError, BackendResult, CapabilityProfile, RenderApi,
    WindowHandle, WindowSpec,
};
use crate::events::{EventDispatcher, EventSink, InputEvent};
use crate::input::{CodeTable, Key, KeyAction, Modifiers, MouseButton};
use glfw::Context;
use slotmap::SlotMap;

const NAME: &str = "glfw";

static KEYS: CodeTable<glfw::Key, Key> = CodeTable::new(&[
    (glfw::Key::Space, Key::Space),
    (glfw::Key::Apostrophe, Key::Apostrophe),
    (glfw::Key::Comma, Key::Comma),
    (glfw::Key::Minus, Key::Minus),
    (glfw::Key::Period, Key::Period),
    (glfw::Key::Slash, Key::Slash),
    (glfw::Key::Num0, Key::Num0),
    (glfw::Key::Num1, Key::Num1),
    (glfw::Key::Num2, Key::Num2),
    (glfw::Key::Num3, Key::Num3),
    (glfw::Key::Num4, Key::Num4),
    (glfw::Key::Num5, Key::Num5),
    (glfw::Key::Num6, Key::Num6),
    (glfw::Key::Num7, Key::Num7),
    (glfw::Key::Num8, Key::Num8),
    (glfw::Key::Num9, Key::Num9),
    (glfw::Key::Semicolon, Key::Semicolon),
    (glfw::Key::Equal, Key::Equal),
    (glfw::Key::A, Key::A),
    (glfw::Key::B, Key::B),
    (glfw::Key::C, Key::C),
    (glfw::Key::D, Key::D),
    (glfw::Key::E, Key::E),
    (glfw::Key::F, Key::F),
    (glfw::Key::G, Key::G),
    (glfw::Key::H, Key::H),
    (glfw::Key::I, Key::I),
    (glfw::Key::J, Key::J),
    (glfw::Key::K, Key::K),
    (glfw::Key::L, Key::L),
    (glfw::Key::M, Key::M),
    (glfw::Key::N, Key::N),
    (glfw::Key::O, Key::O),
    (glfw::Key::P, Key::P),
    (glfw::Key::Q, Key::Q),
    (glfw::Key::R, Key::R),
    (glfw::Key::S, Key::S),
    (glfw::Key::T, Key::T),
    (glfw::Key::U, Key::U),
    (glfw::Key::V, Key::V),
    (glfw::Key::W, Key::W),
    (glfw::Key::X, Key::X),
    (glfw::Key::Y, Key::Y),
    (glfw::Key::Z, Key::Z),
    (glfw::Key::LeftBracket, Key::LeftBracket),
    (glfw::Key::Backslash, Key::Backslash),
    (glfw::Key::RightBracket, Key::RightBracket),
    (glfw::Key::GraveAccent, Key::GraveAccent),
    (glfw::Key::World1, Key::World1),
    (glfw::Key::World2, Key::World2),
    (glfw::Key::Escape, Key::Escape),
    (glfw::Key::Enter, Key::Enter),
    (glfw::Key::Tab, Key::Tab),
    (glfw::Key::Backspace, Key::Backspace),
    (glfw::Key::Insert, Key::Insert),
    (glfw::Key::Delete, Key::Delete),
    (glfw::Key::Right, Key::Right),
    (glfw::Key::Left, Key::Left),
    (glfw::Key::Down, Key::Down),
    (glfw::Key::Up, Key::Up),
    (glfw::Key::PageUp, Key::PageUp),
    (glfw::Key::PageDown, Key::PageDown),
    (glfw::Key::Home, Key::Home),
    (glfw::Key::End, Key::End),
    (glfw::Key::CapsLock, Key::CapsLock),
    (glfw::Key::ScrollLock, Key::ScrollLock),
    (glfw::Key::NumLock, Key::NumLock),
    (glfw::Key::PrintScreen, Key::PrintScreen),
    (glfw::Key::Pause, Key::Pause),
    (glfw::Key::F1, Key::F1),
    (glfw::Key::F2, Key::F2),
    (glfw::Key::F3, Key::F3),
    (glfw::Key::F4, Key::F4),
    (glfw::Key::F5, Key::F5),
    (glfw::Key::F6, Key::F6),
    (glfw::Key::F7, Key::F7),
    (glfw::Key::F8, Key::F8),
    (glfw::Key::F9, Key::F9),
    (glfw::Key::F10, Key::F10),
    (glfw::Key::F11, Key::F11),
    (glfw::Key::F12, Key::F12),
    (glfw::Key::F13, Key::F13),
    (glfw::Key::F14, Key::F14),
    (glfw::Key::F15, Key::F15),
    (glfw::Key::F16, Key::F16),
    (glfw::Key::F17, Key::F17),
    (glfw::Key::F18, Key::F18),
    (glfw::Key::F19, Key::F19),
    (glfw::Key::F20, Key::F20),
    (glfw::Key::F21, Key::F21),
    (glfw::Key::F22, Key::F22),
    (glfw::Key::F23, Key::F23),
    (glfw::Key::F24, Key::F24),
    (glfw::Key::F25, Key::F25),
    (glfw::Key::Kp0, Key::Kp0),
    (glfw::Key::Kp1, Key::Kp1),
    (glfw::Key::Kp2, Key::Kp2),
    (glfw::Key::Kp3, Key::Kp3),
    (glfw::Key::Kp4, Key::Kp4),
    (glfw::Key::Kp5, Key::Kp5),
    (glfw::Key::Kp6, Key::Kp6),
    (glfw::Key::Kp7, Key::Kp7),
    (glfw::Key::Kp8, Key::Kp8),
    (glfw::Key::Kp9, Key::Kp9),
    (glfw::Key::KpDecimal, Key::KpDecimal),
    (glfw::Key::KpDivide, Key::KpDivide),
    (glfw::Key::KpMultiply, Key::KpMultiply),
    (glfw::Key::KpSubtract, Key::KpSubtract),
    (glfw::Key::KpAdd, Key::KpAdd),
    (glfw::Key::KpEnter, Key::KpEnter),
    (glfw::Key::KpEqual, Key::KpEqual),
    (glfw::Key::LeftShift, Key::LeftShift),
    (glfw::Key::LeftControl, Key::LeftControl),
    (glfw::Key::LeftAlt, Key::LeftAlt),
    (glfw::Key::LeftSuper, Key::LeftSuper),
    (glfw::Key::RightShift, Key::RightShift),
    (glfw::Key::RightControl, Key::RightControl),
    (glfw::Key::RightAlt, Key::RightAlt),
    (glfw::Key::RightSuper, Key::RightSuper),
    (glfw::Key::Menu, Key::Menu),
]);

static BUTTONS: CodeTable<glfw::MouseButton, MouseButton> = CodeTable::new(&[
    (glfw::MouseButton::Button1, MouseButton::Left),
    (glfw::MouseButton::Button2, MouseButton::Right),
    (glfw::MouseButton::Button3, MouseButton::Middle),
    (glfw::MouseButton::Button4, MouseButton::Button4),
    (glfw::MouseButton::Button5, MouseButton::Button5),
    (glfw::MouseButton::Button6, MouseButton::Button6),
    (glfw::MouseButton::Button7, MouseButton::Button7),
    (glfw::MouseButton::Button8, MouseButton::Button8),
]);

struct GlfwWindowSlot {
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    dispatcher: EventDispatcher,
}

/// Backend on top of GLFW
#[derive(Default)]
pub struct GlfwBackend {
    glfw: Option<glfw::Glfw>,
    profile: Option<CapabilityProfile>,
    windows: SlotMap<WindowHandle, GlfwWindowSlot>,
}

impl GlfwBackend {
    /// Create an uninitialized backend
    pub fn new() -> Self {
        Self::default()
    }

    fn apply_hints(glfw: &mut glfw::Glfw, profile: &CapabilityProfile) {
        use glfw::WindowHint;

        glfw.default_window_hints();
        glfw.window_hint(WindowHint::RedBits(Some(profile.red_bits)));
        glfw.window_hint(WindowHint::GreenBits(Some(profile.green_bits)));
        glfw.window_hint(WindowHint::BlueBits(Some(profile.blue_bits)));
        glfw.window_hint(WindowHint::AlphaBits(Some(profile.alpha_bits)));
        glfw.window_hint(WindowHint::DepthBits(Some(profile.depth_bits)));
        glfw.window_hint(WindowHint::StencilBits(Some(8)));
        glfw.window_hint(samples_hint(profile));
        glfw.window_hint(WindowHint::ContextVersion(profile.major, profile.minor));

        match profile.api {
            RenderApi::OpenGl2 => {
                glfw.window_hint(WindowHint::ClientApi(glfw::ClientApiHint::OpenGl));
            }
            RenderApi::OpenGl4 => {
                glfw.window_hint(WindowHint::ClientApi(glfw::ClientApiHint::OpenGl));
                let hint = if profile.compatibility_profile {
                    glfw::OpenGlProfileHint::Compat
                } else {
                    glfw::OpenGlProfileHint::Core
                };
                glfw.window_hint(WindowHint::OpenGlProfile(hint));
                glfw.window_hint(WindowHint::OpenGlDebugContext(profile.debug_context));
                #[cfg(target_os = "macos")]
                glfw.window_hint(WindowHint::OpenGlForwardCompat(!profile.compatibility_profile));
            }
            RenderApi::OpenGlEs3 => {
                glfw.window_hint(WindowHint::ClientApi(glfw::ClientApiHint::OpenGlEs));
                glfw.window_hint(WindowHint::ContextCreationApi(glfw::ContextCreationApi::Egl));
            }
        }
    }

    fn slot(&self, handle: WindowHandle) -> Option<&GlfwWindowSlot> {
        self.windows.get(handle)
    }
}

impl Backend for GlfwBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            touch: false,
            multi_touch: false,
            embedded_api: true,
        }
    }

    fn init(&mut self, profile: &CapabilityProfile) -> BackendResult<()> {
        profile.validate()?;

        if self.glfw.is_none() {
            let glfw = glfw::init(glfw::log_errors)
                .map_err(|e| BackendError::Environment(format!("GLFW initialization failed: {e:?}")))?;
            log::info!("[{NAME}] initialized GLFW {}", glfw::get_version_string());
            self.glfw = Some(glfw);
        }

        log::debug!("[{NAME}] window hints set for {profile}");
        self.profile = Some(*profile);
        Ok(())
    }

    fn release(&mut self) {
        let destroyed = self.windows.len();
        self.windows.clear();
        self.profile = None;
        if self.glfw.take().is_some() {
            log::info!("[{NAME}] released ({destroyed} window(s) destroyed)");
        }
    }

    fn create_window(&mut self, spec: &WindowSpec) -> BackendResult<WindowHandle> {
        let (Some(glfw), Some(profile)) = (self.glfw.as_mut(), self.profile) else {
            return Err(BackendError::NotInitialized);
        };

        Self::apply_hints(glfw, &profile);
        glfw.window_hint(glfw::WindowHint::Resizable(true));

        let created = if spec.fullscreen {
            glfw.with_primary_monitor(|glfw, monitor| {
                let monitor = monitor?;
                let mode = monitor.get_video_mode()?;
                glfw.create_window(mode.width, mode.height, &spec.title, glfw::WindowMode::FullScreen(monitor))
            })
        } else {
            glfw.create_window(spec.width, spec.height, &spec.title, glfw::WindowMode::Windowed)
        };

        let Some((mut window, events)) = created else {
            let reason = "the driver rejected the requested context or surface";
            log_rejected_profile(NAME, &profile, reason);
            return Err(BackendError::WindowCreation {
                profile,
                reason: reason.to_string(),
            });
        };

        window.make_current();
        if !window.is_current() {
            // Dropping the window destroys it together with its context
            drop(window);
            return Err(BackendError::Context("context could not be made current".to_string()));
        }

        let interval = match spec.swap_interval {
            0 => glfw::SwapInterval::None,
            frames => glfw::SwapInterval::Sync(frames),
        };
        glfw.set_swap_interval(interval);

        window.set_sticky_keys(true);
        window.set_key_polling(true);
        window.set_cursor_pos_polling(true);
        window.set_mouse_button_polling(true);
        window.set_scroll_polling(true);
        window.set_cursor_enter_polling(true);
        window.set_size_polling(true);
        window.set_close_polling(true);

        let (width, height) = window.get_size();
        log::info!("[{NAME}] created {width}x{height} window '{}' with {profile}", spec.title);

        Ok(self.windows.insert(GlfwWindowSlot {
            window,
            events,
            dispatcher: EventDispatcher::new(),
        }))
    }

    fn destroy_window(&mut self, handle: WindowHandle) -> bool {
        let destroyed = self.windows.remove(handle).is_some();
        if destroyed {
            log::debug!("[{NAME}] window destroyed");
        }
        destroyed
    }

    fn live_windows(&self) -> usize {
        self.windows.len()
    }

    fn process_events(&mut self, sink: &mut dyn EventSink) {
        let Some(glfw) = self.glfw.as_mut() else {
            return;
        };
        glfw.poll_events();

        let mut batch = Vec::new();
        for slot in self.windows.values_mut() {
            batch.clear();
            batch.extend(glfw::flush_messages(&slot.events).filter_map(|(_, event)| translate(event)));
            slot.dispatcher.dispatch(&batch, sink);
        }
    }

    fn swap_buffers(&mut self, handle: WindowHandle) {
        if let Some(slot) = self.windows.get_mut(handle) {
            slot.window.swap_buffers();
        }
    }

    fn window_size(&self, handle: WindowHandle) -> Option<(u32, u32)> {
        self.slot(handle).map(|slot| {
            let (width, height) = slot.window.get_size();
            (width.max(0) as u32, height.max(0) as u32)
        })
    }

    fn set_window_title(&mut self, handle: WindowHandle, title: &str) {
        if let Some(slot) = self.windows.get_mut(handle) {
            slot.window.set_title(title);
        }
    }

    fn set_cursor_visible(&mut self, handle: WindowHandle, visible: bool) {
        if let Some(slot) = self.windows.get_mut(handle) {
            let mode = if visible { glfw::CursorMode::Normal } else { glfw::CursorMode::Disabled };
            slot.window.set_cursor_mode(mode);
        }
    }

    fn check_key_down(&self, handle: WindowHandle, key: Key) -> bool {
        let Some(native) = KEYS.to_native(key) else {
            return false;
        };
        self.slot(handle)
            .is_some_and(|slot| slot.window.get_key(native) == glfw::Action::Press)
    }

    fn time(&self) -> f64 {
        self.glfw.as_ref().map_or(0.0, glfw::Glfw::get_time)
    }
}

impl Drop for GlfwBackend {
    fn drop(&mut self) {
        self.release();
    }
}

fn translate_action(action: glfw::Action) -> KeyAction {
    match action {
        glfw::Action::Release => KeyAction::Release,
        glfw::Action::Press => KeyAction::Press,
        glfw::Action::Repeat => KeyAction::Repeat,
    }
}

fn translate_mods(mods: glfw::Modifiers) -> Modifiers {
    let mut out = Modifiers::empty();
    out.set(Modifiers::SHIFT, mods.contains(glfw::Modifiers::Shift));
    out.set(Modifiers::CONTROL, mods.contains(glfw::Modifiers::Control));
    out.set(Modifiers::ALT, mods.contains(glfw::Modifiers::Alt));
    out.set(Modifiers::SUPER, mods.contains(glfw::Modifiers::Super));
    out
}

/// Map one GLFW event into the canonical event space
fn translate(event: glfw::WindowEvent) -> Option<InputEvent> {
    use glfw::WindowEvent;

    match event {
        WindowEvent::Key(native, scancode, action, mods) => {
            let Some(key) = KEYS.to_canonical(native) else {
                log::trace!("[{NAME}] ignoring unmapped key {native:?} (scancode {scancode})");
                return None;
            };
            Some(InputEvent::Key {
                key,
                action: translate_action(action),
                mods: translate_mods(mods),
            })
        }
        WindowEvent::CursorPos(x, y) => Some(InputEvent::CursorMoved { x: x as f32, y: y as f32 }),
        WindowEvent::MouseButton(native, action, _) => BUTTONS.to_canonical(native).map(|button| InputEvent::MouseButton {
            button,
            action: translate_action(action),
            clicks: 1,
        }),
        WindowEvent::Scroll(dx, dy) => Some(InputEvent::MouseWheel { dx: dx as f32, dy: dy as f32 }),
        WindowEvent::CursorEnter(entered) => Some(InputEvent::CursorEnter(entered)),
        WindowEvent::Size(width, height) => Some(InputEvent::Resized {
            width: width.max(0) as u32,
            height: height.max(0) as u32,
        }),
        WindowEvent::Close => Some(InputEvent::QuitRequested),
        _ => None,
    }
}

/// Always an explicit count; `None` would let GLFW pick a multisampled framebuffer
fn samples_hint(profile: &CapabilityProfile) -> glfw::WindowHint {
    glfw::WindowHint::Samples(Some(profile.sample_count))
}
