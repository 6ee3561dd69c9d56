//! winit + glutin backend
//!
//! The richer backend: besides keyboard and mouse it reports touch and
//! native pinch/rotation gestures, and can create OpenGL ES contexts.
//!
//! winit only lets windows be created from inside its event loop, so the
//! backend drives the loop with `pump_app_events` both for event processing
//! and for window creation. Events are queued per window during a pump and
//! handed to that window's dispatcher afterwards.

use super::{
    log_rejected_profile, Backend, BackendCapabilities, BackendError, BackendResult, CapabilityProfile, RenderApi,
    WindowHandle, WindowSpec,
};
use crate::events::{EventDispatcher, EventSink, InputEvent, MultiTouchGesture, TouchPhase};
use crate::input::{CodeTable, Key, KeyAction, Modifiers, MouseButton};
use glutin::config::{Api, ColorBufferType, Config, ConfigTemplateBuilder};
use glutin::context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use slotmap::SlotMap;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{CursorGrabMode, Fullscreen, Window, WindowId};

const NAME: &str = "winit";

/// Pumps allowed for the event loop to hand out a window
const CREATE_PUMP_ATTEMPTS: usize = 8;

/// Pixels per wheel line for devices that report pixel deltas
const PIXELS_PER_LINE: f64 = 20.0;

static KEYS: CodeTable<KeyCode, Key> = CodeTable::new(&[
    (KeyCode::Space, Key::Space),
    (KeyCode::Quote, Key::Apostrophe),
    (KeyCode::Comma, Key::Comma),
    (KeyCode::Minus, Key::Minus),
    (KeyCode::Period, Key::Period),
    (KeyCode::Slash, Key::Slash),
    (KeyCode::Digit0, Key::Num0),
    (KeyCode::Digit1, Key::Num1),
    (KeyCode::Digit2, Key::Num2),
    (KeyCode::Digit3, Key::Num3),
    (KeyCode::Digit4, Key::Num4),
    (KeyCode::Digit5, Key::Num5),
    (KeyCode::Digit6, Key::Num6),
    (KeyCode::Digit7, Key::Num7),
    (KeyCode::Digit8, Key::Num8),
    (KeyCode::Digit9, Key::Num9),
    (KeyCode::Semicolon, Key::Semicolon),
    (KeyCode::Equal, Key::Equal),
    (KeyCode::KeyA, Key::A),
    (KeyCode::KeyB, Key::B),
    (KeyCode::KeyC, Key::C),
    (KeyCode::KeyD, Key::D),
    (KeyCode::KeyE, Key::E),
    (KeyCode::KeyF, Key::F),
    (KeyCode::KeyG, Key::G),
    (KeyCode::KeyH, Key::H),
    (KeyCode::KeyI, Key::I),
    (KeyCode::KeyJ, Key::J),
    (KeyCode::KeyK, Key::K),
    (KeyCode::KeyL, Key::L),
    (KeyCode::KeyM, Key::M),
    (KeyCode::KeyN, Key::N),
    (KeyCode::KeyO, Key::O),
    (KeyCode::KeyP, Key::P),
    (KeyCode::KeyQ, Key::Q),
    (KeyCode::KeyR, Key::R),
    (KeyCode::KeyS, Key::S),
    (KeyCode::KeyT, Key::T),
    (KeyCode::KeyU, Key::U),
    (KeyCode::KeyV, Key::V),
    (KeyCode::KeyW, Key::W),
    (KeyCode::KeyX, Key::X),
    (KeyCode::KeyY, Key::Y),
    (KeyCode::KeyZ, Key::Z),
    (KeyCode::BracketLeft, Key::LeftBracket),
    (KeyCode::Backslash, Key::Backslash),
    (KeyCode::BracketRight, Key::RightBracket),
    (KeyCode::Backquote, Key::GraveAccent),
    (KeyCode::IntlBackslash, Key::World1),
    (KeyCode::IntlRo, Key::World2),
    (KeyCode::Escape, Key::Escape),
    (KeyCode::Enter, Key::Enter),
    (KeyCode::Tab, Key::Tab),
    (KeyCode::Backspace, Key::Backspace),
    (KeyCode::Insert, Key::Insert),
    (KeyCode::Delete, Key::Delete),
    (KeyCode::ArrowRight, Key::Right),
    (KeyCode::ArrowLeft, Key::Left),
    (KeyCode::ArrowDown, Key::Down),
    (KeyCode::ArrowUp, Key::Up),
    (KeyCode::PageUp, Key::PageUp),
    (KeyCode::PageDown, Key::PageDown),
    (KeyCode::Home, Key::Home),
    (KeyCode::End, Key::End),
    (KeyCode::CapsLock, Key::CapsLock),
    (KeyCode::ScrollLock, Key::ScrollLock),
    (KeyCode::NumLock, Key::NumLock),
    (KeyCode::PrintScreen, Key::PrintScreen),
    (KeyCode::Pause, Key::Pause),
    (KeyCode::F1, Key::F1),
    (KeyCode::F2, Key::F2),
    (KeyCode::F3, Key::F3),
    (KeyCode::F4, Key::F4),
    (KeyCode::F5, Key::F5),
    (KeyCode::F6, Key::F6),
    (KeyCode::F7, Key::F7),
    (KeyCode::F8, Key::F8),
    (KeyCode::F9, Key::F9),
    (KeyCode::F10, Key::F10),
    (KeyCode::F11, Key::F11),
    (KeyCode::F12, Key::F12),
    (KeyCode::F13, Key::F13),
    (KeyCode::F14, Key::F14),
    (KeyCode::F15, Key::F15),
    (KeyCode::F16, Key::F16),
    (KeyCode::F17, Key::F17),
    (KeyCode::F18, Key::F18),
    (KeyCode::F19, Key::F19),
    (KeyCode::F20, Key::F20),
    (KeyCode::F21, Key::F21),
    (KeyCode::F22, Key::F22),
    (KeyCode::F23, Key::F23),
    (KeyCode::F24, Key::F24),
    (KeyCode::F25, Key::F25),
    (KeyCode::Numpad0, Key::Kp0),
    (KeyCode::Numpad1, Key::Kp1),
    (KeyCode::Numpad2, Key::Kp2),
    (KeyCode::Numpad3, Key::Kp3),
    (KeyCode::Numpad4, Key::Kp4),
    (KeyCode::Numpad5, Key::Kp5),
    (KeyCode::Numpad6, Key::Kp6),
    (KeyCode::Numpad7, Key::Kp7),
    (KeyCode::Numpad8, Key::Kp8),
    (KeyCode::Numpad9, Key::Kp9),
    (KeyCode::NumpadDecimal, Key::KpDecimal),
    (KeyCode::NumpadDivide, Key::KpDivide),
    (KeyCode::NumpadMultiply, Key::KpMultiply),
    (KeyCode::NumpadSubtract, Key::KpSubtract),
    (KeyCode::NumpadAdd, Key::KpAdd),
    (KeyCode::NumpadEnter, Key::KpEnter),
    (KeyCode::NumpadEqual, Key::KpEqual),
    (KeyCode::ShiftLeft, Key::LeftShift),
    (KeyCode::ControlLeft, Key::LeftControl),
    (KeyCode::AltLeft, Key::LeftAlt),
    (KeyCode::SuperLeft, Key::LeftSuper),
    (KeyCode::ShiftRight, Key::RightShift),
    (KeyCode::ControlRight, Key::RightControl),
    (KeyCode::AltRight, Key::RightAlt),
    (KeyCode::SuperRight, Key::RightSuper),
    (KeyCode::ContextMenu, Key::Menu),
]);

static BUTTONS: CodeTable<winit::event::MouseButton, MouseButton> = CodeTable::new(&[
    (winit::event::MouseButton::Left, MouseButton::Left),
    (winit::event::MouseButton::Right, MouseButton::Right),
    (winit::event::MouseButton::Middle, MouseButton::Middle),
    (winit::event::MouseButton::Back, MouseButton::Button4),
    (winit::event::MouseButton::Forward, MouseButton::Button5),
    (winit::event::MouseButton::Other(5), MouseButton::Button6),
    (winit::event::MouseButton::Other(6), MouseButton::Button7),
    (winit::event::MouseButton::Other(7), MouseButton::Button8),
]);

// Field order is drop order: context, then surface, then the window
struct WinitWindowSlot {
    context: PossiblyCurrentContext,
    surface: Surface<WindowSurface>,
    window: Window,
    dispatcher: EventDispatcher,
    held: HashSet<Key>,
}

/// State the event loop calls back into
struct WinitPump {
    profile: Option<CapabilityProfile>,
    pending: Option<WindowSpec>,
    created: Option<BackendResult<WindowHandle>>,
    windows: SlotMap<WindowHandle, WinitWindowSlot>,
    ids: HashMap<WindowId, WindowHandle>,
    queue: Vec<(WindowHandle, InputEvent)>,
    modifiers: Modifiers,
}

/// Backend on top of winit windows with glutin contexts
pub struct WinitBackend {
    event_loop: Option<EventLoop<()>>,
    pump: WinitPump,
    start: Instant,
}

impl Default for WinitBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl WinitBackend {
    /// Create an uninitialized backend
    pub fn new() -> Self {
        Self {
            event_loop: None,
            pump: WinitPump {
                profile: None,
                pending: None,
                created: None,
                windows: SlotMap::with_key(),
                ids: HashMap::new(),
                queue: Vec::new(),
                modifiers: Modifiers::empty(),
            },
            start: Instant::now(),
        }
    }

    fn pump(&mut self) -> bool {
        let Some(event_loop) = self.event_loop.as_mut() else {
            return false;
        };
        match event_loop.pump_app_events(Some(Duration::ZERO), &mut self.pump) {
            PumpStatus::Continue => true,
            PumpStatus::Exit(code) => {
                log::warn!("[{NAME}] event loop exited with code {code}");
                false
            }
        }
    }
}

impl WinitPump {
    fn build_pending(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(spec), Some(profile)) = (self.pending.take(), self.profile) else {
            return;
        };
        let result = build_window(event_loop, &spec, &profile).map(|slot| {
            let id = slot.window.id();
            let handle = self.windows.insert(slot);
            self.ids.insert(id, handle);
            handle
        });
        self.created = Some(result);
    }

    fn translate(&mut self, handle: WindowHandle, event: WindowEvent) -> Option<InputEvent> {
        let slot = self.windows.get_mut(handle)?;
        match event {
            WindowEvent::CloseRequested => Some(InputEvent::QuitRequested),
            WindowEvent::Resized(size) => {
                if let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) {
                    slot.surface.resize(&slot.context, width, height);
                }
                Some(InputEvent::Resized {
                    width: size.width,
                    height: size.height,
                })
            }
            WindowEvent::Focused(false) => {
                slot.held.clear();
                None
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = translate_mods(modifiers.state());
                None
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return None;
                };
                let Some(key) = KEYS.to_canonical(code) else {
                    log::trace!("[{NAME}] ignoring unmapped key {code:?}");
                    return None;
                };
                let action = match (event.state, event.repeat) {
                    (ElementState::Released, _) => KeyAction::Release,
                    (ElementState::Pressed, false) => KeyAction::Press,
                    (ElementState::Pressed, true) => KeyAction::Repeat,
                };
                if action == KeyAction::Release {
                    slot.held.remove(&key);
                } else {
                    slot.held.insert(key);
                }
                Some(InputEvent::Key {
                    key,
                    action,
                    mods: self.modifiers,
                })
            }
            WindowEvent::CursorMoved { position, .. } => Some(InputEvent::CursorMoved {
                x: position.x as f32,
                y: position.y as f32,
            }),
            WindowEvent::CursorEntered { .. } => Some(InputEvent::CursorEnter(true)),
            WindowEvent::CursorLeft { .. } => Some(InputEvent::CursorEnter(false)),
            WindowEvent::MouseInput { state, button, .. } => {
                BUTTONS.to_canonical(button).map(|button| InputEvent::MouseButton {
                    button,
                    action: translate_state(state),
                    clicks: 1,
                })
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let (dx, dy) = match delta {
                    MouseScrollDelta::LineDelta(dx, dy) => (dx, dy),
                    MouseScrollDelta::PixelDelta(pos) => ((pos.x / PIXELS_PER_LINE) as f32, (pos.y / PIXELS_PER_LINE) as f32),
                };
                Some(InputEvent::MouseWheel { dx, dy })
            }
            WindowEvent::Touch(touch) => Some(InputEvent::Touch {
                phase: translate_touch_phase(touch.phase),
                finger: touch.id,
                x: touch.location.x as f32,
                y: touch.location.y as f32,
            }),
            WindowEvent::PinchGesture { delta, .. } => Some(InputEvent::MultiTouch(MultiTouchGesture {
                pinch: delta as f32,
                rotation: 0.0,
                fingers: 2,
            })),
            WindowEvent::RotationGesture { delta, .. } => Some(InputEvent::MultiTouch(MultiTouchGesture {
                pinch: 0.0,
                rotation: delta,
                fingers: 2,
            })),
            _ => None,
        }
    }
}

impl ApplicationHandler for WinitPump {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.build_pending(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.build_pending(event_loop);
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(&handle) = self.ids.get(&window_id) else {
            return;
        };
        if let Some(event) = self.translate(handle, event) {
            self.queue.push((handle, event));
        }
    }
}

fn surface_template(profile: &CapabilityProfile) -> ConfigTemplateBuilder {
    let api = match profile.api {
        RenderApi::OpenGl2 | RenderApi::OpenGl4 => Api::OPENGL,
        RenderApi::OpenGlEs3 => Api::GLES3,
    };
    let template = ConfigTemplateBuilder::new()
        .with_api(api)
        .with_buffer_type(ColorBufferType::Rgb {
            r_size: profile.red_bits as u8,
            g_size: profile.green_bits as u8,
            b_size: profile.blue_bits as u8,
        })
        .with_alpha_size(profile.alpha_bits as u8)
        .with_depth_size(profile.depth_bits as u8)
        .with_stencil_size(8);
    if profile.sample_count > 0 {
        template.with_multisampling(profile.sample_count as u8)
    } else {
        template
    }
}

fn context_attributes(profile: &CapabilityProfile) -> ContextAttributesBuilder {
    let version = Some(Version::new(profile.major as u8, profile.minor as u8));
    let builder = match profile.api {
        RenderApi::OpenGl2 => ContextAttributesBuilder::new().with_context_api(ContextApi::OpenGl(version)),
        RenderApi::OpenGl4 => {
            let gl_profile = if profile.compatibility_profile {
                GlProfile::Compatibility
            } else {
                GlProfile::Core
            };
            ContextAttributesBuilder::new()
                .with_context_api(ContextApi::OpenGl(version))
                .with_profile(gl_profile)
        }
        RenderApi::OpenGlEs3 => ContextAttributesBuilder::new().with_context_api(ContextApi::Gles(version)),
    };
    builder.with_debug(profile.debug_context)
}

/// Pick the config with the most samples not above the request
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>, requested_samples: u8) -> Config {
    pick_by_samples(configs, |config: &Config| config.num_samples(), requested_samples)
        // glutin only calls the picker with a non-empty set
        .unwrap_or_else(|| unreachable!("display offered no surface configs"))
}

/// Most samples not above `requested`, otherwise the fewest on offer
fn pick_by_samples<T>(items: impl Iterator<Item = T>, samples: impl Fn(&T) -> u8, requested: u8) -> Option<T> {
    let mut within: Option<T> = None;
    let mut fewest: Option<T> = None;
    for item in items {
        let count = samples(&item);
        if count <= requested {
            if within.as_ref().map_or(true, |best| count > samples(best)) {
                within = Some(item);
            }
        } else if fewest.as_ref().map_or(true, |best| count < samples(best)) {
            fewest = Some(item);
        }
    }
    within.or(fewest)
}

#[allow(unsafe_code)]
fn build_window(
    event_loop: &ActiveEventLoop,
    spec: &WindowSpec,
    profile: &CapabilityProfile,
) -> BackendResult<WinitWindowSlot> {
    let reject = |reason: String| {
        log_rejected_profile(NAME, profile, &reason);
        BackendError::WindowCreation {
            profile: *profile,
            reason,
        }
    };

    let mut attributes = Window::default_attributes()
        .with_title(spec.title.clone())
        .with_inner_size(PhysicalSize::new(spec.width, spec.height));
    if spec.fullscreen {
        attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
    }

    let requested_samples = profile.sample_count as u8;
    let (window, config) = DisplayBuilder::new()
        .with_window_attributes(Some(attributes))
        .build(event_loop, surface_template(profile), |configs| {
            pick_config(configs, requested_samples)
        })
        .map_err(|e| reject(format!("no matching surface format: {e}")))?;
    let window = window.ok_or_else(|| reject("the display did not create a window".to_string()))?;

    let raw_handle = window
        .window_handle()
        .map_err(|e| BackendError::Context(format!("window handle unavailable: {e}")))?
        .as_raw();
    let display = config.display();

    // SAFETY: the raw handle belongs to `window`, which is stored in the same
    // slot as the context and dropped after it
    let context = unsafe { display.create_context(&config, &context_attributes(profile).build(Some(raw_handle))) }
        .map_err(|e| reject(e.to_string()))?;

    let surface_attributes = window
        .build_surface_attributes(SurfaceAttributesBuilder::default())
        .map_err(|e| BackendError::Context(format!("surface attributes unavailable: {e}")))?;
    // SAFETY: as above, the surface never outlives `window`
    let surface = unsafe { display.create_window_surface(&config, &surface_attributes) }
        .map_err(|e| BackendError::Context(format!("window surface creation failed: {e}")))?;

    let context = context
        .make_current(&surface)
        .map_err(|e| BackendError::Context(format!("context could not be made current: {e}")))?;

    let interval = NonZeroU32::new(spec.swap_interval).map_or(SwapInterval::DontWait, SwapInterval::Wait);
    if let Err(e) = surface.set_swap_interval(&context, interval) {
        log::warn!("[{NAME}] swap interval {} not applied: {e}", spec.swap_interval);
    }

    let size = window.inner_size();
    log::info!(
        "[{NAME}] created {}x{} window '{}' with {profile} ({} samples)",
        size.width,
        size.height,
        spec.title,
        config.num_samples()
    );

    Ok(WinitWindowSlot {
        context,
        surface,
        window,
        dispatcher: EventDispatcher::new(),
        held: HashSet::new(),
    })
}

impl Backend for WinitBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            touch: true,
            multi_touch: true,
            embedded_api: true,
        }
    }

    fn init(&mut self, profile: &CapabilityProfile) -> BackendResult<()> {
        profile.validate()?;

        if self.event_loop.is_none() {
            let event_loop =
                EventLoop::new().map_err(|e| BackendError::Environment(format!("event loop unavailable: {e}")))?;
            log::info!("[{NAME}] event loop started");
            self.event_loop = Some(event_loop);
        }

        log::debug!("[{NAME}] context attributes set for {profile}");
        self.pump.profile = Some(*profile);
        Ok(())
    }

    fn release(&mut self) {
        let destroyed = self.pump.windows.len();
        self.pump.windows.clear();
        self.pump.ids.clear();
        self.pump.queue.clear();
        self.pump.pending = None;
        if self.pump.profile.take().is_some() {
            // The event loop itself stays: winit refuses to create a second one
            log::info!("[{NAME}] released ({destroyed} window(s) destroyed)");
        }
    }

    fn create_window(&mut self, spec: &WindowSpec) -> BackendResult<WindowHandle> {
        let Some(profile) = self.pump.profile else {
            return Err(BackendError::NotInitialized);
        };
        if self.event_loop.is_none() {
            return Err(BackendError::NotInitialized);
        }

        self.pump.pending = Some(spec.clone());
        self.pump.created = None;
        for _ in 0..CREATE_PUMP_ATTEMPTS {
            let running = self.pump();
            if let Some(result) = self.pump.created.take() {
                return result;
            }
            if !running {
                break;
            }
        }

        self.pump.pending = None;
        let reason = "the event loop never became ready for window creation".to_string();
        log_rejected_profile(NAME, &profile, &reason);
        Err(BackendError::WindowCreation { profile, reason })
    }

    fn destroy_window(&mut self, handle: WindowHandle) -> bool {
        let Some(slot) = self.pump.windows.remove(handle) else {
            return false;
        };
        self.pump.ids.remove(&slot.window.id());
        self.pump.queue.retain(|(owner, _)| *owner != handle);
        log::debug!("[{NAME}] window destroyed");
        true
    }

    fn live_windows(&self) -> usize {
        self.pump.windows.len()
    }

    fn process_events(&mut self, sink: &mut dyn EventSink) {
        if !self.pump() {
            for &handle in self.pump.ids.values() {
                self.pump.queue.push((handle, InputEvent::QuitRequested));
            }
        }

        let queue = std::mem::take(&mut self.pump.queue);
        let mut batch = Vec::new();
        for (handle, slot) in &mut self.pump.windows {
            batch.clear();
            batch.extend(
                queue
                    .iter()
                    .filter(|(owner, _)| *owner == handle)
                    .map(|(_, event)| event.clone()),
            );
            slot.dispatcher.dispatch(&batch, sink);
        }
    }

    fn swap_buffers(&mut self, handle: WindowHandle) {
        if let Some(slot) = self.pump.windows.get(handle) {
            slot.window.pre_present_notify();
            if let Err(e) = slot.surface.swap_buffers(&slot.context) {
                log::error!("[{NAME}] swap failed: {e}");
            }
        }
    }

    fn window_size(&self, handle: WindowHandle) -> Option<(u32, u32)> {
        self.pump.windows.get(handle).map(|slot| {
            let size = slot.window.inner_size();
            (size.width, size.height)
        })
    }

    fn set_window_title(&mut self, handle: WindowHandle, title: &str) {
        if let Some(slot) = self.pump.windows.get(handle) {
            slot.window.set_title(title);
        }
    }

    fn set_cursor_visible(&mut self, handle: WindowHandle, visible: bool) {
        let Some(slot) = self.pump.windows.get(handle) else {
            return;
        };
        slot.window.set_cursor_visible(visible);
        let grab = if visible {
            slot.window.set_cursor_grab(CursorGrabMode::None)
        } else {
            slot.window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| slot.window.set_cursor_grab(CursorGrabMode::Confined))
        };
        if let Err(e) = grab {
            log::debug!("[{NAME}] cursor grab unavailable: {e}");
        }
    }

    fn check_key_down(&self, handle: WindowHandle, key: Key) -> bool {
        self.pump.windows.get(handle).is_some_and(|slot| slot.held.contains(&key))
    }

    fn time(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Drop for WinitBackend {
    fn drop(&mut self) {
        self.release();
    }
}

fn translate_state(state: ElementState) -> KeyAction {
    match state {
        ElementState::Pressed => KeyAction::Press,
        ElementState::Released => KeyAction::Release,
    }
}

fn translate_touch_phase(phase: winit::event::TouchPhase) -> TouchPhase {
    match phase {
        winit::event::TouchPhase::Started => TouchPhase::Down,
        winit::event::TouchPhase::Moved => TouchPhase::Moved,
        winit::event::TouchPhase::Ended => TouchPhase::Up,
        winit::event::TouchPhase::Cancelled => TouchPhase::Cancelled,
    }
}

fn translate_mods(state: ModifiersState) -> Modifiers {
    let mut mods = Modifiers::empty();
    mods.set(Modifiers::SHIFT, state.shift_key());
    mods.set(Modifiers::CONTROL, state.control_key());
    mods.set(Modifiers::ALT, state.alt_key());
    mods.set(Modifiers::SUPER, state.super_key());
    mods
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_cover_canonical_space() {
        assert!(KEYS.is_bijective());
        assert!(BUTTONS.is_bijective());
        for &key in Key::ALL {
            assert!(KEYS.to_native(key).is_some(), "{key:?} has no winit key code");
        }
        for &button in MouseButton::ALL {
            assert!(BUTTONS.to_native(button).is_some(), "{button:?} has no winit button");
        }
    }

    #[test]
    fn test_physical_layout_names() {
        assert_eq!(KEYS.to_canonical(KeyCode::KeyW), Some(Key::W));
        assert_eq!(KEYS.to_canonical(KeyCode::ShiftLeft), Some(Key::LeftShift));
        assert_eq!(KEYS.to_canonical(KeyCode::Digit3), Some(Key::Num3));
        assert_eq!(KEYS.to_canonical(KeyCode::Numpad3), Some(Key::Kp3));
        assert_eq!(KEYS.to_canonical(KeyCode::F35), None);
    }

    #[test]
    fn test_touch_phases_and_modifiers() {
        assert_eq!(translate_touch_phase(winit::event::TouchPhase::Started), TouchPhase::Down);
        assert_eq!(translate_touch_phase(winit::event::TouchPhase::Cancelled), TouchPhase::Cancelled);
        assert_eq!(
            translate_mods(ModifiersState::SHIFT | ModifiersState::SUPER),
            Modifiers::SHIFT | Modifiers::SUPER
        );
    }

    #[test]
    fn test_create_window_requires_init() {
        let mut backend = WinitBackend::new();
        assert!(matches!(
            backend.create_window(&WindowSpec::default()),
            Err(BackendError::NotInitialized)
        ));
        assert_eq!(backend.live_windows(), 0);
        assert!(!backend.check_key_down(WindowHandle::default(), Key::W));
    }

    #[test]
    fn test_sample_pick_never_exceeds_request() {
        let pick = |offered: &[u8], requested| pick_by_samples(offered.iter().copied(), |&n| n, requested);
        assert_eq!(pick(&[4, 0], 0), Some(0));
        assert_eq!(pick(&[8, 2, 4, 0], 4), Some(4));
        assert_eq!(pick(&[0, 2], 8), Some(2));
        assert_eq!(pick(&[16, 4, 8], 2), Some(4));
        assert_eq!(pick(&[], 4), None);
    }

    #[test]
    fn test_reports_touch() {
        let caps = WinitBackend::new().capabilities();
        assert!(caps.touch);
        assert!(caps.multi_touch);
        assert!(caps.embedded_api);
    }
}
