use super::*;
use crate::backend::{BackendCapabilities, BackendResult, RenderApi, WindowSpec};
use crate::events::{EventDispatcher, EventSink, InputEvent};
use crate::input::{KeyAction, Modifiers};
use crate::renderer::HeadlessRenderer;
use approx::assert_relative_eq;
use slotmap::SlotMap;
use std::collections::{HashSet, VecDeque};

struct MockWindow {
    size: (u32, u32),
}

/// Backend with a scripted event queue and a clock that advances one frame
/// per swap
struct MockBackend {
    no_environment: bool,
    rejected: Vec<RenderApi>,
    profile: Option<CapabilityProfile>,
    windows: SlotMap<WindowHandle, MockWindow>,
    dispatcher: EventDispatcher,
    script: VecDeque<Vec<InputEvent>>,
    held: HashSet<Key>,
    now: f64,
    frame_dt: f64,

    init_calls: Vec<CapabilityProfile>,
    created: Vec<(CapabilityProfile, WindowSpec)>,
    max_live: usize,
    releases: u32,
}

impl MockBackend {
    fn new() -> Self {
        Self {
            no_environment: false,
            rejected: Vec::new(),
            profile: None,
            windows: SlotMap::with_key(),
            dispatcher: EventDispatcher::new(),
            script: VecDeque::new(),
            held: HashSet::new(),
            now: 0.0,
            frame_dt: 1.0 / 60.0,
            init_calls: Vec::new(),
            created: Vec::new(),
            max_live: 0,
            releases: 0,
        }
    }

    fn rejecting(mut self, api: RenderApi) -> Self {
        self.rejected.push(api);
        self
    }

    fn holding(mut self, key: Key) -> Self {
        self.held.insert(key);
        self
    }

    /// Queue one pump's worth of events; pumps past the script see nothing
    fn pump(mut self, events: Vec<InputEvent>) -> Self {
        self.script.push_back(events);
        self
    }
}

impl Backend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            touch: true,
            multi_touch: true,
            embedded_api: true,
        }
    }

    fn init(&mut self, profile: &CapabilityProfile) -> BackendResult<()> {
        self.init_calls.push(*profile);
        if self.no_environment {
            return Err(BackendError::Environment("no display".to_string()));
        }
        profile.validate()?;
        self.profile = Some(*profile);
        Ok(())
    }

    fn release(&mut self) {
        self.windows.clear();
        self.profile = None;
        self.releases += 1;
    }

    fn create_window(&mut self, spec: &WindowSpec) -> BackendResult<WindowHandle> {
        let profile = self.profile.ok_or(BackendError::NotInitialized)?;
        if self.rejected.contains(&profile.api) {
            return Err(BackendError::WindowCreation {
                profile,
                reason: "pixel format unavailable".to_string(),
            });
        }
        let size = if spec.fullscreen {
            (1920, 1080)
        } else {
            (spec.width, spec.height)
        };
        let handle = self.windows.insert(MockWindow { size });
        self.created.push((profile, spec.clone()));
        self.max_live = self.max_live.max(self.windows.len());
        self.dispatcher.reset();
        Ok(handle)
    }

    fn destroy_window(&mut self, handle: WindowHandle) -> bool {
        self.windows.remove(handle).is_some()
    }

    fn live_windows(&self) -> usize {
        self.windows.len()
    }

    fn process_events(&mut self, sink: &mut dyn EventSink) {
        if let Some(events) = self.script.pop_front() {
            self.dispatcher.dispatch(&events, sink);
        }
    }

    fn swap_buffers(&mut self, handle: WindowHandle) {
        if self.windows.contains_key(handle) {
            self.now += self.frame_dt;
        }
    }

    fn window_size(&self, handle: WindowHandle) -> Option<(u32, u32)> {
        self.windows.get(handle).map(|window| window.size)
    }

    fn set_window_title(&mut self, _handle: WindowHandle, _title: &str) {}

    fn set_cursor_visible(&mut self, _handle: WindowHandle, _visible: bool) {}

    fn check_key_down(&self, handle: WindowHandle, key: Key) -> bool {
        self.windows.contains_key(handle) && self.held.contains(&key)
    }

    fn time(&self) -> f64 {
        self.now
    }
}

fn press(key: Key) -> InputEvent {
    InputEvent::Key {
        key,
        action: KeyAction::Press,
        mods: Modifiers::empty(),
    }
}

fn release(key: Key) -> InputEvent {
    InputEvent::Key {
        key,
        action: KeyAction::Release,
        mods: Modifiers::empty(),
    }
}

fn windowed_config(width: u32, height: u32) -> HostConfig {
    let mut config = HostConfig::default();
    config.window.width = width;
    config.window.height = height;
    config
}

fn host(backend: MockBackend, config: HostConfig) -> Host<MockBackend, HeadlessRenderer> {
    Host::new(backend, HeadlessRenderer::new(), EmptyContent, config)
}

#[test]
fn test_fallback_then_benchmark_stops_at_frame_count() {
    let primary = RenderApi::PREFERENCE_ORDER[0];
    let mut backend = MockBackend::new().rejecting(primary);
    backend.frame_dt = 1.0 / 120.0;

    let mut config = windowed_config(800, 600);
    config.benchmark.enabled = true;
    config.benchmark.length = 10;
    config.benchmark.observation_secs = 0.5;

    let mut host = host(backend, config);
    host.init().unwrap();
    assert_eq!(host.profile().unwrap().api, RenderApi::FALLBACK);
    assert_eq!(host.backend().init_calls.len(), 2);
    assert_eq!(host.backend().init_calls[0].api, primary);
    assert_eq!(host.renderer().api(), Some(RenderApi::FALLBACK));

    let summary = host.run().unwrap();
    assert_eq!(summary.frames, 10);
    let report = summary.benchmark.unwrap();
    assert_eq!(report.frames, 10);
    assert_relative_eq!(report.elapsed_secs, 10.0 / 120.0, epsilon = 1e-9);
    assert_relative_eq!(report.average_fps, 120.0, epsilon = 1e-6);
    assert!(report.observation_secs >= 0.5);
    assert!(report.observation_secs < 0.5 + 2.0 / 120.0);
    assert_eq!(report.to_string(), "Average FPS: 120.00");

    let stats = host.renderer().stats();
    assert_eq!(stats.last_info_box.as_deref(), Some("Benchmark"));
    assert_eq!(stats.info_boxes_drawn, stats.frames_rendered - 10);
    assert_eq!(host.lifecycle(), Lifecycle::Released);
    assert_eq!(host.live_windows(), 0);
}

#[test]
fn test_benchmark_ignores_camera_input() {
    let mut config = HostConfig::default();
    config.benchmark.enabled = true;
    config.benchmark.length = 5;
    config.benchmark.observation_secs = 0.0;

    let backend = MockBackend::new()
        .holding(Key::W)
        .pump(vec![InputEvent::CursorMoved { x: 0.0, y: 0.0 }])
        .pump(vec![InputEvent::CursorMoved { x: 300.0, y: 300.0 }, press(Key::F3)]);
    let mut host = host(backend, config);
    let start = host.config.initial_navigation();

    host.run().unwrap();
    assert_eq!(host.navigation().position, start.position);
    assert_eq!(host.navigation().yaw, start.yaw);
    assert_eq!(host.settings().pipeline(), PipelineKind::Forward);
    assert_eq!(host.backend().created.len(), 1);
}

#[test]
fn test_both_profiles_rejected() {
    let backend = MockBackend::new()
        .rejecting(RenderApi::PREFERENCE_ORDER[0])
        .rejecting(RenderApi::FALLBACK);
    let mut host = host(backend, HostConfig::default());

    let err = host.init().unwrap_err();
    assert!(matches!(err, HostError::NoUsableProfile { .. }));
    assert_eq!(host.backend().init_calls.len(), 2);
    assert_eq!(host.live_windows(), 0);
    assert_eq!(host.lifecycle(), Lifecycle::Released);
    assert_eq!(host.renderer().stats().inits, 0);
}

#[test]
fn test_missing_environment_is_not_retried() {
    let mut backend = MockBackend::new();
    backend.no_environment = true;
    let mut host = host(backend, HostConfig::default());

    assert!(matches!(host.run(), Err(HostError::Environment(_))));
    assert_eq!(host.backend().init_calls.len(), 1);
    assert_eq!(host.backend().releases, 1);
}

#[test]
fn test_renderer_failure_is_fatal() {
    let renderer = HeadlessRenderer::new().failing_init();
    let mut host = Host::new(MockBackend::new(), renderer, EmptyContent, HostConfig::default());

    assert!(matches!(host.init(), Err(HostError::Renderer(_))));
    assert_eq!(host.backend().created.len(), 1);
    assert_eq!(host.live_windows(), 0);
    assert_eq!(host.lifecycle(), Lifecycle::Released);
}

#[test]
fn test_resource_failure_is_fatal() {
    let renderer = HeadlessRenderer::new().failing_load();
    let mut host = Host::new(MockBackend::new(), renderer, EmptyContent, HostConfig::default());

    assert!(matches!(host.init(), Err(HostError::Resources(_))));
    assert_eq!(host.live_windows(), 0);
    assert!(!host.renderer().is_initialized());
}

#[derive(Default)]
struct CountingContent {
    inits: u32,
    releases: u32,
    fail: bool,
}

impl SampleContent for CountingContent {
    fn init_resources(&mut self, renderer: &mut dyn Renderer, _framework: &FrameworkResources) -> Result<(), ContentError> {
        self.inits += 1;
        if self.fail {
            return Err(ContentError::Setup("scene missing".to_string()));
        }
        renderer.add_resource(crate::renderer::ResourceKind::SceneGraph, "models/knight.scene.xml")?;
        Ok(())
    }

    fn release_resources(&mut self) {
        self.releases += 1;
    }
}

#[test]
fn test_content_failure_is_fatal() {
    let content = CountingContent {
        fail: true,
        ..CountingContent::default()
    };
    let mut host = Host::new(MockBackend::new(), HeadlessRenderer::new(), content, HostConfig::default());

    assert!(matches!(host.init(), Err(HostError::Resources(ContentError::Setup(_)))));
    assert_eq!(host.content.releases, 1);
    assert_eq!(host.live_windows(), 0);
}

#[test]
fn test_pipeline_change_recreates_single_window() {
    let backend = MockBackend::new()
        .pump(vec![])
        .pump(vec![press(Key::F3), release(Key::F3)])
        .pump(vec![])
        .pump(vec![InputEvent::QuitRequested]);
    let mut host = Host::new(
        backend,
        HeadlessRenderer::new(),
        CountingContent::default(),
        HostConfig::default(),
    );

    let summary = host.run().unwrap();
    assert_eq!(summary.frames, 4);
    assert!(summary.benchmark.is_none());

    let backend = host.backend();
    assert_eq!(backend.created.len(), 2);
    assert_eq!(backend.max_live, 1);
    assert_eq!(backend.init_calls.len(), 2);
    assert_eq!(backend.live_windows(), 0);
    assert_eq!(host.settings().pipeline(), PipelineKind::Deferred);
    assert!(!host.settings().is_dirty());

    let stats = host.renderer().stats();
    assert_eq!(stats.inits, 2);
    assert_eq!(stats.shutdowns, 2);
    assert_eq!(host.content.inits, 2);
    assert_eq!(host.content.releases, 2);
}

#[test]
fn test_recreate_preserves_camera_and_settings() {
    let mut host = host(MockBackend::new(), HostConfig::default());
    host.init().unwrap();

    host.navigation_mut().look(25.0, 12.5);
    host.navigation_mut().translate_forward(3.0);
    host.settings_mut().toggle_help();
    host.settings_mut().set_pipeline(PipelineKind::Hdr);
    let nav = *host.navigation();
    let settings = ron::to_string(host.settings()).unwrap();

    host.recreate().unwrap();

    assert_eq!(host.lifecycle(), Lifecycle::Running);
    assert_eq!(*host.navigation(), nav);
    assert_eq!(ron::to_string(host.settings()).unwrap(), settings);
    assert_eq!(host.backend().max_live, 1);

    let framework = *host.framework().unwrap();
    let camera = host.renderer().camera(framework.camera).unwrap();
    assert_eq!(camera.pipeline, framework.pipelines.hdr);
    assert_eq!(camera.viewport.map(|v| (v.width, v.height)), Some((1280, 720)));
}

#[test]
fn test_toggle_fires_once_per_press() {
    let mut pumps = MockBackend::new().pump(vec![press(Key::F1)]);
    for _ in 0..4 {
        pumps = pumps.pump(vec![]);
    }
    let backend = pumps.pump(vec![release(Key::F1), InputEvent::QuitRequested]);
    let mut host = host(backend, HostConfig::default());

    host.run().unwrap();
    assert!(host.settings().show_help());
    assert_eq!(host.backend().created.len(), 1);
}

#[test]
fn test_fullscreen_round_trip_restores_windowed_size() {
    let backend = MockBackend::new()
        .pump(vec![InputEvent::Resized {
            width: 1024,
            height: 768,
        }])
        .pump(vec![press(Key::F11)])
        .pump(vec![press(Key::F11)])
        .pump(vec![InputEvent::QuitRequested]);
    let mut host = host(backend, windowed_config(800, 600));

    host.run().unwrap();
    let created: Vec<_> = host
        .backend()
        .created
        .iter()
        .map(|(_, spec)| (spec.width, spec.height, spec.fullscreen))
        .collect();
    assert_eq!(created.len(), 3);
    assert_eq!(created[0], (800, 600, false));
    assert!(created[1].2);
    assert_eq!(created[2], (1024, 768, false));
    assert_eq!(host.backend().max_live, 1);
}

#[test]
fn test_quit_in_same_pump_skips_recreation() {
    let backend = MockBackend::new().pump(vec![press(Key::F11), InputEvent::QuitRequested]);
    let mut host = host(backend, windowed_config(800, 600));

    let summary = host.run().unwrap();
    assert_eq!(summary.frames, 1);
    assert_eq!(host.backend().created.len(), 1);
    assert_eq!(host.renderer().stats().inits, 1);
    assert_eq!(host.renderer().stats().shutdowns, 1);
    assert_eq!(host.lifecycle(), Lifecycle::Released);
}

#[test]
fn test_user_resize_updates_viewport_in_place() {
    let backend = MockBackend::new().pump(vec![InputEvent::Resized {
        width: 640,
        height: 480,
    }]);
    let mut host = host(backend, HostConfig::default());
    host.init().unwrap();
    host.backend_mut().script.push_back(vec![InputEvent::QuitRequested]);

    // run() releases at the end, so inspect through a second pump first
    host.backend.process_events(&mut host.input);
    host.update();
    let framework = *host.framework().unwrap();
    assert_eq!(host.renderer().viewport_size(framework.camera), (640, 480));
    let resizes = &host.renderer().stats().pipeline_resizes;
    assert_eq!(&resizes[resizes.len() - 3..], &[
        (framework.pipelines.forward, 640, 480),
        (framework.pipelines.deferred, 640, 480),
        (framework.pipelines.hdr, 640, 480),
    ]);

    host.run().unwrap();
    assert_eq!(host.backend().created.len(), 1);
}

#[test]
fn test_mouse_look_clamps_pitch() {
    let backend = MockBackend::new()
        .pump(vec![InputEvent::CursorMoved { x: 0.0, y: 0.0 }])
        .pump(vec![InputEvent::CursorMoved { x: 0.0, y: -10_000.0 }])
        .pump(vec![InputEvent::QuitRequested]);
    let mut host = host(backend, HostConfig::default());

    host.run().unwrap();
    assert_eq!(host.navigation().pitch, navigation::PITCH_LIMIT);
}

#[test]
fn test_held_key_moves_forward() {
    let backend = MockBackend::new()
        .holding(Key::W)
        .pump(vec![])
        .pump(vec![InputEvent::QuitRequested]);
    let mut host = host(backend, HostConfig::default());
    let start = *host.navigation();

    // both frames fall inside the first measurement window, so run at 60 FPS
    host.run().unwrap();
    let nav = host.navigation();
    let expected = start.velocity * 2.0;
    assert_relative_eq!((nav.position - start.position).norm(), expected, epsilon = 1e-4);
    assert_relative_eq!(nav.run_time, 2.0 / 60.0, epsilon = 1e-6);
}

#[test]
fn test_freeze_blocks_movement_but_not_keys() {
    let backend = MockBackend::new()
        .holding(Key::D)
        .pump(vec![press(Key::Space), press(Key::Space)])
        .pump(vec![press(Key::F2)])
        .pump(vec![InputEvent::QuitRequested]);
    let mut host = host(backend, HostConfig::default());
    let start = *host.navigation();

    host.run().unwrap();
    assert_eq!(host.settings().freeze_mode(), 2);
    assert_eq!(host.settings().stat_mode(), 1);
    assert_eq!(host.navigation().position, start.position);
}

#[test]
fn test_deferred_pipeline_requests_no_window_multisampling() {
    let mut config = HostConfig::default();
    config.render.pipeline = PipelineKind::Deferred;
    config.render.sample_count = 4;
    let mut host = host(MockBackend::new(), config);

    host.init().unwrap();
    assert_eq!(host.profile().unwrap().sample_count, 0);
    assert_eq!(host.renderer().option(EngineOption::SampleCount), 4.0);
    assert_eq!(host.renderer().option(EngineOption::ShadowMapSize), 2048.0);
    assert_eq!(host.renderer().option(EngineOption::MaxAnisotropy), 4.0);
}

#[test]
fn test_release_is_idempotent() {
    let mut host = host(MockBackend::new(), HostConfig::default());
    assert_eq!(host.lifecycle(), Lifecycle::Uninitialized);
    assert_eq!(host.live_windows(), 0);

    host.init().unwrap();
    host.init().unwrap();
    assert_eq!(host.backend().created.len(), 1);

    host.release();
    host.release();
    assert_eq!(host.backend().releases, 1);
    assert_eq!(host.lifecycle(), Lifecycle::Released);
    assert_eq!(host.renderer().stats().shutdowns, 1);
}

#[test]
fn test_help_and_stats_overlays() {
    let backend = MockBackend::new()
        .pump(vec![press(Key::F1), press(Key::F2)])
        .pump(vec![InputEvent::QuitRequested]);
    let mut host = host(backend, HostConfig::default());

    host.run().unwrap();
    let stats = host.renderer().stats();
    assert_eq!(stats.last_info_box.as_deref(), Some("Help"));
    assert_eq!(stats.info_boxes_drawn, 2);
}
