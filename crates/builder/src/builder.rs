use crate::config::SceneConfig;
use crate::controls::bind_orbit_controls;
use crate::environment::{SurfaceInfo, setup_environment};
use crate::error::SetupError;
use crate::frame::FrameLoop;
use crate::walls::WallBuilder;
use glam::Vec3;
use roomscene_common::NodeId;
use roomscene_input::{ControlAction, OrbitControls};
use roomscene_persist::KeyValueStore;
use roomscene_render::{Renderer, RendererConfig};
use roomscene_scene::{Node, PerspectiveCamera, Scene};

/// Owned state of the room demo: scene, camera, controls and frame timing.
///
/// Built once by [`SceneBuilder::init`]; the host then calls
/// [`SceneBuilder::advance_frame`] once per display refresh.
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    config: SceneConfig,
    scene: Scene,
    camera: PerspectiveCamera,
    renderer: RendererConfig,
    controls: OrbitControls,
    walls: WallBuilder,
    frame: FrameLoop,
    room: Option<NodeId>,
    /// Set once the untouched startup state has been rendered.
    presented: bool,
}

impl SceneBuilder {
    /// Environment setup plus orbit binding. No room geometry yet.
    pub fn setup(
        config: SceneConfig,
        store: &mut impl KeyValueStore,
        surface: SurfaceInfo,
    ) -> Result<Self, SetupError> {
        let env = setup_environment(&config, store, surface)?;
        let mut camera = env.camera;
        let controls = bind_orbit_controls(&mut camera, config.orbit);

        Ok(Self {
            frame: FrameLoop::new(&config.frame, env.sun),
            walls: WallBuilder::new(config.room),
            config,
            scene: env.scene,
            camera,
            renderer: env.renderer,
            controls,
            room: None,
            presented: false,
        })
    }

    /// Full startup: setup, then the configured room.
    pub fn init(
        config: SceneConfig,
        store: &mut impl KeyValueStore,
        surface: SurfaceInfo,
    ) -> Result<Self, SetupError> {
        let mut builder = Self::setup(config, store, surface)?;
        let room = builder.config.room;
        builder.create_walls(room.width, room.depth);
        Ok(builder)
    }

    pub fn create_walls(&mut self, width: f32, depth: f32) -> NodeId {
        let id = self.walls.create_walls(&mut self.scene, width, depth);
        self.room = Some(id);
        id
    }

    /// Build an unattached windowed wall. The scene is not modified.
    pub fn create_windowed_wall(&self, width: f32, height: f32, depth: f32, origin: Vec3) -> Node {
        self.walls.create_windowed_wall(width, height, depth, origin)
    }

    /// One frame: advance time, move the light, optionally ease the camera,
    /// then render.
    pub fn advance_frame<R: Renderer>(&mut self, renderer: &R) -> R::Output {
        let _span = tracing::trace_span!("frame", n = self.frame.frames() + 1).entered();
        self.frame.advance(&mut self.scene);
        if self.config.frame.update_controls {
            self.controls.update(&mut self.camera);
        }
        renderer.render(&self.scene, &self.camera)
    }

    /// Host entry point for one display refresh. The first call renders the
    /// startup state as built; every later call is [`Self::advance_frame`].
    pub fn next_frame<R: Renderer>(&mut self, renderer: &R) -> R::Output {
        if self.presented {
            return self.advance_frame(renderer);
        }
        self.presented = true;
        tracing::debug!(time = self.time(), "initial render");
        self.render(renderer)
    }

    /// Render without advancing time.
    pub fn render<R: Renderer>(&self, renderer: &R) -> R::Output {
        renderer.render(&self.scene, &self.camera)
    }

    pub fn handle_action(&mut self, action: ControlAction) {
        let height = self.renderer.height as f32;
        self.controls.apply(action, &self.camera, height);
    }

    /// Apply pending control motion outside the frame loop.
    pub fn update_controls(&mut self) -> bool {
        self.controls.update(&mut self.camera)
    }

    /// Track a new output size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.set_size(width, height);
        self.camera.set_viewport(self.renderer.width, self.renderer.height);
        tracing::debug!(width, height, "viewport resized");
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn renderer_config(&self) -> &RendererConfig {
        &self.renderer
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn room(&self) -> Option<NodeId> {
        self.room
    }

    pub fn sun(&self) -> NodeId {
        self.frame.light()
    }

    pub fn sun_position(&self) -> Option<Vec3> {
        self.scene.world_position(self.frame.light())
    }

    pub fn time(&self) -> f64 {
        self.frame.time()
    }

    pub fn frames(&self) -> u64 {
        self.frame.frames()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomscene_persist::MemoryStore;
    use roomscene_render::DebugTextRenderer;
    use std::cell::Cell;

    /// Counts render calls and returns the node count it saw.
    #[derive(Default)]
    struct CountingRenderer {
        calls: Cell<u32>,
    }

    impl Renderer for CountingRenderer {
        type Output = usize;

        fn render(&self, scene: &Scene, _camera: &PerspectiveCamera) -> usize {
            self.calls.set(self.calls.get() + 1);
            scene.node_count()
        }
    }

    fn builder() -> SceneBuilder {
        let mut store = MemoryStore::new();
        SceneBuilder::init(SceneConfig::default(), &mut store, SurfaceInfo::default()).unwrap()
    }

    #[test]
    fn init_builds_room_after_environment() {
        let b = builder();
        // ambient + sun + helper + axes + room group with five meshes
        assert_eq!(b.scene().node_count(), 10);
        assert_eq!(b.scene().roots().len(), 5);
        let room = b.scene().get(b.room().unwrap()).unwrap();
        assert_eq!(room.children().len(), 5);
        assert_eq!(b.time(), 1.0);
        assert_eq!(b.frames(), 0);
    }

    #[test]
    fn advance_frame_renders_once_per_frame() {
        let mut b = builder();
        let renderer = CountingRenderer::default();
        for _ in 0..3 {
            assert_eq!(b.advance_frame(&renderer), 10);
        }
        assert_eq!(renderer.calls.get(), 3);
        assert_eq!(b.frames(), 3);
        assert!((b.time() - 1.015).abs() < 1e-12);
    }

    #[test]
    fn sun_follows_time() {
        let mut b = builder();
        let renderer = DebugTextRenderer::new();
        for _ in 0..250 {
            b.advance_frame(&renderer);
        }
        let t = b.time();
        let p = b.sun_position().unwrap();
        assert_eq!(p.x, (30.0 * t.sin()) as f32);
        assert_eq!(p.y, (30.0 * t.cos()) as f32);
        assert_eq!(p.z, 0.0);
    }

    #[test]
    fn next_frame_shows_startup_state_first() {
        let mut b = builder();
        let start = b.sun_position();
        let renderer = CountingRenderer::default();

        assert_eq!(b.next_frame(&renderer), 10);
        assert_eq!(b.time(), 1.0);
        assert_eq!(b.frames(), 0);
        assert_eq!(b.sun_position(), start);

        b.next_frame(&renderer);
        b.next_frame(&renderer);
        assert_eq!(renderer.calls.get(), 3);
        assert_eq!(b.frames(), 2);
        assert!((b.time() - 1.01).abs() < 1e-12);
    }

    #[test]
    fn render_does_not_advance_time() {
        let b = builder();
        let out = b.render(&DebugTextRenderer::new());
        assert!(out.contains("Nodes: 10"));
        assert_eq!(b.time(), 1.0);
    }

    #[test]
    fn frame_loop_eases_camera_when_enabled() {
        let mut b = builder();
        let start = b.camera().position;
        b.handle_action(ControlAction::Rotate { dx: 200.0, dy: 0.0 });
        b.advance_frame(&CountingRenderer::default());
        assert_ne!(b.camera().position, start);
    }

    #[test]
    fn frame_loop_leaves_camera_when_disabled() {
        let mut config = SceneConfig::default();
        config.frame.update_controls = false;
        let mut store = MemoryStore::new();
        let mut b = SceneBuilder::init(config, &mut store, SurfaceInfo::default()).unwrap();
        let start = b.camera().position;
        b.handle_action(ControlAction::Rotate { dx: 200.0, dy: 0.0 });
        b.advance_frame(&CountingRenderer::default());
        assert_eq!(b.camera().position, start);
        assert!(b.update_controls());
        assert_ne!(b.camera().position, start);
    }

    #[test]
    fn windowed_wall_leaves_scene_untouched() {
        let b = builder();
        let before = b.scene().state_hash();
        let wall = b.create_windowed_wall(6.0, 4.0, 0.5, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(wall.children().len(), 4);
        assert_eq!(b.scene().state_hash(), before);
    }

    #[test]
    fn resize_updates_aspect() {
        let mut b = builder();
        b.resize(800, 400);
        assert_eq!(b.camera().aspect, 2.0);
        assert_eq!(b.renderer_config().width, 800);
        b.resize(800, 0);
        assert_eq!(b.renderer_config().height, 1);
    }
}
