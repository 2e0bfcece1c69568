use crate::config::SceneConfig;
use crate::error::SetupError;
use roomscene_common::NodeId;
use roomscene_persist::{KeyValueStore, ensure_high_score};
use roomscene_render::RendererConfig;
use roomscene_scene::{
    AmbientLight, AxesHelper, Node, NodeKind, PerspectiveCamera, PointLight, PointLightHelper,
    Scene,
};

/// Size and density of the surface the scene is shown on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceInfo {
    pub width: u32,
    pub height: u32,
    /// Physical pixels per logical pixel.
    pub pixel_ratio: f64,
}

impl Default for SurfaceInfo {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            pixel_ratio: 1.0,
        }
    }
}

/// Everything setup produces, before any geometry is added.
#[derive(Debug, Clone)]
pub struct Environment {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub renderer: RendererConfig,
    pub ambient_light: NodeId,
    pub sun: NodeId,
    pub sun_helper: NodeId,
    pub axes: NodeId,
}

/// Ensure the high score exists, then build the scene, lights, helpers,
/// camera and renderer settings.
pub fn setup_environment(
    config: &SceneConfig,
    store: &mut impl KeyValueStore,
    surface: SurfaceInfo,
) -> Result<Environment, SetupError> {
    let _span = tracing::info_span!("setup_environment").entered();

    ensure_high_score(store)?;

    let mut scene = Scene::new(config.background);
    let lighting = &config.lighting;

    let ambient_light = scene.add(
        Node::new(NodeKind::AmbientLight(AmbientLight {
            color: lighting.ambient_color,
            intensity: lighting.ambient_intensity,
        }))
        .named("ambient"),
    );

    let sun = scene.add(
        Node::new(NodeKind::PointLight(PointLight {
            color: lighting.point_color,
            intensity: lighting.point_intensity,
            cast_shadow: lighting.cast_shadow,
            shadow: lighting.shadow,
        }))
        .named("sun")
        .at(lighting.point_position),
    );

    let sun_helper = scene.add(
        Node::new(NodeKind::PointLightHelper(PointLightHelper {
            light: sun,
            size: lighting.helper_size,
        }))
        .named("sun-helper"),
    );

    let cam = &config.camera;
    let mut camera = PerspectiveCamera::new(cam.fov_degrees, 1.0, cam.near, cam.far);
    camera.set_viewport(surface.width, surface.height);
    camera.position = cam.position;

    let renderer = RendererConfig::for_surface(surface.width, surface.height, surface.pixel_ratio);

    let axes = scene.add(
        Node::new(NodeKind::AxesHelper(AxesHelper {
            size: config.axes.size,
        }))
        .named("axes")
        .at(config.axes.position),
    );

    tracing::info!(
        width = surface.width,
        height = surface.height,
        antialias = renderer.antialias,
        nodes = scene.node_count(),
        "environment ready"
    );

    Ok(Environment {
        scene,
        camera,
        renderer,
        ambient_light,
        sun,
        sun_helper,
        axes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use roomscene_persist::{FileStore, HIGH_SCORE_KEY, MemoryStore};

    #[test]
    fn setup_builds_lights_and_helpers() {
        let mut store = MemoryStore::new();
        let env = setup_environment(&SceneConfig::default(), &mut store, SurfaceInfo::default())
            .unwrap();

        assert_eq!(env.scene.node_count(), 4);
        assert_eq!(env.scene.background().to_hex(), 0x4a4a4a);

        let sun = env.scene.get(env.sun).unwrap();
        let light = sun.as_point_light().unwrap();
        assert_eq!(light.intensity, 0.5);
        assert!(light.cast_shadow);
        assert_eq!((light.shadow.map_width, light.shadow.map_height), (512, 512));
        assert_eq!((light.shadow.camera_near, light.shadow.camera_far), (0.5, 500.0));
        assert_eq!(sun.transform.position, Vec3::new(0.0, 100.0, 0.0));

        match &env.scene.get(env.ambient_light).unwrap().kind {
            NodeKind::AmbientLight(a) => assert_eq!(a.intensity, 0.6),
            other => panic!("expected ambient light, got {other:?}"),
        }
        match &env.scene.get(env.sun_helper).unwrap().kind {
            NodeKind::PointLightHelper(h) => {
                assert_eq!(h.light, env.sun);
                assert_eq!(h.size, 5.0);
            }
            other => panic!("expected helper, got {other:?}"),
        }
        assert_eq!(
            env.scene.world_position(env.axes),
            Some(Vec3::new(0.0, 10.0, 0.0))
        );
    }

    #[test]
    fn setup_configures_camera_and_renderer() {
        let mut store = MemoryStore::new();
        let surface = SurfaceInfo {
            width: 1920,
            height: 1080,
            pixel_ratio: 2.0,
        };
        let env = setup_environment(&SceneConfig::default(), &mut store, surface).unwrap();

        assert_eq!(env.camera.fov_degrees, 75.0);
        assert_eq!((env.camera.near, env.camera.far), (0.1, 500.0));
        assert_eq!(env.camera.position, Vec3::new(0.0, 10.0, 25.0));
        assert!((env.camera.aspect - 1920.0 / 1080.0).abs() < 1e-6);
        assert!(!env.renderer.antialias);
        assert_eq!((env.renderer.width, env.renderer.height), (1920, 1080));
    }

    #[test]
    fn setup_defaults_high_score_to_zero() {
        let mut store = MemoryStore::new();
        setup_environment(&SceneConfig::default(), &mut store, SurfaceInfo::default()).unwrap();
        assert_eq!(store.get(HIGH_SCORE_KEY).unwrap().as_deref(), Some("0"));
    }

    #[test]
    fn setup_twice_keeps_existing_high_score() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(tmp.path()).unwrap();
        setup_environment(&SceneConfig::default(), &mut store, SurfaceInfo::default()).unwrap();
        store.set(HIGH_SCORE_KEY, "42").unwrap();

        let mut store = FileStore::open(tmp.path()).unwrap();
        setup_environment(&SceneConfig::default(), &mut store, SurfaceInfo::default()).unwrap();
        setup_environment(&SceneConfig::default(), &mut store, SurfaceInfo::default()).unwrap();
        assert_eq!(store.get(HIGH_SCORE_KEY).unwrap().as_deref(), Some("42"));
    }
}
