use crate::config::FrameConfig;
use glam::Vec3;
use roomscene_common::NodeId;
use roomscene_scene::{Scene, SunOrbit};

/// Per-frame light animation, independent of how frames are scheduled.
///
/// The host (a window redraw callback, a timer, a test loop) calls
/// [`FrameLoop::advance`] once per frame.
#[derive(Debug, Clone)]
pub struct FrameLoop {
    sun: SunOrbit,
    light: NodeId,
    frames: u64,
}

impl FrameLoop {
    pub fn new(config: &FrameConfig, light: NodeId) -> Self {
        Self {
            sun: SunOrbit::new(config.initial_time, config.step, config.orbit_radius),
            light,
            frames: 0,
        }
    }

    pub fn time(&self) -> f64 {
        self.sun.time()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn light(&self) -> NodeId {
        self.light
    }

    /// Step time once and move the light to its new orbit position.
    ///
    /// Returns the new light position, or `None` if the light is not in the
    /// scene (time still advances).
    pub fn advance(&mut self, scene: &mut Scene) -> Option<Vec3> {
        let time = self.sun.advance();
        self.frames += 1;

        let node = scene.get_mut(self.light)?;
        let position = self.sun.position_at(time, node.transform.position);
        node.transform.position = position;
        tracing::trace!(frame = self.frames, time, ?position, "sun moved");
        Some(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomscene_common::Color;
    use roomscene_scene::{Node, NodeKind, PointLight, ShadowConfig};

    fn scene_with_light() -> (Scene, NodeId) {
        let mut scene = Scene::default();
        let id = scene.add(
            Node::new(NodeKind::PointLight(PointLight {
                color: Color::WHITE,
                intensity: 0.5,
                cast_shadow: true,
                shadow: ShadowConfig::default(),
            }))
            .at(Vec3::new(0.0, 100.0, 0.0)),
        );
        (scene, id)
    }

    #[test]
    fn first_frame_uses_stepped_time() {
        let (mut scene, id) = scene_with_light();
        let mut frame = FrameLoop::new(&FrameConfig::default(), id);
        let p = frame.advance(&mut scene).unwrap();

        let t = 1.0_f64 + 0.005;
        assert_eq!(frame.time(), t);
        assert_eq!(p.x, (30.0 * t.sin()) as f32);
        assert_eq!(p.y, (30.0 * t.cos()) as f32);
        assert_eq!(p.z, 0.0);
        assert_eq!(scene.get(id).unwrap().transform.position, p);
    }

    #[test]
    fn n_frames_accumulate_time() {
        let (mut scene, id) = scene_with_light();
        let mut frame = FrameLoop::new(&FrameConfig::default(), id);
        for n in 1..=2_000u64 {
            frame.advance(&mut scene);
            let expected = 1.0 + 0.005 * n as f64;
            assert!((frame.time() - expected).abs() < 1e-9, "frame {n}");
        }
        assert_eq!(frame.frames(), 2_000);
    }

    #[test]
    fn light_z_is_left_alone() {
        let (mut scene, id) = scene_with_light();
        scene.set_position(id, Vec3::new(0.0, 100.0, -7.0));
        let mut frame = FrameLoop::new(&FrameConfig::default(), id);
        for _ in 0..10 {
            frame.advance(&mut scene);
        }
        assert_eq!(scene.get(id).unwrap().transform.position.z, -7.0);
    }

    #[test]
    fn missing_light_still_advances_time() {
        let mut scene = Scene::default();
        let mut frame = FrameLoop::new(&FrameConfig::default(), NodeId::new());
        assert!(frame.advance(&mut scene).is_none());
        assert_eq!(frame.frames(), 1);
        assert!(frame.time() > 1.0);
    }
}
