use crate::action::ControlAction;
use glam::Vec3;
use roomscene_scene::PerspectiveCamera;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

const EPS: f32 = 1e-6;

/// Tunables for [`OrbitControls`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    /// Pan in the camera's screen plane instead of the world XZ plane.
    pub screen_space_panning: bool,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    /// Dolly bounds. The camera's near and far planes tighten them further.
    pub min_distance: f32,
    pub max_distance: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            enable_damping: true,
            damping_factor: 0.05,
            screen_space_panning: false,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            min_distance: 0.0,
            max_distance: f32::MAX,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 2.0,
        }
    }
}

/// Orbit camera controls: rotate around a target, pan it, dolly towards it.
///
/// Input only accumulates deltas. [`OrbitControls::update`] applies them to the
/// camera, so with damping enabled it must run every frame for motion to ease
/// out.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub settings: OrbitSettings,
    target: Vec3,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vec3,
    last_position: Vec3,
}

impl OrbitControls {
    pub fn new(settings: OrbitSettings) -> Self {
        Self {
            target: settings.target,
            settings,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            last_position: Vec3::splat(f32::NAN),
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// True while damped motion is still pending.
    pub fn is_moving(&self) -> bool {
        self.delta_theta.abs() > EPS
            || self.delta_phi.abs() > EPS
            || self.pan_offset.length_squared() > EPS
            || (self.scale - 1.0).abs() > EPS
    }

    /// Feed one input action. `viewport_height` is in the same units as the
    /// pointer deltas.
    pub fn apply(&mut self, action: ControlAction, camera: &PerspectiveCamera, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        tracing::trace!(?action, "orbit input");
        match action {
            ControlAction::Rotate { dx, dy } => {
                self.rotate_left(TAU * dx / height * self.settings.rotate_speed);
                self.rotate_up(TAU * dy / height * self.settings.rotate_speed);
            }
            ControlAction::Pan { dx, dy } => {
                let offset = camera.position - self.target;
                let half_fov = (camera.fov_degrees.to_radians() / 2.0).tan();
                let target_distance = offset.length() * half_fov;
                let speed = self.settings.pan_speed;
                self.pan_left(2.0 * dx * target_distance / height * speed, camera);
                self.pan_up(2.0 * dy * target_distance / height * speed, camera);
            }
            ControlAction::Dolly(steps) => {
                let zoom_scale = 0.95_f32.powf(self.settings.zoom_speed);
                self.scale *= zoom_scale.powf(steps);
            }
        }
    }

    fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    fn pan_left(&mut self, distance: f32, camera: &PerspectiveCamera) {
        self.pan_offset += camera.right() * -distance;
    }

    fn pan_up(&mut self, distance: f32, camera: &PerspectiveCamera) {
        let dir = if self.settings.screen_space_panning {
            camera.right().cross(camera.forward())
        } else {
            // Forward projected onto the ground plane.
            camera.up.cross(camera.right())
        };
        self.pan_offset += dir * distance;
    }

    /// Apply pending deltas to the camera. Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let s = self.settings;
        let offset = camera.position - self.target;

        let mut radius = offset.length();
        let (mut theta, mut phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, 0.0)
        };

        if s.enable_damping {
            theta += self.delta_theta * s.damping_factor;
            phi += self.delta_phi * s.damping_factor;
        } else {
            theta += self.delta_theta;
            phi += self.delta_phi;
        }

        phi = phi.clamp(s.min_polar_angle, s.max_polar_angle);
        phi = phi.clamp(EPS, PI - EPS);

        // Keep the eye inside the camera's clip range so dolly stays reversible.
        let min_radius = s.min_distance.max(camera.near);
        let max_radius = s.max_distance.min(camera.far).max(min_radius);
        radius = (radius * self.scale).clamp(min_radius, max_radius);

        if s.enable_damping {
            self.target += self.pan_offset * s.damping_factor;
        } else {
            self.target += self.pan_offset;
        }

        let sin_phi_radius = phi.sin() * radius;
        let new_offset = Vec3::new(
            sin_phi_radius * theta.sin(),
            phi.cos() * radius,
            sin_phi_radius * theta.cos(),
        );

        if new_offset.is_finite() {
            camera.position = self.target + new_offset;
        } else {
            tracing::warn!(radius, theta, phi, "orbit produced a non-finite offset; camera kept");
        }
        camera.look_at(self.target);

        if s.enable_damping {
            let decay = 1.0 - s.damping_factor;
            self.delta_theta *= decay;
            self.delta_phi *= decay;
            self.pan_offset *= decay;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        let moved = !(self.last_position.distance_squared(camera.position) <= EPS);
        self.last_position = camera.position;
        moved
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(OrbitSettings::default())
    }
}
