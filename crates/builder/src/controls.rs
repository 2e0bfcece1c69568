use roomscene_input::{OrbitControls, OrbitSettings};
use roomscene_scene::PerspectiveCamera;

/// Attach orbit controls to the camera and run one update so the camera
/// immediately faces the controls' target.
pub fn bind_orbit_controls(camera: &mut PerspectiveCamera, settings: OrbitSettings) -> OrbitControls {
    let mut controls = OrbitControls::new(settings);
    controls.update(camera);
    tracing::debug!(
        target = ?controls.target(),
        damping = settings.damping_factor,
        zoom_speed = settings.zoom_speed,
        "orbit controls bound"
    );
    controls
}
