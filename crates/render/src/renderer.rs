use roomscene_scene::{NodeKind, PerspectiveCamera, Scene};
use std::fmt::Write;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and the camera, then produces output. It
/// never mutates either; the scene builder owns both.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of the scene as seen from the camera.
    fn render(&self, scene: &Scene, camera: &PerspectiveCamera) -> Self::Output;
}

/// Debug text renderer.
///
/// Produces a human-readable listing of the scene. Useful for CLI output,
/// logging, and testing the render interface without a GPU.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, camera: &PerspectiveCamera) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "=== Scene (revision={}, background=#{:06x}) ===",
            scene.revision(),
            scene.background().to_hex()
        );
        let _ = writeln!(out, "Nodes: {}", scene.node_count());
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            camera.position.x,
            camera.position.y,
            camera.position.z,
            camera.target.x,
            camera.target.y,
            camera.target.z,
            camera.fov_degrees
        );

        for item in scene.flatten() {
            let p = item.world_position();
            let _ = write!(
                out,
                "  [{}] {} pos=({:.2}, {:.2}, {:.2})",
                item.node.id.short(),
                item.node.kind.label(),
                p.x,
                p.y,
                p.z
            );
            match &item.node.kind {
                NodeKind::Mesh(mesh) => {
                    let g = mesh.geometry;
                    let _ = write!(
                        out,
                        " size=({:.2}, {:.2}, {:.2}) color=#{:06x}",
                        g.width,
                        g.height,
                        g.depth,
                        mesh.material.color.to_hex()
                    );
                }
                NodeKind::PointLight(light) => {
                    let _ = write!(out, " intensity={:.2}", light.intensity);
                }
                NodeKind::AmbientLight(light) => {
                    let _ = write!(out, " intensity={:.2}", light.intensity);
                }
                NodeKind::Group(children) => {
                    let _ = write!(out, " children={}", children.len());
                }
                NodeKind::PointLightHelper(_) | NodeKind::AxesHelper(_) => {}
            }
            if let Some(name) = &item.node.name {
                let _ = write!(out, " name={name}");
            }
            out.push('\n');
        }

        out
    }
}
