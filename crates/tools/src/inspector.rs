use roomscene_common::NodeId;
use roomscene_scene::{NodeKind, Scene};

/// Scene inspector for developer tooling.
///
/// Read-only queries against the scene for debugging and the overlay UI.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene.
    pub fn summary(scene: &Scene) -> SceneSummary {
        let mut summary = SceneSummary {
            revision: scene.revision(),
            node_count: scene.node_count(),
            ..SceneSummary::default()
        };
        for item in scene.flatten() {
            match &item.node.kind {
                NodeKind::Group(_) => summary.groups += 1,
                NodeKind::Mesh(mesh) => {
                    summary.meshes += 1;
                    if mesh.cast_shadow {
                        summary.shadow_casters += 1;
                    }
                }
                NodeKind::AmbientLight(_) | NodeKind::PointLight(_) => summary.lights += 1,
                NodeKind::PointLightHelper(_) | NodeKind::AxesHelper(_) => summary.helpers += 1,
            }
        }
        summary
    }

    /// Position of a node in world space, formatted for display.
    pub fn describe(scene: &Scene, id: NodeId) -> Option<String> {
        let node = scene.get(id)?;
        let p = scene.world_position(id)?;
        Some(format!(
            "[{}] {} pos=({:.2}, {:.2}, {:.2})",
            id.short(),
            node.name.as_deref().unwrap_or(node.kind.label()),
            p.x,
            p.y,
            p.z
        ))
    }
}

/// Summary of scene contents for the inspector.
#[derive(Debug, Clone, Default)]
pub struct SceneSummary {
    pub revision: u64,
    pub node_count: usize,
    pub groups: usize,
    pub meshes: usize,
    pub shadow_casters: usize,
    pub lights: usize,
    pub helpers: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: revision={} nodes={} meshes={} lights={} helpers={}",
            self.revision, self.node_count, self.meshes, self.lights, self.helpers
        )
    }
}
