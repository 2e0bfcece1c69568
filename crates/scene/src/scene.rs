use crate::node::{Node, NodeKind};
use glam::{Mat4, Vec3};
use roomscene_common::{Color, NodeId};

/// A node paired with its world matrix, produced by [`Scene::flatten`].
#[derive(Debug, Clone, Copy)]
pub struct SceneItem<'a> {
    pub node: &'a Node,
    pub world: Mat4,
}

impl SceneItem<'_> {
    pub fn world_position(&self) -> Vec3 {
        self.world.w_axis.truncate()
    }
}

/// The scene: an ordered list of root nodes and a background color.
///
/// Roots keep insertion order so rendering and inspection are deterministic.
#[derive(Debug, Clone)]
pub struct Scene {
    background: Color,
    roots: Vec<Node>,
    /// Bumped on every mutation.
    revision: u64,
}

impl Scene {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            roots: Vec::new(),
            revision: 0,
        }
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, background: Color) {
        self.background = background;
        self.revision += 1;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Top-level nodes in insertion order.
    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    /// Total node count, groups and their descendants included.
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(Node::subtree_len).sum()
    }

    /// Append a node (and its subtree) to the scene root. Returns its id.
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = node.id;
        tracing::debug!(
            id = %id.short(),
            kind = node.kind.label(),
            name = node.name.as_deref().unwrap_or(""),
            "node added"
        );
        self.roots.push(node);
        self.revision += 1;
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.roots.iter().find_map(|n| n.find(id))
    }

    /// Mutable access bumps the revision whether or not the caller writes.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let node = self.roots.iter_mut().find_map(|n| n.find_mut(id));
        if node.is_some() {
            self.revision += 1;
        }
        node
    }

    /// Move a node within its parent's space.
    pub fn set_position(&mut self, id: NodeId, position: Vec3) -> bool {
        if let Some(node) = self.get_mut(id) {
            node.transform.position = position;
            true
        } else {
            false
        }
    }

    /// Depth-first list of every node with its accumulated world matrix.
    pub fn flatten(&self) -> Vec<SceneItem<'_>> {
        let mut out = Vec::with_capacity(self.node_count());
        for root in &self.roots {
            flatten_into(root, Mat4::IDENTITY, &mut out);
        }
        out
    }

    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.flatten()
            .into_iter()
            .find(|item| item.node.id == id)
            .map(|item| item.world_position())
    }

    /// Deterministic hash of everything that affects rendering.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.background.to_hex().to_le_bytes());
        for item in self.flatten() {
            mix(&mut h, item.node.id.0.as_bytes());
            mix(&mut h, item.node.kind.label().as_bytes());
            for v in item.world.to_cols_array() {
                mix(&mut h, &v.to_le_bytes());
            }
            if let NodeKind::Mesh(mesh) = &item.node.kind {
                for v in mesh.geometry.size().to_array() {
                    mix(&mut h, &v.to_le_bytes());
                }
                mix(&mut h, &mesh.material.color.to_hex().to_le_bytes());
            }
        }
        h
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Color::from_hex(0x000000))
    }
}

fn flatten_into<'a>(node: &'a Node, parent: Mat4, out: &mut Vec<SceneItem<'a>>) {
    let world = parent * node.transform.matrix();
    out.push(SceneItem { node, world });
    for child in node.children() {
        flatten_into(child, world, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{AmbientLight, BoxGeometry, Mesh};

    fn cube() -> Node {
        Node::mesh(Mesh::new(BoxGeometry::new(1.0, 1.0, 1.0), Color::WHITE))
    }

    #[test]
    fn scene_starts_empty() {
        let s = Scene::new(Color::from_hex(0x4a4a4a));
        assert_eq!(s.node_count(), 0);
        assert_eq!(s.revision(), 0);
        assert_eq!(s.background().to_hex(), 0x4a4a4a);
    }

    #[test]
    fn add_and_get() {
        let mut s = Scene::default();
        let id = s.add(cube().named("cube"));
        assert_eq!(s.node_count(), 1);
        assert_eq!(s.get(id).unwrap().name.as_deref(), Some("cube"));
        assert_eq!(s.revision(), 1);
    }

    #[test]
    fn group_children_count_toward_nodes() {
        let mut s = Scene::default();
        s.add(Node::group(vec![cube(), cube(), cube()]));
        assert_eq!(s.roots().len(), 1);
        assert_eq!(s.node_count(), 4);
    }

    #[test]
    fn world_matrix_composes_parent_transform() {
        let mut s = Scene::default();
        let child = cube().at(Vec3::new(1.0, 0.0, 0.0));
        let child_id = child.id;
        s.add(Node::group(vec![child]).at(Vec3::new(0.0, 2.0, 0.0)));
        assert_eq!(s.world_position(child_id), Some(Vec3::new(1.0, 2.0, 0.0)));
    }

    #[test]
    fn set_position_on_missing_node_is_noop() {
        let mut s = Scene::default();
        let before = s.revision();
        assert!(!s.set_position(NodeId::new(), Vec3::ONE));
        assert_eq!(s.revision(), before);
    }

    #[test]
    fn state_hash_tracks_positions() {
        let mut s = Scene::default();
        let id = s.add(cube());
        s.add(Node::new(NodeKind::AmbientLight(AmbientLight {
            color: Color::WHITE,
            intensity: 0.6,
        })));
        let h1 = s.state_hash();
        assert_eq!(h1, s.clone().state_hash());
        s.set_position(id, Vec3::new(0.0, 1.0, 0.0));
        assert_ne!(h1, s.state_hash());
    }

    #[test]
    fn flatten_is_depth_first_in_insertion_order() {
        let mut s = Scene::default();
        let a = cube();
        let b = cube();
        let c = cube();
        let (ia, ib, ic) = (a.id, b.id, c.id);
        let group = Node::group(vec![a, b]);
        let ig = group.id;
        s.add(group);
        s.add(c);
        let order: Vec<NodeId> = s.flatten().iter().map(|i| i.node.id).collect();
        assert_eq!(order, vec![ig, ia, ib, ic]);
    }
}
