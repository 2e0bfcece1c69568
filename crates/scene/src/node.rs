use glam::Vec3;
use roomscene_common::{Color, NodeId, Transform};
use serde::{Deserialize, Serialize};

/// Axis-aligned box dimensions, centered on the node origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxGeometry {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl BoxGeometry {
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    pub fn size(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth)
    }

    /// True when any extent is zero, negative or NaN.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0 && self.depth > 0.0)
    }
}

/// Diffuse-only material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertMaterial {
    pub color: Color,
}

/// A box mesh with its material and shadow flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mesh {
    pub geometry: BoxGeometry,
    pub material: LambertMaterial,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(geometry: BoxGeometry, color: Color) -> Self {
        Self {
            geometry,
            material: LambertMaterial { color },
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn with_shadows(mut self) -> Self {
        self.cast_shadow = true;
        self.receive_shadow = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

/// Shadow map parameters carried by a shadow-casting light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    pub map_width: u32,
    pub map_height: u32,
    pub camera_near: f32,
    pub camera_far: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_width: 512,
            map_height: 512,
            camera_near: 0.5,
            camera_far: 500.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    pub cast_shadow: bool,
    pub shadow: ShadowConfig,
}

/// Wireframe marker drawn at the position of the light it tracks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLightHelper {
    pub light: NodeId,
    pub size: f32,
}

/// Red/green/blue lines along +X/+Y/+Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxesHelper {
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group(Vec<Node>),
    Mesh(Mesh),
    AmbientLight(AmbientLight),
    PointLight(PointLight),
    PointLightHelper(PointLightHelper),
    AxesHelper(AxesHelper),
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Group(_) => "group",
            NodeKind::Mesh(_) => "mesh",
            NodeKind::AmbientLight(_) => "ambient_light",
            NodeKind::PointLight(_) => "point_light",
            NodeKind::PointLightHelper(_) => "point_light_helper",
            NodeKind::AxesHelper(_) => "axes_helper",
        }
    }
}

/// A node in the scene tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: Option<String>,
    pub transform: Transform,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            name: None,
            transform: Transform::default(),
            kind,
        }
    }

    pub fn group(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Group(children))
    }

    pub fn mesh(mesh: Mesh) -> Self {
        Self::new(NodeKind::Mesh(mesh))
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Group(children) => children,
            _ => &[],
        }
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_point_light(&self) -> Option<&PointLight> {
        match &self.kind {
            NodeKind::PointLight(light) => Some(light),
            _ => None,
        }
    }

    /// Number of nodes in this subtree, this node included.
    pub fn subtree_len(&self) -> usize {
        1 + self.children().iter().map(Node::subtree_len).sum::<usize>()
    }

    pub(crate) fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(id))
    }

    pub(crate) fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        match &mut self.kind {
            NodeKind::Group(children) => children.iter_mut().find_map(|c| c.find_mut(id)),
            _ => None,
        }
    }
}
