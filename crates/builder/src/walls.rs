use crate::config::RoomConfig;
use glam::Vec3;
use roomscene_common::NodeId;
use roomscene_scene::{BoxGeometry, Mesh, Node, Scene};

/// Side length of the square opening framed by a windowed wall.
pub const WINDOW_SIZE: f32 = 1.0;

/// Builds the room's box meshes from a [`RoomConfig`].
#[derive(Debug, Clone, Copy)]
pub struct WallBuilder {
    room: RoomConfig,
}

impl WallBuilder {
    pub fn new(room: RoomConfig) -> Self {
        Self { room }
    }

    /// Add two side walls, front and back walls, and a floor to the scene as a
    /// single group. Returns the group id.
    ///
    /// Side walls sit at `x = ±width/2`, front/back walls at `z = ±depth/2`.
    /// Every mesh casts and receives shadows.
    pub fn create_walls(&self, scene: &mut Scene, width: f32, depth: f32) -> NodeId {
        if !(width > 0.0 && depth > 0.0) {
            tracing::warn!(width, depth, "room dimensions are not positive; geometry will be degenerate");
        }

        let thickness = self.room.wall_thickness;
        let height = self.room.wall_height;
        let wall_color = self.room.wall_color;
        let y = height / 2.0;

        let side = Mesh::new(BoxGeometry::new(thickness, height, depth), wall_color).with_shadows();
        let across =
            Mesh::new(BoxGeometry::new(width + thickness, height, thickness), wall_color).with_shadows();
        let floor = Mesh::new(
            BoxGeometry::new(2.0 * (width + thickness), self.room.floor_thickness, 2.0 * depth),
            self.room.floor_color,
        )
        .with_shadows();

        let left = Node::mesh(side).named("left-wall").at(Vec3::new(width / 2.0, y, 0.0));
        let right = Node::mesh(side).named("right-wall").at(Vec3::new(-width / 2.0, y, 0.0));
        let front = Node::mesh(across).named("front-wall").at(Vec3::new(0.0, y, depth / 2.0));
        let back = Node::mesh(across).named("back-wall").at(Vec3::new(0.0, y, -depth / 2.0));
        let floor = Node::mesh(floor).named("floor");

        tracing::debug!(
            back = ?back.transform.position,
            size = ?across.geometry.size(),
            "back wall built"
        );

        let group = Node::group(vec![left, right, front, back, floor]).named("room");
        let id = scene.add(group);
        tracing::info!(width, depth, group = %id.short(), "room walls added");
        id
    }

    /// Build a wall with a square window cut out: two tall side blocks and two
    /// short blocks above and below the opening.
    ///
    /// The group is returned without being added to any scene and without
    /// being moved to `origin`; placing it is left to the caller.
    pub fn create_windowed_wall(&self, width: f32, height: f32, depth: f32, origin: Vec3) -> Node {
        let big = BoxGeometry::new(width / 2.0 - WINDOW_SIZE, height, depth);
        let small = BoxGeometry::new(WINDOW_SIZE, height / 2.0 - WINDOW_SIZE, depth);
        if big.is_degenerate() || small.is_degenerate() {
            tracing::warn!(width, height, depth, "windowed wall too small for its opening");
        }

        let color = self.room.wall_color;
        let blocks = vec![
            Node::mesh(Mesh::new(big, color)).named("window-side-a"),
            Node::mesh(Mesh::new(big, color)).named("window-side-b"),
            Node::mesh(Mesh::new(small, color)).named("window-sill"),
            Node::mesh(Mesh::new(small, color)).named("window-lintel"),
        ];
        let group = Node::group(blocks).named("windowed-wall");
        tracing::debug!(
            group = %group.id.short(),
            ?origin,
            blocks = group.children().len(),
            "windowed wall built (unattached)"
        );
        group
    }
}

impl Default for WallBuilder {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
