use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use roomscene_common::Color;
use roomscene_scene::{NodeKind, Scene};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    fn new(position: Vec3, color: [f32; 3]) -> Self {
        Self {
            position: position.to_array(),
            color: [color[0], color[1], color[2], 1.0],
        }
    }
}

/// Three axis lines from the helper's origin: X red, Y green, Z blue, each
/// fading slightly toward its tip.
pub fn axes_lines(world: Mat4, size: f32) -> Vec<LineVertex> {
    let origin = world.transform_point3(Vec3::ZERO);
    let axes = [
        (Vec3::X, [1.0, 0.0, 0.0], [1.0, 0.6, 0.0]),
        (Vec3::Y, [0.0, 1.0, 0.0], [0.6, 1.0, 0.0]),
        (Vec3::Z, [0.0, 0.0, 1.0], [0.0, 0.6, 1.0]),
    ];
    axes.iter()
        .flat_map(|&(axis, start, end)| {
            let tip = world.transform_point3(axis * size);
            [
                LineVertex::new(origin, srgb_to_linear(start)),
                LineVertex::new(tip, srgb_to_linear(end)),
            ]
        })
        .collect()
}

/// Wireframe octahedron of radius `size` around a light, in the light's color.
pub fn light_helper_lines(center: Vec3, size: f32, color: Color) -> Vec<LineVertex> {
    let rgb = color.to_linear();
    let top = center + Vec3::Y * size;
    let bottom = center - Vec3::Y * size;
    let ring = [
        center + Vec3::X * size,
        center + Vec3::Z * size,
        center - Vec3::X * size,
        center - Vec3::Z * size,
    ];

    let mut verts = Vec::with_capacity(24);
    for (i, &p) in ring.iter().enumerate() {
        let next = ring[(i + 1) % ring.len()];
        for (a, b) in [(p, next), (p, top), (p, bottom)] {
            verts.push(LineVertex::new(a, rgb));
            verts.push(LineVertex::new(b, rgb));
        }
    }
    verts
}

/// Line geometry for every helper node in the scene.
///
/// Point light helpers are drawn at their light's current world position;
/// a helper whose light is missing draws nothing.
pub fn scene_lines(scene: &Scene) -> Vec<LineVertex> {
    let mut verts = Vec::new();
    for item in scene.flatten() {
        match &item.node.kind {
            NodeKind::AxesHelper(axes) => verts.extend(axes_lines(item.world, axes.size)),
            NodeKind::PointLightHelper(helper) => {
                let Some(light) = scene.get(helper.light).and_then(|n| n.as_point_light()) else {
                    tracing::trace!(light = %helper.light.short(), "helper light missing");
                    continue;
                };
                if let Some(center) = scene.world_position(helper.light) {
                    verts.extend(light_helper_lines(center, helper.size, light.color));
                }
            }
            _ => {}
        }
    }
    verts
}

fn srgb_to_linear([r, g, b]: [f32; 3]) -> [f32; 3] {
    Color { r, g, b }.to_linear()
}
