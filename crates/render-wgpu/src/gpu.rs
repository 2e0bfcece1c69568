use crate::lines::{LineVertex, scene_lines};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use roomscene_render::{Renderer, RendererConfig};
use roomscene_scene::{NodeKind, PerspectiveCamera, Scene};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const MAX_INSTANCES: usize = 1024;
const MAX_LINE_VERTICES: usize = 4096;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    ambient: [f32; 4],
    /// `w` is 1 when a point light is present.
    light_position: [f32; 4],
    light_color: [f32; 4],
}

impl Uniforms {
    /// Sum every ambient light; the first point light found drives diffuse.
    fn from_scene(scene: &Scene, camera: &PerspectiveCamera) -> Self {
        let mut ambient = Vec3::ZERO;
        let mut light_position = [0.0; 4];
        let mut light_color = [0.0; 4];
        let mut has_point = false;

        for item in scene.flatten() {
            match &item.node.kind {
                NodeKind::AmbientLight(light) => {
                    ambient += Vec3::from(light.color.to_linear()) * light.intensity;
                }
                NodeKind::PointLight(light) if !has_point => {
                    has_point = true;
                    light_position = item.world_position().extend(1.0).to_array();
                    let c = Vec3::from(light.color.to_linear()) * light.intensity;
                    light_color = c.extend(1.0).to_array();
                }
                _ => {}
            }
        }

        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            ambient: ambient.extend(1.0).to_array(),
            light_position,
            light_color,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
}

/// One instance per box mesh: world matrix scaled by the box size, color in
/// linear space. Degenerate boxes are skipped.
fn mesh_instances(scene: &Scene) -> Vec<InstanceData> {
    let mut instances = Vec::new();
    for item in scene.flatten() {
        let Some(mesh) = item.node.as_mesh() else {
            continue;
        };
        if mesh.geometry.is_degenerate() {
            continue;
        }
        if instances.len() >= MAX_INSTANCES {
            tracing::warn!(max = MAX_INSTANCES, "instance buffer full; remaining meshes skipped");
            break;
        }
        let model = item.world * Mat4::from_scale(mesh.geometry.size());
        let cols = model.to_cols_array_2d();
        let [r, g, b] = mesh.material.color.to_linear();
        instances.push(InstanceData {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color: [r, g, b, 1.0],
        });
    }
    instances
}

/// Unit cube centred on the origin. Each face has its own four vertices so
/// normals stay flat; triangles wind counter-clockwise seen from outside.
fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let faces = [Vec3::Z, Vec3::NEG_Z, Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y];
    let mut vertices = Vec::with_capacity(faces.len() * 4);
    let mut indices = Vec::with_capacity(faces.len() * 6);
    for normal in faces {
        // In-face axes with u × v == normal.
        let u = normal.any_orthonormal_vector();
        let v = normal.cross(u);
        let base = vertices.len() as u16;
        for corner in [-u - v, u - v, u + v, v - u] {
            vertices.push(Vertex {
                position: ((normal + corner) * 0.5).to_array(),
                normal: normal.to_array(),
            });
        }
        indices.extend([0, 1, 2, 2, 3, 0].map(|i| base + i));
    }
    (vertices, indices)
}

/// Color target shared by every pipeline, plus the multisample state that
/// matches the renderer's antialias setting.
struct Targets {
    format: wgpu::TextureFormat,
    sample_count: u32,
}

impl Targets {
    fn color(&self) -> [Option<wgpu::ColorTargetState>; 1] {
        [Some(wgpu::ColorTargetState {
            format: self.format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })]
    }

    fn multisample(&self) -> wgpu::MultisampleState {
        wgpu::MultisampleState {
            count: self.sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        }
    }

    fn depth(&self) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }
    }

    /// Depth-tested pipeline from a WGSL module whose entry points are
    /// `vs_<stage>` and `fs_<stage>`.
    fn pipeline(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        stage: &str,
        source: &str,
        buffers: &[wgpu::VertexBufferLayout<'_>],
        primitive: wgpu::PrimitiveState,
    ) -> wgpu::RenderPipeline {
        let label = format!("{stage}_pipeline");
        let (vs_entry, fs_entry) = (format!("vs_{stage}"), format!("fs_{stage}"));
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(&vs_entry),
                compilation_options: Default::default(),
                buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(&fs_entry),
                compilation_options: Default::default(),
                targets: &self.color(),
            }),
            primitive,
            depth_stencil: Some(self.depth()),
            multisample: self.multisample(),
            multiview: None,
            cache: None,
        })
    }

    /// Render attachment sized to the surface, multisampled to match.
    fn attachment(
        &self,
        device: &wgpu::Device,
        label: &str,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: self.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }

    fn depth_texture(&self, device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        self.attachment(device, "depth_texture", DEPTH_FORMAT, width, height)
    }

    /// Multisampled color target; `None` when rendering straight to the surface.
    fn msaa_texture(&self, device: &wgpu::Device, width: u32, height: u32) -> Option<wgpu::TextureView> {
        (self.sample_count > 1)
            .then(|| self.attachment(device, "msaa_color_texture", self.format, width, height))
    }
}

/// wgpu-based scene renderer.
pub struct WgpuRenderer {
    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    cube_vertex_buffer: wgpu::Buffer,
    cube_index_buffer: wgpu::Buffer,
    cube_index_count: u32,
    line_vertex_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    depth_texture: wgpu::TextureView,
    /// Multisampled color target, present only when `sample_count > 1`.
    msaa_texture: Option<wgpu::TextureView>,
    targets: Targets,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        config: &RendererConfig,
    ) -> Self {
        let targets = Targets {
            format: surface_format,
            sample_count: config.sample_count(),
        };

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let mesh_pipeline = targets.pipeline(
            device,
            &pipeline_layout,
            "mesh",
            shaders::MESH_SHADER,
            &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                    ],
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<InstanceData>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![
                        2 => Float32x4,
                        3 => Float32x4,
                        4 => Float32x4,
                        5 => Float32x4,
                        6 => Float32x4,
                    ],
                },
            ],
            wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
        );

        let line_pipeline = targets.pipeline(
            device,
            &pipeline_layout,
            "line",
            shaders::LINE_SHADER,
            &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<LineVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float32x3,
                    1 => Float32x4,
                ],
            }],
            wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
        );

        let (cube_verts, cube_indices) = cube_mesh();
        let cube_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertex_buffer"),
            contents: bytemuck::cast_slice(&cube_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_index_buffer"),
            contents: bytemuck::cast_slice(&cube_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let cube_index_count = cube_indices.len() as u32;

        // Helper lines move with the light, so this buffer is rewritten per frame.
        let line_vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("line_vertex_buffer"),
            size: (MAX_LINE_VERTICES * std::mem::size_of::<LineVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (MAX_INSTANCES * std::mem::size_of::<InstanceData>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = targets.depth_texture(device, config.width, config.height);
        let msaa_texture = targets.msaa_texture(device, config.width, config.height);

        tracing::info!(
            format = ?surface_format,
            sample_count = targets.sample_count,
            shadows = config.shadow_map_enabled,
            "wgpu renderer created"
        );

        Self {
            mesh_pipeline,
            line_pipeline,
            uniform_buffer,
            uniform_bind_group,
            cube_vertex_buffer,
            cube_index_buffer,
            cube_index_count,
            line_vertex_buffer,
            instance_buffer,
            depth_texture,
            msaa_texture,
            targets,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = self.targets.depth_texture(device, width, height);
        self.msaa_texture = self.targets.msaa_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.targets.format
    }

    pub fn sample_count(&self) -> u32 {
        self.targets.sample_count
    }

    /// Render one frame: clear to the scene background, draw box meshes,
    /// then helper lines.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms::from_scene(scene, camera)),
        );

        let instances = mesh_instances(scene);
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut lines = scene_lines(scene);
        if lines.len() > MAX_LINE_VERTICES {
            tracing::warn!(count = lines.len(), max = MAX_LINE_VERTICES, "helper lines truncated");
            lines.truncate(MAX_LINE_VERTICES);
        }
        if !lines.is_empty() {
            queue.write_buffer(&self.line_vertex_buffer, 0, bytemuck::cast_slice(&lines));
        }

        let [r, g, b] = scene.background().to_linear();
        let clear = wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        };

        // With MSAA, draw into the multisampled target and resolve to the surface.
        let (target, resolve_target, store) = match &self.msaa_texture {
            Some(msaa) => (msaa, Some(view), wgpu::StoreOp::Discard),
            None => (view, None, wgpu::StoreOp::Store),
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if !instances.is_empty() {
                pass.set_pipeline(&self.mesh_pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.cube_vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                pass.set_index_buffer(self.cube_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..self.cube_index_count, 0, 0..instances.len() as u32);
            }

            if !lines.is_empty() {
                pass.set_pipeline(&self.line_pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.line_vertex_buffer.slice(..));
                pass.draw(0..lines.len() as u32, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

/// A [`WgpuRenderer`] bound to one frame's device, queue and surface view,
/// so the frame loop can drive it through the [`Renderer`] trait.
pub struct SurfaceTarget<'a> {
    pub renderer: &'a WgpuRenderer,
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub view: &'a wgpu::TextureView,
}

impl Renderer for SurfaceTarget<'_> {
    type Output = ();

    fn render(&self, scene: &Scene, camera: &PerspectiveCamera) {
        self.renderer.render(self.device, self.queue, self.view, scene, camera);
    }
}
