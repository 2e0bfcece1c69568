use anyhow::{Context, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use roomscene_builder::{SceneBuilder, SceneConfig, SurfaceInfo};
use roomscene_input::{PointerButton, PointerTracker};
use roomscene_persist::FileStore;
use roomscene_render::PowerPreference;
use roomscene_render_wgpu::{SurfaceTarget, WgpuRenderer};
use roomscene_tools::{FrameStats, OverlayAnchor, StatsPanel};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "roomscene-desktop", about = "Room scene desktop application")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding storage.json
    #[arg(long, default_value = "./roomscene_data")]
    data_dir: PathBuf,

    /// Scene configuration file (JSON); defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Everything tied to the window and GPU device. Created on first resume.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct App {
    scene_config: SceneConfig,
    store: FileStore,
    builder: Option<SceneBuilder>,
    gpu: Option<Gpu>,
    pointer: PointerTracker,
    stats: FrameStats,
    egui_ctx: EguiContext,
}

impl App {
    fn new(scene_config: SceneConfig, store: FileStore) -> Self {
        Self {
            scene_config,
            store,
            builder: None,
            gpu: None,
            pointer: PointerTracker::new(),
            stats: FrameStats::new(Instant::now()),
            egui_ctx: EguiContext::default(),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Room Scene")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let size = window.inner_size();
        let surface_info = SurfaceInfo {
            width: size.width.max(1),
            height: size.height.max(1),
            pixel_ratio: window.scale_factor(),
        };
        let builder = SceneBuilder::init(self.scene_config, &mut self.store, surface_info)?;
        let renderer_config = *builder.renderer_config();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let power_preference = match renderer_config.power_preference {
            PowerPreference::HighPerformance => wgpu::PowerPreference::HighPerformance,
            PowerPreference::LowPower => wgpu::PowerPreference::LowPower,
            PowerPreference::None => wgpu::PowerPreference::None,
        };
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("roomscene_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: surface_info.width,
            height: surface_info.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format, &renderer_config);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            pixel_ratio = surface_info.pixel_ratio,
            antialias = renderer_config.antialias,
            "GPU initialized"
        );

        self.builder = Some(builder);
        self.gpu = Some(Gpu {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        });
        Ok(())
    }

    fn redraw(&mut self) {
        let (Some(gpu), Some(builder)) = (&mut self.gpu, &mut self.builder) else {
            return;
        };
        self.stats.begin(Instant::now());

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                gpu.window.request_redraw();
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                gpu.window.request_redraw();
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        builder.next_frame(&SurfaceTarget {
            renderer: &gpu.renderer,
            device: &gpu.device,
            queue: &gpu.queue,
            view: &view,
        });

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let stats = &mut self.stats;
        let full_output = self.egui_ctx.run(raw_input, |ctx| draw_stats(ctx, stats));
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        self.stats.end(Instant::now());
        gpu.window.request_redraw();
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let (Some(gpu), Some(builder)) = (&mut self.gpu, &mut self.builder) else {
            return;
        };
        gpu.config.width = size.width.max(1);
        gpu.config.height = size.height.max(1);
        gpu.surface.configure(&gpu.device, &gpu.config);
        gpu.renderer
            .resize(&gpu.device, gpu.config.width, gpu.config.height);
        builder.resize(gpu.config.width, gpu.config.height);
    }
}

/// FPS/MS panel pinned to a corner; clicking it cycles the measurement.
fn draw_stats(ctx: &EguiContext, stats: &mut FrameStats) {
    let style = stats.style();
    let (align, offset) = match style.anchor {
        OverlayAnchor::TopLeft => (egui::Align2::LEFT_TOP, egui::vec2(8.0, 8.0)),
        OverlayAnchor::TopRight => (egui::Align2::RIGHT_TOP, egui::vec2(-8.0, 8.0)),
        OverlayAnchor::BottomLeft => (egui::Align2::LEFT_BOTTOM, egui::vec2(8.0, -8.0)),
        OverlayAnchor::BottomRight => (egui::Align2::RIGHT_BOTTOM, egui::vec2(-8.0, -8.0)),
    };
    let order = if style.foreground {
        egui::Order::Foreground
    } else {
        egui::Order::Middle
    };
    let (fg, bg) = match stats.panel() {
        StatsPanel::Fps => (egui::Color32::from_rgb(0, 255, 255), egui::Color32::from_rgb(0, 0, 34)),
        StatsPanel::Ms => (egui::Color32::from_rgb(0, 255, 0), egui::Color32::from_rgb(0, 34, 0)),
    };

    let mut clicked = false;
    egui::Area::new(egui::Id::new("frame_stats"))
        .anchor(align, offset)
        .order(order)
        .show(ctx, |ui| {
            ui.set_opacity(style.opacity);
            egui::Frame::default().fill(bg).show(ui, |ui| {
                let label = ui.add(
                    egui::Label::new(egui::RichText::new(stats.label()).color(fg).monospace())
                        .sense(egui::Sense::click()),
                );
                let (rect, graph) =
                    ui.allocate_exact_size(egui::vec2(74.0, 30.0), egui::Sense::click());
                let max = stats.history_max().max(1.0);
                let painter = ui.painter();
                for (i, sample) in stats.history().enumerate() {
                    let h = rect.height() * (sample / max).clamp(0.0, 1.0);
                    let x = rect.left() + i as f32;
                    painter.line_segment(
                        [egui::pos2(x, rect.bottom()), egui::pos2(x, rect.bottom() - h)],
                        egui::Stroke::new(1.0, fg),
                    );
                }
                clicked = label.clicked() || graph.clicked();
            });
        });

    if clicked {
        stats.cycle_panel();
        tracing::debug!(panel = stats.panel().name(), "stats panel switched");
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            tracing::error!("startup failed: {e:#}");
            event_loop.exit();
            return;
        }
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => self.resize(new_size),
            WindowEvent::MouseInput { button, state, .. } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Primary,
                    MouseButton::Right => PointerButton::Secondary,
                    MouseButton::Middle => PointerButton::Middle,
                    _ => return,
                };
                self.pointer
                    .button(button, state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let action = self
                    .pointer
                    .cursor_moved(position.x as f32, position.y as f32);
                if let (Some(action), Some(builder)) = (action, &mut self.builder) {
                    builder.handle_action(action);
                }
            }
            WindowEvent::CursorLeft { .. } => self.pointer.cursor_left(),
            WindowEvent::MouseWheel { delta, .. } => {
                let action = match delta {
                    MouseScrollDelta::LineDelta(_, y) => self.pointer.wheel(y),
                    MouseScrollDelta::PixelDelta(p) => self.pointer.wheel_pixels(p.y as f32),
                };
                if let (Some(action), Some(builder)) = (action, &mut self.builder) {
                    builder.handle_action(action);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    tracing::info!("roomscene-desktop starting");

    let scene_config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    let store = FileStore::open(&cli.data_dir)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(scene_config, store);
    event_loop.run_app(&mut app)?;

    Ok(())
}
