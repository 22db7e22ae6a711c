use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::camera::Camera;
use crate::error::{Error, Result};
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Transform};
use crate::shade::{Light, ShadedTorus, Spin};
use crate::shade_pass::ShadePass;
use crate::torus::{TorusMesh, TorusParams};

/// Configuration for the window and the scene it shows.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub torus: TorusParams,
    pub transform: Transform,
    pub spin: Spin,
    pub light: Light,
    /// The active camera. With `None` the torus is never updated or drawn.
    pub camera: Option<Camera>,
    pub clear_color: wgpu::Color,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Shade".to_string(),
            width: 800,
            height: 600,
            torus: TorusParams::default(),
            transform: Transform::default(),
            spin: Spin::default(),
            light: Light::default(),
            camera: Some(Camera::default()),
            clear_color: wgpu::Color {
                r: 0.05,
                g: 0.05,
                b: 0.08,
                a: 1.0,
            },
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn torus(mut self, torus: TorusParams) -> Self {
        self.torus = torus;
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn spin(mut self, spin: Spin) -> Self {
        self.spin = spin;
        self
    }

    pub fn light(mut self, light: Light) -> Self {
        self.light = light;
        self
    }

    pub fn camera(mut self, camera: Option<Camera>) -> Self {
        self.camera = camera;
        self
    }

    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }
}

/// Open a window and render the tumbling torus until it is closed.
///
/// The torus is tessellated and uploaded once when the window appears;
/// every redraw then updates and draws it.
///
/// # Example
/// ```no_run
/// use shade::{AppConfig, Light, Vec3};
///
/// shade::run(
///     AppConfig::new()
///         .title("Torus")
///         .size(1280, 720)
///         .light(Light::at(Vec3::new(0.0, 5.0, 5.0))),
/// )
/// .unwrap();
/// ```
pub fn run(config: AppConfig) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ShadeApp::Pending { config };
    event_loop.run_app(&mut app)?;

    match app {
        ShadeApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

enum ShadeApp {
    Pending {
        config: AppConfig,
    },
    Running {
        window: Arc<Window>,
        gpu: GpuContext,
        pass: ShadePass,
        mesh: Mesh,
        object: ShadedTorus,
        camera: Option<Camera>,
        clear_color: wgpu::Color,
        last_frame: Instant,
    },
    Failed(Error),
}

impl ShadeApp {
    fn start(config: &AppConfig, event_loop: &ActiveEventLoop) -> Result<Self> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(window.clone())?;

        let torus = TorusMesh::try_new(config.torus)?;
        let mesh = Mesh::torus(&gpu, &torus);
        let pass = ShadePass::new(&gpu);
        let object = ShadedTorus::new(torus, config.light)
            .with_transform(config.transform)
            .with_spin(config.spin);

        tracing::info!(
            width = gpu.width(),
            height = gpu.height(),
            triangles = object.mesh().triangle_count(),
            "renderer ready"
        );

        Ok(ShadeApp::Running {
            window,
            gpu,
            pass,
            mesh,
            object,
            camera: config.camera,
            clear_color: config.clear_color,
            last_frame: Instant::now(),
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: Error) {
        tracing::error!("{err}");
        *self = ShadeApp::Failed(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for ShadeApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let ShadeApp::Pending { config } = self else {
            return;
        };

        match Self::start(config, event_loop) {
            Ok(running) => *self = running,
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let ShadeApp::Running {
            window,
            gpu,
            pass,
            mesh,
            object,
            camera,
            clear_color,
            last_frame,
        } = self
        else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now.duration_since(*last_frame).as_secs_f32();
                *last_frame = now;

                pass.ensure_depth_size(gpu);

                let output = match gpu.surface.get_current_texture() {
                    Ok(output) => output,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        tracing::debug!("surface lost or outdated, reconfiguring");
                        gpu.reconfigure();
                        window.request_redraw();
                        return;
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        self.fail(event_loop, Error::OutOfMemory);
                        return;
                    }
                    Err(e) => {
                        tracing::warn!("skipping frame: {e}");
                        window.request_redraw();
                        return;
                    }
                };

                // Only a frame that will be presented advances the tumble.
                let matrices = camera.as_ref().map(|c| c.matrices(gpu.aspect()));
                if let Some(params) = object.update(matrices.as_ref(), dt) {
                    pass.upload(gpu, params);
                }

                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                let mut encoder = gpu
                    .device
                    .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                        label: Some("Shade Encoder"),
                    });

                {
                    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("Shade Pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(*clear_color),
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        })],
                        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                            view: pass.depth_view(),
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(1.0),
                                store: wgpu::StoreOp::Store,
                            }),
                            stencil_ops: None,
                        }),
                        timestamp_writes: None,
                        occlusion_query_set: None,
                    });

                    // Nothing has been projected yet without a camera.
                    if object.params().is_some() {
                        pass.render(&mut render_pass, mesh);
                    }
                }

                gpu.queue.submit(std::iter::once(encoder.finish()));
                output.present();

                window.request_redraw();
            }
            _ => {}
        }
    }
}
