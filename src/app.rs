use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::camera::Camera;
use crate::color::Color;
use crate::config::WindowConfig;
use crate::error::AppError;
use crate::gpu::GpuContext;
use crate::handles::{MeshId, TextureId};
use crate::light::SpotLight;
use crate::material::Material;
use crate::mesh::{Mesh, SphereGeometry, Transform};
use crate::mesh_pass::MeshPass;
use crate::scene::Scene;
use crate::texture::Texture;

/// Context provided during app setup.
///
/// Meshes and textures registered here live for the whole run; the returned
/// handles are what the frame closure draws with.
pub struct SetupContext<'a> {
    pub gpu: &'a GpuContext,
    pub camera: &'a mut Camera,
    pub light: &'a mut SpotLight,
    scene: &'a mut Scene,
    clear_color: &'a mut Color,
}

impl SetupContext<'_> {
    /// Set the color the screen is cleared to every frame.
    pub fn background(&mut self, color: Color) -> &mut Self {
        *self.clear_color = color;
        self
    }

    /// Create a UV sphere mesh and return its handle.
    pub fn mesh_sphere(&mut self, radius: f32, width_segments: u32, height_segments: u32) -> MeshId {
        let geometry = SphereGeometry::new(radius, width_segments, height_segments);
        self.add_mesh(Mesh::sphere(self.gpu, geometry))
    }

    /// Add a custom mesh and return its handle.
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.scene.add_mesh(mesh)
    }

    /// Add a texture and return its handle.
    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        self.scene.add_texture(texture)
    }

    /// Load a texture from a file path and return its handle.
    pub fn texture_from_file(&mut self, path: &str) -> Result<TextureId, image::ImageError> {
        let texture = Texture::from_file(self.gpu, path)?;
        Ok(self.add_texture(texture))
    }

    /// Load a texture from embedded bytes and return its handle.
    pub fn texture_from_bytes(
        &mut self,
        bytes: &[u8],
        label: &str,
    ) -> Result<TextureId, image::ImageError> {
        let texture = Texture::from_bytes(self.gpu, bytes, label)?;
        Ok(self.add_texture(texture))
    }

    /// Build a wireframe cone for the current light and return its handle.
    ///
    /// The geometry is captured now; moving the light later does not move
    /// the helper.
    pub fn light_helper(&mut self, segments: u32) -> MeshId {
        let (vertices, indices) = self.light.helper_geometry(segments);
        self.add_mesh(Mesh::lines(self.gpu, &vertices, &indices))
    }
}

/// Context provided each frame for rendering.
pub struct Frame<'a> {
    /// GPU context for advanced rendering.
    pub gpu: &'a GpuContext,
    /// Current camera state.
    pub camera: &'a mut Camera,
    pub light: &'a mut SpotLight,
    /// Total elapsed time in seconds.
    pub time: f32,
    /// Delta time since last frame in seconds.
    pub dt: f32,
    /// Number of frames rendered before this one.
    pub frame_index: u64,
    scene: &'a mut Scene,
}

impl Frame<'_> {
    /// Current frames per second.
    pub fn fps(&self) -> f32 {
        if self.dt > 0.0 { 1.0 / self.dt } else { 0.0 }
    }

    /// Screen width in pixels.
    pub fn width(&self) -> u32 {
        self.gpu.width()
    }

    /// Screen height in pixels.
    pub fn height(&self) -> u32 {
        self.gpu.height()
    }

    /// Queue a mesh for this frame.
    pub fn draw_mesh(&mut self, mesh: MeshId, transform: Transform, material: Material) {
        self.scene.draw(mesh, transform, material);
    }
}

/// Configuration for the app window.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from(&WindowConfig::default())
    }
}

impl From<&WindowConfig> for AppConfig {
    fn from(window: &WindowConfig) -> Self {
        Self {
            title: window.title.clone(),
            width: window.width,
            height: window.height,
            vsync: window.vsync,
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

    pub fn vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }
}

/// Run an application with setup and frame closures.
///
/// # Example
/// ```no_run
/// use jovian::{Material, Transform};
///
/// jovian::run(|ctx| {
///     let ball = ctx.mesh_sphere(1.0, 32, 32);
///
///     move |frame| {
///         frame.draw_mesh(ball, Transform::new(), Material::lambert());
///     }
/// })
/// .unwrap();
/// ```
pub fn run<S, F>(setup: S) -> Result<(), AppError>
where
    S: FnOnce(&mut SetupContext) -> F + 'static,
    F: FnMut(&mut Frame) + 'static,
{
    run_with_config(AppConfig::default(), setup)
}

/// Run an application with custom window configuration.
///
/// Returns once the window is closed, or with the first error that stopped
/// the loop.
pub fn run_with_config<S, F>(config: AppConfig, setup: S) -> Result<(), AppError>
where
    S: FnOnce(&mut SetupContext) -> F + 'static,
    F: FnMut(&mut Frame) + 'static,
{
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = JovianApp::Pending {
        config,
        setup: Some(Box::new(
            move |ctx: &mut SetupContext| -> Box<dyn FnMut(&mut Frame)> { Box::new(setup(ctx)) },
        )),
    };

    event_loop.run_app(&mut app)?;

    match app {
        JovianApp::Failed(Some(err)) => Err(err),
        _ => Ok(()),
    }
}

type SetupFn = Box<dyn FnOnce(&mut SetupContext) -> Box<dyn FnMut(&mut Frame)>>;

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    scene: Scene,
    mesh_pass: MeshPass,
    camera: Camera,
    light: SpotLight,
    clear_color: Color,
    frame_fn: Box<dyn FnMut(&mut Frame)>,
    start_time: Instant,
    last_frame: Instant,
    frame_index: u64,
}

enum JovianApp {
    Pending {
        config: AppConfig,
        setup: Option<SetupFn>,
    },
    Running(Box<Running>),
    Failed(Option<AppError>),
}

impl JovianApp {
    fn start(
        event_loop: &ActiveEventLoop,
        config: &AppConfig,
        setup: SetupFn,
    ) -> Result<Running, AppError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(window.clone(), config.vsync)?;
        let mesh_pass = MeshPass::new(&gpu);

        let mut scene = Scene::new();
        let mut camera = Camera::new();
        let mut light = SpotLight::default();
        let mut clear_color = Color::BLACK;

        let frame_fn = {
            let mut ctx = SetupContext {
                gpu: &gpu,
                camera: &mut camera,
                light: &mut light,
                scene: &mut scene,
                clear_color: &mut clear_color,
            };
            setup(&mut ctx)
        };

        tracing::info!(
            meshes = scene.meshes.len(),
            textures = scene.textures.len(),
            width = gpu.width(),
            height = gpu.height(),
            "setup complete"
        );

        let now = Instant::now();
        Ok(Running {
            window,
            gpu,
            scene,
            mesh_pass,
            camera,
            light,
            clear_color,
            frame_fn,
            start_time: now,
            last_frame: now,
            frame_index: 0,
        })
    }
}

impl ApplicationHandler for JovianApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let JovianApp::Pending { config, setup } = self else {
            return;
        };
        let Some(setup) = setup.take() else {
            return;
        };

        match Self::start(event_loop, config, setup) {
            Ok(running) => {
                running.window.request_redraw();
                *self = JovianApp::Running(Box::new(running));
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to start");
                *self = JovianApp::Failed(Some(err));
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let JovianApp::Running(app) = self else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                app.gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                if !app.redraw() {
                    event_loop.exit();
                    return;
                }
                app.window.request_redraw();
            }
            _ => {}
        }
    }
}

impl Running {
    /// Runs the frame closure and presents. Returns `false` when the loop
    /// cannot continue.
    fn redraw(&mut self) -> bool {
        let now = Instant::now();
        let time = self.start_time.elapsed().as_secs_f32();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                return true;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("out of GPU memory acquiring the surface");
                return false;
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping frame");
                return true;
            }
        };

        // Clear mesh queue for new frame
        self.scene.clear_queue();

        let mut frame = Frame {
            gpu: &self.gpu,
            camera: &mut self.camera,
            light: &mut self.light,
            time,
            dt,
            frame_index: self.frame_index,
            scene: &mut self.scene,
        };
        (self.frame_fn)(&mut frame);
        self.frame_index += 1;

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.mesh_pass.render(
            &self.gpu,
            &mut encoder,
            &view,
            &self.scene,
            &self.camera,
            &self.light,
            self.clear_color,
            time,
        );

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        output.present();
        true
    }
}
