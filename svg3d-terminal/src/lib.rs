//! Terminal front-end: renders a scene into character cells with crossterm

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use std::io::{self, stdout, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};
use svg3d_core::{
    frame_object, shading, BufferGeometry, Camera, Euler, FrameTarget, Material, NodeId, NodeKind,
    Renderer, RendererOptions, Scene,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub mod surface;

pub use surface::AsciiSurface;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f32 = 0.5;

/// Fraction of the view height the model should fill
const FRAME_FRACTION: f32 = 0.9;

/// Initialize logging with tracing.
///
/// Filtering comes from `RUST_LOG` (default `warn`) and output goes to stderr
/// so it does not interleave with the rendered frame on stdout.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // a subscriber may already be installed (tests, embedding apps)
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .try_init();
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    scene: Scene,
    camera: NodeId,
    model: NodeId,
    rotation: Euler,
    renderer: Renderer,
    surface: AsciiSurface,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
    triangles: usize,
}

impl TerminalApp {
    /// Build the scene around `geometry`, sized to the current terminal.
    pub fn new(geometry: BufferGeometry, options: RendererOptions) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let (width, height) = (width as u32, height as u32);

        let mut scene = Scene::new();
        let geometry = Arc::new(geometry);
        let material = Material::default().with_shader(shading::diffuse(Material::DEFAULT_COLOR));
        let model = scene.spawn_mesh(geometry.clone(), Arc::new(material));
        scene.add(scene.root(), model);

        let camera = scene.spawn_camera(Camera::default());
        scene.add(scene.root(), camera);
        frame_object(&mut scene, camera, FrameTarget::Geometry(&geometry), FRAME_FRACTION);

        let mut app = Self {
            scene,
            camera,
            model,
            rotation: Euler::new(0.3, 0.3, 0.0),
            renderer: Renderer::new(options),
            surface: AsciiSurface::new(width as usize, height as usize),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
            triangles: 0,
        };
        app.resize(width, height);
        Ok(app)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            if event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            self.update();
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        match event::read()? {
            Event::Key(KeyEvent { code, .. }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.running = false;
                }
                KeyCode::Char('w') | KeyCode::Up => {
                    self.rotation.rotate(0.1, 0.0, 0.0);
                }
                KeyCode::Char('s') | KeyCode::Down => {
                    self.rotation.rotate(-0.1, 0.0, 0.0);
                }
                KeyCode::Char('a') | KeyCode::Left => {
                    self.rotation.rotate(0.0, -0.1, 0.0);
                }
                KeyCode::Char('d') | KeyCode::Right => {
                    self.rotation.rotate(0.0, 0.1, 0.0);
                }
                KeyCode::Char('e') => {
                    self.rotation.rotate(0.0, 0.0, 0.1);
                }
                KeyCode::Char('r') => {
                    self.rotation.rotate(0.0, 0.0, -0.1);
                }
                KeyCode::Char('f') => {
                    self.toggle_wireframe();
                }
                KeyCode::Char('c') => {
                    let cull = !self.renderer.options().cull_faces;
                    self.renderer.set_cull_faces(cull);
                }
                _ => {}
            },
            Event::Resize(width, height) => {
                self.resize(width as u32, height as u32);
            }
            _ => {}
        }
        Ok(())
    }

    /// Match the render size and camera aspect to the terminal grid.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.set_size(width, height);
        if let Some(camera) = self.scene.camera_mut(self.camera) {
            camera.aspect = width as f32 / height.max(1) as f32 * CELL_ASPECT;
            camera.update_projection_matrix();
        }
        tracing::debug!(width, height, "terminal resized");
    }

    fn toggle_wireframe(&mut self) {
        let Some(node) = self.scene.get_mut(self.model) else {
            return;
        };
        if let NodeKind::Mesh(mesh) = &mut node.kind {
            let material = Arc::make_mut(&mut mesh.material);
            material.wireframe = !material.wireframe;
        }
    }

    fn update(&mut self) {
        // Continuous slow rotation for demo effect
        self.rotation.rotate(0.01, 0.015, 0.0);
        self.scene.set_rotation_from_euler(self.model, &self.rotation);
    }

    /// Render one frame into the character grid without touching the terminal.
    pub fn render_frame(&mut self) -> &AsciiSurface {
        let stats = self
            .renderer
            .render(&mut self.scene, self.camera, &mut self.surface);
        self.triangles = stats.emitted;
        &self.surface
    }

    fn render(&mut self) -> io::Result<()> {
        self.render_frame();

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.surface.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "SVG3D Terminal | FPS: {:.1} | Tris: {} | WASD/Arrows=Rotate E/R=Roll F=Wireframe C=Cull Q=Quit",
                self.fps, self.triangles
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
