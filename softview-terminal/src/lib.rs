/// Terminal front-end for the software renderer
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use log::{info, warn};
use std::io::{self, stdout, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use softview_core::{
    obj, Camera, Color as Rgb, Lighting, MathError, Mesh, ObjError, PixelBuffer, RenderEngine, RenderParams,
    RenderStats, RenderingModes, Scene, Texture, Vec3, ViewerConfig,
};

pub mod presenter;

pub use presenter::HalfBlockPresenter;

const ORBIT_STEP: f32 = 0.1;
const ZOOM_STEP: f32 = 0.5;
const MOVE_STEP: f32 = 0.2;
const PAN_STEP: f32 = 0.1;
const ROTATE_STEP: f32 = 0.1;
const SCALE_STEP: f32 = 1.1;

/// Interactive viewer: owns the scene and view state and re-renders only
/// after something changed
pub struct TerminalApp {
    scene: Scene,
    camera: Camera,
    /// Saved views, drawn as markers while another view is active
    helper_cameras: Vec<Camera>,
    lighting: Lighting,
    modes: RenderingModes,
    texture: Option<Texture>,
    base_color: Rgb,
    wire_color: Rgb,
    background: Rgb,
    engine: RenderEngine,
    canvas: PixelBuffer,
    presenter: HalfBlockPresenter,
    stats: RenderStats,
    frame_time: Duration,
    save_dir: PathBuf,
    running: bool,
    dirty: bool,
}

impl TerminalApp {
    pub fn new(scene: Scene, config: &ViewerConfig, texture: Option<Texture>) -> io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        Self::with_size(scene, config, texture, cols, rows)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
    }

    /// Build the app for a terminal of `cols` x `rows` cells. The first row is
    /// kept for the status line.
    pub fn with_size(
        scene: Scene,
        config: &ViewerConfig,
        texture: Option<Texture>,
        cols: u16,
        rows: u16,
    ) -> Result<Self, MathError> {
        let presenter = HalfBlockPresenter::new(1);
        let (width, height) = presenter.buffer_size(cols, rows);
        let camera = config.camera(width as f32 / height as f32);
        let lighting = config.lighting(&camera)?;
        let params = config.render_params();

        Ok(Self {
            scene,
            camera,
            helper_cameras: Vec::new(),
            lighting,
            modes: config.modes,
            texture,
            base_color: params.base_color,
            wire_color: params.wire_color,
            background: params.background,
            engine: RenderEngine::new(),
            canvas: PixelBuffer::new(width, height),
            presenter,
            stats: RenderStats::default(),
            frame_time: Duration::ZERO,
            save_dir: PathBuf::from("."),
            running: true,
            dirty: true,
        })
    }

    /// Directory that edited models are written to
    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = dir.into();
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn helper_cameras(&self) -> &[Camera] {
        &self.helper_cameras
    }

    pub fn modes(&self) -> RenderingModes {
        self.modes
    }

    pub fn canvas(&self) -> &PixelBuffer {
        &self.canvas
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
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
        while self.running {
            if self.dirty {
                self.render_frame();
                self.present()?;
            }

            if event::poll(Duration::from_millis(100))? {
                match event::read()? {
                    Event::Key(KeyEvent {
                        code,
                        kind: KeyEventKind::Press | KeyEventKind::Repeat,
                        ..
                    }) => self.handle_key(code),
                    Event::Resize(cols, rows) => self.resize(cols, rows),
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Apply one key press to the view state
    pub fn handle_key(&mut self, code: KeyCode) {
        let changed = match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
                false
            }

            // Orbit
            KeyCode::Left => self.orbit(-ORBIT_STEP, 0.0),
            KeyCode::Right => self.orbit(ORBIT_STEP, 0.0),
            KeyCode::Up => self.orbit(0.0, -ORBIT_STEP),
            KeyCode::Down => self.orbit(0.0, ORBIT_STEP),
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom(-ZOOM_STEP),
            KeyCode::Char('-') | KeyCode::Char('_') => self.zoom(ZOOM_STEP),

            // Fly
            KeyCode::Char('w') => self.fly(MOVE_STEP, 0.0),
            KeyCode::Char('s') => self.fly(-MOVE_STEP, 0.0),
            KeyCode::Char('a') => self.fly(0.0, -MOVE_STEP),
            KeyCode::Char('d') => self.fly(0.0, MOVE_STEP),

            // Pan
            KeyCode::Char('i') => self.pan(0.0, PAN_STEP),
            KeyCode::Char('k') => self.pan(0.0, -PAN_STEP),
            KeyCode::Char('j') => self.pan(-PAN_STEP, 0.0),
            KeyCode::Char('l') => self.pan(PAN_STEP, 0.0),

            // Modes
            KeyCode::Char('1') => toggle(&mut self.modes.wireframe),
            KeyCode::Char('2') => toggle(&mut self.modes.texture),
            KeyCode::Char('3') => toggle(&mut self.modes.lighting),

            // Active model
            KeyCode::Char(c @ ('x' | 'y' | 'z' | 'X' | 'Y' | 'Z')) => {
                let step = if c.is_ascii_uppercase() { -ROTATE_STEP } else { ROTATE_STEP };
                let axis = match c.to_ascii_lowercase() {
                    'x' => Vec3::x(),
                    'y' => Vec3::y(),
                    _ => Vec3::z(),
                };
                self.with_active(|mesh| mesh.transform_mut().rotate(axis * step))
            }
            KeyCode::Char('>') | KeyCode::Char('.') => {
                self.with_active(|mesh| mesh.transform_mut().scale_by(Vec3::repeat(SCALE_STEP)))
            }
            KeyCode::Char('<') | KeyCode::Char(',') => {
                self.with_active(|mesh| mesh.transform_mut().scale_by(Vec3::repeat(1.0 / SCALE_STEP)))
            }
            KeyCode::Char('r') => self.with_active(|mesh| {
                mesh.reset_transformations();
                mesh.reset_to_original();
            }),
            KeyCode::Tab => {
                self.scene.cycle_active();
                self.scene.len() > 1
            }

            // Editing
            KeyCode::Char('v') => self.with_active(|mesh| {
                if let Some(last) = mesh.vertex_count().checked_sub(1) {
                    mesh.remove_vertex(last);
                }
            }),
            KeyCode::Char('p') => self.with_active(|mesh| {
                if let Some(last) = mesh.polygon_count().checked_sub(1) {
                    mesh.remove_polygon(last);
                }
            }),
            KeyCode::Delete | KeyCode::Backspace => match self.scene.active_index() {
                Some(index) => self.scene.remove(index).is_some(),
                None => false,
            },
            KeyCode::Char('o') => {
                match self.save_active() {
                    Ok(Some(path)) => info!("saved {}", path.display()),
                    Ok(None) => {}
                    Err(e) => warn!("save failed: {}", e),
                }
                false
            }

            // Helper cameras
            KeyCode::Char('c') => {
                self.helper_cameras.push(self.camera.clone());
                true
            }
            KeyCode::Char('n') => self.next_camera(),
            KeyCode::Char('m') => self.helper_cameras.pop().is_some(),
            _ => false,
        };
        self.dirty |= changed;
    }

    /// Follow a terminal resize
    pub fn resize(&mut self, cols: u16, rows: u16) {
        let (width, height) = self.presenter.buffer_size(cols, rows);
        self.canvas.resize(width, height);
        self.camera.set_aspect_ratio(width as f32 / height as f32);
        self.dirty = true;
    }

    /// Render the active model into the pixel buffer and clear the dirty flag
    pub fn render_frame(&mut self) -> RenderStats {
        let start = Instant::now();
        let params = RenderParams {
            modes: self.modes,
            base_color: self.base_color,
            wire_color: self.wire_color,
            background: self.background,
            texture: self.texture.as_ref(),
            lighting: Some(&self.lighting),
            helper_cameras: &self.helper_cameras,
        };
        self.stats = match self.scene.active() {
            Some(mesh) => self.engine.render(&mut self.canvas, &self.camera, mesh, &params),
            None => RenderStats::default(),
        };
        self.frame_time = start.elapsed();
        self.dirty = false;
        self.stats
    }

    /// Write the active model to `<save_dir>/<name>.edited.obj`.
    /// `Ok(None)` when there is nothing to save.
    pub fn save_active(&self) -> Result<Option<PathBuf>, ObjError> {
        let Some(mesh) = self.scene.active() else {
            return Ok(None);
        };
        let path = edited_path(&self.save_dir, &mesh.name);
        obj::save(mesh, &path)?;
        Ok(Some(path))
    }

    fn present(&mut self) -> io::Result<()> {
        let mut stdout = stdout();
        self.presenter.draw(&self.canvas, &mut stdout)?;

        let name = self.scene.active().map_or("(empty)", |m| m.name.as_str());
        let flag = |on: bool| if on { "on" } else { "off" };
        let status = format!(
            "{} [{}/{}] cams {} | faces {} culled {} | {:.1} ms | 1:wire {} 2:tex {} 3:light {} | arrows/+-/wasd/ijkl/xyz/<>/r/Tab v/p/Del/o c/n/m q=quit",
            name,
            self.scene.active_index().map_or(0, |i| i + 1),
            self.scene.len(),
            self.helper_cameras.len(),
            self.stats.faces_drawn,
            self.stats.faces_culled,
            self.frame_time.as_secs_f32() * 1000.0,
            flag(self.modes.wireframe),
            flag(self.modes.texture),
            flag(self.modes.lighting),
        );
        // Keep the status on its own row
        let (cols, _) = terminal::size()?;
        let status: String = status.chars().take(cols as usize).collect();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(status),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }

    fn orbit(&mut self, delta_azimuth: f32, delta_polar: f32) -> bool {
        self.camera.rotate(delta_azimuth, delta_polar);
        self.follow_camera()
    }

    fn zoom(&mut self, delta: f32) -> bool {
        self.camera.zoom(delta);
        self.follow_camera()
    }

    /// Move eye and target together along the view direction and its right
    fn fly(&mut self, forward: f32, right: f32) -> bool {
        let (f, r, _) = match self.camera.basis() {
            Ok(basis) => basis,
            Err(e) => {
                warn!("cannot fly: {}", e);
                return false;
            }
        };
        let delta = f * forward + r * right;
        self.camera.move_target(delta);
        self.camera.move_position(delta);
        self.follow_camera()
    }

    fn pan(&mut self, dx: f32, dy: f32) -> bool {
        if let Err(e) = self.camera.pan(dx, dy) {
            warn!("cannot pan: {}", e);
            return false;
        }
        self.follow_camera()
    }

    /// Switch to the oldest saved view; the current view joins the back of
    /// the list
    fn next_camera(&mut self) -> bool {
        if self.helper_cameras.is_empty() {
            return false;
        }
        let mut next = self.helper_cameras.remove(0);
        next.set_aspect_ratio(self.camera.aspect_ratio());
        let previous = std::mem::replace(&mut self.camera, next);
        self.helper_cameras.push(previous);
        self.follow_camera()
    }

    /// Keep the camera-mounted light in step with the camera
    fn follow_camera(&mut self) -> bool {
        if let Err(e) = self.lighting.update(&self.camera) {
            warn!("light direction unchanged: {}", e);
        }
        true
    }

    fn with_active(&mut self, f: impl FnOnce(&mut Mesh)) -> bool {
        match self.scene.active_mut() {
            Some(mesh) => {
                f(mesh);
                true
            }
            None => false,
        }
    }
}

fn edited_path(dir: &Path, name: &str) -> PathBuf {
    let stem = if name.is_empty() { "model" } else { name };
    dir.join(format!("{stem}.edited.obj"))
}

fn toggle(flag: &mut bool) -> bool {
    *flag = !*flag;
    true
}
