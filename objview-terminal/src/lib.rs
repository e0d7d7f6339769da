/// Terminal-based viewer for OBJ models
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use log::{info, warn};
use nalgebra::Vector3;
use objview_core::{Camera, Model, Movement, Projection, RotationState, Transform};
use std::io::{self, stdout, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;

pub mod buffer;
pub mod renderer;

pub use buffer::{BufferError, MeshBuffers};
pub use renderer::{AsciiRenderer, PolygonMode};

/// Model spin per frame, one degree around y
const SPIN_PER_FRAME: f32 = std::f32::consts::PI / 180.0;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Terminal error: {0}")]
    Io(#[from] io::Error),
    #[error("Could not upload the model: {0}")]
    Buffer(#[from] BufferError),
}

/// Viewer options that do not come from the model itself
#[derive(Debug, Clone)]
pub struct ViewerSettings {
    pub fov_degrees: f32,
    pub textures: Vec<PathBuf>,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            textures: Vec::new(),
        }
    }
}

/// What a key press asks the viewer to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Movement),
    CyclePolygonMode,
    CycleTexture,
    Quit,
}

impl Command {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        let command = match code {
            KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
            KeyCode::Char('w') => Command::Move(Movement::Forward),
            KeyCode::Char('s') => Command::Move(Movement::Backward),
            KeyCode::Char('a') => Command::Move(Movement::Left),
            KeyCode::Char('d') => Command::Move(Movement::Right),
            KeyCode::Char(' ') => Command::Move(Movement::Up),
            KeyCode::Char('c') => Command::Move(Movement::Down),
            KeyCode::Up => Command::Move(Movement::PitchUp),
            KeyCode::Down => Command::Move(Movement::PitchDown),
            KeyCode::Right => Command::Move(Movement::RotateRight),
            KeyCode::Left => Command::Move(Movement::RotateLeft),
            KeyCode::Char('m') => Command::CyclePolygonMode,
            KeyCode::Char('t') => Command::CycleTexture,
            _ => return None,
        };
        Some(command)
    }
}

/// Raw mode and the alternate screen, restored on drop
struct TerminalSession<W: Write> {
    out: W,
    raw_mode: bool,
    alternate_screen: bool,
}

impl<W: Write> TerminalSession<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            raw_mode: false,
            alternate_screen: false,
        }
    }

    fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.raw_mode = true;
        self.enter_screen()
    }

    fn enter_screen(&mut self) -> io::Result<()> {
        self.alternate_screen = true;
        execute!(self.out, terminal::EnterAlternateScreen, cursor::Hide)
    }

    fn restore(&mut self) {
        if self.alternate_screen {
            if let Err(e) = execute!(self.out, terminal::LeaveAlternateScreen, cursor::Show) {
                warn!("Failed to leave the alternate screen: {}", e);
            }
            self.alternate_screen = false;
        }
        if self.raw_mode {
            if let Err(e) = terminal::disable_raw_mode() {
                warn!("Failed to disable raw mode: {}", e);
            }
            self.raw_mode = false;
        }
    }
}

impl<W: Write> Drop for TerminalSession<W> {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    buffers: MeshBuffers,
    center: Vector3<f32>,
    name: String,
    rotation: RotationState,
    camera: Camera,
    projection: Projection,
    renderer: AsciiRenderer,
    mode: PolygonMode,
    textures: Vec<PathBuf>,
    texture_index: usize,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(model: &Model, settings: ViewerSettings) -> Result<Self, AppError> {
        let (width, height) = terminal::size()?;
        Self::with_size(model, settings, width as usize, height as usize)
    }

    /// Build a viewer for a fixed character grid
    pub fn with_size(
        model: &Model,
        settings: ViewerSettings,
        width: usize,
        height: usize,
    ) -> Result<Self, AppError> {
        let buffers = MeshBuffers::upload(model.triangles(), model.normals())?;
        let mut renderer = AsciiRenderer::new(width, height);
        renderer.set_material(model.material());

        // terminal cells are roughly twice as tall as they are wide
        let projection = Projection::new(width as u32, height as u32 * 2)
            .with_fov_degrees(settings.fov_degrees);

        Ok(Self {
            buffers,
            center: model.center(),
            name: model.name().unwrap_or("model").to_string(),
            rotation: RotationState::zero(),
            camera: Camera::default(),
            projection,
            renderer,
            mode: PolygonMode::default(),
            textures: settings.textures,
            texture_index: 0,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn mode(&self) -> PolygonMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn selected_texture(&self) -> Option<&PathBuf> {
        self.textures.get(self.texture_index)
    }

    pub fn run(&mut self) -> Result<(), AppError> {
        let mut session = TerminalSession::new(stdout());
        session.enter()?;
        self.main_loop()
    }

    fn main_loop(&mut self) -> Result<(), AppError> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?)?;
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

        info!("Viewer closed");
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<(), AppError> {
        match event {
            Event::Key(KeyEvent { code, kind, .. }) if kind != KeyEventKind::Release => {
                if let Some(command) = Command::from_key(code) {
                    self.apply(command);
                }
            }
            Event::Resize(width, height) => {
                self.renderer = AsciiRenderer::new(width as usize, height as usize);
                self.projection.set_viewport(width as u32, height as u32 * 2);
            }
            _ => {}
        }
        Ok(())
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Move(movement) => self.camera.apply(movement),
            Command::CyclePolygonMode => self.mode = self.mode.next(),
            Command::CycleTexture => {
                if !self.textures.is_empty() {
                    self.texture_index = (self.texture_index + 1) % self.textures.len();
                }
            }
            Command::Quit => self.running = false,
        }
    }

    fn update(&mut self) {
        self.rotation.rotate(0.0, SPIN_PER_FRAME, 0.0);
    }

    /// Draw one frame into the renderer's buffers without touching the terminal
    pub fn draw_frame(&mut self) {
        let model = Transform::model_matrix(&self.center, &self.rotation);
        let view = self.camera.view_matrix();
        let projection = self.projection.matrix();

        self.renderer.clear();
        self.renderer
            .render(&self.buffers, &model, &view, &projection, self.mode);
    }

    pub fn renderer(&self) -> &AsciiRenderer {
        &self.renderer
    }

    fn render(&mut self) -> Result<(), AppError> {
        self.draw_frame();

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let texture = self
            .selected_texture()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "none".to_string());
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "{} | {} tris | {:?} | texture: {} | FPS: {:.1} | WASD/Space/C=Move Arrows=Look M=Mode T=Texture Q=Quit",
                self.name,
                self.buffers.triangle_count(),
                self.mode,
                texture,
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objview_core::MeshOptions;

    fn app(textures: Vec<PathBuf>) -> TerminalApp {
        let model = Model::from_obj_str(
            "o tri\nv -1 -1 0\nv 1 -1 0\nv 0 1 0\nf 1 2 3\n",
            MeshOptions::default(),
        )
        .unwrap();
        let settings = ViewerSettings {
            textures,
            ..ViewerSettings::default()
        };
        TerminalApp::with_size(&model, settings, 40, 20).unwrap()
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(Command::from_key(KeyCode::Char('w')), Some(Command::Move(Movement::Forward)));
        assert_eq!(Command::from_key(KeyCode::Left), Some(Command::Move(Movement::RotateLeft)));
        assert_eq!(Command::from_key(KeyCode::Up), Some(Command::Move(Movement::PitchUp)));
        assert_eq!(Command::from_key(KeyCode::Esc), Some(Command::Quit));
        assert_eq!(Command::from_key(KeyCode::Char('z')), None);
    }

    #[test]
    fn test_commands_update_state() {
        let mut app = app(vec![PathBuf::from("a.png"), PathBuf::from("b.png")]);
        let start = app.camera().position();

        app.apply(Command::Move(Movement::Forward));
        assert!(app.camera().position().z < start.z);

        app.apply(Command::CyclePolygonMode);
        assert_eq!(app.mode(), PolygonMode::Points);

        assert_eq!(app.selected_texture(), Some(&PathBuf::from("a.png")));
        app.apply(Command::CycleTexture);
        app.apply(Command::CycleTexture);
        assert_eq!(app.selected_texture(), Some(&PathBuf::from("a.png")));

        app.apply(Command::Quit);
        assert!(!app.is_running());
    }

    #[test]
    fn test_cycle_texture_without_textures() {
        let mut app = app(Vec::new());
        app.apply(Command::CycleTexture);
        assert_eq!(app.selected_texture(), None);
    }

    #[test]
    fn test_session_restores_screen_on_drop() {
        let mut out = Vec::new();
        {
            let mut session = TerminalSession::new(&mut out);
            session.enter_screen().unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        let entered = text.find("\x1b[?1049h").unwrap();
        let left = text.find("\x1b[?1049l").unwrap();
        assert!(entered < left);
    }

    #[test]
    fn test_session_restore_is_idempotent() {
        let mut out = Vec::new();
        {
            let mut session = TerminalSession::new(&mut out);
            session.enter_screen().unwrap();
            session.restore();
        }
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("\x1b[?1049l").count(), 1);
    }

    #[test]
    fn test_draw_frame_renders_model() {
        let mut app = app(Vec::new());
        app.draw_frame();
        let renderer = app.renderer();
        let drawn = (0..renderer.height())
            .flat_map(|y| (0..renderer.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| renderer.cell(x, y) != Some(' '))
            .count();
        assert!(drawn > 0);
    }
}
