//! Terminal-based wireframe viewer and editor for OBJ scenes

use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{stdout, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use wf3d_core::math::Vector3;
use wf3d_core::{render_scene, write_obj, Camera, EditMode, ModelTransform, Scene, ScreenPoint, Viewport};

pub mod config;
pub mod log;
pub mod renderer;

pub use config::ViewerConfig;
pub use renderer::AsciiCanvas;

/// A user command decoded from a key press
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    SelectNext,
    SelectPrevious,
    SetMode(EditMode),
    DeleteElement,
    /// Signs per axis, multiplied by the rotation step
    Rotate(Vector3),
    /// Signs per axis, multiplied by the translation step
    Translate(Vector3),
    Scale { grow: bool },
    /// Signs per axis, multiplied by the camera step
    MoveCamera(Vector3),
    Revert,
    RemoveObject,
    Export,
}

impl Action {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        let axis = |x: f32, y: f32, z: f32| Vector3::new(x, y, z);
        Some(match code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Tab => Action::SelectNext,
            KeyCode::BackTab => Action::SelectPrevious,
            KeyCode::Char('o') => Action::SetMode(EditMode::Object),
            KeyCode::Char('v') => Action::SetMode(EditMode::Vertex),
            KeyCode::Char('p') => Action::SetMode(EditMode::Polygon),
            KeyCode::Delete | KeyCode::Backspace => Action::DeleteElement,
            KeyCode::Char('w') => Action::Rotate(axis(1.0, 0.0, 0.0)),
            KeyCode::Char('s') => Action::Rotate(axis(-1.0, 0.0, 0.0)),
            KeyCode::Char('a') => Action::Rotate(axis(0.0, -1.0, 0.0)),
            KeyCode::Char('d') => Action::Rotate(axis(0.0, 1.0, 0.0)),
            KeyCode::Char('e') => Action::Rotate(axis(0.0, 0.0, 1.0)),
            KeyCode::Char('r') => Action::Rotate(axis(0.0, 0.0, -1.0)),
            KeyCode::Left => Action::Translate(axis(-1.0, 0.0, 0.0)),
            KeyCode::Right => Action::Translate(axis(1.0, 0.0, 0.0)),
            KeyCode::Up => Action::Translate(axis(0.0, 1.0, 0.0)),
            KeyCode::Down => Action::Translate(axis(0.0, -1.0, 0.0)),
            KeyCode::PageUp => Action::Translate(axis(0.0, 0.0, 1.0)),
            KeyCode::PageDown => Action::Translate(axis(0.0, 0.0, -1.0)),
            KeyCode::Char('+') | KeyCode::Char('=') => Action::Scale { grow: true },
            KeyCode::Char('-') => Action::Scale { grow: false },
            KeyCode::Char('i') => Action::MoveCamera(axis(0.0, 0.0, -1.0)),
            KeyCode::Char('k') => Action::MoveCamera(axis(0.0, 0.0, 1.0)),
            KeyCode::Char('j') => Action::MoveCamera(axis(-1.0, 0.0, 0.0)),
            KeyCode::Char('l') => Action::MoveCamera(axis(1.0, 0.0, 0.0)),
            KeyCode::Char('u') => Action::MoveCamera(axis(0.0, 1.0, 0.0)),
            KeyCode::Char('n') => Action::MoveCamera(axis(0.0, -1.0, 0.0)),
            KeyCode::Char('z') => Action::Revert,
            KeyCode::Char('x') => Action::RemoveObject,
            KeyCode::Char('m') => Action::Export,
            _ => return None,
        })
    }
}

/// `<stem>.transformed.obj` next to the working directory
pub fn export_path(object_name: &str) -> PathBuf {
    let stem = std::path::Path::new(object_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("model");
    PathBuf::from(format!("{stem}.transformed.obj"))
}

/// Main application struct for the terminal viewer
pub struct TerminalApp {
    scene: Scene,
    camera: Camera,
    canvas: AsciiCanvas,
    config: ViewerConfig,
    status: String,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(scene: Scene, config: ViewerConfig) -> Result<Self> {
        let (width, height) = terminal::size()?;
        let camera = config
            .camera
            .build_camera(width, height, scene.bounding_box())
            .context("invalid camera configuration")?;

        Ok(Self {
            scene,
            camera,
            canvas: AsciiCanvas::new(width as usize, height as usize),
            config,
            status: String::from("Click a model to select it"),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn run(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(self.canvas.width() as u32, self.canvas.height() as u32)
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent { code, kind, .. }) if kind != KeyEventKind::Release => {
                if let Some(action) = Action::from_key(code) {
                    if let Err(e) = self.apply(action) {
                        tracing::warn!(?action, error = %e, "action failed");
                        self.status = format!("Error: {e:#}");
                    }
                }
            }
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                ..
            }) => self.click(column, row),
            Event::Resize(width, height) => self.resize(width, height),
            _ => {}
        }
    }

    fn click(&mut self, column: u16, row: u16) {
        let cursor = ScreenPoint::new(f32::from(column) + 0.5, f32::from(row) + 0.5);
        let viewport = self.viewport();
        self.status = match self.scene.click(&cursor, &self.camera, viewport) {
            Some(index) => {
                let selection = self.scene.selection();
                let name = self.scene.object(index).map(|o| o.name()).unwrap_or_default();
                match (selection.vertex, selection.polygon) {
                    (Some(v), _) => format!("Selected {name}, vertex {}", v + 1),
                    (_, Some(p)) => format!("Selected {name}, polygon {}", p + 1),
                    _ => format!("Selected model: {name}"),
                }
            }
            None => String::from("Nothing under cursor"),
        };
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.canvas.resize(width as usize, height as usize);
        let aspect = self.config.camera.aspect_for(width, height);
        if let Err(e) = self.camera.set_aspect_ratio(aspect) {
            tracing::warn!(width, height, error = %e, "keeping previous aspect ratio");
        }
    }

    /// Runs one decoded command against the scene or camera
    pub fn apply(&mut self, action: Action) -> Result<()> {
        let controls = &self.config.controls;
        match action {
            Action::Quit => self.running = false,
            Action::SelectNext => self.scene.select_next(),
            Action::SelectPrevious => self.scene.select_previous(),
            Action::SetMode(mode) => {
                self.scene.set_edit_mode(mode);
                self.status = format!("{mode:?} selection mode");
            }
            Action::DeleteElement => {
                self.status = if self.scene.delete_selected_element()? {
                    String::from("Deleted selected element")
                } else {
                    String::from("Nothing selected to delete")
                };
            }
            Action::Rotate(signs) => {
                let degrees = signs * controls.rotation_step_degrees;
                self.transform_selected(ModelTransform::rotation_degrees(degrees.x, degrees.y, degrees.z));
            }
            Action::Translate(signs) => {
                let t = signs * controls.translation_step;
                self.transform_selected(ModelTransform::translation(t.x, t.y, t.z));
            }
            Action::Scale { grow } => {
                let factor = if grow {
                    controls.scale_step
                } else {
                    controls.scale_step.recip()
                };
                self.transform_selected(ModelTransform::uniform_scale(factor));
            }
            Action::MoveCamera(signs) => {
                let delta = signs * controls.camera_step;
                self.camera.move_position(&delta);
            }
            Action::Revert => {
                self.status = if self.scene.revert_selected() {
                    String::from("Transformation undone")
                } else {
                    String::from("No original model saved")
                };
            }
            Action::RemoveObject => {
                self.status = match self.scene.remove_selected_object() {
                    Some(object) => format!("Removed {}", object.name()),
                    None => String::from("No model selected"),
                };
            }
            Action::Export => self.export_selected()?,
        }
        Ok(())
    }

    fn transform_selected(&mut self, transform: ModelTransform) {
        if !self.scene.apply_transform_to_selected(&transform) {
            self.status = String::from("No model selected");
        }
    }

    fn export_selected(&mut self) -> Result<()> {
        let Some(object) = self.scene.selected_object() else {
            self.status = String::from("No model selected");
            return Ok(());
        };
        let path = export_path(object.name());
        let text = write_obj(&object.materialize())?;
        std::fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;

        tracing::info!(path = %path.display(), "exported transformed model");
        self.status = format!("Saved {}", path.display());
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        self.canvas.clear();
        let viewport = self.viewport();
        render_scene(&self.scene, &self.camera, viewport, &mut self.canvas);

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0), terminal::Clear(ClearType::All))?;
        self.canvas.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "WF3D | {:?} mode | {} objects | FPS: {:.1} | {}",
                self.scene.edit_mode(),
                self.scene.len(),
                self.fps,
                self.status
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

    #[test]
    fn test_key_bindings() {
        assert_eq!(Action::from_key(KeyCode::Char('q')), Some(Action::Quit));
        assert_eq!(Action::from_key(KeyCode::Esc), Some(Action::Quit));
        assert_eq!(
            Action::from_key(KeyCode::Char('p')),
            Some(Action::SetMode(EditMode::Polygon))
        );
        assert_eq!(
            Action::from_key(KeyCode::PageDown),
            Some(Action::Translate(Vector3::new(0.0, 0.0, -1.0)))
        );
        assert_eq!(Action::from_key(KeyCode::Backspace), Some(Action::DeleteElement));
        assert_eq!(Action::from_key(KeyCode::Char('?')), None);
    }

    #[test]
    fn test_export_path() {
        assert_eq!(export_path("teapot.obj"), PathBuf::from("teapot.transformed.obj"));
        assert_eq!(export_path("cube"), PathBuf::from("cube.transformed.obj"));
        assert_eq!(export_path(""), PathBuf::from("model.transformed.obj"));
    }
}
