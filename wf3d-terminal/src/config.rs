//! Viewer configuration.
//!
//! Read from the file named by `WF3D_CONFIG`, else `wf3d.toml` in the working
//! directory, else built-in defaults. Every field may be omitted.
//!
//! When the camera section sets neither `position` nor `target`, the camera
//! frames the loaded scene. Setting either one places it explicitly, with
//! (0, 0, 5) and the origin standing in for the missing half.
//!
//! ```toml
//! [camera]
//! position = [0.0, 0.0, 5.0]
//! target = [0.0, 0.0, 0.0]
//! up = [0.0, -1.0, 0.0]
//! fov_degrees = 60.0
//! near = 0.1
//! far = 100.0
//! cell_aspect = 2.0
//!
//! [controls]
//! translation_step = 0.5
//! rotation_step_degrees = 10.0
//! scale_step = 1.1
//! camera_step = 0.5
//!
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file = "wf3d.log"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wf3d_core::math::Vector3;
use wf3d_core::{Camera, ProjectionError};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "WF3D_CONFIG";
/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "wf3d.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub camera: CameraConfig,

    #[serde(default)]
    pub controls: ControlsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<[f32; 3]>,

    #[serde(default = "default_up")]
    pub up: [f32; 3],

    /// Vertical field of view
    #[serde(default = "default_fov_degrees")]
    pub fov_degrees: f32,

    #[serde(default = "default_near")]
    pub near: f32,

    #[serde(default = "default_far")]
    pub far: f32,

    /// Height over width of one terminal cell
    #[serde(default = "default_cell_aspect")]
    pub cell_aspect: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlsConfig {
    #[serde(default = "default_translation_step")]
    pub translation_step: f32,

    #[serde(default = "default_rotation_step")]
    pub rotation_step_degrees: f32,

    /// Factor applied by `+`; `-` applies its reciprocal
    #[serde(default = "default_scale_step")]
    pub scale_step: f32,

    #[serde(default = "default_camera_step")]
    pub camera_step: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

const FALLBACK_POSITION: [f32; 3] = [0.0, 0.0, 5.0];
const FALLBACK_TARGET: [f32; 3] = [0.0, 0.0, 0.0];

fn default_up() -> [f32; 3] { [0.0, -1.0, 0.0] }
fn default_fov_degrees() -> f32 { 60.0 }
fn default_near() -> f32 { 0.1 }
fn default_far() -> f32 { 100.0 }
fn default_cell_aspect() -> f32 { 2.0 }
fn default_translation_step() -> f32 { 0.5 }
fn default_rotation_step() -> f32 { 10.0 }
fn default_scale_step() -> f32 { 1.1 }
fn default_camera_step() -> f32 { 0.5 }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_log_file() -> PathBuf { PathBuf::from("wf3d.log") }

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: None,
            target: None,
            up: default_up(),
            fov_degrees: default_fov_degrees(),
            near: default_near(),
            far: default_far(),
            cell_aspect: default_cell_aspect(),
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            translation_step: default_translation_step(),
            rotation_step_degrees: default_rotation_step(),
            scale_step: default_scale_step(),
            camera_step: default_camera_step(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

impl LogLevel {
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl CameraConfig {
    /// Camera for a terminal of `columns × rows` cells, framing `bounds`
    /// unless the position or target is set explicitly.
    pub fn build_camera(
        &self,
        columns: u16,
        rows: u16,
        bounds: Option<(Vector3, Vector3)>,
    ) -> Result<Camera, ProjectionError> {
        let mut camera = Camera::new(
            Vector3::from(self.position.unwrap_or(FALLBACK_POSITION)),
            Vector3::from(self.target.unwrap_or(FALLBACK_TARGET)),
            self.fov_degrees.to_radians(),
            self.aspect_for(columns, rows),
            self.near,
            self.far,
        )?;
        camera.set_up(Vector3::from(self.up));
        if let (None, None, Some((min, max))) = (self.position, self.target, bounds) {
            camera.frame(&min, &max);
        }
        camera.validate_view()?;
        Ok(camera)
    }

    /// Projection aspect of a cell grid, corrected for non-square cells.
    pub fn aspect_for(&self, columns: u16, rows: u16) -> f32 {
        let rows = f32::from(rows.max(1));
        f32::from(columns) / (rows * self.cell_aspect)
    }
}

impl ViewerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// `WF3D_CONFIG`, then `./wf3d.toml`, then defaults.
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(path);
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(local);
        }
        Ok(Self::default())
    }
}
