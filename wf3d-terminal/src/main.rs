//! WF3D Terminal Viewer
//!
//! Usage: wf3d-terminal [FILE.obj ...]
//!
//! Each file becomes one scene object; with no arguments a demo cube is shown.
//! Controls:
//!   - Mouse click: select model (and vertex/polygon in those modes)
//!   - Tab / Shift+Tab: cycle selected model
//!   - O / V / P: object, vertex, polygon mode
//!   - Delete / Backspace: delete selected vertex or polygon
//!   - WS / AD / ER: rotate about X / Y / Z
//!   - Arrows, PgUp / PgDn: translate
//!   - + / -: scale
//!   - IJKL / U N: move camera
//!   - Z: revert, X: remove model, M: export transformed model
//!   - Q / ESC: Quit

use anyhow::{Context, Result};
use std::path::Path;
use wf3d_core::{parse_obj, Mesh, Scene};
use wf3d_terminal::{log, TerminalApp, ViewerConfig};

fn load_scene(paths: &[String]) -> Result<Scene> {
    let mut scene = Scene::new();
    if paths.is_empty() {
        scene.add_object(Mesh::cube(2.0), "cube");
        return Ok(scene);
    }

    for path in paths {
        let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
        let mesh = parse_obj(&text).with_context(|| format!("failed to parse {path}"))?;
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        tracing::info!(%name, %mesh, "loaded model");
        scene.add_object(mesh, name);
    }
    Ok(scene)
}

fn main() -> Result<()> {
    let config = ViewerConfig::load()?;
    log::init_logger(&config.logging)?;

    let paths: Vec<String> = std::env::args().skip(1).collect();
    let scene = load_scene(&paths)?;

    let mut app = TerminalApp::new(scene, config)?;
    app.run()?;

    println!("Thank you for using WF3D!");
    Ok(())
}
