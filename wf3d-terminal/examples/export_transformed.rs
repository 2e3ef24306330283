//! Example: transform an OBJ file without opening the viewer
//!
//! Usage: cargo run --example export_transformed -- path/to/model.obj
//!
//! Rotates the model 45° about Y, lifts it by one unit and writes
//! `<name>.transformed.obj` to the working directory.

use anyhow::{Context, Result};
use std::env;
use std::fs;
use wf3d_core::{parse_obj, write_obj, Mesh, ModelTransform, Scene};
use wf3d_terminal::export_path;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let (name, mesh) = match args.get(1) {
        Some(path) => {
            println!("Loading OBJ file: {path}");
            let text = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
            (path.clone(), parse_obj(&text)?)
        }
        None => {
            eprintln!("Usage: {} <obj-file>", args[0]);
            eprintln!("\nNo OBJ file provided, using default cube...");
            (String::from("cube"), Mesh::cube(2.0))
        }
    };
    println!("Loaded {mesh}");

    let mut scene = Scene::new();
    scene.add_object(mesh, name.as_str());
    scene.apply_transform_to_selected(&ModelTransform::rotation_degrees(0.0, 45.0, 0.0));
    scene.apply_transform_to_selected(&ModelTransform::translation(0.0, 1.0, 0.0));

    let object = scene.selected_object().context("scene is empty")?;
    let output = export_path(object.name());
    fs::write(&output, write_obj(&object.materialize())?)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("Wrote {}", output.display());
    Ok(())
}
