//! End-to-end checks across parsing, editing, transforming, projecting and exporting.

use approx::assert_relative_eq;
use wf3d_core::geometry::Corner;
use wf3d_core::math::{Matrix4, Vector2, Vector3};
use wf3d_core::projection::project_vertex;
use wf3d_core::{
    parse_obj, pick_vertex, write_obj, Camera, Mesh, ParseError, Polygon, Scene, ScreenPoint, Viewport,
    WriteError,
};

fn textured_mesh() -> Mesh {
    let mut mesh = Mesh::new();
    for (x, y, z) in [(0.0, 0.0, 0.0), (1.5, 0.0, 0.0), (1.5, 2.25, 0.0), (0.0, 2.25, -0.125), (-3.0, 1.0, 4.0)] {
        mesh.add_vertex(Vector3::new(x, y, z));
    }
    mesh.add_texture_vertex(Vector2::new(0.0, 0.0));
    mesh.add_texture_vertex(Vector2::new(1.0, 0.5));
    mesh.add_normal(Vector3::new(0.0, 0.0, 1.0));
    mesh.add_normal(Vector3::new(0.0, 1.0, 0.0));

    mesh.add_polygon(Polygon::new(vec![0, 1, 2, 3]));
    mesh.add_polygon(Polygon::with_corners(&[
        Corner { vertex: 0, texture: Some(0), normal: None },
        Corner { vertex: 1, texture: Some(1), normal: None },
        Corner { vertex: 4, texture: Some(1), normal: None },
    ]));
    mesh.add_polygon(Polygon::with_corners(&[
        Corner { vertex: 2, texture: None, normal: Some(1) },
        Corner { vertex: 3, texture: None, normal: Some(0) },
        Corner { vertex: 4, texture: None, normal: Some(0) },
    ]));
    mesh.add_polygon(Polygon::with_corners(&[
        Corner { vertex: 4, texture: Some(1), normal: Some(0) },
        Corner { vertex: 0, texture: Some(0), normal: Some(1) },
        Corner { vertex: 3, texture: Some(0), normal: Some(1) },
    ]));
    mesh
}

#[test]
fn test_write_then_parse_round_trip() {
    let mesh = textured_mesh();
    let text = write_obj(&mesh).unwrap();
    let parsed = parse_obj(&text).unwrap();

    assert_eq!(parsed.vertices.len(), mesh.vertices.len());
    assert_eq!(parsed.texture_vertices.len(), mesh.texture_vertices.len());
    assert_eq!(parsed.normals.len(), mesh.normals.len());
    assert_eq!(parsed.polygons.len(), mesh.polygons.len());
    for (a, b) in parsed.polygons.iter().zip(&mesh.polygons) {
        assert_eq!(a.corners().collect::<Vec<_>>(), b.corners().collect::<Vec<_>>());
    }
    for (a, b) in parsed.vertices.iter().zip(&mesh.vertices) {
        assert_relative_eq!(*a, *b, epsilon = 1e-6);
    }
}

#[test]
fn test_remove_vertex_reindexes_survivors() {
    let mut mesh = textured_mesh();
    let before = mesh.clone();
    let removed = 2;
    mesh.remove_vertex(removed).unwrap();

    assert_eq!(mesh.vertices.len(), before.vertices.len() - 1);
    let survivors: Vec<&Polygon> = before
        .polygons
        .iter()
        .filter(|p| !p.references_vertex(removed))
        .collect();
    assert_eq!(mesh.polygons.len(), survivors.len());

    for (after, original) in mesh.polygons.iter().zip(survivors) {
        for (&new, &old) in after.vertex_indices.iter().zip(&original.vertex_indices) {
            assert_ne!(old, removed);
            if old > removed {
                assert_eq!(new, old - 1);
            } else {
                assert_eq!(new, old);
            }
        }
    }
}

#[test]
fn test_load_triangle() {
    let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
    assert_eq!(mesh.vertices.len(), 3);
    assert!(mesh.texture_vertices.is_empty());
    assert!(mesh.normals.is_empty());
    assert_eq!(mesh.polygons.len(), 1);
    assert_eq!(mesh.polygons[0].vertex_indices, vec![0, 1, 2]);
}

#[test]
fn test_zero_face_index_is_rejected() {
    let err: ParseError = parse_obj("f 1 0 2\n").unwrap_err();
    assert_eq!(err.line, 1);
    assert!(err.to_string().to_lowercase().contains("zero index"));
}

#[test]
fn test_out_of_range_vertex_names_polygon() {
    let mut mesh = textured_mesh();
    mesh.add_polygon(Polygon::new(vec![0, 1, 42]));
    let err = write_obj(&mesh).unwrap_err();
    assert_eq!(
        err,
        WriteError::VertexIndexOutOfRange {
            polygon: 5,
            index: 42
        }
    );
    assert!(err.to_string().contains("#5"));
}

#[test]
fn test_vertex_pick_boundary() {
    let viewport = Viewport::new(2, 2);
    let cursor = ScreenPoint::new(1.0, 1.0);

    let mut mesh = Mesh::new();
    mesh.add_vertex(Vector3::new(12.0, 0.0, 0.0));
    assert_eq!(pick_vertex(&mesh, &Matrix4::identity(), &cursor, viewport), None);

    mesh.vertices[0].x = 11.999;
    assert_eq!(pick_vertex(&mesh, &Matrix4::identity(), &cursor, viewport), Some(0));
}

#[test]
fn test_degenerate_w_projects_finite() {
    let mut mvp = Matrix4::identity();
    mvp[(3, 3)] = 0.0;
    let p = project_vertex(&mvp, &Vector3::new(3.0, -2.0, 1.0), Viewport::new(640, 480));
    assert!(p.x.is_finite() && p.y.is_finite());
}

#[test]
fn test_transform_export_matches_projection() {
    let mut scene = Scene::new();
    scene.add_object(parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap(), "tri");
    scene.apply_transform_to_selected(&wf3d_core::ModelTransform::translation(0.5, 0.0, -1.0));

    let camera = Camera::default();
    let viewport = Viewport::new(800, 600);
    let object = scene.selected_object().unwrap();
    let materialized = object.materialize();

    // Projecting the baked mesh with an identity model lands on the same pixels.
    for (raw, baked) in object.mesh().vertices.iter().zip(&materialized.vertices) {
        let a = camera.project_to_screen(raw, object.transform(), viewport);
        let b = camera.project_to_screen(baked, &Matrix4::identity(), viewport);
        assert_relative_eq!(a, b, epsilon = 1e-3);
    }

    let reparsed = parse_obj(&write_obj(&materialized).unwrap()).unwrap();
    assert_relative_eq!(reparsed.vertices[1], Vector3::new(1.5, 0.0, -1.0), epsilon = 1e-6);
}
