//! Per-frame wireframe pass over a [`Scene`].
//!
//! The pass only projects and emits 2D primitives; the target decides how
//! to draw them.
use crate::projection::{project_vertex, Camera, ScreenPoint, Viewport};
use crate::scene::{EditMode, Scene};

/// How a primitive should be highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Normal,
    SelectedObject,
    SelectedPolygon,
    SelectedVertex,
}

/// A 2D target for projected wireframes.
pub trait LineSurface {
    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, style: LineStyle);

    fn draw_marker(&mut self, at: ScreenPoint, style: LineStyle);
}

/// Draws every polygon of every object as a closed loop of screen points,
/// then a marker on the selected vertex.
///
/// Polygons that reference missing vertices are skipped.
pub fn render_scene<S: LineSurface + ?Sized>(
    scene: &Scene,
    camera: &Camera,
    viewport: Viewport,
    surface: &mut S,
) {
    let selection = scene.selection();

    for (index, object) in scene.objects().iter().enumerate() {
        let selected = selection.object == Some(index);
        let mvp = camera.mvp(object.transform());
        let mesh = object.mesh();
        let projected: Vec<ScreenPoint> = mesh
            .vertices
            .iter()
            .map(|v| project_vertex(&mvp, v, viewport))
            .collect();

        for (polygon_index, polygon) in mesh.polygons.iter().enumerate() {
            let style = match (selected, selection.polygon) {
                (true, Some(p)) if p == polygon_index && scene.edit_mode() == EditMode::Polygon => {
                    LineStyle::SelectedPolygon
                }
                (true, _) => LineStyle::SelectedObject,
                _ => LineStyle::Normal,
            };

            let Some(points) = polygon
                .vertex_indices
                .iter()
                .map(|&i| projected.get(i).copied())
                .collect::<Option<Vec<_>>>()
            else {
                continue;
            };
            draw_closed_loop(&points, style, surface);
        }

        if selected && scene.edit_mode() == EditMode::Vertex {
            if let Some(at) = selection.vertex.and_then(|v| projected.get(v)) {
                surface.draw_marker(*at, LineStyle::SelectedVertex);
            }
        }
    }
}

fn draw_closed_loop<S: LineSurface + ?Sized>(points: &[ScreenPoint], style: LineStyle, surface: &mut S) {
    if points.len() < 2 {
        return;
    }
    for (i, from) in points.iter().enumerate() {
        let to = points[(i + 1) % points.len()];
        surface.draw_line(*from, to, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Mesh, Polygon};
    use crate::math::Vector3;

    #[derive(Default)]
    struct Recorder {
        lines: Vec<(ScreenPoint, ScreenPoint, LineStyle)>,
        markers: Vec<(ScreenPoint, LineStyle)>,
    }

    impl LineSurface for Recorder {
        fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, style: LineStyle) {
            self.lines.push((from, to, style));
        }

        fn draw_marker(&mut self, at: ScreenPoint, style: LineStyle) {
            self.markers.push((at, style));
        }
    }

    fn quad_and_triangle() -> Mesh {
        let mut mesh = Mesh::new();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            mesh.add_vertex(Vector3::new(x, y, 0.0));
        }
        mesh.add_polygon(Polygon::new(vec![0, 1, 2, 3]));
        mesh.add_polygon(Polygon::new(vec![0, 1, 2]));
        mesh.add_polygon(Polygon::new(vec![0, 1, 9]));
        mesh
    }

    #[test]
    fn test_closed_loops_per_polygon() {
        let mut scene = Scene::new();
        scene.add_object(quad_and_triangle(), "a");
        scene.add_object(quad_and_triangle(), "b");

        let mut recorder = Recorder::default();
        render_scene(&scene, &Camera::default(), Viewport::new(800, 600), &mut recorder);

        // 4 + 3 edges per object; the dangling polygon is skipped.
        assert_eq!(recorder.lines.len(), 14);
        assert!(recorder.lines[..7].iter().all(|l| l.2 == LineStyle::Normal));
        assert!(recorder.lines[7..].iter().all(|l| l.2 == LineStyle::SelectedObject));
        assert_eq!(recorder.lines[3].1, recorder.lines[0].0);
        assert!(recorder.markers.is_empty());
    }

    #[test]
    fn test_selected_polygon_and_vertex_styles() {
        let mut scene = Scene::new();
        scene.add_object(quad_and_triangle(), "a");
        let camera = Camera::default();
        let viewport = Viewport::new(800, 600);
        let mvp = scene.mvp_for(0, &camera).unwrap();

        scene.set_edit_mode(EditMode::Polygon);
        let centroid = project_vertex(&mvp, &Vector3::new(2.0 / 3.0, 1.0 / 3.0, 0.0), viewport);
        scene.click(&centroid, &camera, viewport);
        assert_eq!(scene.selection().polygon, Some(1));

        let mut recorder = Recorder::default();
        render_scene(&scene, &camera, viewport, &mut recorder);
        let highlighted = recorder
            .lines
            .iter()
            .filter(|l| l.2 == LineStyle::SelectedPolygon)
            .count();
        assert_eq!(highlighted, 3);

        scene.set_edit_mode(EditMode::Vertex);
        let corner = project_vertex(&mvp, &Vector3::new(1.0, 1.0, 0.0), viewport);
        scene.click(&corner, &camera, viewport);

        let mut recorder = Recorder::default();
        render_scene(&scene, &camera, viewport, &mut recorder);
        assert_eq!(recorder.markers, vec![(corner, LineStyle::SelectedVertex)]);
    }
}
