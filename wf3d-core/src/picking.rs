//! Screen-space hit testing against projected scene geometry.
//!
//! All queries are linear scans with strict `<` thresholds and return
//! `None` when nothing is close enough. Candidates whose screen distance is
//! not finite (NaN or infinite coordinates) are never picked.

use crate::geometry::Mesh;
use crate::math::{Matrix4, VectorExt};
use crate::projection::{project_vertex, Camera, ScreenPoint, Viewport};
use crate::scene::SceneObject;

/// Maximum cursor distance (pixels) to an object's nearest projected vertex.
pub const MODEL_PICK_THRESHOLD: f32 = 120.0;
/// Maximum cursor distance (pixels) to a projected vertex.
pub const VERTEX_PICK_THRESHOLD: f32 = 12.0;
/// Maximum cursor distance (pixels) to a polygon's projected centroid.
pub const POLYGON_PICK_THRESHOLD: f32 = 40.0;

/// Index of the scene object whose nearest projected vertex is closest to
/// `cursor`, provided that distance is under [`MODEL_PICK_THRESHOLD`].
pub fn pick_model(
    objects: &[SceneObject],
    camera: &Camera,
    cursor: &ScreenPoint,
    viewport: Viewport,
) -> Option<usize> {
    objects
        .iter()
        .enumerate()
        .filter_map(|(i, object)| {
            let mvp = camera.mvp(object.transform());
            nearest_vertex(object.mesh(), &mvp, cursor, viewport).map(|(_, d)| (i, d))
        })
        .fold(None, closer)
        .filter(|&(_, d)| d < MODEL_PICK_THRESHOLD)
        .map(|(i, _)| i)
}

/// Index of the vertex nearest to `cursor` under [`VERTEX_PICK_THRESHOLD`].
pub fn pick_vertex(mesh: &Mesh, mvp: &Matrix4, cursor: &ScreenPoint, viewport: Viewport) -> Option<usize> {
    nearest_vertex(mesh, mvp, cursor, viewport)
        .filter(|&(_, d)| d < VERTEX_PICK_THRESHOLD)
        .map(|(i, _)| i)
}

/// Index of the polygon whose projected centroid is nearest to `cursor`
/// under [`POLYGON_PICK_THRESHOLD`].
///
/// Polygons with no vertices, or that reference vertices outside the mesh,
/// are skipped.
pub fn pick_polygon(mesh: &Mesh, mvp: &Matrix4, cursor: &ScreenPoint, viewport: Viewport) -> Option<usize> {
    mesh.polygons
        .iter()
        .enumerate()
        .filter_map(|(i, polygon)| {
            let mut sum = ScreenPoint::zeros();
            for &vi in &polygon.vertex_indices {
                sum += project_vertex(mvp, mesh.vertices.get(vi)?, viewport);
            }
            let centroid = sum.try_div(polygon.vertex_indices.len() as f32)?;
            Some((i, (centroid - cursor).norm()))
        })
        .filter(|(_, d)| d.is_finite())
        .fold(None, closer)
        .filter(|&(_, d)| d < POLYGON_PICK_THRESHOLD)
        .map(|(i, _)| i)
}

/// Nearest projected vertex and its distance, with no threshold applied.
pub fn nearest_vertex(
    mesh: &Mesh,
    mvp: &Matrix4,
    cursor: &ScreenPoint,
    viewport: Viewport,
) -> Option<(usize, f32)> {
    mesh.vertices
        .iter()
        .enumerate()
        .map(|(i, v)| (i, (project_vertex(mvp, v, viewport) - cursor).norm()))
        .filter(|(_, d)| d.is_finite())
        .fold(None, closer)
}

/// Keeps the first of equally distant candidates.
fn closer(best: Option<(usize, f32)>, candidate: (usize, f32)) -> Option<(usize, f32)> {
    match best {
        Some(b) if b.1 <= candidate.1 => Some(b),
        _ => Some(candidate),
    }
}
