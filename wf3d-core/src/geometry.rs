//! Mesh data model: shared vertex pools and index-based polygons.
use std::fmt;

use crate::error::IndexError;
use crate::math::{Vector2, Vector3};

/// One vertex reference within a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corner {
    pub vertex: usize,
    pub texture: Option<usize>,
    pub normal: Option<usize>,
}

/// A face defined by indices into the owning mesh's pools.
///
/// `texture_indices` and `normal_indices` are either empty or hold one entry
/// per vertex index; `None` marks a corner without that reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Polygon {
    pub vertex_indices: Vec<usize>,
    pub texture_indices: Vec<Option<usize>>,
    pub normal_indices: Vec<Option<usize>>,
}

impl Polygon {
    pub fn new(vertex_indices: Vec<usize>) -> Self {
        Self {
            vertex_indices,
            texture_indices: Vec::new(),
            normal_indices: Vec::new(),
        }
    }

    /// Builds a polygon from corners, keeping the texture and normal lists
    /// empty when no corner carries that reference.
    pub fn with_corners(corners: &[Corner]) -> Self {
        let mut polygon = Self::new(corners.iter().map(|c| c.vertex).collect());
        if corners.iter().any(|c| c.texture.is_some()) {
            polygon.texture_indices = corners.iter().map(|c| c.texture).collect();
        }
        if corners.iter().any(|c| c.normal.is_some()) {
            polygon.normal_indices = corners.iter().map(|c| c.normal).collect();
        }
        polygon
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_indices.len()
    }

    pub fn has_texture_coordinates(&self) -> bool {
        !self.texture_indices.is_empty()
    }

    pub fn has_normals(&self) -> bool {
        !self.normal_indices.is_empty()
    }

    pub fn references_vertex(&self, index: usize) -> bool {
        self.vertex_indices.contains(&index)
    }

    /// Per-corner index triplets.
    pub fn corners(&self) -> impl Iterator<Item = Corner> + '_ {
        self.vertex_indices.iter().enumerate().map(move |(i, &vertex)| Corner {
            vertex,
            texture: self.texture_indices.get(i).copied().flatten(),
            normal: self.normal_indices.get(i).copied().flatten(),
        })
    }

    /// Shifts every vertex index above `index` down by one.
    pub fn decrement_vertex_indices_above(&mut self, index: usize) {
        for vi in &mut self.vertex_indices {
            if *vi > index {
                *vi -= 1;
            }
        }
    }
}

/// An indexed polygon mesh.
///
/// Indices are only validated when the mesh is written out; callers may
/// build meshes with dangling indices in between. `Clone` is a deep copy:
/// the clone never shares polygon storage with the original.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vector3>,
    pub texture_vertices: Vec<Vector2>,
    pub normals: Vec<Vector3>,
    pub polygons: Vec<Polygon>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, vertex: Vector3) {
        self.vertices.push(vertex);
    }

    pub fn add_texture_vertex(&mut self, texture_vertex: Vector2) {
        self.texture_vertices.push(texture_vertex);
    }

    pub fn add_normal(&mut self, normal: Vector3) {
        self.normals.push(normal);
    }

    pub fn add_polygon(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    /// Removes a vertex and keeps the remaining indices dense.
    ///
    /// Every polygon that references the vertex is dropped and indices above
    /// it shift down by one. The mesh is left unchanged on error.
    pub fn remove_vertex(&mut self, index: usize) -> Result<(), IndexError> {
        if index >= self.vertices.len() {
            return Err(IndexError::Vertex {
                index,
                len: self.vertices.len(),
            });
        }

        self.vertices.remove(index);
        let before = self.polygons.len();
        self.polygons.retain(|p| !p.references_vertex(index));
        for polygon in &mut self.polygons {
            polygon.decrement_vertex_indices_above(index);
        }

        tracing::debug!(
            vertex = index,
            dropped_polygons = before - self.polygons.len(),
            "removed vertex"
        );
        Ok(())
    }

    pub fn remove_polygon(&mut self, index: usize) -> Result<Polygon, IndexError> {
        if index >= self.polygons.len() {
            return Err(IndexError::Polygon {
                index,
                len: self.polygons.len(),
            });
        }
        tracing::debug!(polygon = index, "removed polygon");
        Ok(self.polygons.remove(index))
    }

    /// Axis-aligned bounds of the vertex positions.
    pub fn bounding_box(&self) -> Option<(Vector3, Vector3)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (min.inf(v), max.sup(v))
        }))
    }

    /// Create an indexed cube mesh (six quads) centred on the origin
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::new();

        for &(x, y, z) in &[
            (-half, -half, -half),
            (half, -half, -half),
            (half, half, -half),
            (-half, half, -half),
            (-half, -half, half),
            (half, -half, half),
            (half, half, half),
            (-half, half, half),
        ] {
            mesh.add_vertex(Vector3::new(x, y, z));
        }

        // Front, back, top, bottom, right, left
        for face in [
            [4, 5, 6, 7],
            [1, 0, 3, 2],
            [3, 7, 6, 2],
            [0, 1, 5, 4],
            [1, 2, 6, 5],
            [0, 4, 7, 3],
        ] {
            mesh.add_polygon(Polygon::new(face.to_vec()));
        }

        mesh
    }
}

impl fmt::Display for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mesh{{vertices={}, texCoords={}, normals={}, polygons={}}}",
            self.vertices.len(),
            self.texture_vertices.len(),
            self.normals.len(),
            self.polygons.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fan() -> Mesh {
        let mut mesh = Mesh::new();
        for i in 0..5 {
            mesh.add_vertex(Vector3::new(i as f32, 0.0, 0.0));
        }
        mesh.add_polygon(Polygon::new(vec![0, 1, 2]));
        mesh.add_polygon(Polygon::new(vec![0, 3, 4]));
        mesh.add_polygon(Polygon::new(vec![2, 3, 4]));
        mesh
    }

    #[test]
    fn test_remove_vertex_cascades() {
        let mut mesh = fan();
        mesh.remove_vertex(1).unwrap();

        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.polygons.len(), 2);
        assert_eq!(mesh.polygons[0].vertex_indices, vec![0, 2, 3]);
        assert_eq!(mesh.polygons[1].vertex_indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_vertex_out_of_range_leaves_mesh() {
        let mut mesh = fan();
        let before = mesh.clone();
        assert_eq!(
            mesh.remove_vertex(5),
            Err(IndexError::Vertex { index: 5, len: 5 })
        );
        assert_eq!(mesh, before);
    }

    #[test]
    fn test_remove_polygon() {
        let mut mesh = fan();
        let removed = mesh.remove_polygon(1).unwrap();
        assert_eq!(removed.vertex_indices, vec![0, 3, 4]);
        assert_eq!(mesh.polygons.len(), 2);
        assert_eq!(mesh.vertices.len(), 5);
        assert!(mesh.remove_polygon(2).is_err());
    }

    #[test]
    fn test_clone_is_deep() {
        let original = fan();
        let mut copy = original.clone();
        copy.polygons[0].vertex_indices[0] = 4;
        assert_eq!(original.polygons[0].vertex_indices[0], 0);
    }

    #[test]
    fn test_corners_and_with_corners() {
        let corners = [
            Corner { vertex: 0, texture: None, normal: Some(1) },
            Corner { vertex: 1, texture: None, normal: None },
            Corner { vertex: 2, texture: None, normal: Some(0) },
        ];
        let polygon = Polygon::with_corners(&corners);
        assert!(!polygon.has_texture_coordinates());
        assert!(polygon.has_normals());
        assert_eq!(polygon.corners().collect::<Vec<_>>(), corners.to_vec());
    }

    #[test]
    fn test_cube_and_bounds() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.vertices.len(), 8);
        assert_eq!(cube.polygons.len(), 6);
        assert!(cube.polygons.iter().all(|p| p.vertex_count() == 4));

        let (min, max) = cube.bounding_box().unwrap();
        assert_eq!(min, Vector3::new(-1.0, -1.0, -1.0));
        assert_eq!(max, Vector3::new(1.0, 1.0, 1.0));
        assert!(Mesh::new().bounding_box().is_none());
    }

    #[test]
    fn test_display_summary() {
        assert_eq!(
            fan().to_string(),
            "Mesh{vertices=5, texCoords=0, normals=0, polygons=3}"
        );
    }
}
