//! Scene objects and the explicit selection/edit state driven by a viewer.
use crate::error::IndexError;
use crate::geometry::Mesh;
use crate::math::{Matrix4, Matrix4Ext, Vector3};
use crate::picking;
use crate::projection::{Camera, ScreenPoint, Viewport};
use crate::transform::{self, ModelTransform};

/// A mesh paired with its own model transform and display name.
///
/// The transform is independent of the mesh: changing it never touches the
/// vertex data until [`SceneObject::materialize`] is called.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    mesh: Mesh,
    name: String,
    transform: Matrix4,
}

impl SceneObject {
    pub fn new(mesh: Mesh, name: impl Into<String>) -> Self {
        Self {
            mesh,
            name: name.into(),
            transform: Matrix4::identity(),
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn mesh_mut(&mut self) -> &mut Mesh {
        &mut self.mesh
    }

    pub fn set_mesh(&mut self, mesh: Mesh) {
        self.mesh = mesh;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transform(&self) -> &Matrix4 {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Matrix4) {
        self.transform = transform;
    }

    /// `transform = m * transform`: `m` acts after everything applied so far.
    pub fn apply_transform(&mut self, m: &Matrix4) {
        self.transform = m * self.transform;
    }

    pub fn translate(&mut self, tx: f32, ty: f32, tz: f32) {
        self.apply_transform(&transform::translate(tx, ty, tz));
    }

    /// Rotates by Euler angles in degrees, composed as `Rz * Ry * Rx`.
    pub fn rotate_degrees(&mut self, rx: f32, ry: f32, rz: f32) {
        self.apply_transform(&transform::combine(&[
            transform::rotate_z(rz.to_radians()),
            transform::rotate_y(ry.to_radians()),
            transform::rotate_x(rx.to_radians()),
        ]));
    }

    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) {
        self.apply_transform(&transform::scale(sx, sy, sz));
    }

    /// A new mesh with every vertex multiplied by the current transform.
    ///
    /// Texture coordinates, normals and polygons are copied as they are;
    /// normals are not corrected for non-uniform scale.
    pub fn materialize(&self) -> Mesh {
        Mesh {
            vertices: self
                .mesh
                .vertices
                .iter()
                .map(|v| self.transform.transform_homogeneous(v))
                .collect(),
            ..self.mesh.clone()
        }
    }
}

/// What a click selects inside the chosen object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditMode {
    #[default]
    Object,
    Vertex,
    Polygon,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub object: Option<usize>,
    pub vertex: Option<usize>,
    pub polygon: Option<usize>,
}

impl Selection {
    fn object_only(object: Option<usize>) -> Self {
        Self {
            object,
            ..Self::default()
        }
    }
}

/// Ordered scene objects plus the current selection.
///
/// `originals` runs parallel to `objects` and holds the mesh as it was before
/// the first transform applied through [`Scene::apply_transform_to_selected`].
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    selection: Selection,
    edit_mode: EditMode,
    originals: Vec<Option<Mesh>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an object and selects it. Returns its index.
    pub fn add_object(&mut self, mesh: Mesh, name: impl Into<String>) -> usize {
        let object = SceneObject::new(mesh, name);
        tracing::debug!(name = object.name(), mesh = %object.mesh(), "added scene object");
        self.objects.push(object);
        self.originals.push(None);

        let index = self.objects.len() - 1;
        self.selection = Selection::object_only(Some(index));
        index
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, index: usize) -> Option<&SceneObject> {
        self.objects.get(index)
    }

    pub fn object_mut(&mut self, index: usize) -> Option<&mut SceneObject> {
        self.objects.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    pub fn selected_object(&self) -> Option<&SceneObject> {
        self.selection.object.and_then(|i| self.objects.get(i))
    }

    /// Switches edit mode, dropping the selection that belongs to the other modes.
    pub fn set_edit_mode(&mut self, mode: EditMode) {
        self.edit_mode = mode;
        match mode {
            EditMode::Object => {
                self.selection.vertex = None;
                self.selection.polygon = None;
            }
            EditMode::Vertex => self.selection.polygon = None,
            EditMode::Polygon => self.selection.vertex = None,
        }
    }

    /// `Projection * View * Model` for the object at `index`.
    pub fn mvp_for(&self, index: usize, camera: &Camera) -> Result<Matrix4, IndexError> {
        let object = self.objects.get(index).ok_or(IndexError::SceneObject {
            index,
            len: self.objects.len(),
        })?;
        Ok(camera.mvp(object.transform()))
    }

    /// Selects the object nearest to `cursor`, then the vertex or polygon
    /// under it when the edit mode asks for one.
    ///
    /// A miss leaves the selection untouched. Returns the picked object.
    pub fn click(&mut self, cursor: &ScreenPoint, camera: &Camera, viewport: Viewport) -> Option<usize> {
        let index = picking::pick_model(&self.objects, camera, cursor, viewport)?;
        self.selection = Selection::object_only(Some(index));

        let object = &self.objects[index];
        let mvp = camera.mvp(object.transform());
        match self.edit_mode {
            EditMode::Object => {}
            EditMode::Vertex => {
                self.selection.vertex = picking::pick_vertex(object.mesh(), &mvp, cursor, viewport);
            }
            EditMode::Polygon => {
                self.selection.polygon = picking::pick_polygon(object.mesh(), &mvp, cursor, viewport);
            }
        }

        tracing::debug!(object = index, selection = ?self.selection, "click selection");
        Some(index)
    }

    /// Removes the selected vertex (vertex mode) or polygon (polygon mode)
    /// from the selected object's mesh.
    ///
    /// Returns `Ok(false)` when there was nothing to delete.
    pub fn delete_selected_element(&mut self) -> Result<bool, IndexError> {
        let Some(object_index) = self.selection.object else {
            return Ok(false);
        };
        let len = self.objects.len();
        let object = self.objects.get_mut(object_index).ok_or(IndexError::SceneObject {
            index: object_index,
            len,
        })?;

        match (self.edit_mode, self.selection.vertex, self.selection.polygon) {
            (EditMode::Vertex, Some(vertex), _) => {
                object.mesh_mut().remove_vertex(vertex)?;
                self.selection.vertex = None;
                Ok(true)
            }
            (EditMode::Polygon, _, Some(polygon)) => {
                object.mesh_mut().remove_polygon(polygon)?;
                self.selection.polygon = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Removes the selected object; selection moves to the previous one.
    pub fn remove_selected_object(&mut self) -> Option<SceneObject> {
        let index = self.selection.object.filter(|&i| i < self.objects.len())?;
        let removed = self.objects.remove(index);
        self.originals.remove(index);

        let next = (!self.objects.is_empty()).then(|| index.saturating_sub(1));
        self.selection = Selection::object_only(next);
        tracing::debug!(name = removed.name(), "removed scene object");
        Some(removed)
    }

    pub fn select_next(&mut self) {
        let next = self.selection.object.map_or(0, |i| i as isize + 1);
        self.select_wrapping(next);
    }

    pub fn select_previous(&mut self) {
        let previous = self.selection.object.map_or(-1, |i| i as isize - 1);
        self.select_wrapping(previous);
    }

    fn select_wrapping(&mut self, index: isize) {
        let len = self.objects.len() as isize;
        let object = (len > 0).then(|| index.rem_euclid(len) as usize);
        self.selection = Selection::object_only(object);
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.originals.clear();
        self.selection = Selection::default();
    }

    /// Pre-multiplies `transform` onto the selected object.
    ///
    /// The first call for an object stores a deep copy of its mesh so that
    /// [`Scene::revert_selected`] can restore it.
    pub fn apply_transform_to_selected(&mut self, transform: &ModelTransform) -> bool {
        let Some(index) = self.selection.object.filter(|&i| i < self.objects.len()) else {
            return false;
        };
        let object = &mut self.objects[index];
        self.originals[index].get_or_insert_with(|| object.mesh().clone());
        object.apply_transform(&transform.to_matrix());
        true
    }

    /// Restores the selected object's stored mesh and resets its transform.
    ///
    /// Returns `false` when the object has no stored mesh.
    pub fn revert_selected(&mut self) -> bool {
        let Some(index) = self.selection.object.filter(|&i| i < self.objects.len()) else {
            return false;
        };
        let Some(original) = &self.originals[index] else {
            return false;
        };

        let object = &mut self.objects[index];
        object.set_mesh(original.clone());
        object.set_transform(Matrix4::identity());
        self.selection.vertex = None;
        self.selection.polygon = None;
        tracing::debug!(name = object.name(), "reverted to original mesh");
        true
    }

    /// World-space bounds of every object's vertices under its model
    /// transform. Non-finite positions are ignored; `None` when nothing is left.
    pub fn bounding_box(&self) -> Option<(Vector3, Vector3)> {
        self.objects
            .iter()
            .flat_map(|object| {
                let transform = object.transform();
                object.mesh().vertices.iter().map(move |v| transform.transform_homogeneous(v))
            })
            .filter(|v| v.iter().all(|c| c.is_finite()))
            .fold(None, |bounds, v| match bounds {
                None => Some((v, v)),
                Some((min, max)) => Some((min.inf(&v), max.sup(&v))),
            })
    }

    /// The stored pre-transform mesh of an object, if any.
    pub fn original(&self, index: usize) -> Option<&Mesh> {
        self.originals.get(index).and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polygon;
    use crate::math::{ApproxEq, Vector3};

    fn triangle() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Vector3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Vector3::new(1.0, 0.0, 0.0));
        mesh.add_vertex(Vector3::new(0.0, 1.0, 0.0));
        mesh.add_polygon(Polygon::new(vec![0, 1, 2]));
        mesh
    }

    #[test]
    fn test_transform_starts_identity_and_premultiplies() {
        let mut object = SceneObject::new(triangle(), "tri");
        assert!(object.transform().is_identity_matrix());

        object.scale(2.0, 2.0, 2.0);
        object.translate(1.0, 0.0, 0.0);
        // Scale acts first, translation second.
        let p = object.transform().transform_homogeneous(&Vector3::new(1.0, 0.0, 0.0));
        assert!(p.approx_eq(&Vector3::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn test_materialize_leaves_source_mesh() {
        let mut object = SceneObject::new(triangle(), "tri");
        object.translate(0.0, 0.0, -2.0);
        let moved = object.materialize();

        assert_eq!(object.mesh(), &triangle());
        assert!(moved.vertices[1].approx_eq(&Vector3::new(1.0, 0.0, -2.0)));
        assert_eq!(moved.polygons, object.mesh().polygons);
    }

    #[test]
    fn test_rotate_degrees() {
        let mut object = SceneObject::new(triangle(), "tri");
        object.rotate_degrees(0.0, 0.0, 90.0);
        let p = object.transform().transform_homogeneous(&Vector3::x());
        assert!((p - Vector3::y()).norm() < 1e-5);
    }

    #[test]
    fn test_add_object_selects_it() {
        let mut scene = Scene::new();
        assert_eq!(scene.add_object(triangle(), "a"), 0);
        assert_eq!(scene.add_object(triangle(), "b"), 1);
        assert_eq!(scene.selection().object, Some(1));
        assert_eq!(scene.selected_object().map(SceneObject::name), Some("b"));
    }

    #[test]
    fn test_select_wraps() {
        let mut scene = Scene::new();
        scene.select_next();
        assert_eq!(scene.selection().object, None);

        scene.add_object(triangle(), "a");
        scene.add_object(triangle(), "b");
        scene.add_object(triangle(), "c");
        scene.select_next();
        assert_eq!(scene.selection().object, Some(0));
        scene.select_previous();
        assert_eq!(scene.selection().object, Some(2));
    }

    #[test]
    fn test_remove_selected_object() {
        let mut scene = Scene::new();
        scene.add_object(triangle(), "a");
        scene.add_object(triangle(), "b");

        let removed = scene.remove_selected_object().unwrap();
        assert_eq!(removed.name(), "b");
        assert_eq!(scene.selection().object, Some(0));

        scene.remove_selected_object();
        assert!(scene.is_empty());
        assert_eq!(scene.selection().object, None);
        assert!(scene.remove_selected_object().is_none());
    }

    #[test]
    fn test_apply_and_revert() {
        let mut scene = Scene::new();
        scene.add_object(triangle(), "a");
        assert!(!scene.revert_selected());

        scene.apply_transform_to_selected(&ModelTransform::translation(1.0, 2.0, 3.0));
        scene.apply_transform_to_selected(&ModelTransform::uniform_scale(2.0));
        scene.object_mut(0).unwrap().mesh_mut().remove_vertex(0).unwrap();
        assert_eq!(scene.original(0), Some(&triangle()));

        assert!(scene.revert_selected());
        let object = scene.object(0).unwrap();
        assert_eq!(object.mesh(), &triangle());
        assert!(object.transform().is_identity_matrix());
    }

    #[test]
    fn test_set_edit_mode_clears_other_selection() {
        let mut scene = Scene::new();
        scene.add_object(triangle(), "a");
        scene.selection.vertex = Some(1);
        scene.selection.polygon = Some(0);

        scene.set_edit_mode(EditMode::Polygon);
        assert_eq!(scene.selection().vertex, None);
        assert_eq!(scene.selection().polygon, Some(0));

        scene.set_edit_mode(EditMode::Object);
        assert_eq!(scene.selection().polygon, None);
    }

    #[test]
    fn test_click_selects_vertex_and_deletes_it() {
        let camera = Camera::default();
        let viewport = Viewport::new(800, 600);
        let mut scene = Scene::new();
        scene.add_object(triangle(), "a");
        scene.set_edit_mode(EditMode::Vertex);

        let mvp = scene.mvp_for(0, &camera).unwrap();
        let cursor = crate::projection::project_vertex(&mvp, &Vector3::new(1.0, 0.0, 0.0), viewport);
        assert_eq!(scene.click(&cursor, &camera, viewport), Some(0));
        assert_eq!(scene.selection().vertex, Some(1));

        assert_eq!(scene.delete_selected_element(), Ok(true));
        let mesh = scene.object(0).unwrap().mesh();
        assert_eq!(mesh.vertices.len(), 2);
        assert!(mesh.polygons.is_empty());
        assert_eq!(scene.delete_selected_element(), Ok(false));
    }

    #[test]
    fn test_click_miss_keeps_selection() {
        let camera = Camera::default();
        let viewport = Viewport::new(800, 600);
        let mut scene = Scene::new();
        scene.add_object(triangle(), "a");

        let far_away = ScreenPoint::new(-5000.0, -5000.0);
        assert_eq!(scene.click(&far_away, &camera, viewport), None);
        assert_eq!(scene.selection().object, Some(0));
        assert_eq!(
            scene.mvp_for(3, &camera),
            Err(IndexError::SceneObject { index: 3, len: 1 })
        );
    }

    #[test]
    fn test_bounding_box_spans_transformed_objects() {
        let mut scene = Scene::new();
        assert!(scene.bounding_box().is_none());

        scene.add_object(triangle(), "a");
        let moved = scene.add_object(triangle(), "b");
        scene.object_mut(moved).unwrap().translate(5.0, 0.0, -2.0);
        let mut broken = Mesh::new();
        broken.add_vertex(Vector3::new(f32::NAN, 100.0, 0.0));
        scene.add_object(broken, "c");

        let (min, max) = scene.bounding_box().unwrap();
        assert!(min.approx_eq(&Vector3::new(0.0, 0.0, -2.0)));
        assert!(max.approx_eq(&Vector3::new(6.0, 1.0, 0.0)));
    }
}
