//! Camera, view/projection matrices and clip-to-screen mapping.
//!
//! Conventions: column vectors, `MVP = projection * view * model`, field of
//! view in radians. The look-at basis has its z axis pointing from the eye
//! towards the target; combined with the symmetric OpenGL-style projection
//! below, a camera on +Z looking at the origin with the default up vector
//! shows world +Y above the centre of the screen and world +X to the left.
use crate::error::{ProjectionError, SingularMatrixError};
use crate::math::{
    perspective_divide, to_homogeneous_point, Matrix4, Matrix4Ext, Point3, Vector2, Vector3,
    Vector4, VectorExt,
};
use crate::transform;

/// Up vector used when none is given.
pub const DEFAULT_UP: Vector3 = Vector3::new(0.0, -1.0, 0.0);

/// Radius framed for bounds that collapse to a single point.
const MIN_FRAME_RADIUS: f32 = 0.5;

/// Pixel dimensions of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; `None` for a zero-height viewport.
    pub fn aspect_ratio(&self) -> Option<f32> {
        (self.height > 0).then(|| self.width as f32 / self.height as f32)
    }
}

/// A point in screen space: x grows right, y grows down.
pub type ScreenPoint = Vector2;

/// View matrix from an eye point towards a target.
///
/// z = normalize(target - eye), x = normalize(up × z), y = z × x; the
/// translation column holds `-axis · eye`. This is nalgebra's left-handed
/// look-at. `eye == target` or an `up` parallel to the view direction
/// yields a degenerate (NaN) basis; callers must avoid both.
pub fn look_at(eye: &Vector3, target: &Vector3, up: &Vector3) -> Matrix4 {
    Matrix4::look_at_lh(&Point3::from(*eye), &Point3::from(*target), up)
}

/// Symmetric perspective projection. `fov` is the vertical field of view in radians.
pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Result<Matrix4, ProjectionError> {
    validate_perspective(fov, aspect, near, far)?;
    Ok(perspective_unchecked(fov, aspect, near, far))
}

fn perspective_unchecked(fov: f32, aspect: f32, near: f32, far: f32) -> Matrix4 {
    Matrix4::new_perspective(aspect, fov, near, far)
}

fn validate_perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Result<(), ProjectionError> {
    if !(aspect.is_finite() && aspect > f32::EPSILON) {
        return Err(ProjectionError::InvalidAspect(aspect));
    }
    if nearly_equal(near, far) {
        return Err(ProjectionError::DegenerateDepthRange(near));
    }
    if !(fov > 0.0 && fov < std::f32::consts::PI) {
        return Err(ProjectionError::InvalidFov(fov));
    }
    Ok(())
}

/// Same closeness test nalgebra asserts on before building a projection.
fn nearly_equal(a: f32, b: f32) -> bool {
    let diff = (a - b).abs();
    a == b || diff <= f32::EPSILON || diff <= a.abs().max(b.abs()) * f32::EPSILON
}

/// Maps normalized device coordinates to screen pixels, flipping Y.
pub fn ndc_to_screen(ndc: &Vector3, viewport: Viewport) -> ScreenPoint {
    let width = viewport.width as f32;
    let height = viewport.height as f32;
    ScreenPoint::new(
        (ndc.x + 1.0) / 2.0 * width,
        height - (ndc.y + 1.0) / 2.0 * height,
    )
}

/// Transforms a model-space vertex to screen space through `mvp`.
///
/// The perspective divide is skipped when `|w|` is near zero, so the result
/// is always finite for finite input.
pub fn project_vertex(mvp: &Matrix4, vertex: &Vector3, viewport: Viewport) -> ScreenPoint {
    ndc_to_screen(&mvp.transform_homogeneous(vertex), viewport)
}

/// A world-space ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vector3 {
        self.origin + self.direction * t
    }
}

/// Perspective camera. Holds no cached matrices: view and projection are
/// derived from the fields on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vector3,
    target: Vector3,
    up: Vector3,
    fov: f32,
    aspect: f32,
    near: f32,
    far: f32,
}

impl Camera {
    /// `fov` is in radians.
    pub fn new(
        position: Vector3,
        target: Vector3,
        fov: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Result<Self, ProjectionError> {
        validate_perspective(fov, aspect, near, far)?;
        Ok(Self {
            position,
            target,
            up: DEFAULT_UP,
            fov,
            aspect,
            near,
            far,
        })
    }

    /// Camera at (0, 0, 5) looking at the origin with a 60° field of view.
    pub fn for_viewport(viewport: Viewport) -> Self {
        let aspect = viewport
            .aspect_ratio()
            .filter(|a| a.is_finite() && *a > 0.0)
            .unwrap_or(1.0);
        Self {
            position: Vector3::new(0.0, 0.0, 5.0),
            target: Vector3::zeros(),
            up: DEFAULT_UP,
            fov: 60f32.to_radians(),
            aspect,
            near: 0.1,
            far: 100.0,
        }
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn target(&self) -> Vector3 {
        self.target
    }

    pub fn up(&self) -> Vector3 {
        self.up
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    pub fn set_position(&mut self, position: Vector3) {
        self.position = position;
    }

    pub fn set_target(&mut self, target: Vector3) {
        self.target = target;
    }

    pub fn set_up(&mut self, up: Vector3) {
        self.up = up;
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) -> Result<(), ProjectionError> {
        validate_perspective(self.fov, aspect, self.near, self.far)?;
        self.aspect = aspect;
        Ok(())
    }

    pub fn move_position(&mut self, delta: &Vector3) {
        self.position += delta;
    }

    pub fn move_target(&mut self, delta: &Vector3) {
        self.target += delta;
    }

    /// Moves the camera so the box `min..max` fills the view.
    ///
    /// The target becomes the box centre and the eye backs off along the
    /// current viewing direction (or +Z when position and target coincide)
    /// until the bounding sphere fits both the vertical and horizontal field
    /// of view. Non-finite bounds leave the camera unchanged.
    pub fn frame(&mut self, min: &Vector3, max: &Vector3) {
        let centre = (min + max) / 2.0;
        let radius = ((max - min).norm() / 2.0).max(MIN_FRAME_RADIUS);
        let half_vertical = self.fov / 2.0;
        let half_horizontal = (half_vertical.tan() * self.aspect).atan();
        let distance = radius / half_vertical.min(half_horizontal).sin();
        if !(centre.iter().all(|c| c.is_finite()) && distance.is_finite()) {
            tracing::debug!(?min, ?max, "bounds cannot be framed");
            return;
        }

        let mut back = (self.position - self.target).normalized_or_zero();
        if back == Vector3::zeros() {
            back = Vector3::z();
        }
        self.set_target(centre);
        self.set_position(centre + back * distance);
        tracing::debug!(position = ?self.position, target = ?self.target, "framed bounds");
    }

    /// Fails when position and target coincide or the view direction is
    /// parallel to `up`; either makes the view matrix NaN.
    pub fn validate_view(&self) -> Result<(), ProjectionError> {
        let forward = (self.target - self.position).normalized_or_zero();
        let up = self.up.normalized_or_zero();
        if forward.cross(&up).norm() <= 1e-6 {
            return Err(ProjectionError::DegenerateView);
        }
        Ok(())
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4 {
        look_at(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4 {
        // fov, aspect and depth range are checked whenever they are set
        perspective_unchecked(self.fov, self.aspect, self.near, self.far)
    }

    pub fn mvp(&self, model: &Matrix4) -> Matrix4 {
        transform::mvp_matrix(model, &self.view_matrix(), &self.projection_matrix())
    }

    /// Project a model-space point to screen space
    pub fn project_to_screen(&self, point: &Vector3, model: &Matrix4, viewport: Viewport) -> ScreenPoint {
        project_vertex(&self.mvp(model), point, viewport)
    }

    /// World-space ray through a screen point, starting at the camera.
    ///
    /// The direction is oriented towards the target side of the eye.
    pub fn screen_ray(&self, point: &ScreenPoint, viewport: Viewport) -> Result<Ray, SingularMatrixError> {
        let inverse = (self.projection_matrix() * self.view_matrix()).inverted()?;

        let width = viewport.width.max(1) as f32;
        let height = viewport.height.max(1) as f32;
        let ndc_x = 2.0 * point.x / width - 1.0;
        let ndc_y = 1.0 - 2.0 * point.y / height;

        let near = perspective_divide(&(inverse * Vector4::new(ndc_x, ndc_y, -1.0, 1.0)));
        let far = perspective_divide(&(inverse * Vector4::new(ndc_x, ndc_y, 1.0, 1.0)));

        let forward = self.target - self.position;
        let mut direction = (far - near).normalized_or_zero();
        if direction.dot(&forward) < 0.0 {
            direction = -direction;
        }

        Ok(Ray {
            origin: self.position,
            direction,
        })
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::for_viewport(Viewport::new(800, 600))
    }
}

/// Homogeneous clip-space coordinates of a model-space point.
pub fn to_clip_space(mvp: &Matrix4, vertex: &Vector3) -> Vector4 {
    mvp * to_homogeneous_point(vertex)
}
