use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

/// Fixed parameters of the orthographic camera.
///
/// `projection_size` is the number of world units visible horizontally and
/// vertically. It does not depend on the window's pixel size.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraConfig {
    pub projection_size: Vec2,
    pub near: f32,
    pub far: f32,
    /// Z coordinate of the eye; the camera looks down -Z from here.
    pub eye_depth: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            // 40 x 21 tiles of 32 world units.
            projection_size: Vec2::new(32.0 * 40.0, 32.0 * 21.0),
            near: 0.0,
            far: 100.0,
            eye_depth: 20.0,
        }
    }
}

/// 2D orthographic camera.
///
/// The projection maps `[0, projection_size]` (world units, +Y up) onto clip
/// space; `position` is the world point shown at the bottom-left corner.
/// Each forward matrix is cached together with its inverse, and both are
/// recomputed at the same time.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec2,
    config: CameraConfig,
    projection: Mat4,
    inverse_projection: Mat4,
    view: Mat4,
    inverse_view: Mat4,
}

impl Camera {
    pub fn new(position: Vec2) -> Self {
        Self::with_config(position, CameraConfig::default())
    }

    pub fn with_config(position: Vec2, config: CameraConfig) -> Self {
        let mut camera = Self {
            position,
            config,
            projection: Mat4::IDENTITY,
            inverse_projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            inverse_view: Mat4::IDENTITY,
        };
        camera.set_viewport_parameters();
        camera.view();
        camera
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Replaces the viewport parameters and rebuilds the projection.
    pub fn set_config(&mut self, config: CameraConfig) {
        self.config = config;
        self.set_viewport_parameters();
    }

    /// Recomputes the projection (and its inverse) from the fixed world bounds.
    pub fn set_viewport_parameters(&mut self) {
        let CameraConfig {
            projection_size,
            near,
            far,
            ..
        } = self.config;
        self.projection =
            Mat4::orthographic_rh(0.0, projection_size.x, 0.0, projection_size.y, near, far);
        self.inverse_projection = self.projection.inverse();
    }

    /// Rebuilds the view matrix from the current position and returns it.
    ///
    /// Also refreshes [`inverse_view`](Self::inverse_view); read that only
    /// after calling this following a position change.
    pub fn view(&mut self) -> Mat4 {
        let eye = Vec3::new(self.position.x, self.position.y, self.config.eye_depth);
        let center = Vec3::new(self.position.x, self.position.y, -1.0);
        self.view = Mat4::look_at_rh(eye, center, Vec3::Y);
        self.inverse_view = self.view.inverse();
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn inverse_projection(&self) -> Mat4 {
        self.inverse_projection
    }

    pub fn inverse_view(&self) -> Mat4 {
        self.inverse_view
    }

    pub fn projection_size(&self) -> Vec2 {
        self.config.projection_size
    }

    /// Maps a point in normalized device coordinates (`[-1, 1]`, +Y up) to
    /// world space using the cached inverse matrices.
    pub fn screen_to_world(&self, ndc: Vec2) -> Vec2 {
        let clip = ndc.extend(0.0).extend(1.0);
        (self.inverse_view * self.inverse_projection * clip).xy()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn projection_inverts_back() {
        for pos in [Vec2::ZERO, Vec2::new(250.0, -40.0), Vec2::new(-1e3, 7.5)] {
            let cam = Camera::new(pos);
            let round = cam.inverse_projection().inverse();
            assert!(cam.projection().abs_diff_eq(round, EPS));
        }
    }

    #[test]
    fn projection_maps_bounds_to_clip_corners() {
        let cam = Camera::default();
        let size = cam.projection_size();
        let bl = cam.projection() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let tr = cam.projection() * glam::Vec4::new(size.x, size.y, 0.0, 1.0);
        assert!(bl.xy().abs_diff_eq(Vec2::new(-1.0, -1.0), EPS));
        assert!(tr.xy().abs_diff_eq(Vec2::new(1.0, 1.0), EPS));
    }

    #[test]
    fn set_config_rebuilds_projection() {
        let mut cam = Camera::default();
        let before = cam.projection();
        cam.set_config(CameraConfig {
            projection_size: Vec2::new(100.0, 100.0),
            ..CameraConfig::default()
        });
        assert!(!cam.projection().abs_diff_eq(before, EPS));
        assert!(cam
            .inverse_projection()
            .abs_diff_eq(cam.projection().inverse(), EPS));
    }

    // ── view ──────────────────────────────────────────────────────────────

    #[test]
    fn view_at_origin_is_pull_back_along_z() {
        let mut cam = Camera::new(Vec2::ZERO);
        let expected = Mat4::from_translation(Vec3::new(0.0, 0.0, -20.0));
        assert!(cam.view().abs_diff_eq(expected, EPS));
    }

    #[test]
    fn view_follows_position_and_refreshes_inverse() {
        let mut cam = Camera::new(Vec2::ZERO);
        cam.position = Vec2::new(64.0, 32.0);
        let view = cam.view();
        let expected = Mat4::from_translation(Vec3::new(-64.0, -32.0, -20.0));
        assert!(view.abs_diff_eq(expected, EPS));
        assert!(cam.inverse_view().abs_diff_eq(view.inverse(), EPS));
    }

    // ── unprojection ──────────────────────────────────────────────────────

    #[test]
    fn screen_to_world_maps_ndc_corners() {
        let mut cam = Camera::new(Vec2::new(100.0, 50.0));
        cam.view();
        let size = cam.projection_size();

        let bl = cam.screen_to_world(Vec2::new(-1.0, -1.0));
        let tr = cam.screen_to_world(Vec2::new(1.0, 1.0));
        assert!(bl.abs_diff_eq(Vec2::new(100.0, 50.0), 1e-2));
        assert!(tr.abs_diff_eq(Vec2::new(100.0, 50.0) + size, 1e-2));
    }
}
