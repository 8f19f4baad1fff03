//! Camera follow and zoom.

use bevy::math::Vec2;

use crate::config::CameraConfig;
use crate::objects::ObjectId;
use crate::render::OrthographicCamera;

/// Smoothly follows a target object and keeps zoom within limits.
///
/// The target is an [`ObjectId`]; the caller resolves its position each
/// frame and passes it to [`CameraHelper::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct CameraHelper {
    position: Vec2,
    zoom: f32,
    target: Option<ObjectId>,
    config: CameraConfig,
}

impl Default for CameraHelper {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

impl CameraHelper {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            target: None,
            config: config.clone(),
        }
    }

    /// Moves toward `target_position` when a target is set.
    pub fn update(&mut self, dt: f32, target_position: Option<Vec2>) {
        if self.target.is_none() {
            return;
        }
        let Some(target_position) = target_position else {
            return;
        };

        let t = (self.config.follow_speed * dt).clamp(0.0, 1.0);
        self.position = self.position.lerp(target_position, t);
        self.position.y = self.position.y.max(self.config.floor_y);
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn add_zoom(&mut self, amount: f32) {
        self.set_zoom(self.zoom + amount);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_target(&mut self, target: Option<ObjectId>) {
        self.target = target;
    }

    pub fn target(&self) -> Option<ObjectId> {
        self.target
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// Whether the camera follows exactly `target`.
    pub fn has_target_of(&self, target: ObjectId) -> bool {
        self.target == Some(target)
    }

    pub fn apply_to(&self, camera: &mut OrthographicCamera) {
        camera.position = self.position;
        camera.zoom = self.zoom;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_clamped() {
        let mut camera = CameraHelper::default();

        camera.set_zoom(100.0);
        assert_eq!(camera.zoom(), 10.0);

        camera.set_zoom(0.0);
        assert_eq!(camera.zoom(), 0.25);

        camera.set_zoom(1.0);
        camera.add_zoom(-5.0);
        assert_eq!(camera.zoom(), 0.25);
        camera.add_zoom(0.5);
        assert_eq!(camera.zoom(), 0.75);
    }

    #[test]
    fn test_no_target_is_noop() {
        let mut camera = CameraHelper::default();
        camera.set_position(Vec2::new(3.0, 4.0));

        camera.update(1.0, Some(Vec2::new(100.0, 100.0)));

        assert_eq!(camera.position(), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_follow_lerps_toward_target() {
        let mut camera = CameraHelper::default();
        camera.set_target(Some(ObjectId::Player));

        camera.update(0.125, Some(Vec2::new(10.0, 2.0)));

        assert!((camera.position() - Vec2::new(5.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_large_dt_snaps_to_target() {
        let mut camera = CameraHelper::default();
        camera.set_target(Some(ObjectId::Player));

        camera.update(10.0, Some(Vec2::new(7.0, 3.0)));

        assert_eq!(camera.position(), Vec2::new(7.0, 3.0));
    }

    #[test]
    fn test_floor_limits_descent() {
        let mut camera = CameraHelper::default();
        camera.set_target(Some(ObjectId::Player));

        camera.update(1.0, Some(Vec2::new(0.0, -20.0)));

        assert_eq!(camera.position().y, -1.0);
    }

    #[test]
    fn test_apply_to() {
        let mut helper = CameraHelper::default();
        helper.set_position(Vec2::new(2.0, 1.0));
        helper.set_zoom(2.0);
        let mut camera = OrthographicCamera::new(5.0, 5.0);

        helper.apply_to(&mut camera);

        assert_eq!(camera.position, Vec2::new(2.0, 1.0));
        assert_eq!(camera.zoom, 2.0);
    }
}
