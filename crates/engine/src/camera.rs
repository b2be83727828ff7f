use crate::geometry::{AngleUnit, Vec2};
use crate::graphics::View;

pub const CAMERA_ZOOM_DEFAULT: f32 = 1.0;
pub const CAMERA_ZOOM_MIN: f32 = 0.25;
pub const CAMERA_ZOOM_MAX: f32 = 8.0;
pub const CAMERA_ZOOM_STEP: f32 = 0.25;
pub const DEFAULT_SNAPPINESS: f32 = 3.0;
pub const DEFAULT_IGNORE_DISTANCE: f32 = 1.0;

/// Follow camera. `raw_position` is where the view is centred this frame;
/// `target_position` is where it is heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub raw_position: Vec2,
    pub target_position: Vec2,
    pub rotation_degrees: f32,
    zoom: f32,
    viewport: Vec2,
    /// Ease toward the target instead of snapping.
    pub smooth: bool,
    /// Lerp rate per second; higher is snappier.
    pub snappiness: f32,
    /// Closer than this the camera stops moving.
    pub ignore_distance: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl Camera {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            raw_position: Vec2::ZERO,
            target_position: Vec2::ZERO,
            rotation_degrees: 0.0,
            zoom: CAMERA_ZOOM_DEFAULT,
            viewport: Vec2::new(viewport_width as f32, viewport_height as f32),
            smooth: true,
            snappiness: DEFAULT_SNAPPINESS,
            ignore_distance: DEFAULT_IGNORE_DISTANCE,
        }
    }

    /// Jumps straight to `position`, skipping smoothing.
    pub fn goto(&mut self, position: Vec2) {
        self.target_position = position;
        self.raw_position = position;
    }

    pub fn target(&mut self, position: Vec2) {
        self.target_position = position;
    }

    pub fn update(&mut self, dt: f32) {
        if !self.smooth {
            self.raw_position = self.target_position;
            return;
        }
        if self.raw_position.distance(self.target_position) <= self.ignore_distance {
            return;
        }
        let t = (self.snappiness * dt).clamp(0.0, 1.0);
        self.raw_position = self.raw_position.lerp(self.target_position, t);
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom_clamped(&mut self, zoom: f32) {
        self.zoom = clamp_camera_zoom(zoom);
    }

    pub fn apply_zoom_steps(&mut self, steps: i32) {
        if steps == 0 {
            return;
        }
        self.set_zoom_clamped(self.zoom + steps as f32 * CAMERA_ZOOM_STEP);
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width as f32, height as f32);
    }

    /// World-space size of the visible area.
    pub fn size(&self) -> Vec2 {
        self.viewport / self.zoom
    }

    pub fn view(&self) -> View {
        View {
            center: self.raw_position,
            size: self.size(),
            rotation_degrees: self.rotation_degrees,
        }
    }

    /// Maps a pixel position (origin top-left) into world space.
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let from_center = (screen - self.viewport / 2.0) / self.zoom;
        self.raw_position + from_center.rotate(self.rotation_degrees, AngleUnit::Degrees)
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        let from_center = (world - self.raw_position).rotate(-self.rotation_degrees, AngleUnit::Degrees);
        from_center * self.zoom + self.viewport / 2.0
    }
}

fn clamp_camera_zoom(zoom: f32) -> f32 {
    if !zoom.is_finite() {
        return CAMERA_ZOOM_DEFAULT;
    }
    zoom.clamp(CAMERA_ZOOM_MIN, CAMERA_ZOOM_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Vec2, expected: Vec2) {
        assert!(
            actual.distance(expected) < 0.001,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn goto_moves_both_positions() {
        let mut camera = Camera::default();
        camera.goto(Vec2::new(100.0, 50.0));
        assert_eq!(camera.raw_position, Vec2::new(100.0, 50.0));
        assert_eq!(camera.target_position, Vec2::new(100.0, 50.0));
    }

    #[test]
    fn smooth_update_lerps_toward_target() {
        let mut camera = Camera::default();
        camera.target(Vec2::new(100.0, 0.0));
        camera.update(0.1);
        assert_close(camera.raw_position, Vec2::new(30.0, 0.0));
        camera.update(0.1);
        assert_close(camera.raw_position, Vec2::new(51.0, 0.0));
    }

    #[test]
    fn update_stops_inside_ignore_distance() {
        let mut camera = Camera::default();
        camera.target(Vec2::new(0.5, 0.0));
        camera.update(1.0);
        assert_eq!(camera.raw_position, Vec2::ZERO);
    }

    #[test]
    fn large_step_never_overshoots() {
        let mut camera = Camera::default();
        camera.target(Vec2::new(10.0, 10.0));
        camera.update(5.0);
        assert_eq!(camera.raw_position, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn unsmoothed_camera_snaps() {
        let mut camera = Camera::default();
        camera.smooth = false;
        camera.target(Vec2::new(-40.0, 7.0));
        camera.update(0.0);
        assert_eq!(camera.raw_position, Vec2::new(-40.0, 7.0));
    }

    #[test]
    fn zoom_is_clamped_and_defaults_on_nan() {
        let mut camera = Camera::default();
        camera.set_zoom_clamped(100.0);
        assert_eq!(camera.zoom(), CAMERA_ZOOM_MAX);
        camera.set_zoom_clamped(0.0);
        assert_eq!(camera.zoom(), CAMERA_ZOOM_MIN);
        camera.set_zoom_clamped(f32::NAN);
        assert_eq!(camera.zoom(), CAMERA_ZOOM_DEFAULT);
        camera.apply_zoom_steps(4);
        assert_eq!(camera.zoom(), 2.0);
    }

    #[test]
    fn view_size_shrinks_with_zoom() {
        let mut camera = Camera::new(800, 600);
        camera.set_zoom_clamped(2.0);
        camera.goto(Vec2::new(5.0, 5.0));
        let view = camera.view();
        assert_eq!(view.center, Vec2::new(5.0, 5.0));
        assert_eq!(view.size, Vec2::new(400.0, 300.0));

        camera.resize(1000, 500);
        assert_eq!(camera.size(), Vec2::new(500.0, 250.0));
    }

    #[test]
    fn screen_center_maps_to_camera_position() {
        let mut camera = Camera::new(800, 600);
        camera.goto(Vec2::new(10.0, -5.0));
        assert_close(camera.screen_to_world(Vec2::new(400.0, 300.0)), Vec2::new(10.0, -5.0));
        assert_close(camera.screen_to_world(Vec2::new(420.0, 300.0)), Vec2::new(30.0, -5.0));

        camera.set_zoom_clamped(2.0);
        assert_close(camera.screen_to_world(Vec2::new(420.0, 300.0)), Vec2::new(20.0, -5.0));
    }

    #[test]
    fn screen_and_world_mappings_are_inverse() {
        let mut camera = Camera::new(640, 480);
        camera.goto(Vec2::new(12.0, 34.0));
        camera.rotation_degrees = 30.0;
        camera.set_zoom_clamped(1.5);
        let screen = Vec2::new(100.0, 420.0);
        assert_close(camera.world_to_screen(camera.screen_to_world(screen)), screen);
    }
}
