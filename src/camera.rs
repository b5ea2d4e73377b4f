use crate::{CameraParams, MotionParams};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Last-known pointer position, normalized to [-1, 1] with the origin at the
/// viewport center and +y pointing up. Stays at (0, 0) until the first
/// cursor event arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
  pub x: f32,
  pub y: f32,
}

impl PointerState {
  /// Converts a cursor position in surface pixels (origin top-left, +y down)
  /// into normalized coordinates. Single writer: the event loop.
  pub fn set_from_pixels(&mut self, px: f64, py: f64, width: u32, height: u32) {
    if width == 0 || height == 0 {
      return;
    }
    self.x = (px as f32 / width as f32) * 2.0 - 1.0;
    self.y = 1.0 - (py as f32 / height as f32) * 2.0;
  }
}

pub struct Camera {
  pub eye: cgmath::Point3<f32>,
  pub target: cgmath::Point3<f32>,
  pub up: cgmath::Vector3<f32>,
  pub aspect: f32,
  pub fovy: f32,
  pub znear: f32,
  pub zfar: f32,
}

impl Camera {
  #[must_use]
  pub fn init(params: &CameraParams, width: u32, height: u32) -> Self {
    Self {
      // back along +z, looking at the origin
      eye: (0.0, 0.0, params.depth).into(),
      target: (0.0, 0.0, 0.0).into(),
      up: cgmath::Vector3::unit_y(),
      aspect: width.max(1) as f32 / height.max(1) as f32,
      fovy: params.fovy,
      znear: params.znear,
      zfar: params.zfar,
    }
  }

  /// Resize reaction. Idempotent for repeated identical dimensions.
  pub fn set_aspect(&mut self, width: u32, height: u32) {
    self.aspect = width.max(1) as f32 / height.max(1) as f32;
  }

  /// Eases the eye toward the pointer-derived offset, closing `damping` of
  /// the remaining distance each frame. The eye is never assigned the target
  /// directly, and the look-at target stays pinned to the origin.
  pub fn follow_pointer(&mut self, pointer: PointerState, motion: &MotionParams) {
    self.eye.x += (pointer.x * motion.parallax - self.eye.x) * motion.damping;
    self.eye.y += (pointer.y * motion.parallax - self.eye.y) * motion.damping;
  }

  #[must_use]
  pub fn view_matrix(&self) -> cgmath::Matrix4<f32> {
    cgmath::Matrix4::look_at_rh(self.eye, self.target, self.up)
  }

  #[must_use]
  pub fn proj_matrix(&self) -> cgmath::Matrix4<f32> {
    let proj = cgmath::perspective(cgmath::Deg(self.fovy), self.aspect, self.znear, self.zfar);
    OPENGL_TO_WGPU_MATRIX * proj
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn camera() -> Camera {
    Camera::init(&CameraParams::default(), 1920, 1080)
  }

  #[test]
  fn test_pointer_defaults_to_center() {
    let pointer = PointerState::default();
    assert_eq!(pointer, PointerState { x: 0.0, y: 0.0 });
  }

  #[test]
  fn test_pointer_normalization() {
    let mut pointer = PointerState::default();
    pointer.set_from_pixels(400.0, 300.0, 800, 600);
    assert!(pointer.x.abs() < 1e-6 && pointer.y.abs() < 1e-6);

    pointer.set_from_pixels(0.0, 0.0, 800, 600);
    assert_eq!((pointer.x, pointer.y), (-1.0, 1.0));

    pointer.set_from_pixels(800.0, 600.0, 800, 600);
    assert_eq!((pointer.x, pointer.y), (1.0, -1.0));
  }

  #[test]
  fn test_pointer_ignores_degenerate_viewport() {
    let mut pointer = PointerState::default();
    pointer.set_from_pixels(10.0, 10.0, 0, 0);
    assert_eq!(pointer, PointerState::default());
  }

  #[test]
  fn test_first_follow_step_is_five_percent() {
    let mut camera = camera();
    let motion = MotionParams::default();
    camera.follow_pointer(PointerState { x: 1.0, y: 1.0 }, &motion);
    // (50 - 0) * 0.05
    assert!((camera.eye.x - 2.5).abs() < 1e-4);
    assert!((camera.eye.y - 2.5).abs() < 1e-4);
  }

  #[test]
  fn test_follow_converges_without_overshoot() {
    let mut camera = camera();
    let motion = MotionParams::default();
    let pointer = PointerState { x: 1.0, y: 1.0 };
    let target = pointer.x * motion.parallax;
    let mut remaining = target - camera.eye.x;
    for _ in 0..500 {
      camera.follow_pointer(pointer, &motion);
      let next = target - camera.eye.x;
      assert!(next >= 0.0, "camera overshot the target");
      assert!(next <= remaining, "camera moved away from the target");
      remaining = next;
    }
    assert!((camera.eye.x - 50.0).abs() < 1e-3);
    assert!((camera.eye.y - 50.0).abs() < 1e-3);
  }

  #[test]
  fn test_centered_pointer_holds_camera_still() {
    let mut camera = camera();
    let motion = MotionParams::default();
    for _ in 0..200 {
      camera.follow_pointer(PointerState::default(), &motion);
    }
    assert_eq!(camera.eye.x, 0.0);
    assert_eq!(camera.eye.y, 0.0);
    assert_eq!(camera.eye.z, CameraParams::default().depth);
  }

  #[test]
  fn test_set_aspect_is_idempotent() {
    let mut camera = camera();
    camera.set_aspect(1024, 768);
    let first = camera.aspect;
    camera.set_aspect(1024, 768);
    assert_eq!(camera.aspect, first);
  }

  #[test]
  fn test_zero_sized_viewport_is_clamped() {
    let mut camera = camera();
    camera.set_aspect(0, 0);
    assert_eq!(camera.aspect, 1.0);
  }
}
