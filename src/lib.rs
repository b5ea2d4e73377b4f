pub mod camera;
pub mod error;
pub mod field;
pub mod render;
pub mod state;

/// Shape of the generated particle field and how its points are drawn.
pub struct FieldParams {
  pub particle_count: u32,
  /// Half-extent of the cube the points are scattered in.
  pub spread: f32,
  pub point_size: f32,
  pub opacity: f32,
}

impl Default for FieldParams {
  fn default() -> Self {
    Self {
      particle_count: 2000,
      spread: 1000.0,
      point_size: 2.0,
      opacity: 0.6,
    }
  }
}

/// Per-frame motion constants. All of these are per display tick, not per
/// second; the animation is deliberately frame-rate dependent.
pub struct MotionParams {
  /// Radians added to the field rotation each frame.
  pub spin_x: f32,
  pub spin_y: f32,
  /// Scale from normalized pointer coordinates to camera offset.
  pub parallax: f32,
  /// Fraction of the remaining distance to the target offset the camera
  /// closes each frame. Must stay below 1.
  pub damping: f32,
}

impl Default for MotionParams {
  fn default() -> Self {
    Self {
      spin_x: 0.0005,
      spin_y: 0.001,
      parallax: 50.0,
      damping: 0.05,
    }
  }
}

pub struct CameraParams {
  pub fovy: f32,
  pub znear: f32,
  pub zfar: f32,
  /// Initial eye distance from the origin along +z.
  pub depth: f32,
}

impl Default for CameraParams {
  fn default() -> Self {
    Self {
      fovy: 75.0,
      znear: 0.1,
      zfar: 1000.0,
      depth: 1000.0,
    }
  }
}
