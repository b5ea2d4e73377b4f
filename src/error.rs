use std::fmt;

/// Fatal initialization failures. The background is optional decoration, so
/// callers report these and move on; nothing here is retryable.
#[derive(Debug)]
pub enum BackgroundError {
  /// The event loop could not be created.
  EventLoop(winit::error::EventLoopError),
  /// The window, the render surface's mount point, could not be created.
  Window(winit::error::OsError),
  /// Failed to create a surface on the window.
  Surface(wgpu::CreateSurfaceError),
  /// No compatible GPU adapter found.
  NoAdapter,
  /// Failed to open the GPU device.
  Device(wgpu::RequestDeviceError),
}

impl fmt::Display for BackgroundError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BackgroundError::EventLoop(e) => write!(f, "failed to create event loop: {e}"),
      BackgroundError::Window(e) => write!(f, "failed to create window: {e}"),
      BackgroundError::Surface(e) => write!(f, "failed to create render surface: {e}"),
      BackgroundError::NoAdapter => write!(f, "no compatible GPU adapter found"),
      BackgroundError::Device(e) => write!(f, "failed to open GPU device: {e}"),
    }
  }
}

impl std::error::Error for BackgroundError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      BackgroundError::EventLoop(e) => Some(e),
      BackgroundError::Window(e) => Some(e),
      BackgroundError::Surface(e) => Some(e),
      BackgroundError::Device(e) => Some(e),
      BackgroundError::NoAdapter => None,
    }
  }
}

impl From<winit::error::EventLoopError> for BackgroundError {
  fn from(e: winit::error::EventLoopError) -> Self {
    BackgroundError::EventLoop(e)
  }
}

impl From<winit::error::OsError> for BackgroundError {
  fn from(e: winit::error::OsError) -> Self {
    BackgroundError::Window(e)
  }
}

impl From<wgpu::CreateSurfaceError> for BackgroundError {
  fn from(e: wgpu::CreateSurfaceError) -> Self {
    BackgroundError::Surface(e)
  }
}

impl From<wgpu::RequestDeviceError> for BackgroundError {
  fn from(e: wgpu::RequestDeviceError) -> Self {
    BackgroundError::Device(e)
  }
}
