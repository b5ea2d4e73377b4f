use crate::camera::{Camera, PointerState};
use crate::error::BackgroundError;
use crate::render::{FieldSpin, Render};
use crate::{CameraParams, FieldParams, MotionParams};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use winit::{
  dpi::PhysicalSize,
  event::{ElementState, Event, KeyEvent, StartCause, WindowEvent},
  event_loop::{EventLoop, EventLoopWindowTarget},
  keyboard::{KeyCode, PhysicalKey},
  window::Window,
};

struct EventLoopWrapper {
  event_loop: EventLoop<()>,
  window: Arc<Window>,
}

impl EventLoopWrapper {
  /// The window is the mount point; failing to create it is the one fatal
  /// condition, reported before any GPU or field setup happens.
  fn new(title: &str) -> Result<Self, BackgroundError> {
    let event_loop = EventLoop::new()?;
    let builder = winit::window::WindowBuilder::new()
      .with_title(title)
      .with_transparent(true);
    let window = Arc::new(builder.build(&event_loop)?);

    Ok(Self { event_loop, window })
  }
}

struct SurfaceWrapper {
  surface: Option<wgpu::Surface<'static>>,
  config: Option<wgpu::SurfaceConfiguration>,
}

impl SurfaceWrapper {
  fn new() -> Self {
    Self {
      surface: None,
      config: None,
    }
  }

  fn attach(&mut self, context: &State, window: Arc<Window>) -> Result<(), BackgroundError> {
    let window_size = window.inner_size();
    let width = window_size.width.max(1);
    let height = window_size.height.max(1);
    let surface = context.instance.create_surface(window)?;
    let mut config = surface
      .get_default_config(&context.adapter, width, height)
      .ok_or(BackgroundError::NoAdapter)?;
    let view_format = config.format.add_srgb_suffix();
    config.view_formats.push(view_format);
    surface.configure(&context.device, &config);
    self.surface = Some(surface);
    self.config = Some(config);
    Ok(())
  }

  /// Synchronous resize reaction; reconfiguring with unchanged dimensions is
  /// harmless.
  fn resize(&mut self, context: &State, size: PhysicalSize<u32>) {
    let config = self.config.as_mut().unwrap();
    config.width = size.width.max(1);
    config.height = size.height.max(1);
    let surface = self.surface.as_ref().unwrap();
    surface.configure(&context.device, config);
  }

  fn acquire(&mut self, context: &State) -> wgpu::SurfaceTexture {
    let surface = self.surface.as_ref().unwrap();

    match surface.get_current_texture() {
      Ok(frame) => frame,
      Err(wgpu::SurfaceError::Timeout) => surface.get_current_texture().unwrap(),
      Err(
        wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost | wgpu::SurfaceError::OutOfMemory,
      ) => {
        surface.configure(&context.device, self.config());
        surface.get_current_texture().unwrap()
      }
    }
  }

  fn config(&self) -> &wgpu::SurfaceConfiguration {
    self.config.as_ref().unwrap()
  }
}

struct State {
  instance: wgpu::Instance,
  adapter: wgpu::Adapter,
  device: wgpu::Device,
  queue: wgpu::Queue,
  camera: Camera,
  pointer: PointerState,
  motion: MotionParams,
}

impl State {
  /// Records pointer movement; everything else falls through to the event
  /// loop. Cursor updates only write scalar state and cannot fail.
  fn input(&mut self, event: &WindowEvent, surface_size: (u32, u32)) -> bool {
    match event {
      WindowEvent::CursorMoved { position, .. } => {
        let (width, height) = surface_size;
        self.pointer.set_from_pixels(position.x, position.y, width, height);
        true
      }
      _ => false,
    }
  }

  /// The non-draw half of the per-frame update: ease the camera toward the
  /// pointer-derived offset. The look-at target never leaves the origin.
  fn update(&mut self) {
    self.camera.follow_pointer(self.pointer, &self.motion);
  }

  async fn init(size: &PhysicalSize<u32>) -> Result<Self, BackgroundError> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
      #[cfg(not(target_arch = "wasm32"))]
      backends: wgpu::Backends::PRIMARY,
      ..Default::default()
    });

    let adapter = instance
      .request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::default(),
        compatible_surface: None,
        force_fallback_adapter: false,
      })
      .await
      .ok_or(BackgroundError::NoAdapter)?;
    log::info!("using adapter: {}", adapter.get_info().name);

    let (device, queue) = adapter
      .request_device(
        &wgpu::DeviceDescriptor {
          label: None,
          required_features: wgpu::Features::empty(),
          required_limits: wgpu::Limits::default(),
          memory_hints: Default::default(),
        },
        None,
      )
      .await?;

    let camera = Camera::init(&CameraParams::default(), size.width, size.height);

    Ok(Self {
      instance,
      adapter,
      device,
      queue,
      camera,
      pointer: PointerState::default(),
      motion: MotionParams::default(),
    })
  }
}

async fn start() -> Result<(), BackgroundError> {
  let window_loop = EventLoopWrapper::new("Particle Field")?;
  let mut surface = SurfaceWrapper::new();
  let mut context = State::init(&window_loop.window.inner_size()).await?;
  surface.attach(&context, window_loop.window.clone())?;
  let mut scene = Render::init(
    surface.config(),
    &context.device,
    &FieldParams::default(),
    &context.motion,
    &context.camera,
  );
  let event_loop_function = EventLoop::run;

  (event_loop_function)(
    window_loop.event_loop,
    move |event, target: &EventLoopWindowTarget<()>| match event {
      Event::NewEvents(StartCause::Init) => {
        window_loop.window.request_redraw();
      }
      Event::WindowEvent { event, window_id } if window_id == window_loop.window.id() => {
        let surface_size = {
          let config = surface.config();
          (config.width, config.height)
        };
        if !context.input(&event, surface_size) {
          match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
              event:
                KeyEvent {
                  state: ElementState::Pressed,
                  physical_key: PhysicalKey::Code(KeyCode::Escape),
                  ..
                },
              ..
            } => target.exit(),
            WindowEvent::Resized(size) => {
              surface.resize(&context, size);
              context.camera.set_aspect(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
              // Continuous animation: each frame queues the next. There is
              // no pause or terminal state short of closing the window.
              window_loop.window.request_redraw();
              context.update();
              let frame = surface.acquire(&context);
              let view = frame.texture.create_view(&wgpu::TextureViewDescriptor {
                format: Some(surface.config().view_formats[0]),
                ..wgpu::TextureViewDescriptor::default()
              });
              scene.render(
                &view,
                &context.device,
                &context.queue,
                &context.camera,
                surface.config(),
              );
              frame.present();
            }
            _ => {}
          }
        }
      }
      _ => {}
    },
  )?;
  Ok(())
}

/// Opens a window and runs the particle background until the window closes.
pub fn run() -> Result<(), BackgroundError> {
  pollster::block_on(start())
}

/// Drives the per-frame state update without a window or GPU, at a fixed
/// 60 Hz cadence with the pointer parked at center. Stops after `frames`
/// frames when given, otherwise on Ctrl-C.
pub fn run_headless(frames: Option<u64>) {
  let motion = MotionParams::default();
  let mut camera = Camera::init(&CameraParams::default(), 1920, 1080);
  let mut spin = FieldSpin::new(&motion);
  let pointer = PointerState::default();

  let running = Arc::new(AtomicBool::new(true));
  {
    let running = running.clone();
    if let Err(e) = ctrlc::set_handler(move || running.store(false, Ordering::SeqCst)) {
      log::warn!("could not install Ctrl-C handler: {e}");
    }
  }

  let mut frame: u64 = 0;
  while running.load(Ordering::SeqCst) && frames.map_or(true, |limit| frame < limit) {
    spin.advance();
    camera.follow_pointer(pointer, &motion);
    frame += 1;
    if frame % 60 == 0 {
      log::info!(
        "frame {frame}: spin=({:.4}, {:.4}) eye=({:.2}, {:.2}, {:.2})",
        spin.x,
        spin.y,
        camera.eye.x,
        camera.eye.y,
        camera.eye.z
      );
    }
    std::thread::sleep(Duration::from_millis(16));
  }
  log::info!("headless run stopped after {frame} frames");
}
