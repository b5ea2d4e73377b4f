use crate::camera::Camera;
use crate::field::{create_field, Particle};
use crate::{FieldParams, MotionParams};
use cgmath::{Rad, SquareMatrix};
use std::borrow::Cow;
use wgpu::util::DeviceExt;

/// Accumulated rotation of the whole field, advanced by a fixed angle per
/// frame. Deliberately not delta-time normalized; the per-tick increments are
/// part of the observable behavior.
pub struct FieldSpin {
  pub x: f32,
  pub y: f32,
  rate_x: f32,
  rate_y: f32,
}

impl FieldSpin {
  #[must_use]
  pub fn new(motion: &MotionParams) -> Self {
    Self {
      x: 0.0,
      y: 0.0,
      rate_x: motion.spin_x,
      rate_y: motion.spin_y,
    }
  }

  pub fn advance(&mut self) {
    self.x += self.rate_x;
    self.y += self.rate_y;
  }

  #[must_use]
  pub fn matrix(&self) -> cgmath::Matrix4<f32> {
    cgmath::Matrix4::from_angle_x(Rad(self.x)) * cgmath::Matrix4::from_angle_y(Rad(self.y))
  }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
  view: [[f32; 4]; 4],
  proj: [[f32; 4]; 4],
  model: [[f32; 4]; 4],
  point_size: f32,
  opacity: f32,
  _pad: [f32; 2],
}

impl Uniforms {
  fn new(field: &FieldParams) -> Self {
    Self {
      view: cgmath::Matrix4::identity().into(),
      proj: cgmath::Matrix4::identity().into(),
      model: cgmath::Matrix4::identity().into(),
      point_size: field.point_size,
      opacity: field.opacity,
      _pad: [0.0; 2],
    }
  }

  fn update(&mut self, camera: &Camera, spin: &FieldSpin) {
    self.view = camera.view_matrix().into();
    self.proj = camera.proj_matrix().into();
    self.model = spin.matrix().into();
  }
}

// Two triangles per point sprite, corners at +-0.5 so the shader scales them
// by point_size directly.
#[rustfmt::skip]
const QUAD_VERTICES: [f32; 12] = [
  -0.5, -0.5,
   0.5, -0.5,
   0.5,  0.5,
  -0.5, -0.5,
   0.5,  0.5,
  -0.5,  0.5,
];

const MSAA_SAMPLES: u32 = 4;

fn create_msaa_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
  device
    .create_texture(&wgpu::TextureDescriptor {
      label: Some("MSAA Texture"),
      size: wgpu::Extent3d {
        width: config.width,
        height: config.height,
        depth_or_array_layers: 1,
      },
      mip_level_count: 1,
      sample_count: MSAA_SAMPLES,
      dimension: wgpu::TextureDimension::D2,
      format: config.view_formats[0],
      usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
      view_formats: &[],
    })
    .create_view(&wgpu::TextureViewDescriptor::default())
}

pub struct Render {
  render_pipeline: wgpu::RenderPipeline,
  particle_buffer: wgpu::Buffer,
  quad_buffer: wgpu::Buffer,
  uniform_buffer: wgpu::Buffer,
  uniform_bind_group: wgpu::BindGroup,
  uniforms: Uniforms,
  spin: FieldSpin,
  num_particles: u32,
  msaa_view: wgpu::TextureView,
  msaa_size: (u32, u32),
}

impl Render {
  #[must_use]
  pub fn init(
    config: &wgpu::SurfaceConfiguration,
    device: &wgpu::Device,
    field: &FieldParams,
    motion: &MotionParams,
    camera: &Camera,
  ) -> Self {
    let draw_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
      label: None,
      source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/draw.wgsl"))),
    });

    let spin = FieldSpin::new(motion);
    let mut uniforms = Uniforms::new(field);
    uniforms.update(camera, &spin);
    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("Uniform Buffer"),
      contents: bytemuck::cast_slice(&[uniforms]),
      usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let uniform_bind_group_layout =
      device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
          binding: 0,
          visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
          ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
          },
          count: None,
        }],
        label: Some("uniform_bind_group_layout"),
      });
    let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
      layout: &uniform_bind_group_layout,
      entries: &[wgpu::BindGroupEntry {
        binding: 0,
        resource: uniform_buffer.as_entire_binding(),
      }],
      label: Some("uniform_bind_group"),
    });

    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
      label: Some("render"),
      bind_group_layouts: &[&uniform_bind_group_layout],
      push_constant_ranges: &[],
    });
    let particle_layout = wgpu::VertexBufferLayout {
      array_stride: std::mem::size_of::<Particle>() as u64, // pos3 + color3
      step_mode: wgpu::VertexStepMode::Instance,
      attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
    };
    let quad_layout = wgpu::VertexBufferLayout {
      array_stride: 2 * 4,
      step_mode: wgpu::VertexStepMode::Vertex,
      attributes: &wgpu::vertex_attr_array![2 => Float32x2],
    };
    // Additive blending onto a transparent clear, so overlapping points
    // brighten rather than occlude.
    let additive = wgpu::BlendState {
      color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
      },
      alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
      },
    };
    let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
      label: Some("Render Pipeline"),
      layout: Some(&render_pipeline_layout),
      vertex: wgpu::VertexState {
        module: &draw_shader,
        entry_point: "main_vs",
        compilation_options: wgpu::PipelineCompilationOptions::default(),
        buffers: &[particle_layout, quad_layout],
      },
      fragment: Some(wgpu::FragmentState {
        module: &draw_shader,
        entry_point: "main_fs",
        compilation_options: wgpu::PipelineCompilationOptions::default(),
        targets: &[Some(wgpu::ColorTargetState {
          format: config.view_formats[0],
          blend: Some(additive),
          write_mask: wgpu::ColorWrites::ALL,
        })],
      }),
      primitive: wgpu::PrimitiveState::default(),
      depth_stencil: None,
      multisample: wgpu::MultisampleState {
        count: MSAA_SAMPLES,
        ..wgpu::MultisampleState::default()
      },
      multiview: None,
      cache: None,
    });

    let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("Quad Buffer"),
      contents: bytemuck::bytes_of(&QUAD_VERTICES),
      usage: wgpu::BufferUsages::VERTEX,
    });

    let particles = create_field(field);
    log::info!("generated particle field with {} points", particles.len());
    let particle_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("Particle Buffer"),
      contents: bytemuck::cast_slice(&particles),
      usage: wgpu::BufferUsages::VERTEX,
    });

    let msaa_view = create_msaa_view(device, config);

    Render {
      render_pipeline,
      particle_buffer,
      quad_buffer,
      uniform_buffer,
      uniform_bind_group,
      uniforms,
      spin,
      num_particles: field.particle_count,
      msaa_view,
      msaa_size: (config.width, config.height),
    }
  }

  /// One animation frame: advance the field rotation, refresh the uniforms
  /// from the (already eased) camera, and draw the point cloud.
  pub fn render(
    &mut self,
    view: &wgpu::TextureView,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    camera: &Camera,
    config: &wgpu::SurfaceConfiguration,
  ) {
    self.spin.advance();
    self.uniforms.update(camera, &self.spin);
    queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[self.uniforms]));

    if self.msaa_size != (config.width, config.height) {
      self.msaa_view = create_msaa_view(device, config);
      self.msaa_size = (config.width, config.height);
    }

    // Draw multisampled, resolve into the acquired frame.
    let color_attachments = [Some(wgpu::RenderPassColorAttachment {
      view: &self.msaa_view,
      resolve_target: Some(view),
      ops: wgpu::Operations {
        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
        store: wgpu::StoreOp::Store,
      },
    })];
    let render_pass_descriptor = wgpu::RenderPassDescriptor {
      label: None,
      color_attachments: &color_attachments,
      depth_stencil_attachment: None,
      timestamp_writes: None,
      occlusion_query_set: None,
    };
    let mut command_encoder =
      device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    {
      let mut rpass = command_encoder.begin_render_pass(&render_pass_descriptor);
      rpass.set_pipeline(&self.render_pipeline);
      rpass.set_bind_group(0, &self.uniform_bind_group, &[]);
      rpass.set_vertex_buffer(0, self.particle_buffer.slice(..));
      rpass.set_vertex_buffer(1, self.quad_buffer.slice(..));
      rpass.draw(0..6, 0..self.num_particles);
    }
    queue.submit(Some(command_encoder.finish()));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_spin_accumulates_fixed_increments() {
    let motion = MotionParams::default();
    let mut spin = FieldSpin::new(&motion);
    for _ in 0..1000 {
      spin.advance();
    }
    assert!((spin.x - 0.0005 * 1000.0).abs() < 1e-4);
    assert!((spin.y - 0.001 * 1000.0).abs() < 1e-4);
  }

  #[test]
  fn test_spin_starts_at_zero() {
    let spin = FieldSpin::new(&MotionParams::default());
    assert_eq!((spin.x, spin.y), (0.0, 0.0));
    assert_eq!(spin.matrix(), cgmath::Matrix4::identity());
  }
}
