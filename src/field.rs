use crate::FieldParams;
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// The three colors points are drawn in: indigo, purple, pink.
pub const PALETTE: [u32; 3] = [0x6366f1, 0x8b5cf6, 0xec4899];

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Particle {
  pub pos: [f32; 3],
  pub color: [f32; 3],
}

#[must_use]
pub fn hex_rgb(hex: u32) -> [f32; 3] {
  [
    ((hex >> 16) & 0xff) as f32 / 255.0,
    ((hex >> 8) & 0xff) as f32 / 255.0,
    (hex & 0xff) as f32 / 255.0,
  ]
}

/// Generates the particle field: positions uniform in a cube of half-extent
/// `spread`, colors picked from [`PALETTE`] with equal probability. The field
/// is generated once and never mutated afterwards; only the aggregate
/// rotation applied at draw time changes.
#[must_use]
pub fn create_field(params: &FieldParams) -> Vec<Particle> {
  let mut rng = SmallRng::from_entropy();
  scatter(&mut rng, params)
}

fn scatter(rng: &mut SmallRng, params: &FieldParams) -> Vec<Particle> {
  let colors = PALETTE.map(hex_rgb);
  let mut particles = Vec::with_capacity(params.particle_count as usize);
  for _ in 0..params.particle_count {
    let pos = [
      (rng.gen::<f32>() - 0.5) * 2.0 * params.spread,
      (rng.gen::<f32>() - 0.5) * 2.0 * params.spread,
      (rng.gen::<f32>() - 0.5) * 2.0 * params.spread,
    ];
    let roll = rng.gen::<f32>();
    let color = if roll < 1.0 / 3.0 {
      colors[0]
    } else if roll < 2.0 / 3.0 {
      colors[1]
    } else {
      colors[2]
    };
    particles.push(Particle { pos, color });
  }
  particles
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::SeedableRng;

  #[test]
  fn test_positions_within_spread() {
    let params = FieldParams::default();
    let mut rng = SmallRng::seed_from_u64(7);
    let particles = scatter(&mut rng, &params);
    assert_eq!(particles.len(), 2000);
    for p in &particles {
      for c in p.pos {
        assert!(c >= -params.spread && c <= params.spread, "coordinate {c} out of range");
      }
    }
  }

  #[test]
  fn test_colors_come_from_palette() {
    let palette = PALETTE.map(hex_rgb);
    let mut rng = SmallRng::seed_from_u64(7);
    let particles = scatter(&mut rng, &FieldParams::default());
    for p in &particles {
      assert!(palette.contains(&p.color), "color {:?} not in palette", p.color);
    }
  }

  #[test]
  fn test_color_selection_is_uniform() {
    let params = FieldParams {
      particle_count: 100_000,
      ..FieldParams::default()
    };
    let palette = PALETTE.map(hex_rgb);
    let mut rng = SmallRng::seed_from_u64(11);
    let particles = scatter(&mut rng, &params);
    for target in palette {
      let count = particles.iter().filter(|p| p.color == target).count();
      let fraction = count as f32 / params.particle_count as f32;
      assert!(
        (fraction - 1.0 / 3.0).abs() < 0.02,
        "palette fraction {fraction} too far from 1/3"
      );
    }
  }

  #[test]
  fn test_hex_rgb_channels() {
    assert_eq!(hex_rgb(0xff0000), [1.0, 0.0, 0.0]);
    let [r, g, b] = hex_rgb(PALETTE[0]);
    assert!((r - 99.0 / 255.0).abs() < f32::EPSILON);
    assert!((g - 102.0 / 255.0).abs() < f32::EPSILON);
    assert!((b - 241.0 / 255.0).abs() < f32::EPSILON);
  }
}
