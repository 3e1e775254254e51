use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Light slots available to lit materials.
pub const MAX_LIGHTS: usize = 4;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

/// Packs lights into the `light_positions` / `light_colors` uniform arrays.
/// Unused slots get a zero color, so they contribute nothing.
pub fn light_uniforms(lights: &[PointLight]) -> (Vec<[f32; 4]>, Vec<[f32; 4]>) {
    let mut positions = vec![[0.0; 4]; MAX_LIGHTS];
    let mut colors = vec![[0.0; 4]; MAX_LIGHTS];
    for (i, l) in lights.iter().take(MAX_LIGHTS).enumerate() {
        positions[i] = l.position.extend(1.0).to_array();
        colors[i] = l.color.extend(l.intensity).to_array();
    }
    (positions, colors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_lights_are_dropped_and_slots_padded() {
        let lights = vec![
            PointLight {
                position: Vec3::new(1.0, 2.0, 3.0),
                color: Vec3::new(1.0, 0.5, 0.0),
                intensity: 2.0,
            };
            6
        ];
        let (p, c) = light_uniforms(&lights);
        assert_eq!(p.len(), MAX_LIGHTS);
        assert_eq!(p[0], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(c[3], [1.0, 0.5, 0.0, 2.0]);

        let (_, c) = light_uniforms(&lights[..1]);
        assert_eq!(c[1], [0.0; 4]);
    }
}
