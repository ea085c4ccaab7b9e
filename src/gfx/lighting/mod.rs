//! # Light Types
//!
//! Plain data records for the forward lighting model: one directional sun,
//! positioned point lights with distance attenuation, and a spot light
//! built on top of a point light. Scenes mutate these per frame; the
//! render step converts them into the GPU blocks defined in
//! `gfx::rendering::uniforms` and uploads them read-only.

use cgmath::{Deg, Rad, Vector3};

use crate::gfx::rendering::uniforms::{
    GpuAttenuation, GpuBaseLight, GpuDirectionalLight, GpuPointLight, GpuSpotLight,
};

/// Attributes shared by every light kind.
#[derive(Debug, Clone, Copy)]
pub struct BaseLight {
    pub color: Vector3<f32>,
    pub intensity: f32,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
}

impl Default for BaseLight {
    fn default() -> Self {
        Self {
            color: Vector3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            ambient: 0.1,
            diffuse: 0.7,
            specular: 0.9,
        }
    }
}

/// Distance falloff: `1 / (constant + linear*d + exponent*d^2)`.
#[derive(Debug, Clone, Copy)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub exponent: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.09,
            exponent: 0.032,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    pub base: BaseLight,
    pub direction: Vector3<f32>,
}

impl DirectionalLight {
    pub fn new(color: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            base: BaseLight {
                color,
                intensity: 1.0,
                ambient: 0.05,
                diffuse: 0.4,
                specular: 0.5,
            },
            direction,
        }
    }

    pub(crate) fn to_gpu(self) -> GpuDirectionalLight {
        GpuDirectionalLight {
            base: base_to_gpu(self.base),
            direction: self.direction.into(),
            _padding: 0.0,
        }
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(Vector3::new(1.0, 1.0, 1.0), Vector3::new(-0.2, -1.0, -0.3))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub base: BaseLight,
    pub attenuation: Attenuation,
    pub position: Vector3<f32>,
}

impl PointLight {
    pub fn new(color: Vector3<f32>, position: Vector3<f32>, intensity: f32) -> Self {
        Self {
            base: BaseLight {
                color,
                intensity,
                ..BaseLight::default()
            },
            attenuation: Attenuation::default(),
            position,
        }
    }

    pub(crate) fn to_gpu(self) -> GpuPointLight {
        GpuPointLight {
            base: base_to_gpu(self.base),
            attenuation: GpuAttenuation {
                constant: self.attenuation.constant,
                linear: self.attenuation.linear,
                exponent: self.attenuation.exponent,
                _padding: 0.0,
            },
            position: self.position.into(),
            _padding: 0.0,
        }
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self::new(Vector3::new(1.0, 1.0, 1.0), Vector3::new(0.0, 0.0, 0.0), 1.0)
    }
}

/// Cone-shaped light. Cutoff angles are stored as cosines so the fragment
/// stage compares them against a dot product directly.
#[derive(Debug, Clone, Copy)]
pub struct SpotLight {
    pub point: PointLight,
    pub direction: Vector3<f32>,
    pub cut_off: f32,
    pub outer_cut_off: f32,
}

impl SpotLight {
    /// Builds a spot light from cone angles in degrees.
    pub fn new(
        color: Vector3<f32>,
        position: Vector3<f32>,
        direction: Vector3<f32>,
        cutoff_degrees: f32,
        outer_cutoff_degrees: f32,
    ) -> Self {
        let mut point = PointLight::new(color, position, 1.0);
        point.base.diffuse = 1.0;
        point.base.specular = 1.0;
        point.attenuation.exponent = 0.32;
        Self {
            point,
            direction,
            cut_off: Rad::from(Deg(cutoff_degrees)).0.cos(),
            outer_cut_off: Rad::from(Deg(outer_cutoff_degrees)).0.cos(),
        }
    }

    /// Updates both cone angles, given in degrees.
    pub fn set_cutoff(&mut self, cutoff_degrees: f32, outer_cutoff_degrees: f32) {
        self.cut_off = Rad::from(Deg(cutoff_degrees)).0.cos();
        self.outer_cut_off = Rad::from(Deg(outer_cutoff_degrees)).0.cos();
    }

    pub(crate) fn to_gpu(self) -> GpuSpotLight {
        GpuSpotLight {
            point: self.point.to_gpu(),
            direction: self.direction.into(),
            cut_off: self.cut_off,
            outer_cut_off: self.outer_cut_off,
            _padding: [0.0; 3],
        }
    }
}

impl Default for SpotLight {
    fn default() -> Self {
        Self::new(
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(-2.0, 0.0, 0.0),
            12.5,
            17.5,
        )
    }
}

fn base_to_gpu(base: BaseLight) -> GpuBaseLight {
    GpuBaseLight {
        color: base.color.into(),
        intensity: base.intensity,
        ambient: base.ambient,
        diffuse: base.diffuse,
        specular: base.specular,
        _padding: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spot_cutoffs_are_cosines() {
        let spot = SpotLight::new(
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            0.0,
            90.0,
        );
        assert!((spot.cut_off - 1.0).abs() < 1e-6);
        assert!(spot.outer_cut_off.abs() < 1e-6);
    }

    #[test]
    fn test_point_light_defaults() {
        let light = PointLight::new(Vector3::new(0.2, 0.7, 0.9), Vector3::new(1.0, 2.0, 3.0), 10.0);
        assert_eq!(light.base.intensity, 10.0);
        assert!((light.attenuation.constant - 1.0).abs() < f32::EPSILON);
        let gpu = light.to_gpu();
        assert_eq!(gpu.position, [1.0, 2.0, 3.0]);
    }
}
