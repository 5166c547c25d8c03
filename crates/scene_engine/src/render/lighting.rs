//! Lighting environment
//!
//! Lights are tagged descriptors iterated by kind rather than a fixed array
//! indexed by magic positions. Packing into the pass constants preserves the
//! shader's expected ordering: directional lights first, then point, then
//! spot, capped at the shader's light budget.

use crate::foundation::math::{Vec3, Vec4};
use crate::render::constants::{LightConstants, MAX_LIGHTS};

/// A light source descriptor
#[derive(Debug, Clone, Copy)]
pub enum Light {
    /// Parallel light (like sunlight)
    Directional {
        /// Direction the light travels
        direction: Vec3,
        /// Light color/intensity
        strength: Vec3,
    },
    /// Omnidirectional light with distance falloff
    Point {
        /// World-space position
        position: Vec3,
        /// Light color/intensity
        strength: Vec3,
        /// Distance where falloff begins
        falloff_start: f32,
        /// Distance where the light reaches zero
        falloff_end: f32,
    },
    /// Cone light
    Spot {
        /// World-space position
        position: Vec3,
        /// Cone axis
        direction: Vec3,
        /// Light color/intensity
        strength: Vec3,
        /// Distance where falloff begins
        falloff_start: f32,
        /// Distance where the light reaches zero
        falloff_end: f32,
        /// Cone exponent; higher is tighter
        spot_power: f32,
    },
}

impl Light {
    fn packed(&self) -> LightConstants {
        match *self {
            Light::Directional { direction, strength } => LightConstants {
                strength: strength.into(),
                direction: direction.normalize().into(),
                ..LightConstants::default()
            },
            Light::Point {
                position,
                strength,
                falloff_start,
                falloff_end,
            } => LightConstants {
                strength: strength.into(),
                position: position.into(),
                falloff_start,
                falloff_end,
                ..LightConstants::default()
            },
            Light::Spot {
                position,
                direction,
                strength,
                falloff_start,
                falloff_end,
                spot_power,
            } => LightConstants {
                strength: strength.into(),
                position: position.into(),
                direction: direction.normalize().into(),
                falloff_start,
                falloff_end,
                spot_power,
            },
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Light::Directional { .. } => 0,
            Light::Point { .. } => 1,
            Light::Spot { .. } => 2,
        }
    }
}

/// The scene's light list plus its ambient term
#[derive(Debug, Clone)]
pub struct LightingEnvironment {
    /// Lights in the scene, any kind in any order
    pub lights: Vec<Light>,
    /// Ambient light RGBA
    pub ambient: Vec4,
}

impl Default for LightingEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl LightingEnvironment {
    /// Create an empty environment with a dim ambient term
    pub fn new() -> Self {
        Self {
            lights: Vec::new(),
            ambient: Vec4::new(0.25, 0.25, 0.35, 1.0),
        }
    }

    /// Add a light
    pub fn add_light(mut self, light: Light) -> Self {
        self.lights.push(light);
        self
    }

    /// Set the ambient term
    pub fn with_ambient(mut self, ambient: Vec4) -> Self {
        self.ambient = ambient;
        self
    }

    /// Pack the light list into the fixed pass-constant array.
    ///
    /// Lights are emitted grouped by kind (directional, point, spot) in their
    /// relative insertion order. Lights beyond the shader budget are dropped
    /// with a warning rather than silently corrupting later slots.
    pub fn packed_lights(&self) -> [LightConstants; MAX_LIGHTS] {
        let mut packed = [LightConstants::default(); MAX_LIGHTS];

        let mut slot = 0;
        let mut dropped = 0;
        for rank in 0..=2 {
            for light in self.lights.iter().filter(|l| l.kind_rank() == rank) {
                if slot == MAX_LIGHTS {
                    dropped += 1;
                    continue;
                }
                packed[slot] = light.packed();
                slot += 1;
            }
        }
        if dropped > 0 {
            log::warn!("light list exceeds {MAX_LIGHTS} shader slots; dropped {dropped}");
        }

        packed
    }
}
