//! Structural materials
//!
//! A material gives every point built from it its mass, buoyancy and thermal
//! properties, and every spring between such points its stiffness and
//! strength.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralMaterial {
    pub name: String,
    /// Kg per point (one cubic meter)
    pub mass: f32,
    /// Multiplier on the base spring stiffness
    pub stiffness: f32,
    /// Relative elongation a spring tolerates before breaking
    pub strength: f32,
    /// Fraction of the point volume displacing water
    pub buoyancy_volume_fill: f32,
    /// J/(kg*K)
    pub specific_heat: f32,
    /// W/(m*K)
    pub thermal_conductivity: f32,
    /// Watertight; hull points only let water in once damaged
    pub is_hull: bool,
    pub is_rope: bool,
}

impl StructuralMaterial {
    pub fn steel() -> Self {
        Self {
            name: "Steel".into(),
            mass: 7_800.0,
            stiffness: 1.0,
            strength: 0.09,
            buoyancy_volume_fill: 1.0,
            specific_heat: 500.0,
            thermal_conductivity: 50.0,
            is_hull: true,
            is_rope: false,
        }
    }

    /// Light hull material; floats when dry
    pub fn wood() -> Self {
        Self {
            name: "Wood".into(),
            mass: 600.0,
            stiffness: 0.8,
            strength: 0.05,
            buoyancy_volume_fill: 1.0,
            specific_heat: 1_700.0,
            thermal_conductivity: 0.15,
            is_hull: true,
            is_rope: false,
        }
    }

    /// Non-hull interior material
    pub fn glass() -> Self {
        Self {
            name: "Glass".into(),
            mass: 2_500.0,
            stiffness: 1.0,
            strength: 0.01,
            buoyancy_volume_fill: 1.0,
            specific_heat: 840.0,
            thermal_conductivity: 0.8,
            is_hull: false,
            is_rope: false,
        }
    }

    pub fn rope() -> Self {
        Self {
            name: "Rope".into(),
            mass: 200.0,
            stiffness: 0.5,
            strength: 0.5,
            buoyancy_volume_fill: 0.2,
            specific_heat: 1_500.0,
            thermal_conductivity: 0.1,
            is_hull: false,
            is_rope: true,
        }
    }

    /// Joules needed to raise one point of this material by one Kelvin
    pub fn heat_capacity(&self) -> f32 {
        self.mass * self.specific_heat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::GameParameters;

    #[test]
    fn test_wood_floats_and_steel_sinks() {
        let floats = |m: &StructuralMaterial| {
            m.buoyancy_volume_fill * GameParameters::WATER_MASS > m.mass
        };
        assert!(floats(&StructuralMaterial::wood()));
        assert!(!floats(&StructuralMaterial::steel()));
    }

    #[test]
    fn test_material_json() {
        let json = serde_json::to_string(&StructuralMaterial::rope()).unwrap();
        let back: StructuralMaterial = serde_json::from_str(&json).unwrap();
        assert!(back.is_rope);
    }
}
