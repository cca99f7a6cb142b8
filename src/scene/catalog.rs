//! Static descriptors for the bodies in the scene.
//!
//! A [`Catalog`] is plain data: which models to load, where to put them,
//! and how fast they turn. The default is the eight-planet solar system
//! with a light-emitting sun at its center.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A point light attached to a body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLightDescriptor {
    /// Linear RGB color.
    pub color: [f32; 3],
    /// Luminous intensity.
    pub intensity: f32,
    /// Cutoff distance (0 = unbounded).
    pub distance: f32,
    /// Falloff exponent.
    pub decay: f32,
}

impl Default for PointLightDescriptor {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            intensity: 300.0,
            distance: 300.0,
            decay: 2.0,
        }
    }
}

/// One celestial body: model file, placement, and per-frame rotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDescriptor {
    /// Unique display name.
    pub name: String,
    /// Model path relative to the asset root.
    pub model: String,
    /// Uniform scale applied to the loaded model.
    pub scale: f32,
    /// Offset from the body's parent (its orbit pivot, or the origin).
    pub position: [f32; 3],
    /// Self-rotation about local Y per reference frame (radians).
    pub spin_speed: f32,
    /// Pivot rotation about world Y per reference frame (radians). Bodies
    /// without an orbit hang directly off the scene root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit_speed: Option<f32>,
    /// Whether the body would cast shadows (carried, not rendered).
    #[serde(default)]
    pub cast_shadow: bool,
    /// Light emitted from the body's center once its model has loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<PointLightDescriptor>,
}

impl BodyDescriptor {
    fn planet(
        name: &str,
        model: &str,
        scale: f32,
        position: [f32; 3],
        spin_speed: f32,
        orbit_speed: f32,
    ) -> Self {
        Self {
            name: name.to_owned(),
            model: model.to_owned(),
            scale,
            position,
            spin_speed,
            orbit_speed: Some(orbit_speed),
            cast_shadow: true,
            light: None,
        }
    }
}

/// Catalog validation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Two bodies share a name.
    DuplicateName(String),
    /// A body's scale is zero, negative, or not finite.
    InvalidScale {
        /// Offending body.
        name: String,
        /// The rejected value.
        scale: f32,
    },
    /// A body's position has a non-finite component.
    InvalidPosition(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName(name) => {
                write!(f, "body '{name}' appears more than once")
            }
            Self::InvalidScale { name, scale } => {
                write!(f, "body '{name}' has invalid scale {scale}")
            }
            Self::InvalidPosition(name) => {
                write!(f, "body '{name}' has a non-finite position")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// The full set of bodies plus the skybox image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    /// Skybox image path relative to the asset root, used for all six
    /// faces.
    pub skybox: Option<String>,
    /// Bodies in load order.
    pub bodies: Vec<BodyDescriptor>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::solar_system()
    }
}

impl Catalog {
    /// The sun and the eight planets.
    #[must_use]
    pub fn solar_system() -> Self {
        let sun = BodyDescriptor {
            name: "Sun".to_owned(),
            model: "models/sun-converted.glb".to_owned(),
            scale: 0.5,
            position: [0.0, 4.0, 0.0],
            spin_speed: 0.001,
            orbit_speed: None,
            cast_shadow: false,
            light: Some(PointLightDescriptor::default()),
        };
        let bodies = vec![
            sun,
            BodyDescriptor::planet(
                "Mercury",
                "models/mercury-converted.glb",
                0.02,
                [20.0, 4.0, 0.0],
                0.004,
                0.006,
            ),
            BodyDescriptor::planet(
                "Venus",
                "models/venus-converted.glb",
                1.5,
                [-5.0, 4.0, 35.0],
                -0.002,
                0.002,
            ),
            BodyDescriptor::planet(
                "Earth",
                "models/earth-converted.glb",
                0.025,
                [45.0, 4.0, -8.0],
                0.003,
                0.002,
            ),
            BodyDescriptor::planet(
                "Mars",
                "models/mars-converted.glb",
                0.03,
                [-55.0, 4.0, -12.0],
                0.003,
                0.002,
            ),
            BodyDescriptor::planet(
                "Jupiter",
                "models/jupiter-converted.glb",
                0.04,
                [65.0, 4.0, 12.0],
                0.008,
                0.0002,
            ),
            BodyDescriptor::planet(
                "Saturn",
                "models/saturn-converted.glb",
                2.0,
                [-9.0, 4.0, -76.0],
                0.007,
                0.0002,
            ),
            BodyDescriptor::planet(
                "Uranus",
                "models/uranus-converted.glb",
                0.00006,
                [-85.0, 4.0, -27.0],
                -0.006,
                0.0002,
            ),
            BodyDescriptor::planet(
                "Neptune",
                "models/neptune-converted.glb",
                0.03,
                [100.0, 4.0, -7.0],
                0.005,
                0.0002,
            ),
        ];
        Self {
            skybox: Some("textures/starSky.webp".to_owned()),
            bodies,
        }
    }

    /// Look up a body by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BodyDescriptor> {
        self.bodies.iter().find(|b| b.name == name)
    }

    /// Check names are unique and placements are well-formed.
    ///
    /// # Errors
    ///
    /// Returns the first [`CatalogError`] found, in body order.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for body in &self.bodies {
            if !seen.insert(body.name.as_str()) {
                return Err(CatalogError::DuplicateName(body.name.clone()));
            }
            if !body.scale.is_finite() || body.scale <= 0.0 {
                return Err(CatalogError::InvalidScale {
                    name: body.name.clone(),
                    scale: body.scale,
                });
            }
            if !body.position.iter().all(|c| c.is_finite()) {
                return Err(CatalogError::InvalidPosition(body.name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solar_system_has_sun_and_eight_planets() {
        let catalog = Catalog::solar_system();
        assert_eq!(catalog.bodies.len(), 9);
        assert_eq!(catalog.bodies[0].name, "Sun");
        assert!(catalog.bodies[0].orbit_speed.is_none());
        assert!(catalog.bodies[0].light.is_some());
        assert!(catalog.bodies[1..]
            .iter()
            .all(|b| b.orbit_speed.is_some() && b.light.is_none()));
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn retrograde_spinners_keep_their_sign() {
        let catalog = Catalog::solar_system();
        assert!(catalog.get("Venus").unwrap().spin_speed < 0.0);
        assert!(catalog.get("Uranus").unwrap().spin_speed < 0.0);
        assert!(catalog.get("Earth").unwrap().spin_speed > 0.0);
        assert!(catalog.get("Pluto").is_none());
    }

    #[test]
    fn validate_rejects_duplicates() {
        let mut catalog = Catalog::solar_system();
        let dup = catalog.bodies[3].clone();
        catalog.bodies.push(dup);
        assert_eq!(
            catalog.validate(),
            Err(CatalogError::DuplicateName("Earth".to_owned()))
        );
    }

    #[test]
    fn validate_rejects_bad_scale_and_position() {
        let mut catalog = Catalog::solar_system();
        catalog.bodies[2].scale = 0.0;
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::InvalidScale { ref name, .. }) if name == "Venus"
        ));

        let mut catalog = Catalog::solar_system();
        catalog.bodies[4].position[1] = f32::NAN;
        assert_eq!(
            catalog.validate(),
            Err(CatalogError::InvalidPosition("Mars".to_owned()))
        );
    }

    #[test]
    fn body_without_orbit_round_trips_through_toml() {
        let catalog = Catalog::solar_system();
        let text = toml::to_string_pretty(&catalog).unwrap();
        let parsed: Catalog = toml::from_str(&text).unwrap();
        assert_eq!(parsed, catalog);
    }
}
