//! The gas giant: a textured core and a thin glowing atmosphere sharing one
//! spinning transform.

use crate::app::{Frame, SetupContext};
use crate::color::Color;
use crate::config::{AtmosphereConfig, PlanetConfig};
use crate::handles::MeshId;
use crate::material::Material;
use crate::mesh::Transform;
use crate::orientation::{Orientation, OrientationModel, Tilt};

/// A tilted planet that turns about its own axis once per [`advance`](Self::advance).
pub struct Planet {
    model: OrientationModel,
    core: MeshId,
    atmosphere: Option<MeshId>,
    core_material: Material,
    atmosphere_material: Material,
}

impl Planet {
    /// Registers the planet's meshes and surface texture.
    ///
    /// A texture that fails to load is logged and the core is drawn with its
    /// bare material instead.
    pub fn new(
        ctx: &mut SetupContext,
        planet: &PlanetConfig,
        atmosphere: &AtmosphereConfig,
    ) -> Self {
        let core = ctx.mesh_sphere(planet.radius, planet.width_segments, planet.height_segments);

        let map = planet
            .texture
            .as_deref()
            .and_then(|path| match ctx.texture_from_file(path) {
                Ok(texture) => Some(texture),
                Err(err) => {
                    tracing::warn!(path, error = %err, "surface texture unavailable, drawing untextured");
                    None
                }
            });

        let atmosphere_mesh = atmosphere.enabled.then(|| {
            ctx.mesh_sphere(
                planet.radius * atmosphere.scale,
                atmosphere.segments,
                atmosphere.segments,
            )
        });

        let model = orientation_model(planet);
        tracing::info!(
            tilt = ?planet.tilt,
            omega = planet.omega,
            textured = map.is_some(),
            atmosphere = atmosphere.enabled,
            "planet created"
        );

        Self {
            model,
            core,
            atmosphere: atmosphere_mesh,
            core_material: core_material(planet).map(map),
            atmosphere_material: atmosphere_material(atmosphere),
        }
    }

    /// Turns the planet by one frame's spin.
    pub fn advance(&mut self) -> Orientation {
        self.model.advance()
    }

    pub fn orientation(&self) -> Orientation {
        self.model.orientation()
    }

    pub fn model(&self) -> &OrientationModel {
        &self.model
    }

    /// World transform of both spheres for the current orientation.
    pub fn transform(&self) -> Transform {
        Transform::new().rotation(self.orientation().as_quat())
    }

    /// Queues the core, then the atmosphere shell.
    pub fn draw(&self, frame: &mut Frame) {
        let transform = self.transform();
        frame.draw_mesh(self.core, transform, self.core_material);
        if let Some(atmosphere) = self.atmosphere {
            frame.draw_mesh(atmosphere, transform, self.atmosphere_material);
        }
    }
}

/// Builds the spin model, replacing any non-finite setting with its default.
fn orientation_model(planet: &PlanetConfig) -> OrientationModel {
    let defaults = PlanetConfig::default();

    let mut tilt = Tilt::from_array(planet.tilt);
    if !tilt.is_finite() {
        tracing::warn!(tilt = ?planet.tilt, "non-finite planet tilt, using default");
        tilt = Tilt::from_array(defaults.tilt);
    }
    let omega = if planet.omega.is_finite() {
        planet.omega
    } else {
        tracing::warn!(omega = planet.omega, "non-finite planet omega, using default");
        defaults.omega
    };
    let initial_phase = match planet.initial_phase {
        Some(phase) if !phase.is_finite() => {
            tracing::warn!(phase, "non-finite initial phase, ignoring");
            None
        }
        phase => phase,
    };

    match initial_phase {
        Some(phase) => OrientationModel::with_initial_phase(tilt, omega, phase),
        None => OrientationModel::new(tilt, omega),
    }
}

fn core_material(planet: &PlanetConfig) -> Material {
    Material::lambert()
        .color(Color::from_hex(planet.color))
        .emissive(Color::from_hex(planet.emissive), planet.emissive_intensity)
}

fn atmosphere_material(atmosphere: &AtmosphereConfig) -> Material {
    Material::phong()
        .color(Color::from_hex(atmosphere.color))
        .emissive(Color::from_hex(atmosphere.emissive), atmosphere.emissive_intensity)
        .opacity(atmosphere.opacity)
        .transparent(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DQuat;

    #[test]
    fn model_starts_at_the_initial_phase() {
        let config = PlanetConfig::default();
        let model = orientation_model(&config);
        assert_eq!(model.frames(), 0);

        let tilt = Tilt::from_array(config.tilt).quat();
        let phase = config.initial_phase.unwrap_or_default();
        let expected = tilt * DQuat::from_rotation_y(phase);
        let q = model.orientation().quat();
        let dot = q.dot(expected).abs();
        assert!((dot - 1.0).abs() < 1e-9, "dot = {dot}");
    }

    #[test]
    fn model_without_phase_starts_at_tilt() {
        let config = PlanetConfig {
            initial_phase: None,
            ..PlanetConfig::default()
        };
        let model = orientation_model(&config);
        let expected = Orientation::from_tilt(Tilt::from_array(config.tilt));
        assert!(model.orientation().angle_to(expected) < 1e-9);
    }

    #[test]
    fn non_finite_settings_fall_back() {
        let config = PlanetConfig {
            tilt: [f64::INFINITY, 0.9, f64::NAN],
            omega: f64::NAN,
            initial_phase: Some(f64::NEG_INFINITY),
            ..PlanetConfig::default()
        };
        let mut model = orientation_model(&config);
        let defaults = PlanetConfig::default();
        assert_eq!(model.tilt(), Tilt::from_array(defaults.tilt));
        assert_eq!(model.omega(), defaults.omega);

        // Phase dropped, so the model starts at the bare tilt
        let expected = Orientation::from_tilt(model.tilt());
        assert!(model.orientation().angle_to(expected) < 1e-9);

        for _ in 0..10 {
            model.advance();
        }
        assert!(model.orientation().quat().is_finite());
        assert!(model.orientation().is_normalized(1e-9));
    }

    #[test]
    fn core_material_matches_config() {
        let material = core_material(&PlanetConfig::default());
        assert_eq!(material, Material::lambert().emissive(Color::from_hex(0xad2301), 0.12));
        assert!(!material.transparent);
    }

    #[test]
    fn atmosphere_is_a_transparent_glow() {
        let material = atmosphere_material(&AtmosphereConfig::default());
        assert!(material.transparent);
        assert_eq!(material.opacity, 0.1);
        assert_eq!(material.emissive, Color::from_hex(0xff3807));
        assert_eq!(material.emissive_intensity, 0.95);
        assert_eq!(material.shading, crate::material::Shading::Phong);
    }

    #[test]
    fn opaque_atmosphere_still_blends() {
        let config = AtmosphereConfig {
            opacity: 1.0,
            ..AtmosphereConfig::default()
        };
        assert!(atmosphere_material(&config).transparent);
    }
}
