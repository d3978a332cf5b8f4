//! The scene's single light source.

use glam::Vec3;

use crate::color::Color;
use crate::config::LightConfig;
use crate::mesh::Vertex3d;

/// A spotlight shining from `position` towards `target`.
///
/// Surfaces inside the cone of half-angle `angle` receive the full
/// intensity; the outer `penumbra` fraction of the cone fades to zero.
/// There is no falloff with distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
    /// Half-angle of the cone, radians.
    pub angle: f32,
    pub penumbra: f32,
    /// Flat term added to every lit surface.
    pub ambient: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self::from(&LightConfig::default())
    }
}

impl From<&LightConfig> for SpotLight {
    fn from(config: &LightConfig) -> Self {
        Self {
            color: Color::from_hex(config.color),
            intensity: config.intensity,
            position: Vec3::from_array(config.position),
            target: Vec3::from_array(config.target),
            angle: config.angle.clamp(0.0, std::f32::consts::FRAC_PI_2),
            penumbra: config.penumbra.clamp(0.0, 1.0),
            ambient: config.ambient,
        }
    }
}

impl SpotLight {
    /// Unit vector along the cone axis.
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    /// Spot attenuation for a surface point, 1.0 on the axis, 0.0 outside
    /// the cone.
    pub fn cone_factor(&self, point: Vec3) -> f32 {
        let to_point = (point - self.position).normalize_or_zero();
        let cos_angle = to_point.dot(self.direction());
        let (outer, inner) = self.cone_cosines();
        smoothstep(outer, inner, cos_angle)
    }

    /// Cosines of the outer edge and of the start of the penumbra.
    fn cone_cosines(&self) -> (f32, f32) {
        let outer = self.angle.cos();
        let inner = (self.angle * (1.0 - self.penumbra)).cos();
        (outer, inner)
    }

    pub(crate) fn uniforms(&self) -> LightUniforms {
        let (outer, inner) = self.cone_cosines();
        LightUniforms {
            position: self.position.extend(self.intensity).to_array(),
            direction: self.direction().extend(self.ambient).to_array(),
            color: [self.color.r, self.color.g, self.color.b, 1.0],
            cone: [outer, inner, 0.0, 0.0],
        }
    }

    /// Wireframe cone outlining the light, as a line list.
    ///
    /// The apex sits on the light, the base circle of `segments` edges is
    /// centered on the target. Four rays join the apex to the base.
    pub fn helper_geometry(&self, segments: u32) -> (Vec<Vertex3d>, Vec<u32>) {
        let segments = segments.max(4);
        let axis = self.target - self.position;
        let length = axis.length();
        let direction = self.direction();
        let radius = length * self.angle.tan();

        let (tangent, bitangent) = direction.any_orthonormal_pair();

        let line_vertex = |p: Vec3| Vertex3d::new(p.to_array(), [0.0; 3], [0.0; 2]);

        let mut vertices = vec![line_vertex(self.position)];
        let center = self.position + direction * length;
        for i in 0..segments {
            let a = i as f32 / segments as f32 * std::f32::consts::TAU;
            let rim = center + (tangent * a.cos() + bitangent * a.sin()) * radius;
            vertices.push(line_vertex(rim));
        }

        let mut indices = Vec::with_capacity((segments as usize + 4) * 2);
        for i in 0..segments {
            indices.extend_from_slice(&[1 + i, 1 + (i + 1) % segments]);
        }
        for quarter in 0..4 {
            indices.extend_from_slice(&[0, 1 + quarter * segments / 4]);
        }

        (vertices, indices)
    }
}

/// Light block uploaded once per frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniforms {
    /// xyz: position, w: intensity.
    pub position: [f32; 4],
    /// xyz: cone axis, w: ambient.
    pub direction: [f32; 4],
    pub color: [f32; 4],
    /// x: cos(outer angle), y: cos(penumbra start).
    pub cone: [f32; 4],
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x >= edge0 { 1.0 } else { 0.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn default_light_aims_at_origin() {
        let light = SpotLight::default();
        assert_eq!(light.position, Vec3::new(-4.0, 3.0, 5.0));
        let expected = Vec3::new(4.0, -3.0, -5.0).normalize();
        assert!(light.direction().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn planet_is_inside_the_cone() {
        let light = SpotLight::default();
        assert_eq!(light.cone_factor(Vec3::ZERO), 1.0);
        assert_eq!(light.cone_factor(Vec3::new(0.0, 1.0, 0.0)), 1.0);
    }

    #[test]
    fn hard_edge_without_penumbra() {
        let light = SpotLight::default();
        // Straight back past the light is far outside a 60 degree cone
        assert_eq!(light.cone_factor(light.position * 2.0), 0.0);
    }

    #[test]
    fn penumbra_fades() {
        let light = SpotLight {
            angle: 0.5,
            penumbra: 1.0,
            ..SpotLight::default()
        };
        let off_axis = light.position
            + Quat::from_axis_angle(light.direction().any_orthonormal_vector(), 0.25)
                * light.direction();
        let factor = light.cone_factor(off_axis);
        assert!(factor > 0.0 && factor < 1.0, "factor = {factor}");
    }

    #[test]
    fn helper_geometry_outlines_cone() {
        let light = SpotLight::default();
        let (vertices, indices) = light.helper_geometry(32);
        assert_eq!(vertices.len(), 33);
        assert_eq!(indices.len(), (32 + 4) * 2);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));

        let radius = light.position.length() * light.angle.tan();
        for v in &vertices[1..] {
            let d = Vec3::from_array(v.position).distance(light.target);
            assert!((d - radius).abs() < 1e-3);
        }
    }
}
