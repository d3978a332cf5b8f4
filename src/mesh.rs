//! 3D mesh primitives and spatial transforms for GPU rendering.
//!
//! - [`Vertex3d`]: The vertex format used by all meshes, containing position, normal, and UV data
//! - [`SphereGeometry`]: CPU-side latitude/longitude sphere generation
//! - [`Mesh`]: GPU-resident geometry with vertex and index buffers
//! - [`Transform`]: Position, rotation, and scale for placing meshes in 3D space
//!
//! # Vertex Layout
//!
//! The [`Vertex3d`] struct uses the following GPU layout (32 bytes per vertex):
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | normal    | Float32x3 | 12     | 1               |
//! | uv        | Float32x2 | 24     | 2               |

use crate::gpu::GpuContext;
use glam::{Mat4, Quat, Vec3};

/// A vertex for 3D mesh rendering with position, normal, and texture coordinates.
///
/// Uses `#[repr(C)]` for a predictable memory layout and derives
/// [`bytemuck::Pod`] for safe casting to byte slices.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    /// The 3D position of this vertex in model space.
    pub position: [f32; 3],
    /// The surface normal vector (should be normalized for correct lighting).
    pub normal: [f32; 3],
    /// Texture coordinates, typically in the range [0, 1].
    pub uv: [f32; 2],
}

impl Vertex3d {
    /// The wgpu vertex buffer layout descriptor for this vertex type.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// A UV sphere centered at the origin.
///
/// Vertices are laid out ring by ring from the north pole (+Y) to the south
/// pole, each ring running once around the equator with a duplicated seam
/// column so the texture wraps cleanly.
///
/// # Geometry Details
///
/// - **Vertices**: `(width_segments + 1) × (height_segments + 1)`
/// - **Triangles**: `width_segments × (2 × height_segments − 2)`, the pole
///   rows use a single triangle per segment
/// - **UV mapping**: Equirectangular, `u` follows longitude, `v = 0` at the
///   north pole so image rows map top to bottom
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereGeometry {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

/// Upper bound on either segment count.
pub const MAX_SPHERE_SEGMENTS: u32 = 1024;

impl SphereGeometry {
    /// Segment counts are clamped between the smallest closed shape (3 × 2)
    /// and [`MAX_SPHERE_SEGMENTS`].
    pub fn new(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Self {
            radius,
            width_segments: width_segments.clamp(3, MAX_SPHERE_SEGMENTS),
            height_segments: height_segments.clamp(2, MAX_SPHERE_SEGMENTS),
        }
    }

    pub fn vertex_count(&self) -> usize {
        let (w, h) = (self.width_segments as usize, self.height_segments as usize);
        (w + 1) * (h + 1)
    }

    pub fn triangle_count(&self) -> usize {
        let (w, h) = (self.width_segments as usize, self.height_segments as usize);
        w * (2 * h).saturating_sub(2)
    }

    /// Generate vertices and counter-clockwise triangle indices.
    pub fn build(&self) -> (Vec<Vertex3d>, Vec<u32>) {
        let (w, h) = (self.width_segments, self.height_segments);
        let mut vertices = Vec::with_capacity(self.vertex_count());
        let mut indices = Vec::with_capacity(self.triangle_count() * 3);

        for iy in 0..=h {
            let v = iy as f32 / h as f32;
            let theta = v * std::f32::consts::PI;

            for ix in 0..=w {
                let u = ix as f32 / w as f32;
                let phi = u * std::f32::consts::TAU;

                let normal = Vec3::new(
                    -phi.cos() * theta.sin(),
                    theta.cos(),
                    phi.sin() * theta.sin(),
                );
                let position = normal * self.radius;

                vertices.push(Vertex3d::new(
                    position.to_array(),
                    normal.to_array(),
                    [u, v],
                ));
            }
        }

        let row = w + 1;
        for iy in 0..h {
            for ix in 0..w {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;

                // Skip the zero-area half of each quad touching a pole
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != h - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        (vertices, indices)
    }
}

/// Primitive assembly used when drawing a mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Topology {
    #[default]
    Triangles,
    /// Every index pair is one line segment.
    Lines,
}

/// GPU-resident 3D mesh geometry with vertex and index buffers.
///
/// Meshes are immutable after creation; to render different geometry,
/// create a new mesh. Triangle meshes use counter-clockwise front faces.
#[derive(Debug)]
pub struct Mesh {
    /// The GPU buffer containing vertex data.
    pub(crate) vertex_buffer: wgpu::Buffer,
    /// The GPU buffer containing index data (u32 indices).
    pub(crate) index_buffer: wgpu::Buffer,
    /// The number of indices in the mesh (determines draw call size).
    pub(crate) index_count: u32,
    pub(crate) topology: Topology,
}

impl Mesh {
    /// Creates a triangle mesh from raw vertex and index data.
    pub fn new(gpu: &GpuContext, vertices: &[Vertex3d], indices: &[u32]) -> Self {
        Self::with_topology(gpu, vertices, indices, Topology::Triangles)
    }

    /// Creates a line-list mesh; `indices` holds pairs of endpoints.
    pub fn lines(gpu: &GpuContext, vertices: &[Vertex3d], indices: &[u32]) -> Self {
        Self::with_topology(gpu, vertices, indices, Topology::Lines)
    }

    fn with_topology(
        gpu: &GpuContext,
        vertices: &[Vertex3d],
        indices: &[u32],
        topology: Topology,
    ) -> Self {
        use wgpu::util::DeviceExt;

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            topology,
        }
    }

    /// Uploads a sphere built from `geometry`.
    pub fn sphere(gpu: &GpuContext, geometry: SphereGeometry) -> Self {
        let (vertices, indices) = geometry.build();
        Self::new(gpu, &vertices, &indices)
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }
}

/// A 3D transformation representing position, rotation, and scale.
///
/// Transformations are applied in SRT order: scale, then rotate, then
/// translate.
///
/// ```
/// use jovian::{Transform, Vec3, Quat};
///
/// let transform = Transform::new()
///     .position(Vec3::new(0.0, 5.0, -10.0))
///     .rotation(Quat::from_rotation_y(std::f32::consts::PI / 4.0))
///     .uniform_scale(2.0);
/// assert_eq!(transform.scale, Vec3::splat(2.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// World-space position (translation).
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
    /// Scale factors for each axis.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Converts this transform to a 4×4 transformation matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_counts() {
        let geometry = SphereGeometry::new(1.0, 32, 32);
        let (vertices, indices) = geometry.build();
        assert_eq!(vertices.len(), 33 * 33);
        assert_eq!(vertices.len(), geometry.vertex_count());
        assert_eq!(indices.len(), geometry.triangle_count() * 3);
        assert_eq!(geometry.triangle_count(), 32 * 62);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn sphere_vertices_sit_on_radius() {
        let (vertices, _) = SphereGeometry::new(1.03, 16, 12).build();
        for v in &vertices {
            let p = Vec3::from_array(v.position);
            let n = Vec3::from_array(v.normal);
            assert!((p.length() - 1.03).abs() < 1e-5);
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!((0.0..=1.0).contains(&v.uv[0]));
            assert!((0.0..=1.0).contains(&v.uv[1]));
        }
    }

    #[test]
    fn sphere_starts_at_north_pole() {
        let (vertices, _) = SphereGeometry::new(2.0, 8, 4).build();
        let first = Vec3::from_array(vertices[0].position);
        let last = Vec3::from_array(vertices[vertices.len() - 1].position);
        assert!(first.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5));
        assert!(last.abs_diff_eq(Vec3::new(0.0, -2.0, 0.0), 1e-5));
        assert_eq!(vertices[0].uv[1], 0.0);
    }

    #[test]
    fn sphere_triangles_face_outward() {
        let (vertices, indices) = SphereGeometry::new(1.0, 24, 16).build();
        for tri in indices.chunks_exact(3) {
            let [a, b, c] =
                [tri[0], tri[1], tri[2]].map(|i| Vec3::from_array(vertices[i as usize].position));
            let face_normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(face_normal.length() > 0.0, "degenerate triangle");
            assert!(face_normal.dot(centroid) > 0.0, "triangle winds inward");
        }
    }

    #[test]
    fn sphere_clamps_segments() {
        let geometry = SphereGeometry::new(1.0, 0, 1);
        assert_eq!(geometry.width_segments, 3);
        assert_eq!(geometry.height_segments, 2);
        let (_, indices) = geometry.build();
        assert_eq!(indices.len(), 3 * 3 * 2);
    }

    #[test]
    fn sphere_segments_have_an_upper_bound() {
        let geometry = SphereGeometry::new(1.0, u32::MAX, u32::MAX);
        assert_eq!(geometry.width_segments, MAX_SPHERE_SEGMENTS);
        assert_eq!(geometry.height_segments, MAX_SPHERE_SEGMENTS);

        let n = MAX_SPHERE_SEGMENTS as usize;
        assert_eq!(geometry.vertex_count(), (n + 1) * (n + 1));
        assert_eq!(geometry.triangle_count(), n * (2 * n - 2));
        // Every vertex stays addressable by a u32 index
        assert!(geometry.vertex_count() <= u32::MAX as usize);
    }

    #[test]
    fn transform_matrix_applies_srt() {
        let transform = Transform::new()
            .position(Vec3::new(1.0, 0.0, 0.0))
            .rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2))
            .uniform_scale(2.0);
        let moved = transform.matrix().transform_point3(Vec3::X);
        assert!(moved.abs_diff_eq(Vec3::new(1.0, 0.0, -2.0), 1e-5));
    }
}
