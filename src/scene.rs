//! Mesh and texture storage with a deferred, per-frame draw queue.

use crate::handles::{MeshId, TextureId};
use crate::material::Material;
use crate::mesh::{Mesh, Topology, Transform};
use crate::texture::Texture;

/// A queued mesh draw.
///
/// Draws are accumulated in the [`Scene`] while the frame closure runs and
/// consumed by the [`MeshPass`](crate::MeshPass) when the frame is rendered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueuedMesh {
    /// Handle to the mesh in the scene's mesh array.
    pub mesh: MeshId,
    /// World-space transformation for this instance.
    pub transform: Transform,
    pub material: Material,
}

/// Render order bucket of a queued draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DrawLayer {
    Opaque,
    Transparent,
    Lines,
}

/// Shared storage for meshes, textures, and the per-frame draw queue.
///
/// # Usage Pattern
///
/// ```ignore
/// // Setup: register meshes and textures
/// let sphere = scene.add_mesh(Mesh::sphere(&gpu, SphereGeometry::new(1.0, 32, 32)));
/// let surface = scene.add_texture(Texture::from_file(&gpu, "jupiter.jpg")?);
///
/// // Each frame: queue draw calls
/// scene.clear_queue();
/// scene.draw(sphere, transform, Material::lambert().map(Some(surface)));
/// ```
#[derive(Default)]
pub struct Scene {
    /// Registered meshes, indexed by the values returned from [`add_mesh`](Self::add_mesh).
    pub meshes: Vec<Mesh>,
    /// Registered textures, indexed by the values returned from [`add_texture`](Self::add_texture).
    pub textures: Vec<Texture>,
    /// Per-frame draw queue, cleared at the start of each frame.
    pub draw_queue: Vec<QueuedMesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mesh and returns a type-safe handle for later use.
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        let idx = self.meshes.len();
        self.meshes.push(mesh);
        MeshId(idx)
    }

    /// Registers a texture and returns a type-safe handle for later use.
    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        let idx = self.textures.len();
        self.textures.push(texture);
        TextureId(idx)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id.0)
    }

    /// Queues a mesh for rendering this frame.
    pub fn draw(&mut self, mesh: MeshId, transform: Transform, material: Material) {
        self.draw_queue.push(QueuedMesh {
            mesh,
            transform,
            material,
        });
    }

    /// Clears the draw queue. Registered meshes and textures are kept.
    pub fn clear_queue(&mut self) {
        self.draw_queue.clear();
    }

    /// Queued draws whose mesh exists, in render order.
    ///
    /// Opaque surfaces come first, then transparent ones, then lines.
    /// Submission order is kept within a layer.
    pub fn ordered_draws(&self) -> Vec<(DrawLayer, &QueuedMesh, &Mesh)> {
        let mut draws: Vec<_> = self
            .draw_queue
            .iter()
            .filter_map(|queued| {
                let mesh = self.mesh(queued.mesh)?;
                Some((layer_of(&queued.material, mesh.topology()), queued, mesh))
            })
            .collect();
        draws.sort_by_key(|(layer, _, _)| *layer);
        draws
    }
}

pub(crate) fn layer_of(material: &Material, topology: Topology) -> DrawLayer {
    match topology {
        Topology::Lines => DrawLayer::Lines,
        Topology::Triangles if material.transparent => DrawLayer::Transparent,
        Topology::Triangles => DrawLayer::Opaque,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_follow_material_and_topology() {
        let opaque = Material::lambert();
        let shell = Material::phong().opacity(0.1);
        assert_eq!(layer_of(&opaque, Topology::Triangles), DrawLayer::Opaque);
        assert_eq!(layer_of(&shell, Topology::Triangles), DrawLayer::Transparent);
        assert_eq!(layer_of(&shell, Topology::Lines), DrawLayer::Lines);
        assert!(DrawLayer::Opaque < DrawLayer::Transparent);
        assert!(DrawLayer::Transparent < DrawLayer::Lines);
    }

    #[test]
    fn queue_clears_but_storage_stays() {
        let mut scene = Scene::new();
        scene.draw(MeshId(0), Transform::new(), Material::lambert());
        scene.draw(MeshId(3), Transform::new(), Material::lambert());
        assert_eq!(scene.draw_queue.len(), 2);

        // No meshes registered, so nothing is drawable
        assert!(scene.ordered_draws().is_empty());

        scene.clear_queue();
        assert!(scene.draw_queue.is_empty());
    }

    #[test]
    fn missing_handles_resolve_to_none() {
        let scene = Scene::new();
        assert!(scene.mesh(MeshId(0)).is_none());
        assert!(scene.texture(TextureId(0)).is_none());
    }
}
