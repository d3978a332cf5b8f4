//! Type-safe handles into the [`Scene`](crate::Scene) storage.

/// Type-safe handle to a mesh stored in the scene.
///
/// Obtained from [`SetupContext::mesh_sphere`](crate::SetupContext::mesh_sphere)
/// and friends. The newtype keeps texture indices from being passed where a
/// mesh is expected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub(crate) usize);

/// Type-safe handle to a texture stored in the scene.
///
/// Obtained from [`SetupContext::texture_from_file`](crate::SetupContext::texture_from_file)
/// or [`SetupContext::add_texture`](crate::SetupContext::add_texture).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub(crate) usize);

impl MeshId {
    /// Position of the mesh in the scene's storage.
    pub fn index(self) -> usize {
        self.0
    }
}

impl TextureId {
    /// Position of the texture in the scene's storage.
    pub fn index(self) -> usize {
        self.0
    }
}
