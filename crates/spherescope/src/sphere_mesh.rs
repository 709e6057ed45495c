//! Sphere mesh registration and handles.

use glam::{Mat4, Vec3};
use spherescope_core::{MeshProjection, Result, SphereMesh, SpherescopeError, Structure};
use spherescope_structures::SphereMeshStructure;

use crate::state::{try_with_context, try_with_context_mut};

/// Registers a sphere mesh under `name`.
///
/// The mesh is validated first; its color comes from
/// [`Options::default_mesh_color`](spherescope_core::Options::default_mesh_color).
pub fn register_sphere_mesh(name: impl Into<String>, mesh: SphereMesh) -> Result<SphereMeshHandle> {
    let name = name.into();
    mesh.validate()?;

    try_with_context_mut(|ctx| {
        let mut structure = SphereMeshStructure::new(name.clone(), mesh);
        structure
            .set_color(ctx.options.default_mesh_color)
            .set_segments(ctx.options.template_segments);
        ctx.structures.register(structure)?;
        ctx.update_extents();
        log::debug!("registered sphere mesh '{name}'");
        Ok::<(), SpherescopeError>(())
    })??;

    Ok(SphereMeshHandle { name })
}

/// Gets a handle to a registered sphere mesh.
pub fn get_sphere_mesh(name: &str) -> Option<SphereMeshHandle> {
    try_with_context(|ctx| ctx.structures.contains(name))
        .unwrap_or(false)
        .then(|| SphereMeshHandle {
            name: name.to_string(),
        })
}

/// Runs `f` on a registered sphere mesh.
pub fn with_sphere_mesh_ref<R>(name: &str, f: impl FnOnce(&SphereMeshStructure) -> R) -> Result<R> {
    try_with_context(|ctx| {
        ctx.structures
            .get(name)
            .map(f)
            .ok_or_else(|| SpherescopeError::StructureNotFound(name.to_string()))
    })?
}

/// Runs `f` on a registered sphere mesh, then refreshes the scene extents.
pub fn with_sphere_mesh<R>(
    name: &str,
    f: impl FnOnce(&mut SphereMeshStructure) -> R,
) -> Result<R> {
    try_with_context_mut(|ctx| {
        let result = ctx
            .structures
            .get_mut(name)
            .map(f)
            .ok_or_else(|| SpherescopeError::StructureNotFound(name.to_string()));
        ctx.update_extents();
        result
    })?
}

/// Removes a structure by name.
pub fn remove_structure(name: &str) -> Result<()> {
    try_with_context_mut(|ctx| {
        ctx.structures
            .remove(name)
            .ok_or_else(|| SpherescopeError::StructureNotFound(name.to_string()))?;
        ctx.update_extents();
        Ok(())
    })?
}

/// Removes every registered structure.
pub fn remove_all_structures() -> Result<()> {
    try_with_context_mut(|ctx| {
        ctx.structures.clear();
        ctx.update_extents();
    })
}

/// Projects a world-space point onto the named sphere mesh.
pub fn project_onto(name: &str, p: Vec3) -> Result<MeshProjection> {
    with_sphere_mesh_ref(name, |s| s.project(p))?
}

/// Names of all registered structures, in draw order.
pub fn structure_names() -> Result<Vec<String>> {
    try_with_context(|ctx| {
        ctx.structures
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    })
}

/// Handle to a registered sphere mesh.
///
/// Handles only carry the name; every call looks the structure up again and
/// fails with [`SpherescopeError::StructureNotFound`] once it is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SphereMeshHandle {
    name: String,
}

impl SphereMeshHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replaces the mesh after validating it.
    pub fn update_mesh(&self, mesh: SphereMesh) -> Result<&Self> {
        mesh.validate()?;
        with_sphere_mesh(&self.name, |s| s.update_mesh(mesh))?;
        Ok(self)
    }

    /// Copy of the current mesh.
    pub fn mesh(&self) -> Result<SphereMesh> {
        with_sphere_mesh_ref(&self.name, |s| s.mesh().clone())
    }

    pub fn set_color(&self, color: Vec3) -> Result<&Self> {
        with_sphere_mesh(&self.name, |s| {
            s.set_color(color);
        })?;
        Ok(self)
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<&Self> {
        with_sphere_mesh(&self.name, |s| s.set_enabled(enabled))?;
        Ok(self)
    }

    pub fn set_transform(&self, transform: Mat4) -> Result<&Self> {
        with_sphere_mesh(&self.name, |s| s.set_transform(transform))?;
        Ok(self)
    }

    pub fn set_wireframe(&self, wireframe: bool) -> Result<&Self> {
        with_sphere_mesh(&self.name, |s| {
            s.set_wireframe(wireframe);
        })?;
        Ok(self)
    }

    /// Projects a world-space point onto this mesh.
    pub fn project(&self, p: Vec3) -> Result<MeshProjection> {
        project_onto(&self.name, p)
    }
}
