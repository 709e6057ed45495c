//! Materials for sphere-mesh shading.
//!
//! A material picks the WGSL shading function compiled into the sphere-mesh
//! pipelines, plus the lighting coefficients fed to it as uniforms. Switching
//! to a material with a different [`ShadingModel`] requires a pipeline rebuild.

use std::collections::HashMap;

/// Which shading function the fragment stage uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingModel {
    /// Headlight Blinn-Phong.
    #[default]
    Phong,
    /// Unlit base color.
    Flat,
    /// World normals mapped to RGB.
    Normal,
}

impl ShadingModel {
    /// WGSL source defining `shade(n, view_dir, base) -> vec3<f32>`.
    pub(crate) fn source(self) -> &'static str {
        match self {
            ShadingModel::Phong => include_str!("shaders/shading_phong.wgsl"),
            ShadingModel::Flat => include_str!("shaders/shading_flat.wgsl"),
            ShadingModel::Normal => include_str!("shaders/shading_normal.wgsl"),
        }
    }
}

/// A named material.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub shading: ShadingModel,
    /// Ambient light factor (0.0 - 1.0).
    pub ambient: f32,
    /// Diffuse reflection factor (0.0 - 1.0).
    pub diffuse: f32,
    /// Specular reflection intensity (0.0 - 1.0).
    pub specular: f32,
    /// Specular exponent.
    pub shininess: f32,
}

impl Material {
    /// Creates a Phong material with custom coefficients.
    pub fn phong(
        name: impl Into<String>,
        ambient: f32,
        diffuse: f32,
        specular: f32,
        shininess: f32,
    ) -> Self {
        Self {
            name: name.into(),
            shading: ShadingModel::Phong,
            ambient,
            diffuse,
            specular,
            shininess,
        }
    }

    /// Matte, minimal specularity.
    #[must_use]
    pub fn clay() -> Self {
        Self::phong("clay", 0.25, 0.75, 0.1, 8.0)
    }

    /// Slightly glossy, soft highlights.
    #[must_use]
    pub fn wax() -> Self {
        Self::phong("wax", 0.2, 0.7, 0.4, 16.0)
    }

    #[must_use]
    pub fn flat() -> Self {
        Self {
            shading: ShadingModel::Flat,
            ..Self::phong("flat", 1.0, 0.0, 0.0, 1.0)
        }
    }

    #[must_use]
    pub fn normal() -> Self {
        Self {
            shading: ShadingModel::Normal,
            ..Self::phong("normal", 1.0, 0.0, 0.0, 1.0)
        }
    }

    /// Coefficients packed as `(ambient, diffuse, specular, shininess)`.
    pub fn params(&self) -> [f32; 4] {
        [self.ambient, self.diffuse, self.specular, self.shininess]
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::clay()
    }
}

/// Registry of materials available by name.
pub struct MaterialRegistry {
    materials: HashMap<String, Material>,
}

impl MaterialRegistry {
    /// Creates a registry holding the built-in materials.
    pub fn new() -> Self {
        let mut registry = Self {
            materials: HashMap::new(),
        };
        for material in [
            Material::clay(),
            Material::wax(),
            Material::flat(),
            Material::normal(),
        ] {
            registry.register(material);
        }
        registry
    }

    /// Adds or replaces a material.
    pub fn register(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// Material names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.materials.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for MaterialRegistry {
    fn default() -> Self {
        Self::new()
    }
}
