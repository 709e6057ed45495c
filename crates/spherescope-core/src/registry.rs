//! Structure registry for managing registered structures.

use std::collections::BTreeMap;

use glam::Vec3;

use crate::error::{Result, SpherescopeError};
use crate::structure::Structure;

/// Name-keyed collection of one kind of structure.
///
/// Iteration follows name order, so draw order and scene extents are
/// reproducible.
pub struct Registry<S> {
    structures: BTreeMap<String, S>,
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        Self {
            structures: BTreeMap::new(),
        }
    }
}

impl<S: Structure> Registry<S> {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a structure with the registry.
    ///
    /// Returns an error if a structure with the same name already exists.
    pub fn register(&mut self, structure: S) -> Result<()> {
        let name = structure.name().to_string();
        if self.structures.contains_key(&name) {
            return Err(SpherescopeError::StructureExists(name));
        }
        self.structures.insert(name, structure);
        Ok(())
    }

    /// Gets a reference to a structure by name.
    pub fn get(&self, name: &str) -> Option<&S> {
        self.structures.get(name)
    }

    /// Gets a mutable reference to a structure by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut S> {
        self.structures.get_mut(name)
    }

    /// Checks if a structure with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.structures.contains_key(name)
    }

    /// Removes a structure by name.
    pub fn remove(&mut self, name: &str) -> Option<S> {
        self.structures.remove(name)
    }

    /// Removes all structures from the registry.
    pub fn clear(&mut self) {
        self.structures.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.structures.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut S> {
        self.structures.values_mut()
    }

    /// Returns the total number of registered structures.
    pub fn len(&self) -> usize {
        self.structures.len()
    }

    /// Returns true if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    /// Union of the bounding boxes of all enabled structures.
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        self.iter()
            .filter(|s| s.is_enabled())
            .filter_map(Structure::bounding_box)
            .reduce(|(amin, amax), (bmin, bmax)| (amin.min(bmin), amax.max(bmax)))
    }
}
