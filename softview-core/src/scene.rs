/// Collection of loaded models with one active selection
use log::debug;

use crate::geometry::Mesh;

#[derive(Debug, Clone, Default)]
pub struct Scene {
    meshes: Vec<Mesh>,
    active: Option<usize>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh and make it active. Returns its index.
    pub fn add(&mut self, mesh: Mesh) -> usize {
        debug!("scene: adding {}", mesh.name);
        self.meshes.push(mesh);
        let index = self.meshes.len() - 1;
        self.active = Some(index);
        index
    }

    /// Remove the mesh at `index`. The active selection stays on the same mesh
    /// when possible, otherwise moves to its nearest neighbour.
    pub fn remove(&mut self, index: usize) -> Option<Mesh> {
        if index >= self.meshes.len() {
            return None;
        }
        let removed = self.meshes.remove(index);
        self.active = match self.active {
            _ if self.meshes.is_empty() => None,
            Some(a) if a > index => Some(a - 1),
            Some(a) => Some(a.min(self.meshes.len() - 1)),
            None => None,
        };
        Some(removed)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active(&self) -> Option<&Mesh> {
        self.meshes.get(self.active?)
    }

    pub fn active_mut(&mut self) -> Option<&mut Mesh> {
        self.meshes.get_mut(self.active?)
    }

    /// Select the mesh at `index`; ignored when out of range
    pub fn set_active(&mut self, index: usize) {
        if index < self.meshes.len() {
            self.active = Some(index);
        }
    }

    /// Make the next mesh active, wrapping around
    pub fn cycle_active(&mut self) {
        if self.meshes.is_empty() {
            return;
        }
        let next = self.active.map_or(0, |a| (a + 1) % self.meshes.len());
        self.active = Some(next);
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mesh> {
        self.meshes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(names: &[&str]) -> Scene {
        let mut scene = Scene::new();
        for name in names {
            scene.add(Mesh::named(*name));
        }
        scene
    }

    #[test]
    fn test_add_selects_newest() {
        let scene = scene(&["a", "b"]);
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.active().unwrap().name, "b");
    }

    #[test]
    fn test_remove_keeps_selection() {
        let mut scene = scene(&["a", "b", "c"]);
        scene.set_active(2);
        assert_eq!(scene.remove(0).unwrap().name, "a");
        assert_eq!(scene.active().unwrap().name, "c");

        // Removing the active last mesh moves to the new last one
        scene.remove(1);
        assert_eq!(scene.active().unwrap().name, "b");

        scene.remove(0);
        assert!(scene.is_empty());
        assert!(scene.active().is_none());
        assert!(scene.remove(0).is_none());
    }

    #[test]
    fn test_set_active_out_of_range_ignored() {
        let mut scene = scene(&["a", "b"]);
        scene.set_active(0);
        scene.set_active(5);
        assert_eq!(scene.active_index(), Some(0));
    }

    #[test]
    fn test_cycle_active_wraps() {
        let mut scene = scene(&["a", "b"]);
        scene.cycle_active();
        assert_eq!(scene.active().unwrap().name, "a");
        scene.cycle_active();
        assert_eq!(scene.active().unwrap().name, "b");
        let names: Vec<_> = scene.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_active_mut() {
        let mut scene = scene(&["a"]);
        scene.active_mut().unwrap().transform_mut().scale_x(2.0);
        assert_eq!(scene.active().unwrap().transform().scale().x, 2.0);
    }
}
