use slotmap::SlotMap;

use crate::api::types::BodyId;
use crate::core::object::GameObject;

/// Object storage keyed by stable [`BodyId`]s.
/// Designed for small object counts (tens per level); pairwise passes are O(n²).
pub struct Scene {
    objects: SlotMap<BodyId, GameObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: SlotMap::with_capacity_and_key(32),
        }
    }

    /// Add an object to the scene and return its handle.
    pub fn spawn(&mut self, object: GameObject) -> BodyId {
        self.objects.insert(object)
    }

    /// Remove an object by ID. Returns the removed object if it was present.
    pub fn despawn(&mut self, id: BodyId) -> Option<GameObject> {
        self.objects.remove(id)
    }

    pub fn get(&self, id: BodyId) -> Option<&GameObject> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut GameObject> {
        self.objects.get_mut(id)
    }

    /// Mutable access to two distinct objects at once.
    /// `None` if either is missing or both IDs are the same.
    pub fn pair_mut(&mut self, a: BodyId, b: BodyId) -> Option<(&mut GameObject, &mut GameObject)> {
        let [first, second] = self.objects.get_disjoint_mut([a, b])?;
        Some((first, second))
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.objects.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &GameObject)> {
        self.objects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyId, &mut GameObject)> {
        self.objects.iter_mut()
    }

    /// Snapshot of the current IDs, in storage order. Pairwise passes iterate
    /// this so they can borrow two objects mutably inside the loop.
    pub fn ids(&self) -> Vec<BodyId> {
        self.objects.keys().collect()
    }

    /// IDs of every object due for removal: broken or already collected.
    pub fn removable_ids(&self) -> Vec<BodyId> {
        self.objects
            .iter()
            .filter(|(_, o)| o.is_broken || o.collected)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
