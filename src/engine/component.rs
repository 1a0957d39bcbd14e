//! Sparse component storage keyed by `Entity`
//!
//! Each slot remembers the generation it was written with, so a lookup with a
//! stale handle misses instead of returning the data of whoever reused the
//! slot. The island never holds more than a few hundred dinosaurs and items,
//! so a flat `Vec<Option<_>>` is plenty.

use super::entity::Entity;

pub struct ComponentStorage<T> {
    slots: Vec<Option<(u32, T)>>,
}

impl<T> ComponentStorage<T> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Insert or replace the component for `entity`.
    pub fn insert(&mut self, entity: Entity, value: T) {
        let idx = entity.index() as usize;
        if idx >= self.slots.len() {
            self.slots.resize_with(idx + 1, || None);
        }
        self.slots[idx] = Some((entity.generation(), value));
    }

    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let slot = self.slots.get_mut(entity.index() as usize)?;
        if slot.as_ref().is_some_and(|(gen, _)| *gen == entity.generation()) {
            slot.take().map(|(_, value)| value)
        } else {
            None
        }
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        match self.slots.get(entity.index() as usize)? {
            Some((gen, value)) if *gen == entity.generation() => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        match self.slots.get_mut(entity.index() as usize)? {
            Some((gen, value)) if *gen == entity.generation() => Some(value),
            _ => None,
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.get(entity).is_some()
    }

    /// Iterate `(handle, component)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.as_ref()
                .map(|(gen, value)| (Entity::new(idx as u32, *gen), value))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(idx, slot)| {
            slot.as_mut()
                .map(|(gen, value)| (Entity::new(idx as u32, *gen), value))
        })
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}
