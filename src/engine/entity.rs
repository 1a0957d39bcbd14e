//! Generational entity handles
//!
//! Dinosaurs and items are addressed by `Entity` handles instead of indices
//! into a `Vec`. A handle carries the generation of its slot, so a handle to
//! a despawned dinosaur never aliases the next dinosaur that reuses the slot.
//! The spatial grid stores nothing but these handles.

use serde::{Deserialize, Serialize};

/// Handle to something owned by the `World`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index, used by `ComponentStorage`.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Hands out entity slots and recycles them with a bumped generation.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    generations: Vec<u32>,
    /// Freed slots, reused LIFO
    free: Vec<u32>,
    alive: usize,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> Entity {
        self.alive += 1;
        match self.free.pop() {
            Some(index) => Entity::new(index, self.generations[index as usize]),
            None => {
                let index = self.generations.len() as u32;
                self.generations.push(0);
                Entity::new(index, 0)
            }
        }
    }

    /// Release a slot. Returns false for stale or unknown handles.
    pub fn free(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let slot = &mut self.generations[entity.index as usize];
        *slot = slot.wrapping_add(1);
        self.free.push(entity.index);
        self.alive -= 1;
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.generations
            .get(entity.index as usize)
            .is_some_and(|&gen| gen == entity.generation)
    }

    pub fn alive_count(&self) -> usize {
        self.alive
    }

    /// Forget every entity. Old handles become stale.
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, gen) in self.generations.iter_mut().enumerate().rev() {
            *gen = gen.wrapping_add(1);
            self.free.push(index as u32);
        }
        self.alive = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_sequential() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(alloc.alive_count(), 2);
    }

    #[test]
    fn test_reused_slot_invalidates_old_handle() {
        let mut alloc = EntityAllocator::new();
        let raptor = alloc.allocate();
        assert!(alloc.free(raptor));

        let trex = alloc.allocate();
        assert_eq!(trex.index(), raptor.index());
        assert_ne!(trex.generation(), raptor.generation());
        assert!(!alloc.is_alive(raptor));
        assert!(alloc.is_alive(trex));
    }

    #[test]
    fn test_double_free_is_rejected() {
        let mut alloc = EntityAllocator::new();
        let e = alloc.allocate();
        assert!(alloc.free(e));
        assert!(!alloc.free(e));
        assert_eq!(alloc.alive_count(), 0);
    }

    #[test]
    fn test_clear_makes_everything_stale() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        alloc.free(b);
        alloc.clear();
        assert!(!alloc.is_alive(a));
        assert_eq!(alloc.alive_count(), 0);
        let c = alloc.allocate();
        assert!(alloc.is_alive(c));
    }
}
