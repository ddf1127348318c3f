use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Slot index plus generation; a removed slot bumps its generation so stale ids stop resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct GenerationalId {
    pub index: usize,
    pub generation: u32,
}

impl GenerationalId {
    pub fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn null() -> Self {
        Self::new(usize::MAX, 0)
    }

    pub fn is_null(&self) -> bool {
        self.index == usize::MAX
    }
}

impl Default for GenerationalId {
    fn default() -> Self {
        Self::null()
    }
}

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord, Default)]
        pub struct $name(pub GenerationalId);

        impl $name {
            pub fn index(&self) -> usize {
                self.0.index
            }

            pub fn generation(&self) -> u32 {
                self.0.generation
            }

            pub fn is_null(&self) -> bool {
                self.0.is_null()
            }
        }

        impl From<GenerationalId> for $name {
            fn from(id: GenerationalId) -> Self {
                Self(id)
            }
        }

        impl From<$name> for GenerationalId {
            fn from(handle: $name) -> Self {
                handle.0
            }
        }
    };
}

define_handle!(
    /// Handle to a [`Body`](crate::core::body::Body) owned by a [`World`](crate::world::World).
    BodyHandle
);
define_handle!(
    /// Handle to a [`Shape`](crate::core::shape::Shape) owned by a [`World`](crate::world::World).
    ShapeHandle
);
define_handle!(
    /// Handle to a [`Constraint`](crate::core::constraint::Constraint) owned by a [`World`](crate::world::World).
    ConstraintHandle
);

/// Generational arena that hands out stable ids while preventing use-after-free.
///
/// Iteration always walks slots in ascending index order, which keeps every
/// pass over the world deterministic.
pub struct Arena<T> {
    items: Vec<Option<T>>,
    generations: Vec<u32>,
    free_list: VecDeque<usize>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            generations: Vec::new(),
            free_list: VecDeque::new(),
            live: 0,
        }
    }

    pub fn insert(&mut self, item: T) -> GenerationalId {
        self.live += 1;
        if let Some(index) = self.free_list.pop_front() {
            self.items[index] = Some(item);
            return GenerationalId::new(index, self.generations[index]);
        }

        let index = self.items.len();
        self.items.push(Some(item));
        self.generations.push(0);
        GenerationalId::new(index, 0)
    }

    pub fn contains(&self, id: impl Into<GenerationalId>) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: impl Into<GenerationalId>) -> Option<&T> {
        let id = id.into();
        if self.is_valid(id) {
            self.items.get(id.index).and_then(|slot| slot.as_ref())
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, id: impl Into<GenerationalId>) -> Option<&mut T> {
        let id = id.into();
        if self.is_valid(id) {
            self.items.get_mut(id.index).and_then(|slot| slot.as_mut())
        } else {
            None
        }
    }

    /// Borrows two distinct entries mutably at once; `None` if either is stale or they alias.
    pub fn get2_mut(
        &mut self,
        id_a: impl Into<GenerationalId>,
        id_b: impl Into<GenerationalId>,
    ) -> Option<(&mut T, &mut T)> {
        let (id_a, id_b) = (id_a.into(), id_b.into());
        if id_a.index == id_b.index || !self.is_valid(id_a) || !self.is_valid(id_b) {
            return None;
        }

        let (first, second, flipped) = if id_a.index < id_b.index {
            (id_a.index, id_b.index, false)
        } else {
            (id_b.index, id_a.index, true)
        };

        let (left, right) = self.items.split_at_mut(second);
        let first_slot = left.get_mut(first).and_then(|slot| slot.as_mut())?;
        let second_slot = right.get_mut(0).and_then(|slot| slot.as_mut())?;

        if flipped {
            Some((second_slot, first_slot))
        } else {
            Some((first_slot, second_slot))
        }
    }

    /// Removes an entry. Removing a stale or already-removed id is a no-op returning `None`.
    pub fn remove(&mut self, id: impl Into<GenerationalId>) -> Option<T> {
        let id = id.into();
        if !self.is_valid(id) {
            return None;
        }
        let item = self.items[id.index].take()?;
        self.generations[id.index] = self.generations[id.index].wrapping_add(1);
        self.free_list.push_back(id.index);
        self.live -= 1;
        Some(item)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GenerationalId, &T)> + '_ {
        self.items.iter().enumerate().filter_map(move |(index, slot)| {
            slot.as_ref()
                .map(|item| (GenerationalId::new(index, self.generations[index]), item))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (GenerationalId, &mut T)> + '_ {
        let generations = &self.generations;
        self.items
            .iter_mut()
            .enumerate()
            .filter_map(move |(index, slot)| {
                slot.as_mut()
                    .map(|item| (GenerationalId::new(index, generations[index]), item))
            })
    }

    pub fn ids(&self) -> impl Iterator<Item = GenerationalId> + '_ {
        self.iter().map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn is_valid(&self, id: GenerationalId) -> bool {
        self.generations
            .get(id.index)
            .map(|generation| *generation == id.generation)
            .unwrap_or(false)
            && self.items[id.index].is_some()
    }
}
