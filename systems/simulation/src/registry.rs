//! Pooled collections of entities that update themselves once per tick.

use tile_defence_core::StepOutcome;

/// Unordered collection of live entities.
///
/// Removal swaps the last entity into the freed slot, so sibling order is not
/// preserved across updates.
#[derive(Clone, Debug)]
pub struct BehaviorCollection<T> {
    items: Vec<T>,
}

impl<T> BehaviorCollection<T> {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Adds an entity.
    pub fn add(&mut self, item: T) {
        self.items.push(item);
    }

    /// Runs `step` on every entity, handing entities that asked for removal
    /// to `reclaim`.
    ///
    /// An entity swapped into a freed slot is still stepped during the same
    /// pass.
    pub fn update<S, R>(&mut self, mut step: S, mut reclaim: R)
    where
        S: FnMut(&mut T) -> StepOutcome,
        R: FnMut(T),
    {
        let mut index = 0;
        while index < self.items.len() {
            match step(&mut self.items[index]) {
                StepOutcome::Continue => index += 1,
                StepOutcome::Remove => reclaim(self.items.swap_remove(index)),
            }
        }
    }

    /// Hands every entity to `reclaim` and empties the collection.
    pub fn clear<R>(&mut self, reclaim: R)
    where
        R: FnMut(T),
    {
        self.items.drain(..).for_each(reclaim);
    }

    /// Iterator over the live entities.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Mutable iterator over the live entities.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Reports whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for BehaviorCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}
