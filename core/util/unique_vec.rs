use fxhash::FxHashSet;
use std::hash::Hash;

/// An insertion-ordered vector that silently drops values it has already seen.
///
#[derive(Debug, Clone)]
pub struct UniqueVec<T> {
    items: Vec<T>,
    seen: FxHashSet<T>,
}

impl<T> Default for UniqueVec<T> {
    fn default() -> Self {
        Self {
            items: vec![],
            seen: FxHashSet::default(),
        }
    }
}

impl<T> UniqueVec<T>
where
    T: Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the value was not present before.
    pub fn push(&mut self, value: T) -> bool {
        if self.seen.contains(&value) {
            return false;
        }
        self.seen.insert(value.clone());
        self.items.push(value);
        true
    }

    pub fn extend<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        for value in values {
            self.push(value);
        }
    }

    pub fn contains(&self, value: &T) -> bool {
        self.seen.contains(value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}
