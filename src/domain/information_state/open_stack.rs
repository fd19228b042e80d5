//! Duplicate-free stacks and insertion-ordered sets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stack that never holds the same element twice.
///
/// Pushing an element that is already present raises it to the top
/// instead of duplicating it. Elements are stored top-first, so the
/// serialized form reads in focus order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpenStack<T> {
    items: Vec<T>,
}

impl<T> Default for OpenStack<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: PartialEq> OpenStack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a stack from top-first elements, dropping later duplicates.
    pub fn from_top_first(items: impl IntoIterator<Item = T>) -> Self {
        let mut stack = Self::new();
        for item in items {
            if !stack.contains(&item) {
                stack.items.push(item);
            }
        }
        stack
    }

    /// Pushes `item`; an equal element already on the stack is raised instead.
    pub fn push(&mut self, item: T) {
        self.raise(item);
    }

    /// Removes any element equal to `item`, then puts `item` on top.
    pub fn raise(&mut self, item: T) {
        self.raise_by(item, |a, b| a == b);
    }

    /// Like [`raise`](Self::raise) but with a caller-supplied equality.
    pub fn raise_by(&mut self, item: T, same: impl Fn(&T, &T) -> bool) {
        self.items.retain(|existing| !same(existing, &item));
        self.items.insert(0, item);
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    pub fn top(&self) -> Option<&T> {
        self.items.first()
    }

    /// The element directly below the top.
    pub fn second(&self) -> Option<&T> {
        self.items.get(1)
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    /// Removes `item` wherever it sits. Returns true if it was present.
    pub fn remove(&mut self, item: &T) -> bool {
        let before = self.items.len();
        self.items.retain(|existing| existing != item);
        self.items.len() != before
    }

    /// Iterates from the top down.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: fmt::Display> fmt::Display for OpenStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, ">")
    }
}

/// A set that remembers insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderedSet<T> {
    items: Vec<T>,
}

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: PartialEq> OrderedSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `item` unless an equal element exists. Returns true if inserted.
    pub fn insert(&mut self, item: T) -> bool {
        if self.items.contains(&item) {
            false
        } else {
            self.items.push(item);
            true
        }
    }

    pub fn remove(&mut self, item: &T) -> bool {
        let before = self.items.len();
        self.items.retain(|existing| existing != item);
        self.items.len() != before
    }

    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.items.retain(keep);
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: PartialEq> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}
