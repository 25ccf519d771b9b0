use crate::entity::Entity;
use im::Vector;

/// Immutable view of a cache at one point in time.
///
/// Items are held in a persistent vector, so cloning a snapshot is O(1) and
/// later cache mutations never show through an existing snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot<E: Clone> {
    pub(super) items: Vector<E>,
    pub(super) total_count: i64,
    pub(super) revision: u64,
}

impl<E: Clone> Default for ListSnapshot<E> {
    fn default() -> Self {
        Self {
            items: Vector::new(),
            total_count: 0,
            revision: 0,
        }
    }
}

impl<E: Entity> ListSnapshot<E> {
    /// Items of the current page, in display order.
    pub fn items(&self) -> &Vector<E> {
        &self.items
    }

    /// Server-side total across all pages, as last reported or adjusted.
    pub fn total_count(&self) -> i64 {
        self.total_count
    }

    /// Number of mutations applied to the owning cache when this was taken.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> im::vector::Iter<'_, E> {
        self.items.iter()
    }

    pub fn get(&self, id: &str) -> Option<&E> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Ids in display order.
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id()).collect()
    }

    pub fn to_vec(&self) -> Vec<E> {
        self.items.iter().cloned().collect()
    }
}
