//! In-memory collections of records keyed by identifier.
//!
//! The [`Registry`] knows nothing about the filesystem. It owns its records
//! exclusively and hands out identifiers for new ones.

use std::collections::{BTreeMap, btree_map::Entry};

use crate::domain::{RecordId, RecordKind};

/// A record that lives in a [`Registry`].
pub trait Record {
    /// The kind of identifier records of this type carry.
    const KIND: RecordKind;

    /// The record's identifier.
    fn id(&self) -> RecordId;
}

/// An ordered collection of records of one kind.
///
/// Records iterate in identifier order, which is also creation order.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry<T> {
    records: BTreeMap<RecordId, T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }
}

impl<T: Record> Registry<T> {
    /// Builds a registry from loaded records.
    ///
    /// Records with an identifier of the wrong kind are dropped. If two
    /// records share an identifier, the later one wins.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = T>) -> Self {
        let mut registry = Self::default();
        for record in records {
            let id = record.id();
            if id.kind() != T::KIND {
                tracing::warn!("Ignoring record {id}: expected a {:?} identifier", T::KIND);
                continue;
            }
            if registry.records.insert(id, record).is_some() {
                tracing::warn!("Duplicate record {id}; keeping the last one");
            }
        }
        registry
    }

    /// The identifier the next inserted record will receive.
    #[must_use]
    pub fn next_id(&self) -> RecordId {
        RecordId::next(T::KIND, self.records.keys())
    }

    /// Creates a record with the next identifier and stores it.
    ///
    /// Returns `None`, without calling `build`, if the largest identifier is
    /// already taken and no new one can be issued.
    pub fn insert_with(&mut self, build: impl FnOnce(RecordId) -> T) -> Option<&mut T> {
        let id = self.next_id();
        match self.records.entry(id) {
            Entry::Vacant(entry) => Some(entry.insert(build(id))),
            Entry::Occupied(_) => None,
        }
    }

    /// Looks up a record.
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.records.get(&id)
    }

    /// Looks up a record for modification.
    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut T> {
        self.records.get_mut(&id)
    }

    /// Whether a record with this identifier exists.
    #[must_use]
    pub fn contains(&self, id: RecordId) -> bool {
        self.records.contains_key(&id)
    }

    /// Iterates over the records in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.values()
    }

    /// The identifiers of all records, in order.
    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.records.keys().copied()
    }

    /// The number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
