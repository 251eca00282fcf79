//! Storage port: garden persistence gateway and unit of work.
//!
//! Reads never return soft-deleted gardens. Writes are staged in a
//! [`ChangeSet`] and applied atomically by [`UnitOfWork::commit`], which
//! checks each staged version stamp against the stored one.

use std::future::Future;

use gardenhub_domain::error::GardenError;
use gardenhub_domain::garden::Garden;
use gardenhub_domain::id::{GardenId, UserId};

/// A loaded value paired with the version stamp it was read at.
#[derive(Debug)]
pub struct Versioned<T> {
    pub value: T,
    pub version: i64,
}

impl<T> Versioned<T> {
    #[must_use]
    pub fn new(value: T, version: i64) -> Self {
        Self { value, version }
    }

    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Read side of the persistence gateway.
pub trait GardenRepository {
    /// Load a garden without its plants.
    fn get_by_id(
        &self,
        id: GardenId,
    ) -> impl Future<Output = Result<Option<Versioned<Garden>>, GardenError>> + Send;

    /// Load a garden together with its plants, in insertion order.
    fn get_by_id_with_plants(
        &self,
        id: GardenId,
    ) -> impl Future<Output = Result<Option<Versioned<Garden>>, GardenError>> + Send;

    /// List an owner's gardens, without plants, ordered by name.
    fn list_by_owner(
        &self,
        owner_id: UserId,
    ) -> impl Future<Output = Result<Vec<Garden>, GardenError>> + Send;
}

impl<T: GardenRepository + Send + Sync> GardenRepository for std::sync::Arc<T> {
    fn get_by_id(
        &self,
        id: GardenId,
    ) -> impl Future<Output = Result<Option<Versioned<Garden>>, GardenError>> + Send {
        (**self).get_by_id(id)
    }

    fn get_by_id_with_plants(
        &self,
        id: GardenId,
    ) -> impl Future<Output = Result<Option<Versioned<Garden>>, GardenError>> + Send {
        (**self).get_by_id_with_plants(id)
    }

    fn list_by_owner(
        &self,
        owner_id: UserId,
    ) -> impl Future<Output = Result<Vec<Garden>, GardenError>> + Send {
        (**self).list_by_owner(owner_id)
    }
}

/// One staged write.
#[derive(Debug, Clone, Copy)]
pub enum Change<'a> {
    /// Store a brand new garden and its plants at version 1.
    Insert(&'a Garden),
    /// Overwrite the garden row only.
    Update {
        garden: &'a Garden,
        expected_version: i64,
    },
    /// Overwrite the garden row and replace its plant rows.
    UpdateWithPlants {
        garden: &'a Garden,
        expected_version: i64,
    },
    /// Record the deletion marker; the row itself is kept.
    Remove {
        garden: &'a Garden,
        expected_version: i64,
    },
}

impl<'a> Change<'a> {
    #[must_use]
    pub fn garden(&self) -> &'a Garden {
        match *self {
            Change::Insert(garden)
            | Change::Update { garden, .. }
            | Change::UpdateWithPlants { garden, .. }
            | Change::Remove { garden, .. } => garden,
        }
    }
}

/// Ordered set of writes committed together.
#[derive(Debug, Default)]
pub struct ChangeSet<'a> {
    changes: Vec<Change<'a>>,
}

impl<'a> ChangeSet<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn insert(mut self, garden: &'a Garden) -> Self {
        self.changes.push(Change::Insert(garden));
        self
    }

    #[must_use]
    pub fn update(mut self, garden: &'a Garden, expected_version: i64) -> Self {
        self.changes.push(Change::Update {
            garden,
            expected_version,
        });
        self
    }

    #[must_use]
    pub fn update_with_plants(mut self, garden: &'a Garden, expected_version: i64) -> Self {
        self.changes.push(Change::UpdateWithPlants {
            garden,
            expected_version,
        });
        self
    }

    #[must_use]
    pub fn remove(mut self, garden: &'a Garden, expected_version: i64) -> Self {
        self.changes.push(Change::Remove {
            garden,
            expected_version,
        });
        self
    }

    #[must_use]
    pub fn changes(&self) -> &[Change<'a>] {
        &self.changes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Atomic write side of the persistence gateway.
pub trait UnitOfWork {
    /// Apply every staged change or none of them.
    ///
    /// A stale `expected_version` fails the whole commit with
    /// [`GardenError::Conflict`].
    fn commit(
        &self,
        changes: ChangeSet<'_>,
    ) -> impl Future<Output = Result<(), GardenError>> + Send;
}

impl<T: UnitOfWork + Send + Sync> UnitOfWork for std::sync::Arc<T> {
    fn commit(
        &self,
        changes: ChangeSet<'_>,
    ) -> impl Future<Output = Result<(), GardenError>> + Send {
        (**self).commit(changes)
    }
}
