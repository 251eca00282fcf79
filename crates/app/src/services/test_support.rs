//! In-memory port doubles shared by the service tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use gardenhub_domain::error::{ConflictError, GardenError};
use gardenhub_domain::garden::{Garden, GardenParts};
use gardenhub_domain::id::{GardenId, UserId};

use crate::ports::{Change, ChangeSet, GardenRepository, UnitOfWork, Versioned};

/// Stores garden snapshots with a version stamp, mimicking the SQL adapter:
/// soft-deleted rows are hidden and every write bumps the version.
#[derive(Default)]
pub(crate) struct InMemoryGardenStore {
    rows: Mutex<HashMap<GardenId, (GardenParts, i64)>>,
}

impl InMemoryGardenStore {
    pub(crate) fn version_of(&self, id: GardenId) -> Option<i64> {
        self.rows.lock().unwrap().get(&id).map(|(_, v)| *v)
    }

    pub(crate) fn stored(&self, id: GardenId) -> Option<GardenParts> {
        self.rows.lock().unwrap().get(&id).map(|(p, _)| p.clone())
    }

    /// Bump a row's version as a concurrent writer would.
    pub(crate) fn touch(&self, id: GardenId) {
        if let Some((_, version)) = self.rows.lock().unwrap().get_mut(&id) {
            *version += 1;
        }
    }

    fn load(&self, id: GardenId, with_plants: bool) -> Option<Versioned<Garden>> {
        let rows = self.rows.lock().unwrap();
        let (parts, version) = rows.get(&id).filter(|(p, _)| p.deleted_at.is_none())?;
        let mut parts = parts.clone();
        if !with_plants {
            parts.plants.clear();
        }
        Some(Versioned::new(Garden::restore(parts), *version))
    }
}

impl GardenRepository for InMemoryGardenStore {
    fn get_by_id(
        &self,
        id: GardenId,
    ) -> impl Future<Output = Result<Option<Versioned<Garden>>, GardenError>> + Send {
        let result = self.load(id, false);
        async { Ok(result) }
    }

    fn get_by_id_with_plants(
        &self,
        id: GardenId,
    ) -> impl Future<Output = Result<Option<Versioned<Garden>>, GardenError>> + Send {
        let result = self.load(id, true);
        async { Ok(result) }
    }

    fn list_by_owner(
        &self,
        owner_id: UserId,
    ) -> impl Future<Output = Result<Vec<Garden>, GardenError>> + Send {
        let rows = self.rows.lock().unwrap();
        let mut gardens: Vec<Garden> = rows
            .values()
            .filter(|(p, _)| p.owner_id == owner_id && p.deleted_at.is_none())
            .map(|(p, _)| {
                let mut parts = p.clone();
                parts.plants.clear();
                Garden::restore(parts)
            })
            .collect();
        gardens.sort_by(|a, b| a.name().cmp(b.name()));
        async { Ok(gardens) }
    }
}

impl UnitOfWork for InMemoryGardenStore {
    fn commit(
        &self,
        changes: ChangeSet<'_>,
    ) -> impl Future<Output = Result<(), GardenError>> + Send {
        let mut rows = self.rows.lock().unwrap();
        let result = apply(&mut rows, &changes);
        async { result }
    }
}

fn apply(
    rows: &mut HashMap<GardenId, (GardenParts, i64)>,
    changes: &ChangeSet<'_>,
) -> Result<(), GardenError> {
    for change in changes.changes() {
        let expected = match change {
            Change::Insert(_) => continue,
            Change::Update {
                expected_version, ..
            }
            | Change::UpdateWithPlants {
                expected_version, ..
            }
            | Change::Remove {
                expected_version, ..
            } => *expected_version,
        };
        let id = change.garden().id();
        if rows.get(&id).map(|(_, v)| *v) != Some(expected) {
            return Err(ConflictError {
                entity: "Garden",
                id: id.to_string(),
                expected_version: expected,
            }
            .into());
        }
    }

    for change in changes.changes() {
        let mut parts = change.garden().snapshot();
        let id = parts.id;
        match change {
            Change::Insert(_) => {
                rows.insert(id, (parts, 1));
            }
            Change::Update { .. } | Change::Remove { .. } => {
                let (stored, version) = rows.get_mut(&id).unwrap();
                parts.plants = std::mem::take(&mut stored.plants);
                *stored = parts;
                *version += 1;
            }
            Change::UpdateWithPlants { .. } => {
                let (stored, version) = rows.get_mut(&id).unwrap();
                *stored = parts;
                *version += 1;
            }
        }
    }
    Ok(())
}
