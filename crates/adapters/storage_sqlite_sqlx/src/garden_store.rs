//! `SQLite` implementation of [`GardenRepository`] and [`UnitOfWork`].
//!
//! A garden is one `gardens` row plus its `plants` rows, ordered by
//! `position`. Each write bumps `version`. Updates are guarded by
//! `WHERE id = ? AND version = ?`, so a stale stamp affects no row and
//! fails the whole transaction with a conflict.

use std::future::Future;
use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqliteConnection, SqlitePool};

use gardenhub_app::ports::{Change, ChangeSet, GardenRepository, UnitOfWork, Versioned};
use gardenhub_domain::error::{ConflictError, GardenError};
use gardenhub_domain::garden::{Garden, GardenParts, Plant};
use gardenhub_domain::id::{GardenId, PlantId, UserId};
use gardenhub_domain::time::Timestamp;
use gardenhub_domain::value::{HumidityLevel, PlantType, SurfaceArea};

use crate::error::StorageError;

fn decode<E: std::error::Error + Send + Sync + 'static>(err: E) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}

fn timestamp(value: &str) -> Result<Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|t| t.to_utc())
        .map_err(decode)
}

fn surface_area(value: &str) -> Result<SurfaceArea, sqlx::Error> {
    let decimal = Decimal::from_str(value).map_err(decode)?;
    SurfaceArea::new(decimal).map_err(decode)
}

/// A `gardens` row, without plants.
struct GardenRow {
    parts: GardenParts,
    version: i64,
}

impl GardenRow {
    fn into_versioned(self, plants: Vec<Plant>) -> Versioned<Garden> {
        let mut parts = self.parts;
        parts.plants = plants;
        Versioned::new(Garden::restore(parts), self.version)
    }
}

impl<'r> FromRow<'r, SqliteRow> for GardenRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let owner_id: String = row.try_get("owner_id")?;
        let name: String = row.try_get("name")?;
        let total_surface_area: String = row.try_get("total_surface_area")?;
        let target_humidity_level: i32 = row.try_get("target_humidity_level")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;
        let deleted_at: Option<String> = row.try_get("deleted_at")?;
        let version: i64 = row.try_get("version")?;

        Ok(Self {
            parts: GardenParts {
                id: GardenId::from_str(&id).map_err(decode)?,
                owner_id: UserId::from_str(&owner_id).map_err(decode)?,
                name,
                total_surface_area: surface_area(&total_surface_area)?,
                target_humidity_level: HumidityLevel::new(target_humidity_level)
                    .map_err(decode)?,
                created_at: timestamp(&created_at)?,
                updated_at: timestamp(&updated_at)?,
                deleted_at: deleted_at.as_deref().map(timestamp).transpose()?,
                plants: Vec::new(),
            },
            version,
        })
    }
}

/// Wrapper for converting database rows into domain [`Plant`].
struct PlantRow(Plant);

impl<'r> FromRow<'r, SqliteRow> for PlantRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let species: String = row.try_get("species")?;
        let plant_type: String = row.try_get("type")?;
        let plantation_date: String = row.try_get("plantation_date")?;
        let surface_area_required: String = row.try_get("surface_area_required")?;
        let ideal_humidity_level: i32 = row.try_get("ideal_humidity_level")?;

        Ok(Self(Plant {
            id: PlantId::from_str(&id).map_err(decode)?,
            name,
            species,
            plant_type: PlantType::from_str(&plant_type).map_err(decode)?,
            plantation_date: timestamp(&plantation_date)?,
            surface_area_required: surface_area(&surface_area_required)?,
            ideal_humidity_level: HumidityLevel::new(ideal_humidity_level).map_err(decode)?,
        }))
    }
}

const SELECT_BY_ID: &str = "SELECT id, owner_id, name, total_surface_area, target_humidity_level, created_at, updated_at, deleted_at, version FROM gardens WHERE id = ? AND deleted = 0";
const SELECT_BY_OWNER: &str = "SELECT id, owner_id, name, total_surface_area, target_humidity_level, created_at, updated_at, deleted_at, version FROM gardens WHERE owner_id = ? AND deleted = 0 ORDER BY name, id";
const SELECT_PLANTS: &str = "SELECT id, name, species, type, plantation_date, surface_area_required, ideal_humidity_level FROM plants WHERE garden_id = ? ORDER BY position";
const INSERT_GARDEN: &str = "INSERT INTO gardens (id, owner_id, name, total_surface_area, target_humidity_level, created_at, updated_at, deleted, deleted_at, version) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1)";
const UPDATE_GARDEN: &str = "UPDATE gardens SET name = ?, total_surface_area = ?, target_humidity_level = ?, updated_at = ?, deleted = ?, deleted_at = ?, version = version + 1 WHERE id = ? AND version = ?";
const DELETE_PLANTS: &str = "DELETE FROM plants WHERE garden_id = ?";
const INSERT_PLANT: &str = "INSERT INTO plants (id, garden_id, position, name, species, type, plantation_date, surface_area_required, ideal_humidity_level) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";

/// Owned copy of a staged [`Change`], so the commit future borrows nothing
/// from the caller.
struct StagedWrite {
    parts: GardenParts,
    /// `None` for an insert.
    expected_version: Option<i64>,
    replace_plants: bool,
}

impl From<&Change<'_>> for StagedWrite {
    fn from(change: &Change<'_>) -> Self {
        let parts = change.garden().snapshot();
        match *change {
            Change::Insert(_) => Self {
                parts,
                expected_version: None,
                replace_plants: true,
            },
            Change::Update {
                expected_version, ..
            }
            | Change::Remove {
                expected_version, ..
            } => Self {
                parts,
                expected_version: Some(expected_version),
                replace_plants: false,
            },
            Change::UpdateWithPlants {
                expected_version, ..
            } => Self {
                parts,
                expected_version: Some(expected_version),
                replace_plants: true,
            },
        }
    }
}

async fn insert_plants(
    conn: &mut SqliteConnection,
    parts: &GardenParts,
) -> Result<(), StorageError> {
    for (position, plant) in (0_i64..).zip(&parts.plants) {
        sqlx::query(INSERT_PLANT)
            .bind(plant.id.to_string())
            .bind(parts.id.to_string())
            .bind(position)
            .bind(&plant.name)
            .bind(&plant.species)
            .bind(plant.plant_type.as_str())
            .bind(plant.plantation_date.to_rfc3339())
            .bind(plant.surface_area_required.value().to_string())
            .bind(plant.ideal_humidity_level.value())
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn apply(conn: &mut SqliteConnection, write: &StagedWrite) -> Result<(), GardenError> {
    let parts = &write.parts;
    let Some(expected_version) = write.expected_version else {
        sqlx::query(INSERT_GARDEN)
            .bind(parts.id.to_string())
            .bind(parts.owner_id.to_string())
            .bind(&parts.name)
            .bind(parts.total_surface_area.value().to_string())
            .bind(parts.target_humidity_level.value())
            .bind(parts.created_at.to_rfc3339())
            .bind(parts.updated_at.to_rfc3339())
            .bind(parts.deleted_at.is_some())
            .bind(parts.deleted_at.map(|t| t.to_rfc3339()))
            .execute(&mut *conn)
            .await
            .map_err(StorageError::from)?;
        insert_plants(conn, parts).await?;
        return Ok(());
    };

    let result = sqlx::query(UPDATE_GARDEN)
        .bind(&parts.name)
        .bind(parts.total_surface_area.value().to_string())
        .bind(parts.target_humidity_level.value())
        .bind(parts.updated_at.to_rfc3339())
        .bind(parts.deleted_at.is_some())
        .bind(parts.deleted_at.map(|t| t.to_rfc3339()))
        .bind(parts.id.to_string())
        .bind(expected_version)
        .execute(&mut *conn)
        .await
        .map_err(StorageError::from)?;
    if result.rows_affected() == 0 {
        return Err(ConflictError {
            entity: "Garden",
            id: parts.id.to_string(),
            expected_version,
        }
        .into());
    }

    if write.replace_plants {
        sqlx::query(DELETE_PLANTS)
            .bind(parts.id.to_string())
            .execute(&mut *conn)
            .await
            .map_err(StorageError::from)?;
        insert_plants(conn, parts).await?;
    }
    Ok(())
}

/// `SQLite`-backed garden store.
#[derive(Clone)]
pub struct SqliteGardenStore {
    pool: SqlitePool,
}

impl SqliteGardenStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn load(
        pool: SqlitePool,
        id: GardenId,
        with_plants: bool,
    ) -> Result<Option<Versioned<Garden>>, GardenError> {
        let mut conn = pool.acquire().await.map_err(StorageError::from)?;
        let row: Option<GardenRow> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&mut *conn)
            .await
            .map_err(StorageError::from)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let plants = if with_plants {
            let rows: Vec<PlantRow> = sqlx::query_as(SELECT_PLANTS)
                .bind(id.to_string())
                .fetch_all(&mut *conn)
                .await
                .map_err(StorageError::from)?;
            rows.into_iter().map(|p| p.0).collect()
        } else {
            Vec::new()
        };
        Ok(Some(row.into_versioned(plants)))
    }
}

impl GardenRepository for SqliteGardenStore {
    fn get_by_id(
        &self,
        id: GardenId,
    ) -> impl Future<Output = Result<Option<Versioned<Garden>>, GardenError>> + Send {
        Self::load(self.pool.clone(), id, false)
    }

    fn get_by_id_with_plants(
        &self,
        id: GardenId,
    ) -> impl Future<Output = Result<Option<Versioned<Garden>>, GardenError>> + Send {
        Self::load(self.pool.clone(), id, true)
    }

    fn list_by_owner(
        &self,
        owner_id: UserId,
    ) -> impl Future<Output = Result<Vec<Garden>, GardenError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<GardenRow> = sqlx::query_as(SELECT_BY_OWNER)
                .bind(owner_id.to_string())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows
                .into_iter()
                .map(|row| row.into_versioned(Vec::new()).into_inner())
                .collect())
        }
    }
}

impl UnitOfWork for SqliteGardenStore {
    fn commit(
        &self,
        changes: ChangeSet<'_>,
    ) -> impl Future<Output = Result<(), GardenError>> + Send {
        let pool = self.pool.clone();
        let writes: Vec<StagedWrite> = changes.changes().iter().map(StagedWrite::from).collect();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;
            for write in &writes {
                // dropping the transaction on error rolls everything back
                apply(&mut *tx, write).await?;
            }
            tx.commit().await.map_err(StorageError::from)?;
            tracing::debug!(writes = writes.len(), "unit of work committed");
            Ok(())
        }
    }
}
