//! Owned-plant repository implementation.
//!
//! Ownership checks happen in the handlers; this layer fetches and mutates
//! rows by id and always returns the species summary alongside a plant.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use verdant_core::{
    CreatePlantRequest, Error, Plant, PlantPatch, PlantRepository, PlantWithSpecies, Result,
    SpeciesSummary,
};

const PLANT_WITH_SPECIES_QUERY: &str = "SELECT p.id, p.nickname, p.image_url, p.created_at,
            s.id AS species_id, s.common_name, s.scientific_name
     FROM plants p
     JOIN species s ON s.id = p.species_id";

fn map_plant_with_species(row: PgRow) -> PlantWithSpecies {
    PlantWithSpecies {
        id: row.get("id"),
        nickname: row.get("nickname"),
        image_url: row.get("image_url"),
        created_at: row.get("created_at"),
        species: SpeciesSummary {
            id: row.get("species_id"),
            common_name: row.get("common_name"),
            scientific_name: row.get("scientific_name"),
        },
    }
}

/// PostgreSQL implementation of PlantRepository.
#[derive(Clone)]
pub struct PgPlantRepository {
    pool: Pool<Postgres>,
}

impl PgPlantRepository {
    /// Create a new PgPlantRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlantRepository for PgPlantRepository {
    async fn insert(&self, req: CreatePlantRequest) -> Result<PlantWithSpecies> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO plants (owner_id, species_id, nickname, image_url)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(req.owner_id)
        .bind(req.species_id)
        .bind(&req.nickname)
        .bind(&req.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        self.fetch_with_species(id)
            .await?
            .ok_or(Error::PlantNotFound(id))
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Plant>> {
        let plant = sqlx::query_as::<_, Plant>(
            "SELECT id, owner_id, species_id, nickname, image_url, created_at
             FROM plants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(plant)
    }

    async fn fetch_with_species(&self, id: Uuid) -> Result<Option<PlantWithSpecies>> {
        let row = sqlx::query(&format!("{PLANT_WITH_SPECIES_QUERY} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(map_plant_with_species))
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<PlantWithSpecies>> {
        let rows = sqlx::query(&format!(
            "{PLANT_WITH_SPECIES_QUERY} WHERE p.owner_id = $1 ORDER BY p.created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_plant_with_species).collect())
    }

    async fn update(&self, id: Uuid, patch: PlantPatch) -> Result<PlantWithSpecies> {
        let result = sqlx::query(
            "UPDATE plants SET
                nickname = CASE WHEN $1 THEN $2 ELSE nickname END,
                image_url = CASE WHEN $3 THEN $4 ELSE image_url END
             WHERE id = $5",
        )
        .bind(patch.nickname.is_some())
        .bind(patch.nickname.flatten())
        .bind(patch.image_url.is_some())
        .bind(patch.image_url.flatten())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::PlantNotFound(id));
        }

        self.fetch_with_species(id)
            .await?
            .ok_or(Error::PlantNotFound(id))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM plants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::PlantNotFound(id));
        }

        Ok(())
    }
}
