//! Species repository implementation.
//!
//! The species table is keyed by `scientific_name` (unique natural key).
//! Inserts are conflict-tolerant: two racing inserts for the same name leave
//! exactly one row, and callers re-fetch by name for the assigned identity.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use verdant_core::{Error, NewSpecies, Result, SpeciesPatch, SpeciesRecord, SpeciesRepository};

const SPECIES_COLUMNS: &str = "id, scientific_name, common_name, family, origin, about, \
     water_needs, light_needs, soil, humidity, temperature, \
     care_summary, care_difficulty, watering, sunlight, \
     temperature_range, temperature_notes, soil_type, \
     soil_ph_min, soil_ph_max, soil_mix, care_tips, \
     profile_generated_at, profile_source";

/// PostgreSQL implementation of SpeciesRepository.
#[derive(Clone)]
pub struct PgSpeciesRepository {
    pool: Pool<Postgres>,
}

impl PgSpeciesRepository {
    /// Create a new PgSpeciesRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpeciesRepository for PgSpeciesRepository {
    async fn find_by_scientific_name(&self, name: &str) -> Result<Option<SpeciesRecord>> {
        let record = sqlx::query_as::<_, SpeciesRecord>(&format!(
            "SELECT {SPECIES_COLUMNS} FROM species WHERE scientific_name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SpeciesRecord>> {
        let record = sqlx::query_as::<_, SpeciesRecord>(&format!(
            "SELECT {SPECIES_COLUMNS} FROM species WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(record)
    }

    async fn insert(&self, species: NewSpecies) -> Result<()> {
        // ON CONFLICT DO NOTHING: a concurrent insert for the same name wins
        // the race and this call becomes a no-op. Callers re-fetch by name.
        sqlx::query(
            "INSERT INTO species (scientific_name, common_name, family)
             VALUES ($1, $2, $3)
             ON CONFLICT (scientific_name) DO NOTHING",
        )
        .bind(&species.scientific_name)
        .bind(&species.common_name)
        .bind(&species.family)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    async fn update(&self, id: Uuid, patch: SpeciesPatch) -> Result<()> {
        // Plain optional fields use COALESCE (absent keeps the column);
        // present-null fields carry an explicit set flag so NULL can be
        // written deliberately.
        let result = sqlx::query(
            "UPDATE species SET
                care_summary = COALESCE($1, care_summary),
                care_difficulty = COALESCE($2, care_difficulty),
                watering = COALESCE($3, watering),
                water_needs = COALESCE($4, water_needs),
                sunlight = COALESCE($5, sunlight),
                light_needs = COALESCE($6, light_needs),
                temperature_range = COALESCE($7, temperature_range),
                temperature_notes = COALESCE($8, temperature_notes),
                temperature = COALESCE($9, temperature),
                humidity = COALESCE($10, humidity),
                soil_type = COALESCE($11, soil_type),
                soil = CASE WHEN $12 THEN $13 ELSE soil END,
                soil_ph_min = CASE WHEN $14 THEN $15 ELSE soil_ph_min END,
                soil_ph_max = CASE WHEN $16 THEN $17 ELSE soil_ph_max END,
                soil_mix = CASE WHEN $18 THEN $19 ELSE soil_mix END,
                care_tips = CASE WHEN $20 THEN $21 ELSE care_tips END,
                profile_generated_at = COALESCE($22, profile_generated_at),
                profile_source = COALESCE($23, profile_source)
             WHERE id = $24",
        )
        .bind(&patch.care_summary)
        .bind(patch.care_difficulty.map(|d| d.as_str()))
        .bind(&patch.watering)
        .bind(&patch.water_needs)
        .bind(&patch.sunlight)
        .bind(&patch.light_needs)
        .bind(&patch.temperature_range)
        .bind(&patch.temperature_notes)
        .bind(&patch.temperature)
        .bind(&patch.humidity)
        .bind(&patch.soil_type)
        .bind(patch.soil.is_some())
        .bind(patch.soil.clone().flatten())
        .bind(patch.soil_ph_min.is_some())
        .bind(patch.soil_ph_min.flatten())
        .bind(patch.soil_ph_max.is_some())
        .bind(patch.soil_ph_max.flatten())
        .bind(patch.soil_mix.is_some())
        .bind(patch.soil_mix.clone().flatten())
        .bind(patch.care_tips.is_some())
        .bind(patch.care_tips.clone().flatten())
        .bind(patch.profile_generated_at)
        .bind(&patch.profile_source)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::SpeciesNotFound(id));
        }

        Ok(())
    }
}
