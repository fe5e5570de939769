//! Identification audit repository implementation.
//!
//! One row per identify call, carrying the provider's structured result and
//! raw payload for later inspection.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use verdant_core::{
    CreateIdentificationRequest, Error, IdentificationRepository, PlantIdentification, Result,
};

const IDENTIFICATION_COLUMNS: &str = "id, user_id, provider, provider_confidence, common_name, \
     scientific_name, family, genus, notes, alternatives, provider_payload, \
     species_id, created_at";

/// PostgreSQL implementation of IdentificationRepository.
#[derive(Clone)]
pub struct PgIdentificationRepository {
    pool: Pool<Postgres>,
}

impl PgIdentificationRepository {
    /// Create a new PgIdentificationRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentificationRepository for PgIdentificationRepository {
    async fn insert(&self, req: CreateIdentificationRequest) -> Result<PlantIdentification> {
        let alternatives = serde_json::to_value(&req.result.alternatives)?;

        let record = sqlx::query_as::<_, PlantIdentification>(&format!(
            "INSERT INTO plant_identifications
                (user_id, provider, provider_confidence, common_name,
                 scientific_name, family, genus, notes, alternatives,
                 provider_payload, species_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {IDENTIFICATION_COLUMNS}"
        ))
        .bind(req.user_id)
        .bind(&req.result.provider)
        .bind(req.result.plant.confidence)
        .bind(&req.result.plant.common_name)
        .bind(&req.result.plant.scientific_name)
        .bind(&req.result.plant.family)
        .bind(&req.result.plant.genus)
        .bind(&req.result.plant.notes)
        .bind(alternatives)
        .bind(&req.result.raw)
        .bind(req.species_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(record)
    }

    async fn list_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<PlantIdentification>> {
        let limit = limit.clamp(1, 100);
        let records = sqlx::query_as::<_, PlantIdentification>(&format!(
            "SELECT {IDENTIFICATION_COLUMNS}
             FROM plant_identifications
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(records)
    }
}
