//! Species profile reconciliation.
//!
//! Given an identification result, ensures a durable species record exists
//! and has a complete care profile: lazy-population on read, generating and
//! persisting a missing profile at most once per call. A record that already
//! satisfies the completeness invariant is returned untouched, so the
//! external generator is called at most once per species per incompleteness
//! episode.
//!
//! The read-check-generate-write sequence holds no lock or transaction.
//! Racing inserts for one scientific name collapse to a single row via the
//! store's unique constraint; racing generations for one incomplete record
//! each write the full patch and the last writer wins. That duplicate
//! generation is a cost, not a correctness problem.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info};

use verdant_core::{
    is_profile_complete, sanitize_text, sanitize_text_list, CareProfile, CareProfileBackend,
    CareProfileRequest, IdentificationResult, NewSpecies, Result, SpeciesPatch, SpeciesRecord,
    SpeciesRepository, FALLBACK_SOIL_TYPE,
};

/// Reconciles species records against the completeness invariant.
pub struct SpeciesProfileService {
    species: Arc<dyn SpeciesRepository>,
    generator: Arc<dyn CareProfileBackend>,
}

/// Build the persisted patch from a sanitized generator output.
///
/// Every legacy/structured field pair is written together so older display
/// surfaces stay consistent with the structured fields. List fields that
/// sanitize to nothing are written as explicit NULL.
fn build_patch(profile: &CareProfile, source_tag: &str) -> SpeciesPatch {
    let soil_type = sanitize_text(Some(&profile.soil.soil_type));
    let soil_mix = sanitize_text_list(&profile.soil.mix);
    let care_tips = sanitize_text_list(&profile.tips);

    SpeciesPatch {
        care_summary: Some(profile.summary.clone()),
        care_difficulty: Some(profile.difficulty),
        watering: Some(profile.watering.description.clone()),
        water_needs: Some(profile.watering.headline.clone()),
        sunlight: Some(profile.sunlight.description.clone()),
        light_needs: Some(profile.sunlight.headline.clone()),
        temperature_range: Some(profile.temperature.range_f.clone()),
        temperature_notes: Some(profile.temperature.description.clone()),
        temperature: Some(profile.temperature.range_f.clone()),
        humidity: Some(profile.humidity.headline.clone()),
        soil_type: Some(
            soil_type
                .clone()
                .unwrap_or_else(|| FALLBACK_SOIL_TYPE.to_string()),
        ),
        soil: Some(soil_type),
        soil_ph_min: Some(profile.soil.ph_range.min),
        soil_ph_max: Some(profile.soil.ph_range.max),
        soil_mix: Some(if soil_mix.is_empty() {
            None
        } else {
            Some(soil_mix)
        }),
        care_tips: Some(if care_tips.is_empty() {
            None
        } else {
            Some(care_tips)
        }),
        profile_generated_at: Some(Utc::now()),
        profile_source: Some(source_tag.to_string()),
    }
}

impl SpeciesProfileService {
    /// Create a new service over the given store and generator.
    pub fn new(species: Arc<dyn SpeciesRepository>, generator: Arc<dyn CareProfileBackend>) -> Self {
        Self { species, generator }
    }

    /// Ensure a species record exists for this identification and carries a
    /// complete care profile.
    ///
    /// Returns `Ok(None)` when the identification has no scientific name
    /// (an unidentified plant is never persisted or profiled) and when a
    /// re-fetch after insert/update unexpectedly finds nothing — the latter
    /// is a soft persistence anomaly a later call can retry. Generator and
    /// store errors propagate untranslated.
    pub async fn ensure_species_profile(
        &self,
        identification: &IdentificationResult,
    ) -> Result<Option<SpeciesRecord>> {
        let Some(scientific_name) = identification.plant.scientific_name.as_deref() else {
            return Ok(None);
        };

        let start = Instant::now();

        let mut record = self.species.find_by_scientific_name(scientific_name).await?;
        if record.is_none() {
            self.species
                .insert(NewSpecies {
                    scientific_name: scientific_name.to_string(),
                    common_name: identification.plant.common_name.clone(),
                    family: identification.plant.family.clone(),
                })
                .await?;
            // The insert does not return the row; re-fetch for the assigned id.
            record = self.species.find_by_scientific_name(scientific_name).await?;
        }

        let Some(record) = record else {
            return Ok(None);
        };

        if is_profile_complete(&record) {
            debug!(
                subsystem = "api",
                component = "species_profile",
                op = "ensure_profile",
                species_id = %record.id,
                scientific_name = scientific_name,
                "Profile already complete, skipping generation"
            );
            return Ok(Some(record));
        }

        // Prefer the freshest identification descriptors over whatever was
        // stored at creation time.
        let request = CareProfileRequest::from_identification(identification);
        let profile = self.generator.generate(&request).await?;

        let patch = build_patch(&profile, self.generator.source_tag());
        self.species.update(record.id, patch).await?;

        info!(
            subsystem = "api",
            component = "species_profile",
            op = "ensure_profile",
            species_id = %record.id,
            scientific_name = scientific_name,
            duration_ms = start.elapsed().as_millis() as u64,
            "Care profile generated and persisted"
        );

        Ok(self.species.find_by_scientific_name(scientific_name).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use uuid::Uuid;
    use verdant_core::{CareAspect, CareDifficulty, PhRange, SoilGuidance, TemperatureGuidance};
    use verdant_inference::mock::{sample_identification, MockCareProfileBackend};

    /// In-memory species store with the same conflict and patch semantics
    /// as the Postgres repository.
    #[derive(Default)]
    struct MemorySpeciesRepository {
        rows: Mutex<Vec<SpeciesRecord>>,
        /// Simulate a store that loses inserts (re-fetch anomaly).
        drop_inserts: bool,
    }

    impl MemorySpeciesRepository {
        fn empty_record(id: Uuid, species: &NewSpecies) -> SpeciesRecord {
            SpeciesRecord {
                id,
                scientific_name: Some(species.scientific_name.clone()),
                common_name: species.common_name.clone(),
                family: species.family.clone(),
                origin: None,
                about: None,
                water_needs: None,
                light_needs: None,
                soil: None,
                humidity: None,
                temperature: None,
                care_summary: None,
                care_difficulty: None,
                watering: None,
                sunlight: None,
                temperature_range: None,
                temperature_notes: None,
                soil_type: None,
                soil_ph_min: None,
                soil_ph_max: None,
                soil_mix: None,
                care_tips: None,
                profile_generated_at: None,
                profile_source: None,
            }
        }

        fn seed(&self, record: SpeciesRecord) {
            self.rows.lock().unwrap().push(record);
        }
    }

    #[async_trait::async_trait]
    impl SpeciesRepository for MemorySpeciesRepository {
        async fn find_by_scientific_name(&self, name: &str) -> Result<Option<SpeciesRecord>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.scientific_name.as_deref() == Some(name))
                .cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<SpeciesRecord>> {
            Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
        }

        async fn insert(&self, species: NewSpecies) -> Result<()> {
            if self.drop_inserts {
                return Ok(());
            }
            let mut rows = self.rows.lock().unwrap();
            if rows
                .iter()
                .any(|r| r.scientific_name.as_deref() == Some(&species.scientific_name))
            {
                return Ok(());
            }
            let record = Self::empty_record(Uuid::new_v4(), &species);
            rows.push(record);
            Ok(())
        }

        async fn update(&self, id: Uuid, patch: SpeciesPatch) -> Result<()> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(verdant_core::Error::SpeciesNotFound(id))?;

            if let Some(v) = patch.care_summary {
                row.care_summary = Some(v);
            }
            if let Some(v) = patch.care_difficulty {
                row.care_difficulty = Some(v.as_str().to_string());
            }
            if let Some(v) = patch.watering {
                row.watering = Some(v);
            }
            if let Some(v) = patch.water_needs {
                row.water_needs = Some(v);
            }
            if let Some(v) = patch.sunlight {
                row.sunlight = Some(v);
            }
            if let Some(v) = patch.light_needs {
                row.light_needs = Some(v);
            }
            if let Some(v) = patch.temperature_range {
                row.temperature_range = Some(v);
            }
            if let Some(v) = patch.temperature_notes {
                row.temperature_notes = Some(v);
            }
            if let Some(v) = patch.temperature {
                row.temperature = Some(v);
            }
            if let Some(v) = patch.humidity {
                row.humidity = Some(v);
            }
            if let Some(v) = patch.soil_type {
                row.soil_type = Some(v);
            }
            if let Some(v) = patch.soil {
                row.soil = v;
            }
            if let Some(v) = patch.soil_ph_min {
                row.soil_ph_min = v;
            }
            if let Some(v) = patch.soil_ph_max {
                row.soil_ph_max = v;
            }
            if let Some(v) = patch.soil_mix {
                row.soil_mix = v;
            }
            if let Some(v) = patch.care_tips {
                row.care_tips = v;
            }
            if let Some(v) = patch.profile_generated_at {
                row.profile_generated_at = Some(v);
            }
            if let Some(v) = patch.profile_source {
                row.profile_source = Some(v);
            }
            Ok(())
        }
    }

    fn service_with(
        repo: Arc<MemorySpeciesRepository>,
        generator: MockCareProfileBackend,
    ) -> SpeciesProfileService {
        SpeciesProfileService::new(repo, Arc::new(generator))
    }

    #[tokio::test]
    async fn test_no_scientific_name_short_circuits() {
        let repo = Arc::new(MemorySpeciesRepository::default());
        let generator = MockCareProfileBackend::new();
        let service = service_with(repo.clone(), generator.clone());

        let result = service
            .ensure_species_profile(&sample_identification(None))
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(generator.call_count(), 0);
        assert!(repo.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_new_species_is_inserted_and_profiled() {
        let repo = Arc::new(MemorySpeciesRepository::default());
        let generator = MockCareProfileBackend::new();
        let service = service_with(repo.clone(), generator.clone());

        let record = service
            .ensure_species_profile(&sample_identification(Some("Epipremnum aureum")))
            .await
            .unwrap()
            .expect("record should exist after reconciliation");

        assert_eq!(record.scientific_name.as_deref(), Some("Epipremnum aureum"));
        assert_eq!(record.common_name.as_deref(), Some("Pothos"));
        assert!(is_profile_complete(&record));
        assert_eq!(record.profile_source.as_deref(), Some("openai"));
        assert!(record.profile_generated_at.is_some());
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_complete_record_skips_generation() {
        let repo = Arc::new(MemorySpeciesRepository::default());
        let generator = MockCareProfileBackend::new();
        let service = service_with(repo.clone(), generator.clone());
        let identification = sample_identification(Some("Epipremnum aureum"));

        // First call populates; second must not touch the generator.
        let first = service
            .ensure_species_profile(&identification)
            .await
            .unwrap()
            .unwrap();
        let second = service
            .ensure_species_profile(&identification)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.profile_generated_at, second.profile_generated_at);
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_placeholder_fields_trigger_regeneration() {
        let repo = Arc::new(MemorySpeciesRepository::default());
        let mut seeded = MemorySpeciesRepository::empty_record(
            Uuid::new_v4(),
            &NewSpecies {
                scientific_name: "Epipremnum aureum".to_string(),
                common_name: Some("Pothos".to_string()),
                family: Some("Araceae".to_string()),
            },
        );
        // All required fields present, one of them a placeholder.
        seeded.care_summary = Some("string".to_string());
        seeded.care_difficulty = Some("Easy".to_string());
        seeded.watering = Some("Weekly".to_string());
        seeded.sunlight = Some("Bright indirect".to_string());
        seeded.temperature_range = Some("65-85°F".to_string());
        seeded.temperature_notes = Some("Keep warm".to_string());
        seeded.soil_type = Some("Well-draining mix".to_string());
        repo.seed(seeded);

        let generator = MockCareProfileBackend::new();
        let service = service_with(repo.clone(), generator.clone());

        let record = service
            .ensure_species_profile(&sample_identification(Some("Epipremnum aureum")))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(generator.call_count(), 1);
        assert!(is_profile_complete(&record));
        assert_ne!(record.care_summary.as_deref(), Some("string"));
    }

    #[tokio::test]
    async fn test_generator_failure_propagates() {
        let repo = Arc::new(MemorySpeciesRepository::default());
        let generator = MockCareProfileBackend::new().with_failure("model unavailable");
        let service = service_with(repo.clone(), generator.clone());

        let err = service
            .ensure_species_profile(&sample_identification(Some("Epipremnum aureum")))
            .await
            .unwrap_err();

        assert!(matches!(err, verdant_core::Error::Generation(_)));
        // The bare row was still inserted; a later call can finish the job.
        assert_eq!(repo.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_lost_insert_is_soft_failure() {
        let repo = Arc::new(MemorySpeciesRepository {
            drop_inserts: true,
            ..Default::default()
        });
        let generator = MockCareProfileBackend::new();
        let service = service_with(repo.clone(), generator.clone());

        let result = service
            .ensure_species_profile(&sample_identification(Some("Epipremnum aureum")))
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generator_receives_identification_descriptors() {
        let repo = Arc::new(MemorySpeciesRepository::default());
        let generator = MockCareProfileBackend::new();
        let service = service_with(repo.clone(), generator.clone());

        service
            .ensure_species_profile(&sample_identification(Some("Epipremnum aureum")))
            .await
            .unwrap();

        let calls = generator.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].scientific_name.as_deref(), Some("Epipremnum aureum"));
        assert_eq!(calls[0].genus.as_deref(), Some("Epipremnum"));
    }

    fn profile_with(soil_type: &str, mix: Vec<&str>, tips: Vec<&str>) -> CareProfile {
        CareProfile {
            summary: "A forgiving trailing vine.".to_string(),
            difficulty: CareDifficulty::Easy,
            watering: CareAspect {
                headline: "Every 1-2 weeks".to_string(),
                description: "Water when the top inch is dry.".to_string(),
            },
            sunlight: CareAspect {
                headline: "Bright indirect".to_string(),
                description: "Avoid harsh direct sun.".to_string(),
            },
            temperature: TemperatureGuidance {
                range_f: "65-85°F (18-29°C)".to_string(),
                description: "Keep above 55°F.".to_string(),
            },
            humidity: CareAspect {
                headline: "Average".to_string(),
                description: "Ordinary rooms are fine.".to_string(),
            },
            soil: SoilGuidance {
                soil_type: soil_type.to_string(),
                ph_range: PhRange {
                    min: Some(6.1),
                    max: Some(6.8),
                },
                mix: mix.into_iter().map(String::from).collect(),
            },
            tips: tips.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn test_build_patch_writes_legacy_and_structured_pairs() {
        let profile = profile_with("Aroid mix", vec!["bark"], vec!["Rotate monthly."]);
        let patch = build_patch(&profile, "openai");

        assert_eq!(patch.watering.as_deref(), Some("Water when the top inch is dry."));
        assert_eq!(patch.water_needs.as_deref(), Some("Every 1-2 weeks"));
        assert_eq!(patch.sunlight.as_deref(), Some("Avoid harsh direct sun."));
        assert_eq!(patch.light_needs.as_deref(), Some("Bright indirect"));
        assert_eq!(patch.temperature_range.as_deref(), Some("65-85°F (18-29°C)"));
        assert_eq!(patch.temperature.as_deref(), Some("65-85°F (18-29°C)"));
        assert_eq!(patch.soil_type.as_deref(), Some("Aroid mix"));
        assert_eq!(patch.soil, Some(Some("Aroid mix".to_string())));
        assert_eq!(patch.profile_source.as_deref(), Some("openai"));
        assert!(patch.profile_generated_at.is_some());
    }

    #[test]
    fn test_build_patch_scrubs_placeholder_list_entries() {
        let profile = profile_with(
            "Aroid mix",
            vec!["perlite", "String", "n/a", "  bark "],
            vec!["unknown", "Trim leggy vines."],
        );
        let patch = build_patch(&profile, "openai");

        assert_eq!(
            patch.soil_mix,
            Some(Some(vec!["perlite".to_string(), "bark".to_string()]))
        );
        assert_eq!(
            patch.care_tips,
            Some(Some(vec!["Trim leggy vines.".to_string()]))
        );
    }

    #[test]
    fn test_build_patch_nulls_lists_when_nothing_survives() {
        let profile = profile_with("Aroid mix", vec!["string", "N/A"], vec![]);
        let patch = build_patch(&profile, "openai");

        assert_eq!(patch.soil_mix, Some(None));
        assert_eq!(patch.care_tips, Some(None));
    }

    #[test]
    fn test_build_patch_falls_back_on_placeholder_soil_type() {
        for bad in ["", "  ", "string", "Unknown", "N/A"] {
            let profile = profile_with(bad, vec!["bark"], vec!["Tip."]);
            let patch = build_patch(&profile, "openai");
            assert_eq!(patch.soil_type.as_deref(), Some(FALLBACK_SOIL_TYPE));
            // The legacy soil column records the honest (null) value.
            assert_eq!(patch.soil, Some(None));
        }
    }

    #[test]
    fn test_build_patch_carries_ph_range() {
        let profile = profile_with("Aroid mix", vec![], vec![]);
        let patch = build_patch(&profile, "openai");
        assert_eq!(patch.soil_ph_min, Some(Some(6.1)));
        assert_eq!(patch.soil_ph_max, Some(Some(6.8)));
    }
}
