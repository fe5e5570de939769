//! Shared application state.

use std::sync::Arc;

use verdant_core::{CareProfileBackend, IdentificationBackend};
use verdant_db::Database;

use crate::auth::AuthVerifier;
use crate::services::SpeciesProfileService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Image identification provider.
    pub identifier: Arc<dyn IdentificationBackend>,
    /// Species profile reconciler over the species store and the generator.
    pub profiles: Arc<SpeciesProfileService>,
    /// Bearer-token verifier against the external auth provider.
    pub auth: Arc<dyn AuthVerifier>,
}

impl AppState {
    pub fn new(
        db: Database,
        identifier: Arc<dyn IdentificationBackend>,
        generator: Arc<dyn CareProfileBackend>,
        auth: Arc<dyn AuthVerifier>,
    ) -> Self {
        let species = Arc::new(db.species.clone());
        Self {
            db,
            identifier,
            profiles: Arc::new(SpeciesProfileService::new(species, generator)),
            auth,
        }
    }
}
