//! Service layer for verdant-api.

pub mod species_profile;

pub use species_profile::SpeciesProfileService;
