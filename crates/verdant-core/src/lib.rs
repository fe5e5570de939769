//! # verdant-core
//!
//! Core types, traits, and abstractions for the verdant plant-care service.
//!
//! This crate provides the foundational data structures and trait definitions
//! that other verdant crates depend on, plus the care-profile completeness
//! rules shared by the reconciler and its tests.

pub mod error;
pub mod logging;
pub mod models;
pub mod profile;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use profile::{
    is_profile_complete, sanitize_text, sanitize_text_list, FALLBACK_SOIL_TYPE, PLACEHOLDER_VALUES,
};
pub use traits::*;
