//! # verdant-inference
//!
//! External AI collaborator backends for verdant.
//!
//! This crate provides:
//! - Pl@ntNet identification backend (image → structured identification)
//! - OpenAI care-profile generation backend (taxonomy → structured profile)
//! - Mock backends for testing (feature `mock`)
//!
//! # Example
//!
//! ```rust,no_run
//! use verdant_inference::{OpenAICareBackend, OpenAICareConfig};
//! use verdant_core::{CareProfileBackend, CareProfileRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = OpenAICareBackend::from_env().unwrap();
//!     let request = CareProfileRequest {
//!         scientific_name: Some("Epipremnum aureum".to_string()),
//!         ..Default::default()
//!     };
//!     let profile = backend.generate(&request).await.unwrap();
//!     println!("{}", profile.summary);
//! }
//! ```

pub mod openai;
pub mod plantnet;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use verdant_core::*;

pub use openai::{OpenAICareBackend, OpenAICareConfig};
pub use plantnet::{PlantNetBackend, PlantNetConfig};
