//! HTTP handlers for verdant-api.

pub mod diagnose;
pub mod health;
pub mod identify;
pub mod journal;
pub mod plants;

use serde::{Deserialize, Deserializer};

/// Deserialize a field that distinguishes absent from present-null.
///
/// `{"nickname": null}` clears the column; omitting the key leaves it
/// unchanged. Use with `#[serde(default, deserialize_with = "double_option")]`.
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}
