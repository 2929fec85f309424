//! Row structs and DTOs.
//!
//! Rows keep enum columns as `TEXT`; conversions into the domain types in
//! `healthwatch-core` live next to each row struct.

pub mod entity_health;
pub mod hardware;
pub mod snapshot;
pub mod target;

/// Wrap a domain parse failure as a column decode error.
pub(crate) fn decode_err<E>(e: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(e))
}
