//! IGDB metadata provider access.

/// HTTP client and query construction.
pub mod client;
/// Provider response records.
pub mod models;

pub use client::{IgdbClient, IgdbCredentials, ProviderError};
pub use models::{Artwork, Candidate, InvolvedCompany, NamedRef, Website};
