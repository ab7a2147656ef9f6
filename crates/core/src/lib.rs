#![warn(clippy::all, missing_docs)]

//! Core domain logic for the Phoenix game library.
//!
//! This crate hosts the data models, configuration handling,
//! metadata fetch pipeline, artwork caching, and persistence layers
//! used by the command-line frontend and any future frontends.

pub mod artwork;
pub mod config;
pub mod fetch;
pub mod library;
pub mod models;
pub mod normalize;
pub mod provider;
pub mod resolve;

pub use artwork::ArtworkCache;
pub use config::AppConfig;
pub use fetch::{FetchError, FetchOutcome, MetadataFetcher};
pub use library::{FetchMode, GameLibrary, LibraryError};
pub use models::{FetchedMetadata, GameRecord, Platform, Recency, Status};
pub use provider::{Candidate, IgdbClient, IgdbCredentials, ProviderError};
pub use resolve::CandidatePicker;
