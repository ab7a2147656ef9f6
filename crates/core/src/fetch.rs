//! Metadata fetch pipeline.
//!
//! One fetch walks `Querying → Resolving → Normalizing ∥ Artwork → Merged`,
//! with two early exits: no candidates, and an aborted user pick. The
//! normalization and artwork branches are joined in memory so the merge
//! performs exactly one save, whichever branch finishes last.

use thiserror::Error;
use tracing::{info, warn};

use crate::artwork::ArtworkCache;
use crate::library::{FetchMode, GameLibrary, LibraryError};
use crate::normalize;
use crate::provider::{Candidate, IgdbClient, ProviderError};
use crate::resolve::{self, CandidatePicker};

/// Failure that terminates a fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The metadata provider could not be queried or understood.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// The merge against the collection failed.
    #[error(transparent)]
    Library(#[from] LibraryError),
}

/// How a fetch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Metadata was merged and saved.
    Merged {
        /// Whether a header image was cached as part of the fetch.
        header_image: bool,
    },
    /// The provider returned no candidates for the name.
    NoMatches,
    /// The user declined to pick a candidate; nothing was mutated.
    Aborted,
}

/// Drives the full pipeline for one game at a time.
pub struct MetadataFetcher {
    client: IgdbClient,
    cache: ArtworkCache,
}

impl MetadataFetcher {
    /// Assemble a fetcher from a provider client and an artwork cache.
    pub fn new(client: IgdbClient, cache: ArtworkCache) -> Self {
        Self { client, cache }
    }

    /// Fetch metadata for `name`, resolving candidates automatically to the
    /// one with the lowest provider id.
    pub async fn fetch_auto(
        &self,
        library: &GameLibrary,
        name: &str,
        mode: FetchMode,
    ) -> Result<FetchOutcome, FetchError> {
        let candidates = self.client.search(name).await?;
        let Some(candidate) = resolve::auto_pick(&candidates).cloned() else {
            info!("no catalog matches for {name}");
            return Ok(FetchOutcome::NoMatches);
        };
        self.merge_candidate(library, name, &candidate, mode).await
    }

    /// Fetch metadata for `name`, delegating candidate disambiguation to
    /// `picker`. A declined pick aborts without touching the collection.
    pub async fn fetch_with_choice(
        &self,
        library: &GameLibrary,
        name: &str,
        mode: FetchMode,
        picker: &dyn CandidatePicker,
    ) -> Result<FetchOutcome, FetchError> {
        let candidates = self.client.search(name).await?;
        if candidates.is_empty() {
            info!("no catalog matches for {name}");
            return Ok(FetchOutcome::NoMatches);
        }
        let Some(candidate) = resolve::user_pick(candidates, picker) else {
            info!("fetch for {name} aborted without a selection");
            return Ok(FetchOutcome::Aborted);
        };
        self.merge_candidate(library, name, &candidate, mode).await
    }

    async fn merge_candidate(
        &self,
        library: &GameLibrary,
        name: &str,
        candidate: &Candidate,
        mode: FetchMode,
    ) -> Result<FetchOutcome, FetchError> {
        info!("resolved {name} to catalog entry {}", candidate.id);

        // Both branches complete before the single save below.
        let (fetched, header) = tokio::join!(
            async { normalize::normalize(candidate) },
            self.cache.resolve(candidate, name),
        );
        let mut fetched = fetched;
        match header {
            Ok(path) => fetched.header_image = path,
            Err(err) => warn!("header download for {name} failed: {err}"),
        }

        let header_image = fetched.header_image.is_some();
        library.merge_fetched(name, &fetched, mode)?;
        info!("merged metadata for {name}");
        Ok(FetchOutcome::Merged { header_image })
    }
}
