//! IGDB query construction and transport.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::provider::models::Candidate;

const IGDB_GAMES_ENDPOINT: &str = "https://api.igdb.com/v4/games";
const USER_AGENT: &str = concat!("phoenix-core/", env!("CARGO_PKG_VERSION"));
const SEARCH_LIMIT: usize = 50;

/// Field projection requested for every search: identity, artwork, narrative
/// text, taxonomy, involved companies, release timestamp and website links.
const SEARCH_FIELDS: &[&str] = &[
    "id",
    "name",
    "storyline",
    "summary",
    "genres.name",
    "themes.name",
    "involved_companies.company.name",
    "involved_companies.developer",
    "involved_companies.publisher",
    "artworks.image_id",
    "artworks.height",
    "first_release_date",
    "websites.url",
    "websites.category",
];

/// Failure contacting or understanding the metadata provider.
///
/// Any of these aborts the fetch in progress and leaves the collection
/// untouched; there is no retry policy.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or transport failure.
    #[error("metadata request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The provider answered with a non-success status.
    #[error("provider returned status {status}: {body}")]
    Status {
        /// HTTP status of the response.
        status: StatusCode,
        /// Response body, for the log.
        body: String,
    },
    /// The response body was not a valid candidate list.
    #[error("failed to parse provider response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Prebuilt IGDB credentials, forwarded with every request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IgdbCredentials {
    /// Twitch application client id.
    pub client_id: String,
    /// OAuth access token for that application.
    pub access_token: String,
}

impl IgdbCredentials {
    /// Whether both parts of the credential pair are present.
    pub fn is_complete(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.access_token.trim().is_empty()
    }
}

/// Read-only client for the IGDB games endpoint.
pub struct IgdbClient {
    http: Client,
    credentials: IgdbCredentials,
}

impl IgdbClient {
    /// Build a client around the given credentials.
    pub fn new(credentials: IgdbCredentials) -> Result<Self, ProviderError> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http, credentials })
    }

    /// Search the catalog for games whose name contains `name`.
    ///
    /// An empty or whitespace-only `name` short-circuits to an empty result
    /// without touching the network, as does a provider response with no
    /// matches.
    pub async fn search(&self, name: &str) -> Result<Vec<Candidate>, ProviderError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Vec::new());
        }

        let body = search_body(name);
        debug!("igdb search: {body}");
        let response = self
            .http
            .post(IGDB_GAMES_ENDPOINT)
            .header("Client-ID", &self.credentials.client_id)
            .header(
                "Authorization",
                format!("Bearer {}", self.credentials.access_token),
            )
            .header("Content-Type", "text/plain")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let text = response.text().await?;
        let candidates: Vec<Candidate> = serde_json::from_str(&text)?;
        debug!("igdb search returned {} candidates", candidates.len());
        Ok(candidates)
    }
}

/// Apicalypse query body for a name search: the fixed field projection, a
/// pattern-match "contains" filter, and the result cap.
fn search_body(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        "fields {}; where name ~ *\"{}\"*; limit {};",
        SEARCH_FIELDS.join(","),
        escaped,
        SEARCH_LIMIT
    )
}
