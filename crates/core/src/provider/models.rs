#![allow(missing_docs)]

//! Records returned by the IGDB games endpoint.
//!
//! These are ephemeral: one batch is deserialized per search response and
//! discarded after normalization. The provider omits fields it has no data
//! for, so everything except `id` tolerates absence.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

/// Website category code IGDB uses for Steam store links.
pub const STEAM_WEBSITE_CATEGORY: i64 = 13;

/// A provider-returned game entry considered as a possible match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub storyline: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub genres: Vec<NamedRef>,
    #[serde(default)]
    pub themes: Vec<NamedRef>,
    #[serde(default)]
    pub involved_companies: Vec<InvolvedCompany>,
    #[serde(default)]
    pub artworks: Vec<Artwork>,
    #[serde(default)]
    pub websites: Vec<Website>,
    #[serde(default)]
    pub first_release_date: Option<i64>,
}

/// Expanded sub-entity carrying only a display name (genres, themes,
/// companies).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub name: String,
}

/// A company credited on a game, with its role flags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvolvedCompany {
    #[serde(default)]
    pub company: NamedRef,
    #[serde(default)]
    pub developer: bool,
    #[serde(default)]
    pub publisher: bool,
}

/// Promotional artwork attached to a game.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Artwork {
    #[serde(default)]
    pub image_id: String,
    #[serde(default)]
    pub height: i64,
}

/// External link attached to a game, tagged with a provider category code.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Website {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub category: i64,
}

static STEAM_APP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/app/(\d+)").expect("invalid steam app regex"));

impl Candidate {
    /// Steam app id from the first Steam-category website link, if any.
    ///
    /// The id is the path segment following `/app/` in URLs like
    /// `https://store.steampowered.com/app/753640/Outer_Wilds/`.
    pub fn steam_app_id(&self) -> Option<u64> {
        self.websites
            .iter()
            .filter(|site| site.category == STEAM_WEBSITE_CATEGORY)
            .find_map(|site| {
                STEAM_APP_RE
                    .captures(&site.url)
                    .and_then(|caps| caps.get(1))
                    .and_then(|m| m.as_str().parse().ok())
            })
    }
}
