//! Header artwork resolution and caching.
//!
//! A candidate's header image comes from one of two origins: the Steam CDN
//! when the candidate links a Steam store page, otherwise the provider's own
//! image builder fed with the tallest attached artwork. The downloaded bytes
//! land in the application cache directory under a deterministic per-game
//! filename, overwriting any prior header for the same game.

use std::path::{Path, PathBuf};

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::provider::Candidate;

const STEAM_CDN_BASE: &str = "https://cdn.cloudflare.steamstatic.com/steam/apps";
// TODO: offer the t_1080p_2x variant once hidpi rendering lands.
const IGDB_IMAGE_BASE: &str = "https://images.igdb.com/igdb/image/upload/t_1080p";

/// Download or disk-write failure for artwork.
///
/// Never aborts a fetch; the orchestrator logs it and proceeds with the
/// artwork field left at its prior value.
#[derive(Debug, Error)]
pub enum ImageFetchError {
    /// Network failure while downloading the image.
    #[error("artwork download failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The image host answered with a non-success status.
    #[error("artwork download returned status {0}")]
    Status(StatusCode),
    /// Failed to create the cache directory or write the image file.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Path that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Pick the header image URL for a candidate.
///
/// A Steam store link wins over provider artwork even when the artwork list
/// is non-empty; with neither source available there is no header.
pub fn header_url(candidate: &Candidate) -> Option<String> {
    if let Some(app_id) = candidate.steam_app_id() {
        return Some(format!("{STEAM_CDN_BASE}/{app_id}/library_hero.jpg"));
    }
    candidate
        .artworks
        .iter()
        .filter(|artwork| !artwork.image_id.is_empty())
        .max_by_key(|artwork| artwork.height)
        .map(|artwork| format!("{IGDB_IMAGE_BASE}/{}.jpg", artwork.image_id))
}

/// Content cache holding one header image per game.
pub struct ArtworkCache {
    http: Client,
    root: PathBuf,
}

impl ArtworkCache {
    /// Create a cache rooted at the given directory.
    ///
    /// The directory is created on demand at download time, not here.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            http: Client::new(),
            root: root.into(),
        }
    }

    /// Root directory of the cache.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Destination path for a game's header downloaded from `source_url`.
    ///
    /// The filename is `<game name>_header.<ext>`, where the extension is
    /// kept for `jpg`/`jpeg` sources and anything else becomes `png`.
    pub fn cached_path(&self, game_name: &str, source_url: &str) -> PathBuf {
        self.root
            .join(format!("{game_name}_header.{}", extension_for(source_url)))
    }

    /// Resolve and cache the header image for a candidate.
    ///
    /// Returns `Ok(None)` when the candidate offers no artwork source at
    /// all; any download or write failure surfaces as an error for the
    /// caller to log.
    pub async fn resolve(
        &self,
        candidate: &Candidate,
        game_name: &str,
    ) -> Result<Option<PathBuf>, ImageFetchError> {
        let Some(url) = header_url(candidate) else {
            debug!("no header source for {game_name}");
            return Ok(None);
        };

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImageFetchError::Status(status));
        }
        let bytes = response.bytes().await?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| ImageFetchError::Write {
                path: self.root.clone(),
                source,
            })?;
        let path = self.cached_path(game_name, &url);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| ImageFetchError::Write {
                path: path.clone(),
                source,
            })?;

        debug!("cached header for {game_name} at {}", path.display());
        Ok(Some(path))
    }
}

fn extension_for(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path
        .rsplit('.')
        .next()
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") => "jpg",
        Some("jpeg") => "jpeg",
        _ => "png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Artwork, Website};
    use tempfile::tempdir;

    #[test]
    fn steam_link_wins_over_provider_artwork() {
        let candidate = Candidate {
            websites: vec![Website {
                url: "https://store.steampowered.com/app/504230/Celeste/".to_string(),
                category: 13,
            }],
            artworks: vec![Artwork {
                image_id: "ar9z".to_string(),
                height: 2160,
            }],
            ..Candidate::default()
        };
        assert_eq!(
            header_url(&candidate).as_deref(),
            Some("https://cdn.cloudflare.steamstatic.com/steam/apps/504230/library_hero.jpg")
        );
    }

    #[test]
    fn tallest_artwork_is_used_without_a_steam_link() {
        let candidate = Candidate {
            artworks: vec![
                Artwork {
                    image_id: "small".to_string(),
                    height: 720,
                },
                Artwork {
                    image_id: "tall".to_string(),
                    height: 2160,
                },
                Artwork {
                    image_id: "mid".to_string(),
                    height: 1080,
                },
            ],
            ..Candidate::default()
        };
        assert_eq!(
            header_url(&candidate).as_deref(),
            Some("https://images.igdb.com/igdb/image/upload/t_1080p/tall.jpg")
        );
    }

    #[test]
    fn no_source_yields_no_url() {
        assert_eq!(header_url(&Candidate::default()), None);
    }

    #[test]
    fn cached_filename_keeps_jpeg_extensions_and_defaults_to_png() {
        let cache = ArtworkCache::new("/tmp/phoenix-test");
        assert_eq!(
            cache.cached_path("Celeste", "https://host/img.jpg"),
            PathBuf::from("/tmp/phoenix-test/Celeste_header.jpg")
        );
        assert_eq!(
            cache.cached_path("Celeste", "https://host/img.JPEG?size=big"),
            PathBuf::from("/tmp/phoenix-test/Celeste_header.jpeg")
        );
        assert_eq!(
            cache.cached_path("Celeste", "https://host/img.webp"),
            PathBuf::from("/tmp/phoenix-test/Celeste_header.png")
        );
    }

    #[tokio::test]
    async fn resolve_without_source_is_a_quiet_no_op() {
        let dir = tempdir().expect("tempdir");
        let cache = ArtworkCache::new(dir.path());
        let resolved = cache
            .resolve(&Candidate::default(), "Celeste")
            .await
            .expect("no source is not an error");
        assert_eq!(resolved, None);
        // the cache directory is only created when something is written
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
