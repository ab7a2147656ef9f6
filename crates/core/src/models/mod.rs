//! Shared domain models.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Platform a game runs on, as picked by the user when adding it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Native macOS build.
    Mac,
    /// Installed through Steam.
    Steam,
    /// Installed through GOG.
    Gog,
    /// Installed through the Epic Games Store.
    Epic,
    /// Runs under an emulator.
    Emulated,
    /// Not specified.
    #[default]
    None,
}

/// Play status bucket maintained by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Actively being played.
    Playing,
    /// Set aside for now.
    Shelved,
    /// Played now and then.
    Occasional,
    /// Main story finished.
    Beaten,
    /// Fully completed.
    Completed,
    /// Given up on.
    Abandoned,
    /// Not specified.
    #[default]
    None,
}

/// Coarse bucket summarising how recently a game was played.
///
/// Distinct from the exact [`GameRecord::last_played`] timestamp; the bucket
/// is what list views sort and group by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recency {
    /// Played within the last day.
    Day,
    /// Played within the last week.
    Week,
    /// Played within the last month.
    Month,
    /// Played longer than a month ago.
    Older,
    /// Never played.
    #[default]
    Never,
}

impl Recency {
    /// Derive the bucket for a `last_played` timestamp relative to `now`.
    pub fn bucket(last_played: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let Some(at) = last_played else {
            return Recency::Never;
        };
        let elapsed = now.signed_duration_since(at);
        if elapsed <= Duration::days(1) {
            Recency::Day
        } else if elapsed <= Duration::days(7) {
            Recency::Week
        } else if elapsed <= Duration::days(30) {
            Recency::Month
        } else {
            Recency::Older
        }
    }
}

/// A locally catalogued game, persisted as one entry of the collection file.
///
/// Fields split into three groups: identity (`name` is the unique lookup key
/// across the whole collection), user-owned fields that a metadata fetch must
/// never touch, and fetched metadata that a fetch overwrites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Unique name of the game within the collection.
    pub name: String,
    /// Steam app id, when the game is known to Steam.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steam_id: Option<String>,
    /// IGDB entry id recorded by the last metadata fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub igdb_id: Option<String>,

    /// Shell command used to launch the game.
    #[serde(default)]
    pub launcher: String,
    /// Platform the game runs on.
    #[serde(default)]
    pub platform: Platform,
    /// Current play status.
    #[serde(default)]
    pub status: Status,
    /// Marked as a favorite by the user.
    #[serde(default)]
    pub is_favorite: bool,
    /// Soft-deleted; hidden games stay in the collection file.
    #[serde(default)]
    pub is_hidden: bool,
    /// Coarse recency bucket, derived from `last_played`.
    #[serde(default)]
    pub recency: Recency,
    /// Exact timestamp of the last launch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_played: Option<DateTime<Utc>>,

    /// Narrative description from the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Path of the cached header image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_image: Option<PathBuf>,
    /// User-visible rating, e.g. "8 / 10".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    /// Up to three genre tags, newline-joined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    /// Up to two developers, newline-joined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    /// Up to two publishers, newline-joined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    /// Formatted first release date, e.g. "August 01, 2023".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
}

impl GameRecord {
    /// Create an empty record for the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steam_id: None,
            igdb_id: None,
            launcher: String::new(),
            platform: Platform::default(),
            status: Status::default(),
            is_favorite: false,
            is_hidden: false,
            recency: Recency::default(),
            last_played: None,
            description: None,
            header_image: None,
            rating: None,
            genre: None,
            developer: None,
            publisher: None,
            release_date: None,
        }
    }

    /// Stamp the record as launched at `now`, refreshing the recency bucket.
    pub fn mark_played(&mut self, now: DateTime<Utc>) {
        self.last_played = Some(now);
        self.recency = Recency::bucket(self.last_played, now);
    }
}

/// Metadata produced by a provider fetch, applied over an existing record.
///
/// Every field is optional; [`FetchedMetadata::apply_to`] only overwrites the
/// record fields that are `Some`, which is how "leave the prior value
/// untouched" is expressed for fields like `developer` and `publisher`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedMetadata {
    /// IGDB id of the chosen candidate, stringified.
    pub igdb_id: Option<String>,
    /// Steam app id extracted from the candidate's website links.
    pub steam_id: Option<String>,
    /// Storyline or summary, per the description precedence rule.
    pub description: Option<String>,
    /// Cached header image path resolved by the artwork branch.
    pub header_image: Option<PathBuf>,
    /// Rating; never set by the normalizer, kept for caller-supplied edits.
    pub rating: Option<String>,
    /// Newline-joined genre tags.
    pub genre: Option<String>,
    /// Newline-joined developers.
    pub developer: Option<String>,
    /// Newline-joined publishers.
    pub publisher: Option<String>,
    /// Formatted release date.
    pub release_date: Option<String>,
}

impl FetchedMetadata {
    /// Overwrite the metadata fields of `record` that this fetch produced.
    ///
    /// User-owned fields (launcher, platform, status, favorite/hidden flags,
    /// recency, last played) are never touched here.
    pub fn apply_to(&self, record: &mut GameRecord) {
        if let Some(value) = &self.igdb_id {
            record.igdb_id = Some(value.clone());
        }
        if let Some(value) = &self.steam_id {
            record.steam_id = Some(value.clone());
        }
        if let Some(value) = &self.description {
            record.description = Some(value.clone());
        }
        if let Some(value) = &self.header_image {
            record.header_image = Some(value.clone());
        }
        if let Some(value) = &self.rating {
            record.rating = Some(value.clone());
        }
        if let Some(value) = &self.genre {
            record.genre = Some(value.clone());
        }
        if let Some(value) = &self.developer {
            record.developer = Some(value.clone());
        }
        if let Some(value) = &self.publisher {
            record.publisher = Some(value.clone());
        }
        if let Some(value) = &self.release_date {
            record.release_date = Some(value.clone());
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Platform::Mac => "mac",
            Platform::Steam => "steam",
            Platform::Gog => "gog",
            Platform::Epic => "epic",
            Platform::Emulated => "emulated",
            Platform::None => "none",
        };
        f.write_str(label)
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "mac" => Ok(Platform::Mac),
            "steam" => Ok(Platform::Steam),
            "gog" => Ok(Platform::Gog),
            "epic" => Ok(Platform::Epic),
            "emulated" => Ok(Platform::Emulated),
            "none" => Ok(Platform::None),
            other => Err(format!("unknown platform '{other}'")),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Playing => "playing",
            Status::Shelved => "shelved",
            Status::Occasional => "occasional",
            Status::Beaten => "beaten",
            Status::Completed => "completed",
            Status::Abandoned => "abandoned",
            Status::None => "none",
        };
        f.write_str(label)
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "playing" => Ok(Status::Playing),
            "shelved" => Ok(Status::Shelved),
            "occasional" => Ok(Status::Occasional),
            "beaten" => Ok(Status::Beaten),
            "completed" => Ok(Status::Completed),
            "abandoned" => Ok(Status::Abandoned),
            "none" => Ok(Status::None),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

impl fmt::Display for Recency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Recency::Day => "today",
            Recency::Week => "this week",
            Recency::Month => "this month",
            Recency::Older => "a while ago",
            Recency::Never => "never",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn recency_bucket_boundaries() {
        let now = Utc.with_ymd_and_hms(2023, 8, 31, 12, 0, 0).unwrap();
        assert_eq!(Recency::bucket(None, now), Recency::Never);
        assert_eq!(
            Recency::bucket(Some(now - Duration::hours(5)), now),
            Recency::Day
        );
        assert_eq!(
            Recency::bucket(Some(now - Duration::days(3)), now),
            Recency::Week
        );
        assert_eq!(
            Recency::bucket(Some(now - Duration::days(20)), now),
            Recency::Month
        );
        assert_eq!(
            Recency::bucket(Some(now - Duration::days(90)), now),
            Recency::Older
        );
    }

    #[test]
    fn apply_to_overwrites_only_fetched_fields() {
        let mut record = GameRecord::new("Outer Wilds");
        record.is_favorite = true;
        record.recency = Recency::Week;
        record.launcher = "open steam://run/753640".to_string();
        record.developer = Some("Mobius Digital".to_string());

        let fetched = FetchedMetadata {
            igdb_id: Some("9066".to_string()),
            description: Some("A space exploration mystery.".to_string()),
            genre: Some("Adventure\nIndie".to_string()),
            ..FetchedMetadata::default()
        };
        fetched.apply_to(&mut record);

        assert!(record.is_favorite);
        assert_eq!(record.recency, Recency::Week);
        assert_eq!(record.launcher, "open steam://run/753640");
        assert_eq!(record.igdb_id.as_deref(), Some("9066"));
        assert_eq!(
            record.description.as_deref(),
            Some("A space exploration mystery.")
        );
        // developer was not part of the fetch, so the prior value survives
        assert_eq!(record.developer.as_deref(), Some("Mobius Digital"));
    }

    #[test]
    fn mark_played_refreshes_recency() {
        let now = Utc::now();
        let mut record = GameRecord::new("Celeste");
        assert_eq!(record.recency, Recency::Never);
        record.mark_played(now);
        assert_eq!(record.last_played, Some(now));
        assert_eq!(record.recency, Recency::Day);
    }

    #[test]
    fn record_serializes_with_snake_case_keys() {
        let mut record = GameRecord::new("Hades");
        record.is_favorite = true;
        record.genre = Some("Action\nRoguelike".to_string());
        let value = serde_json::to_value(&record).expect("record should serialize");
        assert_eq!(value["name"], "Hades");
        assert_eq!(value["is_favorite"], true);
        assert_eq!(value["genre"], "Action\nRoguelike");
        assert_eq!(value["platform"], "none");
        // absent optional fields are skipped entirely
        assert!(value.get("steam_id").is_none());
    }
}
