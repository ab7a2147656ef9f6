//! Conversion of provider fields into the local record schema.

use std::collections::BTreeSet;

use chrono::{TimeZone, Utc};

use crate::models::FetchedMetadata;
use crate::provider::Candidate;

/// Storylines longer than this fall back to the shorter summary.
const MAX_DESCRIPTION_CHARS: usize = 1500;
/// Cap on combined genre/theme tags.
const MAX_GENRE_TAGS: usize = 3;
/// Cap on developer and publisher names, each.
const MAX_COMPANY_NAMES: usize = 2;
/// Canonical spelling for the provider's "Science Fiction" tag.
const SCIFI_TAG: &str = "Sci-fi";

/// Convert a chosen candidate into the partial record a merge applies.
///
/// The artwork branch fills in `header_image` separately; everything else the
/// fetch produces comes from here.
pub fn normalize(candidate: &Candidate) -> FetchedMetadata {
    FetchedMetadata {
        igdb_id: Some(candidate.id.to_string()),
        steam_id: candidate.steam_app_id().map(|id| id.to_string()),
        description: Some(description(candidate)),
        header_image: None,
        rating: None,
        genre: genre_tags(candidate),
        developer: company_names(candidate, |company| company.developer),
        publisher: company_names(candidate, |company| company.publisher),
        release_date: release_date(candidate),
    }
}

/// Storyline unless it is empty or overlong, else the summary.
fn description(candidate: &Candidate) -> String {
    if candidate.storyline.is_empty()
        || candidate.storyline.chars().count() > MAX_DESCRIPTION_CHARS
    {
        candidate.summary.clone()
    } else {
        candidate.storyline.clone()
    }
}

/// Up to three unique tags, genres before themes, "Science Fiction" renamed,
/// emitted sorted and newline-joined.
fn genre_tags(candidate: &Candidate) -> Option<String> {
    let mut tags = BTreeSet::new();
    for entry in candidate.genres.iter().chain(candidate.themes.iter()) {
        if tags.len() >= MAX_GENRE_TAGS {
            break;
        }
        let name = entry.name.trim();
        if name.is_empty() {
            continue;
        }
        if name.eq_ignore_ascii_case("Science Fiction") {
            tags.insert(SCIFI_TAG.to_string());
        } else {
            tags.insert(name.to_string());
        }
    }
    if tags.is_empty() {
        None
    } else {
        Some(tags.into_iter().collect::<Vec<_>>().join("\n"))
    }
}

/// Up to two distinct company names matching `role`, in iteration order.
///
/// A company flagged as both developer and publisher contributes to both
/// lists. `None` when no company matches, so the merge leaves the prior
/// value untouched.
fn company_names(
    candidate: &Candidate,
    role: impl Fn(&crate::provider::InvolvedCompany) -> bool,
) -> Option<String> {
    let mut names: Vec<String> = Vec::new();
    for involved in &candidate.involved_companies {
        if names.len() >= MAX_COMPANY_NAMES {
            break;
        }
        let name = involved.company.name.trim();
        if name.is_empty() || !role(involved) {
            continue;
        }
        if !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
    }
    if names.is_empty() {
        None
    } else {
        Some(names.join("\n"))
    }
}

/// First release timestamp (Unix seconds) as "<Month> <day>, <year>".
fn release_date(candidate: &Candidate) -> Option<String> {
    candidate
        .first_release_date
        .and_then(|seconds| Utc.timestamp_opt(seconds, 0).single())
        .map(|date| date.format("%B %d, %Y").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{InvolvedCompany, NamedRef, Website};

    fn named(names: &[&str]) -> Vec<NamedRef> {
        names
            .iter()
            .map(|name| NamedRef {
                name: name.to_string(),
            })
            .collect()
    }

    fn company(name: &str, developer: bool, publisher: bool) -> InvolvedCompany {
        InvolvedCompany {
            company: NamedRef {
                name: name.to_string(),
            },
            developer,
            publisher,
        }
    }

    #[test]
    fn description_prefers_storyline_within_bounds() {
        let candidate = Candidate {
            storyline: "A long-form tale.".to_string(),
            summary: "A quest.".to_string(),
            ..Candidate::default()
        };
        assert_eq!(description(&candidate), "A long-form tale.");
    }

    #[test]
    fn empty_storyline_falls_back_to_summary() {
        let candidate = Candidate {
            summary: "A quest.".to_string(),
            ..Candidate::default()
        };
        assert_eq!(description(&candidate), "A quest.");
    }

    #[test]
    fn overlong_storyline_falls_back_to_summary() {
        let at_limit = Candidate {
            storyline: "s".repeat(1500),
            summary: "short".to_string(),
            ..Candidate::default()
        };
        assert_eq!(description(&at_limit).len(), 1500);

        let over_limit = Candidate {
            storyline: "s".repeat(1501),
            summary: "short".to_string(),
            ..Candidate::default()
        };
        assert_eq!(description(&over_limit), "short");
    }

    #[test]
    fn genres_are_renamed_deduped_capped_and_sorted() {
        let candidate = Candidate {
            genres: named(&["Science Fiction", "Action"]),
            themes: named(&["Horror", "Comedy"]),
            ..Candidate::default()
        };
        assert_eq!(
            genre_tags(&candidate).as_deref(),
            Some("Action\nHorror\nSci-fi")
        );
    }

    #[test]
    fn empty_tag_names_are_skipped() {
        let candidate = Candidate {
            genres: named(&["", "Adventure"]),
            themes: named(&["", "Mystery"]),
            ..Candidate::default()
        };
        assert_eq!(
            genre_tags(&candidate).as_deref(),
            Some("Adventure\nMystery")
        );
    }

    #[test]
    fn no_tags_leaves_genre_unset() {
        assert_eq!(genre_tags(&Candidate::default()), None);
    }

    #[test]
    fn developer_cap_keeps_first_two_in_iteration_order() {
        let candidate = Candidate {
            involved_companies: vec![
                company("First Studio", true, false),
                company("Second Studio", true, false),
                company("Third Studio", true, false),
            ],
            ..Candidate::default()
        };
        let fetched = normalize(&candidate);
        assert_eq!(
            fetched.developer.as_deref(),
            Some("First Studio\nSecond Studio")
        );
        assert_eq!(fetched.publisher, None);
    }

    #[test]
    fn company_may_appear_in_both_roles() {
        let candidate = Candidate {
            involved_companies: vec![
                company("Self-Published Ltd", true, true),
                company("Big Publisher", false, true),
            ],
            ..Candidate::default()
        };
        let fetched = normalize(&candidate);
        assert_eq!(fetched.developer.as_deref(), Some("Self-Published Ltd"));
        assert_eq!(
            fetched.publisher.as_deref(),
            Some("Self-Published Ltd\nBig Publisher")
        );
    }

    #[test]
    fn duplicate_company_names_collapse() {
        let candidate = Candidate {
            involved_companies: vec![
                company("Twin Studio", true, false),
                company("Twin Studio", true, false),
                company("Other Studio", true, false),
            ],
            ..Candidate::default()
        };
        let fetched = normalize(&candidate);
        assert_eq!(
            fetched.developer.as_deref(),
            Some("Twin Studio\nOther Studio")
        );
    }

    #[test]
    fn release_date_formats_unix_seconds() {
        let candidate = Candidate {
            first_release_date: Some(1690848000),
            ..Candidate::default()
        };
        assert_eq!(release_date(&candidate).as_deref(), Some("August 01, 2023"));
        assert_eq!(release_date(&Candidate::default()), None);
    }

    #[test]
    fn identity_passthrough_sets_provider_and_steam_ids() {
        let candidate = Candidate {
            id: 9066,
            websites: vec![Website {
                url: "https://store.steampowered.com/app/753640/Outer_Wilds/".to_string(),
                category: 13,
            }],
            ..Candidate::default()
        };
        let fetched = normalize(&candidate);
        assert_eq!(fetched.igdb_id.as_deref(), Some("9066"));
        assert_eq!(fetched.steam_id.as_deref(), Some("753640"));
        // the artwork branch owns the header image
        assert_eq!(fetched.header_image, None);
    }
}
