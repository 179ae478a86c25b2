use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

/// The catalog fields a chart row is rendered with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub id: String,
    pub name: String,
    pub artists: Vec<ArtistRef>,
}

impl TrackSummary {
    /// Placeholder for a charted track the catalog has no record of.
    pub fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            artists: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub name: String,
    pub release_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub album_type: String,
    pub label: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Full detail record behind the track details dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackMetadata {
    pub id: String,
    pub name: String,
    pub featuring_artists: Vec<ArtistRef>,
    pub album: Album,
    pub genres: Vec<String>,
    pub preview_url: Option<String>,
}

impl TrackMetadata {
    pub fn summary(&self) -> TrackSummary {
        TrackSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            artists: self.featuring_artists.clone(),
        }
    }
}
