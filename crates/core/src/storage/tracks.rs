use crate::domain::track::{Album, ArtistRef, TrackMetadata, TrackSummary};
use anyhow::Context;
use chrono::NaiveDate;
use std::collections::HashMap;

type TrackRow = (
    String,
    String,
    String,
    String,
    Option<NaiveDate>,
    Option<String>,
    Option<String>,
    Vec<String>,
    Option<String>,
);

pub async fn fetch_summaries(
    pool: &sqlx::PgPool,
    ids: &[String],
) -> anyhow::Result<HashMap<String, TrackSummary>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, (String, String, Option<String>, Option<String>)>(
        "SELECT t.id, t.name, a.id, a.name \
         FROM tracks t \
         LEFT JOIN track_artists ta ON ta.track_id = t.id \
         LEFT JOIN artists a ON a.id = ta.artist_id \
         WHERE t.id = ANY($1) \
         ORDER BY t.id ASC, ta.position ASC",
    )
    .persistent(false)
    .bind(ids)
    .fetch_all(pool)
    .await
    .context("select track summaries failed")?;

    let mut out: HashMap<String, TrackSummary> = HashMap::with_capacity(ids.len());
    for (track_id, track_name, artist_id, artist_name) in rows {
        let summary = out.entry(track_id.clone()).or_insert_with(|| TrackSummary {
            id: track_id,
            name: track_name,
            artists: Vec::new(),
        });
        if let (Some(id), Some(name)) = (artist_id, artist_name) {
            summary.artists.push(ArtistRef { id, name });
        }
    }
    Ok(out)
}

pub async fn fetch_metadata(
    pool: &sqlx::PgPool,
    id: &str,
) -> anyhow::Result<Option<TrackMetadata>> {
    let row = sqlx::query_as::<_, TrackRow>(
        "SELECT id, name, album_name, album_type, album_release_date, album_label, \
                album_thumbnail_url, genres, preview_url \
         FROM tracks \
         WHERE id = $1",
    )
    .persistent(false)
    .bind(id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("select tracks failed (id={id})"))?;

    let Some((
        id,
        name,
        album_name,
        album_type,
        release_date,
        label,
        thumbnail_url,
        genres,
        preview_url,
    )) = row
    else {
        return Ok(None);
    };

    let artists = sqlx::query_as::<_, (String, String)>(
        "SELECT a.id, a.name \
         FROM track_artists ta \
         JOIN artists a ON a.id = ta.artist_id \
         WHERE ta.track_id = $1 \
         ORDER BY ta.position ASC",
    )
    .persistent(false)
    .bind(&id)
    .fetch_all(pool)
    .await
    .with_context(|| format!("select track_artists failed (track_id={id})"))?;

    Ok(Some(TrackMetadata {
        id,
        name,
        featuring_artists: artists
            .into_iter()
            .map(|(id, name)| ArtistRef { id, name })
            .collect(),
        album: Album {
            name: album_name,
            release_date,
            album_type,
            label,
            thumbnail_url,
        },
        genres,
        preview_url,
    }))
}
