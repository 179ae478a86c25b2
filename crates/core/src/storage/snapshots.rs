use crate::domain::chart::{ChartSnapshot, DatedRow, SnapshotRow};
use crate::domain::region::Region;
use anyhow::Context;
use chrono::NaiveDate;
use uuid::Uuid;

pub async fn fetch_snapshot(
    pool: &sqlx::PgPool,
    region: &Region,
    date: NaiveDate,
) -> anyhow::Result<Option<ChartSnapshot>> {
    let snapshot_id: Option<Uuid> = sqlx::query_scalar(
        "SELECT id FROM chart_snapshots WHERE region = $1 AND chart_date = $2",
    )
    .persistent(false)
    .bind(region.as_str())
    .bind(date)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("select chart_snapshots failed (region={region}, date={date})"))?;

    let Some(snapshot_id) = snapshot_id else {
        return Ok(None);
    };

    let rows = sqlx::query_as::<_, (String, i32, i64)>(
        "SELECT track_id, rank, streams \
         FROM chart_rows \
         WHERE snapshot_id = $1 \
         ORDER BY rank ASC",
    )
    .persistent(false)
    .bind(snapshot_id)
    .fetch_all(pool)
    .await
    .with_context(|| format!("select chart_rows failed (snapshot_id={snapshot_id})"))?;

    let rows = rows
        .into_iter()
        .map(|(track_id, rank, stream_count)| SnapshotRow {
            track_id,
            rank,
            stream_count,
        })
        .collect();

    ChartSnapshot::try_new(region.clone(), date, rows).map(Some)
}

pub async fn fetch_track_rows(
    pool: &sqlx::PgPool,
    region: &Region,
    track_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> anyhow::Result<Vec<DatedRow>> {
    let rows = sqlx::query_as::<_, (NaiveDate, i32, i64)>(
        "SELECT s.chart_date, r.rank, r.streams \
         FROM chart_rows r \
         JOIN chart_snapshots s ON s.id = r.snapshot_id \
         WHERE s.region = $1 AND r.track_id = $2 AND s.chart_date BETWEEN $3 AND $4 \
         ORDER BY s.chart_date ASC",
    )
    .persistent(false)
    .bind(region.as_str())
    .bind(track_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
    .with_context(|| {
        format!("select track chart rows failed (region={region}, track_id={track_id})")
    })?;

    Ok(rows
        .into_iter()
        .map(|(date, rank, stream_count)| DatedRow {
            date,
            rank,
            stream_count,
        })
        .collect())
}

pub async fn list_regions(pool: &sqlx::PgPool) -> anyhow::Result<Vec<Region>> {
    let codes: Vec<String> =
        sqlx::query_scalar("SELECT DISTINCT region FROM chart_snapshots ORDER BY region ASC")
            .persistent(false)
            .fetch_all(pool)
            .await
            .context("select distinct regions failed")?;

    let mut out = Vec::with_capacity(codes.len());
    for code in codes {
        out.push(Region::parse(&code).with_context(|| format!("invalid region in DB: {code:?}"))?);
    }
    Ok(out)
}

pub async fn chart_date_bounds(
    pool: &sqlx::PgPool,
    region: &Region,
) -> anyhow::Result<Option<(NaiveDate, NaiveDate)>> {
    let (first, last): (Option<NaiveDate>, Option<NaiveDate>) = sqlx::query_as(
        "SELECT MIN(chart_date), MAX(chart_date) FROM chart_snapshots WHERE region = $1",
    )
    .persistent(false)
    .bind(region.as_str())
    .fetch_one(pool)
    .await
    .with_context(|| format!("select chart date bounds failed (region={region})"))?;

    Ok(first.zip(last))
}
