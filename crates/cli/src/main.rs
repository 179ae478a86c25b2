use anyhow::Context;
use chartboard_core::config::{QueryLimits, Settings};
use chartboard_core::storage::PgChartStore;
use chartboard_core::time::parse_calendar_date;
use chartboard_core::ChartService;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "chartboard_cli")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Daily Top-50 with trend and rank change versus the previous day.
    Daily {
        #[arg(long, default_value = "global")]
        region: String,

        /// Chart day (YYYY-MM-DD).
        #[arg(long)]
        date: String,
    },

    /// Aligned chart positions of several tracks over a date range.
    Compare {
        #[arg(long, default_value = "global")]
        region: String,

        /// Track id; repeat for each track to compare.
        #[arg(long = "track", required = true)]
        tracks: Vec<String>,

        #[arg(long)]
        start: String,

        #[arg(long)]
        end: String,
    },

    /// Regions with at least one published chart.
    Regions,

    /// First and last chart day for a region.
    Bounds {
        #[arg(long, default_value = "global")]
        region: String,
    },

    /// Catalog metadata for a single track.
    Track {
        #[arg(long)]
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let db_url = settings.require_database_url()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .context("connect DATABASE_URL failed")?;

    chartboard_core::storage::migrate(&pool).await?;

    let store = Arc::new(PgChartStore::new(pool));
    let service = ChartService::from_store(store, QueryLimits::from_env());

    match run(&service, args.command).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "query failed");
            Err(err)
        }
    }
}

async fn run(service: &ChartService, command: Command) -> anyhow::Result<Value> {
    let value = match command {
        Command::Daily { region, date } => {
            let date = parse_calendar_date(&date)?;
            serde_json::to_value(service.get_daily_charts(&region, date).await?)?
        }
        Command::Compare {
            region,
            tracks,
            start,
            end,
        } => {
            let start = parse_calendar_date(&start)?;
            let end = parse_calendar_date(&end)?;
            serde_json::to_value(
                service
                    .get_chart_performance_of_tracks(&region, &tracks, start, end)
                    .await?,
            )?
        }
        Command::Regions => serde_json::to_value(service.list_regions().await?)?,
        Command::Bounds { region } => {
            serde_json::to_value(service.chart_date_bounds(&region).await?)?
        }
        Command::Track { id } => serde_json::to_value(service.get_track_metadata(&id).await?)?,
    };
    Ok(value)
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compare_with_repeated_tracks() {
        let args = Args::try_parse_from([
            "chartboard_cli",
            "compare",
            "--track",
            "T1",
            "--track",
            "T3",
            "--start",
            "2021-01-01",
            "--end",
            "2021-01-03",
        ])
        .unwrap();

        match args.command {
            Command::Compare { region, tracks, .. } => {
                assert_eq!(region, "global");
                assert_eq!(tracks, vec!["T1".to_string(), "T3".to_string()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn compare_requires_a_track() {
        let res = Args::try_parse_from([
            "chartboard_cli",
            "compare",
            "--start",
            "2021-01-01",
            "--end",
            "2021-01-03",
        ]);
        assert!(res.is_err());
    }
}
