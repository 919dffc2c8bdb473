mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands, Fixture};
use ride_relevance::{
    AnalyticsSink, ChannelSink, InMemoryCatalog, LocationCatalog, RankingEngine, SearchParams,
    TimeWindow, TracingSink,
};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    ride_relevance::tracing::init(cli.json_logs);

    let config = cli::load_config(cli.config.as_deref())?;
    let engine = RankingEngine::new(config).context("Invalid ranking config")?;

    match cli.command {
        Commands::Rank {
            fixture,
            from,
            to,
            radius,
            sort,
            min_price,
            max_price,
            earliest,
            latest,
            now,
        } => {
            let fixture = Fixture::load(&fixture)?;
            let catalog = InMemoryCatalog::new(fixture.locations.clone())?;
            let popularity = fixture.popularity();
            tracing::info!(
                "Loaded {} locations, {} rides, {} popular routes",
                catalog.len(),
                fixture.rides.len(),
                popularity.len()
            );

            let mut params = SearchParams::new(from, radius, now.unwrap_or_else(chrono::Utc::now))
                .with_sort(sort)
                .with_price_range(min_price, max_price);
            if let Some(to) = to {
                params = params.with_destination(to);
            }
            if let (Some(earliest), Some(latest)) = (earliest, latest) {
                params = params.with_time_window(TimeWindow { earliest, latest });
            }

            let (sink, mut events) = ChannelSink::new();
            let drain = tokio::spawn(async move {
                while let Some(event) = events.recv().await {
                    if let Err(e) = TracingSink.record(event) {
                        tracing::warn!("Analytics drain failed: {}", e);
                    }
                }
            });

            let outcome = engine.search(&params, &fixture.rides, &catalog, &popularity, &sink)?;
            drop(sink);
            drain.await.context("Analytics drain task panicked")?;

            tracing::info!(
                "Ranked {} of {} rides ({:?})",
                outcome.rides.len(),
                outcome.funnel.candidates,
                outcome.quality
            );
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Resolve {
            fixture,
            text,
            limit,
        } => {
            let fixture = Fixture::load(&fixture)?;
            let catalog = InMemoryCatalog::new(fixture.locations)?;
            let resolution = engine.resolve(&catalog, &text);
            let similar = engine
                .resolver()
                .find_similar_locations(&catalog, &text, limit);
            let report = json!({
                "resolution": resolution,
                "similar": similar,
                "catalog_version": format!("{:016x}", catalog.version()),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
