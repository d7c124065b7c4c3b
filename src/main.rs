//! Stoker diagnostic entrypoint.
//!
//! Lists the registered modules and, when asked, fetches one day's aggregate
//! report. Data entry itself happens through the library's page layer.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stoker::client::ApiClient;
use stoker::config::Args;
use stoker::report::AggregateRow;
use stoker::schema::SchemaRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("stoker={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Stoker - Plant Reporting Engine");
    info!("======================================");
    info!("Backend: {}", args.api_url);
    info!("Auth: {}", if args.auth_token.is_some() { "token" } else { "none" });

    let registry = SchemaRegistry::builtin()?;
    info!("Modules: {}", registry.len());
    for id in registry.list_ids() {
        let schema = registry.get(id)?;
        info!(
            "  {:<18} {} ({} fields{})",
            id,
            schema.label,
            schema.fields.len(),
            if schema.edit_gated { ", edit-gated" } else { "" }
        );
    }

    if let Some(date) = &args.report_date {
        let date = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")?;
        let client = ApiClient::new(args.api_config())?;

        info!("Fetching aggregate report for {}", date);
        let rows = client.dm_plant_report(date).await?;
        info!("{} aggregate rows", rows.len());
        for row in &rows {
            info!(
                "  {:<50} avg={:>8} min={:>8} max={:>8} n={}",
                row.group.to_string(),
                AggregateRow::display_stat(row.avg),
                AggregateRow::display_stat(row.min),
                AggregateRow::display_stat(row.max),
                row.count
            );
        }
    }

    Ok(())
}
