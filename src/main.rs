use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use bookstore::BookstoreConfig;
use bookstore::db_mongo::{
    aggregations::run_aggregations, indexes::run_indexing, queries::run_queries, with_book_store,
};
use bookstore::run_summary::RunSummary;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = BookstoreConfig::from_env().context("Failed to load configuration")?;
    tracing::info!(
        "Using database '{}', collection '{}'",
        config.database,
        config.collection
    );

    let mut summary = RunSummary::new();

    summary
        .track(
            "queries",
            with_book_store(&config, "queries", |store| async move {
                run_queries(&store.books).await
            }),
        )
        .await;

    summary
        .track(
            "aggregations",
            with_book_store(&config, "aggregations", |store| async move {
                run_aggregations(&store.books).await
            }),
        )
        .await;

    summary
        .track(
            "indexes",
            with_book_store(&config, "indexes", |store| async move {
                run_indexing(&store).await
            }),
        )
        .await;

    summary.print_summary();

    Ok(summary.exit_code())
}
