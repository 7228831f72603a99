use mongodb::{
    Collection, IndexModel,
    bson::{Document, doc},
};
use serde::Serialize;

use crate::error::{BookstoreError, StepContext};
use crate::output::{document_to_json, print_section};

use super::BookStore;
use super::models::Book;
use super::queries::{REPRICED_TITLE, title_filter};

#[derive(Debug, Clone, Serialize)]
pub struct QueryPlanReport {
    pub winning_stage: Option<String>,
    pub execution_stats: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexReport {
    pub title_index: String,
    pub author_year_index: String,
    pub plan: QueryPlanReport,
}

pub fn title_index_keys() -> Document {
    doc! { "title": 1 }
}

pub fn author_year_index_keys() -> Document {
    doc! { "author": 1, "published_year": 1 }
}

/// Create an ascending index. Existing identical indexes are left as they are by the server.
pub async fn create_index(
    books: &Collection<Book>,
    keys: Document,
    step: &'static str,
) -> Result<String, BookstoreError> {
    let result = books
        .create_index(IndexModel::builder().keys(keys).build())
        .await
        .step(step)?;

    Ok(result.index_name)
}

/// Root stage of the winning plan. Newer servers nest it under `queryPlan`.
fn winning_stage(reply: &Document) -> Option<String> {
    let plan = reply
        .get_document("queryPlanner")
        .ok()?
        .get_document("winningPlan")
        .ok()?;

    plan.get_str("stage")
        .ok()
        .or_else(|| plan.get_document("queryPlan").ok()?.get_str("stage").ok())
        .map(|s| s.to_string())
}

pub fn parse_explain(reply: &Document) -> Result<QueryPlanReport, BookstoreError> {
    let stats = reply
        .get_document("executionStats")
        .map_err(|_| BookstoreError::Explain("reply has no executionStats section".to_string()))?;

    Ok(QueryPlanReport {
        winning_stage: winning_stage(reply),
        execution_stats: document_to_json(stats),
    })
}

/// Explain `find(filter)` with `executionStats` verbosity.
pub async fn explain_find(
    store: &BookStore,
    filter: Document,
) -> Result<QueryPlanReport, BookstoreError> {
    let reply = store
        .db
        .run_command(doc! {
            "explain": {
                "find": store.books.name(),
                "filter": filter,
            },
            "verbosity": "executionStats",
        })
        .await
        .step("explain_find")?;

    parse_explain(&reply)
}

pub async fn run_indexing(store: &BookStore) -> Result<IndexReport, BookstoreError> {
    let title_index =
        create_index(&store.books, title_index_keys(), "create_title_index").await?;
    println!("Index created on title.");

    let author_year_index =
        create_index(&store.books, author_year_index_keys(), "create_author_year_index").await?;
    println!("Compound index created on author and published_year.");

    let plan = explain_find(store, title_filter(REPRICED_TITLE)).await?;
    if let Some(stage) = &plan.winning_stage {
        tracing::info!("Winning plan stage for title lookup: {}", stage);
    }
    print_section("Explain query performance", &plan.execution_stats);

    Ok(IndexReport {
        title_index,
        author_year_index,
        plan,
    })
}
