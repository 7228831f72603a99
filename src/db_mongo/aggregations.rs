use mongodb::{
    Collection,
    bson::{Document, doc},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{BookstoreError, StepContext};
use crate::output::print_section;

use super::collect_all;
use super::models::*;

#[derive(Debug, Clone, Serialize)]
pub struct AggregationReport {
    pub average_price_by_genre: Vec<GenreAveragePrice>,
    pub top_author: Option<AuthorBookCount>,
    pub by_decade: Vec<DecadeBookCount>,
}

/// Mean price per genre. No sort stage, so group order is whatever the server returns.
pub fn average_price_by_genre_pipeline() -> Vec<Document> {
    vec![doc! {
        "$group": { "_id": "$genre", "averagePrice": { "$avg": "$price" } }
    }]
}

/// Single author with the most records. Ties go to the lexicographically smallest name.
pub fn top_author_pipeline() -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": "$author", "totalBooks": { "$sum": 1 } } },
        doc! { "$sort": { "totalBooks": -1, "_id": 1 } },
        doc! { "$limit": 1 },
    ]
}

/// `floor(published_year / 10) * 10` as an integer key, counted and sorted ascending.
pub fn decade_key() -> Document {
    doc! {
        "$toInt": {
            "$multiply": [
                { "$floor": { "$divide": ["$published_year", 10] } },
                10
            ]
        }
    }
}

pub fn books_by_decade_pipeline() -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": decade_key(), "totalBooks": { "$sum": 1 } } },
        doc! { "$sort": { "_id": 1 } },
    ]
}

async fn aggregate_into<T>(
    books: &Collection<Book>,
    pipeline: Vec<Document>,
    step: &'static str,
) -> Result<Vec<T>, BookstoreError>
where
    T: DeserializeOwned + Send + Sync,
{
    let cursor = books
        .aggregate(pipeline)
        .with_type::<T>()
        .await
        .step(step)?;

    collect_all(cursor).await.step(step)
}

pub async fn average_price_by_genre(
    books: &Collection<Book>,
) -> Result<Vec<GenreAveragePrice>, BookstoreError> {
    aggregate_into(
        books,
        average_price_by_genre_pipeline(),
        "average_price_by_genre",
    )
    .await
}

/// `None` only when the collection is empty.
pub async fn top_author(
    books: &Collection<Book>,
) -> Result<Option<AuthorBookCount>, BookstoreError> {
    let mut rows: Vec<AuthorBookCount> =
        aggregate_into(books, top_author_pipeline(), "top_author").await?;
    Ok(rows.pop())
}

pub async fn books_by_decade(
    books: &Collection<Book>,
) -> Result<Vec<DecadeBookCount>, BookstoreError> {
    aggregate_into(books, books_by_decade_pipeline(), "books_by_decade").await
}

pub async fn run_aggregations(
    books: &Collection<Book>,
) -> Result<AggregationReport, BookstoreError> {
    let average_price_by_genre = average_price_by_genre(books).await?;
    print_section("Average price by genre", &average_price_by_genre);

    let top_author = top_author(books).await?;
    print_section("Author with the most books", &top_author);

    let by_decade = books_by_decade(books).await?;
    print_section("Books grouped by publication decade", &by_decade);

    Ok(AggregationReport {
        average_price_by_genre,
        top_author,
        by_decade,
    })
}
