use mongodb::{
    Collection,
    bson::{Document, doc},
};
use serde::Serialize;

use crate::error::{BookstoreError, StepContext};
use crate::output::print_section;

use super::collect_all;
use super::models::*;

pub const FICTION_GENRE: &str = "Fiction";
pub const ORWELL: &str = "George Orwell";
pub const REPRICED_TITLE: &str = "1984";
pub const NEW_PRICE: f64 = 15.99;
pub const DELETED_TITLE: &str = "Animal Farm";
pub const PAGE_SIZE: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn direction(self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeleteOutcome {
    pub deleted: u64,
}

/// Everything the query sequence read or changed, in run order.
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub fiction: Vec<Book>,
    pub published_after_1950: Vec<Book>,
    pub by_orwell: Vec<Book>,
    pub price_update: UpdateOutcome,
    pub deletion: DeleteOutcome,
    pub in_stock_after_2010: Vec<Book>,
    pub summaries: Vec<BookSummary>,
    pub by_price_ascending: Vec<Book>,
    pub by_price_descending: Vec<Book>,
    pub page_one: Vec<Book>,
    pub page_two: Vec<Book>,
}

pub fn genre_filter(genre: &str) -> Document {
    doc! { "genre": genre }
}

pub fn published_after_filter(year: i32) -> Document {
    doc! { "published_year": { "$gt": year } }
}

pub fn author_filter(author: &str) -> Document {
    doc! { "author": author }
}

pub fn title_filter(title: &str) -> Document {
    doc! { "title": title }
}

pub fn in_stock_published_after_filter(year: i32) -> Document {
    doc! { "in_stock": true, "published_year": { "$gt": year } }
}

pub fn summary_projection() -> Document {
    doc! { "title": 1, "author": 1, "price": 1, "_id": 0 }
}

pub fn price_sort(order: SortOrder) -> Document {
    doc! { "price": order.direction() }
}

/// Number of records to skip for a 1-based page; page 0 is treated as page 1.
///
/// Both factors fit in `u32`, so the product cannot overflow `u64`.
pub fn page_offset(page: u32, page_size: u32) -> u64 {
    u64::from(page.saturating_sub(1)) * u64::from(page_size)
}

async fn find_matching(
    books: &Collection<Book>,
    filter: Document,
    step: &'static str,
) -> Result<Vec<Book>, BookstoreError> {
    let cursor = books.find(filter).await.step(step)?;
    collect_all(cursor).await.step(step)
}

pub async fn find_by_genre(
    books: &Collection<Book>,
    genre: &str,
) -> Result<Vec<Book>, BookstoreError> {
    find_matching(books, genre_filter(genre), "find_by_genre").await
}

pub async fn find_published_after(
    books: &Collection<Book>,
    year: i32,
) -> Result<Vec<Book>, BookstoreError> {
    find_matching(books, published_after_filter(year), "find_published_after").await
}

pub async fn find_by_author(
    books: &Collection<Book>,
    author: &str,
) -> Result<Vec<Book>, BookstoreError> {
    find_matching(books, author_filter(author), "find_by_author").await
}

pub async fn find_in_stock_published_after(
    books: &Collection<Book>,
    year: i32,
) -> Result<Vec<Book>, BookstoreError> {
    find_matching(
        books,
        in_stock_published_after_filter(year),
        "find_in_stock_published_after",
    )
    .await
}

/// Set the price of the first record with `title`. A missing title is logged, not an error.
pub async fn update_price(
    books: &Collection<Book>,
    title: &str,
    price: f64,
) -> Result<UpdateOutcome, BookstoreError> {
    let result = books
        .update_one(title_filter(title), doc! { "$set": { "price": price } })
        .await
        .step("update_price")?;

    if result.matched_count == 0 {
        tracing::warn!("No book titled '{}' found, price left unchanged", title);
    }

    Ok(UpdateOutcome {
        matched: result.matched_count,
        modified: result.modified_count,
    })
}

/// Delete the first record with `title`. Deleting an absent title is a no-op.
pub async fn delete_by_title(
    books: &Collection<Book>,
    title: &str,
) -> Result<DeleteOutcome, BookstoreError> {
    let result = books
        .delete_one(title_filter(title))
        .await
        .step("delete_by_title")?;

    if result.deleted_count == 0 {
        tracing::warn!("No book titled '{}' found, nothing deleted", title);
    }

    Ok(DeleteOutcome {
        deleted: result.deleted_count,
    })
}

pub async fn find_summaries(books: &Collection<Book>) -> Result<Vec<BookSummary>, BookstoreError> {
    let cursor = books
        .clone_with_type::<BookSummary>()
        .find(doc! {})
        .projection(summary_projection())
        .await
        .step("find_summaries")?;

    collect_all(cursor).await.step("find_summaries")
}

pub async fn find_sorted_by_price(
    books: &Collection<Book>,
    order: SortOrder,
) -> Result<Vec<Book>, BookstoreError> {
    let cursor = books
        .find(doc! {})
        .sort(price_sort(order))
        .await
        .step("find_sorted_by_price")?;

    collect_all(cursor).await.step("find_sorted_by_price")
}

/// One page in natural order. No total count is computed.
pub async fn find_page(
    books: &Collection<Book>,
    page: u32,
    page_size: u32,
) -> Result<Vec<Book>, BookstoreError> {
    let cursor = books
        .find(doc! {})
        .skip(page_offset(page, page_size))
        .limit(i64::from(page_size))
        .await
        .step("find_page")?;

    collect_all(cursor).await.step("find_page")
}

/// Run the query sequence, printing each result as it arrives.
///
/// The first failing step ends the sequence. The price update and the delete
/// change the collection for every read after them.
pub async fn run_queries(books: &Collection<Book>) -> Result<QueryReport, BookstoreError> {
    let fiction = find_by_genre(books, FICTION_GENRE).await?;
    print_section("Books in the Fiction genre", &fiction);

    let published_after_1950 = find_published_after(books, 1950).await?;
    print_section("Books published after 1950", &published_after_1950);

    let by_orwell = find_by_author(books, ORWELL).await?;
    print_section("Books by George Orwell", &by_orwell);

    let price_update = update_price(books, REPRICED_TITLE, NEW_PRICE).await?;
    print_section("Updating price of '1984'", &price_update);

    let deletion = delete_by_title(books, DELETED_TITLE).await?;
    print_section("Deleting 'Animal Farm'", &deletion);

    let in_stock_after_2010 = find_in_stock_published_after(books, 2010).await?;
    print_section("Books in stock and published after 2010", &in_stock_after_2010);

    let summaries = find_summaries(books).await?;
    print_section("Projection: Only title, author, and price", &summaries);

    let by_price_ascending = find_sorted_by_price(books, SortOrder::Ascending).await?;
    print_section("Books sorted by price (ascending)", &by_price_ascending);

    let by_price_descending = find_sorted_by_price(books, SortOrder::Descending).await?;
    print_section("Books sorted by price (descending)", &by_price_descending);

    let page_one = find_page(books, 1, PAGE_SIZE).await?;
    print_section("Page 1", &page_one);

    let page_two = find_page(books, 2, PAGE_SIZE).await?;
    print_section("Page 2", &page_two);

    Ok(QueryReport {
        fiction,
        published_after_1950,
        by_orwell,
        price_update,
        deletion,
        in_stock_after_2010,
        summaries,
        by_price_ascending,
        by_price_descending,
        page_one,
        page_two,
    })
}
