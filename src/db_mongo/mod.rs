pub mod aggregations;
pub mod indexes;
pub mod models;
pub mod queries;

use mongodb::{Client, Collection, Cursor, Database};
use serde::de::DeserializeOwned;

use crate::config::BookstoreConfig;
use crate::error::BookstoreError;
use models::Book;

/// Create MongoDB connection
pub async fn create_client(uri: &str) -> Result<Client, BookstoreError> {
    let client = Client::with_uri_str(uri)
        .await
        .map_err(BookstoreError::Connect)?;

    // Ping to verify connection
    client
        .database("admin")
        .run_command(mongodb::bson::doc! {"ping": 1})
        .await
        .map_err(BookstoreError::Connect)?;

    tracing::info!("Successfully connected to MongoDB");
    Ok(client)
}

/// Handles for the selected database and its books collection.
#[derive(Clone)]
pub struct BookStore {
    pub db: Database,
    pub books: Collection<Book>,
}

impl BookStore {
    pub fn new(client: &Client, db_name: &str, collection_name: &str) -> Self {
        let db = client.database(db_name);
        let books = db.collection::<Book>(collection_name);
        Self { db, books }
    }
}

/// Connect, hand the store to `body`, and shut the client down on every exit path.
///
/// Failures are logged under the operation's name and returned unchanged.
pub async fn with_book_store<T, F, Fut>(
    config: &BookstoreConfig,
    operation: &'static str,
    body: F,
) -> Result<T, BookstoreError>
where
    F: FnOnce(BookStore) -> Fut,
    Fut: Future<Output = Result<T, BookstoreError>>,
{
    let client = match create_client(&config.uri).await {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("{} failed: {}", operation, e);
            return Err(e);
        }
    };

    let store = BookStore::new(&client, &config.database, &config.collection);
    let result = body(store).await;

    if let Err(e) = &result {
        tracing::error!("{} failed: {}", operation, e);
    }

    client.shutdown().await;
    tracing::info!("{}: connection closed", operation);

    result
}

/// Drain a cursor into memory.
pub async fn collect_all<T>(mut cursor: Cursor<T>) -> mongodb::error::Result<Vec<T>>
where
    T: DeserializeOwned,
{
    let mut items = Vec::new();
    while cursor.advance().await? {
        items.push(cursor.deserialize_current()?);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> BookstoreConfig {
        BookstoreConfig {
            uri: "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200".to_string(),
            database: "plp_bookstore".to_string(),
            collection: "books".to_string(),
        }
    }

    #[tokio::test]
    async fn unreachable_server_is_a_connect_error() {
        let mut body_ran = false;

        let result = with_book_store(&unreachable_config(), "queries", |_store| {
            body_ran = true;
            async { Ok::<_, BookstoreError>(()) }
        })
        .await;

        assert!(matches!(result, Err(BookstoreError::Connect(_))));
        assert!(!body_ran);
    }

    #[tokio::test]
    async fn create_client_fails_fast_without_a_server() {
        let err = create_client(&unreachable_config().uri).await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to connect to MongoDB"));
    }
}
