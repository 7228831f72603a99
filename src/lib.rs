pub mod config;
pub mod db_mongo;
pub mod error;
pub mod output;
pub mod run_summary;

pub use config::BookstoreConfig;
pub use error::BookstoreError;
