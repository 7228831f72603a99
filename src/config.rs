use crate::error::BookstoreError;

pub const DEFAULT_DATABASE: &str = "plp_bookstore";
pub const DEFAULT_COLLECTION: &str = "books";

/// Connection parameters shared by every operation.
#[derive(Debug, Clone, PartialEq)]
pub struct BookstoreConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
}

impl BookstoreConfig {
    /// Load configuration from the process environment (and `.env`, if the caller loaded it)
    pub fn from_env() -> Result<Self, BookstoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, BookstoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let uri = lookup("MONGODB_URI")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| BookstoreError::Config("MONGODB_URI not set".to_string()))?;

        let database = lookup("MONGODB_DATABASE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let collection = lookup("MONGODB_COLLECTION")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_COLLECTION.to_string());

        Ok(Self {
            uri,
            database,
            collection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_database_and_collection() {
        let config =
            BookstoreConfig::from_lookup(lookup_from(&[("MONGODB_URI", "mongodb://localhost")]))
                .unwrap();

        assert_eq!(config.uri, "mongodb://localhost");
        assert_eq!(config.database, "plp_bookstore");
        assert_eq!(config.collection, "books");
    }

    #[test]
    fn overrides_from_environment() {
        let config = BookstoreConfig::from_lookup(lookup_from(&[
            ("MONGODB_URI", "mongodb://db:27017"),
            ("MONGODB_DATABASE", "shop"),
            ("MONGODB_COLLECTION", "novels"),
        ]))
        .unwrap();

        assert_eq!(config.database, "shop");
        assert_eq!(config.collection, "novels");
    }

    #[test]
    fn missing_uri_is_a_config_error() {
        let err = BookstoreConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, BookstoreError::Config(_)));
    }

    #[test]
    fn blank_uri_counts_as_missing() {
        let lookup = lookup_from(&[("MONGODB_URI", "  ")]);
        let err = BookstoreConfig::from_lookup(lookup).unwrap_err();
        assert!(matches!(err, BookstoreError::Config(_)));
    }
}
