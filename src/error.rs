use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookstoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to connect to MongoDB: {0}")]
    Connect(#[source] mongodb::error::Error),

    #[error("Step '{step}' failed: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("Explain error: {0}")]
    Explain(String),
}

/// Tags a driver result with the name of the step that produced it.
pub trait StepContext<T> {
    fn step(self, step: &'static str) -> Result<T, BookstoreError>;
}

impl<T> StepContext<T> for mongodb::error::Result<T> {
    fn step(self, step: &'static str) -> Result<T, BookstoreError> {
        self.map_err(|source| BookstoreError::Step { step, source })
    }
}
