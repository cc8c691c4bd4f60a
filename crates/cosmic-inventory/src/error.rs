//! Error types for cosmic-inventory

use thiserror::Error;

/// Errors raised while turning command-line tokens into a query
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// More than two tokens were recognised as query strings
    #[error("too many query strings provided: {0:?}")]
    TooManyQueryStrings(Vec<String>),
}

/// Errors that can occur during inventory operations
#[derive(Error, Debug, Clone)]
pub enum InventoryError {
    /// The stack listing could not be retrieved
    #[error("failed to list stacks: {0}")]
    ListStacks(String),

    /// The service does not know the requested stack
    #[error("stack not found: {0}")]
    StackNotFound(String),

    /// Fetching a stack handle failed
    #[error("error retrieving stack {stack}: {message}")]
    GetStack {
        /// Stack that was requested
        stack: String,
        /// Underlying failure
        message: String,
    },

    /// Fetching a stack's snapshot failed
    #[error("error retrieving snapshot of {stack}: {message}")]
    Snapshot {
        /// Stack whose snapshot was requested
        stack: String,
        /// Underlying failure
        message: String,
    },

    /// The stack handle cannot report its identity
    #[error("stack handle for {0} does not expose its identity")]
    MissingCapability(String),

    /// Provider schema could not be loaded
    #[error("schema unavailable for provider {provider}: {message}")]
    Schema {
        /// Provider whose schema was requested
        provider: String,
        /// Underlying failure
        message: String,
    },
}

impl InventoryError {
    /// Check if the error aborts the whole run
    ///
    /// Only a failed stack listing is fatal; everything scoped to a single
    /// stack just removes that stack's rows from the output.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, InventoryError::ListStacks(_))
    }
}
