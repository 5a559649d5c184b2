//! Collaborator traits and shared error types.

use rulehook_core::Rule;

/// Errors that can occur while talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{operation} returned {status}: {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("GraphQL error: {0}")]
    Graphql(String),

    #[error("{operation} failed with error codes: {}", .codes.join(", "))]
    Api {
        operation: String,
        codes: Vec<String>,
    },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Token signing failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Issues bearer tokens that act on behalf of a user.
#[async_trait::async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue(&self, user_id: &str) -> Result<String, ClientError>;
}

/// Source of a user's enabled rules.
#[async_trait::async_trait]
pub trait RuleStore: Send + Sync {
    /// Fetch every enabled rule for `user_id` in store order. A single
    /// query; the store is expected to return the full set.
    async fn enabled_rules(&self, user_id: &str, token: &str) -> Result<Vec<Rule>, ClientError>;
}

/// The side-effecting operations a rule action can trigger.
#[async_trait::async_trait]
pub trait ActionApi: Send + Sync {
    /// Attach the named labels to an item.
    async fn add_labels(
        &self,
        token: &str,
        item_id: &str,
        labels: &[String],
    ) -> Result<(), ClientError>;

    async fn archive(&self, token: &str, item_id: &str) -> Result<(), ClientError>;

    async fn mark_as_read(&self, token: &str, item_id: &str) -> Result<(), ClientError>;

    /// Push a single notification message to the user.
    async fn send_notification(&self, token: &str, message: &str) -> Result<(), ClientError>;

    /// Human-readable name for log lines (e.g., "graphql").
    fn api_name(&self) -> &str;
}
