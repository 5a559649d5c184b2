//! HTTP client for the backend GraphQL and notification APIs.
//!
//! Implements both [`RuleStore`] and [`ActionApi`]. Every request is
//! authenticated with the user's bearer token passed as an `auth` cookie.

use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Value};

use rulehook_core::{Config, Rule};

use crate::traits::{ActionApi, ClientError, RuleStore};
use crate::wire::{GraphqlRequest, GraphqlResponse, RulesPayload};

const RULES_QUERY: &str = r#"
query Rules($enabled: Boolean) {
  rules(enabled: $enabled) {
    ... on RulesSuccess {
      rules { id name filter description enabled createdAt updatedAt actions { type params } }
    }
    ... on RulesError { errorCodes }
  }
}"#;

const SET_LABELS_MUTATION: &str = r#"
mutation SetLabels($input: SetLabelsInput!) {
  setLabels(input: $input) {
    ... on SetLabelsSuccess { labels { id name } }
    ... on SetLabelsError { errorCodes }
  }
}"#;

const ARCHIVE_MUTATION: &str = r#"
mutation SetLinkArchived($input: ArchiveLinkInput!) {
  setLinkArchived(input: $input) {
    ... on ArchiveLinkSuccess { linkId }
    ... on ArchiveLinkError { errorCodes }
  }
}"#;

const READING_PROGRESS_MUTATION: &str = r#"
mutation SaveArticleReadingProgress($input: SaveArticleReadingProgressInput!) {
  saveArticleReadingProgress(input: $input) {
    ... on SaveArticleReadingProgressSuccess { updatedArticle { id } }
    ... on SaveArticleReadingProgressError { errorCodes }
  }
}"#;

/// Talks to the backend over HTTP.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Base URL, no trailing slash.
    endpoint: String,
    /// Shared HTTP client (connection pooling, request timeout).
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(&config.api_endpoint, config.request_timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: &str,
        body: &B,
        operation: &str,
    ) -> Result<reqwest::Response, ClientError> {
        let url = format!("{}{}", self.endpoint, path);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::COOKIE, format!("auth={token};"))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(%url, %status, operation, body = %body_text, "backend returned non-2xx status");
            return Err(ClientError::Status {
                operation: operation.to_string(),
                status: status.as_u16(),
                body: body_text,
            });
        }

        Ok(response)
    }

    /// Run one GraphQL operation and return the payload under `field`.
    async fn graphql(
        &self,
        token: &str,
        query: &str,
        variables: Value,
        field: &str,
    ) -> Result<Value, ClientError> {
        let request = GraphqlRequest { query, variables };
        let response = self.post("/graphql", token, &request, field).await?;
        let envelope: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(format!("{field}: {e}")))?;
        envelope.into_payload(field, field)
    }
}

#[async_trait::async_trait]
impl RuleStore for ApiClient {
    async fn enabled_rules(&self, user_id: &str, token: &str) -> Result<Vec<Rule>, ClientError> {
        let payload = self
            .graphql(token, RULES_QUERY, json!({ "enabled": true }), "rules")
            .await?;
        let parsed: RulesPayload = serde_json::from_value(payload)
            .map_err(|e| ClientError::Decode(format!("rules: {e}")))?;

        let rules: Vec<Rule> = parsed
            .rules
            .into_iter()
            .map(|r| r.into_rule(user_id))
            .collect();
        tracing::debug!(user_id, count = rules.len(), "fetched enabled rules");
        Ok(rules)
    }
}

#[async_trait::async_trait]
impl ActionApi for ApiClient {
    async fn add_labels(
        &self,
        token: &str,
        item_id: &str,
        labels: &[String],
    ) -> Result<(), ClientError> {
        let labels: Vec<Value> = labels.iter().map(|name| json!({ "name": name })).collect();
        let variables = json!({ "input": { "pageId": item_id, "labels": labels } });
        self.graphql(token, SET_LABELS_MUTATION, variables, "setLabels")
            .await?;
        Ok(())
    }

    async fn archive(&self, token: &str, item_id: &str) -> Result<(), ClientError> {
        let variables = json!({ "input": { "linkId": item_id, "archived": true } });
        self.graphql(token, ARCHIVE_MUTATION, variables, "setLinkArchived")
            .await?;
        Ok(())
    }

    async fn mark_as_read(&self, token: &str, item_id: &str) -> Result<(), ClientError> {
        let variables = json!({
            "input": {
                "id": item_id,
                "readingProgressPercent": 100,
                "readingProgressAnchorIndex": 0
            }
        });
        self.graphql(
            token,
            READING_PROGRESS_MUTATION,
            variables,
            "saveArticleReadingProgress",
        )
        .await?;
        Ok(())
    }

    async fn send_notification(&self, token: &str, message: &str) -> Result<(), ClientError> {
        let body = json!({ "message": { "body": message } });
        self.post("/notification/send", token, &body, "sendNotification")
            .await?;
        Ok(())
    }

    fn api_name(&self) -> &str {
        "graphql"
    }
}
