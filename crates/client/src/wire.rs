//! GraphQL envelope and rule payload shapes as they appear on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use rulehook_core::{Rule, RuleAction, RuleActionType};

use crate::traits::ClientError;

#[derive(Debug, Serialize)]
pub(crate) struct GraphqlRequest<'a> {
    pub query: &'a str,
    pub variables: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphqlErrorEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlErrorEntry {
    pub message: String,
}

impl GraphqlResponse {
    /// Pull the union payload for `field` out of `data`, turning top-level
    /// errors and `errorCodes` members into [`ClientError`]s.
    pub(crate) fn into_payload(self, field: &str, operation: &str) -> Result<Value, ClientError> {
        if !self.errors.is_empty() {
            let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(ClientError::Graphql(messages.join("; ")));
        }

        let payload = self
            .data
            .and_then(|data| match data {
                Value::Object(mut map) => map.remove(field),
                _ => None,
            })
            .filter(|v| !v.is_null())
            .ok_or_else(|| ClientError::Decode(format!("{operation}: missing `{field}` in response")))?;

        if let Some(codes) = payload.get("errorCodes") {
            let codes = codes
                .as_array()
                .map(|list| {
                    list.iter()
                        .map(|c| c.as_str().map(str::to_string).unwrap_or_else(|| c.to_string()))
                        .collect()
                })
                .unwrap_or_default();
            return Err(ClientError::Api {
                operation: operation.to_string(),
                codes,
            });
        }

        Ok(payload)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RulesPayload {
    pub rules: Vec<WireRule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireRule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actions: Vec<WireAction>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireAction {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub params: Option<Vec<String>>,
}

impl WireRule {
    /// Convert into the engine's model. Actions of a kind this service does
    /// not handle are dropped; the rest of the rule is kept.
    pub(crate) fn into_rule(self, user_id: &str) -> Rule {
        let rule_id = self.id;
        let actions = self
            .actions
            .into_iter()
            .filter_map(|action| match action.action_type.parse::<RuleActionType>() {
                Ok(action_type) => Some(RuleAction::new(action_type, action.params.unwrap_or_default())),
                Err(e) => {
                    tracing::warn!(rule_id = %rule_id, error = %e, "dropping unsupported action");
                    None
                }
            })
            .collect();

        Rule {
            id: rule_id,
            user_id: user_id.to_string(),
            name: self.name,
            filter: self.filter.unwrap_or_default(),
            actions,
            description: self.description,
            enabled: self.enabled.unwrap_or(true),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(body: Value) -> GraphqlResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn payload_with_error_codes_is_api_error() {
        let resp = response(json!({"data": {"rules": {"errorCodes": ["UNAUTHORIZED"]}}}));
        match resp.into_payload("rules", "rules") {
            Err(ClientError::Api { operation, codes }) => {
                assert_eq!(operation, "rules");
                assert_eq!(codes, vec!["UNAUTHORIZED".to_string()]);
            }
            other => panic!("expected Api error, got: {other:?}"),
        }
    }

    #[test]
    fn top_level_errors_win() {
        let resp = response(json!({
            "data": null,
            "errors": [{"message": "bad query"}, {"message": "also bad"}]
        }));
        match resp.into_payload("rules", "rules") {
            Err(ClientError::Graphql(msg)) => assert_eq!(msg, "bad query; also bad"),
            other => panic!("expected Graphql error, got: {other:?}"),
        }
    }

    #[test]
    fn missing_field_is_decode_error() {
        let resp = response(json!({"data": {"other": {}}}));
        assert!(matches!(
            resp.into_payload("rules", "rules"),
            Err(ClientError::Decode(_))
        ));
    }

    #[test]
    fn unsupported_actions_are_dropped() {
        let wire: WireRule = serde_json::from_value(json!({
            "id": "r1",
            "name": "mixed",
            "filter": null,
            "actions": [
                {"type": "DELETE", "params": []},
                {"type": "MARK_AS_READ", "params": null},
                {"type": "ADD_LABEL", "params": ["a", "b"]}
            ]
        }))
        .unwrap();

        let rule = wire.into_rule("u1");
        assert_eq!(rule.user_id, "u1");
        assert_eq!(rule.filter, "");
        assert!(rule.enabled);
        assert_eq!(
            rule.actions,
            vec![RuleAction::mark_as_read(), RuleAction::add_label(["a", "b"])]
        );
    }
}
