//! Executes a matched rule's actions against the action APIs.
//!
//! Actions run one at a time in list order. A failing action is logged and
//! recorded; it does not stop the actions after it.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use rulehook_client::ActionApi;
use rulehook_core::{EventData, Rule, RuleAction, RuleActionType};

use crate::error::{EngineError, Result};
use crate::guard::CallGuard;

/// What a single action did when it ran without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// `calls` remote operations were made.
    Applied { calls: usize },
    /// The event or action lacked the data the action needs.
    Skipped { reason: String },
}

/// Final state of one action in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchStatus {
    Applied { calls: usize },
    Skipped { reason: String },
    Failed { error: String },
}

impl From<ActionOutcome> for DispatchStatus {
    fn from(outcome: ActionOutcome) -> Self {
        match outcome {
            ActionOutcome::Applied { calls } => DispatchStatus::Applied { calls },
            ActionOutcome::Skipped { reason } => DispatchStatus::Skipped { reason },
        }
    }
}

/// Result of dispatching one action of one rule.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchResult {
    pub rule_id: String,
    /// Position of the action in the rule's list.
    pub action_index: usize,
    pub action: RuleActionType,
    #[serde(flatten)]
    pub status: DispatchStatus,
    pub duration_ms: u64,
}

impl DispatchResult {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, DispatchStatus::Failed { .. })
    }
}

/// Routes rule actions to the [`ActionApi`].
pub struct ActionDispatcher {
    api: Arc<dyn ActionApi>,
    guard: CallGuard,
}

impl ActionDispatcher {
    pub fn new(api: Arc<dyn ActionApi>, guard: CallGuard) -> Self {
        Self { api, guard }
    }

    /// Run one action. Missing preconditions produce
    /// [`ActionOutcome::Skipped`]; remote failures are returned as errors.
    pub async fn dispatch(
        &self,
        action: &RuleAction,
        event: &EventData,
        token: &str,
    ) -> Result<ActionOutcome> {
        self.guard.check()?;

        let item_id = event.id.as_deref().filter(|id| !id.is_empty());

        match action.action_type {
            RuleActionType::AddLabel => {
                let Some(item_id) = item_id.filter(|_| !action.params.is_empty()) else {
                    return Ok(invalid_data(action, event));
                };
                self.guard
                    .call(self.api.add_labels(token, item_id, &action.params))
                    .await?;
                Ok(ActionOutcome::Applied { calls: 1 })
            }
            RuleActionType::Archive => {
                let Some(item_id) = item_id else {
                    return Ok(invalid_data(action, event));
                };
                self.guard.call(self.api.archive(token, item_id)).await?;
                Ok(ActionOutcome::Applied { calls: 1 })
            }
            RuleActionType::MarkAsRead => {
                let Some(item_id) = item_id else {
                    return Ok(invalid_data(action, event));
                };
                self.guard.call(self.api.mark_as_read(token, item_id)).await?;
                Ok(ActionOutcome::Applied { calls: 1 })
            }
            RuleActionType::SendNotification => {
                for message in &action.params {
                    self.guard.check()?;
                    self.guard
                        .call(self.api.send_notification(token, message))
                        .await?;
                }
                Ok(ActionOutcome::Applied {
                    calls: action.params.len(),
                })
            }
        }
    }

    /// Run every action of `rule` in order, isolating failures per action.
    ///
    /// Only cancellation ends the loop early; it is returned as an error.
    pub async fn dispatch_all(
        &self,
        rule: &Rule,
        event: &EventData,
        token: &str,
    ) -> Result<Vec<DispatchResult>> {
        if !rule.has_effect() {
            tracing::debug!(rule_id = %rule.id, "rule has no actions");
            return Ok(Vec::new());
        }

        let mut results = Vec::with_capacity(rule.actions.len());

        for (index, action) in rule.actions.iter().enumerate() {
            let start = Instant::now();
            let result = self.dispatch(action, event, token).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            let status = match result {
                Ok(outcome) => {
                    if let ActionOutcome::Applied { calls } = outcome {
                        tracing::info!(
                            rule_id = %rule.id,
                            action = %action.action_type,
                            api = self.api.api_name(),
                            calls,
                            duration_ms,
                            "Action applied"
                        );
                    }
                    DispatchStatus::from(outcome)
                }
                Err(EngineError::Cancelled) => return Err(EngineError::Cancelled),
                Err(e) => {
                    tracing::warn!(
                        rule_id = %rule.id,
                        action = %action.action_type,
                        api = self.api.api_name(),
                        error = %e,
                        duration_ms,
                        "Action failed"
                    );
                    DispatchStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };

            results.push(DispatchResult {
                rule_id: rule.id.clone(),
                action_index: index,
                action: action.action_type,
                status,
                duration_ms,
            });
        }

        Ok(results)
    }
}

fn invalid_data(action: &RuleAction, event: &EventData) -> ActionOutcome {
    tracing::debug!(
        action = %action.action_type,
        item_id = ?event.id,
        params = action.params.len(),
        "invalid data, skipping action"
    );
    let reason = match action.action_type {
        RuleActionType::AddLabel if event.id.as_deref().is_some_and(|id| !id.is_empty()) => {
            "no labels to add"
        }
        _ => "event has no item id",
    };
    ActionOutcome::Skipped {
        reason: reason.to_string(),
    }
}
