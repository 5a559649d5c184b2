//! Rule pass orchestration.
//!
//! Loads a user's enabled rules, gates each one on its filter, and hands the
//! matching rules to the [`ActionDispatcher`]. Rules run in store order and
//! actions in list order; nothing runs concurrently.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use rulehook_client::{ActionApi, ApiClient, JwtTokenIssuer, RuleStore, TokenIssuer};
use rulehook_core::{Config, EventData};

use crate::dispatcher::{ActionDispatcher, DispatchResult};
use crate::error::{EngineError, Result};
use crate::evaluator::is_valid;
use crate::guard::CallGuard;

/// A matched rule whose actions never ran.
#[derive(Debug, Clone, Serialize)]
pub struct RuleFailure {
    pub rule_id: String,
    pub error: String,
}

/// Everything that happened during one pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub user_id: String,
    pub rules_evaluated: usize,
    /// IDs of rules whose filter matched, in evaluation order.
    pub rules_matched: Vec<String>,
    pub results: Vec<DispatchResult>,
    pub rule_errors: Vec<RuleFailure>,
}

impl RunReport {
    fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            ..Self::default()
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &DispatchResult> {
        self.results.iter().filter(|r| r.is_failure())
    }

    /// True when no rule or action failed.
    pub fn is_clean(&self) -> bool {
        self.rule_errors.is_empty() && self.failures().next().is_none()
    }
}

/// Evaluates a user's rules against one event.
pub struct RuleEngine {
    store: Arc<dyn RuleStore>,
    tokens: Arc<dyn TokenIssuer>,
    actions: Arc<dyn ActionApi>,
    guard: CallGuard,
}

impl RuleEngine {
    pub fn new(
        store: Arc<dyn RuleStore>,
        tokens: Arc<dyn TokenIssuer>,
        actions: Arc<dyn ActionApi>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            store,
            tokens,
            actions,
            guard: CallGuard::new(request_timeout),
        }
    }

    /// Wire the HTTP API client and JWT issuer from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Arc::new(ApiClient::from_config(config)?);
        let tokens = Arc::new(JwtTokenIssuer::new(&config.jwt_secret, config.token_ttl));
        Ok(Self::new(
            client.clone(),
            tokens,
            client,
            config.request_timeout,
        ))
    }

    /// Abort the run (including in-flight calls) when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.guard = self.guard.with_cancellation(cancel);
        self
    }

    /// Run every enabled rule of `user_id` against `event`.
    ///
    /// Failing to obtain the initial token or the rule list aborts the run.
    /// After that, failures are confined to the rule (token issue) or the
    /// action (remote call) they happened in and are reported, not raised.
    pub async fn run(&self, user_id: &str, event: &EventData) -> Result<RunReport> {
        self.guard.check()?;

        let token = self.guard.call(self.tokens.issue(user_id)).await?;
        let rules = self
            .guard
            .call(self.store.enabled_rules(user_id, &token))
            .await?;

        tracing::info!(
            user_id,
            rules = rules.len(),
            item_id = ?event.id,
            subscription = ?event.subscription,
            "Evaluating rules"
        );

        let dispatcher = ActionDispatcher::new(self.actions.clone(), self.guard.clone());
        let mut report = RunReport::new(user_id);

        for rule in &rules {
            self.guard.check()?;

            if !rule.enabled {
                tracing::debug!(rule_id = %rule.id, "skipping disabled rule");
                continue;
            }
            report.rules_evaluated += 1;

            if !is_valid(&rule.filter, event) {
                tracing::debug!(rule_id = %rule.id, filter = %rule.filter, "filter did not match");
                continue;
            }
            report.rules_matched.push(rule.id.clone());

            // Fresh token per matched rule.
            let token = match self.guard.call(self.tokens.issue(user_id)).await {
                Ok(token) => token,
                Err(EngineError::Cancelled) => return Err(EngineError::Cancelled),
                Err(e) => {
                    tracing::warn!(rule_id = %rule.id, error = %e, "could not issue token for rule");
                    report.rule_errors.push(RuleFailure {
                        rule_id: rule.id.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            tracing::info!(rule_id = %rule.id, name = %rule.name, actions = rule.actions.len(), "Rule matched");
            let results = dispatcher.dispatch_all(rule, event, &token).await?;
            report.results.extend(results);
        }

        tracing::info!(
            user_id,
            evaluated = report.rules_evaluated,
            matched = report.rules_matched.len(),
            failed_actions = report.failures().count(),
            rule_errors = report.rule_errors.len(),
            "Rule pass complete"
        );

        Ok(report)
    }
}
