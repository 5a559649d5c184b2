//! Rule, action, and event types shared by the client and the engine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A user-defined automation rule, as returned by the rule store.
///
/// The engine only ever reads a snapshot of a rule; creation and updates
/// happen upstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub name: String,
    /// Raw filter query, parsed on every evaluation.
    #[serde(default)]
    pub filter: String,
    #[serde(default)]
    pub actions: Vec<RuleAction>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_enabled() -> bool {
    true
}

impl Rule {
    /// Minimal enabled rule with no timestamps or description.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        filter: impl Into<String>,
        actions: Vec<RuleAction>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: String::new(),
            name: name.into(),
            filter: filter.into(),
            actions,
            description: None,
            enabled: true,
            created_at: None,
            updated_at: None,
        }
    }

    /// A rule with no actions matches silently and does nothing.
    pub fn has_effect(&self) -> bool {
        !self.actions.is_empty()
    }
}

/// Closed set of things a rule can do to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleActionType {
    #[serde(rename = "ADD_LABEL", alias = "AddLabel")]
    AddLabel,
    #[serde(rename = "ARCHIVE", alias = "Archive")]
    Archive,
    #[serde(rename = "MARK_AS_READ", alias = "MarkAsRead")]
    MarkAsRead,
    #[serde(rename = "SEND_NOTIFICATION", alias = "SendNotification")]
    SendNotification,
}

impl RuleActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleActionType::AddLabel => "ADD_LABEL",
            RuleActionType::Archive => "ARCHIVE",
            RuleActionType::MarkAsRead => "MARK_AS_READ",
            RuleActionType::SendNotification => "SEND_NOTIFICATION",
        }
    }
}

impl fmt::Display for RuleActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleActionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD_LABEL" | "AddLabel" => Ok(RuleActionType::AddLabel),
            "ARCHIVE" | "Archive" => Ok(RuleActionType::Archive),
            "MARK_AS_READ" | "MarkAsRead" => Ok(RuleActionType::MarkAsRead),
            "SEND_NOTIFICATION" | "SendNotification" => Ok(RuleActionType::SendNotification),
            other => Err(CoreError::InvalidActionType(other.to_string())),
        }
    }
}

/// One step of a rule. `params` carry label names for `AddLabel` and
/// message bodies for `SendNotification`; the other kinds ignore them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleAction {
    #[serde(rename = "type")]
    pub action_type: RuleActionType,
    #[serde(default)]
    pub params: Vec<String>,
}

impl RuleAction {
    pub fn new(action_type: RuleActionType, params: Vec<String>) -> Self {
        Self { action_type, params }
    }

    pub fn add_label<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            RuleActionType::AddLabel,
            labels.into_iter().map(Into::into).collect(),
        )
    }

    pub fn archive() -> Self {
        Self::new(RuleActionType::Archive, Vec::new())
    }

    pub fn mark_as_read() -> Self {
        Self::new(RuleActionType::MarkAsRead, Vec::new())
    }

    pub fn send_notification<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            RuleActionType::SendNotification,
            messages.into_iter().map(Into::into).collect(),
        )
    }
}

/// The change notification that triggers a rule pass.
///
/// Only the fields the engine reads are modelled; anything else in the
/// upstream payload is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub subscription: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl EventData {
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_subscription(mut self, subscription: impl Into<String>) -> Self {
        self.subscription = Some(subscription.into());
        self
    }
}
