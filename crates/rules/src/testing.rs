//! In-memory collaborators for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use rulehook_client::{ActionApi, ClientError, RuleStore, TokenIssuer};
use rulehook_core::Rule;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    AddLabels {
        token: String,
        item_id: String,
        labels: Vec<String>,
    },
    Archive {
        token: String,
        item_id: String,
    },
    MarkAsRead {
        token: String,
        item_id: String,
    },
    Notify {
        token: String,
        message: String,
    },
}

impl Call {
    pub(crate) fn add_labels(token: &str, item_id: &str, labels: &[&str]) -> Self {
        Call::AddLabels {
            token: token.to_string(),
            item_id: item_id.to_string(),
            labels: labels.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub(crate) fn archive(token: &str, item_id: &str) -> Self {
        Call::Archive {
            token: token.to_string(),
            item_id: item_id.to_string(),
        }
    }

    pub(crate) fn mark_as_read(token: &str, item_id: &str) -> Self {
        Call::MarkAsRead {
            token: token.to_string(),
            item_id: item_id.to_string(),
        }
    }

    pub(crate) fn notify(token: &str, message: &str) -> Self {
        Call::Notify {
            token: token.to_string(),
            message: message.to_string(),
        }
    }
}

/// Records every call; operations named in `failing` return an error and
/// those in `hanging` never complete.
#[derive(Default)]
pub(crate) struct RecordingApi {
    calls: Mutex<Vec<Call>>,
    failing: Vec<&'static str>,
    hanging: Vec<&'static str>,
}

impl RecordingApi {
    pub(crate) fn failing(mut self, ops: &[&'static str]) -> Self {
        self.failing.extend_from_slice(ops);
        self
    }

    pub(crate) fn hanging(mut self, ops: &[&'static str]) -> Self {
        self.hanging.extend_from_slice(ops);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(&self, op: &'static str, call: Call) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(call);
        if self.hanging.contains(&op) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.failing.contains(&op) {
            return Err(ClientError::Status {
                operation: op.to_string(),
                status: 500,
                body: "mock failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ActionApi for RecordingApi {
    async fn add_labels(
        &self,
        token: &str,
        item_id: &str,
        labels: &[String],
    ) -> Result<(), ClientError> {
        let call = Call::AddLabels {
            token: token.to_string(),
            item_id: item_id.to_string(),
            labels: labels.to_vec(),
        };
        self.record("add_labels", call).await
    }

    async fn archive(&self, token: &str, item_id: &str) -> Result<(), ClientError> {
        self.record("archive", Call::archive(token, item_id)).await
    }

    async fn mark_as_read(&self, token: &str, item_id: &str) -> Result<(), ClientError> {
        self.record("mark_as_read", Call::mark_as_read(token, item_id))
            .await
    }

    async fn send_notification(&self, token: &str, message: &str) -> Result<(), ClientError> {
        self.record("notify", Call::notify(token, message)).await
    }

    fn api_name(&self) -> &str {
        "recording"
    }
}

/// Serves a fixed rule list, or fails when `fail` is set.
#[derive(Default)]
pub(crate) struct FakeStore {
    pub(crate) rules: Vec<Rule>,
    pub(crate) fail: bool,
    pub(crate) tokens: Mutex<Vec<String>>,
}

impl FakeStore {
    pub(crate) fn with_rules(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
impl RuleStore for FakeStore {
    async fn enabled_rules(&self, _user_id: &str, token: &str) -> Result<Vec<Rule>, ClientError> {
        self.tokens.lock().unwrap().push(token.to_string());
        if self.fail {
            return Err(ClientError::Api {
                operation: "rules".to_string(),
                codes: vec!["UNAUTHORIZED".to_string()],
            });
        }
        Ok(self.rules.clone())
    }
}

/// Issues `tok-{n}` for the n-th call (1-based). Calls listed in
/// `fail_calls` return an error instead.
#[derive(Default)]
pub(crate) struct CountingIssuer {
    issued: AtomicUsize,
    fail_calls: Vec<usize>,
}

impl CountingIssuer {
    pub(crate) fn failing_on(calls: &[usize]) -> Self {
        Self {
            issued: AtomicUsize::new(0),
            fail_calls: calls.to_vec(),
        }
    }

    pub(crate) fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TokenIssuer for CountingIssuer {
    async fn issue(&self, _user_id: &str) -> Result<String, ClientError> {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_calls.contains(&n) {
            return Err(ClientError::Decode(format!("token issue {n} refused")));
        }
        Ok(format!("tok-{n}"))
    }
}
