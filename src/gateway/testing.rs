//! In-memory agents and credential sources for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::agent::{AgentError, AgentExecutor, AgentFactory, SessionOptions};
use crate::config::{CredentialSource, GITHUB_TOKEN_VAR, OPENROUTER_API_KEY_VAR};

/// Factory whose executors return a fixed outcome and record what they saw.
pub struct StubFactory {
    outcome: Result<Vec<u8>, String>,
    calls: AtomicUsize,
    pub sessions: Mutex<Vec<SessionOptions>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl StubFactory {
    pub fn ok(output: &str) -> Arc<Self> {
        Self::with(Ok(output.as_bytes().to_vec()))
    }

    /// Executors exit non-zero with `stderr`.
    pub fn failing(stderr: &str) -> Arc<Self> {
        Self::with(Err(stderr.to_string()))
    }

    fn with(outcome: Result<Vec<u8>, String>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
            sessions: Mutex::new(Vec::new()),
            prompts: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

struct StubExecutor {
    outcome: Result<Vec<u8>, String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl AgentExecutor for StubExecutor {
    async fn execute(
        &self,
        _cancel: &CancellationToken,
        prompt: &str,
    ) -> Result<Vec<u8>, AgentError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.outcome.clone().map_err(|stderr| AgentError::Exited {
            status: "exit status: 1".to_string(),
            stderr,
        })
    }
}

impl AgentFactory for StubFactory {
    fn create(&self, options: SessionOptions) -> Result<Box<dyn AgentExecutor>, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sessions.lock().unwrap().push(options);
        Ok(Box::new(StubExecutor {
            outcome: self.outcome.clone(),
            prompts: Arc::clone(&self.prompts),
        }))
    }
}

/// Credential source tests can change between calls.
#[derive(Default)]
pub struct MutableSource(Mutex<HashMap<String, String>>);

impl MutableSource {
    /// Both credentials set.
    pub fn full() -> Arc<Self> {
        let source = Self::default();
        source.set(OPENROUTER_API_KEY_VAR, "sk-or-1");
        source.set(GITHUB_TOKEN_VAR, "ghs-1");
        Arc::new(source)
    }

    pub fn set(&self, name: &str, value: &str) {
        self.0.lock().unwrap().insert(name.to_string(), value.to_string());
    }

    pub fn remove(&self, name: &str) {
        self.0.lock().unwrap().remove(name);
    }
}

impl CredentialSource for MutableSource {
    fn lookup(&self, name: &str) -> Option<String> {
        self.0.lock().unwrap().get(name).cloned()
    }
}
