//! Testing utilities for SimForge workspace
//!
//! Scripted providers and artifact fixtures shared by integration tests.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use simforge_provider::{CompletionProvider, CompletionRequest, ProviderError, ProviderInfo};
use std::collections::VecDeque;

/// Provider that answers from a fixed queue and records every request
///
/// Calls past the end of the script fail with `InvalidResponse` so a test
/// that makes one call too many fails loudly.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    supports_vision: bool,
}

impl ScriptedProvider {
    pub fn new<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = Result<String, ProviderError>>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
            supports_vision: false,
        }
    }

    /// Script of successful replies only
    pub fn replying<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(replies.into_iter().map(|r| Ok(r.into())))
    }

    #[must_use]
    pub fn with_vision(mut self, supports_vision: bool) -> Self {
        self.supports_vision = supports_vision;
        self
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Replies not yet consumed
    pub fn remaining(&self) -> usize {
        self.replies.lock().len()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        self.requests.lock().push(request);
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::InvalidResponse("script exhausted".into())))
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "scripted".to_string(),
            model: "scripted-model".to_string(),
            supports_vision: self.supports_vision,
        }
    }
}

pub mod fixtures {
    //! Canned model outputs

    /// Minimal valid component: balanced, no imports, has a return
    pub const COUNTER_COMPONENT: &str = "function Simulation() {\n  const [count, setCount] = useState(0);\n  return <button onClick={() => setCount(count + 1)}>Clicked {count} times</button>;\n}";

    /// Component with a stray closing parenthesis
    pub const BROKEN_COMPONENT: &str = "function Simulation() {\n  const [count, setCount] = useState(0));\n  return <button>{count}</button>;\n}";

    pub const COUNTER_PLAN: &str = "1. Keep a count in state\n2. Render a button showing the count\n3. Increment on click";

    pub const TRAILING_COMMA_COMMANDS: &str = r#"{"commands": ["a = Slider(0,5,0.1)",]}"#;

    pub const VALID: &str = "VALID";

    /// Wrap source in a markdown fence with some chatter around it
    pub fn fenced(lang: &str, body: &str) -> String {
        format!("Here is the result you asked for.\n\n```{lang}\n{body}\n```\n\nLet me know if anything should change.")
    }
}
