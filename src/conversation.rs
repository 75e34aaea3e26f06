//! conversation.rs: bounded chat context per session, fed to the model as
//! conversation history. The rule-based responder ignores it.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub const DEFAULT_SESSION: &str = "default";
const MAX_SESSIONS: usize = 1_000;

/// Last `cap` turns (user and assistant alternating), oldest first.
#[derive(Debug, Clone, Default)]
pub struct ConversationContext {
    turns: VecDeque<String>,
    cap: usize,
}

impl ConversationContext {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            turns: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, turn: impl Into<String>) {
        self.turns.push_back(turn.into());
        while self.turns.len() > self.cap {
            self.turns.pop_front();
        }
    }

    pub fn turns(&self) -> Vec<String> {
        self.turns.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[derive(Debug, Default)]
struct Inner {
    sessions: HashMap<String, ConversationContext>,
    order: VecDeque<String>,
}

/// Thread-safe map of session id -> context. The oldest session is evicted
/// once `MAX_SESSIONS` is reached.
#[derive(Debug)]
pub struct ConversationStore {
    inner: Mutex<Inner>,
    context_len: usize,
}

impl ConversationStore {
    pub fn new(context_len: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            context_len,
        }
    }

    /// Record a turn and return the session's context after it.
    pub fn record(&self, session: &str, turn: &str) -> Vec<String> {
        let mut g = self.inner.lock().expect("conversation mutex poisoned");
        if !g.sessions.contains_key(session) {
            if g.order.len() >= MAX_SESSIONS {
                if let Some(oldest) = g.order.pop_front() {
                    g.sessions.remove(&oldest);
                }
            }
            g.order.push_back(session.to_string());
            g.sessions.insert(
                session.to_string(),
                ConversationContext::with_capacity(self.context_len),
            );
        }
        match g.sessions.get_mut(session) {
            Some(ctx) => {
                ctx.push(turn);
                ctx.turns()
            }
            None => Vec::new(),
        }
    }

    pub fn snapshot(&self, session: &str) -> Vec<String> {
        let g = self.inner.lock().expect("conversation mutex poisoned");
        g.sessions
            .get(session)
            .map(ConversationContext::turns)
            .unwrap_or_default()
    }

    pub fn session_count(&self) -> usize {
        self.inner
            .lock()
            .expect("conversation mutex poisoned")
            .sessions
            .len()
    }
}
