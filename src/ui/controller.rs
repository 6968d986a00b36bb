// src/ui/controller.rs
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::warn;

use super::transport::{ChatTransport, ProxyReply, TransportError};

/// Bot text for a non-success reply that carries no `error` field.
pub const REQUEST_FAILED: &str = "An error occurred while processing your request";
/// Bot text when the proxy could not be reached at all.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub id: u64,
    pub sender: Sender,
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingResponse,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("draft is empty")]
    EmptyDraft,

    #[error("a request is already in flight")]
    Busy,
}

/// A submitted message waiting to be sent to the proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub text: String,
}

/// Where the conversation is shown.
pub trait ChatView {
    /// Called after every change to the message list.
    fn scroll_to_latest(&mut self, latest: &Message);

    fn set_loading(&mut self, _loading: bool) {}

    /// Out-of-band status for the user, e.g. a refused submit.
    fn notice(&mut self, _text: &str) {}
}

/// View that shows nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl ChatView for NullView {
    fn scroll_to_latest(&mut self, _latest: &Message) {}
}

/// Hands out time-derived ids that never repeat or go backwards.
#[derive(Debug)]
struct IdClock {
    now_ms: fn() -> u64,
    last: u64,
}

impl IdClock {
    fn next(&mut self) -> u64 {
        let now = (self.now_ms)();
        self.last = if now > self.last { now } else { self.last + 1 };
        self.last
    }
}

fn system_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// State of one chat page: messages, draft and whether a reply is pending.
pub struct ChatController<T, V = NullView> {
    transport: T,
    view: V,
    messages: Vec<Message>,
    input: String,
    phase: Phase,
    ids: IdClock,
}

impl<T: ChatTransport> ChatController<T, NullView> {
    pub fn new(transport: T) -> Self {
        Self::with_view(transport, NullView)
    }
}

impl<T: ChatTransport, V: ChatView> ChatController<T, V> {
    pub fn with_view(transport: T, view: V) -> Self {
        Self {
            transport,
            view,
            messages: Vec::new(),
            input: String::new(),
            phase: Phase::Idle,
            ids: IdClock { now_ms: system_millis, last: 0 },
        }
    }

    /// Replace the id time source, mostly for tests.
    pub fn with_clock(mut self, now_ms: fn() -> u64) -> Self {
        self.ids.now_ms = now_ms;
        self
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::AwaitingResponse
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// Submit the draft and wait for the reply.
    ///
    /// Returns the bot message that was appended.
    pub async fn submit(&mut self) -> Result<&Message, SubmitRejected> {
        let pending = self.begin_submit()?;
        let result = self.transport.send(&pending.text).await;
        Ok(self.complete(result))
    }

    /// First half of [`submit`](Self::submit): validate the draft, append the
    /// user message and enter `AwaitingResponse`.
    pub fn begin_submit(&mut self) -> Result<PendingRequest, SubmitRejected> {
        if self.phase == Phase::AwaitingResponse {
            return Err(SubmitRejected::Busy);
        }
        let text = self.input.trim();
        if text.is_empty() {
            return Err(SubmitRejected::EmptyDraft);
        }
        let text = text.to_string();

        self.push(Sender::User, text.clone());
        self.input.clear();
        self.set_phase(Phase::AwaitingResponse);
        Ok(PendingRequest { text })
    }

    /// Second half of [`submit`](Self::submit): append the bot message for
    /// the outcome of the call and return to `Idle`.
    pub fn complete(&mut self, result: Result<ProxyReply, TransportError>) -> &Message {
        let text = match result {
            Ok(reply) if reply.is_success() => {
                reply.body.response.unwrap_or_else(|| REQUEST_FAILED.to_string())
            }
            Ok(reply) => reply.body.error.unwrap_or_else(|| REQUEST_FAILED.to_string()),
            Err(err) => {
                warn!(error = %err, "Error fetching chat");
                UNEXPECTED_ERROR.to_string()
            }
        };

        let idx = self.push(Sender::Bot, text);
        self.set_phase(Phase::Idle);
        &self.messages[idx]
    }

    fn push(&mut self, sender: Sender, text: String) -> usize {
        let id = self.ids.next();
        self.messages.push(Message { id, sender, text });
        let idx = self.messages.len() - 1;
        self.view.scroll_to_latest(&self.messages[idx]);
        idx
    }

    fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.view.set_loading(phase == Phase::AwaitingResponse);
    }
}
