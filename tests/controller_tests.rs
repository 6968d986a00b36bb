use chat_proxy::ui::controller::{REQUEST_FAILED, UNEXPECTED_ERROR};
use chat_proxy::ui::{
    ChatController, ChatTransport, ChatView, Message, Phase, ProxyReply, Sender, SubmitRejected,
    TransportError,
};

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Transport that answers from a fixed script and records what it was sent.
#[derive(Clone, Default)]
struct ScriptedTransport {
    sent: Arc<Mutex<Vec<String>>>,
    replies: Arc<Mutex<Vec<Result<ProxyReply, String>>>>,
}

impl ScriptedTransport {
    fn answering(replies: Vec<Result<ProxyReply, String>>) -> Self {
        let transport = Self::default();
        *transport.replies.lock().unwrap() = replies.into_iter().rev().collect();
        transport
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(&self, message: &str) -> Result<ProxyReply, TransportError> {
        self.sent.lock().unwrap().push(message.to_string());
        let next = self.replies.lock().unwrap().pop();
        match next {
            Some(Ok(reply)) => Ok(reply),
            // Any TransportError will do; the controller treats them alike.
            Some(Err(reason)) => Err(TransportError::Url(reason)),
            None => Err(TransportError::Url("no scripted reply".to_string())),
        }
    }
}

#[derive(Debug, PartialEq)]
enum ViewEvent {
    Scrolled(Sender, String),
    Loading(bool),
}

#[derive(Default)]
struct RecordingView {
    events: Vec<ViewEvent>,
}

impl ChatView for RecordingView {
    fn scroll_to_latest(&mut self, latest: &Message) {
        self.events.push(ViewEvent::Scrolled(latest.sender, latest.text.clone()));
    }

    fn set_loading(&mut self, loading: bool) {
        self.events.push(ViewEvent::Loading(loading));
    }
}

fn texts(chat: &ChatController<ScriptedTransport, RecordingView>) -> Vec<(Sender, &str)> {
    chat.messages().iter().map(|m| (m.sender, m.text.as_str())).collect()
}

#[tokio::test]
async fn test_successful_round_trip_appends_user_then_bot() {
    let transport = ScriptedTransport::answering(vec![Ok(ProxyReply::ok("hi there"))]);
    let mut chat = ChatController::with_view(transport.clone(), RecordingView::default());

    assert!(!chat.is_loading());
    chat.set_input("  hello ");
    let reply = chat.submit().await.unwrap();
    assert_eq!(reply.text, "hi there");

    assert!(!chat.is_loading());
    assert_eq!(chat.input(), "");
    assert_eq!(texts(&chat), vec![(Sender::User, "hello"), (Sender::Bot, "hi there")]);
    assert_eq!(transport.sent(), vec!["hello"]);
    assert!(chat.messages()[0].id < chat.messages()[1].id);

    assert_eq!(
        chat.view().events,
        vec![
            ViewEvent::Scrolled(Sender::User, "hello".into()),
            ViewEvent::Loading(true),
            ViewEvent::Scrolled(Sender::Bot, "hi there".into()),
            ViewEvent::Loading(false),
        ]
    );
}

#[tokio::test]
async fn test_whitespace_draft_is_ignored() {
    let transport = ScriptedTransport::default();
    let mut chat = ChatController::with_view(transport.clone(), RecordingView::default());

    for draft in ["", "   ", "\n\t "] {
        chat.set_input(draft);
        assert_eq!(chat.submit().await.unwrap_err(), SubmitRejected::EmptyDraft);
    }

    assert!(chat.messages().is_empty());
    assert!(transport.sent().is_empty());
    assert!(chat.view().events.is_empty());
    assert!(!chat.is_loading());
}

#[tokio::test]
async fn test_error_status_shows_error_field_or_fallback() {
    let transport = ScriptedTransport::answering(vec![
        Ok(ProxyReply::failed(400, Some("Message content is required".into()))),
        Ok(ProxyReply::failed(500, None)),
    ]);
    let mut chat = ChatController::with_view(transport, RecordingView::default());

    chat.set_input("first");
    chat.submit().await.unwrap();
    chat.set_input("second");
    chat.submit().await.unwrap();

    assert_eq!(
        texts(&chat),
        vec![
            (Sender::User, "first"),
            (Sender::Bot, "Message content is required"),
            (Sender::User, "second"),
            (Sender::Bot, REQUEST_FAILED),
        ]
    );
}

#[tokio::test]
async fn test_transport_failure_becomes_bot_message() {
    let transport = ScriptedTransport::answering(vec![Err("connection refused".into())]);
    let mut chat = ChatController::with_view(transport, RecordingView::default());

    chat.set_input("hello");
    let reply = chat.submit().await.unwrap();

    assert_eq!(reply.sender, Sender::Bot);
    assert_eq!(reply.text, UNEXPECTED_ERROR);
    assert_eq!(chat.phase(), Phase::Idle);
}

#[test]
fn test_second_submit_while_awaiting_is_rejected() {
    let mut chat =
        ChatController::with_view(ScriptedTransport::default(), RecordingView::default());

    chat.set_input("one");
    let pending = chat.begin_submit().unwrap();
    assert_eq!(pending.text, "one");
    assert!(chat.is_loading());

    chat.set_input("two");
    assert_eq!(chat.begin_submit().unwrap_err(), SubmitRejected::Busy);
    assert_eq!(chat.input(), "two", "draft survives a rejected submit");
    assert_eq!(chat.messages().len(), 1);

    chat.complete(Ok(ProxyReply::ok("reply to one")));
    assert_eq!(chat.phase(), Phase::Idle);

    let pending = chat.begin_submit().unwrap();
    assert_eq!(pending.text, "two");
    chat.complete(Ok(ProxyReply::ok("reply to two")));

    assert_eq!(
        texts(&chat),
        vec![
            (Sender::User, "one"),
            (Sender::Bot, "reply to one"),
            (Sender::User, "two"),
            (Sender::Bot, "reply to two"),
        ]
    );
}

#[test]
fn test_ids_increase_even_on_a_stopped_clock() {
    fn stopped() -> u64 {
        42
    }
    let mut chat = ChatController::with_view(ScriptedTransport::default(), RecordingView::default())
        .with_clock(stopped);

    for text in ["a", "b", "c"] {
        chat.set_input(text);
        chat.begin_submit().unwrap();
        chat.complete(Ok(ProxyReply::ok("ok")));
    }

    let ids: Vec<u64> = chat.messages().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![42, 43, 44, 45, 46, 47]);
}
