//! Client side of the chat: the page state machine and its link to the proxy.
pub mod controller;
pub mod terminal;
pub mod transport;

pub use controller::{ChatController, ChatView, Message, NullView, Phase, Sender, SubmitRejected};
pub use transport::{ChatTransport, HttpTransport, ProxyReply, TransportError};
