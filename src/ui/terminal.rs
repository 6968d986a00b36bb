// src/ui/terminal.rs
use std::fmt;
use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::debug;

use super::controller::{ChatController, ChatView, Message, Sender, SubmitRejected};
use super::transport::ChatTransport;

pub const QUIT: &str = "/quit";
pub const STILL_WAITING: &str = "(still waiting for the last reply)";

/// Writes each new message as it lands at the bottom of the conversation.
pub struct TerminalView<W> {
    out: W,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    // A broken terminal must not take the conversation down with it.
    fn emit(&mut self, args: fmt::Arguments<'_>, flush: bool) {
        let result = self.out.write_fmt(args).and_then(|()| {
            if flush { self.out.flush() } else { Ok(()) }
        });
        if let Err(err) = result {
            debug!(error = %err, "failed to write to terminal");
        }
    }
}

impl<W: Write> ChatView for TerminalView<W> {
    fn scroll_to_latest(&mut self, latest: &Message) {
        match latest.sender {
            Sender::User => self.emit(format_args!("you > {}\n", latest.text), false),
            Sender::Bot => self.emit(format_args!("bot > {}\n\n", latest.text), false),
        }
    }

    fn set_loading(&mut self, loading: bool) {
        if loading {
            self.emit(format_args!("bot > ...\r"), true);
        }
    }

    fn notice(&mut self, text: &str) {
        self.emit(format_args!("{text}\n"), false);
    }
}

/// Feeds input lines into the controller until [`QUIT`] or end of input.
///
/// Input keeps being read while a reply is pending; lines typed meanwhile are
/// refused by the controller. At end of input the pending reply, if any, is
/// still waited for. Returns how many lines were refused.
pub async fn run<R, T, V>(chat: &mut ChatController<T, V>, input: R) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    T: ChatTransport + Clone + 'static,
    V: ChatView,
{
    let (replies_tx, mut replies) = mpsc::unbounded_channel();
    let mut lines = input.lines();
    let mut refused = 0;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    if chat.is_loading() {
                        if let Some(result) = replies.recv().await {
                            chat.complete(result);
                        }
                    }
                    break;
                };
                if line.trim() == QUIT {
                    break;
                }
                chat.set_input(line);
                match chat.begin_submit() {
                    Ok(pending) => {
                        let transport = chat.transport().clone();
                        let replies_tx = replies_tx.clone();
                        tokio::spawn(async move {
                            replies_tx.send(transport.send(&pending.text).await).ok();
                        });
                    }
                    Err(SubmitRejected::EmptyDraft) => {}
                    Err(SubmitRejected::Busy) => {
                        refused += 1;
                        chat.view_mut().notice(STILL_WAITING);
                    }
                }
            }
            Some(result) = replies.recv() => {
                chat.complete(result);
            }
        }
    }
    Ok(refused)
}
