//! Append-only transcript of rendered chat messages

use tokio::sync::mpsc;
use tracing::debug;

use crate::{
    error::{ClientError, Result},
    format::{escape, format},
    types::{MessageHandle, Sender, TranscriptMessage},
};

/// Change notification for front ends rendering the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    /// A new block was appended
    Appended {
        handle: MessageHandle,
        sender: Sender,
        raw_text: String,
        display_html: String,
    },
    /// The streaming block was re-rendered from its full text
    Updated {
        handle: MessageHandle,
        raw_text: String,
        display_html: String,
    },
}

/// Scrollable message container
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<TranscriptMessage>,
    scrolled_to: Option<MessageHandle>,
    subscribers: Vec<mpsc::UnboundedSender<TranscriptEvent>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished message. User text is escaped only, bot text is
    /// formatted.
    pub fn append_message(&mut self, text: &str, sender: Sender) -> MessageHandle {
        let display_html = match sender {
            Sender::User => escape(text).into_owned(),
            Sender::Bot => format(text),
        };
        self.push(sender, text, display_html)
    }

    /// Append an empty bot block to be filled by a streaming session
    pub fn begin_streaming_message(&mut self) -> MessageHandle {
        self.push(Sender::Bot, "", String::new())
    }

    /// Re-render a streaming block from the entire text received so far.
    ///
    /// Markers can be split across chunks, so the block is always rebuilt
    /// from the full text rather than patched with the latest chunk.
    pub fn update_streaming_message(&mut self, handle: MessageHandle, full_text: &str) -> Result<()> {
        let message = self
            .messages
            .get_mut(handle.0)
            .filter(|m| m.sender == Sender::Bot)
            .ok_or(ClientError::UnknownMessage(handle))?;

        message.display_html = format(full_text);
        let display_html = message.display_html.clone();
        self.scroll_to_newest();
        self.broadcast(TranscriptEvent::Updated {
            handle,
            raw_text: full_text.to_string(),
            display_html,
        });
        Ok(())
    }

    /// Look up a rendered message
    pub fn get(&self, handle: MessageHandle) -> Option<&TranscriptMessage> {
        self.messages.get(handle.0)
    }

    pub fn messages(&self) -> &[TranscriptMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The block currently scrolled into view
    pub fn scrolled_to(&self) -> Option<MessageHandle> {
        self.scrolled_to
    }

    /// Receive every subsequent append and update
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<TranscriptEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    fn push(&mut self, sender: Sender, raw_text: &str, display_html: String) -> MessageHandle {
        let handle = MessageHandle(self.messages.len());
        self.messages.push(TranscriptMessage {
            sender,
            display_html: display_html.clone(),
        });
        debug!(message = handle.0, ?sender, "appended transcript message");
        self.scroll_to_newest();
        self.broadcast(TranscriptEvent::Appended {
            handle,
            sender,
            raw_text: raw_text.to_string(),
            display_html,
        });
        handle
    }

    fn scroll_to_newest(&mut self) {
        if !self.messages.is_empty() {
            self.scrolled_to = Some(MessageHandle(self.messages.len() - 1));
        }
    }

    fn broadcast(&mut self, event: TranscriptEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
