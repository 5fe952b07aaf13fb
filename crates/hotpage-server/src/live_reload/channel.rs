//! Notification channel carrying rendered fragments to one browser.
//!
//! A channel is the sending half of a bounded queue whose receiving half is
//! drained into a WebSocket by [`pump`]. Each frame is built with a
//! [`TextFrameWriter`] and sent as one text message.

use std::io;

use axum::extract::ws::{Message, WebSocket};
use tokio::sync::mpsc;

use super::error::ChannelError;

/// Frames queued per connection before senders wait.
const FRAME_BUFFER: usize = 16;

/// Receiving half of a notification channel.
pub type FrameReceiver = mpsc::Receiver<String>;

/// Outbound half of a live reload connection.
#[derive(Debug)]
pub struct NotificationChannel {
    tx: mpsc::Sender<String>,
}

impl NotificationChannel {
    /// Create a channel and the receiver its frames arrive on.
    #[must_use]
    pub fn new() -> (Self, FrameReceiver) {
        let (tx, rx) = mpsc::channel(FRAME_BUFFER);
        (Self { tx }, rx)
    }

    /// Open a writer for the next text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Closed`] if the receiving side is gone.
    pub fn next_text_writer(&self) -> Result<TextFrameWriter, ChannelError> {
        if self.tx.is_closed() {
            return Err(ChannelError::Closed);
        }
        Ok(TextFrameWriter {
            buf: Vec::new(),
            tx: self.tx.clone(),
        })
    }
}

/// Buffer for one outbound text frame.
///
/// Nothing is sent until [`finish`](Self::finish); dropping the writer
/// discards the frame.
#[derive(Debug)]
pub struct TextFrameWriter {
    buf: Vec<u8>,
    tx: mpsc::Sender<String>,
}

impl TextFrameWriter {
    /// Send the buffered frame.
    ///
    /// Waits while the connection's queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError`] if the content is not UTF-8 or the receiving
    /// side closed.
    pub async fn finish(self) -> Result<(), ChannelError> {
        let text = String::from_utf8(self.buf)?;
        self.tx.send(text).await.map_err(|_| ChannelError::Closed)
    }
}

impl io::Write for TextFrameWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Forward queued frames to the socket until either side closes.
///
/// Incoming messages are read only to notice disconnects.
pub(crate) async fn pump(mut socket: WebSocket, mut frames: FrameReceiver) {
    loop {
        tokio::select! {
            frame = frames.recv() => {
                let Some(frame) = frame else {
                    // Channel was superseded
                    break;
                };
                if let Err(e) = socket.send(Message::Text(frame.into())).await {
                    tracing::warn!(error = %e, "Failed to send live reload frame");
                    break;
                }
            }
            message = socket.recv() => {
                match message {
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
    tracing::debug!("Live reload connection closed");
}
