use async_trait::async_trait;
use cherry_openflow::{Message, OpenflowError, Writer};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

/// A [`Writer`] that keeps every message it is given, in order.
///
/// Write numbers are 1-based. A writer built with [`RecordingWriter::failing_at`]
/// behaves like a connection that dropped: the chosen write and every later
/// one fail with [`OpenflowError::ConnectionClosed`] and are not recorded.
#[derive(Debug, Default)]
pub struct RecordingWriter {
    messages: Mutex<Vec<Message>>,
    writes: AtomicUsize,
    fail_at: Option<usize>,
    cancel_at: Option<(usize, CancellationToken)>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails write number `n` and everything after it.
    pub fn failing_at(n: usize) -> Self {
        Self {
            fail_at: Some(n),
            ..Self::default()
        }
    }

    /// Cancels `token` right after write number `n` is recorded.
    pub fn cancelling_at(n: usize, token: CancellationToken) -> Self {
        Self {
            cancel_at: Some((n, token)),
            ..Self::default()
        }
    }

    /// Snapshot of the recorded messages.
    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().clone()
    }

    /// Protocol names of the recorded messages.
    pub fn names(&self) -> Vec<&'static str> {
        self.messages.lock().iter().map(Message::name).collect()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    /// Forgets recorded messages. Write numbering continues.
    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

#[async_trait]
impl Writer for RecordingWriter {
    async fn write(&self, msg: Message) -> cherry_openflow::Result<()> {
        let n = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_at.is_some_and(|at| n >= at) {
            return Err(OpenflowError::ConnectionClosed);
        }
        self.messages.lock().push(msg);
        if let Some((at, token)) = &self.cancel_at {
            if n == *at {
                token.cancel();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cherry_openflow::BarrierRequest;
    use pretty_assertions::assert_eq;

    fn barrier(xid: u32) -> Message {
        BarrierRequest { xid }.into()
    }

    #[tokio::test]
    async fn test_records_in_order() {
        let writer = RecordingWriter::new();
        writer.write(barrier(1)).await.unwrap();
        writer.write(barrier(2)).await.unwrap();

        let xids: Vec<_> = writer.messages().iter().map(Message::xid).collect();
        assert_eq!(xids, vec![1, 2]);
        assert_eq!(writer.names(), vec!["BARRIER_REQUEST", "BARRIER_REQUEST"]);
    }

    #[tokio::test]
    async fn test_failing_at() {
        let writer = RecordingWriter::failing_at(2);
        assert!(writer.write(barrier(1)).await.is_ok());
        assert!(writer.write(barrier(2)).await.is_err());
        assert!(writer.write(barrier(3)).await.is_err());
        assert_eq!(writer.len(), 1);
    }

    #[tokio::test]
    async fn test_cancelling_at() {
        let token = CancellationToken::new();
        let writer = RecordingWriter::cancelling_at(2, token.clone());

        writer.write(barrier(1)).await.unwrap();
        assert!(!token.is_cancelled());
        writer.write(barrier(2)).await.unwrap();
        assert!(token.is_cancelled());
    }
}
