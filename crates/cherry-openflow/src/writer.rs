//! Connection writer abstraction.

use crate::message::Message;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Transmits messages on one switch connection.
///
/// `write` completes once the message has been handed to the connection;
/// it says nothing about when the switch applies it. Use a barrier for
/// switch-side ordering.
#[async_trait]
pub trait Writer: Send + Sync {
    async fn write(&self, msg: Message) -> Result<()>;
}

#[async_trait]
impl<W: Writer + ?Sized> Writer for Arc<W> {
    async fn write(&self, msg: Message) -> Result<()> {
        (**self).write(msg).await
    }
}
