//! Continuation sink: where resume invocations go.
//!
//! The engine never invokes itself directly; it hands the resume payload to a
//! [ContinuationSink]. A platform RPC, a durable queue or an in-process
//! channel are all valid transports.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::BoxError;
use crate::types::JobInvocation;

/// Accepts a fire-and-forget invocation of a logical job entry point.
#[async_trait]
pub trait ContinuationSink: Send + Sync {
  async fn dispatch(&self, invocation: JobInvocation) -> Result<(), BoxError>;
}

/// In-process sink backed by an unbounded channel.
///
/// Pair with [crate::jobs::run_until_complete] to drive a job through all of
/// its continuations locally.
#[derive(Debug, Clone)]
pub struct ChannelSink {
  tx: mpsc::UnboundedSender<JobInvocation>,
}

impl ChannelSink {
  /// Creates the sink and the receiving end of its queue.
  pub fn new() -> (Self, mpsc::UnboundedReceiver<JobInvocation>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Self { tx }, rx)
  }
}

#[async_trait]
impl ContinuationSink for ChannelSink {
  async fn dispatch(&self, invocation: JobInvocation) -> Result<(), BoxError> {
    self.tx.send(invocation).map_err(|e| Box::new(e) as BoxError)
  }
}
