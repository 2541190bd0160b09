use crate::ports::ResponseCache;
use hickory_proto::op::Message;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// Hands freshly relayed answers to the cache off the request path.
///
/// Inserts go through a bounded queue drained by one background task. When
/// the queue is full the answer is dropped, so the request never waits on
/// the cache.
#[derive(Clone)]
pub struct CacheWriter {
    sender: mpsc::Sender<Message>,
}

impl CacheWriter {
    /// Spawns the draining task; must be called within a tokio runtime.
    pub fn spawn(cache: Arc<dyn ResponseCache>, capacity: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel::<Message>(capacity.max(1));

        tokio::spawn(async move {
            while let Some(answer) = receiver.recv().await {
                cache.insert(answer);
            }
            debug!("Cache writer stopped");
        });

        Self { sender }
    }

    /// Returns `false` when the answer was dropped instead of queued.
    pub fn offer(&self, answer: Message) -> bool {
        match self.sender.try_send(answer) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Cache insert queue full, skipping insert");
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Cache writer closed, skipping insert");
                false
            }
        }
    }
}

impl std::fmt::Debug for CacheWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheWriter")
            .field("capacity", &self.sender.max_capacity())
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}
