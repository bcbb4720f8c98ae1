use std::sync::Arc;

use viewr_logging::viewr_warn;

use crate::transport::Transport;
use crate::{OutgoingRequest, ServerReply, TransportError};

/// Runs requests in the background and reports each outcome through a
/// completion callback. Requests are independent; ordering between them is
/// up to the caller.
#[derive(Clone)]
pub struct EngineHandle {
    transport: Arc<dyn Transport>,
}

impl EngineHandle {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Spawns the request on the current tokio runtime.
    pub fn submit<F>(&self, request: OutgoingRequest, on_complete: F)
    where
        F: FnOnce(Result<ServerReply, TransportError>) + Send + 'static,
    {
        let transport = self.transport.clone();
        tokio::spawn(async move {
            let result = transport.submit(&request).await;
            if let Err(err) = &result {
                viewr_warn!("{:?} {} failed: {}", request.method, request.url, err);
            }
            on_complete(result);
        });
    }
}
