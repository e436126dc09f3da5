//! Adapter runtime integration.
//!
//! Bridges the sync host loop with the async TCP server. The host polls
//! `try_recv` for queued intents each frame and pushes acks, event batches
//! and observations back through `send`.

use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::protocol::{
    AckMessage, ErrorMessage, EventMessage, IntentPayload, ObservationMessage,
};
use crate::server::{run_server, ServerConfig, ServerState};

/// Intent delivered to the host loop.
#[derive(Debug, Clone)]
pub struct InboundIntent {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    Intent(IntentPayload),
    /// The client asked for an immediate observation (sent on hello).
    SnapshotRequest,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClient {
        client_id: usize,
        line: String,
    },
    ToClientAck {
        client_id: usize,
        ack: AckMessage,
    },
    ToClientError {
        client_id: usize,
        err: ErrorMessage,
    },
    ToClientObservation {
        client_id: usize,
        obs: ObservationMessage,
    },
    BroadcastEvents {
        batch: EventMessage,
    },
    BroadcastObservation {
        obs: ObservationMessage,
    },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    intent_rx: mpsc::Receiver<InboundIntent>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns None if `CRUSH_HOST_DISABLED` is set.
    pub fn start_from_env() -> Option<Self> {
        if ServerState::is_disabled() {
            return None;
        }
        Some(Self::start(ServerConfig::from_env()))
    }

    /// Start the adapter with an explicit configuration.
    pub fn start(config: ServerConfig) -> Self {
        let max_pending = config.max_pending_intents.max(1);
        let (intent_tx, intent_rx) = mpsc::channel::<InboundIntent>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();

        let rt = Runtime::new().expect("Failed to create tokio runtime");
        rt.spawn(async move {
            if let Err(e) = run_server(config, intent_tx, out_rx, None).await {
                eprintln!("[host] server stopped: {}", e);
            }
        });

        Self {
            _rt: rt,
            intent_rx,
            out_tx,
        }
    }

    pub fn try_recv(&mut self) -> Option<InboundIntent> {
        self.intent_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }
}
