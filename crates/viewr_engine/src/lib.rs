//! viewR engine: HTTP transport, durable key-value store and timers.
mod engine;
mod store;
mod timer;
mod transport;
mod types;

pub use engine::EngineHandle;
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use timer::TimerSet;
pub use transport::{decode_reply, ReqwestTransport, Transport, TransportSettings};
pub use types::{
    FailureKind, HttpMethod, OutgoingRequest, ReplyShape, ServerReply, TransportError,
};
