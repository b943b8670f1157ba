//! Agent gateway: session resolution and message delivery against the
//! remote agent backend.

pub mod gateway;
pub mod intent;
pub mod reply;
pub mod transport;

pub use gateway::{AgentGateway, SentReply};
pub use intent::detect_design_intent;
pub use reply::extract_reply;
pub use transport::AgentTransport;
