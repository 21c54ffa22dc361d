pub mod server;
pub mod types;

pub use server::{GatewayServer, SessionRegistry};
pub use types::{GatewayMessage, GatewayResponse};
