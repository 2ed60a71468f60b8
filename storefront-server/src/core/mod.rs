//! Core server components: configuration, shared state, server assembly

mod config;
mod server;
mod state;

pub use config::Config;
pub use server::Server;
pub use state::ServerState;
