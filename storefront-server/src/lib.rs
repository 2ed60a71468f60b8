//! Storefront Server - order intake and notification pipeline
//!
//! # Architecture
//!
//! - **HTTP API** (`api`): order creation, status updates, payment-status
//!   polling, SSE notification stream
//! - **Realtime hub** (`realtime`): WebSocket fan-out of order-status events
//!   to subscribed users
//! - **Notification pipeline** (`notify`): per-order fan-out to the realtime
//!   hub, the signed inventory webhook, and local in-process subscribers
//! - **Auth** (`auth`): thin JWT check resolving an optional user - guest
//!   checkout needs no token
//! - **Store** (`store`): async order-store seam; persistence itself is an
//!   external collaborator behind the trait
//!
//! # Module structure
//!
//! ```text
//! storefront-server/src/
//! ├── core/          # config, state, server assembly
//! ├── api/           # HTTP routes and handlers
//! ├── auth/          # JWT verification
//! ├── notify/        # dispatcher + webhook signer/sender
//! ├── realtime/      # WebSocket hub and connection handling
//! ├── receipts.rs    # email receipt seam
//! └── store.rs       # order store trait + in-memory impl
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod notify;
pub mod realtime;
pub mod receipts;
pub mod store;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use notify::{ChannelOutcome, DispatchReport, Notifier, WebhookSender};
pub use realtime::RealtimeHub;
pub use store::{MemoryStore, OrderStore};
