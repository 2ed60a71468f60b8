//! Order notification pipeline
//!
//! A single order event fans out to three channels - the realtime hub, the
//! signed inventory webhook, and local in-process subscribers - with
//! per-channel outcomes reported independently.

mod dispatcher;
mod webhook;

pub use dispatcher::{ChannelOutcome, DispatchReport, LocalSubscribers, Notifier, SubscriberId};
pub use webhook::{SIGNATURE_HEADER, WebhookSender, sign_payload, verify_signature};
