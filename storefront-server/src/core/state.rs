//! Server state - shared handles for every service the handlers touch

use std::sync::Arc;

use crate::api::orders::{OrderValidator, TrustedClientValidator};
use crate::auth::JwtService;
use crate::core::Config;
use crate::notify::{Notifier, WebhookSender};
use crate::realtime::RealtimeHub;
use crate::receipts::{LogReceiptSender, ReceiptSender};
use crate::store::{MemoryStore, OrderStore};

/// Shared application state
///
/// Cheap to clone - every field is either small or behind an `Arc`.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: Arc<dyn OrderStore>,
    pub realtime: Arc<RealtimeHub>,
    pub notifier: Arc<Notifier>,
    pub jwt: Arc<JwtService>,
    pub receipts: Arc<dyn ReceiptSender>,
    /// Price/stock re-validation hook; defaults to trusting the client
    pub order_validator: Arc<dyn OrderValidator>,
}

impl ServerState {
    /// Build state from configuration with the default in-memory store
    pub fn new(config: Config) -> Self {
        let realtime = Arc::new(RealtimeHub::new());
        let webhook = config
            .inventory_webhook_url
            .as_ref()
            .map(|url| {
                WebhookSender::new(url, &config.webhook_secret)
                    .with_timeout(config.webhook_timeout)
            });
        let notifier = Arc::new(Notifier::new(realtime.clone(), webhook));
        let jwt = Arc::new(JwtService::new(&config.jwt_secret));

        Self {
            config,
            store: Arc::new(MemoryStore::new()),
            realtime,
            notifier,
            jwt,
            receipts: Arc::new(LogReceiptSender),
            order_validator: Arc::new(TrustedClientValidator),
        }
    }

    /// Replace the order store (spreadsheet-backed impl, test doubles)
    pub fn with_store(mut self, store: Arc<dyn OrderStore>) -> Self {
        self.store = store;
        self
    }

    /// Replace the receipt sender
    pub fn with_receipts(mut self, receipts: Arc<dyn ReceiptSender>) -> Self {
        self.receipts = receipts;
        self
    }

    /// Replace the order validation hook
    pub fn with_order_validator(mut self, validator: Arc<dyn OrderValidator>) -> Self {
        self.order_validator = validator;
        self
    }
}
