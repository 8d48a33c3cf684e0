//! Hook handlers that do nothing beyond observing.

use crate::domain::DeliveryReceipt;
use crate::ports::outbound::HookHandler;
use shared_ledger::CallContext;
use shared_types::Hash;
use tracing::info;

/// Discards payloads.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl HookHandler for NoopHandler {
    fn on_hook(&self, _ctx: &CallContext, _receipt: &DeliveryReceipt, _payload: &[Hash]) {}
}

/// Logs each accepted payload.
#[derive(Debug, Clone)]
pub struct LoggingHandler {
    label: String,
}

impl LoggingHandler {
    /// Handler whose log lines carry `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Default for LoggingHandler {
    fn default() -> Self {
        Self::new("subscriber")
    }
}

impl HookHandler for LoggingHandler {
    fn on_hook(&self, ctx: &CallContext, receipt: &DeliveryReceipt, payload: &[Hash]) {
        info!(
            handler = %self.label,
            publisher = ?receipt.publisher,
            thread = %receipt.thread,
            nonce = receipt.nonce,
            words = payload.len(),
            nested = ctx.is_nested(),
            "[eh-03] payload handled"
        );
    }
}
