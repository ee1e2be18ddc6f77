//! Fire-and-forget side-effect dispatch.
//!
//! Use cases push [`SideEffect`]s into an unbounded channel and return.
//! A single worker task drains the channel and talks to the audit log and
//! the read-side cache. Failures there are logged and dropped; they never
//! reach the caller that triggered them.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::infrastructure::ports::{
    AuditLogPort, CacheInvalidationPort, SideEffect, SideEffectSink,
};

/// Sending half handed to use cases.
#[derive(Clone)]
pub struct ChannelSideEffects {
    tx: mpsc::UnboundedSender<SideEffect>,
}

impl ChannelSideEffects {
    /// Create the sink and the worker that drains it.
    pub fn new(
        audit: Arc<dyn AuditLogPort>,
        cache: Arc<dyn CacheInvalidationPort>,
    ) -> (Self, SideEffectWorker) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, SideEffectWorker { rx, audit, cache })
    }
}

impl SideEffectSink for ChannelSideEffects {
    fn dispatch(&self, effect: SideEffect) {
        if let Err(e) = self.tx.send(effect) {
            tracing::warn!(effect = ?e.0, "Side-effect worker is gone, dropping");
        }
    }
}

/// Receiving half. Runs until every sender is dropped.
pub struct SideEffectWorker {
    rx: mpsc::UnboundedReceiver<SideEffect>,
    audit: Arc<dyn AuditLogPort>,
    cache: Arc<dyn CacheInvalidationPort>,
}

impl SideEffectWorker {
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) {
        while let Some(effect) = self.rx.recv().await {
            self.handle(effect).await;
        }
        tracing::debug!("Side-effect channel closed");
    }

    async fn handle(&self, effect: SideEffect) {
        match effect {
            SideEffect::Audit(entry) => {
                if let Err(e) = self.audit.record(&entry).await {
                    tracing::warn!(
                        error = %e,
                        fighter_id = %entry.fighter_id,
                        action = entry.action.as_str(),
                        "Failed to write audit entry"
                    );
                }
            }
            SideEffect::InvalidateFighter { fighter_id } => {
                self.cache.invalidate_fighter(fighter_id).await;
            }
        }
    }
}

/// Sink that keeps everything it is given, for assertions.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingSideEffects {
    effects: std::sync::Mutex<Vec<SideEffect>>,
}

#[cfg(test)]
impl RecordingSideEffects {
    pub fn taken(&self) -> Vec<SideEffect> {
        self.effects.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn audit_actions(&self) -> Vec<&'static str> {
        self.taken()
            .into_iter()
            .filter_map(|e| match e {
                SideEffect::Audit(entry) => Some(entry.action.as_str()),
                SideEffect::InvalidateFighter { .. } => None,
            })
            .collect()
    }

    pub fn invalidated(&self) -> Vec<gangbook_domain::FighterId> {
        self.taken()
            .into_iter()
            .filter_map(|e| match e {
                SideEffect::InvalidateFighter { fighter_id } => Some(fighter_id),
                SideEffect::Audit(_) => None,
            })
            .collect()
    }
}

#[cfg(test)]
impl SideEffectSink for RecordingSideEffects {
    fn dispatch(&self, effect: SideEffect) {
        if let Ok(mut effects) = self.effects.lock() {
            effects.push(effect);
        }
    }
}
