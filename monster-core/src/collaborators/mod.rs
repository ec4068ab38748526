//! Narrow interfaces to the systems this core does not own.
//!
//! The simulation only calls through these traits. Shared in-memory
//! implementations are provided for the headless binary and tests; a host
//! game wires its inventory, currency and chat services in their place.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::content::ItemId;
use crate::ledger::AttackerId;
use crate::monster::KillId;

// =====================================================
// Item drops
// =====================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDrop {
    pub item: ItemId,
    pub quantity: u32,
}

/// Fire-and-forget receiver of a death's drop set
pub trait ItemDropSink: Send + Sync {
    fn emit(&self, drops: Vec<ItemDrop>, position: Vec3);
}

// =====================================================
// Rewards
// =====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RewardClaim {
    pub kill: KillId,
    pub attacker: AttackerId,
    pub experience: u32,
    pub currency: u32,
}

/// Global reward authority. `claim` returns `false` when the pair was already paid.
pub trait RewardLedger: Send + Sync {
    fn claim(&self, claim: RewardClaim) -> bool;
}

// =====================================================
// Notifications
// =====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, attacker: AttackerId, message: &str, severity: Severity);
}

/// Every collaborator the simulation talks to
pub struct Collaborators {
    pub drops: Box<dyn ItemDropSink>,
    pub rewards: Box<dyn RewardLedger>,
    pub notifier: Box<dyn Notifier>,
}

impl Collaborators {
    pub fn new(
        drops: impl ItemDropSink + 'static,
        rewards: impl RewardLedger + 'static,
        notifier: impl Notifier + 'static,
    ) -> Self {
        Self {
            drops: Box::new(drops),
            rewards: Box::new(rewards),
            notifier: Box::new(notifier),
        }
    }
}

impl Default for Collaborators {
    /// In-memory drop and reward logs with tracing notifications
    fn default() -> Self {
        Self::new(DropLog::default(), GlobalRewardLedger::default(), TracingNotifier)
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Collaborators")
    }
}

// =====================================================
// In-memory implementations
// =====================================================

/// One emitted drop set
#[derive(Debug, Clone, PartialEq)]
pub struct DropRecord {
    pub drops: Vec<ItemDrop>,
    pub position: Vec3,
}

/// Cloneable drop recorder; clones share one log
#[derive(Debug, Clone, Default)]
pub struct DropLog(Arc<Mutex<Vec<DropRecord>>>);

impl DropLog {
    pub fn records(&self) -> Vec<DropRecord> {
        self.0.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn total_items(&self) -> u64 {
        self.records()
            .iter()
            .flat_map(|r| r.drops.iter())
            .map(|d| d.quantity as u64)
            .sum()
    }
}

impl ItemDropSink for DropLog {
    fn emit(&self, drops: Vec<ItemDrop>, position: Vec3) {
        if let Ok(mut records) = self.0.lock() {
            records.push(DropRecord { drops, position });
        }
    }
}

#[derive(Debug, Default)]
struct RewardState {
    claimed: HashSet<(KillId, AttackerId)>,
    granted: Vec<RewardClaim>,
}

/// Exactly-once claims keyed by `(kill, attacker)`; clones share state
#[derive(Debug, Clone, Default)]
pub struct GlobalRewardLedger(Arc<Mutex<RewardState>>);

impl GlobalRewardLedger {
    pub fn granted(&self) -> Vec<RewardClaim> {
        self.0.lock().map(|s| s.granted.clone()).unwrap_or_default()
    }

    pub fn granted_to(&self, attacker: AttackerId) -> Vec<RewardClaim> {
        self.granted()
            .into_iter()
            .filter(|c| c.attacker == attacker)
            .collect()
    }
}

impl RewardLedger for GlobalRewardLedger {
    fn claim(&self, claim: RewardClaim) -> bool {
        let Ok(mut state) = self.0.lock() else {
            return false;
        };
        if !state.claimed.insert((claim.kill, claim.attacker)) {
            return false;
        }
        state.granted.push(claim);
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub attacker: AttackerId,
    pub message: String,
    pub severity: Severity,
}

/// Captures notifications; clones share one log
#[derive(Debug, Clone, Default)]
pub struct NotificationLog(Arc<Mutex<Vec<Notification>>>);

impl NotificationLog {
    pub fn entries(&self) -> Vec<Notification> {
        self.0.lock().map(|n| n.clone()).unwrap_or_default()
    }

    pub fn for_attacker(&self, attacker: AttackerId) -> Vec<Notification> {
        self.entries()
            .into_iter()
            .filter(|n| n.attacker == attacker)
            .collect()
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, attacker: AttackerId, message: &str, severity: Severity) {
        if let Ok(mut entries) = self.0.lock() {
            entries.push(Notification {
                attacker,
                message: message.to_string(),
                severity,
            });
        }
    }
}

/// Writes notifications to the log stream
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, attacker: AttackerId, message: &str, severity: Severity) {
        match severity {
            Severity::Info => info!(%attacker, "{message}"),
            Severity::Warning | Severity::Error => warn!(%attacker, ?severity, "{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_ledger_claims_once_per_kill() {
        let ledger = GlobalRewardLedger::default();
        let claim = RewardClaim {
            kill: KillId(1),
            attacker: AttackerId(7),
            experience: 10,
            currency: 2,
        };
        assert!(ledger.claim(claim));
        assert!(!ledger.claim(claim));
        assert!(ledger.claim(RewardClaim {
            kill: KillId(2),
            ..claim
        }));
        assert_eq!(ledger.granted_to(AttackerId(7)).len(), 2);
    }

    #[test]
    fn test_clones_share_logs() {
        let log = DropLog::default();
        let sink: Box<dyn ItemDropSink> = Box::new(log.clone());
        sink.emit(
            vec![ItemDrop {
                item: ItemId::new("bone"),
                quantity: 3,
            }],
            Vec3::ONE,
        );
        assert_eq!(log.records().len(), 1);
        assert_eq!(log.total_items(), 3);
    }
}
