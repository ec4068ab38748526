//! Participant ledger: who hurt this monster, and who was already paid for it.
//!
//! One ledger lives inside each monster entity and is cleared with it. Damage
//! tracking and reward gating are kept in separate collections so a duplicate
//! lethal blow can never mint a second reward even if the damage side is
//! re-entered.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Remote attacker identity (player or player-owned entity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttackerId(pub u64);

impl fmt::Display for AttackerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attacker#{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticipantLedger {
    damage: BTreeMap<AttackerId, f32>,
    rewarded: BTreeSet<AttackerId>,
}

impl ParticipantLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate `amount` for `attacker`; zero or negative amounts are ignored.
    pub fn record(&mut self, attacker: AttackerId, amount: f32) {
        if !(amount > 0.0) {
            return;
        }
        *self.damage.entry(attacker).or_insert(0.0) += amount;
    }

    pub fn contains(&self, attacker: AttackerId) -> bool {
        self.damage.contains_key(&attacker)
    }

    pub fn damage_by(&self, attacker: AttackerId) -> f32 {
        self.damage.get(&attacker).copied().unwrap_or(0.0)
    }

    pub fn total_damage(&self) -> f32 {
        self.damage.values().sum()
    }

    /// Participants in ascending id order
    pub fn participants(&self) -> impl Iterator<Item = AttackerId> + '_ {
        self.damage.keys().copied()
    }

    pub fn participant_count(&self) -> usize {
        self.damage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.damage.is_empty()
    }

    /// Mark `attacker` as rewarded for this kill.
    ///
    /// Returns `true` only the first time, and only for actual participants.
    pub fn try_mark_rewarded(&mut self, attacker: AttackerId) -> bool {
        self.damage.contains_key(&attacker) && self.rewarded.insert(attacker)
    }

    pub fn was_rewarded(&self, attacker: AttackerId) -> bool {
        self.rewarded.contains(&attacker)
    }

    pub fn rewarded_count(&self) -> usize {
        self.rewarded.len()
    }

    pub fn clear(&mut self) {
        self.damage.clear();
        self.rewarded.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_hits_accumulate() {
        let mut ledger = ParticipantLedger::new();
        ledger.record(AttackerId(1), 10.0);
        ledger.record(AttackerId(1), 15.0);
        ledger.record(AttackerId(2), 5.0);
        assert_eq!(ledger.damage_by(AttackerId(1)), 25.0);
        assert_eq!(ledger.participant_count(), 2);
        assert_eq!(ledger.total_damage(), 30.0);
    }

    #[test]
    fn test_zero_damage_not_recorded() {
        let mut ledger = ParticipantLedger::new();
        ledger.record(AttackerId(3), 0.0);
        ledger.record(AttackerId(3), f32::NAN);
        assert!(!ledger.contains(AttackerId(3)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_reward_gate_is_once_per_attacker() {
        let mut ledger = ParticipantLedger::new();
        ledger.record(AttackerId(1), 10.0);
        assert!(ledger.try_mark_rewarded(AttackerId(1)));
        assert!(!ledger.try_mark_rewarded(AttackerId(1)));
        // non-participants are never eligible
        assert!(!ledger.try_mark_rewarded(AttackerId(9)));
        assert_eq!(ledger.rewarded_count(), 1);
    }

    #[test]
    fn test_clear_resets_both_sides() {
        let mut ledger = ParticipantLedger::new();
        ledger.record(AttackerId(1), 10.0);
        ledger.try_mark_rewarded(AttackerId(1));
        ledger.clear();
        assert_eq!(ledger, ParticipantLedger::new());
        assert!(!ledger.was_rewarded(AttackerId(1)));
    }

    #[test]
    fn test_participants_are_ordered() {
        let mut ledger = ParticipantLedger::new();
        for id in [5, 1, 3] {
            ledger.record(AttackerId(id), 1.0);
        }
        let ids: Vec<u64> = ledger.participants().map(|a| a.0).collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }
}
