//! Preallocated, reusable monster storage.
//!
//! Slots are never dropped. Acquire prefers a free slot, then grows up to
//! capacity, then evicts. Eviction takes the oldest corpse still waiting on
//! its return timer, and only falls back to the oldest live lifetime when
//! there is none. Every acquire and release runs a full reset, so no state
//! from a previous lifetime survives.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::SpawnError;
use crate::monster::{LifecyclePhase, MonsterEntity, MonsterHandle};
use crate::scheduler::TimerQueue;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    pub constructed: u64,
    pub reused: u64,
    pub evicted: u64,
    pub released: u64,
    pub exhausted: u64,
}

/// Result of a successful acquire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquired {
    pub handle: MonsterHandle,
    /// Lifetime that was forcibly ended to make room
    pub evicted: Option<MonsterHandle>,
}

#[derive(Debug)]
pub struct EntityPool {
    capacity: usize,
    slots: Vec<MonsterEntity>,
    free: VecDeque<u32>,
    // serial -> slot; the lowest serial is the oldest lifetime
    in_use: BTreeMap<u64, u32>,
    next_serial: u64,
    stats: PoolStats,
}

impl EntityPool {
    pub fn new(capacity: usize) -> Self {
        Self::with_prewarm(capacity, 0)
    }

    /// Construct `prewarm` (capped at capacity) empty instances up front
    pub fn with_prewarm(capacity: usize, prewarm: usize) -> Self {
        let prewarm = prewarm.min(capacity);
        let slots: Vec<MonsterEntity> = (0..prewarm as u32).map(MonsterEntity::pooled).collect();
        Self {
            capacity,
            free: (0..prewarm as u32).collect(),
            slots,
            in_use: BTreeMap::new(),
            next_serial: 0,
            stats: PoolStats {
                constructed: prewarm as u64,
                ..PoolStats::default()
            },
        }
    }

    pub fn acquire(&mut self, timers: &mut TimerQueue) -> Result<Acquired, SpawnError> {
        let mut evicted = None;

        let slot = if let Some(slot) = self.free.pop_front() {
            self.stats.reused += 1;
            slot
        } else if self.slots.len() < self.capacity {
            let slot = self.slots.len() as u32;
            self.slots.push(MonsterEntity::pooled(slot));
            self.stats.constructed += 1;
            slot
        } else if let Some(slot) = self.take_eviction_victim() {
            let victim = self.slots[slot as usize].handle();
            let phase = self.slots[slot as usize].phase();
            warn!(handle = %victim, ?phase, capacity = self.capacity, "Pool full, evicting oldest monster");
            self.stats.evicted += 1;
            evicted = Some(victim);
            slot
        } else {
            self.stats.exhausted += 1;
            return Err(SpawnError::PoolExhausted {
                capacity: self.capacity,
            });
        };

        self.next_serial += 1;
        let entity = &mut self.slots[slot as usize];
        entity.reset(timers);
        let handle = entity.begin_acquire(self.next_serial);
        self.in_use.insert(self.next_serial, slot);
        debug!(%handle, serial = self.next_serial, "Pool slot acquired");

        Ok(Acquired { handle, evicted })
    }

    /// Oldest pending-return slot, else the oldest in-use slot
    fn take_eviction_victim(&mut self) -> Option<u32> {
        let corpse = self
            .in_use
            .iter()
            .find(|&(_, &slot)| self.slots[slot as usize].phase() == LifecyclePhase::DeadPendingReturn)
            .map(|(&serial, _)| serial);
        match corpse {
            Some(serial) => self.in_use.remove(&serial),
            None => self.in_use.pop_first().map(|(_, slot)| slot),
        }
    }

    /// Return a lifetime to the free list. Stale handles are ignored.
    pub fn release(&mut self, handle: MonsterHandle, timers: &mut TimerQueue) -> bool {
        let Some(entity) = self.slot_mut(handle) else {
            return false;
        };
        let serial = entity.serial();
        entity.reset(timers);
        self.in_use.remove(&serial);
        self.free.push_back(handle.slot);
        self.stats.released += 1;
        debug!(%handle, "Pool slot released");
        true
    }

    pub fn get(&self, handle: MonsterHandle) -> Option<&MonsterEntity> {
        self.slots
            .get(handle.slot as usize)
            .filter(|e| e.handle() == handle && e.phase() != LifecyclePhase::Pooled)
    }

    pub fn get_mut(&mut self, handle: MonsterHandle) -> Option<&mut MonsterEntity> {
        self.slot_mut(handle)
    }

    fn slot_mut(&mut self, handle: MonsterHandle) -> Option<&mut MonsterEntity> {
        self.slots
            .get_mut(handle.slot as usize)
            .filter(|e| e.handle() == handle && e.phase() != LifecyclePhase::Pooled)
    }

    /// In-use monsters, oldest first
    pub fn iter_in_use(&self) -> impl Iterator<Item = &MonsterEntity> + '_ {
        self.in_use
            .values()
            .filter_map(move |slot| self.slots.get(*slot as usize))
    }

    pub fn handles_in_use(&self) -> Vec<MonsterHandle> {
        self.iter_in_use().map(|e| e.handle()).collect()
    }

    /// Monsters that are active and alive
    pub fn alive_count(&self) -> usize {
        self.iter_in_use()
            .filter(|e| e.phase() == LifecyclePhase::Active && e.is_alive())
            .count()
    }

    pub fn in_use_count(&self) -> usize {
        self.in_use.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn constructed(&self) -> usize {
        self.slots.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}
