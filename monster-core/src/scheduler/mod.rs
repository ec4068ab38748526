//! Cancellable timer queue polled by the simulation tick.
//!
//! Each scheduled entry returns a [`TimerId`] that doubles as its cancellation
//! token. Cancelled entries stay in the heap and are skipped when popped.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};

use crate::monster::MonsterHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// Deferred work owned by one monster lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerAction {
    SkillCheck(MonsterHandle),
    ReturnToPool(MonsterHandle),
}

impl TimerAction {
    pub fn handle(&self) -> MonsterHandle {
        match self {
            TimerAction::SkillCheck(h) | TimerAction::ReturnToPool(h) => *h,
        }
    }
}

/// A timer that reached its deadline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DueTimer {
    pub id: TimerId,
    pub deadline: f64,
    pub action: TimerAction,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    deadline: f64,
    id: TimerId,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so the max-heap pops the earliest deadline; ties in schedule order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .total_cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Entry>,
    pending: HashMap<TimerId, TimerAction>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline: f64, action: TimerAction) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.heap.push(Entry { deadline, id });
        self.pending.insert(id, action);
        id
    }

    /// Returns `true` if the timer was still pending
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id).is_some()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Number of live (not cancelled, not fired) timers
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest live deadline
    pub fn next_deadline(&mut self) -> Option<f64> {
        self.discard_cancelled_head();
        self.heap.peek().map(|e| e.deadline)
    }

    /// Pop every live timer with `deadline <= now`, earliest first
    pub fn pop_due(&mut self, now: f64) -> Vec<DueTimer> {
        let mut due = Vec::new();
        while let Some(entry) = self.heap.peek().copied() {
            if entry.deadline > now {
                break;
            }
            self.heap.pop();
            if let Some(action) = self.pending.remove(&entry.id) {
                due.push(DueTimer {
                    id: entry.id,
                    deadline: entry.deadline,
                    action,
                });
            }
        }
        due
    }

    fn discard_cancelled_head(&mut self) {
        while let Some(entry) = self.heap.peek() {
            if self.pending.contains_key(&entry.id) {
                break;
            }
            self.heap.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(slot: u32) -> MonsterHandle {
        MonsterHandle::new(slot, 1)
    }

    #[test]
    fn test_pop_due_in_deadline_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(3.0, TimerAction::SkillCheck(handle(3)));
        timers.schedule(1.0, TimerAction::SkillCheck(handle(1)));
        timers.schedule(2.0, TimerAction::ReturnToPool(handle(2)));

        let due = timers.pop_due(2.5);
        let slots: Vec<u32> = due.iter().map(|d| d.action.handle().slot).collect();
        assert_eq!(slots, vec![1, 2]);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut timers = TimerQueue::new();
        let id = timers.schedule(1.0, TimerAction::ReturnToPool(handle(0)));
        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(timers.pop_due(10.0).is_empty());
        assert!(timers.is_empty());
    }

    #[test]
    fn test_equal_deadlines_fire_in_schedule_order() {
        let mut timers = TimerQueue::new();
        for slot in 0..5 {
            timers.schedule(1.0, TimerAction::SkillCheck(handle(slot)));
        }
        let slots: Vec<u32> = timers
            .pop_due(1.0)
            .iter()
            .map(|d| d.action.handle().slot)
            .collect();
        assert_eq!(slots, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_next_deadline_skips_cancelled() {
        let mut timers = TimerQueue::new();
        let first = timers.schedule(1.0, TimerAction::SkillCheck(handle(0)));
        timers.schedule(4.0, TimerAction::SkillCheck(handle(1)));
        timers.cancel(first);
        assert_eq!(timers.next_deadline(), Some(4.0));
    }
}
