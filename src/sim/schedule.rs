//! Session timer queue
//!
//! Countdown steps, ticks and the acting-flag expiry are plain entries in one
//! deadline-ordered queue. Session timers carry the epoch they were armed in;
//! `cancel_session` moves to a new epoch so nothing armed before a phase change
//! can fire afterwards. The acting timer has its own token, bumped per action.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::Millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimerKind {
    /// Next countdown decrement
    CountdownStep,
    /// Tick driver cadence
    Tick,
    /// Clears the acting flag
    ActingExpiry,
}

/// A scheduled wake-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timer {
    pub deadline: Millis,
    /// Arming order, breaks deadline ties
    seq: u64,
    pub kind: TimerKind,
    token: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<Timer>>,
    seq: u64,
    epoch: u64,
    acting_token: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a session timer in the current epoch
    pub fn arm(&mut self, kind: TimerKind, deadline: Millis) {
        debug_assert!(kind != TimerKind::ActingExpiry, "use arm_acting");
        self.push(kind, deadline, self.epoch);
    }

    /// Arm the acting-flag expiry; only the latest one stays live
    pub fn arm_acting(&mut self, deadline: Millis) {
        self.acting_token += 1;
        self.push(TimerKind::ActingExpiry, deadline, self.acting_token);
    }

    /// Drop every pending session timer and start a new epoch
    pub fn cancel_session(&mut self) {
        self.epoch += 1;
        self.queue.retain(|t| t.0.kind == TimerKind::ActingExpiry);
    }

    /// Pop the earliest live timer due at or before `now`
    pub fn pop_due(&mut self, now: Millis) -> Option<Timer> {
        while let Some(Reverse(next)) = self.queue.peek().copied() {
            if next.deadline > now {
                return None;
            }
            self.queue.pop();
            if self.is_live(&next) {
                return Some(next);
            }
            log::trace!("Dropping stale {:?} timer at {}ms", next.kind, next.deadline);
        }
        None
    }

    /// Number of queued timers, stale ones included
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    fn is_live(&self, timer: &Timer) -> bool {
        match timer.kind {
            TimerKind::ActingExpiry => timer.token == self.acting_token,
            _ => timer.token == self.epoch,
        }
    }

    fn push(&mut self, kind: TimerKind, deadline: Millis, token: u64) {
        self.seq += 1;
        self.queue.push(Reverse(Timer {
            deadline,
            seq: self.seq,
            kind,
            token,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_deadline_order() {
        let mut s = Scheduler::new();
        s.arm(TimerKind::Tick, 100);
        s.arm(TimerKind::CountdownStep, 50);
        s.arm(TimerKind::Tick, 100);

        assert!(s.pop_due(49).is_none());
        assert_eq!(s.pop_due(200).unwrap().kind, TimerKind::CountdownStep);
        assert_eq!(s.pop_due(200).unwrap().deadline, 100);
        assert_eq!(s.pop_due(200).unwrap().deadline, 100);
        assert!(s.pop_due(200).is_none());
    }

    #[test]
    fn test_cancel_session_drops_session_timers() {
        let mut s = Scheduler::new();
        s.arm(TimerKind::Tick, 10);
        s.arm_acting(20);
        s.cancel_session();
        assert_eq!(s.pending(), 1);
        assert_eq!(s.pop_due(100).unwrap().kind, TimerKind::ActingExpiry);
    }

    #[test]
    fn test_latest_acting_timer_wins() {
        let mut s = Scheduler::new();
        s.arm_acting(300);
        s.arm_acting(400);
        let t = s.pop_due(1000).unwrap();
        assert_eq!(t.deadline, 400);
        assert!(s.pop_due(1000).is_none());
    }
}
