//! Fixed-cadence tick driver
//!
//! Runs while the session is Playing: time bookkeeping first, then the
//! spawner, then the miss sweeper. The next tick is armed only if the session
//! is still Playing afterwards.

use rand::Rng;

use super::resolve;
use super::schedule::TimerKind;
use super::session::Session;
use super::state::{Outcome, Phase, SessionEvent};
use crate::Millis;

impl<R: Rng> Session<R> {
    /// Advance the simulation by one tick scheduled at `at`
    pub(super) fn tick(&mut self, at: Millis) {
        if self.phase != Phase::Playing {
            return;
        }
        let Some(run) = self.run else {
            return;
        };

        self.elapsed_ms = at.saturating_sub(self.playing_started_at);
        log::trace!("Tick at {}ms (elapsed {}ms)", at, self.elapsed_ms);

        if let Some(duration) = run.mode.duration_ms() {
            self.remaining_ms = Some(duration.saturating_sub(self.elapsed_ms));
            if self.elapsed_ms >= duration {
                self.finish(Outcome::Victory);
                return;
            }
        }

        if let Some(beam) = self.spawner.poll(
            at,
            self.score,
            run.mode,
            &self.tuning,
            &mut self.rng,
            &mut self.beams,
        ) {
            self.events.push(SessionEvent::BeamSpawned { beam });
        }

        let swept = resolve::sweep(&mut self.beams, at, self.tuning.hit_window_ms);
        for &id in &swept.expired_decoys {
            self.events.push(SessionEvent::DecoyExpired { id, at });
        }
        for &id in &swept.missed {
            self.events.push(SessionEvent::BeamMissed { id, at });
        }
        if swept.fatal() {
            log::debug!("Missed {} real beam(s) at {}ms", swept.missed.len(), at);
            self.finish(Outcome::GameOver);
            return;
        }

        // A timed run always gets a tick exactly on its deadline.
        let mut next = at + self.tuning.tick_ms;
        if let Some(duration) = run.mode.duration_ms() {
            next = next.min(self.playing_started_at + duration);
        }
        self.scheduler.arm(TimerKind::Tick, next);
    }
}

#[cfg(test)]
mod tests {
    use crate::levels::LevelId;
    use crate::settings::Tuning;
    use crate::sim::{Mode, Outcome, Phase, Session, SessionEvent};

    fn completion(events: &[SessionEvent]) -> Option<crate::sim::Completion> {
        events.iter().find_map(|e| match e {
            SessionEvent::Completed(c) => Some(*c),
            _ => None,
        })
    }

    #[test]
    fn test_timed_victory_at_duration() {
        let tuning = Tuning {
            decoy_probability: 1.0,
            ..Default::default()
        };
        let mut s = Session::new(tuning, 42).unwrap();
        s.start(LevelId(1), Mode::Timed { duration_sec: 20 }, 0).unwrap();
        s.advance(3000);

        s.advance(3000 + 19_999);
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.snapshot().remaining_ms, Some(50));

        s.advance(3000 + 20_000);
        assert_eq!(s.phase(), Phase::Victory);
        let done = completion(&s.drain_events()).unwrap();
        assert_eq!(done.outcome, Outcome::Victory);
        assert_eq!(done.elapsed_ms, 20_000);
        assert_eq!(s.snapshot().remaining_ms, Some(0));
    }

    #[test]
    fn test_timed_victory_with_uneven_cadence() {
        // 30ms ticks do not divide 20s; the last tick must still land on the deadline
        let tuning = Tuning {
            decoy_probability: 1.0,
            tick_ms: 30,
            ..Default::default()
        };
        let mut s = Session::new(tuning, 42).unwrap();
        s.start(LevelId(1), Mode::Timed { duration_sec: 20 }, 0).unwrap();
        s.advance(3000);

        s.advance(3000 + 19_999);
        assert_eq!(s.phase(), Phase::Playing);

        s.advance(3000 + 20_000);
        assert_eq!(s.phase(), Phase::Victory);
        let done = completion(&s.drain_events()).unwrap();
        assert_eq!(done.outcome, Outcome::Victory);
        assert_eq!(done.elapsed_ms, 20_000);
    }

    #[test]
    fn test_action_after_deadline_cannot_lose() {
        let tuning = Tuning {
            decoy_probability: 1.0,
            tick_ms: 30,
            ..Default::default()
        };
        let mut s = Session::new(tuning, 42).unwrap();
        s.start(LevelId(1), Mode::Timed { duration_sec: 20 }, 0).unwrap();
        s.advance(3000 + 19_990);
        assert_eq!(s.phase(), Phase::Playing);

        // Lands after the deadline but before the next regular tick (23010).
        assert!(s.submit_action(3000 + 20_005).is_none());
        assert_eq!(s.phase(), Phase::Victory);
        let done = completion(&s.drain_events()).unwrap();
        assert_eq!(done.outcome, Outcome::Victory);
    }

    #[test]
    fn test_real_miss_is_fatal() {
        let tuning = Tuning {
            decoy_probability: 0.0,
            ..Default::default()
        };
        let mut s = Session::new(tuning, 42).unwrap();
        s.start(LevelId(1), Mode::Endless, 0).unwrap();
        // Playing at 3000, first beam at 4000, impact 5500, window closes 5800.
        s.advance(5800);
        assert_eq!(s.phase(), Phase::Playing);
        s.advance(5850);
        assert_eq!(s.phase(), Phase::GameOver);

        let events = s.drain_events();
        assert!(events.iter().any(|e| matches!(e, SessionEvent::BeamMissed { .. })));
        let done = completion(&events).unwrap();
        assert_eq!(done.outcome, Outcome::GameOver);
        assert_eq!(done.score, 0);
    }

    #[test]
    fn test_decoys_expire_silently() {
        let tuning = Tuning {
            decoy_probability: 1.0,
            ..Default::default()
        };
        let mut s = Session::new(tuning, 7).unwrap();
        s.start(LevelId(1), Mode::Endless, 0).unwrap();
        s.advance(60_000);
        assert_eq!(s.phase(), Phase::Playing);
        let events = s.drain_events();
        assert!(events.iter().any(|e| matches!(e, SessionEvent::DecoyExpired { .. })));
        assert!(completion(&events).is_none());
    }

    #[test]
    fn test_no_ticks_after_game_over() {
        let mut s = Session::new(Tuning::default(), 1).unwrap();
        s.start(LevelId(1), Mode::Endless, 0).unwrap();
        s.advance(3000);
        s.submit_action(3010);
        assert_eq!(s.phase(), Phase::GameOver);
        s.drain_events();

        s.advance(30_000);
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_determinism() {
        // Two sessions with the same seed produce identical event streams
        let run = |seed| {
            let tuning = Tuning {
                decoy_probability: 1.0,
                ..Default::default()
            };
            let mut s = Session::new(tuning, seed).unwrap();
            s.start(LevelId(1), Mode::Endless, 0).unwrap();
            s.advance(40_000);
            s.drain_events()
        };
        assert_eq!(run(99999), run(99999));
    }
}
