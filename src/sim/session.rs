//! The session state machine
//!
//! A `Session` is owned by exactly one host. Time only moves when the host
//! calls `advance` (or `submit_action`, which advances first), so every timer
//! and every action is applied in timestamp order through `&mut self`.
//!
//! Phases: Idle -> Countdown -> Playing -> (Victory | GameOver), and
//! Victory | GameOver -> Countdown on retry. `reset` returns to Idle from anywhere.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::beam::{Beam, BeamRegistry};
use super::resolve::{self, HitResolution};
use super::schedule::{Scheduler, TimerKind};
use super::spawner::Spawner;
use super::state::{Completion, Mode, Outcome, Phase, SessionEvent, SessionSnapshot};
use crate::Millis;
use crate::error::{Error, Result};
use crate::levels::LevelId;
use crate::settings::Tuning;

/// Level and mode the session was started with; kept for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Run {
    pub level: LevelId,
    pub mode: Mode,
}

pub struct Session<R = Pcg32> {
    pub(super) tuning: Tuning,
    pub(super) rng: R,
    pub(super) phase: Phase,
    pub(super) run: Option<Run>,
    pub(super) countdown: u8,
    pub(super) playing_started_at: Millis,
    pub(super) elapsed_ms: Millis,
    pub(super) remaining_ms: Option<Millis>,
    pub(super) score: u32,
    pub(super) beams: BeamRegistry,
    pub(super) spawner: Spawner,
    pub(super) acting: bool,
    pub(super) now: Millis,
    pub(super) scheduler: Scheduler,
    pub(super) events: Vec<SessionEvent>,
}

impl Session<Pcg32> {
    /// Session with a seeded PCG generator
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self> {
        Self::with_rng(tuning, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> Session<R> {
    /// Session drawing spawn timing and decoys from `rng`
    pub fn with_rng(tuning: Tuning, rng: R) -> Result<Self> {
        tuning.validate()?;
        let spawner = Spawner::new(0, &tuning);
        Ok(Self {
            tuning,
            rng,
            phase: Phase::Idle,
            run: None,
            countdown: 0,
            playing_started_at: 0,
            elapsed_ms: 0,
            remaining_ms: None,
            score: 0,
            beams: BeamRegistry::new(),
            spawner,
            acting: false,
            now: 0,
            scheduler: Scheduler::new(),
            events: Vec::new(),
        })
    }

    /// Begin the countdown for `level` in `mode`. Only valid from Idle.
    pub fn start(&mut self, level: LevelId, mode: Mode, now: Millis) -> Result<()> {
        if self.phase != Phase::Idle {
            log::warn!("start ignored: session is {:?}", self.phase);
            return Err(Error::StartNotAllowed(self.phase));
        }
        self.advance(now);
        self.run = Some(Run { level, mode });
        log::info!("Starting level {} ({:?})", level.0, mode);
        self.begin_countdown(now);
        Ok(())
    }

    /// Rerun the countdown with the same level and mode. Only valid after
    /// Victory or GameOver.
    pub fn retry(&mut self, now: Millis) -> Result<()> {
        if !self.phase.is_terminal() {
            log::warn!("retry rejected: session is {:?}", self.phase);
            return Err(Error::RetryNotAllowed(self.phase));
        }
        self.advance(now);
        log::info!("Retrying");
        self.begin_countdown(now);
        Ok(())
    }

    /// Abandon the session and return to Idle without a completion signal
    pub fn reset(&mut self) {
        self.scheduler.cancel_session();
        self.phase = Phase::Idle;
        self.run = None;
        self.countdown = 0;
        self.score = 0;
        self.elapsed_ms = 0;
        self.remaining_ms = None;
        self.beams.clear();
        log::info!("Session reset");
    }

    /// Fire every timer due at or before `now`
    pub fn advance(&mut self, now: Millis) {
        if now < self.now {
            log::warn!("Clock went backwards ({}ms < {}ms), holding", now, self.now);
        } else {
            self.now = now;
        }

        while let Some(timer) = self.scheduler.pop_due(self.now) {
            match timer.kind {
                TimerKind::CountdownStep => self.step_countdown(timer.deadline),
                TimerKind::Tick => self.tick(timer.deadline),
                TimerKind::ActingExpiry => self.acting = false,
            }
        }
    }

    /// Player pressed the action button at `now`.
    ///
    /// Returns `None` (and does nothing) unless the session is Playing.
    pub fn submit_action(&mut self, now: Millis) -> Option<HitResolution> {
        self.advance(now);
        if self.phase != Phase::Playing {
            log::debug!("Action at {}ms ignored while {:?}", now, self.phase);
            return None;
        }
        let at = self.now;

        self.acting = true;
        self.scheduler.arm_acting(at + self.tuning.acting_flag_ms);

        let resolution = resolve::resolve(&mut self.beams, at, self.tuning.hit_window_ms);
        self.score += resolution.points();
        for &id in &resolution.hits {
            self.events.push(SessionEvent::BeamHit { id, at });
        }
        for &id in &resolution.absorbed {
            self.events.push(SessionEvent::DecoyAbsorbed { id, at });
        }
        log::debug!(
            "Action at {}ms: {:?}, score {}",
            at,
            resolution.verdict,
            self.score
        );

        if resolution.session_should_end() {
            self.elapsed_ms = at.saturating_sub(self.playing_started_at);
            self.events.push(SessionEvent::FalseAction { at });
            self.finish(Outcome::GameOver);
        }
        Some(resolution)
    }

    /// Take every event emitted since the last call
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            level: self.run.map(|r| r.level),
            mode: self.run.map(|r| r.mode),
            countdown: self.countdown,
            elapsed_ms: self.elapsed_ms,
            remaining_ms: self.remaining_ms,
            score: self.score,
            beams: self.beams.snapshot(),
            acting: self.acting,
            now: self.now,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn countdown(&self) -> u8 {
        self.countdown
    }

    pub fn is_acting(&self) -> bool {
        self.acting
    }

    pub fn beams(&self) -> Vec<Beam> {
        self.beams.snapshot()
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    fn begin_countdown(&mut self, now: Millis) {
        self.scheduler.cancel_session();
        self.phase = Phase::Countdown;
        self.countdown = self.tuning.countdown_from;
        self.score = 0;
        self.elapsed_ms = 0;
        self.remaining_ms = self.run.and_then(|r| r.mode.duration_ms());
        self.beams.clear();
        self.events.push(SessionEvent::Countdown {
            value: self.countdown,
        });
        self.scheduler
            .arm(TimerKind::CountdownStep, now + self.tuning.countdown_step_ms);
    }

    fn step_countdown(&mut self, at: Millis) {
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > 0 {
            self.events.push(SessionEvent::Countdown {
                value: self.countdown,
            });
            self.scheduler
                .arm(TimerKind::CountdownStep, at + self.tuning.countdown_step_ms);
        } else {
            self.enter_playing(at);
        }
    }

    fn enter_playing(&mut self, at: Millis) {
        self.phase = Phase::Playing;
        self.playing_started_at = at;
        self.elapsed_ms = 0;
        self.remaining_ms = self.run.and_then(|r| r.mode.duration_ms());
        self.score = 0;
        self.beams.clear();
        self.spawner = Spawner::new(at, &self.tuning);
        self.events.push(SessionEvent::PlayingStarted { at });
        log::info!("Playing from {}ms", at);
        self.scheduler.arm(TimerKind::Tick, at);
    }

    /// Move to a terminal phase and emit the completion signal
    pub(super) fn finish(&mut self, outcome: Outcome) {
        debug_assert_eq!(self.phase, Phase::Playing);
        let Some(run) = self.run else {
            return;
        };
        self.scheduler.cancel_session();
        self.phase = match outcome {
            Outcome::Victory => Phase::Victory,
            Outcome::GameOver => Phase::GameOver,
        };
        let completion = Completion {
            level: run.level,
            outcome,
            score: self.score,
            mode: run.mode.kind(),
            elapsed_ms: self.elapsed_ms,
        };
        log::info!(
            "Level {} finished: {:?} with score {}",
            run.level.0,
            outcome,
            self.score
        );
        self.events.push(SessionEvent::Completed(completion));
    }
}
