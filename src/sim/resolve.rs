//! Hit resolution and miss sweeping
//!
//! Both operate on the registry and claim beams by removing them, so a beam
//! can only ever be resolved once.

use serde::{Deserialize, Serialize};

use super::beam::{BeamId, BeamRegistry};
use crate::Millis;

/// How a player action was judged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitVerdict {
    /// At least one real beam intercepted
    Scored,
    /// Only decoys were in range; absorbed without effect
    Absorbed,
    /// Nothing in range: premature or false action, fatal
    FalseAction,
}

/// Result of resolving one player action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitResolution {
    pub verdict: HitVerdict,
    /// Real beams claimed (one point each)
    pub hits: Vec<BeamId>,
    /// Decoys claimed
    pub absorbed: Vec<BeamId>,
}

impl HitResolution {
    pub fn scored(&self) -> bool {
        self.verdict == HitVerdict::Scored
    }

    pub fn session_should_end(&self) -> bool {
        self.verdict == HitVerdict::FalseAction
    }

    /// Points earned by this action
    pub fn points(&self) -> u32 {
        self.hits.len() as u32
    }
}

/// Resolve an action at `now` against every beam whose window contains it.
/// All in-window beams are claimed in this one call.
pub fn resolve(registry: &mut BeamRegistry, now: Millis, hit_window_ms: Millis) -> HitResolution {
    let in_window: Vec<BeamId> = registry
        .iter()
        .filter(|b| b.in_window(now, hit_window_ms))
        .map(|b| b.id)
        .collect();

    let mut hits = Vec::new();
    let mut absorbed = Vec::new();
    for id in in_window {
        if let Some(beam) = registry.remove(id) {
            if beam.decoy {
                absorbed.push(beam.id);
            } else {
                hits.push(beam.id);
            }
        }
    }

    let verdict = if !hits.is_empty() {
        HitVerdict::Scored
    } else if !absorbed.is_empty() {
        HitVerdict::Absorbed
    } else {
        HitVerdict::FalseAction
    };

    HitResolution {
        verdict,
        hits,
        absorbed,
    }
}

/// Beams removed by one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepResult {
    /// Real beams that expired unresolved
    pub missed: Vec<BeamId>,
    /// Decoys that expired (harmless)
    pub expired_decoys: Vec<BeamId>,
}

impl SweepResult {
    /// A single real miss ends the session
    pub fn fatal(&self) -> bool {
        !self.missed.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.missed.is_empty() && self.expired_decoys.is_empty()
    }
}

/// Remove every beam whose window closed before `now`
pub fn sweep(registry: &mut BeamRegistry, now: Millis, hit_window_ms: Millis) -> SweepResult {
    let expired: Vec<BeamId> = registry
        .iter()
        .filter(|b| b.expired(now, hit_window_ms))
        .map(|b| b.id)
        .collect();

    let mut result = SweepResult::default();
    for id in expired {
        if let Some(beam) = registry.remove(id) {
            if beam.decoy {
                result.expired_decoys.push(beam.id);
            } else {
                result.missed.push(beam.id);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::beam::Beam;
    use proptest::prelude::*;

    const WINDOW: Millis = 300;

    fn spawn(registry: &mut BeamRegistry, spawn_at: Millis, decoy: bool) -> BeamId {
        let id = registry.next_beam_id();
        registry.add(Beam {
            id,
            spawn_at,
            travel_ms: 1500,
            decoy,
        });
        id
    }

    #[test]
    fn test_hit_at_impact() {
        let mut registry = BeamRegistry::new();
        let id = spawn(&mut registry, 0, false);
        let res = resolve(&mut registry, 1500, WINDOW);
        assert!(res.scored());
        assert!(!res.session_should_end());
        assert_eq!(res.hits, vec![id]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_early_action_is_false() {
        let mut registry = BeamRegistry::new();
        let id = spawn(&mut registry, 0, false);
        let res = resolve(&mut registry, 1199, WINDOW);
        assert_eq!(res.verdict, HitVerdict::FalseAction);
        assert!(res.session_should_end());
        assert!(registry.contains(id));
    }

    #[test]
    fn test_empty_registry_is_false_action() {
        let mut registry = BeamRegistry::new();
        let res = resolve(&mut registry, 42, WINDOW);
        assert!(res.session_should_end());
        assert_eq!(res.points(), 0);
    }

    #[test]
    fn test_decoy_is_absorbed() {
        let mut registry = BeamRegistry::new();
        let id = spawn(&mut registry, 0, true);
        let res = resolve(&mut registry, 1400, WINDOW);
        assert_eq!(res.verdict, HitVerdict::Absorbed);
        assert_eq!(res.absorbed, vec![id]);
        assert_eq!(res.points(), 0);
        assert!(!res.session_should_end());
    }

    #[test]
    fn test_all_in_window_beams_resolve_together() {
        let mut registry = BeamRegistry::new();
        let a = spawn(&mut registry, 0, false);
        let b = spawn(&mut registry, 100, false);
        let decoy = spawn(&mut registry, 200, true);
        let far = spawn(&mut registry, 5000, false);

        let res = resolve(&mut registry, 1600, WINDOW);
        assert_eq!(res.verdict, HitVerdict::Scored);
        assert_eq!(res.hits, vec![a, b]);
        assert_eq!(res.absorbed, vec![decoy]);
        assert_eq!(res.points(), 2);
        assert_eq!(registry.snapshot().len(), 1);
        assert!(registry.contains(far));
    }

    #[test]
    fn test_sweep_real_miss_is_fatal() {
        let mut registry = BeamRegistry::new();
        let id = spawn(&mut registry, 0, false);
        assert!(sweep(&mut registry, 1800, WINDOW).is_empty());
        let res = sweep(&mut registry, 1801, WINDOW);
        assert!(res.fatal());
        assert_eq!(res.missed, vec![id]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_sweep_decoy_is_silent_and_idempotent() {
        let mut registry = BeamRegistry::new();
        let id = spawn(&mut registry, 0, true);
        let res = sweep(&mut registry, 2000, WINDOW);
        assert!(!res.fatal());
        assert_eq!(res.expired_decoys, vec![id]);
        assert!(sweep(&mut registry, 2000, WINDOW).is_empty());
    }

    #[test]
    fn test_sweep_removes_every_expired_beam() {
        let mut registry = BeamRegistry::new();
        spawn(&mut registry, 0, false);
        spawn(&mut registry, 10, true);
        spawn(&mut registry, 20, false);
        let live = spawn(&mut registry, 3000, false);
        let res = sweep(&mut registry, 2500, WINDOW);
        assert_eq!(res.missed.len(), 2);
        assert_eq!(res.expired_decoys.len(), 1);
        assert_eq!(registry.snapshot().iter().map(|b| b.id).collect::<Vec<_>>(), vec![live]);
    }

    #[test]
    fn test_resolved_beam_cannot_be_swept() {
        let mut registry = BeamRegistry::new();
        spawn(&mut registry, 0, false);
        assert!(resolve(&mut registry, 1790, WINDOW).scored());
        assert!(sweep(&mut registry, 1850, WINDOW).is_empty());
    }

    proptest! {
        #[test]
        fn action_outcome_matches_window(spawn_at in 0u64..10_000, offset in -1000i64..1000) {
            let mut registry = BeamRegistry::new();
            let id = spawn(&mut registry, spawn_at, false);
            let now = (spawn_at as i64 + 1500 + offset).max(0) as Millis;
            let inside = now + WINDOW >= spawn_at + 1500 && now <= spawn_at + 1500 + WINDOW;

            let res = resolve(&mut registry, now, WINDOW);
            prop_assert_eq!(res.scored(), inside);
            prop_assert_eq!(res.session_should_end(), !inside);
            prop_assert_eq!(registry.contains(id), !inside);

            // Whatever happened, a second claim finds nothing to score.
            let again = resolve(&mut registry, now, WINDOW);
            prop_assert!(!again.hits.contains(&id));
        }
    }
}
