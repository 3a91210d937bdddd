//! Turn scheduler: thinking time and interruption draws
//!
//! Pure functions of their inputs. All randomness comes from the RNG passed
//! in by the caller, so a seeded RNG gives reproducible schedules.

use crate::persona::Persona;
use crate::relationship::RelationshipLedger;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tunable scheduling constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Minimum thinking time for every turn
    pub base_delay_ms: u64,
    /// Added in proportion to the persona's patience
    pub patience_weight_ms: u64,
    /// Upper bound of the uniform random component
    pub jitter_ms: u64,
    /// Fixed thinking time of an interrupting turn
    pub interrupt_delay_ms: u64,
    pub interrupt_scale: f64,
    pub per_conflict_weight: f64,
    pub max_conflict_weight: f64,
    /// Hard ceiling on the interruption probability
    pub interrupt_probability_cap: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 500,
            patience_weight_ms: 3000,
            jitter_ms: 1500,
            interrupt_delay_ms: 500,
            interrupt_scale: 0.3,
            per_conflict_weight: 0.2,
            max_conflict_weight: 1.5,
            interrupt_probability_cap: 0.6,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TurnScheduler {
    config: SchedulerConfig,
}

impl TurnScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// `base + patience * weight + uniform(0..=jitter)`
    pub fn thinking_time_ms<R: Rng + ?Sized>(&self, persona: &Persona, rng: &mut R) -> u64 {
        let c = &self.config;
        let patience = (persona.traits.patience * c.patience_weight_ms as f64).round() as u64;
        let jitter = if c.jitter_ms == 0 {
            0
        } else {
            rng.gen_range(0..=c.jitter_ms)
        };
        c.base_delay_ms.saturating_add(patience).saturating_add(jitter)
    }

    /// Thinking time of a turn that cuts into someone else's
    pub fn interrupt_delay_ms(&self) -> u64 {
        self.config.interrupt_delay_ms
    }

    /// Probability that `candidate` interrupts `current`; zero for the same persona.
    pub fn interrupt_probability(
        &self,
        candidate: &Persona,
        current: &Persona,
        relationships: &RelationshipLedger,
    ) -> f64 {
        if candidate.id == current.id {
            return 0.0;
        }
        let c = &self.config;
        let conflicts = relationships.conflict_count(&candidate.id, &current.id) as f64;
        let conflict_weight = (conflicts * c.per_conflict_weight).min(c.max_conflict_weight);
        let p = c.interrupt_scale * candidate.traits.assertiveness * (1.0 + conflict_weight);
        p.clamp(0.0, c.interrupt_probability_cap.clamp(0.0, 1.0))
    }

    /// Bernoulli draw against [`Self::interrupt_probability`].
    ///
    /// Never consumes randomness for a self-interruption check, which
    /// always returns false.
    pub fn should_interrupt<R: Rng + ?Sized>(
        &self,
        candidate: &Persona,
        current: &Persona,
        relationships: &RelationshipLedger,
        rng: &mut R,
    ) -> bool {
        if candidate.id == current.id {
            return false;
        }
        let p = self.interrupt_probability(candidate, current, relationships);
        rng.r#gen::<f64>() < p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::{PersonaId, PersonalityTraits};
    use crate::relationship::RelationshipEdge;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn persona(id: &str, assertiveness: f64, patience: f64) -> Persona {
        Persona::new(id, id, PersonalityTraits::new(assertiveness, 0.5, 0.5, patience))
    }

    // ==================== Thinking time ====================

    #[test]
    fn test_thinking_time_without_jitter_is_exact() {
        let scheduler = TurnScheduler::new(SchedulerConfig {
            base_delay_ms: 1000,
            patience_weight_ms: 2000,
            jitter_ms: 0,
            ..Default::default()
        });
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(scheduler.thinking_time_ms(&persona("a", 0.5, 0.25), &mut rng), 1500);
        assert_eq!(scheduler.thinking_time_ms(&persona("b", 0.5, 1.0), &mut rng), 3000);
    }

    #[test]
    fn test_thinking_time_within_bounds_and_seeded() {
        let scheduler = TurnScheduler::default();
        let p = persona("a", 0.5, 0.5);
        let mut rng1 = StdRng::seed_from_u64(7);
        let mut rng2 = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let t1 = scheduler.thinking_time_ms(&p, &mut rng1);
            let t2 = scheduler.thinking_time_ms(&p, &mut rng2);
            assert_eq!(t1, t2);
            assert!((2000..=3500).contains(&t1));
        }
    }

    #[test]
    fn test_thinking_time_saturates_on_huge_config() {
        let scheduler = TurnScheduler::new(SchedulerConfig {
            base_delay_ms: u64::MAX,
            patience_weight_ms: u64::MAX,
            jitter_ms: u64::MAX,
            ..Default::default()
        });
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(scheduler.thinking_time_ms(&persona("a", 0.5, 1.0), &mut rng), u64::MAX);
    }

    #[test]
    fn test_impatient_personas_think_faster() {
        let scheduler = TurnScheduler::new(SchedulerConfig {
            jitter_ms: 0,
            ..Default::default()
        });
        let mut rng = StdRng::seed_from_u64(0);
        let fast = scheduler.thinking_time_ms(&persona("marcus", 0.9, 0.2), &mut rng);
        let slow = scheduler.thinking_time_ms(&persona("david", 0.6, 0.8), &mut rng);
        assert!(fast < slow);
    }

    // ==================== Interruption ====================

    #[test]
    fn test_no_self_interruption() {
        let scheduler = TurnScheduler::new(SchedulerConfig {
            interrupt_probability_cap: 1.0,
            interrupt_scale: 10.0,
            ..Default::default()
        });
        let p = persona("a", 1.0, 0.0);
        let mut ledger = RelationshipLedger::new();
        ledger.seed(&p.id, &PersonaId::new("b"), RelationshipEdge::new(0, 50, -10));
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            assert!(!scheduler.should_interrupt(&p, &p, &ledger, &mut rng));
        }
        assert_eq!(scheduler.interrupt_probability(&p, &p, &ledger), 0.0);
    }

    #[test]
    fn test_probability_formula_and_cap() {
        let scheduler = TurnScheduler::default();
        let a = persona("a", 0.5, 0.5);
        let b = persona("b", 0.5, 0.5);
        let mut ledger = RelationshipLedger::new();
        assert!((scheduler.interrupt_probability(&a, &b, &ledger) - 0.15).abs() < 1e-9);

        ledger.seed(&a.id, &b.id, RelationshipEdge::new(0, 2, 0));
        assert!((scheduler.interrupt_probability(&a, &b, &ledger) - 0.21).abs() < 1e-9);

        let loud = persona("loud", 1.0, 0.0);
        ledger.seed(&loud.id, &b.id, RelationshipEdge::new(0, 100, 0));
        // 0.3 * 1.0 * (1 + 1.5) = 0.75, capped
        assert_eq!(scheduler.interrupt_probability(&loud, &b, &ledger), 0.6);
    }

    #[test]
    fn test_conflict_raises_interruption_rate() {
        let scheduler = TurnScheduler::default();
        let a = persona("a", 0.7, 0.5);
        let b = persona("b", 0.5, 0.5);
        let fresh = RelationshipLedger::new();
        let mut hostile = RelationshipLedger::new();
        hostile.seed(&a.id, &b.id, RelationshipEdge::new(0, 5, -5));

        let count = |ledger: &RelationshipLedger| {
            let mut rng = StdRng::seed_from_u64(2024);
            (0..100)
                .filter(|_| scheduler.should_interrupt(&a, &b, ledger, &mut rng))
                .count()
        };
        let calm = count(&fresh);
        let heated = count(&hostile);
        // Same draws: every draw under 0.21 is also under 0.42
        assert!(heated > calm, "heated={heated} calm={calm}");
        assert_eq!(count(&hostile), heated);
    }
}
