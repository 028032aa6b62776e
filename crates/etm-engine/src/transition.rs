//! The modular transition engine.
//!
//! A pure guard table over `(current module, conditions)` with an
//! append-only log of every attempt. The canonical rules:
//!
//! | From | Guard | To |
//! |------|-------|----|
//! | A | `recruiter_support > 2 && ancestry_match` | D |
//! | D | `reinforcement_score < 0.2` | B |
//! | D | `tick_phase_match && recruiter_support > 1` | D (stable re-tick) |
//! | B | `recruiter_support > 3 && tick_phase_match` | D |
//! | C | — | C (terminal) |
//!
//! Guard order matters for `D`: the decay check runs first and shadows the
//! re-tick path whenever `reinforcement_score < 0.2`. Comparisons are
//! strict. Modules outside the core set pass through unchanged; a failed
//! attempt is not an error, just a logged no-op.

use etm_core::module::{Module, TransitionConditions};
use etm_trace::transition_log::{TransitionLog, TransitionRecord};
use tracing::debug;

// ---------------------------------------------------------------------------
// TransitionEngine
// ---------------------------------------------------------------------------

/// Guarded module transitions with a run-long attempt log.
#[derive(Debug, Default)]
pub struct TransitionEngine {
    log: TransitionLog,
}

impl TransitionEngine {
    /// Create an engine with an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt a transition and log the outcome.
    ///
    /// Returns the next module (the current one when no guard fires).
    /// `tick` is the 1-indexed scheduler tick, or 0 for attempts made
    /// outside the tick loop.
    pub fn attempt_transition(
        &mut self,
        identity: &str,
        tick: u64,
        current: Module,
        conditions: &TransitionConditions,
    ) -> Module {
        let (to, success) = Self::evaluate(&current, conditions);

        if success {
            debug!(
                identity,
                tick,
                from = %current,
                to = %to,
                "module transition"
            );
        }
        self.log.record(TransitionRecord {
            tick,
            identity: identity.to_owned(),
            from: current,
            to: to.clone(),
            conditions: *conditions,
            success,
        });
        to
    }

    /// The pure guard table: `(next module, success)`.
    fn evaluate(current: &Module, c: &TransitionConditions) -> (Module, bool) {
        match current {
            Module::A => {
                if c.recruiter_support > 2.0 && c.ancestry_match {
                    (Module::D, true)
                } else {
                    (Module::A, false)
                }
            }
            Module::D => {
                // Decay is checked first and shadows the re-tick path.
                if c.reinforcement_score < 0.2 {
                    (Module::B, true)
                } else if c.tick_phase_match && c.recruiter_support > 1.0 {
                    (Module::D, true)
                } else {
                    (Module::D, false)
                }
            }
            Module::B => {
                if c.recruiter_support > 3.0 && c.tick_phase_match {
                    (Module::D, true)
                } else {
                    (Module::B, false)
                }
            }
            // Terminal: stays C, never counts as a fired guard.
            Module::C => (Module::C, false),
            other => (other.clone(), false),
        }
    }

    /// The append-only attempt log.
    pub fn log(&self) -> &TransitionLog {
        &self.log
    }

    /// Consume the engine, yielding the log.
    pub fn into_log(self) -> TransitionLog {
        self.log
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn conditions(
        support: f64,
        ancestry: bool,
        phase: bool,
        reinforcement: f64,
    ) -> TransitionConditions {
        TransitionConditions {
            recruiter_support: support,
            ancestry_match: ancestry,
            tick_phase_match: phase,
            reinforcement_score: reinforcement,
        }
    }

    // -- A ------------------------------------------------------------------

    #[test]
    fn a_folds_to_d_on_support_and_ancestry() {
        let mut engine = TransitionEngine::new();
        let c = conditions(3.0, true, false, 1.0);
        assert_eq!(engine.attempt_transition("i", 1, Module::A, &c), Module::D);
        let rec = &engine.log().records()[0];
        assert!(rec.success);
        assert_eq!(rec.from, Module::A);
        assert_eq!(rec.to, Module::D);
    }

    #[test]
    fn a_support_boundary_is_strict() {
        let mut engine = TransitionEngine::new();
        // Exactly 2 is not enough.
        let c = conditions(2.0, true, false, 1.0);
        assert_eq!(engine.attempt_transition("i", 1, Module::A, &c), Module::A);
        assert!(!engine.log().records()[0].success);
    }

    #[test]
    fn a_needs_ancestry_match() {
        let mut engine = TransitionEngine::new();
        let c = conditions(5.0, false, true, 1.0);
        assert_eq!(engine.attempt_transition("i", 1, Module::A, &c), Module::A);
    }

    // -- D ------------------------------------------------------------------

    #[test]
    fn d_decays_to_b_below_reinforcement_floor() {
        let mut engine = TransitionEngine::new();
        let c = conditions(5.0, true, true, 0.1);
        assert_eq!(engine.attempt_transition("i", 1, Module::D, &c), Module::B);
        assert!(engine.log().records()[0].success);
    }

    #[test]
    fn d_decay_shadows_re_tick() {
        let mut engine = TransitionEngine::new();
        // Re-tick guard also holds, but decay is evaluated first.
        let c = conditions(5.0, true, true, 0.19);
        assert_eq!(engine.attempt_transition("i", 1, Module::D, &c), Module::B);
    }

    #[test]
    fn d_stable_re_tick_is_logged_success() {
        let mut engine = TransitionEngine::new();
        let c = conditions(2.0, true, true, 0.5);
        assert_eq!(engine.attempt_transition("i", 1, Module::D, &c), Module::D);
        let rec = &engine.log().records()[0];
        assert!(rec.success, "same-state re-tick is an explicit success");
    }

    #[test]
    fn d_holds_without_phase_match() {
        let mut engine = TransitionEngine::new();
        let c = conditions(2.0, true, false, 0.5);
        assert_eq!(engine.attempt_transition("i", 1, Module::D, &c), Module::D);
        assert!(!engine.log().records()[0].success);
    }

    // -- B ------------------------------------------------------------------

    #[test]
    fn b_reforms_on_support_and_phase() {
        let mut engine = TransitionEngine::new();
        let c = conditions(4.0, false, true, 0.0);
        assert_eq!(engine.attempt_transition("i", 1, Module::B, &c), Module::D);
    }

    #[test]
    fn b_gated_by_phase_match() {
        let mut engine = TransitionEngine::new();
        let c = conditions(4.0, false, false, 0.0);
        assert_eq!(engine.attempt_transition("i", 1, Module::B, &c), Module::B);
        // Exactly 3 support is not enough either.
        let c = conditions(3.0, false, true, 0.0);
        assert_eq!(engine.attempt_transition("i", 2, Module::B, &c), Module::B);
    }

    // -- C and pass-through -------------------------------------------------

    #[test]
    fn c_is_terminal_for_any_conditions() {
        let mut engine = TransitionEngine::new();
        for c in [
            conditions(100.0, true, true, 1.0),
            conditions(0.0, false, false, 0.0),
        ] {
            assert_eq!(engine.attempt_transition("i", 1, Module::C, &c), Module::C);
        }
        assert!(engine.log().records().iter().all(|r| !r.success));
    }

    #[test]
    fn unknown_modules_pass_through() {
        let mut engine = TransitionEngine::new();
        let c = conditions(100.0, true, true, 1.0);
        assert_eq!(engine.attempt_transition("i", 1, Module::Z, &c), Module::Z);
        let other = Module::Other("Q7".to_owned());
        assert_eq!(
            engine.attempt_transition("i", 2, other.clone(), &c),
            other
        );
    }

    #[test]
    fn every_attempt_is_logged() {
        let mut engine = TransitionEngine::new();
        let c = conditions(0.0, false, false, 1.0);
        for module in [Module::A, Module::B, Module::C, Module::D] {
            engine.attempt_transition("i", 1, module, &c);
        }
        assert_eq!(engine.log().len(), 4);
    }
}
