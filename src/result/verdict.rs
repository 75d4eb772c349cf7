//! The three-valued verdict algebra.
//!
//! Kept as an explicit enum rather than a boolean + "maybe" flag so
//! aggregation can't silently coerce `Undetermined` into either boolean
//! extreme.

use std::fmt;

/// The outcome of checking one requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Satisfied,
    Violated,
    Undetermined,
}

impl Verdict {
    /// A requirement's polarity decides how a raw solver answer on its
    /// (possibly negated) body maps to a verdict.
    ///
    /// Every body handed to the solver in this crate is already flipped
    /// at construction time (built-ins pre-negate themselves; the DOMLR
    /// lowerer negates a user body when its `-` sign is present), so the
    /// solver is always being asked "does a violation exist?" — `sat`
    /// always means `Violated` here, never `Satisfied` directly.
    pub fn from_z3_result(result: z3::SatResult) -> Verdict {
        match result {
            z3::SatResult::Sat => Verdict::Violated,
            z3::SatResult::Unsat => Verdict::Satisfied,
            z3::SatResult::Unknown => Verdict::Undetermined,
        }
    }

    /// The one place this crate checks a *direct*, non-flipped body: the
    /// synthetic "model obeys its own metamodel" consistency meta-check.
    /// There the asserted formula is the consistency axioms themselves with no
    /// extra negation, so `sat` means the background is satisfiable (the
    /// model is internally consistent) and `unsat` means it is not.
    pub fn from_z3_result_direct(result: z3::SatResult) -> Verdict {
        match result {
            z3::SatResult::Sat => Verdict::Satisfied,
            z3::SatResult::Unsat => Verdict::Violated,
            z3::SatResult::Unknown => Verdict::Undetermined,
        }
    }

    /// Aggregation rule: `Violated` dominates, then `Undetermined`, else
    /// `Satisfied`. A pure function of the verdict multiset — order
    /// doesn't matter, which is what makes partitioning into any number
    /// of worker slices produce the same overall verdict.
    pub fn aggregate(verdicts: impl IntoIterator<Item = Verdict>) -> Verdict {
        let mut any_violated = false;
        let mut any_undetermined = false;
        for v in verdicts {
            match v {
                Verdict::Violated => any_violated = true,
                Verdict::Undetermined => any_undetermined = true,
                Verdict::Satisfied => {}
            }
        }
        if any_violated {
            Verdict::Violated
        } else if any_undetermined {
            Verdict::Undetermined
        } else {
            Verdict::Satisfied
        }
    }

    /// The CLI-facing spelling: `sat`/`unsat`/`dontknow`. Note the
    /// verdict names themselves read backwards from the solver's own
    /// `sat`/`unsat`
    /// vocabulary, since every body is pre-flipped: solver-`unsat` is our
    /// `Satisfied`.
    pub fn cli_word(self) -> &'static str {
        match self {
            Verdict::Satisfied => "unsat",
            Verdict::Violated => "sat",
            Verdict::Undetermined => "dontknow",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Satisfied => "satisfied",
            Verdict::Violated => "violated",
            Verdict::Undetermined => "undetermined",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregation_prefers_violated_over_everything() {
        let v = Verdict::aggregate([Verdict::Satisfied, Verdict::Undetermined, Verdict::Violated]);
        assert_eq!(v, Verdict::Violated);
    }

    #[test]
    fn aggregation_prefers_undetermined_over_satisfied() {
        let v = Verdict::aggregate([Verdict::Satisfied, Verdict::Undetermined]);
        assert_eq!(v, Verdict::Undetermined);
    }

    #[test]
    fn aggregation_of_all_satisfied_is_satisfied() {
        let v = Verdict::aggregate([Verdict::Satisfied, Verdict::Satisfied]);
        assert_eq!(v, Verdict::Satisfied);
    }

    #[test]
    fn aggregation_of_empty_is_satisfied() {
        assert_eq!(Verdict::aggregate([]), Verdict::Satisfied);
    }

    #[test]
    fn adding_a_violated_verdict_cannot_become_satisfied() {
        let before = Verdict::aggregate([Verdict::Satisfied, Verdict::Satisfied]);
        assert_eq!(before, Verdict::Satisfied);
        let after = Verdict::aggregate([Verdict::Satisfied, Verdict::Satisfied, Verdict::Violated]);
        assert_eq!(after, Verdict::Violated);
    }
}
