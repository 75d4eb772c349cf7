//! The report the Verification Driver assembles from per-requirement
//! verdicts: a per-requirement outcome list plus the overall aggregated
//! verdict, with built-in and user-supplied requirements kept
//! distinguishable all the way to rendering.

use std::fmt;

use super::verdict::Verdict;

/// Where a requirement came from, for grouping diagnostics on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementSource {
    Builtin,
    Consistency,
    User,
}

impl fmt::Display for RequirementSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequirementSource::Builtin => "built-in",
            RequirementSource::Consistency => "consistency",
            RequirementSource::User => "user",
        };
        write!(f, "{s}")
    }
}

/// One requirement's outcome: its identity, source, verdict, and the
/// rendered diagnostic text (empty for `Satisfied`, since nothing is
/// wrong to report).
#[derive(Debug, Clone)]
pub struct RequirementOutcome {
    pub id: String,
    pub description: String,
    pub source: RequirementSource,
    pub verdict: Verdict,
    /// The requirement's template with witness placeholders substituted,
    /// or `None` when the verdict is `Satisfied` and there is nothing to
    /// render.
    pub diagnostic: Option<String>,
}

/// The full result of one verification run: every requirement's outcome,
/// in the order they were checked, plus the aggregated overall verdict.
#[derive(Debug, Clone)]
pub struct VerificationReport {
    pub outcomes: Vec<RequirementOutcome>,
}

impl VerificationReport {
    pub fn new(outcomes: Vec<RequirementOutcome>) -> Self {
        Self { outcomes }
    }

    /// The run's overall verdict, aggregated over every requirement
    /// regardless of source.
    pub fn overall(&self) -> Verdict {
        Verdict::aggregate(self.outcomes.iter().map(|o| o.verdict))
    }

    pub fn violations(&self) -> impl Iterator<Item = &RequirementOutcome> {
        self.outcomes.iter().filter(|o| o.verdict == Verdict::Violated)
    }

    pub fn undetermined(&self) -> impl Iterator<Item = &RequirementOutcome> {
        self.outcomes.iter().filter(|o| o.verdict == Verdict::Undetermined)
    }

    fn violations_of(&self, source: RequirementSource) -> impl Iterator<Item = &RequirementOutcome> {
        self.violations().filter(move |o| o.source == source)
    }
}

impl fmt::Display for VerificationReport {
    /// A reference rendering; a host wanting a different output format
    /// implements [`crate::external::report::ReportRenderer`] instead.
    /// The verdict word comes first, then diagnostic blocks grouped
    /// built-in-then-user, then an undetermined notice.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.overall().cli_word())?;

        for source in [RequirementSource::Builtin, RequirementSource::Consistency, RequirementSource::User] {
            let mut violations = self.violations_of(source).peekable();
            if violations.peek().is_none() {
                continue;
            }
            writeln!(f, "\n[{source}]")?;
            for outcome in violations {
                let text = outcome.diagnostic.as_deref().unwrap_or(&outcome.description);
                writeln!(f, "  - {} ({}): {}", outcome.id, outcome.description, text)?;
            }
        }

        let undetermined: Vec<&RequirementOutcome> = self.undetermined().collect();
        if !undetermined.is_empty() {
            writeln!(f, "\n[undetermined]")?;
            for outcome in undetermined {
                writeln!(f, "  - {} ({}): solver could not decide within the timeout", outcome.id, outcome.description)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(id: &str, source: RequirementSource, verdict: Verdict) -> RequirementOutcome {
        RequirementOutcome {
            id: id.to_string(),
            description: format!("{id} description"),
            source,
            verdict,
            diagnostic: (verdict == Verdict::Violated).then(|| format!("{id} violated")),
        }
    }

    #[test]
    fn overall_verdict_follows_aggregation_rule() {
        let report = VerificationReport::new(vec![
            outcome("a", RequirementSource::Builtin, Verdict::Satisfied),
            outcome("b", RequirementSource::User, Verdict::Violated),
        ]);
        assert_eq!(report.overall(), Verdict::Violated);
    }

    #[test]
    fn display_groups_violations_by_source() {
        let report = VerificationReport::new(vec![
            outcome("b.1", RequirementSource::Builtin, Verdict::Violated),
            outcome("u.1", RequirementSource::User, Verdict::Violated),
        ]);
        let rendered = report.to_string();
        let builtin_pos = rendered.find("[built-in]").unwrap();
        let user_pos = rendered.find("[user]").unwrap();
        assert!(builtin_pos < user_pos);
    }

    #[test]
    fn satisfied_report_has_no_diagnostic_blocks() {
        let report = VerificationReport::new(vec![outcome("a", RequirementSource::Builtin, Verdict::Satisfied)]);
        assert_eq!(report.to_string().trim(), "unsat");
    }
}
