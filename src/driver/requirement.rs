//! The effective requirement list a run actually checks: the built-in
//! catalog plus the DOMLR source's own declarations, minus whatever
//! `ignore-builtin`/`skip` removed.

use crate::builtins::BuiltinRequirement;
use crate::domlr::{DomlrSource, RequirementDecl};
use crate::metamodel::DomlVersion;
use crate::result::RequirementSource;

use super::options::VerificationOptions;

/// The three shapes a requirement's body can take once compiled. All
/// three are checked through the same push/assert/check/pop loop
/// ([`super::check_slice`]); only how the body's formula and witnesses
/// get built differs.
pub enum RequirementBody {
    Builtin(BuiltinRequirement),
    Domlr(RequirementDecl),
    /// The synthetic "the model obeys its own metamodel" check: no extra
    /// assertion beyond the background/consistency axioms every worker
    /// already carries, and no witnesses.
    ConsistencyMeta,
}

pub struct Requirement {
    pub id: String,
    pub description: String,
    pub source: RequirementSource,
    pub body: RequirementBody,
}

/// Build the ordered list of requirements a run will check: the
/// consistency meta-check first (if enabled), then built-ins, then user
/// requirements in source order — matching the order
/// [`crate::result::VerificationReport::outcomes`] preserves.
pub fn effective_requirements(
    version: DomlVersion,
    domlr_source: &DomlrSource,
    options: &VerificationOptions,
) -> Vec<Requirement> {
    let mut out = Vec::new();

    if options.check_consistency {
        out.push(Requirement {
            id: "consistency.model_well_formed".to_string(),
            description:
                "the model obeys its own metamodel's type, multiplicity and inverse-association constraints"
                    .to_string(),
            source: RequirementSource::Consistency,
            body: RequirementBody::ConsistencyMeta,
        });
    }

    if !options.ignore_builtins {
        for builtin in crate::builtins::catalog(version) {
            if options.skip_ids.contains(builtin.id) {
                continue;
            }
            out.push(Requirement {
                id: builtin.id.to_string(),
                description: builtin.description.to_string(),
                source: RequirementSource::Builtin,
                body: RequirementBody::Builtin(builtin),
            });
        }
    }

    for (index, decl) in domlr_source.requirements.iter().enumerate() {
        let id = format!("user.{index}");
        if options.skip_ids.contains(&id) {
            continue;
        }
        out.push(Requirement {
            id,
            description: decl.name.clone(),
            source: RequirementSource::User,
            body: RequirementBody::Domlr(decl.clone()),
        });
    }

    out
}

/// Split into `n` contiguous slices as evenly as possible: the first
/// `len % n` slices get one extra element rather than trailing off
/// unevenly at the end.
pub fn split_into_slices(requirements: Vec<Requirement>, n: usize) -> Vec<Vec<Requirement>> {
    let n = n.max(1);
    let len = requirements.len();
    let (base, remainder) = (len / n, len % n);

    let mut slices = Vec::with_capacity(n);
    let mut iter = requirements.into_iter();
    for i in 0..n {
        let take = base + usize::from(i < remainder);
        slices.push(iter.by_ref().take(take).collect());
    }
    slices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(id: &str) -> Requirement {
        Requirement {
            id: id.to_string(),
            description: String::new(),
            source: RequirementSource::User,
            body: RequirementBody::ConsistencyMeta,
        }
    }

    #[test]
    fn split_distributes_remainder_to_leading_slices() {
        let reqs = (0..5).map(|i| req(&i.to_string())).collect();
        let slices = split_into_slices(reqs, 3);
        let sizes: Vec<usize> = slices.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn split_preserves_total_count() {
        let reqs = (0..7).map(|i| req(&i.to_string())).collect();
        let slices = split_into_slices(reqs, 4);
        let total: usize = slices.iter().map(Vec::len).sum();
        assert_eq!(total, 7);
    }

    #[test]
    fn split_handles_more_workers_than_requirements() {
        let reqs = (0..2).map(|i| req(&i.to_string())).collect();
        let slices = split_into_slices(reqs, 5);
        assert_eq!(slices.len(), 5);
        assert_eq!(slices.iter().map(Vec::len).sum::<usize>(), 2);
    }
}
