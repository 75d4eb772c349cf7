//! Verification Driver configuration surface.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::time::Duration;

use crate::domlr::Directive;

/// Every knob the driver reads before a run starts. `Default` is
/// deliberately conservative (`threads = 2`, no timeouts, every optional
/// check off) so a caller that supplies nothing still gets a bounded,
/// predictable run.
#[derive(Debug, Clone)]
pub struct VerificationOptions {
    pub threads: NonZeroUsize,
    pub wall_clock_timeout: Option<Duration>,
    pub per_query_timeout_ms: Option<u32>,
    pub check_consistency: bool,
    pub ignore_builtins: bool,
    pub skip_ids: HashSet<String>,
    pub csp: bool,
}

impl Default for VerificationOptions {
    fn default() -> Self {
        VerificationOptions {
            threads: NonZeroUsize::new(2).expect("2 is nonzero"),
            wall_clock_timeout: None,
            per_query_timeout_ms: None,
            check_consistency: false,
            ignore_builtins: false,
            skip_ids: HashSet::new(),
            csp: false,
        }
    }
}

impl VerificationOptions {
    /// Directives parsed from a DOMLR source only ever turn a flag *on* or
    /// add to `skip_ids`; they never relax an option the caller already
    /// set more strictly.
    pub fn apply_directives(&mut self, directives: &[Directive]) {
        for directive in directives {
            match directive {
                Directive::CheckConsistency => self.check_consistency = true,
                Directive::IgnoreBuiltin => self.ignore_builtins = true,
                Directive::Skip(id) => {
                    self.skip_ids.insert(id.clone());
                }
                Directive::Csp => self.csp = true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_conservative() {
        let options = VerificationOptions::default();
        assert_eq!(options.threads.get(), 2);
        assert!(options.wall_clock_timeout.is_none());
        assert!(!options.check_consistency);
    }

    #[test]
    fn directives_only_add_restrictions() {
        let mut options = VerificationOptions::default();
        options.apply_directives(&[Directive::CheckConsistency, Directive::Skip("builtin.vm_iface".to_string())]);
        assert!(options.check_consistency);
        assert!(options.skip_ids.contains("builtin.vm_iface"));
    }
}
