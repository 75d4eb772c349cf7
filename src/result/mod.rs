//! Result Model — the three-valued verdict and the report the driver
//! assembles from it.

mod report;
mod template;
mod verdict;

pub use report::{RequirementOutcome, RequirementSource, VerificationReport};
pub use template::{render_template, with_incomplete_model_note};
pub use verdict::Verdict;
