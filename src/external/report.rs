//! Report rendering seam. This crate's
//! own rendering is the [`std::fmt::Display`] impl on
//! [`crate::result::VerificationReport`]; a host that wants its own output
//! format (JSON, HTML, a CLI table) implements this trait instead of
//! reaching into the report's fields.

use crate::result::VerificationReport;

pub trait ReportRenderer {
    type Output;

    fn render(&self, report: &VerificationReport) -> Self::Output;
}
