//! Cloud service provider compatibility checks. Only relevant when
//! [`crate::driver::VerificationOptions::csp`] is set; this crate defines
//! the seam, not any provider's allowlist.

use thiserror::Error;

use crate::im::IntermediateModel;

#[derive(Debug, Error)]
pub enum CspError {
    #[error("provider {provider:?} rejects {class}::{attribute} = {value:?}")]
    Unsupported { provider: String, class: String, attribute: String, value: String },
}

/// A provider-specific table of which concrete classes/attribute values
/// a model is allowed to use. Never consulted by [`crate::driver::run`]
/// directly: a host that wants this check runs it separately over the
/// same [`IntermediateModel`] the driver verified.
pub trait CspCompatibilityCheck {
    fn provider_name(&self) -> &str;
    fn check(&self, im: &IntermediateModel) -> Result<(), CspError>;
}
