//! External interface contracts: the byte-level XMI
//! deserializer, CSP compatibility tables, and report templating are all
//! out of scope for this crate's own implementation, but the seams a host
//! application plugs into are still worth naming as trait contracts.
//!
//! Nothing in this module is called by [`crate::driver`] unless a host
//! wires it in explicitly: [`csp::CspCompatibilityCheck`] only matters
//! when [`crate::driver::VerificationOptions::csp`] is set, and
//! [`xmi::XmiAdapter`] only matters for a caller that doesn't already
//! have an [`crate::im::ObjectGraph`] in hand.

pub mod csp;
pub mod report;
pub mod xmi;
