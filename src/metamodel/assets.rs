//! Embedded YAML schema documents, one per [`DomlVersion`].
//!
//! Embedded in the binary with `include_str!` rather than loaded from
//! disk at startup, since a verifier library shouldn't depend on a
//! filesystem layout at runtime.

use super::types::DomlVersion;

pub(crate) fn raw_yaml(version: DomlVersion) -> &'static str {
    match version {
        DomlVersion::V1_0 => include_str!("../../assets/doml_meta_v1.0.yaml"),
        DomlVersion::V2_0 => include_str!("../../assets/doml_meta_v2.0.yaml"),
        DomlVersion::V2_1 => include_str!("../../assets/doml_meta_v2.1.yaml"),
        DomlVersion::V2_1_1 => include_str!("../../assets/doml_meta_v2.1.1.yaml"),
    }
}
