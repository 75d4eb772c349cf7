//! Special-cased attribute parsers for values whose textual form needs
//! structural validation beyond "is it an int/bool/string".
//!
//! Dispatches on `(DomlVersion, class, attribute)` to a handful of
//! hand-written parsers (CIDR blocks, `host:port` interface endpoints,
//! memory sizes with a unit suffix) — only the three the built-in
//! requirement library and consistency checks actually need.

use crate::metamodel::DomlVersion;

/// A parsed IPv4 CIDR block, e.g. `10.0.0.0/24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CidrBlock {
    pub octets: [u8; 4],
    pub prefix_len: u8,
}

impl CidrBlock {
    pub fn contains(&self, other: &CidrBlock) -> bool {
        if self.prefix_len > other.prefix_len {
            return false;
        }
        let mask = prefix_mask(self.prefix_len);
        to_u32(self.octets) & mask == to_u32(other.octets) & mask
    }
}

fn to_u32(octets: [u8; 4]) -> u32 {
    u32::from_be_bytes(octets)
}

fn prefix_mask(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else {
        u32::MAX << (32 - prefix_len as u32)
    }
}

/// Parse a `a.b.c.d/n` string. Returns `None` on any malformed input —
/// callers turn that into [`crate::im::ImError::MalformedSpecialAttribute`].
pub fn parse_cidr(raw: &str) -> Option<CidrBlock> {
    let (addr, prefix) = raw.split_once('/')?;
    let prefix_len: u8 = prefix.parse().ok()?;
    if prefix_len > 32 {
        return None;
    }
    let mut octets = [0u8; 4];
    let parts: Vec<&str> = addr.split('.').collect();
    if parts.len() != 4 {
        return None;
    }
    for (slot, part) in octets.iter_mut().zip(parts) {
        *slot = part.parse().ok()?;
    }
    Some(CidrBlock { octets, prefix_len })
}

/// A parsed `host:port` network-interface endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

/// Parse `host:port`, accepting both a bare port (assumed on `0.0.0.0`)
/// and a full `host:port` pair.
pub fn parse_endpoint(raw: &str) -> Option<Endpoint> {
    match raw.rsplit_once(':') {
        Some((host, port)) => Some(Endpoint {
            host: host.to_string(),
            port: port.parse().ok()?,
        }),
        None => Some(Endpoint {
            host: "0.0.0.0".to_string(),
            port: raw.parse().ok()?,
        }),
    }
}

/// Fold a parsed endpoint down to the single integer the `endPoint`
/// attribute is declared as: the host's IPv4 address in the high bits,
/// the port in the low 16. A non-dotted-quad host (e.g. a hostname)
/// contributes zero in the address bits, so two such endpoints still
/// compare equal/distinct purely on port.
pub fn encode_endpoint(endpoint: &Endpoint) -> i64 {
    let ip = ipv4_to_u32(&endpoint.host).unwrap_or(0);
    ((ip as i64) << 16) | endpoint.port as i64
}

fn ipv4_to_u32(host: &str) -> Option<u32> {
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() != 4 {
        return None;
    }
    let mut octets = [0u8; 4];
    for (slot, part) in octets.iter_mut().zip(parts) {
        *slot = part.parse().ok()?;
    }
    Some(to_u32(octets))
}

/// Parse a memory size such as `512Mi`, `2Gi`, or a bare integer (assumed
/// megabytes), returning the value normalized to megabytes.
pub fn parse_memory_mb(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Some(value) = raw.strip_suffix("Gi") {
        return value.trim().parse::<i64>().ok().map(|g| g * 1024);
    }
    if let Some(value) = raw.strip_suffix("Mi") {
        return value.trim().parse().ok();
    }
    raw.parse().ok()
}

/// Whether `(version, class, attribute)` is handled by a special parser
/// rather than the generic scalar parser.
pub fn is_special(version: DomlVersion, class: &str, attribute: &str) -> bool {
    match (class, attribute) {
        ("infrastructure_Network", "cidr") => !matches!(version, DomlVersion::V1_0 | DomlVersion::V2_0),
        // endPoint is Integer-typed in the schema in every version; a source
        // document may still supply it as `host:port` text, which needs
        // folding down to that integer before it becomes an attribute value.
        ("infrastructure_NetworkInterface", "endPoint") => true,
        ("infrastructure_ComputingNode", "memory_mb") => !matches!(version, DomlVersion::V1_0),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cidr_containment() {
        let outer = parse_cidr("10.0.0.0/16").unwrap();
        let inner = parse_cidr("10.0.5.0/24").unwrap();
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn cidr_rejects_malformed_input() {
        assert!(parse_cidr("not-a-cidr").is_none());
        assert!(parse_cidr("10.0.0.0/99").is_none());
    }

    #[test]
    fn endpoint_parses_host_and_bare_port() {
        assert_eq!(
            parse_endpoint("10.0.0.5:8080"),
            Some(Endpoint { host: "10.0.0.5".to_string(), port: 8080 })
        );
        assert_eq!(
            parse_endpoint("8080"),
            Some(Endpoint { host: "0.0.0.0".to_string(), port: 8080 })
        );
    }

    #[test]
    fn memory_normalizes_to_megabytes() {
        assert_eq!(parse_memory_mb("2Gi"), Some(2048));
        assert_eq!(parse_memory_mb("512Mi"), Some(512));
        assert_eq!(parse_memory_mb("256"), Some(256));
    }
}
