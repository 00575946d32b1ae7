//! Record type allow-list and per-type content syntax.

use regex::Regex;

use super::ValidationError;

/// Record types accepted by the administrative API.
pub const ALLOWED_RECORD_TYPES: &[&str] = &[
    "A", "AAAA", "CNAME", "MX", "NS", "SOA", "TXT", "PTR", "SRV", "CAA", "SSHFP", "DNSKEY",
    "RRSIG", "NSEC", "NSEC3", "NSEC3PARAM", "DS", "TLSA", "SPF", "HINFO", "NAPTR", "LOC",
];

/// Smallest TTL a caller may request.
pub const MIN_TTL: u32 = 60;

lazy_static::lazy_static! {
    static ref RECORD_NAME_RE: Regex =
        Regex::new(r"^[A-Za-z][A-Za-z0-9-]*(\.[A-Za-z0-9-]+)*\.$").unwrap();
    static ref IPV4_RE: Regex = Regex::new(r"^(?:[0-9]{1,3}\.){3}[0-9]{1,3}$").unwrap();
    static ref IPV6_RE: Regex = Regex::new(
        r"^([0-9a-fA-F]{1,4}:){7}([0-9a-fA-F]{1,4}|:)$|^((?:[0-9A-Fa-f]{1,4}(?::[0-9A-Fa-f]{1,4})*)?)::((?:[0-9A-Fa-f]{1,4}(?::[0-9A-Fa-f]{1,4})*)?)$"
    )
    .unwrap();
    static ref HOSTNAME_RE: Regex = Regex::new(r"^([a-zA-Z0-9-]+\.)*[a-zA-Z0-9-]+\.$").unwrap();
    static ref MX_RE: Regex = Regex::new(r"^\d+\s+([a-zA-Z0-9-]+\.)*[a-zA-Z0-9-]+\.$").unwrap();
    static ref SRV_RE: Regex =
        Regex::new(r"^\d+\s+\d+\s+\d+\s+([a-zA-Z0-9-]+\.)*[a-zA-Z0-9-]+\.$").unwrap();
}

/// Map a caller-supplied type to its canonical upper-case spelling.
pub fn validate_record_type(rtype: &str) -> Result<&'static str, ValidationError> {
    let trimmed = rtype.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing("record type"));
    }
    ALLOWED_RECORD_TYPES
        .iter()
        .copied()
        .find(|allowed| allowed.eq_ignore_ascii_case(trimmed))
        .ok_or_else(|| ValidationError::UnsupportedType(rtype.to_string()))
}

/// Check a record owner name. Expects the dot-normalized form.
pub fn validate_record_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::Missing("record name"));
    }
    if !RECORD_NAME_RE.is_match(name) {
        return Err(ValidationError::InvalidRecordName(name.to_string()));
    }
    Ok(())
}

pub fn validate_ttl(ttl: Option<u32>) -> Result<(), ValidationError> {
    match ttl {
        Some(ttl) if ttl < MIN_TTL => Err(ValidationError::TtlTooLow(ttl)),
        _ => Ok(()),
    }
}

/// Check `content` against the syntax of `rtype` (canonical upper-case type).
pub fn validate_record_content(rtype: &str, content: &str) -> Result<(), ValidationError> {
    let (ok, reason) = match rtype {
        "A" => (IPV4_RE.is_match(content), "must be a valid IPv4 address"),
        "AAAA" => (IPV6_RE.is_match(content), "must be a valid IPv6 address"),
        "CNAME" | "NS" => (
            HOSTNAME_RE.is_match(content),
            "must be a valid hostname ending with a dot",
        ),
        "MX" => (
            MX_RE.is_match(content),
            "must be in format '<preference> <hostname>.'",
        ),
        "SRV" => (
            SRV_RE.is_match(content),
            "must be in format '<priority> <weight> <port> <target>.'",
        ),
        "TXT" => (true, ""),
        _ => (!content.trim().is_empty(), "must be a non-empty string"),
    };

    if ok {
        Ok(())
    } else {
        Err(ValidationError::InvalidContent {
            rtype: rtype.to_string(),
            reason,
        })
    }
}
