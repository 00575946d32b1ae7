//! Syntax rules for zone names, record names, record content and zone topology.
//!
//! Everything here is pure: no I/O, no upstream calls. Callers normalize names
//! with [`ensure_trailing_dot`] first and validate the normalized form.

pub mod record;
pub mod zone;

pub use record::{
    ALLOWED_RECORD_TYPES, MIN_TTL, validate_record_content, validate_record_name, validate_record_type,
    validate_ttl,
};
pub use zone::{ZoneKind, validate_zone_kind, validate_zone_topology};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error(
        "invalid zone name '{0}': labels must be 1-63 characters of a-z, 0-9 or '-', \
         must not start or end with '-', and the name must end with a dot"
    )]
    InvalidZoneName(String),
    #[error(
        "invalid record name '{0}': hostname cannot start with a number or hyphen and must end with a dot"
    )]
    InvalidRecordName(String),
    #[error("invalid record type '{0}'. Allowed types: {allowed}", allowed = ALLOWED_RECORD_TYPES.join(", "))]
    UnsupportedType(String),
    #[error("invalid content for {rtype} record: {reason}")]
    InvalidContent { rtype: String, reason: &'static str },
    #[error("TTL must be greater than or equal to 60 (got {0})")]
    TtlTooLow(u32),
    #[error("records must contain at least one entry")]
    RecordsRequired,
    #[error("invalid zone type '{0}'. Allowed values: Native, Master, Slave")]
    InvalidKind(String),
    #[error("for 'Slave' zones, 'masters' must be a non-empty list of IPv4 addresses")]
    MastersRequired,
    #[error("invalid IP address in masters: {0}")]
    InvalidMaster(String),
    #[error("'masters' must be empty for '{0}' zones")]
    MastersNotAllowed(ZoneKind),
    #[error("'nameservers' must be a non-empty list of names ending with a dot")]
    NameserversRequired,
    #[error("invalid nameserver '{0}': it must end with a dot")]
    InvalidNameserver(String),
}

/// Append a single trailing dot unless one is already present.
pub fn ensure_trailing_dot(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

/// Append the trailing dot, then check the label grammar.
pub fn normalized_zone(name: &str) -> Result<String, ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Missing("zone name"));
    }
    let name = ensure_trailing_dot(name);
    validate_zone_name(&name)?;
    Ok(name)
}

fn valid_zone_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= 63
        && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        && !label.starts_with('-')
        && !label.ends_with('-')
}

/// Check a fully-qualified zone name (trailing dot included).
pub fn validate_zone_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::Missing("zone name"));
    }
    let Some(body) = name.strip_suffix('.') else {
        return Err(ValidationError::InvalidZoneName(name.to_string()));
    };
    if body.is_empty() || !body.split('.').all(valid_zone_label) {
        return Err(ValidationError::InvalidZoneName(name.to_string()));
    }
    Ok(())
}
