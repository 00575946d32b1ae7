//! Zone kind and the `masters` / `nameservers` combination it requires.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneKind {
    Native,
    Master,
    Slave,
}

impl ZoneKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ZoneKind::Native => "Native",
            ZoneKind::Master => "Master",
            ZoneKind::Slave => "Slave",
        }
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZoneKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Native" => Ok(ZoneKind::Native),
            "Master" => Ok(ZoneKind::Master),
            "Slave" => Ok(ZoneKind::Slave),
            other => Err(ValidationError::InvalidKind(other.to_string())),
        }
    }
}

pub fn validate_zone_kind(kind: Option<&str>) -> Result<ZoneKind, ValidationError> {
    match kind {
        None | Some("") => Err(ValidationError::Missing("zone type (kind)")),
        Some(kind) => kind.parse(),
    }
}

/// `Slave` zones need IPv4 masters, every other kind must have none.
/// Nameservers are never rewritten here; a missing trailing dot is an error.
pub fn validate_zone_topology(
    kind: ZoneKind,
    masters: &[String],
    nameservers: &[String],
) -> Result<(), ValidationError> {
    if kind == ZoneKind::Slave {
        if masters.is_empty() {
            return Err(ValidationError::MastersRequired);
        }
        if let Some(bad) = masters.iter().find(|ip| Ipv4Addr::from_str(ip).is_err()) {
            return Err(ValidationError::InvalidMaster(bad.clone()));
        }
    } else if !masters.is_empty() {
        return Err(ValidationError::MastersNotAllowed(kind));
    }

    if nameservers.is_empty() {
        return Err(ValidationError::NameserversRequired);
    }
    if let Some(bad) = nameservers.iter().find(|ns| !ns.ends_with('.')) {
        return Err(ValidationError::InvalidNameserver(bad.clone()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn kind_parsing() {
        assert_eq!(validate_zone_kind(Some("Native")), Ok(ZoneKind::Native));
        assert_eq!(validate_zone_kind(Some("Slave")), Ok(ZoneKind::Slave));
        assert_eq!(
            validate_zone_kind(Some("native")),
            Err(ValidationError::InvalidKind("native".into()))
        );
        assert_eq!(
            validate_zone_kind(None),
            Err(ValidationError::Missing("zone type (kind)"))
        );
    }

    #[test]
    fn slave_needs_ipv4_masters() {
        let ns = strings(&["ns1.example.com."]);
        assert_eq!(
            validate_zone_topology(ZoneKind::Slave, &[], &ns),
            Err(ValidationError::MastersRequired)
        );
        assert_eq!(
            validate_zone_topology(ZoneKind::Slave, &strings(&["192.0.2.1", "300.1.1.1"]), &ns),
            Err(ValidationError::InvalidMaster("300.1.1.1".into()))
        );
        assert!(validate_zone_topology(ZoneKind::Slave, &strings(&["192.0.2.1"]), &ns).is_ok());
    }

    #[test]
    fn other_kinds_reject_masters() {
        let ns = strings(&["ns1.example.com."]);
        assert_eq!(
            validate_zone_topology(ZoneKind::Master, &strings(&["192.0.2.1"]), &ns),
            Err(ValidationError::MastersNotAllowed(ZoneKind::Master))
        );
        assert!(validate_zone_topology(ZoneKind::Native, &[], &ns).is_ok());
    }

    #[test]
    fn nameservers_must_be_present_and_dotted() {
        assert_eq!(
            validate_zone_topology(ZoneKind::Native, &[], &[]),
            Err(ValidationError::NameserversRequired)
        );
        let err = validate_zone_topology(
            ZoneKind::Native,
            &[],
            &strings(&["ns1.example.com.", "ns2.example.com"]),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::InvalidNameserver("ns2.example.com".into()));
        assert!(err.to_string().contains("ns2.example.com"));
    }
}
