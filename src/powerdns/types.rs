use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdnsZone {
    #[serde(default)]
    pub id: String, // "example.com."
    pub name: String, // "example.com."
    #[serde(default)]
    pub kind: String, // "Native", etc.
    #[serde(default)]
    pub masters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rrsets: Option<Vec<PdnsRrset>>, // absent in zone listings
}

impl PdnsZone {
    pub fn rrsets(&self) -> &[PdnsRrset] {
        self.rrsets.as_deref().unwrap_or_default()
    }

    /// The rrset stored under exactly `name` and `rrtype`.
    pub fn find_rrset(&self, name: &str, rrtype: &str) -> Option<&PdnsRrset> {
        self.rrsets()
            .iter()
            .find(|rr| rr.name == name && rr.rrtype == rrtype)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Replace,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdnsRrset {
    pub name: String, // "www.example.com."
    #[serde(rename = "type")]
    pub rrtype: String, // "A", "NS", ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changetype: Option<ChangeType>, // only when patching
    #[serde(default)]
    pub records: Vec<PdnsRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<PdnsComment>,
}

impl PdnsRrset {
    pub fn replace(
        name: impl Into<String>,
        rrtype: impl Into<String>,
        ttl: u32,
        records: Vec<PdnsRecord>,
    ) -> Self {
        Self {
            name: name.into(),
            rrtype: rrtype.into(),
            ttl: Some(ttl),
            changetype: Some(ChangeType::Replace),
            records,
            comments: Vec::new(),
        }
    }

    pub fn delete(
        name: impl Into<String>,
        rrtype: impl Into<String>,
        ttl: Option<u32>,
        records: Vec<PdnsRecord>,
    ) -> Self {
        Self {
            name: name.into(),
            rrtype: rrtype.into(),
            ttl,
            changetype: Some(ChangeType::Delete),
            records,
            comments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdnsRecord {
    pub content: String, // "192.0.2.1" or "ns1.example.net."
    #[serde(default)]
    pub disabled: bool,
}

impl PdnsRecord {
    pub fn enabled(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            disabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdnsComment {
    pub content: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub modified_at: i64,
}

// Used when creating a zone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdnsZoneCreate {
    pub name: String,             // "example.com."
    pub kind: String,             // "Native" / "Master" / "Slave"
    pub masters: Vec<String>,     // only for "Slave"
    pub nameservers: Vec<String>, // ["ns1.example.net.", "ns2.example.net."]
}

/// `GET /servers/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdnsServerInfo {
    pub id: String,
    #[serde(default)]
    pub daemon_type: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub config_url: String,
    #[serde(default)]
    pub zones_url: String,
}

/// One entry of `GET /servers/{id}/statistics`. Values are strings for plain
/// counters and arrays for map/ring statistics, so they are kept untyped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdnsStatistic {
    pub name: String,
    #[serde(rename = "type")]
    pub stat_type: String,
    pub value: serde_json::Value,
}
