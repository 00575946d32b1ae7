#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::StatusCode;
use sparrowdns::db::{self, Db};
use sparrowdns::powerdns::types::{ChangeType, PdnsRecord, PdnsRrset, PdnsZone, PdnsZoneCreate};
use sparrowdns::powerdns::{UpstreamError, ZoneApi};

pub async fn memory_db() -> Db {
    db::init_db(Path::new(":memory:")).await.unwrap()
}

/// In-memory PowerDNS that applies PATCH directives the way the real server does.
/// Every read and PATCH yields once, like a network round trip would.
#[derive(Default)]
pub struct FakePdns {
    zones: Mutex<BTreeMap<String, PdnsZone>>,
    patches: Mutex<Vec<Vec<PdnsRrset>>>,
    patch_attempts: AtomicUsize,
    fail_patch_attempt: Mutex<Option<usize>>,
    conflict_on_create: Mutex<bool>,
    pub get_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
}

impl FakePdns {
    pub fn with_zone(name: &str) -> Self {
        let fake = Self::default();
        fake.add_zone(name);
        fake
    }

    pub fn add_zone(&self, name: &str) {
        self.zones.lock().unwrap().insert(
            name.to_string(),
            PdnsZone {
                id: name.to_string(),
                name: name.to_string(),
                kind: "Native".into(),
                masters: Vec::new(),
                serial: Some(1),
                rrsets: Some(Vec::new()),
            },
        );
    }

    pub fn has_zone(&self, name: &str) -> bool {
        self.zones.lock().unwrap().contains_key(name)
    }

    pub fn put_rrset(&self, zone: &str, name: &str, rtype: &str, ttl: u32, contents: &[&str]) {
        let records = contents.iter().map(|c| PdnsRecord::enabled(*c)).collect();
        let mut rrset = PdnsRrset::replace(name, rtype, ttl, records);
        rrset.changetype = None;
        let mut zones = self.zones.lock().unwrap();
        let rrsets = zones
            .get_mut(zone)
            .unwrap()
            .rrsets
            .get_or_insert_with(Vec::new);
        rrsets.retain(|rr| !(rr.name == name && rr.rrtype == rtype));
        rrsets.push(rrset);
    }

    pub fn rrset(&self, zone: &str, name: &str, rtype: &str) -> Option<PdnsRrset> {
        self.zones
            .lock()
            .unwrap()
            .get(zone)
            .and_then(|z| z.find_rrset(name, rtype).cloned())
    }

    /// Successfully applied PATCH bodies, in order.
    pub fn patches(&self) -> Vec<Vec<PdnsRrset>> {
        self.patches.lock().unwrap().clone()
    }

    /// Make the n-th PATCH call (0-based) fail with a 500.
    pub fn fail_patch_attempt(&self, n: usize) {
        *self.fail_patch_attempt.lock().unwrap() = Some(n);
    }

    pub fn conflict_on_create(&self) {
        *self.conflict_on_create.lock().unwrap() = true;
    }
}

#[async_trait]
impl ZoneApi for FakePdns {
    async fn list_zones(&self) -> Result<Vec<PdnsZone>, UpstreamError> {
        Ok(self
            .zones
            .lock()
            .unwrap()
            .values()
            .map(|z| PdnsZone {
                rrsets: None,
                ..z.clone()
            })
            .collect())
    }

    async fn get_zone(&self, name: &str) -> Result<Option<PdnsZone>, UpstreamError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        // let other tasks run between the pre-check and the PATCH
        tokio::task::yield_now().await;
        Ok(self.zones.lock().unwrap().get(name).cloned())
    }

    async fn create_zone(&self, zone: &PdnsZoneCreate) -> Result<PdnsZone, UpstreamError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if *self.conflict_on_create.lock().unwrap() || self.has_zone(&zone.name) {
            return Err(UpstreamError::Status {
                operation: "create_zone",
                status: StatusCode::CONFLICT,
                body: "Conflict".into(),
            });
        }
        self.add_zone(&zone.name);
        let ns: Vec<&str> = zone.nameservers.iter().map(String::as_str).collect();
        self.put_rrset(&zone.name, &zone.name, "NS", 3600, &ns);

        let mut zones = self.zones.lock().unwrap();
        let created = zones.get_mut(&zone.name).unwrap();
        created.kind = zone.kind.clone();
        created.masters = zone.masters.clone();
        Ok(created.clone())
    }

    async fn delete_zone(&self, name: &str) -> Result<bool, UpstreamError> {
        Ok(self.zones.lock().unwrap().remove(name).is_some())
    }

    async fn patch_rrsets(&self, zone: &str, rrsets: &[PdnsRrset]) -> Result<bool, UpstreamError> {
        tokio::task::yield_now().await;
        let attempt = self.patch_attempts.fetch_add(1, Ordering::SeqCst);
        if *self.fail_patch_attempt.lock().unwrap() == Some(attempt) {
            return Err(UpstreamError::Status {
                operation: "patch_rrsets",
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "backend failure".into(),
            });
        }

        let mut zones = self.zones.lock().unwrap();
        let Some(target) = zones.get_mut(zone) else {
            return Ok(false);
        };
        let existing = target.rrsets.get_or_insert_with(Vec::new);
        for directive in rrsets {
            existing.retain(|rr| !(rr.name == directive.name && rr.rrtype == directive.rrtype));
            if directive.changetype == Some(ChangeType::Replace) {
                existing.push(PdnsRrset {
                    changetype: None,
                    ..directive.clone()
                });
            }
        }
        drop(zones);

        self.patches.lock().unwrap().push(rrsets.to_vec());
        Ok(true)
    }
}
