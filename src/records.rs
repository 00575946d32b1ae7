//! Record-level changes against the authoritative server.
//!
//! PowerDNS owns every rrset; nothing here is cached. Each operation validates
//! its input, checks the zone exists, then sends `REPLACE` / `DELETE`
//! directives through [`ZoneApi::patch_rrsets`]. Mutations on one zone are
//! serialized through [`ZoneLocks`].

use std::collections::BTreeMap;
use std::slice;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

use crate::AppState;
use crate::config::{AppConfig, RenameStrategy};
use crate::powerdns::types::{PdnsRecord, PdnsRrset, PdnsZone};
use crate::powerdns::{UpstreamError, ZoneApi};
use crate::validation::{
    ValidationError, ensure_trailing_dot, normalized_zone, validate_record_content,
    validate_record_name, validate_record_type, validate_ttl,
};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Only produced by [`RenameStrategy::TwoPhase`]: the old rrset was
    /// deleted, the new one was not created.
    #[error("rename of '{old_name}' to '{new_name}' in '{zone}' deleted the old record but failed to create the new one")]
    PartialRename {
        zone: String,
        old_name: String,
        new_name: String,
        source: UpstreamError,
    },
}

/// Result of a record operation. Absence is a value, not an error, and a
/// missing zone is kept apart from a missing record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome<T> {
    Found(T),
    ZoneNotFound,
    RecordNotFound,
}

impl<T> RecordOutcome<T> {
    pub fn found(self) -> Option<T> {
        match self {
            RecordOutcome::Found(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddRecord {
    pub zone: String,
    pub record_name: String,
    #[serde(rename = "type")]
    pub rtype: String,
    pub content: String,
    pub ttl: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecordQuery {
    pub zone: String,
    pub record_name: Option<String>,
    #[serde(rename = "type")]
    pub rtype: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateRecord {
    pub zone: String,
    pub record_name: String,
    #[serde(rename = "type")]
    pub rtype: String,
    pub records: Vec<PdnsRecord>,
    pub ttl: Option<u32>,
    /// Rename the rrset when set and different from `record_name`.
    pub new_record_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecordKey {
    pub zone: String,
    pub record_name: String,
    #[serde(rename = "type")]
    pub rtype: String,
}

/// Per-zone async mutexes. An entry exists only while some caller holds or
/// waits for that zone's lock.
#[derive(Default)]
pub struct ZoneLocks {
    inner: DashMap<String, Arc<Mutex<()>>>,
}

impl ZoneLocks {
    pub async fn lock(&self, zone: &str) -> ZoneGuard<'_> {
        let mutex = self.inner.entry(zone.to_string()).or_default().clone();
        let guard = mutex.lock_owned().await;
        ZoneGuard {
            locks: self,
            zone: zone.to_string(),
            guard: Some(guard),
        }
    }

    /// Zones with a held or awaited lock.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Holds one zone's lock; releasing the last reference evicts the entry.
pub struct ZoneGuard<'a> {
    locks: &'a ZoneLocks,
    zone: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ZoneGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // only the map's own Arc left: nobody holds or waits for this zone
        self.locks
            .inner
            .remove_if(&self.zone, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

/// One reconciler serves one request: [`RecordReconciler::upstream_elapsed`]
/// accumulates the time spent in upstream calls across its operations.
pub struct RecordReconciler<'a> {
    api: &'a dyn ZoneApi,
    locks: &'a ZoneLocks,
    default_ttl: u32,
    rename_strategy: RenameStrategy,
    upstream_nanos: AtomicU64,
}

impl<'a> RecordReconciler<'a> {
    pub fn new(api: &'a dyn ZoneApi, locks: &'a ZoneLocks, config: &AppConfig) -> Self {
        Self {
            api,
            locks,
            default_ttl: config.default_ttl,
            rename_strategy: config.rename_strategy,
            upstream_nanos: AtomicU64::new(0),
        }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(&state.pdns, &state.zone_locks, &state.config)
    }

    /// Time spent waiting on the authority, excluding validation and zone
    /// lock waits.
    pub fn upstream_elapsed(&self) -> Duration {
        Duration::from_nanos(self.upstream_nanos.load(Ordering::Relaxed))
    }

    async fn timed<T>(&self, call: impl Future<Output = T>) -> T {
        let started = Instant::now();
        let out = call.await;
        let nanos = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.upstream_nanos.fetch_add(nanos, Ordering::Relaxed);
        out
    }

    /// Create or overwrite the rrset `(record_name, type)` with one record.
    pub async fn add(&self, req: &AddRecord) -> Result<RecordOutcome<PdnsRrset>, RecordError> {
        let zone = normalized_zone(&req.zone)?;
        let name = record_name(&req.record_name)?;
        let rtype = validate_record_type(&req.rtype)?;
        if req.content.is_empty() {
            return Err(ValidationError::Missing("record content").into());
        }
        validate_record_content(rtype, &req.content)?;
        validate_ttl(req.ttl)?;

        let _guard = self.locks.lock(&zone).await;
        if self.timed(self.api.get_zone(&zone)).await?.is_none() {
            return Ok(RecordOutcome::ZoneNotFound);
        }

        let rrset = PdnsRrset::replace(
            name,
            rtype,
            req.ttl.unwrap_or(self.default_ttl),
            vec![PdnsRecord::enabled(req.content.as_str())],
        );
        if !self.timed(self.api.patch_rrsets(&zone, slice::from_ref(&rrset))).await? {
            return Ok(RecordOutcome::ZoneNotFound);
        }

        info!(zone = %zone, name = %rrset.name, rtype, "record added");
        Ok(RecordOutcome::Found(rrset))
    }

    /// Rrsets of the zone, optionally narrowed to one name and/or type.
    pub async fn get(&self, query: &RecordQuery) -> Result<RecordOutcome<Vec<PdnsRrset>>, RecordError> {
        let zone = normalized_zone(&query.zone)?;
        let name = query
            .record_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .map(ensure_trailing_dot);
        let rtype = query
            .rtype
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let Some(found) = self.timed(self.api.get_zone(&zone)).await? else {
            return Ok(RecordOutcome::ZoneNotFound);
        };

        let rrsets = found
            .rrsets
            .unwrap_or_default()
            .into_iter()
            .filter(|rr| name.as_deref().is_none_or(|n| rr.name == n))
            .filter(|rr| rtype.is_none_or(|t| rr.rrtype.eq_ignore_ascii_case(t)))
            .collect();
        Ok(RecordOutcome::Found(rrsets))
    }

    /// Replace the records of an rrset, renaming it when `new_record_name`
    /// differs from `record_name`. Returns the directives that were applied.
    pub async fn update(&self, req: &UpdateRecord) -> Result<RecordOutcome<Vec<PdnsRrset>>, RecordError> {
        let zone = normalized_zone(&req.zone)?;
        let old_name = record_name(&req.record_name)?;
        let rtype = validate_record_type(&req.rtype)?;
        if req.records.is_empty() {
            return Err(ValidationError::RecordsRequired.into());
        }
        for record in &req.records {
            if record.content.is_empty() {
                return Err(ValidationError::Missing("record content").into());
            }
            validate_record_content(rtype, &record.content)?;
        }
        validate_ttl(req.ttl)?;
        let new_name = match req.new_record_name.as_deref() {
            Some(n) if !n.is_empty() => Some(record_name(n)?).filter(|n| *n != old_name),
            _ => None,
        };

        let _guard = self.locks.lock(&zone).await;
        let Some(current) = self.timed(self.api.get_zone(&zone)).await? else {
            return Ok(RecordOutcome::ZoneNotFound);
        };

        let ttl = req.ttl.unwrap_or(self.default_ttl);
        let Some(new_name) = new_name else {
            let rrset = PdnsRrset::replace(old_name, rtype, ttl, req.records.clone());
            if !self.timed(self.api.patch_rrsets(&zone, slice::from_ref(&rrset))).await? {
                return Ok(RecordOutcome::ZoneNotFound);
            }
            info!(zone = %zone, name = %rrset.name, rtype, "record updated");
            return Ok(RecordOutcome::Found(vec![rrset]));
        };

        let replace = PdnsRrset::replace(new_name, rtype, ttl, req.records.clone());
        self.rename(&zone, &current, &old_name, rtype, replace).await
    }

    async fn rename(
        &self,
        zone: &str,
        current: &PdnsZone,
        old_name: &str,
        rtype: &str,
        replace: PdnsRrset,
    ) -> Result<RecordOutcome<Vec<PdnsRrset>>, RecordError> {
        let (old_records, old_ttl) = current
            .find_rrset(old_name, rtype)
            .map(|rr| (rr.records.clone(), rr.ttl.unwrap_or(self.default_ttl)))
            .unwrap_or_else(|| (Vec::new(), self.default_ttl));
        let delete = PdnsRrset::delete(old_name, rtype, Some(old_ttl), old_records);

        match self.rename_strategy {
            RenameStrategy::Batched => {
                let directives = vec![delete, replace];
                if !self.timed(self.api.patch_rrsets(zone, &directives)).await? {
                    return Ok(RecordOutcome::ZoneNotFound);
                }
                info!(zone, from = old_name, to = %directives[1].name, rtype, "record renamed");
                Ok(RecordOutcome::Found(directives))
            }
            RenameStrategy::TwoPhase => {
                if !self.timed(self.api.patch_rrsets(zone, slice::from_ref(&delete))).await? {
                    return Ok(RecordOutcome::ZoneNotFound);
                }
                let second = self.api.patch_rrsets(zone, slice::from_ref(&replace));
                let failure = match self.timed(second).await {
                    Ok(true) => {
                        info!(zone, from = old_name, to = %replace.name, rtype, "record renamed");
                        return Ok(RecordOutcome::Found(vec![delete, replace]));
                    }
                    Ok(false) => UpstreamError::Status {
                        operation: "patch_rrsets",
                        status: StatusCode::NOT_FOUND,
                        body: format!("zone {zone} disappeared during rename"),
                    },
                    Err(err) => err,
                };
                warn!(
                    zone,
                    from = old_name,
                    to = %replace.name,
                    rtype,
                    "rename left the old record deleted: {failure}"
                );
                Err(RecordError::PartialRename {
                    zone: zone.to_string(),
                    old_name: old_name.to_string(),
                    new_name: replace.name,
                    source: failure,
                })
            }
        }
    }

    /// Delete an rrset. Returns the rrset as it was before deletion.
    pub async fn delete(&self, key: &RecordKey) -> Result<RecordOutcome<PdnsRrset>, RecordError> {
        let zone = normalized_zone(&key.zone)?;
        let name = record_name(&key.record_name)?;
        let rtype = validate_record_type(&key.rtype)?;

        let _guard = self.locks.lock(&zone).await;
        let Some(current) = self.timed(self.api.get_zone(&zone)).await? else {
            return Ok(RecordOutcome::ZoneNotFound);
        };
        let Some(existing) = current.find_rrset(&name, rtype).cloned() else {
            return Ok(RecordOutcome::RecordNotFound);
        };

        let directive = PdnsRrset::delete(name, rtype, None, Vec::new());
        if !self.timed(self.api.patch_rrsets(&zone, slice::from_ref(&directive))).await? {
            return Ok(RecordOutcome::ZoneNotFound);
        }

        info!(zone = %zone, name = %existing.name, rtype, "record deleted");
        Ok(RecordOutcome::Found(existing))
    }

    /// Write `type -> contents` at the zone apex in a single PATCH, one
    /// `REPLACE` per type. Contents are normalized with [`normalize_import_content`].
    pub async fn import(
        &self,
        zone: &str,
        records: &BTreeMap<String, Vec<String>>,
    ) -> Result<RecordOutcome<Vec<PdnsRrset>>, RecordError> {
        let zone = normalized_zone(zone)?;

        let mut directives = Vec::with_capacity(records.len());
        for (rtype, contents) in records {
            let rtype = validate_record_type(rtype)?;
            if contents.is_empty() {
                continue;
            }
            let mut pdns_records = Vec::with_capacity(contents.len());
            for content in contents {
                let content = normalize_import_content(rtype, content);
                validate_record_content(rtype, &content)?;
                pdns_records.push(PdnsRecord::enabled(content));
            }
            directives.push(PdnsRrset::replace(
                zone.as_str(),
                rtype,
                self.default_ttl,
                pdns_records,
            ));
        }
        if directives.is_empty() {
            return Err(ValidationError::RecordsRequired.into());
        }

        let _guard = self.locks.lock(&zone).await;
        if self.timed(self.api.get_zone(&zone)).await?.is_none() {
            return Ok(RecordOutcome::ZoneNotFound);
        }
        if !self.timed(self.api.patch_rrsets(&zone, &directives)).await? {
            return Ok(RecordOutcome::ZoneNotFound);
        }

        info!(zone = %zone, rrsets = directives.len(), "records imported");
        Ok(RecordOutcome::Found(directives))
    }
}

fn record_name(name: &str) -> Result<String, ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Missing("record name"));
    }
    let name = ensure_trailing_dot(name);
    validate_record_name(&name)?;
    Ok(name)
}

/// Bring content gathered from public resolvers into zone-file form: MX gets a
/// default preference of 10, MX/CNAME/NS targets get a trailing dot and TXT
/// with spaces gets quoted.
pub fn normalize_import_content(rtype: &str, content: &str) -> String {
    let content = content.trim();
    match rtype {
        "MX" => {
            let mut parts = content.split_whitespace();
            let (pref, host) = match (parts.next(), parts.next()) {
                (Some(pref), Some(host)) if pref.bytes().all(|b| b.is_ascii_digit()) => {
                    (pref, host)
                }
                _ => ("10", content),
            };
            format!("{pref} {}", ensure_trailing_dot(host))
        }
        "CNAME" | "NS" => ensure_trailing_dot(content),
        "TXT" if !content.starts_with('"') && !content.ends_with('"') && content.contains(' ') => {
            format!("\"{content}\"")
        }
        _ => content.to_string(),
    }
}
