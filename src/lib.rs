//! Crate entrypoint wiring together configuration, DB, PowerDNS, and APIs.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod origin;
pub mod powerdns;
pub mod records;
pub mod stats;
pub mod validation;
pub mod zones;

use config::AppConfig;
use db::Db;
use powerdns::client::PowerDnsClient;
use records::ZoneLocks;

use std::sync::Arc;

/// Complete application dependencies shared across handlers.
pub struct AppState {
    pub config: AppConfig,
    pub db: Db,
    pub pdns: PowerDnsClient,
    pub zone_locks: ZoneLocks,
}

impl AppState {
    pub fn new(config: AppConfig, db: Db, pdns: PowerDnsClient) -> Self {
        Self {
            config,
            db,
            pdns,
            zone_locks: ZoneLocks::default(),
        }
    }
}

/// Arc-wrapped version of `AppState` passed into Axum extensions.
pub type SharedState = Arc<AppState>;
