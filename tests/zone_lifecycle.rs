mod common;

use std::sync::atomic::Ordering;

use common::{FakePdns, memory_db};
use sparrowdns::db::{activity_repo, zone_meta_repo};
use sparrowdns::origin::RequestOrigin;
use sparrowdns::validation::ValidationError;
use sparrowdns::zones::{
    ACTION_CREATE_ZONE, ACTION_DELETE_ZONE, CreateZone, CreateZoneOutcome, DeleteZoneOutcome,
    ZoneError, ZoneLifecycleManager,
};

fn native(name: &str) -> CreateZone {
    CreateZone {
        name: name.into(),
        kind: Some("Native".into()),
        nameservers: vec!["ns1.example.net.".into(), "ns2.example.net.".into()],
        owner: Some("ops".into()),
        description: Some("primary site".into()),
        tags: vec!["prod".into(), "prod".into(), " web ".into()],
        ..Default::default()
    }
}

fn origin() -> RequestOrigin {
    RequestOrigin::new("alice", Some("203.0.113.7".into()))
}

#[tokio::test]
async fn create_writes_upstream_metadata_and_activity() {
    let pdns = FakePdns::default();
    let db = memory_db().await;
    let zones = ZoneLifecycleManager::new(&pdns, &db);

    let outcome = zones.create(&native("example.com"), &origin()).await.unwrap();
    let CreateZoneOutcome::Created(zone) = outcome else {
        panic!("expected a created zone, got {outcome:?}");
    };
    assert_eq!(zone.name, "example.com.");
    assert_eq!(zone.kind, "Native");
    assert!(pdns.has_zone("example.com."));
    assert_eq!(pdns.rrset("example.com.", "example.com.", "NS").unwrap().records.len(), 2);

    let meta = zone_meta_repo::find_by_name(&db, "example.com.")
        .await
        .unwrap()
        .unwrap();
    assert!(meta.synced_with_pdns);
    assert_eq!(meta.owner.as_deref(), Some("ops"));
    assert_eq!(meta.description, "primary site");
    assert_eq!(meta.tags, vec!["prod", "web"]);

    let log = activity_repo::list_for_target(&db, "example.com.").await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, ACTION_CREATE_ZONE);
    assert_eq!(log[0].actor_id, "alice");
    assert_eq!(log[0].source_address.as_deref(), Some("203.0.113.7"));
    assert_eq!(log[0].details["kind"], "Native");
    assert_eq!(log[0].details["zoneMetaId"], meta.id);
}

#[tokio::test]
async fn create_reports_zone_already_upstream() {
    let pdns = FakePdns::with_zone("example.com.");
    let db = memory_db().await;
    let zones = ZoneLifecycleManager::new(&pdns, &db);

    let outcome = zones.create(&native("example.com."), &origin()).await.unwrap();
    assert!(matches!(outcome, CreateZoneOutcome::ExistsUpstream(ref n) if n == "example.com."));
    assert_eq!(pdns.create_calls.load(Ordering::SeqCst), 0);
    assert!(!zone_meta_repo::exists(&db, "example.com.").await.unwrap());
    assert!(activity_repo::list_for_target(&db, "example.com.").await.unwrap().is_empty());
}

#[tokio::test]
async fn create_treats_conflict_as_existing_upstream() {
    let pdns = FakePdns::default();
    pdns.conflict_on_create();
    let db = memory_db().await;
    let zones = ZoneLifecycleManager::new(&pdns, &db);

    let outcome = zones.create(&native("example.com"), &origin()).await.unwrap();
    assert!(matches!(outcome, CreateZoneOutcome::ExistsUpstream(_)));
    assert_eq!(pdns.create_calls.load(Ordering::SeqCst), 1);
    assert!(!zone_meta_repo::exists(&db, "example.com.").await.unwrap());
}

#[tokio::test]
async fn create_stops_at_existing_metadata() {
    let pdns = FakePdns::default();
    let db = memory_db().await;
    zone_meta_repo::insert(
        &db,
        &zone_meta_repo::NewZoneMeta {
            zone_name: "example.com.",
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let zones = ZoneLifecycleManager::new(&pdns, &db);

    let outcome = zones.create(&native("example.com"), &origin()).await.unwrap();
    assert!(matches!(outcome, CreateZoneOutcome::ExistsLocally(_)));
    assert_eq!(pdns.get_calls.load(Ordering::SeqCst), 0);
    assert_eq!(pdns.create_calls.load(Ordering::SeqCst), 0);
    assert!(!pdns.has_zone("example.com."));
}

#[tokio::test]
async fn invalid_create_touches_nothing() {
    let pdns = FakePdns::default();
    let db = memory_db().await;
    let zones = ZoneLifecycleManager::new(&pdns, &db);

    let mut slave = native("example.com");
    slave.kind = Some("Slave".into());
    let err = zones.create(&slave, &origin()).await.unwrap_err();
    assert!(matches!(
        err,
        ZoneError::Validation(ValidationError::MastersRequired)
    ));

    let mut master = native("example.com");
    master.kind = Some("Master".into());
    master.masters = vec!["192.0.2.1".into()];
    assert!(matches!(
        zones.create(&master, &origin()).await,
        Err(ZoneError::Validation(ValidationError::MastersNotAllowed(_)))
    ));

    let mut no_ns = native("example.com");
    no_ns.nameservers.clear();
    assert!(matches!(
        zones.create(&no_ns, &origin()).await,
        Err(ZoneError::Validation(ValidationError::NameserversRequired))
    ));

    assert!(matches!(
        zones.create(&native(""), &origin()).await,
        Err(ZoneError::Validation(ValidationError::Missing(_)))
    ));

    assert_eq!(pdns.get_calls.load(Ordering::SeqCst), 0);
    assert_eq!(pdns.create_calls.load(Ordering::SeqCst), 0);
    assert!(!zone_meta_repo::exists(&db, "example.com.").await.unwrap());
}

#[tokio::test]
async fn slave_zone_keeps_masters() {
    let pdns = FakePdns::default();
    let db = memory_db().await;
    let zones = ZoneLifecycleManager::new(&pdns, &db);

    let mut req = native("secondary.example");
    req.kind = Some("Slave".into());
    req.masters = vec!["192.0.2.53".into()];
    let outcome = zones.create(&req, &origin()).await.unwrap();
    let CreateZoneOutcome::Created(zone) = outcome else {
        panic!("expected a created zone, got {outcome:?}");
    };
    assert_eq!(zone.kind, "Slave");
    assert_eq!(zone.masters, vec!["192.0.2.53"]);
}

#[tokio::test]
async fn delete_missing_zone_logs_nothing() {
    let pdns = FakePdns::default();
    let db = memory_db().await;
    let zones = ZoneLifecycleManager::new(&pdns, &db);

    let outcome = zones.delete("ghost.example", &origin()).await.unwrap();
    assert_eq!(outcome, DeleteZoneOutcome::NotFound);
    assert!(activity_repo::list_for_target(&db, "ghost.example.").await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_removes_metadata_when_present() {
    let pdns = FakePdns::default();
    let db = memory_db().await;
    let zones = ZoneLifecycleManager::new(&pdns, &db);

    zones.create(&native("example.com"), &origin()).await.unwrap();
    let outcome = zones.delete("example.com", &origin()).await.unwrap();
    assert_eq!(outcome, DeleteZoneOutcome::Deleted { metadata_removed: true });
    assert!(!pdns.has_zone("example.com."));
    assert!(!zone_meta_repo::exists(&db, "example.com.").await.unwrap());

    let log = activity_repo::list_for_target(&db, "example.com.").await.unwrap();
    let actions: Vec<&str> = log.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec![ACTION_CREATE_ZONE, ACTION_DELETE_ZONE]);
    assert_eq!(log[1].details["metaDeleted"], true);
}

#[tokio::test]
async fn delete_without_metadata_still_succeeds() {
    let pdns = FakePdns::with_zone("legacy.example.");
    let db = memory_db().await;
    let zones = ZoneLifecycleManager::new(&pdns, &db);

    let outcome = zones.delete("legacy.example.", &origin()).await.unwrap();
    assert_eq!(outcome, DeleteZoneOutcome::Deleted { metadata_removed: false });

    let log = activity_repo::list_for_target(&db, "legacy.example.").await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].details["metaDeleted"], false);
}

#[tokio::test]
async fn get_and_list_pass_through() {
    let pdns = FakePdns::with_zone("a.example.");
    pdns.add_zone("b.example.");
    let db = memory_db().await;
    let zones = ZoneLifecycleManager::new(&pdns, &db);

    assert!(zones.get("a.example").await.unwrap().is_some());
    assert!(zones.get("c.example").await.unwrap().is_none());
    let names: Vec<String> = zones.list().await.unwrap().into_iter().map(|z| z.name).collect();
    assert_eq!(names, vec!["a.example.", "b.example."]);
}
