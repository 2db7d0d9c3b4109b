// system-tests/tests/session_properties.rs
// ============================================================================
// Module: Session Properties
// Description: Universal property of session-view snapshot immutability.
// Purpose: Exercise that a session's stored view definition never drifts
//          from what it captured at creation time.
// Dependencies: tansive-core, tansive-store-sqlite, tansive-policy
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "System tests assert with panics; this crate is not published."
)]

mod helpers;

use serde_json::json;
use tansive_core::core::Action;
use tansive_core::core::CatalogId;
use tansive_core::core::Intent;
use tansive_core::core::Rule;
use tansive_core::core::Scope;
use tansive_core::core::Session;
use tansive_core::core::SessionId;
use tansive_core::core::SessionStatus;
use tansive_core::core::TenantId;
use tansive_core::core::VariantId;
use tansive_core::core::View;
use tansive_core::core::ViewDefinition;
use tansive_core::core::ViewId;
use tansive_core::interfaces::SessionRepository;
use tansive_core::interfaces::ViewRepository;
use tansive_policy::engine::is_authorized;
use tansive_store_sqlite::SqliteStore;
use tansive_store_sqlite::SqliteStoreConfig;
use time::Duration;
use time::OffsetDateTime;

fn open_store() -> (tempfile::TempDir, SqliteStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = SqliteStoreConfig::new(dir.path().join("sessions.sqlite"));
    let store = SqliteStore::open(&config).expect("open store");
    (dir, store)
}

fn view_with(rules: Vec<Rule>, catalog_id: CatalogId, tenant_id: &TenantId) -> View {
    View {
        view_id: ViewId::new(),
        label: "worker".to_string(),
        catalog_id,
        rules: ViewDefinition {
            scope: Scope::catalog("c"),
            rules,
        },
        tenant_id: tenant_id.clone(),
        created_at: OffsetDateTime::now_utc(),
    }
}

/// A session's stored view snapshot round-trips through the store exactly
/// as captured, independent of a second, differently-ruled view that
/// exists alongside it under the same scope (universal property 9).
#[test]
fn session_snapshot_is_unaffected_by_a_differently_ruled_view() {
    let (_dir, store) = open_store();
    let tenant_id = TenantId::new("T1").expect("valid tenant id");
    let catalog_id = CatalogId::new();
    let variant_id = VariantId::new();
    store.insert_catalog(&tenant_id, catalog_id, "c").expect("insert catalog");
    store.insert_variant(&tenant_id, variant_id, catalog_id, "v").expect("insert variant");

    let read_only = vec![Rule {
        intent: Intent::Allow,
        actions: vec![Action::ResourceRead],
        targets: vec!["res://catalog/c/variant/v/resource/*".to_string()],
    }];
    let view_at_creation = view_with(read_only.clone(), catalog_id, &tenant_id);
    ViewRepository::insert(&store, &view_at_creation).expect("insert view");

    let now = OffsetDateTime::now_utc();
    let session = Session {
        session_id: SessionId::new(),
        skillset_path: "/tools".to_string(),
        skill: "deploy".to_string(),
        view_id: view_at_creation.view_id,
        view_definition_snapshot: view_at_creation.rules.clone(),
        variables: json!({}),
        input_args: json!({}),
        status_summary: SessionStatus::Created,
        user_id: "user/alice".to_string(),
        catalog_id,
        variant_id,
        started_at: now,
        ended_at: None,
        expires_at: now + Duration::days(30),
    };
    SessionRepository::insert(&store, &session).expect("insert session");

    let editable_copy_elsewhere = ViewDefinition {
        scope: Scope::catalog("c"),
        rules: vec![Rule {
            intent: Intent::Allow,
            actions: vec![Action::ResourceDelete, Action::ResourceRead],
            targets: vec!["res://catalog/c/variant/v/resource/*".to_string()],
        }],
    };
    assert_ne!(editable_copy_elsewhere, view_at_creation.rules);

    let fetched = SessionRepository::get(&store, &session.session_id)
        .expect("load session")
        .expect("session exists");
    assert_eq!(fetched.view_definition_snapshot, view_at_creation.rules);
    assert_ne!(fetched.view_definition_snapshot, editable_copy_elsewhere);

    let target = tansive_core::core::TargetResource::parse("res://catalog/c/variant/v/resource/anything").expect("valid target");
    assert!(!is_authorized(&fetched.view_definition_snapshot, Action::ResourceDelete, &target));
    assert!(is_authorized(&editable_copy_elsewhere, Action::ResourceDelete, &target));
}

/// Updating a session's in-band status does not touch its view snapshot.
#[test]
fn status_updates_leave_the_snapshot_untouched() {
    let (_dir, store) = open_store();
    let tenant_id = TenantId::new("T1").expect("valid tenant id");
    let catalog_id = CatalogId::new();
    let variant_id = VariantId::new();
    store.insert_catalog(&tenant_id, catalog_id, "c").expect("insert catalog");
    store.insert_variant(&tenant_id, variant_id, catalog_id, "v").expect("insert variant");

    let rules = vec![Rule {
        intent: Intent::Allow,
        actions: vec![Action::ResourceRead],
        targets: vec!["res://catalog/c/variant/v/resource/*".to_string()],
    }];
    let view = view_with(rules, catalog_id, &tenant_id);
    ViewRepository::insert(&store, &view).expect("insert view");

    let now = OffsetDateTime::now_utc();
    let session = Session {
        session_id: SessionId::new(),
        skillset_path: "/tools".to_string(),
        skill: "deploy".to_string(),
        view_id: view.view_id,
        view_definition_snapshot: view.rules.clone(),
        variables: json!({}),
        input_args: json!({}),
        status_summary: SessionStatus::Created,
        user_id: "user/alice".to_string(),
        catalog_id,
        variant_id,
        started_at: now,
        ended_at: None,
        expires_at: now + Duration::days(30),
    };
    SessionRepository::insert(&store, &session).expect("insert session");

    SessionRepository::set_status_summary(&store, &session.session_id, SessionStatus::Running).expect("update status");

    let fetched = SessionRepository::get(&store, &session.session_id)
        .expect("load session")
        .expect("session exists");
    assert_eq!(fetched.status_summary, SessionStatus::Running);
    assert_eq!(fetched.view_definition_snapshot, view.rules);
}
