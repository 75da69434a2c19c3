//! Integration tests for the flood report, alert and shelter repositories.
//!
//! Exercises the repository layer against a real database:
//! - Create / read / update / delete round trips
//! - Filtering and pagination of reports
//! - Active-alert filtering (deactivated and expired alerts)
//! - Proximity search for shelters
//! - CHECK and UNIQUE constraint enforcement

use chrono::{Duration, Utc};
use floodwatch_db::models::flood_alert::{CreateFloodAlert, UpdateFloodAlert};
use floodwatch_db::models::flood_report::{CreateFloodReport, UpdateFloodReport};
use floodwatch_db::models::shelter::{CreateShelter, UpdateShelter};
use floodwatch_db::repositories::{FloodAlertRepo, FloodReportFilter, FloodReportRepo, ShelterRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_report(location: &str, water_level_cm: Option<i32>) -> CreateFloodReport {
    CreateFloodReport {
        location: location.to_string(),
        latitude: -6.2241,
        longitude: 106.8673,
        water_level_cm,
        severity: None,
        description: None,
        reporter_name: Some("Warga".to_string()),
        reporter_contact: None,
        photo_url: None,
    }
}

fn new_alert(title: &str) -> CreateFloodAlert {
    CreateFloodAlert {
        region: "DKI Jakarta".to_string(),
        level: "warning".to_string(),
        title: title.to_string(),
        message: "Residents along the river should prepare to evacuate".to_string(),
        source: Some("BPBD".to_string()),
        issued_at: None,
        expires_at: None,
    }
}

fn new_shelter(name: &str, lat: f64, lon: f64) -> CreateShelter {
    CreateShelter {
        name: name.to_string(),
        address: None,
        latitude: lat,
        longitude: lon,
        capacity: Some(300),
        occupancy: None,
        contact_phone: None,
        facilities: Some(vec!["kitchen".to_string(), "clinic".to_string()]),
        is_open: None,
    }
}

// ---------------------------------------------------------------------------
// Flood reports
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn report_create_starts_pending(pool: PgPool) {
    let report = FloodReportRepo::create(&pool, &new_report("Kampung Melayu", Some(80)), "high")
        .await
        .unwrap();

    assert_eq!(report.status, "pending");
    assert_eq!(report.severity, "high");
    assert_eq!(report.water_level_cm, Some(80));

    let found = FloodReportRepo::find_by_id(&pool, report.id).await.unwrap();
    assert_eq!(found.unwrap().location, "Kampung Melayu");
}

#[sqlx::test(migrations = "./migrations")]
async fn report_list_filters_and_orders_newest_first(pool: PgPool) {
    let a = FloodReportRepo::create(&pool, &new_report("A", None), "low")
        .await
        .unwrap();
    let b = FloodReportRepo::create(&pool, &new_report("B", None), "critical")
        .await
        .unwrap();
    FloodReportRepo::update_status(&pool, a.id, "verified")
        .await
        .unwrap();

    let all = FloodReportRepo::list(&pool, &FloodReportFilter::default(), 50, 0)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, b.id);

    let verified = FloodReportRepo::list(
        &pool,
        &FloodReportFilter {
            status: Some("verified".to_string()),
            severity: None,
        },
        50,
        0,
    )
    .await
    .unwrap();
    assert_eq!(verified.len(), 1);
    assert_eq!(verified[0].id, a.id);

    let critical = FloodReportRepo::list(
        &pool,
        &FloodReportFilter {
            status: None,
            severity: Some("critical".to_string()),
        },
        50,
        0,
    )
    .await
    .unwrap();
    assert_eq!(critical.len(), 1);
    assert_eq!(critical[0].id, b.id);

    let page = FloodReportRepo::list(&pool, &FloodReportFilter::default(), 1, 1)
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, a.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn report_update_applies_only_present_fields(pool: PgPool) {
    let report = FloodReportRepo::create(&pool, &new_report("Bidara Cina", Some(40)), "moderate")
        .await
        .unwrap();

    let updated = FloodReportRepo::update(
        &pool,
        report.id,
        &UpdateFloodReport {
            water_level_cm: Some(120),
            severity: Some("high".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.location, "Bidara Cina");
    assert_eq!(updated.water_level_cm, Some(120));
    assert_eq!(updated.severity, "high");
    assert!(updated.updated_at >= report.updated_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn report_update_missing_returns_none(pool: PgPool) {
    let result = FloodReportRepo::update(&pool, 9999, &UpdateFloodReport::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn report_invalid_status_violates_check(pool: PgPool) {
    let report = FloodReportRepo::create(&pool, &new_report("X", None), "low")
        .await
        .unwrap();
    let err = FloodReportRepo::update_status(&pool, report.id, "archived")
        .await
        .unwrap_err();
    match err {
        sqlx::Error::Database(db_err) => assert_eq!(db_err.code().as_deref(), Some("23514")),
        other => panic!("expected CHECK violation, got {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn report_delete(pool: PgPool) {
    let report = FloodReportRepo::create(&pool, &new_report("Y", None), "low")
        .await
        .unwrap();
    assert!(FloodReportRepo::delete(&pool, report.id).await.unwrap());
    assert!(!FloodReportRepo::delete(&pool, report.id).await.unwrap());
    assert!(FloodReportRepo::find_by_id(&pool, report.id)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn active_alerts_exclude_deactivated_and_expired(pool: PgPool) {
    let live = FloodAlertRepo::create(&pool, &new_alert("live")).await.unwrap();
    let stopped = FloodAlertRepo::create(&pool, &new_alert("stopped"))
        .await
        .unwrap();
    let expired = FloodAlertRepo::create(
        &pool,
        &CreateFloodAlert {
            expires_at: Some(Utc::now() - Duration::hours(1)),
            ..new_alert("expired")
        },
    )
    .await
    .unwrap();

    assert!(FloodAlertRepo::deactivate(&pool, stopped.id).await.unwrap());
    assert!(!FloodAlertRepo::deactivate(&pool, stopped.id).await.unwrap());

    let active = FloodAlertRepo::list(&pool, true, 50, 0).await.unwrap();
    let ids: Vec<_> = active.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![live.id]);

    let all = FloodAlertRepo::list(&pool, false, 50, 0).await.unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().any(|a| a.id == expired.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn alert_update_and_delete(pool: PgPool) {
    let alert = FloodAlertRepo::create(&pool, &new_alert("Ciliwung"))
        .await
        .unwrap();
    let updated = FloodAlertRepo::update(
        &pool,
        alert.id,
        &UpdateFloodAlert {
            level: Some("emergency".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.level, "emergency");
    assert_eq!(updated.title, "Ciliwung");

    assert!(FloodAlertRepo::delete(&pool, alert.id).await.unwrap());
    assert!(FloodAlertRepo::find_by_id(&pool, alert.id)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Shelters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn nearby_shelters_are_filtered_and_sorted(pool: PgPool) {
    // Query point: Monas, Jakarta.
    let (lat, lon) = (-6.1754, 106.8272);
    let near = ShelterRepo::create(&pool, &new_shelter("GOR Jatinegara", -6.2150, 106.8700))
        .await
        .unwrap();
    let nearer = ShelterRepo::create(&pool, &new_shelter("Masjid Istiqlal", -6.1702, 106.8310))
        .await
        .unwrap();
    ShelterRepo::create(&pool, &new_shelter("Bogor", -6.5980, 106.7975))
        .await
        .unwrap();

    let found = ShelterRepo::list_nearby(&pool, lat, lon, 10.0, 10)
        .await
        .unwrap();

    let ids: Vec<_> = found.iter().map(|s| s.shelter.id).collect();
    assert_eq!(ids, vec![nearer.id, near.id]);
    assert!(found[0].distance_km < found[1].distance_km);
    assert_eq!(found[0].shelter.facilities, vec!["kitchen", "clinic"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn shelter_defaults_and_update(pool: PgPool) {
    let shelter = ShelterRepo::create(
        &pool,
        &CreateShelter {
            facilities: None,
            ..new_shelter("Balai Warga", -6.2, 106.8)
        },
    )
    .await
    .unwrap();
    assert!(shelter.is_open);
    assert!(shelter.facilities.is_empty());

    let updated = ShelterRepo::update(
        &pool,
        shelter.id,
        &UpdateShelter {
            occupancy: Some(120),
            is_open: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.occupancy, Some(120));
    assert!(!updated.is_open);
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_shelter_name_violates_unique(pool: PgPool) {
    ShelterRepo::create(&pool, &new_shelter("Posko A", -6.2, 106.8))
        .await
        .unwrap();
    let err = ShelterRepo::create(&pool, &new_shelter("Posko A", -6.3, 106.9))
        .await
        .unwrap_err();
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.code().as_deref(), Some("23505"));
            assert_eq!(db_err.constraint(), Some("uq_evacuation_shelters_name"));
        }
        other => panic!("expected unique violation, got {other:?}"),
    }
}
