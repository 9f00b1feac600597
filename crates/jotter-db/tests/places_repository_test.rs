//! Integration tests for the place repository.
//!
//! Require a PostgreSQL instance at `DATABASE_URL`; run with `--ignored`.
//! Codes starting with `Q` are reserved for these tests.

use jotter_db::test_fixtures::TestDatabase;
use jotter_db::{Place, PlaceKind, PlaceQuery, PlaceRepository};

fn city(code: &str, name: &str) -> Place {
    Place {
        kind: PlaceKind::City,
        code: code.to_string(),
        name: name.to_string(),
        country_code: Some("ZZ".to_string()),
        city_code: None,
    }
}

#[tokio::test]
#[ignore]
async fn test_upsert_reports_create_then_update() {
    let test_db = TestDatabase::new().await;
    let places = &test_db.db.places;

    places.delete(PlaceKind::City, "QXA").await.unwrap();
    assert!(places.upsert(&city("QXA", "Qxa Town")).await.unwrap());
    assert!(!places.upsert(&city("QXA", "Qxa City")).await.unwrap());

    let stored = places.get(PlaceKind::City, "qxa").await.unwrap().unwrap();
    assert_eq!(stored.name, "Qxa City");
    assert!(places.get(PlaceKind::Airport, "QXA").await.unwrap().is_none());

    assert!(places.delete(PlaceKind::City, "QXA").await.unwrap());
    assert!(!places.delete(PlaceKind::City, "QXA").await.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_search_prefers_exact_code_and_escapes_wildcards() {
    let test_db = TestDatabase::new().await;
    let places = &test_db.db.places;

    places.upsert(&city("QXB", "Qxb Harbour")).await.unwrap();
    places.upsert(&city("QXC", "Qxbury")).await.unwrap();

    let hits = places
        .search(&PlaceQuery {
            kind: PlaceKind::City,
            term: "qxb".to_string(),
            limit: 10,
        })
        .await
        .unwrap();
    let codes: Vec<&str> = hits.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(codes, vec!["QXB", "QXC"]);

    let wildcard = places
        .search(&PlaceQuery {
            kind: PlaceKind::City,
            term: "q%".to_string(),
            limit: 10,
        })
        .await
        .unwrap();
    assert!(wildcard.is_empty());

    places.delete(PlaceKind::City, "QXB").await.unwrap();
    places.delete(PlaceKind::City, "QXC").await.unwrap();
}
