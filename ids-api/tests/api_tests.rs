//! Integration tests for the ids-api HTTP surface
//!
//! Runs the real router against an in-memory database. The weather and
//! feed clients point at an unroutable address, which exercises the
//! absorb-flow-errors and cold-cache paths without any network.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use ids_api::{build_router, cache::FeedClient, AppState};
use ids_common::db::create_schema;
use ids_common::wx::{FlowDetector, WxClient};
use ids_common::{Config, FlowMap};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot`

const FLOW_TOML: &str = r#"
[[airport]]
code = "DTW"

[[airport.flows]]
direction = "SOUTH"
runways = ["21", "22"]

[[airport.flows]]
direction = "NORTH"
runways = ["3", "4"]
"#;

async fn test_state(shared_secret: &str) -> AppState {
    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
    create_schema(&pool).await.unwrap();

    // unroutable endpoints with a tiny timeout keep tests fast offline
    let timeout = Duration::from_millis(50);
    let wx = WxClient::new("http://127.0.0.1:1", "http://127.0.0.1:1", timeout).unwrap();
    let feeds = FeedClient::new("http://127.0.0.1:1", "http://127.0.0.1:1", timeout).unwrap();
    let flow_map = FlowMap::from_toml_str(FLOW_TOML).unwrap();
    let flow = FlowDetector::new(wx.clone(), flow_map);

    AppState::new(
        pool,
        Config::default(),
        wx,
        flow,
        feeds,
        shared_secret.to_string(),
    )
}

async fn seed_routes(state: &AppState) {
    for (origin, dest, route, altitude, notes) in [
        ("CLE", "DTW", "BONZZ BONZZ2", "", "DTW south"),
        ("CLE", "DTW", "BONZZ KLYNK3", "", "DTW north"),
        ("CLE", "ORD", "GTLKE4 DAIFE WATSN WATSN4", "FL240", ""),
    ] {
        sqlx::query(
            "INSERT INTO routes (origin, destination, route, altitude, notes)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(origin)
        .bind(dest)
        .bind(route)
        .bind(altitude)
        .bind(notes)
        .execute(&state.db)
        .await
        .unwrap();
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_module() {
    let app = build_router(test_state("").await);
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "ids-api");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn route_search_returns_ranked_candidates() {
    let state = test_state("").await;
    seed_routes(&state).await;
    let app = build_router(state);

    let response = app.oneshot(get("/api/routes?origin=KCLE&destination=KDTW")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let routes = body.as_array().unwrap();
    assert_eq!(routes.len(), 2);
    // flow detection fails against the unroutable endpoint and is
    // absorbed: candidates stay inactive but keep their flow concept
    for route in routes {
        assert_eq!(route["isActive"], false);
        assert_eq!(route["hasFlows"], true);
        assert_eq!(route["flow"], "");
        assert_eq!(route["source"], "custom");
    }
}

#[tokio::test]
async fn route_search_without_filters_lists_custom_routes() {
    let state = test_state("").await;
    seed_routes(&state).await;
    let app = build_router(state);

    let response = app.oneshot(get("/api/routes")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn route_search_with_no_match_is_empty_success() {
    let state = test_state("").await;
    let app = build_router(state);

    let response = app.oneshot(get("/api/routes?origin=ABE&destination=XYZ")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn mutating_routes_require_token_when_secret_set() {
    let state = test_state("hunter2").await;
    let app = build_router(state.clone());

    let body = json!({
        "origin": "KCLE",
        "destination": "KMDW",
        "route": "GTLKE4  BAGEL PANGG5",
        "notes": ""
    });

    // no token
    let response = app
        .clone()
        .oneshot(post_json("/api/routes", body.clone(), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // wrong token
    let response = app
        .clone()
        .oneshot(post_json("/api/routes", body.clone(), Some("wrong")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // valid token; codes and route are normalized on write
    let response = app
        .oneshot(post_json("/api/routes", body, Some("hunter2")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (origin, route): (String, String) =
        sqlx::query_as("SELECT origin, route FROM routes LIMIT 1")
            .fetch_one(&state.db)
            .await
            .unwrap();
    assert_eq!(origin, "CLE");
    assert_eq!(route, "GTLKE4 BAGEL PANGG5");
}

#[tokio::test]
async fn empty_secret_disables_auth() {
    let state = test_state("").await;
    let app = build_router(state);

    let body = json!({
        "origin": "CLE",
        "destination": "CMH",
        "route": "WWSHR CBUSS2",
        "notes": ""
    });
    let response = app
        .oneshot(post_json("/api/routes", body, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn crossings_filter_normalizes_icao_destination() {
    let state = test_state("").await;
    sqlx::query(
        "INSERT INTO crossings (destination, bdry_fix, restriction, notes, artcc)
         VALUES ('EWR', 'SLT', 'AOB FL330', '', 'ZNY')",
    )
    .execute(&state.db)
    .await
    .unwrap();
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(get("/api/crossings?destination=KEWR"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["fix"], "SLT");
    assert_eq!(body[0]["artcc"], "ZNY");

    let response = app.oneshot(get("/api/crossings?destination=DTW")).await.unwrap();
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn enroute_listing_collapses_duplicates_and_sorts() {
    let state = test_state("").await;
    for (field, qualifier, areas, rule) in [
        ("PIT", "JETS", "ALL", "FL280+"),
        ("CLE", "PROPS", "LOW", "V10"),
        ("CLE", "PROPS", "LOW", "V10"),
    ] {
        sqlx::query("INSERT INTO enroute (field, qualifier, areas, rule) VALUES (?, ?, ?, ?)")
            .bind(field)
            .bind(qualifier)
            .bind(areas)
            .bind(rule)
            .execute(&state.db)
            .await
            .unwrap();
    }
    let app = build_router(state);

    let response = app.oneshot(get("/api/enroute")).await.unwrap();
    let body = json_body(response).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["field"], "CLE");
    assert_eq!(rows[1]["field"], "PIT");
}

#[tokio::test]
async fn star_expansion_prefers_transition_then_falls_back() {
    let state = test_state("").await;
    for (transition, seq, point, assoc) in [
        ("KKILR3.KAMMA", 10, "KAMMA", ""),
        ("KKILR3.KAMMA", 20, "KKILR", ""),
        ("KKILR3.KAMMA", 30, "RWYPT", "ORD/10L"),
    ] {
        sqlx::query(
            "INSERT INTO star_rte (procedure_code, transition_code, route_name, point_seq, point, arpt_rwy_assoc)
             VALUES ('KKILR3', ?, 'KAMMA TRANSITION', ?, ?, ?)",
        )
        .bind(transition)
        .bind(seq)
        .bind(point)
        .bind(assoc)
        .execute(&state.db)
        .await
        .unwrap();
    }
    let app = build_router(state);

    // runway-specific row skipped, points in descending sequence order
    let response = app
        .clone()
        .oneshot(get("/api/star?code=kkilr3.kamma"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["transition"], "KKILR3.KAMMA");
    assert_eq!(body["waypoints"], json!(["KKILR", "KAMMA"]));

    // unknown dotted code degrades to the after-dot fix
    let response = app
        .clone()
        .oneshot(get("/api/star?code=ZZZZZ5.BONZZ"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["waypoints"], json!(["BONZZ"]));

    // unknown bare code is a 404
    let response = app.oneshot(get("/api/star?code=NOPE1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cold_caches_return_service_unavailable() {
    let app = build_router(test_state("").await);

    for uri in ["/api/aircraft", "/api/controllers", "/api/airport_info"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(
            response.status(),
            StatusCode::SERVICE_UNAVAILABLE,
            "expected 503 for {}",
            uri
        );
    }
}

#[tokio::test]
async fn warm_aircraft_cache_filters_by_radius() {
    let state = test_state("").await;
    state
        .cache
        .set_aircraft(ids_api::cache::AircraftSnapshot {
            updated_at: chrono::Utc::now(),
            aircraft: vec![
                ids_api::cache::Aircraft {
                    callsign: "DAL123".to_string(),
                    route: "BONZZ BONZZ2".to_string(),
                    departure: "KCLE".to_string(),
                    destination: "KDTW".to_string(),
                    lat: 41.4,
                    lon: -81.8,
                    altitude: 21000,
                },
                ids_api::cache::Aircraft {
                    callsign: "UAL900".to_string(),
                    route: "DCT".to_string(),
                    departure: "KLAX".to_string(),
                    destination: "KSFO".to_string(),
                    lat: 34.0,
                    lon: -118.4,
                    altitude: 35000,
                },
            ],
        })
        .await;
    let app = build_router(state);

    let response = app.oneshot(get("/api/aircraft?radius=400")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let aircraft = body["aircraft"].as_array().unwrap();
    assert_eq!(aircraft.len(), 1);
    assert_eq!(aircraft[0]["callsign"], "DAL123");
}

#[tokio::test]
async fn route_update_and_delete_report_missing_rows() {
    let state = test_state("").await;
    let app = build_router(state);

    let body = json!({
        "origin": "CLE",
        "destination": "DTW",
        "route": "BONZZ BONZZ2",
        "notes": ""
    });
    let request = Request::builder()
        .method("PUT")
        .uri("/api/routes/999")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/routes/999")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
