//! Route resolution and flow-aware ranking
//!
//! Given an origin/destination pair, queries the curated and FAA route
//! stores, annotates every candidate with live departure-flow state, and
//! merges both sources into one deduplicated, priority-ordered list.
//!
//! Candidates are materialized fresh on every call and never persisted
//! in this shape. The whole merge is synchronous and holds no state
//! across calls, so it is safe under concurrent request tasks.

pub mod store;

use ids_common::db::{FaaRouteRow, RouteRow};
use ids_common::normalize::{normalize_airport, normalize_route};
use ids_common::wx::{FlowResult, FlowSource};
use ids_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::warn;

/// Which collection a candidate came from. FAA wins on key collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteSource {
    Custom,
    Faa,
}

/// One merged, flow-annotated route candidate
#[derive(Debug, Clone, Serialize)]
pub struct RankedRoute {
    /// Row id of the backing curated route; FAA candidates have none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub origin: String,
    pub destination: String,
    pub route: String,
    pub altitude: String,
    pub notes: String,
    /// Detected flow direction for the destination, empty when unknown
    pub flow: String,
    /// Whether this candidate is consistent with the detected flow
    #[serde(rename = "isActive")]
    pub is_active: bool,
    /// Whether the destination has a configured flow concept at all
    #[serde(rename = "hasFlows")]
    pub has_flows: bool,
    pub source: RouteSource,
    /// Special-event routes rank above everything else
    #[serde(rename = "isEvent")]
    pub is_event: bool,
}

/// Ranking tiers: event routes, then active-flow routes, then remaining
/// custom routes, then remaining FAA routes. The sort is stable, so ties
/// keep first-insertion order (custom pass runs before FAA pass).
fn rank_tier(route: &RankedRoute) -> u8 {
    if route.is_event {
        0
    } else if route.is_active {
        1
    } else if route.source == RouteSource::Custom {
        2
    } else {
        3
    }
}

/// Order-preserving merge map keyed by the normalized
/// (origin, destination, route) triple. Overwrites keep the slot of the
/// first insertion, so ranking ties stay stable.
#[derive(Default)]
struct Merged {
    routes: Vec<RankedRoute>,
    index: HashMap<(String, String, String), usize>,
}

impl Merged {
    fn altitude_at(&self, key: &(String, String, String)) -> Option<String> {
        self.index
            .get(key)
            .map(|&slot| self.routes[slot].altitude.clone())
            .filter(|alt| !alt.is_empty())
    }

    fn insert(&mut self, key: (String, String, String), candidate: RankedRoute) {
        match self.index.get(&key) {
            Some(&slot) => self.routes[slot] = candidate,
            None => {
                self.index.insert(key, self.routes.len());
                self.routes.push(candidate);
            }
        }
    }

    fn into_routes(self) -> Vec<RankedRoute> {
        self.routes
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && haystack.to_uppercase().contains(&needle.to_uppercase())
}

/// Resolve the ranked route list for an origin/destination pair.
///
/// Either argument may be empty; with both empty only the curated store
/// is consulted. Store failures abort the whole call; a ranking that
/// silently dropped one source would be worse than an error. Flow
/// detector failures are absorbed as "flow unknown" and never fail the
/// call.
pub async fn resolve(
    pool: &SqlitePool,
    flow_source: &dyn FlowSource,
    origin_raw: &str,
    destination_raw: &str,
) -> Result<Vec<RankedRoute>> {
    let origin = normalize_airport(origin_raw);
    let destination = normalize_airport(destination_raw);
    let origin_filter = (!origin.is_empty()).then_some(origin.as_str());
    let destination_filter = (!destination.is_empty()).then_some(destination.as_str());

    let custom = store::query_custom(pool, origin_filter, destination_filter).await?;
    let faa = store::query_faa(pool, origin_filter, destination_filter).await?;

    // One flow evaluation per call, reused for every candidate
    let has_flows = !destination.is_empty() && flow_source.has_flows(&destination);
    let flow = if has_flows {
        match flow_source.detect_flow(&destination).await {
            Ok(result) => result
                .direction()
                .map(|d| d.to_uppercase())
                .unwrap_or_default(),
            Err(e) => {
                warn!("flow detection failed for {}: {}", destination, e);
                String::new()
            }
        }
    } else {
        String::new()
    };

    let mut merged = Merged::default();

    for row in custom {
        insert_custom(&mut merged, row, has_flows, &flow);
    }
    for row in faa {
        insert_faa(&mut merged, row, &origin, &destination, has_flows, &flow);
    }

    let mut routes = merged.into_routes();
    routes.sort_by_key(rank_tier);
    Ok(routes)
}

fn insert_custom(merged: &mut Merged, row: RouteRow, has_flows: bool, flow: &str) {
    let origin = normalize_airport(&row.origin);
    let destination = normalize_airport(&row.destination);
    let route = normalize_route(&row.route);
    let is_event = contains_ignore_case(&row.notes, "EVENT");
    let is_active = has_flows && contains_ignore_case(&row.notes, flow);

    let key = (origin.clone(), destination.clone(), route.clone());
    merged.insert(
        key,
        RankedRoute {
            id: Some(row.id),
            origin,
            destination,
            route,
            altitude: row.altitude,
            notes: row.notes,
            flow: flow.to_string(),
            is_active,
            has_flows,
            source: RouteSource::Custom,
            is_event,
        },
    );
}

/// FAA rows are scoped by the query rather than carrying their own
/// origin/destination, so the key uses the request's normalized codes.
/// On collision the FAA row wins but inherits a non-empty altitude from
/// the curated row it displaces, since FAA data never supplies one.
fn insert_faa(
    merged: &mut Merged,
    row: FaaRouteRow,
    origin: &str,
    destination: &str,
    has_flows: bool,
    flow: &str,
) {
    let route = normalize_route(&row.route_string);
    let key = (origin.to_string(), destination.to_string(), route.clone());
    let altitude = merged.altitude_at(&key).unwrap_or_default();
    let is_active = has_flows && contains_ignore_case(&row.direction, flow);

    merged.insert(
        key,
        RankedRoute {
            id: None,
            origin: origin.to_string(),
            destination: destination.to_string(),
            route,
            altitude,
            notes: row.area,
            flow: flow.to_string(),
            is_active,
            has_flows,
            source: RouteSource::Faa,
            is_event: false,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ids_common::db::create_schema;
    use ids_common::wx::FlowResult;
    use ids_common::Error;

    /// Flow stub returning a fixed direction per airport
    struct FixedFlow {
        airports: HashMap<String, String>,
    }

    impl FixedFlow {
        fn new(entries: &[(&str, &str)]) -> Self {
            Self {
                airports: entries
                    .iter()
                    .map(|(a, d)| (a.to_string(), d.to_string()))
                    .collect(),
            }
        }

        fn none() -> Self {
            Self {
                airports: HashMap::new(),
            }
        }
    }

    #[async_trait]
    impl FlowSource for FixedFlow {
        fn has_flows(&self, airport: &str) -> bool {
            self.airports.contains_key(airport)
        }

        async fn detect_flow(&self, airport: &str) -> ids_common::Result<FlowResult> {
            Ok(self
                .airports
                .get(airport)
                .map(|d| FlowResult::Direction(d.clone()))
                .unwrap_or(FlowResult::Unknown))
        }
    }

    /// Flow stub whose detection always fails
    struct BrokenFlow;

    #[async_trait]
    impl FlowSource for BrokenFlow {
        fn has_flows(&self, _airport: &str) -> bool {
            true
        }

        async fn detect_flow(&self, _airport: &str) -> ids_common::Result<FlowResult> {
            Err(Error::Upstream("atis feed down".to_string()))
        }
    }

    async fn pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        create_schema(&pool).await.unwrap();
        pool
    }

    async fn insert_route(
        pool: &SqlitePool,
        origin: &str,
        destination: &str,
        route: &str,
        altitude: &str,
        notes: &str,
    ) {
        sqlx::query(
            "INSERT INTO routes (origin, destination, route, altitude, notes)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(origin)
        .bind(destination)
        .bind(route)
        .bind(altitude)
        .bind(notes)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn insert_faa_route(
        pool: &SqlitePool,
        orig: &str,
        dest: &str,
        route_string: &str,
        area: &str,
        direction: &str,
    ) {
        sqlx::query(
            "INSERT INTO faa_prefroutes (orig, route_string, dest, area, direction)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(orig)
        .bind(route_string)
        .bind(dest)
        .bind(area)
        .bind(direction)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn dedup_keeps_one_faa_entry_with_custom_altitude() {
        let pool = pool().await;
        insert_route(&pool, "CLE", "ORD", "GTLKE4  DAIFE WATSN  WATSN4", "FL240", "").await;
        insert_faa_route(&pool, "CLE", "ORD", "GTLKE4 DAIFE WATSN WATSN4", "", "").await;

        let routes = resolve(&pool, &FixedFlow::none(), "CLE", "ORD")
            .await
            .unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].source, RouteSource::Faa);
        assert_eq!(routes[0].route, "GTLKE4 DAIFE WATSN WATSN4");
        // the curated altitude survives the overwrite
        assert_eq!(routes[0].altitude, "FL240");
        assert!(routes[0].id.is_none());
    }

    #[tokio::test]
    async fn ranking_orders_event_active_custom_faa() {
        let pool = pool().await;
        insert_route(&pool, "CLE", "DTW", "PLAIN CUSTOM", "", "").await;
        insert_route(&pool, "CLE", "DTW", "ACTIVE ROUTE", "", "DTW south").await;
        insert_route(&pool, "CLE", "DTW", "EVENT ROUTE", "", "EVENT only").await;
        insert_faa_route(&pool, "CLE", "DTW", "FAA ROUTE", "", "").await;

        let flow = FixedFlow::new(&[("DTW", "SOUTH")]);
        let routes = resolve(&pool, &flow, "CLE", "DTW").await.unwrap();
        let order: Vec<&str> = routes.iter().map(|r| r.route.as_str()).collect();
        assert_eq!(
            order,
            vec!["EVENT ROUTE", "ACTIVE ROUTE", "PLAIN CUSTOM", "FAA ROUTE"]
        );
        assert!(routes[0].is_event);
        assert!(routes[1].is_active);
        assert_eq!(routes[3].source, RouteSource::Faa);
    }

    #[tokio::test]
    async fn south_flow_ranks_south_route_first() {
        let pool = pool().await;
        insert_route(&pool, "CLE", "DTW", "BONZZ BONZZ2", "", "DTW south").await;
        insert_route(&pool, "CLE", "DTW", "BONZZ KLYNK3", "", "DTW north").await;

        let flow = FixedFlow::new(&[("DTW", "SOUTH")]);
        let routes = resolve(&pool, &flow, "CLE", "DTW").await.unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].route, "BONZZ BONZZ2");
        assert!(routes[0].is_active);
        assert_eq!(routes[0].flow, "SOUTH");
        assert!(routes[0].has_flows);
        assert_eq!(routes[1].route, "BONZZ KLYNK3");
        assert!(!routes[1].is_active);
        assert!(routes[1].has_flows);
    }

    #[tokio::test]
    async fn icao_prefixes_are_transparent_to_callers() {
        let pool = pool().await;
        insert_route(&pool, "CLE", "DTW", "BONZZ BONZZ2", "", "DTW south").await;
        insert_route(&pool, "CLE", "DTW", "BONZZ KLYNK3", "", "DTW north").await;
        insert_faa_route(&pool, "CLE", "DTW", "DCT CRL DCT", "", "").await;

        let flow = FixedFlow::new(&[("DTW", "SOUTH")]);
        let domestic = resolve(&pool, &flow, "CLE", "DTW").await.unwrap();
        let icao = resolve(&pool, &flow, "KCLE", "KDTW").await.unwrap();

        assert_eq!(domestic.len(), icao.len());
        for (a, b) in domestic.iter().zip(icao.iter()) {
            assert_eq!(a.route, b.route);
            assert_eq!(a.source, b.source);
            assert_eq!(a.is_active, b.is_active);
            assert_eq!(a.origin, b.origin);
            assert_eq!(a.destination, b.destination);
        }
    }

    #[tokio::test]
    async fn flow_detector_failure_never_fails_resolution() {
        let pool = pool().await;
        insert_route(&pool, "CLE", "DTW", "BONZZ BONZZ2", "", "DTW south").await;

        let routes = resolve(&pool, &BrokenFlow, "CLE", "DTW").await.unwrap();
        assert_eq!(routes.len(), 1);
        assert!(!routes[0].is_active);
        assert_eq!(routes[0].flow, "");
        // the airport still has a flow concept even though detection failed
        assert!(routes[0].has_flows);
    }

    #[tokio::test]
    async fn later_custom_duplicate_overwrites_earlier_in_place() {
        let pool = pool().await;
        insert_route(&pool, "CLE", "DTW", "BONZZ BONZZ2", "", "first copy").await;
        insert_route(&pool, "CLE", "MDW", "GTLKE4 BAGEL PANGG5", "", "").await;
        insert_route(&pool, "CLE", "DTW", "BONZZ  BONZZ2", "FL230", "second copy").await;

        let routes = resolve(&pool, &FixedFlow::none(), "CLE", "")
            .await
            .unwrap();
        assert_eq!(routes.len(), 2);
        // the duplicate kept its first-insertion slot but carries the
        // later row's fields
        assert_eq!(routes[0].route, "BONZZ BONZZ2");
        assert_eq!(routes[0].notes, "second copy");
        assert_eq!(routes[0].altitude, "FL230");
        assert_eq!(routes[1].route, "GTLKE4 BAGEL PANGG5");
    }

    #[tokio::test]
    async fn empty_result_is_not_an_error() {
        let pool = pool().await;
        let routes = resolve(&pool, &FixedFlow::none(), "CLE", "ZZZ")
            .await
            .unwrap();
        assert!(routes.is_empty());
    }

    #[tokio::test]
    async fn faa_direction_annotation_drives_active_state() {
        let pool = pool().await;
        insert_faa_route(&pool, "CLE", "DTW", "FAA SOUTH RTE", "ZOB", "South flow only").await;
        insert_faa_route(&pool, "CLE", "DTW", "FAA NORTH RTE", "ZOB", "North flow only").await;

        let flow = FixedFlow::new(&[("DTW", "SOUTH")]);
        let routes = resolve(&pool, &flow, "CLE", "DTW").await.unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].route, "FAA SOUTH RTE");
        assert!(routes[0].is_active);
        assert!(!routes[1].is_active);
    }
}
