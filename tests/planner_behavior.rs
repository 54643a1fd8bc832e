//! Query Planner Behavior Tests
//!
//! Drives the planner against an in-memory [`AisBackend`] fake so the
//! credit-spend properties are observable: upstream call counts, dedup
//! across boxes, cap short-circuit, minutes_back clamping, and the port
//! resolve → list → bulk-status → merge flow.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use whalesafe_gateway::config::{self, GatewayConfig};
use whalesafe_gateway::query::{QueryPlanner, ZoneQuery};
use whalesafe_gateway::upstream::{
    AisBackend, PortRecord, PortSelector, PortVessel, UpstreamError, ZoneVessel,
};

/// Small caps so the credit-guard properties are cheap to hit.
const MAX_RESULTS: usize = 4;
const MAX_PORT_VESSELS: usize = 2;

fn ensure_config() {
    if !config::is_initialized() {
        let mut cfg = GatewayConfig::default();
        cfg.query.max_results = MAX_RESULTS;
        cfg.query.max_port_vessels = MAX_PORT_VESSELS;
        cfg.query.default_minutes_back = 120;
        config::init(cfg);
    }
}

// ============================================================================
// Fake backend
// ============================================================================

#[derive(Default)]
struct FakeBackend {
    /// Zone batches served in order; empty queue serves an empty batch.
    zone_batches: Mutex<VecDeque<Vec<ZoneVessel>>>,
    zone_calls: AtomicUsize,
    captured_zones: Mutex<Vec<ZoneQuery>>,
    /// Zone call index (0-based) that fails instead of answering.
    fail_zone_call: Option<usize>,

    ports: Vec<PortRecord>,
    port_listing: Vec<PortVessel>,
    captured_selector: Mutex<Option<PortSelector>>,
    listing_calls: AtomicUsize,

    bulk_response: Vec<ZoneVessel>,
    bulk_calls: AtomicUsize,
    captured_mmsis: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn with_zone_batches(batches: Vec<Vec<ZoneVessel>>) -> Self {
        Self {
            zone_batches: Mutex::new(batches.into()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl AisBackend for FakeBackend {
    async fn zone_vessels(&self, zone: &ZoneQuery) -> Result<Vec<ZoneVessel>, UpstreamError> {
        let call = self.zone_calls.fetch_add(1, Ordering::SeqCst);
        self.captured_zones.lock().unwrap().push(*zone);
        if self.fail_zone_call == Some(call) {
            return Err(UpstreamError::Envelope {
                code: "503".to_string(),
                message: "zone backend down".to_string(),
            });
        }
        Ok(self
            .zone_batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    async fn bulk_status(&self, mmsis: &[String]) -> Result<Vec<ZoneVessel>, UpstreamError> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);
        *self.captured_mmsis.lock().unwrap() = mmsis.to_vec();
        Ok(self.bulk_response.clone())
    }

    async fn find_ports(&self, _name: &str) -> Result<Vec<PortRecord>, UpstreamError> {
        Ok(self.ports.clone())
    }

    async fn vessels_in_port(
        &self,
        selector: &PortSelector,
    ) -> Result<Vec<PortVessel>, UpstreamError> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        *self.captured_selector.lock().unwrap() = Some(selector.clone());
        Ok(self.port_listing.clone())
    }
}

fn vessel(mmsi: u64) -> ZoneVessel {
    ZoneVessel {
        mmsi: Some(mmsi),
        name: Some(format!("VESSEL {mmsi}")),
        lat: Some(34.0),
        lon: Some(-120.0),
        speed: Some(12.0),
        ..ZoneVessel::default()
    }
}

fn port_vessel(mmsi: Option<u64>) -> PortVessel {
    PortVessel {
        mmsi,
        name: Some("IN PORT".to_string()),
        vessel_type: Some("Cargo".to_string()),
        flag: Some("US".to_string()),
        current_port: Some("LONG BEACH".to_string()),
        ..PortVessel::default()
    }
}

fn planner(backend: Arc<FakeBackend>) -> QueryPlanner {
    QueryPlanner::new(backend)
}

// ============================================================================
// Area mode
// ============================================================================

/// Overlapping boxes never produce duplicate ids; insertion order holds.
#[tokio::test]
async fn area_dedups_across_overlapping_boxes() {
    ensure_config();
    let backend = Arc::new(FakeBackend::with_zone_batches(vec![
        vec![vessel(1), vessel(2)],
        vec![vessel(2), vessel(3)],
    ]));
    let ships = planner(backend.clone())
        .search_area("MONTEREY,SANTA_BARBARA", None)
        .await
        .unwrap();

    let ids: Vec<&str> = ships.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(backend.zone_calls.load(Ordering::SeqCst), 2);
}

/// Once the cap is reached no further boxes are queried.
#[tokio::test]
async fn area_short_circuits_at_result_cap() {
    ensure_config();
    let backend = Arc::new(FakeBackend::with_zone_batches(vec![
        vec![vessel(1), vessel(2)],
        vec![vessel(3), vessel(4), vessel(5)],
        vec![vessel(6)],
    ]));
    let ships = planner(backend.clone())
        .search_area("MONTEREY,SANTA_BARBARA,SOCAL", None)
        .await
        .unwrap();

    assert_eq!(ships.len(), MAX_RESULTS);
    // The third box was never spent.
    assert_eq!(backend.zone_calls.load(Ordering::SeqCst), 2);
}

/// A failing box aborts the whole area query rather than returning the
/// partial set accumulated so far.
#[tokio::test]
async fn area_aborts_on_failing_box() {
    ensure_config();
    let mut backend = FakeBackend::with_zone_batches(vec![vec![vessel(1)]]);
    backend.fail_zone_call = Some(1);
    let backend = Arc::new(backend);

    let err = planner(backend.clone())
        .search_area("MONTEREY,SANTA_BARBARA", None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("zone backend down"));
}

/// The documented scenario: an explicit token with a below-floor window
/// becomes one normalized box queried at the 60-minute floor.
#[tokio::test]
async fn area_explicit_token_clamps_minutes_to_floor() {
    ensure_config();
    let backend = Arc::new(FakeBackend::with_zone_batches(vec![vec![vessel(1)]]));
    let ships = planner(backend.clone())
        .search_area("bbox:36|10|41|18", Some(45.0))
        .await
        .unwrap();

    assert_eq!(ships.len(), 1);
    let zones = backend.captured_zones.lock().unwrap();
    assert_eq!(zones.len(), 1);
    assert_eq!(zones[0].minutes_back, 60);
    assert_eq!(zones[0].bbox.min_lat, 36.0);
    assert_eq!(zones[0].bbox.max_lat, 41.0);
    assert_eq!(zones[0].bbox.min_lon, 10.0);
    assert_eq!(zones[0].bbox.max_lon, 18.0);
}

/// An empty expression still queries the default preset box.
#[tokio::test]
async fn area_empty_expression_uses_default_preset() {
    ensure_config();
    let backend = Arc::new(FakeBackend::with_zone_batches(vec![vec![vessel(9)]]));
    let ships = planner(backend.clone()).search_area("", None).await.unwrap();
    assert_eq!(ships.len(), 1);
    assert_eq!(backend.zone_calls.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Near-me mode
// ============================================================================

/// Near-me issues exactly one zone query with the configured default
/// window when none is supplied.
#[tokio::test]
async fn near_me_issues_one_zone_query() {
    ensure_config();
    let backend = Arc::new(FakeBackend::with_zone_batches(vec![vec![
        vessel(1),
        vessel(1),
    ]]));
    let ships = planner(backend.clone())
        .search_near(0.0, 0.0, 60.0, None)
        .await
        .unwrap();

    // Duplicate records in a single batch dedup too.
    assert_eq!(ships.len(), 1);
    assert_eq!(backend.zone_calls.load(Ordering::SeqCst), 1);

    let zones = backend.captured_zones.lock().unwrap();
    assert_eq!(zones[0].minutes_back, 120);
    // At the equator the box is square: 60 nm → 2° on both axes.
    assert!((zones[0].bbox.lat_span() - 2.0).abs() < 1e-9);
    assert!((zones[0].bbox.lon_span() - 2.0).abs() < 1e-9);
}

// ============================================================================
// Port mode
// ============================================================================

/// Numeric identifiers go straight to the listing as a port id.
#[tokio::test]
async fn port_numeric_ident_selects_by_id() {
    ensure_config();
    let backend = Arc::new(FakeBackend {
        port_listing: vec![port_vessel(Some(7))],
        bulk_response: vec![vessel(7)],
        ..FakeBackend::default()
    });
    let ships = planner(backend.clone()).search_port("12345").await.unwrap();

    assert_eq!(ships.len(), 1);
    assert_eq!(
        *backend.captured_selector.lock().unwrap(),
        Some(PortSelector::Id("12345".to_string()))
    );
}

/// Five letters resolve as an uppercased UN/LOCODE.
#[tokio::test]
async fn port_locode_is_uppercased() {
    ensure_config();
    let backend = Arc::new(FakeBackend {
        port_listing: vec![port_vessel(Some(7))],
        bulk_response: vec![vessel(7)],
        ..FakeBackend::default()
    });
    planner(backend.clone()).search_port("deham").await.unwrap();

    assert_eq!(
        *backend.captured_selector.lock().unwrap(),
        Some(PortSelector::Locode("DEHAM".to_string()))
    );
}

/// Free-form names search the port index and take the first match.
#[tokio::test]
async fn port_name_search_uses_first_match() {
    ensure_config();
    let backend = Arc::new(FakeBackend {
        ports: vec![
            PortRecord {
                id: Some(555),
                name: Some("LONG BEACH".to_string()),
                ..PortRecord::default()
            },
            PortRecord {
                id: Some(999),
                ..PortRecord::default()
            },
        ],
        port_listing: vec![port_vessel(Some(7))],
        bulk_response: vec![vessel(7)],
        ..FakeBackend::default()
    });
    planner(backend.clone())
        .search_port("Long Beach")
        .await
        .unwrap();

    assert_eq!(
        *backend.captured_selector.lock().unwrap(),
        Some(PortSelector::Id("555".to_string()))
    );
}

/// Unresolvable ports are an empty result, not an error, and spend no
/// listing credits.
#[tokio::test]
async fn port_no_match_is_empty_result() {
    ensure_config();
    let backend = Arc::new(FakeBackend::default());
    let ships = planner(backend.clone())
        .search_port("Atlantis Harbor")
        .await
        .unwrap();

    assert!(ships.is_empty());
    assert_eq!(backend.listing_calls.load(Ordering::SeqCst), 0);
    assert_eq!(backend.bulk_calls.load(Ordering::SeqCst), 0);
}

/// The listing is capped before the bulk-status fetch, and a vessel
/// missing from the status batch is dropped rather than plotted at NaN.
#[tokio::test]
async fn port_caps_listing_and_drops_unmatched_vessels() {
    ensure_config();
    let backend = Arc::new(FakeBackend {
        port_listing: vec![
            port_vessel(Some(1)),
            port_vessel(Some(2)),
            port_vessel(Some(3)), // beyond the cap of 2
        ],
        // Status only for mmsi 1; mmsi 2 is dropped.
        bulk_response: vec![vessel(1)],
        ..FakeBackend::default()
    });
    let ships = planner(backend.clone()).search_port("12345").await.unwrap();

    assert_eq!(ships.len(), 1);
    assert_eq!(ships[0].id, "1");
    // Merge pulled position from the status batch...
    assert!(ships[0].lat.is_finite());
    // ...and metadata from the listing.
    assert_eq!(ships[0].vessel_type.as_deref(), Some("Cargo"));
    assert_eq!(ships[0].current_port.as_deref(), Some("LONG BEACH"));
    // Only the capped identifiers were batch-fetched.
    assert_eq!(
        *backend.captured_mmsis.lock().unwrap(),
        vec!["1".to_string(), "2".to_string()]
    );
}

/// A listing whose vessels all lack MMSIs cannot be status-fetched and
/// yields an empty result without a bulk call.
#[tokio::test]
async fn port_listing_without_mmsis_skips_bulk_fetch() {
    ensure_config();
    let backend = Arc::new(FakeBackend {
        port_listing: vec![port_vessel(None), port_vessel(None)],
        ..FakeBackend::default()
    });
    let ships = planner(backend.clone()).search_port("12345").await.unwrap();

    assert!(ships.is_empty());
    assert_eq!(backend.bulk_calls.load(Ordering::SeqCst), 0);
}
