// src/services/route_service.rs
// DOCUMENTATION: Route orchestration
// PURPOSE: Resolve destinations through the location store, then project, search and measure

use chrono::{Duration, Utc};
use std::time::Instant;

use crate::config::Config;
use crate::errors::RouteError;
use crate::models::{
    Coordinate, Destination, DistanceMode, DistanceSummary, GridCell, NearbyCell, PathResult,
    RouteQuery, RouteSummary, UserLocation,
};
use crate::services::{
    CancellationFlag, CellGraph, CoordinateProjector, DistanceAggregator, GridPathfinder,
    KRingSearch, SearchLimits,
};

/// Read-only access to last-known user positions
/// DOCUMENTATION: Implementations must use parameterized queries and must
/// tolerate concurrent calls for different users.
pub trait LocationStore {
    /// Latest location of `user_id`, or `NotFound`
    async fn get_location(&self, user_id: &str) -> Result<UserLocation, RouteError>;
}

/// Tunables for RouteService, usually taken from `Config`
#[derive(Debug, Clone)]
pub struct RouteSettings {
    pub resolution: u8,
    pub freshness_window: Duration,
    pub max_expansions: usize,
    pub search_timeout: Option<std::time::Duration>,
    pub nearby_max_k: u32,
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            resolution: 9,
            freshness_window: Duration::minutes(10),
            max_expansions: crate::services::DEFAULT_MAX_EXPANSIONS,
            search_timeout: Some(std::time::Duration::from_secs(5)),
            nearby_max_k: 10,
        }
    }
}

impl From<&Config> for RouteSettings {
    fn from(config: &Config) -> Self {
        Self {
            resolution: config.grid_resolution,
            freshness_window: Duration::seconds(config.freshness_window_secs),
            max_expansions: config.max_expansions,
            search_timeout: (config.search_timeout_ms > 0)
                .then(|| std::time::Duration::from_millis(config.search_timeout_ms)),
            nearby_max_k: config.nearby_max_k,
        }
    }
}

/// Only component that talks to external collaborators
pub struct RouteService<L> {
    store: L,
    settings: RouteSettings,
}

impl<L: LocationStore> RouteService<L> {
    pub fn new(store: L, settings: RouteSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &RouteSettings {
        &self.settings
    }

    /// Path from the query origin to its destination
    /// DOCUMENTATION: Errors from the store (`NotFound`) and from the engine
    /// are returned unchanged.
    pub async fn route_to(
        &self,
        query: &RouteQuery,
        resolution: u8,
        freshness_window: Duration,
    ) -> Result<PathResult, RouteError> {
        let destination = match &query.destination {
            Destination::Coordinate(c) => *c,
            Destination::User(user_id) => self.fresh_location(user_id, freshness_window).await?,
        };

        let start = CoordinateProjector::project(&query.origin, resolution)?;
        let goal = CoordinateProjector::project(&destination, resolution)?;

        self.search(start, goal).await
    }

    /// Route from `origin` to the last known position of `user_id`
    pub async fn route_to_user(
        &self,
        origin: Coordinate,
        user_id: &str,
    ) -> Result<RouteSummary, RouteError> {
        let query = RouteQuery {
            origin,
            destination: Destination::User(user_id.to_string()),
        };
        let path = self
            .route_to(&query, self.settings.resolution, self.settings.freshness_window)
            .await?;

        Ok(summarize(&path))
    }

    /// Distance between two users
    /// DOCUMENTATION: `Grid` measures the raw coordinates with one great-circle
    /// calculation and reports the grid distance of their cells; `Path` runs
    /// the full search and aggregation.
    pub async fn distance(
        &self,
        user1: &str,
        user2: &str,
        mode: DistanceMode,
    ) -> Result<DistanceSummary, RouteError> {
        let window = self.settings.freshness_window;
        let (first, second) = tokio::try_join!(
            self.fresh_location(user1, window),
            self.fresh_location(user2, window)
        )?;

        let resolution = self.settings.resolution;
        let a = CoordinateProjector::project(&first, resolution)?;
        let b = CoordinateProjector::project(&second, resolution)?;

        let (distance_meters, hop_count) = match mode {
            DistanceMode::Grid => (first.haversine_m(&second), CellGraph::hop_distance(a, b)?),
            DistanceMode::Path => {
                let path = self.search(a, b).await?;
                (path.distance_meters(), Some(path.hop_count() as u32))
            }
        };

        log::debug!(
            "Distance {} -> {} ({:?}): {:.1} m over {:?} hops",
            user1,
            user2,
            mode,
            distance_meters,
            hop_count
        );

        Ok(DistanceSummary {
            distance_meters,
            mode,
            hop_count,
            unit: "meters",
        })
    }

    /// Cells around a coordinate covering roughly `radius_km`
    pub fn nearby(
        &self,
        coordinate: &Coordinate,
        radius_km: f64,
    ) -> Result<Vec<NearbyCell>, RouteError> {
        let resolution = self.settings.resolution;
        let k = ring_size_for_radius(radius_km, resolution, self.settings.nearby_max_k)?;
        let center = CoordinateProjector::project(coordinate, resolution)?;

        log::debug!("Nearby query at {} with k={}", center, k);

        let ring = KRingSearch::ring(center, k as i32)?;
        Ok(ring
            .iter()
            .map(|entry| NearbyCell {
                cell: entry.cell,
                coordinate: CoordinateProjector::center_of(entry.cell),
                ring_distance: entry.ring_distance,
            })
            .collect())
    }

    async fn fresh_location(
        &self,
        user_id: &str,
        window: Duration,
    ) -> Result<Coordinate, RouteError> {
        let location = self.store.get_location(user_id).await?;
        location.ensure_fresh(Utc::now(), window)?;
        Ok(location.coordinate)
    }

    /// Run A* on the blocking pool and attach the aggregated distance
    async fn search(&self, start: GridCell, goal: GridCell) -> Result<PathResult, RouteError> {
        let flag = CancellationFlag::new();
        let limits = SearchLimits {
            max_expansions: self.settings.max_expansions,
            deadline: self.settings.search_timeout.map(|t| Instant::now() + t),
            cancel: Some(flag.clone()),
        };
        // Dropping the request future stops the blocking search too
        let _guard = CancelOnDrop(flag);

        let started = Instant::now();
        let path = tokio::task::spawn_blocking(move || {
            GridPathfinder::find_path(start, goal, &limits)
                .map(|path| {
                    let meters = DistanceAggregator::aggregate(&path);
                    path.with_distance(meters)
                })
        })
        .await
        .map_err(|e| RouteError::InternalError(format!("search task failed: {}", e)))??;

        log::info!(
            "Route {} -> {}: {} hops, {:.1} m in {} ms",
            start,
            goal,
            path.hop_count(),
            path.distance_meters(),
            started.elapsed().as_millis()
        );

        Ok(path)
    }
}

struct CancelOnDrop(CancellationFlag);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Flatten a path into the response shape of route queries
fn summarize(path: &PathResult) -> RouteSummary {
    RouteSummary {
        path: DistanceAggregator::centers(path.cells()),
        cells: path.cells().to_vec(),
        hop_count: path.hop_count(),
        distance_meters: path.distance_meters(),
    }
}

/// Ring size covering `radius_km` at `resolution`
/// DOCUMENTATION: Monotonically non-decreasing in the radius, clamped to
/// `[1, max_k]`
pub fn ring_size_for_radius(radius_km: f64, resolution: u8, max_k: u32) -> Result<u32, RouteError> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(RouteError::OutOfRange(format!(
            "radius {} km must be a non-negative number",
            radius_km
        )));
    }

    let spacing_m = 3f64.sqrt() * CoordinateProjector::average_edge_length_m(resolution)?;
    let steps = (radius_km * 1000.0 / spacing_m).ceil();

    Ok((steps.min(max_k as f64) as u32).clamp(1, max_k.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Location store backed by a plain map
    struct InMemoryLocationStore {
        locations: HashMap<String, UserLocation>,
    }

    impl InMemoryLocationStore {
        fn new(entries: &[(&str, f64, f64, i64)]) -> Self {
            let locations = entries
                .iter()
                .map(|&(user_id, lat, lon, minutes_ago)| {
                    (
                        user_id.to_string(),
                        UserLocation {
                            user_id: user_id.to_string(),
                            coordinate: Coordinate::new(lat, lon).unwrap(),
                            accuracy_meters: 20,
                            observed_at: Utc::now() - Duration::minutes(minutes_ago),
                        },
                    )
                })
                .collect();
            Self { locations }
        }
    }

    impl LocationStore for InMemoryLocationStore {
        async fn get_location(&self, user_id: &str) -> Result<UserLocation, RouteError> {
            self.locations
                .get(user_id)
                .cloned()
                .ok_or_else(|| RouteError::NotFound(format!("location for user {}", user_id)))
        }
    }

    const ISTANBUL: (f64, f64) = (41.0151, 28.9795);
    const ANKARA: (f64, f64) = (39.9334, 32.8597);

    fn service() -> RouteService<InMemoryLocationStore> {
        let store = InMemoryLocationStore::new(&[
            ("ankara", ANKARA.0, ANKARA.1, 1),
            ("kadikoy", 40.9903, 29.0290, 2),
            ("stale", ANKARA.0, ANKARA.1, 15),
        ]);
        RouteService::new(store, RouteSettings::default())
    }

    fn istanbul() -> Coordinate {
        Coordinate::new(ISTANBUL.0, ISTANBUL.1).unwrap()
    }

    #[tokio::test]
    async fn test_istanbul_to_ankara_route() {
        let service = service();
        let query = RouteQuery {
            origin: istanbul(),
            destination: Destination::User("ankara".into()),
        };

        let path = service
            .route_to(&query, 9, Duration::minutes(10))
            .await
            .unwrap();

        assert!(path.hop_count() > 0);
        assert_eq!(path.cells().len(), path.hop_count() + 1);

        let direct = istanbul().haversine_m(&Coordinate::new(ANKARA.0, ANKARA.1).unwrap());
        let centers = DistanceAggregator::great_circle(path.start(), path.goal());
        let along = path.distance_meters();

        assert!(along >= centers - 1e-6);
        assert!(along > 330_000.0 && along < 420_000.0, "got {}", along);
        assert!(along <= direct * 1.2, "along {} direct {}", along, direct);
    }

    #[tokio::test]
    async fn test_stale_destination_is_rejected() {
        let service = service();
        let query = RouteQuery {
            origin: istanbul(),
            destination: Destination::User("stale".into()),
        };

        let result = service.route_to(&query, 9, Duration::minutes(10)).await;
        assert!(matches!(result, Err(RouteError::StaleLocation { .. })));
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let service = service();
        let result = service.route_to_user(istanbul(), "nobody").await;
        assert!(matches!(result, Err(RouteError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_direct_coordinate_destination() {
        let service = service();
        let query = RouteQuery {
            origin: istanbul(),
            destination: Destination::Coordinate(Coordinate::new(41.03, 29.0).unwrap()),
        };

        let path = service
            .route_to(&query, 9, Duration::minutes(10))
            .await
            .unwrap();
        assert!(path.hop_count() > 0);
        assert!(path.distance_meters() > 0.0);
    }

    #[tokio::test]
    async fn test_invalid_resolution_propagates() {
        let service = service();
        let query = RouteQuery {
            origin: istanbul(),
            destination: Destination::Coordinate(istanbul()),
        };

        let result = service.route_to(&query, 16, Duration::minutes(10)).await;
        assert!(matches!(result, Err(RouteError::OutOfRange(_))));
    }

    #[tokio::test]
    async fn test_search_bound_propagates() {
        let store = InMemoryLocationStore::new(&[("kadikoy", 40.9903, 29.0290, 2)]);
        let settings = RouteSettings {
            max_expansions: 2,
            ..RouteSettings::default()
        };
        let service = RouteService::new(store, settings);

        let result = service.route_to_user(istanbul(), "kadikoy").await;
        assert!(matches!(
            result,
            Err(RouteError::SearchBoundExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn test_distance_modes() {
        let service = service();

        let grid = service
            .distance("ankara", "kadikoy", DistanceMode::Grid)
            .await
            .unwrap();
        let path = service
            .distance("ankara", "kadikoy", DistanceMode::Path)
            .await
            .unwrap();

        assert_eq!(grid.mode, DistanceMode::Grid);
        assert_eq!(grid.hop_count, path.hop_count);
        assert!(grid.hop_count.unwrap() > 0);
        assert!(path.distance_meters >= grid.distance_meters * 0.99);
        assert!(grid.distance_meters > 300_000.0);
    }

    #[tokio::test]
    async fn test_distance_with_stale_user_fails() {
        let service = service();
        let result = service.distance("kadikoy", "stale", DistanceMode::Grid).await;
        assert!(matches!(result, Err(RouteError::StaleLocation { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_routes_do_not_interfere() {
        let service = service();
        let origin = istanbul();

        let (a, b, c) = tokio::join!(
            service.route_to_user(origin, "kadikoy"),
            service.route_to_user(origin, "nobody"),
            service.route_to_user(origin, "kadikoy"),
        );

        let a = a.unwrap();
        let c = c.unwrap();
        assert!(matches!(b, Err(RouteError::NotFound(_))));
        assert_eq!(a.cells, c.cells);
        assert_eq!(a.path.len(), a.hop_count + 1);
    }

    #[test]
    fn test_nearby_ring_sizes() {
        let service = service();

        let small = service.nearby(&istanbul(), 0.1).unwrap();
        assert_eq!(small.len(), 7);
        assert!(small.iter().any(|c| c.ring_distance == 0));

        let capped = service.nearby(&istanbul(), 500.0).unwrap();
        assert_eq!(capped.len(), 1 + 3 * 10 * 11);
        assert!(capped.iter().all(|c| c.ring_distance <= 10));
    }

    #[test]
    fn test_ring_size_is_monotonic_and_clamped() {
        let mut previous = 0;
        for step in 0..40 {
            let k = ring_size_for_radius(step as f64 * 0.25, 9, 10).unwrap();
            assert!(k >= previous);
            assert!((1..=10).contains(&k));
            previous = k;
        }
        assert!(ring_size_for_radius(-1.0, 9, 10).is_err());
        assert!(ring_size_for_radius(f64::NAN, 9, 10).is_err());
    }

    #[test]
    fn test_route_summary_from_sync_context() {
        let service = service();
        let summary =
            tokio_test::block_on(service.route_to_user(istanbul(), "kadikoy")).unwrap();

        assert_eq!(summary.path.len(), summary.cells.len());
        assert_eq!(summary.cells.len(), summary.hop_count + 1);
        assert!(summary.distance_meters > 0.0);
    }
}
