//! HTTP server for the transport frames service
//!
//! Thin routing layer over the cache, scheduler, and aggregator.
//!
//! # Routes
//!
//! - `GET /health` - Liveness check
//! - `GET /interpretation` - Human-readable criteria interpretation
//! - `GET /{region_id}/{mode}/matrix` - Cached accessibility matrix
//! - `PUT /{region_id}/{mode}/recalculate_matrix` - Trigger background recompute
//! - `POST /{region_id}/transport_criteria` - Score submitted territories
//! - `POST /{region_id}/transport_indicator_region` - Region-wide assessment, fire-and-forget
//! - `POST /{region_id}/project/{project_id}/transport_criteria` - Project-scoped variant (Bearer auth)
//!
//! The request path never blocks on computation: matrix reads serve whatever
//! artifact is cached, recomputation runs on spawned tasks, and the
//! region-wide assessment acknowledges immediately.

use crate::compute::{
    ConnectivityGrader, CrowFlightComputer, MatrixComputer, TerritoryFeature, TerritoryGrader,
};
use crate::config::AppConfig;
use crate::geo;
use crate::indicators::{self, AggregationInputs, InterpretationRequest};
use crate::matrix::{MatrixArtifact, MatrixCache, RecomputeScheduler, RecomputeStatus};
use crate::region::{CacheKey, Region, RegionRegistry, TransportMode};
use crate::urban::{PoiCategory, UrbanApiClient};
use crate::{Result, TransportFramesError};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Acknowledgement returned by the fire-and-forget region assessment
const RESPONSE_MESSAGE: &str = "Region indicator calculation has started";

/// Shared server state
pub struct AppState {
    pub registry: RegionRegistry,
    pub cache: Arc<MatrixCache>,
    pub scheduler: RecomputeScheduler,
    pub client: Arc<UrbanApiClient>,
    pub computer: Arc<dyn MatrixComputer>,
    pub grader: Arc<dyn TerritoryGrader>,
}

/// HTTP server for the transport frames service
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Build the server with the default collaborators (crow-flight matrix
    /// computer and connectivity grader) wired behind the seams.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let registry = RegionRegistry::new(config.regions.clone());
        let cache = Arc::new(MatrixCache::new(&config.data_dir)?);
        let client = Arc::new(UrbanApiClient::new(
            config.urban_api_url.clone(),
            config.request_timeout(),
        )?);
        let computer = Arc::new(CrowFlightComputer::new(Arc::clone(&client)));
        let grader = Arc::new(ConnectivityGrader::new(
            Arc::clone(&cache),
            Arc::clone(&client),
        ));
        Ok(Self::with_collaborators(
            registry, cache, client, computer, grader,
        ))
    }

    /// Build the server around explicit collaborator implementations
    pub fn with_collaborators(
        registry: RegionRegistry,
        cache: Arc<MatrixCache>,
        client: Arc<UrbanApiClient>,
        computer: Arc<dyn MatrixComputer>,
        grader: Arc<dyn TerritoryGrader>,
    ) -> Self {
        let scheduler = RecomputeScheduler::new(Arc::clone(&cache));
        Self {
            state: Arc::new(AppState {
                registry,
                cache,
                scheduler,
                client,
                computer,
                grader,
            }),
        }
    }

    /// Build the router
    pub fn router(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/interpretation", get(interpretation))
            .route("/{region_id}/{mode}/matrix", get(get_matrix))
            .route("/{region_id}/{mode}/recalculate_matrix", put(recalculate_matrix))
            .route("/{region_id}/transport_criteria", post(transport_criteria))
            .route(
                "/{region_id}/transport_indicator_region",
                post(transport_indicator_region),
            )
            .route(
                "/{region_id}/project/{project_id}/transport_criteria",
                post(project_transport_criteria),
            )
            .with_state(state)
    }

    /// Run the server on the given address
    pub async fn run(self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;

        tracing::info!(
            addr = addr,
            regions = self.state.registry.len(),
            "Transport frames server listening"
        );

        axum::serve(listener, Self::router(self.state))
            .await
            .map_err(TransportFramesError::Io)
    }

    /// Shared state handle (for tests)
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response to a recalculation request
#[derive(Debug, Serialize)]
pub struct RecalculateMatrixResponse {
    pub status: RecomputeStatus,
    pub region_id: i64,
    pub mode: TransportMode,
    pub message: String,
    pub matrix_file: String,
}

/// Incoming GeoJSON feature collection
#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<GeoFeature>,
}

#[derive(Debug, Deserialize)]
struct GeoFeature {
    #[serde(default)]
    properties: Value,
    geometry: Value,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn error_response(err: TransportFramesError) -> HandlerError {
    let status = match &err {
        TransportFramesError::NotFound(_) => StatusCode::NOT_FOUND,
        TransportFramesError::Validation(_) | TransportFramesError::MissingRequiredInput(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        TransportFramesError::Upstream(_) | TransportFramesError::Http(_) => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn interpretation(
    Query(request): Query<InterpretationRequest>,
) -> std::result::Result<Json<Vec<String>>, HandlerError> {
    let lines = indicators::interpret(&request).map_err(error_response)?;
    Ok(Json(lines))
}

async fn get_matrix(
    State(state): State<Arc<AppState>>,
    Path((region_id, mode)): Path<(i64, TransportMode)>,
) -> std::result::Result<Json<MatrixArtifact>, HandlerError> {
    state.registry.require(region_id).map_err(error_response)?;

    let artifact = state
        .cache
        .get(CacheKey::new(region_id, mode))
        .map_err(error_response)?;
    Ok(Json(artifact))
}

async fn recalculate_matrix(
    State(state): State<Arc<AppState>>,
    Path((region_id, mode)): Path<(i64, TransportMode)>,
) -> std::result::Result<Json<RecalculateMatrixResponse>, HandlerError> {
    let region = state
        .registry
        .require(region_id)
        .map_err(error_response)?
        .clone();

    let key = CacheKey::new(region_id, mode);
    let computer = Arc::clone(&state.computer);
    state
        .scheduler
        .request_recompute(key, async move { computer.compute(&region, mode).await });

    Ok(Json(RecalculateMatrixResponse {
        status: RecomputeStatus::InProgress,
        region_id,
        mode,
        message: format!(
            "Matrix recalculation for region {} and mode '{}' has started",
            region_id, mode
        ),
        matrix_file: state.cache.path_for(key).display().to_string(),
    }))
}

async fn transport_criteria(
    State(state): State<Arc<AppState>>,
    Path(region_id): Path<i64>,
    Json(body): Json<FeatureCollection>,
) -> std::result::Result<Json<Vec<f64>>, HandlerError> {
    let region = state
        .registry
        .require(region_id)
        .map_err(error_response)?
        .clone();

    let features = parse_features(&body).map_err(error_response)?;
    let scores = assess_features(&state, &region, features)
        .await
        .map_err(error_response)?;
    Ok(Json(scores))
}

async fn transport_indicator_region(
    State(state): State<Arc<AppState>>,
    Path(region_id): Path<i64>,
) -> std::result::Result<Json<Value>, HandlerError> {
    let region = state
        .registry
        .require(region_id)
        .map_err(error_response)?
        .clone();

    // Fire-and-forget: failures are observable only through the logs
    let task_state = Arc::clone(&state);
    tokio::spawn(async move {
        if let Err(e) = assess_and_push(task_state, region.clone()).await {
            tracing::error!(
                region = %region.name,
                error = %e,
                "Region indicator assessment failed"
            );
        }
    });

    Ok(Json(serde_json::json!({ "message": RESPONSE_MESSAGE })))
}

async fn project_transport_criteria(
    State(state): State<Arc<AppState>>,
    Path((region_id, project_id)): Path<(i64, i64)>,
    headers: HeaderMap,
) -> std::result::Result<Json<Vec<f64>>, HandlerError> {
    let token = bearer_token(&headers)?;
    let region = state
        .registry
        .require(region_id)
        .map_err(error_response)?
        .clone();

    let territory = state
        .client
        .get_project_territory(project_id, &token)
        .await
        .map_err(error_response)?;

    let geometry = territory.get("geometry").ok_or_else(|| {
        error_response(TransportFramesError::Validation(format!(
            "Project {} territory has no geometry",
            project_id
        )))
    })?;
    let (lon, lat) = geo::representative_point(geometry).ok_or_else(|| {
        error_response(TransportFramesError::Validation(format!(
            "Project {} territory geometry is malformed",
            project_id
        )))
    })?;
    let name = territory
        .get("properties")
        .and_then(|p| p.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("project-{}", project_id));

    let features = vec![TerritoryFeature { name, lon, lat }];
    let scores = assess_features(&state, &region, features)
        .await
        .map_err(error_response)?;
    Ok(Json(scores))
}

// ============================================================================
// Assessment pipeline
// ============================================================================

fn parse_features(body: &FeatureCollection) -> Result<Vec<TerritoryFeature>> {
    if body.features.is_empty() {
        return Err(TransportFramesError::Validation(
            "Feature collection is empty".to_string(),
        ));
    }

    let mut features = Vec::with_capacity(body.features.len());
    for (i, feature) in body.features.iter().enumerate() {
        let (lon, lat) = geo::representative_point(&feature.geometry).ok_or_else(|| {
            TransportFramesError::Validation(format!("Feature {} has no usable geometry", i))
        })?;
        let name = feature
            .properties
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        features.push(TerritoryFeature { name, lon, lat });
    }
    Ok(features)
}

/// Grade the submitted features and aggregate them into overall-assessment
/// scores, pulling matrices from the cache and POI datasets through the
/// partial-input policy.
async fn assess_features(
    state: &AppState,
    region: &Region,
    features: Vec<TerritoryFeature>,
) -> Result<Vec<f64>> {
    let graded = state.grader.grade(region, &features).await?;

    let territories = state.client.get_region_territories(region.id).await?;
    if territories.settlement_points.is_empty() {
        return Err(TransportFramesError::NotFound(format!(
            "Territories for {} not found",
            region.name
        )));
    }
    let polygons: Vec<_> = territories.adm_units().into_iter().cloned().collect();
    if polygons.is_empty() {
        return Err(TransportFramesError::NotFound(
            "Administrative units not found".to_string(),
        ));
    }

    let drive_matrix = state.cache.get(CacheKey::new(region.id, TransportMode::Drive))?;
    let inter_matrix = state
        .cache
        .get(CacheKey::new(region.id, TransportMode::Intermodal))?;

    let mut datasets = BTreeMap::new();
    for category in PoiCategory::criteria() {
        datasets.insert(category, state.client.get_poi(region.id, category).await);
    }

    let inputs = AggregationInputs {
        graded,
        points: territories.settlement_points,
        polygons,
        drive_matrix,
        inter_matrix,
        categories: indicators::select_present(datasets),
    };

    let records = indicators::aggregate(&inputs)?;
    Ok(records.iter().map(|r| r.overall_assessment).collect())
}

/// Region-wide assessment: grade every administrative unit, aggregate all
/// POI categories, and push each resulting field to the indicator store.
async fn assess_and_push(state: Arc<AppState>, region: Region) -> Result<()> {
    let territories = state.client.get_region_territories(region.id).await?;
    if territories.settlement_points.is_empty() {
        return Err(TransportFramesError::NotFound(format!(
            "Territories for {} not found",
            region.name
        )));
    }
    let polygons: Vec<_> = territories.adm_units().into_iter().cloned().collect();
    if polygons.is_empty() {
        return Err(TransportFramesError::NotFound(
            "Administrative units not found".to_string(),
        ));
    }

    let features: Vec<TerritoryFeature> = polygons
        .iter()
        .map(|unit| TerritoryFeature {
            name: unit.name.clone(),
            lon: unit.lon,
            lat: unit.lat,
        })
        .collect();
    let graded = state.grader.grade(&region, &features).await?;

    let drive_matrix = state.cache.get(CacheKey::new(region.id, TransportMode::Drive))?;
    let inter_matrix = state
        .cache
        .get(CacheKey::new(region.id, TransportMode::Intermodal))?;

    let mut datasets = BTreeMap::new();
    for category in PoiCategory::all() {
        datasets.insert(category, state.client.get_poi(region.id, category).await);
    }

    let inputs = AggregationInputs {
        graded,
        points: territories.settlement_points,
        polygons: polygons.clone(),
        drive_matrix,
        inter_matrix,
        categories: indicators::select_present(datasets),
    };
    let records = indicators::aggregate(&inputs)?;

    let mut pushed = 0usize;
    for (record, unit) in records.iter().zip(&polygons) {
        let mut values: Vec<(&str, f64)> = vec![
            ("grade", record.grade),
            ("overall_assessment", record.overall_assessment),
        ];
        for (field, value) in &record.fields {
            values.push((field, *value));
        }

        for (field, value) in values {
            match state
                .client
                .put_indicator_value(unit.territory_id, field, value)
                .await
            {
                Ok(()) => pushed += 1,
                Err(e) => {
                    tracing::warn!(
                        territory_id = unit.territory_id,
                        field,
                        error = %e,
                        "Indicator push failed"
                    );
                }
            }
        }
    }

    tracing::info!(
        region = %region.name,
        territories = records.len(),
        pushed,
        "Region indicator assessment finished"
    );
    Ok(())
}

fn bearer_token(headers: &HeaderMap) -> std::result::Result<String, HandlerError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Missing Authorization header".to_string(),
            }),
        ));
    };

    let malformed = || {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Malformed Authorization header, expected 'Bearer <token>'".to_string(),
            }),
        )
    };

    let value = value.to_str().map_err(|_| malformed())?;
    match value.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(malformed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::GradedTerritory;
    use crate::region::default_regions;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct CountingComputer {
        calls: Arc<AtomicUsize>,
        delay: Duration,
    }

    #[async_trait]
    impl MatrixComputer for CountingComputer {
        async fn compute(&self, _region: &Region, _mode: TransportMode) -> Result<MatrixArtifact> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(crate::matrix::sample_artifact())
        }
    }

    struct FixedGrader;

    #[async_trait]
    impl TerritoryGrader for FixedGrader {
        async fn grade(
            &self,
            _region: &Region,
            features: &[TerritoryFeature],
        ) -> Result<Vec<GradedTerritory>> {
            Ok(features
                .iter()
                .map(|f| GradedTerritory {
                    name: f.name.clone(),
                    grade: 3.0,
                    lon: f.lon,
                    lat: f.lat,
                })
                .collect())
        }
    }

    fn create_test_server(delay: Duration) -> (Arc<AppState>, Arc<AtomicUsize>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cache = Arc::new(MatrixCache::new(temp_dir.path()).unwrap());
        let client = Arc::new(
            UrbanApiClient::new("http://127.0.0.1:1", Duration::from_millis(100)).unwrap(),
        );
        let calls = Arc::new(AtomicUsize::new(0));
        let server = ApiServer::with_collaborators(
            RegionRegistry::new(default_regions()),
            cache,
            client,
            Arc::new(CountingComputer {
                calls: Arc::clone(&calls),
                delay,
            }),
            Arc::new(FixedGrader),
        );
        (server.state(), calls, temp_dir)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (state, _calls, _temp) = create_test_server(Duration::ZERO);
        let app = ApiServer::router(state);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_matrix_miss_is_404_with_message() {
        let (state, _calls, _temp) = create_test_server(Duration::ZERO);
        let app = ApiServer::router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/1/drive/matrix")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "drive matrix not found for region 1");
    }

    #[tokio::test]
    async fn test_get_matrix_hit_returns_cached_artifact() {
        let (state, _calls, _temp) = create_test_server(Duration::ZERO);
        state
            .cache
            .put(
                CacheKey::new(1, TransportMode::Drive),
                &crate::matrix::sample_artifact(),
            )
            .unwrap();
        let app = ApiServer::router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/1/drive/matrix")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["index"], serde_json::json!([101, 102]));
        assert_eq!(body["columns"], serde_json::json!([101, 102]));
        assert_eq!(
            body["values"],
            serde_json::json!([[0.0, 12.5], [12.5, 0.0]])
        );
    }

    #[tokio::test]
    async fn test_unknown_region_is_rejected() {
        let (state, _calls, _temp) = create_test_server(Duration::ZERO);
        let app = ApiServer::router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/999/drive/matrix")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unknown_mode_is_rejected() {
        let (state, _calls, _temp) = create_test_server(Duration::ZERO);
        let app = ApiServer::router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/1/walk/matrix")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_recalculate_responds_immediately_and_coalesces() {
        let (state, calls, _temp) = create_test_server(Duration::from_millis(100));
        let app = ApiServer::router(Arc::clone(&state));

        let put_request = || {
            Request::builder()
                .method("PUT")
                .uri("/1/drive/recalculate_matrix")
                .body(Body::empty())
                .unwrap()
        };

        let response = app.clone().oneshot(put_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "in_progress");
        assert_eq!(body["region_id"], 1);
        assert_eq!(body["mode"], "drive");
        assert!(body["matrix_file"]
            .as_str()
            .unwrap()
            .ends_with("1_drive_matrix.json"));

        // Second request while the first is still computing: same status,
        // no second computation
        let response = app.clone().oneshot(put_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "in_progress");

        // Wait for the background task to finish and write through
        let key = CacheKey::new(1, TransportMode::Drive);
        for _ in 0..200 {
            if state.cache.exists(key) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            state.cache.get(key).unwrap(),
            crate::matrix::sample_artifact()
        );
    }

    #[tokio::test]
    async fn test_project_criteria_requires_auth_header() {
        let (state, _calls, _temp) = create_test_server(Duration::ZERO);
        let app = ApiServer::router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/1/project/5/transport_criteria")
                    .header("Content-Type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_project_criteria_rejects_malformed_auth() {
        let (state, _calls, _temp) = create_test_server(Duration::ZERO);
        let app = ApiServer::router(state);

        for bad_value in ["Token abc", "Bearer", "Bearer "] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/1/project/5/transport_criteria")
                        .header("Authorization", bad_value)
                        .header("Content-Type", "application/json")
                        .body(Body::from("{}"))
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "value: {bad_value}");
        }
    }

    #[tokio::test]
    async fn test_interpretation_endpoint() {
        let (state, _calls, _temp) = create_test_server(Duration::ZERO);
        let app = ApiServer::router(state);

        let uri = "/interpretation?grade=5.0&weight_r_stops=0.35&weight_b_stops=0.35\
                   &weight_ferry=0.2&weight_aero=0.1&car_access_quartile=1&public_access_quartile=1";
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_interpretation_rejects_out_of_range() {
        let (state, _calls, _temp) = create_test_server(Duration::ZERO);
        let app = ApiServer::router(state);

        let uri = "/interpretation?grade=9.0&weight_r_stops=0.35&weight_b_stops=0.35\
                   &weight_ferry=0.2&weight_aero=0.1&car_access_quartile=1&public_access_quartile=1";
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_transport_criteria_rejects_empty_collection() {
        let (state, _calls, _temp) = create_test_server(Duration::ZERO);
        let app = ApiServer::router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/1/transport_criteria")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"features": []}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_indicator_region_acknowledges_immediately() {
        // The data service is unreachable here; the request must still be
        // acknowledged and the failure stay in the background
        let (state, _calls, _temp) = create_test_server(Duration::ZERO);
        let app = ApiServer::router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/1/transport_indicator_region")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], RESPONSE_MESSAGE);
    }
}
