// Router setup
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{environment, health_check, motion, single_series};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/environment", get(environment))
        .route("/api/motion", get(motion))
        .route("/api/series/:measurement/:field", get(single_series))
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_service::DashboardService;
    use crate::application::error::FetchError;
    use crate::application::sensor_fetcher::tests::{row, FakeRepository};
    use crate::application::sensor_fetcher::SensorSeriesFetcher;
    use crate::infrastructure::config::DashboardConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn app(repo: FakeRepository) -> Router {
        let fetcher = SensorSeriesFetcher::new(Arc::new(repo), "homeiot".to_string());
        let dashboard_service = DashboardService::new(fetcher, DashboardConfig::default());
        build_router(Arc::new(AppState { dashboard_service }))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = app(FakeRepository::returning(Vec::new()))
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_environment_endpoint() {
        let repo = FakeRepository::with_responses(vec![
            Ok(vec![row(&[("_time", "2024-05-01T10:00:00Z"), ("temperature", "21"), ("humidity", "75")])]),
            Ok(vec![row(&[("_time", "2024-05-01T10:00:00Z"), ("uv_index", "6")])]),
        ]);

        let (status, json) = get_json(app(repo), "/api/environment?minutes=30").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["window_minutes"], 30);
        assert_eq!(json["humidity"]["points"][0]["value"], 75.0);
        assert_eq!(json["conditions"]["humidity_advisory"]["level"], "optimal");
        assert_eq!(json["conditions"]["uv_advisory"]["level"], "moderate");
        assert_eq!(json["conditions"]["mood"], "happy");
    }

    #[tokio::test]
    async fn test_environment_without_store_still_renders() {
        let repo = FakeRepository::with_responses(vec![Err(FetchError::Connection(
            "connection refused".to_string(),
        ))]);

        let (status, json) = get_json(app(repo), "/api/environment").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["window_minutes"], 60);
        assert_eq!(json["temperature"]["has_data"], false);
        assert_eq!(json["temperature"]["notice"], "No data available for this range.");
        assert_eq!(json["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_window_out_of_range_is_bad_request() {
        let (status, json) = get_json(app(FakeRepository::returning(Vec::new())), "/api/motion?minutes=500").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_malformed_minutes_is_json_bad_request() {
        for uri in [
            "/api/environment?minutes=abc",
            "/api/motion?minutes=-5",
            "/api/series/airSensor/humidity?minutes=1.5",
        ] {
            let (status, json) = get_json(app(FakeRepository::returning(Vec::new())), uri).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert!(!json["error"].as_str().unwrap().is_empty(), "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_motion_endpoint() {
        let repo = FakeRepository::with_responses(vec![
            Ok(vec![row(&[("_time", "2024-05-01T10:00:00Z"), ("ax", "3"), ("ay", "4"), ("az", "0")])]),
            Ok(Vec::new()),
        ]);

        let (status, json) = get_json(app(repo), "/api/motion?minutes=10").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["acceleration"]["points"][0]["value"], 5.0);
        assert_eq!(json["rotation"]["has_data"], false);
    }

    #[tokio::test]
    async fn test_single_series_endpoint() {
        let repo = FakeRepository::returning(vec![row(&[
            ("_time", "2024-05-01T10:00:00Z"),
            ("_field", "humidity"),
            ("_value", "48.5"),
        ])]);

        let (status, json) = get_json(app(repo), "/api/series/airSensor/humidity?minutes=120").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["measurement"], "airSensor");
        assert_eq!(json["series"]["id"], "humidity");
        assert_eq!(json["series"]["stats"]["mean"], 48.5);
    }
}
