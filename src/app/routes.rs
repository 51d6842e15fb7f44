use super::cli::parse_date;
use crate::config::ReviewDefaults;
use crate::error::AppError;
use crate::review::report::views::ReviewRow;
use crate::review::{
    review_export, CellCoercion, CtrUnit, EvaluationEngine, ImportOptions,
    RecommendationCatalog, ReviewSummary, Stage, ThresholdConfig, ThresholdOverrides,
};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Local, NaiveDate};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) review: Arc<ReviewDefaults>,
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/review", post(review_endpoint))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewRequest {
    pub(crate) csv: String,
    #[serde(default, deserialize_with = "deserialize_optional_stage")]
    pub(crate) stage: Option<Stage>,
    #[serde(default)]
    pub(crate) thresholds: ThresholdOverrides,
    #[serde(default)]
    pub(crate) ctr_unit: Option<CtrUnit>,
    #[serde(default)]
    pub(crate) catalog: Option<RecommendationCatalog>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) report_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReviewResponse {
    pub(crate) report_date: NaiveDate,
    pub(crate) stage: Stage,
    pub(crate) stage_label: &'static str,
    pub(crate) thresholds: ThresholdConfig,
    pub(crate) summary: ReviewSummary,
    pub(crate) rows: Vec<ReviewRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) coerced_cells: Vec<CellCoercion>,
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn review_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<ReviewResponse>, AppError> {
    let ReviewRequest {
        csv,
        stage,
        thresholds,
        ctr_unit,
        catalog,
        report_date,
    } = payload;

    let defaults = &state.review;
    let thresholds = thresholds.apply(&defaults.thresholds)?;
    let stage = stage.unwrap_or(defaults.stage);
    let catalog = match catalog {
        Some(overlay) => RecommendationCatalog::standard().merge(overlay),
        None => RecommendationCatalog::standard(),
    };
    let engine = EvaluationEngine::new(thresholds, stage).with_catalog(catalog);
    let options = ImportOptions {
        ctr_unit: ctr_unit.unwrap_or(defaults.ctr_unit),
    };
    let report_date = report_date.unwrap_or_else(|| Local::now().date_naive());

    let outcome = review_export(Cursor::new(csv.into_bytes()), &options, &engine, report_date)?;

    Ok(Json(ReviewResponse {
        report_date,
        stage,
        stage_label: stage.label(),
        thresholds: engine.config().clone(),
        summary: outcome.report.summary,
        rows: outcome.report.rows,
        coerced_cells: outcome.coercions,
    }))
}

fn deserialize_optional_stage<'de, D>(deserializer: D) -> Result<Option<Stage>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| value.parse::<Stage>().map_err(serde::de::Error::custom))
        .transpose()
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::ReasonCode;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use tower::ServiceExt;

    const EXPORT: &str = "Ad name,Amount spent (USD),CTR (all),CPC (cost per link click) (USD),Link clicks,Purchase ROAS (return on ad spend)\n\
Hook A,20,0.02,0.80,8,2.5\n\
Hook B,20,0.02,1.50,8,2.5\n\
Hook C,20,0.02,0.50,8,0\n";

    fn state() -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(recorder.handle()),
            review: Arc::new(ReviewDefaults::default()),
        }
    }

    fn request(stage: Option<Stage>) -> ReviewRequest {
        ReviewRequest {
            csv: EXPORT.to_string(),
            stage,
            thresholds: ThresholdOverrides::default(),
            ctr_unit: None,
            catalog: None,
            report_date: NaiveDate::from_ymd_opt(2025, 6, 2),
        }
    }

    async fn read_json_body(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    #[tokio::test]
    async fn review_endpoint_uses_requested_stage() {
        let Json(body) = review_endpoint(State(state()), Json(request(Some(Stage::ScaleStage))))
            .await
            .expect("review builds");

        let reasons: Vec<_> = body.rows.iter().map(|row| row.reason).collect();
        assert_eq!(
            reasons,
            vec![
                ReasonCode::Keep,
                ReasonCode::HighCpcConverting,
                ReasonCode::NoConversions
            ]
        );
        assert_eq!(body.stage_label, "Cycle 2");
        assert_eq!(body.summary.flagged, 2);
        assert!(body.coerced_cells.is_empty());
    }

    #[tokio::test]
    async fn review_endpoint_falls_back_to_configured_stage() {
        let Json(body) = review_endpoint(State(state()), Json(request(None)))
            .await
            .expect("review builds");

        assert_eq!(body.stage, Stage::EarlyStage);
        assert_eq!(body.rows[1].reason, ReasonCode::HighCpc);
        assert_eq!(body.rows[2].reason, ReasonCode::Keep);
    }

    #[tokio::test]
    async fn review_endpoint_rejects_invalid_overrides() {
        let mut payload = request(None);
        payload.thresholds.ctr_floor = Some(4.0);

        let error = review_endpoint(State(state()), Json(payload))
            .await
            .expect_err("thresholds rejected");
        assert!(matches!(error, AppError::Thresholds(_)));
    }

    #[tokio::test]
    async fn review_route_lists_missing_columns() {
        let response = router(state())
            .oneshot(
                Request::post("/api/v1/review")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "csv": "Ad name,Spend\nHook,3\n" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = read_json_body(response).await;
        assert_eq!(
            payload["missing_columns"],
            json!([
                "CTR (all)",
                "CPC (cost per link click) (USD)",
                "Link clicks",
                "Purchase ROAS (return on ad spend)"
            ])
        );
    }

    #[tokio::test]
    async fn review_route_accepts_domain_stage_names() {
        let response = router(state())
            .oneshot(
                Request::post("/api/v1/review")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({
                            "csv": EXPORT,
                            "stage": "Cycle 2",
                            "thresholds": { "cpc_ceiling": 1.5, "cpc_comparison": "above" },
                            "report_date": "2025-06-02"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["report_date"], "2025-06-02");
        assert_eq!(payload["rows"][1]["reason"], "keep");
        assert_eq!(payload["rows"][1]["flagged"], "N");
        assert_eq!(payload["summary"]["flagged"], 1);
        assert!(payload["summary"]["flagged_average_ctr"].is_number());
    }

    #[tokio::test]
    async fn review_route_rejects_unknown_stage() {
        let response = router(state())
            .oneshot(
                Request::post("/api/v1/review")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "csv": EXPORT, "stage": "cycle 7" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn health_and_readiness_report_status() {
        let response = router(state())
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);

        let not_ready = AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            ..state()
        };
        let response = router(not_ready)
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = router(state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .expect("route executes");
        assert_eq!(read_json_body(response).await, json!({ "status": "ok" }));
    }
}
