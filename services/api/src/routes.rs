use crate::infra::{AppState, PipelineState};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use bidmatch::error::AppError;
use bidmatch::workflows::catalog::CatalogItem;
use bidmatch::workflows::matching::{
    Candidate, EngineSnapshot, RunRejection, RunStatus, SpeedProfile,
};
use bidmatch::workflows::proposals::{ProposalFormat, ProposalImporter};
use serde::Deserialize;
use serde_json::json;
use std::io::Cursor;
use tracing::{info, warn};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RunRequest {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
    /// CSV export in the importer's column layout, appended after `candidates`.
    #[serde(default)]
    pub(crate) candidates_csv: Option<String>,
    #[serde(default)]
    pub(crate) speed: Option<SpeedProfile>,
}

pub(crate) fn with_pipeline_routes(state: PipelineState) -> Router {
    pipeline_router(state)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

/// Router exposing the engine snapshot, run trigger, reset, and catalog.
pub(crate) fn pipeline_router(state: PipelineState) -> Router {
    Router::new()
        .route("/api/v1/pipeline", get(snapshot_endpoint))
        .route("/api/v1/pipeline/run", post(run_endpoint))
        .route("/api/v1/pipeline/reset", post(reset_endpoint))
        .route("/api/v1/catalog", get(catalog_endpoint))
        .with_state(state)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
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

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn snapshot_endpoint(State(state): State<PipelineState>) -> Json<EngineSnapshot> {
    Json(state.engine.snapshot())
}

pub(crate) async fn reset_endpoint(State(state): State<PipelineState>) -> Json<EngineSnapshot> {
    state.engine.reset();
    info!("pipeline reset over http");
    Json(state.engine.snapshot())
}

pub(crate) async fn catalog_endpoint(
    State(state): State<PipelineState>,
) -> Result<Json<Vec<CatalogItem>>, AppError> {
    Ok(Json(state.catalog.list_items()?))
}

/// Starts a run in the background. Returns 202 once accepted, 409 while
/// another run is in flight and 422 when there is nothing to process.
pub(crate) async fn run_endpoint(
    State(state): State<PipelineState>,
    Json(request): Json<RunRequest>,
) -> Result<Response, AppError> {
    let RunRequest {
        mut candidates,
        candidates_csv,
        speed,
    } = request;

    if let Some(csv) = candidates_csv {
        let imported =
            ProposalImporter::from_reader(Cursor::new(csv.into_bytes()), ProposalFormat::Csv)?;
        candidates.extend(imported);
    }

    let speed = speed.unwrap_or(state.default_speed);

    // Claim the slot before answering so two triggers cannot both be accepted.
    let ticket = match state.engine.try_begin(candidates) {
        Ok(ticket) => ticket,
        Err(rejection) => return Ok(rejection_response(rejection)),
    };

    let count = ticket.candidate_count();
    let engine = state.engine.clone();
    tokio::spawn(async move {
        let status = engine.drive(ticket, speed).await;
        match status {
            RunStatus::Completed => info!("background run completed"),
            other => warn!(?other, "background run did not complete"),
        }
    });

    let payload = json!({
        "status": "accepted",
        "candidates": count,
        "speed": speed.label(),
    });
    Ok((StatusCode::ACCEPTED, Json(payload)).into_response())
}

fn rejection_response(rejection: RunRejection) -> Response {
    let status = match rejection {
        RunRejection::Busy => StatusCode::CONFLICT,
        RunRejection::NoCandidates => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(json!({ "status": "rejected", "reason": rejection }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use bidmatch::workflows::catalog::{CatalogProvider, StaticCatalog};
    use bidmatch::workflows::matching::{
        FixedClock, InstantPacer, Phase, PhaseController, PipelineConfig, ProfilePacer,
    };
    use chrono::{TimeZone, Utc};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    const PROPOSALS_CSV: &str = "\
id,title,description,deadline,quantity,requirements
SFP-1,Offshore platform recoat,Splash zone steel,2025-04-15,2400,marine corrosion; UV exposure; ISO 12944
SFP-2,Warehouse walls,Interior,2025-04-15,,low VOC
";

    fn state_with(instant: bool) -> PipelineState {
        let now = Utc
            .with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        let catalog: Arc<dyn CatalogProvider> = Arc::new(StaticCatalog::standard());
        let engine = PhaseController::new(catalog.clone(), PipelineConfig::default())
            .with_clock(FixedClock(now));
        let engine = if instant {
            engine.with_pacer(InstantPacer)
        } else {
            engine.with_pacer(ProfilePacer)
        };
        PipelineState::new(Arc::new(engine), catalog, SpeedProfile::Fast)
    }

    async fn read_json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    fn post_json(uri: &str, payload: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request builds")
    }

    #[tokio::test]
    async fn catalog_route_lists_standard_items() {
        let response = pipeline_router(state_with(true))
            .oneshot(
                Request::get("/api/v1/catalog")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload.as_array().map(Vec::len), Some(12));
    }

    #[tokio::test]
    async fn empty_run_is_unprocessable_and_logged() {
        let state = state_with(true);
        let response = pipeline_router(state.clone())
            .oneshot(post_json("/api/v1/pipeline/run", json!({ "candidates": [] })))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let payload = read_json_body(response).await;
        assert_eq!(payload["reason"], "no_candidates");

        let snapshot = state.engine.snapshot();
        assert_eq!(snapshot.phase, Phase::NotStarted);
        assert_eq!(snapshot.log.len(), 1);
    }

    #[tokio::test]
    async fn malformed_csv_is_a_bad_request() {
        let csv = "id,title,description,deadline,quantity,requirements\nX,Bad,,someday,,iso\n";
        let response = pipeline_router(state_with(true))
            .oneshot(post_json(
                "/api/v1/pipeline/run",
                json!({ "candidates_csv": csv }),
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = read_json_body(response).await;
        assert!(payload["error"]
            .as_str()
            .is_some_and(|message| message.contains("invalid deadline")));
    }

    #[tokio::test]
    async fn accepted_run_completes_in_background() {
        let state = state_with(true);
        let response = pipeline_router(state.clone())
            .oneshot(post_json(
                "/api/v1/pipeline/run",
                json!({ "candidates_csv": PROPOSALS_CSV, "speed": "fast" }),
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let payload = read_json_body(response).await;
        assert_eq!(payload["candidates"], 2);

        for _ in 0..200 {
            let snapshot = state.engine.snapshot();
            if snapshot.phase == Phase::Completed && !snapshot.is_running {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let response = pipeline_router(state.clone())
            .oneshot(
                Request::get("/api/v1/pipeline")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");
        let snapshot = read_json_body(response).await;
        assert_eq!(snapshot["phase"], "COMPLETED");
        assert_eq!(snapshot["final_selection"]["candidate"]["id"], "SFP-1");
        assert_eq!(snapshot["is_running"], false);

        let response = pipeline_router(state.clone())
            .oneshot(post_json("/api/v1/pipeline/reset", json!({})))
            .await
            .expect("route executes");
        let snapshot = read_json_body(response).await;
        assert_eq!(snapshot["phase"], "NOT_STARTED");
        assert_eq!(snapshot["log"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn concurrent_trigger_conflicts() {
        let state = state_with(false);
        let candidates = ProposalImporter::from_reader(
            Cursor::new(PROPOSALS_CSV.as_bytes()),
            ProposalFormat::Csv,
        )
        .expect("fixture parses");

        let engine = state.engine.clone();
        let background =
            tokio::spawn(async move { engine.run(candidates, SpeedProfile::Realistic).await });
        while !state.engine.is_running() {
            tokio::task::yield_now().await;
        }

        let response = pipeline_router(state.clone())
            .oneshot(post_json(
                "/api/v1/pipeline/run",
                json!({ "candidates_csv": PROPOSALS_CSV }),
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let payload = read_json_body(response).await;
        assert_eq!(payload["reason"], "busy");

        background.abort();
    }

    #[tokio::test]
    async fn simultaneous_triggers_accept_exactly_one() {
        let state = state_with(false);
        let router = pipeline_router(state.clone());
        let payload = json!({ "candidates_csv": PROPOSALS_CSV });

        let (first, second) = tokio::join!(
            router
                .clone()
                .oneshot(post_json("/api/v1/pipeline/run", payload.clone())),
            router.oneshot(post_json("/api/v1/pipeline/run", payload)),
        );

        let mut statuses = vec![
            first.expect("route executes").status(),
            second.expect("route executes").status(),
        ];
        statuses.sort();
        assert_eq!(statuses, vec![StatusCode::ACCEPTED, StatusCode::CONFLICT]);

        let snapshot = state.engine.snapshot();
        let starts = snapshot
            .log
            .iter()
            .filter(|entry| entry.message.starts_with("Starting multi-candidate run"))
            .count();
        assert_eq!(starts, 1);
        assert!(snapshot.is_running);

        state.engine.reset();
    }
}
