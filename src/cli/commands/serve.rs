//! HTTP API server for browser front-ends.
//!
//! Provides REST endpoints for processing an uploaded meeting file and
//! delivering the results to Slack. Each request is one isolated run; no
//! state outlives the response.

use crate::analysis::AnalysisResult;
use crate::cli::Output;
use crate::config::Settings;
use crate::intake::Upload;
use crate::meeting::MeetingType;
use crate::notify::SlackNotifier;
use crate::orchestrator::Orchestrator;
use crate::report::ReportFormat;
use crate::session::Stage;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
    settings: Settings,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings.clone())?;

    // Leave headroom over the configured ceiling so oversized uploads reach
    // the validator and get the typed FileTooLarge answer instead of a 413.
    let body_limit = (settings.max_file_size_bytes() as usize).saturating_mul(2);

    let state = Arc::new(AppState {
        orchestrator,
        settings,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/process", post(process))
        .route("/notify", post(notify))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Referat API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Process", "POST /process (multipart: file, meeting_type, format)");
    Output::kv("Notify", "POST /notify");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Serialize)]
struct ProcessResponse {
    success: bool,
    stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    action_items: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transcript: Option<String>,
    /// Rendered report document for download.
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report_file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

#[derive(Deserialize)]
struct NotifyRequest {
    summary: String,
    action_items: String,
    #[serde(default)]
    meeting_type: MeetingType,
}

#[derive(Serialize)]
struct NotifyResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn process(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut upload: Option<Upload> = None;
    let mut meeting_type = MeetingType::General;
    let mut format = ReportFormat::Markdown;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: format!("Malformed multipart body: {}", e),
                    }),
                )
                    .into_response()
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                match field.bytes().await {
                    Ok(bytes) => upload = Some(Upload::new(file_name, bytes.to_vec())),
                    Err(e) => {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(ErrorResponse {
                                error: format!("Failed to read upload: {}", e),
                            }),
                        )
                            .into_response()
                    }
                }
            }
            "meeting_type" => {
                if let Ok(value) = field.text().await {
                    meeting_type = MeetingType::from_tag(&value);
                }
            }
            "format" => {
                if let Ok(value) = field.text().await {
                    match value.parse() {
                        Ok(parsed) => format = parsed,
                        Err(e) => {
                            return (
                                StatusCode::BAD_REQUEST,
                                Json(ErrorResponse { error: e }),
                            )
                                .into_response()
                        }
                    }
                }
            }
            _ => {}
        }
    }

    let Some(upload) = upload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Missing 'file' field".to_string(),
            }),
        )
            .into_response();
    };

    let session = state.orchestrator.run(upload, meeting_type).await;

    if !session.is_ready() {
        let status = if session.failed_on_client_fault() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        return (
            status,
            Json(ProcessResponse {
                success: false,
                stage: session.stage(),
                summary: None,
                action_items: None,
                transcript: None,
                report: None,
                report_file_name: None,
                error: session.user_error().map(str::to_string),
                detail: session.error().map(str::to_string),
            }),
        )
            .into_response();
    }

    let (report, rendered) = match state
        .orchestrator
        .build_report(&session)
        .and_then(|r| r.render(format).map(|bytes| (r, bytes)))
    {
        Ok(pair) => pair,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.user_message(state.orchestrator.messages()),
                }),
            )
                .into_response()
        }
    };

    Json(ProcessResponse {
        success: true,
        stage: session.stage(),
        summary: Some(report.analysis.summary.clone()),
        action_items: Some(report.analysis.action_items.clone()),
        transcript: Some(report.transcript.text().to_string()),
        report: Some(String::from_utf8_lossy(&rendered).into_owned()),
        report_file_name: Some(report.file_name(format)),
        error: None,
        detail: None,
    })
    .into_response()
}

async fn notify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NotifyRequest>,
) -> impl IntoResponse {
    let Some(webhook_url) = state.settings.webhook_url() else {
        return (
            StatusCode::CONFLICT,
            Json(NotifyResponse {
                success: false,
                error: Some("No webhook configured".to_string()),
            }),
        )
            .into_response();
    };

    let notifier = match SlackNotifier::new(webhook_url, state.settings.slack.timeout_seconds()) {
        Ok(n) => n,
        Err(e) => {
            return (
                StatusCode::CONFLICT,
                Json(NotifyResponse {
                    success: false,
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    };

    let analysis = AnalysisResult {
        summary: req.summary,
        action_items: req.action_items,
    };

    match notifier.send(req.meeting_type, &analysis).await {
        Ok(()) => Json(NotifyResponse {
            success: true,
            error: None,
        })
        .into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(NotifyResponse {
                success: false,
                error: Some(e.user_message(&state.settings.messages)),
            }),
        )
            .into_response(),
    }
}

