//! HTTP intake server.
//!
//! Sits between browser clients and the platform upload API: files are
//! posted here as multipart forms, validated and previewed locally, and
//! accepted files are proxied upstream with the single-fallback upload
//! logic applied.
//!
//! # API Endpoints
//!
//! | Method | Path                    | Description                           |
//! |--------|-------------------------|---------------------------------------|
//! | GET    | `/health`               | Health check                          |
//! | GET    | `/api/contracts`        | Column contracts for all upload kinds |
//! | GET    | `/api/logs`             | SSE stream for real-time logs         |
//! | POST   | `/api/validate/{kind}`  | Validate + preview, no upstream call  |
//! | POST   | `/api/uploads/{kind}`   | Validated upload with format fallback |

use axum::{
    extract::{Multipart, Path, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, str::FromStr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::LOG_BROADCASTER;
use super::types::{error_response, IntakeResponse, ValidateResponse};
use crate::error::{ServerError, ServerResult};
use crate::models::{RawFile, UploadKind};
use crate::preview;
use crate::upload::{HttpTransport, Uploader};
use crate::validation;

/// Start the intake server, proxying uploads to the given uploader's API.
pub async fn start_server(
    port: u16,
    uploader: Uploader<HttpTransport>,
) -> Result<(), Box<dyn std::error::Error>> {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/contracts", get(contracts))
        .route("/api/logs", get(sse_logs))
        .route("/api/validate/{kind}", post(validate_file))
        .route("/api/uploads/{kind}", post(upload_file))
        .layer(cors)
        .with_state(uploader);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("courseload intake server on http://localhost:{}", port);
    println!("   POST /api/validate/{{kind}} - Validate + preview a file");
    println!("   POST /api/uploads/{{kind}}  - Validated upload with fallback");
    println!("   GET  /api/contracts        - Column contracts");
    println!("   GET  /api/logs             - SSE log stream");
    println!("   GET  /health               - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "courseload",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "validate": "POST /api/validate/{kind}",
            "uploads": "POST /api/uploads/{kind}",
            "contracts": "GET /api/contracts",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// Column contracts for every upload kind
async fn contracts() -> Json<Value> {
    let kinds: Vec<Value> = UploadKind::ALL
        .iter()
        .map(|kind| {
            json!({
                "kind": kind.name(),
                "fieldName": kind.field_name(),
                "endpoint": kind.endpoint_path(),
                "requiredColumns": kind.required_columns(),
            })
        })
        .collect();

    Json(json!({ "kinds": kinds }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Csv(_) | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(error_response(&self.to_string()))).into_response()
    }
}

fn parse_kind(kind: &str) -> ServerResult<UploadKind> {
    UploadKind::from_str(kind).map_err(ServerError::BadRequest)
}

/// Pull the uploaded file out of a multipart form.
///
/// Accepts the kind-specific field name (`lessons_file`, ...) or a
/// plain `file` field.
async fn extract_file(kind: UploadKind, mut multipart: Multipart) -> ServerResult<RawFile> {
    let mut file: Option<RawFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name != "file" && name != kind.field_name() {
            continue;
        }

        let file_name = field
            .file_name()
            .unwrap_or("upload.csv")
            .to_string();
        let media_type = field
            .content_type()
            .unwrap_or("text/csv")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?
            .to_vec();

        file = Some(RawFile::new(file_name, bytes).with_media_type(media_type));
    }

    file.ok_or_else(|| {
        ServerError::BadRequest(format!(
            "No file provided (expected field '{}' or 'file')",
            kind.field_name()
        ))
    })
}

/// Validate-only endpoint: structural feedback and a preview, no
/// upstream request is ever made from here.
async fn validate_file(
    Path(kind): Path<String>,
    multipart: Multipart,
) -> ServerResult<Json<ValidateResponse>> {
    let kind = parse_kind(&kind)?;
    let file = extract_file(kind, multipart).await?;

    let (content, _encoding) = crate::parser::decode_bytes(&file.bytes)?;

    let validation = validation::validate_content(&content, kind);
    let preview = preview::build_preview(&content, preview::DEFAULT_SAMPLE_ROWS);

    Ok(Json(ValidateResponse::new(validation, preview)))
}

/// Proxied upload endpoint: full validated upload with format fallback.
async fn upload_file(
    State(uploader): State<Uploader<HttpTransport>>,
    Path(kind): Path<String>,
    multipart: Multipart,
) -> ServerResult<Json<IntakeResponse>> {
    let kind = parse_kind(&kind)?;
    let file = extract_file(kind, multipart).await?;

    println!("new {} upload: {} ({} bytes)", kind, file.name, file.bytes.len());

    let outcome = uploader.upload(kind, &file).await;
    Ok(Json(IntakeResponse::from(outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CsvError;

    #[test]
    fn test_parse_kind_rejects_unknown() {
        assert!(parse_kind("lessons").is_ok());
        assert!(parse_kind("not-a-kind").is_err());
    }

    #[test]
    fn test_server_errors_map_to_bad_request() {
        let resp = ServerError::BadRequest("no file".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ServerError::from(CsvError::EmptyFile).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
