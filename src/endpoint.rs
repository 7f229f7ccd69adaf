/// HTTP endpoint for querying risk assessments
///
/// Serves the daemon's latest snapshot to the map front end and external
/// tools. Only the `{score, level, color}` triples, identity and corrected
/// position leave the service; raw measurements stay internal.
///
/// Endpoints:
/// - GET /health     - Service health and data provenance
/// - GET /sites      - Every site assessment, highest current score first
/// - GET /site/{id}  - One site assessment
/// - GET /regions    - Per-region aggregates

use std::io::Cursor;

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::daemon::SharedSnapshot;

const SERVICE_NAME: &str = env!("CARGO_PKG_NAME");
const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Resolves a request path against the snapshot; returns status and body.
pub fn route(url: &str, snapshot: &SharedSnapshot) -> (u16, Value) {
    let path = url.split('?').next().unwrap_or(url);

    let guard = match snapshot.read() {
        Ok(guard) => guard,
        Err(_) => return (500, json!({ "error": "snapshot lock poisoned" })),
    };

    if path == "/health" {
        return match guard.as_ref() {
            Some(s) => {
                let degraded = s.site_source.is_degraded() || s.vessel_source.is_degraded();
                let status = if degraded { "degraded" } else { "ok" };
                (
                    200,
                    json!({
                        "status": status,
                        "service": SERVICE_NAME,
                        "version": SERVICE_VERSION,
                        "refreshedAt": s.refreshed_at,
                        "siteSource": s.site_source,
                        "vesselSource": s.vessel_source,
                        "sitesFetchedAt": s.sites_fetched_at,
                        "siteCount": s.assessments.len(),
                        "vesselCount": s.vessels.len(),
                    }),
                )
            }
            None => (
                503,
                json!({
                    "status": "starting",
                    "service": SERVICE_NAME,
                    "version": SERVICE_VERSION,
                }),
            ),
        };
    }

    let Some(s) = guard.as_ref() else {
        return (503, json!({ "error": "no data yet; first refresh in progress" }));
    };

    if path == "/sites" {
        (200, json!(s.assessments))
    } else if path == "/regions" {
        (200, json!(s.regions))
    } else if let Some(raw_id) = path.strip_prefix("/site/") {
        let site_id = urlencoding::decode(raw_id)
            .map(|id| id.into_owned())
            .unwrap_or_else(|_| raw_id.to_string());
        match s.find_assessment(&site_id) {
            Some(assessment) => (200, json!(assessment)),
            None => (
                404,
                json!({
                    "error": "Site not found",
                    "site_id": site_id,
                }),
            ),
        }
    } else {
        (
            404,
            json!({
                "error": "Not found",
                "available_endpoints": ["/health", "/sites", "/site/{id}", "/regions"]
            }),
        )
    }
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start HTTP endpoint server on the specified port (blocks).
pub fn start_endpoint_server(port: u16, snapshot: SharedSnapshot) -> Result<(), String> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;

    info!(port, "HTTP endpoint listening");

    for request in server.incoming_requests() {
        let (status, body) = if *request.method() == tiny_http::Method::Get {
            route(request.url(), &snapshot)
        } else {
            (405, json!({ "error": "Method not allowed" }))
        };

        if let Err(e) = request.respond(create_response(status, &body)) {
            warn!(error = %e, "failed to send response");
        }
    }

    Ok(())
}

/// Create HTTP response with JSON body
fn create_response(status_code: u16, json: &Value) -> tiny_http::Response<Cursor<Vec<u8>>> {
    let body = serde_json::to_string_pretty(json).unwrap_or_else(|_| "{}".to_string());

    let response = tiny_http::Response::from_data(body.into_bytes())
        .with_status_code(tiny_http::StatusCode::from(status_code));

    match tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
