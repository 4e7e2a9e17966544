use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Largest request body forwarded upstream.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::HOST,
];

#[derive(Clone)]
pub struct ProxyState {
    pub client: reqwest::Client,
    pub upstream: String,
}

impl ProxyState {
    pub fn new(upstream: &str) -> Self {
        ProxyState {
            client: reqwest::Client::new(),
            upstream: upstream.trim_end_matches('/').to_string(),
        }
    }
}

fn is_forwardable(name: &HeaderName) -> bool {
    !HOP_BY_HOP.contains(name) && *name != header::CONTENT_LENGTH && name.as_str() != "keep-alive"
}

fn copy_headers(from: &HeaderMap) -> HeaderMap {
    let mut to = HeaderMap::new();
    for (name, value) in from {
        if is_forwardable(name) {
            to.append(name.clone(), value.clone());
        }
    }
    to
}

/// Upstream URL for an incoming path. The `/api` prefix is kept.
fn upstream_url(upstream: &str, path_and_query: &str) -> String {
    format!("{}{}", upstream, path_and_query)
}

fn proxy_error(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

/// Forward `/api/*` to the fleet API, preserving method, query, body and
/// end-to-end headers (`Authorization`, `Content-Type`, ...).
pub async fn forward(State(state): State<ProxyState>, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = upstream_url(&state.upstream, path_and_query);

    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected oversized request body");
            return proxy_error(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
        }
    };

    let upstream_resp = state
        .client
        .request(parts.method.clone(), &url)
        .headers(copy_headers(&parts.headers))
        .body(body)
        .send()
        .await;

    let resp = match upstream_resp {
        Ok(resp) => resp,
        Err(e) => {
            tracing::error!(
                method = %parts.method,
                url = %url,
                error = %e,
                "Upstream API unreachable"
            );
            return proxy_error(StatusCode::BAD_GATEWAY, "Upstream API unavailable");
        }
    };

    let status = resp.status();
    let headers = copy_headers(resp.headers());
    let bytes = match resp.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(url = %url, error = %e, "Failed to read upstream response");
            return proxy_error(StatusCode::BAD_GATEWAY, "Upstream API unavailable");
        }
    };
    tracing::debug!(
        method = %parts.method,
        url = %url,
        status = status.as_u16(),
        "Proxied request"
    );

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
