mod config;
mod proxy;

use std::path::{Path, PathBuf};

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{any, get};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::ServerConfig;
use fleet_shared::endpoints::API_PREFIX;
use proxy::ProxyState;

/// Build a cache-controlled static file router.
///
/// Separated so tests can exercise the caching layer with arbitrary directories.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

const CACHE_1DAY: &str = "public, max-age=86400, must-revalidate";
const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";
const CACHE_NO_STORE: &str = "no-cache";

const NOT_BUILT_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Fleet Console</title></head>
<body>
<h1>Fleet Console</h1>
<p>Frontend not built yet. Run <code>dx bundle</code> in <code>crates/frontend</code> and point <code>DIST_DIR</code> at the output.</p>
</body>
</html>"#;

/// The SPA shell. Client-side routes all get the same document.
async fn serve_index(State(index_path): State<PathBuf>) -> Response {
    let mut resp = match tokio::fs::read_to_string(&index_path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::warn!(path = %index_path.display(), error = %e, "index.html not found");
            (StatusCode::OK, Html(NOT_BUILT_HTML)).into_response()
        }
    };
    resp.headers_mut().insert(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(CACHE_NO_STORE),
    );
    resp
}

/// Build the full application router.
fn build_app(config: &ServerConfig) -> Router {
    // Static file routers are stateless, merge them before adding app state
    let static_files = Router::new()
        .nest(
            "/static",
            cached_static_router(&config.static_dir, CACHE_1DAY),
        )
        .nest(
            "/dist",
            cached_static_router(&config.dist_dir, CACHE_IMMUTABLE),
        )
        .nest(
            "/assets",
            cached_static_router(&config.dist_dir.join("assets"), CACHE_IMMUTABLE),
        );

    let spa = Router::new()
        .route("/", get(serve_index))
        .route("/login", get(serve_index))
        .route("/devices/{id}", get(serve_index))
        .with_state(config.dist_dir.join("index.html"));

    let api = Router::new()
        .route(&format!("{}/{{*rest}}", API_PREFIX), any(proxy::forward))
        .with_state(ProxyState::new(&config.upstream_api_url));

    Router::new()
        .merge(api)
        .merge(spa)
        .merge(static_files)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn run() -> Result<(), String> {
    let config = ServerConfig::from_env()?;
    let app = build_app(&config);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;
    tracing::info!(
        port = config.port,
        dist = %config.dist_dir.display(),
        upstream = %config.upstream_api_url,
        "Fleet console running at http://localhost:{}",
        config.port
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server error: {}", e))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::extract::Request as AxumRequest;
    use axum::http::{HeaderMap, Method, Request};
    use axum::routing::post;
    use axum::Json;
    use tower::ServiceExt;

    /// Build a test app that serves files from the given temp directories.
    fn test_app(static_dir: &Path, dist_dir: &Path, dist_assets_dir: &Path) -> Router {
        Router::new()
            .nest("/static", cached_static_router(static_dir, CACHE_1DAY))
            .nest("/dist", cached_static_router(dist_dir, CACHE_IMMUTABLE))
            .nest(
                "/assets",
                cached_static_router(dist_assets_dir, CACHE_IMMUTABLE),
            )
    }

    /// Create a temp dir with a test file and return the dir path.
    fn temp_dir_with_file(file_name: &str, content: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(file_name), content).unwrap();
        dir
    }

    fn config_for(dist_dir: &Path, upstream: &str) -> ServerConfig {
        ServerConfig {
            dist_dir: dist_dir.to_path_buf(),
            static_dir: dist_dir.join("static"),
            upstream_api_url: upstream.to_string(),
            ..Default::default()
        }
    }

    async fn body_string(resp: Response) -> String {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    /// Serve a stand-in fleet API on an ephemeral port and return its base URL.
    async fn spawn_upstream() -> String {
        async fn devices(headers: HeaderMap, req: AxumRequest) -> Json<serde_json::Value> {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Json(serde_json::json!({
                "authorization": auth,
                "query": req.uri().query().unwrap_or_default(),
            }))
        }
        async fn login(body: String) -> (StatusCode, String) {
            if body.contains("\"password\":\"right\"") {
                (StatusCode::OK, r#"{"access_token":"tok"}"#.to_string())
            } else {
                (StatusCode::UNAUTHORIZED, r#"{"detail":"Invalid credentials"}"#.to_string())
            }
        }

        let upstream = Router::new()
            .route("/api/devices", get(devices))
            .route("/api/auth/login", post(login));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, upstream).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_static_assets_have_1day_cache() {
        let static_dir = temp_dir_with_file("logo.png", "png");
        let dist_dir = temp_dir_with_file("index.html", "<html></html>");
        let dist_assets_dir = temp_dir_with_file("app.js", "console.log()");

        let app = test_app(static_dir.path(), dist_dir.path(), dist_assets_dir.path());

        let resp = app.oneshot(get_request("/static/logo.png")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("cache-control").unwrap(),
            "public, max-age=86400, must-revalidate"
        );
    }

    #[tokio::test]
    async fn test_dist_bundles_have_immutable_cache() {
        let static_dir = temp_dir_with_file("logo.png", "png");
        let dist_dir = temp_dir_with_file("fleet-frontend-abc123.js", "bundle()");
        let dist_assets_dir = temp_dir_with_file("main-xyz.css", "body{}");

        let app = test_app(static_dir.path(), dist_dir.path(), dist_assets_dir.path());

        let resp = app
            .clone()
            .oneshot(get_request("/dist/fleet-frontend-abc123.js"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("cache-control").unwrap(),
            "public, max-age=31536000, immutable"
        );

        let resp = app.oneshot(get_request("/assets/main-xyz.css")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("cache-control").unwrap(),
            "public, max-age=31536000, immutable"
        );
    }

    #[tokio::test]
    async fn test_missing_static_file_returns_404() {
        let static_dir = temp_dir_with_file("logo.png", "png");
        let dist_dir = temp_dir_with_file("index.html", "<html></html>");
        let dist_assets_dir = temp_dir_with_file("app.js", "");

        let app = test_app(static_dir.path(), dist_dir.path(), dist_assets_dir.path());

        let resp = app
            .oneshot(get_request("/static/nonexistent.txt"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_spa_routes_serve_index() {
        let dist_dir = temp_dir_with_file("index.html", "<html>fleet</html>");
        let app = build_app(&config_for(dist_dir.path(), "http://127.0.0.1:9"));

        for uri in ["/", "/login", "/devices/device-4"] {
            let resp = app.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "{}", uri);
            assert_eq!(resp.headers().get("cache-control").unwrap(), "no-cache");
            assert_eq!(body_string(resp).await, "<html>fleet</html>");
        }
    }

    #[tokio::test]
    async fn test_missing_index_serves_placeholder() {
        let dist_dir = tempfile::tempdir().unwrap();
        let app = build_app(&config_for(dist_dir.path(), "http://127.0.0.1:9"));

        let resp = app.oneshot(get_request("/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_string(resp).await.contains("Frontend not built yet"));
    }

    #[tokio::test]
    async fn test_proxy_forwards_auth_and_query() {
        let upstream = spawn_upstream().await;
        let dist_dir = tempfile::tempdir().unwrap();
        let app = build_app(&config_for(dist_dir.path(), &upstream));

        let req = Request::builder()
            .uri("/api/devices?status=online")
            .header("authorization", "Bearer tok")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(body["authorization"], "Bearer tok");
        assert_eq!(body["query"], "status=online");
    }

    #[tokio::test]
    async fn test_proxy_forwards_body_and_upstream_status() {
        let upstream = spawn_upstream().await;
        let dist_dir = tempfile::tempdir().unwrap();
        let app = build_app(&config_for(dist_dir.path(), &upstream));

        let login = |password: &str| {
            Request::builder()
                .method(Method::POST)
                .uri("/api/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(format!(
                    r#"{{"email":"ops@example.com","password":"{}"}}"#,
                    password
                )))
                .unwrap()
        };

        let resp = app.clone().oneshot(login("right")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_string(resp).await.contains("tok"));

        let resp = app.oneshot(login("wrong")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(resp).await.contains("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_returns_502() {
        // Grab a free port, then close it so nothing is listening there.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dist_dir = tempfile::tempdir().unwrap();
        let app = build_app(&config_for(dist_dir.path(), &format!("http://{}", addr)));

        let resp = app.oneshot(get_request("/api/devices")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(body["detail"], "Upstream API unavailable");
    }
}
