use std::sync::Arc;

use axum::body::Body;
use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use kml_update::{ContentType, CycleHandler, TestOracle, Token};
use tower_http::trace::TraceLayer;
use tracing::info;

pub const HEALTH_ROUTE: &str = "/healthz";

pub fn cycle_router(route: &str, handler: CycleHandler) -> Router {
    Router::new()
        .route(HEALTH_ROUTE, get(healthz))
        .route(route, get(get_update))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(handler))
}

/// Every path is served: `/index.kml` gets the base document, anything else
/// a random update.
pub fn oracle_router(oracle: TestOracle) -> Router {
    Router::new()
        .fallback(get_oracle)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(oracle))
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_update(
    State(handler): State<Arc<CycleHandler>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let cookie = headers
        .get(http::header::COOKIE)
        .and_then(|v| v.to_str().ok());
    let raw = Token::select_raw(query.as_deref(), cookie);
    let resp = handler.handle(raw);

    let mut out = HeaderMap::new();
    out.insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static(resp.content_type.mime()),
    );
    if let Ok(v) = HeaderValue::from_str(&resp.token.directive()) {
        out.insert(http::header::SET_COOKIE, v);
    }
    (StatusCode::OK, out, Body::from(resp.body)).into_response()
}

async fn get_oracle(State(oracle): State<Arc<TestOracle>>, uri: Uri) -> Response {
    info!("GET {}", uri.path());
    let body = oracle.handle(uri.path(), &mut rand::rng());

    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static(ContentType::Kml.mime()),
    );
    (StatusCode::OK, headers, Body::from(body)).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::Request;
    use http_body_util::BodyExt;
    use kml_update::{CycleConfig, OracleConfig};
    use tower::ServiceExt;

    use super::*;

    const ROUTE: &str = "/cgi-bin/continents";

    fn cycle_app() -> Router {
        let handler = CycleHandler::new(CycleConfig {
            callback_href: "http://localhost/cgi-bin/continents".to_string(),
            ..CycleConfig::default()
        })
        .unwrap();
        cycle_router(ROUTE, handler)
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn healthz_returns_ok() {
        let request = Request::builder()
            .uri("/healthz")
            .body(Body::empty())
            .unwrap();
        let response = cycle_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "ok");
    }

    #[tokio::test]
    async fn first_fetch_sets_initial_cookie() {
        let request = Request::builder().uri(ROUTE).body(Body::empty()).unwrap();
        let response = cycle_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/plain");
        assert_eq!(response.headers()["set-cookie"], "count=0");
        let body = body_string(response).await;
        assert!(body.contains("<cookie>count=0</cookie>"));
    }

    #[tokio::test]
    async fn query_token_advances_cycle() {
        let request = Request::builder()
            .uri(format!("{ROUTE}?count=0"))
            .body(Body::empty())
            .unwrap();
        let response = cycle_app().oneshot(request).await.unwrap();

        assert_eq!(response.headers()["set-cookie"], "count=1");
        let body = body_string(response).await;
        assert!(body.contains("<message>Arriving Australia</message>"));
        assert!(body.contains("<coordinates>134.600000,-20.470000</coordinates>"));
    }

    #[tokio::test]
    async fn cookie_header_is_a_fallback() {
        let request = Request::builder()
            .uri(ROUTE)
            .header("cookie", "count=7")
            .body(Body::empty())
            .unwrap();
        let response = cycle_app().oneshot(request).await.unwrap();

        assert_eq!(response.headers()["set-cookie"], "count=1");
        assert!(body_string(response).await.contains("Arriving Australia"));
    }

    #[tokio::test]
    async fn malformed_token_restarts_without_error() {
        let request = Request::builder()
            .uri(format!("{ROUTE}?count=banana"))
            .body(Body::empty())
            .unwrap();
        let response = cycle_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["set-cookie"], "count=0");
    }

    #[tokio::test]
    async fn oracle_serves_index_and_updates() {
        let app = oracle_router(TestOracle::new(OracleConfig::default()).unwrap());

        let index = app
            .clone()
            .oneshot(Request::builder().uri("/index.kml").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(
            index.headers()["content-type"],
            "application/vnd.google-earth.kml+xml"
        );
        let body = body_string(index).await;
        assert!(body.contains("<href>http://localhost:8080/update</href>"));

        let update = app
            .oneshot(Request::builder().uri("/update").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_string(update).await;
        assert!(body.contains("<targetHref>http://localhost:8080/index.kml</targetHref>"));
        assert!(body.contains("<range>10000</range>"));
    }
}
