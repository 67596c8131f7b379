/*
 * Responsibility
 * - Drop-in `Json` / `Query` / `Path` extractors whose rejections use the
 *   shared `{"error":{code,message}}` envelope instead of axum's plain text
 * - `Json` is also the response wrapper, so handlers import a single name
 */
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::{StatusCode, request::Parts};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::error_response;

/// Malformed request input that never reached a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRejection {
    pub status: StatusCode,
    pub message: String,
}

impl InputRejection {
    fn new(status: StatusCode, message: String) -> Self {
        // 422 from serde is still a shape problem for our clients.
        let status = match status {
            StatusCode::UNSUPPORTED_MEDIA_TYPE | StatusCode::PAYLOAD_TOO_LARGE => status,
            _ => StatusCode::BAD_REQUEST,
        };
        debug!(%status, %message, "request input rejected");
        Self { status, message }
    }

    pub fn code(&self) -> &'static str {
        match self.status {
            StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
            StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
            _ => "VALIDATION_ERROR",
        }
    }
}

impl IntoResponse for InputRejection {
    fn into_response(self) -> Response {
        error_response(self.status, self.code(), self.message)
    }
}

impl From<JsonRejection> for InputRejection {
    fn from(e: JsonRejection) -> Self {
        Self::new(e.status(), e.body_text())
    }
}

impl From<QueryRejection> for InputRejection {
    fn from(e: QueryRejection) -> Self {
        Self::new(e.status(), e.body_text())
    }
}

impl From<PathRejection> for InputRejection {
    fn from(e: PathRejection) -> Self {
        Self::new(e.status(), e.body_text())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = InputRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = InputRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Path<T>(pub T);

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = InputRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, header};
    use axum::routing::{get, post};
    use serde::Deserialize;
    use tower::ServiceExt;

    use super::*;
    use crate::error::ErrorResponse;

    #[derive(Debug, Deserialize, Serialize)]
    struct Item {
        n: u32,
    }

    async fn echo(Json(item): Json<Item>) -> Json<Item> {
        Json(item)
    }

    async fn by_id(Path(id): Path<u32>, Query(item): Query<Item>) -> String {
        format!("{id}:{}", item.n)
    }

    fn app() -> Router {
        Router::new()
            .route("/items", post(echo))
            .route("/items/{id}", get(by_id))
    }

    async fn send(req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let res = app().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), 1 << 16).await.unwrap();
        (status, bytes.to_vec())
    }

    fn envelope(bytes: &[u8]) -> ErrorResponse {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn valid_input_passes_through() {
        let req = Request::post("/items")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"n":3}"#))
            .unwrap();
        let (status, bytes) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, br#"{"n":3}"#);

        let req = Request::get("/items/7?n=2").body(Body::empty()).unwrap();
        let (status, bytes) = send(req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, b"7:2");
    }

    #[tokio::test]
    async fn bad_body_is_a_json_400() {
        let req = Request::post("/items")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"n":"three"}"#))
            .unwrap();
        let (status, bytes) = send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(envelope(&bytes).error.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn missing_content_type_keeps_415() {
        let req = Request::post("/items").body(Body::from(r#"{"n":3}"#)).unwrap();
        let (status, bytes) = send(req).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(envelope(&bytes).error.code, "UNSUPPORTED_MEDIA_TYPE");
    }

    #[tokio::test]
    async fn bad_path_and_query_are_json_400s() {
        for uri in ["/items/seven?n=1", "/items/7?n=-1", "/items/7"] {
            let req = Request::get(uri).body(Body::empty()).unwrap();
            let (status, bytes) = send(req).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(envelope(&bytes).error.code, "VALIDATION_ERROR", "{uri}");
        }
    }
}
