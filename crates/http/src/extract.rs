//! Extractors that report failures in the standard error envelope.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request,
    },
    http::request::Parts,
    Json,
};

use crate::error::AppError;

/// `Json<T>` whose rejections (bad syntax, wrong types, missing content type)
/// become 400 `bad_request` errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::bad_request(rejection.body_text())),
        }
    }
}

/// `Path<T>` whose rejections (for example a non-numeric id) become 400
/// `bad_request` errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::bad_request(rejection.body_text())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, StatusCode},
        response::IntoResponse,
        routing::{get, post},
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Rating {
        rating: i64,
    }

    fn app() -> Router {
        Router::new().route(
            "/",
            post(|ApiJson(body): ApiJson<Rating>| async move {
                body.rating.to_string().into_response()
            }),
        )
    }

    async fn post_json(body: &'static str) -> StatusCode {
        app()
            .oneshot(
                Request::post("/")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn well_formed_body_is_extracted() {
        assert_eq!(post_json(r#"{"rating": 4}"#).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_type_is_a_bad_request() {
        assert_eq!(
            post_json(r#"{"rating": "four"}"#).await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        assert_eq!(post_json("{").await, StatusCode::BAD_REQUEST);
    }

    fn book_app() -> Router {
        Router::new().route(
            "/books/{id}",
            get(|ApiPath(id): ApiPath<i64>| async move { id.to_string() }),
        )
    }

    #[tokio::test]
    async fn numeric_path_is_extracted() {
        let response = book_app()
            .oneshot(Request::get("/books/42").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"42");
    }

    #[tokio::test]
    async fn non_numeric_path_is_a_bad_request_envelope() {
        let response = book_app()
            .oneshot(Request::get("/books/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "bad_request");
    }
}
