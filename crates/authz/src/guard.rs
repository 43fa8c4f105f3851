//! Request guard for routes that need a signed-in user.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use bookshelf_http::AppError;

use crate::session::{Session, SessionKeys};

const NOT_LOGGED_IN: &str = "User must be logged in.";

/// Reject the request with 403 unless it carries a valid session cookie.
///
/// On success the [`Session`] is placed in the request extensions and the
/// wrapped handler runs unchanged.
pub async fn require_session(
    State(keys): State<SessionKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let session = match keys.token_from_headers(req.headers()) {
        Some(token) => match keys.verify(token) {
            Ok(session) => session,
            Err(err) => {
                tracing::debug!(error = %err, "rejecting request with invalid session");
                return Err(AppError::forbidden(NOT_LOGGED_IN));
            }
        },
        None => return Err(AppError::forbidden(NOT_LOGGED_IN)),
    };

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::forbidden(NOT_LOGGED_IN))
    }
}
