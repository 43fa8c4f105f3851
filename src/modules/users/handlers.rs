use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bookshelf_authz::Session;
use bookshelf_http::{ApiJson, AppError, AppResult};

use super::models::{AuthOutcome, LoginRequest, RegisterRequest, User};
use super::service::{AuthError, AuthService, Registration};
use crate::state::AppState;
use crate::utils::required;

pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> AppResult<Response> {
    let registration = Registration {
        username: required("username", body.username)?,
        password: required("password", body.password)?,
        email: required("email", body.email)?,
        full_name: required("full_name", body.full_name)?,
    };

    let auth = AuthService::new(&state.db, state.password_cost);
    match auth.register(registration).await {
        Ok(_) => Ok(Json(AuthOutcome::success("User registered successfully")).into_response()),
        Err(AuthError::DuplicateUsername) => Ok((
            StatusCode::CONFLICT,
            Json(AuthOutcome::failure("Username already exists")),
        )
            .into_response()),
        Err(err) => Err(err.into()),
    }
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> AppResult<Response> {
    let username = required("username", body.username)?;
    let password = required("password", body.password)?;

    let auth = AuthService::new(&state.db, state.password_cost);
    let user = match auth.sign_in(&username, &password).await {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            return Ok((
                StatusCode::UNAUTHORIZED,
                Json(AuthOutcome::failure("Invalid username or password")),
            )
                .into_response());
        }
        Err(err) => return Err(err.into()),
    };

    let token = state
        .sessions
        .issue(user.id, &user.username)
        .map_err(|err| AppError::Internal(err.into()))?;
    tracing::info!(user_id = user.id, "user signed in");

    Ok((
        [(header::SET_COOKIE, state.sessions.session_cookie(&token))],
        Json(AuthOutcome::signed_in(&user)),
    )
        .into_response())
}

pub async fn logout(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    tracing::info!(user_id = session.user_id, "user signed out");
    (
        [(header::SET_COOKIE, state.sessions.clear_cookie())],
        Json(AuthOutcome::success("Sign out successful")),
    )
}

pub async fn profile(State(state): State<AppState>, session: Session) -> AppResult<Json<User>> {
    AuthService::new(&state.db, state.password_cost)
        .current_user(&session)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("User not found."))
}
