use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument};

use super::{
    dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
    jwt::{AuthUser, JwtKeys},
    services,
};
use crate::{
    error::{ApiError, JsonBody},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let (user, token) = services::register(state.users.as_ref(), &keys, payload).await?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let (user, token) = services::login(state.users.as_ref(), &keys, payload).await?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    match state.users.find_by_id(user_id).await? {
        Some(user) => Ok(Json(user.into())),
        None => {
            error!(user_id = %user_id, "token for unknown user");
            Err(ApiError::Unauthorized("User not found".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::{app::build_app, auth::jwt::AUTH_TOKEN_HEADER};

    async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> (StatusCode, Vec<u8>) {
        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn register_login_and_me() {
        let app = build_app(AppState::fake());

        let (status, body) = post_json(
            &app,
            "/api/auth/register",
            json!({"name": "Asha", "email": "asha@example.com", "password": "longenough"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let registered: AuthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(registered.user.name, "Asha");

        let (status, body) = post_json(
            &app,
            "/api/auth/login",
            json!({"email": "asha@example.com", "password": "longenough"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let logged_in: AuthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(logged_in.user, registered.user);

        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/auth/me")
                    .header(AUTH_TOKEN_HEADER, &logged_in.token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let me: PublicUser = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(me, registered.user);
    }

    #[tokio::test]
    async fn bad_credentials_are_unauthorized() {
        let app = build_app(AppState::fake());
        let (status, _) = post_json(
            &app,
            "/api/auth/login",
            json!({"email": "ghost@example.com", "password": "whatever1"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let app = build_app(AppState::fake());
        let body = json!({"name": "Asha", "email": "asha@example.com", "password": "longenough"});
        let (status, _) = post_json(&app, "/api/auth/register", body.clone()).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = post_json(&app, "/api/auth/register", body).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn malformed_body_is_a_validation_error() {
        let app = build_app(AppState::fake());
        let (status, _) = post_json(&app, "/api/auth/login", json!({"email": "a@b.co"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
