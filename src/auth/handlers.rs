use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            DeleteResponse, LoginRequest, LoginResponse, PublicUser, RegisterRequest,
            RegisterResponse, UpdateProfileRequest,
        },
        extractors::AuthUser,
        jwt::TokenKeys,
    },
    errors::ApiError,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users", get(list_users))
        .route("/users/me", get(get_me).put(update_me))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    state.auth.register(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "User registered successfully".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let keys = TokenKeys::from_ref(&state);
    let (token, user) = state.auth.login(&payload, &keys).await?;
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

#[instrument(skip_all)]
async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = state.auth.list_users().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip_all)]
async fn get_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state.auth.get_user(claims.sub).await?;
    Ok(Json(user.into()))
}

#[instrument(skip_all)]
async fn update_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state
        .auth
        .update_profile(&claims, claims.sub, payload)
        .await?;
    Ok(Json(user.into()))
}

#[instrument(skip_all)]
async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<u64>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state.auth.get_user(id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip_all)]
async fn update_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<u64>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state.auth.update_profile(&claims, id, payload).await?;
    Ok(Json(user.into()))
}

#[instrument(skip_all)]
async fn delete_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.auth.delete_user(&claims, id).await?;
    Ok(Json(DeleteResponse {
        message: "User deleted successfully".into(),
    }))
}
