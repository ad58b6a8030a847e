//! HTTP route handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use callsign_auth::{SignInInput, SignUpInput};
use callsign_core::repository::UserRepository;
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use uuid::Uuid;

use crate::AppState;
use crate::error::Result;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub display_name: String,
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub access_token: String,
}

/// Body returned by sign-up and sign-in.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

async fn health_check() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

async fn sign_up<U: UserRepository + 'static>(
    State(state): State<Arc<AppState<U>>>,
    payload: std::result::Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    let Json(req) = payload?;
    let out = state
        .auth
        .sign_up(SignUpInput {
            display_name: req.display_name,
            phone_number: req.phone_number,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            id: out.user_id,
            access_token: out.access_token,
            refresh_token: out.refresh_token,
            expires_in: out.expires_in,
        }),
    ))
}

async fn sign_in<U: UserRepository + 'static>(
    State(state): State<Arc<AppState<U>>>,
    payload: std::result::Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>> {
    let Json(req) = payload?;
    let out = state
        .auth
        .sign_in(SignInInput {
            phone_number: req.phone_number,
            password: req.password,
        })
        .await?;

    Ok(Json(SessionResponse {
        id: out.user_id,
        access_token: out.access_token,
        refresh_token: out.refresh_token,
        expires_in: out.expires_in,
    }))
}

async fn refresh<U: UserRepository + 'static>(
    State(state): State<Arc<AppState<U>>>,
    payload: std::result::Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<RefreshResponse>> {
    let Json(req) = payload?;
    let out = state.auth.refresh(&req.refresh_token).await?;

    Ok(Json(RefreshResponse {
        access_token: out.access_token,
        refresh_token: out.refresh_token,
        expires_in: out.expires_in,
    }))
}

async fn logout<U: UserRepository + 'static>(
    State(state): State<Arc<AppState<U>>>,
    payload: std::result::Result<Json<LogoutRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>> {
    let Json(req) = payload?;
    state.auth.logout(&req.access_token).await?;

    Ok(Json(StatusResponse {
        status: "logged_out".to_string(),
    }))
}

/// Build the complete router with all routes.
pub fn create_router<U: UserRepository + 'static>(state: Arc<AppState<U>>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/sign-up", post(sign_up::<U>))
        .route("/auth/sign-in", post(sign_in::<U>))
        .route("/auth/refresh", post(refresh::<U>))
        .route("/auth/logout", post(logout::<U>))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
