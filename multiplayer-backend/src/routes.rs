use crate::AppState;
use crate::error::Status;
use crate::messages::{
    ActiveUsersByAreaCodeRequest, ActiveUsersByAreaCodeResponse, ConfirmationResponse,
    GameModeStats, GameModeStatsRequest, GetPlayersRequest, GetPlayersResponse, JoinModeRequest,
    LeaveModeRequest, ModeDetails, ModeDetailsRequest, ModeUsageRequest, ModeUsageResponse,
    TotalActiveUsersRequest, TotalActiveUsersResponse, UpdateGameStateRequest,
};

use axum::{
    Json,
    extract::{FromRequest, Request, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use axum_macros::debug_handler;
use serde::Serialize;
use std::sync::Arc;

/// JSON request body whose rejection is reported as an `invalid_argument`
/// status instead of axum's plain-text error.
pub(crate) struct RpcRequest<T>(pub T);

impl<S, T> FromRequest<S> for RpcRequest<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Status;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| Status::invalid_argument(rejection.body_text()))?;
        Ok(Self(value))
    }
}

// ============================================================================
// Remote procedures
// ============================================================================

#[debug_handler]
pub(crate) async fn get_mode_usage(
    State(state): State<Arc<AppState>>,
    RpcRequest(request): RpcRequest<ModeUsageRequest>,
) -> Result<Json<ModeUsageResponse>, Status> {
    state.service.get_mode_usage(request).await.map(Json)
}

#[debug_handler]
pub(crate) async fn join_mode(
    State(state): State<Arc<AppState>>,
    RpcRequest(request): RpcRequest<JoinModeRequest>,
) -> Result<Json<ConfirmationResponse>, Status> {
    state.service.join_mode(request).await.map(Json)
}

#[debug_handler]
pub(crate) async fn leave_mode(
    State(state): State<Arc<AppState>>,
    RpcRequest(request): RpcRequest<LeaveModeRequest>,
) -> Result<Json<ConfirmationResponse>, Status> {
    state.service.leave_mode(request).await.map(Json)
}

#[debug_handler]
pub(crate) async fn get_mode_details(
    State(state): State<Arc<AppState>>,
    RpcRequest(request): RpcRequest<ModeDetailsRequest>,
) -> Result<Json<ModeDetails>, Status> {
    state.service.get_mode_details(request).await.map(Json)
}

#[debug_handler]
pub(crate) async fn get_active_users_by_area_code(
    State(state): State<Arc<AppState>>,
    RpcRequest(request): RpcRequest<ActiveUsersByAreaCodeRequest>,
) -> Result<Json<ActiveUsersByAreaCodeResponse>, Status> {
    state
        .service
        .get_active_users_by_area_code(request)
        .await
        .map(Json)
}

#[debug_handler]
pub(crate) async fn get_game_mode_stats(
    State(state): State<Arc<AppState>>,
    RpcRequest(request): RpcRequest<GameModeStatsRequest>,
) -> Result<Json<GameModeStats>, Status> {
    state.service.get_game_mode_stats(request).await.map(Json)
}

#[debug_handler]
pub(crate) async fn get_players(
    State(state): State<Arc<AppState>>,
    RpcRequest(request): RpcRequest<GetPlayersRequest>,
) -> Result<Json<GetPlayersResponse>, Status> {
    state.service.get_players(request).await.map(Json)
}

#[debug_handler]
pub(crate) async fn update_game_state(
    State(state): State<Arc<AppState>>,
    RpcRequest(request): RpcRequest<UpdateGameStateRequest>,
) -> Result<Json<ConfirmationResponse>, Status> {
    state.service.update_game_state(request).await.map(Json)
}

#[debug_handler]
pub(crate) async fn get_total_active_users(
    State(state): State<Arc<AppState>>,
    RpcRequest(request): RpcRequest<TotalActiveUsersRequest>,
) -> Result<Json<TotalActiveUsersResponse>, Status> {
    state.service.get_total_active_users(request).await.map(Json)
}

// ============================================================================
// HTTP facade
// ============================================================================

#[derive(Serialize)]
pub(crate) struct MessageBody {
    message: &'static str,
}

#[derive(Serialize)]
pub(crate) struct TotalActiveUsersBody {
    #[serde(rename = "totalActiveUsers")]
    total_active_users: i64,
}

pub(crate) async fn root() -> Json<MessageBody> {
    Json(MessageBody {
        message: "Multiplayer Web Service is running!",
    })
}

/// Served in-process through the service, not through the RPC listener.
#[debug_handler]
pub(crate) async fn total_active_users(
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    match state
        .service
        .get_total_active_users(TotalActiveUsersRequest::default())
        .await
    {
        Ok(response) => (
            StatusCode::OK,
            Json(TotalActiveUsersBody {
                total_active_users: response.total_active_users,
            }),
        )
            .into_response(),
        Err(status) => {
            tracing::error!(%status, "failed to fetch total active users");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(MessageBody {
                    message: "Failed to fetch total active users",
                }),
            )
                .into_response()
        }
    }
}
