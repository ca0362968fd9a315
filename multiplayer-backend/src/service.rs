//! The `multiplayer.MultiplayerService` procedures.
//!
//! Each method validates its request, forwards to [`ModeAccess`] and maps
//! the outcome onto a [`Status`]. No caching decisions are made here.

use crate::access::{AccessError, ModeAccess};
use crate::error::Status;
use crate::messages::{
    ActiveUsersByAreaCodeRequest, ActiveUsersByAreaCodeResponse, ConfirmationResponse,
    GameModeStats, GameModeStatsRequest, GetPlayersRequest, GetPlayersResponse, JoinModeRequest,
    LeaveModeRequest, ModeDetails, ModeDetailsRequest, ModeUsageRequest, ModeUsageResponse,
    TotalActiveUsersRequest, TotalActiveUsersResponse, UpdateGameStateRequest,
};
use crate::validation;

/// Fully-qualified service name, the path prefix of every procedure.
pub const SERVICE_NAME: &str = "multiplayer.MultiplayerService";

#[derive(Clone)]
pub struct MultiplayerService {
    access: ModeAccess,
}

/// NotFound keeps its own code; anything else is an internal failure
/// described by `context`.
fn to_status(err: AccessError, context: &str) -> Status {
    match err {
        AccessError::NotFound(_) => Status::not_found(format!("Mode not found: {err}")),
        AccessError::Store(_) => Status::internal(format!("{context}: {err}")),
    }
}

impl MultiplayerService {
    pub fn new(access: ModeAccess) -> Self {
        Self { access }
    }

    pub async fn get_mode_usage(
        &self,
        _request: ModeUsageRequest,
    ) -> Result<ModeUsageResponse, Status> {
        let modes = self
            .access
            .get_all_mode_usage()
            .await
            .map_err(|err| to_status(err, "Failed to fetch game modes"))?;

        Ok(ModeUsageResponse { modes })
    }

    pub async fn join_mode(
        &self,
        request: JoinModeRequest,
    ) -> Result<ConfirmationResponse, Status> {
        validation::validate_mode_name(&request.mode_name)?;
        validation::validate_player_id(&request.player_id)?;

        self.access
            .join_mode(&request.mode_name, &request.player_id)
            .await
            .map_err(|err| to_status(err, "Failed to join mode"))?;

        Ok(ConfirmationResponse::new("Player added successfully"))
    }

    pub async fn leave_mode(
        &self,
        request: LeaveModeRequest,
    ) -> Result<ConfirmationResponse, Status> {
        validation::validate_mode_name(&request.mode_name)?;
        validation::validate_player_id(&request.player_id)?;

        self.access
            .leave_mode(&request.mode_name, &request.player_id)
            .await
            .map_err(|err| to_status(err, "Failed to leave mode"))?;

        Ok(ConfirmationResponse::new("Player removed successfully"))
    }

    pub async fn get_mode_details(
        &self,
        request: ModeDetailsRequest,
    ) -> Result<ModeDetails, Status> {
        validation::validate_mode_name(&request.mode_name)?;

        self.access
            .get_mode_details(&request.mode_name)
            .await
            .map_err(|err| to_status(err, "Failed to fetch mode details"))
    }

    pub async fn get_active_users_by_area_code(
        &self,
        request: ActiveUsersByAreaCodeRequest,
    ) -> Result<ActiveUsersByAreaCodeResponse, Status> {
        validation::validate_area_code(&request.area_code)?;

        let total_active_users = self
            .access
            .get_active_users_by_area(&request.area_code)
            .await
            .map_err(|err| to_status(err, "Failed to fetch active users by area code"))?;

        Ok(ActiveUsersByAreaCodeResponse { total_active_users })
    }

    pub async fn get_game_mode_stats(
        &self,
        _request: GameModeStatsRequest,
    ) -> Result<GameModeStats, Status> {
        self.access
            .get_game_mode_stats()
            .await
            .map_err(|err| to_status(err, "Failed to fetch game mode stats"))
    }

    pub async fn get_players(
        &self,
        request: GetPlayersRequest,
    ) -> Result<GetPlayersResponse, Status> {
        validation::validate_mode_name(&request.mode_name)?;

        let players = self
            .access
            .get_players(&request.mode_name)
            .await
            .map_err(|err| to_status(err, "Failed to fetch players"))?;

        Ok(GetPlayersResponse { players })
    }

    pub async fn update_game_state(
        &self,
        request: UpdateGameStateRequest,
    ) -> Result<ConfirmationResponse, Status> {
        validation::validate_mode_name(&request.mode_name)?;
        validation::validate_game_state(&request.game_state)?;

        self.access
            .update_game_state(&request.mode_name, &request.game_state)
            .await
            .map_err(|err| to_status(err, "Failed to update game state"))?;

        Ok(ConfirmationResponse::new("Game state updated successfully"))
    }

    pub async fn get_total_active_users(
        &self,
        _request: TotalActiveUsersRequest,
    ) -> Result<TotalActiveUsersResponse, Status> {
        let total_active_users = self
            .access
            .get_total_active_users()
            .await
            .map_err(|err| to_status(err, "Failed to fetch total active users"))?;

        Ok(TotalActiveUsersResponse { total_active_users })
    }
}
