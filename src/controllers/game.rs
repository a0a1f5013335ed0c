use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use log::info;
use serde_json::json;

use crate::controllers::{parse_id, AuthUser};
use crate::errors::CustomError;
use crate::models::game::*;
use crate::models::leaderboard::{LeaderboardEntry, LeaderboardQuery};
use crate::AppState;

const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;

//handler for creating a new game.
pub async fn create_game(   State(state): State<AppState>,
                            AuthUser(player_id): AuthUser,
                            payload: Result<Json<NewGame>, JsonRejection>,
                            ) -> Result<impl IntoResponse, CustomError> {

    info!("new game request");

    let Ok(Json(new_game)) = payload else {
        return Err(CustomError::BadRequest("game_type is required".to_string()));
    };
    let game_type: GameType = new_game.game_type.parse().map_err(CustomError::BadRequest)?;

    let game = state.games.create_game(player_id, game_type).await?;
    Ok((StatusCode::CREATED, Json(GameInfo::from(&game))))
}

//handler for listing games that are waiting for a player or still being played
pub async fn available_games(   State(state): State<AppState>,
                                AuthUser(_): AuthUser,
                                ) -> Result<impl IntoResponse, CustomError> {

    info!("available games request");

    let games = state.games.get_available_games().await?;
    let games: Vec<AvailableGame> = games.iter().map(AvailableGame::from).collect();
    Ok((StatusCode::OK, Json(json!({ "games": games }))))
}

/////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//handler for joining an existing game.
pub async fn join_game( Path(game_id): Path<String>,
                        State(state): State<AppState>,
                        AuthUser(player_id): AuthUser,
                        ) -> Result<impl IntoResponse, CustomError> {

    info!("Join game request");

    let game_id = parse_id(&game_id, "game_id")?;
    let game = state.games.join_game(game_id, player_id).await?;
    Ok((StatusCode::OK, Json(GameInfo::from(&game))))
}

/////////////////////////////////////////////////////////////////////////////////////////////////////////////////
//handler for making a move. The body holds the whole board with the player's new mark on it.
//Against the computer the answer already contains the computer's reply
pub async fn make_move( Path(game_id): Path<String>,
                        State(state): State<AppState>,
                        AuthUser(player_id): AuthUser,
                        payload: Result<Json<NewMove>, JsonRejection>,
                        ) -> Result<impl IntoResponse, CustomError> {

    info!("Move request");

    let Ok(Json(new_move)) = payload else {
        return Err(CustomError::BadRequest("board is required".to_string()));
    };
    let game_id = parse_id(&game_id, "game_id")?;

    let game = state.games.make_move(game_id, player_id, &new_move.board).await?;
    Ok((StatusCode::OK, Json(GameInfo::from(&game))))
}

//handler for fetching a single game
pub async fn get_game(  Path(game_id): Path<String>,
                        State(state): State<AppState>,
                        AuthUser(_): AuthUser,
                        ) -> Result<impl IntoResponse, CustomError> {

    info!("get game request");

    let game_id = parse_id(&game_id, "game_id")?;
    match state.games.get_game(game_id).await? {
        Some(game) => Ok((StatusCode::OK, Json(GameInfo::from(&game)))),
        None => Err(CustomError::NotFound("Game not found".to_string())),
    }
}

//handler for the finished games of the logged in user, newest first
pub async fn game_history(  State(state): State<AppState>,
                            AuthUser(user_id): AuthUser,
                            ) -> Result<impl IntoResponse, CustomError> {

    info!("game history request");

    let games = state.games.get_completed_games_by_user(user_id).await?;
    let games: Vec<GameHistoryEntry> = games.iter().map(GameHistoryEntry::from).collect();
    Ok((StatusCode::OK, Json(json!({ "games": games }))))
}

//handler for the leaderboard, ?limit=N with N between 1 and 100 (default 10)
pub async fn leaderboard(   State(state): State<AppState>,
                            AuthUser(_): AuthUser,
                            query: Result<Query<LeaderboardQuery>, QueryRejection>,
                            ) -> Result<impl IntoResponse, CustomError> {

    info!("leaderboard request");

    let Ok(Query(query)) = query else {
        return Err(CustomError::BadRequest("limit must be an integer".to_string()));
    };
    let limit = query.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);

    let leaders = state.games.get_leaderboard(limit).await?;
    let leaders: Vec<LeaderboardEntry> = leaders.iter().map(LeaderboardEntry::from).collect();
    Ok((StatusCode::OK, Json(json!({ "leaderboard": leaders }))))
}
