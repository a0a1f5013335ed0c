use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::models::board::{Board, Symbol};
use crate::store::StoreError;

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Pvp,
    Pvc,
}

impl GameType {
    pub fn as_str(self) -> &'static str {
        match self {
            GameType::Pvp => "pvp",
            GameType::Pvc => "pvc",
        }
    }
}

impl FromStr for GameType {
    type Err = String;

    // Case insensitive, "PvP" and "pvp" are the same thing
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pvp" => Ok(GameType::Pvp),
            "pvc" => Ok(GameType::Pvc),
            _ => Err("game_type must be \"pvp\" or \"pvc\"".to_string()),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    WaitingForPlayer,
    PlayerTurn,
    PlayerWon,
    Draw,
}

impl GameState {
    pub fn as_str(self) -> &'static str {
        match self {
            GameState::WaitingForPlayer => "waiting_for_player",
            GameState::PlayerTurn => "player_turn",
            GameState::PlayerWon => "player_won",
            GameState::Draw => "draw",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, GameState::PlayerWon | GameState::Draw)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting_for_player" => Ok(GameState::WaitingForPlayer),
            "player_turn" => Ok(GameState::PlayerTurn),
            "player_won" => Ok(GameState::PlayerWon),
            "draw" => Ok(GameState::Draw),
            other => Err(format!("unknown game state {other}")),
        }
    }
}

/// A single match. Lifecycle transitions live in `crate::engine::state`.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Game {
    pub game_id: Uuid,
    pub board: Board,
    pub game_type: GameType,
    pub game_state: GameState,
    pub player1_id: Uuid,
    // None while waiting for an opponent, and always None against the computer
    pub player2_id: Option<Uuid>,
    pub player1_symbol: Symbol,
    pub player2_symbol: Symbol,
    pub current_player_id: Option<Uuid>,
    pub winner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// The row as stored in the games table
#[derive(sqlx::FromRow, Debug)]
pub struct GameRow {
    pub game_id: String,
    pub board: String,
    pub game_type: String,
    pub game_state: String,
    pub player1_id: String,
    pub player2_id: Option<String>,
    pub player1_symbol: u8,
    pub player2_symbol: u8,
    pub current_player_id: Option<String>,
    pub winner_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn parse_id(field: &str, value: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(value).map_err(|err| StoreError::Corrupt(format!("{field}: {err}")))
}

fn parse_optional_id(field: &str, value: Option<&str>) -> Result<Option<Uuid>, StoreError> {
    value.map(|v| parse_id(field, v)).transpose()
}

impl TryFrom<&Game> for GameRow {
    type Error = StoreError;

    fn try_from(game: &Game) -> Result<Self, Self::Error> {
        let board = serde_json::to_string(&game.board)
            .map_err(|err| StoreError::Corrupt(format!("board: {err}")))?;
        Ok(GameRow {
            game_id: game.game_id.to_string(),
            board,
            game_type: game.game_type.as_str().to_string(),
            game_state: game.game_state.as_str().to_string(),
            player1_id: game.player1_id.to_string(),
            player2_id: game.player2_id.map(|id| id.to_string()),
            player1_symbol: game.player1_symbol.into(),
            player2_symbol: game.player2_symbol.into(),
            current_player_id: game.current_player_id.map(|id| id.to_string()),
            winner_id: game.winner_id.map(|id| id.to_string()),
            created_at: game.created_at,
        })
    }
}

impl TryFrom<GameRow> for Game {
    type Error = StoreError;

    fn try_from(row: GameRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, err: String| StoreError::Corrupt(format!("{field}: {err}"));
        Ok(Game {
            game_id: parse_id("game_id", &row.game_id)?,
            board: serde_json::from_str(&row.board).map_err(|err| corrupt("board", err.to_string()))?,
            game_type: row.game_type.parse().map_err(|err| corrupt("game_type", err))?,
            game_state: row.game_state.parse().map_err(|err| corrupt("game_state", err))?,
            player1_id: parse_id("player1_id", &row.player1_id)?,
            player2_id: parse_optional_id("player2_id", row.player2_id.as_deref())?,
            player1_symbol: Symbol::try_from(row.player1_symbol).map_err(|err| corrupt("player1_symbol", err))?,
            player2_symbol: Symbol::try_from(row.player2_symbol).map_err(|err| corrupt("player2_symbol", err))?,
            current_player_id: parse_optional_id("current_player_id", row.current_player_id.as_deref())?,
            winner_id: parse_optional_id("winner_id", row.winner_id.as_deref())?,
            created_at: row.created_at,
        })
    }
}

// The struct used for receiving a new game request as json
#[derive(Deserialize, Serialize, Debug)]
pub struct NewGame {
    pub game_type: String,
}

// The struct used for receiving a move as json. The caller sends the whole board with its mark placed
#[derive(Deserialize, Serialize, Debug)]
pub struct NewMove {
    pub board: Vec<Vec<i64>>,
}

// The struct used to respond with a game record
#[derive(Deserialize, Serialize, Debug, PartialEq)]
pub struct GameInfo {
    pub game_id: Uuid,
    pub board: Board,
    pub game_type: GameType,
    pub game_state: GameState,
    pub player1_id: Uuid,
    pub player2_id: Option<Uuid>,
    pub player1_symbol: Symbol,
    pub player2_symbol: Symbol,
    pub current_player_id: Option<Uuid>,
    pub winner_id: Option<Uuid>,
}

impl From<&Game> for GameInfo {
    fn from(game: &Game) -> Self {
        GameInfo {
            game_id: game.game_id,
            board: game.board,
            game_type: game.game_type,
            game_state: game.game_state,
            player1_id: game.player1_id,
            player2_id: game.player2_id,
            player1_symbol: game.player1_symbol,
            player2_symbol: game.player2_symbol,
            current_player_id: game.current_player_id,
            winner_id: game.winner_id,
        }
    }
}

// A finished game in the history listing: the game record plus when it was created
#[derive(Deserialize, Serialize, Debug)]
pub struct GameHistoryEntry {
    #[serde(flatten)]
    pub game: GameInfo,
    pub created_at: DateTime<Utc>,
}

impl From<&Game> for GameHistoryEntry {
    fn from(game: &Game) -> Self {
        GameHistoryEntry { game: GameInfo::from(game), created_at: game.created_at }
    }
}

// An open game in the lobby listing
#[derive(Deserialize, Serialize, Debug)]
pub struct AvailableGame {
    pub game_id: Uuid,
    pub player1_id: Uuid,
    pub player2_id: Option<Uuid>,
    pub game_type: GameType,
}

impl From<&Game> for AvailableGame {
    fn from(game: &Game) -> Self {
        AvailableGame {
            game_id: game.game_id,
            player1_id: game.player1_id,
            player2_id: game.player2_id,
            game_type: game.game_type,
        }
    }
}
