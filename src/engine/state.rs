//! Lifecycle of a single match.
//!
//! ```text
//! WaitingForPlayer --join--> PlayerTurn --move--> PlayerWon | Draw
//!                            (pvc starts here)
//! ```
//!
//! Terminal states accept neither joins nor moves.

use chrono::{DateTime, Utc};
use log::debug;
use uuid::Uuid;

use crate::engine::minimax;
use crate::errors::GameError;
use crate::models::board::{Board, Cell, Symbol};
use crate::models::game::{Game, GameState, GameType};

impl Game {
    /// A fresh game. The creator always takes slot 1, plays X and moves first.
    pub fn new(game_id: Uuid, creator: Uuid, game_type: GameType, created_at: DateTime<Utc>) -> Game {
        let (game_state, current_player_id) = match game_type {
            GameType::Pvp => (GameState::WaitingForPlayer, None),
            GameType::Pvc => (GameState::PlayerTurn, Some(creator)),
        };
        Game {
            game_id,
            board: Board::new(),
            game_type,
            game_state,
            player1_id: creator,
            player2_id: None,
            player1_symbol: Symbol::X,
            player2_symbol: Symbol::O,
            current_player_id,
            winner_id: None,
            created_at,
        }
    }

    pub fn is_over(&self) -> bool {
        self.game_state.is_terminal()
    }

    pub fn is_player_turn(&self, player: Uuid) -> bool {
        self.game_state == GameState::PlayerTurn && self.current_player_id == Some(player)
    }

    pub fn symbol_of(&self, player: Uuid) -> Option<Symbol> {
        if player == self.player1_id {
            Some(self.player1_symbol)
        } else if Some(player) == self.player2_id {
            Some(self.player2_symbol)
        } else {
            None
        }
    }

    pub fn opponent_of(&self, player: Uuid) -> Option<Uuid> {
        if player == self.player1_id {
            self.player2_id
        } else if Some(player) == self.player2_id {
            Some(self.player1_id)
        } else {
            None
        }
    }

    pub fn join(&mut self, joiner: Uuid) -> Result<(), GameError> {
        if self.game_state != GameState::WaitingForPlayer {
            return Err(GameError::InvalidState("Game is not available for joining".to_string()));
        }
        if self.game_type != GameType::Pvp {
            return Err(GameError::InvalidState("Only PvP games can be joined".to_string()));
        }
        if joiner == self.player1_id {
            return Err(GameError::InvalidState("Cannot join your own game".to_string()));
        }

        self.player2_id = Some(joiner);
        self.game_state = GameState::PlayerTurn;
        self.current_player_id = Some(self.player1_id);
        Ok(())
    }

    /// Checks whether `mover` may move now, without looking at any board.
    pub fn check_turn(&self, mover: Uuid) -> Result<(), GameError> {
        if self.is_over() {
            return Err(GameError::InvalidState("Game is already over".to_string()));
        }
        if !self.is_player_turn(mover) {
            return Err(GameError::InvalidState("Not your turn".to_string()));
        }
        Ok(())
    }

    /// Replaces the board with the mover's submitted board and settles the outcome.
    ///
    /// The submitted board must equal the current one except for a single
    /// previously empty cell now holding the mover's symbol. In a PvP game the
    /// turn passes to the opponent; in a PvC game the human keeps the turn
    /// until `play_computer_turn` runs.
    pub fn apply_move(&mut self, mover: Uuid, board: Board) -> Result<(), GameError> {
        self.check_turn(mover)?;
        let symbol = self
            .symbol_of(mover)
            .ok_or_else(|| GameError::InvalidState("Not a player of this game".to_string()))?;

        match self.board.changed_cells(&board).as_slice() {
            [(row, col)] if self.board.get(*row, *col) == Cell::Empty
                && board.get(*row, *col) == Cell::Taken(symbol) => {}
            [] => return Err(GameError::InvalidInput("board does not contain a new mark".to_string())),
            _ => {
                return Err(GameError::InvalidInput(
                    "board must differ by exactly one new mark of your symbol".to_string(),
                ))
            }
        }

        self.board = board;
        self.update_outcome();

        if !self.is_over() && self.game_type == GameType::Pvp {
            self.current_player_id = self.opponent_of(mover);
        }
        Ok(())
    }

    /// Lets the computer answer in a PvC game. Returns the cell it marked,
    /// or `None` if there was nothing to do.
    pub fn play_computer_turn(&mut self) -> Option<(usize, usize)> {
        if self.game_type != GameType::Pvc || self.is_over() {
            return None;
        }

        let computer = self.player2_symbol;
        let (row, col) = minimax::best_move(&self.board, computer)?;
        debug!("computer plays ({row}, {col}) in game {}", self.game_id);

        self.board.set(row, col, computer.into());
        self.update_outcome();
        if !self.is_over() {
            self.current_player_id = Some(self.player1_id);
        }
        Some((row, col))
    }

    // Win by line, then draw by full board. A computer win names no winner
    fn update_outcome(&mut self) {
        if let Some(symbol) = self.board.check_winner() {
            self.winner_id = if symbol == self.player1_symbol {
                Some(self.player1_id)
            } else {
                match self.game_type {
                    GameType::Pvp => self.player2_id,
                    GameType::Pvc => None,
                }
            };
            self.game_state = GameState::PlayerWon;
            self.current_player_id = None;
        } else if self.board.is_full() {
            self.game_state = GameState::Draw;
            self.current_player_id = None;
            self.winner_id = None;
        }
    }
}
