//! Durable storage for games and users.
//!
//! The services only need get-by-id, list-by-predicate and upsert for games,
//! and lookup plus insert for users. `MySqlStore` is the production backend,
//! `MemoryStore` keeps everything in process.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{game::Game, user::User};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("duplicate record: {0}")]
    Duplicate(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Predicates the game listing supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameFilter {
    /// Waiting for a player or in progress, oldest first.
    Open,
    /// Won or drawn, any order.
    Completed,
    /// Won or drawn with the user in either slot, newest first.
    CompletedBy(Uuid),
}

impl GameFilter {
    pub fn matches(&self, game: &Game) -> bool {
        match self {
            GameFilter::Open => !game.game_state.is_terminal(),
            GameFilter::Completed => game.game_state.is_terminal(),
            GameFilter::CompletedBy(user_id) => {
                game.game_state.is_terminal()
                    && (game.player1_id == *user_id || game.player2_id == Some(*user_id))
            }
        }
    }
}

#[async_trait]
pub trait GameStore: Send + Sync {
    async fn get_game(&self, game_id: Uuid) -> Result<Option<Game>, StoreError>;

    async fn list_games(&self, filter: GameFilter) -> Result<Vec<Game>, StoreError>;

    /// Inserts the game or overwrites the stored one with the same id.
    async fn save_game(&self, game: &Game) -> Result<(), StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError>;

    /// Fails with `StoreError::Duplicate` when the login is taken.
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
}
