use async_trait::async_trait;
use log::{debug, error};
use sqlx::MySqlPool;
use uuid::Uuid;

use super::{GameFilter, GameStore, StoreError, UserStore};
use crate::models::game::{Game, GameRow, GameState};
use crate::models::user::{User, UserRow};

// SQLSTATE MySQL reports for a unique key violation
const DUPLICATE_KEY: &str = "23000";

const GAME_COLUMNS: &str = "game_id, board, game_type, game_state, player1_id, player2_id, \
    player1_symbol, player2_symbol, current_player_id, winner_id, created_at";

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    // Connect and bring the schema up to date
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = MySqlPool::connect(database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        debug!("database migrations applied");
        Ok(Self::new(pool))
    }
}

fn rows_to_games(rows: Vec<GameRow>) -> Result<Vec<Game>, StoreError> {
    rows.into_iter().map(Game::try_from).collect()
}

#[async_trait]
impl GameStore for MySqlStore {
    async fn get_game(&self, game_id: Uuid) -> Result<Option<Game>, StoreError> {
        let sql = format!("SELECT {GAME_COLUMNS} FROM games WHERE game_id = ?");
        let row = sqlx::query_as::<_, GameRow>(&sql)
            .bind(game_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Game::try_from).transpose()
    }

    async fn list_games(&self, filter: GameFilter) -> Result<Vec<Game>, StoreError> {
        let terminal = [GameState::PlayerWon.as_str(), GameState::Draw.as_str()];
        let open = [GameState::WaitingForPlayer.as_str(), GameState::PlayerTurn.as_str()];

        let rows = match filter {
            GameFilter::Open => {
                let sql = format!("SELECT {GAME_COLUMNS} FROM games WHERE game_state IN (?, ?) ORDER BY created_at ASC");
                sqlx::query_as::<_, GameRow>(&sql)
                    .bind(open[0])
                    .bind(open[1])
                    .fetch_all(&self.pool)
                    .await?
            }
            GameFilter::Completed => {
                let sql = format!("SELECT {GAME_COLUMNS} FROM games WHERE game_state IN (?, ?)");
                sqlx::query_as::<_, GameRow>(&sql)
                    .bind(terminal[0])
                    .bind(terminal[1])
                    .fetch_all(&self.pool)
                    .await?
            }
            GameFilter::CompletedBy(user_id) => {
                let sql = format!(
                    "SELECT {GAME_COLUMNS} FROM games WHERE (player1_id = ? OR player2_id = ?) \
                     AND game_state IN (?, ?) ORDER BY created_at DESC"
                );
                let user_id = user_id.to_string();
                sqlx::query_as::<_, GameRow>(&sql)
                    .bind(&user_id)
                    .bind(&user_id)
                    .bind(terminal[0])
                    .bind(terminal[1])
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows_to_games(rows)
    }

    async fn save_game(&self, game: &Game) -> Result<(), StoreError> {
        let row = GameRow::try_from(game)?;

        // Upsert. Type, players and symbols never change after creation but are rewritten anyway
        let sql = format!(
            "INSERT INTO games ({GAME_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON DUPLICATE KEY UPDATE board = VALUES(board), game_type = VALUES(game_type), \
             game_state = VALUES(game_state), player1_id = VALUES(player1_id), \
             player2_id = VALUES(player2_id), player1_symbol = VALUES(player1_symbol), \
             player2_symbol = VALUES(player2_symbol), current_player_id = VALUES(current_player_id), \
             winner_id = VALUES(winner_id)"
        );
        sqlx::query(&sql)
            .bind(row.game_id)
            .bind(row.board)
            .bind(row.game_type)
            .bind(row.game_state)
            .bind(row.player1_id)
            .bind(row.player2_id)
            .bind(row.player1_symbol)
            .bind(row.player2_symbol)
            .bind(row.current_player_id)
            .bind(row.winner_id)
            .bind(row.created_at)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                error!("Error saving game {}: {:?}", game.game_id, err);
                StoreError::from(err)
            })?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for MySqlStore {
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = "SELECT user_id, login, password_hash FROM users WHERE user_id = ?";
        let row = sqlx::query_as::<_, UserRow>(sql)
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        let sql = "SELECT user_id, login, password_hash FROM users WHERE login = ?";
        let row = sqlx::query_as::<_, UserRow>(sql)
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let sql = "INSERT INTO users (user_id, login, password_hash) VALUES (?, ?, ?)";
        match sqlx::query(sql)
            .bind(user.user_id.to_string())
            .bind(&user.login)
            .bind(&user.password_hash)
            .execute(&self.pool)
            .await
        {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some(DUPLICATE_KEY) => {
                Err(StoreError::Duplicate(format!("login {}", user.login)))
            }
            Err(err) => Err(err.into()),
        }
    }
}
