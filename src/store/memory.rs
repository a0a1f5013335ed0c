use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{GameFilter, GameStore, StoreError, UserStore};
use crate::models::{game::Game, user::User};

// In-process store, used when no DATABASE_URL is configured and by the tests
#[derive(Default)]
pub struct MemoryStore {
    games: RwLock<HashMap<Uuid, Game>>,
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn get_game(&self, game_id: Uuid) -> Result<Option<Game>, StoreError> {
        Ok(self.games.read().await.get(&game_id).cloned())
    }

    async fn list_games(&self, filter: GameFilter) -> Result<Vec<Game>, StoreError> {
        let mut games: Vec<Game> = self
            .games
            .read()
            .await
            .values()
            .filter(|game| filter.matches(game))
            .cloned()
            .collect();

        match filter {
            GameFilter::CompletedBy(_) => games.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            _ => games.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }
        Ok(games)
    }

    async fn save_game(&self, game: &Game) -> Result<(), StoreError> {
        self.games.write().await.insert(game.game_id, game.clone());
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.values().find(|user| user.login == login).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        // check and insert under one write lock so two registrations can't both win
        let mut users = self.users.write().await;
        if users.values().any(|existing| existing.login == user.login) {
            return Err(StoreError::Duplicate(format!("login {}", user.login)));
        }
        users.insert(user.user_id, user.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::board::{Board, Symbol};
    use crate::models::game::{GameState, GameType};
    use chrono::{Duration, Utc};

    fn game(player: Uuid, state: GameState, age_minutes: i64) -> Game {
        Game {
            game_id: Uuid::new_v4(),
            board: Board::new(),
            game_type: GameType::Pvc,
            game_state: state,
            player1_id: player,
            player2_id: None,
            player1_symbol: Symbol::X,
            player2_symbol: Symbol::O,
            current_player_id: None,
            winner_id: None,
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[tokio::test]
    async fn saved_game_reloads_identically() {
        let store = MemoryStore::new();
        let mut g = game(Uuid::new_v4(), GameState::PlayerTurn, 0);
        g.board.set(0, 0, Symbol::X.into());
        store.save_game(&g).await.unwrap();

        assert_eq!(store.get_game(g.game_id).await.unwrap(), Some(g.clone()));

        g.game_state = GameState::Draw;
        store.save_game(&g).await.unwrap();
        assert_eq!(store.get_game(g.game_id).await.unwrap().unwrap().game_state, GameState::Draw);
        assert_eq!(store.list_games(GameFilter::Completed).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn completed_games_of_a_user_are_newest_first() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let old = game(alice, GameState::Draw, 30);
        let new = game(alice, GameState::PlayerWon, 5);
        let open = game(alice, GameState::PlayerTurn, 1);
        let other = game(Uuid::new_v4(), GameState::Draw, 2);
        for g in [&old, &new, &open, &other] {
            store.save_game(g).await.unwrap();
        }

        let ids: Vec<Uuid> = store
            .list_games(GameFilter::CompletedBy(alice))
            .await
            .unwrap()
            .iter()
            .map(|g| g.game_id)
            .collect();
        assert_eq!(ids, vec![new.game_id, old.game_id]);

        let open_games = store.list_games(GameFilter::Open).await.unwrap();
        assert_eq!(open_games.len(), 1);
        assert_eq!(open_games[0].game_id, open.game_id);
    }

    #[tokio::test]
    async fn duplicate_login_is_rejected() {
        let store = MemoryStore::new();
        let user = User { user_id: Uuid::new_v4(), login: "bob".into(), password_hash: "h".into() };
        store.insert_user(&user).await.unwrap();

        let clash = User { user_id: Uuid::new_v4(), ..user.clone() };
        assert!(matches!(store.insert_user(&clash).await, Err(StoreError::Duplicate(_))));
        assert_eq!(store.find_user_by_login("bob").await.unwrap(), Some(user.clone()));
        assert_eq!(store.find_user_by_id(user.user_id).await.unwrap(), Some(user));
    }
}
