use chrono::{SubsecRound, Utc};
use log::{debug, info};
use std::{cmp::Ordering, collections::HashMap, sync::Arc};
use uuid::Uuid;

use crate::errors::GameError;
use crate::models::board::Board;
use crate::models::game::{Game, GameType};
use crate::models::leaderboard::LeaderStats;
use crate::store::{GameFilter, GameStore, UserStore};

pub const MAX_LEADERBOARD_LIMIT: i64 = 100;

/// Orchestrates the game lifecycle on top of the stores.
///
/// A PvC move is persisted in two writes, one after the human's mark and
/// one after the computer's answer. They are not wrapped in a transaction,
/// so a crash in between leaves the game waiting on the computer.
#[derive(Clone)]
pub struct GameService {
    games: Arc<dyn GameStore>,
    users: Arc<dyn UserStore>,
}

impl GameService {
    pub fn new(games: Arc<dyn GameStore>, users: Arc<dyn UserStore>) -> Self {
        Self { games, users }
    }

    pub async fn create_game(&self, player_id: Uuid, game_type: GameType) -> Result<Game, GameError> {
        // microseconds, which is what the database keeps
        let created_at = Utc::now().trunc_subsecs(6);
        let game = Game::new(Uuid::new_v4(), player_id, game_type, created_at);
        self.games.save_game(&game).await?;
        info!("game {} ({}) created by {}", game.game_id, game_type.as_str(), player_id);
        Ok(game)
    }

    pub async fn join_game(&self, game_id: Uuid, player_id: Uuid) -> Result<Game, GameError> {
        let mut game = self.load(game_id).await?;
        game.join(player_id)?;
        self.games.save_game(&game).await?;
        info!("player {} joined game {}", player_id, game_id);
        Ok(game)
    }

    pub async fn make_move(&self, game_id: Uuid, player_id: Uuid, rows: &[Vec<i64>]) -> Result<Game, GameError> {
        let mut game = self.load(game_id).await?;
        game.check_turn(player_id)?;

        let board = Board::from_rows(rows)?;
        game.apply_move(player_id, board)?;
        self.games.save_game(&game).await?;
        debug!("game {} after move by {}: {} ({})", game_id, player_id, game.board, game.game_state);

        if game.play_computer_turn().is_some() {
            self.games.save_game(&game).await?;
            debug!("game {} after computer move: {} ({})", game_id, game.board, game.game_state);
        }
        Ok(game)
    }

    pub async fn get_game(&self, game_id: Uuid) -> Result<Option<Game>, GameError> {
        Ok(self.games.get_game(game_id).await?)
    }

    pub async fn get_available_games(&self) -> Result<Vec<Game>, GameError> {
        Ok(self.games.list_games(GameFilter::Open).await?)
    }

    pub async fn get_completed_games_by_user(&self, user_id: Uuid) -> Result<Vec<Game>, GameError> {
        Ok(self.games.list_games(GameFilter::CompletedBy(user_id)).await?)
    }

    pub async fn get_leaderboard(&self, limit: i64) -> Result<Vec<LeaderStats>, GameError> {
        if limit < 1 {
            return Err(GameError::InvalidInput("limit must be greater than 0".to_string()));
        }
        if limit > MAX_LEADERBOARD_LIMIT {
            return Err(GameError::InvalidInput("limit must not exceed 100".to_string()));
        }

        let completed = self.games.list_games(GameFilter::Completed).await?;
        let ranked = rank_players(&completed, limit as usize);

        let mut leaders = Vec::with_capacity(ranked.len());
        for (user_id, wins, total) in ranked {
            // unknown users are listed under their id
            let login = match self.users.find_user_by_id(user_id).await? {
                Some(user) => user.login,
                None => user_id.to_string(),
            };
            leaders.push(LeaderStats { user_id, login, win_ratio: wins as f64 / total as f64, wins, total });
        }
        Ok(leaders)
    }

    async fn load(&self, game_id: Uuid) -> Result<Game, GameError> {
        self.games
            .get_game(game_id)
            .await?
            .ok_or_else(|| GameError::NotFound(format!("Game with ID {game_id} not found")))
    }
}

/// Tallies (user, wins, total) over finished games and orders them by win
/// ratio, then wins, both descending. Remaining ties go by user id.
pub fn rank_players(games: &[Game], limit: usize) -> Vec<(Uuid, u32, u32)> {
    let mut stats: HashMap<Uuid, (u32, u32)> = HashMap::new();

    for game in games.iter().filter(|game| game.is_over()) {
        for player in [Some(game.player1_id), game.player2_id].into_iter().flatten() {
            let entry = stats.entry(player).or_default();
            entry.1 += 1;
            if game.winner_id == Some(player) {
                entry.0 += 1;
            }
        }
    }

    let mut ranked: Vec<(Uuid, u32, u32)> =
        stats.into_iter().map(|(user_id, (wins, total))| (user_id, wins, total)).collect();

    ranked.sort_by(|a, b| {
        let ratio_a = a.1 as f64 / a.2 as f64;
        let ratio_b = b.1 as f64 / b.2 as f64;
        ratio_b
            .partial_cmp(&ratio_a)
            .unwrap_or(Ordering::Equal)
            .then(b.1.cmp(&a.1))
            .then(a.0.cmp(&b.0))
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::game::GameState;
    use crate::models::user::User;
    use crate::store::MemoryStore;

    fn service() -> (GameService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (GameService::new(store.clone(), store.clone()), store)
    }

    fn rows(board: [[i64; 3]; 3]) -> Vec<Vec<i64>> {
        board.iter().map(|row| row.to_vec()).collect()
    }

    fn finished(p1: Uuid, p2: Option<Uuid>, winner: Option<Uuid>) -> Game {
        let game_type = if p2.is_some() { GameType::Pvp } else { GameType::Pvc };
        let mut game = Game::new(Uuid::new_v4(), p1, game_type, Utc::now());
        game.player2_id = p2;
        game.game_state = if winner.is_some() { GameState::PlayerWon } else { GameState::Draw };
        game.winner_id = winner;
        game.current_player_id = None;
        game
    }

    #[tokio::test]
    async fn pvp_create_and_join() {
        let (service, store) = service();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

        let game = service.create_game(alice, GameType::Pvp).await.unwrap();
        assert_eq!(game.game_state, GameState::WaitingForPlayer);
        assert_eq!(service.get_available_games().await.unwrap().len(), 1);

        let err = service.join_game(game.game_id, alice).await;
        assert!(matches!(err, Err(GameError::InvalidState(_))));

        let joined = service.join_game(game.game_id, bob).await.unwrap();
        assert_eq!(joined.game_state, GameState::PlayerTurn);
        assert_eq!(joined.current_player_id, Some(alice));
        assert_eq!(store.get_game(game.game_id).await.unwrap(), Some(joined));
    }

    #[tokio::test]
    async fn unknown_game_is_not_found() {
        let (service, _) = service();
        let id = Uuid::new_v4();
        assert!(matches!(service.join_game(id, Uuid::new_v4()).await, Err(GameError::NotFound(_))));
        assert!(matches!(
            service.make_move(id, Uuid::new_v4(), &rows([[1, 0, 0], [0, 0, 0], [0, 0, 0]])).await,
            Err(GameError::NotFound(_))
        ));
        assert_eq!(service.get_game(id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn pvc_move_triggers_the_computer() {
        let (service, store) = service();
        let alice = Uuid::new_v4();
        let game = service.create_game(alice, GameType::Pvc).await.unwrap();

        let after = service
            .make_move(game.game_id, alice, &rows([[1, 0, 0], [0, 0, 0], [0, 0, 0]]))
            .await
            .unwrap();
        let stored = store.get_game(game.game_id).await.unwrap().unwrap();
        assert_eq!(after, stored);
        assert_eq!(after.board.empty_cells().count(), 7);
        assert_eq!(after.current_player_id, Some(alice));
    }

    #[tokio::test]
    async fn move_rejections_follow_precedence() {
        let (service, _) = service();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let game = service.create_game(alice, GameType::Pvp).await.unwrap();
        service.join_game(game.game_id, bob).await.unwrap();

        // not bob's turn, even with a malformed board
        let err = service.make_move(game.game_id, bob, &[vec![0, 0]]).await;
        assert!(matches!(err, Err(GameError::InvalidState(_))));

        let err = service.make_move(game.game_id, alice, &[vec![0, 0]]).await;
        assert!(matches!(err, Err(GameError::InvalidInput(_))));

        let moved = service
            .make_move(game.game_id, alice, &rows([[0, 0, 0], [0, 1, 0], [0, 0, 0]]))
            .await
            .unwrap();
        assert_eq!(moved.current_player_id, Some(bob));
    }

    #[tokio::test]
    async fn history_lists_finished_games_of_the_user() {
        let (service, store) = service();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        store.save_game(&finished(alice, Some(bob), Some(bob))).await.unwrap();
        store.save_game(&finished(bob, None, None)).await.unwrap();
        service.create_game(alice, GameType::Pvc).await.unwrap();

        assert_eq!(service.get_completed_games_by_user(alice).await.unwrap().len(), 1);
        assert_eq!(service.get_completed_games_by_user(bob).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn leaderboard_limits_are_enforced() {
        let (service, _) = service();
        for limit in [0, 101, -5] {
            assert!(matches!(service.get_leaderboard(limit).await, Err(GameError::InvalidInput(_))));
        }
        assert!(service.get_leaderboard(1).await.unwrap().is_empty());
        assert!(service.get_leaderboard(100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn leaderboard_ranks_by_ratio_then_wins() {
        let (service, store) = service();
        let alice = User { user_id: Uuid::new_v4(), login: "alice".into(), password_hash: "-".into() };
        store.insert_user(&alice).await.unwrap();
        let (a, b, c) = (alice.user_id, Uuid::new_v4(), Uuid::new_v4());

        // a wins 2 of 2, b wins 1 of 2, c wins 1 of 4
        store.save_game(&finished(a, Some(b), Some(a))).await.unwrap();
        store.save_game(&finished(a, Some(c), Some(a))).await.unwrap();
        store.save_game(&finished(c, Some(b), Some(b))).await.unwrap();
        store.save_game(&finished(c, None, Some(c))).await.unwrap();
        store.save_game(&finished(c, None, None)).await.unwrap();

        let board = service.get_leaderboard(10).await.unwrap();
        let order: Vec<Uuid> = board.iter().map(|s| s.user_id).collect();
        assert_eq!(order, vec![a, b, c]);
        assert_eq!(board[0].login, "alice");
        assert_eq!((board[0].wins, board[0].total), (2, 2));
        assert_eq!((board[1].wins, board[1].total), (1, 2));
        assert_eq!((board[2].wins, board[2].total), (1, 4));
        assert_eq!(board[2].win_ratio, 0.25);
        // unknown users are listed under their id
        assert_eq!(board[2].login, c.to_string());

        assert_eq!(service.get_leaderboard(1).await.unwrap().len(), 1);
    }

    #[test]
    fn ranking_breaks_ratio_ties_by_wins() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let games = vec![
            finished(a, None, Some(a)),
            finished(a, None, Some(a)),
            finished(b, None, Some(b)),
        ];
        let ranked = rank_players(&games, 10);
        assert_eq!(ranked, vec![(a, 2, 2), (b, 1, 1)]);
    }
}
