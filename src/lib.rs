//! Tic-tac-toe game server: player-vs-player and player-vs-computer matches
//! over a JSON http api with bearer-token authentication and a leaderboard.

use axum::{routing::{get, post}, Router};
use std::sync::Arc;

pub mod config;
pub mod controllers;
pub mod engine;
pub mod errors;
pub mod models;
pub mod services;
pub mod store;

use crate::config::Config;
use crate::services::{AuthService, GameService, JwtProvider};
use crate::store::{GameStore, UserStore};

// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub games: GameService,
}

impl AppState {
    pub fn new(config: &Config, games: Arc<dyn GameStore>, users: Arc<dyn UserStore>) -> Self {
        let jwt = JwtProvider::new(
            config.jwt_secret.clone(),
            config.access_token_duration,
            config.refresh_token_duration,
        );
        AppState {
            auth: AuthService::new(users.clone(), jwt, config.bcrypt_cost),
            games: GameService::new(games, users),
        }
    }
}

// Define routes
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/auth/register", post(controllers::auth::register))
        .route("/auth/login", post(controllers::auth::login))
        .route("/auth/refresh-access", post(controllers::auth::refresh_access))
        .route("/auth/refresh", post(controllers::auth::refresh))
        .route("/auth/me", get(controllers::auth::me))
        .route("/user/:user_id", get(controllers::user::get_user))
        .route("/game/create", post(controllers::game::create_game))
        .route("/game/available", get(controllers::game::available_games))
        .route("/game/history", get(controllers::game::game_history))
        .route("/game/leaderboard", get(controllers::game::leaderboard))
        .route("/game/:game_id", get(controllers::game::get_game))
        .route("/game/:game_id/join", post(controllers::game::join_game))
        .route("/game/:game_id/move", post(controllers::game::make_move))
        .with_state(state)
}
