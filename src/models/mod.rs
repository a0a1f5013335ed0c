pub mod board;
pub mod game;
pub mod leaderboard;
pub mod user;
