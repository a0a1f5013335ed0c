//! Game rules: the match state machine and the computer opponent.

pub mod minimax;
pub mod state;

pub use minimax::best_move;
