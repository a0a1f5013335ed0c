//! Computer opponent: exhaustive minimax over the 3x3 board.
//!
//! A position where the computer has a line scores `10 - depth`, one where
//! the opponent has a line scores `depth - 10` and a full board scores 0.
//! Depth counts plies below the root candidate, so quick wins beat slow ones
//! and slow losses beat quick ones. The search space is at most 9! leaves,
//! small enough that no pruning is done.

use log::debug;

use crate::models::board::{Board, Symbol};

const WIN_SCORE: i32 = 10;

/// Picks the computer's move. Ties go to the first candidate in row-major
/// order. Returns `None` when the board has no empty cell.
pub fn best_move(board: &Board, computer: Symbol) -> Option<(usize, usize)> {
    let mut best: Option<((usize, usize), i32)> = None;

    for (row, col) in board.empty_cells() {
        let mut candidate = *board;
        candidate.set(row, col, computer.into());
        let score = minimax(candidate, 0, false, computer);
        debug!("candidate ({row}, {col}) scores {score}");

        // strictly greater keeps the earliest candidate on ties
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some(((row, col), score));
        }
    }

    best.map(|(cell, _)| cell)
}

/// Scores `board` from the computer's point of view.
/// `maximizing` is true when the computer is the side to move.
pub fn minimax(board: Board, depth: i32, maximizing: bool, computer: Symbol) -> i32 {
    match board.check_winner() {
        Some(symbol) if symbol == computer => return WIN_SCORE - depth,
        Some(_) => return depth - WIN_SCORE,
        None if board.is_full() => return 0,
        None => {}
    }

    let mover = if maximizing { computer } else { computer.opposite() };
    let scores = board.empty_cells().map(|(row, col)| {
        let mut next = board;
        next.set(row, col, mover.into());
        minimax(next, depth + 1, !maximizing, computer)
    });

    if maximizing {
        scores.max().unwrap_or(0)
    } else {
        scores.min().unwrap_or(0)
    }
}
