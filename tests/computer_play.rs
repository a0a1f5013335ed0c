//! Whole games against the computer, driven through the game state machine.

use chrono::Utc;
use uuid::Uuid;

use tictactoe_server::engine::best_move;
use tictactoe_server::models::board::{Board, Cell, Symbol};
use tictactoe_server::models::game::{Game, GameState, GameType};

fn new_game() -> (Game, Uuid) {
    let human = Uuid::new_v4();
    (Game::new(Uuid::new_v4(), human, GameType::Pvc, Utc::now()), human)
}

fn with_mark(board: &Board, (row, col): (usize, usize), symbol: Symbol) -> Board {
    let mut next = *board;
    next.set(row, col, Cell::Taken(symbol));
    next
}

// Plays the human's moves picked by `pick` until the game ends
fn play_out(pick: impl Fn(&Board) -> (usize, usize)) -> (Game, Uuid) {
    let (mut game, human) = new_game();
    while !game.is_over() {
        let next = with_mark(&game.board, pick(&game.board), game.player1_symbol);
        game.apply_move(human, next).unwrap();
        game.play_computer_turn();
    }
    (game, human)
}

#[test]
fn optimal_play_is_a_draw() {
    let (game, _) = play_out(|board| best_move(board, Symbol::X).unwrap());
    assert_eq!(game.game_state, GameState::Draw);
    assert_eq!(game.winner_id, None);
    assert!(game.board.is_full());
}

#[test]
fn naive_player_loses_without_a_winner_id() {
    let (game, human) = play_out(|board| board.empty_cells().next().unwrap());
    assert_eq!(game.game_state, GameState::PlayerWon);
    assert_eq!(game.board.check_winner(), Some(Symbol::O));
    assert_eq!(game.winner_id, None);
    assert_ne!(game.current_player_id, Some(human));
}

// Walks every line of play open to the human
fn explore(game: &Game, human: Uuid, finished: &mut usize) {
    for cell in game.board.empty_cells() {
        let mut next = game.clone();
        next.apply_move(human, with_mark(&game.board, cell, Symbol::X)).unwrap();
        next.play_computer_turn();

        assert_ne!(next.board.check_winner(), Some(Symbol::X), "computer lost:\n{}", next.board);
        if next.is_over() {
            *finished += 1;
        } else {
            assert_eq!(next.current_player_id, Some(human));
            explore(&next, human, finished);
        }
    }
}

#[test]
fn computer_never_loses() {
    let (game, human) = new_game();
    let mut finished = 0;
    explore(&game, human, &mut finished);
    assert!(finished > 0);
}
