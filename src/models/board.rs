use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::GameError;

pub const SIZE: usize = 3;

// The mark a player slot puts on the board. Stored and sent as 1 (X) and 2 (O)
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(into = "u8", try_from = "u8")]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    pub fn opposite(self) -> Symbol {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }
}

impl From<Symbol> for u8 {
    fn from(symbol: Symbol) -> u8 {
        match symbol {
            Symbol::X => 1,
            Symbol::O => 2,
        }
    }
}

impl TryFrom<u8> for Symbol {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Symbol::X),
            2 => Ok(Symbol::O),
            other => Err(format!("invalid symbol value {other}")),
        }
    }
}

// A single square. Stored and sent as 0 (empty), 1 (X) or 2 (O)
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(into = "u8", try_from = "u8")]
pub enum Cell {
    #[default]
    Empty,
    Taken(Symbol),
}

impl From<Symbol> for Cell {
    fn from(symbol: Symbol) -> Cell {
        Cell::Taken(symbol)
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> u8 {
        match cell {
            Cell::Empty => 0,
            Cell::Taken(symbol) => symbol.into(),
        }
    }
}

impl TryFrom<u8> for Cell {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Cell::Empty),
            other => Symbol::try_from(other)
                .map(Cell::Taken)
                .map_err(|_| format!("invalid cell value {other}")),
        }
    }
}

/// The 3x3 playing field. Always exactly three rows of three cells.
///
/// `Board` is `Copy`, so search code can place a mark on its own copy
/// without touching the caller's board.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct Board([[Cell; SIZE]; SIZE]);

// Every line that wins the game: rows, columns, then both diagonals
const LINES: [[(usize, usize); 3]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from raw request rows, rejecting anything that is not
    /// three rows of three values in {0, 1, 2}.
    pub fn from_rows(rows: &[Vec<i64>]) -> Result<Self, GameError> {
        if rows.len() != SIZE || rows.iter().any(|row| row.len() != SIZE) {
            return Err(GameError::InvalidInput("board must be a 3x3 array".to_string()));
        }

        let mut board = Board::new();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let cell = u8::try_from(*value)
                    .map_err(|_| format!("invalid cell value {value}"))
                    .and_then(Cell::try_from)
                    .map_err(GameError::InvalidInput)?;
                board.0[r][c] = cell;
            }
        }
        Ok(board)
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.0[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.0[row][col] = cell;
    }

    /// Empty squares in row-major order.
    pub fn empty_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..SIZE)
            .flat_map(|r| (0..SIZE).map(move |c| (r, c)))
            .filter(move |&(r, c)| self.0[r][c] == Cell::Empty)
    }

    pub fn is_full(&self) -> bool {
        self.empty_cells().next().is_none()
    }

    /// Returns the symbol owning a complete row, column or diagonal.
    pub fn check_winner(&self) -> Option<Symbol> {
        for [a, b, c] in LINES {
            let first = self.get(a.0, a.1);
            if let Cell::Taken(symbol) = first {
                if first == self.get(b.0, b.1) && first == self.get(c.0, c.1) {
                    return Some(symbol);
                }
            }
        }
        None
    }

    /// Cells whose value differs between `self` and `other`, row-major.
    pub fn changed_cells(&self, other: &Board) -> Vec<(usize, usize)> {
        (0..SIZE)
            .flat_map(|r| (0..SIZE).map(move |c| (r, c)))
            .filter(|&(r, c)| self.0[r][c] != other.0[r][c])
            .collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.0.iter().enumerate() {
            let line: Vec<String> = row.iter().map(|cell| u8::from(*cell).to_string()).collect();
            write!(f, "{}", line.join(","))?;
            if r + 1 < SIZE {
                write!(f, "/")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: [[i64; 3]; 3]) -> Board {
        let rows: Vec<Vec<i64>> = rows.iter().map(|row| row.to_vec()).collect();
        Board::from_rows(&rows).unwrap()
    }

    #[test]
    fn empty_board_has_no_winner() {
        assert_eq!(Board::new().check_winner(), None);
        assert!(!Board::new().is_full());
        assert_eq!(Board::new().empty_cells().count(), 9);
    }

    #[test]
    fn every_line_is_detected() {
        for line in LINES {
            let mut b = Board::new();
            for (r, c) in line {
                b.set(r, c, Symbol::O.into());
            }
            assert_eq!(b.check_winner(), Some(Symbol::O), "line {line:?}");
        }
    }

    #[test]
    fn mixed_line_is_not_a_win() {
        let b = board([[1, 1, 2], [0, 0, 0], [0, 0, 0]]);
        assert_eq!(b.check_winner(), None);
    }

    #[test]
    fn full_board_without_winner() {
        let b = board([[1, 2, 1], [1, 2, 2], [2, 1, 1]]);
        assert!(b.is_full());
        assert_eq!(b.check_winner(), None);
    }

    #[test]
    fn rejects_wrong_shape() {
        let two_rows = vec![vec![0, 0, 0], vec![0, 0, 0]];
        assert!(matches!(Board::from_rows(&two_rows), Err(GameError::InvalidInput(_))));

        let short_row = vec![vec![0, 0, 0], vec![0, 0], vec![0, 0, 0]];
        assert!(matches!(Board::from_rows(&short_row), Err(GameError::InvalidInput(_))));
    }

    #[test]
    fn rejects_unknown_cell_values() {
        let rows = vec![vec![0, 0, 3], vec![0, 0, 0], vec![0, 0, 0]];
        assert!(matches!(Board::from_rows(&rows), Err(GameError::InvalidInput(_))));

        let rows = vec![vec![0, -1, 0], vec![0, 0, 0], vec![0, 0, 0]];
        assert!(matches!(Board::from_rows(&rows), Err(GameError::InvalidInput(_))));
    }

    #[test]
    fn serializes_as_nested_integers() {
        let b = board([[1, 0, 0], [0, 2, 0], [0, 0, 0]]);
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, "[[1,0,0],[0,2,0],[0,0,0]]");

        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
        assert!(serde_json::from_str::<Board>("[[0,0],[0,0,0],[0,0,0]]").is_err());
    }

    #[test]
    fn changed_cells_lists_differences() {
        let before = Board::new();
        let after = board([[0, 0, 0], [0, 1, 0], [0, 0, 2]]);
        assert_eq!(before.changed_cells(&after), vec![(1, 1), (2, 2)]);
    }
}
