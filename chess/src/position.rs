//! Immutable board snapshot: placement, side to move, castling, en passant
//! and move counters.

use serde::{Deserialize, Serialize};

use crate::fen::{self, FenError};
use crate::types::{Piece, PieceColor, PieceKind, Square};

/// The four castling flags of a position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastlingRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastlingRights {
    pub const ALL: CastlingRights = CastlingRights {
        white_king_side: true,
        white_queen_side: true,
        black_king_side: true,
        black_queen_side: true,
    };

    pub fn is_empty(&self) -> bool {
        !(self.white_king_side
            || self.white_queen_side
            || self.black_king_side
            || self.black_queen_side)
    }
}

/// A chess position. Only syntax is guaranteed: a position may lack kings or
/// contain pawns on the back rank.
///
/// Serializes as its FEN string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Position {
    board: [Option<Piece>; 64],
    side_to_move: PieceColor,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Position {
    pub fn from_parts(
        board: [Option<Piece>; 64],
        side_to_move: PieceColor,
        castling: CastlingRights,
        en_passant: Option<Square>,
        halfmove_clock: u32,
        fullmove_number: u32,
    ) -> Self {
        Self {
            board,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        }
    }

    /// An empty board, White to move, no castling rights.
    pub fn empty() -> Self {
        Self::from_parts([None; 64], PieceColor::White, CastlingRights::default(), None, 0, 1)
    }

    /// The standard initial position.
    pub fn starting() -> Self {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut board = [None; 64];
        for (file, kind) in BACK_RANK.iter().enumerate() {
            board[file] = Some(Piece::new(*kind, PieceColor::White));
            board[8 + file] = Some(Piece::new(PieceKind::Pawn, PieceColor::White));
            board[48 + file] = Some(Piece::new(PieceKind::Pawn, PieceColor::Black));
            board[56 + file] = Some(Piece::new(*kind, PieceColor::Black));
        }
        Self::from_parts(board, PieceColor::White, CastlingRights::ALL, None, 0, 1)
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board[square.index()]
    }

    /// All 64 squares in index order (a1, b1, ..., h8).
    pub fn squares(&self) -> impl Iterator<Item = (Square, Option<Piece>)> + '_ {
        self.board
            .iter()
            .enumerate()
            .filter_map(|(index, piece)| Square::from_index(index).map(|sq| (sq, *piece)))
    }

    pub fn side_to_move(&self) -> PieceColor {
        self.side_to_move
    }

    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn to_fen(&self) -> String {
        fen::serialize(self)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

impl std::str::FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        fen::parse(s)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&fen::serialize(self))
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        fen::serialize(&position)
    }
}

impl TryFrom<String> for Position {
    type Error = FenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        fen::parse(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_position_layout() {
        let pos = Position::starting();
        let e1 = Square::parse("e1").unwrap();
        let d8 = Square::parse("d8").unwrap();
        assert_eq!(pos.piece_at(e1), Some(Piece::new(PieceKind::King, PieceColor::White)));
        assert_eq!(pos.piece_at(d8), Some(Piece::new(PieceKind::Queen, PieceColor::Black)));
        assert_eq!(pos.piece_at(Square::parse("e4").unwrap()), None);
        assert_eq!(pos.squares().filter(|(_, p)| p.is_some()).count(), 32);
        assert_eq!(pos.castling(), CastlingRights::ALL);
    }

    #[test]
    fn test_starting_position_fen() {
        assert_eq!(
            Position::starting().to_fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }

    #[test]
    fn test_serde_uses_fen_string() {
        let pos = Position::starting();
        let json = serde_json::to_string(&pos).unwrap();
        assert_eq!(json, "\"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1\"");
        let back: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pos);
    }

    #[test]
    fn test_empty_position_has_no_rights() {
        let pos = Position::empty();
        assert!(pos.castling().is_empty());
        assert_eq!(pos.en_passant(), None);
        assert_eq!(pos.to_fen(), "8/8/8/8/8/8/8/8 w - - 0 1");
    }
}
