pub mod fen;
pub mod pgn;
pub mod position;
pub mod types;

pub use fen::{FenError, FenErrorKind};
pub use pgn::{
    parse_game, parse_games, GameHeaders, GameResult, MoveNode, MoveTree, NodeId, PgnDocument,
    PgnError, PgnErrorKind, PgnReader, Tag, Variation, VariationId,
};
pub use position::{CastlingRights, Position};
pub use types::{Piece, PieceColor, PieceKind, Square};
