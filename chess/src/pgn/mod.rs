//! PGN reading: tokenizer, SAN resolution and the game-tree parser.

pub mod error;
pub mod headers;
pub(crate) mod lexer;
pub mod nag;
pub mod parser;
pub mod san;
pub mod tree;

pub use error::{PgnError, PgnErrorKind, SyntaxError};
pub use headers::{GameHeaders, Tag};
pub use parser::{
    parse_game, parse_game_with_options, parse_games, ParserOptions, PgnDocument, PgnReader,
    DEFAULT_MAX_VARIATION_DEPTH,
};
pub use san::{parse_san, ResolvedMove, SanError};
pub use tree::{GameResult, MoveNode, MoveTree, NodeId, ParentRef, Variation, VariationId};
