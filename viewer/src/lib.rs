pub mod board;
pub mod config;
pub mod headers;
pub mod navigation;
pub mod symbols;
pub mod tree;

pub use board::{render_board, render_fen, BoardOptions, BoardView, SquareShade, SquareView};
pub use config::RenderConfig;
pub use headers::{format_headers, FullEvent, FullName, HeaderView, TagFormatter};
pub use navigation::{
    NavigationCommand, NavigationState, NavigationSurface, Navigator, SharedDiagram,
};
pub use symbols::SymbolSet;
pub use tree::{
    render_game, CommentarySegment, CommentaryStyle, CommentaryView, DiagramAttributes, GameView,
    MoveList, MoveView, RenderNode,
};
