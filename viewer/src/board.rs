//! Board diagrams.
//!
//! A [`BoardView`] is a pure description of one diagram: the square grid in
//! display order, optional coordinate labels and the side-to-move marker.
//! Materializing it (images, terminal cells, ...) is up to the host.

use serde::{Serialize, Serializer};

use chess::{FenError, Piece, PieceColor, Position, Square};

use crate::config::{clamp_square_size, DEFAULT_SQUARE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct BoardOptions {
    pub square_size: u32,
    pub show_coordinates: bool,
    /// Black at the bottom.
    pub flip: bool,
}

impl Default for BoardOptions {
    fn default() -> Self {
        Self {
            square_size: DEFAULT_SQUARE_SIZE,
            show_coordinates: false,
            flip: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SquareShade {
    Light,
    Dark,
}

impl SquareShade {
    /// a1 is dark.
    pub fn of(square: Square) -> Self {
        if (square.rank() + square.file()) % 2 == 0 {
            Self::Dark
        } else {
            Self::Light
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SquareView {
    #[serde(serialize_with = "serialize_square")]
    pub square: Square,
    pub shade: SquareShade,
    /// Sprite reference: `wk`, `bq`, ... or `clear` for an empty square.
    pub sprite: &'static str,
    #[serde(skip)]
    pub piece: Option<Piece>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    pub square_size: u32,
    /// Rows from the top of the diagram down.
    pub rows: Vec<Vec<SquareView>>,
    /// One label per row, shown on the left.
    pub rank_labels: Option<Vec<char>>,
    /// One label per column, shown below.
    pub file_labels: Option<Vec<char>>,
    pub side_to_move: PieceColor,
    /// Sprite of the side-to-move marker.
    pub turn_sprite: &'static str,
}

fn serialize_square<S: Serializer>(square: &Square, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(square)
}

/// Sprite reference for a square's content.
pub fn sprite(piece: Option<Piece>) -> &'static str {
    use chess::PieceColor::{Black, White};
    use chess::PieceKind::{Bishop, King, Knight, Pawn, Queen, Rook};

    match piece.map(|p| (p.color, p.kind)) {
        Some((White, King)) => "wk",
        Some((White, Queen)) => "wq",
        Some((White, Rook)) => "wr",
        Some((White, Bishop)) => "wb",
        Some((White, Knight)) => "wn",
        Some((White, Pawn)) => "wp",
        Some((Black, King)) => "bk",
        Some((Black, Queen)) => "bq",
        Some((Black, Rook)) => "br",
        Some((Black, Bishop)) => "bb",
        Some((Black, Knight)) => "bn",
        Some((Black, Pawn)) => "bp",
        None => "clear",
    }
}

/// Build the diagram for `position`.
pub fn render_board(position: &Position, options: &BoardOptions) -> BoardView {
    let ranks: Vec<u8> = if options.flip {
        (0..8).collect()
    } else {
        (0..8).rev().collect()
    };
    let files: Vec<u8> = if options.flip {
        (0..8).rev().collect()
    } else {
        (0..8).collect()
    };

    let rows = ranks
        .iter()
        .map(|&rank| {
            files
                .iter()
                .filter_map(|&file| Square::new(file, rank))
                .map(|square| {
                    let piece = position.piece_at(square);
                    SquareView {
                        square,
                        shade: SquareShade::of(square),
                        sprite: sprite(piece),
                        piece,
                    }
                })
                .collect()
        })
        .collect();

    let (rank_labels, file_labels) = if options.show_coordinates {
        (
            Some(ranks.iter().map(|r| (b'1' + r) as char).collect()),
            Some(files.iter().map(|f| (b'a' + f) as char).collect()),
        )
    } else {
        (None, None)
    };

    let side_to_move = position.side_to_move();
    BoardView {
        square_size: clamp_square_size(options.square_size),
        rows,
        rank_labels,
        file_labels,
        side_to_move,
        turn_sprite: side_to_move.as_str(),
    }
}

/// Parse a FEN string and build its diagram.
pub fn render_fen(text: &str, options: &BoardOptions) -> Result<BoardView, FenError> {
    let position: Position = text.parse()?;
    Ok(render_board(&position, options))
}

impl BoardView {
    /// Plain-text diagram: FEN letters, `.` for empty squares.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (index, row) in self.rows.iter().enumerate() {
            if let Some(label) = self.rank_labels.as_ref().and_then(|labels| labels.get(index)) {
                out.push(*label);
                out.push(' ');
            }
            let cells: Vec<String> = row
                .iter()
                .map(|sq| sq.piece.map_or('.', Piece::to_fen_char).to_string())
                .collect();
            out.push_str(&cells.join(" "));
            out.push('\n');
        }
        if let Some(labels) = &self.file_labels {
            let cells: Vec<String> = labels.iter().map(char::to_string).collect();
            out.push_str("  ");
            out.push_str(&cells.join(" "));
            out.push('\n');
        }
        out.push_str(self.side_to_move.as_str());
        out.push_str(" to play\n");
        out
    }
}
