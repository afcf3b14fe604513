//! FEN codec.
//!
//! Validates syntax only. Missing halfmove/fullmove counters default to
//! `0` and `1`; castling flags are accepted in any order and written back
//! as `KQkq`.

use crate::position::{CastlingRights, Position};
use crate::types::{Piece, PieceColor, Square};

/// Parse a FEN string into a [`Position`].
pub fn parse(text: &str) -> Result<Position, FenError> {
    let fields = split_fields(text);
    let end = text.trim_end().len();

    let field = |index, kind| required_field(&fields, index, kind, end);

    let (board_offset, board_field) = field(0, FenErrorKind::MalformedBoard)?;
    let board = parse_board(board_field, board_offset)?;

    let (side_offset, side_field) = field(1, FenErrorKind::InvalidSideToMove)?;
    let side_to_move = match side_field {
        "w" | "W" => PieceColor::White,
        "b" | "B" => PieceColor::Black,
        _ => return Err(FenError::new(FenErrorKind::InvalidSideToMove, side_offset)),
    };

    let (castling_offset, castling_field) = field(2, FenErrorKind::InvalidCastling)?;
    let castling = parse_castling(castling_field, castling_offset)?;

    let (ep_offset, ep_field) = field(3, FenErrorKind::InvalidEnPassant)?;
    let en_passant = parse_en_passant(ep_field, ep_offset)?;

    let halfmove_clock = match fields.get(4) {
        Some(&(offset, value)) => parse_counter(value, offset)?,
        None => 0,
    };
    let fullmove_number = match fields.get(5) {
        Some(&(offset, value)) => parse_counter(value, offset)?,
        None => 1,
    };

    if let Some(&(offset, _)) = fields.get(6) {
        return Err(FenError::new(FenErrorKind::InvalidCounter, offset));
    }

    Ok(Position::from_parts(
        board,
        side_to_move,
        castling,
        en_passant,
        halfmove_clock,
        fullmove_number,
    ))
}

/// Serialize a [`Position`] to its canonical six-field FEN string.
pub fn serialize(position: &Position) -> String {
    let mut out = String::with_capacity(90);

    for rank in (0..8u8).rev() {
        let mut empty = 0;
        for file in 0..8u8 {
            let piece = Square::new(file, rank).and_then(|sq| position.piece_at(sq));
            match piece {
                Some(piece) => {
                    if empty > 0 {
                        out.push(char::from(b'0' + empty));
                        empty = 0;
                    }
                    out.push(piece.to_fen_char());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            out.push(char::from(b'0' + empty));
        }
        if rank > 0 {
            out.push('/');
        }
    }

    out.push(' ');
    out.push(match position.side_to_move() {
        PieceColor::White => 'w',
        PieceColor::Black => 'b',
    });

    out.push(' ');
    let castling = position.castling();
    if castling.is_empty() {
        out.push('-');
    } else {
        for (flag, c) in [
            (castling.white_king_side, 'K'),
            (castling.white_queen_side, 'Q'),
            (castling.black_king_side, 'k'),
            (castling.black_queen_side, 'q'),
        ] {
            if flag {
                out.push(c);
            }
        }
    }

    out.push(' ');
    match position.en_passant() {
        Some(square) => out.push_str(&square.to_string()),
        None => out.push('-'),
    }

    out.push_str(&format!(
        " {} {}",
        position.halfmove_clock(),
        position.fullmove_number()
    ));
    out
}

fn required_field<'a>(
    fields: &[(usize, &'a str)],
    index: usize,
    kind: FenErrorKind,
    end: usize,
) -> Result<(usize, &'a str), FenError> {
    fields
        .get(index)
        .copied()
        .ok_or(FenError::new(kind, end))
}

/// Whitespace-separated fields with their byte offsets in the input.
fn split_fields(text: &str) -> Vec<(usize, &str)> {
    let mut fields = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                fields.push((s, &text[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        fields.push((s, &text[s..]));
    }
    fields
}

fn parse_board(field: &str, offset: usize) -> Result<[Option<Piece>; 64], FenError> {
    let malformed = |at: usize| FenError::new(FenErrorKind::MalformedBoard, offset + at);

    let mut board = [None; 64];
    let mut rank_start = 0;
    let mut rank_count = 0;

    for rank_str in field.split('/') {
        if rank_count == 8 {
            return Err(malformed(rank_start));
        }
        let rank = 7 - rank_count;
        let mut file = 0u8;
        let mut previous_was_digit = false;

        for (i, c) in rank_str.char_indices() {
            let at = rank_start + i;
            if let Some(run) = c.to_digit(10) {
                if !(1..=8).contains(&run) || previous_was_digit {
                    return Err(malformed(at));
                }
                file += run as u8;
                if file > 8 {
                    return Err(malformed(at));
                }
                previous_was_digit = true;
            } else {
                let piece = Piece::from_fen_char(c).ok_or_else(|| malformed(at))?;
                let square = Square::new(file, rank).ok_or_else(|| malformed(at))?;
                board[square.index()] = Some(piece);
                file += 1;
                previous_was_digit = false;
            }
        }

        if file != 8 {
            return Err(malformed(rank_start));
        }
        rank_count += 1;
        rank_start += rank_str.len() + 1;
    }

    if rank_count != 8 {
        return Err(malformed(field.len()));
    }
    Ok(board)
}

fn parse_castling(field: &str, offset: usize) -> Result<CastlingRights, FenError> {
    let mut rights = CastlingRights::default();
    if field == "-" {
        return Ok(rights);
    }

    for (i, c) in field.char_indices() {
        let flag = match c {
            'K' => &mut rights.white_king_side,
            'Q' => &mut rights.white_queen_side,
            'k' => &mut rights.black_king_side,
            'q' => &mut rights.black_queen_side,
            _ => return Err(FenError::new(FenErrorKind::InvalidCastling, offset + i)),
        };
        if *flag {
            return Err(FenError::new(FenErrorKind::InvalidCastling, offset + i));
        }
        *flag = true;
    }
    Ok(rights)
}

fn parse_en_passant(field: &str, offset: usize) -> Result<Option<Square>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    match Square::parse(field) {
        Some(square) if square.rank() == 2 || square.rank() == 5 => Ok(Some(square)),
        _ => Err(FenError::new(FenErrorKind::InvalidEnPassant, offset)),
    }
}

fn parse_counter(field: &str, offset: usize) -> Result<u32, FenError> {
    if !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FenError::new(FenErrorKind::InvalidCounter, offset));
    }
    field
        .parse()
        .map_err(|_| FenError::new(FenErrorKind::InvalidCounter, offset))
}

/// Which FEN field failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FenErrorKind {
    #[error("malformed board")]
    MalformedBoard,
    #[error("invalid side to move")]
    InvalidSideToMove,
    #[error("invalid castling rights")]
    InvalidCastling,
    #[error("invalid en passant square")]
    InvalidEnPassant,
    #[error("invalid move counter")]
    InvalidCounter,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid FEN: {kind} at byte {offset}")]
pub struct FenError {
    pub kind: FenErrorKind,
    pub offset: usize,
}

impl FenError {
    pub fn new(kind: FenErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}
