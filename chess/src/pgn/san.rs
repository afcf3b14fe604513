//! Standard Algebraic Notation: resolving move text against a position and
//! producing canonical notation for the resolved move.
//!
//! Legal move generation is delegated to cozy-chess. Positions are handed
//! over through FEN, and the resulting position is read back square by
//! square, with en passant and counters maintained here so that they follow
//! the FEN conventions used everywhere else in the crate.

use cozy_chess::{Board, Color, GameStatus, Move, Piece};

use crate::position::{CastlingRights, Position};
use crate::types::{PieceColor, PieceKind, Square};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanError {
    #[error("no legal move matches")]
    NoLegalMove,
    #[error("{0} legal moves match")]
    AmbiguousMove(usize),
    #[error("invalid format")]
    InvalidFormat,
    #[error("invalid square {0:?}")]
    InvalidSquare(String),
    #[error("missing or invalid promotion")]
    InvalidPromotion,
    #[error("position cannot be played from")]
    InvalidPosition,
}

/// A move resolved against its parent position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMove {
    /// Canonical SAN, including disambiguation and check suffix.
    pub san: String,
    pub from: Square,
    pub to: Square,
    pub piece: PieceKind,
    /// Position after the move.
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Castle {
    Short,
    Long,
}

/// Move text broken into its components.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SanPattern {
    Castle(Castle),
    Normal {
        piece: PieceKind,
        from_file: Option<u8>,
        from_rank: Option<u8>,
        to: Square,
        promotion: Option<PieceKind>,
    },
}

/// Resolve `san` against `position`. Exactly one legal move must match.
///
/// Check and annotation suffixes are ignored; castling may be spelled with
/// letter O or digit zero; the `=` before a promotion piece and the capture
/// marker are optional.
pub fn parse_san(position: &Position, san: &str) -> Result<ResolvedMove, SanError> {
    let pattern = parse_pattern(san)?;
    let board = to_board(position)?;
    let side = board.side_to_move();

    let mut legal = Vec::new();
    board.generate_moves(|moves| {
        legal.extend(moves);
        false
    });

    let candidates: Vec<Move> = legal
        .iter()
        .copied()
        .filter(|mv| matches_pattern(&board, side, *mv, &pattern))
        .collect();

    let mv = match candidates.as_slice() {
        [mv] => *mv,
        [] => {
            if let SanPattern::Normal {
                piece: PieceKind::Pawn,
                promotion: None,
                to,
                ..
            } = pattern
            {
                let last_rank = if side == Color::White { 7 } else { 0 };
                if to.rank() == last_rank {
                    return Err(SanError::InvalidPromotion);
                }
            }
            return Err(SanError::NoLegalMove);
        }
        many => return Err(SanError::AmbiguousMove(many.len())),
    };

    let piece = board.piece_on(mv.from).ok_or(SanError::NoLegalMove)?;
    let canonical = format_san(&board, mv, &legal);
    let next = apply(position, &board, mv);

    tracing::trace!(input = san, san = %canonical, "resolved move");
    Ok(ResolvedMove {
        san: canonical,
        from: mv.from.into(),
        to: king_destination(&board, mv).into(),
        piece: piece.into(),
        position: next,
    })
}

fn parse_pattern(san: &str) -> Result<SanPattern, SanError> {
    let text = san.trim_end_matches(['+', '#', '!', '?']);
    match text {
        "O-O" | "0-0" => return Ok(SanPattern::Castle(Castle::Short)),
        "O-O-O" | "0-0-0" => return Ok(SanPattern::Castle(Castle::Long)),
        _ => {}
    }

    let mut chars: Vec<char> = text.chars().filter(|c| !matches!(c, 'x' | ':' | '-')).collect();
    if chars.is_empty() {
        return Err(SanError::InvalidFormat);
    }

    let piece = match chars[0] {
        'K' | 'Q' | 'R' | 'B' | 'N' => {
            PieceKind::from_char(chars.remove(0)).ok_or(SanError::InvalidFormat)?
        }
        'a'..='h' => PieceKind::Pawn,
        _ => return Err(SanError::InvalidFormat),
    };

    let mut promotion = None;
    if let Some(&last) = chars.last() {
        if last.is_ascii_alphabetic() && last.is_ascii_uppercase() {
            let kind = PieceKind::from_char(last).ok_or(SanError::InvalidPromotion)?;
            if piece != PieceKind::Pawn || matches!(kind, PieceKind::King | PieceKind::Pawn) {
                return Err(SanError::InvalidPromotion);
            }
            promotion = Some(kind);
            chars.pop();
            if chars.last() == Some(&'=') {
                chars.pop();
            }
        }
    }
    if chars.contains(&'=') {
        return Err(SanError::InvalidFormat);
    }

    if chars.len() < 2 {
        return Err(SanError::InvalidFormat);
    }
    let split = chars.len() - 2;
    let target: String = chars[split..].iter().collect();
    let to = Square::parse(&target).ok_or_else(|| SanError::InvalidSquare(target.clone()))?;

    let mut from_file = None;
    let mut from_rank = None;
    for c in &chars[..split] {
        match c {
            'a'..='h' if from_file.is_none() => from_file = Some(*c as u8 - b'a'),
            '1'..='8' if from_rank.is_none() => from_rank = Some(*c as u8 - b'1'),
            _ => return Err(SanError::InvalidFormat),
        }
    }

    Ok(SanPattern::Normal {
        piece,
        from_file,
        from_rank,
        to,
        promotion,
    })
}

fn is_castle(board: &Board, side: Color, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::King) && board.color_on(mv.to) == Some(side)
}

/// Castling toward the h-file. Only meaningful when `is_castle` holds.
fn is_short_castle(mv: Move) -> bool {
    Square::from(mv.to).file() > Square::from(mv.from).file()
}

/// Castling moves target the rook; report the king's landing square instead.
fn king_destination(board: &Board, mv: Move) -> cozy_chess::Square {
    if !is_castle(board, board.side_to_move(), mv) {
        return mv.to;
    }
    let file = if is_short_castle(mv) {
        cozy_chess::File::G
    } else {
        cozy_chess::File::C
    };
    cozy_chess::Square::new(file, mv.from.rank())
}

fn matches_pattern(board: &Board, side: Color, mv: Move, pattern: &SanPattern) -> bool {
    let castle = is_castle(board, side, mv);
    match pattern {
        SanPattern::Castle(kind) => {
            castle
                && match kind {
                    Castle::Short => is_short_castle(mv),
                    Castle::Long => !is_short_castle(mv),
                }
        }
        SanPattern::Normal {
            piece,
            from_file,
            from_rank,
            to,
            promotion,
        } => {
            if castle {
                return false;
            }
            let from: Square = mv.from.into();
            board.piece_on(mv.from).map(PieceKind::from) == Some(*piece)
                && Square::from(mv.to) == *to
                && from_file.map_or(true, |f| from.file() == f)
                && from_rank.map_or(true, |r| from.rank() == r)
                && mv.promotion.map(PieceKind::from) == *promotion
        }
    }
}

/// Canonical SAN of a legal move; `legal` is every legal move of `board`.
fn format_san(board: &Board, mv: Move, legal: &[Move]) -> String {
    let side = board.side_to_move();
    let mut san = String::new();

    if is_castle(board, side, mv) {
        san.push_str(if is_short_castle(mv) { "O-O" } else { "O-O-O" });
    } else {
        let piece = board.piece_on(mv.from).map(PieceKind::from).unwrap_or(PieceKind::Pawn);
        let from: Square = mv.from.into();
        let to: Square = mv.to.into();
        let capture = board.color_on(mv.to) == Some(!side)
            || (piece == PieceKind::Pawn && from.file() != to.file());

        if piece == PieceKind::Pawn {
            if capture {
                san.push(from.file_char());
            }
        } else {
            san.push(piece.to_char_upper());
            let rivals: Vec<Square> = legal
                .iter()
                .filter(|other| {
                    other.to == mv.to
                        && other.from != mv.from
                        && board.piece_on(other.from) == board.piece_on(mv.from)
                        && !is_castle(board, side, **other)
                })
                .map(|other| Square::from(other.from))
                .collect();
            if !rivals.is_empty() {
                if rivals.iter().all(|sq| sq.file() != from.file()) {
                    san.push(from.file_char());
                } else if rivals.iter().all(|sq| sq.rank() != from.rank()) {
                    san.push(from.rank_char());
                } else {
                    san.push(from.file_char());
                    san.push(from.rank_char());
                }
            }
        }

        if capture {
            san.push('x');
        }
        san.push_str(&to.to_string());
        if let Some(promotion) = mv.promotion {
            san.push('=');
            san.push(PieceKind::from(promotion).to_char_upper());
        }
    }

    let mut after = board.clone();
    after.play_unchecked(mv);
    if !after.checkers().is_empty() {
        san.push(if after.status() == GameStatus::Won { '#' } else { '+' });
    }
    san
}

/// Hand a position to the move generator. Castling rights whose king or rook
/// has left its home square are dropped, and an en passant square the
/// generator refuses is retried without.
fn to_board(position: &Position) -> Result<Board, SanError> {
    let fen = position.to_fen();
    let mut fields = fen.split(' ');
    let placement = fields.next().ok_or(SanError::InvalidPosition)?;
    let side = fields.next().ok_or(SanError::InvalidPosition)?;

    let castling = playable_castling(position);
    let en_passant = position
        .en_passant()
        .map_or_else(|| "-".to_string(), |sq| sq.to_string());

    let attempt = |ep: &str| {
        let fen = format!("{placement} {side} {castling} {ep} 0 1");
        Board::from_fen(&fen, false)
    };
    attempt(&en_passant)
        .or_else(|_| attempt("-"))
        .map_err(|_| SanError::InvalidPosition)
}

fn playable_castling(position: &Position) -> String {
    let holds = |square: &str, fen_char: char| {
        Square::parse(square)
            .and_then(|sq| position.piece_at(sq))
            .is_some_and(|piece| piece.to_fen_char() == fen_char)
    };
    let rights = position.castling();
    let mut out = String::new();
    if rights.white_king_side && holds("e1", 'K') && holds("h1", 'R') {
        out.push('K');
    }
    if rights.white_queen_side && holds("e1", 'K') && holds("a1", 'R') {
        out.push('Q');
    }
    if rights.black_king_side && holds("e8", 'k') && holds("h8", 'r') {
        out.push('k');
    }
    if rights.black_queen_side && holds("e8", 'k') && holds("a8", 'r') {
        out.push('q');
    }
    if out.is_empty() {
        out.push('-');
    }
    out
}

/// Position after playing a legal move.
fn apply(before: &Position, board: &Board, mv: Move) -> Position {
    let mover = board.piece_on(mv.from);
    let capture = board.color_on(mv.to) == Some(!board.side_to_move());

    let mut after = board.clone();
    after.play_unchecked(mv);

    let mut squares = [None; 64];
    for (index, slot) in squares.iter_mut().enumerate() {
        let sq = cozy_chess::Square::index(index);
        if let (Some(kind), Some(color)) = (after.piece_on(sq), after.color_on(sq)) {
            *slot = Some(crate::types::Piece::new(kind.into(), color.into()));
        }
    }

    let castling = CastlingRights {
        white_king_side: after.castle_rights(Color::White).short.is_some(),
        white_queen_side: after.castle_rights(Color::White).long.is_some(),
        black_king_side: after.castle_rights(Color::Black).short.is_some(),
        black_queen_side: after.castle_rights(Color::Black).long.is_some(),
    };

    let from: Square = mv.from.into();
    let to: Square = mv.to.into();
    let pawn = mover == Some(Piece::Pawn);
    let en_passant = if pawn && from.rank().abs_diff(to.rank()) == 2 {
        Square::new(from.file(), (from.rank() + to.rank()) / 2)
    } else {
        None
    };

    let halfmove_clock = if pawn || capture {
        0
    } else {
        before.halfmove_clock() + 1
    };
    let fullmove_number = match before.side_to_move() {
        PieceColor::White => before.fullmove_number(),
        PieceColor::Black => before.fullmove_number() + 1,
    };

    Position::from_parts(
        squares,
        after.side_to_move().into(),
        castling,
        en_passant,
        halfmove_clock,
        fullmove_number,
    )
}
