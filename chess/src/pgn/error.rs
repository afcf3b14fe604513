use crate::fen::FenErrorKind;

use super::san::SanError;

/// Bytes of input kept on each side of a failure for diagnostics.
const EXCERPT_RADIUS: usize = 50;

/// A failed PGN document. Parsing is all-or-nothing: no partial tree
/// accompanies the error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("game {document}: {kind} at byte {offset}")]
pub struct PgnError {
    pub kind: PgnErrorKind,
    /// Zero-based index of the document within the input text.
    pub document: usize,
    /// Byte offset into the whole input text.
    pub offset: usize,
    /// Up to ~100 characters of input around `offset`.
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PgnErrorKind {
    #[error("malformed FEN header: {0}")]
    MalformedFen(FenErrorKind),
    #[error("syntax error: {0}")]
    Syntax(SyntaxError),
    #[error("illegal or ambiguous move {san}: {reason}")]
    IllegalOrAmbiguousMove { san: String, reason: SanError },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("unexpected character {0:?}")]
    UnexpectedCharacter(char),
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("unterminated header")]
    UnterminatedHeader,
    #[error("malformed header")]
    MalformedHeader,
    #[error("header after movetext")]
    HeaderInMovetext,
    #[error("invalid NAG {0}")]
    InvalidNag(String),
    #[error("unexpected {0}")]
    UnexpectedToken(&'static str),
    #[error("unmatched ')'")]
    UnmatchedVariationClose,
    #[error("unterminated variation")]
    UnterminatedVariation,
    #[error("variation opened before any move")]
    VariationWithoutMove,
    #[error("variations nested deeper than {0}")]
    VariationTooDeep(usize),
    #[error("missing move number before White's move")]
    MissingMoveNumber,
    #[error("move number without a move")]
    DanglingMoveNumber,
    #[error("result inside a variation")]
    ResultInVariation,
}

/// An error located in the input, before it is tied to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Located {
    pub kind: PgnErrorKind,
    pub offset: usize,
}

impl Located {
    pub fn syntax(error: SyntaxError, offset: usize) -> Self {
        Self {
            kind: PgnErrorKind::Syntax(error),
            offset,
        }
    }

    pub fn into_error(self, source: &str, document: usize) -> PgnError {
        PgnError {
            excerpt: excerpt(source, self.offset),
            kind: self.kind,
            document,
            offset: self.offset,
        }
    }
}

/// Input surrounding `offset`, snapped to char boundaries.
pub(crate) fn excerpt(source: &str, offset: usize) -> String {
    let offset = offset.min(source.len());

    let mut start = offset.saturating_sub(EXCERPT_RADIUS);
    while !source.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (offset + EXCERPT_RADIUS).min(source.len());
    while !source.is_char_boundary(end) {
        end += 1;
    }
    source[start..end].to_string()
}
