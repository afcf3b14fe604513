//! Game-tree parser.
//!
//! Recursive descent over the token stream. Each document is parsed
//! completely or not at all; the reader stops at the first failure.

use std::iter::Peekable;

use serde::{Deserialize, Serialize};

use super::error::{Located, PgnError, PgnErrorKind, SyntaxError};
use super::headers::{GameHeaders, Tag};
use super::lexer::{Lexer, Token, TokenKind};
use super::san;
use super::tree::{GameResult, MoveTree, NewMove, NodeId, VariationId};
use crate::fen;
use crate::position::Position;
use crate::types::PieceColor;

pub const DEFAULT_MAX_VARIATION_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserOptions {
    /// Deepest side-line nesting accepted; the main line is depth 0.
    pub max_variation_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_variation_depth: DEFAULT_MAX_VARIATION_DEPTH,
        }
    }
}

/// One parsed game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnDocument {
    pub headers: GameHeaders,
    pub tree: MoveTree,
    pub result: GameResult,
}

/// How a line of moves ended.
enum LineEnd {
    Result(GameResult, usize),
    Closed,
    Eof,
}

/// Lazily parses the documents of a PGN text.
pub struct PgnReader<'a> {
    source: &'a str,
    tokens: Peekable<Lexer<'a>>,
    options: ParserOptions,
    document: usize,
    done: bool,
}

impl<'a> PgnReader<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_options(source, ParserOptions::default())
    }

    pub fn with_options(source: &'a str, options: ParserOptions) -> Self {
        Self {
            source,
            tokens: Lexer::new(source).peekable(),
            options,
            document: 0,
            done: false,
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, Located> {
        self.tokens.next().transpose()
    }

    fn at_header(&mut self) -> Result<bool, Located> {
        match self.tokens.peek() {
            Some(Ok(token)) => Ok(matches!(token.kind, TokenKind::Header { .. })),
            Some(Err(err)) => Err(err.clone()),
            None => Ok(false),
        }
    }

    fn at_end(&mut self) -> Result<bool, Located> {
        match self.tokens.peek() {
            Some(Err(err)) => Err(err.clone()),
            other => Ok(other.is_none()),
        }
    }

    fn read_document(&mut self) -> Result<Option<PgnDocument>, Located> {
        let mut headers = GameHeaders::new();
        let mut fen_header = None;

        while self.at_header()? {
            if let Some(Token {
                kind: TokenKind::Header { tag, value },
                offset,
            }) = self.next_token()?
            {
                if Tag::from_name(&tag) == Tag::Fen {
                    fen_header = Some((value.clone(), offset));
                }
                headers.insert(tag, value);
            }
        }

        if headers.is_empty() && self.at_end()? {
            return Ok(None);
        }

        let start = match fen_header {
            Some((text, offset)) => fen::parse(&text).map_err(|err| Located {
                kind: PgnErrorKind::MalformedFen(err.kind),
                offset,
            })?,
            None => Position::starting(),
        };

        let mut tree = MoveTree::new(start);
        let main = tree.main_line();
        let result = match self.parse_line(&mut tree, main, 0)? {
            LineEnd::Result(result, _) => result,
            LineEnd::Eof | LineEnd::Closed => headers
                .get_tag(&Tag::Result)
                .and_then(GameResult::from_token)
                .unwrap_or(GameResult::Ongoing),
        };

        Ok(Some(PgnDocument {
            headers,
            tree,
            result,
        }))
    }

    /// Parse moves into `var` until its end.
    fn parse_line(
        &mut self,
        tree: &mut MoveTree,
        var: VariationId,
        depth: usize,
    ) -> Result<LineEnd, Located> {
        let mut last: Option<NodeId> = None;
        let mut move_number: Option<usize> = None;

        let dangling = |move_number: Option<usize>| match move_number {
            Some(offset) => Err(Located::syntax(SyntaxError::DanglingMoveNumber, offset)),
            None => Ok(()),
        };

        loop {
            let Some(token) = self.next_token()? else {
                dangling(move_number)?;
                return Ok(LineEnd::Eof);
            };

            match token.kind {
                TokenKind::MoveNumber(_) => {
                    dangling(move_number)?;
                    move_number = Some(token.offset);
                }
                TokenKind::San(text) => {
                    let before = match last {
                        Some(id) => tree.node(id).position.clone(),
                        None => tree.variation(var).position.clone(),
                    };
                    if before.side_to_move() == PieceColor::White && move_number.is_none() {
                        return Err(Located::syntax(SyntaxError::MissingMoveNumber, token.offset));
                    }
                    move_number = None;

                    let resolved = san::parse_san(&before, &text).map_err(|reason| Located {
                        kind: PgnErrorKind::IllegalOrAmbiguousMove {
                            san: text.clone(),
                            reason,
                        },
                        offset: token.offset,
                    })?;
                    let id = tree.push_move(
                        var,
                        last,
                        NewMove {
                            notation: resolved.san,
                            position: resolved.position,
                            counter: before.fullmove_number(),
                            mover: before.side_to_move(),
                            offset: token.offset,
                        },
                    );
                    last = Some(id);
                }
                TokenKind::Nag(code) => {
                    dangling(move_number)?;
                    let Some(id) = last else {
                        return Err(Located::syntax(
                            SyntaxError::UnexpectedToken("annotation glyph before any move"),
                            token.offset,
                        ));
                    };
                    tree.node_mut(id).nags.push(code);
                }
                TokenKind::CommentOpen => {
                    dangling(move_number)?;
                    let text = self.read_comment(token.offset)?;
                    let slot = match last {
                        Some(id) => &mut tree.node_mut(id).commentary,
                        None => &mut tree.variation_mut(var).commentary,
                    };
                    append_comment(slot, &text);
                }
                TokenKind::VariationOpen => {
                    dangling(move_number)?;
                    let Some(id) = last else {
                        return Err(Located::syntax(
                            SyntaxError::VariationWithoutMove,
                            token.offset,
                        ));
                    };
                    let max = self.options.max_variation_depth;
                    if depth + 1 > max {
                        return Err(Located::syntax(
                            SyntaxError::VariationTooDeep(max),
                            token.offset,
                        ));
                    }
                    let side = tree.add_variation(id);
                    match self.parse_line(tree, side, depth + 1)? {
                        LineEnd::Closed => {}
                        LineEnd::Eof => {
                            return Err(Located::syntax(
                                SyntaxError::UnterminatedVariation,
                                token.offset,
                            ));
                        }
                        LineEnd::Result(_, offset) => {
                            return Err(Located::syntax(SyntaxError::ResultInVariation, offset));
                        }
                    }
                }
                TokenKind::VariationClose => {
                    dangling(move_number)?;
                    if depth == 0 {
                        return Err(Located::syntax(
                            SyntaxError::UnmatchedVariationClose,
                            token.offset,
                        ));
                    }
                    return Ok(LineEnd::Closed);
                }
                TokenKind::Result(result) => {
                    dangling(move_number)?;
                    return Ok(LineEnd::Result(result, token.offset));
                }
                TokenKind::Header { .. } => {
                    return Err(Located::syntax(SyntaxError::HeaderInMovetext, token.offset));
                }
                TokenKind::CommentText(_) | TokenKind::CommentClose => {
                    return Err(Located::syntax(
                        SyntaxError::UnexpectedToken("comment text outside braces"),
                        token.offset,
                    ));
                }
            }
        }
    }

    /// Body of a comment whose opening token was at `open`.
    fn read_comment(&mut self, open: usize) -> Result<String, Located> {
        let unterminated = Located::syntax(SyntaxError::UnterminatedComment, open);
        let text = match self.next_token()? {
            Some(Token {
                kind: TokenKind::CommentText(text),
                ..
            }) => text,
            _ => return Err(unterminated),
        };
        match self.next_token()? {
            Some(Token {
                kind: TokenKind::CommentClose,
                ..
            }) => Ok(text),
            _ => Err(unterminated),
        }
    }
}

fn append_comment(slot: &mut Option<String>, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    match slot {
        Some(existing) => {
            existing.push(' ');
            existing.push_str(text);
        }
        None => *slot = Some(text.to_string()),
    }
}

impl Iterator for PgnReader<'_> {
    type Item = Result<PgnDocument, PgnError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_document() {
            Ok(Some(document)) => {
                tracing::debug!(
                    document = self.document,
                    plies = document.tree.ply_count(),
                    nodes = document.tree.node_count(),
                    result = %document.result,
                    "parsed PGN document"
                );
                self.document += 1;
                Some(Ok(document))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(located) => {
                self.done = true;
                let err = located.into_error(self.source, self.document);
                tracing::warn!(document = err.document, offset = err.offset, "{}", err.kind);
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for PgnReader<'_> {}

/// Parse every document in `text`.
pub fn parse_games(text: &str) -> Result<Vec<PgnDocument>, PgnError> {
    PgnReader::new(text).collect()
}

/// Parse documents up to and including the one at `index`.
///
/// Returns `Ok(None)` when the text holds fewer documents. A failure in an
/// earlier document is reported as is.
pub fn parse_game(text: &str, index: usize) -> Result<Option<PgnDocument>, PgnError> {
    parse_game_with_options(text, index, ParserOptions::default())
}

pub fn parse_game_with_options(
    text: &str,
    index: usize,
    options: ParserOptions,
) -> Result<Option<PgnDocument>, PgnError> {
    let mut reader = PgnReader::with_options(text, options);
    for _ in 0..index {
        match reader.next() {
            Some(Ok(_)) => {}
            Some(Err(err)) => return Err(err),
            None => return Ok(None),
        }
    }
    reader.next().transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(text: &str) -> PgnDocument {
        let mut docs = parse_games(text).unwrap();
        assert_eq!(docs.len(), 1);
        docs.remove(0)
    }

    fn syntax_error(text: &str) -> (SyntaxError, usize) {
        let err = parse_games(text).unwrap_err();
        match err.kind {
            PgnErrorKind::Syntax(kind) => (kind, err.offset),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_comments_attach_to_preceding_move() {
        let doc = parse_one("{Intro} 1. e4 {best} {by test} e5 *");
        let main = doc.tree.variation(doc.tree.main_line());
        assert_eq!(main.commentary.as_deref(), Some("Intro"));
        let e4 = doc.tree.main_line_moves().next().unwrap();
        assert_eq!(e4.commentary.as_deref(), Some("best by test"));
    }

    #[test]
    fn test_black_move_number_is_optional() {
        let doc = parse_one("1. e4 1... e5 2. Nf3 Nc6 *");
        assert_eq!(doc.tree.ply_count(), 4);
    }

    #[test]
    fn test_move_numbers_are_not_checked() {
        let doc = parse_one("7. e4 e5 3. Nf3 *");
        let counters: Vec<u32> = doc.tree.main_line_moves().map(|n| n.counter).collect();
        assert_eq!(counters, vec![1, 1, 2]);
    }

    #[test]
    fn test_missing_move_number_before_white() {
        assert_eq!(syntax_error("1. e4 e5 Nf3 *"), (SyntaxError::MissingMoveNumber, 9));
    }

    #[test]
    fn test_dangling_move_number() {
        assert_eq!(syntax_error("1. e4 e5 2. *"), (SyntaxError::DanglingMoveNumber, 9));
    }

    #[test]
    fn test_nag_before_move() {
        let (kind, offset) = syntax_error("$1 1. e4 *");
        assert!(matches!(kind, SyntaxError::UnexpectedToken(_)));
        assert_eq!(offset, 0);
    }

    #[test]
    fn test_result_falls_back_to_header() {
        let doc = parse_one("[Result \"0-1\"]\n1. e4 e5");
        assert_eq!(doc.result, GameResult::BlackWins);
        let doc = parse_one("[Result \"bogus\"]\n1. e4 e5");
        assert_eq!(doc.result, GameResult::Ongoing);
    }

    #[test]
    fn test_headers_only_document() {
        let doc = parse_one("[Event \"Empty\"]\n");
        assert_eq!(doc.tree.ply_count(), 0);
        assert_eq!(doc.headers.get("Event"), Some("Empty"));
    }

    #[test]
    fn test_empty_input_has_no_documents() {
        assert!(parse_games("").unwrap().is_empty());
        assert!(parse_games("  \n ").unwrap().is_empty());
    }

    #[test]
    fn test_reader_is_fused_after_error() {
        let mut reader = PgnReader::new("1. e4 *\n1. e5 *\n1. d4 *");
        assert!(reader.next().unwrap().is_ok());
        let err = reader.next().unwrap().unwrap_err();
        assert_eq!(err.document, 1);
        assert!(reader.next().is_none());
    }
}
