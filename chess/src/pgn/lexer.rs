//! PGN tokenizer.
//!
//! Produces header tokens for the leading tag section of each game, then
//! movetext tokens until a result token switches back to headers. Every
//! token carries the byte offset where it starts.

use std::collections::VecDeque;

use super::error::{Located, SyntaxError};
use super::nag;
use super::tree::GameResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Header { tag: String, value: String },
    MoveNumber(u32),
    San(String),
    Nag(u8),
    CommentOpen,
    CommentText(String),
    CommentClose,
    VariationOpen,
    VariationClose,
    Result(GameResult),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

impl Token {
    fn new(kind: TokenKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

pub(crate) struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    in_movetext: bool,
    pending: VecDeque<Token>,
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            in_movetext: false,
            pending: VecDeque::new(),
            failed: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn at_line_start(&self, offset: usize) -> bool {
        offset == 0 || self.src[..offset].ends_with('\n')
    }

    fn lex_token(&mut self) -> Result<Option<Token>, Located> {
        loop {
            self.skip_whitespace();
            let start = self.pos;
            let Some(c) = self.peek_char() else {
                return Ok(None);
            };

            let kind = match c {
                '%' if self.at_line_start(start) => {
                    // Escaped line: ignored entirely.
                    self.skip_line();
                    continue;
                }
                '[' => {
                    if self.in_movetext {
                        return Err(Located::syntax(SyntaxError::HeaderInMovetext, start));
                    }
                    self.lex_header()?
                }
                '{' => {
                    self.lex_brace_comment()?;
                    return Ok(self.pending.pop_front());
                }
                ';' => {
                    self.lex_line_comment();
                    return Ok(self.pending.pop_front());
                }
                '(' => {
                    self.pos += 1;
                    self.in_movetext = true;
                    TokenKind::VariationOpen
                }
                ')' => {
                    self.pos += 1;
                    self.in_movetext = true;
                    TokenKind::VariationClose
                }
                '*' => {
                    self.pos += 1;
                    self.in_movetext = false;
                    TokenKind::Result(GameResult::Ongoing)
                }
                '$' => self.lex_numeric_nag()?,
                '0'..='9' => self.lex_digits()?,
                _ => {
                    if let Some((code, len)) = nag::match_prefix(self.rest()) {
                        self.pos += len;
                        self.in_movetext = true;
                        TokenKind::Nag(code)
                    } else if c.is_ascii_alphabetic() {
                        self.lex_san()
                    } else {
                        return Err(Located::syntax(SyntaxError::UnexpectedCharacter(c), start));
                    }
                }
            };

            tracing::trace!(offset = start, ?kind, "token");
            return Ok(Some(Token::new(kind, start)));
        }
    }

    fn skip_line(&mut self) {
        match self.rest().find('\n') {
            Some(i) => self.pos += i + 1,
            None => self.pos = self.src.len(),
        }
    }

    fn lex_header(&mut self) -> Result<TokenKind, Located> {
        let start = self.pos;
        let malformed = Located::syntax(SyntaxError::MalformedHeader, start);
        let unterminated = Located::syntax(SyntaxError::UnterminatedHeader, start);

        self.pos += 1;
        self.skip_whitespace();

        let tag_start = self.pos;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let tag = self.src[tag_start..self.pos].to_string();
        if tag.is_empty() {
            return Err(if self.peek_char().is_none() { unterminated } else { malformed });
        }

        self.skip_whitespace();
        match self.bump() {
            Some('"') => {}
            Some(_) => return Err(malformed),
            None => return Err(unterminated),
        }

        let mut value = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some(escaped @ ('"' | '\\')) => value.push(escaped),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => return Err(unterminated),
                },
                Some('"') => break,
                Some(c) => value.push(c),
                None => return Err(unterminated),
            }
        }

        self.skip_whitespace();
        match self.bump() {
            Some(']') => Ok(TokenKind::Header { tag, value }),
            Some(_) => Err(malformed),
            None => Err(unterminated),
        }
    }

    /// `{...}` comment. Braces do not nest; `\{`, `\}` and `\\` are unescaped.
    fn lex_brace_comment(&mut self) -> Result<(), Located> {
        let open = self.pos;
        self.pos += 1;
        let text_start = self.pos;

        let mut text = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.peek_char() {
                    Some(escaped @ ('{' | '}' | '\\')) => {
                        self.pos += 1;
                        text.push(escaped);
                    }
                    _ => text.push('\\'),
                },
                Some('}') => break,
                Some(c) => text.push(c),
                None => {
                    return Err(Located::syntax(SyntaxError::UnterminatedComment, open));
                }
            }
        }

        let close = self.pos - 1;
        self.push_comment(open, text_start, text, close);
        Ok(())
    }

    /// `;` comment running to the end of the line.
    fn lex_line_comment(&mut self) {
        let open = self.pos;
        self.pos += 1;
        let text_start = self.pos;
        let end = self
            .rest()
            .find('\n')
            .map_or(self.src.len(), |i| self.pos + i);
        let text = self.src[text_start..end].trim_end_matches('\r').to_string();
        self.pos = end;
        self.push_comment(open, text_start, text, end);
    }

    fn push_comment(&mut self, open: usize, text_start: usize, text: String, close: usize) {
        self.pending.push_back(Token::new(TokenKind::CommentOpen, open));
        self.pending
            .push_back(Token::new(TokenKind::CommentText(text), text_start));
        self.pending.push_back(Token::new(TokenKind::CommentClose, close));
    }

    fn lex_numeric_nag(&mut self) -> Result<TokenKind, Located> {
        let start = self.pos;
        self.pos += 1;
        let digits = self.take_while(|c| c.is_ascii_digit());
        self.in_movetext = true;
        digits
            .parse::<u8>()
            .map(TokenKind::Nag)
            .map_err(|_| {
                Located::syntax(
                    SyntaxError::InvalidNag(self.src[start..self.pos].to_string()),
                    start,
                )
            })
    }

    /// Move numbers, results, and castling spelled with zeros.
    fn lex_digits(&mut self) -> Result<TokenKind, Located> {
        let start = self.pos;

        for (text, result) in [
            ("1/2-1/2", GameResult::Draw),
            ("1-0", GameResult::WhiteWins),
            ("0-1", GameResult::BlackWins),
        ] {
            if self.rest().starts_with(text) && self.ends_word(start + text.len()) {
                self.pos += text.len();
                self.in_movetext = false;
                return Ok(TokenKind::Result(result));
            }
        }

        for (text, san) in [("0-0-0", "O-O-O"), ("0-0", "O-O")] {
            if self.rest().starts_with(text) {
                self.pos += text.len();
                let suffix = self.take_while(|c| c == '+' || c == '#');
                self.in_movetext = true;
                return Ok(TokenKind::San(format!("{}{}", san, suffix)));
            }
        }

        let digits = self.take_while(|c| c.is_ascii_digit());
        let number = digits.parse::<u32>().map_err(|_| {
            Located::syntax(SyntaxError::UnexpectedToken("oversized move number"), start)
        })?;
        self.take_while(is_dot);

        // `1. ... e5`: a detached ellipsis belongs to the move number.
        let before_gap = self.pos;
        self.take_while(char::is_whitespace);
        if self.take_while(is_dot).is_empty() {
            self.pos = before_gap;
        }
        self.in_movetext = true;
        Ok(TokenKind::MoveNumber(number))
    }

    fn lex_san(&mut self) -> TokenKind {
        let body = self.take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '=' | '-' | ':'));
        let suffix = self.take_while(|c| c == '+' || c == '#');
        self.in_movetext = true;
        TokenKind::San(format!("{}{}", body, suffix))
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.src[start..self.pos]
    }

    fn ends_word(&self, offset: usize) -> bool {
        self.src[offset..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric() && c != '-' && c != '/')
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, Located>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending.pop_front() {
            return Some(Ok(token));
        }
        if self.failed {
            return None;
        }
        match self.lex_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

fn is_dot(c: char) -> bool {
    c == '.' || c == '\u{2026}'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input).map(|t| t.unwrap().kind).collect()
    }

    fn san(s: &str) -> TokenKind {
        TokenKind::San(s.to_string())
    }

    #[test]
    fn test_headers_then_movetext() {
        let tokens = kinds("[Event \"Linares\"]\n[Round \"4\"]\n\n1. e4 e5 *");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Header { tag: "Event".into(), value: "Linares".into() },
                TokenKind::Header { tag: "Round".into(), value: "4".into() },
                TokenKind::MoveNumber(1),
                san("e4"),
                san("e5"),
                TokenKind::Result(GameResult::Ongoing),
            ]
        );
    }

    #[test]
    fn test_header_value_escapes() {
        let tokens = kinds(r#"[Event "The \"Big\" one \\ 2"]"#);
        assert_eq!(
            tokens,
            vec![TokenKind::Header {
                tag: "Event".into(),
                value: "The \"Big\" one \\ 2".into()
            }]
        );
    }

    #[test]
    fn test_offsets() {
        let tokens: Vec<Token> = Lexer::new("1. e4 {hi} (1. d4) 1-0")
            .map(Result::unwrap)
            .collect();
        let offsets: Vec<usize> = tokens.iter().map(|t| t.offset).collect();
        assert_eq!(offsets, vec![0, 3, 6, 7, 9, 11, 12, 15, 17, 19]);
        assert_eq!(tokens[9].kind, TokenKind::Result(GameResult::WhiteWins));
    }

    #[test]
    fn test_move_numbers_with_ellipsis() {
        assert_eq!(
            kinds("12... Nf6 13\u{2026} a5 14.Rac1"),
            vec![
                TokenKind::MoveNumber(12),
                san("Nf6"),
                TokenKind::MoveNumber(13),
                san("a5"),
                TokenKind::MoveNumber(14),
                san("Rac1"),
            ]
        );
    }

    #[test]
    fn test_results() {
        assert_eq!(kinds("1/2-1/2"), vec![TokenKind::Result(GameResult::Draw)]);
        assert_eq!(kinds("0-1"), vec![TokenKind::Result(GameResult::BlackWins)]);
        assert_eq!(kinds("1-0"), vec![TokenKind::Result(GameResult::WhiteWins)]);
    }

    #[test]
    fn test_castling_with_zeros() {
        assert_eq!(kinds("0-0 0-0-0+"), vec![san("O-O"), san("O-O-O+")]);
    }

    #[test]
    fn test_symbolic_and_numeric_nags() {
        assert_eq!(
            kinds("e4!! $14 ?! +/- inf += =+ ="),
            vec![
                san("e4"),
                TokenKind::Nag(3),
                TokenKind::Nag(14),
                TokenKind::Nag(6),
                TokenKind::Nag(16),
                TokenKind::Nag(13),
                TokenKind::Nag(14),
                TokenKind::Nag(15),
                TokenKind::Nag(10),
            ]
        );
    }

    #[test]
    fn test_detached_ellipsis_joins_move_number() {
        assert_eq!(
            kinds("1. e4 {ok} 1. ... e5 2 \u{2026} Nf3"),
            vec![
                TokenKind::MoveNumber(1),
                san("e4"),
                TokenKind::CommentOpen,
                TokenKind::CommentText("ok".to_string()),
                TokenKind::CommentClose,
                TokenKind::MoveNumber(1),
                san("e5"),
                TokenKind::MoveNumber(2),
                san("Nf3"),
            ]
        );
    }

    #[test]
    fn test_san_keeps_check_suffix() {
        assert_eq!(kinds("Qxd7+ c8=Q# Qb7#"), vec![san("Qxd7+"), san("c8=Q#"), san("Qb7#")]);
    }

    #[test]
    fn test_brace_comment_is_verbatim() {
        assert_eq!(
            kinds("{ a (b) [c] \\{d\\} }"),
            vec![
                TokenKind::CommentOpen,
                TokenKind::CommentText(" a (b) [c] {d} ".into()),
                TokenKind::CommentClose,
            ]
        );
    }

    #[test]
    fn test_line_comment() {
        assert_eq!(
            kinds("e4 ; best by test\ne5"),
            vec![
                san("e4"),
                TokenKind::CommentOpen,
                TokenKind::CommentText(" best by test".into()),
                TokenKind::CommentClose,
                san("e5"),
            ]
        );
    }

    #[test]
    fn test_escape_line_is_skipped() {
        assert_eq!(kinds("% exported by tool\n1. e4"), vec![TokenKind::MoveNumber(1), san("e4")]);
    }

    #[test]
    fn test_result_resets_to_header_mode() {
        let tokens = kinds("1. e4 1-0\n[Event \"Next\"]\n1. d4 *");
        assert_eq!(tokens.len(), 7);
        assert!(matches!(tokens[3], TokenKind::Header { .. }));
    }

    #[test]
    fn test_header_in_movetext_is_rejected() {
        let result: Result<Vec<Token>, Located> = Lexer::new("1. e4 [Event \"x\"]").collect();
        assert_eq!(result.unwrap_err(), Located::syntax(SyntaxError::HeaderInMovetext, 6));
    }

    #[test]
    fn test_unterminated_comment() {
        let result: Result<Vec<Token>, Located> = Lexer::new("1. e4 { never closed").collect();
        assert_eq!(result.unwrap_err(), Located::syntax(SyntaxError::UnterminatedComment, 6));
    }

    #[test]
    fn test_unexpected_character() {
        let result: Result<Vec<Token>, Located> = Lexer::new("1. e4 @").collect();
        assert_eq!(result.unwrap_err(), Located::syntax(SyntaxError::UnexpectedCharacter('@'), 6));
    }

    #[test]
    fn test_malformed_header() {
        let result: Result<Vec<Token>, Located> = Lexer::new("[Event Linares]").collect();
        assert_eq!(result.unwrap_err(), Located::syntax(SyntaxError::MalformedHeader, 0));
        let result: Result<Vec<Token>, Located> = Lexer::new("[Event \"Linares").collect();
        assert_eq!(result.unwrap_err(), Located::syntax(SyntaxError::UnterminatedHeader, 0));
    }

    #[test]
    fn test_oversized_numeric_nag() {
        let result: Result<Vec<Token>, Located> = Lexer::new("e4 $300").collect();
        assert_eq!(
            result.unwrap_err(),
            Located::syntax(SyntaxError::InvalidNag("$300".into()), 3)
        );
    }

    #[test]
    fn test_lexer_stops_after_error() {
        let mut lexer = Lexer::new("@ e4");
        assert!(lexer.next().unwrap().is_err());
        assert!(lexer.next().is_none());
    }
}
