//! Rendering configuration.
//!
//! Every value has a compile-time default and can be overridden at runtime
//! via a dedicated environment variable. Values that fail to parse fall back
//! to the default.

use serde::{Deserialize, Serialize};

use chess::pgn::{ParserOptions, DEFAULT_MAX_VARIATION_DEPTH};

use crate::board::BoardOptions;
use crate::symbols::SymbolSet;

/// Default size of a diagram square, in pixels.
pub const DEFAULT_SQUARE_SIZE: u32 = 32;

pub const MIN_SQUARE_SIZE: u32 = 12;
pub const MAX_SQUARE_SIZE: u32 = 64;

/// Minimum visible length, in UTF-16 code units, of long-form commentary.
pub const DEFAULT_LONG_COMMENT_THRESHOLD: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub square_size: u32,
    pub show_coordinates: bool,
    pub flip: bool,
    pub symbols: SymbolSet,
    pub long_comment_threshold: usize,
    pub hide_result: bool,
    /// Which document of a multi-game text to render.
    pub game: usize,
    /// Square size of the shared navigation diagram.
    pub navigation_square_size: u32,
    pub navigation_coordinates: bool,
    pub max_variation_depth: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            square_size: DEFAULT_SQUARE_SIZE,
            show_coordinates: false,
            flip: false,
            symbols: SymbolSet::Native,
            long_comment_threshold: DEFAULT_LONG_COMMENT_THRESHOLD,
            hide_result: false,
            game: 0,
            navigation_square_size: DEFAULT_SQUARE_SIZE,
            navigation_coordinates: false,
            max_variation_depth: DEFAULT_MAX_VARIATION_DEPTH,
        }
    }
}

impl RenderConfig {
    /// Defaults overridden by the `CHESSDOC_*` environment variables.
    pub fn from_env() -> Self {
        let square_size = get_square_size();
        let show_coordinates = get_show_coordinates();
        Self {
            square_size,
            show_coordinates,
            symbols: get_piece_symbols(),
            long_comment_threshold: get_long_comment_threshold(),
            hide_result: get_hide_result(),
            navigation_square_size: square_size,
            navigation_coordinates: show_coordinates,
            max_variation_depth: get_max_variation_depth(),
            ..Self::default()
        }
    }

    /// Options for diagrams embedded in the game text and for FEN diagrams.
    pub fn board_options(&self) -> BoardOptions {
        BoardOptions {
            square_size: clamp_square_size(self.square_size),
            show_coordinates: self.show_coordinates,
            flip: self.flip,
        }
    }

    /// Options for the shared navigation diagram.
    pub fn navigation_board_options(&self) -> BoardOptions {
        BoardOptions {
            square_size: clamp_square_size(self.navigation_square_size),
            show_coordinates: self.navigation_coordinates,
            flip: self.flip,
        }
    }

    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            max_variation_depth: self.max_variation_depth,
        }
    }
}

pub fn clamp_square_size(size: u32) -> u32 {
    size.clamp(MIN_SQUARE_SIZE, MAX_SQUARE_SIZE)
}

/// Parse a square size, clamping any integer (negative ones included) to
/// 12..=64. `None` when `value` is not an integer.
pub(crate) fn parse_square_size(value: &str) -> Option<u32> {
    let size = value.trim().parse::<i64>().ok()?;
    let clamped = size.clamp(i64::from(MIN_SQUARE_SIZE), i64::from(MAX_SQUARE_SIZE));
    u32::try_from(clamped).ok()
}

/// Get the diagram square size.
///
/// Priority:
/// 1. `CHESSDOC_SQUARE_SIZE` env variable if set
/// 2. `32` as fallback
///
/// An out-of-range number is clamped to 12..=64 rather than replaced by the
/// default, so `CHESSDOC_SQUARE_SIZE=100` yields 64. Only a value that is not
/// a number falls back to 32.
pub fn get_square_size() -> u32 {
    if let Ok(size) = std::env::var("CHESSDOC_SQUARE_SIZE") {
        return parse_square_size(&size).unwrap_or(DEFAULT_SQUARE_SIZE);
    }

    DEFAULT_SQUARE_SIZE
}

/// Whether diagrams show rank and file labels (`CHESSDOC_SHOW_COORDINATES`).
pub fn get_show_coordinates() -> bool {
    env_flag("CHESSDOC_SHOW_COORDINATES").unwrap_or(false)
}

/// Piece symbol set for move notation (`CHESSDOC_PIECE_SYMBOLS`): `native`,
/// `figurines` or six custom letters such as `(RDTLSB)`.
pub fn get_piece_symbols() -> SymbolSet {
    std::env::var("CHESSDOC_PIECE_SYMBOLS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or_default()
}

/// Get the long-form commentary threshold (`CHESSDOC_LONG_COMMENT_THRESHOLD`).
pub fn get_long_comment_threshold() -> usize {
    if let Ok(value) = std::env::var("CHESSDOC_LONG_COMMENT_THRESHOLD") {
        return value.trim().parse().unwrap_or(DEFAULT_LONG_COMMENT_THRESHOLD);
    }

    DEFAULT_LONG_COMMENT_THRESHOLD
}

/// Whether the result token is left out of the move text (`CHESSDOC_HIDE_RESULT`).
pub fn get_hide_result() -> bool {
    env_flag("CHESSDOC_HIDE_RESULT").unwrap_or(false)
}

/// Get the deepest accepted variation nesting (`CHESSDOC_MAX_VARIATION_DEPTH`).
pub fn get_max_variation_depth() -> usize {
    if let Ok(value) = std::env::var("CHESSDOC_MAX_VARIATION_DEPTH") {
        return value.trim().parse().unwrap_or(DEFAULT_MAX_VARIATION_DEPTH);
    }

    DEFAULT_MAX_VARIATION_DEPTH
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|value| parse_flag(&value))
}

pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_square_size() {
        assert_eq!(clamp_square_size(4), MIN_SQUARE_SIZE);
        assert_eq!(clamp_square_size(32), 32);
        assert_eq!(clamp_square_size(1000), MAX_SQUARE_SIZE);
    }

    #[test]
    fn test_parse_square_size() {
        assert_eq!(parse_square_size(" 24 "), Some(24));
        assert_eq!(parse_square_size("100"), Some(MAX_SQUARE_SIZE));
        assert_eq!(parse_square_size("-5"), Some(MIN_SQUARE_SIZE));
        assert_eq!(parse_square_size("big"), None);
    }

    #[test]
    fn test_get_square_size() {
        let size = get_square_size();
        match std::env::var("CHESSDOC_SQUARE_SIZE") {
            Ok(_) => assert!((MIN_SQUARE_SIZE..=MAX_SQUARE_SIZE).contains(&size)),
            Err(_) => assert_eq!(size, DEFAULT_SQUARE_SIZE),
        }
    }

    #[test]
    fn test_get_long_comment_threshold_default() {
        if std::env::var("CHESSDOC_LONG_COMMENT_THRESHOLD").is_err() {
            assert_eq!(get_long_comment_threshold(), DEFAULT_LONG_COMMENT_THRESHOLD);
        }
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 1 "), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_board_options_are_clamped() {
        let config = RenderConfig {
            square_size: 3,
            navigation_square_size: 90,
            flip: true,
            ..RenderConfig::default()
        };
        assert_eq!(config.board_options().square_size, MIN_SQUARE_SIZE);
        assert_eq!(config.navigation_board_options().square_size, MAX_SQUARE_SIZE);
        assert!(config.navigation_board_options().flip);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: RenderConfig =
            serde_json::from_str(r#"{"square_size": 24, "symbols": "figurines"}"#).unwrap();
        assert_eq!(config.square_size, 24);
        assert_eq!(config.symbols, SymbolSet::Figurines);
        assert_eq!(config.long_comment_threshold, DEFAULT_LONG_COMMENT_THRESHOLD);
    }
}
