//! Piece symbol sets used when displaying move notation.

use serde::{Deserialize, Serialize};

use chess::PieceKind;

/// Figurines in `PieceKind::ALL` order: king, queen, rook, bishop, knight, pawn.
const FIGURINES: [char; 6] = [
    '\u{265a}', '\u{265b}', '\u{265c}', '\u{265d}', '\u{265e}', '\u{265f}',
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SymbolSet {
    /// English letters, as written in SAN.
    #[default]
    Native,
    Figurines,
    /// Six letters in king, queen, rook, bishop, knight, pawn order.
    Custom([char; 6]),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "invalid piece symbols {0:?}: expected `native`, `figurines` or six letters such as `(KQRBNP)`"
)]
pub struct SymbolSetError(String);

impl SymbolSet {
    pub fn symbol(&self, kind: PieceKind) -> char {
        let index = PieceKind::ALL
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(PieceKind::ALL.len() - 1);
        match self {
            Self::Native => kind.to_char_upper(),
            Self::Figurines => FIGURINES[index],
            Self::Custom(letters) => letters[index],
        }
    }

    /// Replace the piece letters of a SAN string.
    pub fn substitute(&self, notation: &str) -> String {
        if *self == Self::Native {
            return notation.to_string();
        }
        notation
            .chars()
            .map(|c| match c {
                'K' | 'Q' | 'R' | 'B' | 'N' | 'P' => {
                    PieceKind::from_char(c).map_or(c, |kind| self.symbol(kind))
                }
                other => other,
            })
            .collect()
    }
}

impl std::str::FromStr for SymbolSet {
    type Err = SymbolSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native" => return Ok(Self::Native),
            "figurines" => return Ok(Self::Figurines),
            _ => {}
        }

        let letters: Vec<char> = s
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .map(|inner| inner.chars().collect())
            .unwrap_or_default();
        if letters.len() != 6 || !letters.iter().all(char::is_ascii_alphabetic) {
            return Err(SymbolSetError(s.to_string()));
        }

        let mut custom = ['?'; 6];
        for (slot, letter) in custom.iter_mut().zip(letters) {
            *slot = letter.to_ascii_uppercase();
        }
        Ok(Self::Custom(custom))
    }
}

impl std::fmt::Display for SymbolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native => f.write_str("native"),
            Self::Figurines => f.write_str("figurines"),
            Self::Custom(letters) => {
                let letters: String = letters.iter().collect();
                write!(f, "({})", letters)
            }
        }
    }
}

impl From<SymbolSet> for String {
    fn from(set: SymbolSet) -> Self {
        set.to_string()
    }
}

impl TryFrom<String> for SymbolSet {
    type Error = SymbolSetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
