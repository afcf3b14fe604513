//! Display formatting of PGN header fields.

use serde::Serialize;

use chess::pgn::{GameHeaders, Tag};
use chess::PieceColor;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Formatting strategy for one tag's value.
pub trait TagFormatter {
    fn format(&self, value: &str) -> String;
}

/// Value shown as written.
pub struct Verbatim;

impl TagFormatter for Verbatim {
    fn format(&self, value: &str) -> String {
        value.to_string()
    }
}

/// `YYYY.MM.DD` dates, with `??` for unknown parts.
pub struct DateFormatter;

impl TagFormatter for DateFormatter {
    fn format(&self, value: &str) -> String {
        format_date(value)
    }
}

/// Placeholder values such as `?` or `????.??.??` read as absent.
pub struct Unknowable;

impl TagFormatter for Unknowable {
    fn format(&self, value: &str) -> String {
        if value.chars().all(|c| matches!(c, '?' | '.' | '-')) {
            String::new()
        } else {
            value.to_string()
        }
    }
}

/// Strategy used for `tag`.
pub fn formatter_for(tag: &Tag) -> &'static dyn TagFormatter {
    match tag {
        Tag::Date => &DateFormatter,
        Tag::Round | Tag::WhiteTitle | Tag::BlackTitle | Tag::Site => &Unknowable,
        Tag::Event
        | Tag::White
        | Tag::Black
        | Tag::Result
        | Tag::WhiteElo
        | Tag::BlackElo
        | Tag::Annotator
        | Tag::SetUp
        | Tag::Fen
        | Tag::Other(_) => &Verbatim,
    }
}

/// `1999.02.25` becomes `25 february 1999`; `1999.02.??` becomes
/// `february 1999`; `1999.??.??` becomes `1999`. Anything else is
/// returned unchanged.
pub fn format_date(value: &str) -> String {
    let parts: Vec<&str> = value.split('.').collect();
    let [year, month, day] = parts[..] else {
        return value.to_string();
    };

    let is_digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(year, 4) {
        return value.to_string();
    }

    let month_name = if is_digits(month, 2) {
        month
            .parse::<usize>()
            .ok()
            .and_then(|m| m.checked_sub(1))
            .and_then(|m| MONTHS.get(m))
    } else if month == "??" {
        None
    } else {
        return value.to_string();
    };

    match (month_name, day) {
        (Some(name), day) if is_digits(day, 2) => format!("{} {} {}", day, name, year),
        (Some(name), "??") => format!("{} {}", name, year),
        (None, day) if is_digits(day, 2) || day == "??" => year.to_string(),
        _ => value.to_string(),
    }
}

/// Player name with title and rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FullName {
    pub name: String,
    pub title: Option<String>,
    pub elo: Option<String>,
}

impl FullName {
    /// The title is only kept alongside a rating; a `-` title is ignored.
    pub fn from_headers(headers: &GameHeaders, color: PieceColor) -> Option<Self> {
        let (name_tag, elo_tag, title_tag) = match color {
            PieceColor::White => (Tag::White, Tag::WhiteElo, Tag::WhiteTitle),
            PieceColor::Black => (Tag::Black, Tag::BlackElo, Tag::BlackTitle),
        };
        let name = headers.get_tag(&name_tag)?.to_string();
        let elo = headers.get_tag(&elo_tag).map(str::to_string);
        let title = elo.as_ref().and_then(|_| {
            headers
                .get_tag(&title_tag)
                .filter(|t| !t.is_empty() && *t != "-")
                .map(str::to_string)
        });
        Some(Self { name, title, elo })
    }
}

impl std::fmt::Display for FullName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)?;
        match (&self.title, &self.elo) {
            (Some(title), Some(elo)) => write!(f, " ({} {})", title, elo),
            (None, Some(elo)) => write!(f, " ({})", elo),
            _ => Ok(()),
        }
    }
}

/// Event with round and date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FullEvent {
    pub event: String,
    pub round: Option<String>,
    pub date: Option<String>,
}

impl FullEvent {
    pub fn from_headers(headers: &GameHeaders) -> Option<Self> {
        let event = headers.get_tag(&Tag::Event)?.to_string();
        let round = headers
            .get_tag(&Tag::Round)
            .filter(|r| *r != "?")
            .map(str::to_string);
        let date = headers
            .get_tag(&Tag::Date)
            .filter(|d| *d != "????.??.??")
            .map(format_date);
        Some(Self { event, round, date })
    }
}

impl std::fmt::Display for FullEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.event)?;
        if let Some(round) = &self.round {
            write!(f, ", round {}", round)?;
        }
        if let Some(date) = &self.date {
            write!(f, ", {}", date)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderField {
    pub tag: String,
    pub value: String,
}

/// Formatted headers of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderView {
    /// Every tag in document order, formatted by its strategy. Tags whose
    /// formatted value is empty are left out.
    pub fields: Vec<HeaderField>,
    pub white: Option<FullName>,
    pub black: Option<FullName>,
    pub event: Option<FullEvent>,
}

pub fn format_headers(headers: &GameHeaders) -> HeaderView {
    let fields = headers
        .iter()
        .filter_map(|(tag, value)| {
            let formatted = formatter_for(&tag).format(value);
            (!formatted.is_empty()).then(|| HeaderField {
                tag: tag.name().to_string(),
                value: formatted,
            })
        })
        .collect();

    HeaderView {
        fields,
        white: FullName::from_headers(headers, PieceColor::White),
        black: FullName::from_headers(headers, PieceColor::Black),
        event: FullEvent::from_headers(headers),
    }
}
