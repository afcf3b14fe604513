//! PGN tag pairs.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Tags with a known meaning. Anything else is carried as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Event,
    Site,
    Date,
    Round,
    White,
    Black,
    Result,
    WhiteElo,
    BlackElo,
    WhiteTitle,
    BlackTitle,
    Annotator,
    SetUp,
    Fen,
    Other(String),
}

impl Tag {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Event" => Self::Event,
            "Site" => Self::Site,
            "Date" => Self::Date,
            "Round" => Self::Round,
            "White" => Self::White,
            "Black" => Self::Black,
            "Result" => Self::Result,
            "WhiteElo" => Self::WhiteElo,
            "BlackElo" => Self::BlackElo,
            "WhiteTitle" => Self::WhiteTitle,
            "BlackTitle" => Self::BlackTitle,
            "Annotator" => Self::Annotator,
            "SetUp" => Self::SetUp,
            "FEN" => Self::Fen,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Event => "Event",
            Self::Site => "Site",
            Self::Date => "Date",
            Self::Round => "Round",
            Self::White => "White",
            Self::Black => "Black",
            Self::Result => "Result",
            Self::WhiteElo => "WhiteElo",
            Self::BlackElo => "BlackElo",
            Self::WhiteTitle => "WhiteTitle",
            Self::BlackTitle => "BlackTitle",
            Self::Annotator => "Annotator",
            Self::SetUp => "SetUp",
            Self::Fen => "FEN",
            Self::Other(name) => name,
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered tag/value pairs. A repeated tag overwrites the earlier value but
/// keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameHeaders {
    entries: Vec<(String, String)>,
}

impl GameHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        let tag = tag.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == tag) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((tag, value)),
        }
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, value)| value.as_str())
    }

    pub fn get_tag(&self, tag: &Tag) -> Option<&str> {
        self.get(tag.name())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tag, &str)> + '_ {
        self.entries
            .iter()
            .map(|(name, value)| (Tag::from_name(name), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for GameHeaders {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_and_overwrite() {
        let mut headers = GameHeaders::new();
        headers.insert("White", "Kasparov");
        headers.insert("Black", "Topalov");
        headers.insert("White", "Kasparov, Garry");

        let tags: Vec<(Tag, &str)> = headers.iter().collect();
        assert_eq!(
            tags,
            vec![(Tag::White, "Kasparov, Garry"), (Tag::Black, "Topalov")]
        );
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_unknown_tags_are_kept() {
        let mut headers = GameHeaders::new();
        headers.insert("PlyCount", "87");
        assert_eq!(headers.get("PlyCount"), Some("87"));
        assert_eq!(headers.iter().next().unwrap().0, Tag::Other("PlyCount".into()));
        assert_eq!(headers.get_tag(&Tag::Event), None);
    }

    #[test]
    fn test_tag_names_round_trip() {
        for name in ["Event", "FEN", "SetUp", "WhiteTitle", "Custom"] {
            assert_eq!(Tag::from_name(name).name(), name);
        }
    }

    #[test]
    fn test_serializes_as_ordered_map() {
        let mut headers = GameHeaders::new();
        headers.insert("Site", "Wijk aan Zee");
        headers.insert("Event", "Hoogovens");
        let json = serde_json::to_string(&headers).unwrap();
        assert_eq!(json, r#"{"Site":"Wijk aan Zee","Event":"Hoogovens"}"#);
    }
}
