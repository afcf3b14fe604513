//! Numeric Annotation Glyphs.
//!
//! Symbolic glyphs found in movetext are mapped to their numeric code on
//! input; codes are mapped back to one canonical glyph for display.

/// Canonical glyph for each code with a display form.
const CANONICAL: &[(u8, &str)] = &[
    (1, "!"),
    (2, "?"),
    (3, "!!"),
    (4, "??"),
    (5, "!?"),
    (6, "?!"),
    (7, "\u{25a1}"),
    (10, "="),
    (13, "\u{221e}"),
    (14, "\u{2a72}"),
    (15, "\u{2a71}"),
    (16, "\u{00b1}"),
    (17, "\u{2213}"),
    (18, "+\u{2212}"),
    (19, "\u{2212}+"),
    (22, "\u{2a00}"),
    (32, "\u{27f3}"),
    (36, "\u{2192}"),
    (40, "\u{2191}"),
    (132, "\u{21c6}"),
    (138, "\u{2295}"),
    (140, "\u{2206}"),
];

/// ASCII spellings accepted on input.
const ALIASES: &[(&str, u8)] = &[
    ("+/=", 14),
    ("=/+", 15),
    ("+/-", 16),
    ("-/+", 17),
    ("+-", 18),
    ("-+", 19),
    ("+=", 14),
    ("=+", 15),
    ("inf", 13),
];

/// Numeric code of a symbolic glyph, canonical or alias.
pub fn from_symbol(symbol: &str) -> Option<u8> {
    CANONICAL
        .iter()
        .find(|(_, glyph)| *glyph == symbol)
        .map(|(code, _)| *code)
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(alias, _)| *alias == symbol)
                .map(|(_, code)| *code)
        })
}

/// Canonical glyph of a code, if it has one.
pub fn symbol(code: u8) -> Option<&'static str> {
    CANONICAL
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, glyph)| *glyph)
}

/// Display form of a code: the canonical glyph, or `$n` when there is none.
pub fn format(code: u8) -> String {
    match symbol(code) {
        Some(glyph) => glyph.to_string(),
        None => format!("${}", code),
    }
}

/// Longest symbolic glyph at the start of `input`, with its byte length.
///
/// Alphabetic aliases only match as whole words so that they never swallow
/// the start of a move.
pub(crate) fn match_prefix(input: &str) -> Option<(u8, usize)> {
    let candidates = CANONICAL
        .iter()
        .map(|(code, glyph)| (*glyph, *code))
        .chain(ALIASES.iter().copied());

    let mut best: Option<(u8, usize)> = None;
    for (glyph, code) in candidates {
        if !input.starts_with(glyph) {
            continue;
        }
        let len = glyph.len();
        let word_like = glyph.chars().all(|c| c.is_ascii_alphanumeric());
        if word_like
            && input[len..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric())
        {
            continue;
        }
        if best.map_or(true, |(_, best_len)| len > best_len) {
            best = Some((code, len));
        }
    }
    best
}

/// All canonical `(code, glyph)` pairs.
pub fn table() -> &'static [(u8, &'static str)] {
    CANONICAL
}
