// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use smol_str::SmolStr;

pub type Sections = SmallVec<[SmolStr; 3]>;

/// Structured form of a text location: `Book Section:Segment-ToSegment`.
///
/// Sections are kept as strings so folio-style numbering (`2a`, `2b`) survives.
/// For a plain (non-range) location `to_sections == sections`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParsedRef {
    book: SmolStr,
    sections: Sections,
    to_sections: Sections,
}

impl ParsedRef {
    pub fn book(&self) -> &str {
        &self.book
    }

    pub fn sections(&self) -> &[SmolStr] {
        &self.sections
    }

    pub fn to_sections(&self) -> &[SmolStr] {
        &self.to_sections
    }

    pub fn is_range(&self) -> bool {
        self.sections != self.to_sections
    }

    /// Index of the first section level where the range end differs from its start.
    fn range_divergence(&self) -> Option<usize> {
        self.sections
            .iter()
            .zip(self.to_sections.iter())
            .position(|(from, to)| from != to)
    }

    /// Human form, e.g. `Genesis 1:2-4`.
    pub fn human(&self) -> String {
        let mut out = String::from(self.book.as_str());
        if self.sections.is_empty() {
            return out;
        }
        out.push(' ');
        out.push_str(&join(&self.sections, ':'));
        if let Some(divergence) = self.range_divergence() {
            out.push('-');
            out.push_str(&join(&self.to_sections[divergence..], ':'));
        }
        out
    }

    /// URL form, e.g. `Genesis.1.2-4` (spaces in the book become `_`).
    pub fn normalized(&self) -> String {
        let mut out = self.book.replace(' ', "_");
        if self.sections.is_empty() {
            return out;
        }
        out.push('.');
        out.push_str(&join(&self.sections, '.'));
        if let Some(divergence) = self.range_divergence() {
            out.push('-');
            out.push_str(&join(&self.to_sections[divergence..], '.'));
        }
        out
    }
}

fn join(parts: &[SmolStr], delim: char) -> String {
    let mut out = String::new();
    for (idx, part) in parts.iter().enumerate() {
        if idx > 0 {
            out.push(delim);
        }
        out.push_str(part);
    }
    out
}

fn location_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<book>.*?[^\s.:])(?:[\s.](?P<sections>[0-9]+[ab]?(?:[.:][0-9]+[ab]?)*))?$")
            .expect("location pattern compiles")
    })
}

fn range_end_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9]+[ab]?(?:[.:][0-9]+[ab]?)*$").expect("range end pattern compiles")
    })
}

fn split_sections(raw: &str) -> Sections {
    raw.split(|c| c == ':' || c == '.').map(SmolStr::new).collect()
}

/// Parses a human (`Genesis 1:2-4`) or URL (`Genesis.1.2-4`, `Song_of_Songs.2`) location.
pub fn parse_ref(input: &str) -> Result<ParsedRef, RefError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(RefError::Empty);
    }
    let text = trimmed.replace('_', " ");

    let (from, to) = match memchr::memchr(b'-', text.as_bytes()) {
        Some(idx) => (text[..idx].trim_end(), Some(text[idx + 1..].trim())),
        None => (text.as_str(), None),
    };

    let captures = location_pattern()
        .captures(from)
        .ok_or_else(|| RefError::MalformedSections(trimmed.to_owned()))?;

    let book_raw = captures.name("book").map(|m| m.as_str()).unwrap_or_default();
    if !book_raw.chars().any(char::is_alphabetic) {
        return Err(RefError::MissingBook(trimmed.to_owned()));
    }
    let book = SmolStr::new(book_raw.split_whitespace().collect::<Vec<_>>().join(" "));

    let sections = captures
        .name("sections")
        .map(|m| split_sections(m.as_str()))
        .unwrap_or_default();

    let to_sections = match to {
        None => sections.clone(),
        Some(end) => {
            if !range_end_pattern().is_match(end) {
                return Err(RefError::MalformedRange {
                    input: trimmed.to_owned(),
                    end: end.to_owned(),
                });
            }
            if sections.is_empty() {
                return Err(RefError::RangeWithoutStart(trimmed.to_owned()));
            }
            let tail = split_sections(end);
            if tail.len() > sections.len() {
                return Err(RefError::RangeTooDeep(trimmed.to_owned()));
            }
            let mut to_sections: Sections = sections[..sections.len() - tail.len()].into();
            to_sections.extend(tail);
            to_sections
        }
    };

    Ok(ParsedRef {
        book,
        sections,
        to_sections,
    })
}

/// An identifier for a location in the text corpus.
///
/// Construction validates the text, so every `Ref` held by the store is parseable.
/// `==` compares the original text; use [`Ref::same_location`] when the two sides may
/// spell the same location differently (`Genesis.1` vs `Genesis 1`, `1:1-1:3` vs `1:1-3`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ref {
    text: SmolStr,
    parsed: ParsedRef,
}

impl Ref {
    pub fn new(text: impl AsRef<str>) -> Result<Self, RefError> {
        let text = text.as_ref().trim();
        let parsed = parse_ref(text)?;
        Ok(Self {
            text: SmolStr::new(text),
            parsed,
        })
    }

    fn from_parsed(parsed: ParsedRef) -> Self {
        Self {
            text: SmolStr::new(parsed.human()),
            parsed,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The same location spelled in human form (`Genesis.1.2` -> `Genesis 1:2`).
    pub fn canonical(&self) -> Ref {
        Self::from_parsed(self.parsed.clone())
    }

    pub fn parsed(&self) -> &ParsedRef {
        &self.parsed
    }

    pub fn book(&self) -> &str {
        self.parsed.book()
    }

    pub fn is_range(&self) -> bool {
        self.parsed.is_range()
    }

    pub fn normalized(&self) -> String {
        self.parsed.normalized()
    }

    pub fn same_location(&self, other: &Ref) -> bool {
        self.parsed == other.parsed
    }

    /// The section containing this location (drops the segment level).
    ///
    /// Ranges reduce to the section they start in. A ref that is already a single
    /// section (or a whole book) is returned unchanged.
    pub fn section_ref(&self) -> Ref {
        let depth = self.parsed.sections.len();
        if depth < 2 && !self.parsed.is_range() {
            return self.clone();
        }
        let keep = if depth >= 2 { depth - 1 } else { depth };
        let sections: Sections = self.parsed.sections[..keep].into();
        Self::from_parsed(ParsedRef {
            book: self.parsed.book.clone(),
            to_sections: sections.clone(),
            sections,
        })
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Ref {
    type Err = RefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Ref {
    type Error = RefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Ref> for String {
    fn from(value: Ref) -> Self {
        value.text.into()
    }
}

/// The last ref of a displayed list (the one titles and URLs are derived from).
pub fn last_ref(refs: &[Ref]) -> Option<&Ref> {
    refs.last()
}

/// Element-wise structural comparison of two ref lists.
pub fn same_locations(left: &[Ref], right: &[Ref]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(l, r)| l.same_location(r))
}

/// Parses a batch of raw refs; all-or-nothing so callers never act on a partial list.
pub fn parse_refs<I, S>(raw: I) -> Result<Vec<Ref>, RefError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter().map(Ref::new).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefError {
    #[error("ref must not be empty")]
    Empty,
    #[error("ref '{0}' does not name a book")]
    MissingBook(String),
    #[error("ref '{0}' has malformed sections")]
    MalformedSections(String),
    #[error("ref '{input}' has a malformed range end '{end}'")]
    MalformedRange { input: String, end: String },
    #[error("ref '{0}' has a range but no starting section")]
    RangeWithoutStart(String),
    #[error("range end of ref '{0}' is deeper than its start")]
    RangeTooDeep(String),
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{parse_ref, same_locations, Ref, RefError};

    #[rstest]
    #[case("Genesis 1", "Genesis", &["1"], &["1"])]
    #[case("Genesis 1:2", "Genesis", &["1", "2"], &["1", "2"])]
    #[case("Genesis 1:2-4", "Genesis", &["1", "2"], &["1", "4"])]
    #[case("Genesis 1:2-2:4", "Genesis", &["1", "2"], &["2", "4"])]
    #[case("Genesis.1.2", "Genesis", &["1", "2"], &["1", "2"])]
    #[case("Song_of_Songs.2", "Song of Songs", &["2"], &["2"])]
    #[case("2 Kings 3:1", "2 Kings", &["3", "1"], &["3", "1"])]
    #[case("Shabbat 2a:5", "Shabbat", &["2a", "5"], &["2a", "5"])]
    #[case("Rashi on Genesis 1:1:1", "Rashi on Genesis", &["1", "1", "1"], &["1", "1", "1"])]
    #[case("Genesis", "Genesis", &[], &[])]
    fn parses_book_and_sections(
        #[case] input: &str,
        #[case] book: &str,
        #[case] sections: &[&str],
        #[case] to_sections: &[&str],
    ) {
        let parsed = parse_ref(input).expect("parse");
        assert_eq!(parsed.book(), book);
        assert_eq!(parsed.sections(), sections);
        assert_eq!(parsed.to_sections(), to_sections);
    }

    #[rstest]
    #[case("Genesis 1", "Genesis.1")]
    #[case("Genesis 1:2-4", "Genesis.1.2-4")]
    #[case("Genesis 1:2-2:4", "Genesis.1.2-2.4")]
    #[case("Song of Songs 2", "Song_of_Songs.2")]
    #[case("Genesis", "Genesis")]
    fn normalizes_for_urls(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Ref::new(input).unwrap().normalized(), expected);
    }

    #[test]
    fn normalized_form_parses_back_to_the_same_location() {
        let original = Ref::new("Song of Songs 2:3-5").unwrap();
        let reparsed = Ref::new(original.normalized()).unwrap();
        assert!(original.same_location(&reparsed));
        assert_ne!(original, reparsed);
        assert_eq!(reparsed.canonical(), original);
    }

    #[test]
    fn spanning_ranges_compare_structurally() {
        let long = Ref::new("Genesis 1:1-1:3").unwrap();
        let short = Ref::new("Genesis 1:1-3").unwrap();
        assert!(long.same_location(&short));
        assert!(same_locations(&[long], &[short]));
        assert!(!Ref::new("Genesis 1:1-4")
            .unwrap()
            .same_location(&Ref::new("Genesis 1:1-3").unwrap()));
    }

    #[rstest]
    #[case("Genesis 1:3", "Genesis 1")]
    #[case("Genesis 1", "Genesis 1")]
    #[case("Genesis 1:3-2:4", "Genesis 1")]
    #[case("Shabbat 2a:5", "Shabbat 2a")]
    fn section_ref_drops_the_segment_level(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Ref::new(input).unwrap().section_ref().as_str(), expected);
    }

    #[rstest]
    #[case("", RefError::Empty)]
    #[case("   ", RefError::Empty)]
    #[case("12:3", RefError::MissingBook("12:3".to_owned()))]
    #[case("Genesis 1:", RefError::MalformedSections("Genesis 1:".to_owned()))]
    #[case("Genesis-4", RefError::RangeWithoutStart("Genesis-4".to_owned()))]
    #[case("Genesis 1-2:3", RefError::RangeTooDeep("Genesis 1-2:3".to_owned()))]
    fn rejects_malformed_refs(#[case] input: &str, #[case] expected: RefError) {
        assert_eq!(Ref::new(input).unwrap_err(), expected);
    }

    #[test]
    fn rejects_malformed_range_end() {
        let err = Ref::new("Genesis 1:2-x").unwrap_err();
        assert!(matches!(err, RefError::MalformedRange { .. }));
    }

    #[test]
    fn serializes_as_its_text_and_validates_on_the_way_back() {
        let r = Ref::new("Genesis 1:2").unwrap();
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, "\"Genesis 1:2\"");
        let back: Ref = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
        assert!(serde_json::from_str::<Ref>("\"\"").is_err());
    }
}
