//! Fixed category vocabularies and their display colors
//!
//! Every category-keyed output (donut slices, box groups, pivot columns, tabs)
//! is laid out from these lists, never from whatever categories happen to
//! appear in a document.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Airline codes in display order
pub const AIRLINE_ORDER: [&str; 3] = ["HH", "RF", "8M"];

/// Process labels in display order
pub const PROCESS_ORDER: [&str; 3] = ["소닉", "라바", "로보캅"];

/// Color used for any code without an assigned color
pub const DEFAULT_COLOR: &str = "#B2C6D3";

const COLORS: [(&str, &str); 6] = [
    ("HH", "#b2c6d3"),
    ("RF", "#69C6DD"),
    ("8M", "#ECAB86"),
    ("소닉", "#69C6DD"),
    ("라바", "#ECAB86"),
    ("로보캅", "#B2C6D3"),
];

/// A category vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Airline,
    Process,
}

/// Ordered codes of a domain
pub fn ordered_codes(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Airline => &AIRLINE_ORDER,
        Domain::Process => &PROCESS_ORDER,
    }
}

/// Display color of a code, falling back to [`DEFAULT_COLOR`]
pub fn color_of(code: &str) -> &'static str {
    COLORS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_COLOR)
}

/// An ordered, fixed category list with position lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySet {
    codes: &'static [&'static str],
}

impl CategorySet {
    pub fn of(domain: Domain) -> Self {
        Self {
            codes: ordered_codes(domain),
        }
    }

    pub fn codes(&self) -> &'static [&'static str] {
        self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Registry position of `code`, `None` for unrecognized codes
    pub fn position(&self, code: &str) -> Option<usize> {
        self.codes.iter().position(|c| *c == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.position(code).is_some()
    }
}

/// The closed set of cleaning processes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Process {
    Sonic,
    Lava,
    Robocop,
}

impl Process {
    pub const ALL: [Self; 3] = [Self::Sonic, Self::Lava, Self::Robocop];

    /// Display label as it appears in the documents
    pub fn label(self) -> &'static str {
        match self {
            Self::Sonic => "소닉",
            Self::Lava => "라바",
            Self::Robocop => "로보캅",
        }
    }

    /// Exact label match; anything else is unrecognized
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == label.trim())
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Process {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}
