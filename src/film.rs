//! Film value type.

use std::fmt;

use serde::Serialize;

/// Base year for the one-byte year delta stored in film records.
pub const BASE_YEAR: u16 = 1900;

/// A film, keyed by title and release year.
///
/// Field order matters: the derived `Ord` compares `title` first (byte-wise,
/// the same order the film file is sorted in) and then `year`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Film {
    pub title: String,
    pub year: u16,
}

impl Film {
    pub fn new(title: impl Into<String>, year: u16) -> Self {
        Self {
            title: title.into(),
            year,
        }
    }
}

impl fmt::Display for Film {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.year)
    }
}
