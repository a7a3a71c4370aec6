//! The fixed structural taxonomy of a legal document.
//!
//! Declaration order is containment order: a level can only be nested under a
//! level that sorts strictly before it.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the five structural levels, broadest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Part,
    Chapter,
    Section,
    Article,
    Clause,
}

impl Level {
    /// All levels in taxonomy order.
    pub const ALL: [Level; 5] = [
        Level::Part,
        Level::Chapter,
        Level::Section,
        Level::Article,
        Level::Clause,
    ];

    /// Position in the taxonomy (Part = 0 … Clause = 4).
    pub fn index(self) -> usize {
        match self {
            Self::Part => 0,
            Self::Chapter => 1,
            Self::Section => 2,
            Self::Article => 3,
            Self::Clause => 4,
        }
    }

    /// Depth weight used by the level-match similarity bonus (Part = 1 … Clause = 5).
    pub fn weight(self) -> f64 {
        (self.index() + 1) as f64
    }

    /// Largest weight in the taxonomy.
    pub fn max_weight() -> f64 {
        Level::Clause.weight()
    }

    /// Whether a provision at `child` may sit anywhere below a provision at `self`.
    pub fn can_contain(self, child: Level) -> bool {
        child.index() > self.index()
    }

    /// Lowercase tag used in identifiers and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Part => "part",
            Self::Chapter => "chapter",
            Self::Section => "section",
            Self::Article => "article",
            Self::Clause => "clause",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "part" => Ok(Self::Part),
            "chapter" => Ok(Self::Chapter),
            "section" => Ok(Self::Section),
            "article" => Ok(Self::Article),
            "clause" => Ok(Self::Clause),
            other => Err(crate::Error::InvalidInput(format!("unknown level: {other}"))),
        }
    }
}
