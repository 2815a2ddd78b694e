//! Filter and sort descriptors for windowed reads.
//!
//! A window is the `(filter, sort, page)` tuple that selects which slice of a
//! collection a read returns. These are explicit tagged types so that cache
//! keys and store queries are built from the same values.

use serde::{Deserialize, Serialize};

/// Row filter for a collection read.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Filter {
    /// No predicate; every row matches.
    #[default]
    All,
    /// Single equality predicate on one column.
    Equals {
        /// Column name.
        field: String,
        /// Required value, compared as text.
        value: String,
    },
}

impl Filter {
    /// Build an equality filter.
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    /// Wire token (`asc` / `desc`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Parse a wire token, case-sensitive.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Ordering for a collection read.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Sort {
    /// Column to order by.
    pub field: String,
    /// Ascending or descending.
    pub direction: SortDirection,
}

impl Sort {
    /// Build a sort descriptor.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

impl core::fmt::Display for Sort {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-{}", self.field, self.direction.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_displays_as_query_token() {
        let sort = Sort::new("totalPrice", SortDirection::Asc);
        assert_eq!(sort.to_string(), "totalPrice-asc");
    }

    #[test]
    fn direction_parse_rejects_unknown_tokens() {
        assert_eq!(SortDirection::parse("desc"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::parse("DESC"), None);
        assert_eq!(SortDirection::parse(""), None);
    }

    #[test]
    fn filters_differ_by_value() {
        assert_ne!(
            Filter::equals("status", "checked-in"),
            Filter::equals("status", "checked-out")
        );
        assert_ne!(Filter::All, Filter::equals("status", "unconfirmed"));
    }
}
