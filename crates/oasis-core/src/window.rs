//! Booking list window state.
//!
//! The UI hands over its window as loose key/value pairs (query
//! parameters). [`WindowState::from_params`] turns them into the tagged
//! filter/sort/page tuple used for both the store query and the cache key.
//!
//! | Key | Form | Default |
//! |-----|------|---------|
//! | `status` | booking status, or `all` | `all` |
//! | `sortBy` | `{field}-{asc\|desc}` | `startDate-desc` |
//! | `page` | positive integer | `1` |
//!
//! Unknown keys are ignored.

use oasis_types::{Collection, Filter, Sort, SortDirection};

use crate::cache::QueryKey;
use crate::error::ValidationError;

/// Column the status parameter filters on.
const STATUS_FIELD: &str = "status";

/// Status value meaning "no filter".
const ALL_STATUSES: &str = "all";

/// The filter, sort and page of the booking list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowState {
    /// Row filter.
    pub filter: Filter,
    /// Ordering.
    pub sort: Sort,
    /// 1-indexed page.
    pub page: u32,
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            filter: Filter::All,
            sort: Sort::new("startDate", SortDirection::Desc),
            page: 1,
        }
    }
}

impl WindowState {
    /// Parse window state from key/value pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidWindow`] for a malformed `sortBy` or
    /// a `page` that is not a positive integer.
    pub fn from_params<I, K, V>(params: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut window = Self::default();
        for (key, value) in params {
            let value = value.as_ref().trim();
            match key.as_ref() {
                "status" => window.filter = parse_status(value),
                "sortBy" => window.sort = parse_sort(value)?,
                "page" => window.page = parse_page(value)?,
                _ => {}
            }
        }
        Ok(window)
    }

    /// The same window on another page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Cache key for this window.
    pub fn key(&self) -> QueryKey {
        QueryKey::Listing {
            kind: Collection::Bookings,
            filter: self.filter.clone(),
            sort: Some(self.sort.clone()),
            page: Some(self.page),
        }
    }
}

fn parse_status(value: &str) -> Filter {
    if value.is_empty() || value == ALL_STATUSES {
        Filter::All
    } else {
        Filter::equals(STATUS_FIELD, value)
    }
}

fn parse_sort(value: &str) -> Result<Sort, ValidationError> {
    let malformed = || ValidationError::InvalidWindow(format!("sortBy `{value}`"));

    let (field, direction) = value.rsplit_once('-').ok_or_else(malformed)?;
    let direction = SortDirection::parse(direction).ok_or_else(malformed)?;
    let valid_field =
        !field.is_empty() && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_field {
        return Err(malformed());
    }
    Ok(Sort::new(field, direction))
}

fn parse_page(value: &str) -> Result<u32, ValidationError> {
    match value.parse::<u32>() {
        Ok(page) if page >= 1 => Ok(page),
        _ => Err(ValidationError::InvalidWindow(format!("page `{value}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_give_defaults() {
        let window = WindowState::from_params(Vec::<(&str, &str)>::new());
        assert_eq!(window, Ok(WindowState::default()));
    }

    #[test]
    fn all_status_means_no_filter() {
        let window = WindowState::from_params([("status", "all")]).ok();
        assert_eq!(window.map(|w| w.filter), Some(Filter::All));
    }

    #[test]
    fn full_window_is_parsed() {
        let window =
            WindowState::from_params([("status", "checked-in"), ("sortBy", "totalPrice-asc"), ("page", "3")]);
        assert_eq!(
            window,
            Ok(WindowState {
                filter: Filter::equals("status", "checked-in"),
                sort: Sort::new("totalPrice", SortDirection::Asc),
                page: 3,
            })
        );
    }

    #[test]
    fn malformed_sort_is_rejected() {
        for bad in ["totalPrice", "totalPrice-up", "-desc", "total price-asc"] {
            assert!(
                matches!(
                    WindowState::from_params([("sortBy", bad)]),
                    Err(ValidationError::InvalidWindow(_))
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn page_must_be_positive_integer() {
        for bad in ["0", "-1", "two", ""] {
            assert!(matches!(
                WindowState::from_params([("page", bad)]),
                Err(ValidationError::InvalidWindow(_))
            ));
        }
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let window = WindowState::from_params([("discount", "with-discount")]);
        assert_eq!(window, Ok(WindowState::default()));
    }

    #[test]
    fn key_differs_by_filter_and_page() {
        let base = WindowState::default();
        let filtered = WindowState {
            filter: Filter::equals("status", "unconfirmed"),
            ..base.clone()
        };
        assert_ne!(base.key(), filtered.key());
        assert_ne!(base.key(), base.with_page(2).key());
        assert_eq!(base.key().kind(), Collection::Bookings);
    }
}
