use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Inclusive calendar-date range.
///
/// `end = None` is a range collapsed to its start boundary (the user picked
/// only one date so far) and matches that exact day only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: None,
        }
    }

    /// Build a range from the two optional request boundaries.
    /// One boundary alone collapses to that day; none means "no date filter".
    pub fn from_bounds(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Option<Self> {
        match (from, to) {
            (Some(start), Some(end)) => Some(Self::between(start, end)),
            (Some(day), None) | (None, Some(day)) => Some(Self::single_day(day)),
            (None, None) => None,
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        match self.end {
            Some(end) => self.start <= day && day <= end,
            None => day == self.start,
        }
    }
}

/// Current user selection narrowing the record set.
///
/// Empty sets mean "all values". A selection is never mutated in place:
/// the `with_*` builders consume it and return the replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub cities: BTreeSet<String>,
    #[serde(default)]
    pub channels: BTreeSet<String>,
    #[serde(default)]
    pub categories: BTreeSet<String>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn with_cities<I, S>(mut self, cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cities = cities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = channels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// True when no predicate is active.
    pub fn is_unrestricted(&self) -> bool {
        self.date_range.is_none()
            && self.cities.is_empty()
            && self.channels.is_empty()
            && self.categories.is_empty()
    }
}

/// Body of POST /api/d402/overview
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesOverviewRequest {
    /// Start date in format "YYYY-MM-DD"
    pub date_from: Option<NaiveDate>,
    /// End date in format "YYYY-MM-DD"
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Number of product rows to return, server default when absent
    pub top_n: Option<usize>,
}

impl SalesOverviewRequest {
    pub fn to_selection(&self) -> FilterSelection {
        let selection = FilterSelection::new()
            .with_cities(self.cities.iter().cloned())
            .with_channels(self.channels.iter().cloned())
            .with_categories(self.categories.iter().cloned());

        match DateRange::from_bounds(self.date_from, self.date_to) {
            Some(range) => selection.with_date_range(range),
            None => selection,
        }
    }
}
