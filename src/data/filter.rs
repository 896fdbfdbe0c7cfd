use std::collections::BTreeSet;

use super::model::{
    Listing, ListingsDataset, COL_AVAILABILITY_GROUP, COL_HOST_IS_BIG,
};

// ---------------------------------------------------------------------------
// FilterSpec: the combined set of user-chosen constraints
// ---------------------------------------------------------------------------

/// An inclusive numeric range. Both bounds count: a listing priced exactly
/// at `min` or `max` passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Self {
        NumericRange { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// The host-size dropdown. `All` is the sentinel that disables the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostSizeFilter {
    #[default]
    All,
    Small,
    Big,
}

impl HostSizeFilter {
    pub const ALL: [HostSizeFilter; 3] =
        [HostSizeFilter::All, HostSizeFilter::Small, HostSizeFilter::Big];

    pub fn label(self) -> &'static str {
        match self {
            HostSizeFilter::All => "All",
            HostSizeFilter::Small => "Small Hosts (≤3 listings)",
            HostSizeFilter::Big => "Big Hosts (>3 listings)",
        }
    }

    fn matches(self, flag: Option<bool>) -> bool {
        match self {
            HostSizeFilter::All => true,
            HostSizeFilter::Small => flag == Some(false),
            HostSizeFilter::Big => flag == Some(true),
        }
    }
}

/// Current selections for every sidebar control. This is plain data: the UI
/// edits it, `filtered_indices` consumes it, nothing else happens in between.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    /// Permitted values per multiselect. An empty set matches nothing.
    pub neighbourhood_groups: BTreeSet<String>,
    pub room_types: BTreeSet<String>,
    pub countries: BTreeSet<String>,
    /// `None` is the "All" sentinel.
    pub availability_group: Option<String>,
    pub host_size: HostSizeFilter,
    pub price: NumericRange,
    pub construction_year: NumericRange,
    pub minimum_nights: NumericRange,
}

impl Default for FilterSpec {
    fn default() -> Self {
        FilterSpec {
            neighbourhood_groups: BTreeSet::new(),
            room_types: BTreeSet::new(),
            countries: BTreeSet::new(),
            availability_group: None,
            host_size: HostSizeFilter::All,
            price: NumericRange::new(0.0, 0.0),
            construction_year: NumericRange::new(0.0, 0.0),
            minimum_nights: NumericRange::new(0.0, 0.0),
        }
    }
}

impl FilterSpec {
    /// The "show everything" spec for a dataset: every category selected,
    /// ranges spanning the whole table. Range bounds are floored/ceiled so
    /// boundary rows stay inside the default selection.
    pub fn for_dataset(dataset: &ListingsDataset) -> Self {
        FilterSpec {
            neighbourhood_groups: dataset.neighbourhood_groups.iter().cloned().collect(),
            room_types: dataset.room_types.iter().cloned().collect(),
            countries: dataset.countries.iter().cloned().collect(),
            availability_group: None,
            host_size: HostSizeFilter::All,
            price: whole_range(dataset.price_bounds),
            construction_year: whole_range(dataset.year_bounds),
            minimum_nights: whole_range(dataset.min_nights_bounds),
        }
    }
}

fn whole_range(bounds: (f64, f64)) -> NumericRange {
    NumericRange::new(bounds.0.floor(), bounds.1.ceil())
}

// ---------------------------------------------------------------------------
// Applying the spec
// ---------------------------------------------------------------------------

/// Return indices of listings that pass every active constraint, in source
/// order. The table itself is never touched.
///
/// Membership is strict: a null value never matches a multiselect, even when
/// every category is ticked, and a null never sits inside a range. The two
/// dropdown filters only apply when their source column exists in the file
/// and the selection is not the "All" sentinel.
pub fn filtered_indices(dataset: &ListingsDataset, spec: &FilterSpec) -> Vec<usize> {
    let availability_choice = if dataset.has_column(COL_AVAILABILITY_GROUP) {
        spec.availability_group.as_deref()
    } else {
        None
    };
    let host_filter = if dataset.has_column(COL_HOST_IS_BIG) {
        spec.host_size
    } else {
        HostSizeFilter::All
    };

    dataset
        .listings
        .iter()
        .enumerate()
        .filter(|(_, listing)| {
            passes(listing, spec, availability_choice, host_filter)
        })
        .map(|(i, _)| i)
        .collect()
}

fn passes(
    listing: &Listing,
    spec: &FilterSpec,
    availability_choice: Option<&str>,
    host_filter: HostSizeFilter,
) -> bool {
    in_set(&listing.neighbourhood_group, &spec.neighbourhood_groups)
        && in_set(&listing.room_type, &spec.room_types)
        && in_set(&listing.country, &spec.countries)
        && in_range(listing.price, &spec.price)
        && in_range(listing.construction_year, &spec.construction_year)
        && in_range(listing.minimum_nights, &spec.minimum_nights)
        && match availability_choice {
            Some(group) => listing.availability_group.as_deref() == Some(group),
            None => true,
        }
        && host_filter.matches(listing.host_is_big)
}

fn in_set(value: &Option<String>, selected: &BTreeSet<String>) -> bool {
    value.as_deref().is_some_and(|v| selected.contains(v))
}

fn in_range(value: Option<f64>, range: &NumericRange) -> bool {
    value.is_some_and(|v| range.contains(v))
}
