use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// Source column names
// ---------------------------------------------------------------------------

pub const COL_AVAILABILITY_GROUP: &str = "availability_group";
pub const COL_HOST_IS_BIG: &str = "host_is_big";
pub const COL_LAT: &str = "lat";
pub const COL_LONG: &str = "long";

/// Columns every export must carry. The optional derived columns
/// (`availability_group`, `host_is_big`) and the coordinates are not listed
/// here; their absence only disables the features that depend on them.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "NAME",
    "neighbourhood group",
    "neighbourhood",
    "country",
    "room type",
    "price",
    "Construction year",
    "minimum nights",
    "availability 365",
    "number of reviews",
    "reviews per month",
    "review rate number",
    "occupancy_rate",
    "popularity_score",
    "price_per_room",
    "price_per_minimum_night",
];

// ---------------------------------------------------------------------------
// Listing – one row of the export
// ---------------------------------------------------------------------------

/// A single property listing. Every field is optional: the export routinely
/// has blank cells, and filters treat a missing value as "never matches".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Listing {
    #[serde(default, deserialize_with = "opt_i64_lenient")]
    pub id: Option<i64>,
    #[serde(rename = "NAME")]
    pub name: Option<String>,
    #[serde(rename = "neighbourhood group")]
    pub neighbourhood_group: Option<String>,
    pub neighbourhood: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    #[serde(rename = "room type")]
    pub room_type: Option<String>,
    pub price: Option<f64>,
    #[serde(rename = "Construction year")]
    pub construction_year: Option<f64>,
    #[serde(rename = "minimum nights")]
    pub minimum_nights: Option<f64>,
    #[serde(rename = "availability 365")]
    pub availability_365: Option<f64>,
    #[serde(rename = "number of reviews")]
    pub number_of_reviews: Option<f64>,
    #[serde(rename = "reviews per month")]
    pub reviews_per_month: Option<f64>,
    #[serde(rename = "review rate number")]
    pub review_rate: Option<f64>,
    pub occupancy_rate: Option<f64>,
    pub popularity_score: Option<f64>,
    pub price_per_room: Option<f64>,
    #[serde(rename = "price_per_minimum_night")]
    pub price_per_min_night: Option<f64>,
    #[serde(default, deserialize_with = "opt_bool_lenient")]
    pub host_is_big: Option<bool>,
    pub availability_group: Option<String>,
}

/// The upstream pipeline writes the host flag as 0/1 (float-formatted when
/// the column has gaps), so parse through f64 rather than expecting literal
/// booleans.
fn opt_bool_lenient<'de, D: Deserializer<'de>>(de: D) -> Result<Option<bool>, D::Error> {
    Ok(Option::<f64>::deserialize(de)?.map(|v| v != 0.0))
}

/// Same story for the identifier: a column with gaps comes back as
/// `57365242.0`, which must still round-trip to an integer id.
fn opt_i64_lenient<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i64>, D::Error> {
    Ok(Option::<f64>::deserialize(de)?.map(|v| v as i64))
}

// ---------------------------------------------------------------------------
// Numeric columns of the correlation page
// ---------------------------------------------------------------------------

/// The ten numeric series the correlation matrix is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericColumn {
    Price,
    MinimumNights,
    Availability365,
    NumberOfReviews,
    ReviewsPerMonth,
    ReviewRate,
    PricePerRoom,
    PricePerMinNight,
    PopularityScore,
    OccupancyRate,
}

impl NumericColumn {
    /// Matrix order, matching the source column order of the export.
    pub const CORRELATION_SET: [NumericColumn; 10] = [
        NumericColumn::Price,
        NumericColumn::MinimumNights,
        NumericColumn::Availability365,
        NumericColumn::NumberOfReviews,
        NumericColumn::ReviewsPerMonth,
        NumericColumn::ReviewRate,
        NumericColumn::PricePerRoom,
        NumericColumn::PricePerMinNight,
        NumericColumn::PopularityScore,
        NumericColumn::OccupancyRate,
    ];

    /// The source column name, used as the axis label.
    pub fn label(self) -> &'static str {
        match self {
            NumericColumn::Price => "price",
            NumericColumn::MinimumNights => "minimum nights",
            NumericColumn::Availability365 => "availability 365",
            NumericColumn::NumberOfReviews => "number of reviews",
            NumericColumn::ReviewsPerMonth => "reviews per month",
            NumericColumn::ReviewRate => "review rate number",
            NumericColumn::PricePerRoom => "price_per_room",
            NumericColumn::PricePerMinNight => "price_per_minimum_night",
            NumericColumn::PopularityScore => "popularity_score",
            NumericColumn::OccupancyRate => "occupancy_rate",
        }
    }

    pub fn value(self, listing: &Listing) -> Option<f64> {
        match self {
            NumericColumn::Price => listing.price,
            NumericColumn::MinimumNights => listing.minimum_nights,
            NumericColumn::Availability365 => listing.availability_365,
            NumericColumn::NumberOfReviews => listing.number_of_reviews,
            NumericColumn::ReviewsPerMonth => listing.reviews_per_month,
            NumericColumn::ReviewRate => listing.review_rate,
            NumericColumn::PricePerRoom => listing.price_per_room,
            NumericColumn::PricePerMinNight => listing.price_per_min_night,
            NumericColumn::PopularityScore => listing.popularity_score,
            NumericColumn::OccupancyRate => listing.occupancy_rate,
        }
    }
}

// ---------------------------------------------------------------------------
// ListingsDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed export with pre-computed filter indices: the unique values
/// behind each multiselect, the bounds behind each range control, and the
/// list of source columns that survived the index-artifact drop.
#[derive(Debug, Clone)]
pub struct ListingsDataset {
    /// All rows, in file order.
    pub listings: Vec<Listing>,
    /// Source column names, in file order, minus index artifacts.
    pub columns: Vec<String>,
    /// Sorted unique non-null values per categorical filter column.
    pub neighbourhood_groups: Vec<String>,
    pub room_types: Vec<String>,
    pub countries: Vec<String>,
    pub availability_groups: Vec<String>,
    /// (min, max) over the non-null values; (0, 0) when the table is empty.
    pub price_bounds: (f64, f64),
    pub year_bounds: (f64, f64),
    pub min_nights_bounds: (f64, f64),
}

impl ListingsDataset {
    /// Build the filter indices from loaded rows.
    pub fn from_listings(listings: Vec<Listing>, columns: Vec<String>) -> Self {
        let neighbourhood_groups = unique_strings(&listings, |l| &l.neighbourhood_group);
        let room_types = unique_strings(&listings, |l| &l.room_type);
        let countries = unique_strings(&listings, |l| &l.country);
        let availability_groups = unique_strings(&listings, |l| &l.availability_group);

        let price_bounds = numeric_bounds(&listings, |l| l.price);
        let year_bounds = numeric_bounds(&listings, |l| l.construction_year);
        let min_nights_bounds = numeric_bounds(&listings, |l| l.minimum_nights);

        ListingsDataset {
            listings,
            columns,
            neighbourhood_groups,
            room_types,
            countries,
            availability_groups,
            price_bounds,
            year_bounds,
            min_nights_bounds,
        }
    }

    /// Whether the source file carried the given column.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

fn unique_strings<F>(listings: &[Listing], field: F) -> Vec<String>
where
    F: Fn(&Listing) -> &Option<String>,
{
    let set: BTreeSet<&str> = listings
        .iter()
        .filter_map(|l| field(l).as_deref())
        .collect();
    set.into_iter().map(str::to_string).collect()
}

fn numeric_bounds<F>(listings: &[Listing], field: F) -> (f64, f64)
where
    F: Fn(&Listing) -> Option<f64>,
{
    let mut bounds: Option<(f64, f64)> = None;
    for v in listings.iter().filter_map(field).filter(|v| v.is_finite()) {
        bounds = Some(match bounds {
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
            None => (v, v),
        });
    }
    bounds.unwrap_or((0.0, 0.0))
}
