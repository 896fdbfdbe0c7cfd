use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color;
use crate::data::model::{
    Listing, NumericColumn, COL_AVAILABILITY_GROUP, COL_HOST_IS_BIG, COL_LAT, COL_LONG,
};
use crate::data::stats;
use crate::state::{AppState, Page};
use crate::ui::plot;

const CHART_HEIGHT: f32 = 260.0;
const WIDE_CHART_HEIGHT: f32 = 300.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the active page over the filtered listings.
pub fn show(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a listings export to begin  (File → Open…)");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.page {
            Page::Dashboard => dashboard(ui, state),
            Page::MarketSupply => market_supply(ui, state),
            Page::PriceStructure => price_structure(ui, state),
            Page::DemandOccupancy => demand_occupancy(ui, state),
            Page::HostDynamics => host_dynamics(ui, state),
            Page::FeatureInsights => feature_insights(ui, state),
            Page::Correlation => correlation(ui, state),
            Page::GeoDistribution => geo_distribution(ui, state),
            Page::StrategicFindings => strategic_findings(ui),
        });
}

// ---------------------------------------------------------------------------
// Page 1 – Dashboard
// ---------------------------------------------------------------------------

fn dashboard(ui: &mut Ui, state: &AppState) {
    ui.heading("Airbnb Analytics — Executive Dashboard");
    ui.add_space(8.0);
    ui.strong("Key Performance Indicators (Filtered Dataset)");
    ui.add_space(6.0);

    let avg_price = stats::mean(state.visible_listings().map(|l| l.price));
    let avg_rating = stats::mean(state.visible_listings().map(|l| l.review_rate));
    let avg_nights = stats::mean(state.visible_listings().map(|l| l.minimum_nights));
    let avg_occupancy = stats::mean(state.visible_listings().map(|l| l.occupancy_rate));
    let avg_popularity = stats::mean(state.visible_listings().map(|l| l.popularity_score));
    let unique_hosts = stats::nunique(state.visible_listings().map(|l| l.name.as_deref()));
    let countries = stats::nunique(state.visible_listings().map(|l| l.country.as_deref()));

    ui.columns(4, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Listings", group_digits(state.visible_indices.len()));
        metric(&mut cols[1], "Unique Hosts", group_digits(unique_hosts));
        metric(&mut cols[2], "Average Price", fmt_dollars(avg_price));
        metric(&mut cols[3], "Average Rating", fmt_mean(avg_rating, 2));
    });
    ui.add_space(8.0);
    ui.columns(4, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Avg Min Nights", fmt_mean(avg_nights, 1));
        metric(&mut cols[1], "Avg Occupancy", fmt_mean(avg_occupancy, 1));
        metric(&mut cols[2], "Avg Popularity", fmt_mean(avg_popularity, 1));
        metric(&mut cols[3], "Countries", group_digits(countries));
    });

    ui.add_space(8.0);
    ui.separator();
    ui.label("Use the left sidebar to explore the full analytical pages.");

    ui.add_space(12.0);
    egui::CollapsingHeader::new(RichText::new("Data preview").strong())
        .default_open(false)
        .show(ui, |ui: &mut Ui| preview_table(ui, state));
}

/// A single KPI tile: small caption over a large value.
fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).small().weak());
        ui.label(RichText::new(value).size(20.0).strong());
    });
}

/// First rows of the filtered table, for sanity-checking a fresh export.
fn preview_table(ui: &mut Ui, state: &AppState) {
    let rows: Vec<&Listing> = state.visible_listings().take(25).collect();
    if rows.is_empty() {
        ui.label("No rows match the current filters.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .column(Column::auto().at_least(160.0))
        .columns(Column::auto(), 6)
        .header(20.0, |mut header| {
            for title in [
                "NAME",
                "neighbourhood group",
                "neighbourhood",
                "country",
                "room type",
                "price",
                "review rate number",
            ] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let listing = rows[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.label(text_cell(&listing.name));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(text_cell(&listing.neighbourhood_group));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(text_cell(&listing.neighbourhood));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(text_cell(&listing.country));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(text_cell(&listing.room_type));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(number_cell(listing.price, 0));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(number_cell(listing.review_rate, 1));
                });
            });
        });
}

// ---------------------------------------------------------------------------
// Page 2 – Market Supply
// ---------------------------------------------------------------------------

fn market_supply(ui: &mut Ui, state: &AppState) {
    ui.heading("Market Supply Analysis");
    ui.add_space(4.0);
    ui.strong("1. Distribution of Listings");

    let by_group = counts_to_f64(stats::value_counts(
        state.visible_listings().map(|l| l.neighbourhood_group.as_deref()),
    ));
    let by_room = counts_to_f64(stats::value_counts(
        state.visible_listings().map(|l| l.room_type.as_deref()),
    ));

    ui.columns(2, |cols: &mut [Ui]| {
        if !by_group.is_empty() {
            chart_block(
                &mut cols[0],
                "Listings per Neighbourhood Group",
                "Shows which major areas have the highest supply of listings.",
                |ui| plot::category_bar_chart(ui, "supply_group", &by_group, CHART_HEIGHT),
            );
        }
        if !by_room.is_empty() {
            chart_block(
                &mut cols[1],
                "Listings per Room Type",
                "Illustrates the distribution of listings across room categories.",
                |ui| plot::category_bar_chart(ui, "supply_room", &by_room, CHART_HEIGHT),
            );
        }
    });

    let by_country = counts_to_f64(stats::value_counts(
        state.visible_listings().map(|l| l.country.as_deref()),
    ));
    let mut top_neighbourhoods = counts_to_f64(stats::value_counts(
        state.visible_listings().map(|l| l.neighbourhood.as_deref()),
    ));
    top_neighbourhoods.truncate(10);

    ui.columns(2, |cols: &mut [Ui]| {
        if !by_country.is_empty() {
            chart_block(
                &mut cols[0],
                "Listings per Country",
                "Shows countries represented in the filtered dataset.",
                |ui| plot::category_bar_chart(ui, "supply_country", &by_country, CHART_HEIGHT),
            );
        }
        if !top_neighbourhoods.is_empty() {
            chart_block(
                &mut cols[1],
                "Top 10 Neighbourhoods",
                "Top neighbourhoods by listing count.",
                |ui| {
                    plot::category_bar_chart(ui, "supply_top10", &top_neighbourhoods, CHART_HEIGHT)
                },
            );
        }
    });
}

// ---------------------------------------------------------------------------
// Page 3 – Price Structure
// ---------------------------------------------------------------------------

fn price_structure(ui: &mut Ui, state: &AppState) {
    ui.heading("Price Structure Analysis");
    ui.add_space(4.0);
    ui.strong("2. Pricing Insights");

    let price_hist = stats::histogram(state.visible_listings().map(|l| l.price), 50);
    let price_boxes: Vec<(String, stats::BoxSummary)> = stats::group_values(
        state
            .visible_listings()
            .map(|l| (l.room_type.as_deref(), l.price)),
    )
    .into_iter()
    .filter_map(|(name, values)| stats::box_summary(&values).map(|s| (name, s)))
    .collect();

    ui.columns(2, |cols: &mut [Ui]| {
        if let Some(hist) = &price_hist {
            chart_block(
                &mut cols[0],
                "Price Distribution",
                "Histogram showing the spread of prices across listings.",
                |ui| plot::histogram_chart(ui, "price_hist", hist, "Price", CHART_HEIGHT),
            );
        }
        if !price_boxes.is_empty() {
            chart_block(
                &mut cols[1],
                "Price by Room Type",
                "Compares price differences between room types.",
                |ui| plot::grouped_box_plot(ui, "price_room_box", &price_boxes, "Price", CHART_HEIGHT),
            );
        }
    });

    let mut avg_by_group = stats::group_mean(
        state
            .visible_listings()
            .map(|l| (l.neighbourhood_group.as_deref(), l.price)),
    );
    // Most expensive group first.
    avg_by_group.sort_by(|a, b| b.1.total_cmp(&a.1));
    if !avg_by_group.is_empty() {
        chart_block(
            ui,
            "Average Price by Neighbourhood Group",
            "Shows price variations at the neighbourhood-group level.",
            |ui| plot::category_bar_chart(ui, "avg_price_group", &avg_by_group, WIDE_CHART_HEIGHT),
        );
    }
}

// ---------------------------------------------------------------------------
// Page 4 – Demand & Occupancy
// ---------------------------------------------------------------------------

fn demand_occupancy(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = state.dataset.as_deref() else {
        return;
    };
    ui.heading("Demand & Occupancy Analysis");
    ui.add_space(4.0);
    ui.strong("3. Demand Indicators");

    let nights_hist = stats::histogram(state.visible_listings().map(|l| l.minimum_nights), 50);
    let avail_hist = stats::histogram(state.visible_listings().map(|l| l.availability_365), 50);

    ui.columns(2, |cols: &mut [Ui]| {
        if let Some(hist) = &nights_hist {
            chart_block(
                &mut cols[0],
                "Minimum Nights Distribution",
                "Distribution of host-required minimum stays.",
                |ui| plot::histogram_chart(ui, "nights_hist", hist, "Minimum nights", CHART_HEIGHT),
            );
        }
        if let Some(hist) = &avail_hist {
            chart_block(
                &mut cols[1],
                "Availability (Days per Year)",
                "How many days listings are open for booking.",
                |ui| plot::histogram_chart(ui, "avail_hist", hist, "Days available", CHART_HEIGHT),
            );
        }
    });

    let avail_price: Vec<[f64; 2]> = state
        .visible_listings()
        .filter_map(|l| Some([l.availability_365?, l.price?]))
        .collect();
    let nights_price: Vec<[f64; 2]> = state
        .visible_listings()
        .filter_map(|l| Some([l.minimum_nights?, l.price?]))
        .collect();

    ui.columns(2, |cols: &mut [Ui]| {
        if !avail_price.is_empty() {
            chart_block(
                &mut cols[0],
                "Price vs Availability 365",
                "Relationship between nightly price and yearly availability.",
                |ui| {
                    plot::scatter_chart(
                        ui,
                        "avail_price",
                        &avail_price,
                        "Available Days",
                        "Price",
                        CHART_HEIGHT,
                    )
                },
            );
        }
        if !nights_price.is_empty() {
            chart_block(
                &mut cols[1],
                "Price vs Minimum Nights",
                "Shows how minimum stay rules relate to pricing.",
                |ui| {
                    plot::scatter_chart(
                        ui,
                        "nights_price",
                        &nights_price,
                        "Minimum nights",
                        "Price",
                        CHART_HEIGHT,
                    )
                },
            );
        }
    });

    if let Some(hist) = stats::histogram(state.visible_listings().map(|l| l.occupancy_rate), 50) {
        chart_block(
            ui,
            "Occupancy Rate Distribution",
            "Displays how often listings are booked throughout the year.",
            |ui| plot::histogram_chart(ui, "occupancy_hist", &hist, "Occupancy rate", WIDE_CHART_HEIGHT),
        );
    }

    if dataset.has_column(COL_AVAILABILITY_GROUP) {
        let avg = stats::group_mean(
            state
                .visible_listings()
                .map(|l| (l.availability_group.as_deref(), l.price)),
        );
        if !avg.is_empty() {
            chart_block(
                ui,
                "Average Price by Availability Group",
                "Availability patterns linked with pricing.",
                |ui| plot::category_bar_chart(ui, "avg_price_avail", &avg, WIDE_CHART_HEIGHT),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Page 5 – Host Dynamics
// ---------------------------------------------------------------------------

fn host_dynamics(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = state.dataset.as_deref() else {
        return;
    };
    ui.heading("Host Dynamics");
    ui.add_space(4.0);
    ui.strong("4. Host Behavior & Reviews");

    let rating_hist = stats::histogram(state.visible_listings().map(|l| l.review_rate), 20);
    let avg_rating = stats::group_mean(
        state
            .visible_listings()
            .map(|l| (l.room_type.as_deref(), l.review_rate)),
    );

    ui.columns(2, |cols: &mut [Ui]| {
        if let Some(hist) = &rating_hist {
            chart_block(
                &mut cols[0],
                "Rating Distribution",
                "Distribution of listing ratings across hosts.",
                |ui| plot::histogram_chart(ui, "rating_hist", hist, "Review rate", CHART_HEIGHT),
            );
        }
        if !avg_rating.is_empty() {
            chart_block(
                &mut cols[1],
                "Average Rating by Room Type",
                "Shows which room types have higher guest satisfaction.",
                |ui| plot::category_bar_chart(ui, "avg_rating_room", &avg_rating, CHART_HEIGHT),
            );
        }
    });

    let reviews_hist = stats::histogram(state.visible_listings().map(|l| l.number_of_reviews), 50);
    let host_counts = dataset.has_column(COL_HOST_IS_BIG).then(|| {
        let mut small = 0usize;
        let mut big = 0usize;
        for listing in state.visible_listings() {
            match listing.host_is_big {
                Some(false) => small += 1,
                Some(true) => big += 1,
                None => {}
            }
        }
        vec![
            ("Small Hosts (≤3)".to_string(), small as f64),
            ("Big Hosts (>3)".to_string(), big as f64),
        ]
    });

    ui.columns(2, |cols: &mut [Ui]| {
        if let Some(hist) = &reviews_hist {
            chart_block(
                &mut cols[0],
                "Number of Reviews Distribution",
                "Shows how many reviews listings typically receive.",
                |ui| {
                    plot::histogram_chart(ui, "reviews_hist", hist, "Number of reviews", CHART_HEIGHT)
                },
            );
        }
        if let Some(counts) = &host_counts {
            chart_block(
                &mut cols[1],
                "Host Type Distribution",
                "Comparison of small vs big host representation.",
                |ui| plot::category_bar_chart(ui, "host_counts", counts, CHART_HEIGHT),
            );
        }
    });

    if dataset.has_column(COL_HOST_IS_BIG) {
        // A host class with no rows charts as zero rather than losing its bar.
        let small = stats::mean(
            state
                .visible_listings()
                .filter(|l| l.host_is_big == Some(false))
                .map(|l| l.price),
        );
        let big = stats::mean(
            state
                .visible_listings()
                .filter(|l| l.host_is_big == Some(true))
                .map(|l| l.price),
        );
        let avg = vec![
            ("Small Hosts".to_string(), zero_if_nan(small)),
            ("Big Hosts".to_string(), zero_if_nan(big)),
        ];
        chart_block(
            ui,
            "Average Price by Host Type",
            "Shows whether large or small hosts price higher.",
            |ui| plot::category_bar_chart(ui, "avg_price_host", &avg, WIDE_CHART_HEIGHT),
        );
    }
}

// ---------------------------------------------------------------------------
// Page 6 – Feature Insights
// ---------------------------------------------------------------------------

fn feature_insights(ui: &mut Ui, state: &AppState) {
    ui.heading("Feature Insights");
    ui.add_space(4.0);
    ui.strong("5. Engineered Feature Metrics");

    let popularity_hist =
        stats::histogram(state.visible_listings().map(|l| l.popularity_score), 50);
    let per_night_hist =
        stats::histogram(state.visible_listings().map(|l| l.price_per_min_night), 50);

    ui.columns(2, |cols: &mut [Ui]| {
        if let Some(hist) = &popularity_hist {
            chart_block(
                &mut cols[0],
                "Popularity Score Distribution",
                "Shows how popular listings are relative to demand.",
                |ui| {
                    plot::histogram_chart(ui, "popularity_hist", hist, "Popularity score", CHART_HEIGHT)
                },
            );
        }
        if let Some(hist) = &per_night_hist {
            chart_block(
                &mut cols[1],
                "Price per Minimum Stay Night",
                "Represents the effective nightly cost for minimum stays.",
                |ui| {
                    plot::histogram_chart(
                        ui,
                        "per_night_hist",
                        hist,
                        "Price per minimum night",
                        CHART_HEIGHT,
                    )
                },
            );
        }
    });

    if let Some(hist) = stats::histogram(state.visible_listings().map(|l| l.price_per_room), 50) {
        chart_block(
            ui,
            "Price Per Room",
            "Shows the engineered per-room pricing distribution.",
            |ui| plot::histogram_chart(ui, "per_room_hist", &hist, "Price per room", WIDE_CHART_HEIGHT),
        );
    }
}

// ---------------------------------------------------------------------------
// Page 7 – Statistical Correlation
// ---------------------------------------------------------------------------

fn correlation(ui: &mut Ui, state: &AppState) {
    ui.heading("Statistical Correlation");
    ui.add_space(4.0);
    ui.strong("6. Correlation Matrix");
    ui.add_space(4.0);

    let columns: Vec<Vec<Option<f64>>> = NumericColumn::CORRELATION_SET
        .iter()
        .map(|col| state.visible_listings().map(|l| col.value(l)).collect())
        .collect();
    let labels: Vec<&str> = NumericColumn::CORRELATION_SET
        .iter()
        .map(|col| col.label())
        .collect();
    let matrix = stats::correlation_matrix(&columns);

    plot::correlation_heatmap(ui, "correlation_heatmap", &labels, &matrix, 520.0);
    caption(ui, "Heatmap of feature relationships.");
}

// ---------------------------------------------------------------------------
// Page 8 – Geo Distribution
// ---------------------------------------------------------------------------

fn geo_distribution(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = state.dataset.as_deref() else {
        return;
    };
    ui.heading("Geographic Distribution");
    ui.add_space(4.0);
    ui.strong("7. World Map — Listings by Location");
    ui.add_space(4.0);

    if !(dataset.has_column(COL_LAT) && dataset.has_column(COL_LONG)) {
        ui.label("Location data not available for mapping.");
        return;
    }

    let bands = price_bands(state);
    if bands.is_empty() {
        ui.label("No mappable listings match the current filters.");
        return;
    }

    chart_block(
        ui,
        "Global Distribution of Listings (Colored by Price)",
        "Map of the filtered listings, shaded from cheapest to priciest band.",
        |ui| plot::geo_scatter(ui, "geo_scatter", &bands, 480.0),
    );
}

/// Quartile price bands over the mappable listings, palest to deepest blue.
fn price_bands(state: &AppState) -> Vec<(String, Color32, Vec<[f64; 2]>)> {
    let mut prices: Vec<f64> = state
        .visible_listings()
        .filter(|l| l.lat.is_some() && l.long.is_some())
        .filter_map(|l| l.price)
        .collect();
    if prices.is_empty() {
        return Vec::new();
    }
    prices.sort_by(|a, b| a.total_cmp(b));

    let quantile = |p: f64| prices[((prices.len() - 1) as f64 * p) as usize];
    let (q1, q2, q3) = (quantile(0.25), quantile(0.5), quantile(0.75));

    let mut bands = vec![
        (format!("Under ${q1:.0}"), color::sequential_blues(0.15), Vec::new()),
        (format!("${q1:.0}–${q2:.0}"), color::sequential_blues(0.4), Vec::new()),
        (format!("${q2:.0}–${q3:.0}"), color::sequential_blues(0.65), Vec::new()),
        (format!("Over ${q3:.0}"), color::sequential_blues(0.9), Vec::new()),
    ];

    for listing in state.visible_listings() {
        let (Some(lat), Some(long), Some(price)) = (listing.lat, listing.long, listing.price)
        else {
            continue;
        };
        let band = if price < q1 {
            0
        } else if price < q2 {
            1
        } else if price < q3 {
            2
        } else {
            3
        };
        bands[band].2.push([long, lat]);
    }

    bands.retain(|(_, _, points)| !points.is_empty());
    bands
}

// ---------------------------------------------------------------------------
// Page 9 – Strategic Findings
// ---------------------------------------------------------------------------

fn strategic_findings(ui: &mut Ui) {
    ui.heading("Strategic Findings");
    ui.add_space(8.0);

    ui.strong("Executive Summary");
    ui.label(
        "This section presents high-level, fixed strategic insights derived from the \
         Airbnb dataset. These insights reflect common patterns, market signals, and \
         business interpretations that apply regardless of filters.",
    );
    ui.separator();

    finding(
        ui,
        "1. Pricing Strategy Insights",
        &[
            "Prices show strong variance across neighbourhood groups and room types, \
             indicating the need for localized pricing models.",
            "Entire homes consistently command the highest prices, while private and \
             shared rooms remain budget-friendly segments.",
            "Areas with higher availability tend to offer slightly lower prices, \
             suggesting competitive pressure in high-supply zones.",
        ],
    );
    finding(
        ui,
        "2. Host Behavior & Market Structure",
        &[
            "The market shows a mix of small hosts (≤3 listings) and professional \
             hosts (>3 listings).",
            "Professional hosts tend to manage multiple units, indicating growing \
             commercialization of the platform.",
            "Small hosts contribute significantly to market diversity and maintain \
             competitive pricing.",
        ],
    );
    finding(
        ui,
        "3. Demand & Occupancy Trends",
        &[
            "Occupancy rates suggest a healthy level of guest demand, especially in \
             central neighbourhood groups.",
            "Listings with lower minimum-night requirements show higher turnover and \
             occupancy, appealing to short-stay guests.",
            "High availability is often linked to lower guest engagement or oversupply \
             in the area.",
        ],
    );
    finding(
        ui,
        "4. Guest Experience Insights",
        &[
            "Rating averages remain consistently high, reflecting strong service \
             levels among hosts.",
            "Room type influences rating: entire homes often receive slightly higher \
             scores due to privacy, comfort, and amenities.",
            "Listings with more reviews indicate higher market visibility and \
             trustworthiness.",
        ],
    );
    finding(
        ui,
        "5. Engineered Feature Perspective",
        &[
            "Engineered metrics like popularity score, price per minimum night, and \
             price per room provide deeper analytical visibility.",
            "Popularity score highlights listings that outperform peers on engagement, \
             independent of price or availability.",
            "Price-per-room is a strong indicator of host pricing strategy efficiency.",
        ],
    );
    finding(
        ui,
        "6. Neighbourhood Performance Insights",
        &[
            "Central neighbourhood groups dominate supply and demand, offering better \
             returns for hosts.",
            "Peripheral areas show competitive pricing but require strong \
             differentiators (reviews, amenities, or unique offerings) to increase \
             visibility.",
            "High-density neighbourhoods show predictable pricing patterns and \
             well-defined market segments.",
        ],
    );

    ui.add_space(8.0);
    ui.strong("Final Strategic Conclusions");
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        for line in [
            "The Airbnb market demonstrates strong diversity across pricing, host \
             behavior, and geographic distribution.",
            "Successful market strategy requires targeted pricing, strong review \
             performance, and optimized availability management.",
            "Hosts who align room type, competitive pricing, and service quality \
             outperform competitors consistently.",
        ] {
            ui.label(format!("• {line}"));
        }
    });

    ui.add_space(4.0);
    caption(ui, "End of Strategic Report — Use filters to explore deeper insights.");
}

fn finding(ui: &mut Ui, title: &str, bullets: &[&str]) {
    ui.add_space(6.0);
    ui.strong(title);
    for bullet in bullets {
        ui.label(format!("• {bullet}"));
    }
    ui.separator();
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Subheader, chart body, caption underneath.
fn chart_block(ui: &mut Ui, title: &str, note: &str, body: impl FnOnce(&mut Ui)) {
    ui.add_space(8.0);
    ui.strong(title);
    body(ui);
    caption(ui, note);
    ui.add_space(4.0);
}

fn caption(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).small().weak());
}

fn counts_to_f64(counts: Vec<(String, usize)>) -> Vec<(String, f64)> {
    counts.into_iter().map(|(k, v)| (k, v as f64)).collect()
}

fn zero_if_nan(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn text_cell(value: &Option<String>) -> String {
    value.as_deref().unwrap_or("–").to_string()
}

fn number_cell(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "–".to_string(),
    }
}

/// `12345` → `"12,345"`.
fn group_digits(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn fmt_mean(v: f64, decimals: usize) -> String {
    if v.is_finite() {
        format!("{:.*}", decimals, v)
    } else {
        "n/a".to_string()
    }
}

fn fmt_dollars(v: f64) -> String {
    if v.is_finite() {
        format!("${v:.1}")
    } else {
        "n/a".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_grouping_inserts_commas() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(1000), "1,000");
        assert_eq!(group_digits(1234567), "1,234,567");
    }

    #[test]
    fn means_fall_back_to_na() {
        assert_eq!(fmt_mean(4.256, 2), "4.26");
        assert_eq!(fmt_mean(f64::NAN, 2), "n/a");
        assert_eq!(fmt_dollars(120.04), "$120.0");
        assert_eq!(fmt_dollars(f64::NAN), "n/a");
    }
}
