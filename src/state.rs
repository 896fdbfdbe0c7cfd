use std::sync::Arc;

use crate::data::filter::{filtered_indices, FilterSpec};
use crate::data::model::{Listing, ListingsDataset};

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// The analysis pages, in sidebar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Dashboard,
    MarketSupply,
    PriceStructure,
    DemandOccupancy,
    HostDynamics,
    FeatureInsights,
    Correlation,
    GeoDistribution,
    StrategicFindings,
}

impl Page {
    pub const ALL: [Page; 9] = [
        Page::Dashboard,
        Page::MarketSupply,
        Page::PriceStructure,
        Page::DemandOccupancy,
        Page::HostDynamics,
        Page::FeatureInsights,
        Page::Correlation,
        Page::GeoDistribution,
        Page::StrategicFindings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::MarketSupply => "Market Supply",
            Page::PriceStructure => "Price Structure",
            Page::DemandOccupancy => "Demand & Occupancy",
            Page::HostDynamics => "Host Dynamics",
            Page::FeatureInsights => "Feature Insights",
            Page::Correlation => "Statistical Correlation",
            Page::GeoDistribution => "Geo Distribution",
            Page::StrategicFindings => "Strategic Findings",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file is opened).
    pub dataset: Option<Arc<ListingsDataset>>,

    /// Current sidebar selections.
    pub filters: FilterSpec,

    /// Indices of listings passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Page shown in the central panel.
    pub page: Page,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            filters: FilterSpec::default(),
            visible_indices: Vec::new(),
            page: Page::Dashboard,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset and widen the filters to show all of it.
    pub fn set_dataset(&mut self, dataset: Arc<ListingsDataset>) {
        self.filters = FilterSpec::for_dataset(&dataset);
        self.visible_indices = (0..dataset.len()).collect();
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.filters);
        }
    }

    /// Put every control back to its dataset-wide default.
    pub fn reset_filters(&mut self) {
        if let Some(ds) = &self.dataset {
            self.filters = FilterSpec::for_dataset(ds);
            self.visible_indices = (0..ds.len()).collect();
        }
    }

    /// The listings currently passing the filters, in source order.
    pub fn visible_listings(&self) -> impl Iterator<Item = &Listing> + '_ {
        let dataset = self.dataset.as_deref();
        self.visible_indices
            .iter()
            .filter_map(move |&i| dataset.and_then(|ds| ds.listings.get(i)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::REQUIRED_COLUMNS;

    fn tiny_dataset() -> Arc<ListingsDataset> {
        let listings = ["Brooklyn", "Manhattan"]
            .iter()
            .map(|group| Listing {
                neighbourhood_group: Some(group.to_string()),
                room_type: Some("Entire home/apt".to_string()),
                country: Some("United States".to_string()),
                price: Some(100.0),
                construction_year: Some(2010.0),
                minimum_nights: Some(2.0),
                ..Listing::default()
            })
            .collect();
        let columns = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        Arc::new(ListingsDataset::from_listings(listings, columns))
    }

    #[test]
    fn new_dataset_starts_fully_visible() {
        let mut state = AppState::default();
        state.set_dataset(tiny_dataset());
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.visible_listings().count(), 2);
    }

    #[test]
    fn reset_undoes_a_narrowed_filter() {
        let mut state = AppState::default();
        state.set_dataset(tiny_dataset());

        state.filters.neighbourhood_groups.remove("Manhattan");
        state.refilter();
        assert_eq!(state.visible_indices, vec![0]);

        state.reset_filters();
        assert_eq!(state.visible_indices, vec![0, 1]);
    }
}
