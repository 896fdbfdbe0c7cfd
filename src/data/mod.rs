/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .zip / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ListingsDataset
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ ListingsDataset │  Vec<Listing>, column list, category pools
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply sidebar predicates → visible indices
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  counts, means, histograms, correlations
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
