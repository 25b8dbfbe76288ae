/// Data layer: schema, core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  train.csv / prediction export
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SearchDataset / PredictionTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ SearchDataset  │  Vec<SearchRecord> sorted by date, id index
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply categorical predicates → kept indices
///   └──────────┘
/// ```
/// The `schema` module holds the static rename map and value domains the
/// loader applies.

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
