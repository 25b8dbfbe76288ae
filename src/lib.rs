//! Exploratory-data-analysis helpers for police stop-and-search records.
//!
//! The data layer loads two kinds of export into typed in-memory tables:
//! the raw search-record CSV into a [`SearchDataset`] keyed by observation
//! id and sorted by date, and a hosted database's prediction export into a
//! [`PredictionTable`] carrying the model's predictions next to the ground
//! truth. The analysis layer provides the aggregations behind the usual
//! charts: weekly counts and rates, the self-vs-officer ethnicity confusion
//! matrix, group-wise hit rates, and cross-dataset category distributions.
//!
//! Loading is all-or-nothing: a malformed row fails the whole load with a
//! [`LoadError`] naming the offending row and column.

pub mod analysis;
pub mod data;

pub use data::error::LoadError;
pub use data::filter::{filtered_indices, init_filter_state, FilterState};
pub use data::loader::{load_predictions, load_raw};
pub use data::model::{
    Dtype, PredictionRow, PredictionTable, SearchDataset, SearchRecord, Value,
};
pub use data::schema::CategoricalColumn;
