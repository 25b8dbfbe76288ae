/// Analysis layer: the group-by/aggregation halves of the exploratory
/// charts, returning plain data. Rendering is out of scope.

pub mod confusion;
pub mod distribution;
pub mod rates;
pub mod timeseries;
