//! The three analyses run over a loaded store.
//!
//! Each analysis has a pure function over raw store rows (`*_from_rows`) and
//! an async wrapper that issues the read through [`CytometryStore`]. None of
//! them fails for "no data": an empty cohort yields an empty result.
//!
//! [`CytometryStore`]: crate::store::CytometryStore

pub mod baseline;
pub mod compare;
pub mod overview;

pub use baseline::{BaselineSummary, baseline_summary};
pub use compare::{
  Comparison, ComparisonRecord, PlotPoint, PopulationStatistics, compare,
};
pub use overview::{OverviewRow, PopulationAverage, data_overview, population_averages};
