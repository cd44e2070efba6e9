//! Spec catalog: filtering, sorting, recommendation and bulk import

mod catalog;
mod filter;
mod recommend;
mod sort;

pub use catalog::{FetchFailure, FetchReport};
pub use filter::{Range, SpecField, SpecFilter, StringField, StringFilter, StringMatch};
pub use recommend::{
    Coordinates, PriorityWeights, RankedSpec, RegionTable, Requirement, haversine_km, rank_specs,
};
pub use sort::{SortKey, SortOrder, sort_specs};
