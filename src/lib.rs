//! Hamper
//!
//! Hamper prices corporate gift-set proposals: it imports supplier product sheets, costs
//! budget tiers built from those products and exports the result as a spreadsheet report.

pub mod catalog;
pub mod costing;
pub mod gift_sets;
pub mod import;
pub mod prelude;
pub mod products;
pub mod report;
pub mod store;
pub mod tiers;
