//! Avalanche forecast aggregation.
//!
//! Fetches daily danger forecasts from regional avalanche centers, parses
//! each provider's feed into one normalized shape, validates it, and
//! publishes the last known-good forecast per region as a single artifact.

pub mod aggregator;
pub mod config;
pub mod data;
pub mod forecast;
pub mod monitoring;
pub mod parsers;
pub mod region;
