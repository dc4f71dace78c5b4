pub mod catalog;
pub mod provider;

pub use catalog::{CatalogError, Region, RegionCatalog};
pub use provider::{parse_region_id, Provider};
