pub mod cycle;
pub mod output;
pub mod result;
pub mod scheduler;

pub use cycle::{ingest, Aggregator, AggregatorOptions, RegionFailure};
pub use result::{CanonicalResult, RegionEntry, ResultStore};
pub use scheduler::{Scheduler, SchedulerHandle};
