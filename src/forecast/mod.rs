pub mod danger;
pub mod models;
pub mod validate;

pub use models::{AviLevel, Forecast, ForecastDay};
