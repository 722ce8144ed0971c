pub mod caching;
pub mod historical;
pub mod openexchangerates;

pub use caching::RateCache;
pub use historical::{HistoricalRate, rates_for_window};
pub use openexchangerates::OpenExchangeRatesProvider;
