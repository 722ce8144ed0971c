//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod convert;
pub mod error;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use convert::{Conversion, ConversionRecord, convert, cross_rate};
pub use error::FxError;
pub use rates::{BASE_CURRENCY, RateSource, RateTable};
