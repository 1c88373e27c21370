pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "valuation")]
pub mod valuation;

#[cfg(feature = "provider")]
pub mod provider;

#[cfg(feature = "scenarios")]
pub mod scenarios;

pub use error::RdcfError;
pub use types::*;

/// Standard result type for all rdcf operations
pub type RdcfResult<T> = Result<T, RdcfError>;
