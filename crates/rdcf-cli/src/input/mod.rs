pub mod file;
pub mod metrics;
pub mod stdin;
pub mod units;
