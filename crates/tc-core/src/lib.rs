//! tc-core: stable foundation for thermocomfort.
//!
//! Contains:
//! - units (uom SI types + constructors for comfort quantities)
//! - numeric (finiteness and range checks, signal splitting)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{TcError, TcResult};
pub use numeric::*;
pub use units::*;
