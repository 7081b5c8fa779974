//! Freezone: a public, first-come namespace on top of dmap
//!
//! Anyone may `take` an untaken name. Its controller can then write the
//! freezone's entry under that name, including locking it for good, or
//! `give` control away.

pub mod errors;
pub mod registry;
pub mod types;

pub use errors::*;
pub use registry::FreeZone;
pub use types::*;
