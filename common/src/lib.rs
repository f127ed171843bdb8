//! jobmap common library
//!
//! Types shared by every pipeline stage: listing records, the sparse
//! tabular model with CSV I/O, and the per-pair filename convention.

pub mod error;
pub mod pair;
pub mod table;
pub mod types;

pub use error::{Error, Result};
pub use pair::{PairKey, PAIR_SEPARATOR};
pub use table::Table;
pub use types::{value_to_cell, Coordinates, JobRecord};
