//! # dpp-primitives
//!
//! Primitive types shared by the product passport SDK crates: addresses,
//! hashes and wei amounts.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;
pub mod units;

pub use address::{Address, AddressError};
pub use error::PrimitiveError;
pub use hash::{HashError, TxHash, H256};

pub use primitive_types::U256;

/// Transaction nonce
pub type Nonce = u64;

/// Gas units
pub type Gas = u64;
