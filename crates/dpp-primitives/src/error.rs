//! Errors shared by the primitive types

use thiserror::Error;

use crate::address::AddressError;
use crate::hash::HashError;

/// Any primitive parsing failure
#[derive(Debug, Error)]
pub enum PrimitiveError {
    /// Address error
    #[error("address error: {0}")]
    Address(#[from] AddressError),

    /// Hash error
    #[error("hash error: {0}")]
    Hash(#[from] HashError),
}
