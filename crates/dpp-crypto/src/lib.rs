//! # dpp-crypto
//!
//! Cryptographic primitives used to sign passport registry transactions.
//!
//! - Keccak-256 hashing
//! - Recoverable ECDSA over secp256k1 with low-s normalisation (EIP-2)
//! - Address derivation from public keys

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod hash;
mod signature;

pub use error::CryptoError;
pub use hash::keccak256;
pub use signature::{
    public_key_to_address, recover_address, sign, PrivateKey, PublicKey, Signature,
};
