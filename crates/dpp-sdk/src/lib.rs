//! # dpp-sdk
//!
//! Rust SDK for the Digital Product Passport registry contracts.
//!
//! ## Features
//!
//! - **PassportSdk**: one credential, one connection and one interface
//!   registry, with typed facades for the three contracts
//! - **InterfaceRegistry**: contract interfaces loaded once at startup from
//!   packaged ABIs, a compiler artifact directory or an HTTP location
//! - **TransactionBuilder**: method lookup, argument encoding, nonce
//!   (serialised per sender), gas selection and a funds check
//! - **TransactionSubmitter**: EIP-155 signing, broadcast and bounded,
//!   cancellable receipt polling
//! - **Records**: one field table per entity shared by encode and decode
//! - **ABI**: Solidity ABI encoding and decoding
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dpp_sdk::{BatchRecord, CredentialSource, PassportSdk, SdkConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SdkConfig::new("http://127.0.0.1:8545")
//!         .with_credential(CredentialSource::Env { var: "PRIVATE_KEY".into() });
//!     let sdk = PassportSdk::initialize(config).await?;
//!
//!     let passport = sdk.passport().deploy(None).await?;
//!     let batches = sdk.batch().deploy(passport).await?;
//!
//!     let batch = BatchRecord {
//!         batch_number: "BRG-2023-001".into(),
//!         production_date: "2023-01-01".into(),
//!         expiry_date: "2025-01-01".into(),
//!         quantity: 500,
//!     };
//!     let outcome = sdk.batch().create_batch(batches, 1, &batch).await?;
//!     println!("batch stored in {}", outcome.tx_hash);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Outcomes
//!
//! A reverted transaction is a [`TransactionOutcome`] with
//! [`TxStatus::Failure`]. A confirmation timeout or cancellation is an
//! error for which [`SdkError::is_indeterminate`] is true: the
//! transaction may still be mined.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
pub mod builder;
mod client;
pub mod config;
mod credential;
mod error;
pub mod facade;
mod funds;
pub mod records;
pub mod registry;
mod sdk;
pub mod signer;
pub mod source;
mod submitter;
mod transport;
pub mod types;

// Re-export main types
pub use builder::{PreparedTransaction, TransactionBuilder, UnsignedTransaction};
pub use client::NetworkClient;
pub use config::{
    ConfirmationConfig, CredentialSource, GasConfig, InterfaceSourceConfig, SdkConfig,
};
pub use credential::Credential;
pub use error::{ErrorClass, SdkError};
pub use facade::{BatchFacade, ContractFacade, GeolocationFacade, ProductPassportFacade};
pub use funds::{required_wei, FundsGuard};
pub use records::{BatchRecord, GeolocationRecord, ProductData, ProductRecord};
pub use registry::{ContractKind, InterfaceRegistry};
pub use sdk::PassportSdk;
pub use signer::{Eip155Signer, TransactionSigner};
pub use submitter::TransactionSubmitter;
pub use transport::{MockTransport, RecordedCall};
pub use types::{TransactionOutcome, TxOptions, TxStatus};

/// Re-export Transport trait for custom implementations
pub use transport::Transport;

#[cfg(feature = "http")]
pub use transport::HttpTransport;

// Re-export primitives for convenience
pub use dpp_primitives::{Address, TxHash, H256, U256};
