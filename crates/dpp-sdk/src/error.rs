//! SDK error types

use std::time::Duration;

use dpp_primitives::{TxHash, U256};
use thiserror::Error;

/// SDK error type
#[derive(Debug, Error)]
pub enum SdkError {
    /// No signing key could be resolved from the configured source
    #[error("no signing credential: {0}")]
    CredentialMissing(String),

    /// The signing key was found but is not a valid secp256k1 key
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// The network endpoint could not be reached during initialization
    #[error("cannot reach {endpoint}: {reason}")]
    Connection {
        /// Endpoint URL
        endpoint: String,
        /// Underlying failure
        reason: String,
    },

    /// Contract name not registered in the interface registry
    #[error("unknown contract: {0}")]
    UnknownContract(String),

    /// Interface definition could not be loaded at startup
    #[error("failed to load interface for {contract}: {reason}")]
    InterfaceLoad {
        /// Logical contract name
        contract: String,
        /// Underlying failure
        reason: String,
    },

    /// Interface carries no bytecode
    #[error("contract {0} has no bytecode and cannot be deployed")]
    NotDeployable(String),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Record is missing required fields
    #[error("{entity} is missing required fields: {}", .missing.join(", "))]
    Validation {
        /// Record type
        entity: &'static str,
        /// Names of the missing fields, in field-table order
        missing: Vec<&'static str>,
    },

    /// Method not present in the contract interface
    #[error("method {method} not found on {contract}")]
    MethodNotFound {
        /// Logical contract name
        contract: String,
        /// Requested method
        method: String,
    },

    /// Argument count differs from the method's declared inputs
    #[error("{method} expects {expected} arguments, got {actual}")]
    ArgumentCountMismatch {
        /// Method name (`constructor` for deployments)
        method: String,
        /// Declared input count
        expected: usize,
        /// Supplied argument count
        actual: usize,
    },

    /// Argument does not fit its declared parameter type
    #[error("cannot encode argument {param}: {reason}")]
    Encoding {
        /// Parameter name or position
        param: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Balance does not cover gas_limit * gas_price
    #[error("insufficient funds: balance {available} wei, required {required} wei")]
    InsufficientFunds {
        /// Balance at check time
        available: U256,
        /// Worst-case transaction cost
        required: U256,
    },

    /// Signing failed
    #[error("signing failed: {0}")]
    Signing(String),

    /// The node refused the transaction
    #[error("broadcast failed: {0}")]
    Broadcast(String),

    /// The deployment was mined but reverted, so no contract exists
    #[error("deployment of {contract} reverted in {tx_hash}")]
    DeploymentReverted {
        /// Logical contract name
        contract: String,
        /// Mined transaction
        tx_hash: TxHash,
    },

    /// No receipt within the confirmation timeout. The transaction may
    /// still be mined: the outcome is unknown, not failed.
    #[error("no receipt for {tx_hash} after {waited:?}, outcome unknown")]
    ConfirmationTimeout {
        /// Broadcast transaction
        tx_hash: TxHash,
        /// How long we waited
        waited: Duration,
    },

    /// The caller stopped the confirmation wait. The broadcast is not
    /// retracted and may still be mined.
    #[error("stopped waiting for {tx_hash}, the transaction was not retracted")]
    ConfirmationCancelled {
        /// Broadcast transaction
        tx_hash: TxHash,
    },

    /// Returned data does not match the expected shape
    #[error("cannot decode {context}: {reason}")]
    Decoding {
        /// What was being decoded
        context: String,
        /// Why it failed
        reason: String,
    },

    /// Transport/network error
    #[error("transport error: {0}")]
    Transport(String),

    /// RPC error from node
    #[error("RPC error: {code} - {message}")]
    Rpc {
        /// Error code
        code: i64,
        /// Error message
        message: String,
    },

    /// Invalid hex string
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Error categories callers act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Fatal setup problem; fix configuration, do not retry
    Configuration,
    /// Caller supplied bad input; nothing was sent
    Validation,
    /// Account cannot pay for gas; top up and build again
    Funds,
    /// Signing or broadcast failed; not retried automatically
    Submission,
    /// Broadcast happened but the outcome is unknown
    Indeterminate,
    /// Returned data did not match the expected shape
    Decoding,
    /// Network or RPC failure outside submission
    Network,
}

impl SdkError {
    /// Category of this error
    pub fn class(&self) -> ErrorClass {
        match self {
            SdkError::CredentialMissing(_)
            | SdkError::InvalidPrivateKey(_)
            | SdkError::Connection { .. }
            | SdkError::UnknownContract(_)
            | SdkError::InterfaceLoad { .. }
            | SdkError::NotDeployable(_)
            | SdkError::Config(_) => ErrorClass::Configuration,
            SdkError::Validation { .. }
            | SdkError::MethodNotFound { .. }
            | SdkError::ArgumentCountMismatch { .. }
            | SdkError::Encoding { .. } => ErrorClass::Validation,
            SdkError::InsufficientFunds { .. } => ErrorClass::Funds,
            SdkError::Signing(_) | SdkError::Broadcast(_) | SdkError::DeploymentReverted { .. } => {
                ErrorClass::Submission
            }
            SdkError::ConfirmationTimeout { .. } | SdkError::ConfirmationCancelled { .. } => {
                ErrorClass::Indeterminate
            }
            SdkError::Decoding { .. } => ErrorClass::Decoding,
            SdkError::Transport(_)
            | SdkError::Rpc { .. }
            | SdkError::InvalidHex(_)
            | SdkError::Serialization(_) => ErrorClass::Network,
        }
    }

    /// True when a transaction was broadcast but its fate is unknown
    pub fn is_indeterminate(&self) -> bool {
        self.class() == ErrorClass::Indeterminate
    }

    pub(crate) fn decoding(context: impl Into<String>, reason: impl Into<String>) -> Self {
        SdkError::Decoding {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

impl From<hex::FromHexError> for SdkError {
    fn from(e: hex::FromHexError) -> Self {
        SdkError::InvalidHex(e.to_string())
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::Serialization(e.to_string())
    }
}

impl From<dpp_crypto::CryptoError> for SdkError {
    fn from(e: dpp_crypto::CryptoError) -> Self {
        SdkError::Signing(e.to_string())
    }
}

impl From<dpp_primitives::AddressError> for SdkError {
    fn from(e: dpp_primitives::AddressError) -> Self {
        SdkError::Encoding {
            param: "address".to_string(),
            reason: e.to_string(),
        }
    }
}
