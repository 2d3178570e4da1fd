//! SDK types

use std::time::Duration;

use dpp_primitives::{Address, TxHash, U256};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::SdkError;

/// Block identifier for RPC queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockId {
    /// Block number
    Number(u64),
    /// Latest block
    #[default]
    Latest,
    /// Pending block (includes pending transactions)
    Pending,
    /// Earliest block (genesis)
    Earliest,
}

impl Serialize for BlockId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            BlockId::Number(n) => serializer.serialize_str(&format!("0x{:x}", n)),
            BlockId::Latest => serializer.serialize_str("latest"),
            BlockId::Pending => serializer.serialize_str("pending"),
            BlockId::Earliest => serializer.serialize_str("earliest"),
        }
    }
}

/// Call request for eth_call and eth_estimateGas
#[derive(Debug, Clone, Default)]
pub struct CallRequest {
    /// Sender address
    pub from: Option<Address>,
    /// Recipient address (None for contract creation estimates)
    pub to: Option<Address>,
    /// Gas limit
    pub gas: Option<u64>,
    /// Gas price
    pub gas_price: Option<u128>,
    /// Input data
    pub data: Option<Bytes>,
}

impl Serialize for CallRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let count = [
            self.from.is_some(),
            self.to.is_some(),
            self.gas.is_some(),
            self.gas_price.is_some(),
            self.data.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count();

        let mut map = serializer.serialize_map(Some(count))?;

        if let Some(from) = &self.from {
            map.serialize_entry("from", &from.to_hex())?;
        }
        if let Some(to) = &self.to {
            map.serialize_entry("to", &to.to_hex())?;
        }
        if let Some(gas) = &self.gas {
            map.serialize_entry("gas", &format!("0x{:x}", gas))?;
        }
        if let Some(gas_price) = &self.gas_price {
            map.serialize_entry("gasPrice", &format!("0x{:x}", gas_price))?;
        }
        if let Some(data) = &self.data {
            map.serialize_entry("data", &format!("0x{}", hex::encode(data)))?;
        }

        map.end()
    }
}

/// Per-call overrides for gas and confirmation
#[derive(Debug, Clone, Default)]
pub struct TxOptions {
    /// Gas limit; falls back to the configured default for the call kind
    pub gas_limit: Option<u64>,
    /// Gas price in wei; falls back to the configured default
    pub gas_price: Option<u128>,
    /// Confirmation timeout; falls back to the configured default
    pub timeout: Option<Duration>,
    /// Stops the local confirmation wait when cancelled. The transaction
    /// is not retracted and may still be mined.
    pub cancel: Option<CancellationToken>,
}

impl TxOptions {
    /// No overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the gas limit
    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    /// Override the gas price (wei)
    pub fn gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    /// Override the confirmation timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attach a cancellation token for the confirmation wait
    pub fn cancel_with(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Whether a transaction creates a contract or calls one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    /// Contract creation
    Deploy,
    /// State-changing method call
    Call,
}

/// Broadcast transaction awaiting confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransaction {
    /// Transaction hash
    pub hash: TxHash,
    /// Deploy or call
    pub kind: TxKind,
}

impl PendingTransaction {
    /// Create a new pending transaction
    pub fn new(hash: TxHash, kind: TxKind) -> Self {
        Self { hash, kind }
    }
}

/// Execution status from the receipt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// status = 1
    Success,
    /// status = 0 (reverted)
    Failure,
}

/// Transaction receipt, as returned by `eth_getTransactionReceipt`
#[derive(Debug, Clone)]
pub struct TransactionReceipt {
    /// Transaction hash
    pub transaction_hash: TxHash,
    /// Block the transaction was included in
    pub block_number: Option<u64>,
    /// Execution status
    pub status: TxStatus,
    /// Created contract, for deployments
    pub contract_address: Option<Address>,
    /// Gas consumed
    pub gas_used: Option<u64>,
    /// The receipt as the node returned it
    pub raw: Value,
}

impl TransactionReceipt {
    /// Parse from the RPC JSON object.
    ///
    /// Pre-Byzantium receipts carry no `status`; those are rejected rather
    /// than guessed.
    pub fn from_json(value: Value) -> Result<Self, SdkError> {
        let field = |name: &str| value.get(name).and_then(Value::as_str);
        let quantity = |name: &str| {
            field(name)
                .map(|s| {
                    parse_hex_u64(s)
                        .map_err(|e| SdkError::decoding("receipt", format!("{name}: {e}")))
                })
                .transpose()
        };

        let transaction_hash = field("transactionHash")
            .ok_or_else(|| SdkError::decoding("receipt", "missing transactionHash"))?
            .parse::<TxHash>()
            .map_err(|e| SdkError::decoding("receipt", e.to_string()))?;

        let status = match quantity("status")? {
            Some(1) => TxStatus::Success,
            Some(0) => TxStatus::Failure,
            Some(other) => {
                return Err(SdkError::decoding("receipt", format!("unknown status {other}")))
            }
            None => return Err(SdkError::decoding("receipt", "missing status")),
        };

        let contract_address = field("contractAddress")
            .map(|s| {
                s.parse::<Address>()
                    .map_err(|e| SdkError::decoding("receipt", e.to_string()))
            })
            .transpose()?;

        let block_number = quantity("blockNumber")?;
        let gas_used = quantity("gasUsed")?;

        Ok(Self {
            transaction_hash,
            block_number,
            status,
            contract_address,
            gas_used,
            raw: value,
        })
    }
}

/// Final, typed result of a confirmed transaction
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutcome {
    /// Success or failure as recorded on chain
    pub status: TxStatus,
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Created contract, for successful deployments
    pub contract_address: Option<Address>,
    /// Inclusion block
    pub block_number: Option<u64>,
    /// Gas consumed
    pub gas_used: Option<u64>,
    /// Full receipt
    #[serde(skip)]
    pub receipt: Value,
}

impl TransactionOutcome {
    /// True when the transaction executed without reverting
    pub fn is_success(&self) -> bool {
        self.status == TxStatus::Success
    }
}

impl From<TransactionReceipt> for TransactionOutcome {
    fn from(receipt: TransactionReceipt) -> Self {
        Self {
            status: receipt.status,
            tx_hash: receipt.transaction_hash,
            contract_address: receipt.contract_address,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            receipt: receipt.raw,
        }
    }
}

pub(crate) fn parse_hex_u64(s: &str) -> Result<u64, SdkError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).map_err(|e| SdkError::InvalidHex(e.to_string()))
}

pub(crate) fn parse_hex_u256(s: &str) -> Result<U256, SdkError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    U256::from_str_radix(s, 16).map_err(|e| SdkError::InvalidHex(format!("{s}: {e:?}")))
}

pub(crate) fn parse_hex_bytes(s: &str) -> Result<Bytes, SdkError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return Ok(Bytes::new());
    }
    Ok(Bytes::from(hex::decode(s)?))
}
