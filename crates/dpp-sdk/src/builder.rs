//! TransactionBuilder - from method name and arguments to an unsigned,
//! nonced, priced and funded transaction

use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use dpp_primitives::{Address, U256};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::abi::{coerce, ContractInterface, MethodDescriptor, Token};
use crate::client::NetworkClient;
use crate::config::GasConfig;
use crate::funds::{required_wei, FundsGuard};
use crate::types::{BlockId, CallRequest, TxKind, TxOptions};
use crate::SdkError;

/// Legacy (EIP-155) transaction ready for signing. Value is always zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    /// Replay-protection chain id
    pub chain_id: u64,
    /// Signing account
    pub sender: Address,
    /// Sender nonce at build time
    pub nonce: u64,
    /// Gas limit
    pub gas_limit: u64,
    /// Gas price in wei
    pub gas_price: u128,
    /// Recipient; `None` creates a contract
    pub to: Option<Address>,
    /// Wei transferred
    pub value: U256,
    /// Call data or creation code
    pub data: Bytes,
}

impl UnsignedTransaction {
    /// True for contract creation
    pub fn is_deploy(&self) -> bool {
        self.to.is_none()
    }

    /// Deploy or call
    pub fn kind(&self) -> TxKind {
        if self.is_deploy() {
            TxKind::Deploy
        } else {
            TxKind::Call
        }
    }

    /// Worst-case fee
    pub fn max_cost(&self) -> U256 {
        required_wei(self.gas_limit, self.gas_price) + self.value
    }
}

/// An unsigned transaction that still holds its sender's nonce lock.
///
/// No other build for the same sender can observe a nonce until this
/// value is broadcast or dropped.
pub struct PreparedTransaction {
    tx: UnsignedTransaction,
    nonce_guard: OwnedMutexGuard<()>,
}

impl PreparedTransaction {
    /// The transaction
    pub fn transaction(&self) -> &UnsignedTransaction {
        &self.tx
    }
}

impl std::fmt::Debug for PreparedTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedTransaction")
            .field("tx", &self.tx)
            .finish_non_exhaustive()
    }
}

/// Per-sender async locks serialising nonce use
#[derive(Debug, Clone, Default)]
pub struct NonceLocks {
    locks: Arc<DashMap<Address, Arc<Mutex<()>>>>,
}

impl NonceLocks {
    /// Wait for exclusive use of `sender`'s nonce
    pub async fn acquire(&self, sender: Address) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(sender).or_default().clone();
        lock.lock_owned().await
    }
}

/// Look up a method, failing with [`SdkError::MethodNotFound`]
pub fn resolve_method<'a>(
    interface: &'a ContractInterface,
    method: &str,
) -> Result<&'a MethodDescriptor, SdkError> {
    interface.method(method).ok_or_else(|| SdkError::MethodNotFound {
        contract: interface.name().to_string(),
        method: method.to_string(),
    })
}

/// Check arity and coerce each argument to its declared type
pub fn prepare_args(method: &MethodDescriptor, args: Vec<Token>) -> Result<Vec<Token>, SdkError> {
    if args.len() != method.inputs.len() {
        return Err(SdkError::ArgumentCountMismatch {
            method: method.name.clone(),
            expected: method.inputs.len(),
            actual: args.len(),
        });
    }

    method
        .inputs
        .iter()
        .zip(args)
        .enumerate()
        .map(|(i, (param, arg))| {
            coerce(&param.kind, arg).map_err(|reason| SdkError::Encoding {
                param: if param.name.is_empty() {
                    format!("#{i}")
                } else {
                    param.name.clone()
                },
                reason,
            })
        })
        .collect()
}

/// Resolve, check and encode a method call
pub fn encode_call(
    interface: &ContractInterface,
    method: &str,
    args: Vec<Token>,
) -> Result<Bytes, SdkError> {
    let descriptor = resolve_method(interface, method)?;
    let tokens = prepare_args(descriptor, args)?;
    Ok(descriptor.encode_call(&tokens))
}

/// Builds unsigned transactions.
///
/// Steps run in a fixed order and any failure aborts with nothing sent:
/// method lookup and arity, argument encoding, nonce (under the sender
/// lock), gas selection, funds check.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    client: NetworkClient,
    funds: FundsGuard,
    gas: GasConfig,
    locks: NonceLocks,
}

impl TransactionBuilder {
    /// Builder with the given gas defaults
    pub fn new(client: NetworkClient, gas: GasConfig) -> Self {
        Self {
            funds: FundsGuard::new(client.clone()),
            client,
            gas,
            locks: NonceLocks::default(),
        }
    }

    /// Gas defaults in use
    pub fn gas_config(&self) -> &GasConfig {
        &self.gas
    }

    /// Build a contract creation
    pub async fn build_deploy(
        &self,
        interface: &ContractInterface,
        args: Vec<Token>,
        sender: Address,
        options: &TxOptions,
    ) -> Result<PreparedTransaction, SdkError> {
        let tokens = match interface.constructor() {
            Some(constructor) => prepare_args(constructor, args)?,
            None if args.is_empty() => Vec::new(),
            None => {
                return Err(SdkError::ArgumentCountMismatch {
                    method: "constructor".to_string(),
                    expected: 0,
                    actual: args.len(),
                })
            }
        };
        let data = interface.deploy_data(&tokens)?;
        self.finish(None, data, sender, options).await
    }

    /// Build a state-changing method call
    pub async fn build_call(
        &self,
        interface: &ContractInterface,
        to: Address,
        method: &str,
        args: Vec<Token>,
        sender: Address,
        options: &TxOptions,
    ) -> Result<PreparedTransaction, SdkError> {
        let data = encode_call(interface, method, args)?;
        self.finish(Some(to), data, sender, options).await
    }

    async fn finish(
        &self,
        to: Option<Address>,
        data: Bytes,
        sender: Address,
        options: &TxOptions,
    ) -> Result<PreparedTransaction, SdkError> {
        let nonce_guard = self.locks.acquire(sender).await;
        let nonce = self
            .client
            .get_transaction_count(&sender, BlockId::Pending)
            .await?;

        let gas_price = options
            .gas_price
            .unwrap_or(u128::from(self.gas.gas_price_wei));
        let gas_limit = match options.gas_limit {
            Some(limit) => limit,
            None => self.choose_gas_limit(to, &data, sender).await,
        };

        self.funds
            .ensure_funds(&sender, required_wei(gas_limit, gas_price))
            .await?;

        let tx = UnsignedTransaction {
            chain_id: self.client.chain_id(),
            sender,
            nonce,
            gas_limit,
            gas_price,
            to,
            value: U256::zero(),
            data,
        };
        debug!(
            kind = ?tx.kind(),
            %sender,
            nonce,
            gas_limit,
            gas_price,
            payload_len = tx.data.len(),
            "transaction built"
        );

        Ok(PreparedTransaction {
            tx,
            nonce_guard,
        })
    }

    async fn choose_gas_limit(&self, to: Option<Address>, data: &Bytes, sender: Address) -> u64 {
        let fixed = if to.is_none() {
            self.gas.deploy_gas_limit
        } else {
            self.gas.call_gas_limit
        };
        if !self.gas.estimate {
            return fixed;
        }

        let request = CallRequest {
            from: Some(sender),
            to,
            data: Some(data.clone()),
            ..Default::default()
        };
        match self.client.estimate_gas(&request).await {
            Ok(estimate) => estimate,
            Err(e) => {
                warn!(error = %e, fallback = fixed, "gas estimation failed, using fixed limit");
                fixed
            }
        }
    }
}

/// Split a prepared transaction for signing and broadcast. The guard must
/// be held until the signed bytes have been handed to the node.
pub(crate) fn into_parts(prepared: PreparedTransaction) -> (UnsignedTransaction, OwnedMutexGuard<()>) {
    (prepared.tx, prepared.nonce_guard)
}
