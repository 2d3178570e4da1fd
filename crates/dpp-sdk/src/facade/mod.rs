//! Contract facades
//!
//! A [`ContractFacade`] binds one registered interface to the shared
//! build, sign and submit pipeline. The typed facades in this module
//! ([`ProductPassportFacade`], [`BatchFacade`], [`GeolocationFacade`])
//! add record-level operations on top of it.

mod batch;
mod geolocation;
mod passport;

use std::sync::Arc;

use dpp_primitives::Address;
use tracing::{debug, info};

pub use batch::BatchFacade;
pub use geolocation::GeolocationFacade;
pub use passport::ProductPassportFacade;

use crate::abi::{ContractInterface, Token};
use crate::builder::{prepare_args, resolve_method, TransactionBuilder};
use crate::client::NetworkClient;
use crate::credential::Credential;
use crate::registry::ContractKind;
use crate::submitter::TransactionSubmitter;
use crate::types::{BlockId, CallRequest, TransactionOutcome, TxOptions};
use crate::SdkError;

/// Everything a facade needs to send transactions, shared by all facades
/// of one SDK instance
pub(crate) struct Pipeline {
    pub(crate) client: NetworkClient,
    pub(crate) credential: Arc<Credential>,
    pub(crate) builder: TransactionBuilder,
    pub(crate) submitter: TransactionSubmitter,
}

/// Deploy, transact and call against one contract interface
#[derive(Clone)]
pub struct ContractFacade {
    kind: ContractKind,
    interface: Arc<ContractInterface>,
    pipeline: Arc<Pipeline>,
    options: TxOptions,
}

impl std::fmt::Debug for ContractFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractFacade")
            .field("kind", &self.kind)
            .field("sender", &self.pipeline.credential.address())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ContractFacade {
    pub(crate) fn new(
        kind: ContractKind,
        interface: Arc<ContractInterface>,
        pipeline: Arc<Pipeline>,
    ) -> Self {
        Self {
            kind,
            interface,
            pipeline,
            options: TxOptions::default(),
        }
    }

    /// Which contract this facade drives
    pub fn kind(&self) -> ContractKind {
        self.kind
    }

    /// Interface resolved at SDK construction
    pub fn interface(&self) -> &Arc<ContractInterface> {
        &self.interface
    }

    /// Address that signs this facade's transactions
    pub fn sender(&self) -> Address {
        self.pipeline.credential.address()
    }

    /// Options applied to every transaction sent through this facade
    pub fn options(&self) -> &TxOptions {
        &self.options
    }

    /// Same facade with different per-transaction options
    pub fn with_options(mut self, options: TxOptions) -> Self {
        self.options = options;
        self
    }

    /// Deploy a new instance and return its address.
    ///
    /// A mined but reverted deployment is [`SdkError::DeploymentReverted`].
    pub async fn deploy(&self, args: Vec<Token>) -> Result<Address, SdkError> {
        let pipeline = &self.pipeline;
        let prepared = pipeline
            .builder
            .build_deploy(&self.interface, args, self.sender(), &self.options)
            .await?;
        let outcome = pipeline
            .submitter
            .submit(prepared, &pipeline.credential, &self.options)
            .await?;

        if !outcome.is_success() {
            return Err(SdkError::DeploymentReverted {
                contract: self.kind.to_string(),
                tx_hash: outcome.tx_hash,
            });
        }
        let address = outcome.contract_address.ok_or_else(|| {
            SdkError::decoding("deployment receipt", "missing contractAddress")
        })?;

        info!(contract = %self.kind, %address, tx_hash = %outcome.tx_hash, "contract deployed");
        Ok(address)
    }

    /// Send a state-changing call and wait for its receipt.
    ///
    /// A reverted call is returned as an outcome with failure status, not
    /// as an error.
    pub async fn transact(
        &self,
        address: Address,
        method: &str,
        args: Vec<Token>,
    ) -> Result<TransactionOutcome, SdkError> {
        let pipeline = &self.pipeline;
        let prepared = pipeline
            .builder
            .build_call(&self.interface, address, method, args, self.sender(), &self.options)
            .await?;
        debug!(contract = %self.kind, %address, method, "submitting call");
        pipeline
            .submitter
            .submit(prepared, &pipeline.credential, &self.options)
            .await
    }

    /// Read-only call through `eth_call`, decoded with the method's
    /// declared outputs. Takes no nonce lock and spends no gas.
    pub async fn call_raw(
        &self,
        address: Address,
        method: &str,
        args: Vec<Token>,
    ) -> Result<Vec<Token>, SdkError> {
        let descriptor = resolve_method(&self.interface, method)?;
        let tokens = prepare_args(descriptor, args)?;
        let request = CallRequest {
            from: Some(self.sender()),
            to: Some(address),
            data: Some(descriptor.encode_call(&tokens)),
            ..Default::default()
        };

        let returned = self.pipeline.client.call(&request, BlockId::Latest).await?;
        if returned.is_empty() && !descriptor.outputs.is_empty() {
            return Err(SdkError::decoding(
                format!("{}.{}", self.kind, method),
                "empty return data (no contract at address?)",
            ));
        }
        descriptor.decode_output(&returned)
    }

    /// Number of inputs `method` declares, if it exists
    pub(crate) fn arity(&self, method: &str) -> Result<usize, SdkError> {
        Ok(resolve_method(&self.interface, method)?.inputs.len())
    }
}

/// Identifier argument. Coerced to `uint256` or `string` per the
/// interface's declared parameter type when the call is built.
pub(crate) fn id_token(id: u64) -> Token {
    Token::uint(id)
}

/// `[id, fields...]`
pub(crate) fn with_id(id: u64, fields: Vec<Token>) -> Vec<Token> {
    let mut args = Vec::with_capacity(fields.len() + 1);
    args.push(id_token(id));
    args.extend(fields);
    args
}
