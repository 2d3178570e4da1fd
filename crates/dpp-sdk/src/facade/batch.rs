use dpp_primitives::Address;

use super::{id_token, with_id, ContractFacade};
use crate::abi::Token;
use crate::records::BatchRecord;
use crate::types::{TransactionOutcome, TxOptions};
use crate::SdkError;

/// Batch registry linked to a ProductPassport registry
#[derive(Debug, Clone)]
pub struct BatchFacade {
    contract: ContractFacade,
}

impl BatchFacade {
    pub(crate) fn new(contract: ContractFacade) -> Self {
        Self { contract }
    }

    /// Untyped access to the same contract
    pub fn contract(&self) -> &ContractFacade {
        &self.contract
    }

    /// Same facade with different per-transaction options
    pub fn with_options(self, options: TxOptions) -> Self {
        Self::new(self.contract.with_options(options))
    }

    /// Deploy a batch registry bound to the passport registry at
    /// `product_passport`
    pub async fn deploy(&self, product_passport: Address) -> Result<Address, SdkError> {
        let args = match self.contract.interface().constructor_arity() {
            0 => Vec::new(),
            _ => vec![Token::Address(product_passport)],
        };
        self.contract.deploy(args).await
    }

    /// Record a new batch under `batch_id`
    pub async fn create_batch(
        &self,
        address: Address,
        batch_id: u64,
        record: &BatchRecord,
    ) -> Result<TransactionOutcome, SdkError> {
        record.validate()?;
        self.contract
            .transact(address, "createBatch", with_id(batch_id, record.to_tokens()))
            .await
    }

    /// Read the batch stored under `batch_id`
    pub async fn get_batch(&self, address: Address, batch_id: u64) -> Result<BatchRecord, SdkError> {
        let tokens = self
            .contract
            .call_raw(address, "getBatch", vec![id_token(batch_id)])
            .await?;
        BatchRecord::from_tokens(tokens)
    }
}
