use dpp_primitives::Address;

use super::{id_token, with_id, ContractFacade};
use crate::abi::Token;
use crate::records::{ProductData, ProductRecord};
use crate::types::{TransactionOutcome, TxOptions};
use crate::SdkError;

/// ProductPassport registry: product identity and extended product data
#[derive(Debug, Clone)]
pub struct ProductPassportFacade {
    contract: ContractFacade,
}

impl ProductPassportFacade {
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

    /// Deploy a registry owned by `initial_owner`, or by the signing
    /// account when `None`
    pub async fn deploy(&self, initial_owner: Option<Address>) -> Result<Address, SdkError> {
        let args = match self.contract.interface().constructor_arity() {
            0 => Vec::new(),
            _ => vec![Token::Address(
                initial_owner.unwrap_or_else(|| self.contract.sender()),
            )],
        };
        self.contract.deploy(args).await
    }

    /// Grant `entity` write access
    pub async fn authorize_entity(
        &self,
        address: Address,
        entity: Address,
    ) -> Result<TransactionOutcome, SdkError> {
        self.contract
            .transact(address, "authorizeEntity", vec![Token::Address(entity)])
            .await
    }

    /// Store the product identity under `product_id`
    pub async fn set_product(
        &self,
        address: Address,
        product_id: u64,
        record: &ProductRecord,
    ) -> Result<TransactionOutcome, SdkError> {
        record.validate()?;
        self.contract
            .transact(address, "setProduct", with_id(product_id, record.to_tokens()))
            .await
    }

    /// Read the product identity stored under `product_id`
    pub async fn get_product(
        &self,
        address: Address,
        product_id: u64,
    ) -> Result<ProductRecord, SdkError> {
        let tokens = self
            .contract
            .call_raw(address, "getProduct", vec![id_token(product_id)])
            .await?;
        ProductRecord::from_tokens(tokens)
    }

    /// Store extended product data under `product_id`
    pub async fn set_product_data(
        &self,
        address: Address,
        product_id: u64,
        data: &ProductData,
    ) -> Result<TransactionOutcome, SdkError> {
        data.validate()?;
        self.contract
            .transact(address, "setProductData", with_id(product_id, data.to_tokens()))
            .await
    }

    /// Read the extended product data stored under `product_id`
    pub async fn get_product_data(
        &self,
        address: Address,
        product_id: u64,
    ) -> Result<ProductData, SdkError> {
        let tokens = self
            .contract
            .call_raw(address, "getProductData", vec![id_token(product_id)])
            .await?;
        ProductData::from_tokens(tokens)
    }
}
