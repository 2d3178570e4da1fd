//! FundsGuard - refuse to build what the sender cannot pay for

use dpp_primitives::{Address, U256};
use tracing::debug;

use crate::client::NetworkClient;
use crate::types::BlockId;
use crate::SdkError;

/// Worst-case fee for a transaction: `gas_limit * gas_price`
pub fn required_wei(gas_limit: u64, gas_price: u128) -> U256 {
    U256::from(gas_limit) * U256::from(gas_price)
}

/// Checks the sender's balance against the worst-case fee
#[derive(Debug, Clone)]
pub struct FundsGuard {
    client: NetworkClient,
}

impl FundsGuard {
    /// Guard backed by `client`
    pub fn new(client: NetworkClient) -> Self {
        Self { client }
    }

    /// Fail with [`SdkError::InsufficientFunds`] when the latest balance is
    /// below `required`. A balance exactly equal to `required` passes.
    pub async fn ensure_funds(&self, sender: &Address, required: U256) -> Result<U256, SdkError> {
        let available = self.client.get_balance(sender, BlockId::Latest).await?;
        debug!(%sender, %available, %required, "funds check");
        check(available, required)?;
        Ok(available)
    }
}

fn check(available: U256, required: U256) -> Result<(), SdkError> {
    if available < required {
        return Err(SdkError::InsufficientFunds {
            available,
            required,
        });
    }
    Ok(())
}
