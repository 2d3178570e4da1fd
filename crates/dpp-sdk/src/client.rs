//! NetworkClient - typed JSON-RPC calls over a [`Transport`]

use std::sync::Arc;

use bytes::Bytes;
use dpp_primitives::{Address, TxHash, U256};
use serde_json::Value;

use crate::transport::{deserialize_response, Transport};
use crate::types::{
    parse_hex_bytes, parse_hex_u256, parse_hex_u64, BlockId, CallRequest,
    TransactionReceipt,
};
use crate::SdkError;

#[cfg(feature = "http")]
use crate::transport::HttpTransport;

/// Client for the Ethereum JSON-RPC methods the SDK needs.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct NetworkClient {
    transport: Arc<dyn Transport>,
    chain_id: u64,
}

impl std::fmt::Debug for NetworkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkClient")
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

impl NetworkClient {
    /// Connect over HTTP and fetch the chain id.
    ///
    /// Any failure here is reported as [`SdkError::Connection`].
    #[cfg(feature = "http")]
    pub async fn connect(url: &str) -> Result<Self, SdkError> {
        Self::with_transport(Arc::new(HttpTransport::new(url)))
            .await
            .map_err(|e| SdkError::Connection {
                endpoint: url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Create a client over a custom transport, probing `eth_chainId`
    pub async fn with_transport(transport: Arc<dyn Transport>) -> Result<Self, SdkError> {
        let result: String = deserialize_response(transport.request_json("eth_chainId", vec![]).await?)?;
        let chain_id = parse_hex_u64(&result)?;
        Ok(Self { transport, chain_id })
    }

    /// Create a client with a known chain id, without probing
    pub fn with_chain_id(transport: Arc<dyn Transport>, chain_id: u64) -> Self {
        Self { transport, chain_id }
    }

    /// Helper method to make RPC request and deserialize
    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, SdkError> {
        let value = self.transport.request_json(method, params).await?;
        deserialize_response(value)
    }

    // ==================== Chain Info ====================

    /// Chain id observed at connection time
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    // ==================== Account Queries ====================

    /// Get the balance of an address
    pub async fn get_balance(&self, address: &Address, block: BlockId) -> Result<U256, SdkError> {
        let result: String = self
            .request(
                "eth_getBalance",
                vec![Value::String(address.to_hex()), serde_json::to_value(block)?],
            )
            .await?;
        parse_hex_u256(&result)
    }

    /// Get the transaction count of an address. With [`BlockId::Pending`]
    /// this is the next usable nonce.
    pub async fn get_transaction_count(
        &self,
        address: &Address,
        block: BlockId,
    ) -> Result<u64, SdkError> {
        let result: String = self
            .request(
                "eth_getTransactionCount",
                vec![Value::String(address.to_hex()), serde_json::to_value(block)?],
            )
            .await?;
        parse_hex_u64(&result)
    }

    // ==================== Transactions ====================

    /// Send a raw signed transaction, returning its hash
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash, SdkError> {
        let encoded = format!("0x{}", hex::encode(raw));
        let result: String = self
            .request("eth_sendRawTransaction", vec![Value::String(encoded)])
            .await?;
        TxHash::from_hex(&result).map_err(|e| SdkError::InvalidHex(e.to_string()))
    }

    /// Get a transaction receipt; `None` while the transaction is unmined
    pub async fn get_receipt(&self, hash: &TxHash) -> Result<Option<TransactionReceipt>, SdkError> {
        let result: Value = self
            .request("eth_getTransactionReceipt", vec![Value::String(hash.to_hex())])
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        TransactionReceipt::from_json(result).map(Some)
    }

    // ==================== Call & Estimation ====================

    /// Execute a read-only call
    pub async fn call(&self, request: &CallRequest, block: BlockId) -> Result<Bytes, SdkError> {
        let result: String = self
            .request(
                "eth_call",
                vec![serde_json::to_value(request)?, serde_json::to_value(block)?],
            )
            .await?;
        parse_hex_bytes(&result)
    }

    /// Estimate gas for a transaction
    pub async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, SdkError> {
        let result: String = self
            .request("eth_estimateGas", vec![serde_json::to_value(request)?])
            .await?;
        parse_hex_u64(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use serde_json::json;

    async fn mock_client() -> (Arc<MockTransport>, NetworkClient) {
        let mock = Arc::new(MockTransport::new());
        let client = NetworkClient::with_transport(mock.clone()).await.unwrap();
        (mock, client)
    }

    #[tokio::test]
    async fn test_chain_id_probe() {
        let mock = Arc::new(MockTransport::new());
        mock.set_response("eth_chainId", json!("0xaa36a7"));
        let client = NetworkClient::with_transport(mock).await.unwrap();
        assert_eq!(client.chain_id(), 11_155_111);
    }

    #[tokio::test]
    async fn test_balance() {
        let (_, client) = mock_client().await;
        let balance = client.get_balance(&Address::ZERO, BlockId::Latest).await.unwrap();
        assert_eq!(balance, U256::from(1_000_000_000_000_000_000u128));
    }

    #[tokio::test]
    async fn test_pending_nonce_request() {
        let (mock, client) = mock_client().await;
        mock.set_response("eth_getTransactionCount", json!("0x7"));
        let nonce = client
            .get_transaction_count(&Address::ZERO, BlockId::Pending)
            .await
            .unwrap();
        assert_eq!(nonce, 7);

        let call = mock.calls().pop().unwrap();
        assert_eq!(call.params[1], json!("pending"));
    }

    #[tokio::test]
    async fn test_receipt_null_is_none() {
        let (_, client) = mock_client().await;
        assert!(client.get_receipt(&TxHash::ZERO).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_send_raw_transaction() {
        let (mock, client) = mock_client().await;
        let hash = client.send_raw_transaction(&[0xf8, 0x01]).await.unwrap();
        assert_ne!(hash, TxHash::ZERO);
        assert_eq!(mock.calls().pop().unwrap().params[0], json!("0xf801"));
    }

    #[tokio::test]
    async fn test_estimate_gas() {
        let (_, client) = mock_client().await;
        let gas = client.estimate_gas(&CallRequest::default()).await.unwrap();
        assert_eq!(gas, 21000);
    }

    #[tokio::test]
    async fn test_rpc_error_passes_through() {
        let (mock, client) = mock_client().await;
        mock.set_error("eth_call", 3, "execution reverted");
        let err = client
            .call(&CallRequest::default(), BlockId::Latest)
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Rpc { code: 3, .. }));
    }
}
