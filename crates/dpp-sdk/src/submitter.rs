//! TransactionSubmitter - sign, broadcast, wait for the receipt

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::builder::{into_parts, PreparedTransaction};
use crate::client::NetworkClient;
use crate::config::ConfirmationConfig;
use crate::credential::Credential;
use crate::signer::{raw_transaction_hash, Eip155Signer, TransactionSigner};
use crate::types::{
    PendingTransaction, TransactionOutcome, TransactionReceipt, TxKind, TxOptions, TxStatus,
};
use crate::SdkError;

/// Signs and broadcasts prepared transactions and polls for receipts.
///
/// Nothing here retries a broadcast. A timeout or cancellation while
/// waiting means the outcome is unknown, never that the transaction
/// failed; on-chain failure is reported as [`TxStatus::Failure`].
#[derive(Clone)]
pub struct TransactionSubmitter {
    client: NetworkClient,
    signer: Arc<dyn TransactionSigner>,
    confirmation: ConfirmationConfig,
}

impl std::fmt::Debug for TransactionSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSubmitter")
            .field("confirmation", &self.confirmation)
            .finish_non_exhaustive()
    }
}

impl TransactionSubmitter {
    /// Submitter using EIP-155 signing
    pub fn new(client: NetworkClient, confirmation: ConfirmationConfig) -> Self {
        Self::with_signer(client, confirmation, Arc::new(Eip155Signer))
    }

    /// Submitter with a custom signer
    pub fn with_signer(
        client: NetworkClient,
        confirmation: ConfirmationConfig,
        signer: Arc<dyn TransactionSigner>,
    ) -> Self {
        Self {
            client,
            signer,
            confirmation,
        }
    }

    /// Broadcast, then wait for the receipt
    pub async fn submit(
        &self,
        prepared: PreparedTransaction,
        credential: &Credential,
        options: &TxOptions,
    ) -> Result<TransactionOutcome, SdkError> {
        let pending = self.broadcast(prepared, credential).await?;
        self.confirm(&pending, options).await
    }

    /// Sign and hand the transaction to the node.
    ///
    /// The sender's nonce lock is released once the node has accepted or
    /// rejected the bytes.
    pub async fn broadcast(
        &self,
        prepared: PreparedTransaction,
        credential: &Credential,
    ) -> Result<PendingTransaction, SdkError> {
        let (tx, nonce_guard) = into_parts(prepared);

        let raw = self.signer.sign(&tx, credential).map_err(|e| match e {
            SdkError::Signing(_) => e,
            other => SdkError::Signing(other.to_string()),
        })?;

        let expected = raw_transaction_hash(&raw);
        debug!(tx_hash = %expected, bytes = raw.len(), "sending signed transaction");
        let sent = self.client.send_raw_transaction(&raw).await;
        drop(nonce_guard);
        let hash = sent.map_err(|e| SdkError::Broadcast(e.to_string()))?;
        if hash != expected {
            warn!(node = %hash, local = %expected, "node reported a different transaction hash");
        }

        info!(
            tx_hash = %hash,
            kind = ?tx.kind(),
            nonce = tx.nonce,
            sender = %tx.sender,
            "transaction broadcast"
        );
        Ok(PendingTransaction::new(hash, tx.kind()))
    }

    /// Wait for the receipt of a broadcast transaction.
    ///
    /// Stops with [`SdkError::ConfirmationTimeout`] after the configured
    /// timeout and with [`SdkError::ConfirmationCancelled`] when the token
    /// in `options` is cancelled. Neither retracts the transaction.
    pub async fn confirm(
        &self,
        pending: &PendingTransaction,
        options: &TxOptions,
    ) -> Result<TransactionOutcome, SdkError> {
        let waited = options.timeout.unwrap_or_else(|| self.confirmation.timeout());
        let cancel = options.cancel.clone().unwrap_or_default();
        self.wait(pending, waited, &cancel).await
    }

    async fn wait(
        &self,
        pending: &PendingTransaction,
        waited: Duration,
        cancel: &CancellationToken,
    ) -> Result<TransactionOutcome, SdkError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(tx_hash = %pending.hash, "confirmation wait cancelled, transaction may still be mined");
                Err(SdkError::ConfirmationCancelled { tx_hash: pending.hash })
            }
            polled = tokio::time::timeout(waited, self.poll(pending)) => match polled {
                Ok(result) => result,
                Err(_) => {
                    warn!(tx_hash = %pending.hash, ?waited, "no receipt before timeout");
                    Err(SdkError::ConfirmationTimeout { tx_hash: pending.hash, waited })
                }
            },
        }
    }

    async fn poll(&self, pending: &PendingTransaction) -> Result<TransactionOutcome, SdkError> {
        let interval = self.confirmation.poll_interval();
        loop {
            match self.client.get_receipt(&pending.hash).await {
                Ok(Some(receipt)) => return outcome(pending, receipt),
                Ok(None) => debug!(tx_hash = %pending.hash, "receipt not yet available"),
                Err(e @ (SdkError::Transport(_) | SdkError::Rpc { .. })) => {
                    warn!(tx_hash = %pending.hash, error = %e, "receipt poll failed, retrying")
                }
                Err(e) => return Err(e),
            }
            tokio::time::sleep(interval).await;
        }
    }
}

fn outcome(
    pending: &PendingTransaction,
    receipt: TransactionReceipt,
) -> Result<TransactionOutcome, SdkError> {
    if pending.kind == TxKind::Deploy
        && receipt.status == TxStatus::Success
        && receipt.contract_address.is_none()
    {
        return Err(SdkError::decoding(
            "deployment receipt",
            "successful deployment without contractAddress",
        ));
    }

    let outcome = TransactionOutcome::from(receipt);
    match outcome.status {
        TxStatus::Success => info!(
            tx_hash = %outcome.tx_hash,
            block = ?outcome.block_number,
            gas_used = ?outcome.gas_used,
            "transaction confirmed"
        ),
        TxStatus::Failure => warn!(
            tx_hash = %outcome.tx_hash,
            block = ?outcome.block_number,
            "transaction reverted"
        ),
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use dpp_primitives::TxHash;
    use serde_json::json;

    const HASH: &str = "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b";

    fn submitter(mock: Arc<MockTransport>) -> TransactionSubmitter {
        let client = NetworkClient::with_chain_id(mock, 1);
        TransactionSubmitter::new(
            client,
            ConfirmationConfig {
                timeout_secs: 5,
                poll_interval_ms: 10,
            },
        )
    }

    fn pending(kind: TxKind) -> PendingTransaction {
        PendingTransaction::new(HASH.parse::<TxHash>().unwrap(), kind)
    }

    #[tokio::test]
    async fn test_confirm_success() {
        let mock = Arc::new(MockTransport::new());
        mock.set_response(
            "eth_getTransactionReceipt",
            json!({"transactionHash": HASH, "status": "0x1", "blockNumber": "0x2"}),
        );
        let outcome = submitter(mock)
            .confirm(&pending(TxKind::Call), &TxOptions::new())
            .await
            .unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.block_number, Some(2));
    }

    #[tokio::test]
    async fn test_revert_is_outcome_not_error() {
        let mock = Arc::new(MockTransport::new());
        mock.set_response(
            "eth_getTransactionReceipt",
            json!({"transactionHash": HASH, "status": "0x0"}),
        );
        let outcome = submitter(mock)
            .confirm(&pending(TxKind::Call), &TxOptions::new())
            .await
            .unwrap();
        assert_eq!(outcome.status, TxStatus::Failure);
    }

    #[tokio::test]
    async fn test_deploy_without_address_is_decoding_error() {
        let mock = Arc::new(MockTransport::new());
        mock.set_response(
            "eth_getTransactionReceipt",
            json!({"transactionHash": HASH, "status": "0x1", "contractAddress": null}),
        );
        let err = submitter(mock)
            .confirm(&pending(TxKind::Deploy), &TxOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Decoding { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_receipt_is_decoding_error() {
        let mock = Arc::new(MockTransport::new());
        mock.set_response(
            "eth_getTransactionReceipt",
            json!({"transactionHash": HASH, "status": "0x1", "blockNumber": "not-hex"}),
        );
        let err = submitter(mock.clone())
            .confirm(&pending(TxKind::Call), &TxOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Decoding { ref reason, .. } if reason.starts_with("blockNumber")));
        assert!(!err.is_indeterminate());
        assert_eq!(mock.call_count("eth_getTransactionReceipt"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_indeterminate() {
        let mock = Arc::new(MockTransport::new());
        let opts = TxOptions::new().timeout(Duration::from_secs(2));
        let err = submitter(mock.clone())
            .confirm(&pending(TxKind::Call), &opts)
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::ConfirmationTimeout { waited, .. } if waited == Duration::from_secs(2)));
        assert!(err.is_indeterminate());
        assert!(mock.call_count("eth_getTransactionReceipt") > 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_keep_polling() {
        let mock = Arc::new(MockTransport::new());
        mock.set_error("eth_getTransactionReceipt", -32000, "indexing in progress");
        let err = submitter(mock.clone())
            .confirm(&pending(TxKind::Call), &TxOptions::new().timeout(Duration::from_secs(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::ConfirmationTimeout { .. }));
        assert!(mock.call_count("eth_getTransactionReceipt") > 1);
    }

    #[tokio::test]
    async fn test_cancel_stops_waiting() {
        let mock = Arc::new(MockTransport::new());
        let token = CancellationToken::new();
        let opts = TxOptions::new().cancel_with(token.clone());

        let handle = {
            let submitter = submitter(mock);
            tokio::spawn(async move { submitter.confirm(&pending(TxKind::Call), &opts).await })
        };
        tokio::time::sleep(Duration::from_millis(30)).await;
        token.cancel();

        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, SdkError::ConfirmationCancelled { .. }));
        assert!(err.is_indeterminate());
    }

    #[tokio::test]
    async fn test_broadcast_rejection() {
        let mock = Arc::new(MockTransport::new());
        mock.set_error("eth_sendRawTransaction", -32000, "nonce too low");
        let client = NetworkClient::with_chain_id(mock.clone(), 1);
        let builder = crate::builder::TransactionBuilder::new(client, Default::default());
        let credential = Credential::from_private_key_hex(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        )
        .unwrap();
        let iface = crate::abi::ContractInterface::from_abi_json(
            "Geolocation",
            r#"[{"type":"function","name":"ping","inputs":[]}]"#,
        )
        .unwrap();
        let prepared = builder
            .build_call(
                &iface,
                dpp_primitives::Address::ZERO,
                "ping",
                vec![],
                credential.address(),
                &TxOptions::new(),
            )
            .await
            .unwrap();

        let err = submitter(mock)
            .broadcast(prepared, &credential)
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Broadcast(ref msg) if msg.contains("nonce too low")));
    }
}
