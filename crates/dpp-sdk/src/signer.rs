//! Transaction signing (EIP-155 legacy envelope)

use bytes::Bytes;
use dpp_crypto::keccak256;
use dpp_primitives::{TxHash, H256, U256};
use rlp::RlpStream;

use crate::builder::UnsignedTransaction;
use crate::credential::Credential;
use crate::SdkError;

/// Turns an unsigned transaction into raw bytes for `eth_sendRawTransaction`
pub trait TransactionSigner: Send + Sync {
    /// Sign with `credential`, returning the RLP-encoded signed transaction
    fn sign(&self, tx: &UnsignedTransaction, credential: &Credential) -> Result<Bytes, SdkError>;
}

/// Legacy transactions with EIP-155 replay protection
#[derive(Debug, Clone, Copy, Default)]
pub struct Eip155Signer;

impl Eip155Signer {
    /// keccak256(rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0]))
    pub fn signing_hash(tx: &UnsignedTransaction) -> H256 {
        let mut stream = RlpStream::new_list(9);
        append_body(&mut stream, tx);
        stream.append(&tx.chain_id);
        stream.append(&0u8);
        stream.append(&0u8);
        keccak256(stream.out())
    }
}

impl TransactionSigner for Eip155Signer {
    fn sign(&self, tx: &UnsignedTransaction, credential: &Credential) -> Result<Bytes, SdkError> {
        if tx.chain_id == 0 {
            return Err(SdkError::Signing("chain id 0 has no replay protection".to_string()));
        }
        if tx.sender != credential.address() {
            return Err(SdkError::Signing(format!(
                "transaction sender {} does not match credential {}",
                tx.sender,
                credential.address()
            )));
        }

        let signature = credential.sign_digest(&Self::signing_hash(tx))?;
        let v = u64::from(signature.recovery_id()) + tx.chain_id * 2 + 35;

        let mut stream = RlpStream::new_list(9);
        append_body(&mut stream, tx);
        stream.append(&v);
        stream.append(&U256::from_big_endian(&signature.r));
        stream.append(&U256::from_big_endian(&signature.s));
        Ok(stream.out().freeze())
    }
}

fn append_body(stream: &mut RlpStream, tx: &UnsignedTransaction) {
    stream.append(&tx.nonce);
    stream.append(&U256::from(tx.gas_price));
    stream.append(&tx.gas_limit);
    match &tx.to {
        Some(to) => stream.append(to),
        None => stream.append_empty_data(),
    };
    stream.append(&tx.value);
    stream.append(&tx.data.to_vec());
}

/// Hash of a raw signed transaction, as the node reports it
pub fn raw_transaction_hash(raw: &[u8]) -> TxHash {
    keccak256(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpp_crypto::{recover_address, Signature};
    use dpp_primitives::Address;
    use rlp::Rlp;

    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn credential() -> Credential {
        Credential::from_private_key_hex(DEV_KEY).unwrap()
    }

    fn tx(chain_id: u64, to: Option<Address>) -> UnsignedTransaction {
        UnsignedTransaction {
            chain_id,
            sender: credential().address(),
            nonce: 9,
            gas_limit: 21_000,
            gas_price: 20_000_000_000,
            to,
            value: U256::zero(),
            data: Bytes::from_static(&[0xde, 0xad]),
        }
    }

    #[test]
    fn test_eip155_reference_signing_hash() {
        // Example from the EIP-155 text
        let reference = UnsignedTransaction {
            chain_id: 1,
            sender: Address::ZERO,
            nonce: 9,
            gas_limit: 21_000,
            gas_price: 20_000_000_000,
            to: Some("0x3535353535353535353535353535353535353535".parse().unwrap()),
            value: U256::from(1_000_000_000_000_000_000u128),
            data: Bytes::new(),
        };
        assert_eq!(
            Eip155Signer::signing_hash(&reference).to_hex(),
            "0xdaf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );
    }

    #[test]
    fn test_signed_fields_and_recovery() {
        let credential = credential();
        let unsigned = tx(1337, Some(Address::from_bytes([0x35; 20])));
        let raw = Eip155Signer.sign(&unsigned, &credential).unwrap();

        let rlp = Rlp::new(&raw);
        assert_eq!(rlp.item_count().unwrap(), 9);
        assert_eq!(rlp.val_at::<u64>(0).unwrap(), 9);
        assert_eq!(rlp.val_at::<Vec<u8>>(5).unwrap(), vec![0xde, 0xad]);

        let v: u64 = rlp.val_at(6).unwrap();
        assert!(v == 1337 * 2 + 35 || v == 1337 * 2 + 36);

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        rlp.val_at::<U256>(7).unwrap().to_big_endian(&mut r);
        rlp.val_at::<U256>(8).unwrap().to_big_endian(&mut s);
        let signature = Signature {
            r,
            s,
            v: (v - 1337 * 2 - 35) as u8 + 27,
        };
        let recovered = recover_address(&Eip155Signer::signing_hash(&unsigned), &signature).unwrap();
        assert_eq!(recovered, credential.address());
    }

    #[test]
    fn test_deploy_has_empty_to() {
        let raw = Eip155Signer.sign(&tx(1, None), &credential()).unwrap();
        let rlp = Rlp::new(&raw);
        assert!(rlp.at(3).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_chain_zero() {
        let err = Eip155Signer.sign(&tx(0, None), &credential()).unwrap_err();
        assert!(matches!(err, SdkError::Signing(_)));
    }

    #[test]
    fn test_rejects_foreign_sender() {
        let mut unsigned = tx(1, None);
        unsigned.sender = Address::from_bytes([1; 20]);
        assert!(Eip155Signer.sign(&unsigned, &credential()).is_err());
    }

    #[test]
    fn test_raw_hash_is_keccak() {
        let raw = Eip155Signer.sign(&tx(1, None), &credential()).unwrap();
        assert_eq!(raw_transaction_hash(&raw), keccak256(&raw));
    }
}
