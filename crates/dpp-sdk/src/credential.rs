//! Signing credential

use dpp_crypto::{public_key_to_address, sign, PrivateKey, Signature};
use dpp_primitives::{Address, H256};
use k256::ecdsa::SigningKey;
use zeroize::Zeroize;

use crate::SdkError;

/// Private key and the address derived from it.
///
/// The key never leaves this type: `Debug` shows the address only and
/// `Clone` is not implemented. Share it behind an `Arc`.
pub struct Credential {
    key: PrivateKey,
    address: Address,
}

impl Credential {
    /// Create from a 32-byte private key
    pub fn from_private_key(key: &[u8; 32]) -> Result<Self, SdkError> {
        let key =
            SigningKey::from_slice(key).map_err(|e| SdkError::InvalidPrivateKey(e.to_string()))?;
        let address = public_key_to_address(key.verifying_key());
        Ok(Self { key, address })
    }

    /// Create from a hex-encoded private key, with or without `0x`
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, SdkError> {
        let digits = hex_key.trim();
        let digits = digits.strip_prefix("0x").unwrap_or(digits);
        let mut bytes = hex::decode(digits)
            .map_err(|_| SdkError::InvalidPrivateKey("not a hex string".to_string()))?;
        if bytes.len() != 32 {
            let len = bytes.len();
            bytes.zeroize();
            return Err(SdkError::InvalidPrivateKey(format!(
                "expected 32 bytes, got {len}"
            )));
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        bytes.zeroize();

        let result = Self::from_private_key(&key);
        key.zeroize();
        result
    }

    /// Read a hex private key from an environment variable.
    ///
    /// An unset or empty variable is [`SdkError::CredentialMissing`].
    pub fn from_env(var: &str) -> Result<Self, SdkError> {
        let mut value = std::env::var(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| SdkError::CredentialMissing(format!("environment variable {var} is not set")))?;
        let result = Self::from_private_key_hex(&value);
        value.zeroize();
        result
    }

    /// Sender address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte digest
    pub(crate) fn sign_digest(&self, digest: &H256) -> Result<Signature, SdkError> {
        Ok(sign(digest, &self.key)?)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpp_crypto::{keccak256, recover_address};

    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_from_hex() {
        let credential = Credential::from_private_key_hex(DEV_KEY).unwrap();
        assert_eq!(
            credential.address().to_hex(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_from_hex_no_prefix() {
        let credential = Credential::from_private_key_hex(&DEV_KEY[2..]).unwrap();
        assert_eq!(
            credential.address().to_hex(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_invalid_keys() {
        assert!(matches!(
            Credential::from_private_key_hex("0x1234"),
            Err(SdkError::InvalidPrivateKey(_))
        ));
        assert!(matches!(
            Credential::from_private_key_hex("not hex"),
            Err(SdkError::InvalidPrivateKey(_))
        ));
        // zero is not a valid secp256k1 scalar
        assert!(Credential::from_private_key(&[0u8; 32]).is_err());
    }

    #[test]
    fn test_from_env_unset() {
        let result = Credential::from_env("DPP_TEST_UNSET_KEY_VARIABLE");
        assert!(matches!(result, Err(SdkError::CredentialMissing(_))));
    }

    #[test]
    fn test_debug_hides_key() {
        let credential = Credential::from_private_key_hex(DEV_KEY).unwrap();
        let debug = format!("{credential:?}");
        assert!(debug.contains("address"));
        assert!(!debug.to_lowercase().contains(&DEV_KEY[2..]));
    }

    #[test]
    fn test_sign_digest_recovers() {
        let credential = Credential::from_private_key_hex(DEV_KEY).unwrap();
        let digest = keccak256(b"passport");
        let signature = credential.sign_digest(&digest).unwrap();
        assert_eq!(recover_address(&digest, &signature).unwrap(), credential.address());
    }
}
