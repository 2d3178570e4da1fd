//! Recoverable secp256k1 signatures

use dpp_primitives::{Address, H256};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};

use crate::{keccak256, CryptoError};

/// Secret signing key
pub type PrivateKey = SigningKey;

/// Public verification key
pub type PublicKey = VerifyingKey;

/// Signature over a 32-byte digest, `v` stored as 27/28
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// r component
    pub r: [u8; 32],
    /// s component (always in the lower half of the curve order)
    pub s: [u8; 32],
    /// 27 + recovery id
    pub v: u8,
}

impl Signature {
    /// Recovery id (0 or 1)
    pub fn recovery_id(&self) -> u8 {
        self.v.saturating_sub(27)
    }
}

/// Sign a prehashed message.
///
/// The returned `s` is normalised to low-s and the recovery id adjusted to
/// match, as Ethereum nodes reject high-s signatures.
pub fn sign(digest: &H256, key: &PrivateKey) -> Result<Signature, CryptoError> {
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(digest.as_bytes())
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

    let (signature, recovery_id) = match signature.normalize_s() {
        Some(normalized) => (
            normalized,
            RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
        ),
        None => (signature, recovery_id),
    };

    Ok(Signature {
        r: signature.r().to_bytes().into(),
        s: signature.s().to_bytes().into(),
        v: recovery_id.to_byte() + 27,
    })
}

/// Recover the signer's address from a digest and signature
pub fn recover_address(digest: &H256, signature: &Signature) -> Result<Address, CryptoError> {
    let ecdsa = EcdsaSignature::from_scalars(signature.r, signature.s)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
    let recovery_id = RecoveryId::from_byte(signature.recovery_id())
        .ok_or_else(|| CryptoError::InvalidSignature(format!("recovery id {}", signature.v)))?;

    let key = VerifyingKey::recover_from_prehash(digest.as_bytes(), &ecdsa, recovery_id)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;
    Ok(public_key_to_address(&key))
}

/// Address of a public key: last 20 bytes of keccak(uncompressed point)
pub fn public_key_to_address(key: &PublicKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(bytes)
}
