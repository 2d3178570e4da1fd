use dpp_primitives::Address;

use super::{id_token, with_id, ContractFacade};
use crate::abi::Token;
use crate::records::GeolocationRecord;
use crate::types::{TransactionOutcome, TxOptions};
use crate::SdkError;

/// Geolocation trail per batch
#[derive(Debug, Clone)]
pub struct GeolocationFacade {
    contract: ContractFacade,
}

impl GeolocationFacade {
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

    /// Deploy a geolocation registry
    pub async fn deploy(&self) -> Result<Address, SdkError> {
        self.contract.deploy(Vec::new()).await
    }

    /// Append a location to `batch_id`.
    ///
    /// The argument list follows the resolved interface: when
    /// `addGeolocation` declares fewer inputs than the record has fields,
    /// trailing optional fields are left out.
    pub async fn add_geolocation(
        &self,
        address: Address,
        batch_id: u64,
        record: &GeolocationRecord,
    ) -> Result<TransactionOutcome, SdkError> {
        record.validate()?;
        let wanted = self.contract.arity("addGeolocation")?.saturating_sub(1);
        let mut fields = record.to_tokens();
        if wanted < fields.len() && !dropped_fields_required(wanted) {
            fields.truncate(wanted);
        }
        self.contract
            .transact(address, "addGeolocation", with_id(batch_id, fields))
            .await
    }

    /// Every location recorded for `batch_id`, oldest first
    pub async fn get_geolocation(
        &self,
        address: Address,
        batch_id: u64,
    ) -> Result<Vec<GeolocationRecord>, SdkError> {
        let tokens = self
            .contract
            .call_raw(address, "getGeolocation", vec![id_token(batch_id)])
            .await?;
        decode_locations(tokens)
    }
}

fn dropped_fields_required(keep: usize) -> bool {
    GeolocationRecord::FIELDS[keep..].iter().any(|f| f.required)
}

/// Accepts `tuple[]`, a single tuple, or the fields returned flat
fn decode_locations(mut tokens: Vec<Token>) -> Result<Vec<GeolocationRecord>, SdkError> {
    if tokens.len() == 1 {
        match tokens.pop() {
            Some(Token::Array(items)) | Some(Token::FixedArray(items)) => {
                return items
                    .into_iter()
                    .map(|item| match item {
                        Token::Tuple(fields) => GeolocationRecord::from_token_prefix(fields),
                        other => Err(SdkError::decoding(
                            GeolocationRecord::ENTITY,
                            format!("expected tuple entries, got {}", other.kind_name()),
                        )),
                    })
                    .collect();
            }
            Some(Token::Tuple(fields)) => {
                return Ok(vec![GeolocationRecord::from_token_prefix(fields)?]);
            }
            Some(other) => tokens.push(other),
            None => {}
        }
    }
    Ok(vec![GeolocationRecord::from_token_prefix(tokens)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(lat: &str, lon: &str, info: &str) -> Vec<Token> {
        vec![Token::string(lat), Token::string(lon), Token::string(info)]
    }

    #[test]
    fn test_decode_tuple_array() {
        let tokens = vec![Token::Array(vec![
            Token::Tuple(location("48.8566", "2.3522", "warehouse")),
            Token::Tuple(location("52.5200", "13.4050", "")),
        ])];
        let records = decode_locations(tokens).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].additional_info, "warehouse");
        assert_eq!(records[1].latitude, "52.5200");
    }

    #[test]
    fn test_decode_empty_trail() {
        assert!(decode_locations(vec![Token::Array(vec![])]).unwrap().is_empty());
    }

    #[test]
    fn test_decode_flat_fields() {
        let records = decode_locations(vec![Token::string("1.0"), Token::string("2.0")]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].longitude, "2.0");
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        assert!(decode_locations(vec![Token::string("1.0")]).is_err());
        assert!(decode_locations(vec![Token::Array(vec![Token::uint(1)])]).is_err());
    }

    #[test]
    fn test_only_optional_fields_are_dropped() {
        assert!(!dropped_fields_required(2));
        assert!(dropped_fields_required(1));
    }
}
