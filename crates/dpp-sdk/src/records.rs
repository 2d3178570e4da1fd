//! Entity records and their on-chain field order
//!
//! Each record is declared once through [`entity_record!`]. The same
//! declaration produces the struct, the field table, the encoder and the
//! decoder, so set and get paths cannot disagree on order.

use dpp_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::abi::Token;
use crate::SdkError;

/// One entry of a record's field table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Name as declared by the contract
    pub name: &'static str,
    /// Must be non-blank before a write is built
    pub required: bool,
}

/// A record field that maps to exactly one ABI token
pub trait FieldValue: Sized + Default {
    /// Encode for a contract call
    fn to_token(&self) -> Token;

    /// Decode from a returned token; `None` on a type mismatch
    fn from_token(token: Token) -> Option<Self>;

    /// True when a required field should count as missing
    fn is_blank(&self) -> bool;
}

impl FieldValue for String {
    fn to_token(&self) -> Token {
        Token::String(self.clone())
    }

    fn from_token(token: Token) -> Option<Self> {
        token.into_string()
    }

    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl FieldValue for Vec<String> {
    fn to_token(&self) -> Token {
        Token::string_array(self.as_slice())
    }

    fn from_token(token: Token) -> Option<Self> {
        token
            .into_array()?
            .into_iter()
            .map(Token::into_string)
            .collect()
    }

    // an empty list is a value
    fn is_blank(&self) -> bool {
        false
    }
}

impl FieldValue for u64 {
    fn to_token(&self) -> Token {
        Token::Uint(U256::from(*self))
    }

    fn from_token(token: Token) -> Option<Self> {
        let value = token.into_uint()?;
        (value.bits() <= 64).then(|| value.low_u64())
    }

    fn is_blank(&self) -> bool {
        false
    }
}

/// Declare a record struct together with its field table.
///
/// Fields are listed in contract order as
/// `rust_name: Type => "contractName", required|optional;`.
macro_rules! entity_record {
    (@required required) => { true };
    (@required optional) => { false };
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident : $ty:ty => $wire:literal, $req:ident;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $ty,
            )*
        }

        impl $name {
            /// Entity name used in errors
            pub const ENTITY: &'static str = stringify!($name);

            /// Fields in contract order
            pub const FIELDS: &'static [Field] = &[
                $( Field { name: $wire, required: entity_record!(@required $req) }, )*
            ];

            /// Encode every field, in contract order
            pub fn to_tokens(&self) -> Vec<Token> {
                vec![ $( FieldValue::to_token(&self.$field), )* ]
            }

            /// Required fields that are blank, in contract order
            pub fn missing_fields(&self) -> Vec<&'static str> {
                let mut missing = Vec::new();
                $(
                    if entity_record!(@required $req) && FieldValue::is_blank(&self.$field) {
                        missing.push($wire);
                    }
                )*
                missing
            }

            /// Fail with [`SdkError::Validation`] listing blank required fields
            pub fn validate(&self) -> Result<(), SdkError> {
                let missing = self.missing_fields();
                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(SdkError::Validation { entity: Self::ENTITY, missing })
                }
            }

            /// Decode a returned tuple that must carry every field
            pub fn from_tokens(tokens: Vec<Token>) -> Result<Self, SdkError> {
                if tokens.len() != Self::FIELDS.len() {
                    return Err(SdkError::decoding(
                        Self::ENTITY,
                        format!("expected {} fields, got {}", Self::FIELDS.len(), tokens.len()),
                    ));
                }
                Self::from_token_prefix(tokens)
            }

            /// Decode a tuple that may stop after the last required field;
            /// absent optional fields take their default
            pub fn from_token_prefix(tokens: Vec<Token>) -> Result<Self, SdkError> {
                let min = Self::FIELDS
                    .iter()
                    .rposition(|f| f.required)
                    .map_or(0, |i| i + 1);
                if tokens.len() < min || tokens.len() > Self::FIELDS.len() {
                    return Err(SdkError::decoding(
                        Self::ENTITY,
                        format!(
                            "expected {} to {} fields, got {}",
                            min,
                            Self::FIELDS.len(),
                            tokens.len()
                        ),
                    ));
                }

                let mut tokens = tokens.into_iter();
                Ok(Self {
                    $(
                        $field: match tokens.next() {
                            Some(token) => {
                                let kind = token.kind_name();
                                <$ty as FieldValue>::from_token(token).ok_or_else(|| {
                                    SdkError::decoding(
                                        Self::ENTITY,
                                        format!("field {} has unexpected type {}", $wire, kind),
                                    )
                                })?
                            }
                            None => <$ty>::default(),
                        },
                    )*
                })
            }
        }
    };
}

entity_record! {
    /// Core product identity stored by `setProduct`
    pub struct ProductRecord {
        /// Unique product identifier
        uid: String => "uid", required;
        /// Global Trade Item Number
        gtin: String => "gtin", required;
        /// EU customs tariff code
        taric_code: String => "taricCode", required;
        /// Manufacturer name and contact
        manufacturer_info: String => "manufacturerInfo", required;
        /// Information for consumers (allergens, care)
        consumer_info: String => "consumerInfo", required;
        /// Disposal and recycling instructions
        end_of_life_info: String => "endOfLifeInfo", required;
    }
}

entity_record! {
    /// Extended product data stored by `setProductData`
    pub struct ProductData {
        /// Product description
        description: String => "description", required;
        /// Manual URLs or references; may be empty
        manuals: Vec<String> => "manuals", optional;
        /// Technical specifications; may be empty
        specifications: Vec<String> => "specifications", optional;
        /// Batch number, e.g. `BRG-2023-001`
        batch_number: String => "batchNumber", required;
        /// Production date
        production_date: String => "productionDate", required;
        /// Expiry date
        expiry_date: String => "expiryDate", required;
        /// Certifications held
        certifications: String => "certifications", optional;
        /// Warranty terms
        warranty_info: String => "warrantyInfo", optional;
        /// Materials the product is made of
        material_composition: String => "materialComposition", optional;
        /// Regulatory compliance notes
        compliance_info: String => "complianceInfo", optional;
    }
}

entity_record! {
    /// Production batch stored by `createBatch`
    pub struct BatchRecord {
        /// Batch number, e.g. `BRG-2023-001`
        batch_number: String => "batchNumber", required;
        /// Production date
        production_date: String => "productionDate", required;
        /// Expiry date
        expiry_date: String => "expiryDate", required;
        /// Units in the batch
        quantity: u64 => "quantity", required;
    }
}

entity_record! {
    /// A location entry attached to a batch
    pub struct GeolocationRecord {
        /// Latitude in decimal degrees
        latitude: String => "latitude", required;
        /// Longitude in decimal degrees
        longitude: String => "longitude", required;
        /// Free-form note for this stop
        additional_info: String => "additionalInfo", optional;
    }
}
