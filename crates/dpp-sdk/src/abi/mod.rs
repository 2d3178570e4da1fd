//! Solidity ABI encoding and decoding
//!
//! This module provides:
//! - Function selectors and call-data encoding
//! - Offset-correct decoding of nested dynamic return values
//! - Coercion of loosely typed arguments to declared parameter types
//! - Contract interfaces parsed from JSON ABI files and compiler artifacts
//!
//! # Example
//!
//! ```rust
//! use dpp_sdk::abi::{decode, encode, function_selector, ParamType, Token};
//!
//! let selector = function_selector("getProduct(uint256)");
//! assert_eq!(selector.len(), 4);
//!
//! let data = encode(&[Token::uint(1), Token::string("GTIN-0001")]);
//! let tokens = decode(&[ParamType::Uint(256), ParamType::String], &data).unwrap();
//! assert_eq!(tokens[1], Token::string("GTIN-0001"));
//! ```

mod coerce;
mod decode;
mod encode;
mod interface;
mod types;

pub use coerce::coerce;
pub use decode::decode;
pub use encode::{encode, encode_function_call, function_selector};
pub use interface::{ContractInterface, MethodDescriptor, Mutability, Param};
pub use types::{parse_type, ParamType, Token, I256};
