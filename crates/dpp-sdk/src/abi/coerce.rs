//! Fitting caller-supplied tokens to declared parameter types
//!
//! Identifiers in the passport contracts are `uint256` but applications
//! often carry them as strings ("1", "0x2a"). Coercion accepts those and
//! rejects anything that would silently change meaning.

use dpp_primitives::{Address, U256};

use super::types::{ParamType, Token};

/// Convert `token` so that it encodes as `param_type`
pub fn coerce(param_type: &ParamType, token: Token) -> Result<Token, String> {
    match (param_type, token) {
        (ParamType::Uint(bits), Token::Uint(v)) => check_uint(v, *bits),
        (ParamType::Uint(bits), Token::String(s)) => check_uint(parse_uint(&s)?, *bits),
        (ParamType::Int(_), token @ Token::Int(_)) => Ok(token),
        (ParamType::Int(_), Token::Uint(v)) => Ok(Token::Int(super::I256::new(v, false))),
        (ParamType::String, token @ Token::String(_)) => Ok(token),
        (ParamType::String, Token::Uint(v)) => Ok(Token::String(v.to_string())),
        (ParamType::Address, token @ Token::Address(_)) => Ok(token),
        (ParamType::Address, Token::String(s)) => Address::from_hex(s.trim())
            .map(Token::Address)
            .map_err(|e| e.to_string()),
        (ParamType::Bool, token @ Token::Bool(_)) => Ok(token),
        (ParamType::Bytes, token @ Token::Bytes(_)) => Ok(token),
        (ParamType::FixedBytes(size), Token::FixedBytes(b)) => {
            if b.len() > *size {
                return Err(format!("{} bytes do not fit bytes{size}", b.len()));
            }
            Ok(Token::FixedBytes(b))
        }
        (ParamType::Array(inner), Token::Array(items)) => items
            .into_iter()
            .map(|item| coerce(inner, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Token::Array),
        (ParamType::FixedArray(inner, size), Token::Array(items) | Token::FixedArray(items)) => {
            if items.len() != *size {
                return Err(format!("expected {size} elements, got {}", items.len()));
            }
            items
                .into_iter()
                .map(|item| coerce(inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Token::FixedArray)
        }
        (ParamType::Tuple(types), Token::Tuple(items)) => {
            if items.len() != types.len() {
                return Err(format!(
                    "expected tuple of {}, got {}",
                    types.len(),
                    items.len()
                ));
            }
            types
                .iter()
                .zip(items)
                .map(|(t, item)| coerce(t, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Token::Tuple)
        }
        (param_type, token) => Err(format!(
            "expected {param_type}, got {}",
            token.kind_name()
        )),
    }
}

fn check_uint(value: U256, bits: usize) -> Result<Token, String> {
    if bits < 256 && value.bits() > bits {
        return Err(format!("{value} does not fit uint{bits}"));
    }
    Ok(Token::Uint(value))
}

fn parse_uint(s: &str) -> Result<U256, String> {
    let s = s.trim();
    let invalid = || format!("expected numeric value, got {s:?}");
    match s.strip_prefix("0x") {
        Some(digits) if !digits.is_empty() => {
            U256::from_str_radix(digits, 16).map_err(|_| invalid())
        }
        Some(_) => Err(invalid()),
        None if s.is_empty() => Err(invalid()),
        None => U256::from_dec_str(s).map_err(|_| invalid()),
    }
}
