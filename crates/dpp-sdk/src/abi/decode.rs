//! ABI decoding
//!
//! Offsets of dynamic values are relative to the start of the enclosing
//! tuple or array body, so decoding recurses with an explicit base.

use std::iter;

use dpp_primitives::{Address, U256};

use super::types::{I256, ParamType, Token};
use crate::SdkError;

/// Decode ABI-encoded data as a tuple of the given types
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, SdkError> {
    decode_sequence(types.iter(), data, 0)
}

fn decode_sequence<'a>(
    types: impl IntoIterator<Item = &'a ParamType>,
    data: &[u8],
    base: usize,
) -> Result<Vec<Token>, SdkError> {
    let mut pos = base;
    let mut tokens = Vec::new();

    for param_type in types {
        let token = if param_type.is_dynamic() {
            let offset = read_usize(data, pos)?;
            let start = base
                .checked_add(offset)
                .ok_or_else(|| err("offset overflow"))?;
            decode_tail(param_type, data, start)?
        } else {
            decode_static(param_type, data, pos)?
        };
        tokens.push(token);
        pos += param_type.head_size();
    }

    Ok(tokens)
}

fn decode_static(param_type: &ParamType, data: &[u8], pos: usize) -> Result<Token, SdkError> {
    match param_type {
        ParamType::Address => {
            let w = word(data, pos)?;
            let addr = Address::from_slice(&w[12..]).map_err(|e| err(e.to_string()))?;
            Ok(Token::Address(addr))
        }
        ParamType::Uint(_) => Ok(Token::Uint(U256::from_big_endian(word(data, pos)?))),
        ParamType::Int(_) => {
            let w = word(data, pos)?;
            let raw = U256::from_big_endian(w);
            let negative = w[0] & 0x80 != 0;
            let abs = if negative {
                (!raw).overflowing_add(U256::one()).0
            } else {
                raw
            };
            Ok(Token::Int(I256::new(abs, negative)))
        }
        ParamType::Bool => Ok(Token::Bool(word(data, pos)?[31] != 0)),
        ParamType::FixedBytes(size) => {
            let w = word(data, pos)?;
            let size = (*size).min(32);
            Ok(Token::FixedBytes(w[..size].to_vec()))
        }
        ParamType::FixedArray(inner, size) => Ok(Token::FixedArray(decode_sequence(
            iter::repeat(inner.as_ref()).take(*size),
            data,
            pos,
        )?)),
        ParamType::Tuple(types) => Ok(Token::Tuple(decode_sequence(types.iter(), data, pos)?)),
        ParamType::Bytes | ParamType::String | ParamType::Array(_) => {
            decode_tail(param_type, data, pos)
        }
    }
}

fn decode_tail(param_type: &ParamType, data: &[u8], start: usize) -> Result<Token, SdkError> {
    match param_type {
        ParamType::Bytes => Ok(Token::Bytes(read_bytes(data, start)?.to_vec())),
        ParamType::String => {
            let bytes = read_bytes(data, start)?;
            let s = String::from_utf8(bytes.to_vec()).map_err(|e| err(e.to_string()))?;
            Ok(Token::String(s))
        }
        ParamType::Array(inner) => {
            let len = read_usize(data, start)?;
            if len > data.len() / 32 {
                return Err(err(format!("array length {len} exceeds data")));
            }
            Ok(Token::Array(decode_sequence(
                iter::repeat(inner.as_ref()).take(len),
                data,
                start + 32,
            )?))
        }
        ParamType::FixedArray(inner, size) => Ok(Token::FixedArray(decode_sequence(
            iter::repeat(inner.as_ref()).take(*size),
            data,
            start,
        )?)),
        ParamType::Tuple(types) => Ok(Token::Tuple(decode_sequence(types.iter(), data, start)?)),
        _ => decode_static(param_type, data, start),
    }
}

fn read_bytes(data: &[u8], start: usize) -> Result<&[u8], SdkError> {
    let len = read_usize(data, start)?;
    let begin = start + 32;
    let end = begin
        .checked_add(len)
        .ok_or_else(|| err("length overflow"))?;
    data.get(begin..end)
        .ok_or_else(|| err(format!("need {end} bytes, have {}", data.len())))
}

fn word(data: &[u8], pos: usize) -> Result<&[u8], SdkError> {
    data.get(pos..pos + 32)
        .ok_or_else(|| err(format!("need {} bytes, have {}", pos + 32, data.len())))
}

/// Read a word used as an offset or length; it must point inside `data`
fn read_usize(data: &[u8], pos: usize) -> Result<usize, SdkError> {
    let value = U256::from_big_endian(word(data, pos)?);
    if value.bits() > 32 || value.as_usize() > data.len() {
        return Err(err(format!("offset or length {value} out of range")));
    }
    Ok(value.as_usize())
}

fn err(reason: impl Into<String>) -> SdkError {
    SdkError::decoding("abi data", reason)
}
