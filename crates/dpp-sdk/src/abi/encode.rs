//! ABI encoding

use dpp_crypto::keccak256;
use dpp_primitives::U256;

use super::types::{I256, Token};

/// Encode tokens as a Solidity argument tuple
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    encode_sequence(tokens)
}

/// Encode a function call: 4-byte selector followed by the arguments
pub fn encode_function_call(selector: [u8; 4], tokens: &[Token]) -> Vec<u8> {
    let mut out = selector.to_vec();
    out.extend(encode_sequence(tokens));
    out
}

/// First four bytes of keccak256 of the canonical signature,
/// e.g. `getProduct(uint256)`
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash.as_bytes()[..4]);
    selector
}

fn encode_sequence(tokens: &[Token]) -> Vec<u8> {
    let head_size: usize = tokens.iter().map(head_size).sum();

    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();

    for token in tokens {
        if token.is_dynamic() {
            head.extend(encode_u256(&U256::from(head_size + tail.len())));
            tail.extend(encode_token(token));
        } else {
            head.extend(encode_token(token));
        }
    }

    head.extend(tail);
    head
}

fn head_size(token: &Token) -> usize {
    if token.is_dynamic() {
        return 32;
    }
    match token {
        Token::FixedArray(tokens) | Token::Tuple(tokens) => tokens.iter().map(head_size).sum(),
        _ => 32,
    }
}

fn encode_token(token: &Token) -> Vec<u8> {
    match token {
        Token::Address(addr) => {
            let mut buf = [0u8; 32];
            buf[12..].copy_from_slice(addr.as_bytes());
            buf.to_vec()
        }
        Token::Uint(value) => encode_u256(value),
        Token::Int(value) => encode_u256(&twos_complement(value)),
        Token::Bool(b) => {
            let mut buf = [0u8; 32];
            buf[31] = u8::from(*b);
            buf.to_vec()
        }
        Token::FixedBytes(data) => {
            let mut buf = [0u8; 32];
            let len = data.len().min(32);
            buf[..len].copy_from_slice(&data[..len]);
            buf.to_vec()
        }
        Token::Bytes(data) => encode_bytes(data),
        Token::String(s) => encode_bytes(s.as_bytes()),
        Token::Array(tokens) => {
            let mut out = encode_u256(&U256::from(tokens.len()));
            out.extend(encode_sequence(tokens));
            out
        }
        Token::FixedArray(tokens) | Token::Tuple(tokens) => encode_sequence(tokens),
    }
}

fn twos_complement(value: &I256) -> U256 {
    if value.negative && !value.abs.is_zero() {
        (!value.abs).overflowing_add(U256::one()).0
    } else {
        value.abs
    }
}

/// Length word followed by the data, right-padded to a 32-byte boundary
fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = encode_u256(&U256::from(data.len()));
    out.extend_from_slice(data);
    let rem = data.len() % 32;
    if rem != 0 {
        out.resize(out.len() + 32 - rem, 0);
    }
    out
}

pub(crate) fn encode_u256(value: &U256) -> Vec<u8> {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    buf.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpp_primitives::Address;

    fn word(hex_str: &str) -> Vec<u8> {
        let mut buf = [0u8; 32];
        let bytes = hex::decode(hex_str).unwrap();
        buf[32 - bytes.len()..].copy_from_slice(&bytes);
        buf.to_vec()
    }

    #[test]
    fn test_selectors() {
        assert_eq!(function_selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(function_selector("balanceOf(address)"), [0x70, 0xa0, 0x82, 0x31]);
    }

    #[test]
    fn test_encode_static() {
        let addr = Address::from_bytes([0x11; 20]);
        let encoded = encode(&[Token::Address(addr), Token::uint(42), Token::Bool(true)]);
        assert_eq!(encoded.len(), 96);
        assert_eq!(&encoded[12..32], &[0x11; 20]);
        assert_eq!(&encoded[32..64], word("2a").as_slice());
        assert_eq!(encoded[95], 1);
    }

    #[test]
    fn test_encode_string_layout() {
        let encoded = encode(&[Token::uint(7), Token::string("hello")]);
        // head: uint, offset; tail: length, padded data
        assert_eq!(encoded.len(), 128);
        assert_eq!(&encoded[32..64], word("40").as_slice());
        assert_eq!(&encoded[64..96], word("05").as_slice());
        assert_eq!(&encoded[96..101], b"hello");
        assert!(encoded[101..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_encode_empty_string_array() {
        let encoded = encode(&[Token::string_array::<&str>(&[])]);
        assert_eq!(encoded.len(), 64);
        assert_eq!(&encoded[0..32], word("20").as_slice());
        assert_eq!(&encoded[32..64], word("00").as_slice());
    }

    #[test]
    fn test_encode_string_array_offsets_are_relative() {
        let encoded = encode(&[Token::string_array(&["a", "b"])]);
        // outer offset, len=2, two element offsets relative to the element area
        assert_eq!(&encoded[32..64], word("02").as_slice());
        assert_eq!(&encoded[64..96], word("40").as_slice());
        assert_eq!(&encoded[96..128], word("80").as_slice());
        assert_eq!(encoded.len(), 32 * 8);
    }

    #[test]
    fn test_encode_negative_int() {
        let encoded = encode(&[Token::Int(I256::from_i128(-1))]);
        assert_eq!(encoded, vec![0xff; 32]);
        let encoded = encode(&[Token::Int(I256::from_i128(-2))]);
        assert_eq!(encoded[31], 0xfe);
    }

    #[test]
    fn test_encode_function_call_prefix() {
        let selector = function_selector("getProduct(uint256)");
        let data = encode_function_call(selector, &[Token::uint(1)]);
        assert_eq!(&data[..4], &selector);
        assert_eq!(data.len(), 36);
    }
}
