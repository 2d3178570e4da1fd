//! ABI type definitions

use std::fmt;

use dpp_primitives::{Address, U256};

/// Solidity ABI value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Address (20 bytes)
    Address(Address),
    /// Unsigned integer (8-256 bits)
    Uint(U256),
    /// Signed integer (8-256 bits)
    Int(I256),
    /// Boolean
    Bool(bool),
    /// Dynamic bytes
    Bytes(Vec<u8>),
    /// Fixed-size bytes (1-32)
    FixedBytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// Dynamic array
    Array(Vec<Token>),
    /// Fixed-size array
    FixedArray(Vec<Token>),
    /// Tuple (struct)
    Tuple(Vec<Token>),
}

/// Signed 256-bit integer as sign and magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct I256 {
    /// Absolute value
    pub abs: U256,
    /// True if negative
    pub negative: bool,
}

impl I256 {
    /// Create from parts
    pub fn new(abs: U256, negative: bool) -> Self {
        Self { abs, negative }
    }

    /// Create from i128
    pub fn from_i128(value: i128) -> Self {
        Self {
            abs: U256::from(value.unsigned_abs()),
            negative: value < 0,
        }
    }
}

/// Solidity parameter types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// Address
    Address,
    /// Unsigned integer with bit size (8, 16, ..., 256)
    Uint(usize),
    /// Signed integer with bit size
    Int(usize),
    /// Boolean
    Bool,
    /// Dynamic bytes
    Bytes,
    /// Fixed-size bytes (size 1-32)
    FixedBytes(usize),
    /// UTF-8 string
    String,
    /// Dynamic array
    Array(Box<ParamType>),
    /// Fixed-size array
    FixedArray(Box<ParamType>, usize),
    /// Tuple
    Tuple(Vec<ParamType>),
}

impl ParamType {
    /// Variable-length types are encoded in the tail behind an offset
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::FixedArray(inner, _) => inner.is_dynamic(),
            ParamType::Tuple(types) => types.iter().any(ParamType::is_dynamic),
            _ => false,
        }
    }

    /// Bytes this type occupies in the head of an encoding
    pub fn head_size(&self) -> usize {
        if self.is_dynamic() {
            return 32;
        }
        match self {
            ParamType::FixedArray(inner, size) => inner.head_size() * size,
            ParamType::Tuple(types) => types.iter().map(ParamType::head_size).sum(),
            _ => 32,
        }
    }

    /// Canonical type string used in function signatures
    pub fn canonical(&self) -> String {
        match self {
            ParamType::Address => "address".to_string(),
            ParamType::Uint(bits) => format!("uint{bits}"),
            ParamType::Int(bits) => format!("int{bits}"),
            ParamType::Bool => "bool".to_string(),
            ParamType::Bytes => "bytes".to_string(),
            ParamType::FixedBytes(size) => format!("bytes{size}"),
            ParamType::String => "string".to_string(),
            ParamType::Array(inner) => format!("{}[]", inner.canonical()),
            ParamType::FixedArray(inner, size) => format!("{}[{size}]", inner.canonical()),
            ParamType::Tuple(types) => {
                let inner: Vec<String> = types.iter().map(ParamType::canonical).collect();
                format!("({})", inner.join(","))
            }
        }
    }
}

/// Parse a type string such as `uint256`, `string[]` or `bytes32[2]`.
///
/// Tuple types cannot be expressed as a bare string; JSON interfaces
/// describe them through `components`, see [`super::interface`].
pub fn parse_type(s: &str) -> Result<ParamType, String> {
    let s = s.trim();

    if let Some(inner) = s.strip_suffix("[]") {
        return Ok(ParamType::Array(Box::new(parse_type(inner)?)));
    }
    if let Some(body) = s.strip_suffix(']') {
        let open = body.rfind('[').ok_or_else(|| format!("unbalanced brackets in {s}"))?;
        let size: usize = body[open + 1..]
            .parse()
            .map_err(|_| format!("invalid array size in {s}"))?;
        return Ok(ParamType::FixedArray(Box::new(parse_type(&body[..open])?), size));
    }

    match s {
        "address" => return Ok(ParamType::Address),
        "bool" => return Ok(ParamType::Bool),
        "string" => return Ok(ParamType::String),
        "bytes" => return Ok(ParamType::Bytes),
        "uint" => return Ok(ParamType::Uint(256)),
        "int" => return Ok(ParamType::Int(256)),
        _ => {}
    }

    if let Some(bits) = s.strip_prefix("uint") {
        return parse_bits(bits, s).map(ParamType::Uint);
    }
    if let Some(bits) = s.strip_prefix("int") {
        return parse_bits(bits, s).map(ParamType::Int);
    }
    if let Some(size) = s.strip_prefix("bytes") {
        let size: usize = size.parse().map_err(|_| format!("unknown type: {s}"))?;
        if size == 0 || size > 32 {
            return Err(format!("invalid fixed bytes size: {s}"));
        }
        return Ok(ParamType::FixedBytes(size));
    }

    Err(format!("unknown type: {s}"))
}

fn parse_bits(bits: &str, full: &str) -> Result<usize, String> {
    let bits: usize = bits.parse().map_err(|_| format!("unknown type: {full}"))?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(format!("invalid integer size: {full}"));
    }
    Ok(bits)
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl Token {
    /// Create a uint256 from u64
    pub fn uint(value: u64) -> Self {
        Token::Uint(U256::from(value))
    }

    /// Create a string token
    pub fn string(s: impl Into<String>) -> Self {
        Token::String(s.into())
    }

    /// Create a `string[]` token
    pub fn string_array<S: AsRef<str>>(items: &[S]) -> Self {
        Token::Array(items.iter().map(|s| Token::String(s.as_ref().to_string())).collect())
    }

    /// True when the encoding goes to the tail
    pub fn is_dynamic(&self) -> bool {
        match self {
            Token::Bytes(_) | Token::String(_) | Token::Array(_) => true,
            Token::FixedArray(tokens) | Token::Tuple(tokens) => tokens.iter().any(Token::is_dynamic),
            _ => false,
        }
    }

    /// Short name of the variant, for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Token::Address(_) => "address",
            Token::Uint(_) => "uint",
            Token::Int(_) => "int",
            Token::Bool(_) => "bool",
            Token::Bytes(_) => "bytes",
            Token::FixedBytes(_) => "fixed bytes",
            Token::String(_) => "string",
            Token::Array(_) => "array",
            Token::FixedArray(_) => "fixed array",
            Token::Tuple(_) => "tuple",
        }
    }

    /// Take the string out, if this is a string
    pub fn into_string(self) -> Option<String> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }

    /// Take the integer out, if this is a uint
    pub fn into_uint(self) -> Option<U256> {
        match self {
            Token::Uint(v) => Some(v),
            _ => None,
        }
    }

    /// Take the elements out of an array or fixed array
    pub fn into_array(self) -> Option<Vec<Token>> {
        match self {
            Token::Array(tokens) | Token::FixedArray(tokens) => Some(tokens),
            _ => None,
        }
    }

    /// Take the members out of a tuple
    pub fn into_tuple(self) -> Option<Vec<Token>> {
        match self {
            Token::Tuple(tokens) => Some(tokens),
            _ => None,
        }
    }
}
