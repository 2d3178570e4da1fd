//! Contract interfaces loaded from JSON ABI definitions

use bytes::Bytes;
use serde::Deserialize;

use super::decode::decode;
use super::encode::{encode, encode_function_call, function_selector};
use super::types::{parse_type, ParamType, Token};
use crate::SdkError;

/// A named, typed parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Declared name, may be empty
    pub name: String,
    /// Solidity type
    pub kind: ParamType,
    /// Member names when `kind` is a tuple (or array of tuples)
    pub components: Vec<Param>,
}

/// State mutability as declared in the ABI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mutability {
    /// Reads no state
    Pure,
    /// Reads state
    View,
    /// Writes state
    #[default]
    Nonpayable,
    /// Writes state and accepts value
    Payable,
}

impl Mutability {
    /// True for methods that can be answered by `eth_call` alone
    pub fn is_read_only(self) -> bool {
        matches!(self, Mutability::Pure | Mutability::View)
    }
}

/// Callable method: a function or the constructor
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    /// Method name (`constructor` for the constructor)
    pub name: String,
    /// Canonical signature, e.g. `getProduct(uint256)`
    pub signature: String,
    /// First four bytes of keccak256(signature)
    pub selector: [u8; 4],
    /// Inputs in declaration order
    pub inputs: Vec<Param>,
    /// Outputs in declaration order
    pub outputs: Vec<Param>,
    /// Declared mutability
    pub mutability: Mutability,
}

impl MethodDescriptor {
    /// Build a descriptor, deriving signature and selector
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<Param>,
        outputs: Vec<Param>,
        mutability: Mutability,
    ) -> Self {
        let name = name.into();
        let types: Vec<String> = inputs.iter().map(|p| p.kind.canonical()).collect();
        let signature = format!("{}({})", name, types.join(","));
        let selector = function_selector(&signature);
        Self {
            name,
            signature,
            selector,
            inputs,
            outputs,
            mutability,
        }
    }

    /// Input types in order
    pub fn input_types(&self) -> Vec<ParamType> {
        self.inputs.iter().map(|p| p.kind.clone()).collect()
    }

    /// Output types in order
    pub fn output_types(&self) -> Vec<ParamType> {
        self.outputs.iter().map(|p| p.kind.clone()).collect()
    }

    /// Encode call data (selector + arguments). Arguments must already be
    /// coerced to the input types.
    pub fn encode_call(&self, args: &[Token]) -> Bytes {
        Bytes::from(encode_function_call(self.selector, args))
    }

    /// Decode return data using the declared outputs
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<Token>, SdkError> {
        decode(&self.output_types(), data).map_err(|e| match e {
            SdkError::Decoding { reason, .. } => SdkError::decoding(&self.name, reason),
            other => other,
        })
    }
}

/// Interface of one logical contract. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct ContractInterface {
    name: String,
    constructor: Option<MethodDescriptor>,
    methods: Vec<MethodDescriptor>,
    bytecode: Option<Bytes>,
}

impl ContractInterface {
    /// Assemble an interface from parts
    pub fn new(
        name: impl Into<String>,
        constructor: Option<MethodDescriptor>,
        methods: Vec<MethodDescriptor>,
        bytecode: Option<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            constructor,
            methods,
            bytecode: bytecode.filter(|b| !b.is_empty()),
        }
    }

    /// Parse a JSON ABI array
    pub fn from_abi_json(name: &str, json: &str) -> Result<Self, SdkError> {
        let entries: Vec<AbiEntry> = serde_json::from_str(json)?;
        Self::from_entries(name, entries, None)
    }

    /// Parse a compiler artifact: an object with `abi` and optional
    /// `bytecode`, or a bare ABI array
    pub fn from_artifact(name: &str, json: &str) -> Result<Self, SdkError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.is_array() {
            let entries: Vec<AbiEntry> = serde_json::from_value(value)?;
            return Self::from_entries(name, entries, None);
        }

        let artifact: Artifact = serde_json::from_value(value)?;
        let bytecode = match artifact.bytecode.as_ref().and_then(Bytecode::as_hex) {
            Some(hex_str) => {
                let digits = hex_str.strip_prefix("0x").unwrap_or(hex_str);
                Some(Bytes::from(hex::decode(digits)?))
            }
            None => None,
        };
        Self::from_entries(name, artifact.abi, bytecode)
    }

    fn from_entries(
        name: &str,
        entries: Vec<AbiEntry>,
        bytecode: Option<Bytes>,
    ) -> Result<Self, SdkError> {
        let mut constructor = None;
        let mut methods = Vec::new();

        for entry in entries {
            match entry.kind.as_str() {
                "function" => {
                    let method_name = entry.name.clone().ok_or_else(|| SdkError::Config(format!(
                        "{name}: function entry without a name"
                    )))?;
                    methods.push(entry.into_descriptor(method_name)?);
                }
                "constructor" => constructor = Some(entry.into_descriptor("constructor".into())?),
                // events, errors, fallback and receive are not callable here
                _ => {}
            }
        }

        Ok(Self::new(name, constructor, methods, bytecode))
    }

    /// Logical contract name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Constructor, if declared
    pub fn constructor(&self) -> Option<&MethodDescriptor> {
        self.constructor.as_ref()
    }

    /// Constructor input count (0 when no constructor is declared)
    pub fn constructor_arity(&self) -> usize {
        self.constructor.as_ref().map_or(0, |c| c.inputs.len())
    }

    /// All callable functions
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Find a function by name. Overloads resolve to the first declared.
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Creation bytecode, present only for deployable interfaces
    pub fn bytecode(&self) -> Option<&Bytes> {
        self.bytecode.as_ref()
    }

    /// Deployment payload: bytecode followed by encoded constructor args
    pub fn deploy_data(&self, args: &[Token]) -> Result<Bytes, SdkError> {
        let code = self
            .bytecode
            .as_ref()
            .ok_or_else(|| SdkError::NotDeployable(self.name.clone()))?;
        let mut data = code.to_vec();
        data.extend(encode(args));
        Ok(Bytes::from(data))
    }
}

#[derive(Deserialize)]
struct Artifact {
    abi: Vec<AbiEntry>,
    #[serde(default)]
    bytecode: Option<Bytecode>,
}

/// Hardhat writes a string, Foundry an object with `object`
#[derive(Deserialize)]
#[serde(untagged)]
enum Bytecode {
    Hex(String),
    Object { object: String },
}

impl Bytecode {
    fn as_hex(&self) -> Option<&str> {
        let s = match self {
            Bytecode::Hex(s) => s.as_str(),
            Bytecode::Object { object } => object.as_str(),
        };
        (!s.is_empty() && s != "0x").then_some(s)
    }
}

#[derive(Deserialize)]
struct AbiEntry {
    #[serde(rename = "type", default = "default_entry_kind")]
    kind: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<AbiParam>,
    #[serde(default)]
    outputs: Vec<AbiParam>,
    #[serde(default, rename = "stateMutability")]
    state_mutability: Mutability,
}

fn default_entry_kind() -> String {
    "function".to_string()
}

impl AbiEntry {
    fn into_descriptor(self, name: String) -> Result<MethodDescriptor, SdkError> {
        let inputs = convert_params(&name, self.inputs)?;
        let outputs = convert_params(&name, self.outputs)?;
        Ok(MethodDescriptor::new(name, inputs, outputs, self.state_mutability))
    }
}

#[derive(Deserialize)]
struct AbiParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    components: Vec<AbiParam>,
}

fn convert_params(method: &str, params: Vec<AbiParam>) -> Result<Vec<Param>, SdkError> {
    params
        .into_iter()
        .map(|p| convert_param(method, p))
        .collect()
}

fn convert_param(method: &str, param: AbiParam) -> Result<Param, SdkError> {
    let components = convert_params(method, param.components)?;
    let kind = match param.kind.strip_prefix("tuple") {
        Some(suffix) => {
            let tuple = ParamType::Tuple(components.iter().map(|c| c.kind.clone()).collect());
            wrap_array_suffix(tuple, suffix)
        }
        None => parse_type(&param.kind),
    }
    .map_err(|reason| SdkError::Config(format!("{method}: {reason}")))?;

    Ok(Param {
        name: param.name,
        kind,
        components,
    })
}

/// Apply `[]`/`[N]` suffixes left to right, e.g. `tuple[2][]`
fn wrap_array_suffix(mut kind: ParamType, mut suffix: &str) -> Result<ParamType, String> {
    while !suffix.is_empty() {
        let close = suffix
            .find(']')
            .filter(|_| suffix.starts_with('['))
            .ok_or_else(|| format!("bad tuple suffix {suffix}"))?;
        let size = &suffix[1..close];
        kind = if size.is_empty() {
            ParamType::Array(Box::new(kind))
        } else {
            let n = size.parse().map_err(|_| format!("bad array size {size}"))?;
            ParamType::FixedArray(Box::new(kind), n)
        };
        suffix = &suffix[close + 1..];
    }
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABI: &str = r#"[
        {"type":"constructor","inputs":[{"name":"initialOwner","type":"address"}],"stateMutability":"nonpayable"},
        {"type":"event","name":"ProductSet","inputs":[{"name":"productId","type":"uint256","indexed":true}]},
        {"type":"function","name":"getProduct","stateMutability":"view",
         "inputs":[{"name":"productId","type":"uint256"}],
         "outputs":[{"name":"","type":"string"},{"name":"","type":"string"}]},
        {"type":"function","name":"getGeolocation","stateMutability":"view",
         "inputs":[{"name":"batchId","type":"uint256"}],
         "outputs":[{"name":"","type":"tuple[]","components":[
            {"name":"latitude","type":"string"},{"name":"longitude","type":"string"}]}]}
    ]"#;

    #[test]
    fn test_parse_abi() {
        let iface = ContractInterface::from_abi_json("ProductPassport", ABI).unwrap();
        assert_eq!(iface.name(), "ProductPassport");
        assert_eq!(iface.constructor_arity(), 1);
        assert_eq!(iface.methods().len(), 2);
        assert!(iface.bytecode().is_none());

        let get = iface.method("getProduct").unwrap();
        assert_eq!(get.signature, "getProduct(uint256)");
        assert_eq!(get.selector, function_selector("getProduct(uint256)"));
        assert!(get.mutability.is_read_only());
        assert_eq!(get.outputs.len(), 2);
    }

    #[test]
    fn test_tuple_array_output() {
        let iface = ContractInterface::from_abi_json("Geolocation", ABI).unwrap();
        let geo = iface.method("getGeolocation").unwrap();
        assert_eq!(geo.outputs[0].kind.canonical(), "(string,string)[]");
        assert_eq!(geo.outputs[0].components[1].name, "longitude");
    }

    #[test]
    fn test_artifact_with_bytecode() {
        let json = format!(r#"{{"contractName":"Batch","abi":{ABI},"bytecode":"0x6080604052"}}"#);
        let iface = ContractInterface::from_artifact("Batch", &json).unwrap();
        assert_eq!(iface.bytecode().unwrap().as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);

        let data = iface.deploy_data(&[Token::Address(Default::default())]).unwrap();
        assert_eq!(data.len(), 5 + 32);
    }

    #[test]
    fn test_foundry_bytecode_object() {
        let json = format!(r#"{{"abi":{ABI},"bytecode":{{"object":"0x00"}}}}"#);
        let iface = ContractInterface::from_artifact("X", &json).unwrap();
        assert_eq!(iface.bytecode().unwrap().len(), 1);
    }

    #[test]
    fn test_abi_only_not_deployable() {
        let json = format!(r#"{{"abi":{ABI},"bytecode":"0x"}}"#);
        let iface = ContractInterface::from_artifact("X", &json).unwrap();
        assert!(matches!(iface.deploy_data(&[]), Err(SdkError::NotDeployable(_))));
    }

    #[test]
    fn test_unknown_type_is_error() {
        let json = r#"[{"type":"function","name":"f","inputs":[{"name":"x","type":"float"}]}]"#;
        assert!(ContractInterface::from_abi_json("X", json).is_err());
    }

    #[test]
    fn test_wrap_array_suffix() {
        let t = ParamType::Tuple(vec![ParamType::Bool]);
        assert_eq!(
            wrap_array_suffix(t.clone(), "[2][]").unwrap().canonical(),
            "(bool)[2][]"
        );
        assert!(wrap_array_suffix(t, "x").is_err());
    }
}
