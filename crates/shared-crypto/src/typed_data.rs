//! # Typed-Data Hashing
//!
//! Domain-separated hashing of structured messages (EIP-712 encoding).
//!
//! ```text
//! digest = keccak256(0x19 || 0x01 || domainSeparator || hashStruct(message))
//! hashStruct(s) = keccak256(typeHash(s) || enc(field_1) || ... || enc(field_n))
//! ```
//!
//! Only atomic field types are supported (`string`, `uint256`, `address`,
//! `bytes32`), which covers every message this protocol signs.

use crate::hashing::{keccak256, KeccakHasher};
use crate::CryptoError;
use shared_types::{Address, Hash, U256};

/// Salt bound into every hook domain.
pub const HOOK_DOMAIN_SALT: Hash = Hash([
    0x5d, 0xb5, 0xbd, 0x0c, 0xd6, 0xf4, 0x1d, 0x9d, 0x70, 0x55, 0x25, 0xbc, 0x47, 0x73, 0xe0, 0x6c,
    0x1c, 0xdc, 0xb6, 0x81, 0x85, 0xb4, 0xe0, 0x0b, 0x0b, 0x26, 0xcc, 0x7d, 0x2e, 0x23, 0x76, 0x1d,
]);

/// Protocol name bound into every hook domain.
pub const HOOK_DOMAIN_NAME: &str = "Hook";

/// Protocol version bound into every hook domain.
pub const HOOK_DOMAIN_VERSION: &str = "1";

// =============================================================================
// SCHEMA
// =============================================================================

/// Atomic field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Dynamic UTF-8 string, encoded as its Keccak-256.
    String,
    /// 256-bit unsigned integer.
    Uint256,
    /// 20-byte address, left-padded.
    Address,
    /// Fixed 32-byte value.
    Bytes32,
}

impl FieldKind {
    /// Type name as it appears in the encoded type string.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Uint256 => "uint256",
            Self::Address => "address",
            Self::Bytes32 => "bytes32",
        }
    }
}

/// A value for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    /// `string`
    String(String),
    /// `uint256`
    Uint256(U256),
    /// `address`
    Address(Address),
    /// `bytes32`
    Bytes32(Hash),
}

impl TypedValue {
    /// The field kind this value satisfies.
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::String(_) => FieldKind::String,
            Self::Uint256(_) => FieldKind::Uint256,
            Self::Address(_) => FieldKind::Address,
            Self::Bytes32(_) => FieldKind::Bytes32,
        }
    }

    /// 32-byte encoding used inside `hashStruct`.
    pub fn encode(&self) -> [u8; 32] {
        match self {
            Self::String(s) => keccak256(s.as_bytes()).0,
            Self::Uint256(v) => {
                let mut word = [0u8; 32];
                v.to_big_endian(&mut word);
                word
            }
            Self::Address(a) => a.to_word(),
            Self::Bytes32(h) => h.0,
        }
    }
}

impl From<U256> for TypedValue {
    fn from(v: U256) -> Self {
        Self::Uint256(v)
    }
}

impl From<u64> for TypedValue {
    fn from(v: u64) -> Self {
        Self::Uint256(U256::from(v))
    }
}

impl From<Address> for TypedValue {
    fn from(a: Address) -> Self {
        Self::Address(a)
    }
}

impl From<Hash> for TypedValue {
    fn from(h: Hash) -> Self {
        Self::Bytes32(h)
    }
}

/// One declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Field type
    pub kind: FieldKind,
}

/// A declared struct type: ordered, named, typed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSchema {
    name: String,
    fields: Vec<FieldDef>,
}

impl TypeSchema {
    /// Starts a schema with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field. Field order is significant.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            kind,
        });
        self
    }

    /// Struct name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// `Name(type1 field1,type2 field2,...)`
    pub fn encode_type(&self) -> String {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|f| format!("{} {}", f.kind.type_name(), f.name))
            .collect();
        format!("{}({})", self.name, fields.join(","))
    }

    /// Keccak-256 of the encoded type string.
    pub fn type_hash(&self) -> Hash {
        keccak256(self.encode_type().as_bytes())
    }

    /// Hashes a set of named values against this schema.
    ///
    /// Values may be supplied in any order; they are encoded in schema
    /// order. Every declared field must be present with a matching type and
    /// no undeclared field may be supplied.
    pub fn hash_struct(&self, values: &[(&str, TypedValue)]) -> Result<Hash, CryptoError> {
        if let Some((unknown, _)) = values
            .iter()
            .find(|(name, _)| !self.fields.iter().any(|f| f.name == *name))
        {
            return Err(CryptoError::UnknownField((*unknown).to_string()));
        }

        let mut hasher = KeccakHasher::new();
        hasher.update(self.type_hash().as_bytes());
        for field in &self.fields {
            let (_, value) = values
                .iter()
                .find(|(name, _)| *name == field.name)
                .ok_or_else(|| CryptoError::MissingField(field.name.clone()))?;
            if value.kind() != field.kind {
                return Err(CryptoError::FieldTypeMismatch {
                    field: field.name.clone(),
                    expected: field.kind.type_name(),
                    actual: value.kind().type_name(),
                });
            }
            hasher.update(&value.encode());
        }
        Ok(hasher.finalize())
    }
}

// =============================================================================
// DOMAIN
// =============================================================================

/// Per-deployment domain settings. Chain id and verifying party are bound
/// later from the ledger and the component's own address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainConfig {
    /// Protocol name
    pub name: String,
    /// Protocol version
    pub version: String,
    /// Fixed salt; omitted from the domain type when `None`.
    pub salt: Option<Hash>,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            name: HOOK_DOMAIN_NAME.to_string(),
            version: HOOK_DOMAIN_VERSION.to_string(),
            salt: Some(HOOK_DOMAIN_SALT),
        }
    }
}

impl DomainConfig {
    /// Binds the domain to a chain and verifying party.
    pub fn bind(&self, chain_id: u64, verifying_contract: Address) -> Eip712Domain {
        Eip712Domain {
            name: self.name.clone(),
            version: self.version.clone(),
            chain_id,
            verifying_contract,
            salt: self.salt,
        }
    }
}

/// A fully bound domain descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip712Domain {
    /// Protocol name
    pub name: String,
    /// Protocol version
    pub version: String,
    /// Chain identifier
    pub chain_id: u64,
    /// Component that verifies signatures in this domain
    pub verifying_contract: Address,
    /// Fixed salt
    pub salt: Option<Hash>,
}

impl Eip712Domain {
    /// The `EIP712Domain` type, with `salt` only when one is set.
    pub fn schema(&self) -> TypeSchema {
        let schema = TypeSchema::new("EIP712Domain")
            .field("name", FieldKind::String)
            .field("version", FieldKind::String)
            .field("chainId", FieldKind::Uint256)
            .field("verifyingContract", FieldKind::Address);
        match self.salt {
            Some(_) => schema.field("salt", FieldKind::Bytes32),
            None => schema,
        }
    }

    /// `hashStruct(domain)`.
    pub fn separator(&self) -> Hash {
        let mut hasher = KeccakHasher::new();
        hasher.update(self.schema().type_hash().as_bytes());
        hasher.update(&TypedValue::String(self.name.clone()).encode());
        hasher.update(&TypedValue::String(self.version.clone()).encode());
        hasher.update(&TypedValue::from(self.chain_id).encode());
        hasher.update(&self.verifying_contract.to_word());
        if let Some(salt) = self.salt {
            hasher.update(salt.as_bytes());
        }
        hasher.finalize()
    }
}

/// `keccak256(0x19 || 0x01 || domain_separator || struct_hash)`
pub fn signing_digest(domain_separator: &Hash, struct_hash: &Hash) -> Hash {
    let mut hasher = KeccakHasher::new();
    hasher
        .update(&[0x19, 0x01])
        .update(domain_separator.as_bytes())
        .update(struct_hash.as_bytes());
    hasher.finalize()
}

/// A message type with a fixed schema.
pub trait TypedMessage {
    /// The message's declared type.
    fn schema() -> TypeSchema;

    /// The message's field values.
    fn values(&self) -> Vec<(&'static str, TypedValue)>;

    /// `hashStruct(self)`.
    fn struct_hash(&self) -> Result<Hash, CryptoError> {
        Self::schema().hash_struct(&self.values())
    }

    /// Digest a signer signs for this message in `domain`.
    fn signing_digest(&self, domain: &Eip712Domain) -> Result<Hash, CryptoError> {
        Ok(signing_digest(&domain.separator(), &self.struct_hash()?))
    }
}
