//! Payload values and the codecs turning them into store bytes.
//!
//! A payload is one of three shapes, matching the three codec kinds:
//!
//! | Codec                          | Payload               | Bytes            |
//! |--------------------------------|-----------------------|------------------|
//! | [`Serialization::Raw`]         | [`Payload::Bytes`]    | passed through   |
//! | [`Serialization::Generic`]     | [`Payload::Value`]    | JSON document    |
//! | [`Serialization::Structured`]  | [`Payload::Record`]   | [`Record::encode`] |

use crate::error::{DispatchError, GraphError, Result};
use serde::de::DeserializeOwned;
use std::any::{Any, TypeId};
use std::fmt;

/// Payload type that supplies its own binary encoding.
///
/// Implementors get a zero-value instance from [`Default`], used as the
/// default payload of vertex and edge types declared with this record.
///
/// # Example
///
/// ```
/// use schemagraph::{Record, Result};
///
/// #[derive(Debug, Clone, Default, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Record for Point {
///     const TYPE_NAME: &'static str = "point";
///
///     fn encode(&self) -> Vec<u8> {
///         let mut bytes = self.x.to_le_bytes().to_vec();
///         bytes.extend_from_slice(&self.y.to_le_bytes());
///         bytes
///     }
///
///     fn decode(bytes: &[u8]) -> Result<Self> {
///         let field = |i: usize| -> Result<i32> {
///             let raw = bytes
///                 .get(4 * i..4 * i + 4)
///                 .ok_or_else(|| schemagraph::GraphError::serialization(
///                     "point payload too short",
///                     None::<std::io::Error>,
///                 ))?;
///             Ok(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
///         };
///         Ok(Point { x: field(0)?, y: field(1)? })
///     }
/// }
/// ```
pub trait Record: fmt::Debug + Clone + Default + PartialEq + Send + Sync + 'static {
    /// Name identifying the record type in codec errors.
    const TYPE_NAME: &'static str;

    /// Serialize the record.
    fn encode(&self) -> Vec<u8>;

    /// Rebuild a record from bytes produced by [`encode`](Record::encode).
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Serialization`] on malformed input.
    fn decode(bytes: &[u8]) -> Result<Self>;
}

/// Object-safe view of a [`Record`], implemented for every record type.
pub trait DynRecord: fmt::Debug + Send + Sync {
    /// [`Record::TYPE_NAME`] of the concrete type.
    fn record_type(&self) -> &'static str;

    /// [`Record::encode`] of the concrete type.
    fn encode_dyn(&self) -> Vec<u8>;

    /// Clone into a new box.
    fn clone_box(&self) -> Box<dyn DynRecord>;

    /// Equality across trait objects: false when the concrete types differ.
    fn eq_dyn(&self, other: &dyn DynRecord) -> bool;

    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Record> DynRecord for T {
    fn record_type(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn encode_dyn(&self) -> Vec<u8> {
        self.encode()
    }

    fn clone_box(&self) -> Box<dyn DynRecord> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn DynRecord) -> bool {
        other.as_any().downcast_ref::<T>() == Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Clone for Box<dyn DynRecord> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl PartialEq for dyn DynRecord {
    fn eq(&self, other: &Self) -> bool {
        self.eq_dyn(other)
    }
}

/// Decoded vertex or edge payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Opaque bytes, stored as is
    Bytes(Vec<u8>),
    /// Arbitrary value handled by the generic codec
    Value(serde_json::Value),
    /// Structured record with its own encoding
    Record(Box<dyn DynRecord>),
}

impl Payload {
    /// Wrap a structured record.
    pub fn record<T: Record>(record: T) -> Self {
        Payload::Record(Box::new(record))
    }

    /// Build a generic payload from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Serialization`] if the value cannot be
    /// represented as a generic value.
    pub fn from_serialize<T: serde::Serialize>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Payload::Value)
            .map_err(|e| GraphError::serialization("Failed to convert payload", Some(e)))
    }

    /// Raw bytes, if this is a [`Payload::Bytes`].
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Payload::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Generic value, if this is a [`Payload::Value`].
    pub fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            Payload::Value(value) => Some(value),
            _ => None,
        }
    }

    /// String content of a generic string value.
    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(serde_json::Value::as_str)
    }

    /// Concrete record, if this is a [`Payload::Record`] of type `T`.
    pub fn downcast_ref<T: Record>(&self) -> Option<&T> {
        match self {
            Payload::Record(record) => record.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Convert a generic value into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Serialization`] if this is not a generic value or
    /// if it does not match `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        let value = self.as_value().ok_or_else(|| {
            GraphError::serialization(
                format!("cannot deserialize {} payload", self.kind()),
                None::<serde_json::Error>,
            )
        })?;
        T::deserialize(value)
            .map_err(|e| GraphError::serialization("Failed to deserialize payload", Some(e)))
    }

    /// Short description of the payload shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Bytes(_) => "raw",
            Payload::Value(_) => "generic",
            Payload::Record(record) => record.record_type(),
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Payload::Value(value)
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::Value(value.into())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Payload::Value(value.into())
    }
}

impl From<i64> for Payload {
    fn from(value: i64) -> Self {
        Payload::Value(value.into())
    }
}

impl From<u64> for Payload {
    fn from(value: u64) -> Self {
        Payload::Value(value.into())
    }
}

impl From<f64> for Payload {
    fn from(value: f64) -> Self {
        Payload::Value(value.into())
    }
}

impl From<bool> for Payload {
    fn from(value: bool) -> Self {
        Payload::Value(value.into())
    }
}

/// Encoding of one [`Record`] type, captured as plain function pointers so
/// that codecs stay `Copy` and comparable.
///
/// Two codecs are equal when they belong to the same Rust type, whatever
/// their [`Record::TYPE_NAME`].
#[derive(Clone, Copy)]
pub struct StructuredCodec {
    type_id: TypeId,
    type_name: &'static str,
    default: fn() -> Box<dyn DynRecord>,
    decode: fn(&[u8]) -> Result<Box<dyn DynRecord>>,
}

fn default_record<T: Record>() -> Box<dyn DynRecord> {
    Box::new(T::default())
}

fn decode_record<T: Record>(bytes: &[u8]) -> Result<Box<dyn DynRecord>> {
    Ok(Box::new(T::decode(bytes)?))
}

impl StructuredCodec {
    /// Codec of record type `T`.
    pub fn of<T: Record>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: T::TYPE_NAME,
            default: default_record::<T>,
            decode: decode_record::<T>,
        }
    }

    /// [`Record::TYPE_NAME`] of the record type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn accepts(&self, record: &dyn DynRecord) -> bool {
        record.as_any().type_id() == self.type_id
    }
}

impl fmt::Debug for StructuredCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StructuredCodec").field(&self.type_name).finish()
    }
}

impl PartialEq for StructuredCodec {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for StructuredCodec {}

/// Codec kind chosen when declaring a vertex or edge type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Serialization {
    /// Bytes passed through untouched
    #[default]
    Raw,
    /// Arbitrary values stored as JSON
    Generic,
    /// Records encoding themselves
    Structured(StructuredCodec),
}

impl Serialization {
    /// Structured codec of record type `T`.
    pub fn structured<T: Record>() -> Self {
        Serialization::Structured(StructuredCodec::of::<T>())
    }

    /// Resolve a serialization method by name.
    ///
    /// `"raw"` and `"none"` select [`Serialization::Raw`], `"generic"` and
    /// `"json"` select [`Serialization::Generic`].
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownSerializationMethod`] for any other name.
    pub fn from_name(name: &str) -> std::result::Result<Self, DispatchError> {
        match name {
            "raw" | "none" => Ok(Serialization::Raw),
            "generic" | "json" => Ok(Serialization::Generic),
            _ => Err(DispatchError::UnknownSerializationMethod {
                name: name.to_string(),
            }),
        }
    }

    /// Name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Serialization::Raw => "raw",
            Serialization::Generic => "generic",
            Serialization::Structured(codec) => codec.type_name,
        }
    }
}

/// Codec bound to a vertex type or a vertex type pair: a serialization plus
/// its default payload rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    serialization: Serialization,
    default_payload: bool,
}

impl Codec {
    /// Create a codec.
    pub fn new(serialization: Serialization, default_payload: bool) -> Self {
        Self {
            serialization,
            default_payload,
        }
    }

    /// Serialization kind.
    pub fn serialization(&self) -> Serialization {
        self.serialization
    }

    /// Whether the default payload flag was set at declaration.
    pub fn has_default_payload(&self) -> bool {
        self.default_payload
    }

    /// Encode a payload into store bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::PayloadMismatch`] if the payload shape does
    /// not belong to this codec, [`GraphError::Serialization`] if the generic
    /// encoder fails.
    pub fn encode(&self, payload: &Payload) -> Result<Vec<u8>> {
        match (&self.serialization, payload) {
            (Serialization::Raw, Payload::Bytes(bytes)) => Ok(bytes.clone()),
            (Serialization::Generic, Payload::Value(value)) => serde_json::to_vec(value)
                .map_err(|e| GraphError::serialization("Failed to encode payload", Some(e))),
            (Serialization::Structured(codec), Payload::Record(record))
                if codec.accepts(&**record) =>
            {
                Ok(record.encode_dyn())
            }
            _ => Err(DispatchError::PayloadMismatch {
                codec: self.serialization.name().to_string(),
                payload: payload.kind().to_string(),
            }
            .into()),
        }
    }

    /// Decode store bytes into a payload.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Serialization`] on malformed bytes.
    pub fn decode(&self, bytes: &[u8]) -> Result<Payload> {
        match &self.serialization {
            Serialization::Raw => Ok(Payload::Bytes(bytes.to_vec())),
            Serialization::Generic => serde_json::from_slice(bytes)
                .map(Payload::Value)
                .map_err(|e| GraphError::serialization("Failed to decode payload", Some(e))),
            Serialization::Structured(codec) => (codec.decode)(bytes).map(Payload::Record),
        }
    }

    /// Payload substituted when none is given on insertion.
    ///
    /// Only structured codecs declared with the default payload flag have
    /// one: their record's zero value. Raw and generic codecs never do.
    pub fn default_payload(&self) -> Option<Payload> {
        match &self.serialization {
            Serialization::Structured(codec) if self.default_payload => {
                Some(Payload::Record((codec.default)()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (default payload: {})",
            self.serialization.name(),
            self.default_payload
        )
    }
}
