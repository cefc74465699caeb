//! Value types of the remote column-family store.

use std::fmt;
use std::net::IpAddr;

use uuid::Uuid;

/// Column type as reported by remote schema metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WireType {
    Ascii,
    BigInt,
    Blob,
    Boolean,
    /// Monotonic counter, read as a 64-bit integer and never written directly.
    Counter,
    Decimal,
    Double,
    Float,
    Int,
    Text,
    Timestamp,
    Uuid,
    Varchar,
    Varint,
    Timeuuid,
    Inet,
    Date,
    Time,
    SmallInt,
    TinyInt,
    Duration,
    List(Box<WireType>),
    Map(Box<WireType>, Box<WireType>),
    Set(Box<WireType>),
    Udt(String),
    Tuple(Vec<WireType>),
    /// Server-side custom class name.
    Custom(String),
    /// A type name the metadata reader did not recognize.
    Unknown(String),
}

impl WireType {
    /// Resolve a type name as found in the remote schema tables.
    ///
    /// Parameterized collection names (`list<int>`) resolve to their collection
    /// kind with an unknown element type; only the outer kind matters for mapping.
    pub fn from_name(name: &str) -> WireType {
        let lowered = name.trim().to_ascii_lowercase();
        let base = lowered
            .split_once('<')
            .map(|(head, _)| head.trim())
            .unwrap_or(lowered.as_str());
        let element = || Box::new(WireType::Unknown(String::new()));
        match base {
            "ascii" => WireType::Ascii,
            "bigint" => WireType::BigInt,
            "blob" => WireType::Blob,
            "boolean" => WireType::Boolean,
            "counter" => WireType::Counter,
            "decimal" => WireType::Decimal,
            "double" => WireType::Double,
            "float" => WireType::Float,
            "int" => WireType::Int,
            "text" => WireType::Text,
            "timestamp" => WireType::Timestamp,
            "uuid" => WireType::Uuid,
            "varchar" => WireType::Varchar,
            "varint" => WireType::Varint,
            "timeuuid" => WireType::Timeuuid,
            "inet" => WireType::Inet,
            "date" => WireType::Date,
            "time" => WireType::Time,
            "smallint" => WireType::SmallInt,
            "tinyint" => WireType::TinyInt,
            "duration" => WireType::Duration,
            "list" => WireType::List(element()),
            "set" => WireType::Set(element()),
            "map" => WireType::Map(element(), element()),
            "tuple" => WireType::Tuple(Vec::new()),
            _ => WireType::Unknown(name.trim().to_string()),
        }
    }

    /// Short name used in diagnostics.
    pub fn name(&self) -> &str {
        match self {
            WireType::Ascii => "ascii",
            WireType::BigInt => "bigint",
            WireType::Blob => "blob",
            WireType::Boolean => "boolean",
            WireType::Counter => "counter",
            WireType::Decimal => "decimal",
            WireType::Double => "double",
            WireType::Float => "float",
            WireType::Int => "int",
            WireType::Text => "text",
            WireType::Timestamp => "timestamp",
            WireType::Uuid => "uuid",
            WireType::Varchar => "varchar",
            WireType::Varint => "varint",
            WireType::Timeuuid => "timeuuid",
            WireType::Inet => "inet",
            WireType::Date => "date",
            WireType::Time => "time",
            WireType::SmallInt => "smallint",
            WireType::TinyInt => "tinyint",
            WireType::Duration => "duration",
            WireType::List(_) => "list",
            WireType::Map(_, _) => "map",
            WireType::Set(_) => "set",
            WireType::Udt(name) => name,
            WireType::Tuple(_) => "tuple",
            WireType::Custom(name) => name,
            WireType::Unknown(name) if name.is_empty() => "unknown",
            WireType::Unknown(name) => name,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One non-null value carried on the wire.
///
/// Remote nulls are `Option::None` at the call sites, never a variant here.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Counter(i64),
    Boolean(bool),
    Float(f32),
    Double(f64),
    Ascii(String),
    Text(String),
    Varchar(String),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    Uuid(Uuid),
    Timeuuid(Uuid),
    Inet(IpAddr),
    Blob(Vec<u8>),
    /// Decimal in its textual form.
    Decimal(String),
    /// Days since the Unix epoch.
    Date(i32),
    List(Vec<WireValue>),
    Set(Vec<WireValue>),
    Map(Vec<(WireValue, WireValue)>),
}

impl WireValue {
    pub fn wire_type(&self) -> WireType {
        let unknown = || Box::new(WireType::Unknown(String::new()));
        match self {
            WireValue::TinyInt(_) => WireType::TinyInt,
            WireValue::SmallInt(_) => WireType::SmallInt,
            WireValue::Int(_) => WireType::Int,
            WireValue::BigInt(_) => WireType::BigInt,
            WireValue::Counter(_) => WireType::Counter,
            WireValue::Boolean(_) => WireType::Boolean,
            WireValue::Float(_) => WireType::Float,
            WireValue::Double(_) => WireType::Double,
            WireValue::Ascii(_) => WireType::Ascii,
            WireValue::Text(_) => WireType::Text,
            WireValue::Varchar(_) => WireType::Varchar,
            WireValue::Timestamp(_) => WireType::Timestamp,
            WireValue::Uuid(_) => WireType::Uuid,
            WireValue::Timeuuid(_) => WireType::Timeuuid,
            WireValue::Inet(_) => WireType::Inet,
            WireValue::Blob(_) => WireType::Blob,
            WireValue::Decimal(_) => WireType::Decimal,
            WireValue::Date(_) => WireType::Date,
            WireValue::List(_) => WireType::List(unknown()),
            WireValue::Set(_) => WireType::Set(unknown()),
            WireValue::Map(_) => WireType::Map(unknown(), unknown()),
        }
    }
}
