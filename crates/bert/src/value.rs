//! [`BertValue`]: the decoded term tree.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use base64::Engine;
use indexmap::IndexMap;
use malachite::Integer;

/// Interned atom name.
///
/// Atoms keep the raw bytes sent on the wire. Two atoms are equal when their
/// bytes are equal, whether or not they came from the same
/// [`AtomTable`](crate::AtomTable).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(Arc<[u8]>);

impl Atom {
    pub fn new(name: &[u8]) -> Self {
        Self(Arc::from(name))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The atom name, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn is(&self, name: &[u8]) -> bool {
        &*self.0 == name
    }

    /// Whether `self` and `other` share the same allocation.
    pub fn ptr_eq(&self, other: &Atom) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    // Erlang prints atoms bare only when they start lowercase and stay
    // alphanumeric; everything else is single-quoted.
    fn needs_quotes(&self) -> bool {
        match self.0.split_first() {
            Some((first, rest)) => {
                !first.is_ascii_lowercase()
                    || !rest
                        .iter()
                        .all(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b == b'@')
            }
            None => true,
        }
    }
}

impl From<&str> for Atom {
    fn from(name: &str) -> Self {
        Atom::new(name.as_bytes())
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({self})")
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = String::from_utf8_lossy(&self.0);
        if self.needs_quotes() {
            write!(f, "'{}'", name.replace('\'', "\\'"))
        } else {
            f.write_str(&name)
        }
    }
}

/// Point in time decoded from `{bert, time, Mega, Secs, Micro}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp {
    /// Whole seconds since the Unix epoch.
    pub secs: i64,
    /// Sub-second fraction, always below 1_000_000.
    pub micros: u32,
}

impl Timestamp {
    const MICROS_PER_SEC: i64 = 1_000_000;

    /// Combines the three Erlang `now()` components. Microseconds outside
    /// `0..1_000_000` carry into the seconds. Returns `None` on overflow.
    pub fn from_parts(megasecs: i64, secs: i64, micros: i64) -> Option<Self> {
        let whole = megasecs
            .checked_mul(Self::MICROS_PER_SEC)?
            .checked_add(secs)?
            .checked_add(micros.div_euclid(Self::MICROS_PER_SEC))?;
        Some(Self {
            secs: whole,
            micros: micros.rem_euclid(Self::MICROS_PER_SEC) as u32,
        })
    }
}

/// Regex option bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RegexFlags(u8);

impl RegexFlags {
    pub const NONE: RegexFlags = RegexFlags(0);
    pub const CASELESS: RegexFlags = RegexFlags(1);
    pub const EXTENDED: RegexFlags = RegexFlags(2);
    pub const MULTILINE: RegexFlags = RegexFlags(4);

    pub fn from_bits(bits: u8) -> Self {
        RegexFlags(bits & 0b111)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: RegexFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: RegexFlags) {
        self.0 |= other.0;
    }

    /// Option atom names in bit order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        [
            (Self::CASELESS, "caseless"),
            (Self::EXTENDED, "extended"),
            (Self::MULTILINE, "multiline"),
        ]
        .into_iter()
        .filter(move |(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
    }
}

impl std::ops::BitOr for RegexFlags {
    type Output = RegexFlags;

    fn bitor(self, rhs: Self) -> Self {
        RegexFlags(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Regex {
    pub pattern: Vec<u8>,
    pub flags: RegexFlags,
}

/// Text bytes tagged with the name of their encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedText {
    pub bytes: Vec<u8>,
    pub encoding: String,
}

impl EncodedText {
    pub const UTF8: &'static str = "UTF-8";

    pub fn utf8(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            encoding: Self::UTF8.to_owned(),
        }
    }
}

/// A decoded BERT term.
///
/// `Eq` and `Hash` are total so any value can key a [`BertValue::Dict`].
/// Floats compare by bit pattern, so `NaN == NaN` and `0.0 != -0.0`.
#[derive(Debug, Clone)]
pub enum BertValue {
    SmallInt(u8),
    Int(i32),
    BigInt(Integer),
    Float(f64),
    Atom(Atom),
    Binary(Vec<u8>),
    /// Erlang string: a list of byte-sized integers.
    LegacyString(Vec<u8>),
    Tuple(Vec<BertValue>),
    List(Vec<BertValue>),
    Dict(IndexMap<BertValue, BertValue>),
    Null,
    Bool(bool),
    Timestamp(Timestamp),
    Regex(Regex),
    EncodedText(EncodedText),
}

impl BertValue {
    /// Short variant name, used in type-check errors.
    pub fn kind(&self) -> &'static str {
        match self {
            BertValue::SmallInt(_) => "small_int",
            BertValue::Int(_) => "int",
            BertValue::BigInt(_) => "bignum",
            BertValue::Float(_) => "float",
            BertValue::Atom(_) => "atom",
            BertValue::Binary(_) => "binary",
            BertValue::LegacyString(_) => "string",
            BertValue::Tuple(_) => "tuple",
            BertValue::List(_) => "list",
            BertValue::Dict(_) => "dict",
            BertValue::Null => "nil",
            BertValue::Bool(_) => "bool",
            BertValue::Timestamp(_) => "time",
            BertValue::Regex(_) => "regex",
            BertValue::EncodedText(_) => "encoded_string",
        }
    }

    pub fn atom(name: &str) -> Self {
        BertValue::Atom(Atom::from(name))
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            BertValue::Atom(atom) => Some(atom),
            _ => None,
        }
    }

    /// Bytes of a binary or encoded string.
    pub fn as_text(&self) -> Option<&[u8]> {
        match self {
            BertValue::Binary(bytes) => Some(bytes),
            BertValue::EncodedText(text) => Some(&text.bytes),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[BertValue]> {
        match self {
            BertValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Integer value of any integer variant that fits in `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            BertValue::SmallInt(v) => Some(i64::from(*v)),
            BertValue::Int(v) => Some(i64::from(*v)),
            BertValue::BigInt(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }
}

impl PartialEq for BertValue {
    fn eq(&self, other: &Self) -> bool {
        use BertValue::*;
        match (self, other) {
            (SmallInt(a), SmallInt(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (BigInt(a), BigInt(b)) => a == b,
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (Atom(a), Atom(b)) => a == b,
            (Binary(a), Binary(b)) => a == b,
            (LegacyString(a), LegacyString(b)) => a == b,
            (Tuple(a), Tuple(b)) => a == b,
            (List(a), List(b)) => a == b,
            (Dict(a), Dict(b)) => a == b,
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Timestamp(a), Timestamp(b)) => a == b,
            (Regex(a), Regex(b)) => a == b,
            (EncodedText(a), EncodedText(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for BertValue {}

impl Hash for BertValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            BertValue::SmallInt(v) => v.hash(state),
            BertValue::Int(v) => v.hash(state),
            BertValue::BigInt(v) => v.hash(state),
            BertValue::Float(v) => v.to_bits().hash(state),
            BertValue::Atom(v) => v.hash(state),
            BertValue::Binary(v) | BertValue::LegacyString(v) => v.hash(state),
            BertValue::Tuple(v) | BertValue::List(v) => v.hash(state),
            // Map equality ignores order, so only the size is hashed.
            BertValue::Dict(v) => v.len().hash(state),
            BertValue::Null => {}
            BertValue::Bool(v) => v.hash(state),
            BertValue::Timestamp(v) => v.hash(state),
            BertValue::Regex(v) => v.hash(state),
            BertValue::EncodedText(v) => v.hash(state),
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[BertValue]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_bytes(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_str("<<")?;
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{byte}")?;
    }
    f.write_str(">>")
}

/// Erlang term syntax. Complex values are printed in their wire
/// `{bert, ...}` form; binaries use the `<<1,2,3>>` notation.
impl fmt::Display for BertValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BertValue::SmallInt(v) => write!(f, "{v}"),
            BertValue::Int(v) => write!(f, "{v}"),
            BertValue::BigInt(v) => write!(f, "{v}"),
            BertValue::Float(v) => write!(f, "{v:?}"),
            BertValue::Atom(atom) => write!(f, "{atom}"),
            BertValue::Binary(bytes) => write_bytes(f, bytes),
            BertValue::LegacyString(bytes) => {
                f.write_str("[")?;
                for (i, byte) in bytes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{byte}")?;
                }
                f.write_str("]")
            }
            BertValue::Tuple(items) => {
                f.write_str("{")?;
                write_seq(f, items)?;
                f.write_str("}")
            }
            BertValue::List(items) => {
                f.write_str("[")?;
                write_seq(f, items)?;
                f.write_str("]")
            }
            BertValue::Dict(map) => {
                f.write_str("{bert,dict,[")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{{{key},{value}}}")?;
                }
                f.write_str("]}")
            }
            BertValue::Null => f.write_str("{bert,nil}"),
            BertValue::Bool(v) => write!(f, "{{bert,{v}}}"),
            BertValue::Timestamp(ts) => {
                let mega = ts.secs.div_euclid(1_000_000);
                let secs = ts.secs.rem_euclid(1_000_000);
                write!(f, "{{bert,time,{mega},{secs},{}}}", ts.micros)
            }
            BertValue::Regex(re) => {
                f.write_str("{bert,regex,")?;
                write_bytes(f, &re.pattern)?;
                f.write_str(",[")?;
                for (i, name) in re.flags.names().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    f.write_str(name)?;
                }
                f.write_str("]}")
            }
            BertValue::EncodedText(text) => write_bytes(f, &text.bytes),
        }
    }
}

fn json_key(key: BertValue) -> String {
    match key {
        BertValue::Atom(atom) => String::from_utf8_lossy(atom.as_bytes()).into_owned(),
        BertValue::Binary(bytes) => match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(err) => BertValue::Binary(err.into_bytes()).to_string(),
        },
        BertValue::EncodedText(text) => String::from_utf8_lossy(&text.bytes).into_owned(),
        other => other.to_string(),
    }
}

impl From<BertValue> for serde_json::Value {
    fn from(v: BertValue) -> Self {
        use serde_json::{json, Value};
        match v {
            BertValue::SmallInt(i) => json!(i),
            BertValue::Int(i) => json!(i),
            BertValue::BigInt(i) => match i64::try_from(&i) {
                Ok(small) => json!(small),
                Err(_) => Value::String(i.to_string()),
            },
            BertValue::Float(f) => json!(f),
            BertValue::Atom(atom) => Value::String(String::from_utf8_lossy(atom.as_bytes()).into_owned()),
            BertValue::Binary(bytes) => {
                let b64 = base64::engine::general_purpose::STANDARD.encode(&bytes);
                Value::String(format!("data:application/octet-stream;base64,{b64}"))
            }
            BertValue::LegacyString(bytes) => Value::Array(bytes.into_iter().map(|b| json!(b)).collect()),
            BertValue::Tuple(items) | BertValue::List(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            BertValue::Dict(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (json_key(k), Value::from(v)))
                    .collect(),
            ),
            BertValue::Null => Value::Null,
            BertValue::Bool(b) => Value::Bool(b),
            BertValue::Timestamp(ts) => json!({ "secs": ts.secs, "micros": ts.micros }),
            BertValue::Regex(re) => json!({
                "pattern": String::from_utf8_lossy(&re.pattern),
                "flags": re.flags.bits(),
            }),
            BertValue::EncodedText(text) => Value::String(String::from_utf8_lossy(&text.bytes).into_owned()),
        }
    }
}
