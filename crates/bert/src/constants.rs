//! Wire constants: term tags and protocol version bytes.

/// Term tag byte preceding every encoded term.
///
/// Codes 101-103 (reference, port, pid) sit inside the tag range but are not
/// part of BERT and are rejected by [`BertTag::from_byte`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BertTag {
    SmallInt = 97,
    Int = 98,
    Float = 99,
    Atom = 100,
    SmallTuple = 104,
    LargeTuple = 105,
    Nil = 106,
    LegacyString = 107,
    List = 108,
    Binary = 109,
    SmallBignum = 110,
    LargeBignum = 111,
    /// Binary payload followed by a Binary naming its text encoding.
    EncodedString = 112,
    /// Binary payload known to be UTF-8.
    UnicodeString = 113,
}

impl BertTag {
    pub const FIRST: u8 = 97;
    pub const LAST: u8 = 113;

    /// Validates a raw tag byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        let tag = match byte {
            97 => Self::SmallInt,
            98 => Self::Int,
            99 => Self::Float,
            100 => Self::Atom,
            104 => Self::SmallTuple,
            105 => Self::LargeTuple,
            106 => Self::Nil,
            107 => Self::LegacyString,
            108 => Self::List,
            109 => Self::Binary,
            110 => Self::SmallBignum,
            111 => Self::LargeBignum,
            112 => Self::EncodedString,
            113 => Self::UnicodeString,
            _ => return None,
        };
        Some(tag)
    }
}

/// Leading magic byte selecting the decode path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProtocolVersion {
    /// Plain Erlang external term format.
    Erlang = 131,
    /// Erlang format plus the encoded-string extension tags.
    Erlang2 = 132,
    /// Compact codec, decoded by its trusting entry point.
    CompactV1 = 133,
    /// Compact codec, decoded by its validating entry point.
    CompactV2 = 134,
}

impl ProtocolVersion {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            131 => Some(Self::Erlang),
            132 => Some(Self::Erlang2),
            133 => Some(Self::CompactV1),
            134 => Some(Self::CompactV2),
            _ => None,
        }
    }

    /// Compact codec capability required to decode this version, if any.
    pub fn required_capability(self) -> Option<&'static str> {
        match self {
            Self::Erlang | Self::Erlang2 => None,
            Self::CompactV1 => Some(CAPABILITY_V3),
            Self::CompactV2 => Some(CAPABILITY_V4),
        }
    }
}

pub const CAPABILITY_V1: &str = "v1";
pub const CAPABILITY_V2: &str = "v2";
pub const CAPABILITY_V3: &str = "v3";
pub const CAPABILITY_V4: &str = "v4";

/// Atom marking a tuple as one of the special complex forms.
pub const WRAPPER_ATOM: &[u8] = b"bert";

/// Width of the fixed ASCII float field.
pub const FLOAT_WIDTH: usize = 31;
