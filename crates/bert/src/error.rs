//! Error type for BERT decoding.

use bert_buffers::BufferError;
use thiserror::Error;

/// Any failure while decoding a BERT message. Decoding stops at the first
/// error; no partial value is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BertError {
    #[error("unexpected end of BERT stream at offset {position}: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        position: usize,
        needed: usize,
        remaining: usize,
    },
    #[error("invalid tag '{0}' for term")]
    InvalidTag(u8),
    #[error("invalid tag '{0}' for complex value")]
    InvalidComplexType(String),
    #[error("invalid tuple arity for complex type {form}: expected {expected}, got {actual}")]
    ArityMismatch {
        form: &'static str,
        expected: u32,
        actual: u32,
    },
    #[error("invalid dict spec, tag {0} is not an Erlang list")]
    InvalidDictSpec(u8),
    #[error("invalid dict tuple")]
    InvalidDictEntry,
    #[error("invalid magic value ({0}) for BERT string")]
    InvalidMagic(u8),
    #[error("{capability} stream cannot be decoded (magic {version})")]
    UnsupportedVersion {
        version: u8,
        capability: &'static str,
    },
    #[error("wrong argument type {found} (expected {expected})")]
    TypeCheckFailure {
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid bignum digits {0:?}")]
    InvalidBignum(String),
    #[error("invalid float literal {0:?}")]
    InvalidFloat(String),
    #[error("term nesting exceeds depth limit of {0}")]
    DepthLimitExceeded(usize),
    #[error("compact codec error: {0}")]
    Codec(String),
}

impl From<BufferError> for BertError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer {
                position,
                needed,
                remaining,
            } => BertError::UnexpectedEof {
                position,
                needed,
                remaining,
            },
        }
    }
}
