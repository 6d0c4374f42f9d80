//! BERT (Binary ERlang Term) decoding.
//!
//! A message starts with a magic byte:
//!
//! - `131` / `132`: Erlang external term format, decoded here. `132` streams
//!   may also use the encoded-string tags `112` and `113`.
//! - `133` / `134`: compact format, delegated to a [`CompactCodec`].
//!
//! Tuples of the form `{bert, ...}` decode to the dedicated
//! [`BertValue`] variants (`Null`, `Bool`, `Dict`, `Timestamp`, `Regex`).
//!
//! ```
//! use bert::{decode, BertValue};
//!
//! let value = decode(&[131, 104, 2, 100, 0, 4, b'b', b'e', b'r', b't',
//!                      100, 0, 4, b't', b'r', b'u', b'e']).unwrap();
//! assert_eq!(value, BertValue::Bool(true));
//! ```

mod atom;
mod bignum;
pub mod cli;
mod codec;
mod complex;
pub mod constants;
mod decoder;
mod error;
mod options;
mod router;
mod value;

pub use atom::AtomTable;
pub use bert_buffers::Reader;
pub use codec::{supports, CompactCodec, NoCompactCodec};
pub use constants::{BertTag, ProtocolVersion};
pub use decoder::BertDecoder;
pub use error::BertError;
pub use options::DecodeOptions;
pub use router::{decode, decode_with};
pub use value::{Atom, BertValue, EncodedText, Regex, RegexFlags, Timestamp};
