//! `BertDecoder`: recursive-descent term decoder.
//!
//! Tuples that may be complex types are resolved in [`crate::complex`]; the
//! magic-byte entry point lives in [`crate::router`].

use bert_buffers::Reader;
use tracing::trace;

use crate::atom::AtomTable;
use crate::bignum::bignum_from_le_bytes;
use crate::codec::{CompactCodec, NoCompactCodec};
use crate::constants::{BertTag, FLOAT_WIDTH};
use crate::error::BertError;
use crate::options::DecodeOptions;
use crate::value::{Atom, BertValue, EncodedText};

/// Stateful BERT decoder.
///
/// Holds the options, the compact codec, an atom table that persists across
/// [`decode`](BertDecoder::decode) calls (bounded by
/// [`DecodeOptions::max_atoms`]), and the current nesting depth.
pub struct BertDecoder<C = NoCompactCodec> {
    pub(crate) options: DecodeOptions,
    pub(crate) codec: C,
    atoms: AtomTable,
    depth: usize,
}

impl Default for BertDecoder {
    fn default() -> Self {
        Self::new(DecodeOptions::default())
    }
}

impl BertDecoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self::with_codec(options, NoCompactCodec)
    }
}

impl<C: CompactCodec> BertDecoder<C> {
    pub fn with_codec(options: DecodeOptions, codec: C) -> Self {
        Self {
            options,
            codec,
            atoms: AtomTable::with_limit(options.max_atoms),
            depth: 0,
        }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn atoms(&self) -> &AtomTable {
        &self.atoms
    }

    pub(crate) fn reset_depth(&mut self) {
        self.depth = 0;
    }

    /// Reads one term at the reader's cursor.
    ///
    /// Each nested term counts one level against
    /// [`DecodeOptions::max_depth`]; a `{bert, ...}` form counts two.
    pub fn read_term(&mut self, reader: &mut Reader<'_>) -> Result<BertValue, BertError> {
        self.descend(|decoder| decoder.read_tagged(reader))
    }

    /// Runs `f` one nesting level deeper, failing once the limit is reached.
    pub(crate) fn descend<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, BertError>,
    ) -> Result<T, BertError> {
        if self.depth >= self.options.max_depth {
            return Err(BertError::DepthLimitExceeded(self.options.max_depth));
        }
        self.depth += 1;
        let value = f(self);
        self.depth -= 1;
        value
    }

    fn read_tagged(&mut self, reader: &mut Reader<'_>) -> Result<BertValue, BertError> {
        let byte = reader.try_u8()?;
        let tag = BertTag::from_byte(byte).ok_or(BertError::InvalidTag(byte))?;
        trace!(?tag, offset = reader.position() - 1, depth = self.depth, "read term");

        match tag {
            BertTag::SmallInt => Ok(BertValue::SmallInt(reader.try_u8()?)),
            BertTag::Int => Ok(BertValue::Int(reader.try_i32()?)),
            BertTag::Float => read_float(reader).map(BertValue::Float),
            BertTag::Atom => self.read_atom(reader).map(BertValue::Atom),
            BertTag::SmallTuple => {
                let arity = u32::from(reader.try_u8()?);
                self.read_tuple(reader, arity)
            }
            BertTag::LargeTuple => {
                let arity = reader.try_u32()?;
                self.read_tuple(reader, arity)
            }
            BertTag::Nil => Ok(BertValue::List(Vec::new())),
            BertTag::LegacyString => {
                let len = usize::from(reader.try_u16()?);
                Ok(BertValue::LegacyString(reader.try_buf(len)?.to_vec()))
            }
            BertTag::List => self.read_list(reader),
            BertTag::Binary => Ok(BertValue::Binary(read_binary_body(reader)?.to_vec())),
            BertTag::SmallBignum => {
                reader.check(2)?;
                let digits = usize::from(reader.try_u8()?);
                let sign = reader.try_u8()?;
                read_bignum(reader, sign, digits)
            }
            BertTag::LargeBignum => {
                reader.check(5)?;
                let digits = reader.try_u32()? as usize;
                let sign = reader.try_u8()?;
                read_bignum(reader, sign, digits)
            }
            BertTag::EncodedString => read_encoded_string(reader).map(BertValue::EncodedText),
            BertTag::UnicodeString => {
                let body = read_binary_body(reader)?;
                Ok(BertValue::EncodedText(EncodedText::utf8(body.to_vec())))
            }
        }
    }

    fn read_atom(&mut self, reader: &mut Reader<'_>) -> Result<Atom, BertError> {
        let len = usize::from(reader.try_u16()?);
        let name = reader.try_buf(len)?;
        if self.options.intern_atoms {
            Ok(self.atoms.intern(name))
        } else {
            Ok(Atom::new(name))
        }
    }

    /// `N` terms followed by a tail byte that is read and ignored.
    fn read_list(&mut self, reader: &mut Reader<'_>) -> Result<BertValue, BertError> {
        let len = reader.try_u32()? as usize;
        // Every element takes at least one byte.
        let mut items = Vec::with_capacity(len.min(reader.size()));
        for _ in 0..len {
            items.push(self.read_term(reader)?);
        }
        reader.try_u8()?;
        Ok(BertValue::List(items))
    }
}

/// Length-prefixed Binary payload, without its tag byte.
fn read_binary_body<'a>(reader: &mut Reader<'a>) -> Result<&'a [u8], BertError> {
    let len = reader.try_u32()? as usize;
    Ok(reader.try_buf(len)?)
}

fn read_encoded_string(reader: &mut Reader<'_>) -> Result<EncodedText, BertError> {
    let bytes = read_binary_body(reader)?.to_vec();
    let tag = reader.try_u8()?;
    if tag != BertTag::Binary as u8 {
        return Err(BertError::InvalidTag(tag));
    }
    let encoding = std::str::from_utf8(read_binary_body(reader)?)
        .map_err(|_| BertError::TypeCheckFailure {
            expected: "utf-8 encoding name",
            found: "binary",
        })?
        .to_owned();
    Ok(EncodedText { bytes, encoding })
}

fn read_bignum(reader: &mut Reader<'_>, sign: u8, digits: usize) -> Result<BertValue, BertError> {
    let magnitude = reader.try_buf(digits)?;
    bignum_from_le_bytes(sign, magnitude).map(BertValue::BigInt)
}

/// Floats travel as `%.20e` text NUL-padded to 31 bytes.
fn read_float(reader: &mut Reader<'_>) -> Result<f64, BertError> {
    let raw = reader.try_buf(FLOAT_WIDTH)?;
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    let text = std::str::from_utf8(&raw[..end])
        .map_err(|_| BertError::InvalidFloat(String::from_utf8_lossy(&raw[..end]).into_owned()))?
        .trim();
    text.parse::<f64>()
        .map_err(|_| BertError::InvalidFloat(text.to_owned()))
}
